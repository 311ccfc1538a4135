//! Catalog listing handlers.

use crate::commands::{plural, Out};
use crate::error::{ErrorType, IntoResult};
use crate::model::{Product, ProductCategory};
use crate::{Config, Result};

/// Lists every product, hidden ones included, in display order.
pub async fn list_products(config: Config) -> Result<Out<Vec<Product>>> {
    let snapshot = config
        .db()
        .load_snapshot()
        .await
        .pub_result(ErrorType::Database)?;

    let mut lines = vec![plural(snapshot.products().len(), "product", "products")];
    for product in snapshot.sorted_products() {
        let category = snapshot
            .product_category(product.id())
            .map(ProductCategory::name)
            .unwrap_or("-");
        lines.push(format!(
            "{:>3}  {:<12} {:<24} {:>12}  {}{}",
            product.sort_order(),
            product.id(),
            product.name(),
            config.money(product.price()),
            category,
            if product.is_visible() { "" } else { " (hidden)" }
        ));
    }
    let products = snapshot.sorted_products().into_iter().cloned().collect();
    Ok(Out::new(lines.join("\n"), products))
}

/// Lists product categories by name.
pub async fn list_categories(config: Config) -> Result<Out<Vec<ProductCategory>>> {
    let snapshot = config
        .db()
        .load_snapshot()
        .await
        .pub_result(ErrorType::Database)?;

    let mut lines = vec![plural(snapshot.categories().len(), "category", "categories")];
    for category in snapshot.categories() {
        let count = snapshot
            .products()
            .iter()
            .filter(|p| p.category_id() == Some(category.id()))
            .count();
        lines.push(format!(
            "{:<36} {:<24} {}",
            category.id(),
            category.name(),
            plural(count, "product", "products")
        ));
    }
    Ok(Out::new(lines.join("\n"), snapshot.categories().to_vec()))
}
