use crate::args::InitArgs;
use crate::commands::Out;
use crate::error::{ErrorType, IntoResult};
use crate::model::{Amount, Product};
use crate::{Config, Result};
use anyhow::Context;
use std::path::Path;

/// The starter catalog: id, name, price and whether it is offered for sale.
const STARTER_CATALOG: [(&str, &str, u32, bool); 7] = [
    ("prod1", "Torta Chocolate", 45, true),
    ("prod2", "Cupcakes x6", 30, true),
    ("prod3", "Brownies x4", 20, true),
    ("prod4", "Tartaletas x3", 25, true),
    ("prod5", "Pan dulce", 15, true),
    ("prod6", "Cookies x12", 18, true),
    ("prod7", "Cheesecake", 50, false),
];

/// The starter catalog as products, in display order.
pub fn seed_products() -> Vec<Product> {
    STARTER_CATALOG
        .iter()
        .zip(1..)
        .map(|((id, name, price, visible), sort_order)| {
            Product::new(*id, *name, Amount::from(*price), sort_order, None)
                .with_visibility(*visible)
        })
        .collect()
}

/// Creates the data directory and:
/// - Creates an initial `config.json` file with the business name and currency symbol
/// - Creates the SQLite ledger
/// - Optionally adds the starter catalog
///
/// # Arguments
/// - `caja_home` - The directory that will be the root of data directory, e.g. `$HOME/caja`
/// - `args` - Business name, currency symbol and whether to seed products.
///
/// # Errors
/// - Returns an error if any file operations fail or the directory was already initialized.
///
/// The structured output holds the products that were added to the catalog, if any.
pub async fn init(caja_home: &Path, args: &InitArgs) -> Result<Out<Vec<Product>>> {
    let config = Config::create(caja_home, args.business_name(), args.currency_symbol()).await?;

    let products = if args.seed_products() {
        seed_products()
    } else {
        Vec::new()
    };
    if !products.is_empty() {
        config
            .db()
            .insert_products(&products)
            .await
            .context("Unable to add the starter catalog")
            .pub_result(ErrorType::Database)?;
    }

    let message = format!(
        "Created the caja directory for '{}' at {}",
        config.business_name(),
        config.root().display()
    );
    Ok(Out::new(message, products))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_seed_products() {
        let products = seed_products();
        assert_eq!(products.len(), 7);
        assert_eq!(products[0].id(), "prod1");
        assert_eq!(products[0].sort_order(), 1);
        assert_eq!(products[6].name(), "Cheesecake");
        assert_eq!(products[6].sort_order(), 7);
        assert!(!products[6].is_visible());
        assert!(products[..6].iter().all(Product::is_visible));
    }

    #[tokio::test]
    async fn test_init_with_seed() {
        let dir = TempDir::new().unwrap();
        let home = dir.path().join("caja");
        let out = init(&home, &InitArgs::new("Dulce", "S/", true))
            .await
            .unwrap();
        assert_eq!(out.structure().unwrap().len(), 7);
        let config = Config::load(&home).await.unwrap();
        assert_eq!(config.business_name(), "Dulce");

        let snapshot = config.db().load_snapshot().await.unwrap();
        assert_eq!(snapshot.products().len(), 7);

        let again = init(&home, &InitArgs::new("", "", false)).await;
        assert_eq!(again.unwrap_err().error_type(), ErrorType::Config);
    }
}
