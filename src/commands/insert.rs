//! Insert command handlers.

use crate::args::{AddCategoryArgs, AddProductArgs, ExpenseArgs, SaleArgs};
use crate::commands::{now, Out};
use crate::error::{Error, ErrorType, IntoResult};
use crate::model::{Product, ProductCategory, Transaction};
use crate::{Config, Result};
use anyhow::anyhow;

/// Records a sale of catalog products.
///
/// Each product's current name and price are copied onto the sale, so the sale keeps its value
/// when the catalog changes later. Lines with a quantity of zero are ignored.
///
/// # Errors
///
/// - Returns a `Request` error if no line has a quantity above zero.
/// - Returns a `Database` error if a product is missing or hidden, or if a database operation
///   fails.
pub async fn insert_sale(config: Config, args: SaleArgs) -> Result<Out<Transaction>> {
    if args.items().iter().all(|line| line.quantity == 0) {
        return Err(Error::new(
            ErrorType::Request,
            anyhow!("A sale needs at least one item with a quantity above zero"),
        ));
    }
    let sale = config
        .db()
        .insert_sale(args.items(), args.date().unwrap_or_else(now))
        .await
        .pub_result(ErrorType::Database)?;

    let message = format!(
        "Recorded sale {} of {}: {}",
        sale.id(),
        config.money(sale.amount()),
        sale.label()
    );
    Ok(Out::new(message, sale))
}

/// Records an expense.
///
/// # Errors
///
/// - Returns a `Request` error if the amount is not positive, is too large or has more than two
///   decimal places.
/// - Returns a `Database` error if a database operation fails.
pub async fn insert_expense(config: Config, args: ExpenseArgs) -> Result<Out<Transaction>> {
    args.amount()
        .ensure_money("amount")
        .pub_result(ErrorType::Request)?;
    let expense = config
        .db()
        .insert_expense(
            args.amount(),
            args.category(),
            args.description().map(str::to_string),
            args.date().unwrap_or_else(now),
        )
        .await
        .pub_result(ErrorType::Database)?;

    let message = format!(
        "Recorded expense {} of {} in {}",
        expense.id(),
        config.money(expense.amount()),
        args.category()
    );
    Ok(Out::new(message, expense))
}

/// Adds a product at the end of the catalog. The generated id is part of the output.
pub async fn insert_product(config: Config, args: AddProductArgs) -> Result<Out<Product>> {
    args.price
        .ensure_money("price")
        .pub_result(ErrorType::Request)?;
    let product = config
        .db()
        .insert_product(&args.name, args.price, args.category.as_deref())
        .await
        .pub_result(ErrorType::Database)?;

    let message = format!(
        "Added product {} ({}) at {}",
        product.name(),
        product.id(),
        config.money(product.price())
    );
    Ok(Out::new(message, product))
}

/// Adds a product category. The generated id is part of the output.
pub async fn insert_category(config: Config, args: AddCategoryArgs) -> Result<Out<ProductCategory>> {
    let category = config
        .db()
        .insert_product_category(&args.name)
        .await
        .pub_result(ErrorType::Database)?;

    let message = format!("Added category {} ({})", category.name(), category.id());
    Ok(Out::new(message, category))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{parse_timestamp, Amount, ExpenseCategory, SaleLine};
    use crate::test::TestEnv;
    use rust_decimal::Decimal;
    use std::str::FromStr;

    #[tokio::test]
    async fn test_insert_sale() {
        let env = TestEnv::with_catalog().await;
        let args = SaleArgs::new(
            vec![SaleLine::new("prod1", 1), SaleLine::new("prod5", 2)],
            Some(parse_timestamp("2024-03-01 09:00").unwrap()),
        );
        let out = insert_sale(env.config(), args).await.unwrap();
        let sale = out.structure().unwrap();
        assert_eq!(sale.amount().value(), Decimal::from(75));
        assert_eq!(sale.items().len(), 2);
        assert!(out.message().contains("S/ 75.00"));

        let stored = env.config().db().get_transaction(sale.id()).await.unwrap();
        assert_eq!(&stored, sale);
    }

    #[tokio::test]
    async fn test_insert_sale_rejections() {
        let env = TestEnv::with_catalog().await;
        let zero = SaleArgs::new(vec![SaleLine::new("prod1", 0)], None);
        let err = insert_sale(env.config(), zero).await.unwrap_err();
        assert_eq!(err.error_type(), ErrorType::Request);

        // prod7 is hidden in the starter catalog.
        let hidden = SaleArgs::new(vec![SaleLine::new("prod7", 1)], None);
        assert!(insert_sale(env.config(), hidden).await.is_err());
        assert_eq!(env.config().db().count_transactions().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_insert_expense() {
        let env = TestEnv::new().await;
        let args = ExpenseArgs::new(
            Amount::from(20),
            ExpenseCategory::Utilities,
            Some("luz".into()),
            Some(parse_timestamp("2024-03-01 10:00").unwrap()),
        );
        let out = insert_expense(env.config(), args).await.unwrap();
        let expense = out.structure().unwrap();
        assert_eq!(expense.category(), Some(ExpenseCategory::Utilities));
        assert_eq!(expense.description(), Some("luz"));
        assert!(out.message().contains("Servicios Públicos"));

        let negative = ExpenseArgs::new(Amount::ZERO, ExpenseCategory::Utilities, None, None);
        let err = insert_expense(env.config(), negative).await.unwrap_err();
        assert_eq!(err.error_type(), ErrorType::Request);

        let huge = ExpenseArgs::new(
            Amount::from(Decimal::MAX),
            ExpenseCategory::Utilities,
            None,
            None,
        );
        let err = insert_expense(env.config(), huge).await.unwrap_err();
        assert_eq!(err.error_type(), ErrorType::Request);

        let precise = ExpenseArgs::new(
            Amount::from_str("20.001").unwrap(),
            ExpenseCategory::Utilities,
            None,
            None,
        );
        let err = insert_expense(env.config(), precise).await.unwrap_err();
        assert_eq!(err.error_type(), ErrorType::Request);
        assert_eq!(env.config().db().count_transactions().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_insert_product_and_category() {
        let env = TestEnv::with_catalog().await;
        let category = insert_category(
            env.config(),
            AddCategoryArgs {
                name: "Tortas".into(),
            },
        )
        .await
        .unwrap();
        let category_id = category.structure().unwrap().id().to_string();

        let product = insert_product(
            env.config(),
            AddProductArgs {
                name: "Torta Tres Leches".into(),
                price: Amount::from(48),
                category: Some(category_id.clone()),
            },
        )
        .await
        .unwrap();
        let product = product.structure().unwrap();
        assert_eq!(product.sort_order(), 8);
        assert_eq!(product.category_id(), Some(category_id.as_str()));

        let free = AddProductArgs {
            name: "Muestra".into(),
            price: Amount::ZERO,
            category: None,
        };
        let err = insert_product(env.config(), free).await.unwrap_err();
        assert_eq!(err.error_type(), ErrorType::Request);

        let precise = AddProductArgs {
            name: "Muestra".into(),
            price: Amount::from_str("1.999").unwrap(),
            category: None,
        };
        let err = insert_product(env.config(), precise).await.unwrap_err();
        assert_eq!(err.error_type(), ErrorType::Request);
    }
}
