//! Update command handlers.

use crate::args::{RenameCategoryArgs, UpdateTransactionArgs};
use crate::commands::Out;
use crate::error::{Error, ErrorType, IntoResult};
use crate::model::{Product, ProductCategory, ProductUpdates, Transaction};
use crate::{Config, Result};
use anyhow::anyhow;

/// Changes the amount, expense category, description or date of one transaction.
///
/// # Errors
///
/// - Returns a `Request` error if no change was given or the new amount cannot be recorded.
/// - Returns a `Database` error if the transaction is not found, if the change is not allowed
///   (the amount of an itemized sale, or a category on a sale), or if a database operation fails.
pub async fn update_transaction(
    config: Config,
    args: UpdateTransactionArgs,
) -> Result<Out<Transaction>> {
    if args.updates.is_empty() {
        return Err(Error::new(
            ErrorType::Request,
            anyhow!(
                "Nothing to update, give at least one of --amount, --category, --description \
                or --date"
            ),
        ));
    }
    if let Some(amount) = args.updates.amount {
        amount
            .ensure_money("amount")
            .pub_result(ErrorType::Request)?;
    }
    let updated = config
        .db()
        .update_transaction(&args.id, &args.updates)
        .await
        .pub_result(ErrorType::Database)?;

    let message = format!(
        "Updated {} {}, now {} on {}",
        updated.kind(),
        updated.id(),
        config.money(updated.amount()),
        updated.date().format("%Y-%m-%d %H:%M")
    );
    Ok(Out::new(message, updated))
}

/// Changes one product of the catalog.
///
/// Setting `visible` to false hides the product from new sales without touching past ones.
pub async fn update_product(config: Config, args: ProductUpdates) -> Result<Out<Product>> {
    if let Some(price) = args.price {
        price.ensure_money("price").pub_result(ErrorType::Request)?;
    }
    let mut updated = config
        .db()
        .update_products(std::slice::from_ref(&args))
        .await
        .pub_result(ErrorType::Database)?;
    let product = updated.pop().ok_or_else(|| {
        Error::new(
            ErrorType::Internal,
            anyhow!("Product '{}' was not returned after the update", args.id),
        )
    })?;

    let message = format!(
        "Updated product {} ({}), {}{}",
        product.name(),
        product.id(),
        config.money(product.price()),
        if product.is_visible() { "" } else { ", hidden" }
    );
    Ok(Out::new(message, product))
}

pub async fn rename_category(
    config: Config,
    args: RenameCategoryArgs,
) -> Result<Out<ProductCategory>> {
    let category = config
        .db()
        .rename_product_category(&args.id, &args.name)
        .await
        .pub_result(ErrorType::Database)?;
    let message = format!("Renamed category {} to {}", category.id(), category.name());
    Ok(Out::new(message, category))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Amount, ExpenseCategory, TransactionUpdates};
    use crate::test::TestEnv;
    use rust_decimal::Decimal;

    #[tokio::test]
    async fn test_update_transaction_success() {
        let env = TestEnv::new().await;
        let expense = env
            .expense("2024-03-01 10:00", 20, ExpenseCategory::Utilities)
            .await;
        let args = UpdateTransactionArgs {
            id: expense.id().to_string(),
            updates: TransactionUpdates {
                amount: Some(Amount::from(25)),
                category: Some(ExpenseCategory::RentMaintenance),
                ..Default::default()
            },
        };
        let out = update_transaction(env.config(), args).await.unwrap();
        let updated = out.structure().unwrap();
        assert_eq!(updated.amount().value(), Decimal::from(25));
        assert_eq!(updated.category(), Some(ExpenseCategory::RentMaintenance));
        assert_eq!(updated.date(), expense.date());
    }

    #[tokio::test]
    async fn test_update_transaction_rejections() {
        let env = TestEnv::with_catalog().await;
        let sale = env.sale("2024-03-01 09:00", &[("prod1", 1)]).await;

        let empty = UpdateTransactionArgs {
            id: sale.id().to_string(),
            updates: TransactionUpdates::default(),
        };
        let err = update_transaction(env.config(), empty).await.unwrap_err();
        assert_eq!(err.error_type(), ErrorType::Request);

        let amount = UpdateTransactionArgs {
            id: sale.id().to_string(),
            updates: TransactionUpdates {
                amount: Some(Amount::from(1)),
                ..Default::default()
            },
        };
        let err = update_transaction(env.config(), amount).await.unwrap_err();
        assert_eq!(err.error_type(), ErrorType::Database);

        let expense = env
            .expense("2024-03-01 10:00", 20, ExpenseCategory::Utilities)
            .await;
        let precise = UpdateTransactionArgs {
            id: expense.id().to_string(),
            updates: TransactionUpdates {
                amount: Some(Amount::from(Decimal::new(12345, 3))),
                ..Default::default()
            },
        };
        let err = update_transaction(env.config(), precise).await.unwrap_err();
        assert_eq!(err.error_type(), ErrorType::Request);

        let missing = UpdateTransactionArgs {
            id: "nope".into(),
            updates: TransactionUpdates {
                description: Some("x".into()),
                ..Default::default()
            },
        };
        assert!(update_transaction(env.config(), missing).await.is_err());
    }

    #[tokio::test]
    async fn test_update_product_hides_it() {
        let env = TestEnv::with_catalog().await;
        let mut args = ProductUpdates::new("prod2");
        args.visible = Some(false);
        args.price = Some(Amount::from(32));
        let out = update_product(env.config(), args).await.unwrap();
        let product = out.structure().unwrap();
        assert!(!product.is_visible());
        assert_eq!(product.price().value(), Decimal::from(32));
        assert!(out.message().contains("hidden"));

        let mut precise = ProductUpdates::new("prod3");
        precise.price = Some(Amount::from(Decimal::new(20005, 3)));
        let err = update_product(env.config(), precise).await.unwrap_err();
        assert_eq!(err.error_type(), ErrorType::Request);

        let err = update_product(env.config(), ProductUpdates::new("missing"))
            .await
            .unwrap_err();
        assert_eq!(err.error_type(), ErrorType::Database);
    }

    #[tokio::test]
    async fn test_rename_category() {
        let env = TestEnv::new().await;
        let category = env
            .config()
            .db()
            .insert_product_category("Tortas")
            .await
            .unwrap();
        let args = RenameCategoryArgs {
            id: category.id().to_string(),
            name: "Pasteles".into(),
        };
        let out = rename_category(env.config(), args).await.unwrap();
        assert_eq!(out.structure().unwrap().name(), "Pasteles");
    }
}
