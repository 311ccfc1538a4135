//! Delete command handlers.

use crate::args::IdArgs;
use crate::commands::{plural, Out};
use crate::error::{ErrorType, IntoResult};
use crate::{Config, Result};

/// Deletes a sale or expense, together with the items of a sale.
pub async fn delete_transaction(config: Config, args: IdArgs) -> Result<Out<String>> {
    config
        .db()
        .delete_transaction(&args.id)
        .await
        .pub_result(ErrorType::Database)?;
    Ok(Out::new(format!("Deleted transaction {}", args.id), args.id))
}

/// Deletes a product from the catalog. Recorded sales keep the name and price they were sold at,
/// and their income is reported as uncategorized from then on.
pub async fn delete_product(config: Config, args: IdArgs) -> Result<Out<String>> {
    config
        .db()
        .delete_product(&args.id)
        .await
        .pub_result(ErrorType::Database)?;
    Ok(Out::new(format!("Deleted product {}", args.id), args.id))
}

/// Deletes a product category. Products in it are kept and become uncategorized.
pub async fn delete_category(config: Config, args: IdArgs) -> Result<Out<String>> {
    let detached = config
        .db()
        .delete_product_category(&args.id)
        .await
        .pub_result(ErrorType::Database)?;
    let message = format!(
        "Deleted category {}, {} left without a category",
        args.id,
        plural(
            usize::try_from(detached).unwrap_or(usize::MAX),
            "product",
            "products"
        )
    );
    Ok(Out::new(message, args.id))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::args::AddProductArgs;
    use crate::commands::insert_product;
    use crate::model::{Amount, ExpenseCategory};
    use crate::report::{income_breakdown, IncomeBucket, Period};
    use crate::test::TestEnv;

    #[tokio::test]
    async fn test_delete_transaction() {
        let env = TestEnv::new().await;
        let expense = env
            .expense("2024-03-01 10:00", 20, ExpenseCategory::Utilities)
            .await;
        let out = delete_transaction(env.config(), IdArgs::new(expense.id()))
            .await
            .unwrap();
        assert_eq!(out.structure().unwrap(), expense.id());

        let err = delete_transaction(env.config(), IdArgs::new(expense.id()))
            .await
            .unwrap_err();
        assert_eq!(err.error_type(), ErrorType::Database);
    }

    #[tokio::test]
    async fn test_delete_category_keeps_products() {
        let env = TestEnv::new().await;
        let db = env.config().db().clone();
        let category = db.insert_product_category("Tortas").await.unwrap();
        let product = insert_product(
            env.config(),
            AddProductArgs {
                name: "Torta Chocolate".into(),
                price: Amount::from(45),
                category: Some(category.id().to_string()),
            },
        )
        .await
        .unwrap();
        let product_id = product.structure().unwrap().id().to_string();
        env.sale("2024-03-01 09:00", &[(product_id.as_str(), 1)])
            .await;

        let out = delete_category(env.config(), IdArgs::new(category.id()))
            .await
            .unwrap();
        assert!(out.message().contains("1 product left"));

        let snapshot = db.load_snapshot().await.unwrap();
        let kept = snapshot.product(&product_id).unwrap();
        assert_eq!(kept.category_id(), None);

        let period = Period::parse("2024-03-01", "2024-03-01").unwrap();
        let income = income_breakdown(&snapshot, &period);
        assert_eq!(income.len(), 1);
        assert_eq!(income[0].bucket, IncomeBucket::Uncategorized);
    }

    #[tokio::test]
    async fn test_delete_product() {
        let env = TestEnv::with_catalog().await;
        delete_product(env.config(), IdArgs::new("prod6"))
            .await
            .unwrap();
        let snapshot = env.config().db().load_snapshot().await.unwrap();
        assert!(snapshot.product("prod6").is_none());
        assert!(delete_product(env.config(), IdArgs::new("prod6"))
            .await
            .is_err());
    }
}
