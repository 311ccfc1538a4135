use crate::model::{Product, ProductCategory, Transaction};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::warn;

/// An in-memory, consistent view of the ledger that reports are computed from.
///
/// Building a `Snapshot` quarantines every transaction that fails `Transaction::validate`, so
/// report code can assume that each transaction it sees is well-formed. The number of records that
/// were dropped, here or while loading from the datastore, is available from `skipped`.
#[derive(Debug, Clone, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct Snapshot {
    transactions: Vec<Transaction>,
    products: Vec<Product>,
    categories: Vec<ProductCategory>,
    skipped: usize,
}

impl Snapshot {
    /// Creates a snapshot, keeping the given order of `transactions`.
    pub fn new(
        transactions: impl IntoIterator<Item = Transaction>,
        products: Vec<Product>,
        categories: Vec<ProductCategory>,
    ) -> Self {
        let mut skipped = 0;
        let transactions = transactions
            .into_iter()
            .filter(|t| match t.validate() {
                Ok(()) => true,
                Err(e) => {
                    warn!("Skipping malformed transaction: {e:#}");
                    skipped += 1;
                    false
                }
            })
            .collect();
        Self {
            transactions,
            products,
            categories,
            skipped,
        }
    }

    /// Adds to the count of records that were dropped before they reached the snapshot.
    pub(crate) fn with_skipped(mut self, additional: usize) -> Self {
        self.skipped += additional;
        self
    }

    pub fn transactions(&self) -> &[Transaction] {
        &self.transactions
    }

    pub fn products(&self) -> &[Product] {
        &self.products
    }

    pub fn categories(&self) -> &[ProductCategory] {
        &self.categories
    }

    /// The number of malformed transaction records excluded from this snapshot.
    pub fn skipped(&self) -> usize {
        self.skipped
    }

    pub fn product(&self, id: &str) -> Option<&Product> {
        self.products.iter().find(|p| p.id() == id)
    }

    pub fn category(&self, id: &str) -> Option<&ProductCategory> {
        self.categories.iter().find(|c| c.id() == id)
    }

    /// Resolves `product_id` to its current category through the catalog. `None` when the product
    /// was deleted, has no category, or points to a category that no longer exists.
    pub fn product_category(&self, product_id: &str) -> Option<&ProductCategory> {
        self.product(product_id)
            .and_then(Product::category_id)
            .and_then(|category_id| self.category(category_id))
    }

    /// A lookup from product id to its resolved category, for bulk resolution.
    pub(crate) fn category_index(&self) -> HashMap<&str, &ProductCategory> {
        let categories: HashMap<&str, &ProductCategory> =
            self.categories.iter().map(|c| (c.id(), c)).collect();
        self.products
            .iter()
            .filter_map(|p| {
                p.category_id()
                    .and_then(|id| categories.get(id))
                    .map(|c| (p.id(), *c))
            })
            .collect()
    }

    /// The products in display order.
    pub fn sorted_products(&self) -> Vec<&Product> {
        let mut products: Vec<&Product> = self.products.iter().collect();
        products.sort_by_key(|p| p.sort_order());
        products
    }
}
