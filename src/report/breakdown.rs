//! Per-category totals for expenses and for sales income.

use crate::model::{Amount, ExpenseCategory, ProductCategory, Snapshot};
use crate::report::{in_period, Period};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt::{Display, Formatter};

/// The total spent in one expense category.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct ExpenseTotal {
    pub category: ExpenseCategory,
    pub total: Amount,
}

/// Sums expenses within `period` by category. Every category is present, in
/// `ExpenseCategory::ALL` order, including those with a zero total.
pub fn expense_breakdown(snapshot: &Snapshot, period: &Period) -> Vec<ExpenseTotal> {
    let mut totals = ExpenseCategory::ALL.map(|category| ExpenseTotal {
        category,
        total: Amount::ZERO,
    });
    for t in in_period(snapshot, period).filter(|t| t.is_expense()) {
        // Snapshot validation guarantees that expenses carry a category.
        if let Some(category) = t.category() {
            totals[category.index()].total += t.amount();
        }
    }
    totals.to_vec()
}

/// Where sales income is attributed.
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "type")]
pub enum IncomeBucket {
    Category { id: String, name: String },
    /// The product has no category, its category was deleted, or the product itself was deleted.
    Uncategorized,
}

impl From<&ProductCategory> for IncomeBucket {
    fn from(value: &ProductCategory) -> Self {
        IncomeBucket::Category {
            id: value.id().to_string(),
            name: value.name().to_string(),
        }
    }
}

impl Display for IncomeBucket {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            IncomeBucket::Category { name, .. } => write!(f, "{name}"),
            IncomeBucket::Uncategorized => write!(f, "Sin Categoría"),
        }
    }
}

/// Sales income attributed to one bucket.
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct IncomeTotal {
    pub bucket: IncomeBucket,
    pub total: Amount,
}

/// Sums `quantity × unit_price` of every sale item within `period`, grouped by the category that
/// the item's product has *now* in the catalog.
///
/// Only buckets with a positive total are returned. Categories come in catalog order and the
/// uncategorized bucket, if present, comes last.
///
/// Sales that were recorded without items contribute nothing here.
pub fn income_breakdown(snapshot: &Snapshot, period: &Period) -> Vec<IncomeTotal> {
    let positions: HashMap<&str, usize> = snapshot
        .categories()
        .iter()
        .enumerate()
        .map(|(ix, c)| (c.id(), ix))
        .collect();
    let product_positions: HashMap<&str, usize> = snapshot
        .category_index()
        .into_iter()
        .filter_map(|(product_id, c)| positions.get(c.id()).map(|ix| (product_id, *ix)))
        .collect();
    let mut by_category = vec![Amount::ZERO; snapshot.categories().len()];
    let mut uncategorized = Amount::ZERO;

    for item in in_period(snapshot, period)
        .filter(|t| t.is_sale())
        .flat_map(|t| t.items())
    {
        match product_positions.get(item.product_id()).copied() {
            Some(ix) => by_category[ix] += item.subtotal(),
            None => uncategorized += item.subtotal(),
        }
    }

    let mut totals: Vec<IncomeTotal> = snapshot
        .categories()
        .iter()
        .zip(by_category)
        .filter(|(_, total)| total.is_positive())
        .map(|(category, total)| IncomeTotal {
            bucket: category.into(),
            total,
        })
        .collect();
    if uncategorized.is_positive() {
        totals.push(IncomeTotal {
            bucket: IncomeBucket::Uncategorized,
            total: uncategorized,
        });
    }
    totals
}
