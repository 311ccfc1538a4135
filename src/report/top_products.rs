use crate::model::{Snapshot, Transaction};
use crate::report::{in_period, Period};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// How many products the summary ranks.
pub const TOP_PRODUCTS: usize = 3;

/// Units sold of one product name.
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct ProductQuantity {
    pub name: String,
    pub quantity: u64,
}

/// Ranks product names by units sold across the sale items of `transactions`.
///
/// Products are grouped by the name recorded on the sale, not by id, so a renamed product counts
/// as two entries. Ties keep the order in which the names were first encountered.
pub fn rank_products<'a>(
    transactions: impl IntoIterator<Item = &'a Transaction>,
    limit: usize,
) -> Vec<ProductQuantity> {
    let mut ranked: Vec<ProductQuantity> = Vec::new();
    let mut positions: HashMap<&'a str, usize> = HashMap::new();
    for item in transactions
        .into_iter()
        .filter(|t| t.is_sale())
        .flat_map(|t| t.items())
    {
        let ix = *positions.entry(item.product_name()).or_insert_with(|| {
            ranked.push(ProductQuantity {
                name: item.product_name().to_string(),
                quantity: 0,
            });
            ranked.len() - 1
        });
        ranked[ix].quantity += u64::from(item.quantity());
    }
    // `sort_by` is stable, which keeps first-seen order among equal quantities.
    ranked.sort_by(|a, b| b.quantity.cmp(&a.quantity));
    ranked.truncate(limit);
    ranked
}

/// The top three products sold within `period`.
pub fn top_products(snapshot: &Snapshot, period: &Period) -> Vec<ProductQuantity> {
    rank_products(in_period(snapshot, period), TOP_PRODUCTS)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{parse_timestamp, Amount, SaleItem};

    fn sale(id: &str, items: &[(&str, u32)]) -> Transaction {
        Transaction::sale(
            id,
            parse_timestamp("2024-03-01").unwrap(),
            items
                .iter()
                .map(|(name, qty)| SaleItem::new(*name, *name, *qty, Amount::from(1)))
                .collect(),
        )
    }

    fn names(ranked: &[ProductQuantity]) -> Vec<&str> {
        ranked.iter().map(|p| p.name.as_str()).collect()
    }

    #[test]
    fn test_sorted_by_quantity_and_limited() {
        let txns = vec![
            sale("s1", &[("Pan dulce", 2), ("Cheesecake", 1)]),
            sale("s2", &[("Cookies x12", 5), ("Pan dulce", 2)]),
            sale("s3", &[("Brownies x4", 3)]),
        ];
        let ranked = rank_products(&txns, TOP_PRODUCTS);
        assert_eq!(names(&ranked), vec!["Cookies x12", "Pan dulce", "Brownies x4"]);
        assert_eq!(ranked[1].quantity, 4);
    }

    #[test]
    fn test_ties_keep_first_seen_order() {
        let txns = vec![
            sale("s1", &[("B", 2), ("A", 2)]),
            sale("s2", &[("C", 2), ("D", 3)]),
        ];
        let ranked = rank_products(&txns, TOP_PRODUCTS);
        assert_eq!(names(&ranked), vec!["D", "B", "A"]);
    }

    #[test]
    fn test_fewer_than_limit() {
        let txns = vec![sale("s1", &[("A", 1)])];
        assert_eq!(rank_products(&txns, TOP_PRODUCTS).len(), 1);
        assert!(rank_products(&[], TOP_PRODUCTS).is_empty());
    }

    #[test]
    fn test_top_products_respects_period() {
        let mut old = sale("old", &[("Old", 50)]);
        old.date = parse_timestamp("2024-02-01").unwrap();
        let snapshot = Snapshot::new(vec![old, sale("s1", &[("New", 1)])], vec![], vec![]);
        let period = Period::parse("2024-03-01", "2024-03-31").unwrap();
        assert_eq!(names(&top_products(&snapshot, &period)), vec!["New"]);
    }
}
