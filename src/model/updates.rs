//! Partial updates and sale lines, shared by the command line and the datastore.

use crate::model::{parse_timestamp, Amount, ExpenseCategory};
use anyhow::{bail, Context};
use chrono::NaiveDateTime;
use clap::Args;
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};
use std::str::FromStr;

/// One requested line of a new sale: a product from the catalog and how many units were sold.
///
/// Parsed from `<product_id>=<quantity>`.
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct SaleLine {
    pub product_id: String,
    pub quantity: u32,
}

impl SaleLine {
    pub fn new(product_id: impl Into<String>, quantity: u32) -> Self {
        Self {
            product_id: product_id.into(),
            quantity,
        }
    }
}

impl FromStr for SaleLine {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let Some((product_id, quantity)) = s.split_once('=') else {
            bail!("Expected <product_id>=<quantity>, got '{s}'")
        };
        let product_id = product_id.trim();
        if product_id.is_empty() {
            bail!("Missing product id in '{s}'")
        }
        let quantity = quantity
            .trim()
            .parse::<u32>()
            .with_context(|| format!("Invalid quantity in '{s}'"))?;
        Ok(Self::new(product_id, quantity))
    }
}

impl Display for SaleLine {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}={}", self.product_id, self.quantity)
    }
}

/// Changes to an existing transaction. Fields that are `None` are left as they are.
#[derive(Debug, Clone, Default, Eq, PartialEq, Serialize, Deserialize, Args)]
#[serde(rename_all = "snake_case")]
pub struct TransactionUpdates {
    /// The new amount. Not allowed on sales that are broken down into items.
    #[arg(long)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub amount: Option<Amount>,

    /// The new expense category. Only allowed on expenses.
    #[arg(long)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<ExpenseCategory>,

    /// The new description. An empty string clears it.
    #[arg(long)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// The new date, e.g. `2024-03-01` or `2024-03-01 14:30`, in local time.
    #[arg(long, value_parser = parse_timestamp)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date: Option<NaiveDateTime>,
}

impl TransactionUpdates {
    pub fn is_empty(&self) -> bool {
        self.amount.is_none()
            && self.category.is_none()
            && self.description.is_none()
            && self.date.is_none()
    }
}

/// Changes to one catalog product.
#[derive(Debug, Clone, Default, Eq, PartialEq, Serialize, Deserialize, Args)]
#[serde(rename_all = "snake_case")]
pub struct ProductUpdates {
    /// The id of the product to change.
    pub id: String,

    #[arg(long)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[arg(long)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price: Option<Amount>,

    /// Whether the product is offered when recording new sales.
    #[arg(long)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub visible: Option<bool>,

    /// Position in the catalog, lower first.
    #[arg(long)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sort_order: Option<i64>,

    /// Assign the product to this product category id.
    #[arg(long, conflicts_with = "clear_category")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,

    /// Remove the product from its product category.
    #[arg(long)]
    #[serde(default)]
    pub clear_category: bool,
}

impl ProductUpdates {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            ..Default::default()
        }
    }
}

/// Trims `name` and rejects it when nothing is left.
pub(crate) fn clean_name(name: &str, what: &str) -> crate::error::Res<String> {
    let name = name.trim();
    if name.is_empty() {
        bail!("The {what} name cannot be empty")
    }
    Ok(name.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sale_line_from_str() {
        let line = SaleLine::from_str("prod1=3").unwrap();
        assert_eq!(line, SaleLine::new("prod1", 3));
        assert_eq!(line.to_string(), "prod1=3");
        assert_eq!(
            SaleLine::from_str(" prod2 = 0 ").unwrap(),
            SaleLine::new("prod2", 0)
        );
    }

    #[test]
    fn test_sale_line_rejects_garbage() {
        assert!(SaleLine::from_str("prod1").is_err());
        assert!(SaleLine::from_str("=2").is_err());
        assert!(SaleLine::from_str("prod1=-2").is_err());
        assert!(SaleLine::from_str("prod1=two").is_err());
    }

    #[test]
    fn test_transaction_updates_is_empty() {
        assert!(TransactionUpdates::default().is_empty());
        let updates = TransactionUpdates {
            description: Some(String::new()),
            ..Default::default()
        };
        assert!(!updates.is_empty());
    }

    #[test]
    fn test_clean_name() {
        assert_eq!(clean_name("  Tortas ", "category").unwrap(), "Tortas");
        assert!(clean_name("   ", "category").is_err());
    }
}
