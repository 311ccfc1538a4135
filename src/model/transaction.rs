use crate::error::Res;
use crate::model::{Amount, ExpenseCategory};
use anyhow::{bail, ensure, Context};
use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

/// Whether money came in or went out.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransactionKind {
    Sale,
    Expense,
}

serde_plain::derive_display_from_serialize!(TransactionKind);
serde_plain::derive_fromstr_from_deserialize!(TransactionKind);

/// One line of a sale. The name and unit price are copied from the catalog when the sale is
/// recorded so that later catalog edits do not rewrite history.
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct SaleItem {
    pub(crate) product_id: String,
    pub(crate) product_name: String,
    pub(crate) quantity: u32,
    pub(crate) unit_price: Amount,
}

impl SaleItem {
    pub fn new(
        product_id: impl Into<String>,
        product_name: impl Into<String>,
        quantity: u32,
        unit_price: Amount,
    ) -> Self {
        Self {
            product_id: product_id.into(),
            product_name: product_name.into(),
            quantity,
            unit_price,
        }
    }

    pub fn product_id(&self) -> &str {
        &self.product_id
    }

    pub fn product_name(&self) -> &str {
        &self.product_name
    }

    pub fn quantity(&self) -> u32 {
        self.quantity
    }

    pub fn unit_price(&self) -> Amount {
        self.unit_price
    }

    /// `quantity × unit_price`
    pub fn subtotal(&self) -> Amount {
        self.unit_price.times(self.quantity)
    }
}

/// A recorded sale or expense.
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct Transaction {
    pub(crate) id: String,
    pub(crate) kind: TransactionKind,
    pub(crate) amount: Amount,
    /// Local wall-clock time.
    pub(crate) date: NaiveDateTime,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) description: Option<String>,
    /// Only sales have items.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub(crate) items: Vec<SaleItem>,
    /// Only expenses have a category.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) category: Option<ExpenseCategory>,
}

impl Transaction {
    /// Creates a sale whose amount is the sum of its items.
    pub fn sale(id: impl Into<String>, date: NaiveDateTime, items: Vec<SaleItem>) -> Self {
        let amount = items.iter().map(SaleItem::subtotal).sum();
        Self {
            id: id.into(),
            kind: TransactionKind::Sale,
            amount,
            date,
            description: None,
            items,
            category: None,
        }
    }

    /// Creates a sale that has a total but no itemization.
    pub fn sale_without_items(id: impl Into<String>, date: NaiveDateTime, amount: Amount) -> Self {
        Self {
            id: id.into(),
            kind: TransactionKind::Sale,
            amount,
            date,
            description: None,
            items: Vec::new(),
            category: None,
        }
    }

    pub fn expense(
        id: impl Into<String>,
        date: NaiveDateTime,
        amount: Amount,
        category: ExpenseCategory,
        description: Option<String>,
    ) -> Self {
        Self {
            id: id.into(),
            kind: TransactionKind::Expense,
            amount,
            date,
            description,
            items: Vec::new(),
            category: Some(category),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn kind(&self) -> TransactionKind {
        self.kind
    }

    pub fn is_sale(&self) -> bool {
        self.kind == TransactionKind::Sale
    }

    pub fn is_expense(&self) -> bool {
        self.kind == TransactionKind::Expense
    }

    pub fn amount(&self) -> Amount {
        self.amount
    }

    pub fn date(&self) -> NaiveDateTime {
        self.date
    }

    /// The local calendar day of the transaction.
    pub fn day(&self) -> NaiveDate {
        self.date.date()
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn items(&self) -> &[SaleItem] {
        &self.items
    }

    pub fn category(&self) -> Option<ExpenseCategory> {
        self.category
    }

    /// A one-line label: the expense category, or the product names of a sale.
    pub fn label(&self) -> String {
        match (self.category, self.items.is_empty()) {
            (Some(category), _) => category.to_string(),
            (None, false) => self
                .items
                .iter()
                .map(SaleItem::product_name)
                .collect::<Vec<_>>()
                .join(", "),
            (None, true) => self.description.clone().unwrap_or_default(),
        }
    }

    /// Checks the record-level invariants. Records that fail are kept out of every total.
    pub fn validate(&self) -> Res<()> {
        self.amount
            .ensure_money("amount")
            .with_context(|| format!("Transaction '{}' has an invalid amount", self.id))?;
        match self.kind {
            TransactionKind::Expense => {
                ensure!(
                    self.category.is_some(),
                    "Expense '{}' has no category",
                    self.id
                );
                ensure!(
                    self.items.is_empty(),
                    "Expense '{}' has sale items",
                    self.id
                );
            }
            TransactionKind::Sale => {
                ensure!(
                    self.category.is_none(),
                    "Sale '{}' has an expense category",
                    self.id
                );
                if self.items.is_empty() {
                    return Ok(());
                }
                if let Some(item) = self.items.iter().find(|i| i.quantity == 0) {
                    bail!(
                        "Sale '{}' has a zero quantity for '{}'",
                        self.id,
                        item.product_name
                    );
                }
                for item in &self.items {
                    item.unit_price.ensure_money("unit price").with_context(|| {
                        format!("Sale '{}' has an invalid item '{}'", self.id, item.product_name)
                    })?;
                }
                let items_total: Amount = self.items.iter().map(SaleItem::subtotal).sum();
                ensure!(
                    items_total.value() == self.amount.value(),
                    "Sale '{}' amount {} does not match its items total {}",
                    self.id,
                    self.amount,
                    items_total
                );
            }
        }
        Ok(())
    }
}
