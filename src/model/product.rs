use crate::model::Amount;
use serde::{Deserialize, Serialize};

/// An item in the shop's catalog.
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct Product {
    pub(crate) id: String,
    pub(crate) name: String,
    pub(crate) price: Amount,
    /// Only visible products can be added to a new sale.
    pub(crate) is_visible: bool,
    pub(crate) sort_order: i64,
    pub(crate) category_id: Option<String>,
}

impl Product {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        price: Amount,
        sort_order: i64,
        category_id: Option<String>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            price,
            is_visible: true,
            sort_order,
            category_id,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn price(&self) -> Amount {
        self.price
    }

    pub fn is_visible(&self) -> bool {
        self.is_visible
    }

    pub fn sort_order(&self) -> i64 {
        self.sort_order
    }

    pub fn category_id(&self) -> Option<&str> {
        self.category_id.as_deref()
    }

    pub fn with_visibility(mut self, is_visible: bool) -> Self {
        self.is_visible = is_visible;
        self
    }
}

/// A user-defined grouping of products, e.g. "Tortas".
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct ProductCategory {
    pub(crate) id: String,
    pub(crate) name: String,
}

impl ProductCategory {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}
