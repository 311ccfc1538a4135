use serde::{Deserialize, Serialize};

/// The fixed set of categories an expense can be assigned to.
///
/// The serialized form is the label shown to, and stored for, the shop owner. Each variant also
/// accepts a short snake_case alias so it can be typed on the command line.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
pub enum ExpenseCategory {
    #[serde(rename = "Insumos y Empaques", alias = "supplies")]
    SuppliesPackaging,
    #[serde(rename = "Servicios Públicos", alias = "utilities")]
    Utilities,
    #[serde(rename = "Sueldos y Personal", alias = "salaries")]
    Salaries,
    #[serde(rename = "Alquiler y Mantenimiento", alias = "rent")]
    RentMaintenance,
    #[serde(rename = "Marketing y Ventas", alias = "marketing")]
    MarketingSales,
    #[serde(rename = "Administrativos y Otros", alias = "admin")]
    AdminOther,
}

serde_plain::derive_display_from_serialize!(ExpenseCategory);
serde_plain::derive_fromstr_from_deserialize!(ExpenseCategory);

impl ExpenseCategory {
    /// Every category, in display order.
    pub const ALL: [ExpenseCategory; 6] = [
        ExpenseCategory::SuppliesPackaging,
        ExpenseCategory::Utilities,
        ExpenseCategory::Salaries,
        ExpenseCategory::RentMaintenance,
        ExpenseCategory::MarketingSales,
        ExpenseCategory::AdminOther,
    ];

    /// The position of this category in `ALL`.
    pub fn index(&self) -> usize {
        match self {
            ExpenseCategory::SuppliesPackaging => 0,
            ExpenseCategory::Utilities => 1,
            ExpenseCategory::Salaries => 2,
            ExpenseCategory::RentMaintenance => 3,
            ExpenseCategory::MarketingSales => 4,
            ExpenseCategory::AdminOther => 5,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_display_uses_label() {
        assert_eq!(ExpenseCategory::Utilities.to_string(), "Servicios Públicos");
    }

    #[test]
    fn test_parse_label_and_alias() {
        assert_eq!(
            ExpenseCategory::from_str("Servicios Públicos").unwrap(),
            ExpenseCategory::Utilities
        );
        assert_eq!(
            ExpenseCategory::from_str("rent").unwrap(),
            ExpenseCategory::RentMaintenance
        );
        assert!(ExpenseCategory::from_str("Groceries").is_err());
    }

    #[test]
    fn test_index_matches_all() {
        for (ix, category) in ExpenseCategory::ALL.iter().enumerate() {
            assert_eq!(category.index(), ix);
        }
    }
}
