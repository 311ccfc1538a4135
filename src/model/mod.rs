//! Types that represent the core data model, such as `Transaction` and `Product`.
mod amount;
mod expense_category;
mod product;
mod snapshot;
mod timestamp;
mod transaction;
mod updates;

pub use amount::{Amount, AmountError};
pub use expense_category::ExpenseCategory;
pub use product::{Product, ProductCategory};
pub use snapshot::Snapshot;
pub use timestamp::{format_timestamp, parse_timestamp};
pub use transaction::{SaleItem, Transaction, TransactionKind};
pub use updates::{ProductUpdates, SaleLine, TransactionUpdates};

pub(crate) use updates::clean_name;
