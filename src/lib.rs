//! Caja is a bookkeeping ledger for a small shop. It records sales itemized against a product
//! catalog and categorized expenses in a local SQLite file, and derives period totals, category
//! breakdowns, a daily series, a weekly comparison, the best selling products and a seven day
//! activity histogram from them.
//!
//! The `report` module is pure: it computes every figure from a `model::Snapshot`, so it can be
//! used without the datastore.

pub mod args;
pub mod commands;
mod config;
mod db;
mod error;
pub mod model;
pub mod report;
mod utils;


pub use config::Config;
pub use error::{Error, ErrorType, Result};
