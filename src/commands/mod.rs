//! Command handlers for the caja CLI.
//!
//! This module contains implementations for all CLI subcommands.

mod delete;
mod init;
mod insert;
mod list;
mod report;
mod update;

use chrono::{Local, NaiveDateTime};
use serde::Serialize;
use std::fmt::Debug;
use tracing::{debug, info};

pub use delete::{delete_category, delete_product, delete_transaction};
pub use init::{init, seed_products};
pub use insert::{insert_category, insert_expense, insert_product, insert_sale};
pub use list::{list_categories, list_products};
pub use report::{report, ReportData};
pub use update::{rename_category, update_product, update_transaction};

/// The output type for a command. This allows the command to return a consistent message and,
/// optionally, structured data to the command line, either as log lines or as JSON.
#[derive(Debug, Clone, Serialize)]
pub struct Out<T>
where
    T: Serialize + Clone + Debug,
{
    /// A message that can be printed to the user regarding the outcome of the command execution.
    message: String,

    /// Any structured data that needs to be output from the call.
    structure: Option<T>,
}

impl<T, S> From<S> for Out<T>
where
    T: Debug + Clone + Serialize,
    S: Into<String>,
{
    fn from(value: S) -> Self {
        Out::new_message(value)
    }
}

impl<T> Out<T>
where
    T: Serialize + Clone + Debug,
{
    /// Create a new `Out` object that has `Some(structure)`.
    pub fn new<S>(message: S, structure: T) -> Self
    where
        S: Into<String>,
    {
        Self {
            message: message.into(),
            structure: Some(structure),
        }
    }

    /// Create a new `Out` object that has `None` for `structure`.
    pub fn new_message<S>(message: S) -> Self
    where
        S: Into<String>,
    {
        Self {
            message: message.into(),
            structure: None,
        }
    }

    /// Get the `message`.
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Get the structured data stored in `structure`.
    pub fn structure(&self) -> Option<&T> {
        self.structure.as_ref()
    }

    /// Print the message to `info!` and the structured data (if it exists) as JSON to `debug!`.
    pub fn print(&self) {
        info!("{}", self.message);
        if let Some(structure) = self.structure() {
            if let Ok(json) = serde_json::to_string_pretty(structure) {
                debug!("Command output:\n\n{json}\n\n");
            }
        }
    }

    /// Print the whole output, message and structure, as JSON to stdout when `json` is set,
    /// otherwise the same as `print`.
    pub fn emit(&self, json: bool) {
        if !json {
            return self.print();
        }
        match serde_json::to_string_pretty(self) {
            Ok(data) => println!("{data}"),
            Err(e) => {
                tracing::error!("Unable to serialize command output: {e}");
                self.print()
            }
        }
    }
}

/// The current local wall-clock time, used when a command is not given an explicit date.
pub(crate) fn now() -> NaiveDateTime {
    Local::now().naive_local()
}

/// `"1 sale"`, `"2 sales"`.
pub(crate) fn plural(count: usize, singular: &str, plural: &str) -> String {
    format!("{count} {}", if count == 1 { singular } else { plural })
}
