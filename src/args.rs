//! These structs provide the CLI interface for the caja CLI.

use crate::model::{
    parse_timestamp, Amount, ExpenseCategory, ProductUpdates, SaleLine, TransactionUpdates,
};
use chrono::{NaiveDate, NaiveDateTime};
use clap::{Parser, Subcommand, ValueEnum};
use serde::{Deserialize, Serialize};
use std::convert::Infallible;
use std::fmt::{Display, Formatter};
use std::ops::Deref;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::error;
use tracing_subscriber::filter::LevelFilter;

/// caja: the cash book of a small shop.
///
/// Record what you sell from your product catalog and what you spend by category, then ask for
/// totals, category breakdowns, a daily balance series, a week-over-week comparison, your best
/// selling products and the activity of the last seven days.
///
/// Data is kept in a SQLite file inside the caja home directory. Run `caja init` once to create
/// it.
#[derive(Debug, Parser, Clone)]
pub struct Args {
    #[clap(flatten)]
    common: Common,

    #[command(subcommand)]
    command: Command,
}

impl Args {
    pub fn new(common: Common, command: Command) -> Self {
        Self { common, command }
    }

    pub fn common(&self) -> &Common {
        &self.common
    }

    pub fn command(&self) -> &Command {
        &self.command
    }
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Create the data directory, the configuration file and an empty ledger.
    ///
    /// By default the data directory is $HOME/caja. Pass --caja-home or set CAJA_HOME to put it
    /// somewhere else. With --seed-products a starter catalog of seven products is added.
    Init(InitArgs),
    /// Record a sale of catalog products.
    Sale(SaleArgs),
    /// Record an expense.
    Expense(ExpenseArgs),
    /// Change a recorded transaction.
    Update(UpdateArgs),
    /// Delete a transaction, a product or a product category.
    Delete(DeleteArgs),
    /// Manage the product catalog.
    Product(ProductArgs),
    /// Manage product categories, which group sales in the income breakdown.
    Category(CategoryArgs),
    /// Compute reports over a period.
    Report(ReportArgs),
}

/// Arguments common to all subcommands.
#[derive(Debug, Parser, Clone)]
pub struct Common {
    /// The logging verbosity. One of, from least to most verbose:
    /// off, error, warn, info, debug, trace
    ///
    /// This can be overridden by RUST_LOG.
    #[arg(long, default_value_t = LevelFilter::INFO)]
    log_level: LevelFilter,

    /// The directory where caja data and configuration is held. Defaults to ~/caja
    #[arg(long, env = "CAJA_HOME", default_value_t = default_caja_home())]
    caja_home: DisplayPath,

    /// Print the structured result of the command as JSON to stdout.
    #[arg(long, global = true)]
    json: bool,
}

impl Common {
    pub fn new(log_level: LevelFilter, caja_home: PathBuf, json: bool) -> Self {
        Self {
            log_level,
            caja_home: caja_home.into(),
            json,
        }
    }

    pub fn log_level(&self) -> LevelFilter {
        self.log_level
    }

    pub fn caja_home(&self) -> &DisplayPath {
        &self.caja_home
    }

    pub fn json(&self) -> bool {
        self.json
    }
}

/// (Not shown): Args for the `caja init` command.
#[derive(Debug, Parser, Clone)]
pub struct InitArgs {
    /// The name of the business, shown in report headers.
    #[arg(long, default_value = "")]
    business_name: String,

    /// The currency symbol printed in front of money. Defaults to S/
    #[arg(long, default_value = "")]
    currency_symbol: String,

    /// Add a starter catalog of products.
    #[arg(long)]
    seed_products: bool,
}

impl InitArgs {
    pub fn new(
        business_name: impl Into<String>,
        currency_symbol: impl Into<String>,
        seed_products: bool,
    ) -> Self {
        Self {
            business_name: business_name.into(),
            currency_symbol: currency_symbol.into(),
            seed_products,
        }
    }

    pub fn business_name(&self) -> &str {
        &self.business_name
    }

    pub fn currency_symbol(&self) -> &str {
        &self.currency_symbol
    }

    pub fn seed_products(&self) -> bool {
        self.seed_products
    }
}

/// (Not shown): Args for the `caja sale` command.
#[derive(Debug, Parser, Clone)]
pub struct SaleArgs {
    /// A product and the units sold, as <product_id>=<quantity>. Repeat for more products.
    #[arg(long = "item", required = true)]
    items: Vec<SaleLine>,

    /// When the sale happened, in local time. Defaults to now.
    #[arg(long, value_parser = parse_timestamp)]
    date: Option<NaiveDateTime>,
}

impl SaleArgs {
    pub fn new(items: Vec<SaleLine>, date: Option<NaiveDateTime>) -> Self {
        Self { items, date }
    }

    pub fn items(&self) -> &[SaleLine] {
        &self.items
    }

    pub fn date(&self) -> Option<NaiveDateTime> {
        self.date
    }
}

/// (Not shown): Args for the `caja expense` command.
#[derive(Debug, Parser, Clone)]
pub struct ExpenseArgs {
    /// How much was spent, e.g. 120.50
    #[arg(long)]
    amount: Amount,

    /// One of: supplies, utilities, salaries, rent, marketing, admin. The full category names
    /// are accepted too, e.g. "Servicios Públicos".
    #[arg(long)]
    category: ExpenseCategory,

    /// What the money was spent on.
    #[arg(long)]
    description: Option<String>,

    /// When the expense happened, in local time. Defaults to now.
    #[arg(long, value_parser = parse_timestamp)]
    date: Option<NaiveDateTime>,
}

impl ExpenseArgs {
    pub fn new(
        amount: Amount,
        category: ExpenseCategory,
        description: Option<String>,
        date: Option<NaiveDateTime>,
    ) -> Self {
        Self {
            amount,
            category,
            description,
            date,
        }
    }

    pub fn amount(&self) -> Amount {
        self.amount
    }

    pub fn category(&self) -> ExpenseCategory {
        self.category
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn date(&self) -> Option<NaiveDateTime> {
        self.date
    }
}

/// (Not shown): Args for the `caja update` command.
#[derive(Debug, Parser, Clone)]
pub struct UpdateArgs {
    #[command(subcommand)]
    entity: UpdateSubcommand,
}

impl UpdateArgs {
    pub fn new(entity: UpdateSubcommand) -> Self {
        Self { entity }
    }

    pub fn entity(&self) -> &UpdateSubcommand {
        &self.entity
    }
}

#[derive(Subcommand, Debug, Clone)]
pub enum UpdateSubcommand {
    /// Change the amount, category, description or date of a transaction.
    Transaction(UpdateTransactionArgs),
}

/// (Not shown): Args for the `caja update transaction` command.
#[derive(Debug, Parser, Clone)]
pub struct UpdateTransactionArgs {
    /// The id of the transaction to change.
    pub id: String,

    #[command(flatten)]
    pub updates: TransactionUpdates,
}

/// (Not shown): Args for the `caja delete` command.
#[derive(Debug, Parser, Clone)]
pub struct DeleteArgs {
    #[command(subcommand)]
    entity: DeleteSubcommand,
}

impl DeleteArgs {
    pub fn new(entity: DeleteSubcommand) -> Self {
        Self { entity }
    }

    pub fn entity(&self) -> &DeleteSubcommand {
        &self.entity
    }
}

#[derive(Subcommand, Debug, Clone)]
pub enum DeleteSubcommand {
    /// Delete a sale or expense, including the items of a sale.
    Transaction(IdArgs),
    /// Delete a product. Recorded sales keep their copy of the product.
    Product(IdArgs),
    /// Delete a product category. Its products are kept without a category.
    Category(IdArgs),
}

/// (Not shown): Args that name a single record.
#[derive(Debug, Parser, Clone)]
pub struct IdArgs {
    pub id: String,
}

impl IdArgs {
    pub fn new(id: impl Into<String>) -> Self {
        Self { id: id.into() }
    }
}

/// (Not shown): Args for the `caja product` command.
#[derive(Debug, Parser, Clone)]
pub struct ProductArgs {
    #[command(subcommand)]
    action: ProductSubcommand,
}

impl ProductArgs {
    pub fn new(action: ProductSubcommand) -> Self {
        Self { action }
    }

    pub fn action(&self) -> &ProductSubcommand {
        &self.action
    }
}

#[derive(Subcommand, Debug, Clone)]
pub enum ProductSubcommand {
    /// Add a product at the end of the catalog.
    Add(AddProductArgs),
    /// Change the name, price, visibility, position or category of a product.
    Update(ProductUpdates),
    /// List the catalog in display order.
    List,
}

/// (Not shown): Args for the `caja product add` command.
#[derive(Debug, Parser, Clone)]
pub struct AddProductArgs {
    #[arg(long)]
    pub name: String,

    #[arg(long)]
    pub price: Amount,

    /// The id of the product category this product belongs to.
    #[arg(long)]
    pub category: Option<String>,
}

/// (Not shown): Args for the `caja category` command.
#[derive(Debug, Parser, Clone)]
pub struct CategoryArgs {
    #[command(subcommand)]
    action: CategorySubcommand,
}

impl CategoryArgs {
    pub fn new(action: CategorySubcommand) -> Self {
        Self { action }
    }

    pub fn action(&self) -> &CategorySubcommand {
        &self.action
    }
}

#[derive(Subcommand, Debug, Clone)]
pub enum CategorySubcommand {
    /// Add a product category.
    Add(AddCategoryArgs),
    /// Rename a product category.
    Rename(RenameCategoryArgs),
    /// List product categories by name.
    List,
}

/// (Not shown): Args for the `caja category add` command.
#[derive(Debug, Parser, Clone)]
pub struct AddCategoryArgs {
    pub name: String,
}

/// (Not shown): Args for the `caja category rename` command.
#[derive(Debug, Parser, Clone)]
pub struct RenameCategoryArgs {
    pub id: String,
    pub name: String,
}

/// Which report to compute.
#[derive(Debug, Default, Clone, Copy, Eq, PartialEq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum ReportKind {
    /// Sales, expenses and balance.
    #[default]
    Summary,
    /// Expenses per expense category.
    Expenses,
    /// Sales per product category.
    Income,
    /// Daily income, expense and running balance.
    Series,
    /// This week's sales against last week's.
    Weekly,
    /// The three best selling products.
    Top,
    /// Sales and expenses of each of the last seven days.
    Activity,
    /// Totals and records of a single day.
    Today,
    /// Everything above except today.
    All,
}

serde_plain::derive_display_from_serialize!(ReportKind);
serde_plain::derive_fromstr_from_deserialize!(ReportKind);

/// (Not shown): Args for the `caja report` command.
#[derive(Debug, Parser, Clone)]
pub struct ReportArgs {
    #[arg(value_enum, default_value_t = ReportKind::Summary)]
    kind: ReportKind,

    /// First day of the period, YYYY-MM-DD. Defaults to today.
    #[arg(long)]
    from: Option<NaiveDate>,

    /// Last day of the period, inclusive, YYYY-MM-DD. Defaults to today.
    #[arg(long)]
    to: Option<NaiveDate>,

    /// Order the daily series by date instead of by first appearance.
    #[arg(long)]
    chronological: bool,

    /// Compute the report as if it were this moment, in local time. Defaults to now.
    #[arg(long, value_parser = parse_timestamp)]
    as_of: Option<NaiveDateTime>,
}

impl ReportArgs {
    pub fn new(kind: ReportKind) -> Self {
        Self {
            kind,
            from: None,
            to: None,
            chronological: false,
            as_of: None,
        }
    }

    pub fn with_period(mut self, from: NaiveDate, to: NaiveDate) -> Self {
        self.from = Some(from);
        self.to = Some(to);
        self
    }

    pub fn with_chronological(mut self, chronological: bool) -> Self {
        self.chronological = chronological;
        self
    }

    pub fn with_as_of(mut self, as_of: NaiveDateTime) -> Self {
        self.as_of = Some(as_of);
        self
    }

    pub fn kind(&self) -> ReportKind {
        self.kind
    }

    pub fn from(&self) -> Option<NaiveDate> {
        self.from
    }

    pub fn to(&self) -> Option<NaiveDate> {
        self.to
    }

    pub fn chronological(&self) -> bool {
        self.chronological
    }

    pub fn as_of(&self) -> Option<NaiveDateTime> {
        self.as_of
    }
}

fn default_caja_home() -> DisplayPath {
    DisplayPath(match dirs::home_dir() {
        Some(home) => home.join("caja"),
        None => {
            error!(
                "There was an error when trying to get your home directory. You can get around \
                this by providing --caja-home or CAJA_HOME instead of relying on the default \
                caja home directory. If you continue using the program right now, you may have \
                problems!",
            );
            PathBuf::from("caja")
        }
    })
}

#[derive(Debug, Default, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct DisplayPath(PathBuf);

impl From<PathBuf> for DisplayPath {
    fn from(value: PathBuf) -> Self {
        DisplayPath(value)
    }
}

impl Deref for DisplayPath {
    type Target = Path;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl AsRef<Path> for DisplayPath {
    fn as_ref(&self) -> &Path {
        &self.0
    }
}

impl Display for DisplayPath {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0.to_string_lossy())
    }
}

impl FromStr for DisplayPath {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(PathBuf::from(s)))
    }
}

impl DisplayPath {
    pub fn new(path: PathBuf) -> Self {
        Self(path)
    }

    pub fn path(&self) -> &Path {
        &self.0
    }
}
