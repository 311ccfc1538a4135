//! Pure reporting functions that turn a `Snapshot` of the ledger into totals, breakdowns and
//! chart data.
//!
//! Nothing in this module touches the datastore or the clock: the caller passes in the snapshot,
//! the period and "now".

mod activity;
mod breakdown;
mod period;
mod series;
mod top_products;
mod totals;
mod weekly;

pub use activity::{daily_activity, DailyActivity, DayActivity, ACTIVITY_DAYS};
pub use breakdown::{expense_breakdown, income_breakdown, ExpenseTotal, IncomeBucket, IncomeTotal};
pub use period::{start_of_week, Period};
pub use series::{day_label, time_series, SeriesOrder, SeriesPoint};
pub use top_products::{rank_products, top_products, ProductQuantity, TOP_PRODUCTS};
pub use totals::{in_period, period_totals, PeriodTotals};
pub use weekly::{percentage_change, weekly_comparison, WeeklyComparison};

use crate::model::{Snapshot, Transaction};
use chrono::NaiveDateTime;
use serde::Serialize;

/// Every derived figure for a period.
#[derive(Debug, Clone, Eq, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct AggregateReport {
    pub period: Period,
    pub totals: PeriodTotals,
    pub expenses_by_category: Vec<ExpenseTotal>,
    pub income_by_category: Vec<IncomeTotal>,
    pub series: Vec<SeriesPoint>,
    /// Relative to `now`, independent of `period`.
    pub weekly: WeeklyComparison,
    pub top_products: Vec<ProductQuantity>,
    /// The seven days ending with the date of `now`, independent of `period`.
    pub activity: DailyActivity,
    /// Malformed records that were left out of every figure.
    pub skipped: usize,
}

/// Computes the full report.
pub fn build(
    snapshot: &Snapshot,
    period: Period,
    now: NaiveDateTime,
    order: SeriesOrder,
) -> AggregateReport {
    AggregateReport {
        period,
        totals: period_totals(snapshot, &period),
        expenses_by_category: expense_breakdown(snapshot, &period),
        income_by_category: income_breakdown(snapshot, &period),
        series: time_series(snapshot, &period, order),
        weekly: weekly_comparison(snapshot, now),
        top_products: top_products(snapshot, &period),
        activity: daily_activity(snapshot, now.date()),
        skipped: snapshot.skipped(),
    }
}

/// The dashboard for a single day: its totals and its records, newest first.
#[derive(Debug, Clone, Eq, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct DayReport {
    pub totals: PeriodTotals,
    pub transactions: Vec<Transaction>,
}

pub fn day_report(snapshot: &Snapshot, period: &Period) -> DayReport {
    let mut transactions: Vec<Transaction> = in_period(snapshot, period).cloned().collect();
    transactions.sort_by(|a, b| b.date().cmp(&a.date()));
    DayReport {
        totals: period_totals(snapshot, period),
        transactions,
    }
}
