//! Daily income/expense points with a running balance, for charting.

use crate::model::{Amount, Snapshot, TransactionKind};
use crate::report::{in_period, Period};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// The order in which days appear in the series.
#[derive(Debug, Clone, Copy, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SeriesOrder {
    /// Days appear in the order they are first encountered in the snapshot. Since the datastore
    /// loads newest first, this is usually reverse-chronological.
    #[default]
    FirstSeen,
    /// Days appear in calendar order.
    Chronological,
}

serde_plain::derive_display_from_serialize!(SeriesOrder);
serde_plain::derive_fromstr_from_deserialize!(SeriesOrder);

/// One day of the series.
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct SeriesPoint {
    /// Short local date, e.g. `1/3` for the first of March.
    pub label: String,
    pub date: NaiveDate,
    pub income: Amount,
    pub expense: Amount,
    /// Running total of `income - expense` over this and all preceding points.
    pub balance: Amount,
}

/// The short label used for a day, `d/m` without padding.
pub fn day_label(date: NaiveDate) -> String {
    date.format("%-d/%-m").to_string()
}

/// Buckets the transactions of `period` by local calendar day and accumulates a running balance.
///
/// Points are keyed by their label. With `SeriesOrder::FirstSeen` the points keep the order in
/// which each label is first met while walking the snapshot, so the result is only a true
/// timeline when the snapshot is sorted oldest first.
pub fn time_series(snapshot: &Snapshot, period: &Period, order: SeriesOrder) -> Vec<SeriesPoint> {
    let mut points: Vec<SeriesPoint> = Vec::new();
    for t in in_period(snapshot, period) {
        let label = day_label(t.day());
        let ix = match points.iter().position(|p| p.label == label) {
            Some(ix) => ix,
            None => {
                points.push(SeriesPoint {
                    label,
                    date: t.day(),
                    income: Amount::ZERO,
                    expense: Amount::ZERO,
                    balance: Amount::ZERO,
                });
                points.len() - 1
            }
        };
        match t.kind() {
            TransactionKind::Sale => points[ix].income += t.amount(),
            TransactionKind::Expense => points[ix].expense += t.amount(),
        }
    }

    if order == SeriesOrder::Chronological {
        points.sort_by_key(|p| p.date);
    }

    let mut running = Amount::ZERO;
    for point in points.iter_mut() {
        running += point.income - point.expense;
        point.balance = running;
    }
    points
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{parse_timestamp, ExpenseCategory, Transaction};
    use rust_decimal::Decimal;

    fn sale(id: &str, date: &str, amount: u32) -> Transaction {
        Transaction::sale_without_items(id, parse_timestamp(date).unwrap(), Amount::from(amount))
    }

    fn expense(id: &str, date: &str, amount: u32) -> Transaction {
        Transaction::expense(
            id,
            parse_timestamp(date).unwrap(),
            Amount::from(amount),
            ExpenseCategory::SuppliesPackaging,
            None,
        )
    }

    fn period() -> Period {
        Period::parse("2024-03-01", "2024-03-31").unwrap()
    }

    #[test]
    fn test_daily_buckets_and_running_balance() {
        let snapshot = Snapshot::new(
            vec![
                sale("s1", "2024-03-01 09:00", 45),
                expense("e1", "2024-03-01 10:00", 20),
                sale("s2", "2024-03-02 09:00", 30),
                expense("e2", "2024-03-03 09:00", 50),
            ],
            vec![],
            vec![],
        );
        let series = time_series(&snapshot, &period(), SeriesOrder::FirstSeen);
        let labels: Vec<&str> = series.iter().map(|p| p.label.as_str()).collect();
        assert_eq!(labels, vec!["1/3", "2/3", "3/3"]);
        assert_eq!(series[0].income.value(), Decimal::from(45));
        assert_eq!(series[0].expense.value(), Decimal::from(20));
        assert_eq!(series[0].balance.value(), Decimal::from(25));
        assert_eq!(series[1].balance.value(), Decimal::from(55));
        assert_eq!(series[2].balance.value(), Decimal::from(5));
    }

    #[test]
    fn test_first_seen_order_is_preserved() {
        // Newest first, as loaded from the datastore.
        let snapshot = Snapshot::new(
            vec![
                sale("s3", "2024-03-03", 3),
                sale("s1", "2024-03-01", 1),
                sale("s2", "2024-03-02", 2),
                sale("s4", "2024-03-03 18:00", 10),
            ],
            vec![],
            vec![],
        );
        let series = time_series(&snapshot, &period(), SeriesOrder::FirstSeen);
        let labels: Vec<&str> = series.iter().map(|p| p.label.as_str()).collect();
        assert_eq!(labels, vec!["3/3", "1/3", "2/3"]);
        assert_eq!(series[0].income.value(), Decimal::from(13));
        assert_eq!(series[0].balance.value(), Decimal::from(13));
        assert_eq!(series[1].balance.value(), Decimal::from(14));
        assert_eq!(series[2].balance.value(), Decimal::from(16));
    }

    #[test]
    fn test_chronological_order() {
        let snapshot = Snapshot::new(
            vec![
                sale("s3", "2024-03-03", 3),
                expense("e1", "2024-03-01", 1),
                sale("s2", "2024-03-02", 2),
            ],
            vec![],
            vec![],
        );
        let series = time_series(&snapshot, &period(), SeriesOrder::Chronological);
        let labels: Vec<&str> = series.iter().map(|p| p.label.as_str()).collect();
        assert_eq!(labels, vec!["1/3", "2/3", "3/3"]);
        assert_eq!(series[0].balance.value(), Decimal::from(-1));
        assert_eq!(series[2].balance.value(), Decimal::from(4));
    }

    #[test]
    fn test_outside_period_ignored() {
        let snapshot = Snapshot::new(vec![sale("s1", "2024-04-01", 3)], vec![], vec![]);
        assert!(time_series(&snapshot, &period(), SeriesOrder::FirstSeen).is_empty());
    }

    #[test]
    fn test_order_from_str() {
        use std::str::FromStr;
        assert_eq!(
            SeriesOrder::from_str("chronological").unwrap(),
            SeriesOrder::Chronological
        );
    }
}
