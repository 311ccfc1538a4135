use crate::model::{Amount, Snapshot, TransactionKind};
use crate::report::Period;
use chrono::{NaiveDate, Weekday};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// The number of days shown in the activity histogram.
pub const ACTIVITY_DAYS: u64 = 7;

/// Sales and expenses of a single day.
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct DayActivity {
    pub date: NaiveDate,
    pub weekday: Weekday,
    pub sales: Amount,
    pub expenses: Amount,
    /// `(sales + expenses) / max_total`, in `[0, 1]`.
    pub fraction: Decimal,
}

impl DayActivity {
    pub fn total(&self) -> Amount {
        self.sales + self.expenses
    }
}

/// A histogram of the trailing week, oldest day first.
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct DailyActivity {
    pub days: Vec<DayActivity>,
    /// The largest daily `sales + expenses`, or 1 when every day is empty.
    pub max_total: Amount,
}

/// Per-day sales and expenses for the seven days ending with `today`, with each day's combined
/// total normalized against the busiest day.
pub fn daily_activity(snapshot: &Snapshot, today: NaiveDate) -> DailyActivity {
    let period = Period::trailing_days(today, ACTIVITY_DAYS);
    let mut sums: HashMap<NaiveDate, (Amount, Amount)> = HashMap::new();
    for t in snapshot
        .transactions()
        .iter()
        .filter(|t| period.contains(&t.date()))
    {
        let entry = sums.entry(t.day()).or_default();
        match t.kind() {
            TransactionKind::Sale => entry.0 += t.amount(),
            TransactionKind::Expense => entry.1 += t.amount(),
        }
    }

    let mut days: Vec<DayActivity> = period
        .days()
        .map(|date| {
            let (sales, expenses) = sums.get(&date).copied().unwrap_or_default();
            DayActivity {
                date,
                weekday: chrono::Datelike::weekday(&date),
                sales,
                expenses,
                fraction: Decimal::ZERO,
            }
        })
        .collect();

    let max_total = days
        .iter()
        .map(DayActivity::total)
        .max()
        .filter(|max| max.is_positive())
        .unwrap_or(Amount::from(1));
    for day in days.iter_mut() {
        day.fraction = day
            .total()
            .value()
            .checked_div(max_total.value())
            .unwrap_or(Decimal::ONE);
    }

    DailyActivity { days, max_total }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{parse_timestamp, ExpenseCategory, Transaction};
    use crate::report::period_totals;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, 7).unwrap()
    }

    fn snapshot() -> Snapshot {
        Snapshot::new(
            vec![
                Transaction::sale_without_items(
                    "s1",
                    parse_timestamp("2024-03-07 09:00").unwrap(),
                    Amount::from(30),
                ),
                Transaction::expense(
                    "e1",
                    parse_timestamp("2024-03-07 12:00").unwrap(),
                    Amount::from(10),
                    ExpenseCategory::Utilities,
                    None,
                ),
                Transaction::sale_without_items(
                    "s2",
                    parse_timestamp("2024-03-01 00:00").unwrap(),
                    Amount::from(20),
                ),
                Transaction::sale_without_items(
                    "too-old",
                    parse_timestamp("2024-02-29 23:59").unwrap(),
                    Amount::from(999),
                ),
            ],
            vec![],
            vec![],
        )
    }

    #[test]
    fn test_seven_days_oldest_first() {
        let activity = daily_activity(&snapshot(), today());
        assert_eq!(activity.days.len(), 7);
        assert_eq!(activity.days[0].date, NaiveDate::from_ymd_opt(2024, 3, 1).unwrap());
        assert_eq!(activity.days[6].date, today());
        assert_eq!(activity.days[6].weekday, Weekday::Thu);
    }

    #[test]
    fn test_normalized_against_busiest_day() {
        let activity = daily_activity(&snapshot(), today());
        assert_eq!(activity.max_total.value(), Decimal::from(40));
        assert_eq!(activity.days[6].fraction, Decimal::ONE);
        assert_eq!(activity.days[0].fraction, Decimal::new(5, 1));
        assert_eq!(activity.days[3].fraction, Decimal::ZERO);
    }

    #[test]
    fn test_empty_week_uses_one_as_max() {
        let activity = daily_activity(&Snapshot::default(), today());
        assert_eq!(activity.max_total.value(), Decimal::ONE);
        assert!(activity.days.iter().all(|d| d.fraction.is_zero()));
    }

    #[test]
    fn test_sales_sum_matches_period_totals() {
        let snapshot = snapshot();
        let activity = daily_activity(&snapshot, today());
        let sales: Amount = activity.days.iter().map(|d| d.sales).sum();
        let period = Period::trailing_days(today(), ACTIVITY_DAYS);
        assert_eq!(sales, period_totals(&snapshot, &period).sales);
    }
}
