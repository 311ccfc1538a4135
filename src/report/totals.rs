use crate::model::{Amount, Snapshot, Transaction, TransactionKind};
use crate::report::Period;
use serde::{Deserialize, Serialize};

/// Sales, expenses and their difference over a period.
#[derive(Debug, Clone, Copy, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct PeriodTotals {
    pub sales: Amount,
    pub expenses: Amount,
    /// `sales - expenses`, may be negative.
    pub balance: Amount,
}

impl PeriodTotals {
    pub(crate) fn add(&mut self, transaction: &Transaction) {
        match transaction.kind() {
            TransactionKind::Sale => self.sales += transaction.amount(),
            TransactionKind::Expense => self.expenses += transaction.amount(),
        }
        self.balance = self.sales - self.expenses;
    }
}

/// The transactions of `snapshot` that fall within `period`, in snapshot order.
pub fn in_period<'a>(
    snapshot: &'a Snapshot,
    period: &'a Period,
) -> impl Iterator<Item = &'a Transaction> + 'a {
    snapshot
        .transactions()
        .iter()
        .filter(move |t| period.contains(&t.date()))
}

/// Sums sales and expenses within `period`. An empty or reversed period yields zeros.
pub fn period_totals(snapshot: &Snapshot, period: &Period) -> PeriodTotals {
    in_period(snapshot, period).fold(PeriodTotals::default(), |mut totals, t| {
        totals.add(t);
        totals
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{parse_timestamp, ExpenseCategory};
    use chrono::NaiveDate;
    use rust_decimal::Decimal;

    fn snapshot() -> Snapshot {
        Snapshot::new(
            vec![
                Transaction::sale_without_items("s1", parse_timestamp("2024-03-01").unwrap(), Amount::from(45)),
                Transaction::expense(
                    "e1",
                    parse_timestamp("2024-03-01 18:30").unwrap(),
                    Amount::from(20),
                    ExpenseCategory::Utilities,
                    None,
                ),
                Transaction::sale_without_items("s2", parse_timestamp("2024-03-02").unwrap(), Amount::from(7)),
            ],
            vec![],
            vec![],
        )
    }

    #[test]
    fn test_single_day_scenario() {
        let period = Period::parse("2024-03-01", "2024-03-01").unwrap();
        let totals = period_totals(&snapshot(), &period);
        assert_eq!(totals.sales.value(), Decimal::from(45));
        assert_eq!(totals.expenses.value(), Decimal::from(20));
        assert_eq!(totals.balance.value(), Decimal::from(25));
    }

    #[test]
    fn test_reversed_range_is_zero() {
        let period = Period::parse("2024-03-02", "2024-03-01").unwrap();
        assert_eq!(period_totals(&snapshot(), &period), PeriodTotals::default());
    }

    #[test]
    fn test_empty_snapshot_is_zero() {
        let day = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
        let totals = period_totals(&Snapshot::default(), &Period::day(day));
        assert_eq!(totals, PeriodTotals::default());
    }

    #[test]
    fn test_negative_balance() {
        let period = Period::parse("2024-03-01", "2024-03-01").unwrap();
        let snapshot = Snapshot::new(
            vec![Transaction::expense(
                "e1",
                parse_timestamp("2024-03-01").unwrap(),
                Amount::from(12),
                ExpenseCategory::SuppliesPackaging,
                None,
            )],
            vec![],
            vec![],
        );
        assert_eq!(
            period_totals(&snapshot, &period).balance.value(),
            Decimal::from(-12)
        );
    }

    #[test]
    fn test_oversized_amounts_are_quarantined() {
        let period = Period::parse("2024-03-01", "2024-03-01").unwrap();
        let oversized = |id: &str, value: Decimal| {
            Transaction::expense(
                id,
                parse_timestamp("2024-03-01 12:00").unwrap(),
                Amount::from(value),
                ExpenseCategory::Utilities,
                None,
            )
        };
        let mut transactions = snapshot().transactions().to_vec();
        transactions.push(oversized("max1", Decimal::MAX));
        transactions.push(oversized("max2", Decimal::MAX));
        transactions.push(oversized("precise", Decimal::new(20001, 3)));
        let snapshot = Snapshot::new(transactions, vec![], vec![]);

        assert_eq!(snapshot.skipped(), 3);
        let totals = period_totals(&snapshot, &period);
        assert_eq!(totals.sales.value(), Decimal::from(45));
        assert_eq!(totals.expenses.value(), Decimal::from(20));
        assert_eq!(totals.balance.value(), Decimal::from(25));
    }

    #[test]
    fn test_largest_recordable_amounts_do_not_overflow() {
        let period = Period::parse("2024-03-01", "2024-03-01").unwrap();
        let largest = Amount::from(Decimal::new(99_999_999_999_999_999, 2));
        let transactions: Vec<Transaction> = (0..1000)
            .map(|i| {
                Transaction::sale_without_items(
                    format!("s{i}"),
                    parse_timestamp("2024-03-01 08:00").unwrap(),
                    largest,
                )
            })
            .collect();
        let snapshot = Snapshot::new(transactions, vec![], vec![]);
        assert_eq!(snapshot.skipped(), 0);
        let totals = period_totals(&snapshot, &period);
        assert_eq!(totals.sales.value(), largest.value() * Decimal::from(1000));
        assert_eq!(totals.balance, totals.sales);
    }
}
