use crate::model::{Amount, Snapshot};
use crate::report::start_of_week;
use chrono::{Days, NaiveDateTime, NaiveTime};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Sales of the current week against the previous one.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct WeeklyComparison {
    pub this_week: Amount,
    pub last_week: Amount,
    /// Unrounded. Defined as 100 when last week had no sales but this week did, and 0 when
    /// neither had any.
    pub percentage_change: Decimal,
}

/// `(this - last) / last × 100`, never dividing by zero. A change too large for `Decimal`
/// saturates at `Decimal::MAX` or `Decimal::MIN`.
pub fn percentage_change(this_week: Amount, last_week: Amount) -> Decimal {
    if last_week.is_positive() {
        let difference = (this_week - last_week).value();
        difference
            .checked_div(last_week.value())
            .and_then(|ratio| ratio.checked_mul(Decimal::ONE_HUNDRED))
            .unwrap_or(if difference.is_sign_negative() {
                Decimal::MIN
            } else {
                Decimal::MAX
            })
    } else if this_week.is_positive() {
        Decimal::ONE_HUNDRED
    } else {
        Decimal::ZERO
    }
}

/// Compares sales in [this Monday 00:00, next Monday 00:00) with sales in
/// [last Monday 00:00, this Monday 00:00), where "this" is the week containing `now`.
pub fn weekly_comparison(snapshot: &Snapshot, now: NaiveDateTime) -> WeeklyComparison {
    let this_start = start_of_week(now.date()).and_time(NaiveTime::MIN);
    let next_start = this_start + Days::new(7);
    let last_start = this_start - Days::new(7);

    let mut this_week = Amount::ZERO;
    let mut last_week = Amount::ZERO;
    for t in snapshot.transactions().iter().filter(|t| t.is_sale()) {
        let date = t.date();
        if date >= this_start && date < next_start {
            this_week += t.amount();
        } else if date >= last_start && date < this_start {
            last_week += t.amount();
        }
    }

    WeeklyComparison {
        this_week,
        last_week,
        percentage_change: percentage_change(this_week, last_week),
    }
}
