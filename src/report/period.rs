use crate::error::Res;
use anyhow::Context;
use chrono::{Datelike, Days, NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

/// An inclusive range of local calendar days.
///
/// A timestamp belongs to the period when it falls between `start` at 00:00:00.000 and `end` at
/// 23:59:59.999. A period whose `start` is after its `end` contains nothing.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct Period {
    start: NaiveDate,
    end: NaiveDate,
}

impl Period {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        Self { start, end }
    }

    /// Parses two `YYYY-MM-DD` strings.
    pub fn parse(start: &str, end: &str) -> Res<Self> {
        let parse = |s: &str| {
            NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d")
                .with_context(|| format!("Expected a date like 2024-03-01, got '{s}'"))
        };
        Ok(Self::new(parse(start)?, parse(end)?))
    }

    pub fn day(day: NaiveDate) -> Self {
        Self::new(day, day)
    }

    /// The `days` calendar days ending with, and including, `today`.
    pub fn trailing_days(today: NaiveDate, days: u64) -> Self {
        let start = today
            .checked_sub_days(Days::new(days.saturating_sub(1)))
            .unwrap_or(NaiveDate::MIN);
        Self::new(start, today)
    }

    /// Monday through Sunday of the week that contains `day`.
    pub fn week_of(day: NaiveDate) -> Self {
        let monday = start_of_week(day);
        Self::new(monday, monday + Days::new(6))
    }

    /// The calendar month that contains `day`.
    pub fn month_of(day: NaiveDate) -> Self {
        let start = day.with_day(1).unwrap_or(day);
        let end = start
            .checked_add_months(chrono::Months::new(1))
            .and_then(|next| next.pred_opt())
            .unwrap_or(day);
        Self::new(start, end)
    }

    pub fn start(&self) -> NaiveDate {
        self.start
    }

    pub fn end(&self) -> NaiveDate {
        self.end
    }

    pub fn is_empty(&self) -> bool {
        self.start > self.end
    }

    /// 00:00:00.000 on the first day.
    pub fn start_bound(&self) -> NaiveDateTime {
        self.start.and_time(NaiveTime::MIN)
    }

    /// 23:59:59.999 on the last day.
    pub fn end_bound(&self) -> NaiveDateTime {
        self.end.and_time(end_of_day())
    }

    pub fn contains(&self, ts: &NaiveDateTime) -> bool {
        *ts >= self.start_bound() && *ts <= self.end_bound()
    }

    /// Every day of the period, in order. Empty when the period is empty.
    pub fn days(&self) -> impl Iterator<Item = NaiveDate> {
        let end = self.end;
        self.start.iter_days().take_while(move |d| *d <= end)
    }
}

impl Display for Period {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        if self.start == self.end {
            write!(f, "{}", self.start)
        } else {
            write!(f, "{} to {}", self.start, self.end)
        }
    }
}

/// Monday 00:00 of the ISO week that contains `day`. Sunday belongs to the week that started six
/// days earlier.
pub fn start_of_week(day: NaiveDate) -> NaiveDate {
    let offset = u64::from(day.weekday().num_days_from_monday());
    day - Days::new(offset)
}

fn end_of_day() -> NaiveTime {
    NaiveTime::from_hms_milli_opt(23, 59, 59, 999).unwrap_or(NaiveTime::MIN)
}
