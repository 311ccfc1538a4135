//! Amount type for handling monetary values with an optional currency symbol.
//!
//! This module provides the `Amount` type which wraps `Decimal` and handles parsing values that
//! may or may not include a currency symbol (`S/`, `$`) and thousands separators.

use crate::error::Res;
use anyhow::ensure;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::fmt::{Debug, Display, Formatter};
use std::iter::Sum;
use std::ops::{Add, AddAssign, Sub};
use std::str::FromStr;

/// Currency symbols that are accepted, and ignored, when parsing.
const SYMBOLS: &[&str] = &["S/.", "S/", "$"];

/// Decimal places a recorded amount or price may carry.
pub const MONEY_DECIMALS: u32 = 2;

/// Represents a monetary amount.
///
/// Amounts are always stored at full precision and only rounded to two decimals when displayed.
///
/// # Examples
///
/// ```
/// # use caja::model::Amount;
/// # use std::str::FromStr;
/// let amount = Amount::from_str("S/ 1,250.5").unwrap();
/// assert_eq!(amount.to_string(), "1250.50");
/// assert_eq!(amount.grouped(), "1,250.50");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Amount(Decimal);

impl Amount {
    pub const ZERO: Amount = Amount(Decimal::ZERO);

    /// Exclusive upper bound, 10^15, for a recorded amount or price. Sums of bounded amounts stay
    /// far below `Decimal::MAX`.
    pub const MAX: Amount = Amount(Decimal::from_parts(0xA4C6_8000, 0x0003_8D7E, 0, false, 0));

    pub const fn new(value: Decimal) -> Self {
        Self(value)
    }

    /// Returns the underlying Decimal value.
    pub fn value(&self) -> Decimal {
        self.0
    }

    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    /// Returns true if the amount is strictly greater than zero.
    pub fn is_positive(&self) -> bool {
        !self.is_zero() && self.0.is_sign_positive()
    }

    pub fn is_negative(&self) -> bool {
        !self.is_zero() && self.0.is_sign_negative()
    }

    /// `quantity × unit_price`, saturating at the bounds of `Decimal`.
    pub fn times(&self, quantity: u32) -> Amount {
        Amount(
            self.0
                .checked_mul(Decimal::from(quantity))
                .unwrap_or_else(|| self.saturated()),
        )
    }

    /// True for a value that can be recorded: positive, below `Amount::MAX` and with no more
    /// than two decimal places.
    pub fn is_money(&self) -> bool {
        self.is_positive() && *self < Amount::MAX && self.0.normalize().scale() <= MONEY_DECIMALS
    }

    /// Fails with a message naming `what` unless `is_money` holds.
    pub fn ensure_money(&self, what: &str) -> Res<()> {
        ensure!(
            self.is_positive(),
            "The {what} must be greater than zero, got {}",
            self.0
        );
        ensure!(
            *self < Amount::MAX,
            "The {what} {} is too large, it must be below {}",
            self.0,
            Amount::MAX.0
        );
        ensure!(
            self.0.normalize().scale() <= MONEY_DECIMALS,
            "The {what} {} has more than {MONEY_DECIMALS} decimal places",
            self.0
        );
        Ok(())
    }

    fn saturated(&self) -> Decimal {
        if self.0.is_sign_negative() {
            Decimal::MIN
        } else {
            Decimal::MAX
        }
    }

    /// The value rounded half-away-from-zero to two decimal places.
    pub fn rounded(&self) -> Decimal {
        self.0
            .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
    }

    /// Formats with two decimals and thousands separators, e.g. `-1,250.50`.
    pub fn grouped(&self) -> String {
        format_num::format_num!(",.2", self.rounded().to_f64().unwrap_or_default())
    }
}

/// An error that can occur when parsing strings into `Amount` values.
pub struct AmountError(rust_decimal::Error);

impl Debug for AmountError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        Debug::fmt(&self.0, f)
    }
}

impl Display for AmountError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        Display::fmt(&self.0, f)
    }
}

impl std::error::Error for AmountError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.0)
    }
}

impl FromStr for Amount {
    type Err = AmountError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let (negative, unsigned) = match trimmed.strip_prefix('-') {
            Some(rest) => (true, rest.trim_start()),
            None => (false, trimmed),
        };

        let without_symbol = SYMBOLS
            .iter()
            .find_map(|symbol| unsigned.strip_prefix(symbol))
            .unwrap_or(unsigned)
            .trim();

        let without_commas = without_symbol.replace(',', "");
        let value = Decimal::from_str(&without_commas).map_err(AmountError)?;
        Ok(Amount(if negative { -value } else { value }))
    }
}

impl Display for Amount {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2}", self.rounded())
    }
}

impl Serialize for Amount {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        // Full precision, so that a round trip through JSON or SQLite is lossless.
        serializer.serialize_str(&self.0.to_string())
    }
}

impl<'de> Deserialize<'de> for Amount {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Amount::from_str(&s).map_err(serde::de::Error::custom)
    }
}

impl From<Decimal> for Amount {
    fn from(value: Decimal) -> Self {
        Amount(value)
    }
}

impl From<u32> for Amount {
    fn from(value: u32) -> Self {
        Amount(Decimal::from(value))
    }
}

impl From<Amount> for Decimal {
    fn from(amount: Amount) -> Self {
        amount.0
    }
}

impl Add for Amount {
    type Output = Amount;

    fn add(self, rhs: Self) -> Self::Output {
        Amount(self.0.saturating_add(rhs.0))
    }
}

impl AddAssign for Amount {
    fn add_assign(&mut self, rhs: Self) {
        self.0 = self.0.saturating_add(rhs.0)
    }
}

impl Sub for Amount {
    type Output = Amount;

    fn sub(self, rhs: Self) -> Self::Output {
        Amount(self.0.saturating_sub(rhs.0))
    }
}

impl Sum for Amount {
    fn sum<I: Iterator<Item = Amount>>(iter: I) -> Self {
        iter.fold(Amount::ZERO, |acc, a| acc + a)
    }
}

impl<'a> Sum<&'a Amount> for Amount {
    fn sum<I: Iterator<Item = &'a Amount>>(iter: I) -> Self {
        iter.copied().sum()
    }
}
