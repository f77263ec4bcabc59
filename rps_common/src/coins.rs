use std::{
    fmt::Display,
    iter::Sum,
    ops::{Add, AddAssign, Mul, Neg, Sub, SubAssign},
    str::FromStr,
};

use serde::{Deserialize, Serialize};
use sqlx::Type;
use thiserror::Error;

use crate::op;

pub const COIN_CURRENCY_CODE: &str = "CF";
pub const CENTS_PER_COIN: i64 = 100;

//--------------------------------------       Coins         ---------------------------------------------------------
/// An in-game balance amount. Stored in hundredths of a coin so that two decimal places are always exact.
#[derive(Debug, Clone, Copy, Default, Type, PartialEq, Eq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
#[sqlx(transparent)]
pub struct Coins(i64);

op!(binary Coins, Add, add);
op!(binary Coins, Sub, sub);
op!(inplace Coins, AddAssign, add_assign);
op!(inplace Coins, SubAssign, sub_assign);
op!(unary Coins, Neg, neg);

impl Mul<i64> for Coins {
    type Output = Self;

    fn mul(self, rhs: i64) -> Self::Output {
        Self::from(self.value() * rhs)
    }
}

impl Sum for Coins {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::default(), Add::add)
    }
}

impl<'a> Sum<&'a Coins> for Coins {
    fn sum<I: Iterator<Item = &'a Self>>(iter: I) -> Self {
        iter.copied().sum()
    }
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("Value cannot be represented as a coin amount: {0}")]
pub struct CoinsConversionError(String);

impl From<i64> for Coins {
    /// Interprets `value` as hundredths of a coin.
    fn from(value: i64) -> Self {
        Self(value)
    }
}

impl TryFrom<u64> for Coins {
    type Error = CoinsConversionError;

    fn try_from(value: u64) -> Result<Self, Self::Error> {
        i64::try_from(value)
            .map(Self)
            .map_err(|_| CoinsConversionError(format!("Value {value} is too large to convert to Coins")))
    }
}

impl Display for Coins {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let abs = self.0.unsigned_abs();
        let cents = CENTS_PER_COIN.unsigned_abs();
        write!(f, "{sign}{}.{:02} {COIN_CURRENCY_CODE}", abs / cents, abs % cents)
    }
}

impl FromStr for Coins {
    type Err = CoinsConversionError;

    /// Parses a decimal amount of whole coins, e.g. `"10"`, `"12.5"` or `"0.05"`. At most two decimal places are
    /// accepted. A trailing currency code is ignored.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let value = s.trim();
        let value = value.strip_suffix(COIN_CURRENCY_CODE).map(str::trim_end).unwrap_or(value);
        let invalid = || CoinsConversionError(format!("'{s}' is not a valid coin amount"));
        let (negative, digits) = match value.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, value),
        };
        let (whole, frac) = digits.split_once('.').unwrap_or((digits, ""));
        if (whole.is_empty() && frac.is_empty()) || frac.len() > 2 {
            return Err(invalid());
        }
        if !whole.bytes().chain(frac.bytes()).all(|b| b.is_ascii_digit()) {
            return Err(invalid());
        }
        let whole = if whole.is_empty() { 0 } else { whole.parse::<i64>().map_err(|_| invalid())? };
        let frac = match frac.len() {
            0 => 0,
            1 => frac.parse::<i64>().map_err(|_| invalid())? * 10,
            _ => frac.parse::<i64>().map_err(|_| invalid())?,
        };
        let cents = whole.checked_mul(CENTS_PER_COIN).and_then(|c| c.checked_add(frac)).ok_or_else(invalid)?;
        Ok(Self(if negative { -cents } else { cents }))
    }
}

impl Coins {
    /// The raw amount, in hundredths of a coin.
    pub fn value(&self) -> i64 {
        self.0
    }

    pub fn from_whole(coins: i64) -> Self {
        Self(coins * CENTS_PER_COIN)
    }

    pub fn is_zero(&self) -> bool {
        self.0 == 0
    }

    pub fn is_positive(&self) -> bool {
        self.0 > 0
    }

    pub fn is_negative(&self) -> bool {
        self.0 < 0
    }
}
