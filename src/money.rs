//! Money amounts stored as integer minor units (cents).
//!
//! Amounts entered by users arrive as decimal strings and are converted to
//! cents without going through a float, so `0.1 + 0.2` style drift never
//! reaches the database.

use std::{
    fmt::Display,
    iter::Sum,
    ops::{Add, Sub},
};

use serde::{Deserialize, Serialize};

/// An amount of money in cents.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Cents(i64);

/// The reasons a string could not be read as an amount of money.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum ParseAmountError {
    /// The string was empty or only whitespace.
    #[error("amount is empty")]
    Empty,
    /// The string is not a plain decimal number.
    #[error("amount is not a number")]
    NotANumber,
    /// The amount does not fit into 64 bits of cents.
    #[error("amount is too large")]
    Overflow,
}

impl Cents {
    /// Zero cents.
    pub const ZERO: Cents = Cents(0);

    /// Create an amount from a number of cents.
    pub const fn new(cents: i64) -> Self {
        Self(cents)
    }

    /// The raw number of cents.
    pub const fn as_i64(self) -> i64 {
        self.0
    }

    /// The amount in major units (e.g., dollars) as a float for display and ratios.
    pub fn as_major(self) -> f64 {
        self.0 as f64 / 100.0
    }

    /// Parse a decimal string such as `"12.5"`, `"-3"` or `"19.995"` into cents.
    ///
    /// Digits past the second decimal place are rounded half away from zero on the
    /// exact decimal digits, e.g. `"19.995"` becomes 2000 cents and `"19.994"`
    /// becomes 1999 cents.
    ///
    /// # Errors
    /// Returns a [ParseAmountError] if `input` is empty, is not a decimal number,
    /// or is too large.
    pub fn parse(input: &str) -> Result<Self, ParseAmountError> {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return Err(ParseAmountError::Empty);
        }

        let (is_negative, rest) = match trimmed.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, trimmed.strip_prefix('+').unwrap_or(trimmed)),
        };

        let (major_str, fraction_str) = match rest.split_once('.') {
            Some((major, fraction)) => (major, fraction),
            None => (rest, ""),
        };

        // "5." and ".5" are accepted, "." on its own is not.
        if major_str.is_empty() && fraction_str.is_empty() {
            return Err(ParseAmountError::NotANumber);
        }

        let all_digits = |s: &str| s.chars().all(|c| c.is_ascii_digit());
        if !all_digits(major_str) || !all_digits(fraction_str) {
            return Err(ParseAmountError::NotANumber);
        }

        let major: i64 = if major_str.is_empty() {
            0
        } else {
            major_str.parse().map_err(|_| ParseAmountError::Overflow)?
        };

        let mut fraction_digits = fraction_str.bytes().map(|b| i64::from(b - b'0'));
        let tenths = fraction_digits.next().unwrap_or(0);
        let hundredths = fraction_digits.next().unwrap_or(0);
        let round_up = fraction_digits.next().is_some_and(|digit| digit >= 5);

        let cents = major
            .checked_mul(100)
            .and_then(|cents| cents.checked_add(tenths * 10 + hundredths + i64::from(round_up)))
            .ok_or(ParseAmountError::Overflow)?;

        Ok(Self(if is_negative { -cents } else { cents }))
    }

    /// Convert a float amount in major units to cents, rounding half away from zero.
    ///
    /// Prefer [Cents::parse] for user input; this exists for values that only
    /// exist as floats, such as numbers in a JSON config.
    pub fn from_f64(amount: f64) -> Self {
        Self((amount * 100.0).round() as i64)
    }
}

impl Display for Cents {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let abs = self.0.unsigned_abs();

        write!(f, "{sign}{}.{:02}", abs / 100, abs % 100)
    }
}

impl Add for Cents {
    type Output = Cents;

    fn add(self, rhs: Self) -> Self::Output {
        Cents(self.0 + rhs.0)
    }
}

impl Sub for Cents {
    type Output = Cents;

    fn sub(self, rhs: Self) -> Self::Output {
        Cents(self.0 - rhs.0)
    }
}

impl Sum for Cents {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Cents::ZERO, Add::add)
    }
}

#[cfg(test)]
mod tests {
    use super::{Cents, ParseAmountError};

    #[test]
    fn parses_whole_and_fractional_amounts() {
        assert_eq!(Cents::parse("12"), Ok(Cents::new(1200)));
        assert_eq!(Cents::parse("12.5"), Ok(Cents::new(1250)));
        assert_eq!(Cents::parse(" 7.60 "), Ok(Cents::new(760)));
        assert_eq!(Cents::parse(".5"), Ok(Cents::new(50)));
        assert_eq!(Cents::parse("5."), Ok(Cents::new(500)));
        assert_eq!(Cents::parse("+3.00"), Ok(Cents::new(300)));
    }

    #[test]
    fn rounds_half_away_from_zero() {
        assert_eq!(Cents::parse("19.995"), Ok(Cents::new(2000)));
        assert_eq!(Cents::parse("19.994"), Ok(Cents::new(1999)));
        assert_eq!(Cents::parse("0.005"), Ok(Cents::new(1)));
        assert_eq!(Cents::parse("-0.005"), Ok(Cents::new(-1)));
        assert_eq!(Cents::parse("0.0049999"), Ok(Cents::new(0)));
    }

    #[test]
    fn rejects_non_numbers() {
        assert_eq!(Cents::parse(""), Err(ParseAmountError::Empty));
        assert_eq!(Cents::parse("   "), Err(ParseAmountError::Empty));
        assert_eq!(Cents::parse("."), Err(ParseAmountError::NotANumber));
        assert_eq!(Cents::parse("abc"), Err(ParseAmountError::NotANumber));
        assert_eq!(Cents::parse("1.2.3"), Err(ParseAmountError::NotANumber));
        assert_eq!(Cents::parse("1e3"), Err(ParseAmountError::NotANumber));
        assert_eq!(Cents::parse("--1"), Err(ParseAmountError::NotANumber));
    }

    #[test]
    fn rejects_overflow() {
        assert_eq!(
            Cents::parse("99999999999999999999"),
            Err(ParseAmountError::Overflow)
        );
    }

    #[test]
    fn from_f64_rounds_to_nearest_cent() {
        assert_eq!(Cents::from_f64(15.0), Cents::new(1500));
        assert_eq!(Cents::from_f64(0.1 + 0.2), Cents::new(30));
    }

    #[test]
    fn displays_with_two_decimal_places() {
        assert_eq!(Cents::new(510).to_string(), "5.10");
        assert_eq!(Cents::new(5).to_string(), "0.05");
        assert_eq!(Cents::new(-1250).to_string(), "-12.50");
        assert_eq!(Cents::ZERO.to_string(), "0.00");
    }

    #[test]
    fn sums_amounts() {
        let total: Cents = [Cents::new(1250), Cents::new(760)].into_iter().sum();

        assert_eq!(total, Cents::new(2010));
        assert_eq!(total - Cents::new(1500), Cents::new(510));
    }
}
