//! Немецкий номер счёта (Kontonummer).

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::{FormatStyle, Identifier, group_by_thousands, invalid_value};
use crate::error::{ValueError, ValueResult};

/// Номер счёта из одной до десяти цифр.
///
/// Электронная форма без ведущих нулей; для писем цифры группируются по три
/// справа (`1 234 567 890`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u64", into = "u64")]
pub struct AccountNumber(u64);

impl AccountNumber {
    /// Наибольший допустимый номер счёта.
    pub const MAX: u64 = 9_999_999_999;

    /// Является ли `number` допустимым номером счёта.
    #[must_use]
    pub const fn is_valid(number: u64) -> bool {
        number > 0 && number <= Self::MAX
    }
}

impl Identifier for AccountNumber {
    const KIND: &'static str = "account number";
    const MAX_DIGITS: usize = 10;

    fn from_number(number: u64) -> ValueResult<Self> {
        if Self::is_valid(number) {
            Ok(Self(number))
        } else {
            Err(invalid_value(Self::KIND, number))
        }
    }

    fn number(self) -> u64 {
        self.0
    }

    fn format(self, style: FormatStyle) -> String {
        match style {
            FormatStyle::Electronic => self.0.to_string(),
            FormatStyle::Letter => group_by_thousands(self.0),
        }
    }
}

impl TryFrom<u64> for AccountNumber {
    type Error = ValueError;

    fn try_from(value: u64) -> Result<Self, Self::Error> {
        Self::from_number(value)
    }
}

impl From<AccountNumber> for u64 {
    fn from(number: AccountNumber) -> Self {
        number.0
    }
}

impl FromStr for AccountNumber {
    type Err = ValueError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for AccountNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formats() {
        let n = AccountNumber::from_number(1_234_567_890).unwrap();
        assert_eq!(n.format(FormatStyle::Electronic), "1234567890");
        assert_eq!(n.format(FormatStyle::Letter), "1 234 567 890");

        let n = AccountNumber::from_number(100).unwrap();
        assert_eq!(n.format(FormatStyle::Electronic), "100");
        assert_eq!(n.format(FormatStyle::Letter), "100");
    }

    #[test]
    fn round_trips_both_styles() {
        for value in [1u64, 10, 999, 1000, 4_711_000, 9_999_999_999] {
            let n = AccountNumber::from_number(value).unwrap();
            for style in [FormatStyle::Electronic, FormatStyle::Letter] {
                assert_eq!(AccountNumber::parse(&n.format(style)).unwrap(), n);
            }
        }
    }

    #[test]
    fn leading_zeros_are_accepted_on_input() {
        assert_eq!(AccountNumber::parse("0000004711").unwrap().number(), 4711);
    }

    #[test]
    fn rejects_zero_and_overlong() {
        assert!(AccountNumber::from_number(0).is_err());
        assert!(AccountNumber::parse("0").is_err());
        assert!(AccountNumber::parse("12345678901").is_err());
        assert!(AccountNumber::parse("1 234  567").is_err());
        assert!(AccountNumber::parse("12.34").is_err());
    }
}
