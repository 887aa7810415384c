//! Номера платёжных ссылок (Referenznummer10 и Referenznummer11).

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::{FormatStyle, Identifier, group_by_thousands, invalid_value};
use crate::error::{ValueError, ValueResult};

/// Номер ссылки не более чем из десяти цифр, `0..=9999999999`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u64", into = "u64")]
pub struct ReferenceNumber10(u64);

/// Номер ссылки не более чем из одиннадцати цифр, `0..=99999999999`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u64", into = "u64")]
pub struct ReferenceNumber11(u64);

impl ReferenceNumber10 {
    /// Наибольшее допустимое значение.
    pub const MAX: u64 = 9_999_999_999;
}

impl ReferenceNumber11 {
    /// Наибольшее допустимое значение.
    pub const MAX: u64 = 99_999_999_999;
}

impl Identifier for ReferenceNumber10 {
    const KIND: &'static str = "reference number (10 digits)";
    const MAX_DIGITS: usize = 10;

    fn from_number(number: u64) -> ValueResult<Self> {
        if number <= Self::MAX { Ok(Self(number)) } else { Err(invalid_value(Self::KIND, number)) }
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

impl Identifier for ReferenceNumber11 {
    const KIND: &'static str = "reference number (11 digits)";
    const MAX_DIGITS: usize = 11;

    fn from_number(number: u64) -> ValueResult<Self> {
        if number <= Self::MAX { Ok(Self(number)) } else { Err(invalid_value(Self::KIND, number)) }
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

impl TryFrom<u64> for ReferenceNumber10 {
    type Error = ValueError;

    fn try_from(value: u64) -> Result<Self, Self::Error> {
        Self::from_number(value)
    }
}

impl TryFrom<u64> for ReferenceNumber11 {
    type Error = ValueError;

    fn try_from(value: u64) -> Result<Self, Self::Error> {
        Self::from_number(value)
    }
}

impl From<ReferenceNumber10> for u64 {
    fn from(number: ReferenceNumber10) -> Self {
        number.0
    }
}

impl From<ReferenceNumber11> for u64 {
    fn from(number: ReferenceNumber11) -> Self {
        number.0
    }
}

impl FromStr for ReferenceNumber10 {
    type Err = ValueError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl FromStr for ReferenceNumber11 {
    type Err = ValueError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for ReferenceNumber10 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Display for ReferenceNumber11 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_is_a_valid_reference() {
        assert_eq!(ReferenceNumber10::parse("0").unwrap().number(), 0);
        assert_eq!(ReferenceNumber11::from_number(0).unwrap().format(FormatStyle::Letter), "0");
    }

    #[test]
    fn digit_limits() {
        assert!(ReferenceNumber10::parse("9999999999").is_ok());
        assert!(ReferenceNumber10::parse("10000000000").is_err());
        assert!(ReferenceNumber11::parse("99 999 999 999").is_ok());
        assert!(ReferenceNumber11::parse("100000000000").is_err());
        assert!(ReferenceNumber11::from_number(ReferenceNumber11::MAX + 1).is_err());
    }

    #[test]
    fn round_trips_both_styles() {
        for value in [0u64, 7, 1_000, 123_456_789, 9_999_999_999] {
            let r10 = ReferenceNumber10::from_number(value).unwrap();
            let r11 = ReferenceNumber11::from_number(value * 10).unwrap();
            for style in [FormatStyle::Electronic, FormatStyle::Letter] {
                assert_eq!(ReferenceNumber10::parse(&r10.format(style)).unwrap(), r10);
                assert_eq!(ReferenceNumber11::parse(&r11.format(style)).unwrap(), r11);
            }
        }
    }

    #[test]
    fn letter_format_of_eleven_digits() {
        let r = ReferenceNumber11::from_number(12_345_678_901).unwrap();
        assert_eq!(r.format(FormatStyle::Letter), "12 345 678 901");
    }
}
