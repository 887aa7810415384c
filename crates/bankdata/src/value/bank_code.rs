//! Немецкий банковский код (Bankleitzahl).

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::{FormatStyle, Identifier, invalid_value};
use crate::error::{ValueError, ValueResult};

/// Восьмизначный немецкий банковский код.
///
/// Допустимые значения лежат в `10000000..=99999999`.
///
/// # Пример
///
/// ```
/// use bankdata::value::{BankCode, FormatStyle, Identifier};
///
/// let code = BankCode::from_number(10020030).unwrap();
/// assert_eq!(code.format(FormatStyle::Letter), "1002 0030");
/// assert!(BankCode::from_number(9999999).is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub struct BankCode(u32);

impl BankCode {
    /// Наименьший допустимый банковский код.
    pub const MIN: u32 = 10_000_000;
    /// Наибольший допустимый банковский код.
    pub const MAX: u32 = 99_999_999;

    /// Является ли `number` допустимым банковским кодом.
    #[must_use]
    pub const fn is_valid(number: u64) -> bool {
        number >= Self::MIN as u64 && number <= Self::MAX as u64
    }

    /// Код как `u32`.
    #[must_use]
    pub const fn get(self) -> u32 {
        self.0
    }
}

impl Identifier for BankCode {
    const KIND: &'static str = "bank code";
    const MAX_DIGITS: usize = 8;

    fn from_number(number: u64) -> ValueResult<Self> {
        if Self::is_valid(number) {
            Ok(Self(number as u32))
        } else {
            Err(invalid_value(Self::KIND, number))
        }
    }

    fn number(self) -> u64 {
        u64::from(self.0)
    }

    fn format(self, style: FormatStyle) -> String {
        match style {
            FormatStyle::Electronic => format!("{:08}", self.0),
            FormatStyle::Letter => format!("{:04} {:04}", self.0 / 10_000, self.0 % 10_000),
        }
    }
}

impl TryFrom<u32> for BankCode {
    type Error = ValueError;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        Self::from_number(u64::from(value))
    }
}

impl From<BankCode> for u32 {
    fn from(code: BankCode) -> Self {
        code.0
    }
}

impl FromStr for BankCode {
    type Err = ValueError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for BankCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:08}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::Scan;

    #[test]
    fn range_bounds() {
        assert!(BankCode::from_number(10_000_000).is_ok());
        assert!(BankCode::from_number(99_999_999).is_ok());
        assert!(BankCode::from_number(0).is_err());
        assert!(BankCode::from_number(9_999_999).is_err());
        assert!(BankCode::from_number(100_000_000).is_err());
    }

    #[test]
    fn round_trips_both_styles() {
        for n in [10_000_000u64, 20_041_111, 37_040_044, 99_999_999] {
            let code = BankCode::from_number(n).unwrap();
            for style in [FormatStyle::Electronic, FormatStyle::Letter] {
                let parsed = BankCode::parse(&code.format(style)).unwrap();
                assert_eq!(parsed, code);
                assert_eq!(parsed.number(), n);
            }
        }
    }

    #[test]
    fn rejects_malformed_input() {
        for input in ["", "0", "00000000", "1234567", "123456789", "1234  5678", "1234-5678"] {
            let err = BankCode::parse(input).unwrap_err();
            assert!(matches!(err, ValueError::Parse { .. }), "{input}: {err:?}");
        }
    }

    #[test]
    fn scan_reports_position() {
        assert_eq!(BankCode::scan("BLZ 12345678", 4), Scan::Parsed(BankCode(12345678), 12));
        // девять цифр: девятая и есть ошибочный символ
        assert_eq!(BankCode::scan("123456789", 0), Scan::Failed(8));
        // вне диапазона: значение отклоняется целиком с начальной позиции
        assert_eq!(BankCode::scan("x01234567", 1), Scan::Failed(1));
    }

    #[test]
    fn ordering_follows_number() {
        let a = BankCode::parse("10000000").unwrap();
        let b = BankCode::parse("2000 0000").unwrap();
        assert!(a < b);
        assert_eq!(a.max(b), b);
    }

    #[test]
    fn serde_as_number() {
        let code = BankCode::parse("20041111").unwrap();
        assert_eq!(serde_json::to_string(&code).unwrap(), "20041111");
        assert!(serde_json::from_str::<BankCode>("123").is_err());
    }
}
