//! Проверенные типы значений немецких платёжных файлов.
//!
//! Каждый числовой идентификатор реализует [`Identifier`], который даёт два
//! способа разбора:
//!
//! - [`Identifier::scan`]: мягкий разбор с начального индекса. Вместо ошибки
//!   он сообщает через [`Scan`], докуда дошёл, поэтому парсеры полей
//!   фиксированной ширины обходятся без управления потоком через ошибки.
//! - [`Identifier::parse`]: строгий разбор всей строки.
//!
//! # Пример
//!
//! ```
//! use bankdata::value::{BankCode, FormatStyle, Identifier};
//!
//! let code = BankCode::parse("2004 1111").unwrap();
//! assert_eq!(code.format(FormatStyle::Electronic), "20041111");
//! assert_eq!(code.format(FormatStyle::Letter), "2004 1111");
//! ```

mod account_number;
mod alphanumeric;
mod bank_code;
mod cache;
mod reference_number;
mod scan;

use std::fmt;
use std::str::FromStr;

pub use account_number::AccountNumber;
pub use alphanumeric::AlphaNumericText27;
pub use bank_code::BankCode;
pub use cache::ValueCache;
pub use reference_number::{ReferenceNumber10, ReferenceNumber11};
pub use scan::Scan;
use serde::{Deserialize, Serialize};

use crate::error::{ValueError, ValueResult};

/// Текстовое представление идентификатора.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FormatStyle {
    /// Цифры без разделителей, как в платёжных файлах.
    Electronic,
    /// Цифры, сгруппированные пробелами, как на письмах и бланках.
    Letter,
}

impl FormatStyle {
    /// Имя, которое принимает [`FromStr`].
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Electronic => "electronic",
            Self::Letter => "letter",
        }
    }
}

impl FromStr for FormatStyle {
    type Err = ValueError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "electronic" => Ok(Self::Electronic),
            "letter" => Ok(Self::Letter),
            _ => Err(ValueError::InvalidArgument(format!("unknown format style '{s}'"))),
        }
    }
}

impl fmt::Display for FormatStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Общий контракт ограниченных числовых идентификаторов.
///
/// Равенство, хеширование и порядок реализаций основаны только на
/// [`number`](Identifier::number).
pub trait Identifier: Sized + Copy + Ord {
    /// Читаемое имя типа для сообщений об ошибках.
    const KIND: &'static str;

    /// Наибольшее число цифр, которое принимают парсеры.
    const MAX_DIGITS: usize;

    /// Создаёт значение из числа, проверяя диапазон.
    ///
    /// # Ошибки
    ///
    /// [`ValueError::InvalidValue`], если `number` вне диапазона.
    fn from_number(number: u64) -> ValueResult<Self>;

    /// Числовое значение.
    fn number(self) -> u64;

    /// Выводит значение в заданном стиле.
    fn format(self, style: FormatStyle) -> String;

    /// Разбирает значение начиная с байтового индекса `start` в `text`.
    ///
    /// Цифры могут разделяться одиночными пробелами. Разбор останавливается в
    /// конце `text`. Любой другой символ, пробел не между цифрами, больше
    /// [`MAX_DIGITS`](Identifier::MAX_DIGITS) цифр или значение вне диапазона
    /// дают [`Scan::Failed`].
    fn scan(text: &str, start: usize) -> Scan<Self> {
        match scan::scan_digits(text, start, Self::MAX_DIGITS) {
            Scan::Parsed(number, next) => match Self::from_number(number) {
                Ok(value) => Scan::Parsed(value, next),
                Err(_) => Scan::Failed(start),
            },
            Scan::Failed(index) => Scan::Failed(index),
        }
    }

    /// Разбирает весь `text`.
    ///
    /// # Ошибки
    ///
    /// [`ValueError::Parse`], если разбор не удался или остановился до конца.
    fn parse(text: &str) -> ValueResult<Self> {
        match Self::scan(text, 0) {
            Scan::Parsed(value, next) if next == text.len() => Ok(value),
            Scan::Parsed(_, next) => Err(parse_error(Self::KIND, text, next)),
            Scan::Failed(index) => Err(parse_error(Self::KIND, text, index)),
        }
    }
}

pub(crate) fn parse_error(kind: &'static str, text: &str, error_index: usize) -> ValueError {
    ValueError::Parse { kind, input: text.to_string(), error_index }
}

pub(crate) fn invalid_value(kind: &'static str, value: impl ToString) -> ValueError {
    ValueError::InvalidValue { kind, value: value.to_string() }
}

/// Выводит `number` группами по три цифры справа.
pub(crate) fn group_by_thousands(number: u64) -> String {
    let digits = number.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(' ');
        }
        out.push(c);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn format_style_from_str() {
        assert_eq!("letter".parse::<FormatStyle>(), Ok(FormatStyle::Letter));
        assert_eq!("ELECTRONIC".parse::<FormatStyle>(), Ok(FormatStyle::Electronic));
        assert!(matches!("fax".parse::<FormatStyle>(), Err(ValueError::InvalidArgument(_))));
    }

    #[test]
    fn grouping_from_the_right() {
        assert_eq!(group_by_thousands(0), "0");
        assert_eq!(group_by_thousands(123), "123");
        assert_eq!(group_by_thousands(1234), "1 234");
        assert_eq!(group_by_thousands(1234567890), "1 234 567 890");
        assert_eq!(group_by_thousands(12345678901), "12 345 678 901");
    }
}
