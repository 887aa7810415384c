//! Буквенно-цифровое текстовое поле DTAUS длиной до 27 символов.

use std::fmt;
use std::str::FromStr;
use std::sync::{Arc, LazyLock};

use serde::{Deserialize, Serialize};

use super::{Scan, ValueCache, parse_error};
use crate::error::{ValueError, ValueResult};

static CACHE: LazyLock<ValueCache<AlphaNumericText27>> =
    LazyLock::new(|| ValueCache::new(AlphaNumericText27::CACHE_CAPACITY));

/// Текст из алфавита DTAUS длиной не более 27 символов.
///
/// Алфавит: буквы от `A` до `Z`, цифры, пробел, знаки `. , & - / + * $ %`
/// и немецкие буквы `Ä Ö Ü ß`.
///
/// Одинаковые тексты, разобранные повторно, разделяют одну аллокацию, пока
/// остаются в общем для процесса кеше.
///
/// # Пример
///
/// ```
/// use bankdata::value::AlphaNumericText27;
///
/// assert!(AlphaNumericText27::parse("Müller").is_err());
/// let text = AlphaNumericText27::parse_normalized("Müller GmbH").unwrap();
/// assert_eq!(text.as_str(), "MÜLLER GMBH");
/// ```
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct AlphaNumericText27(Arc<str>);

impl AlphaNumericText27 {
    /// Наибольшее число символов.
    pub const MAX_LENGTH: usize = 27;

    const KIND: &'static str = "alphanumeric text";
    const CACHE_CAPACITY: usize = 4096;

    /// Принадлежит ли `c` алфавиту DTAUS.
    #[must_use]
    pub fn is_valid_char(c: char) -> bool {
        matches!(
            c,
            'A'..='Z'
                | '0'..='9'
                | ' '
                | '.'
                | ','
                | '&'
                | '-'
                | '/'
                | '+'
                | '*'
                | '$'
                | '%'
                | 'Ä'
                | 'Ö'
                | 'Ü'
                | 'ß'
        )
    }

    /// Разбирает текст с байтового индекса `start` до конца `text`.
    ///
    /// Останавливается на первом символе вне алфавита или на символе,
    /// превышающем [`MAX_LENGTH`](Self::MAX_LENGTH).
    pub fn scan(text: &str, start: usize) -> Scan<Self> {
        let Some(rest) = text.get(start..) else {
            return Scan::Failed(start);
        };
        for (count, (offset, c)) in rest.char_indices().enumerate() {
            if count >= Self::MAX_LENGTH || !Self::is_valid_char(c) {
                return Scan::Failed(start + offset);
            }
        }
        Scan::Parsed(Self::intern(rest), text.len())
    }

    /// Разбирает весь `text` без изменений.
    ///
    /// # Ошибки
    ///
    /// [`ValueError::Parse`] на символах вне алфавита или слишком длинном
    /// вводе.
    pub fn parse(text: &str) -> ValueResult<Self> {
        match Self::scan(text, 0) {
            Scan::Parsed(value, _) => Ok(value),
            Scan::Failed(index) => Err(parse_error(Self::KIND, text, index)),
        }
    }

    /// Нормализует `text` и разбирает результат.
    ///
    /// # Ошибки
    ///
    /// [`ValueError::Parse`], если нормализованный текст всё ещё слишком длинный.
    pub fn parse_normalized(text: &str) -> ValueResult<Self> {
        Self::parse(&Self::normalize(text))
    }

    /// Преобразование в алфавит DTAUS с потерями.
    ///
    /// Буквы переводятся в верхний регистр, распространённые буквы с
    /// диакритикой и знаки заменяются ближайшими из алфавита, всё остальное
    /// становится пробелом. Длина не меняется.
    #[must_use]
    pub fn normalize(text: &str) -> String {
        text.chars().map(normalize_char).collect()
    }

    /// Текст.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Текст; есть для симметрии с числовыми идентификаторами.
    #[must_use]
    pub fn format(&self) -> &str {
        &self.0
    }

    /// Пуст ли текст или состоит только из пробелов.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.trim().is_empty()
    }

    /// Число символов.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.chars().count()
    }

    fn intern(text: &str) -> Self {
        CACHE.get_or_insert_with(text, || Self(Arc::from(text)))
    }
}

fn normalize_char(c: char) -> char {
    match c {
        'ä' | 'Ä' => 'Ä',
        'ö' | 'Ö' => 'Ö',
        'ü' | 'Ü' => 'Ü',
        'à' | 'á' | 'â' | 'ã' | 'å' | 'À' | 'Á' | 'Â' | 'Ã' | 'Å' => 'A',
        'ç' | 'Ç' => 'C',
        'è' | 'é' | 'ê' | 'ë' | 'È' | 'É' | 'Ê' | 'Ë' => 'E',
        'ì' | 'í' | 'î' | 'ï' | 'Ì' | 'Í' | 'Î' | 'Ï' => 'I',
        'ñ' | 'Ñ' => 'N',
        'ò' | 'ó' | 'ô' | 'õ' | 'ø' | 'Ò' | 'Ó' | 'Ô' | 'Õ' | 'Ø' => 'O',
        'ù' | 'ú' | 'û' | 'Ù' | 'Ú' | 'Û' => 'U',
        'ý' | 'ÿ' | 'Ý' => 'Y',
        '_' => '-',
        ';' => ',',
        ':' | '!' | '?' => '.',
        c if c.is_ascii_lowercase() => c.to_ascii_uppercase(),
        c if AlphaNumericText27::is_valid_char(c) => c,
        _ => ' ',
    }
}

impl TryFrom<String> for AlphaNumericText27 {
    type Error = ValueError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<AlphaNumericText27> for String {
    fn from(text: AlphaNumericText27) -> Self {
        text.0.to_string()
    }
}

impl FromStr for AlphaNumericText27 {
    type Err = ValueError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for AlphaNumericText27 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl fmt::Debug for AlphaNumericText27 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("AlphaNumericText27").field(&&*self.0).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_alphabet() {
        let text = AlphaNumericText27::parse("RECHNUNG 4711/2024 + 5%").unwrap();
        assert_eq!(text.as_str(), "RECHNUNG 4711/2024 + 5%");
        assert!(AlphaNumericText27::parse("ÄÖÜß").is_ok());
    }

    #[test]
    fn rejects_lowercase_and_overlong() {
        let err = AlphaNumericText27::parse("ABc").unwrap_err();
        assert_eq!(
            err,
            ValueError::Parse { kind: "alphanumeric text", input: "ABc".into(), error_index: 2 }
        );

        let long = "A".repeat(28);
        assert!(matches!(
            AlphaNumericText27::parse(&long),
            Err(ValueError::Parse { error_index: 27, .. })
        ));
        assert!(AlphaNumericText27::parse(&"A".repeat(27)).is_ok());
    }

    #[test]
    fn normalize_is_lossy_but_valid() {
        assert_eq!(AlphaNumericText27::normalize("Café (Köln)"), "CAFE  KÖLN ");
        assert_eq!(AlphaNumericText27::normalize("a_b;c:d"), "A-B,C.D");
        let text = AlphaNumericText27::parse_normalized("straße 1").unwrap();
        assert_eq!(text.as_str(), "STRAßE 1");
    }

    #[test]
    fn emptiness_ignores_spaces() {
        assert!(AlphaNumericText27::parse("").unwrap().is_empty());
        assert!(AlphaNumericText27::parse("   ").unwrap().is_empty());
        assert!(!AlphaNumericText27::parse(" X ").unwrap().is_empty());
    }

    #[test]
    fn repeated_parses_share_storage() {
        let a = AlphaNumericText27::parse("SHARED STORAGE TEST").unwrap();
        let b = AlphaNumericText27::parse("SHARED STORAGE TEST").unwrap();
        assert_eq!(a, b);
        assert!(Arc::ptr_eq(&a.0, &b.0));
    }

    #[test]
    fn ordering_by_content() {
        let a = AlphaNumericText27::parse("ABC").unwrap();
        let b = AlphaNumericText27::parse("ABD").unwrap();
        assert!(a < b);
    }

    #[test]
    fn scan_from_offset() {
        let scan = AlphaNumericText27::scan("xxHELLO", 2);
        assert_eq!(scan.value().unwrap().as_str(), "HELLO");
        assert_eq!(AlphaNumericText27::scan("xxHeLLO", 2).error_index(), Some(3));
    }
}
