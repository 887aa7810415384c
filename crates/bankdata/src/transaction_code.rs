//! Текстовые ключи (Textschlüssel) платёжных файлов DTAUS.
//!
//! Код состоит из двузначного ключа и трёхзначного расширения, которые
//! записываются вместе как `KKEEE`. Коды с переменным расширением подходят
//! под любое расширение своего ключа.

use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{ValueError, ValueResult};

/// Текстовый ключ платежа.
///
/// Равенство, хеширование и порядок учитывают только ключ и расширение.
///
/// # Пример
///
/// ```
/// use bankdata::transaction_code::TransactionCode;
///
/// let code: TransactionCode = "05000".parse().unwrap();
/// assert_eq!(code.key(), 5);
/// assert_eq!(code.to_string(), "05000");
/// ```
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(try_from = "RawTransactionCode")]
pub struct TransactionCode {
    key: u8,
    extension: u16,
    debit: bool,
    remittance: bool,
    variable: bool,
}

#[derive(Deserialize)]
struct RawTransactionCode {
    key: u8,
    extension: u16,
    #[serde(default)]
    debit: bool,
    #[serde(default)]
    remittance: bool,
    #[serde(default)]
    variable: bool,
}

impl TryFrom<RawTransactionCode> for TransactionCode {
    type Error = ValueError;

    fn try_from(raw: RawTransactionCode) -> Result<Self, Self::Error> {
        let mut code = Self::new(raw.key, raw.extension)?;
        code.debit = raw.debit;
        code.remittance = raw.remittance;
        code.variable = raw.variable;
        Ok(code)
    }
}

impl TransactionCode {
    /// Наибольший ключ.
    pub const MAX_KEY: u8 = 99;
    /// Наибольшее расширение.
    pub const MAX_EXTENSION: u16 = 999;

    const KIND: &'static str = "transaction code";

    /// Создаёт код без флагов.
    ///
    /// # Ошибки
    ///
    /// [`ValueError::InvalidValue`], если ключ или расширение вне диапазона.
    pub fn new(key: u8, extension: u16) -> ValueResult<Self> {
        let mut code =
            Self { key: 0, extension: 0, debit: false, remittance: false, variable: false };
        code.set_key(key)?;
        code.set_extension(extension)?;
        Ok(code)
    }

    /// Двузначный ключ.
    #[must_use]
    pub fn key(&self) -> u8 {
        self.key
    }

    /// Трёхзначное расширение.
    #[must_use]
    pub fn extension(&self) -> u16 {
        self.extension
    }

    /// Обозначает ли код дебет.
    #[must_use]
    pub fn is_debit(&self) -> bool {
        self.debit
    }

    /// Обозначает ли код перевод.
    #[must_use]
    pub fn is_remittance(&self) -> bool {
        self.remittance
    }

    /// Может ли расширение принимать любое значение.
    #[must_use]
    pub fn is_variable(&self) -> bool {
        self.variable
    }

    /// Устанавливает ключ.
    ///
    /// # Ошибки
    ///
    /// [`ValueError::InvalidValue`], если `key` больше [`Self::MAX_KEY`].
    pub fn set_key(&mut self, key: u8) -> ValueResult<()> {
        if key > Self::MAX_KEY {
            return Err(ValueError::InvalidValue {
                kind: Self::KIND,
                value: format!("key {key}"),
            });
        }
        self.key = key;
        Ok(())
    }

    /// Устанавливает расширение.
    ///
    /// # Ошибки
    ///
    /// [`ValueError::InvalidValue`], если `extension` больше
    /// [`Self::MAX_EXTENSION`].
    pub fn set_extension(&mut self, extension: u16) -> ValueResult<()> {
        if extension > Self::MAX_EXTENSION {
            return Err(ValueError::InvalidValue {
                kind: Self::KIND,
                value: format!("extension {extension}"),
            });
        }
        self.extension = extension;
        Ok(())
    }

    /// Помечает код как дебет.
    pub fn set_debit(&mut self, debit: bool) {
        self.debit = debit;
    }

    /// Помечает код как перевод.
    pub fn set_remittance(&mut self, remittance: bool) {
        self.remittance = remittance;
    }

    /// Помечает расширение как переменное.
    pub fn set_variable(&mut self, variable: bool) {
        self.variable = variable;
    }

    /// Обозначает ли этот код `key` и `extension`.
    #[must_use]
    pub fn matches(&self, key: u8, extension: u16) -> bool {
        self.key == key && (self.variable || self.extension == extension)
    }

    fn sort_key(&self) -> (u8, u16) {
        (self.key, self.extension)
    }
}

impl PartialEq for TransactionCode {
    fn eq(&self, other: &Self) -> bool {
        self.sort_key() == other.sort_key()
    }
}

impl Eq for TransactionCode {}

impl Hash for TransactionCode {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.sort_key().hash(state);
    }
}

impl PartialOrd for TransactionCode {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for TransactionCode {
    fn cmp(&self, other: &Self) -> Ordering {
        self.sort_key().cmp(&other.sort_key())
    }
}

impl fmt::Display for TransactionCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}{:03}", self.key, self.extension)
    }
}

impl FromStr for TransactionCode {
    type Err = ValueError;

    /// Разбирает ровно пять цифр `KKEEE`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parse_error = |error_index| ValueError::Parse {
            kind: Self::KIND,
            input: s.to_string(),
            error_index,
        };
        if let Some(index) = s.find(|c: char| !c.is_ascii_digit()) {
            return Err(parse_error(index));
        }
        if s.len() != 5 {
            return Err(parse_error(s.len().min(5)));
        }
        let key = s[..2].parse().map_err(|_| parse_error(0))?;
        let extension = s[2..].parse().map_err(|_| parse_error(2))?;
        Self::new(key, extension)
    }
}

/// Набор известных текстовых ключей.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<TransactionCode>", into = "Vec<TransactionCode>")]
pub struct TransactionCodes {
    codes: Vec<TransactionCode>,
}

impl TransactionCodes {
    /// Создаёт набор; из дубликатов ключа и расширения остаётся первый.
    #[must_use]
    pub fn new(codes: impl IntoIterator<Item = TransactionCode>) -> Self {
        let mut codes: Vec<_> = codes.into_iter().collect();
        codes.sort();
        codes.dedup();
        Self { codes }
    }

    /// Стандартные коды DTAUS.
    #[must_use]
    pub fn dtaus() -> Self {
        let entries: [(u8, u16, bool, bool); 7] = [
            (4, 0, true, false),
            (5, 0, true, false),
            (5, 5, true, false),
            (51, 0, false, true),
            (53, 0, false, true),
            (54, 0, false, true),
            (56, 0, false, true),
        ];
        Self::new(entries.into_iter().filter_map(|(key, extension, debit, remittance)| {
            let mut code = TransactionCode::new(key, extension).ok()?;
            code.set_debit(debit);
            code.set_remittance(remittance);
            code.set_variable(key == 54);
            Some(code)
        }))
    }

    /// Ищет код для `key` и `extension`; точное совпадение важнее кода с
    /// переменным расширением.
    #[must_use]
    pub fn find(&self, key: u8, extension: u16) -> Option<&TransactionCode> {
        self.codes
            .iter()
            .find(|code| code.key == key && code.extension == extension)
            .or_else(|| self.codes.iter().find(|code| code.matches(key, extension)))
    }

    /// Коды дебета по порядку.
    pub fn debits(&self) -> impl Iterator<Item = &TransactionCode> {
        self.codes.iter().filter(|code| code.debit)
    }

    /// Коды перевода по порядку.
    pub fn remittances(&self) -> impl Iterator<Item = &TransactionCode> {
        self.codes.iter().filter(|code| code.remittance)
    }

    /// Все коды по порядку.
    pub fn iter(&self) -> impl Iterator<Item = &TransactionCode> {
        self.codes.iter()
    }

    /// Число кодов.
    #[must_use]
    pub fn len(&self) -> usize {
        self.codes.len()
    }

    /// Пуст ли набор.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.codes.is_empty()
    }
}

impl From<Vec<TransactionCode>> for TransactionCodes {
    fn from(codes: Vec<TransactionCode>) -> Self {
        Self::new(codes)
    }
}

impl From<TransactionCodes> for Vec<TransactionCode> {
    fn from(codes: TransactionCodes) -> Self {
        codes.codes
    }
}

impl FromIterator<TransactionCode> for TransactionCodes {
    fn from_iter<I: IntoIterator<Item = TransactionCode>>(iter: I) -> Self {
        Self::new(iter)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validates_ranges() {
        assert!(TransactionCode::new(99, 999).is_ok());
        assert!(matches!(TransactionCode::new(100, 0), Err(ValueError::InvalidValue { .. })));
        assert!(TransactionCode::new(5, 1000).is_err());

        let mut code = TransactionCode::new(5, 0).unwrap();
        assert!(code.set_extension(1000).is_err());
        assert_eq!(code.extension(), 0);
    }

    #[test]
    fn equality_ignores_flags() {
        let plain = TransactionCode::new(51, 0).unwrap();
        let mut flagged = plain;
        flagged.set_remittance(true);
        assert_eq!(plain, flagged);
        assert!(TransactionCode::new(5, 5).unwrap() < TransactionCode::new(51, 0).unwrap());
        assert!(TransactionCode::new(5, 0).unwrap() < TransactionCode::new(5, 5).unwrap());
    }

    #[test]
    fn parses_five_digits() {
        let code: TransactionCode = "54123".parse().unwrap();
        assert_eq!((code.key(), code.extension()), (54, 123));
        assert_eq!(code.to_string(), "54123");

        assert!(matches!(
            "5412x".parse::<TransactionCode>(),
            Err(ValueError::Parse { error_index: 4, .. })
        ));
        assert!(matches!(
            "541".parse::<TransactionCode>(),
            Err(ValueError::Parse { error_index: 3, .. })
        ));
        assert!("541234".parse::<TransactionCode>().is_err());
    }

    #[test]
    fn variable_extension_matches_any() {
        let codes = TransactionCodes::dtaus();
        let vl = codes.find(54, 7).unwrap();
        assert!(vl.is_variable());
        assert_eq!(vl.extension(), 0);

        assert_eq!(codes.find(5, 5).unwrap().extension(), 5);
        assert!(codes.find(5, 6).is_none());
        assert!(codes.find(99, 0).is_none());
    }

    #[test]
    fn filters_by_kind() {
        let codes = TransactionCodes::dtaus();
        let debits: Vec<String> = codes.debits().map(ToString::to_string).collect();
        assert_eq!(debits, ["04000", "05000", "05005"]);
        assert_eq!(codes.remittances().count(), 4);
        assert_eq!(codes.len(), 7);
    }

    #[test]
    fn deserializes_with_validation() {
        let codes: TransactionCodes = serde_json::from_str(
            r#"[{"key": 51, "extension": 0, "remittance": true},
                {"key": 5, "extension": 0, "debit": true}]"#,
        )
        .unwrap();
        assert_eq!(codes.iter().next().unwrap().key(), 5);
        assert!(codes.find(51, 0).unwrap().is_remittance());

        let invalid = serde_json::from_str::<TransactionCode>(r#"{"key": 5, "extension": 1000}"#);
        assert!(invalid.is_err());
    }
}
