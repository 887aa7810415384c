//! Записи файла банковских кодов Бундесбанка.
//!
//! Одна [`BankRecord`] описывает головной офис или филиал банка. Записи
//! читаются из строк фиксированной ширины, раскладка которых зависит от
//! [`FormatVersion`] файла (см. [`layout`]).

pub mod layout;

use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::value::BankCode;

/// Версия раскладки файла банковских кодов.
///
/// Версии упорядочены: файл можно обновить только файлом той же или более
/// новой раскладки.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum FormatVersion {
    /// Тринадцать полей, 168 символов в строке.
    #[serde(rename = "june2006")]
    June2006,
    /// Пятнадцать полей вместе с правилом IBAN, 174 символа в строке.
    #[serde(rename = "june2013")]
    June2013,
}

impl FormatVersion {
    /// Имя версии в конфигурации.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::June2006 => "june2006",
            Self::June2013 => "june2013",
        }
    }

    /// Число полей в строке.
    #[must_use]
    pub const fn field_count(&self) -> usize {
        match self {
            Self::June2006 => 13,
            Self::June2013 => 15,
        }
    }

    /// Число символов в строке.
    #[must_use]
    pub const fn line_length(&self) -> usize {
        match self {
            Self::June2006 => layout::REPLACING_BANK_CODE.end(),
            Self::June2013 => layout::IBAN_RULE_VERSION.end(),
        }
    }

    /// Содержат ли строки поля правила IBAN.
    #[must_use]
    pub const fn has_iban_rule(&self) -> bool {
        matches!(self, Self::June2013)
    }
}

impl FromStr for FormatVersion {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "june2006" => Ok(Self::June2006),
            "june2013" => Ok(Self::June2013),
            _ => Err(format!("unknown format version '{s}', expected june2006 or june2013")),
        }
    }
}

impl fmt::Display for FormatVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Изменение записи относительно предыдущего файла.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ChangeLabel {
    /// Новая запись.
    #[serde(rename = "A")]
    Added,
    /// Изменённая запись.
    #[serde(rename = "M")]
    Modified,
    /// Запись, которая будет удалена следующим файлом.
    #[serde(rename = "D")]
    Deleted,
    /// Запись без изменений.
    #[serde(rename = "U")]
    Unchanged,
}

impl ChangeLabel {
    /// Символ метки в файле.
    #[must_use]
    pub const fn as_char(&self) -> char {
        match self {
            Self::Added => 'A',
            Self::Modified => 'M',
            Self::Deleted => 'D',
            Self::Unchanged => 'U',
        }
    }
}

impl TryFrom<char> for ChangeLabel {
    type Error = char;

    fn try_from(value: char) -> Result<Self, Self::Error> {
        match value {
            'A' => Ok(Self::Added),
            'M' => Ok(Self::Modified),
            'D' => Ok(Self::Deleted),
            'U' => Ok(Self::Unchanged),
            other => Err(other),
        }
    }
}

impl fmt::Display for ChangeLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_char())
    }
}

/// Одна строка файла банковских кодов.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BankRecord {
    /// Банковский код, общий для головного офиса и его филиалов.
    pub bank_code: BankCode,
    /// `true` для головного офиса, `false` для филиала.
    pub head_office: bool,
    /// Название банка.
    pub name: String,
    /// Почтовый индекс офиса.
    pub postal_code: u32,
    /// Город офиса.
    pub city: String,
    /// Краткое описание для бланков.
    pub description: String,
    /// Номер клирингового института (PAN), `0`, если его нет.
    pub clearing_institute: u32,
    /// Код идентификации бизнеса (BIC).
    pub bic: Option<String>,
    /// Метод контрольной цифры номеров счетов банка.
    pub validation_label: String,
    /// Номер, идентифицирующий запись во всех файлах.
    pub serial_number: u32,
    /// Изменение относительно предыдущего файла.
    pub change_label: ChangeLabel,
    /// Объявил ли банк об удалении кода.
    pub marked_for_deletion: bool,
    /// Банковский код, который нужно использовать после удаления этого.
    pub replacing_bank_code: Option<BankCode>,
    /// Номер правила IBAN (раскладка June 2013).
    pub iban_rule_label: Option<u16>,
    /// Версия правила IBAN (раскладка June 2013).
    pub iban_rule_version: Option<u8>,
    /// Дата начала действия файла, добавившего запись.
    pub creation_date: Option<NaiveDate>,
    /// Дата начала действия файла, последним изменившего запись.
    pub modification_date: Option<NaiveDate>,
    /// Дата окончания действия файла, удалившего запись.
    pub deletion_date: Option<NaiveDate>,
}

impl BankRecord {
    /// Помечена ли запись к удалению.
    #[must_use]
    pub fn is_deleted(&self) -> bool {
        self.change_label == ChangeLabel::Deleted
    }

    /// Берёт у `previous` даты, которые эта запись не задаёт сама.
    pub(crate) fn inherit_history(mut self, previous: &BankRecord) -> Self {
        self.creation_date = self.creation_date.or(previous.creation_date);
        self.modification_date = self.modification_date.or(previous.modification_date);
        self.deletion_date = self.deletion_date.or(previous.deletion_date);
        self
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    //! Построители записей для модульных тестов.

    use super::*;
    use crate::value::Identifier;

    pub(crate) fn record(serial: u32, code: u32, label: ChangeLabel) -> BankRecord {
        BankRecord {
            bank_code: BankCode::from_number(u64::from(code)).unwrap(),
            head_office: true,
            name: format!("Bank {code}"),
            postal_code: 10115,
            city: "Berlin".to_string(),
            description: format!("Bank {code} Berlin"),
            clearing_institute: 0,
            bic: Some("MARKDEF1100".to_string()),
            validation_label: "09".to_string(),
            serial_number: serial,
            change_label: label,
            marked_for_deletion: false,
            replacing_bank_code: None,
            iban_rule_label: None,
            iban_rule_version: None,
            creation_date: None,
            modification_date: None,
            deletion_date: None,
        }
    }

    pub(crate) fn branch(serial: u32, code: u32, label: ChangeLabel) -> BankRecord {
        let city = "Potsdam".to_string();
        BankRecord { head_office: false, city, ..record(serial, code, label) }
    }

    pub(crate) fn replaced_by(mut rec: BankRecord, code: u32) -> BankRecord {
        rec.replacing_bank_code = Some(BankCode::from_number(u64::from(code)).unwrap());
        rec
    }

    /// Превращает записи в тело файла заданной раскладки.
    pub(crate) fn file_text(format: FormatVersion, records: &[BankRecord]) -> String {
        records.iter().map(|r| format!("{}\n", r.to_line(format))).collect()
    }

    pub(crate) fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }
}
