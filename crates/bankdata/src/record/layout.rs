//! Раскладка строк фиксированной ширины файла банковских кодов.
//!
//! Смещения считаются в символах декодированной строки, начиная с нуля.

use super::{BankRecord, ChangeLabel, FormatVersion};
use crate::error::RecordError;
use crate::value::{BankCode, FormatStyle, Identifier};

/// Положение поля в строке.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Field {
    /// Имя для сообщений об ошибках.
    pub name: &'static str,
    /// Смещение первого символа.
    pub start: usize,
    /// Число символов.
    pub len: usize,
}

impl Field {
    const fn new(name: &'static str, start: usize, len: usize) -> Self {
        Self { name, start, len }
    }

    /// Смещение сразу за последним символом.
    #[must_use]
    pub const fn end(&self) -> usize {
        self.start + self.len
    }
}

pub const BANK_CODE: Field = Field::new("bank code", 0, 8);
pub const HEAD_OFFICE: Field = Field::new("head office flag", 8, 1);
pub const NAME: Field = Field::new("name", 9, 58);
pub const POSTAL_CODE: Field = Field::new("postal code", 67, 5);
pub const CITY: Field = Field::new("city", 72, 35);
pub const DESCRIPTION: Field = Field::new("description", 107, 27);
pub const CLEARING_INSTITUTE: Field = Field::new("clearing institute number", 134, 5);
pub const BIC: Field = Field::new("BIC", 139, 11);
pub const VALIDATION_LABEL: Field = Field::new("validation label", 150, 2);
pub const SERIAL_NUMBER: Field = Field::new("serial number", 152, 6);
pub const CHANGE_LABEL: Field = Field::new("change label", 158, 1);
pub const MARKED_FOR_DELETION: Field = Field::new("marked-for-deletion flag", 159, 1);
pub const REPLACING_BANK_CODE: Field = Field::new("replacing bank code", 160, 8);
pub const IBAN_RULE_LABEL: Field = Field::new("IBAN rule label", 168, 4);
pub const IBAN_RULE_VERSION: Field = Field::new("IBAN rule version", 172, 2);

/// Поля раскладки June 2013 в порядке следования в строке.
pub const FIELDS: [Field; 15] = [
    BANK_CODE,
    HEAD_OFFICE,
    NAME,
    POSTAL_CODE,
    CITY,
    DESCRIPTION,
    CLEARING_INSTITUTE,
    BIC,
    VALIDATION_LABEL,
    SERIAL_NUMBER,
    CHANGE_LABEL,
    MARKED_FOR_DELETION,
    REPLACING_BANK_CODE,
    IBAN_RULE_LABEL,
    IBAN_RULE_VERSION,
];

/// Поля, присутствующие в строках формата `format`.
#[must_use]
pub fn fields(format: FormatVersion) -> &'static [Field] {
    &FIELDS[..format.field_count()]
}

struct Line {
    chars: Vec<char>,
}

impl Line {
    fn text(&self, field: Field) -> String {
        self.chars[field.start..field.end()].iter().collect::<String>().trim().to_string()
    }

    fn number(&self, field: Field) -> Result<u64, RecordError> {
        let text = self.text(field);
        if text.is_empty() || !text.bytes().all(|b| b.is_ascii_digit()) {
            return Err(invalid(field, text));
        }
        text.parse().map_err(|_| invalid(field, text))
    }

    fn optional_number(&self, field: Field) -> Result<Option<u64>, RecordError> {
        if self.text(field).is_empty() { Ok(None) } else { self.number(field).map(Some) }
    }
}

fn invalid(field: Field, value: String) -> RecordError {
    RecordError::InvalidField { field: field.name, value }
}

fn narrow<T: TryFrom<u64>>(field: Field, value: u64) -> Result<T, RecordError> {
    T::try_from(value).map_err(|_| invalid(field, value.to_string()))
}

impl BankRecord {
    /// Разбирает декодированную строку заданной раскладки.
    ///
    /// Метка изменения преобразуется, но даты не устанавливаются: они
    /// берутся из файла, которому принадлежит строка.
    ///
    /// # Ошибки
    ///
    /// [`RecordError`], если строка слишком короткая или поле некорректно.
    pub fn parse_line(line: &str, format: FormatVersion) -> Result<Self, RecordError> {
        let line = Line { chars: line.chars().collect() };
        let expected = format.line_length();
        if line.chars.len() < expected {
            return Err(RecordError::TooShort { format, expected, actual: line.chars.len() });
        }

        let code_text = line.text(BANK_CODE);
        let bank_code = BankCode::parse(&code_text).map_err(|_| invalid(BANK_CODE, code_text))?;

        let label_text = line.text(CHANGE_LABEL);
        let first = label_text.chars().next();
        let Some(change_label) = first.and_then(|c| ChangeLabel::try_from(c).ok()) else {
            return Err(RecordError::InvalidChangeLabel(label_text));
        };

        let replacing_bank_code = match line.optional_number(REPLACING_BANK_CODE)? {
            None | Some(0) => None,
            Some(n) => Some(
                BankCode::from_number(n)
                    .map_err(|_| invalid(REPLACING_BANK_CODE, line.text(REPLACING_BANK_CODE)))?,
            ),
        };

        let (iban_rule_label, iban_rule_version) = if format.has_iban_rule() {
            let label = line.optional_number(IBAN_RULE_LABEL)?;
            let version = line.optional_number(IBAN_RULE_VERSION)?;
            (
                label.map(|n| narrow::<u16>(IBAN_RULE_LABEL, n)).transpose()?,
                version.map(|n| narrow::<u8>(IBAN_RULE_VERSION, n)).transpose()?,
            )
        } else {
            (None, None)
        };

        let bic = line.text(BIC);

        Ok(Self {
            bank_code,
            head_office: line.text(HEAD_OFFICE) == "1",
            name: line.text(NAME),
            postal_code: narrow(POSTAL_CODE, line.number(POSTAL_CODE)?)?,
            city: line.text(CITY),
            description: line.text(DESCRIPTION),
            clearing_institute: narrow(
                CLEARING_INSTITUTE,
                line.optional_number(CLEARING_INSTITUTE)?.unwrap_or(0),
            )?,
            bic: (!bic.is_empty()).then_some(bic),
            validation_label: line.text(VALIDATION_LABEL),
            serial_number: narrow(SERIAL_NUMBER, line.number(SERIAL_NUMBER)?)?,
            change_label,
            marked_for_deletion: line.text(MARKED_FOR_DELETION) == "1",
            replacing_bank_code,
            iban_rule_label,
            iban_rule_version,
            creation_date: None,
            modification_date: None,
            deletion_date: None,
        })
    }

    /// Выводит запись строкой заданной раскладки без перевода строки.
    ///
    /// Текст длиннее поля обрезается. Поля правила IBAN пишутся только для
    /// раскладки June 2013.
    #[must_use]
    pub fn to_line(&self, format: FormatVersion) -> String {
        let mut out = String::with_capacity(format.line_length());
        out.push_str(&self.bank_code.format(FormatStyle::Electronic));
        out.push(if self.head_office { '1' } else { '2' });
        push_text(&mut out, &self.name, NAME);
        push_number(&mut out, u64::from(self.postal_code), POSTAL_CODE);
        push_text(&mut out, &self.city, CITY);
        push_text(&mut out, &self.description, DESCRIPTION);
        push_number(&mut out, u64::from(self.clearing_institute), CLEARING_INSTITUTE);
        push_text(&mut out, self.bic.as_deref().unwrap_or(""), BIC);
        push_text(&mut out, &self.validation_label, VALIDATION_LABEL);
        push_number(&mut out, u64::from(self.serial_number), SERIAL_NUMBER);
        out.push(self.change_label.as_char());
        out.push(if self.marked_for_deletion { '1' } else { '0' });
        push_number(
            &mut out,
            self.replacing_bank_code.map_or(0, |code| u64::from(code.get())),
            REPLACING_BANK_CODE,
        );
        if format.has_iban_rule() {
            match self.iban_rule_label {
                Some(label) => push_number(&mut out, u64::from(label), IBAN_RULE_LABEL),
                None => push_text(&mut out, "", IBAN_RULE_LABEL),
            }
            match self.iban_rule_version {
                Some(version) => push_number(&mut out, u64::from(version), IBAN_RULE_VERSION),
                None => push_text(&mut out, "", IBAN_RULE_VERSION),
            }
        }
        out
    }
}

fn push_text(out: &mut String, text: &str, field: Field) {
    let mut written = 0;
    for c in text.chars().take(field.len) {
        out.push(c);
        written += 1;
    }
    out.extend(std::iter::repeat_n(' ', field.len - written));
}

fn push_number(out: &mut String, value: u64, field: Field) {
    out.push_str(&format!("{value:0width$}", width = field.len));
}
