//! Типы ошибок библиотеки банковских данных.

use std::path::PathBuf;

use thiserror::Error;

use crate::record::{BankRecord, ChangeLabel, FormatVersion};
use crate::value::BankCode;

/// Ошибки создания и разбора валидируемых значений.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValueError {
    /// Значение нарушает диапазон или допустимый набор символов своего типа.
    #[error("invalid {kind}: {value}")]
    InvalidValue {
        /// Имя типа значения.
        kind: &'static str,
        /// Ошибочное значение в текстовом виде.
        value: String,
    },

    /// Строгий разбор не удался или не прочитал весь ввод.
    #[error("cannot parse {kind} from '{input}': error at index {error_index}")]
    Parse {
        /// Имя типа значения.
        kind: &'static str,
        /// Полный входной текст.
        input: String,
        /// Байтовый индекс, на котором разбор остановился.
        error_index: usize,
    },

    /// Аргумент вне допустимого набора, например неизвестный стиль форматирования.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
}

/// Ошибки отдельных полей строки фиксированной ширины.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RecordError {
    /// Строка заканчивается раньше последнего поля раскладки.
    #[error("line has {actual} characters, layout {format} needs {expected}")]
    TooShort {
        /// Раскладка файла.
        format: FormatVersion,
        /// Требуемое число символов.
        expected: usize,
        /// Фактическое число символов.
        actual: usize,
    },

    /// Поле не удалось преобразовать в его тип.
    #[error("invalid {field}: '{value}'")]
    InvalidField {
        /// Имя поля из таблицы раскладки.
        field: &'static str,
        /// Содержимое поля без пробелов по краям.
        value: String,
    },

    /// Метка изменения, отличная от A, M, D и U.
    #[error("invalid change label '{0}'")]
    InvalidChangeLabel(String),

    /// Символ не представим в целевой кодировке.
    #[error("character '{0}' cannot be encoded")]
    Unencodable(char),
}

/// Ошибки чтения, записи и слияния файлов банковских кодов.
#[derive(Debug, Error)]
pub enum BankFileError {
    /// Ошибка ввода/вывода.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Строка некорректна в настроенной кодировке.
    #[error("line {line}: invalid {encoding} text")]
    Encoding {
        /// Номер строки (1-based).
        line: usize,
        /// Имя настроенной кодировки.
        encoding: &'static str,
    },

    /// Пустая строка, за которой следует содержимое.
    #[error("line {line}: blank line inside the file")]
    BlankLine {
        /// Номер пустой строки (1-based).
        line: usize,
    },

    /// Строку не удалось разобрать или записать.
    #[error("line {line}: {source}")]
    Record {
        /// Номер строки (1-based).
        line: usize,
        /// Причина на уровне поля.
        #[source]
        source: RecordError,
    },

    /// Две строки одного файла имеют одинаковый серийный номер.
    #[error("line {line}: duplicate serial number {serial}")]
    DuplicateSerial {
        /// Номер строки второго вхождения (1-based).
        line: usize,
        /// Серийный номер.
        serial: u32,
    },

    /// Обновление предложило файл в более старой раскладке.
    #[error("cannot update a {current} file from a {offered} file")]
    FormatDowngrade {
        /// Раскладка принимающего файла.
        current: FormatVersion,
        /// Раскладка предложенного файла.
        offered: FormatVersion,
    },

    /// Метка изменения не согласуется с принимающим файлом.
    #[error("cannot apply change label {label} to record {serial}: {reason}")]
    UpdateConflict {
        /// Серийный номер записи.
        serial: u32,
        /// Метка изменения записи.
        label: ChangeLabel,
        /// Что пошло не так.
        reason: &'static str,
    },

    /// Запись удалена дважды.
    #[error("record {serial} is already deleted")]
    DuplicateDeletion {
        /// Серийный номер.
        serial: u32,
    },

    /// Два текущих головных офиса с одним банковским кодом.
    #[error("bank code {bank_code} has two head offices (records {first} and {second})")]
    DuplicateHeadOffice {
        /// Банковский код.
        bank_code: BankCode,
        /// Серийный номер первого головного офиса.
        first: u32,
        /// Серийный номер второго головного офиса.
        second: u32,
    },
}

/// Ошибки провайдеров файлов банковских кодов.
#[derive(Debug, Error)]
pub enum ProviderError {
    /// Ошибка ввода/вывода при доступе к ресурсу.
    #[error("I/O error on {}: {source}", .path.display())]
    Io {
        /// Путь к ресурсу.
        path: PathBuf,
        /// Причина.
        #[source]
        source: std::io::Error,
    },

    /// Индекс вне `0..resource_count()`.
    #[error("resource index {index} out of bounds (count {count})")]
    IndexOutOfBounds {
        /// Запрошенный индекс.
        index: usize,
        /// Число ресурсов.
        count: usize,
    },

    /// Файл конфигурации не удалось разобрать.
    #[error("invalid configuration: {0}")]
    Config(#[from] serde_json::Error),

    /// Конфигурация синтаксически верна, но противоречива.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

/// Ошибки справочника банков.
#[derive(Debug, Error)]
pub enum DirectoryError {
    /// Ошибка провайдера.
    #[error(transparent)]
    Provider(#[from] ProviderError),

    /// Ресурс не удалось прочитать.
    #[error("cannot read bank file {resource}: {source}")]
    Read {
        /// Имя ресурса.
        resource: String,
        /// Причина.
        #[source]
        source: BankFileError,
    },

    /// Ресурс не удалось слить с предыдущими.
    #[error("cannot update from bank file {resource}: {source}")]
    Update {
        /// Имя ресурса.
        resource: String,
        /// Причина.
        #[source]
        source: BankFileError,
    },

    /// Банковский код заменён другим.
    #[error(
        "bank code {} expired, replaced by {}",
        .expired.bank_code,
        .replacement.bank_code
    )]
    Expired {
        /// Последняя запись устаревшего банковского кода.
        expired: Box<BankRecord>,
        /// Головной офис заменяющего банковского кода.
        replacement: Box<BankRecord>,
    },
}

/// Сокращение для результатов операций над значениями.
pub type ValueResult<T> = Result<T, ValueError>;
