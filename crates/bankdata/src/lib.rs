//! Данные немецких банковских кодов.
//!
//! Крейт предоставляет валидируемые типы значений для немецких платёжных данных
//! и справочник банков, построенный из файлов банковских кодов, которые
//! Deutsche Bundesbank публикует каждый квартал:
//!
//! - [`value`]: банковские коды, номера счетов, референсные номера и текстовые
//!   поля DTAUS
//! - [`transaction_code`]: ключи видов платежей (Textschlüssel)
//! - [`record`]: одна строка файла банковских кодов и её раскладка фиксированной ширины
//! - [`bank_file`]: снимок, слитый с последующими по меткам изменений
//! - [`directory`]: поиск с ленивой перезагрузкой и разрешением замен
//!
//! # Быстрый старт
//!
//! ```
//! use std::sync::Arc;
//!
//! use bankdata::prelude::*;
//! use chrono::NaiveDate;
//!
//! let provider = Arc::new(MemoryProvider::new());
//! provider.push(
//!     ResourceInfo {
//!         name: "blz_2013_06_03.txt".to_string(),
//!         format: FormatVersion::June2006,
//!         date_of_validity: NaiveDate::from_ymd_opt(2013, 6, 3).unwrap(),
//!         date_of_expiration: NaiveDate::from_ymd_opt(2013, 9, 8).unwrap(),
//!     },
//!     Vec::<u8>::new(),
//! );
//!
//! let directory = BankDirectory::open(provider, DirectoryConfig::default()).unwrap();
//! let code = BankCode::parse("1002 0030").unwrap();
//! assert_eq!(directory.head_office(code).unwrap(), None);
//! ```

pub mod bank_file;
pub mod config;
pub mod directory;
pub mod error;
pub mod provider;
pub mod reader;
pub mod record;
pub mod transaction_code;
pub mod value;
pub mod writer;

/// Часто используемые типы.
pub mod prelude {
    pub use crate::bank_file::BankFile;
    pub use crate::config::{BankDataConfig, DirectoryConfig, Encoding};
    pub use crate::directory::{BankDirectory, SearchQuery, Snapshot};
    pub use crate::error::{BankFileError, DirectoryError, ProviderError, ValueError};
    pub use crate::provider::{BankFileProvider, FileProvider, MemoryProvider, ResourceInfo};
    pub use crate::reader::ReadOptions;
    pub use crate::record::{BankRecord, ChangeLabel, FormatVersion};
    pub use crate::transaction_code::{TransactionCode, TransactionCodes};
    pub use crate::value::{
        AccountNumber, AlphaNumericText27, BankCode, FormatStyle, Identifier, ReferenceNumber10,
        ReferenceNumber11,
    };
}
