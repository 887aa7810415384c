//! Конфигурация справочника банков.
//!
//! Конфигурация читается из JSON файла:
//!
//! ```json
//! {
//!   "encoding": "latin1",
//!   "reload_interval_secs": 3600,
//!   "resources": [
//!     {
//!       "path": "blz_2013_06_03.txt",
//!       "format": "june2013",
//!       "date_of_validity": "2013-06-03",
//!       "date_of_expiration": "2013-09-08"
//!     }
//!   ]
//! }
//! ```
//!
//! Относительные пути ресурсов разрешаются относительно директории, в которой
//! лежит файл конфигурации.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::ProviderError;
use crate::record::FormatVersion;

/// Кодировка файлов банковских кодов.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Encoding {
    /// ISO-8859-1, кодировка публикаций Bundesbank.
    #[default]
    Latin1,
    /// UTF-8.
    Utf8,
}

impl Encoding {
    /// Возвращает имя кодировки в конфигурации.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Latin1 => "latin1",
            Self::Utf8 => "utf8",
        }
    }

    /// Декодирует одну строку. Возвращает `None` для некорректного UTF-8.
    pub(crate) fn decode(&self, bytes: &[u8]) -> Option<String> {
        match self {
            Self::Latin1 => Some(bytes.iter().map(|&b| char::from(b)).collect()),
            Self::Utf8 => std::str::from_utf8(bytes).ok().map(str::to_string),
        }
    }

    /// Кодирует одну строку. Возвращает первый символ, который нельзя закодировать.
    pub(crate) fn encode(&self, text: &str) -> Result<Vec<u8>, char> {
        match self {
            Self::Latin1 => text.chars().map(|c| u8::try_from(c).map_err(|_| c)).collect(),
            Self::Utf8 => Ok(text.as_bytes().to_vec()),
        }
    }
}

/// Настройки справочника банков.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DirectoryConfig {
    /// Кодировка всех файлов банковских кодов.
    pub encoding: Encoding,
    /// Минимальное число секунд между двумя проверками ресурсов на изменения.
    pub reload_interval_secs: u64,
}

impl DirectoryConfig {
    /// Интервал перезагрузки по умолчанию, один час.
    pub const DEFAULT_RELOAD_INTERVAL_SECS: u64 = 3600;

    /// Возвращает интервал перезагрузки.
    #[must_use]
    pub fn reload_interval(&self) -> Duration {
        Duration::from_secs(self.reload_interval_secs)
    }
}

impl Default for DirectoryConfig {
    fn default() -> Self {
        Self {
            encoding: Encoding::default(),
            reload_interval_secs: Self::DEFAULT_RELOAD_INTERVAL_SECS,
        }
    }
}

/// Один файл банковских кодов.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceConfig {
    /// Путь к файлу; относительные пути разрешаются от файла конфигурации.
    pub path: PathBuf,
    /// Раскладка файла.
    pub format: FormatVersion,
    /// Первый день действия файла.
    pub date_of_validity: NaiveDate,
    /// Последний день действия файла.
    pub date_of_expiration: NaiveDate,
}

/// Полный файл конфигурации.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BankDataConfig {
    /// Настройки справочника.
    #[serde(flatten)]
    pub directory: DirectoryConfig,
    /// Файлы банковских кодов, от старых к новым.
    #[serde(default)]
    pub resources: Vec<ResourceConfig>,
}

impl BankDataConfig {
    /// Читает и проверяет файл конфигурации, разрешая относительные пути.
    ///
    /// # Ошибки
    ///
    /// [`ProviderError`], если файл не удалось прочитать, разобрать или проверить.
    pub fn load(path: &Path) -> Result<Self, ProviderError> {
        let text = fs::read_to_string(path)
            .map_err(|source| ProviderError::Io { path: path.to_path_buf(), source })?;
        let mut config = Self::from_json(&text)?;
        let base = path.parent().unwrap_or_else(|| Path::new("."));
        for resource in &mut config.resources {
            if resource.path.is_relative() {
                resource.path = base.join(&resource.path);
            }
        }
        Ok(config)
    }

    /// Разбирает и проверяет текст конфигурации.
    ///
    /// # Ошибки
    ///
    /// [`ProviderError::Config`] для некорректного JSON,
    /// [`ProviderError::InvalidConfig`] для противоречивых дат.
    pub fn from_json(text: &str) -> Result<Self, ProviderError> {
        let config: Self = serde_json::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Проверяет, что каждый ресурс истекает после начала действия и что
    /// ресурсы упорядочены по дате начала действия.
    ///
    /// # Ошибки
    ///
    /// [`ProviderError::InvalidConfig`] с описанием первого нарушения.
    pub fn validate(&self) -> Result<(), ProviderError> {
        for resource in &self.resources {
            if resource.date_of_expiration < resource.date_of_validity {
                return Err(ProviderError::InvalidConfig(format!(
                    "{} expires before it becomes valid",
                    resource.path.display()
                )));
            }
        }
        for pair in self.resources.windows(2) {
            if pair[1].date_of_validity < pair[0].date_of_validity {
                return Err(ProviderError::InvalidConfig(format!(
                    "{} is listed after the newer {}",
                    pair[1].path.display(),
                    pair[0].path.display()
                )));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    const SAMPLE: &str = r#"{
        "encoding": "utf8",
        "reload_interval_secs": 60,
        "resources": [
            {"path": "a.txt", "format": "june2006",
             "date_of_validity": "2012-12-03", "date_of_expiration": "2013-03-03"},
            {"path": "/data/b.txt", "format": "june2013",
             "date_of_validity": "2013-06-03", "date_of_expiration": "2013-09-08"}
        ]
    }"#;

    #[test]
    fn parses_sample() {
        let config = BankDataConfig::from_json(SAMPLE).unwrap();
        assert_eq!(config.directory.encoding, Encoding::Utf8);
        assert_eq!(config.directory.reload_interval(), Duration::from_secs(60));
        assert_eq!(config.resources.len(), 2);
        assert_eq!(config.resources[1].format, FormatVersion::June2013);
    }

    #[test]
    fn defaults_apply() {
        let config = BankDataConfig::from_json("{}").unwrap();
        assert_eq!(config.directory, DirectoryConfig::default());
        assert!(config.resources.is_empty());
    }

    #[test]
    fn rejects_unordered_resources() {
        let text = r#"{"resources": [
            {"path": "b", "format": "june2006", "date_of_validity": "2013-06-03", "date_of_expiration": "2013-09-08"},
            {"path": "a", "format": "june2006", "date_of_validity": "2013-03-04", "date_of_expiration": "2013-06-02"}
        ]}"#;
        assert!(matches!(BankDataConfig::from_json(text), Err(ProviderError::InvalidConfig(_))));
    }

    #[test]
    fn rejects_unknown_format() {
        let text = r#"{"resources": [
            {"path": "a", "format": "june1999", "date_of_validity": "2013-03-04", "date_of_expiration": "2013-06-02"}
        ]}"#;
        assert!(matches!(BankDataConfig::from_json(text), Err(ProviderError::Config(_))));
    }

    #[test]
    fn load_resolves_relative_paths() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bankdata.json");
        fs::File::create(&path).unwrap().write_all(SAMPLE.as_bytes()).unwrap();

        let config = BankDataConfig::load(&path).unwrap();
        assert_eq!(config.resources[0].path, dir.path().join("a.txt"));
        assert_eq!(config.resources[1].path, PathBuf::from("/data/b.txt"));
    }

    #[test]
    fn latin1_round_trip() {
        let bytes = Encoding::Latin1.encode("Köln").unwrap();
        assert_eq!(bytes, b"K\xf6ln");
        assert_eq!(Encoding::Latin1.decode(&bytes).unwrap(), "Köln");
        assert_eq!(Encoding::Latin1.encode("€"), Err('€'));
        assert_eq!(Encoding::Utf8.decode(b"K\xf6ln"), None);
    }
}
