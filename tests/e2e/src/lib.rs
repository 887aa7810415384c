//! # e2e-tests - сквозные тесты CLI `blz`
//!
//! ## Фикстуры
//!
//! Тестовые файлы лежат в `fixtures/`:
//! - `blz_2013_03_04.txt`: раскладка June 2006, Latin-1, четыре записи
//! - `blz_2013_06_03.txt`: раскладка June 2013; удаляет банковский код 20041111
//!   в пользу нового кода 30050000
//! - `bankdata.json`: конфигурация с обоими файлами

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

/// Путь к каталогу фикстур.
pub fn fixtures_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("fixtures")
}

/// Путь к фикстуре по имени файла.
pub fn fixture(name: &str) -> PathBuf {
    fixtures_dir().join(name)
}

/// Записывает в `dir` файл `bankdata.json` с ресурсами `resources` в виде
/// `(path, format, date_of_validity, date_of_expiration)`.
pub fn write_config(dir: &Path, resources: &[(&Path, &str, &str, &str)]) -> Result<PathBuf> {
    let resources: Vec<_> = resources
        .iter()
        .map(|(path, format, validity, expiration)| {
            serde_json::json!({
                "path": path,
                "format": format,
                "date_of_validity": validity,
                "date_of_expiration": expiration,
            })
        })
        .collect();
    let config = serde_json::json!({ "resources": resources });

    let path = dir.join("bankdata.json");
    fs::write(&path, serde_json::to_string_pretty(&config)?)
        .with_context(|| format!("Failed to write {}", path.display()))?;
    Ok(path)
}
