//! Источники файлов банковских кодов.

use std::fs::{self, File};
use std::io::{Cursor, Read};
use std::path::Path;
use std::sync::{Arc, PoisonError, RwLock};
use std::time::{Duration, SystemTime};

use chrono::NaiveDate;

use crate::config::{BankDataConfig, ResourceConfig};
use crate::error::ProviderError;
use crate::record::FormatVersion;

/// Описание одного ресурса.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceInfo {
    /// Имя для сообщений лога и ошибок.
    pub name: String,
    /// Раскладка ресурса.
    pub format: FormatVersion,
    /// Первый день действия ресурса.
    pub date_of_validity: NaiveDate,
    /// Последний день действия ресурса.
    pub date_of_expiration: NaiveDate,
}

/// Упорядоченный список файлов банковских кодов, от старых к новым.
///
/// Индексы идут от `0` до `resource_count() - 1`.
pub trait BankFileProvider: Send + Sync {
    /// Число ресурсов.
    fn resource_count(&self) -> usize;

    /// Описывает ресурс с индексом `index`.
    ///
    /// # Ошибки
    ///
    /// [`ProviderError::IndexOutOfBounds`] вне `0..resource_count()`.
    fn resource(&self, index: usize) -> Result<ResourceInfo, ProviderError>;

    /// Открывает ресурс с индексом `index` для чтения.
    ///
    /// # Ошибки
    ///
    /// [`ProviderError::IndexOutOfBounds`] или ошибка ввода/вывода.
    fn open(&self, index: usize) -> Result<Box<dyn Read + Send>, ProviderError>;

    /// Время последнего изменения любого ресурса.
    ///
    /// # Ошибки
    ///
    /// Ошибка ввода/вывода, если время определить не удалось.
    fn last_modified(&self) -> Result<SystemTime, ProviderError>;
}

impl<P: BankFileProvider + ?Sized> BankFileProvider for Arc<P> {
    fn resource_count(&self) -> usize {
        (**self).resource_count()
    }

    fn resource(&self, index: usize) -> Result<ResourceInfo, ProviderError> {
        (**self).resource(index)
    }

    fn open(&self, index: usize) -> Result<Box<dyn Read + Send>, ProviderError> {
        (**self).open(index)
    }

    fn last_modified(&self) -> Result<SystemTime, ProviderError> {
        (**self).last_modified()
    }
}

fn out_of_bounds(index: usize, count: usize) -> ProviderError {
    ProviderError::IndexOutOfBounds { index, count }
}

/// Файлы банковских кодов в локальной файловой системе.
#[derive(Debug, Clone, Default)]
pub struct FileProvider {
    resources: Vec<ResourceConfig>,
}

impl FileProvider {
    /// Создаёт провайдер для заданных файлов.
    #[must_use]
    pub fn new(resources: Vec<ResourceConfig>) -> Self {
        Self { resources }
    }

    /// Создаёт провайдер для файлов загруженной конфигурации.
    #[must_use]
    pub fn from_config(config: &BankDataConfig) -> Self {
        Self::new(config.resources.clone())
    }

    fn config(&self, index: usize) -> Result<&ResourceConfig, ProviderError> {
        self.resources.get(index).ok_or_else(|| out_of_bounds(index, self.resources.len()))
    }
}

fn io_error(path: &Path) -> impl FnOnce(std::io::Error) -> ProviderError + '_ {
    move |source| ProviderError::Io { path: path.to_path_buf(), source }
}

impl BankFileProvider for FileProvider {
    fn resource_count(&self) -> usize {
        self.resources.len()
    }

    fn resource(&self, index: usize) -> Result<ResourceInfo, ProviderError> {
        let config = self.config(index)?;
        Ok(ResourceInfo {
            name: config.path.display().to_string(),
            format: config.format,
            date_of_validity: config.date_of_validity,
            date_of_expiration: config.date_of_expiration,
        })
    }

    fn open(&self, index: usize) -> Result<Box<dyn Read + Send>, ProviderError> {
        let config = self.config(index)?;
        let file = File::open(&config.path).map_err(io_error(&config.path))?;
        Ok(Box::new(file))
    }

    fn last_modified(&self) -> Result<SystemTime, ProviderError> {
        let mut latest = SystemTime::UNIX_EPOCH;
        for config in &self.resources {
            let modified = fs::metadata(&config.path)
                .and_then(|metadata| metadata.modified())
                .map_err(io_error(&config.path))?;
            latest = latest.max(modified);
        }
        Ok(latest)
    }
}

#[derive(Debug, Default)]
struct MemoryState {
    resources: Vec<(ResourceInfo, Arc<[u8]>)>,
    generation: u64,
}

/// Файлы банковских кодов в памяти.
///
/// Каждое изменение сдвигает время модификации на одну секунду, поэтому
/// справочник замечает изменение при следующей проверке.
#[derive(Debug, Default)]
pub struct MemoryProvider {
    state: RwLock<MemoryState>,
}

impl MemoryProvider {
    /// Создаёт провайдер без ресурсов.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Добавляет ресурс.
    pub fn push(&self, info: ResourceInfo, content: impl Into<Arc<[u8]>>) {
        let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);
        state.resources.push((info, content.into()));
        state.generation += 1;
    }

    /// Заменяет содержимое ресурса с индексом `index`.
    ///
    /// # Ошибки
    ///
    /// [`ProviderError::IndexOutOfBounds`] вне `0..resource_count()`.
    pub fn replace(
        &self,
        index: usize,
        content: impl Into<Arc<[u8]>>,
    ) -> Result<(), ProviderError> {
        let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);
        let count = state.resources.len();
        let entry = state.resources.get_mut(index).ok_or_else(|| out_of_bounds(index, count))?;
        entry.1 = content.into();
        state.generation += 1;
        Ok(())
    }

    /// Удаляет все ресурсы.
    pub fn clear(&self) {
        let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);
        state.resources.clear();
        state.generation += 1;
    }

    /// Помечает ресурсы изменёнными, не меняя их.
    pub fn touch(&self) {
        self.state.write().unwrap_or_else(PoisonError::into_inner).generation += 1;
    }

    fn entry(&self, index: usize) -> Result<(ResourceInfo, Arc<[u8]>), ProviderError> {
        let state = self.state.read().unwrap_or_else(PoisonError::into_inner);
        state
            .resources
            .get(index)
            .cloned()
            .ok_or_else(|| out_of_bounds(index, state.resources.len()))
    }
}

impl BankFileProvider for MemoryProvider {
    fn resource_count(&self) -> usize {
        self.state.read().unwrap_or_else(PoisonError::into_inner).resources.len()
    }

    fn resource(&self, index: usize) -> Result<ResourceInfo, ProviderError> {
        self.entry(index).map(|(info, _)| info)
    }

    fn open(&self, index: usize) -> Result<Box<dyn Read + Send>, ProviderError> {
        let (_, content) = self.entry(index)?;
        Ok(Box::new(Cursor::new(content)))
    }

    fn last_modified(&self) -> Result<SystemTime, ProviderError> {
        let generation = self.state.read().unwrap_or_else(PoisonError::into_inner).generation;
        Ok(SystemTime::UNIX_EPOCH + Duration::from_secs(generation))
    }
}
