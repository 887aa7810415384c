//! Справочник банков с запросами поверх файлов провайдера.
//!
//! [`BankDirectory`] сливает все ресурсы [`BankFileProvider`] в один
//! [`BankFile`] и отвечает на запросы из неизменяемого [`Snapshot`]. Снимки
//! перезагружаются лениво: запрос после истечения интервала перезагрузки
//! сравнивает время модификации провайдера со временем снимка и при
//! изменении перезагружает данные.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError, RwLock, TryLockError};
use std::time::{Instant, SystemTime};

use chrono::{Local, NaiveDate};
use tracing::{debug, info, warn};

use crate::bank_file::BankFile;
use crate::config::DirectoryConfig;
use crate::error::DirectoryError;
use crate::provider::BankFileProvider;
use crate::record::{BankRecord, FormatVersion};
use crate::value::BankCode;

/// Критерии [`Snapshot::search`].
///
/// Каждый заданный критерий должен содержаться в соответствующем поле без
/// учёта регистра. Критерии `None` подходят под всё.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchQuery {
    /// Часть названия банка.
    pub name: Option<String>,
    /// Часть пятизначного почтового индекса.
    pub postal_code: Option<String>,
    /// Часть названия города.
    pub city: Option<String>,
    /// Включать ли филиалы; головные офисы включаются всегда.
    pub include_branch_offices: bool,
}

impl SearchQuery {
    fn matches(&self, record: &BankRecord) -> bool {
        if !self.include_branch_offices && !record.head_office {
            return false;
        }
        contains(&record.name, self.name.as_deref())
            && contains(&format!("{:05}", record.postal_code), self.postal_code.as_deref())
            && contains(&record.city, self.city.as_deref())
    }
}

fn contains(field: &str, needle: Option<&str>) -> bool {
    needle.is_none_or(|needle| field.to_lowercase().contains(&needle.to_lowercase()))
}

/// Одно загруженное состояние справочника.
#[derive(Debug)]
pub struct Snapshot {
    file: Option<BankFile>,
    outdated: HashMap<BankCode, Vec<BankRecord>>,
    last_modified: SystemTime,
}

impl Snapshot {
    /// Текущий головной офис `code`.
    ///
    /// # Ошибки
    ///
    /// [`DirectoryError::Expired`], если у `code` нет головного офиса, но он
    /// заменён банковским кодом, у которого головной офис есть.
    pub fn head_office(&self, code: BankCode) -> Result<Option<BankRecord>, DirectoryError> {
        if let Some(record) = self.file.as_ref().and_then(|file| file.head_office(code)) {
            return Ok(Some(record.clone()));
        }
        self.check_replacement(code)?;
        Ok(None)
    }

    /// Текущие филиалы `code`.
    ///
    /// # Ошибки
    ///
    /// [`DirectoryError::Expired`], если у `code` нет филиалов, но он
    /// заменён банковским кодом с головным офисом.
    pub fn branch_offices(&self, code: BankCode) -> Result<Vec<BankRecord>, DirectoryError> {
        let offices: Vec<BankRecord> = self
            .file
            .as_ref()
            .map(|file| file.branch_offices(code).into_iter().cloned().collect())
            .unwrap_or_default();
        if offices.is_empty() {
            self.check_replacement(code)?;
        }
        Ok(offices)
    }

    /// Текущие записи, подходящие под `query`, в порядке серийных номеров.
    #[must_use]
    pub fn search(&self, query: &SearchQuery) -> Vec<BankRecord> {
        self.file
            .iter()
            .flat_map(BankFile::current_records)
            .filter(|record| query.matches(record))
            .cloned()
            .collect()
    }

    /// Возвращает [`DirectoryError::Expired`], если последняя удалённая
    /// запись `code` указывает заменяющий банковский код с текущим головным
    /// офисом. Замена отслеживается только на один шаг.
    ///
    /// # Ошибки
    ///
    /// [`DirectoryError::Expired`], как описано выше.
    pub fn check_replacement(&self, code: BankCode) -> Result<(), DirectoryError> {
        let Some(file) = &self.file else {
            return Ok(());
        };
        let Some(expired) = self
            .tombstones(code)
            .into_iter()
            .rev()
            .find(|record| record.replacing_bank_code.is_some())
        else {
            return Ok(());
        };
        let Some(replacement) = expired.replacing_bank_code.and_then(|next| file.head_office(next))
        else {
            return Ok(());
        };
        Err(DirectoryError::Expired {
            expired: Box::new(expired.clone()),
            replacement: Box::new(replacement.clone()),
        })
    }

    /// Записи `code` с меткой `D`, удалённые или сохранённые с прошлых
    /// загрузок, от самого раннего удаления.
    #[must_use]
    pub fn tombstones(&self, code: BankCode) -> Vec<&BankRecord> {
        let mut tombstones =
            self.file.as_ref().map(|file| file.tombstones(code)).unwrap_or_default();
        for record in self.outdated.get(&code).into_iter().flatten() {
            if !tombstones.iter().any(|known| known.serial_number == record.serial_number) {
                tombstones.push(record);
            }
        }
        tombstones.sort_by_key(|record| (record.deletion_date, record.serial_number));
        tombstones
    }

    /// Слитый файл, `None`, если у провайдера нет ресурсов.
    #[must_use]
    pub fn file(&self) -> Option<&BankFile> {
        self.file.as_ref()
    }

    /// Раскладка самого нового ресурса.
    #[must_use]
    pub fn format(&self) -> Option<FormatVersion> {
        self.file.as_ref().map(BankFile::format)
    }

    /// Первый день действия самого нового ресурса.
    #[must_use]
    pub fn date_of_validity(&self) -> Option<NaiveDate> {
        self.file.as_ref().map(BankFile::date_of_validity)
    }

    /// Последний день действия самого нового ресурса.
    #[must_use]
    pub fn date_of_expiration(&self) -> Option<NaiveDate> {
        self.file.as_ref().map(BankFile::date_of_expiration)
    }

    /// Число текущих записей.
    #[must_use]
    pub fn record_count(&self) -> usize {
        self.file.as_ref().map_or(0, BankFile::len)
    }

    /// Время модификации провайдера, при котором загружен снимок.
    #[must_use]
    pub fn last_modified(&self) -> SystemTime {
        self.last_modified
    }
}

#[derive(Debug, Default)]
struct ReloadState {
    last_check: Option<Instant>,
}

/// Справочник банков с ленивой перезагрузкой.
///
/// Когда снимок уже есть, запросы не ждут идущую перезагрузку, а отвечают
/// из предыдущего снимка.
pub struct BankDirectory {
    provider: Box<dyn BankFileProvider>,
    config: DirectoryConfig,
    snapshot: RwLock<Option<Arc<Snapshot>>>,
    reload: Mutex<ReloadState>,
}

impl BankDirectory {
    /// Создаёт справочник, который загружается при первом использовании.
    pub fn new(provider: impl BankFileProvider + 'static, config: DirectoryConfig) -> Self {
        Self {
            provider: Box::new(provider),
            config,
            snapshot: RwLock::new(None),
            reload: Mutex::new(ReloadState::default()),
        }
    }

    /// Создаёт справочник и сразу загружает его.
    ///
    /// # Ошибки
    ///
    /// Ошибка первой загрузки.
    pub fn open(
        provider: impl BankFileProvider + 'static,
        config: DirectoryConfig,
    ) -> Result<Self, DirectoryError> {
        let directory = Self::new(provider, config);
        directory.reload()?;
        Ok(directory)
    }

    /// Настройки справочника.
    #[must_use]
    pub fn config(&self) -> &DirectoryConfig {
        &self.config
    }

    /// Возвращает снимок для ответа на запрос, при необходимости сначала
    /// загружая или перезагружая данные.
    ///
    /// # Ошибки
    ///
    /// Ошибка первой загрузки. Неудачные перезагрузки логируются, и
    /// возвращается предыдущий снимок.
    pub fn snapshot(&self) -> Result<Arc<Snapshot>, DirectoryError> {
        let Some(current) = self.current() else {
            let mut state = self.reload.lock().unwrap_or_else(PoisonError::into_inner);
            if let Some(loaded) = self.current() {
                return Ok(loaded);
            }
            let snapshot = self.load(None)?;
            state.last_check = Some(Instant::now());
            return Ok(snapshot);
        };

        let mut state = match self.reload.try_lock() {
            Ok(state) => state,
            Err(TryLockError::Poisoned(poisoned)) => poisoned.into_inner(),
            Err(TryLockError::WouldBlock) => return Ok(current),
        };
        let interval = self.config.reload_interval();
        if state.last_check.is_some_and(|checked| checked.elapsed() < interval) {
            return Ok(current);
        }
        state.last_check = Some(Instant::now());

        match self.provider.last_modified() {
            Ok(modified) if modified == current.last_modified => {
                debug!("bank data unchanged");
                Ok(current)
            }
            Ok(_) => match self.load(Some(&current)) {
                Ok(snapshot) => Ok(snapshot),
                Err(e) => {
                    warn!(%e, "reloading bank data failed, keeping previous data");
                    Ok(current)
                }
            },
            Err(e) => {
                warn!(%e, "cannot check bank data for changes");
                Ok(current)
            }
        }
    }

    /// Перезагружает все ресурсы немедленно.
    ///
    /// # Ошибки
    ///
    /// Ошибка загрузки; предыдущий снимок остаётся в использовании.
    pub fn reload(&self) -> Result<Arc<Snapshot>, DirectoryError> {
        let mut state = self.reload.lock().unwrap_or_else(PoisonError::into_inner);
        let previous = self.current();
        let snapshot = self.load(previous.as_deref())?;
        state.last_check = Some(Instant::now());
        Ok(snapshot)
    }

    /// См. [`Snapshot::head_office`].
    ///
    /// # Ошибки
    ///
    /// Ошибки загрузки и [`DirectoryError::Expired`].
    pub fn head_office(&self, code: BankCode) -> Result<Option<BankRecord>, DirectoryError> {
        self.snapshot()?.head_office(code)
    }

    /// См. [`Snapshot::branch_offices`].
    ///
    /// # Ошибки
    ///
    /// Ошибки загрузки и [`DirectoryError::Expired`].
    pub fn branch_offices(&self, code: BankCode) -> Result<Vec<BankRecord>, DirectoryError> {
        self.snapshot()?.branch_offices(code)
    }

    /// См. [`Snapshot::search`].
    ///
    /// # Ошибки
    ///
    /// Ошибки загрузки.
    pub fn search(&self, query: &SearchQuery) -> Result<Vec<BankRecord>, DirectoryError> {
        Ok(self.snapshot()?.search(query))
    }

    fn current(&self) -> Option<Arc<Snapshot>> {
        self.snapshot.read().unwrap_or_else(PoisonError::into_inner).clone()
    }

    /// Читает и сливает все ресурсы и устанавливает результат.
    fn load(&self, previous: Option<&Snapshot>) -> Result<Arc<Snapshot>, DirectoryError> {
        let provider = self.provider.as_ref();
        let last_modified = provider.last_modified()?;

        let merged = BankFile::merge_all(provider, self.config.encoding)?;

        let mut outdated = previous.map(|snapshot| snapshot.outdated.clone()).unwrap_or_default();
        if let Some(file) = &merged {
            for record in file.deleted_records() {
                let known = outdated.entry(record.bank_code).or_default();
                if !known.iter().any(|r| r.serial_number == record.serial_number) {
                    known.push(record.clone());
                }
            }
            outdated.retain(|code, _| !file.is_active(*code));

            let expiration = file.date_of_expiration();
            if expiration < Local::now().date_naive() {
                warn!(%expiration, "bank data has expired");
            }
            info!(
                resources = provider.resource_count(),
                records = file.len(),
                outdated = outdated.len(),
                validity = %file.date_of_validity(),
                "bank data loaded"
            );
        } else {
            info!("no bank data resources");
        }

        let snapshot = Arc::new(Snapshot { file: merged, outdated, last_modified });
        let mut installed = self.snapshot.write().unwrap_or_else(PoisonError::into_inner);
        *installed = Some(Arc::clone(&snapshot));
        drop(installed);
        Ok(snapshot)
    }
}

impl std::fmt::Debug for BankDirectory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BankDirectory")
            .field("config", &self.config)
            .field("loaded", &self.current().is_some())
            .finish_non_exhaustive()
    }
}
