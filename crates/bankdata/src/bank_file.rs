//! Слитое состояние файла банковских кодов.
//!
//! [`BankFile`] читается из одного снимка и затем продвигается вперёд через
//! [`BankFile::update`] каждым более новым снимком. Записи с меткой `D`
//! остаются текущими, пока снимок их перечисляет; затем они переходят в
//! удалённые записи, по которым разрешаются заменяющие банковские коды.

use std::collections::{BTreeMap, HashMap};
use std::io::{Read, Write};

use chrono::NaiveDate;
use tracing::{debug, info};

use crate::config::Encoding;
use crate::error::{BankFileError, DirectoryError};
use crate::provider::BankFileProvider;
use crate::reader::{ReadOptions, RecordReader};
use crate::record::{BankRecord, ChangeLabel, FormatVersion};
use crate::value::BankCode;
use crate::writer::RecordWriter;

/// Серийные номера по банковским кодам, построенные из карт записей.
#[derive(Debug, Clone, Default)]
struct Indices {
    head_offices: HashMap<BankCode, u32>,
    branch_offices: HashMap<BankCode, Vec<u32>>,
    pending_deletions: HashMap<BankCode, Vec<u32>>,
    deleted_head_offices: HashMap<BankCode, Vec<u32>>,
    deleted_branch_offices: HashMap<BankCode, Vec<u32>>,
}

impl Indices {
    fn build(
        records: &BTreeMap<u32, BankRecord>,
        deleted: &BTreeMap<u32, BankRecord>,
    ) -> Result<Self, BankFileError> {
        let mut index = Self::default();
        for (&serial, record) in records {
            let code = record.bank_code;
            if record.is_deleted() {
                index.pending_deletions.entry(code).or_default().push(serial);
            } else if record.head_office {
                if let Some(&first) = index.head_offices.get(&code) {
                    return Err(BankFileError::DuplicateHeadOffice {
                        bank_code: code,
                        first,
                        second: serial,
                    });
                }
                index.head_offices.insert(code, serial);
            } else {
                index.branch_offices.entry(code).or_default().push(serial);
            }
        }
        for (&serial, record) in deleted {
            let target = if record.head_office {
                &mut index.deleted_head_offices
            } else {
                &mut index.deleted_branch_offices
            };
            target.entry(record.bank_code).or_default().push(serial);
        }
        Ok(index)
    }
}

/// Слитые записи банковских кодов одного или нескольких снимков.
#[derive(Debug, Clone)]
pub struct BankFile {
    format: FormatVersion,
    date_of_validity: NaiveDate,
    date_of_expiration: NaiveDate,
    records: BTreeMap<u32, BankRecord>,
    deleted: BTreeMap<u32, BankRecord>,
    index: Indices,
}

impl BankFile {
    /// Создаёт файл без записей.
    #[must_use]
    pub fn empty(
        format: FormatVersion,
        date_of_validity: NaiveDate,
        date_of_expiration: NaiveDate,
    ) -> Self {
        Self {
            format,
            date_of_validity,
            date_of_expiration,
            records: BTreeMap::new(),
            deleted: BTreeMap::new(),
            index: Indices::default(),
        }
    }

    /// Читает полный снимок.
    ///
    /// # Ошибки
    ///
    /// Первая ошибка строки из [`RecordReader`],
    /// [`BankFileError::DuplicateSerial`] или
    /// [`BankFileError::DuplicateHeadOffice`]. Прочитанное до ошибки не сохраняется.
    pub fn read(source: impl Read, options: ReadOptions) -> Result<Self, BankFileError> {
        let mut file =
            Self::empty(options.format, options.date_of_validity, options.date_of_expiration);
        let mut reader = RecordReader::new(source, options);
        while let Some(record) = reader.next() {
            let record = record?;
            let serial = record.serial_number;
            if file.records.insert(serial, record).is_some() {
                return Err(BankFileError::DuplicateSerial { line: reader.line(), serial });
            }
        }
        file.index = Indices::build(&file.records, &file.deleted)?;
        debug!(
            records = file.records.len(),
            format = %file.format,
            validity = %file.date_of_validity,
            "bank file read"
        );
        Ok(file)
    }

    /// Применяет к файлу более новый снимок `newer`.
    ///
    /// Записи сопоставляются по серийному номеру:
    ///
    /// * `A` не должна быть текущей, если только текущая запись не помечена `D`;
    ///   вставляется или заменяет запись с меткой `D`.
    /// * `M` и `D` должны быть текущими и заменяют текущую запись.
    /// * `U` должна быть текущей; если `newer` в более новой раскладке, она
    ///   заменяет текущую запись или вставляется.
    ///
    /// Затем текущие записи с меткой `D`, которых нет в `newer`, переходят в
    /// удалённые. Даты и раскладка берутся из `newer`.
    ///
    /// При ошибке `self` не изменяется.
    ///
    /// # Ошибки
    ///
    /// [`BankFileError::FormatDowngrade`], [`BankFileError::UpdateConflict`],
    /// [`BankFileError::DuplicateDeletion`] или
    /// [`BankFileError::DuplicateHeadOffice`].
    pub fn update(&mut self, newer: &BankFile) -> Result<(), BankFileError> {
        if newer.format < self.format {
            return Err(BankFileError::FormatDowngrade {
                current: self.format,
                offered: newer.format,
            });
        }
        let upgrade = newer.format > self.format;

        let mut records = self.records.clone();
        let mut deleted = self.deleted.clone();

        for (&serial, record) in newer.records.iter().rev() {
            let conflict = |reason| BankFileError::UpdateConflict {
                serial,
                label: record.change_label,
                reason,
            };
            match record.change_label {
                ChangeLabel::Added => {
                    if records.get(&serial).is_some_and(|current| !current.is_deleted()) {
                        return Err(conflict("record already exists"));
                    }
                    records.insert(serial, record.clone());
                }
                ChangeLabel::Modified | ChangeLabel::Deleted => {
                    let Some(previous) = records.get(&serial) else {
                        return Err(conflict("record does not exist"));
                    };
                    let merged = record.clone().inherit_history(previous);
                    records.insert(serial, merged);
                }
                ChangeLabel::Unchanged if upgrade => {
                    let merged = match records.get(&serial) {
                        Some(previous) => record.clone().inherit_history(previous),
                        None => record.clone(),
                    };
                    records.insert(serial, merged);
                }
                ChangeLabel::Unchanged => {
                    if !records.contains_key(&serial) {
                        return Err(conflict("record does not exist"));
                    }
                }
            }
        }

        let swept: Vec<u32> = records
            .iter()
            .filter(|(serial, record)| record.is_deleted() && !newer.records.contains_key(serial))
            .map(|(&serial, _)| serial)
            .collect();
        for serial in &swept {
            if deleted.contains_key(serial) {
                return Err(BankFileError::DuplicateDeletion { serial: *serial });
            }
            if let Some(record) = records.remove(serial) {
                deleted.insert(*serial, record);
            }
        }

        let index = Indices::build(&records, &deleted)?;

        info!(
            from = %self.date_of_validity,
            to = %newer.date_of_validity,
            current = records.len(),
            removed = swept.len(),
            upgrade,
            "bank file updated"
        );
        self.format = newer.format;
        self.date_of_validity = newer.date_of_validity;
        self.date_of_expiration = newer.date_of_expiration;
        self.records = records;
        self.deleted = deleted;
        self.index = index;
        Ok(())
    }

    /// Читает все ресурсы `provider` по порядку и сливает каждый с
    /// предыдущими. Возвращает `None`, если у провайдера нет ресурсов.
    ///
    /// # Ошибки
    ///
    /// Ошибки провайдера, а также [`DirectoryError::Read`] или
    /// [`DirectoryError::Update`] с именем ресурса, на котором произошёл сбой.
    pub fn merge_all<P: BankFileProvider + ?Sized>(
        provider: &P,
        encoding: Encoding,
    ) -> Result<Option<Self>, DirectoryError> {
        let mut merged: Option<Self> = None;
        for index in 0..provider.resource_count() {
            let resource = provider.resource(index)?;
            let options = ReadOptions::new(
                resource.format,
                resource.date_of_validity,
                resource.date_of_expiration,
            )
            .with_encoding(encoding);
            let file = Self::read(provider.open(index)?, options).map_err(|source| {
                DirectoryError::Read { resource: resource.name.clone(), source }
            })?;
            debug!(resource = %resource.name, records = file.len(), "bank file loaded");

            merged = Some(match merged.take() {
                None => file,
                Some(mut older) => {
                    older.update(&file).map_err(|source| DirectoryError::Update {
                        resource: resource.name.clone(),
                        source,
                    })?;
                    older
                }
            });
        }
        Ok(merged)
    }

    /// Записывает текущие записи в порядке серийных номеров, включая записи
    /// с меткой `D`. Возвращает число записанных строк.
    ///
    /// # Ошибки
    ///
    /// См. [`RecordWriter::write`].
    pub fn write(&self, out: impl Write, encoding: Encoding) -> Result<usize, BankFileError> {
        let mut writer = RecordWriter::new(out, self.format, encoding);
        writer.write_all(self.records.values())?;
        writer.flush()?;
        Ok(writer.records_written())
    }

    /// Раскладка последнего слитого снимка.
    #[must_use]
    pub fn format(&self) -> FormatVersion {
        self.format
    }

    /// Первый день действия последнего снимка.
    #[must_use]
    pub fn date_of_validity(&self) -> NaiveDate {
        self.date_of_validity
    }

    /// Последний день действия последнего снимка.
    #[must_use]
    pub fn date_of_expiration(&self) -> NaiveDate {
        self.date_of_expiration
    }

    /// Число текущих записей, включая записи с меткой `D`.
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Нет ли текущих записей.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Текущая запись с данным серийным номером.
    #[must_use]
    pub fn record(&self, serial: u32) -> Option<&BankRecord> {
        self.records.get(&serial)
    }

    /// Все текущие записи в порядке серийных номеров, включая записи с меткой `D`.
    pub fn records(&self) -> impl Iterator<Item = &BankRecord> {
        self.records.values()
    }

    /// Текущие записи без метки `D` в порядке серийных номеров.
    pub fn current_records(&self) -> impl Iterator<Item = &BankRecord> {
        self.records.values().filter(|record| !record.is_deleted())
    }

    /// Записи, удалённые обновлением, в порядке серийных номеров.
    pub fn deleted_records(&self) -> impl Iterator<Item = &BankRecord> {
        self.deleted.values()
    }

    /// Текущий головной офис `code` без метки `D`.
    #[must_use]
    pub fn head_office(&self, code: BankCode) -> Option<&BankRecord> {
        self.index.head_offices.get(&code).and_then(|serial| self.records.get(serial))
    }

    /// Текущие филиалы `code` без метки `D` в порядке серийных номеров.
    #[must_use]
    pub fn branch_offices(&self, code: BankCode) -> Vec<&BankRecord> {
        collect(&self.records, self.index.branch_offices.get(&code))
    }

    /// Есть ли у `code` текущая запись без метки `D`.
    #[must_use]
    pub fn is_active(&self, code: BankCode) -> bool {
        self.index.head_offices.contains_key(&code) || self.index.branch_offices.contains_key(&code)
    }

    /// Текущие записи `code` с меткой `D`.
    #[must_use]
    pub fn pending_deletions(&self, code: BankCode) -> Vec<&BankRecord> {
        collect(&self.records, self.index.pending_deletions.get(&code))
    }

    /// Удалённые головные офисы `code`.
    #[must_use]
    pub fn deleted_head_offices(&self, code: BankCode) -> Vec<&BankRecord> {
        collect(&self.deleted, self.index.deleted_head_offices.get(&code))
    }

    /// Удалённые филиалы `code`.
    #[must_use]
    pub fn deleted_branch_offices(&self, code: BankCode) -> Vec<&BankRecord> {
        collect(&self.deleted, self.index.deleted_branch_offices.get(&code))
    }

    /// Записи `code` с меткой `D` или удалённые, от самого раннего удаления.
    /// Записи с одинаковой датой удаления упорядочены по серийному номеру.
    #[must_use]
    pub fn tombstones(&self, code: BankCode) -> Vec<&BankRecord> {
        let mut tombstones = self.pending_deletions(code);
        tombstones.extend(self.deleted_head_offices(code));
        tombstones.extend(self.deleted_branch_offices(code));
        tombstones.sort_by_key(|record| (record.deletion_date, record.serial_number));
        tombstones
    }
}

fn collect<'a>(
    map: &'a BTreeMap<u32, BankRecord>,
    serials: Option<&Vec<u32>>,
) -> Vec<&'a BankRecord> {
    serials
        .map(|serials| serials.iter().filter_map(|serial| map.get(serial)).collect())
        .unwrap_or_default()
}
