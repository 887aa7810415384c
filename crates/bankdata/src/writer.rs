//! Потоковый writer для файлов банковских кодов.
//!
//! Предоставляет [`RecordWriter`] для записи [`BankRecord`] строками
//! фиксированной ширины в любой тип, реализующий [`Write`].

use std::io::{BufWriter, Write};

use crate::config::Encoding;
use crate::error::{BankFileError, RecordError};
use crate::record::{BankRecord, FormatVersion};

/// Буферизованный writer для строк банковских кодов.
///
/// Каждая запись становится одной строкой, завершённой `\n`.
///
/// # Пример
///
/// ```no_run
/// use std::fs::File;
///
/// use bankdata::config::Encoding;
/// use bankdata::record::FormatVersion;
/// use bankdata::writer::RecordWriter;
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let file = File::create("blz.txt")?;
/// let mut writer = RecordWriter::new(file, FormatVersion::June2013, Encoding::Latin1);
/// // writer.write(&record)?;
/// writer.flush()?;
/// # Ok(())
/// # }
/// ```
pub struct RecordWriter<W: Write> {
    inner: BufWriter<W>,
    format: FormatVersion,
    encoding: Encoding,
    records_written: usize,
}

impl<W: Write> RecordWriter<W> {
    /// Создаёт writer.
    pub fn new(writer: W, format: FormatVersion, encoding: Encoding) -> Self {
        Self { inner: BufWriter::new(writer), format, encoding, records_written: 0 }
    }

    /// Записывает одну запись.
    ///
    /// # Ошибки
    ///
    /// [`BankFileError::Record`], если запись содержит символ, который
    /// кодировка не может представить, [`BankFileError::Io`] при ошибке записи.
    pub fn write(&mut self, record: &BankRecord) -> Result<(), BankFileError> {
        let line = record.to_line(self.format);
        let bytes = self.encoding.encode(&line).map_err(|c| BankFileError::Record {
            line: self.records_written + 1,
            source: RecordError::Unencodable(c),
        })?;
        self.inner.write_all(&bytes)?;
        self.inner.write_all(b"\n")?;
        self.records_written += 1;
        Ok(())
    }

    /// Записывает несколько записей.
    ///
    /// # Ошибки
    ///
    /// Первая ошибка [`write`](Self::write).
    pub fn write_all<'a>(
        &mut self,
        records: impl IntoIterator<Item = &'a BankRecord>,
    ) -> Result<(), BankFileError> {
        for record in records {
            self.write(record)?;
        }
        Ok(())
    }

    /// Сбрасывает буфер.
    ///
    /// # Ошибки
    ///
    /// [`BankFileError::Io`] при ошибке записи.
    pub fn flush(&mut self) -> Result<(), BankFileError> {
        self.inner.flush()?;
        Ok(())
    }

    /// Количество записанных записей.
    #[must_use]
    pub fn records_written(&self) -> usize {
        self.records_written
    }
}
