//! Потоковый reader для файлов банковских кодов.
//!
//! Предоставляет [`RecordReader`], итератор, который читает [`BankRecord`]
//! из любого источника, реализующего [`Read`].

use std::io::{BufRead, BufReader, Read};

use chrono::NaiveDate;

use crate::config::Encoding;
use crate::error::BankFileError;
use crate::record::{BankRecord, ChangeLabel, FormatVersion};

/// Описывает снимок, который читает reader.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReadOptions {
    /// Раскладка строк.
    pub format: FormatVersion,
    /// Кодировка строк.
    pub encoding: Encoding,
    /// Первый день действия снимка; становится датой создания или изменения
    /// добавленных и изменённых записей.
    pub date_of_validity: NaiveDate,
    /// Последний день действия снимка; становится датой удаления записей,
    /// помеченных на удаление.
    pub date_of_expiration: NaiveDate,
}

impl ReadOptions {
    /// Параметры снимка в кодировке по умолчанию.
    #[must_use]
    pub fn new(
        format: FormatVersion,
        date_of_validity: NaiveDate,
        date_of_expiration: NaiveDate,
    ) -> Self {
        Self { format, encoding: Encoding::default(), date_of_validity, date_of_expiration }
    }

    /// Заменяет кодировку.
    #[must_use]
    pub fn with_encoding(mut self, encoding: Encoding) -> Self {
        self.encoding = encoding;
        self
    }
}

/// Потоковый reader для строк банковских кодов.
///
/// Возвращает по одной записи на строку и останавливается на первой ошибке.
/// Пустые строки допускаются только в конце ввода.
///
/// # Пример
///
/// ```
/// use bankdata::reader::{ReadOptions, RecordReader};
/// use bankdata::record::FormatVersion;
/// use chrono::NaiveDate;
///
/// let options = ReadOptions::new(
///     FormatVersion::June2006,
///     NaiveDate::from_ymd_opt(2013, 6, 3).unwrap(),
///     NaiveDate::from_ymd_opt(2013, 9, 8).unwrap(),
/// );
/// let reader = RecordReader::new("\n\n".as_bytes(), options);
/// assert_eq!(reader.count(), 0);
/// ```
pub struct RecordReader<R> {
    inner: BufReader<R>,
    options: ReadOptions,
    buffer: Vec<u8>,
    /// Номер последней прочитанной строки (1-based).
    line: usize,
    /// Первая пустая строка текущей серии пустых строк.
    blank_line: Option<usize>,
    records_read: usize,
    finished: bool,
}

impl<R: Read> RecordReader<R> {
    /// Создаёт reader; источник оборачивается в [`BufReader`].
    pub fn new(reader: R, options: ReadOptions) -> Self {
        Self {
            inner: BufReader::new(reader),
            options,
            buffer: Vec::with_capacity(FormatVersion::June2013.line_length() + 2),
            line: 0,
            blank_line: None,
            records_read: 0,
            finished: false,
        }
    }

    /// Количество успешно прочитанных записей.
    #[must_use]
    pub fn records_read(&self) -> usize {
        self.records_read
    }

    /// Номер последней прочитанной строки (1-based), `0` до первой строки.
    #[must_use]
    pub fn line(&self) -> usize {
        self.line
    }

    /// Параметры, с которыми создан reader.
    #[must_use]
    pub fn options(&self) -> &ReadOptions {
        &self.options
    }

    fn read_record(&mut self) -> Result<Option<BankRecord>, BankFileError> {
        loop {
            self.buffer.clear();
            if self.inner.read_until(b'\n', &mut self.buffer)? == 0 {
                return Ok(None);
            }
            self.line += 1;

            let bytes = trim_line_end(&self.buffer);
            if bytes.iter().all(|&b| b == b' ') {
                if self.blank_line.is_none() {
                    self.blank_line = Some(self.line);
                }
                continue;
            }
            if let Some(line) = self.blank_line {
                return Err(BankFileError::BlankLine { line });
            }

            let text = self.options.encoding.decode(bytes).ok_or(BankFileError::Encoding {
                line: self.line,
                encoding: self.options.encoding.as_str(),
            })?;
            let record = BankRecord::parse_line(&text, self.options.format)
                .map_err(|source| BankFileError::Record { line: self.line, source })?;
            return Ok(Some(self.stamp(record)));
        }
    }

    fn stamp(&self, mut record: BankRecord) -> BankRecord {
        match record.change_label {
            ChangeLabel::Added => record.creation_date = Some(self.options.date_of_validity),
            ChangeLabel::Modified => {
                record.modification_date = Some(self.options.date_of_validity);
            }
            ChangeLabel::Deleted => record.deletion_date = Some(self.options.date_of_expiration),
            ChangeLabel::Unchanged => {}
        }
        record
    }
}

impl<R: Read> Iterator for RecordReader<R> {
    type Item = Result<BankRecord, BankFileError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }

        match self.read_record() {
            Ok(Some(record)) => {
                self.records_read += 1;
                Some(Ok(record))
            }
            Ok(None) => {
                self.finished = true;
                None
            }
            Err(e) => {
                self.finished = true;
                Some(Err(e))
            }
        }
    }
}

fn trim_line_end(line: &[u8]) -> &[u8] {
    let line = line.strip_suffix(b"\n").unwrap_or(line);
    line.strip_suffix(b"\r").unwrap_or(line)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::RecordError;
    use crate::record::fixtures::{date, file_text, record};

    fn options() -> ReadOptions {
        ReadOptions::new(FormatVersion::June2006, date(2013, 6, 3), date(2013, 9, 8))
    }

    #[test]
    fn reads_records_and_stamps_dates() {
        let text = file_text(
            FormatVersion::June2006,
            &[
                record(1, 10020030, ChangeLabel::Added),
                record(2, 10020040, ChangeLabel::Modified),
                record(3, 10020050, ChangeLabel::Deleted),
                record(4, 10020060, ChangeLabel::Unchanged),
            ],
        );
        let records: Vec<_> =
            RecordReader::new(text.as_bytes(), options()).collect::<Result<_, _>>().unwrap();

        assert_eq!(records.len(), 4);
        assert_eq!(records[0].creation_date, Some(date(2013, 6, 3)));
        assert_eq!(records[1].modification_date, Some(date(2013, 6, 3)));
        assert_eq!(records[2].deletion_date, Some(date(2013, 9, 8)));
        assert_eq!(records[3].creation_date, None);
        assert_eq!(records[3].deletion_date, None);
    }

    #[test]
    fn accepts_crlf_and_trailing_blank_lines() {
        let line = record(1, 10020030, ChangeLabel::Added).to_line(FormatVersion::June2006);
        let text = format!("{line}\r\n\r\n   \n");
        let mut reader = RecordReader::new(text.as_bytes(), options());

        assert!(reader.next().unwrap().is_ok());
        assert!(reader.next().is_none());
        assert_eq!(reader.records_read(), 1);
        assert_eq!(reader.line(), 3);
    }

    #[test]
    fn rejects_blank_line_inside_file() {
        let text = format!(
            "{}\n\n{}\n",
            record(1, 10020030, ChangeLabel::Added).to_line(FormatVersion::June2006),
            record(2, 10020040, ChangeLabel::Added).to_line(FormatVersion::June2006),
        );
        let results: Vec<_> = RecordReader::new(text.as_bytes(), options()).collect();

        assert_eq!(results.len(), 2);
        assert!(matches!(results[1], Err(BankFileError::BlankLine { line: 2 })));
    }

    #[test]
    fn error_names_the_line_and_stops() {
        let good = record(1, 10020030, ChangeLabel::Added).to_line(FormatVersion::June2006);
        let text = format!("{good}\nshort line\n{good}\n");
        let mut reader = RecordReader::new(text.as_bytes(), options());

        assert!(reader.next().unwrap().is_ok());
        match reader.next() {
            Some(Err(BankFileError::Record { line, source })) => {
                assert_eq!(line, 2);
                assert!(matches!(source, RecordError::TooShort { .. }));
            }
            other => panic!("unexpected result: {other:?}"),
        }
        assert!(reader.next().is_none());
    }

    #[test]
    fn decodes_latin1_by_default() {
        let mut rec = record(1, 10020030, ChangeLabel::Added);
        rec.city = "Köln".to_string();
        let bytes = Encoding::Latin1.encode(&rec.to_line(FormatVersion::June2006)).unwrap();

        let parsed = RecordReader::new(bytes.as_slice(), options()).next().unwrap().unwrap();
        assert_eq!(parsed.city, "Köln");
    }

    #[test]
    fn invalid_utf8_is_an_encoding_error() {
        let mut rec = record(1, 10020030, ChangeLabel::Added);
        rec.city = "Köln".to_string();
        let bytes = Encoding::Latin1.encode(&rec.to_line(FormatVersion::June2006)).unwrap();

        let mut reader =
            RecordReader::new(bytes.as_slice(), options().with_encoding(Encoding::Utf8));
        assert!(matches!(
            reader.next(),
            Some(Err(BankFileError::Encoding { line: 1, encoding: "utf8" }))
        ));
    }
}
