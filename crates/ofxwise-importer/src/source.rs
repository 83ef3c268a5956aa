//! CSV record source.
//!
//! [`RecordSource`] reads the header row up front and then yields one
//! [`RawRecord`] per data row, lazily and in file order. It is single-pass:
//! parsing the same input again means opening a new source.

use crate::error::ImportError;
use csv::{StringRecord, StringRecordsIntoIter};
use std::fs::File;
use std::io::Read;
use std::path::Path;

/// One data row, numbered from 1 (the header is not counted).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawRecord {
    row: usize,
    fields: StringRecord,
}

impl RawRecord {
    /// Create a record for data row `row`.
    #[must_use]
    pub const fn new(row: usize, fields: StringRecord) -> Self {
        Self { row, fields }
    }

    /// 1-based data row number.
    #[must_use]
    pub const fn row(&self) -> usize {
        self.row
    }

    /// Field at the zero-based `index`.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&str> {
        self.fields.get(index)
    }

    /// Number of fields.
    #[must_use]
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Check whether the record has no fields.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

/// A lazy, single-pass sequence of data rows.
pub struct RecordSource<R> {
    headers: StringRecord,
    records: StringRecordsIntoIter<R>,
    row: usize,
}

impl RecordSource<File> {
    /// Open a CSV file.
    ///
    /// The file handle is owned by the source and closed when it is dropped.
    pub fn open(path: &Path, delimiter: u8) -> Result<Self, ImportError> {
        let file = File::open(path).map_err(|source| ImportError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_reader(file, delimiter)
    }
}

impl<R: Read> RecordSource<R> {
    /// Wrap a reader, consuming its header row.
    pub fn from_reader(reader: R, delimiter: u8) -> Result<Self, ImportError> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .delimiter(delimiter)
            .from_reader(reader);
        let headers = reader.headers()?.clone();
        Ok(Self {
            headers,
            records: reader.into_records(),
            row: 0,
        })
    }

    /// The header row.
    #[must_use]
    pub const fn headers(&self) -> &StringRecord {
        &self.headers
    }
}

impl<R: Read> Iterator for RecordSource<R> {
    type Item = Result<RawRecord, ImportError>;

    fn next(&mut self) -> Option<Self::Item> {
        let result = self.records.next()?;
        self.row += 1;
        Some(
            result
                .map(|fields| RawRecord::new(self.row, fields))
                .map_err(ImportError::from),
        )
    }
}
