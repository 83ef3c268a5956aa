//! Import error types.

use crate::mapping::Field;
use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while importing a CSV export.
///
/// Structural errors (I/O, CSV syntax, missing columns) always abort the
/// parse. Row errors ([`ImportError::is_row_error`]) abort it under
/// [`RowErrorPolicy::Abort`](crate::RowErrorPolicy::Abort) and are collected
/// under [`RowErrorPolicy::Collect`](crate::RowErrorPolicy::Collect).
#[derive(Debug, Error)]
pub enum ImportError {
    /// IO error opening or reading the input.
    #[error("failed to read file {path}: {source}")]
    Io {
        /// The path that failed to read.
        path: PathBuf,
        /// The underlying IO error.
        #[source]
        source: std::io::Error,
    },

    /// Malformed CSV (unbalanced quotes, inconsistent field count, bad UTF-8).
    #[error("malformed CSV: {0}")]
    Csv(#[from] csv::Error),

    /// No registered importer is named like this.
    #[error("unknown importer '{name}'")]
    UnknownImporter {
        /// The requested name.
        name: String,
    },

    /// No registered importer recognizes the file.
    #[error("no importer recognizes {path}")]
    Unrecognized {
        /// The input file.
        path: PathBuf,
    },

    /// The header row lacks a column the field mapping expects.
    #[error("missing expected column {column} in header")]
    MissingColumn {
        /// The header name or column position.
        column: String,
    },

    /// A row is shorter than a mapped column index.
    #[error("row {row}: column {index} out of range ({len} fields)")]
    FieldOutOfRange {
        /// 1-based data row number.
        row: usize,
        /// The mapped column index.
        index: usize,
        /// Number of fields in the row.
        len: usize,
    },

    /// A required field is absent or empty.
    #[error("row {row}: missing required field {field}")]
    MissingField {
        /// 1-based data row number.
        row: usize,
        /// The missing field.
        field: Field,
    },

    /// A date does not match the layout's date format.
    #[error("row {row}: invalid date '{value}' (expected format '{format}')")]
    InvalidDate {
        /// 1-based data row number.
        row: usize,
        /// The raw value.
        value: String,
        /// The expected strftime-style format.
        format: String,
    },

    /// An amount is not a plain decimal number.
    #[error("row {row}: invalid amount '{value}'")]
    InvalidAmount {
        /// 1-based data row number.
        row: usize,
        /// The raw value.
        value: String,
    },
}

impl ImportError {
    /// The data row this error belongs to, if it is a row error.
    #[must_use]
    pub const fn row(&self) -> Option<usize> {
        match self {
            Self::FieldOutOfRange { row, .. }
            | Self::MissingField { row, .. }
            | Self::InvalidDate { row, .. }
            | Self::InvalidAmount { row, .. } => Some(*row),
            Self::Io { .. }
            | Self::Csv(_)
            | Self::UnknownImporter { .. }
            | Self::Unrecognized { .. }
            | Self::MissingColumn { .. } => None,
        }
    }

    /// Check whether this error is confined to a single record.
    #[must_use]
    pub const fn is_row_error(&self) -> bool {
        self.row().is_some()
    }
}
