//! Wise and TransferWise CSV importers for ofxwise
//!
//! This crate turns an account export into a [`Statement`]: each CSV row is
//! read, filtered by currency, and normalized into a [`StatementLine`] with a
//! unique id, a memo and a transaction type.
//!
//! # Overview
//!
//! An [`ImporterConfig`] says which currency to keep and where each field
//! lives ([`FieldMapping`]). Two presets cover the known layouts:
//!
//! - [`ImporterConfig::transferwise`] - the legacy export, fields by column position
//! - [`ImporterConfig::wise`] - the current export, fields by header name
//!
//! The [`ImporterRegistry`] picks a preset by name or by sniffing a file's
//! header row.
//!
//! # Example
//!
//! ```
//! use ofxwise_importer::ImporterConfig;
//!
//! let config = ImporterConfig::transferwise().currency("USD").build();
//!
//! let csv = "\
//! TransferWise ID,Date,Amount,Currency,Description,Payment Reference,Running Balance,Exchange From,Exchange To,Exchange Rate,Payer Name,Payee Name,Payee Account Number,Merchant
//! TRANSFER-1,15-01-2024,-12.50,USD,Coffee,,100.00,,,,,,,
//! TRANSFER-2,16-01-2024,40.00,EUR,Refund,,60.00,,,,,,,
//! ";
//!
//! let result = config.parse_str(csv).unwrap();
//! assert_eq!(result.statement.len(), 1);
//! assert_eq!(result.skipped, 1);
//! assert_eq!(result.statement.lines[0].memo, "Coffee");
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod config;
pub mod error;
pub mod mapping;
pub mod normalize;
pub mod registry;
pub mod source;

use ofxwise_core::Statement;
use std::io::Read;
use std::path::Path;

pub use config::{ImporterConfig, ImporterConfigBuilder, RowErrorPolicy};
pub use error::ImportError;
pub use mapping::{Field, FieldMapping, NamedMapping, PositionalMapping};
pub use normalize::ParseSession;
pub use registry::{CsvStatementImporter, Importer, ImporterRegistry};
pub use source::{RawRecord, RecordSource};

/// Result of an import operation.
#[derive(Debug)]
pub struct ImportResult {
    /// The normalized statement.
    pub statement: Statement,
    /// Rows dropped by the currency filter.
    pub skipped: usize,
    /// Rows that failed to normalize. Only filled under
    /// [`RowErrorPolicy::Collect`].
    pub row_errors: Vec<ImportError>,
}

/// Parse a CSV export file.
pub fn parse_file(path: &Path, config: &ImporterConfig) -> Result<ImportResult, ImportError> {
    tracing::debug!(path = %path.display(), "parsing statement file");
    let source = RecordSource::open(path, config.delimiter)?;
    parse_records(source, config)
}

/// Parse CSV content held in memory (useful for testing).
pub fn parse_str(content: &str, config: &ImporterConfig) -> Result<ImportResult, ImportError> {
    parse_reader(content.as_bytes(), config)
}

/// Parse CSV content from any reader.
pub fn parse_reader<R: Read>(reader: R, config: &ImporterConfig) -> Result<ImportResult, ImportError> {
    let source = RecordSource::from_reader(reader, config.delimiter)?;
    parse_records(source, config)
}

fn parse_records<R: Read>(
    mut source: RecordSource<R>,
    config: &ImporterConfig,
) -> Result<ImportResult, ImportError> {
    let mut statement = Statement::new();
    statement.currency.clone_from(&config.currency);
    statement.account_id.clone_from(&config.account);

    let mut skipped = 0;
    let mut row_errors = Vec::new();

    // No header row at all: nothing to map, nothing to read
    if source.headers().is_empty() {
        tracing::debug!("empty input");
        return Ok(ImportResult {
            statement,
            skipped,
            row_errors,
        });
    }

    let mut session = ParseSession::new(config, source.headers())?;

    for record in &mut source {
        let record = record?;
        match session.normalize(&record) {
            Ok(Some(line)) => statement.lines.push(line),
            Ok(None) => skipped += 1,
            Err(e) if config.error_policy == RowErrorPolicy::Collect && e.is_row_error() => {
                tracing::warn!(error = %e, "skipping bad row");
                row_errors.push(e);
            }
            Err(e) => return Err(e),
        }
    }

    tracing::info!(
        lines = statement.len(),
        skipped,
        errors = row_errors.len(),
        "parsed statement"
    );

    Ok(ImportResult {
        statement,
        skipped,
        row_errors,
    })
}
