//! Field mappings.
//!
//! A [`FieldMapping`] says where each [`Field`] lives in a CSV row. Two
//! strategies exist:
//!
//! - [`PositionalMapping`] addresses fields by zero-based column index. The
//!   header row is skipped but its names are ignored.
//! - [`NamedMapping`] addresses fields by exact header name. Columns may be
//!   reordered and extra columns are ignored, but every required header must
//!   be present.
//!
//! Either way the mapping is resolved once against the header row into
//! [`ResolvedColumns`], so a missing header fails the parse before any data
//! row is looked at.

use crate::error::ImportError;
use crate::source::RawRecord;
use csv::StringRecord;
use std::collections::HashMap;
use std::fmt;

/// Date format of the legacy TransferWise export.
pub const TRANSFERWISE_DATE_FORMAT: &str = "%d-%m-%Y";

/// Date format of the current Wise export.
pub const WISE_DATE_FORMAT: &str = "%d-%m-%Y %H:%M:%S%.f";

/// A logical field of a transaction row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    /// Stable per-transaction identifier.
    Id,
    /// Reference number kept alongside a synthesized id.
    Refnum,
    /// Transaction date.
    Date,
    /// Signed amount.
    Amount,
    /// Currency code of the amount.
    Currency,
    /// Free-text description.
    Description,
    /// Payment reference entered by the payer.
    PaymentReference,
    /// Source currency of a conversion.
    ExchangeFrom,
    /// Target currency of a conversion.
    ExchangeTo,
    /// Conversion rate.
    ExchangeRate,
    /// Counterparty account number.
    PayeeAccountNumber,
    /// Source-provided transaction type label.
    TransactionType,
}

impl Field {
    /// Human-readable name of the field.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Id => "id",
            Self::Refnum => "reference number",
            Self::Date => "date",
            Self::Amount => "amount",
            Self::Currency => "currency",
            Self::Description => "description",
            Self::PaymentReference => "payment reference",
            Self::ExchangeFrom => "exchange from",
            Self::ExchangeTo => "exchange to",
            Self::ExchangeRate => "exchange rate",
            Self::PayeeAccountNumber => "payee account number",
            Self::TransactionType => "transaction type",
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Index-based field mapping.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PositionalMapping {
    columns: Vec<(Field, usize)>,
    date_format: String,
}

impl PositionalMapping {
    /// Create an empty mapping with the given date format.
    pub fn new(date_format: impl Into<String>) -> Self {
        Self {
            columns: Vec::new(),
            date_format: date_format.into(),
        }
    }

    /// Map `field` to the zero-based column `index`.
    #[must_use]
    pub fn column(mut self, field: Field, index: usize) -> Self {
        self.columns.retain(|(f, _)| *f != field);
        self.columns.push((field, index));
        self
    }

    /// The legacy TransferWise layout.
    ///
    /// Column 0 holds the TransferWise reference, which is kept as the
    /// line's reference number; ids are synthesized.
    pub fn transferwise() -> Self {
        Self::new(TRANSFERWISE_DATE_FORMAT)
            .column(Field::Refnum, 0)
            .column(Field::Date, 1)
            .column(Field::Amount, 2)
            .column(Field::Currency, 3)
            .column(Field::Description, 4)
            .column(Field::PaymentReference, 5)
            .column(Field::ExchangeFrom, 7)
            .column(Field::ExchangeTo, 8)
            .column(Field::ExchangeRate, 9)
            .column(Field::PayeeAccountNumber, 12)
    }

    /// Number of columns a row needs for every mapped index to exist.
    #[must_use]
    pub fn min_width(&self) -> usize {
        self.columns.iter().map(|(_, i)| i + 1).max().unwrap_or(0)
    }

    fn resolve(&self, headers: &StringRecord) -> Result<ResolvedColumns, ImportError> {
        if let Some((_, index)) = self.columns.iter().find(|(_, i)| *i >= headers.len()) {
            return Err(ImportError::MissingColumn {
                column: format!("#{index}"),
            });
        }
        Ok(ResolvedColumns {
            columns: self.columns.iter().copied().collect(),
        })
    }
}

/// A header-name column binding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NamedColumn {
    /// The field this column provides.
    pub field: Field,
    /// Exact header text.
    pub header: String,
    /// Whether the header must be present.
    pub required: bool,
}

/// Header-name-based field mapping.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NamedMapping {
    columns: Vec<NamedColumn>,
    date_format: String,
}

impl NamedMapping {
    /// Create an empty mapping with the given date format.
    pub fn new(date_format: impl Into<String>) -> Self {
        Self {
            columns: Vec::new(),
            date_format: date_format.into(),
        }
    }

    /// Map `field` to a header that must be present.
    #[must_use]
    pub fn column(self, field: Field, header: impl Into<String>) -> Self {
        self.push(field, header.into(), true)
    }

    /// Map `field` to a header that may be absent.
    ///
    /// When the header is missing the field reads as absent on every row.
    #[must_use]
    pub fn optional_column(self, field: Field, header: impl Into<String>) -> Self {
        self.push(field, header.into(), false)
    }

    fn push(mut self, field: Field, header: String, required: bool) -> Self {
        self.columns.retain(|c| c.field != field);
        self.columns.push(NamedColumn {
            field,
            header,
            required,
        });
        self
    }

    /// The current Wise export layout.
    pub fn wise() -> Self {
        Self::new(WISE_DATE_FORMAT)
            .column(Field::Id, "TransferWise ID")
            .column(Field::Date, "Date Time")
            .column(Field::Amount, "Amount")
            .column(Field::Currency, "Currency")
            .column(Field::Description, "Description")
            .optional_column(Field::PaymentReference, "Payment Reference")
            .optional_column(Field::ExchangeFrom, "Exchange From")
            .optional_column(Field::ExchangeTo, "Exchange To")
            .optional_column(Field::ExchangeRate, "Exchange Rate")
            .optional_column(Field::PayeeAccountNumber, "Payee Account Number")
            .optional_column(Field::TransactionType, "Transaction Type")
    }

    /// The configured columns.
    #[must_use]
    pub fn columns(&self) -> &[NamedColumn] {
        &self.columns
    }

    fn resolve(&self, headers: &StringRecord) -> Result<ResolvedColumns, ImportError> {
        let mut by_name: HashMap<&str, usize> = HashMap::new();
        for (i, h) in headers.iter().enumerate() {
            // First occurrence wins; the export never repeats headers
            by_name.entry(h.trim_start_matches('\u{feff}')).or_insert(i);
        }

        let mut columns = HashMap::new();
        for col in &self.columns {
            match by_name.get(col.header.as_str()) {
                Some(&index) => {
                    columns.insert(col.field, index);
                }
                None if col.required => {
                    return Err(ImportError::MissingColumn {
                        column: format!("'{}'", col.header),
                    });
                }
                None => {}
            }
        }
        Ok(ResolvedColumns { columns })
    }
}

/// Where each field lives, chosen when the importer is configured.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldMapping {
    /// Fields addressed by column index.
    Positional(PositionalMapping),
    /// Fields addressed by header name.
    Named(NamedMapping),
}

impl FieldMapping {
    /// The strftime-style format of the date field.
    #[must_use]
    pub fn date_format(&self) -> &str {
        match self {
            Self::Positional(m) => &m.date_format,
            Self::Named(m) => &m.date_format,
        }
    }

    /// Bind the mapping to a header row.
    pub fn resolve(&self, headers: &StringRecord) -> Result<ResolvedColumns, ImportError> {
        match self {
            Self::Positional(m) => m.resolve(headers),
            Self::Named(m) => m.resolve(headers),
        }
    }

    /// Check whether a header row fits this mapping.
    #[must_use]
    pub fn matches_headers(&self, headers: &StringRecord) -> bool {
        self.resolve(headers).is_ok()
    }
}

impl From<PositionalMapping> for FieldMapping {
    fn from(mapping: PositionalMapping) -> Self {
        Self::Positional(mapping)
    }
}

impl From<NamedMapping> for FieldMapping {
    fn from(mapping: NamedMapping) -> Self {
        Self::Named(mapping)
    }
}

/// A mapping bound to concrete column indices.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResolvedColumns {
    columns: HashMap<Field, usize>,
}

impl ResolvedColumns {
    /// Column index of `field`, if it is mapped.
    #[must_use]
    pub fn index(&self, field: Field) -> Option<usize> {
        self.columns.get(&field).copied()
    }

    /// Read `field` from a record.
    ///
    /// Returns `Ok(None)` when the field is unmapped or its value is empty,
    /// and an error when the record is too short for the mapped index.
    pub fn get<'r>(&self, record: &'r RawRecord, field: Field) -> Result<Option<&'r str>, ImportError> {
        let Some(index) = self.index(field) else {
            return Ok(None);
        };
        let value = record.get(index).ok_or(ImportError::FieldOutOfRange {
            row: record.row(),
            index,
            len: record.len(),
        })?;
        Ok(Some(value).filter(|v| !v.is_empty()))
    }
}
