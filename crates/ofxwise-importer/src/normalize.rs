//! Record normalization.
//!
//! A [`ParseSession`] turns each [`RawRecord`] into zero or one
//! [`StatementLine`]:
//!
//! 1. Read and parse the date and amount.
//! 2. Drop the record if its currency is not the configured one.
//! 3. Build the memo from the description, payment reference and exchange
//!    details.
//! 4. Take the id from the source, or synthesize one.
//! 5. Attach the counterparty account.
//! 6. Use the source's transaction type, or infer it from the amount sign.

use crate::config::ImporterConfig;
use crate::error::ImportError;
use crate::mapping::{Field, ResolvedColumns};
use crate::source::RawRecord;
use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use csv::StringRecord;
use ofxwise_core::{
    generate_unique_transaction_id, BankAccount, IssuedIds, StatementLine, TransactionType,
};
use rust_decimal::Decimal;
use std::str::FromStr;

/// Currency conversion details of a row.
///
/// Only constructed when all three parts are present.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Exchange<'a> {
    /// Source currency.
    pub from: &'a str,
    /// Target currency.
    pub to: &'a str,
    /// Conversion rate, as written in the export.
    pub rate: &'a str,
}

impl<'a> Exchange<'a> {
    /// Combine the three parts, or `None` if any is missing.
    #[must_use]
    pub fn from_parts(from: Option<&'a str>, to: Option<&'a str>, rate: Option<&'a str>) -> Option<Self> {
        Some(Self {
            from: from?,
            to: to?,
            rate: rate?,
        })
    }
}

/// Build a memo: `<description>[ (<reference>)][, <rate> <from>/<to>]`.
#[must_use]
pub fn make_memo(description: &str, reference: Option<&str>, exchange: Option<Exchange<'_>>) -> String {
    let mut memo = description.to_string();
    if let Some(reference) = reference {
        memo.push_str(&format!(" ({reference})"));
    }
    if let Some(Exchange { from, to, rate }) = exchange {
        memo.push_str(&format!(", {rate} {from}/{to}"));
    }
    memo
}

/// Pick the transaction type: the source label when there is one,
/// otherwise the amount sign.
#[must_use]
pub fn infer_trntype(label: Option<&str>, amount: Decimal) -> TransactionType {
    label.map_or_else(|| TransactionType::from_amount(amount), TransactionType::from_label)
}

/// Parse an amount exactly.
///
/// Scale is kept (`12.50` stays `12.50`). A negative zero is read as an
/// unsigned zero of the same scale, so `-0.00` becomes `0.00`.
pub fn parse_amount(row: usize, value: Option<&str>) -> Result<Decimal, ImportError> {
    let value = value.ok_or(ImportError::MissingField {
        row,
        field: Field::Amount,
    })?;
    let amount = Decimal::from_str(value.trim()).map_err(|_| ImportError::InvalidAmount {
        row,
        value: value.to_string(),
    })?;
    Ok(if amount.is_zero() { amount.abs() } else { amount })
}

/// Parse a date or date-time with a strftime-style format.
///
/// Formats without a time component yield midnight.
pub fn parse_date(row: usize, value: Option<&str>, format: &str) -> Result<NaiveDateTime, ImportError> {
    let value = value.ok_or(ImportError::MissingField {
        row,
        field: Field::Date,
    })?;
    let trimmed = value.trim();
    NaiveDateTime::parse_from_str(trimmed, format)
        .or_else(|_| NaiveDate::parse_from_str(trimmed, format).map(|d| d.and_time(NaiveTime::MIN)))
        .map_err(|_| ImportError::InvalidDate {
            row,
            value: value.to_string(),
            format: format.to_string(),
        })
}

/// State for one parse call.
///
/// Owns the set of issued ids, so uniqueness holds within a statement and
/// never leaks between parses.
#[derive(Debug)]
pub struct ParseSession<'a> {
    config: &'a ImporterConfig,
    columns: ResolvedColumns,
    issued: IssuedIds,
}

impl<'a> ParseSession<'a> {
    /// Start a session, binding the configured mapping to `headers`.
    pub fn new(config: &'a ImporterConfig, headers: &StringRecord) -> Result<Self, ImportError> {
        let columns = config.mapping.resolve(headers)?;
        Ok(Self {
            config,
            columns,
            issued: IssuedIds::new(),
        })
    }

    /// Ids issued so far.
    #[must_use]
    pub const fn issued(&self) -> &IssuedIds {
        &self.issued
    }

    /// Normalize one record. `Ok(None)` means the record was filtered out.
    pub fn normalize(&mut self, record: &RawRecord) -> Result<Option<StatementLine>, ImportError> {
        let row = record.row();
        let cols = &self.columns;

        let date = parse_date(
            row,
            cols.get(record, Field::Date)?,
            self.config.mapping.date_format(),
        )?;
        let amount = parse_amount(row, cols.get(record, Field::Amount)?)?;

        let currency = cols.get(record, Field::Currency)?;
        if let Some(target) = self.config.currency.as_deref() {
            if currency != Some(target) {
                tracing::debug!(
                    row,
                    currency = currency.unwrap_or_default(),
                    target,
                    "skipping row in other currency"
                );
                return Ok(None);
            }
        }

        let exchange = Exchange::from_parts(
            cols.get(record, Field::ExchangeFrom)?,
            cols.get(record, Field::ExchangeTo)?,
            cols.get(record, Field::ExchangeRate)?,
        );
        let memo = make_memo(
            cols.get(record, Field::Description)?.unwrap_or_default(),
            cols.get(record, Field::PaymentReference)?,
            exchange,
        );

        let trntype = infer_trntype(cols.get(record, Field::TransactionType)?, amount);
        let mut line = StatementLine::new(date, amount)
            .with_memo(memo)
            .with_trntype(trntype);

        if let Some(refnum) = cols.get(record, Field::Refnum)? {
            line = line.with_refnum(refnum);
        }
        if let Some(acct_id) = cols.get(record, Field::PayeeAccountNumber)? {
            line = line.with_bank_account_to(BankAccount::account_only(acct_id));
        }

        line.id = match cols.get(record, Field::Id)? {
            Some(id) => {
                let issued = self.issued.issue(id);
                if issued != id {
                    tracing::debug!(row, id, issued = %issued, "duplicate source id suffixed");
                }
                issued
            }
            None => generate_unique_transaction_id(&line, &mut self.issued),
        };

        Ok(Some(line))
    }
}
