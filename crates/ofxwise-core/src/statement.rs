//! Statement types.
//!
//! A [`Statement`] is the complete output of one parse: the accepted lines in
//! source order together with the statement-level currency and account id,
//! both of which come from configuration rather than from the rows.

use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// The OFX transaction type of a statement line.
///
/// Only `DEBIT` and `CREDIT` are ever inferred. Any other label supplied by
/// the source is carried through unchanged in [`TransactionType::Other`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TransactionType {
    /// Money leaving the account (`DEBIT`).
    Debit,
    /// Money entering the account (`CREDIT`).
    Credit,
    /// A source-provided label other than `DEBIT`/`CREDIT`.
    Other(String),
}

impl TransactionType {
    /// Infer the type from the sign of an amount.
    ///
    /// Positive amounts are money leaving the statemented account, so they
    /// are `DEBIT`. Zero and negative amounts are `CREDIT`.
    #[must_use]
    pub fn from_amount(amount: Decimal) -> Self {
        if amount > Decimal::ZERO {
            Self::Debit
        } else {
            Self::Credit
        }
    }

    /// Map a label to a type. `DEBIT` and `CREDIT` are matched exactly;
    /// anything else is kept as [`TransactionType::Other`].
    #[must_use]
    pub fn from_label(label: &str) -> Self {
        match label {
            "DEBIT" => Self::Debit,
            "CREDIT" => Self::Credit,
            other => Self::Other(other.to_string()),
        }
    }

    /// Get the label as written in OFX.
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Debit => "DEBIT",
            Self::Credit => "CREDIT",
            Self::Other(label) => label,
        }
    }
}

impl fmt::Display for TransactionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TransactionType {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::from_label(s))
    }
}

impl Serialize for TransactionType {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for TransactionType {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Ok(Self::from_label(&s))
    }
}

/// A bank account reference.
///
/// For counterparties only the account number is usually known, so
/// `bank_id` is left empty.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BankAccount {
    /// Bank identifier (routing number, BIC, ...). May be empty.
    pub bank_id: String,
    /// Account number.
    pub acct_id: String,
}

impl BankAccount {
    /// Create a new bank account reference.
    #[must_use]
    pub fn new(bank_id: impl Into<String>, acct_id: impl Into<String>) -> Self {
        Self {
            bank_id: bank_id.into(),
            acct_id: acct_id.into(),
        }
    }

    /// Create a reference where only the account number is known.
    #[must_use]
    pub fn account_only(acct_id: impl Into<String>) -> Self {
        Self::new(String::new(), acct_id)
    }
}

/// A single normalized transaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatementLine {
    /// Transaction id, unique within its statement.
    pub id: String,
    /// Date (and time, when the source has one) the transaction was posted.
    pub date: NaiveDateTime,
    /// Exact amount. Positive means money leaving the account.
    pub amount: Decimal,
    /// Human-readable description.
    pub memo: String,
    /// Transaction type.
    pub trntype: TransactionType,
    /// Source reference number, when it is not used as the id.
    pub refnum: Option<String>,
    /// Counterparty account.
    pub bank_account_to: Option<BankAccount>,
}

impl StatementLine {
    /// Create a new line with an empty id and memo.
    ///
    /// The transaction type is inferred from the sign of `amount`.
    #[must_use]
    pub fn new(date: NaiveDateTime, amount: Decimal) -> Self {
        Self {
            id: String::new(),
            date,
            amount,
            memo: String::new(),
            trntype: TransactionType::from_amount(amount),
            refnum: None,
            bank_account_to: None,
        }
    }

    /// Set the id.
    #[must_use]
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = id.into();
        self
    }

    /// Set the memo.
    #[must_use]
    pub fn with_memo(mut self, memo: impl Into<String>) -> Self {
        self.memo = memo.into();
        self
    }

    /// Set the transaction type.
    #[must_use]
    pub fn with_trntype(mut self, trntype: TransactionType) -> Self {
        self.trntype = trntype;
        self
    }

    /// Set the reference number.
    #[must_use]
    pub fn with_refnum(mut self, refnum: impl Into<String>) -> Self {
        self.refnum = Some(refnum.into());
        self
    }

    /// Set the counterparty account.
    #[must_use]
    pub fn with_bank_account_to(mut self, account: BankAccount) -> Self {
        self.bank_account_to = Some(account);
        self
    }
}

/// Errors found by [`Statement::validate`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// A line has no id.
    #[error("line {index} has an empty transaction id")]
    EmptyId {
        /// Zero-based index of the line.
        index: usize,
    },

    /// Two lines share an id.
    #[error("duplicate transaction id {id} at line {index}")]
    DuplicateId {
        /// The repeated id.
        id: String,
        /// Zero-based index of the second occurrence.
        index: usize,
    },
}

/// A complete statement.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Statement {
    /// Statement currency, from configuration.
    pub currency: Option<String>,
    /// Account being statemented, from configuration.
    pub account_id: Option<String>,
    /// Lines in source order.
    pub lines: Vec<StatementLine>,
}

impl Statement {
    /// Create an empty statement.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the currency.
    #[must_use]
    pub fn with_currency(mut self, currency: impl Into<String>) -> Self {
        self.currency = Some(currency.into());
        self
    }

    /// Set the account id.
    #[must_use]
    pub fn with_account_id(mut self, account_id: impl Into<String>) -> Self {
        self.account_id = Some(account_id.into());
        self
    }

    /// Add a line.
    #[must_use]
    pub fn with_line(mut self, line: StatementLine) -> Self {
        self.lines.push(line);
        self
    }

    /// Get the number of lines.
    #[must_use]
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    /// Check whether the statement has no lines.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Earliest and latest line dates, or `None` for an empty statement.
    #[must_use]
    pub fn date_range(&self) -> Option<(NaiveDateTime, NaiveDateTime)> {
        let start = self.lines.iter().map(|l| l.date).min()?;
        let end = self.lines.iter().map(|l| l.date).max()?;
        Some((start, end))
    }

    /// Exact sum of all line amounts.
    #[must_use]
    pub fn total(&self) -> Decimal {
        self.lines.iter().map(|l| l.amount).sum()
    }

    /// Check that every line has a non-empty id and that ids are unique.
    pub fn validate(&self) -> Result<(), ValidationError> {
        let mut seen = HashSet::with_capacity(self.lines.len());
        for (index, line) in self.lines.iter().enumerate() {
            if line.id.is_empty() {
                return Err(ValidationError::EmptyId { index });
            }
            if !seen.insert(line.id.as_str()) {
                return Err(ValidationError::DuplicateId {
                    id: line.id.clone(),
                    index,
                });
            }
        }
        Ok(())
    }
}
