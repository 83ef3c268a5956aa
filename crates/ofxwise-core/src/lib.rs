//! Core types for ofxwise
//!
//! This crate provides the statement model produced by the importers and
//! consumed by the writers:
//!
//! - [`Statement`] - Ordered statement lines plus account/currency metadata
//! - [`StatementLine`] - A single normalized transaction
//! - [`TransactionType`] - `DEBIT`, `CREDIT`, or a label passed through from the source
//! - [`BankAccount`] - A counterparty account
//! - [`IssuedIds`] - The per-parse set that keeps transaction ids unique
//!
//! # Example
//!
//! ```
//! use ofxwise_core::{IssuedIds, Statement, StatementLine, TransactionType, generate_unique_transaction_id};
//! use rust_decimal_macros::dec;
//! use chrono::NaiveDate;
//!
//! let date = NaiveDate::from_ymd_opt(2024, 1, 15).unwrap().and_hms_opt(0, 0, 0).unwrap();
//! let mut issued = IssuedIds::new();
//!
//! let mut first = StatementLine::new(date, dec!(12.50)).with_memo("Coffee");
//! first.id = generate_unique_transaction_id(&first, &mut issued);
//!
//! let mut second = StatementLine::new(date, dec!(12.50)).with_memo("Coffee");
//! second.id = generate_unique_transaction_id(&second, &mut issued);
//!
//! // Identical lines still receive distinct ids
//! assert_ne!(first.id, second.id);
//! assert!(second.id.ends_with("-1"));
//! assert_eq!(first.trntype, TransactionType::Debit);
//!
//! let stmt = Statement::new()
//!     .with_currency("USD")
//!     .with_line(first)
//!     .with_line(second);
//! assert!(stmt.validate().is_ok());
//! assert_eq!(stmt.total(), dec!(25.00));
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod statement;
pub mod unique_id;

pub use statement::{BankAccount, Statement, StatementLine, TransactionType, ValidationError};
pub use unique_id::{generate_transaction_id, generate_unique_transaction_id, IssuedIds};

// Re-export commonly used external types
pub use chrono::{NaiveDate, NaiveDateTime};
pub use rust_decimal::Decimal;
