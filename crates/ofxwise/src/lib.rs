//! Wise/TransferWise statement conversion tools.
//!
//! This crate provides the `ofxwise` command:
//!
//! - `ofxwise convert`: Parse a CSV export and write OFX or JSON
//! - `ofxwise list-plugins`: List the available importers
//!
//! # Example Usage
//!
//! ```bash
//! ofxwise convert -t transferwise --currency EUR statement.csv statement.ofx
//! ofxwise convert --format json statement.csv
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod cmd;
pub mod ofx;
pub mod settings;
