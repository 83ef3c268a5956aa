//! Transaction id synthesis.
//!
//! Sources without a stable per-transaction identifier get one derived from
//! the line itself. Two lines with the same date, memo and amount hash to the
//! same value, so collisions are resolved against an [`IssuedIds`] set that
//! lives for exactly one parse.

use crate::StatementLine;
use sha2::{Digest, Sha256};
use std::collections::HashSet;

/// Derive an id from a line's date, memo and amount.
///
/// The result is the lowercase hex SHA-256 digest of the three fields in
/// that order. It is deterministic but not unique; see
/// [`generate_unique_transaction_id`].
#[must_use]
pub fn generate_transaction_id(line: &StatementLine) -> String {
    let mut hasher = Sha256::new();
    hasher.update(line.date.to_string().as_bytes());
    hasher.update(line.memo.as_bytes());
    hasher.update(line.amount.to_string().as_bytes());
    format!("{:x}", hasher.finalize())
}

/// Derive an id for `line` and make it unique within `issued`.
pub fn generate_unique_transaction_id(line: &StatementLine, issued: &mut IssuedIds) -> String {
    issued.issue(generate_transaction_id(line))
}

/// The set of ids already handed out during one parse.
#[derive(Debug, Clone, Default)]
pub struct IssuedIds {
    issued: HashSet<String>,
}

impl IssuedIds {
    /// Create an empty set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Issue `candidate`, or `candidate-N` with the smallest `N >= 1` that
    /// has not been issued yet.
    pub fn issue(&mut self, candidate: impl Into<String>) -> String {
        let base = candidate.into();
        let mut id = base.clone();
        let mut counter: u32 = 0;
        while self.issued.contains(&id) {
            counter += 1;
            id = format!("{base}-{counter}");
        }
        self.issued.insert(id.clone());
        id
    }

    /// Check whether an id has been issued.
    #[must_use]
    pub fn contains(&self, id: &str) -> bool {
        self.issued.contains(id)
    }

    /// Number of issued ids.
    #[must_use]
    pub fn len(&self) -> usize {
        self.issued.len()
    }

    /// Check whether nothing has been issued.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.issued.is_empty()
    }
}
