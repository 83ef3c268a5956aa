//! Configuration for importers.

use crate::error::ImportError;
use crate::mapping::{FieldMapping, NamedMapping, PositionalMapping};
use crate::ImportResult;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// What to do with a record that cannot be normalized.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RowErrorPolicy {
    /// Fail the whole parse on the first bad record. No statement is returned.
    #[default]
    Abort,
    /// Skip bad records and report them in [`ImportResult::row_errors`].
    Collect,
}

/// Configuration for one import.
#[derive(Debug, Clone)]
pub struct ImporterConfig {
    /// Only rows in this currency are kept. `None` keeps every row.
    pub currency: Option<String>,
    /// Statement account id, passed through to the statement.
    pub account: Option<String>,
    /// Where each field lives in a row.
    pub mapping: FieldMapping,
    /// Bad-record policy.
    pub error_policy: RowErrorPolicy,
    /// The field delimiter.
    pub delimiter: u8,
}

impl ImporterConfig {
    /// Start building a configuration for an arbitrary mapping.
    pub fn builder(mapping: impl Into<FieldMapping>) -> ImporterConfigBuilder {
        ImporterConfigBuilder::new(mapping.into())
    }

    /// Start building a configuration for the legacy TransferWise export.
    pub fn transferwise() -> ImporterConfigBuilder {
        Self::builder(PositionalMapping::transferwise())
    }

    /// Start building a configuration for the current Wise export.
    pub fn wise() -> ImporterConfigBuilder {
        Self::builder(NamedMapping::wise())
    }

    /// Parse a file.
    pub fn parse_file(&self, path: &Path) -> Result<ImportResult, ImportError> {
        crate::parse_file(path, self)
    }

    /// Parse string content.
    pub fn parse_str(&self, content: &str) -> Result<ImportResult, ImportError> {
        crate::parse_str(content, self)
    }
}

/// Builder for [`ImporterConfig`].
#[derive(Debug, Clone)]
pub struct ImporterConfigBuilder {
    currency: Option<String>,
    account: Option<String>,
    mapping: FieldMapping,
    error_policy: RowErrorPolicy,
    delimiter: u8,
}

impl ImporterConfigBuilder {
    /// Create a builder for `mapping` with default settings.
    pub const fn new(mapping: FieldMapping) -> Self {
        Self {
            currency: None,
            account: None,
            mapping,
            error_policy: RowErrorPolicy::Abort,
            delimiter: b',',
        }
    }

    /// Keep only rows in this currency.
    pub fn currency(mut self, currency: impl Into<String>) -> Self {
        self.currency = Some(currency.into());
        self
    }

    /// Set or clear the target currency.
    pub fn maybe_currency(mut self, currency: Option<String>) -> Self {
        self.currency = currency;
        self
    }

    /// Set the statement account id.
    pub fn account(mut self, account: impl Into<String>) -> Self {
        self.account = Some(account.into());
        self
    }

    /// Set or clear the statement account id.
    pub fn maybe_account(mut self, account: Option<String>) -> Self {
        self.account = account;
        self
    }

    /// Set the bad-record policy.
    pub const fn error_policy(mut self, policy: RowErrorPolicy) -> Self {
        self.error_policy = policy;
        self
    }

    /// Set the field delimiter.
    pub const fn delimiter(mut self, delimiter: u8) -> Self {
        self.delimiter = delimiter;
        self
    }

    /// Build the configuration.
    pub fn build(self) -> ImporterConfig {
        ImporterConfig {
            currency: self.currency,
            account: self.account,
            mapping: self.mapping,
            error_policy: self.error_policy,
            delimiter: self.delimiter,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mapping::WISE_DATE_FORMAT;

    #[test]
    fn test_builder_defaults() {
        let config = ImporterConfig::transferwise().build();
        assert_eq!(config.currency, None);
        assert_eq!(config.account, None);
        assert_eq!(config.error_policy, RowErrorPolicy::Abort);
        assert_eq!(config.delimiter, b',');
        assert!(matches!(config.mapping, FieldMapping::Positional(_)));
    }

    #[test]
    fn test_builder_settings() {
        let config = ImporterConfig::wise()
            .currency("EUR")
            .account("P12345")
            .error_policy(RowErrorPolicy::Collect)
            .delimiter(b';')
            .build();
        assert_eq!(config.currency.as_deref(), Some("EUR"));
        assert_eq!(config.account.as_deref(), Some("P12345"));
        assert_eq!(config.error_policy, RowErrorPolicy::Collect);
        assert_eq!(config.delimiter, b';');
        assert_eq!(config.mapping.date_format(), WISE_DATE_FORMAT);
    }

    #[test]
    fn test_maybe_setters_clear() {
        let config = ImporterConfig::wise()
            .currency("EUR")
            .maybe_currency(None)
            .maybe_account(Some("A1".to_string()))
            .build();
        assert_eq!(config.currency, None);
        assert_eq!(config.account.as_deref(), Some("A1"));
    }
}
