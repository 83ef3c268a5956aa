//! Registry for importers.

use crate::config::{ImporterConfig, ImporterConfigBuilder};
use crate::error::ImportError;
use crate::mapping::{FieldMapping, NamedMapping, PositionalMapping};
use std::path::Path;
use std::sync::Arc;

/// Trait for file importers.
///
/// An importer knows one export layout. It can tell whether a file looks
/// like that layout and hands out a configuration preset for it; currency,
/// account and error policy are filled in by the caller.
pub trait Importer: Send + Sync {
    /// Returns the name of this importer.
    fn name(&self) -> &str;

    /// Check if this importer can handle the given file.
    ///
    /// This should be fast; implementations look at the extension and the
    /// header row only.
    fn identify(&self, path: &Path) -> bool;

    /// A configuration preset for this layout.
    fn configure(&self) -> ImporterConfigBuilder;

    /// Returns a description of what this importer handles.
    fn description(&self) -> &str {
        self.name()
    }
}

/// An importer for a CSV layout described by a [`FieldMapping`].
#[derive(Debug, Clone)]
pub struct CsvStatementImporter {
    name: &'static str,
    description: &'static str,
    mapping: FieldMapping,
}

impl CsvStatementImporter {
    /// Create an importer for `mapping`.
    pub fn new(name: &'static str, description: &'static str, mapping: impl Into<FieldMapping>) -> Self {
        Self {
            name,
            description,
            mapping: mapping.into(),
        }
    }

    /// The legacy TransferWise export (positional columns).
    pub fn transferwise() -> Self {
        Self::new(
            "transferwise",
            "TransferWise CSV export (legacy column layout)",
            PositionalMapping::transferwise(),
        )
    }

    /// The current Wise export (named columns).
    pub fn wise() -> Self {
        Self::new(
            "wise",
            "Wise CSV export (header-named columns)",
            NamedMapping::wise(),
        )
    }
}

impl Importer for CsvStatementImporter {
    fn name(&self) -> &str {
        self.name
    }

    fn identify(&self, path: &Path) -> bool {
        let is_csv = path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("csv"));
        if !is_csv {
            return false;
        }

        match csv::Reader::from_path(path).and_then(|mut r| r.headers().cloned()) {
            Ok(headers) => self.mapping.matches_headers(&headers),
            Err(e) => {
                tracing::debug!(path = %path.display(), error = %e, "cannot read header");
                false
            }
        }
    }

    fn configure(&self) -> ImporterConfigBuilder {
        ImporterConfig::builder(self.mapping.clone())
    }

    fn description(&self) -> &str {
        self.description
    }
}

/// Registry of importers.
///
/// Importers are tried in registration order, so layouts with stricter
/// header checks should be registered first.
pub struct ImporterRegistry {
    importers: Vec<Arc<dyn Importer>>,
}

impl ImporterRegistry {
    /// Create a new empty registry.
    pub fn new() -> Self {
        Self {
            importers: Vec::new(),
        }
    }

    /// Create a registry holding the built-in Wise and TransferWise importers.
    pub fn with_builtin() -> Self {
        let mut registry = Self::new();
        // Named layout first: any Wise export is also wide enough for the
        // positional layout.
        registry.register(CsvStatementImporter::wise());
        registry.register(CsvStatementImporter::transferwise());
        registry
    }

    /// Register a new importer.
    pub fn register(&mut self, importer: impl Importer + 'static) {
        self.importers.push(Arc::new(importer));
    }

    /// Look up an importer by name.
    pub fn get(&self, name: &str) -> Result<Arc<dyn Importer>, ImportError> {
        self.importers
            .iter()
            .find(|i| i.name() == name)
            .map(Arc::clone)
            .ok_or_else(|| ImportError::UnknownImporter {
                name: name.to_string(),
            })
    }

    /// Find an importer that can handle the given file.
    pub fn identify(&self, path: &Path) -> Result<Arc<dyn Importer>, ImportError> {
        self.importers
            .iter()
            .find(|i| i.identify(path))
            .map(Arc::clone)
            .ok_or_else(|| ImportError::Unrecognized {
                path: path.to_path_buf(),
            })
    }

    /// List all registered importers.
    pub fn list_importers(&self) -> Vec<(&str, &str)> {
        self.importers
            .iter()
            .map(|i| (i.name(), i.description()))
            .collect()
    }

    /// Get the number of registered importers.
    pub fn len(&self) -> usize {
        self.importers.len()
    }

    /// Check if the registry is empty.
    pub fn is_empty(&self) -> bool {
        self.importers.is_empty()
    }
}

impl Default for ImporterRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_csv(dir: &tempfile::TempDir, name: &str, content: &str) -> std::path::PathBuf {
        let path = dir.path().join(name);
        let mut file = std::fs::File::create(&path).unwrap();
        file.write_all(content.as_bytes()).unwrap();
        path
    }

    const LEGACY_HEADER: &str = "TransferWise ID,Date,Amount,Currency,Description,Payment Reference,Running Balance,Exchange From,Exchange To,Exchange Rate,Payer Name,Payee Name,Payee Account Number,Merchant\n";
    const WISE_HEADER: &str = "TransferWise ID,Date,Date Time,Amount,Currency,Description,Payment Reference,Running Balance,Exchange From,Exchange To,Exchange Rate,Payer Name,Payee Name,Payee Account Number,Merchant,Transaction Type\n";

    #[test]
    fn test_registry_builtin() {
        let registry = ImporterRegistry::with_builtin();
        assert_eq!(registry.len(), 2);
        assert!(!registry.is_empty());

        let names: Vec<&str> = registry.list_importers().iter().map(|(n, _)| *n).collect();
        assert_eq!(names, vec!["wise", "transferwise"]);
    }

    #[test]
    fn test_registry_get() {
        let registry = ImporterRegistry::with_builtin();
        assert_eq!(registry.get("transferwise").unwrap().name(), "transferwise");
        assert!(matches!(
            registry.get("revolut"),
            Err(ImportError::UnknownImporter { .. })
        ));
    }

    #[test]
    fn test_registry_identify_by_header() {
        let dir = tempfile::tempdir().unwrap();
        let legacy = write_csv(&dir, "legacy.csv", LEGACY_HEADER);
        let wise = write_csv(&dir, "wise.csv", WISE_HEADER);
        let other = write_csv(&dir, "other.csv", "Date,Amount\n");
        let not_csv = write_csv(&dir, "wise.txt", WISE_HEADER);

        let registry = ImporterRegistry::with_builtin();
        assert_eq!(registry.identify(&legacy).unwrap().name(), "transferwise");
        assert_eq!(registry.identify(&wise).unwrap().name(), "wise");
        assert!(matches!(
            registry.identify(&other),
            Err(ImportError::Unrecognized { .. })
        ));
        assert!(registry.identify(&not_csv).is_err());
    }

    #[test]
    fn test_configure_preset() {
        let config = CsvStatementImporter::wise().configure().currency("USD").build();
        assert!(matches!(config.mapping, FieldMapping::Named(_)));
        assert_eq!(config.currency.as_deref(), Some("USD"));
    }
}
