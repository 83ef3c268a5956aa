//! User settings.
//!
//! Settings live in a JSON file mapping section names to importer presets:
//!
//! ```json
//! {
//!   "wise-usd": { "plugin": "wise", "currency": "USD", "account": "P1234" },
//!   "old-eur": { "plugin": "transferwise", "currency": "EUR", "on_error": "collect" }
//! }
//! ```
//!
//! `ofxwise convert -t wise-usd` then picks the `wise` importer with those
//! values. Command-line flags override section values.

use ofxwise_importer::RowErrorPolicy;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors loading settings.
#[derive(Debug, Error)]
pub enum SettingsError {
    /// The settings file could not be read.
    #[error("failed to read settings {path}: {source}")]
    Io {
        /// The settings path.
        path: PathBuf,
        /// The underlying IO error.
        #[source]
        source: io::Error,
    },

    /// The settings file is not valid.
    #[error("invalid settings in {path}: {source}")]
    Parse {
        /// The settings path.
        path: PathBuf,
        /// The JSON error.
        #[source]
        source: serde_json::Error,
    },
}

/// One named preset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Section {
    /// Registered importer name (`wise` or `transferwise`).
    pub plugin: String,
    /// Currency to keep.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub currency: Option<String>,
    /// Statement account id.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub account: Option<String>,
    /// Bad-record policy.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub on_error: Option<RowErrorPolicy>,
}

/// All configured sections, by name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Settings {
    sections: BTreeMap<String, Section>,
}

/// Default settings location: `<config dir>/ofxwise/config.json`.
pub fn default_path() -> Option<PathBuf> {
    dirs::config_dir().map(|p| p.join("ofxwise").join("config.json"))
}

impl Settings {
    /// Load settings from `path`.
    pub fn load(path: &Path) -> Result<Self, SettingsError> {
        let content = fs::read_to_string(path).map_err(|source| SettingsError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&content).map_err(|source| SettingsError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Load settings from the default location.
    ///
    /// A missing file yields empty settings.
    pub fn load_default() -> Result<Self, SettingsError> {
        match default_path() {
            Some(path) if path.exists() => Self::load(&path),
            _ => Ok(Self::default()),
        }
    }

    /// Parse settings from JSON text.
    pub fn from_json(content: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(content)
    }

    /// Look up a section.
    pub fn section(&self, name: &str) -> Option<&Section> {
        self.sections.get(name)
    }

    /// Iterate over sections in name order.
    pub fn sections(&self) -> impl Iterator<Item = (&str, &Section)> {
        self.sections.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Add or replace a section.
    pub fn insert(&mut self, name: impl Into<String>, section: Section) {
        self.sections.insert(name.into(), section);
    }
}
