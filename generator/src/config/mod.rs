//! Field-mapping configuration and arguments files.
//!
//! The mapping configuration is a JSON document:
//!
//! ```json
//! {
//!   "application": { "provenance_hash": "MD5", "sip_title": "CSV Load" },
//!   "mappings": {
//!     "static": { "Usage Type": "VIEW" },
//!     "list_control": { "Title (DC)": "Title" },
//!     "content_report": { "MD5": "MD5_HASH" },
//!     "access": { "O": "1916130" }
//!   },
//!   "paths": { "path_mask": "R:\\transfer\\", "sub_series_mask": null },
//!   "layout": {
//!     "sections": ["IE", "REPRESENTATION", "FILE"],
//!     "fields": { "IE": ["Title (DC)"], "REPRESENTATION": ["Usage Type"], "FILE": ["MD5"] }
//!   }
//! }
//! ```
//!
//! Keys are matched exactly first, then case-insensitively.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crate::error::{ConfigError, ConfigResult};
use crate::models::fields;

/// SIP title used when none is configured.
pub const DEFAULT_SIP_TITLE: &str = "CSV Load";

/// Output field receiving checksum overrides when none is configured.
pub const DEFAULT_PROVENANCE_HASH: &str = "MD5";

// =============================================================================
// Mapping tables
// =============================================================================

/// A `key → value` table with case-insensitive fallback lookup.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MappingTable(HashMap<String, String>);

impl MappingTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.0.insert(key.into(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        lookup(&self.0, key).map(String::as_str)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for MappingTable {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}

/// Exact key first, then the lowest case-insensitive match so keys that
/// differ only in case resolve the same way on every run.
fn lookup<'a, T>(map: &'a HashMap<String, T>, key: &str) -> Option<&'a T> {
    map.get(key).or_else(|| {
        map.iter()
            .filter(|(k, _)| k.eq_ignore_ascii_case(key))
            .min_by(|(a, _), (b, _)| a.cmp(b))
            .map(|(_, v)| v)
    })
}

/// The four mapping tables, all keyed by output field name except
/// `access`, which is keyed by raw restriction status.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldMappings {
    /// Literal values
    #[serde(default, rename = "static")]
    pub static_values: MappingTable,
    /// Output field → list control column
    #[serde(default)]
    pub list_control: MappingTable,
    /// Output field → DROID column
    #[serde(default)]
    pub content_report: MappingTable,
    /// Restriction status → Rosetta access policy id
    #[serde(default)]
    pub access: MappingTable,
}

impl FieldMappings {
    /// Translate a raw restriction status; unmapped statuses pass through.
    pub fn translate_access<'a>(&'a self, status: &'a str) -> &'a str {
        self.access.get(status).unwrap_or(status)
    }
}

// =============================================================================
// Settings
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApplicationSettings {
    /// Output field the `CHECKSUM` override applies to
    #[serde(default = "default_provenance_hash")]
    pub provenance_hash: String,
    /// Replaces the provenance path given on the command line
    #[serde(default)]
    pub provenance_file: Option<PathBuf>,
    #[serde(default)]
    pub sip_title: Option<String>,
    /// Refuse to run when duplicate checksums exist without a sub-series mask
    #[serde(default)]
    pub strict_duplicates: bool,
}

fn default_provenance_hash() -> String {
    DEFAULT_PROVENANCE_HASH.to_string()
}

impl Default for ApplicationSettings {
    fn default() -> Self {
        Self {
            provenance_hash: default_provenance_hash(),
            provenance_file: None,
            sip_title: None,
            strict_duplicates: false,
        }
    }
}

/// Path prefixes stripped from DROID paths.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PathSettings {
    /// Removed once from every ingest path
    #[serde(default)]
    pub path_mask: String,
    /// Removed once before comparing a duplicate's path with its sub-series
    #[serde(default)]
    pub sub_series_mask: Option<String>,
}

// =============================================================================
// Section layout
// =============================================================================

/// Section names and the fields each one populates, as written in the file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SectionLayout {
    pub sections: Vec<String>,
    #[serde(default)]
    pub fields: HashMap<String, Vec<String>>,
}

/// One output section with its ordered field list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Section {
    pub name: String,
    pub fields: Vec<String>,
}

impl SectionLayout {
    /// Ordered sections with their field lists.
    ///
    /// Every declared section must have a field list.
    pub fn resolve(&self) -> ConfigResult<Vec<Section>> {
        if self.sections.is_empty() {
            return Err(ConfigError::EmptyLayout);
        }

        self.sections
            .iter()
            .map(|name| {
                lookup(&self.fields, name)
                    .map(|fields| Section {
                        name: name.clone(),
                        fields: fields.clone(),
                    })
                    .ok_or_else(|| ConfigError::MissingFieldSet(name.clone()))
            })
            .collect()
    }
}

// =============================================================================
// Mapping configuration
// =============================================================================

/// The whole field-mapping configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MappingConfig {
    #[serde(default)]
    pub application: ApplicationSettings,
    #[serde(default)]
    pub mappings: FieldMappings,
    #[serde(default)]
    pub paths: PathSettings,
    pub layout: SectionLayout,
}

impl MappingConfig {
    /// Parse a configuration document.
    pub fn from_json(json: &str) -> ConfigResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Read a configuration file. A missing file is fatal.
    pub fn from_file<P: AsRef<Path>>(path: P) -> ConfigResult<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(ConfigError::NotFound(path.to_path_buf()));
        }
        let json = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&json)
    }

    /// Serialize to JSON string
    pub fn to_json(&self) -> ConfigResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Title of the SIP summary row.
    ///
    /// Older configurations put it in the list control table under
    /// `SIP Title`; it is read there as a literal when the application
    /// setting is absent.
    pub fn sip_title(&self) -> &str {
        self.application
            .sip_title
            .as_deref()
            .or_else(|| self.mappings.list_control.get(fields::SIP_TITLE))
            .unwrap_or(DEFAULT_SIP_TITLE)
    }
}

// =============================================================================
// Arguments file
// =============================================================================

/// All input paths gathered in one file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArgumentsFile {
    /// Free text, only logged
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub droid_export: Option<PathBuf>,
    #[serde(default)]
    pub list_control: Option<PathBuf>,
    #[serde(default)]
    pub schema_file: Option<PathBuf>,
    #[serde(default)]
    pub config_file: Option<PathBuf>,
    #[serde(default)]
    pub provenance: Option<PathBuf>,
}

impl ArgumentsFile {
    pub fn from_json(json: &str) -> ConfigResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> ConfigResult<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(ConfigError::NotFound(path.to_path_buf()));
        }
        let json = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&json)
    }

    /// Fill every path this file leaves unset from `flags`.
    pub fn merged_over(self, flags: ArgumentsFile) -> ArgumentsFile {
        ArgumentsFile {
            title: self.title.or(flags.title),
            droid_export: self.droid_export.or(flags.droid_export),
            list_control: self.list_control.or(flags.list_control),
            schema_file: self.schema_file.or(flags.schema_file),
            config_file: self.config_file.or(flags.config_file),
            provenance: self.provenance.or(flags.provenance),
        }
    }
}
