//! Rosetta schema description.
//!
//! A JSON Table Schema document whose `fields` list fixes the output
//! columns: their names, their order and the constraints checked by
//! [`crate::validation`].

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::{SchemaError, SchemaResult};

/// Column constraints of one schema field.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldConstraints {
    #[serde(default)]
    pub required: bool,
    /// Regular expression; empty means unconstrained
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pattern: Option<String>,
}

impl FieldConstraints {
    /// Pattern, if one is set and non-empty.
    pub fn pattern(&self) -> Option<&str> {
        self.pattern.as_deref().filter(|p| !p.is_empty())
    }
}

/// One output column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchemaField {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(rename = "type", default)]
    pub field_type: String,
    #[serde(default)]
    pub constraints: FieldConstraints,
}

/// Ordered field list of the Rosetta CSV.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RosettaSchema {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub fields: Vec<SchemaField>,
}

impl RosettaSchema {
    /// Parse a schema document.
    pub fn from_json(json: &str) -> SchemaResult<Self> {
        let schema: RosettaSchema = serde_json::from_str(json)?;
        if schema.fields.is_empty() {
            return Err(SchemaError::NoFields);
        }
        Ok(schema)
    }

    /// Read and parse a schema file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> SchemaResult<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|source| SchemaError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&json)
    }

    /// Number of output columns.
    pub fn width(&self) -> usize {
        self.fields.len()
    }

    pub fn field(&self, column: usize) -> Option<&SchemaField> {
        self.fields.get(column)
    }

    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|f| f.name.as_str())
    }

    /// Every field name double-quoted and comma-joined, no line ending.
    pub fn header_line(&self) -> String {
        self.field_names()
            .map(|name| format!("\"{}\"", name))
            .collect::<Vec<_>>()
            .join(",")
    }
}
