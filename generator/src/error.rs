//! Error types for the Rosetta CSV generator.
//!
//! Every loader and the synthesis engine has its own error enum:
//!
//! - [`CsvError`] - tabular source reading
//! - [`ConfigError`] - mapping configuration and arguments files
//! - [`SchemaError`] - Rosetta schema description
//! - [`ReportError`] - DROID content report contents
//! - [`SynthesisError`] - row synthesis and layout alignment
//! - [`GeneratorError`] - top-level error returned by the pipeline
//!
//! Error conversion is automatic via `From` implementations,
//! allowing `?` to work across error boundaries.

use std::path::PathBuf;
use thiserror::Error;

// =============================================================================
// CSV Parsing Errors
// =============================================================================

/// Errors while reading a delimited source file.
#[derive(Debug, Error)]
pub enum CsvError {
    /// Failed to read file.
    #[error("Failed to read '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Invalid CSV content.
    #[error("Invalid CSV at line {line}: {message}")]
    Parse { line: u64, message: String },

    /// Empty file.
    #[error("CSV file is empty")]
    EmptyFile,

    /// No headers found.
    #[error("No headers found in CSV")]
    NoHeaders,
}

// =============================================================================
// Configuration Errors
// =============================================================================

/// Errors loading the field-mapping configuration or an arguments file.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The configuration file does not exist.
    #[error("Configuration file not found: {0}")]
    NotFound(PathBuf),

    /// Failed to read the configuration file.
    #[error("Failed to read configuration '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Malformed configuration document.
    #[error("Invalid configuration: {0}")]
    Json(#[from] serde_json::Error),

    /// A section is listed in the layout without a field list.
    #[error("No field list configured for section '{0}'")]
    MissingFieldSet(String),

    /// The layout lists no sections at all.
    #[error("No output sections configured")]
    EmptyLayout,
}

// =============================================================================
// Schema Errors
// =============================================================================

/// Errors loading the Rosetta schema description.
#[derive(Debug, Error)]
pub enum SchemaError {
    /// Failed to read the schema file.
    #[error("Failed to read schema '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Malformed schema document.
    #[error("Invalid schema: {0}")]
    Json(#[from] serde_json::Error),

    /// The schema declares no fields.
    #[error("Schema declares no fields")]
    NoFields,
}

// =============================================================================
// Content Report Errors
// =============================================================================

/// Errors in the DROID content report.
#[derive(Debug, Error)]
pub enum ReportError {
    /// A row carries none of the recognised hash columns.
    #[error("No hash available to use in DROID export (row {row})")]
    NoHashColumn { row: usize },
}

// =============================================================================
// Synthesis Errors
// =============================================================================

/// Errors while building the resolution plan or synthesising rows.
#[derive(Debug, Error)]
pub enum SynthesisError {
    /// A layout field does not line up with the schema at the current column.
    #[error("Field in config: '{field}' is not aligned with JSON schema '{expected}' (column {column})")]
    Misaligned {
        field: String,
        expected: String,
        column: usize,
    },

    /// The layout runs past the last schema column.
    #[error("Field in config: '{field}' has no schema column (column {column} of {width})")]
    PastSchemaEnd {
        field: String,
        column: usize,
        width: usize,
    },

    /// A list control mapping names a column the item does not have.
    #[error("List control column '{column}' (mapped to '{field}') is missing")]
    MissingControlColumn { field: String, column: String },

    /// A content report mapping names a column the matched entry does not have.
    #[error("DROID column '{column}' (mapped to '{field}') is missing")]
    MissingReportColumn { field: String, column: String },

    /// Duplicate checksums exist but no sub-series mask is configured.
    #[error("{0} duplicate checksum(s) in DROID report but no sub-series mask is configured")]
    DuplicatesWithoutMask(usize),
}

// =============================================================================
// Generator Errors (top-level)
// =============================================================================

/// Top-level generation error.
///
/// This is the error type returned by [`crate::transform::pipeline::generate`].
#[derive(Debug, Error)]
pub enum GeneratorError {
    /// Source file reading error.
    #[error("CSV error: {0}")]
    Csv(#[from] CsvError),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Schema error.
    #[error("Schema error: {0}")]
    Schema(#[from] SchemaError),

    /// Content report error.
    #[error("DROID report error: {0}")]
    Report(#[from] ReportError),

    /// Synthesis error.
    #[error("Synthesis error: {0}")]
    Synthesis(#[from] SynthesisError),

    /// Writing the output failed.
    #[error("Failed to write output '{path}': {source}")]
    Output {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

// =============================================================================
// Result Type Aliases
// =============================================================================

/// Result type for CSV operations.
pub type CsvResult<T> = Result<T, CsvError>;

/// Result type for configuration loading.
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Result type for schema loading.
pub type SchemaResult<T> = Result<T, SchemaError>;

/// Result type for content report loading.
pub type ReportResult<T> = Result<T, ReportError>;

/// Result type for synthesis.
pub type SynthesisResult<T> = Result<T, SynthesisError>;

/// Result type for the whole generator.
pub type GeneratorResult<T> = Result<T, GeneratorError>;
