//! # Rosetta CSV - ingest loads from DROID reports and list control exports
//!
//! Reconciles a DROID content report with an archival list control export
//! and writes the CSV that Rosetta's CSV deposit expects: a header row of
//! schema field titles, a SIP row, then one row per configured section
//! (`IE`, `REPRESENTATION`, `FILE`, ...) for every list control item.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────┐     ┌─────────────┐     ┌─────────────┐     ┌─────────────┐
//! │ DROID + LC  │────▶│   Parser    │────▶│  Transform  │────▶│ Rosetta CSV │
//! │ (ISO/UTF8)  │     │  (auto-enc) │     │(plan + match)│     │  (quoted)   │
//! └─────────────┘     └─────────────┘     └─────────────┘     └─────────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use rosetta_csv::{generate, GenerateOptions, GeneratorInputs};
//!
//! let inputs = GeneratorInputs {
//!     droid_export: "droid.csv".into(),
//!     list_control: "list_control.csv".into(),
//!     schema_file: "rosetta_schema.json".into(),
//!     config_file: "config.json".into(),
//!     provenance: None,
//! };
//! let result = generate(&inputs, &GenerateOptions::default()).unwrap();
//! print!("{}", result.text);
//! ```
//!
//! ## Modules
//!
//! - [`error`] - Hierarchical error types
//! - [`logs`] - Run logging to stderr
//! - [`models`] - Domain models (ContentEntry, ControlItem, OutputRow)
//! - [`parser`] - CSV parsing with auto-detection
//! - [`config`] - Field mappings, paths and section layout
//! - [`schema`] - Rosetta schema description
//! - [`report`] - DROID content report loading and pruning
//! - [`control`] - List control loading
//! - [`provenance`] - Provenance exception notes
//! - [`transform`] - Plan, matching, synthesis and pipeline
//! - [`validation`] - Row validation against schema constraints

// Core modules
pub mod error;
pub mod logs;
pub mod models;

// Parsing
pub mod parser;

// Inputs
pub mod config;
pub mod control;
pub mod provenance;
pub mod report;
pub mod schema;

// Transformation
pub mod transform;

// Validation
pub mod validation;

// =============================================================================
// Re-exports - Error types
// =============================================================================

pub use error::{
    ConfigError,
    CsvError,
    GeneratorError,
    GeneratorResult,
    ReportError,
    SchemaError,
    SynthesisError,
};

// =============================================================================
// Re-exports - Models
// =============================================================================

pub use models::{
    ContentEntry,
    ControlItem,
    ExceptionRecord,
    HashAlgorithm,
    OutputRow,
    Override,
    OverrideKind,
};

// =============================================================================
// Re-exports - CSV Parsing
// =============================================================================

pub use parser::{
    decode_content,
    detect_delimiter,
    detect_encoding,
    parse_bytes_auto,
    parse_file_auto,
    parse_str,
    Row,
    Table,
};

// =============================================================================
// Re-exports - Inputs
// =============================================================================

pub use config::{ArgumentsFile, FieldMappings, MappingConfig, MappingTable, SectionLayout};
pub use control::read_control_list;
pub use provenance::{read_exceptions, Exceptions};
pub use report::{find_duplicate_hashes, read_content_report};
pub use schema::RosettaSchema;

// =============================================================================
// Re-exports - Transformation
// =============================================================================

pub use transform::{
    generate,
    generate_from_sources,
    render,
    synthesize,
    ContentMatcher,
    GenerateOptions,
    GeneratedCsv,
    GeneratorInputs,
    ResolutionPlan,
};

// =============================================================================
// Re-exports - Validation
// =============================================================================

pub use validation::{is_valid, row_schema, validate, validate_rows, RowViolation};
