//! High-level pipeline API for Rosetta CSV generation.
//!
//! Combines every step: loading the configuration, schema and input
//! files, building the resolution plan, synthesising rows, rendering the
//! CSV text and, optionally, validating the rows.
//!
//! # Example
//!
//! ```rust,ignore
//! use rosetta_csv::transform::pipeline::{generate, GenerateOptions, GeneratorInputs};
//!
//! let inputs = GeneratorInputs {
//!     droid_export: "droid.csv".into(),
//!     list_control: "list_control.csv".into(),
//!     schema_file: "rosetta_schema.json".into(),
//!     config_file: "config.json".into(),
//!     provenance: Some("prov.notes".into()),
//! };
//! let result = generate(&inputs, &GenerateOptions::default())?;
//! print!("{}", result.text);
//! ```

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::config::{ArgumentsFile, MappingConfig};
use crate::control::read_control_list;
use crate::error::GeneratorResult;
use crate::logs::{log_debug, log_info, log_success, log_warning};
use crate::models::{ContentEntry, ControlItem, OutputRow};
use crate::provenance::{read_exceptions, Exceptions};
use crate::report::read_content_report;
use crate::schema::RosettaSchema;
use crate::validation::{validate_rows, RowViolation};

use super::plan::ResolutionPlan;
use super::serializer::{render, sip_row};
use super::synthesizer::synthesize;

/// Paths of the files one run reads.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeneratorInputs {
    /// DROID content report
    pub droid_export: PathBuf,
    /// List control export
    pub list_control: PathBuf,
    /// Rosetta schema description
    pub schema_file: PathBuf,
    /// Field-mapping configuration
    pub config_file: PathBuf,
    /// Provenance notes; `None` disables provenance
    pub provenance: Option<PathBuf>,
}

impl GeneratorInputs {
    /// Inputs from an arguments file, if it names all four required files.
    pub fn from_arguments(args: &ArgumentsFile) -> Option<Self> {
        Some(Self {
            droid_export: args.droid_export.clone()?,
            list_control: args.list_control.clone()?,
            schema_file: args.schema_file.clone()?,
            config_file: args.config_file.clone()?,
            provenance: args.provenance.clone(),
        })
    }
}

/// Options for a generation run
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GenerateOptions {
    /// Check rows against the schema constraints
    pub validate: bool,
}

/// Result of a complete generation run
#[derive(Debug, Clone)]
pub struct GeneratedCsv {
    /// The CSV document
    pub text: String,
    /// Section rows, SIP row excluded
    pub rows: Vec<OutputRow>,
    pub item_count: usize,
    /// Deliverable files in the pruned content report
    pub entry_count: usize,
    pub provenance_enabled: bool,
    /// Checksums occurring more than once, sorted
    pub duplicates: Vec<String>,
    /// Duplicate candidates to check by hand, sorted
    pub monitored: Vec<String>,
    /// Empty unless validation was requested
    pub violations: Vec<RowViolation>,
}

impl GeneratedCsv {
    /// Data rows written, SIP row included.
    pub fn row_count(&self) -> usize {
        self.rows.len() + 1
    }
}

/// Generate a Rosetta CSV from files.
///
/// Missing or unusable provenance notes disable provenance; every other
/// problem is fatal.
pub fn generate(
    inputs: &GeneratorInputs,
    options: &GenerateOptions,
) -> GeneratorResult<GeneratedCsv> {
    log_info(format!("reading app config from '{}'", inputs.config_file.display()));
    let config = MappingConfig::from_file(&inputs.config_file)?;

    log_debug(format!("reading schema from '{}'", inputs.schema_file.display()));
    let schema = RosettaSchema::from_file(&inputs.schema_file)?;

    let exceptions = provenance_path(inputs.provenance.as_deref(), &config)
        .and_then(|path| read_exceptions(&path));

    log_info(format!("reading DROID report '{}'", inputs.droid_export.display()));
    let entries = read_content_report(&inputs.droid_export)?;

    log_info(format!("reading list control '{}'", inputs.list_control.display()));
    let items = read_control_list(&inputs.list_control)?;

    generate_from_sources(&schema, &config, &items, &entries, exceptions.as_ref(), options)
}

/// Provenance file to read, if provenance was requested.
///
/// A path set in the configuration replaces the requested one. An empty
/// path counts as not requested.
fn provenance_path(requested: Option<&Path>, config: &MappingConfig) -> Option<PathBuf> {
    let requested = requested.filter(|p| !p.as_os_str().is_empty())?;

    match &config.application.provenance_file {
        Some(configured) => {
            log_info(format!(
                "provenance file overridden by config: '{}'",
                configured.display()
            ));
            Some(configured.clone())
        }
        None => Some(requested.to_path_buf()),
    }
}

/// Generate a Rosetta CSV from already loaded sources.
pub fn generate_from_sources(
    schema: &RosettaSchema,
    config: &MappingConfig,
    items: &[ControlItem],
    entries: &[ContentEntry],
    exceptions: Option<&Exceptions>,
    options: &GenerateOptions,
) -> GeneratorResult<GeneratedCsv> {
    let sections = config.layout.resolve()?;
    let plan = ResolutionPlan::build(
        schema,
        &sections,
        &config.mappings,
        &config.application.provenance_hash,
    )?;

    if !plan.uses_content_report() {
        log_warning("no output field is mapped to the DROID report");
    }

    log_debug(format!(
        "{} schema fields, {} sections, {} list control items, {} DROID entries",
        schema.width(),
        plan.sections.len(),
        items.len(),
        entries.len()
    ));

    let synthesis = synthesize(items, entries, exceptions, config, &plan)?;
    let sip_title = config.sip_title();
    let text = render(schema, sip_title, &synthesis.rows);

    for item in &synthesis.monitored {
        log_info(format!("duplicates to monitor: {}", item));
    }

    let violations = if options.validate {
        let mut all_rows = Vec::with_capacity(synthesis.rows.len() + 1);
        all_rows.push(sip_row(schema.width(), sip_title));
        all_rows.extend(synthesis.rows.iter().cloned());
        report_violations(schema, &all_rows)
    } else {
        Vec::new()
    };

    let mut duplicates: Vec<String> = synthesis.duplicates.into_iter().collect();
    duplicates.sort();

    let result = GeneratedCsv {
        text,
        item_count: items.len(),
        entry_count: entries.len(),
        provenance_enabled: exceptions.is_some(),
        duplicates,
        monitored: synthesis.monitored.into_iter().collect(),
        rows: synthesis.rows,
        violations,
    };

    log_success(format!(
        "generated {} rows for {} list control items",
        result.row_count(),
        result.item_count
    ));

    Ok(result)
}

fn report_violations(schema: &RosettaSchema, rows: &[OutputRow]) -> Vec<RowViolation> {
    let violations = validate_rows(schema, rows);

    if violations.is_empty() {
        log_success("all rows satisfy the schema constraints");
    }
    for violation in &violations {
        log_warning(format!(
            "row {} ({}): {}",
            violation.row,
            violation.object_type,
            violation.errors.join("; ")
        ));
    }

    violations
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{ConfigError, GeneratorError};

    const SCHEMA: &str = r#"{
        "title": "test",
        "fields": [
            { "name": "Object Type", "constraints": { "required": true, "pattern": "^(SIP|IE|FILE)$" } },
            { "name": "SIP Title" },
            { "name": "Title (DC)" },
            { "name": "Archway Unique ID (Object Identifier)" },
            { "name": "Event Date" },
            { "name": "File Original Name" },
            { "name": "MD5", "constraints": { "pattern": "^[0-9a-f]{4}$" } }
        ]
    }"#;

    const CONFIG: &str = r#"{
        "application": { "sip_title": "Pipeline test" },
        "mappings": {
            "list_control": {
                "Title (DC)": "Title",
                "Archway Unique ID (Object Identifier)": "Item Code"
            },
            "content_report": { "File Original Name": "NAME", "MD5": "MD5_HASH" }
        },
        "layout": {
            "sections": ["IE", "FILE"],
            "fields": {
                "IE": ["Title (DC)", "Archway Unique ID (Object Identifier)", "Event Date"],
                "FILE": ["File Original Name", "MD5"]
            }
        }
    }"#;

    const DROID: &str = "ID,PARENT_ID,NAME,FILE_PATH,TYPE,MD5_HASH\n1,0,a.doc,R:\\a.doc,File,abcd\n";
    const LIST_CONTROL: &str = "Item Code,Title,Sub-Series,Missing Comment,Restriction Status\nR1,a,S,abcd,O\n";
    const PROV: &str = "RECORDNUMBER,NOTEDATE,NOTETEXT,ORIGINALNAME\nR1,2017-10-27,note,renamed.doc\n";

    struct Fixture {
        _dir: tempfile::TempDir,
        inputs: GeneratorInputs,
    }

    fn fixture() -> Fixture {
        let dir = tempfile::tempdir().unwrap();
        let write = |name: &str, content: &str| {
            let path = dir.path().join(name);
            std::fs::write(&path, content).unwrap();
            path
        };

        let inputs = GeneratorInputs {
            droid_export: write("droid.csv", DROID),
            list_control: write("lc.csv", LIST_CONTROL),
            schema_file: write("schema.json", SCHEMA),
            config_file: write("config.json", CONFIG),
            provenance: Some(write("prov.notes", PROV)),
        };
        Fixture { _dir: dir, inputs }
    }

    #[test]
    fn test_generate_from_files() {
        let fx = fixture();
        let result = generate(&fx.inputs, &GenerateOptions::default()).unwrap();

        let lines: Vec<&str> = result.text.lines().collect();
        assert_eq!(result.row_count(), 3);
        assert_eq!(lines.len(), 4);
        assert_eq!(lines[1], r#""SIP","Pipeline test","","","","","""#);
        assert_eq!(lines[2], r#""IE","","a","R1","2017-10-27","","""#);
        assert_eq!(lines[3], r#""FILE","","","","","renamed.doc","abcd""#);
        assert!(result.provenance_enabled);
        assert!(result.violations.is_empty());
    }

    #[test]
    fn test_provenance_disabled_without_path() {
        let mut fx = fixture();
        fx.inputs.provenance = None;
        let result = generate(&fx.inputs, &GenerateOptions::default()).unwrap();

        assert!(!result.provenance_enabled);
        assert!(result.text.contains(r#""FILE","","","","","a.doc","abcd""#));
    }

    #[test]
    fn test_provenance_empty_path_is_disabled() {
        let mut fx = fixture();
        fx.inputs.provenance = Some(PathBuf::new());
        let result = generate(&fx.inputs, &GenerateOptions::default()).unwrap();
        assert!(!result.provenance_enabled);
    }

    #[test]
    fn test_missing_provenance_file_is_not_fatal() {
        let mut fx = fixture();
        fx.inputs.provenance = Some(fx.inputs.droid_export.with_file_name("nope.notes"));
        let result = generate(&fx.inputs, &GenerateOptions::default()).unwrap();
        assert!(!result.provenance_enabled);
    }

    #[test]
    fn test_missing_config_is_fatal() {
        let mut fx = fixture();
        fx.inputs.config_file = fx.inputs.config_file.with_file_name("missing.json");
        let err = generate(&fx.inputs, &GenerateOptions::default()).unwrap_err();
        assert!(matches!(err, GeneratorError::Config(ConfigError::NotFound(_))));
    }

    #[test]
    fn test_validation_reports_violations() {
        let fx = fixture();
        std::fs::write(
            &fx.inputs.droid_export,
            "ID,PARENT_ID,NAME,FILE_PATH,TYPE,MD5_HASH\n1,0,a.doc,R:\\a.doc,File,ABCD\n",
        )
        .unwrap();
        std::fs::write(
            &fx.inputs.list_control,
            "Item Code,Title,Sub-Series,Missing Comment,Restriction Status\nR1,a,S,ABCD,O\n",
        )
        .unwrap();

        let options = GenerateOptions { validate: true };
        let result = generate(&fx.inputs, &options).unwrap();

        assert_eq!(result.violations.len(), 1);
        assert_eq!(result.violations[0].object_type, "FILE");
        // SIP row is row 1
        assert_eq!(result.violations[0].row, 3);
    }

    #[test]
    fn test_configured_provenance_file_wins() {
        let mut config = MappingConfig::from_json(CONFIG).unwrap();
        config.application.provenance_file = Some(PathBuf::from("/configured/prov.notes"));

        let path = provenance_path(Some(Path::new("cli.notes")), &config);
        assert_eq!(path, Some(PathBuf::from("/configured/prov.notes")));
        assert_eq!(provenance_path(None, &config), None);
    }

    #[test]
    fn test_inputs_from_arguments() {
        let complete = ArgumentsFile {
            droid_export: Some("d.csv".into()),
            list_control: Some("l.csv".into()),
            schema_file: Some("s.json".into()),
            config_file: Some("c.json".into()),
            ..ArgumentsFile::default()
        };
        let inputs = GeneratorInputs::from_arguments(&complete).unwrap();
        assert_eq!(inputs.list_control, PathBuf::from("l.csv"));
        assert_eq!(inputs.provenance, None);

        let partial = ArgumentsFile {
            config_file: None,
            ..complete
        };
        assert!(GeneratorInputs::from_arguments(&partial).is_none());
    }
}
