//! Resolution plan
//!
//! Decides once, before any row is produced, where every output field of
//! every section takes its value from. Building the plan also checks that
//! the section layout walks the schema in lockstep.

use crate::config::{FieldMappings, Section};
use crate::error::{SynthesisError, SynthesisResult};
use crate::models::{fields, ExceptionRecord, OverrideKind};
use crate::schema::RosettaSchema;

/// Column of the first section field. Column 0 holds the object type and
/// column 1 the SIP title.
pub const FIRST_FIELD_COLUMN: usize = 2;

/// A provenance event field filled from an exception record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProvenanceSlot {
    IdentifierType,
    IdentifierValue,
    EventType,
    Description,
    Date,
    Outcome,
    OutcomeDetail,
}

impl ProvenanceSlot {
    /// Slot written to the output field `name`, if any.
    pub fn for_field(name: &str) -> Option<Self> {
        match name {
            fields::EVENT_IDENTIFIER_TYPE => Some(Self::IdentifierType),
            fields::EVENT_IDENTIFIER_VALUE => Some(Self::IdentifierValue),
            fields::EVENT_TYPE => Some(Self::EventType),
            fields::EVENT_DESCRIPTION => Some(Self::Description),
            fields::EVENT_DATE => Some(Self::Date),
            fields::EVENT_OUTCOME => Some(Self::Outcome),
            fields::EVENT_OUTCOME_DETAIL => Some(Self::OutcomeDetail),
            _ => None,
        }
    }

    pub fn value(self, record: &ExceptionRecord) -> &str {
        match self {
            Self::IdentifierType => "EXTERNAL",
            Self::IdentifierValue => "EXT_1",
            Self::EventType => "CREATION",
            Self::Description => "Provenance Note",
            Self::Date => &record.note_date,
            Self::Outcome => "SUCCESS",
            Self::OutcomeDetail => &record.note_text,
        }
    }
}

/// Where one output field takes its value from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldSource {
    /// Literal value from the static table
    Static(String),
    /// A list control column
    ListControl {
        column: String,
        /// Translate through the access table
        translate_access: bool,
    },
    /// A column of the matched DROID entry
    ContentReport {
        column: String,
        /// Rewrite the value as a repository-relative directory
        ingest_path: bool,
        /// Exception override consulted first
        override_kind: Option<OverrideKind>,
    },
    /// A provenance event field
    Provenance(ProvenanceSlot),
    Empty,
}

impl FieldSource {
    /// Pick the source for `field`: static, then list control, then
    /// content report, then provenance slot.
    pub fn for_field(field: &str, mappings: &FieldMappings, provenance_hash: &str) -> Self {
        if let Some(value) = mappings.static_values.get(field) {
            return FieldSource::Static(value.to_string());
        }

        if let Some(column) = mappings.list_control.get(field) {
            return FieldSource::ListControl {
                column: column.to_string(),
                translate_access: field == fields::ACCESS_RIGHTS,
            };
        }

        if let Some(column) = mappings.content_report.get(field) {
            let override_kind = if field == fields::FILE_ORIGINAL_NAME {
                Some(OverrideKind::OriginalName)
            } else if field == provenance_hash {
                Some(OverrideKind::Checksum)
            } else {
                None
            };

            return FieldSource::ContentReport {
                column: column.to_string(),
                ingest_path: field == fields::FILE_ORIGINAL_PATH,
                override_kind,
            };
        }

        ProvenanceSlot::for_field(field)
            .map(FieldSource::Provenance)
            .unwrap_or(FieldSource::Empty)
    }
}

/// One field of a section, pinned to its output column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldPlan {
    pub name: String,
    pub column: usize,
    pub source: FieldSource,
    /// Reaching this field makes the item's `Item Code` the key for
    /// exception lookups
    pub sets_record_number: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SectionPlan {
    /// Written to column 0
    pub name: String,
    pub fields: Vec<FieldPlan>,
}

/// Per-section, per-field resolution for a whole run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolutionPlan {
    /// Schema width; every row has this many cells
    pub width: usize,
    pub sections: Vec<SectionPlan>,
}

impl ResolutionPlan {
    /// Pin every layout field to a schema column.
    ///
    /// The column cursor starts at [`FIRST_FIELD_COLUMN`] and advances by
    /// one per field across all sections. Each field must carry the name of
    /// the schema field at the cursor.
    pub fn build(
        schema: &RosettaSchema,
        sections: &[Section],
        mappings: &FieldMappings,
        provenance_hash: &str,
    ) -> SynthesisResult<Self> {
        let width = schema.width();
        let mut column = FIRST_FIELD_COLUMN;
        let mut planned = Vec::with_capacity(sections.len());

        for section in sections {
            let mut fields_plan = Vec::with_capacity(section.fields.len());

            for field in &section.fields {
                let expected = schema
                    .field(column)
                    .ok_or_else(|| SynthesisError::PastSchemaEnd {
                        field: field.clone(),
                        column,
                        width,
                    })?;

                if expected.name != *field {
                    return Err(SynthesisError::Misaligned {
                        field: field.clone(),
                        expected: expected.name.clone(),
                        column,
                    });
                }

                fields_plan.push(FieldPlan {
                    name: field.clone(),
                    column,
                    source: FieldSource::for_field(field, mappings, provenance_hash),
                    sets_record_number: field == fields::OBJECT_IDENTIFIER,
                });
                column += 1;
            }

            planned.push(SectionPlan {
                name: section.name.clone(),
                fields: fields_plan,
            });
        }

        Ok(Self {
            width,
            sections: planned,
        })
    }

    /// Whether any field reads from the content report.
    pub fn uses_content_report(&self) -> bool {
        self.fields()
            .any(|f| matches!(f.source, FieldSource::ContentReport { .. }))
    }

    pub fn fields(&self) -> impl Iterator<Item = &FieldPlan> {
        self.sections.iter().flat_map(|s| s.fields.iter())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::MappingTable;
    use crate::schema::{FieldConstraints, SchemaField};

    fn schema(names: &[&str]) -> RosettaSchema {
        RosettaSchema {
            title: String::new(),
            description: String::new(),
            fields: names
                .iter()
                .map(|n| SchemaField {
                    name: n.to_string(),
                    description: String::new(),
                    field_type: String::new(),
                    constraints: FieldConstraints::default(),
                })
                .collect(),
        }
    }

    fn section(name: &str, fields: &[&str]) -> Section {
        Section {
            name: name.to_string(),
            fields: fields.iter().map(|f| f.to_string()).collect(),
        }
    }

    fn mappings() -> FieldMappings {
        FieldMappings {
            static_values: MappingTable::from_iter([("Usage Type", "VIEW")]),
            list_control: MappingTable::from_iter([
                ("Title (DC)", "Title"),
                ("Access Rights Policy ID (IE)", "Restriction Status"),
                ("Archway Unique ID (Object Identifier)", "Item Code"),
                ("Usage Type", "Ignored"),
            ]),
            content_report: MappingTable::from_iter([
                ("File Original Path", "FILE_PATH"),
                ("File Original Name", "NAME"),
                ("MD5", "MD5_HASH"),
            ]),
            access: MappingTable::new(),
        }
    }

    const SCHEMA: [&str; 10] = [
        "Object Type",
        "SIP Title",
        "Title (DC)",
        "Access Rights Policy ID (IE)",
        "Archway Unique ID (Object Identifier)",
        "Event Date",
        "Usage Type",
        "File Original Path",
        "File Original Name",
        "MD5",
    ];

    fn layout() -> Vec<Section> {
        vec![
            section(
                "IE",
                &[
                    "Title (DC)",
                    "Access Rights Policy ID (IE)",
                    "Archway Unique ID (Object Identifier)",
                    "Event Date",
                ],
            ),
            section("REPRESENTATION", &["Usage Type"]),
            section("FILE", &["File Original Path", "File Original Name", "MD5"]),
        ]
    }

    #[test]
    fn test_columns_run_across_sections() {
        let plan = ResolutionPlan::build(&schema(&SCHEMA), &layout(), &mappings(), "MD5").unwrap();

        assert_eq!(plan.width, 10);
        let columns: Vec<usize> = plan.fields().map(|f| f.column).collect();
        assert_eq!(columns, vec![2, 3, 4, 5, 6, 7, 8, 9]);
        assert_eq!(plan.sections[2].name, "FILE");
    }

    #[test]
    fn test_sources() {
        let plan = ResolutionPlan::build(&schema(&SCHEMA), &layout(), &mappings(), "MD5").unwrap();
        let sources: Vec<&FieldSource> = plan.fields().map(|f| &f.source).collect();

        assert_eq!(
            sources[1],
            &FieldSource::ListControl {
                column: "Restriction Status".into(),
                translate_access: true
            }
        );
        assert_eq!(sources[3], &FieldSource::Provenance(ProvenanceSlot::Date));
        // static wins over list control
        assert_eq!(sources[4], &FieldSource::Static("VIEW".into()));
        assert_eq!(
            sources[5],
            &FieldSource::ContentReport {
                column: "FILE_PATH".into(),
                ingest_path: true,
                override_kind: None
            }
        );
        assert_eq!(
            sources[6],
            &FieldSource::ContentReport {
                column: "NAME".into(),
                ingest_path: false,
                override_kind: Some(OverrideKind::OriginalName)
            }
        );
        assert_eq!(
            sources[7],
            &FieldSource::ContentReport {
                column: "MD5_HASH".into(),
                ingest_path: false,
                override_kind: Some(OverrideKind::Checksum)
            }
        );
        assert!(plan.uses_content_report());
    }

    #[test]
    fn test_record_number_field_flagged() {
        let plan = ResolutionPlan::build(&schema(&SCHEMA), &layout(), &mappings(), "MD5").unwrap();
        let flagged: Vec<&str> = plan
            .fields()
            .filter(|f| f.sets_record_number)
            .map(|f| f.name.as_str())
            .collect();
        assert_eq!(flagged, vec!["Archway Unique ID (Object Identifier)"]);
    }

    #[test]
    fn test_checksum_override_follows_provenance_hash() {
        let plan =
            ResolutionPlan::build(&schema(&SCHEMA), &layout(), &mappings(), "SHA1").unwrap();
        let md5 = plan.fields().find(|f| f.name == "MD5").unwrap();
        assert!(matches!(
            md5.source,
            FieldSource::ContentReport { override_kind: None, .. }
        ));
    }

    #[test]
    fn test_misaligned_layout() {
        let mut sections = layout();
        sections[2].fields.swap(1, 2);

        let err =
            ResolutionPlan::build(&schema(&SCHEMA), &sections, &mappings(), "MD5").unwrap_err();
        match err {
            SynthesisError::Misaligned {
                field,
                expected,
                column,
            } => {
                assert_eq!(field, "MD5");
                assert_eq!(expected, "File Original Name");
                assert_eq!(column, 8);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_layout_past_schema_end() {
        let mut sections = layout();
        sections[2].fields.push("File Label".into());

        let err =
            ResolutionPlan::build(&schema(&SCHEMA), &sections, &mappings(), "MD5").unwrap_err();
        assert!(matches!(
            err,
            SynthesisError::PastSchemaEnd { column: 10, width: 10, .. }
        ));
    }

    #[test]
    fn test_unmapped_field_is_empty() {
        let plan = ResolutionPlan::build(
            &schema(&["Object Type", "SIP Title", "Representation Code"]),
            &[section("REPRESENTATION", &["Representation Code"])],
            &mappings(),
            "MD5",
        )
        .unwrap();

        assert_eq!(plan.sections[0].fields[0].source, FieldSource::Empty);
        assert!(!plan.uses_content_report());
    }

    #[test]
    fn test_provenance_slot_values() {
        let record = ExceptionRecord {
            record_number: "R1".into(),
            note_date: "2017-10-27 12:51:00".into(),
            note_text: "File name changed".into(),
            original_name: None,
            checksum: None,
        };

        assert_eq!(ProvenanceSlot::IdentifierType.value(&record), "EXTERNAL");
        assert_eq!(ProvenanceSlot::Date.value(&record), "2017-10-27 12:51:00");
        assert_eq!(ProvenanceSlot::OutcomeDetail.value(&record), "File name changed");
        assert_eq!(ProvenanceSlot::for_field("Event Outcome2"), None);
    }
}
