//! Domain models for the Rosetta CSV generator.
//!
//! - [`ContentEntry`] - one deliverable file from the DROID report
//! - [`HashAlgorithm`] - which checksum column a report carries
//! - [`ControlItem`] - one catalogue record from the list control
//! - [`ExceptionRecord`] - per-item provenance note and overrides
//! - [`OutputRow`] - one physical row of the Rosetta CSV
//!
//! Column and field names the generator treats specially live in
//! [`columns`] and [`fields`].

use serde::{Deserialize, Serialize};

use crate::error::{ReportError, ReportResult};
use crate::parser::Row;

// =============================================================================
// Well-known names
// =============================================================================

/// Input column headers.
pub mod columns {
    // DROID report
    pub const ID: &str = "ID";
    pub const PARENT_ID: &str = "PARENT_ID";
    pub const NAME: &str = "NAME";
    pub const FILE_PATH: &str = "FILE_PATH";
    pub const TYPE: &str = "TYPE";
    pub const METHOD: &str = "METHOD";
    pub const LAST_MODIFIED: &str = "LAST_MODIFIED";

    // List control
    pub const ITEM_CODE: &str = "Item Code";
    pub const TITLE: &str = "Title";
    pub const SUB_SERIES: &str = "Sub-Series";
    /// Repurposed by the transfer team to hold the expected checksum.
    pub const MISSING_COMMENT: &str = "Missing Comment";
    pub const RESTRICTION_STATUS: &str = "Restriction Status";

    // Provenance notes
    pub const RECORD_NUMBER: &str = "RECORDNUMBER";
    pub const NOTE_DATE: &str = "NOTEDATE";
    pub const NOTE_TEXT: &str = "NOTETEXT";
    pub const ORIGINAL_NAME: &str = "ORIGINALNAME";
    pub const CHECKSUM: &str = "CHECKSUM";
}

/// Output field names with hard-wired behaviour.
pub mod fields {
    pub const OBJECT_TYPE: &str = "Object Type";
    pub const SIP_TITLE: &str = "SIP Title";
    pub const TITLE_DC: &str = "Title (DC)";
    pub const ACCESS_RIGHTS: &str = "Access Rights Policy ID (IE)";
    pub const OBJECT_IDENTIFIER: &str = "Archway Unique ID (Object Identifier)";
    pub const FILE_ORIGINAL_PATH: &str = "File Original Path";
    pub const FILE_ORIGINAL_NAME: &str = "File Original Name";

    pub const EVENT_IDENTIFIER_TYPE: &str = "Event Identifier Type";
    pub const EVENT_IDENTIFIER_VALUE: &str = "Event Identifier Value";
    pub const EVENT_TYPE: &str = "Event Type";
    pub const EVENT_DESCRIPTION: &str = "Event Description";
    pub const EVENT_DATE: &str = "Event Date";
    pub const EVENT_OUTCOME: &str = "Event Outcome1";
    pub const EVENT_OUTCOME_DETAIL: &str = "Event Outcome Detail1";
}

/// Object type written into the summary row.
pub const SIP_OBJECT_TYPE: &str = "SIP";

/// DROID `METHOD` value for compound files already expanded by DROID.
pub const CONTAINER_METHOD: &str = "Container";

/// DROID `TYPE` value for directories.
pub const FOLDER_TYPE: &str = "Folder";

// =============================================================================
// Hash Algorithm
// =============================================================================

/// Checksum algorithm of a DROID report.
///
/// A report carries exactly one checksum column; when several are present the
/// first in [`HashAlgorithm::PREFERENCE`] is used.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HashAlgorithm {
    Md5,
    Sha1,
    Sha256,
    Sha512,
}

impl HashAlgorithm {
    /// Lookup order, most preferred first.
    pub const PREFERENCE: [HashAlgorithm; 4] = [
        HashAlgorithm::Md5,
        HashAlgorithm::Sha1,
        HashAlgorithm::Sha256,
        HashAlgorithm::Sha512,
    ];

    /// DROID column holding this checksum.
    pub fn column(self) -> &'static str {
        match self {
            HashAlgorithm::Md5 => "MD5_HASH",
            HashAlgorithm::Sha1 => "SHA1_HASH",
            HashAlgorithm::Sha256 => "SHA256_HASH",
            HashAlgorithm::Sha512 => "SHA512_HASH",
        }
    }

    /// First recognised checksum column present in `row`.
    pub fn detect(row: &Row) -> Option<Self> {
        Self::PREFERENCE
            .into_iter()
            .find(|algorithm| row.contains_key(algorithm.column()))
    }
}

// =============================================================================
// Content Entry
// =============================================================================

/// One row of the DROID content report.
#[derive(Debug, Clone, PartialEq)]
pub struct ContentEntry {
    pub id: String,
    pub parent_id: String,
    /// Leaf file name
    pub name: String,
    /// Full originating path, mixed separators
    pub file_path: String,
    pub hash: String,
    pub hash_algorithm: HashAlgorithm,
    pub last_modified: String,
    pub method: String,
    pub entry_type: String,
    fields: Row,
}

impl ContentEntry {
    /// Build an entry from a raw report row.
    ///
    /// `row_number` is only used for error reporting.
    pub fn from_row(row_number: usize, row: Row) -> ReportResult<Self> {
        let hash_algorithm =
            HashAlgorithm::detect(&row).ok_or(ReportError::NoHashColumn { row: row_number })?;

        let cell = |column: &str| row.get(column).cloned().unwrap_or_default();

        Ok(Self {
            id: cell(columns::ID),
            parent_id: cell(columns::PARENT_ID),
            name: cell(columns::NAME),
            file_path: cell(columns::FILE_PATH),
            hash: cell(hash_algorithm.column()),
            hash_algorithm,
            last_modified: cell(columns::LAST_MODIFIED),
            method: cell(columns::METHOD),
            entry_type: cell(columns::TYPE),
            fields: row,
        })
    }

    /// Raw value of any report column.
    pub fn get(&self, column: &str) -> Option<&str> {
        self.fields.get(column).map(String::as_str)
    }

    /// DROID identified this entry through a container signature.
    pub fn is_container(&self) -> bool {
        self.method.trim() == CONTAINER_METHOD
    }

    pub fn is_folder(&self) -> bool {
        self.entry_type.trim().eq_ignore_ascii_case(FOLDER_TYPE)
    }
}

// =============================================================================
// Control Item
// =============================================================================

/// One row of the list control export.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ControlItem {
    fields: Row,
}

impl ControlItem {
    pub fn new(fields: Row) -> Self {
        Self { fields }
    }

    /// Raw value of any list control column.
    pub fn get(&self, column: &str) -> Option<&str> {
        self.fields.get(column).map(String::as_str)
    }

    fn cell(&self, column: &str) -> &str {
        self.get(column).unwrap_or("")
    }

    /// Catalogue record number.
    pub fn item_code(&self) -> &str {
        self.cell(columns::ITEM_CODE)
    }

    pub fn title(&self) -> &str {
        self.cell(columns::TITLE)
    }

    pub fn sub_series(&self) -> &str {
        self.cell(columns::SUB_SERIES)
    }

    /// Checksum the item's file is expected to have.
    pub fn expected_hash(&self) -> &str {
        self.cell(columns::MISSING_COMMENT)
    }

    pub fn restriction_status(&self) -> &str {
        self.cell(columns::RESTRICTION_STATUS)
    }
}

// =============================================================================
// Exception Record
// =============================================================================

/// Literal that leaves a field to normal resolution.
pub const IGNORE_SENTINEL: &str = "ignore";

/// Value of an override column in the provenance notes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Override {
    /// The sentinel: resolve the field normally.
    Ignore,
    /// Write this value verbatim.
    Value(String),
}

impl Override {
    /// Interpret a raw cell. The sentinel is matched case-insensitively
    /// after trimming; any other value, including an empty one, overrides.
    pub fn parse(raw: &str) -> Self {
        if raw.trim().to_lowercase() == IGNORE_SENTINEL {
            Override::Ignore
        } else {
            Override::Value(raw.to_string())
        }
    }

    pub fn value(&self) -> Option<&str> {
        match self {
            Override::Ignore => None,
            Override::Value(v) => Some(v.as_str()),
        }
    }
}

/// Which override column applies to a field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OverrideKind {
    /// `ORIGINALNAME`, applied to `File Original Name`
    OriginalName,
    /// `CHECKSUM`, applied to the configured provenance hash field
    Checksum,
}

/// One row of the provenance notes file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExceptionRecord {
    pub record_number: String,
    pub note_date: String,
    pub note_text: String,
    pub original_name: Option<Override>,
    pub checksum: Option<Override>,
}

impl ExceptionRecord {
    pub fn from_row(row: &Row) -> Self {
        let cell = |column: &str| row.get(column).cloned().unwrap_or_default();

        Self {
            record_number: cell(columns::RECORD_NUMBER),
            note_date: cell(columns::NOTE_DATE),
            note_text: cell(columns::NOTE_TEXT),
            original_name: row.get(columns::ORIGINAL_NAME).map(|v| Override::parse(v)),
            checksum: row.get(columns::CHECKSUM).map(|v| Override::parse(v)),
        }
    }

    /// Replacement value for `kind`, if this record carries one.
    pub fn override_for(&self, kind: OverrideKind) -> Option<&str> {
        let value = match kind {
            OverrideKind::OriginalName => self.original_name.as_ref(),
            OverrideKind::Checksum => self.checksum.as_ref(),
        };
        value.and_then(Override::value)
    }
}

// =============================================================================
// Output Row
// =============================================================================

/// One section instance for one control item: a fixed-width row of cells,
/// one per schema field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputRow {
    cells: Vec<String>,
}

impl OutputRow {
    /// A row of `width` empty cells.
    pub fn new(width: usize) -> Self {
        Self {
            cells: vec![String::new(); width],
        }
    }

    /// Set a cell; columns past the row width are ignored.
    pub fn set(&mut self, column: usize, value: impl Into<String>) {
        if let Some(cell) = self.cells.get_mut(column) {
            *cell = value.into();
        }
    }

    pub fn get(&self, column: usize) -> Option<&str> {
        self.cells.get(column).map(String::as_str)
    }

    pub fn cells(&self) -> &[String] {
        &self.cells
    }

    pub fn width(&self) -> usize {
        self.cells.len()
    }

    /// Value of the first cell: SIP, IE, REPRESENTATION, FILE...
    pub fn object_type(&self) -> &str {
        self.get(0).unwrap_or("")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(pairs: &[(&str, &str)]) -> Row {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_hash_preference_order() {
        let both = row(&[("SHA256_HASH", "b"), ("MD5_HASH", "a")]);
        assert_eq!(HashAlgorithm::detect(&both), Some(HashAlgorithm::Md5));

        let sha512 = row(&[("SHA512_HASH", "z")]);
        assert_eq!(HashAlgorithm::detect(&sha512), Some(HashAlgorithm::Sha512));

        assert_eq!(HashAlgorithm::detect(&row(&[("NAME", "x")])), None);
    }

    #[test]
    fn test_content_entry_from_row() {
        let entry = ContentEntry::from_row(
            2,
            row(&[
                ("ID", "5"),
                ("PARENT_ID", "4"),
                ("NAME", "a.doc"),
                ("FILE_PATH", "R:\\x\\a.doc"),
                ("METHOD", "Container"),
                ("TYPE", "File"),
                ("SHA1_HASH", "abc"),
                ("PUID", "fmt/40"),
            ]),
        )
        .unwrap();

        assert_eq!(entry.hash, "abc");
        assert_eq!(entry.hash_algorithm, HashAlgorithm::Sha1);
        assert!(entry.is_container());
        assert!(!entry.is_folder());
        assert_eq!(entry.get("PUID"), Some("fmt/40"));
    }

    #[test]
    fn test_content_entry_without_hash() {
        let err = ContentEntry::from_row(9, row(&[("NAME", "a.doc")])).unwrap_err();
        assert!(matches!(err, ReportError::NoHashColumn { row: 9 }));
    }

    #[test]
    fn test_override_sentinel() {
        assert_eq!(Override::parse("Ignore"), Override::Ignore);
        assert_eq!(Override::parse(" IGNORE "), Override::Ignore);
        assert_eq!(
            Override::parse("FixedFilename001 001"),
            Override::Value("FixedFilename001 001".into())
        );
        assert_eq!(Override::parse("").value(), Some(""));
    }

    #[test]
    fn test_exception_record_overrides() {
        let record = ExceptionRecord::from_row(&row(&[
            ("RECORDNUMBER", "R1"),
            ("NOTEDATE", "2017-10-27 12:51:00"),
            ("NOTETEXT", "File name changed"),
            ("ORIGINALNAME", "Fixed"),
            ("CHECKSUM", "Ignore"),
        ]));

        assert_eq!(record.override_for(OverrideKind::OriginalName), Some("Fixed"));
        assert_eq!(record.override_for(OverrideKind::Checksum), None);
    }

    #[test]
    fn test_exception_record_without_override_columns() {
        let record = ExceptionRecord::from_row(&row(&[
            ("RECORDNUMBER", "R1"),
            ("NOTEDATE", "d"),
            ("NOTETEXT", "t"),
        ]));
        assert_eq!(record.override_for(OverrideKind::OriginalName), None);
        assert_eq!(record.override_for(OverrideKind::Checksum), None);
    }

    #[test]
    fn test_output_row() {
        let mut out = OutputRow::new(3);
        out.set(0, "IE");
        out.set(5, "ignored");

        assert_eq!(out.width(), 3);
        assert_eq!(out.object_type(), "IE");
        assert_eq!(out.cells(), &["IE".to_string(), String::new(), String::new()]);
    }

    #[test]
    fn test_control_item_accessors() {
        let item = ControlItem::new(row(&[
            ("Item Code", "R25437983"),
            ("Missing Comment", "294c"),
            ("Sub-Series", "Project Programme"),
        ]));
        assert_eq!(item.item_code(), "R25437983");
        assert_eq!(item.expected_hash(), "294c");
        assert_eq!(item.title(), "");
    }
}
