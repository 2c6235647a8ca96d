//! Provenance notes (the exceptions file).
//!
//! The file is optional. When it is missing, empty or lacks the minimal
//! header set, provenance is disabled for the run and no error is raised.

use std::path::Path;

use crate::logs::{log_error, log_info, log_warning};
use crate::models::{columns, ExceptionRecord, OverrideKind};
use crate::parser::{parse_file_auto, Table};

/// Headers a provenance file must carry to be used at all.
pub const REQUIRED_HEADERS: [&str; 3] = [
    columns::RECORD_NUMBER,
    columns::NOTE_DATE,
    columns::NOTE_TEXT,
];

/// Exception records in file order, looked up by catalogue record number.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Exceptions {
    records: Vec<ExceptionRecord>,
}

impl Exceptions {
    pub fn new(records: Vec<ExceptionRecord>) -> Self {
        Self { records }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Every record for `record_number`, in file order.
    pub fn records_for<'a, 'k>(
        &'a self,
        record_number: &'k str,
    ) -> impl Iterator<Item = &'a ExceptionRecord> + 'k
    where
        'a: 'k,
    {
        self.records
            .iter()
            .filter(move |r| r.record_number == record_number)
    }

    /// Last record for `record_number`.
    pub fn latest(&self, record_number: &str) -> Option<&ExceptionRecord> {
        self.records_for(record_number).last()
    }

    /// Override value for `kind`: the last non-sentinel value among the
    /// item's records.
    pub fn override_for(&self, record_number: &str, kind: OverrideKind) -> Option<&str> {
        self.records_for(record_number)
            .filter_map(|r| r.override_for(kind))
            .last()
    }
}

/// Build the exceptions from a parsed file, or `None` when the file is
/// unusable.
pub fn load_exceptions(table: &Table) -> Option<Exceptions> {
    if table.rows.is_empty() {
        log_warning("provenance file has no rows, provenance disabled");
        return None;
    }

    if let Some(missing) = REQUIRED_HEADERS.iter().find(|h| !table.has_column(h)) {
        log_warning(format!(
            "provenance file has no '{}' column, provenance disabled",
            missing
        ));
        return None;
    }

    let records = table.rows.iter().map(ExceptionRecord::from_row).collect();
    Some(Exceptions::new(records))
}

/// Read the provenance file at `path`.
///
/// Never fails: every problem is logged and yields `None`.
pub fn read_exceptions<P: AsRef<Path>>(path: P) -> Option<Exceptions> {
    let path = path.as_ref();

    if !path.exists() {
        log_error(format!(
            "it looks like you want to include provenance but the file doesn't exist: '{}'",
            path.display()
        ));
        return None;
    }

    log_info(format!("provenance being read from: '{}'", path.display()));

    match parse_file_auto(path) {
        Ok(table) => load_exceptions(&table),
        Err(e) => {
            log_warning(format!(
                "provenance file could not be read, provenance disabled: {}",
                e
            ));
            None
        }
    }
}
