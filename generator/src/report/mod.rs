//! DROID content report loading.
//!
//! Turns the raw characterization report into the list of deliverable files:
//! directory rows are dropped, and so are the children DROID extracted from
//! container files (the container's own row already stands for them).

use std::collections::{HashMap, HashSet};
use std::path::Path;

use crate::error::{GeneratorResult, ReportResult};
use crate::logs::log_debug;
use crate::models::ContentEntry;
use crate::parser::{parse_file_auto, Table};

/// Build the pruned entry list from a parsed report.
///
/// Fails on the first row exposing none of the recognised hash columns.
pub fn load_content_report(table: &Table) -> ReportResult<Vec<ContentEntry>> {
    let entries = table
        .rows
        .iter()
        .enumerate()
        // +2: one for the header line, one for 1-based numbering
        .map(|(i, row)| ContentEntry::from_row(i + 2, row.clone()))
        .collect::<ReportResult<Vec<_>>>()?;

    let total = entries.len();
    let pruned = prune_entries(entries);

    log_debug(format!(
        "DROID report: {} rows, {} deliverable files",
        total,
        pruned.len()
    ));

    Ok(pruned)
}

/// Read and load a content report file.
pub fn read_content_report<P: AsRef<Path>>(path: P) -> GeneratorResult<Vec<ContentEntry>> {
    let table = parse_file_auto(path)?;
    Ok(load_content_report(&table)?)
}

/// Remove folders and the extracted children of container files.
///
/// The parent lookup covers every row of the report, folders included.
pub fn prune_entries(entries: Vec<ContentEntry>) -> Vec<ContentEntry> {
    let containers: HashSet<String> = entries
        .iter()
        .filter(|e| e.is_container())
        .map(|e| e.id.clone())
        .collect();

    entries
        .into_iter()
        .filter(|e| !e.is_folder())
        .filter(|e| !containers.contains(&e.parent_id))
        .collect()
}

/// Hashes that occur more than once in `entries`.
pub fn find_duplicate_hashes(entries: &[ContentEntry]) -> HashSet<String> {
    let mut counts: HashMap<&str, usize> = HashMap::new();
    for entry in entries {
        *counts.entry(entry.hash.as_str()).or_insert(0) += 1;
    }

    counts
        .into_iter()
        .filter(|(_, count)| *count > 1)
        .map(|(hash, _)| hash.to_string())
        .collect()
}
