//! List control loading.

use std::path::Path;

use crate::error::CsvResult;
use crate::logs::log_warning;
use crate::models::{columns, ControlItem};
use crate::parser::{parse_file_auto, Table};

/// Columns every list control export is expected to carry.
pub const EXPECTED_COLUMNS: [&str; 5] = [
    columns::ITEM_CODE,
    columns::TITLE,
    columns::SUB_SERIES,
    columns::MISSING_COMMENT,
    columns::RESTRICTION_STATUS,
];

/// Control items in file order.
///
/// Missing well-known columns are reported but not fatal: the affected
/// lookups simply resolve to empty.
pub fn load_control_list(table: &Table) -> Vec<ControlItem> {
    for column in EXPECTED_COLUMNS {
        if !table.has_column(column) {
            log_warning(format!("list control has no '{}' column", column));
        }
    }

    table.rows.iter().cloned().map(ControlItem::new).collect()
}

/// Read and load a list control file.
pub fn read_control_list<P: AsRef<Path>>(path: P) -> CsvResult<Vec<ControlItem>> {
    let table = parse_file_auto(path)?;
    Ok(load_control_list(&table))
}
