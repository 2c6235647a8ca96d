//! Rosetta CSV text output.

use crate::models::{OutputRow, SIP_OBJECT_TYPE};
use crate::schema::RosettaSchema;

/// Header pair produced by the two schema fields sharing a display title.
pub const TITLE_COLLISION: &str = r#""Object Type","SIP Title""#;

/// What [`TITLE_COLLISION`] is rewritten to.
pub const TITLE_COLLISION_REPLACEMENT: &str = r#""Object Type","Title (DC)""#;

/// Cell value with line breaks removed.
pub fn clean_cell(value: &str) -> String {
    value.replace(['\r', '\n'], "")
}

/// Quote a cell. Embedded quotes are not escaped.
pub fn encode_cell(value: &str) -> String {
    format!("\"{}\"", clean_cell(value))
}

/// Quoted cells joined with commas, no line ending.
pub fn encode_row(row: &OutputRow) -> String {
    row.cells()
        .iter()
        .map(|cell| encode_cell(cell))
        .collect::<Vec<_>>()
        .join(",")
}

/// The summary row opening every load.
pub fn sip_row(width: usize, sip_title: &str) -> OutputRow {
    let mut row = OutputRow::new(width);
    row.set(0, SIP_OBJECT_TYPE);
    row.set(1, sip_title);
    row
}

/// Full document: header, SIP row, then `rows`, each line newline-terminated.
pub fn render(schema: &RosettaSchema, sip_title: &str, rows: &[OutputRow]) -> String {
    let sip = sip_row(schema.width(), sip_title);

    let mut text = schema.header_line();
    text.push('\n');
    for row in std::iter::once(&sip).chain(rows) {
        text.push_str(&encode_row(row));
        text.push('\n');
    }

    text.replace(TITLE_COLLISION, TITLE_COLLISION_REPLACEMENT)
}
