//! Content report matching
//!
//! Finds the DROID entry behind a list control item. An entry matches when
//! its checksum equals the item's expected checksum and its file name,
//! without extension, equals the item's title once runs of spaces are
//! collapsed. Checksums that occur more than once in the report also need
//! the entry's path to agree with the item's sub-series.
//!
//! When several entries match, the last one in report order wins.

use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::{BTreeSet, HashSet};

use crate::models::{ContentEntry, ControlItem};

static SPACE_RUNS: Lazy<Regex> = Lazy::new(|| Regex::new(r" {2,}").unwrap());

/// Collapse every run of two or more spaces into one.
///
/// Leading and trailing spaces are kept (collapsed).
pub fn normalize_spaces(value: &str) -> String {
    SPACE_RUNS.replace_all(value, " ").into_owned()
}

/// File name without its last extension, trailing whitespace removed.
pub fn title_from_filename(name: &str) -> &str {
    name.rsplit_once('.')
        .map_or(name, |(stem, _)| stem)
        .trim_end()
}

/// Whether a DROID file name and a list control title name the same thing.
pub fn titles_match(file_name: &str, title: &str) -> bool {
    normalize_spaces(title_from_filename(file_name)) == normalize_spaces(title)
}

/// Repository-relative directory of an entry.
///
/// Removes the file name from the path, then the mask once, and turns
/// backslashes into forward slashes.
pub fn ingest_path(entry: &ContentEntry, path_mask: &str) -> String {
    let name = entry.name.trim();
    entry
        .file_path
        .trim()
        .replace(name, "")
        .replacen(path_mask, "", 1)
        .replace('\\', "/")
        .trim()
        .to_string()
}

/// Whether a duplicate-checksum entry sits under the item's sub-series.
///
/// The title must occur in the path. The path, without the file name and
/// the mask, minus its trailing separator, must then equal `sub_series`.
pub fn path_matches_sub_series(
    title: &str,
    entry: &ContentEntry,
    sub_series: &str,
    sub_series_mask: &str,
) -> bool {
    let file_path = entry.file_path.trim();
    if !file_path.contains(title.trim()) {
        return false;
    }

    let mut remainder = file_path
        .replace(entry.name.trim(), "")
        .replacen(sub_series_mask, "", 1)
        .trim()
        .to_string();
    remainder.pop();

    remainder == sub_series
}

/// Outcome of matching one control item.
#[derive(Debug, Clone, Default)]
pub struct Resolution<'a> {
    /// The last entry satisfying every predicate
    pub entry: Option<&'a ContentEntry>,
    /// `<sub-series>\<title> checksum: <hash>` for every duplicate examined
    pub monitored: BTreeSet<String>,
}

/// Matches control items against a pruned content report.
#[derive(Debug, Clone, Copy)]
pub struct ContentMatcher<'a> {
    entries: &'a [ContentEntry],
    duplicates: &'a HashSet<String>,
    sub_series_mask: &'a str,
}

impl<'a> ContentMatcher<'a> {
    pub fn new(
        entries: &'a [ContentEntry],
        duplicates: &'a HashSet<String>,
        sub_series_mask: &'a str,
    ) -> Self {
        Self {
            entries,
            duplicates,
            sub_series_mask,
        }
    }

    /// Scan the whole report for `item`'s entry.
    pub fn resolve(&self, item: &ControlItem) -> Resolution<'a> {
        let mut resolution = Resolution::default();
        let expected = item.expected_hash();

        for entry in self.entries {
            if entry.hash != expected || !titles_match(&entry.name, item.title()) {
                continue;
            }

            let accepted = if self.duplicates.contains(&entry.hash) {
                resolution.monitored.insert(format!(
                    "{}\\{} checksum: {}",
                    item.sub_series(),
                    item.title(),
                    entry.hash
                ));
                path_matches_sub_series(
                    item.title(),
                    entry,
                    item.sub_series(),
                    self.sub_series_mask,
                )
            } else {
                true
            };

            if accepted {
                resolution.entry = Some(entry);
            }
        }

        resolution
    }
}
