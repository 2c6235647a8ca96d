//! Row synthesis
//!
//! Walks the list control in order and produces one row per planned
//! section for every item, filling each field from the source the
//! [`ResolutionPlan`] assigned to it.

use std::collections::{BTreeSet, HashSet};

use crate::config::{FieldMappings, MappingConfig};
use crate::error::{SynthesisError, SynthesisResult};
use crate::logs::{log_debug, log_info, log_warning};
use crate::models::{ContentEntry, ControlItem, OutputRow};
use crate::provenance::Exceptions;
use crate::report::find_duplicate_hashes;

use super::matcher::{ingest_path, ContentMatcher, Resolution};
use super::plan::{FieldPlan, FieldSource, ResolutionPlan, SectionPlan};

/// Rows produced for a whole list control.
#[derive(Debug, Clone, Default)]
pub struct Synthesis {
    /// Section rows in list control order, SIP row excluded
    pub rows: Vec<OutputRow>,
    /// Duplicate-checksum candidates examined during matching
    pub monitored: BTreeSet<String>,
    /// Checksums occurring more than once in the report
    pub duplicates: HashSet<String>,
}

/// Produces the section rows of one list control item at a time.
pub struct Synthesizer<'a> {
    plan: &'a ResolutionPlan,
    mappings: &'a FieldMappings,
    matcher: ContentMatcher<'a>,
    exceptions: Option<&'a Exceptions>,
    path_mask: &'a str,
}

/// Per-item state: the exception lookup key and the lazily resolved entry.
struct ItemContext<'i, 'a> {
    item: &'i ControlItem,
    record_number: Option<&'i str>,
    resolution: Option<Resolution<'a>>,
}

impl<'a> Synthesizer<'a> {
    pub fn new(
        plan: &'a ResolutionPlan,
        mappings: &'a FieldMappings,
        matcher: ContentMatcher<'a>,
        exceptions: Option<&'a Exceptions>,
        path_mask: &'a str,
    ) -> Self {
        Self {
            plan,
            mappings,
            matcher,
            exceptions,
            path_mask,
        }
    }

    /// Rows for one item, one per section, plus the duplicate candidates
    /// examined while matching it.
    pub fn synthesize_item(
        &self,
        item: &ControlItem,
    ) -> SynthesisResult<(Vec<OutputRow>, BTreeSet<String>)> {
        let mut ctx = ItemContext {
            item,
            record_number: None,
            resolution: None,
        };

        let rows = self
            .plan
            .sections
            .iter()
            .map(|section| self.synthesize_section(section, &mut ctx))
            .collect::<SynthesisResult<Vec<_>>>()?;

        let monitored = ctx.resolution.map(|r| r.monitored).unwrap_or_default();
        Ok((rows, monitored))
    }

    fn synthesize_section(
        &self,
        section: &SectionPlan,
        ctx: &mut ItemContext<'_, 'a>,
    ) -> SynthesisResult<OutputRow> {
        let mut row = OutputRow::new(self.plan.width);
        row.set(0, section.name.as_str());

        for field in &section.fields {
            if field.sets_record_number {
                ctx.record_number = Some(ctx.item.item_code());
            }
            if let Some(value) = self.resolve_field(field, ctx)? {
                row.set(field.column, value);
            }
        }

        Ok(row)
    }

    /// Value of one field, `None` leaving the cell empty.
    fn resolve_field(
        &self,
        field: &FieldPlan,
        ctx: &mut ItemContext<'_, 'a>,
    ) -> SynthesisResult<Option<String>> {
        match &field.source {
            FieldSource::Static(value) => Ok(Some(value.clone())),

            FieldSource::ListControl {
                column,
                translate_access,
            } => {
                let raw = ctx.item.get(column).ok_or_else(|| {
                    SynthesisError::MissingControlColumn {
                        field: field.name.clone(),
                        column: column.clone(),
                    }
                })?;
                let value = if *translate_access {
                    self.mappings.translate_access(raw)
                } else {
                    raw
                };
                Ok(Some(value.to_string()))
            }

            FieldSource::ContentReport {
                column,
                ingest_path: as_ingest_path,
                override_kind,
            } => {
                if let (Some(kind), Some(exceptions), Some(record)) =
                    (override_kind, self.exceptions, ctx.record_number)
                {
                    if let Some(value) = exceptions.override_for(record, *kind) {
                        return Ok(Some(value.to_string()));
                    }
                }

                let (matcher, item) = (self.matcher, ctx.item);
                let resolution = ctx
                    .resolution
                    .get_or_insert_with(|| matcher.resolve(item));

                let Some(entry) = resolution.entry else {
                    return Ok(Some(String::new()));
                };

                let value = entry.get(column).ok_or_else(|| {
                    SynthesisError::MissingReportColumn {
                        field: field.name.clone(),
                        column: column.clone(),
                    }
                })?;

                if *as_ingest_path {
                    Ok(Some(ingest_path(entry, self.path_mask)))
                } else {
                    Ok(Some(value.to_string()))
                }
            }

            FieldSource::Provenance(slot) => Ok(self
                .exceptions
                .zip(ctx.record_number)
                .and_then(|(exceptions, record)| exceptions.latest(record))
                .map(|record| slot.value(record).to_string())),

            FieldSource::Empty => Ok(None),
        }
    }
}

/// Sub-series mask to use, given the duplicate checksums of the report.
///
/// Without duplicates the mask is never consulted. With duplicates and no
/// mask, matching goes ahead with an empty mask unless `strict` is set.
pub fn sub_series_mask<'c>(
    config: &'c MappingConfig,
    duplicates: &HashSet<String>,
) -> SynthesisResult<&'c str> {
    if duplicates.is_empty() {
        return Ok("");
    }

    log_info(
        "duplicate checksums in DROID report, ensure 'paths.sub_series_mask' is set in config",
    );

    match config.paths.sub_series_mask.as_deref() {
        Some(mask) => Ok(mask),
        None if config.application.strict_duplicates => {
            Err(SynthesisError::DuplicatesWithoutMask(duplicates.len()))
        }
        None => {
            log_warning("subseries mask is not set in config");
            Ok("")
        }
    }
}

/// Produce the section rows for every control item.
///
/// `exceptions` is `None` when provenance is disabled for the run.
pub fn synthesize(
    items: &[ControlItem],
    entries: &[ContentEntry],
    exceptions: Option<&Exceptions>,
    config: &MappingConfig,
    plan: &ResolutionPlan,
) -> SynthesisResult<Synthesis> {
    let duplicates = find_duplicate_hashes(entries);
    let mask = sub_series_mask(config, &duplicates)?;

    let matcher = ContentMatcher::new(entries, &duplicates, mask);
    let synthesizer = Synthesizer::new(
        plan,
        &config.mappings,
        matcher,
        exceptions,
        &config.paths.path_mask,
    );

    let mut rows = Vec::with_capacity(items.len() * plan.sections.len());
    let mut monitored = BTreeSet::new();

    for item in items {
        let (item_rows, item_monitored) = synthesizer.synthesize_item(item)?;
        rows.extend(item_rows);
        monitored.extend(item_monitored);
    }

    log_debug(format!(
        "synthesized {} rows for {} items",
        rows.len(),
        items.len()
    ));

    Ok(Synthesis {
        rows,
        monitored,
        duplicates,
    })
}
