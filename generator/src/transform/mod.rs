//! Transformation module.
//!
//! This module turns the loaded sources into Rosetta CSV rows:
//! - Plan: which source fills each schema column
//! - Matcher: list control item to DROID entry
//! - Synthesizer: one row per section for every item
//! - Serializer: quoted CSV text
//! - Pipeline: the whole run from files

pub mod matcher;
pub mod pipeline;
pub mod plan;
pub mod serializer;
pub mod synthesizer;

pub use matcher::{ContentMatcher, Resolution};
pub use pipeline::*;
pub use plan::{FieldPlan, FieldSource, ProvenanceSlot, ResolutionPlan, SectionPlan};
pub use serializer::render;
pub use synthesizer::{synthesize, Synthesis, Synthesizer};
