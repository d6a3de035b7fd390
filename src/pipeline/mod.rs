// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Per-instrument conversion pipeline.
//!
//! Each instrument is an ordered list of [`Step`]s naming the tracks and
//! tables they work on. Order matters: later steps rely on earlier ones
//! having created or removed tracks, e.g. a source is deleted before a merge
//! recreates a track under the same name.

pub mod gh2;

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, info_span, warn};

use crate::config::{Profile, ProfileError};
use crate::document::Document;
use crate::ops::{copy_events_only, copy_notes_only, merge_tracks};
use crate::tables::TranslationTable;

/// One pipeline operation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Step {
    /// Copy non-note events
    CopyEvents { from: String, to: String },
    /// Copy notes through a named table
    CopyNotes {
        from: String,
        to: String,
        table: String,
    },
    /// Merge two tracks into a new one
    Merge {
        first: String,
        second: String,
        into: String,
    },
    /// Delete a track
    Delete { track: String },
    /// Rename a track
    Rename { from: String, to: String },
}

impl Step {
    /// Copy events step
    pub fn copy_events(from: impl Into<String>, to: impl Into<String>) -> Self {
        Step::CopyEvents {
            from: from.into(),
            to: to.into(),
        }
    }

    /// Copy notes step
    pub fn copy_notes(
        from: impl Into<String>,
        to: impl Into<String>,
        table: impl Into<String>,
    ) -> Self {
        Step::CopyNotes {
            from: from.into(),
            to: to.into(),
            table: table.into(),
        }
    }

    /// Merge step
    pub fn merge(
        first: impl Into<String>,
        second: impl Into<String>,
        into: impl Into<String>,
    ) -> Self {
        Step::Merge {
            first: first.into(),
            second: second.into(),
            into: into.into(),
        }
    }

    /// Delete step
    pub fn delete(track: impl Into<String>) -> Self {
        Step::Delete {
            track: track.into(),
        }
    }

    /// Rename step
    pub fn rename(from: impl Into<String>, to: impl Into<String>) -> Self {
        Step::Rename {
            from: from.into(),
            to: to.into(),
        }
    }

    /// Table referenced by this step, if any
    pub fn table(&self) -> Option<&str> {
        match self {
            Step::CopyNotes { table, .. } => Some(table.as_str()),
            _ => None,
        }
    }

    /// Track this step creates or leaves behind, if any
    pub fn output(&self) -> Option<&str> {
        match self {
            Step::CopyEvents { to, .. } | Step::CopyNotes { to, .. } | Step::Rename { to, .. } => {
                Some(to.as_str())
            }
            Step::Merge { into, .. } => Some(into.as_str()),
            Step::Delete { .. } => None,
        }
    }
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Step::CopyEvents { from, to } => write!(f, "copy events '{}' -> '{}'", from, to),
            Step::CopyNotes { from, to, table } => {
                write!(f, "copy notes '{}' -> '{}' via {}", from, to, table)
            }
            Step::Merge {
                first,
                second,
                into,
            } => write!(f, "merge '{}' + '{}' -> '{}'", first, second, into),
            Step::Delete { track } => write!(f, "delete '{}'", track),
            Step::Rename { from, to } => write!(f, "rename '{}' -> '{}'", from, to),
        }
    }
}

/// Ordered steps for one instrument
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstrumentScript {
    /// Instrument label used in logs
    pub name: String,
    /// Steps, run in order
    pub steps: Vec<Step>,
}

impl InstrumentScript {
    /// Create an empty script
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            steps: Vec::new(),
        }
    }

    /// Append a step
    pub fn then(mut self, step: Step) -> Self {
        self.steps.push(step);
        self
    }

    /// Position of the first step equal to `step`
    pub fn position(&self, step: &Step) -> Option<usize> {
        self.steps.iter().position(|s| s == step)
    }
}

/// What happened during a pipeline run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PipelineReport {
    /// Steps executed
    pub steps: usize,
    /// Copies or merges whose sources were all missing
    pub missing_sources: usize,
    /// Deletes or renames that found no track
    pub missing_targets: usize,
}

impl PipelineReport {
    fn absorb(&mut self, other: PipelineReport) {
        self.steps += other.steps;
        self.missing_sources += other.missing_sources;
        self.missing_targets += other.missing_targets;
    }
}

/// A validated, ready-to-run pipeline
#[derive(Debug, Clone)]
pub struct Pipeline {
    tables: BTreeMap<String, TranslationTable>,
    instruments: Vec<InstrumentScript>,
}

impl Pipeline {
    /// Build a pipeline from a profile, checking its tables and steps
    pub fn new(profile: &Profile) -> Result<Self, ProfileError> {
        profile.validate()?;
        Ok(Self {
            tables: profile.tables.clone(),
            instruments: profile.instruments.clone(),
        })
    }

    /// The built-in gh2 to ms conversion
    pub fn gh2_to_ms() -> Self {
        Self {
            tables: gh2::tables(),
            instruments: gh2::instruments(),
        }
    }

    /// Instrument scripts in run order
    pub fn instruments(&self) -> &[InstrumentScript] {
        &self.instruments
    }

    /// Look up a table by name
    pub fn table(&self, name: &str) -> Option<&TranslationTable> {
        self.tables.get(name)
    }

    /// Run every instrument script against `doc`
    pub fn run(&self, doc: &mut Document<'_>) -> PipelineReport {
        let mut report = PipelineReport::default();
        for script in &self.instruments {
            report.absorb(self.run_instrument(doc, script));
        }
        info!(
            "Pipeline finished: {} steps, {} missing sources, {} missing targets",
            report.steps, report.missing_sources, report.missing_targets
        );
        report
    }

    /// Run one instrument script against `doc`
    pub fn run_instrument(&self, doc: &mut Document<'_>, script: &InstrumentScript) -> PipelineReport {
        let _span = info_span!("instrument", name = %script.name).entered();
        let mut report = PipelineReport::default();

        for step in &script.steps {
            debug!("{}", step);
            report.steps += 1;
            match step {
                Step::CopyEvents { from, to } => {
                    if doc.find(from).is_none() {
                        report.missing_sources += 1;
                    }
                    copy_events_only(doc, from, to);
                }
                Step::CopyNotes { from, to, table } => {
                    // Pipeline::new checked table names; an unknown one maps nothing
                    let Some(table) = self.tables.get(table) else {
                        warn!("Unknown table '{}', skipping {}", table, step);
                        continue;
                    };
                    if doc.find(from).is_none() {
                        report.missing_sources += 1;
                    }
                    copy_notes_only(doc, from, to, table);
                }
                Step::Merge {
                    first,
                    second,
                    into,
                } => {
                    if doc.find(first).is_none() && doc.find(second).is_none() {
                        report.missing_sources += 1;
                    }
                    merge_tracks(doc, first, second, into);
                }
                Step::Delete { track } => {
                    if !doc.delete_track(track) {
                        report.missing_targets += 1;
                    }
                }
                Step::Rename { from, to } => {
                    if !doc.rename(from, to) {
                        report.missing_targets += 1;
                    }
                }
            }
        }
        report
    }
}

impl Default for Pipeline {
    fn default() -> Self {
        Self::gh2_to_ms()
    }
}
