// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Chart remapping for event-track MIDI charts.
//!
//! Rewrites per-instrument tracks of a rhythm-game chart so a file authored
//! for one track-naming and note-numbering convention plays under another.

pub mod config;
pub mod document;
pub mod driver;
pub mod ops;
pub mod pipeline;
pub mod tables;

pub use config::{NamingConfig, Profile, ProfileError};
pub use document::{Document, Event, EventKind, Note, SmfError, Track};
pub use pipeline::{InstrumentScript, Pipeline, PipelineReport, Step};
pub use tables::{NoteTarget, TranslationTable};
