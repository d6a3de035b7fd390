// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Event and note copying between tracks.

use tracing::{info, warn};

use super::retime;
use crate::document::{Document, EventKind, Note, Track};
use crate::tables::TranslationTable;

/// Copy every non-note event of `source` into `target`.
///
/// The target is created empty if it does not exist. Copied events keep
/// their absolute position; note events and name declarations are skipped.
/// A missing source leaves the target as it was.
pub fn copy_events_only<'d, 'a>(
    doc: &'d mut Document<'a>,
    source: &str,
    target: &str,
) -> &'d mut Track<'a> {
    doc.ensure_track(target);
    let Some(src) = doc.find(source) else {
        warn!("Track '{}' not found, '{}' stays empty", source, target);
        return doc.ensure_track(target);
    };

    let copied = retime(
        src.timed_events()
            .filter(|(_, event)| !event.kind.is_name() && !event.kind.is_note())
            .map(|(tick, event)| (tick, event.kind.clone()))
            .collect::<Vec<_>>(),
    );

    let out = doc.ensure_track(target);
    for event in copied {
        out.push(event);
    }
    info!("'{}' events copied to '{}'", source, target);
    out
}

/// Copy the notes of `source` that `table` maps into `target`.
///
/// Each mapped note is emitted once per destination number, in table order,
/// with the same on/off kind and velocity on channel 0; all copies share the
/// source note's tick. Unmapped notes are dropped. A missing source leaves
/// the target as it was.
pub fn copy_notes_only<'d, 'a>(
    doc: &'d mut Document<'a>,
    source: &str,
    target: &str,
    table: &TranslationTable,
) -> &'d mut Track<'a> {
    doc.ensure_track(target);
    let Some(src) = doc.find(source) else {
        warn!("Track '{}' not found, '{}' stays empty", source, target);
        return doc.ensure_track(target);
    };

    let mut mapped: Vec<(u64, EventKind<'a>)> = Vec::new();
    for (tick, event) in src.timed_events() {
        let Some(note) = event.kind.note() else {
            continue;
        };
        let Some(destinations) = table.lookup(note.key) else {
            continue;
        };
        for &key in destinations {
            if let Some(kind) = event.kind.with_note(Note::new(0, key, note.velocity)) {
                mapped.push((tick, kind));
            }
        }
    }
    let copied = retime(mapped);

    let out = doc.ensure_track(target);
    for event in copied {
        out.push(event);
    }
    info!("'{}' notes copied to '{}'", source, target);
    out
}
