// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Track-level operations used by the conversion pipeline.
//!
//! This module provides:
//! - Copying non-note events between tracks
//! - Copying notes through a translation table
//! - Merging two tracks by absolute time
//!
//! Every operation works on absolute ticks computed up front with
//! [`Track::timed_events`](crate::document::Track::timed_events) and turns
//! them back into delta times only when building the output track.

pub mod copy;
pub mod merge;

pub use copy::{copy_events_only, copy_notes_only};
pub use merge::merge_tracks;

use crate::document::{Event, EventKind};

/// Convert absolute-tick events back to delta-timed events.
///
/// Input must be in non-decreasing tick order. The first delta is measured
/// from tick 0.
pub(crate) fn retime<'a, I>(timed: I) -> Vec<Event<'a>>
where
    I: IntoIterator<Item = (u64, EventKind<'a>)>,
{
    let mut previous = 0u64;
    timed
        .into_iter()
        .map(|(tick, kind)| {
            let delta = tick.saturating_sub(previous);
            previous = tick;
            Event::new(delta, kind)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::Note;

    #[test]
    fn test_retime() {
        let note = EventKind::NoteOn(Note::new(0, 60, 100));
        let events = retime(vec![
            (50, note.clone()),
            (100, note.clone()),
            (100, note.clone()),
            (150, note),
        ]);
        let deltas: Vec<u64> = events.iter().map(|e| e.delta).collect();
        assert_eq!(deltas, vec![50, 50, 0, 50]);
    }

    #[test]
    fn test_retime_empty() {
        assert!(retime(Vec::new()).is_empty());
    }
}
