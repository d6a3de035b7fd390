// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Time-ordered merge of two tracks.

use tracing::info;

use super::retime;
use crate::document::{Document, EventKind, Track};

/// Merge `first` and `second` into a new track named `merged`.
///
/// Either source may be missing. Events keep their absolute ticks; on equal
/// ticks `first`'s events come before `second`'s and each source keeps its
/// own order. The new track is appended even if a track named `merged`
/// already exists, and the sources are left in place.
pub fn merge_tracks<'d, 'a>(
    doc: &'d mut Document<'a>,
    first: &str,
    second: &str,
    merged: &str,
) -> &'d mut Track<'a> {
    let sources: Vec<&Track<'a>> = [first, second]
        .into_iter()
        .filter_map(|name| doc.find(name))
        .collect();

    if sources.is_empty() {
        info!(
            "No '{}' or '{}' to merge; created empty '{}'",
            first, second, merged
        );
        return doc.push_track(Track::new(merged));
    }

    let mut timed: Vec<(u64, EventKind<'a>)> = sources
        .iter()
        .flat_map(|track| track.timed_events())
        .filter(|(_, event)| !event.kind.is_name())
        .map(|(tick, event)| (tick, event.kind.clone()))
        .collect();
    // Stable: ties keep input order
    timed.sort_by_key(|(tick, _)| *tick);

    let mut track = Track::new(merged);
    for event in retime(timed) {
        track.push(event);
    }

    info!("Merged '{}' + '{}' into '{}'", first, second, merged);
    doc.push_track(track)
}
