// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! In-memory chart document.
//!
//! A [`Document`] is the SMF header plus an ordered list of [`Track`]s. Tracks
//! are identified by the text of their track-name meta event; lookups go
//! through a name index so the first track declaring a name always wins.

pub mod smf;

pub use smf::SmfError;

use std::borrow::Cow;
use std::collections::HashMap;

use midly::num::u15;
use midly::{Format, Header, Timing, TrackEventKind};
use tracing::{debug, info, warn};

/// A channel note message
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Note {
    /// MIDI channel (0-15)
    pub channel: u8,
    /// Note number (0-127)
    pub key: u8,
    /// Velocity (0-127)
    pub velocity: u8,
}

impl Note {
    /// Create a new note
    pub fn new(channel: u8, key: u8, velocity: u8) -> Self {
        Self {
            channel,
            key,
            velocity,
        }
    }
}

/// What an event carries
#[derive(Debug, Clone, PartialEq)]
pub enum EventKind<'a> {
    /// Track name declaration (raw meta text)
    Name(Cow<'a, [u8]>),
    /// Note on
    NoteOn(Note),
    /// Note off
    NoteOff(Note),
    /// Anything else, kept exactly as parsed
    Other(TrackEventKind<'a>),
}

impl EventKind<'_> {
    /// Check if this is a track name declaration
    pub fn is_name(&self) -> bool {
        matches!(self, EventKind::Name(_))
    }

    /// Check if this is a note on or note off
    pub fn is_note(&self) -> bool {
        matches!(self, EventKind::NoteOn(_) | EventKind::NoteOff(_))
    }

    /// The note payload, if any
    pub fn note(&self) -> Option<Note> {
        match self {
            EventKind::NoteOn(note) | EventKind::NoteOff(note) => Some(*note),
            _ => None,
        }
    }

    /// Same on/off kind carrying a different note
    pub fn with_note(&self, note: Note) -> Option<Self> {
        match self {
            EventKind::NoteOn(_) => Some(EventKind::NoteOn(note)),
            EventKind::NoteOff(_) => Some(EventKind::NoteOff(note)),
            _ => None,
        }
    }
}

/// A delta-timed event
#[derive(Debug, Clone, PartialEq)]
pub struct Event<'a> {
    /// Ticks since the previous event in the same track
    pub delta: u64,
    /// Event payload
    pub kind: EventKind<'a>,
}

impl<'a> Event<'a> {
    /// Create a new event
    pub fn new(delta: u64, kind: EventKind<'a>) -> Self {
        Self { delta, kind }
    }

    /// Track name declaration at delta 0
    pub fn name(name: &str) -> Self {
        Self::new(0, EventKind::Name(Cow::Owned(name.as_bytes().to_vec())))
    }

    /// Note on event
    pub fn note_on(delta: u64, note: Note) -> Self {
        Self::new(delta, EventKind::NoteOn(note))
    }

    /// Note off event
    pub fn note_off(delta: u64, note: Note) -> Self {
        Self::new(delta, EventKind::NoteOff(note))
    }

    /// Opaque event
    pub fn other(delta: u64, kind: TrackEventKind<'a>) -> Self {
        Self::new(delta, EventKind::Other(kind))
    }
}

/// A named, ordered sequence of delta-timed events
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Track<'a> {
    events: Vec<Event<'a>>,
}

impl<'a> Track<'a> {
    /// Create a track holding only its name declaration
    pub fn new(name: &str) -> Self {
        Self {
            events: vec![Event::name(name)],
        }
    }

    /// Create a track from raw events
    pub fn from_events(events: Vec<Event<'a>>) -> Self {
        Self { events }
    }

    /// The first declared name
    pub fn name(&self) -> Option<&[u8]> {
        self.names().first().copied()
    }

    /// The first declared name, lossily decoded for display
    pub fn display_name(&self) -> Cow<'_, str> {
        match self.name() {
            Some(bytes) => String::from_utf8_lossy(bytes),
            None => Cow::Borrowed("<unnamed>"),
        }
    }

    /// Every name declared by this track, in event order
    fn names(&self) -> Vec<&[u8]> {
        self.events
            .iter()
            .filter_map(|event| match &event.kind {
                EventKind::Name(name) => Some(name.as_ref()),
                _ => None,
            })
            .collect()
    }

    /// All events, name declarations included
    pub fn events(&self) -> &[Event<'a>] {
        &self.events
    }

    /// Number of events
    pub fn len(&self) -> usize {
        self.events.len()
    }

    /// Check if the track has no events at all
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Number of events that are not name declarations
    pub fn timed_len(&self) -> usize {
        self.events.iter().filter(|e| !e.kind.is_name()).count()
    }

    /// Append an event.
    ///
    /// Name declarations are ignored, since the document's name index would
    /// never see them; use [`Document::rename`] to change a track's identity.
    pub fn push(&mut self, event: Event<'a>) {
        if event.kind.is_name() {
            warn!("Ignoring name declaration pushed onto a track");
            return;
        }
        self.events.push(event);
    }

    /// Pair every event with its absolute tick
    pub fn timed_events(&self) -> impl Iterator<Item = (u64, &Event<'a>)> + '_ {
        self.events.iter().scan(0u64, |now, event| {
            *now += event.delta;
            Some((*now, event))
        })
    }

    /// Absolute ticks of every event that is not a name declaration
    pub fn absolute_times(&self) -> Vec<u64> {
        self.timed_events()
            .filter(|(_, event)| !event.kind.is_name())
            .map(|(tick, _)| tick)
            .collect()
    }

    /// Rewrite every declaration of `old` to `new`
    fn rename(&mut self, old: &[u8], new: &str) {
        for event in &mut self.events {
            if let EventKind::Name(name) = &mut event.kind {
                if name.as_ref() == old {
                    *name = Cow::Owned(new.as_bytes().to_vec());
                }
            }
        }
    }
}

/// A chart: SMF header plus tracks
#[derive(Debug, Clone)]
pub struct Document<'a> {
    /// Header (format and timing) carried through unchanged
    header: Header,
    /// Tracks in file order
    tracks: Vec<Track<'a>>,
    /// Declared name -> ascending track positions
    index: HashMap<Vec<u8>, Vec<usize>>,
}

impl<'a> Document<'a> {
    /// Create an empty document
    pub fn new(header: Header) -> Self {
        Self {
            header,
            tracks: Vec::new(),
            index: HashMap::new(),
        }
    }

    /// Create a document from already-built tracks
    pub fn from_tracks(header: Header, tracks: Vec<Track<'a>>) -> Self {
        let mut doc = Self::new(header);
        for track in tracks {
            doc.push_track(track);
        }
        doc
    }

    /// Get the header
    pub fn header(&self) -> Header {
        self.header
    }

    /// Ticks per quarter note, for metrical timing
    pub fn ticks_per_beat(&self) -> Option<u16> {
        match self.header.timing {
            Timing::Metrical(ticks) => Some(ticks.as_int()),
            Timing::Timecode(..) => None,
        }
    }

    /// All tracks in order
    pub fn tracks(&self) -> &[Track<'a>] {
        &self.tracks
    }

    /// Number of tracks
    pub fn track_count(&self) -> usize {
        self.tracks.len()
    }

    /// Names of every track, lossily decoded, in order
    pub fn track_names(&self) -> Vec<String> {
        self.tracks
            .iter()
            .map(|t| t.display_name().into_owned())
            .collect()
    }

    /// Position of the first track declaring `name`
    pub fn position(&self, name: &str) -> Option<usize> {
        self.index
            .get(name.as_bytes())
            .and_then(|positions| positions.first())
            .copied()
    }

    /// Find the first track declaring `name`
    pub fn find(&self, name: &str) -> Option<&Track<'a>> {
        self.position(name).map(|i| &self.tracks[i])
    }

    /// Find the first track declaring `name`, mutably
    pub fn find_mut(&mut self, name: &str) -> Option<&mut Track<'a>> {
        self.position(name).map(move |i| &mut self.tracks[i])
    }

    /// Append a track and return it
    pub fn push_track(&mut self, track: Track<'a>) -> &mut Track<'a> {
        let position = self.tracks.len();
        for name in track.names() {
            let positions = self.index.entry(name.to_vec()).or_default();
            if positions.last() != Some(&position) {
                positions.push(position);
            }
        }
        self.tracks.push(track);
        &mut self.tracks[position]
    }

    /// Rename the first track declaring `old`.
    ///
    /// Returns `false` if no track declares `old`.
    pub fn rename(&mut self, old: &str, new: &str) -> bool {
        let Some(position) = self.position(old) else {
            debug!("'{}' not found", old);
            return false;
        };

        self.unindex(old.as_bytes(), position);
        self.tracks[position].rename(old.as_bytes(), new);

        let positions = self.index.entry(new.as_bytes().to_vec()).or_default();
        if let Err(slot) = positions.binary_search(&position) {
            positions.insert(slot, position);
        }

        info!("'{}' renamed to '{}'", old, new);
        true
    }

    /// Find `name`, creating an empty track for it if absent
    pub fn ensure_track(&mut self, name: &str) -> &mut Track<'a> {
        match self.position(name) {
            Some(position) => &mut self.tracks[position],
            None => self.push_track(Track::new(name)),
        }
    }

    /// Remove the first track declaring `name`.
    ///
    /// Returns `false`, leaving the track list untouched, if none does.
    pub fn delete_track(&mut self, name: &str) -> bool {
        let Some(position) = self.position(name) else {
            debug!("'{}' not found", name);
            return false;
        };

        let removed = self.tracks.remove(position);
        for declared in removed.names() {
            self.unindex(declared, position);
        }
        for positions in self.index.values_mut() {
            for p in positions.iter_mut() {
                if *p > position {
                    *p -= 1;
                }
            }
        }

        info!("'{}' deleted", name);
        true
    }

    fn unindex(&mut self, name: &[u8], position: usize) {
        if let Some(positions) = self.index.get_mut(name) {
            positions.retain(|&p| p != position);
            if positions.is_empty() {
                self.index.remove(name);
            }
        }
    }
}

impl Default for Document<'_> {
    fn default() -> Self {
        Self::new(Header::new(Format::Parallel, Timing::Metrical(u15::new(480))))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doc_with(names: &[&str]) -> Document<'static> {
        let tracks = names.iter().map(|n| Track::new(n)).collect();
        Document::from_tracks(Document::default().header(), tracks)
    }

    #[test]
    fn test_find_is_exact() {
        let doc = doc_with(&["PART GUITAR", "PART BASS"]);
        assert!(doc.find("PART GUITAR").is_some());
        assert!(doc.find("part guitar").is_none());
        assert!(doc.find("PART GUITAR ").is_none());
        assert!(doc.find("PART DRUMS").is_none());
    }

    #[test]
    fn test_first_match_wins() {
        let mut doc = doc_with(&["A", "B"]);
        let mut dup = Track::new("A");
        dup.push(Event::note_on(10, Note::new(0, 60, 100)));
        doc.push_track(dup);

        assert_eq!(doc.position("A"), Some(0));
        assert_eq!(doc.find("A").unwrap().len(), 1);

        assert!(doc.delete_track("A"));
        assert_eq!(doc.position("A"), Some(1));
        assert_eq!(doc.find("A").unwrap().len(), 2);
    }

    #[test]
    fn test_rename() {
        let mut doc = doc_with(&["OLD", "OTHER"]);
        doc.find_mut("OLD")
            .unwrap()
            .push(Event::note_on(5, Note::new(0, 60, 1)));

        assert!(doc.rename("OLD", "NEW"));
        assert!(doc.find("OLD").is_none());

        let track = doc.find("NEW").unwrap();
        assert_eq!(track.name(), Some(&b"NEW"[..]));
        assert_eq!(track.len(), 2);
        assert_eq!(doc.position("NEW"), Some(0));
    }

    #[test]
    fn test_pushed_name_is_ignored() {
        let mut doc = doc_with(&["A"]);
        let track = doc.find_mut("A").unwrap();
        track.push(Event::name("X"));
        track.push(Event::note_on(5, Note::new(0, 60, 1)));

        let track = doc.find("A").unwrap();
        assert_eq!(track.len(), 2);
        assert_eq!(track.display_name(), "A");
        assert!(doc.find("X").is_none());
    }

    #[test]
    fn test_rename_missing() {
        let mut doc = doc_with(&["A"]);
        assert!(!doc.rename("B", "C"));
        assert_eq!(doc.track_names(), vec!["A"]);
    }

    #[test]
    fn test_rename_onto_existing_name() {
        let mut doc = doc_with(&["X", "Y"]);
        assert!(doc.rename("Y", "X"));
        assert_eq!(doc.position("X"), Some(0));
        assert!(doc.delete_track("X"));
        assert_eq!(doc.position("X"), Some(0));
    }

    #[test]
    fn test_ensure_track_is_idempotent() {
        let mut doc = doc_with(&["A"]);
        doc.ensure_track("B");
        doc.ensure_track("B");
        doc.ensure_track("A");

        assert_eq!(doc.track_names(), vec!["A", "B"]);
        assert_eq!(doc.find("B").unwrap().events(), &[Event::name("B")]);
    }

    #[test]
    fn test_delete_missing_leaves_tracks() {
        let mut doc = doc_with(&["A", "B"]);
        let before = doc.tracks().to_vec();

        assert!(!doc.delete_track("C"));
        assert_eq!(doc.tracks(), &before[..]);
    }

    #[test]
    fn test_delete_reindexes_later_tracks() {
        let mut doc = doc_with(&["A", "B", "C"]);
        assert!(doc.delete_track("A"));
        assert_eq!(doc.position("B"), Some(0));
        assert_eq!(doc.position("C"), Some(1));
        assert!(doc.delete_track("C"));
        assert_eq!(doc.track_names(), vec!["B"]);
    }

    #[test]
    fn test_unnamed_track_is_never_found() {
        let mut doc = doc_with(&["A"]);
        doc.push_track(Track::from_events(vec![Event::note_on(0, Note::new(0, 1, 1))]));
        assert_eq!(doc.track_count(), 2);
        assert_eq!(doc.track_names(), vec!["A", "<unnamed>"]);
    }

    #[test]
    fn test_timed_events() {
        let mut track = Track::new("T");
        track.push(Event::note_on(50, Note::new(0, 60, 100)));
        track.push(Event::note_off(0, Note::new(0, 60, 0)));
        track.push(Event::note_on(100, Note::new(0, 62, 100)));

        let ticks: Vec<u64> = track.timed_events().map(|(t, _)| t).collect();
        assert_eq!(ticks, vec![0, 50, 50, 150]);
        assert_eq!(track.absolute_times(), vec![50, 50, 150]);
        assert_eq!(track.timed_len(), 3);
    }

    #[test]
    fn test_ticks_per_beat() {
        let doc = Document::default();
        assert_eq!(doc.ticks_per_beat(), Some(480));
    }
}
