// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Note-number translation tables.
//!
//! A table maps a source note number to one destination note, or to an
//! ordered list of destinations (fan-out). Source notes missing from the
//! table are dropped, never passed through.

use std::collections::BTreeMap;
use std::fmt;

use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Highest valid MIDI note number
pub const MAX_NOTE: u8 = 127;

/// Destination of a mapped note
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum NoteTarget {
    /// One destination note
    Single(u8),
    /// Several destination notes at the same tick, in order
    Fan(Vec<u8>),
}

impl NoteTarget {
    /// Destination notes in emission order
    pub fn notes(&self) -> &[u8] {
        match self {
            NoteTarget::Single(note) => std::slice::from_ref(note),
            NoteTarget::Fan(notes) => notes,
        }
    }
}

impl From<u8> for NoteTarget {
    fn from(note: u8) -> Self {
        NoteTarget::Single(note)
    }
}

impl From<Vec<u8>> for NoteTarget {
    fn from(notes: Vec<u8>) -> Self {
        NoteTarget::Fan(notes)
    }
}

/// Source note number used as a map key.
///
/// YAML writes these as integers, TOML only allows string keys, so both are
/// accepted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NoteKey(pub u8);

impl Serialize for NoteKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u8(self.0)
    }
}

impl<'de> Deserialize<'de> for NoteKey {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct KeyVisitor;

        impl<'de> Visitor<'de> for KeyVisitor {
            type Value = NoteKey;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("a note number between 0 and 255")
            }

            fn visit_u64<E: de::Error>(self, value: u64) -> Result<NoteKey, E> {
                u8::try_from(value)
                    .map(NoteKey)
                    .map_err(|_| E::invalid_value(de::Unexpected::Unsigned(value), &self))
            }

            fn visit_i64<E: de::Error>(self, value: i64) -> Result<NoteKey, E> {
                u8::try_from(value)
                    .map(NoteKey)
                    .map_err(|_| E::invalid_value(de::Unexpected::Signed(value), &self))
            }

            fn visit_str<E: de::Error>(self, value: &str) -> Result<NoteKey, E> {
                value
                    .trim()
                    .parse()
                    .map(NoteKey)
                    .map_err(|_| E::invalid_value(de::Unexpected::Str(value), &self))
            }
        }

        deserializer.deserialize_any(KeyVisitor)
    }
}

/// Note translation table
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TranslationTable {
    entries: BTreeMap<NoteKey, NoteTarget>,
}

impl TranslationTable {
    /// Create an empty table
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace a mapping
    pub fn insert(&mut self, source: u8, target: impl Into<NoteTarget>) {
        self.entries.insert(NoteKey(source), target.into());
    }

    /// Builder form of [`insert`](Self::insert)
    pub fn with(mut self, source: u8, target: impl Into<NoteTarget>) -> Self {
        self.insert(source, target);
        self
    }

    /// Destination notes for `source`, or `None` if it is dropped
    pub fn lookup(&self, source: u8) -> Option<&[u8]> {
        self.entries.get(&NoteKey(source)).map(NoteTarget::notes)
    }

    /// Check whether `source` is mapped
    pub fn contains(&self, source: u8) -> bool {
        self.entries.contains_key(&NoteKey(source))
    }

    /// Number of mapped source notes
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if the table maps nothing
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate mappings in source order
    pub fn iter(&self) -> impl Iterator<Item = (u8, &NoteTarget)> {
        self.entries.iter().map(|(key, target)| (key.0, target))
    }

    /// First note number (source or destination) above [`MAX_NOTE`]
    pub fn first_out_of_range(&self) -> Option<u8> {
        self.iter().find_map(|(source, target)| {
            std::iter::once(source)
                .chain(target.notes().iter().copied())
                .find(|&note| note > MAX_NOTE)
        })
    }

    /// Sources mapping to an empty destination list
    pub fn empty_fans(&self) -> Vec<u8> {
        self.iter()
            .filter(|(_, target)| target.notes().is_empty())
            .map(|(source, _)| source)
            .collect()
    }
}

impl<T: Into<NoteTarget>> FromIterator<(u8, T)> for TranslationTable {
    fn from_iter<I: IntoIterator<Item = (u8, T)>>(iter: I) -> Self {
        let mut table = Self::new();
        for (source, target) in iter {
            table.insert(source, target);
        }
        table
    }
}

/// gh2 fret-mapping notes to the six-fret (GHL) lane layout
pub fn fret_mapping() -> TranslationTable {
    [
        // Expert
        (40u8, 98u8), (41, 99), (42, 100), (43, 95), (44, 96), (45, 97),
        // Hard
        (46, 86), (47, 87), (48, 88), (49, 83), (50, 84), (51, 85),
        // Medium
        (52, 74), (53, 75), (54, 76), (55, 71), (56, 72), (57, 73),
        // Easy
        (58, 62), (59, 63),
        // Face-off player 1 / player 2 (easy fifth and sixth lane)
        (105, 60), (106, 61),
    ]
    .into_iter()
    .collect()
}

/// Five-fret gem lanes per difficulty, plus star power
pub fn instrument_notes() -> TranslationTable {
    let lanes = [60u8, 72, 84, 96]
        .into_iter()
        .flat_map(|base| (base..base + 5).map(|note| (note, note)));
    lanes.chain(std::iter::once((103, 116))).collect()
}

/// Big-note marker lifted out of the guitar chart
pub fn big_note() -> TranslationTable {
    TranslationTable::new().with(110, 100u8)
}

/// Cymbal hit from the band drums track
pub fn drum_cymbal() -> TranslationTable {
    TranslationTable::new().with(37, 100u8)
}

/// Drum triggers to expert drum lanes
pub fn drum_triggers() -> TranslationTable {
    [(24u8, 96u8), (25, 97), (26, 98)].into_iter().collect()
}

/// Keys triggers to expert keys lanes
pub fn keys_triggers() -> TranslationTable {
    [(48u8, 96u8), (49, 97), (50, 98), (52, 99)].into_iter().collect()
}
