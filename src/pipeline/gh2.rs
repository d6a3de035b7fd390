// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Built-in gh2 to ms conversion script.

use std::collections::BTreeMap;

use super::{InstrumentScript, Step};
use crate::tables::{self, TranslationTable};

/// Five-fret lanes plus star power
pub const INSTRUMENT: &str = "instrument";
/// gh2 fret-mapping to GHL lanes
pub const FRET_MAPPING: &str = "fret-mapping";
/// Big-note marker
pub const BIG_NOTE: &str = "big-note";
/// Band drums cymbal
pub const DRUM_CYMBAL: &str = "drum-cymbal";
/// Drum triggers
pub const DRUM_TRIGGERS: &str = "drum-triggers";
/// Keys triggers
pub const KEYS_TRIGGERS: &str = "keys-triggers";

/// Tables referenced by [`instruments`]
pub fn tables() -> BTreeMap<String, TranslationTable> {
    [
        (INSTRUMENT, tables::instrument_notes()),
        (FRET_MAPPING, tables::fret_mapping()),
        (BIG_NOTE, tables::big_note()),
        (DRUM_CYMBAL, tables::drum_cymbal()),
        (DRUM_TRIGGERS, tables::drum_triggers()),
        (KEYS_TRIGGERS, tables::keys_triggers()),
    ]
    .into_iter()
    .map(|(name, table)| (name.to_string(), table))
    .collect()
}

/// Instrument scripts in run order
pub fn instruments() -> Vec<InstrumentScript> {
    vec![
        fretted("PART GUITAR", true, &[]),
        fretted("PART BASS", false, &["BAND BASS"]),
        fretted("PART GUITAR COOP", false, &[]),
        fretted("PART RHYTHM", false, &[]),
        drums(),
        keys_events(),
        keys_notes(),
    ]
}

/// Split a fretted part into events and remapped notes, then rebuild it
/// under its own name.
fn fretted(part: &str, big_note: bool, also_delete: &[&str]) -> InstrumentScript {
    let events = format!("{} EVENTS", part);
    let notes = format!("{} NOTES", part);

    let mut script = InstrumentScript::new(part)
        .then(Step::copy_events(part, &events))
        .then(Step::copy_notes(part, &notes, INSTRUMENT));
    if big_note {
        // Consumed by the keys notes script
        script = script.then(Step::copy_notes(part, "BIG-NOTE", BIG_NOTE));
    }
    script = script
        .then(Step::copy_notes(part, format!("{} GHL", part), FRET_MAPPING))
        .then(Step::delete(part))
        .then(Step::merge(&events, &notes, part))
        .then(Step::delete(&events))
        .then(Step::delete(&notes));
    for track in also_delete {
        script = script.then(Step::delete(*track));
    }
    script
}

fn drums() -> InstrumentScript {
    InstrumentScript::new("PART DRUMS")
        .then(Step::copy_events("BAND DRUMS", "PART DRUMS EVENTS"))
        .then(Step::copy_notes("BAND DRUMS", "DRUM CYMBAL", DRUM_CYMBAL))
        .then(Step::copy_notes("TRIGGERS", "DRUM NOTES", DRUM_TRIGGERS))
        .then(Step::merge("DRUM CYMBAL", "DRUM NOTES", "PART DRUMS NOTES"))
        .then(Step::merge("PART DRUMS EVENTS", "PART DRUMS NOTES", "PART DRUMS"))
        .then(Step::delete("BAND DRUMS"))
        .then(Step::delete("PART DRUMS EVENTS"))
        .then(Step::delete("DRUM CYMBAL"))
        .then(Step::delete("DRUM NOTES"))
        .then(Step::delete("PART DRUMS NOTES"))
}

fn keys_events() -> InstrumentScript {
    InstrumentScript::new("KEYS EVENTS")
        .then(Step::merge("BAND SINGER", "BAND KEYS", "KEYS EVENTS"))
        .then(Step::delete("BAND SINGER"))
        .then(Step::delete("BAND KEYS"))
}

fn keys_notes() -> InstrumentScript {
    InstrumentScript::new("KEYS NOTES")
        .then(Step::copy_notes("TRIGGERS", "TEMP KEYS NOTES", KEYS_TRIGGERS))
        .then(Step::merge("BIG-NOTE", "TEMP KEYS NOTES", "KEYS NOTES"))
        .then(Step::merge("KEYS EVENTS", "KEYS NOTES", "PART KEYS"))
        .then(Step::delete("TRIGGERS"))
        .then(Step::delete("TEMP KEYS NOTES"))
        .then(Step::delete("BIG-NOTE"))
        .then(Step::delete("KEYS NOTES"))
        .then(Step::delete("KEYS EVENTS"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::{Document, Event, Note, Track};
    use crate::pipeline::Pipeline;
    use midly::{MetaMessage, TrackEventKind};

    fn script(name: &str) -> InstrumentScript {
        instruments()
            .into_iter()
            .find(|s| s.name == name)
            .unwrap()
    }

    #[test]
    fn test_run_order() {
        let names: Vec<String> = instruments().into_iter().map(|s| s.name).collect();
        assert_eq!(
            names,
            vec![
                "PART GUITAR",
                "PART BASS",
                "PART GUITAR COOP",
                "PART RHYTHM",
                "PART DRUMS",
                "KEYS EVENTS",
                "KEYS NOTES",
            ]
        );
    }

    #[test]
    fn test_guitar_steps() {
        let guitar = script("PART GUITAR");
        assert_eq!(
            guitar.steps,
            vec![
                Step::copy_events("PART GUITAR", "PART GUITAR EVENTS"),
                Step::copy_notes("PART GUITAR", "PART GUITAR NOTES", INSTRUMENT),
                Step::copy_notes("PART GUITAR", "BIG-NOTE", BIG_NOTE),
                Step::copy_notes("PART GUITAR", "PART GUITAR GHL", FRET_MAPPING),
                Step::delete("PART GUITAR"),
                Step::merge("PART GUITAR EVENTS", "PART GUITAR NOTES", "PART GUITAR"),
                Step::delete("PART GUITAR EVENTS"),
                Step::delete("PART GUITAR NOTES"),
            ]
        );
    }

    #[test]
    fn test_source_deleted_before_merge_reuses_name() {
        for part in ["PART GUITAR", "PART BASS", "PART GUITAR COOP", "PART RHYTHM"] {
            let s = script(part);
            let delete = s.position(&Step::delete(part)).unwrap();
            let merge = s
                .steps
                .iter()
                .position(|step| step.output() == Some(part))
                .unwrap();
            assert!(delete < merge, "{} deletes its source after the merge", part);
        }
    }

    #[test]
    fn test_bass_drops_band_bass() {
        let bass = script("PART BASS");
        assert_eq!(bass.steps.last(), Some(&Step::delete("BAND BASS")));
        assert!(bass.position(&Step::copy_notes("PART BASS", "BIG-NOTE", BIG_NOTE)).is_none());
    }

    #[test]
    fn test_big_note_created_before_keys_use_it() {
        let all: Vec<Step> = instruments().into_iter().flat_map(|s| s.steps).collect();
        let created = all.iter().position(|s| s.output() == Some("BIG-NOTE")).unwrap();
        let used = all
            .iter()
            .position(|s| matches!(s, Step::Merge { first, .. } if first == "BIG-NOTE"))
            .unwrap();
        let deleted = all.iter().position(|s| *s == Step::delete("BIG-NOTE")).unwrap();
        assert!(created < used && used < deleted);
    }

    #[test]
    fn test_every_table_exists() {
        let tables = tables();
        for step in instruments().iter().flat_map(|s| s.steps.iter()) {
            if let Some(table) = step.table() {
                assert!(tables.contains_key(table), "missing table {}", table);
            }
        }
    }

    fn chart() -> Document<'static> {
        let mut guitar = Track::new("PART GUITAR");
        guitar.push(Event::other(0, TrackEventKind::Meta(MetaMessage::Text(b"[idle]"))));
        guitar.push(Event::note_on(100, Note::new(0, 96, 100))); // expert green
        guitar.push(Event::note_on(0, Note::new(0, 40, 100))); // GHL only
        guitar.push(Event::note_on(0, Note::new(0, 110, 100))); // big note
        guitar.push(Event::note_off(50, Note::new(0, 96, 0)));

        let mut drums = Track::new("BAND DRUMS");
        drums.push(Event::other(10, TrackEventKind::Meta(MetaMessage::Text(b"[play]"))));
        drums.push(Event::note_on(20, Note::new(9, 37, 90)));

        let mut triggers = Track::new("TRIGGERS");
        triggers.push(Event::note_on(5, Note::new(0, 24, 80)));
        triggers.push(Event::note_on(5, Note::new(0, 48, 80)));

        let mut singer = Track::new("BAND SINGER");
        singer.push(Event::other(40, TrackEventKind::Meta(MetaMessage::Text(b"[sing]"))));

        Document::from_tracks(
            Document::default().header(),
            vec![
                Track::new("TEMPO"),
                guitar,
                Track::new("BAND BASS"),
                drums,
                triggers,
                singer,
            ],
        )
    }

    #[test]
    fn test_full_conversion_tracks() {
        let mut doc = chart();
        Pipeline::gh2_to_ms().run(&mut doc);

        assert_eq!(
            doc.track_names(),
            vec![
                "TEMPO",
                "PART GUITAR GHL",
                "PART GUITAR",
                "PART BASS GHL",
                "PART BASS",
                "PART GUITAR COOP GHL",
                "PART GUITAR COOP",
                "PART RHYTHM GHL",
                "PART RHYTHM",
                "PART DRUMS",
                "PART KEYS",
            ]
        );
    }

    #[test]
    fn test_full_conversion_content() {
        let mut doc = chart();
        Pipeline::gh2_to_ms().run(&mut doc);

        let guitar = doc.find("PART GUITAR").unwrap();
        assert_eq!(
            guitar.events()[1..],
            [
                Event::other(0, TrackEventKind::Meta(MetaMessage::Text(b"[idle]"))),
                Event::note_on(100, Note::new(0, 96, 100)),
                Event::note_off(50, Note::new(0, 96, 0)),
            ]
        );

        let ghl = doc.find("PART GUITAR GHL").unwrap();
        assert_eq!(ghl.events()[1..], [Event::note_on(100, Note::new(0, 98, 100))]);

        let drums = doc.find("PART DRUMS").unwrap();
        assert_eq!(
            drums.events()[1..],
            [
                Event::note_on(5, Note::new(0, 96, 80)),
                Event::other(5, TrackEventKind::Meta(MetaMessage::Text(b"[play]"))),
                Event::note_on(20, Note::new(0, 100, 90)),
            ]
        );

        let keys = doc.find("PART KEYS").unwrap();
        assert_eq!(
            keys.events()[1..],
            [
                Event::note_on(10, Note::new(0, 96, 80)),
                Event::other(30, TrackEventKind::Meta(MetaMessage::Text(b"[sing]"))),
                Event::note_on(60, Note::new(0, 100, 100)),
            ]
        );

        let bass = doc.find("PART BASS").unwrap();
        assert_eq!(bass.timed_len(), 0);
    }
}
