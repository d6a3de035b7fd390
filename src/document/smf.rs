// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Standard MIDI file loading and saving.
//!
//! Parsing and encoding are done by `midly`; this module only converts
//! between its track events and the document model. Header format and
//! timing resolution pass through untouched.

use std::borrow::Cow;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

use midly::num::{u28, u4, u7};
use midly::{MetaMessage, MidiMessage, Smf, TrackEvent, TrackEventKind};
use thiserror::Error;

use super::{Document, Event, EventKind, Note, Track};

/// Errors raised while reading or writing a chart file
#[derive(Debug, Error)]
pub enum SmfError {
    /// The bytes are not a valid standard MIDI file
    #[error("malformed MIDI file: {0}")]
    Parse(#[from] midly::Error),

    /// A delta time does not fit the file format's 28-bit field
    #[error("delta time {delta} in track '{track}' exceeds the MIDI limit")]
    DeltaOverflow { track: String, delta: u64 },

    /// A note field is out of the 7-bit range (or channel out of 0-15)
    #[error("{field} value {value} in track '{track}' is out of range")]
    OutOfRange {
        track: String,
        field: &'static str,
        value: u8,
    },

    /// Writing failed
    #[error("failed to write MIDI file: {0}")]
    Io(#[from] io::Error),
}

impl<'a> Document<'a> {
    /// Parse a document from SMF bytes
    pub fn parse(bytes: &'a [u8]) -> Result<Self, SmfError> {
        let smf = Smf::parse(bytes)?;
        let tracks = smf.tracks.iter().map(|raw| track_from_smf(raw)).collect();
        Ok(Self::from_tracks(smf.header, tracks))
    }

    /// Encode the document as SMF bytes
    pub fn to_bytes(&self) -> Result<Vec<u8>, SmfError> {
        let mut buffer = Vec::new();
        self.write(&mut buffer)?;
        Ok(buffer)
    }

    /// Write the document to a file
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), SmfError> {
        let mut writer = BufWriter::new(File::create(path)?);
        self.write(&mut writer)?;
        writer.flush()?;
        Ok(())
    }

    /// Write SMF data to writer
    pub fn write<W: Write>(&self, writer: &mut W) -> Result<(), SmfError> {
        let mut smf = Smf::new(self.header());
        for track in self.tracks() {
            smf.tracks.push(track_to_smf(track)?);
        }
        smf.write_std(writer)?;
        Ok(())
    }
}

fn track_from_smf<'a>(raw: &[TrackEvent<'a>]) -> Track<'a> {
    let events = raw
        .iter()
        .map(|event| {
            let delta = u64::from(event.delta.as_int());
            let kind = match event.kind {
                TrackEventKind::Meta(MetaMessage::TrackName(name)) => {
                    EventKind::Name(Cow::Borrowed(name))
                }
                TrackEventKind::Midi { channel, message } => match message {
                    MidiMessage::NoteOn { key, vel } => EventKind::NoteOn(Note::new(
                        channel.as_int(),
                        key.as_int(),
                        vel.as_int(),
                    )),
                    MidiMessage::NoteOff { key, vel } => EventKind::NoteOff(Note::new(
                        channel.as_int(),
                        key.as_int(),
                        vel.as_int(),
                    )),
                    _ => EventKind::Other(event.kind),
                },
                other => EventKind::Other(other),
            };
            Event::new(delta, kind)
        })
        .collect();
    Track::from_events(events)
}

/// Convert a track for encoding.
///
/// Copies and merges can leave end-of-track markers in the middle of a track.
/// Those are dropped here with their delta carried forward, and one marker is
/// written last, so the track keeps its length and stays well-formed.
fn track_to_smf<'b>(track: &'b Track<'_>) -> Result<Vec<TrackEvent<'b>>, SmfError> {
    let mut out = Vec::with_capacity(track.len() + 1);
    let mut carried = 0u64;

    for event in track.events() {
        let delta = carried + event.delta;
        let kind = match &event.kind {
            EventKind::Other(TrackEventKind::Meta(MetaMessage::EndOfTrack)) => {
                carried = delta;
                continue;
            }
            EventKind::Name(name) => TrackEventKind::Meta(MetaMessage::TrackName(name.as_ref())),
            EventKind::NoteOn(note) => {
                let (channel, key, vel) = encode_note(track, note)?;
                TrackEventKind::Midi {
                    channel,
                    message: MidiMessage::NoteOn { key, vel },
                }
            }
            EventKind::NoteOff(note) => {
                let (channel, key, vel) = encode_note(track, note)?;
                TrackEventKind::Midi {
                    channel,
                    message: MidiMessage::NoteOff { key, vel },
                }
            }
            EventKind::Other(kind) => *kind,
        };
        carried = 0;
        out.push(TrackEvent {
            delta: encode_delta(track, delta)?,
            kind,
        });
    }

    out.push(TrackEvent {
        delta: encode_delta(track, carried)?,
        kind: TrackEventKind::Meta(MetaMessage::EndOfTrack),
    });
    Ok(out)
}

fn encode_delta(track: &Track<'_>, delta: u64) -> Result<u28, SmfError> {
    u32::try_from(delta)
        .ok()
        .and_then(u28::try_from)
        .ok_or_else(|| SmfError::DeltaOverflow {
            track: track.display_name().into_owned(),
            delta,
        })
}

fn encode_note(track: &Track<'_>, note: &Note) -> Result<(u4, u7, u7), SmfError> {
    let out_of_range = |field: &'static str, value: u8| SmfError::OutOfRange {
        track: track.display_name().into_owned(),
        field,
        value,
    };
    let channel = u4::try_from(note.channel).ok_or_else(|| out_of_range("channel", note.channel))?;
    let key = u7::try_from(note.key).ok_or_else(|| out_of_range("note", note.key))?;
    let vel = u7::try_from(note.velocity).ok_or_else(|| out_of_range("velocity", note.velocity))?;
    Ok((channel, key, vel))
}
