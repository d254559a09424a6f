//! Decoder for `RIFT_EVENT_CAPTURE` recordings.
//!
//! The layout is fixed and read front to back:
//! header, version, song name, level id, difficulty, pins, base BPM,
//! divisions, beat timings and finally the event records. Any short read
//! rejects the whole buffer.

mod event;

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::{
    binary::{BinaryReader, BinaryWriter},
    Result, RiftChartError,
};

pub use event::{round_beat, Difficulty, EnemyType, Event, EventType};

/// Tag every capture starts with.
pub const CAPTURE_HEADER: &str = "RIFT_EVENT_CAPTURE";

/// Decoded contents of one capture file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Capture {
    pub version: i32,
    pub name: String,
    pub level_id: String,
    pub difficulty: Difficulty,
    /// Modifiers active during the recording.
    pub pins: Vec<String>,
    pub base_bpm: i32,
    pub divisions: i32,
    /// Absolute timestamp in seconds of every indexed beat.
    pub beat_timings: Vec<f64>,
    /// Events in capture order.
    pub events: Vec<Event>,
}

impl Capture {
    /// Reads the file fully into memory and decodes it.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let bytes = std::fs::read(path.as_ref())?;
        Self::decode(&bytes)
    }

    /// Decodes a capture from an in-memory buffer.
    pub fn decode(bytes: &[u8]) -> Result<Self> {
        let mut reader = BinaryReader::new(bytes);

        let header = reader.read_string()?;
        if header != CAPTURE_HEADER {
            return Err(RiftChartError::UnexpectedHeader { found: header });
        }

        let version = reader.read_i32()?;
        let name = reader.read_string()?;
        let level_id = reader.read_string()?;
        let difficulty = Difficulty::try_from(reader.read_i32()?)?;

        let pin_count = reader.read_count("pin")?;
        let pins = (0..pin_count)
            .map(|_| reader.read_string())
            .collect::<Result<Vec<_>>>()?;

        let base_bpm = reader.read_i32()?;
        let divisions = reader.read_i32()?;
        let beat_count = reader.read_count("beat")?;
        let beat_timings = (0..beat_count)
            .map(|_| reader.read_f64())
            .collect::<Result<Vec<_>>>()?;

        let event_count = reader.read_count("event")?;
        let events = (0..event_count)
            .map(|_| read_event(&mut reader))
            .collect::<Result<Vec<_>>>()?;

        if !reader.is_empty() {
            tracing::debug!(
                trailing = reader.remaining(),
                "capture has trailing bytes after the event table"
            );
        }

        Ok(Self {
            version,
            name,
            level_id,
            difficulty,
            pins,
            base_bpm,
            divisions,
            beat_timings,
            events,
        })
    }

    /// Encodes the capture in the same layout [`Capture::decode`] reads.
    pub fn encode(&self) -> Result<Vec<u8>> {
        let mut writer = BinaryWriter::new();
        writer.write_string(CAPTURE_HEADER)?;
        writer.write_i32(self.version);
        writer.write_string(&self.name)?;
        writer.write_string(&self.level_id)?;
        writer.write_i32(self.difficulty.ordinal() as i32);

        writer.write_count(self.pins.len())?;
        for pin in &self.pins {
            writer.write_string(pin)?;
        }

        writer.write_i32(self.base_bpm);
        writer.write_i32(self.divisions);
        writer.write_count(self.beat_timings.len())?;
        for timing in &self.beat_timings {
            writer.write_f64(*timing);
        }

        writer.write_count(self.events.len())?;
        for event in &self.events {
            write_event(&mut writer, event);
        }

        Ok(writer.into_bytes())
    }

    /// File name of the JSON dump, e.g. `Disco Disaster_Hard.json`.
    pub fn dump_file_name(&self) -> String {
        format!("{}.json", crate::chart::chart_id(&self.name, self.difficulty))
    }

    /// Writes the decoded capture, events included, as pretty JSON.
    pub fn save_json(&self, path: impl AsRef<Path>) -> Result<()> {
        let text = serde_json::to_string_pretty(self)?;
        std::fs::write(path.as_ref(), text)?;
        Ok(())
    }

    pub fn load_json(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path.as_ref())?;
        Ok(serde_json::from_str(&text)?)
    }

    /// Counts events per [`EventType`].
    pub fn event_stats(&self) -> EventStats {
        let mut stats = EventStats::default();
        for event in &self.events {
            stats.counts[event.event_type.ordinal()] += 1;
        }
        stats
    }
}

fn read_event(reader: &mut BinaryReader<'_>) -> Result<Event> {
    Ok(Event {
        event_type: EventType::try_from(reader.read_i32()?)?,
        time: reader.read_f64()?,
        beat: reader.read_f64()?,
        target_time: reader.read_f64()?,
        target_beat: round_beat(reader.read_f64()?),
        enemy_type: EnemyType::try_from(reader.read_i32()?)?,
        column: reader.read_i32()?,
        total_score: reader.read_i32()?,
        base_score: reader.read_i32()?,
        base_score_multiplier: reader.read_i32()?,
        vibe_score_multiplier: reader.read_i32()?,
        bonus_score: reader.read_i32()?,
        is_vibe: reader.read_bool()?,
    })
}

fn write_event(writer: &mut BinaryWriter, event: &Event) {
    writer.write_i32(event.event_type.ordinal() as i32);
    writer.write_f64(event.time);
    writer.write_f64(event.beat);
    writer.write_f64(event.target_time);
    writer.write_f64(event.target_beat);
    writer.write_i32(event.enemy_type.ordinal() as i32);
    writer.write_i32(event.column);
    writer.write_i32(event.total_score);
    writer.write_i32(event.base_score);
    writer.write_i32(event.base_score_multiplier);
    writer.write_i32(event.vibe_score_multiplier);
    writer.write_i32(event.bonus_score);
    writer.write_bool(event.is_vibe);
}

/// Histogram of event types in a capture.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EventStats {
    counts: [usize; EventType::ALL.len()],
}

impl EventStats {
    pub fn count(&self, event_type: EventType) -> usize {
        self.counts[event_type.ordinal()]
    }

    pub fn total(&self) -> usize {
        self.counts.iter().sum()
    }

    /// Iterates over every event type, including those with a zero count.
    pub fn iter(&self) -> impl Iterator<Item = (EventType, usize)> + '_ {
        EventType::ALL
            .iter()
            .map(|event_type| (*event_type, self.count(*event_type)))
    }
}
