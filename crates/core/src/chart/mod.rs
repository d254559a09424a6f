//! The persisted chart document consumed by the renderers.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::{
    bonus::BonusEntry,
    capture::{Capture, Difficulty},
    notes::{DerivedNotes, Note},
    vibe::VibeData,
    Result,
};

/// Tempo in effect from `beat` onwards.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BpmChange {
    pub beat: f64,
    pub bpm: i32,
}

impl BpmChange {
    pub fn new(beat: f64, bpm: i32) -> Self {
        Self { beat, bpm }
    }
}

/// Renderable chart. `short_name`, `intensity`, `max_score`, `bpm_changes`
/// and `optimal_vibes` are curated by hand or come from the bonus table;
/// the rest is rebuilt from every capture.
///
/// `bpm_changes_detected` marks a tempo list derived from the beat timings.
/// Such a list is rebuilt on regeneration; clear the flag after editing it by
/// hand to keep the edit.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Chart {
    pub id: String,
    pub name: String,
    pub short_name: String,
    pub difficulty: Difficulty,
    pub intensity: u32,
    pub max_combo: usize,
    pub max_score: u64,
    pub divisions: i32,
    pub base_bpm: i32,
    pub bpm_changes: Vec<BpmChange>,
    pub bpm_changes_detected: bool,
    pub optimal_vibes: Vec<VibeData>,
    pub short_notes: Vec<Note>,
    pub wyrm_notes: Vec<Note>,
}

impl Chart {
    /// Builds a chart from a decoded capture and the notes derived from it.
    pub fn assemble(capture: &Capture, notes: DerivedNotes) -> Self {
        Self {
            id: chart_id(&capture.name, capture.difficulty),
            name: capture.name.clone(),
            difficulty: capture.difficulty,
            max_combo: notes.max_combo,
            divisions: capture.divisions,
            base_bpm: capture.base_bpm,
            short_notes: notes.short_notes,
            wyrm_notes: notes.wyrm_notes,
            ..Default::default()
        }
    }

    /// Copies the hand-curated fields of a previously written chart.
    pub fn carry_curated(&mut self, previous: &Chart) {
        self.short_name.clone_from(&previous.short_name);
        self.intensity = previous.intensity;
        self.max_score = previous.max_score;
        if !previous.bpm_changes_detected {
            self.bpm_changes.clone_from(&previous.bpm_changes);
        }
        self.optimal_vibes.clone_from(&previous.optimal_vibes);
    }

    /// Replaces the score and bonus windows with spreadsheet data.
    pub fn apply_bonus(&mut self, entry: BonusEntry) {
        self.max_score = entry.max_score;
        self.optimal_vibes = entry.windows;
    }

    /// File name the chart is stored under.
    pub fn file_name(&self) -> String {
        format!("{}.json", self.id)
    }

    pub fn note_count(&self) -> usize {
        self.short_notes.len() + self.wyrm_notes.len()
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path.as_ref())?;
        Ok(serde_json::from_str(&text)?)
    }

    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let text = serde_json::to_string_pretty(self)?;
        std::fs::write(path.as_ref(), text)?;
        Ok(())
    }
}

/// Identifier of a chart, e.g. `Disco Disaster_Hard`.
pub fn chart_id(name: &str, difficulty: Difficulty) -> String {
    format!("{name}_{difficulty}")
}

/// Derives tempo changes from the absolute timestamp of every beat.
///
/// The first entry is always the base tempo at beat 0. A change is recorded at
/// beat `i` when the rounded tempo between beats `i` and `i + 1` differs from
/// the current one by more than `tolerance`.
pub fn detect_bpm_changes(beat_timings: &[f64], base_bpm: i32, tolerance: f64) -> Vec<BpmChange> {
    let mut changes = vec![BpmChange::new(0.0, base_bpm)];
    let mut current = base_bpm;

    for (beat, pair) in beat_timings.windows(2).enumerate() {
        let interval = pair[1] - pair[0];
        if interval <= 0.0 {
            continue;
        }
        let bpm = (60.0 / interval).round() as i32;
        if f64::from((bpm - current).abs()) > tolerance {
            changes.push(BpmChange::new(beat as f64, bpm));
            current = bpm;
        }
    }

    changes
}
