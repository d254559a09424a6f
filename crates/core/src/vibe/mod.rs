use std::{cmp::Ordering, ops::RangeInclusive};

use serde::{Deserialize, Serialize};

use crate::notes::Note;

/// Beats subtracted from a window start before searching for its first note.
pub const VIBE_BEAT_TOLERANCE: f64 = 0.1;

/// A bonus window: activate at `beat` and keep it for `enemies` notes.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct VibeData {
    pub beat: f64,
    pub enemies: usize,
}

impl VibeData {
    pub fn new(beat: f64, enemies: usize) -> Self {
        Self { beat, enemies }
    }
}

/// Index of the first beat that is `>= beat` in an ascending slice.
pub fn first_at_or_after(beats: &[f64], beat: f64) -> Option<usize> {
    let index = beats.partition_point(|candidate| *candidate < beat);
    (index < beats.len()).then_some(index)
}

/// Inclusive index range of the notes a window covers.
///
/// The window starts at the first note within `tolerance` of its beat and
/// spans `enemies` notes. When the last covered note shares its beat with the
/// following ones, the range grows to include all of them.
pub fn window_range(
    beats: &[f64],
    window: &VibeData,
    tolerance: f64,
) -> Option<RangeInclusive<usize>> {
    if window.enemies == 0 {
        return None;
    }
    let from = first_at_or_after(beats, window.beat - tolerance)?;
    let mut to = (from + window.enemies).min(beats.len()) - 1;
    while to + 1 < beats.len() && beats[to + 1] == beats[to] {
        to += 1;
    }
    Some(from..=to)
}

/// Marks notes covered by bonus windows. Flags are only ever set, so
/// overlapping windows and repeated runs agree.
#[derive(Debug, Clone, Copy)]
pub struct VibeAnnotator {
    tolerance: f64,
}

impl Default for VibeAnnotator {
    fn default() -> Self {
        Self::new(VIBE_BEAT_TOLERANCE)
    }
}

impl VibeAnnotator {
    pub fn new(tolerance: f64) -> Self {
        Self { tolerance }
    }

    /// Applies every window to the merged, beat-ordered view of both note
    /// lists. Returns how many notes are flagged afterwards.
    pub fn annotate(
        &self,
        short_notes: &mut [Note],
        wyrm_notes: &mut [Note],
        windows: &[VibeData],
    ) -> usize {
        let mut order: Vec<(f64, Slot)> = short_notes
            .iter()
            .enumerate()
            .map(|(index, note)| (note.beat_start, Slot::Short(index)))
            .chain(
                wyrm_notes
                    .iter()
                    .enumerate()
                    .map(|(index, note)| (note.beat_start, Slot::Wyrm(index))),
            )
            .collect();
        order.sort_by(|a, b| a.0.partial_cmp(&b.0).unwrap_or(Ordering::Equal));
        let beats: Vec<f64> = order.iter().map(|(beat, _)| *beat).collect();

        for window in windows {
            let Some(range) = window_range(&beats, window, self.tolerance) else {
                tracing::debug!(
                    beat = window.beat,
                    enemies = window.enemies,
                    "vibe window covers no notes"
                );
                continue;
            };
            for (_, slot) in &order[range] {
                match *slot {
                    Slot::Short(index) => short_notes[index].is_vibe = true,
                    Slot::Wyrm(index) => wyrm_notes[index].is_vibe = true,
                }
            }
        }

        short_notes
            .iter()
            .chain(wyrm_notes.iter())
            .filter(|note| note.is_vibe)
            .count()
    }
}

#[derive(Debug, Clone, Copy)]
enum Slot {
    Short(usize),
    Wyrm(usize),
}
