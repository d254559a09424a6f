//! Groups raw capture events into renderable notes.
//!
//! Hits on regular enemies become short notes, collapsing simultaneous hits
//! in the same lane into one entry with an `overlap` count. Hits on a wyrm
//! open a sustained note that the next hold-complete event in the same lane
//! closes. Combo numbers are assigned per beat: every note sharing a beat
//! receives the running total after the whole beat has been added.

use std::{
    cmp::Ordering,
    collections::{HashMap, VecDeque},
};

use serde::{Deserialize, Serialize};

use crate::capture::{EnemyType, Event, EventType};

/// A derived, renderable unit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Note {
    pub beat_start: f64,
    /// Equal to `beat_start` for short notes. `None` for a sustained note
    /// whose hold-complete event was never found.
    pub beat_finish: Option<f64>,
    pub enemy_type: EnemyType,
    pub column: i32,
    /// Number of simultaneous short notes collapsed into this entry.
    #[serde(default = "default_overlap")]
    pub overlap: usize,
    #[serde(default)]
    pub combo: usize,
    #[serde(default)]
    pub is_vibe: bool,
}

fn default_overlap() -> usize {
    1
}

impl Note {
    fn short(event: &Event) -> Self {
        Self {
            beat_start: event.target_beat,
            beat_finish: Some(event.target_beat),
            enemy_type: event.enemy_type,
            column: event.column,
            overlap: 1,
            combo: 0,
            is_vibe: false,
        }
    }

    fn open_wyrm(event: &Event) -> Self {
        Self {
            beat_finish: None,
            ..Self::short(event)
        }
    }

    /// Whether the note spans a beat range.
    pub fn is_sustained(&self) -> bool {
        self.enemy_type.is_wyrm()
    }

    /// Last beat the note occupies, falling back to its start when unfinished.
    pub fn end_beat(&self) -> f64 {
        self.beat_finish.unwrap_or(self.beat_start)
    }
}

/// How an event takes part in note derivation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum EventRole {
    ShortNote,
    WyrmStart,
    WyrmFinish,
    Ignored,
}

fn event_role(event: &Event) -> EventRole {
    match (event.event_type, event.enemy_type.is_wyrm()) {
        (EventType::Hit, false) => EventRole::ShortNote,
        (EventType::Hit, true) => EventRole::WyrmStart,
        (EventType::HoldComplete, true) => EventRole::WyrmFinish,
        (EventType::HoldComplete, false)
        | (
            EventType::Miss
            | EventType::Overpress
            | EventType::HoldSegment
            | EventType::VibeGained
            | EventType::VibeActivated
            | EventType::VibeEnded,
            _,
        ) => EventRole::Ignored,
    }
}

fn by_beat_then_column(a: &&Event, b: &&Event) -> Ordering {
    a.target_beat
        .partial_cmp(&b.target_beat)
        .unwrap_or(Ordering::Equal)
        .then(a.column.cmp(&b.column))
}

/// Sustained-note pairing problem. Reported, never fatal.
#[derive(Debug, Clone, PartialEq)]
pub enum PairingIssue {
    /// A hold-complete event found no open wyrm in its lane.
    UnmatchedFinish { beat: f64, column: i32 },
    /// A wyrm was never closed by a hold-complete event.
    UnterminatedStart { beat: f64, column: i32 },
}

/// Output of [`derive_notes`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DerivedNotes {
    /// Short notes ordered by (beat, column).
    pub short_notes: Vec<Note>,
    /// Sustained notes ordered by (start beat, column).
    pub wyrm_notes: Vec<Note>,
    /// Final value of the combo counter.
    pub max_combo: usize,
    pub issues: Vec<PairingIssue>,
}

impl DerivedNotes {
    /// Number of short-note entries that collapse more than one hit.
    pub fn overlapping_count(&self) -> usize {
        self.short_notes.iter().filter(|note| note.overlap > 1).count()
    }
}

/// Derives short and sustained notes from capture events and numbers them.
pub fn derive_notes(events: &[Event]) -> DerivedNotes {
    let mut short_events = Vec::new();
    let mut start_events = Vec::new();
    let mut finish_events = Vec::new();
    for event in events {
        match event_role(event) {
            EventRole::ShortNote => short_events.push(event),
            EventRole::WyrmStart => start_events.push(event),
            EventRole::WyrmFinish => finish_events.push(event),
            EventRole::Ignored => {}
        }
    }
    short_events.sort_by(by_beat_then_column);
    start_events.sort_by(by_beat_then_column);
    finish_events.sort_by(by_beat_then_column);

    let mut short_notes = build_short_notes(&short_events);
    let (mut wyrm_notes, issues) = build_wyrm_notes(&start_events, &finish_events);
    let max_combo = assign_combo(&mut short_notes, &mut wyrm_notes);

    tracing::debug!(
        short = short_notes.len(),
        wyrm = wyrm_notes.len(),
        max_combo,
        "derived notes"
    );

    DerivedNotes {
        short_notes,
        wyrm_notes,
        max_combo,
        issues,
    }
}

fn build_short_notes(events: &[&Event]) -> Vec<Note> {
    let mut notes: Vec<Note> = Vec::with_capacity(events.len());
    for event in events {
        match notes.last_mut() {
            Some(prev) if prev.beat_start == event.target_beat && prev.column == event.column => {
                prev.overlap += 1;
            }
            _ => notes.push(Note::short(event)),
        }
    }
    notes
}

/// Closes each wyrm with the first still-open wyrm of the same lane, in
/// construction order. Open wyrms are queued per lane so that matching stays
/// linear.
fn build_wyrm_notes(starts: &[&Event], finishes: &[&Event]) -> (Vec<Note>, Vec<PairingIssue>) {
    let mut notes: Vec<Note> = starts.iter().map(|event| Note::open_wyrm(event)).collect();
    let mut open: HashMap<i32, VecDeque<usize>> = HashMap::new();
    for (index, note) in notes.iter().enumerate() {
        open.entry(note.column).or_default().push_back(index);
    }

    let mut issues = Vec::new();
    for event in finishes {
        match open.get_mut(&event.column).and_then(VecDeque::pop_front) {
            Some(index) => notes[index].beat_finish = Some(event.target_beat),
            None => {
                tracing::warn!(
                    beat = event.target_beat,
                    column = event.column,
                    "hold complete without an open wyrm"
                );
                issues.push(PairingIssue::UnmatchedFinish {
                    beat: event.target_beat,
                    column: event.column,
                });
            }
        }
    }

    for note in notes.iter().filter(|note| note.beat_finish.is_none()) {
        tracing::warn!(
            beat = note.beat_start,
            column = note.column,
            "wyrm never completed"
        );
        issues.push(PairingIssue::UnterminatedStart {
            beat: note.beat_start,
            column: note.column,
        });
    }

    (notes, issues)
}

/// Walks both beat-sorted lists together, one beat at a time. Returns the
/// final combo.
fn assign_combo(short_notes: &mut [Note], wyrm_notes: &mut [Note]) -> usize {
    let (mut s, mut w) = (0, 0);
    let mut combo = 0;

    loop {
        let beat = match (short_notes.get(s), wyrm_notes.get(w)) {
            (Some(a), Some(b)) => a.beat_start.min(b.beat_start),
            (Some(a), None) => a.beat_start,
            (None, Some(b)) => b.beat_start,
            (None, None) => break,
        };

        let s_end = s + count_at_beat(&short_notes[s..], beat);
        let w_end = w + count_at_beat(&wyrm_notes[w..], beat);
        combo += (s_end - s) + (w_end - w);

        for note in short_notes[s..s_end]
            .iter_mut()
            .chain(wyrm_notes[w..w_end].iter_mut())
        {
            note.combo = combo;
        }

        s = s_end;
        w = w_end;
    }

    combo
}

fn count_at_beat(notes: &[Note], beat: f64) -> usize {
    notes
        .iter()
        .take_while(|note| note.beat_start == beat)
        .count()
}
