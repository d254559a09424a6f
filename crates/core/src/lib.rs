//! Core library for Riftchart.
//!
//! Turns `RIFT_EVENT_CAPTURE` recordings into chart documents. Each stage
//! only feeds the next one: bytes are decoded into a [`Capture`], its events
//! are grouped into short and sustained [`Note`]s with combo numbers, bonus
//! windows flag the notes they cover and a [`Chart`] collects the result for
//! the renderers.

pub mod binary;
pub mod bonus;
pub mod capture;
pub mod chart;
pub mod config;
pub mod error;
pub mod notes;
pub mod pipeline;
pub mod vibe;

pub use binary::{BinaryReader, BinaryWriter};
pub use bonus::{BonusEntry, BonusTable};
pub use capture::{Capture, Difficulty, EnemyType, Event, EventStats, EventType};
pub use chart::{BpmChange, Chart};
pub use config::PipelineConfig;
pub use error::{Result, RiftChartError};
pub use notes::{derive_notes, DerivedNotes, Note, PairingIssue};
pub use pipeline::{BatchReport, Pipeline};
pub use vibe::{VibeAnnotator, VibeData};
