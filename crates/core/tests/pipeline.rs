use std::path::PathBuf;

use pretty_assertions::assert_eq;
use riftchart_core::{
    BinaryWriter, BpmChange, Capture, Chart, Difficulty, EnemyType, Event, EventType, Pipeline,
    PipelineConfig, VibeData,
};

struct Workspace {
    root: PathBuf,
}

impl Workspace {
    fn new(name: &str) -> Self {
        let root = std::env::temp_dir().join(format!("riftchart-{name}-{}", std::process::id()));
        let _ = std::fs::remove_dir_all(&root);
        std::fs::create_dir_all(root.join("raw")).unwrap();
        Self { root }
    }

    fn config(&self) -> PipelineConfig {
        PipelineConfig {
            raw_dir: self.root.join("raw"),
            json_dir: self.root.join("json"),
            ..Default::default()
        }
    }

    fn write_raw(&self, file: &str, bytes: &[u8]) {
        std::fs::write(self.root.join("raw").join(file), bytes).unwrap();
    }
}

impl Drop for Workspace {
    fn drop(&mut self) {
        let _ = std::fs::remove_dir_all(&self.root);
    }
}

fn capture(name: &str, difficulty: Difficulty) -> Capture {
    Capture {
        version: 1,
        name: name.to_string(),
        level_id: format!("RhythmRift_{}", name.replace(' ', "")),
        difficulty,
        pins: Vec::new(),
        base_bpm: 120,
        divisions: 2,
        beat_timings: (0..8).map(|beat| beat as f64 * 0.5).collect(),
        events: vec![
            Event::new(EventType::Hit, EnemyType::GreenSlime, 1.0004, 0),
            Event::new(EventType::Hit, EnemyType::GreenSlime, 0.9996, 0),
            Event::new(EventType::Miss, EnemyType::BlueBat, 1.5, 2),
            Event::new(EventType::Hit, EnemyType::Wyrm, 2.0, 1),
            Event::new(EventType::HoldSegment, EnemyType::Wyrm, 3.0, 1),
            Event::new(EventType::HoldComplete, EnemyType::Wyrm, 4.0, 1),
            Event::new(EventType::Hit, EnemyType::RedBat, 2.0, 2),
        ],
    }
}

#[test]
fn batch_converts_captures_and_skips_foreign_files() {
    let workspace = Workspace::new("batch");
    let capture = capture("Disco Disaster", Difficulty::Hard);
    workspace.write_raw("disco.bin", &capture.encode().unwrap());

    let mut foreign = BinaryWriter::new();
    foreign.write_string("NOT_A_CAPTURE").unwrap();
    workspace.write_raw("foreign.bin", &foreign.into_bytes());

    let truncated = capture.encode().unwrap();
    workspace.write_raw("truncated.bin", &truncated[..truncated.len() - 3]);
    workspace.write_raw("notes.txt", b"ignored");

    let report = Pipeline::new(workspace.config()).run_batch().unwrap();
    assert_eq!(report.converted.len(), 1);
    assert_eq!(report.skipped.len(), 1);
    assert_eq!(report.failed.len(), 1);
    assert_eq!(report.total(), 3);

    let chart = Chart::load(workspace.root.join("json").join("Disco Disaster_Hard.json")).unwrap();
    assert_eq!(chart.id, "Disco Disaster_Hard");
    assert_eq!(chart.difficulty, Difficulty::Hard);
    assert_eq!(chart.max_combo, 3);

    let short: Vec<_> = chart
        .short_notes
        .iter()
        .map(|note| (note.beat_start, note.column, note.overlap, note.combo))
        .collect();
    assert_eq!(short, vec![(1.0, 0, 2, 1), (2.0, 2, 1, 3)]);

    assert_eq!(chart.wyrm_notes.len(), 1);
    assert_eq!(chart.wyrm_notes[0].beat_finish, Some(4.0));
    assert_eq!(chart.wyrm_notes[0].combo, 3);
}

#[test]
fn regenerating_keeps_curated_fields() {
    let workspace = Workspace::new("curated");
    let capture = capture("Om and On", Difficulty::Easy);
    workspace.write_raw("om.bin", &capture.encode().unwrap());
    let pipeline = Pipeline::new(workspace.config());

    let first = pipeline.run_batch().unwrap();
    assert_eq!(first.converted.len(), 1);

    let path = workspace.root.join("json").join("Om and On_Easy.json");
    let mut curated = Chart::load(&path).unwrap();
    curated.short_name = "Om".to_string();
    curated.intensity = 12;
    curated.optimal_vibes = vec![VibeData::new(2.0, 1)];
    curated.save(&path).unwrap();

    let chart = pipeline.convert_file(workspace.root.join("raw").join("om.bin")).unwrap();
    assert_eq!(chart.short_name, "Om");
    assert_eq!(chart.intensity, 12);
    // the window starts at beat 2, where a short note and a wyrm coincide
    assert!(chart.short_notes[1].is_vibe);
    assert!(chart.wyrm_notes[0].is_vibe);
    assert!(!chart.short_notes[0].is_vibe);

    let reloaded = Chart::load(&path).unwrap();
    assert_eq!(reloaded, chart);
}

#[test]
fn detected_tempo_changes_follow_the_capture() {
    let workspace = Workspace::new("tempo");
    let raw = workspace.root.join("raw").join("om.bin");
    let path = workspace.root.join("json").join("Om and On_Easy.json");
    let pipeline = Pipeline::new(workspace.config());

    let mut capture = capture("Om and On", Difficulty::Easy);
    workspace.write_raw("om.bin", &capture.encode().unwrap());
    let first = pipeline.convert_file(&raw).unwrap();
    assert_eq!(first.bpm_changes, vec![BpmChange::new(0.0, 120)]);
    assert!(first.bpm_changes_detected);

    // the song speeds up to 150 BPM from beat 4
    capture.beat_timings = vec![0.0, 0.5, 1.0, 1.5, 2.0, 2.4, 2.8, 3.2];
    workspace.write_raw("om.bin", &capture.encode().unwrap());
    let second = pipeline.convert_file(&raw).unwrap();
    assert_eq!(
        second.bpm_changes,
        vec![BpmChange::new(0.0, 120), BpmChange::new(4.0, 150)]
    );

    let mut curated = Chart::load(&path).unwrap();
    curated.bpm_changes = vec![BpmChange::new(0.0, 118)];
    curated.bpm_changes_detected = false;
    curated.save(&path).unwrap();

    let third = pipeline.convert_file(&raw).unwrap();
    assert_eq!(third.bpm_changes, vec![BpmChange::new(0.0, 118)]);
    assert!(!third.bpm_changes_detected);
}

#[test]
fn bonus_table_supplies_windows_and_score() {
    let workspace = Workspace::new("bonus");
    let table = workspace.root.join("vibe_path.csv");
    std::fs::write(&table, "Disco Disaster,,300,1,b2,0,1\n").unwrap();

    let config = PipelineConfig {
        bonus_table: Some(table),
        ..workspace.config()
    };
    let chart = Pipeline::new(config).build_chart(&capture("Disco Disaster", Difficulty::Easy));

    assert_eq!(chart.max_score, 300);
    assert_eq!(chart.optimal_vibes, vec![VibeData::new(1.0, 1)]);
    assert!(chart.short_notes[0].is_vibe);
    assert!(!chart.short_notes[1].is_vibe);
    assert!(!chart.wyrm_notes[0].is_vibe);
}

#[test]
fn missing_raw_directory_fails_the_batch() {
    let config = PipelineConfig {
        raw_dir: PathBuf::from("/nonexistent/riftchart/raw"),
        ..Default::default()
    };
    assert!(Pipeline::new(config).run_batch().is_err());
}
