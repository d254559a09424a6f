use std::path::{Path, PathBuf};

use crate::{
    bonus::BonusTable,
    capture::Capture,
    chart::{detect_bpm_changes, Chart},
    config::PipelineConfig,
    notes::derive_notes,
    vibe::VibeAnnotator,
    Result,
};

/// Extension of capture files picked up in batch mode.
pub const CAPTURE_EXTENSION: &str = "bin";

/// Outcome of a batch conversion.
#[derive(Debug, Default, Clone)]
pub struct BatchReport {
    pub converted: Vec<PathBuf>,
    /// Inputs that are not captures.
    pub skipped: Vec<PathBuf>,
    pub failed: Vec<(PathBuf, String)>,
}

impl BatchReport {
    pub fn total(&self) -> usize {
        self.converted.len() + self.skipped.len() + self.failed.len()
    }
}

/// Capture to chart conversion: decode, derive notes, merge curated data,
/// annotate bonus windows and persist. Files are processed one at a time and
/// share nothing but the configuration and the bonus table.
#[derive(Debug)]
pub struct Pipeline {
    config: PipelineConfig,
    bonus: Option<BonusTable>,
    annotator: VibeAnnotator,
}

impl Pipeline {
    /// Creates a pipeline. An unreadable bonus table only disables the
    /// bonus lookup.
    pub fn new(config: PipelineConfig) -> Self {
        let bonus = config.bonus_table.as_deref().and_then(|path| {
            BonusTable::from_path(path)
                .map_err(|err| {
                    tracing::warn!(?path, %err, "bonus table unavailable");
                })
                .ok()
        });
        Self::with_bonus_table(config, bonus)
    }

    pub fn with_bonus_table(config: PipelineConfig, bonus: Option<BonusTable>) -> Self {
        let annotator = VibeAnnotator::new(config.vibe_tolerance);
        Self {
            config,
            bonus,
            annotator,
        }
    }

    /// Builds the chart for a decoded capture without writing it.
    pub fn build_chart(&self, capture: &Capture) -> Chart {
        let notes = derive_notes(&capture.events);
        if !notes.issues.is_empty() {
            tracing::warn!(
                name = %capture.name,
                difficulty = %capture.difficulty,
                issues = notes.issues.len(),
                "wyrm pairing incomplete"
            );
        }
        let mut chart = Chart::assemble(capture, notes);

        if self.config.preserve_curated {
            self.carry_curated(&mut chart);
        }

        if let Some(table) = &self.bonus {
            let title = self.config.row_title(&chart.name);
            match table.lookup(title, chart.difficulty) {
                Ok(entry) => chart.apply_bonus(entry),
                Err(err) => tracing::warn!(id = %chart.id, %err, "no bonus data"),
            }
        }

        if chart.bpm_changes.is_empty() {
            chart.bpm_changes = detect_bpm_changes(
                &capture.beat_timings,
                capture.base_bpm,
                self.config.bpm_tolerance,
            );
            chart.bpm_changes_detected = true;
        }

        if !chart.optimal_vibes.is_empty() {
            let marked = self.annotator.annotate(
                &mut chart.short_notes,
                &mut chart.wyrm_notes,
                &chart.optimal_vibes,
            );
            tracing::debug!(id = %chart.id, marked, "annotated vibe windows");
        }

        chart
    }

    fn carry_curated(&self, chart: &mut Chart) {
        let path = self.output_path(chart);
        if !path.exists() {
            return;
        }
        match Chart::load(&path) {
            Ok(previous) => chart.carry_curated(&previous),
            Err(err) => tracing::warn!(?path, %err, "ignoring unreadable chart document"),
        }
    }

    /// Where a chart is written.
    pub fn output_path(&self, chart: &Chart) -> PathBuf {
        self.config.json_dir.join(chart.file_name())
    }

    /// Converts one capture file and writes the chart document.
    pub fn convert_file(&self, path: impl AsRef<Path>) -> Result<Chart> {
        let path = path.as_ref();
        let capture = Capture::from_path(path)?;
        let chart = self.build_chart(&capture);

        std::fs::create_dir_all(&self.config.json_dir)?;
        let output = self.output_path(&chart);
        chart.save(&output)?;
        tracing::info!(
            input = ?path,
            output = ?output,
            notes = chart.note_count(),
            max_combo = chart.max_combo,
            "chart written"
        );
        Ok(chart)
    }

    /// Converts every capture in the raw directory. Failures are reported
    /// per file; only an unreadable raw directory aborts the run.
    pub fn run_batch(&self) -> Result<BatchReport> {
        let mut inputs = Vec::new();
        for entry in std::fs::read_dir(&self.config.raw_dir)? {
            let path = entry?.path();
            if path.is_file() && path.extension().is_some_and(|ext| ext == CAPTURE_EXTENSION) {
                inputs.push(path);
            }
        }
        inputs.sort();

        let mut report = BatchReport::default();
        for path in inputs {
            match self.convert_file(&path) {
                Ok(_) => report.converted.push(path),
                Err(err) if err.is_format_mismatch() => {
                    tracing::warn!(?path, %err, "skipping file");
                    report.skipped.push(path);
                }
                Err(err) => {
                    tracing::error!(?path, %err, "conversion failed");
                    report.failed.push((path, err.to_string()));
                }
            }
        }
        Ok(report)
    }
}
