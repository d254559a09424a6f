use std::{collections::HashMap, path::Path, path::PathBuf};

use serde::{Deserialize, Serialize};

use crate::{vibe::VIBE_BEAT_TOLERANCE, Result};

/// Settings for one conversion run. Built once and handed to the pipeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Directory scanned for `*.bin` captures in batch mode.
    pub raw_dir: PathBuf,
    /// Directory the chart JSON documents are written to.
    pub json_dir: PathBuf,
    /// Spreadsheet export holding curated bonus windows.
    pub bonus_table: Option<PathBuf>,
    pub vibe_tolerance: f64,
    /// Tempo difference, in BPM, below which beat timing jitter is ignored.
    pub bpm_tolerance: f64,
    /// Maps a song name to the title used in the bonus spreadsheet.
    pub title_aliases: HashMap<String, String>,
    /// Carry curated fields over from an existing chart document.
    pub preserve_curated: bool,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            raw_dir: PathBuf::from("./raw"),
            json_dir: PathBuf::from("./json"),
            bonus_table: None,
            vibe_tolerance: VIBE_BEAT_TOLERANCE,
            bpm_tolerance: 0.5,
            title_aliases: default_title_aliases(),
            preserve_curated: true,
        }
    }
}

impl PipelineConfig {
    /// Loads a JSON configuration file. Missing fields keep their defaults.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path.as_ref())?;
        Ok(serde_json::from_str(&text)?)
    }

    /// Title of the bonus spreadsheet rows for a song.
    pub fn row_title<'a>(&'a self, name: &'a str) -> &'a str {
        self.title_aliases
            .get(name)
            .map(String::as_str)
            .unwrap_or(name)
    }
}

fn default_title_aliases() -> HashMap<String, String> {
    [
        ("Brave the Harvester", "Brave The Harvester"),
        ("Glass Cages (feat. Sarah Hubbard)", "Glass Cages"),
        ("Om and On", "Om And On"),
        ("Under the Thunder", "Under The Thunder"),
        ("RAVEVENGE (feat. Aram Zero)", "RAVEVENGE"),
        ("What's in the Box", "What's In The Box?"),
    ]
    .into_iter()
    .map(|(name, title)| (name.to_string(), title.to_string()))
    .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn aliases_fall_back_to_the_song_name() {
        let config = PipelineConfig::default();
        assert_eq!(config.row_title("Om and On"), "Om And On");
        assert_eq!(config.row_title("Disco Disaster"), "Disco Disaster");
    }

    #[test]
    fn partial_json_keeps_defaults() {
        let config: PipelineConfig =
            serde_json::from_str(r#"{ "json_dir": "out", "vibe_tolerance": 0.25 }"#).unwrap();
        assert_eq!(config.json_dir, PathBuf::from("out"));
        assert_eq!(config.raw_dir, PathBuf::from("./raw"));
        assert_eq!(config.vibe_tolerance, 0.25);
        assert!(config.preserve_curated);
        assert!(!config.title_aliases.is_empty());
    }
}
