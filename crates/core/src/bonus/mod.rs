//! Lookup of curated bonus windows from a spreadsheet CSV export.
//!
//! The export has no header row. Each row starts with the song title, rows of
//! the same title appear in difficulty order, column 2 holds the maximum
//! score and from column 3 on every group of four cells describes one window:
//! bar, beat text (such as `b17.5`), combo and enemy count.

use std::{collections::HashMap, io, path::Path};

use crate::{capture::Difficulty, vibe::VibeData, Result, RiftChartError};

const MAX_SCORE_COLUMN: usize = 2;
const FIRST_WINDOW_COLUMN: usize = 3;
const WINDOW_WIDTH: usize = 4;

/// Curated data for one chart.
#[derive(Debug, Clone, PartialEq)]
pub struct BonusEntry {
    pub max_score: u64,
    pub windows: Vec<VibeData>,
}

/// Rows of the export grouped by song title.
#[derive(Debug, Default, Clone)]
pub struct BonusTable {
    rows: HashMap<String, Vec<Vec<String>>>,
}

impl BonusTable {
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let file = std::fs::File::open(path.as_ref())?;
        Self::from_reader(file)
    }

    pub fn from_reader<R: io::Read>(reader: R) -> Result<Self> {
        let mut csv = csv::ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .from_reader(reader);

        let mut rows: HashMap<String, Vec<Vec<String>>> = HashMap::new();
        for record in csv.records() {
            let record = record?;
            let Some(title) = record.get(0) else {
                continue;
            };
            rows.entry(title.to_string())
                .or_default()
                .push(record.iter().map(str::to_string).collect());
        }
        Ok(Self { rows })
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Finds the entry for `title` at `difficulty`. `title` is the row title
    /// as written in the spreadsheet, after any alias mapping.
    pub fn lookup(&self, title: &str, difficulty: Difficulty) -> Result<BonusEntry> {
        let row = self
            .rows
            .get(title)
            .ok_or_else(|| RiftChartError::msg(format!("no bonus rows for `{title}`")))?
            .get(difficulty.ordinal())
            .ok_or_else(|| {
                RiftChartError::msg(format!("no {difficulty} bonus row for `{title}`"))
            })?;
        parse_row(row)
    }
}

fn parse_row(row: &[String]) -> Result<BonusEntry> {
    let max_score = row
        .get(MAX_SCORE_COLUMN)
        .map(|cell| cell.trim())
        .ok_or_else(|| RiftChartError::msg("bonus row has no max score"))?;
    let max_score = max_score
        .parse::<u64>()
        .map_err(|_| RiftChartError::msg(format!("invalid max score `{max_score}`")))?;

    let mut windows = Vec::new();
    for group in row
        .get(FIRST_WINDOW_COLUMN..)
        .unwrap_or_default()
        .chunks_exact(WINDOW_WIDTH)
    {
        if group[0].trim().is_empty() {
            continue;
        }
        windows.push(VibeData::new(parse_beat(&group[1])?, parse_enemies(&group[3])?));
    }

    Ok(BonusEntry { max_score, windows })
}

/// Parses beat text such as `b17.5`. The spreadsheet counts beats from 1.
fn parse_beat(text: &str) -> Result<f64> {
    let mut chars = text.trim().chars();
    chars.next();
    let beat: f64 = chars
        .as_str()
        .parse()
        .map_err(|_| RiftChartError::msg(format!("invalid bonus beat `{text}`")))?;
    Ok(beat - 1.0)
}

fn parse_enemies(text: &str) -> Result<usize> {
    text.trim()
        .parse()
        .map_err(|_| RiftChartError::msg(format!("invalid bonus enemy count `{text}`")))
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    const EXPORT: &str = "\
Disco Disaster,,120000,1,b5,10,4,3,b17.5,30,6
Disco Disaster,,250000,,,,,2,b9,12,8,,,,
Disco Disaster,,410000,1,b1,0
Glass Cages,,99000
";

    fn table() -> BonusTable {
        BonusTable::from_reader(EXPORT.as_bytes()).unwrap()
    }

    #[test]
    fn groups_rows_by_title() {
        assert_eq!(table().len(), 2);
    }

    #[test]
    fn parses_windows_in_groups_of_four() {
        let entry = table().lookup("Disco Disaster", Difficulty::Easy).unwrap();
        assert_eq!(entry.max_score, 120000);
        assert_eq!(
            entry.windows,
            vec![VibeData::new(4.0, 4), VibeData::new(16.5, 6)]
        );
    }

    #[test]
    fn skips_empty_groups() {
        let entry = table().lookup("Disco Disaster", Difficulty::Medium).unwrap();
        assert_eq!(entry.max_score, 250000);
        assert_eq!(entry.windows, vec![VibeData::new(8.0, 8)]);
    }

    #[test]
    fn ignores_incomplete_trailing_group() {
        let entry = table().lookup("Disco Disaster", Difficulty::Hard).unwrap();
        assert!(entry.windows.is_empty());
    }

    #[test]
    fn row_without_windows_still_yields_a_score() {
        let entry = table().lookup("Glass Cages", Difficulty::Easy).unwrap();
        assert_eq!(entry.max_score, 99000);
        assert!(entry.windows.is_empty());
    }

    #[test]
    fn missing_title_or_difficulty_is_an_error() {
        let table = table();
        let err = table.lookup("Om And On", Difficulty::Easy).unwrap_err();
        assert!(format!("{err}").contains("Om And On"));
        assert!(table
            .lookup("Disco Disaster", Difficulty::Impossible)
            .is_err());
    }

    #[test]
    fn bad_numbers_are_errors() {
        let table = BonusTable::from_reader("Song,,many\nSong,,10,1,bx,0,2\n".as_bytes()).unwrap();
        assert!(table.lookup("Song", Difficulty::Easy).is_err());
        assert!(table.lookup("Song", Difficulty::Medium).is_err());
    }
}
