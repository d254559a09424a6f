use std::path::{Path, PathBuf};

use clap::{Args, Parser, Subcommand};
use riftchart_core::{derive_notes, Capture, Pipeline, PipelineConfig};
use tracing_subscriber::EnvFilter;

fn main() -> riftchart_core::Result<()> {
    init_tracing();

    let cli = Cli::parse();

    match cli.command {
        Commands::Convert(args) => run_convert(args),
        Commands::Stats { input } => run_stats(&input),
        Commands::Dump { input, output } => run_dump(&input, &output),
    }
}

fn run_convert(args: ConvertArgs) -> riftchart_core::Result<()> {
    let config = args.config()?;
    tracing::info!(raw_dir = ?config.raw_dir, json_dir = ?config.json_dir, "converting captures");
    let pipeline = Pipeline::new(config);

    if let Some(input) = args.input {
        pipeline.convert_file(&input)?;
        return Ok(());
    }

    let report = pipeline.run_batch()?;
    tracing::info!(
        converted = report.converted.len(),
        skipped = report.skipped.len(),
        failed = report.failed.len(),
        "batch finished"
    );
    Ok(())
}

fn run_stats(input: &Path) -> riftchart_core::Result<()> {
    let capture = Capture::from_path(input)?;
    let notes = derive_notes(&capture.events);

    println!("===={} {}====", capture.name, capture.difficulty);
    for (event_type, count) in capture.event_stats().iter() {
        println!("{:<16}{count}", event_type.label());
    }
    println!(
        "- short notes(overlaps): {}({})",
        notes.short_notes.len(),
        notes.overlapping_count()
    );
    println!("- wyrm  notes          : {}", notes.wyrm_notes.len());
    for note in &notes.wyrm_notes {
        match note.beat_finish {
            Some(finish) => println!(
                " wyrm start/finish beat: {:.2} / {finish:.2}",
                note.beat_start
            ),
            None => println!(" wyrm start/finish beat: {:.2} / -", note.beat_start),
        }
    }
    println!("- max combo            : {}", notes.max_combo);
    Ok(())
}

fn run_dump(input: &Path, output: &Path) -> riftchart_core::Result<()> {
    let capture = Capture::from_path(input)?;
    std::fs::create_dir_all(output)?;
    let path = output.join(capture.dump_file_name());
    capture.save_json(&path)?;
    tracing::info!(
        input = ?input,
        output = ?path,
        events = capture.events.len(),
        "capture dumped"
    );
    Ok(())
}

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .try_init();
}

#[derive(Parser, Debug)]
#[command(author, version, about = "Convert rhythm-game captures into chart documents", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Decode captures and write chart JSON documents.
    Convert(ConvertArgs),
    /// Print event and note statistics for a single capture.
    Stats {
        /// Path to the capture file.
        input: PathBuf,
    },
    /// Write a decoded capture, events included, as JSON.
    Dump {
        /// Path to the capture file.
        input: PathBuf,
        /// Directory the JSON dump is written to.
        #[arg(short, long, default_value = "./res")]
        output: PathBuf,
    },
}

#[derive(Args, Debug)]
#[command(group(clap::ArgGroup::new("source").required(true).args(["input", "all"])))]
struct ConvertArgs {
    /// Convert a single capture file.
    #[arg(short, long)]
    input: Option<PathBuf>,
    /// Convert every capture in the raw directory.
    #[arg(short, long)]
    all: bool,
    /// JSON configuration file.
    #[arg(short, long)]
    config: Option<PathBuf>,
    /// Directory holding `*.bin` captures.
    #[arg(long)]
    raw_dir: Option<PathBuf>,
    /// Directory the chart documents are written to.
    #[arg(long)]
    json_dir: Option<PathBuf>,
    /// Spreadsheet CSV export with bonus windows.
    #[arg(long)]
    bonus_table: Option<PathBuf>,
}

impl ConvertArgs {
    fn config(&self) -> riftchart_core::Result<PipelineConfig> {
        let mut config = match &self.config {
            Some(path) => PipelineConfig::from_path(path)?,
            None => PipelineConfig::default(),
        };
        if let Some(raw_dir) = &self.raw_dir {
            config.raw_dir.clone_from(raw_dir);
        }
        if let Some(json_dir) = &self.json_dir {
            config.json_dir.clone_from(json_dir);
        }
        if let Some(bonus_table) = &self.bonus_table {
            config.bonus_table = Some(bonus_table.clone());
        }
        Ok(config)
    }
}
