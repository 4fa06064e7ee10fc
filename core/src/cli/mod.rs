pub mod report;

use clap::{Parser, ValueEnum};
use std::path::PathBuf;

/// Command-line arguments for radextract
#[derive(Parser, Debug)]
#[command(name = "radextract")]
#[command(about = "Extract per-region radiomics features from FreeSurfer patient folders")]
#[command(version)]
pub struct ExtractCli {
    /// Master directory holding one folder per patient
    #[arg(value_name = "MASTER_DIR")]
    pub master: PathBuf,

    /// Color lookup table replacing the built-in FreeSurfer table
    #[arg(long, value_name = "FILE")]
    pub lut: Option<PathBuf>,

    /// pyradiomics executable
    #[arg(long, value_name = "PROGRAM", default_value = "pyradiomics")]
    pub pyradiomics: PathBuf,

    /// pyradiomics parameter file
    #[arg(long, value_name = "FILE")]
    pub params: Option<PathBuf>,

    /// Output format
    #[arg(short, long, default_value = "text")]
    pub format: OutputFormat,

    /// Verbose logging
    #[arg(short, long)]
    pub verbose: bool,
}

/// Command-line arguments for radconsolidate
#[derive(Parser, Debug)]
#[command(name = "radconsolidate")]
#[command(about = "Consolidate per-patient radiomics features into one cohort table")]
#[command(version)]
pub struct ConsolidateCli {
    /// Master directory holding one folder per patient
    #[arg(value_name = "MASTER_DIR")]
    pub master: PathBuf,

    /// Outcome label written to every row (0 or 1)
    #[arg(value_name = "TARGET", value_parser = clap::value_parser!(u8).range(0..=1))]
    pub target: u8,

    /// File of column names to drop, one per line
    #[arg(long, value_name = "FILE")]
    pub drop_columns: Option<PathBuf>,

    /// File of structure names to drop, one per line
    #[arg(long, value_name = "FILE")]
    pub drop_structures: Option<PathBuf>,

    /// Output format
    #[arg(short, long, default_value = "text")]
    pub format: OutputFormat,

    /// Verbose logging
    #[arg(short, long)]
    pub verbose: bool,
}

/// Output format options
#[derive(Debug, Clone, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text format
    Text,
    /// JSON format
    Json,
}

/// Initializes env_logger; `RUST_LOG` still overrides per module
pub fn setup_logging(verbose: bool) {
    let level = if verbose {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Info
    };
    env_logger::Builder::from_default_env()
        .filter_level(level)
        .init();
}
