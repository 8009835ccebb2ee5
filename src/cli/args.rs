//! Command line argument parsing for the codelang binaries using clap.

use std::path::PathBuf;

use clap::{Args, Parser, ValueEnum};
use serde::{Deserialize, Serialize};

/// Default model path for both binaries.
pub const DEFAULT_MODEL_PATH: &str = "model.json";

/// Options shared by every binary.
#[derive(Args, Debug, Clone)]
pub struct GlobalArgs {
    /// Verbosity level (0=quiet, 1=normal, 2=verbose, 3=debug)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Quiet mode (overrides verbose)
    #[arg(short, long)]
    pub quiet: bool,

    /// Output format
    #[arg(short = 'f', long = "format", default_value = "human")]
    pub output_format: OutputFormat,

    /// Pretty-print JSON output
    #[arg(long)]
    pub pretty: bool,
}

impl GlobalArgs {
    /// Get the effective verbosity level
    pub fn verbosity(&self) -> u8 {
        if self.quiet {
            0
        } else {
            match self.verbose {
                0 => 1, // Default to normal
                n => n,
            }
        }
    }
}

/// codelang - identify the programming language of a source file
#[derive(Parser, Debug, Clone)]
#[command(name = "codelang")]
#[command(about = "Identify the programming language of a source file")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(long_about = None)]
pub struct PredictArgs {
    /// Source file to classify
    #[arg(value_name = "FILE")]
    pub file: PathBuf,

    /// Trained model file
    #[arg(short, long, env = "CODELANG_MODEL", default_value = DEFAULT_MODEL_PATH)]
    pub model: PathBuf,

    /// Also print the posterior probability of every language
    #[arg(short, long)]
    pub scores: bool,

    #[command(flatten)]
    pub global: GlobalArgs,
}

/// codelang-train - train a language identification model
#[derive(Parser, Debug, Clone)]
#[command(name = "codelang-train")]
#[command(about = "Train, evaluate and save a language identification model")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(long_about = None)]
pub struct TrainArgs {
    /// Corpus: a directory with one subdirectory per language, a JSON array
    /// or a JSON Lines file of {"text", "label"} objects
    #[arg(short, long, value_name = "CORPUS")]
    pub corpus: PathBuf,

    /// Where to write the trained model
    #[arg(short, long, value_name = "MODEL_FILE", default_value = DEFAULT_MODEL_PATH)]
    pub output: PathBuf,

    /// Training configuration file (JSON)
    #[arg(long, value_name = "CONFIG_FILE")]
    pub config: Option<PathBuf>,

    /// Additive smoothing constant (overrides the configuration file)
    #[arg(long)]
    pub alpha: Option<f64>,

    /// Fraction of documents held out for evaluation
    #[arg(long)]
    pub test_ratio: Option<f64>,

    /// Seed for the train/test shuffle
    #[arg(long)]
    pub seed: Option<u64>,

    /// Number of worker threads (default: number of CPUs)
    #[arg(short = 'j', long)]
    pub threads: Option<usize>,

    /// Skip the corpus size and minification filters
    #[arg(long)]
    pub no_filter: bool,

    /// Also write the filtered, normalized corpus as JSON Lines
    #[arg(long, value_name = "JSONL_FILE")]
    pub dump_corpus: Option<PathBuf>,

    #[command(flatten)]
    pub global: GlobalArgs,
}

/// Output formats for CLI
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Human-readable output
    Human,
    /// JSON output
    Json,
}
