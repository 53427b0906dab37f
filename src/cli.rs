use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Strata multi-scale layering of borehole logs.
#[derive(Parser)]
#[command(
    name = "strata",
    version,
    about = "Multi-scale wavelet layering of borehole logs"
)]
pub struct Cli {
    /// Increase verbosity (-v info, -vv debug, -vvv trace).
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Subcommand to run.
    #[command(subcommand)]
    pub command: Command,
}

/// Available subcommands.
#[derive(Subcommand)]
pub enum Command {
    /// Transform a trace, delineate its layers and write a JSON report.
    Analyze(AnalyzeArgs),
    /// Select layers into contiguous blocks and write them to Parquet.
    Select(SelectArgs),
}

/// Arguments for the `analyze` subcommand.
#[derive(clap::Args)]
pub struct AnalyzeArgs {
    /// Path to TOML configuration file.
    #[arg(short, long, default_value = "strata.toml")]
    pub config: PathBuf,

    /// Override input Parquet path from config.
    #[arg(short, long)]
    pub input: Option<PathBuf>,

    /// Path for the JSON report; printed to stdout when absent.
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Include the coefficient, label, importance and wavelet matrices.
    #[arg(long)]
    pub matrices: bool,
}

/// Arguments for the `select` subcommand.
#[derive(clap::Args)]
pub struct SelectArgs {
    /// Path to TOML configuration file.
    #[arg(short, long, default_value = "strata.toml")]
    pub config: PathBuf,

    /// Override input Parquet path from config.
    #[arg(short, long)]
    pub input: Option<PathBuf>,

    /// Override selection mode from config (e.g. `top-count`, `min-thickness`).
    #[arg(short, long)]
    pub mode: Option<String>,

    /// Override selection value from config.
    #[arg(long)]
    pub value: Option<f64>,

    /// Override output Parquet path from config.
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}
