use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

use crate::config;

#[derive(Debug, Parser)]
#[command(name = "kira-ampliqc", version, about = "qPCR plate calling CLI")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    Run(RunArgs),
    Validate(ValidateArgs),
}

#[derive(Debug, Args)]
pub struct RunArgs {
    #[arg(long, help = "Raw per-well records (JSON array) from the instrument export")]
    pub input: PathBuf,

    #[arg(long)]
    pub out: PathBuf,

    #[arg(long, help = "Reference well (e.g. F12); omit to calibrate without one")]
    pub reference: Option<String>,

    #[arg(long, default_value_t = config::DEFAULT_CARRIER_THRESHOLD)]
    pub carrier_threshold: f64,

    #[arg(long, default_value_t = config::DEFAULT_UNCERTAIN_THRESHOLD)]
    pub uncertain_threshold: f64,

    #[arg(long, help = "Prefer the software result even when a reference well applies")]
    pub software_result: bool,

    #[arg(
        long,
        default_value_t = config::DEFAULT_CLUSTER_COUNT,
        help = "Cluster count for the reference-free calibrator"
    )]
    pub clusters: usize,

    #[arg(long, help = "Write ampliqc.json into the output directory")]
    pub json: bool,

    #[arg(long, help = "Write ampliqc.tsv into the output directory")]
    pub tsv: bool,
}

#[derive(Debug, Args)]
pub struct ValidateArgs {
    #[arg(long, help = "Raw per-well records (JSON array) to check")]
    pub input: PathBuf,
}
