use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use kira_ampliqc::cli::{Cli, Commands, RunArgs, ValidateArgs};
use kira_ampliqc::config::CalibrationConfig;
use kira_ampliqc::ctx::Ctx;
use kira_ampliqc::input;
use kira_ampliqc::io;
use kira_ampliqc::pipeline::stage1_normalize::Stage1Normalize;
use kira_ampliqc::pipeline::{PipelineExecutor, RunOutcome};
use kira_ampliqc::plate::Warning;

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    match cli.command {
        Commands::Run(args) => run_analysis(args),
        Commands::Validate(args) => validate_input(args),
    }
}

fn run_analysis(args: RunArgs) -> Result<()> {
    let mut config = CalibrationConfig::new(args.carrier_threshold, args.uncertain_threshold)?;
    config.reference_well = args.reference;
    config.use_software_result = args.software_result;
    config.cluster_count = args.clusters;

    let raw = input::load_raw_records(&args.input)?;
    std::fs::create_dir_all(&args.out)?;
    let ctx = Ctx::new(
        config,
        raw,
        args.out,
        args.json,
        args.tsv,
        env!("CARGO_PKG_VERSION"),
    );

    let executor = Arc::new(PipelineExecutor::standard());
    let handle = executor.spawn(
        ctx,
        |percent, message| tracing::info!(percent, message, "progress"),
        || false,
    );
    let outcome = handle
        .join()
        .map_err(|_| anyhow::anyhow!("analysis worker panicked"))??;

    match outcome {
        RunOutcome::Completed(ctx) => {
            if ctx.write_json {
                io::json_writer::write_json(&ctx.output.json_path, &ctx)?;
            }
            if ctx.write_tsv {
                io::tsv_writer::write_tsv(&ctx.output.tsv_path, &ctx)?;
            }
            print!("{}", io::summary::format_summary(&ctx));
            Ok(())
        }
        RunOutcome::Cancelled => {
            println!("analysis cancelled");
            Ok(())
        }
        RunOutcome::Busy => anyhow::bail!("another analysis is already running"),
    }
}

fn validate_input(args: ValidateArgs) -> Result<()> {
    let raw = input::load_raw_records(&args.input)?;
    let ctx = Ctx::new(
        CalibrationConfig::default(),
        raw,
        PathBuf::from("."),
        false,
        false,
        env!("CARGO_PKG_VERSION"),
    );
    let executor = PipelineExecutor::new(vec![Box::new(Stage1Normalize::new())]);
    let outcome = executor.run(ctx, |_, _| {}, || false)?;
    if let RunOutcome::Completed(ctx) = outcome {
        println!("kira-ampliqc validate ok");
        println!("wells: {}", ctx.plate.len());
        let flagged = |kind: Warning| {
            ctx.plate
                .wells
                .iter()
                .filter(|w| w.warning == kind)
                .count()
        };
        println!("empty: {}", flagged(Warning::EmptyWell));
        println!("insufficient_dna: {}", flagged(Warning::InsufficientDna));
        println!("low_rfu: {}", flagged(Warning::LowRfu));
        if !ctx.warnings.is_empty() {
            println!("warnings:");
            for warning in &ctx.warnings {
                println!("- {warning}");
            }
        }
    }
    Ok(())
}
