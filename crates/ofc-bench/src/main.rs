use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;

use ofc_bench::config::{BenchmarkConfig, ResolvedOutputs};
use ofc_bench::logging::init_logging;
use ofc_bench::runner::BenchRunner;

/// Batch analysis harness for Pineapple OFC positions.
#[derive(Debug, Parser)]
#[command(
    name = "ofc-bench",
    author,
    version,
    about = "Deterministic OFC Pineapple analysis harness"
)]
struct Cli {
    /// Path to the YAML configuration file.
    #[arg(short, long, value_name = "FILE", default_value = "bench/bench.yaml")]
    config: PathBuf,

    /// Override the run identifier (substitutes {run_id} templates).
    #[arg(long, value_name = "RUN_ID")]
    run_id: Option<String>,

    /// Override the number of deals to analyse.
    #[arg(long, value_name = "COUNT")]
    deals: Option<usize>,

    /// Override the RNG seed for deal generation.
    #[arg(long, value_name = "SEED")]
    seed: Option<u64>,

    /// Override the MCTS simulation budget per request.
    #[arg(long, value_name = "N")]
    simulations: Option<u32>,

    /// Override the worker thread count.
    #[arg(long, value_name = "N")]
    threads: Option<usize>,

    /// Exit after validating the configuration (no analysis is run).
    #[arg(long)]
    validate_only: bool,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let mut config = BenchmarkConfig::from_path(&cli.config)
        .with_context(|| format!("loading {}", cli.config.display()))?;

    if let Some(run_id) = cli.run_id {
        config.run_id = run_id;
    }

    if let Some(deals) = cli.deals {
        config.deals.count = deals;
    }

    if let Some(seed) = cli.seed {
        config.deals.seed = Some(seed);
    }

    if let Some(simulations) = cli.simulations {
        config.mcts.num_simulations = simulations;
    }

    if let Some(threads) = cli.threads {
        config.threads = Some(threads);
    }

    config.validate()?;

    let outputs: ResolvedOutputs = config.resolved_outputs();
    let run_id = config.run_id.clone();
    let deals = config.deals.count;
    let players = config.deals.players;

    println!(
        "Loaded configuration '{run_id}': {deals} deal{} for {players} player{}, {} simulations each",
        if deals == 1 { "" } else { "s" },
        if players == 1 { "" } else { "s" },
        config.mcts.num_simulations
    );

    if cli.validate_only {
        println!("Validation-only mode: analysis skipped.");
        return Ok(());
    }

    let logging_guard = init_logging(&config.logging, &outputs, &run_id)?;
    let runner = BenchRunner::new(config, outputs)?;
    let summary = runner.run()?;

    println!(
        "Analysis complete for '{run_id}': {} requests → {} rows at {}",
        summary.requests,
        summary.rows_written,
        summary.jsonl_path.display()
    );
    println!("Summary table: {}", summary.summary_path.display());
    println!(
        "  Avg expected value {:+.3}, avg confidence {:.3}, converged {}/{}",
        summary.summary.avg_expected_value,
        summary.summary.avg_confidence,
        summary.summary.converged,
        summary.summary.requests
    );
    if let Some(guard) = logging_guard.as_ref() {
        println!("Telemetry log: {}", guard.telemetry_path.display());
    }

    Ok(())
}
