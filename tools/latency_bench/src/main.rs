// tools/latency_bench/src/main.rs

mod cli;
mod report;

use std::process::ExitCode;

use anyhow::Context;
use clap::Parser;
use latency_engine::perf::catalog;
use latency_engine::{
    builtin_registry, check_capabilities, BenchmarkRunner, InstructionRegistry, LatencyError, Summary,
};

use crate::cli::{Cli, OutputFormat};
use crate::report::ReportParams;

const EXIT_OK: u8 = 0;
const EXIT_FAILED_ROWS: u8 = 1;

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let cli = Cli::parse();

    match run(&cli) {
        Ok(status) => ExitCode::from(status),
        Err(error) => {
            log::error!("ERROR: {error:#}");
            if let Some(latency) = error.downcast_ref::<LatencyError>() {
                log::error!("hint: {}", latency.recovery_hint());
            }
            ExitCode::FAILURE
        }
    }
}

/// Statut de sortie d'un run abouti
fn run(cli: &Cli) -> anyhow::Result<u8> {
    if cli.list {
        print!("{}", report::render_catalog(&catalog::entries()));
        return Ok(EXIT_OK);
    }

    // Configuration d'abord : une erreur de paramètres ne doit rien mesurer
    let runner = runner_for(cli)?;
    let features = check_capabilities().context("host cannot run the latency probes")?;
    let registry =
        builtin_registry(&cli.selection(), &cli.references()).context("cannot build the instruction registry")?;

    let (output, status) = measure(cli, &runner, &registry, features.brand)?;
    print!("{}", output);
    Ok(status)
}

fn runner_for(cli: &Cli) -> anyhow::Result<BenchmarkRunner> {
    BenchmarkRunner::new(cli.run_config()).context("invalid run parameters")
}

/// Évalue le registre et rend le rapport dans le format demandé
fn measure(
    cli: &Cli,
    runner: &BenchmarkRunner,
    registry: &InstructionRegistry,
    cpu: Option<String>,
) -> anyhow::Result<(String, u8)> {
    let results = runner.evaluate(registry).context("measurement failed")?;
    let summary = Summary::from_results(&results);
    log::info!("{}/{} instructions within tolerance", summary.passed, summary.total);

    let config = runner.config();
    let params = ReportParams {
        iterations: config.iterations,
        runs: config.runs,
        tolerance_pct: config.tolerance_pct,
        aggregation: config.aggregation,
        cpu,
    };

    let output = match cli.format {
        OutputFormat::Text => report::render_text(&params, &results),
        OutputFormat::Csv => report::render_csv(&results),
        OutputFormat::Markdown => report::render_markdown(&params, &results),
    };
    Ok((output, exit_status(cli.strict, &summary)))
}

/// Un run complet sort avec 0, sauf `--strict` avec une ligne en échec
fn exit_status(strict: bool, summary: &Summary) -> u8 {
    if strict && !summary.all_passed() {
        EXIT_FAILED_ROWS
    } else {
        EXIT_OK
    }
}
