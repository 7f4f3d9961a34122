//! Optimize command implementation.

use std::path::Path;

use anyhow::{Context, Result};
use console::style;
use indicatif::{ProgressBar, ProgressStyle};

use parsyn_compile::{ExhaustiveOptimizer, PermutationOptimizer, SynthesisConfig, optimize};

use super::common::{
    OutputFormat, ensure_reducible, load_config, load_matrix, render_circuit, resolve_topology,
    write_output,
};

/// Arguments of the optimize command.
pub struct OptimizeArgs<'a> {
    pub config: Option<&'a Path>,
    pub input: &'a Path,
    pub output: Option<&'a Path>,
    pub topology: Option<&'a str>,
    pub topology_file: Option<&'a Path>,
    pub optimizer: &'a str,
    pub iterations: Option<usize>,
    pub seed: Option<u64>,
    pub rows_only: bool,
    pub cols_only: bool,
    pub format: OutputFormat,
}

/// Build the named search strategy.
///
/// The exhaustive search visits every permutation unless an iteration
/// budget is given.
pub fn build_optimizer(
    name: &str,
    config: &SynthesisConfig,
) -> Result<(Box<dyn PermutationOptimizer>, usize)> {
    match name.to_lowercase().as_str() {
        "genetic" | "ga" => Ok((
            Box::new(config.genetic_optimizer()?),
            config.genetic.iterations,
        )),
        "exhaustive" | "brute-force" => Ok((Box::new(ExhaustiveOptimizer::new()), 0)),
        other => anyhow::bail!("Unknown optimizer: {other}. Available: genetic, exhaustive"),
    }
}

/// Execute the optimize command.
pub fn execute(args: &OptimizeArgs<'_>) -> Result<()> {
    let mut config = load_config(args.config)?;
    if let Some(seed) = args.seed {
        config.genetic.seed = Some(seed);
    }
    if args.rows_only {
        config.permute_cols = false;
    }
    if args.cols_only {
        config.permute_rows = false;
    }

    let matrix = load_matrix(args.input)?;
    let topology = resolve_topology(&config, args.topology, args.topology_file)?;

    let (mut optimizer, default_iterations) = build_optimizer(args.optimizer, &config)?;
    let mut options = config.permutation_options();
    options.iterations = args.iterations.unwrap_or(default_iterations);
    ensure_reducible(&topology, options.mode)?;

    eprintln!(
        "{} Optimizing {} with {} search ({} qubits)",
        style("→").cyan().bold(),
        style(args.input.display()).green(),
        style(optimizer.name()).yellow(),
        matrix.rows()
    );

    let spinner = ProgressBar::new_spinner();
    spinner.set_style(ProgressStyle::default_spinner().template("{spinner:.cyan} {msg}")?);
    spinner.set_message("Searching qubit relabelings...");
    spinner.enable_steady_tick(std::time::Duration::from_millis(100));

    let result = optimize(&topology, &matrix, optimizer.as_mut(), &options);
    spinner.finish_and_clear();
    let outcome = result.context("Permutation search failed")?;

    eprintln!("{} Search complete", style("✓").green().bold());
    eprintln!("  Permutation: {:?}", outcome.permutation);
    eprintln!(
        "  Rank: {}, operations: {}",
        outcome.rank, outcome.operation_count
    );

    let content = match args.format {
        OutputFormat::Json => serde_json::to_string_pretty(&outcome)?,
        format => render_circuit(&outcome.circuit, format)?,
    };
    write_output(&content, args.output)?;
    if let Some(path) = args.output {
        eprintln!("  Output: {}", style(path.display()).green());
    }

    Ok(())
}
