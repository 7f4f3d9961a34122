//! Reduce command implementation.

use std::path::Path;

use anyhow::{Context, Result};
use console::style;

use parsyn_compile::{EliminationMode, OperationRecorder, eliminate, quick_reorder};
use parsyn_linalg::Mirror;

use super::common::{
    OutputFormat, ensure_reducible, load_config, load_matrix, render_circuit, resolve_topology,
    write_output,
};

/// Arguments of the reduce command.
pub struct ReduceArgs<'a> {
    pub config: Option<&'a Path>,
    pub input: &'a Path,
    pub output: Option<&'a Path>,
    pub topology: Option<&'a str>,
    pub topology_file: Option<&'a Path>,
    pub mode: Option<&'a str>,
    pub upper_only: bool,
    pub reorder: bool,
    pub format: OutputFormat,
}

/// Execute the reduce command.
pub fn execute(args: &ReduceArgs<'_>) -> Result<()> {
    let config = load_config(args.config)?;
    let mode: EliminationMode = match args.mode {
        Some(m) => m.parse()?,
        None => config.mode,
    };
    let full_reduce = config.full_reduce && !args.upper_only;

    let matrix = load_matrix(args.input)?;
    let topology = resolve_topology(&config, args.topology, args.topology_file)?;
    ensure_reducible(&topology, mode)?;

    eprintln!(
        "{} Reducing {} ({}x{}) in {} mode",
        style("→").cyan().bold(),
        style(args.input.display()).green(),
        matrix.rows(),
        matrix.cols(),
        style(mode).yellow()
    );

    let mut recorder = OperationRecorder::new(matrix.rows());
    let mut reduced = if args.reorder {
        let (rows, cols) = quick_reorder(&matrix, &topology).context("Reordering failed")?;
        let relabeled = matrix.permuted(&rows, &cols)?;
        eprintln!("  Initial wiring: {rows:?}");
        eprintln!("  Resulting wiring: {cols:?}");
        recorder = recorder.with_permutations(rows, cols)?;
        relabeled
    } else {
        matrix
    };
    let rank = eliminate(
        mode,
        &mut reduced,
        Some(&topology),
        full_reduce,
        &mut [Mirror::Columns(&mut recorder)],
    )
    .context("Elimination failed")?;

    let circuit = recorder.emit();
    eprintln!("{} Elimination complete", style("✓").green().bold());
    eprintln!("  Rank: {rank}, operations: {}", circuit.len());
    if mode == EliminationMode::Steiner && !circuit.respects(&topology) {
        tracing::warn!("circuit contains operations between non-adjacent qubits");
    }

    let content = match args.format {
        OutputFormat::Json => serde_json::to_string_pretty(&serde_json::json!({
            "rank": rank,
            "reduced": reduced,
            "circuit": circuit,
        }))?,
        format => render_circuit(&circuit, format)?,
    };
    write_output(&content, args.output)?;
    if let Some(path) = args.output {
        eprintln!("  Output: {}", style(path.display()).green());
    }

    Ok(())
}
