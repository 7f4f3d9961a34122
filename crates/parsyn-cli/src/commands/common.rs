//! Shared helpers for CLI commands.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use clap::ValueEnum;

use parsyn_compile::{EliminationMode, RecordedCircuit, SynthesisConfig, Topology};
use parsyn_linalg::BitMatrix;

/// How a synthesized circuit is written.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// One `CNOT control target` line per operation
    Text,
    /// The full result as JSON
    Json,
    /// OpenQASM 2.0
    Qasm,
}

/// Load the synthesis configuration, applying `PARSYN_*` overrides.
pub fn load_config(path: Option<&Path>) -> Result<SynthesisConfig> {
    SynthesisConfig::load(path).with_context(|| match path {
        Some(p) => format!("Failed to load configuration: {}", p.display()),
        None => "Failed to load configuration".to_string(),
    })
}

/// Load a matrix from a text or JSON file.
pub fn load_matrix(path: &Path) -> Result<BitMatrix> {
    if !path.exists() {
        anyhow::bail!("File not found: {}", path.display());
    }

    let source = fs::read_to_string(path)
        .with_context(|| format!("Failed to read file: {}", path.display()))?;

    let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("");
    let is_json = ext.eq_ignore_ascii_case("json") || source.trim_start().starts_with("[[");

    if is_json {
        serde_json::from_str(&source).map_err(|e| anyhow::anyhow!("Parse error: {e}"))
    } else {
        source
            .parse()
            .map_err(|e| anyhow::anyhow!("Parse error: {e}"))
    }
}

/// Load a topology file holding `num_nodes` and `edges`.
pub fn load_topology_file(path: &Path) -> Result<Topology> {
    let source = fs::read_to_string(path)
        .with_context(|| format!("Failed to read topology file: {}", path.display()))?;

    let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("");
    match ext.to_lowercase().as_str() {
        "json" => serde_json::from_str(&source)
            .with_context(|| format!("Invalid topology file: {}", path.display())),
        _ => serde_yaml_ng::from_str(&source)
            .with_context(|| format!("Invalid topology file: {}", path.display())),
    }
}

/// Pick the topology from a file, a name, or the configuration, in that
/// order.
pub fn resolve_topology(
    config: &SynthesisConfig,
    name: Option<&str>,
    file: Option<&Path>,
) -> Result<Topology> {
    if let Some(path) = file {
        return load_topology_file(path);
    }
    let name = name.unwrap_or(&config.topology);
    parsyn_compile::catalog::named(name).with_context(|| {
        format!(
            "Available: {}",
            parsyn_compile::catalog::names().join(", ")
        )
    })
}

/// Fail early if Steiner elimination cannot reach every row of `topology`.
pub fn ensure_reducible(topology: &Topology, mode: EliminationMode) -> Result<()> {
    if mode == EliminationMode::Steiner && !topology.supports_elimination() {
        anyhow::bail!(
            "Topology cannot support Steiner elimination: some node cannot reach the \
             nodes above it without passing through a lower one (try --mode gauss)"
        );
    }
    Ok(())
}

/// Render a circuit in the requested format.
pub fn render_circuit(circuit: &RecordedCircuit, format: OutputFormat) -> Result<String> {
    Ok(match format {
        OutputFormat::Text => circuit.to_string(),
        OutputFormat::Json => serde_json::to_string_pretty(circuit)?,
        OutputFormat::Qasm => circuit.to_qasm(),
    })
}

/// Write to a file, or to stdout if no path is given.
pub fn write_output(content: &str, output: Option<&Path>) -> Result<()> {
    match output {
        Some(path) => fs::write(path, content)
            .with_context(|| format!("Failed to write file: {}", path.display())),
        None => {
            print!("{content}");
            if !content.ends_with('\n') {
                println!();
            }
            Ok(())
        }
    }
}
