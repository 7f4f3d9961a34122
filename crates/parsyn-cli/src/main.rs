//! Parsyn Command-Line Interface
//!
//! The main entry point for the Parsyn CLI tool.
//!
//! ```text
//!   q0 --o-----------
//!        |
//!   q1 --x--o--------        P A R S Y N
//!           |                Parity-map synthesis
//!   q2 -----x--o-----        on constrained devices
//!              |
//!   q3 --------x-----
//! ```

#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use console::style;
use tracing_subscriber::EnvFilter;

mod commands;

use commands::common::OutputFormat;
use commands::{optimize, random, reduce, topologies, version};

/// Parsyn - CNOT synthesis for parity maps on constrained qubit topologies
#[derive(Parser)]
#[command(name = "parsyn")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Configuration file (YAML or JSON)
    #[arg(short, long, global = true, env = "PARSYN_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Synthesize a circuit for a parity matrix by constrained elimination
    Reduce {
        /// Input matrix (text rows of 0/1, or JSON)
        #[arg(short, long)]
        input: PathBuf,

        /// Output file (stdout if omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Named topology (see `parsyn topologies`)
        #[arg(short, long)]
        topology: Option<String>,

        /// Topology file with `num_nodes` and `edges` (YAML or JSON)
        #[arg(long, conflicts_with = "topology")]
        topology_file: Option<PathBuf>,

        /// Elimination mode (steiner, gauss)
        #[arg(short, long)]
        mode: Option<String>,

        /// Stop at upper triangular form
        #[arg(long)]
        upper_only: bool,

        /// Relabel qubits with the quick reorder heuristic first
        #[arg(long)]
        reorder: bool,

        /// Output format
        #[arg(short, long, value_enum, default_value = "text")]
        format: OutputFormat,
    },

    /// Search a qubit relabeling that lowers the CNOT count
    Optimize {
        /// Input matrix (text rows of 0/1, or JSON)
        #[arg(short, long)]
        input: PathBuf,

        /// Output file (stdout if omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Named topology (see `parsyn topologies`)
        #[arg(short, long)]
        topology: Option<String>,

        /// Topology file with `num_nodes` and `edges` (YAML or JSON)
        #[arg(long, conflicts_with = "topology")]
        topology_file: Option<PathBuf>,

        /// Search strategy (genetic, exhaustive)
        #[arg(long, default_value = "genetic")]
        optimizer: String,

        /// Generations (genetic) or candidates (exhaustive, 0 = all)
        #[arg(long)]
        iterations: Option<usize>,

        /// Random seed for the genetic search
        #[arg(long)]
        seed: Option<u64>,

        /// Only relabel rows
        #[arg(long, conflicts_with = "cols_only")]
        rows_only: bool,

        /// Only relabel columns
        #[arg(long)]
        cols_only: bool,

        /// Output format
        #[arg(short, long, value_enum, default_value = "text")]
        format: OutputFormat,
    },

    /// Generate the parity map of a random CNOT circuit
    Random {
        /// Number of qubits
        #[arg(short, long)]
        qubits: usize,

        /// Number of CNOTs
        #[arg(short, long, default_value = "20")]
        depth: usize,

        /// Random seed
        #[arg(long)]
        seed: Option<u64>,

        /// Output file (stdout if omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Emit JSON instead of text rows
        #[arg(long)]
        json: bool,
    },

    /// List named topologies, or show one
    Topologies {
        /// Topology to show in detail
        name: Option<String>,
    },

    /// Show version information
    Version,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Setup logging
    let filter = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let config = cli.config.as_deref();

    // Execute command
    let result = match cli.command {
        Commands::Reduce {
            input,
            output,
            topology,
            topology_file,
            mode,
            upper_only,
            reorder,
            format,
        } => reduce::execute(&reduce::ReduceArgs {
            config,
            input: &input,
            output: output.as_deref(),
            topology: topology.as_deref(),
            topology_file: topology_file.as_deref(),
            mode: mode.as_deref(),
            upper_only,
            reorder,
            format,
        }),

        Commands::Optimize {
            input,
            output,
            topology,
            topology_file,
            optimizer,
            iterations,
            seed,
            rows_only,
            cols_only,
            format,
        } => optimize::execute(&optimize::OptimizeArgs {
            config,
            input: &input,
            output: output.as_deref(),
            topology: topology.as_deref(),
            topology_file: topology_file.as_deref(),
            optimizer: &optimizer,
            iterations,
            seed,
            rows_only,
            cols_only,
            format,
        }),

        Commands::Random {
            qubits,
            depth,
            seed,
            output,
            json,
        } => random::execute(qubits, depth, seed, output.as_deref(), json),

        Commands::Topologies { name } => topologies::execute(name.as_deref()),

        Commands::Version => {
            version::execute();
            Ok(())
        }
    };

    // Handle errors
    if let Err(e) = result {
        eprintln!("{} {:#}", style("Error:").red().bold(), e);
        std::process::exit(1);
    }

    Ok(())
}
