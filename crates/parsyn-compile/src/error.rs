//! Error types for the compilation crate.

use thiserror::Error;

use crate::topology::RoutingMode;

/// Errors that can occur during constrained synthesis.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum CompileError {
    /// Error from the linear algebra crate.
    #[error("Matrix error: {0}")]
    Linalg(#[from] parsyn_linalg::LinalgError),

    /// Malformed adjacency or edge list.
    #[error("Invalid topology: {0}")]
    InvalidTopology(String),

    /// No named topology with this name.
    #[error("Unknown topology: '{0}'")]
    UnknownTopology(String),

    /// A Steiner target cannot be reached from the tree built so far.
    #[error("Routing failed: node {target} unreachable from tree rooted at {root} ({mode} mode)")]
    UnreachableTarget {
        root: usize,
        target: usize,
        mode: RoutingMode,
    },

    /// A walk phase emitted nothing although tree edges remain.
    #[error(
        "Routing stalled in {phase} phase at root {root}: {remaining} of {total} edges not emitted"
    )]
    RoutingStall {
        root: usize,
        phase: &'static str,
        remaining: usize,
        total: usize,
    },

    /// The walk would emit the same tree edge twice in one phase.
    #[error("Routing emitted edge ({src}, {dst}) twice in {phase} phase")]
    DuplicateEdge {
        src: usize,
        dst: usize,
        phase: &'static str,
    },

    /// Matrix and topology sizes do not agree.
    #[error("Matrix has {rows} rows but topology has {nodes} nodes")]
    DimensionMismatch { rows: usize, nodes: usize },

    /// An optimizer produced something that is not a permutation.
    #[error("Invalid permutation: {0}")]
    InvalidPermutation(String),

    /// Invalid configuration.
    #[error("Invalid configuration: {0}")]
    Config(String),
}

/// Result type for compilation operations.
pub type CompileResult<T> = Result<T, CompileError>;
