//! Topology-constrained Gaussian elimination over GF(2).
//!
//! [`SteinerGauss`] reduces a parity matrix to (reduced) row echelon form
//! using only row additions between rows whose nodes are adjacent in the
//! device [`Topology`]. Each column is cleared along an approximate Steiner
//! tree connecting the pivot row with every row that holds a one in that
//! column:
//!
//! 1. The top-down walk makes sure every node of the tree holds a one.
//! 2. The bottom-up walk clears every node except the root.
//!
//! The upper sweep routes through rows at or below the pivot only, so rows
//! that already hold a pivot are never disturbed. The optional full sweep
//! walks the pivot columns backwards and routes along strictly decreasing
//! paths, so it only touches rows above the current pivot.
//!
//! A full-sweep root always holds its one: rows below a pivot are zero in
//! its column after the upper sweep, and the full sweep only adds rows
//! into rows with a smaller index. The zero-root branch is only reached
//! when a column is reduced from a non-pivot row, which [`SteinerGauss`]
//! never does; it is counted and logged rather than rejected.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::{debug, instrument, trace, warn};

use parsyn_linalg::{BitMatrix, Mirror, mirror_row_add};

use crate::error::{CompileError, CompileResult};
use crate::steiner::{self, SteinerWalk, WalkStep};
use crate::topology::{RoutingMode, Topology};

/// Steiner-tree Gaussian elimination on a device topology.
#[derive(Debug, Clone, Copy)]
pub struct SteinerGauss<'a> {
    topology: &'a Topology,
    full_reduce: bool,
}

impl<'a> SteinerGauss<'a> {
    /// Eliminate on `topology`, upper sweep only.
    pub fn new(topology: &'a Topology) -> Self {
        Self {
            topology,
            full_reduce: false,
        }
    }

    /// Also clear the entries above each pivot.
    pub fn full_reduce(mut self, full_reduce: bool) -> Self {
        self.full_reduce = full_reduce;
        self
    }

    /// Reduce `matrix` in place and return its rank.
    ///
    /// Every row addition is forwarded to `mirrors` in the order it is
    /// applied. All additions join two adjacent nodes of the topology.
    #[instrument(skip(self, matrix, mirrors), fields(rows = matrix.rows(), cols = matrix.cols(), full_reduce = self.full_reduce))]
    pub fn reduce(&self, matrix: &mut BitMatrix, mirrors: &mut [Mirror<'_>]) -> CompileResult<usize> {
        let rows = matrix.rows();
        if rows != self.topology.num_nodes() {
            return Err(CompileError::DimensionMismatch {
                rows,
                nodes: self.topology.num_nodes(),
            });
        }

        let mut column = ColumnReducer {
            topology: self.topology,
            matrix,
            mirrors,
            operations: 0,
            zero_roots: 0,
        };

        let mut pivot_cols = Vec::new();
        let mut pivot = 0;
        for c in 0..column.matrix.cols() {
            if pivot == rows {
                break;
            }
            let targets: Vec<usize> = (pivot + 1..rows)
                .filter(|&r| column.matrix.get(r, c))
                .collect();
            column.reduce(c, pivot, &targets, RoutingMode::Upper)?;
            if column.matrix.get(pivot, c) {
                pivot_cols.push(c);
                pivot += 1;
            }
        }
        let rank = pivot;
        debug!(rank, operations = column.operations, "upper sweep finished");

        if self.full_reduce {
            for (p, &c) in pivot_cols.iter().enumerate().rev() {
                let targets: Vec<usize> = (0..p).filter(|&r| column.matrix.get(r, c)).collect();
                if targets.is_empty() {
                    continue;
                }
                column.reduce(c, p, &targets, RoutingMode::Full)?;
            }
            debug!(
                rank,
                operations = column.operations,
                zero_roots = column.zero_roots,
                "full sweep finished"
            );
        }

        Ok(rank)
    }
}

/// Clears one column along a Steiner tree.
struct ColumnReducer<'m, 'r, 's> {
    topology: &'m Topology,
    matrix: &'m mut BitMatrix,
    mirrors: &'r mut [Mirror<'s>],
    operations: usize,
    zero_roots: usize,
}

impl ColumnReducer<'_, '_, '_> {
    fn reduce(
        &mut self,
        col: usize,
        root: usize,
        targets: &[usize],
        mode: RoutingMode,
    ) -> CompileResult<()> {
        let mut walk = steiner::route(self.topology, root, targets, mode);

        match mode {
            RoutingMode::Upper => {
                // Nodes on the way to a one may be zero: pull the one up
                // from below, deepest first.
                let mut zeros = Vec::new();
                while let Some((s, t)) = next_edge(&mut walk)? {
                    if !self.matrix.get(s, col) {
                        zeros.push((s, t));
                    }
                }
                for (s, t) in zeros.into_iter().rev() {
                    if !self.matrix.get(s, col) {
                        self.row_add(t, s)?;
                    }
                }
            }
            RoutingMode::Full => {
                let mut first = true;
                while let Some((s, t)) = next_edge(&mut walk)? {
                    if first && !self.matrix.get(s, col) {
                        warn!(root = s, col, "root is zero, reducing a non-pivot column");
                        self.zero_roots += 1;
                    }
                    first = false;
                    if !self.matrix.get(t, col) {
                        self.row_add(s, t)?;
                    }
                }
            }
        }

        while let Some((s, t)) = next_edge(&mut walk)? {
            self.row_add(s, t)?;
        }
        Ok(())
    }

    fn row_add(&mut self, src: usize, dst: usize) -> CompileResult<()> {
        trace!(src, dst, "row add");
        self.matrix.row_add(src, dst)?;
        mirror_row_add(self.mirrors, src, dst)?;
        self.operations += 1;
        Ok(())
    }
}

/// Next edge of the current phase, `None` at the phase boundary.
fn next_edge(walk: &mut SteinerWalk<'_>) -> CompileResult<Option<(usize, usize)>> {
    match walk.next().transpose()? {
        Some(WalkStep::Edge(s, t)) => Ok(Some((s, t))),
        Some(WalkStep::PhaseEnd) | None => Ok(None),
    }
}

/// Which elimination routine to run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EliminationMode {
    /// Unconstrained elimination, any two rows may be combined.
    Gauss,
    /// Steiner-tree elimination on a topology.
    #[default]
    Steiner,
}

impl fmt::Display for EliminationMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EliminationMode::Gauss => write!(f, "gauss"),
            EliminationMode::Steiner => write!(f, "steiner"),
        }
    }
}

impl FromStr for EliminationMode {
    type Err = CompileError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "gauss" => Ok(EliminationMode::Gauss),
            "steiner" => Ok(EliminationMode::Steiner),
            other => Err(CompileError::Config(format!(
                "unknown elimination mode '{other}'"
            ))),
        }
    }
}

/// Eliminate `matrix` with the routine selected by `mode`.
///
/// Steiner mode without a topology assumes a fully connected device with
/// one node per row.
pub fn eliminate(
    mode: EliminationMode,
    matrix: &mut BitMatrix,
    topology: Option<&Topology>,
    full_reduce: bool,
    mirrors: &mut [Mirror<'_>],
) -> CompileResult<usize> {
    match mode {
        EliminationMode::Gauss => Ok(matrix.gauss(full_reduce, mirrors)?),
        EliminationMode::Steiner => match topology {
            Some(topology) => SteinerGauss::new(topology)
                .full_reduce(full_reduce)
                .reduce(matrix, mirrors),
            None => {
                warn!(
                    nodes = matrix.rows(),
                    "no topology given, assuming a fully connected device"
                );
                let topology = Topology::full(matrix.rows());
                SteinerGauss::new(&topology)
                    .full_reduce(full_reduce)
                    .reduce(matrix, mirrors)
            }
        },
    }
}
