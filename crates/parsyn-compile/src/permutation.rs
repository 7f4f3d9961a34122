//! Search over qubit relabelings for cheaper circuits.
//!
//! Relabeling the rows and/or columns of a parity map before elimination
//! changes how many operations the elimination needs. [`optimize`] lets a
//! [`PermutationOptimizer`] search for a good relabeling, scored by
//! [`PermutationFitness`], and synthesizes the final circuit under the
//! winner.

use serde::{Deserialize, Serialize};
use tracing::{info, instrument};

use parsyn_linalg::{BitMatrix, LinalgError, Mirror, validate_permutation};

use crate::eliminate::{EliminationMode, eliminate};
use crate::error::{CompileError, CompileResult};
use crate::recorder::{OperationRecorder, RecordedCircuit};
use crate::topology::Topology;

/// Scores a candidate permutation; lower is better.
///
/// Implementations must be `Sync` so candidates can be scored from several
/// threads, each evaluation owning its own scratch state.
pub trait FitnessFunction: Sync {
    /// Score `permutation`.
    fn score(&self, permutation: &[usize]) -> CompileResult<usize>;
}

impl<F> FitnessFunction for F
where
    F: Fn(&[usize]) -> CompileResult<usize> + Sync,
{
    fn score(&self, permutation: &[usize]) -> CompileResult<usize> {
        self(permutation)
    }
}

/// Searches the space of permutations of `0..dimension`.
pub trait PermutationOptimizer {
    /// Get the name of this optimizer.
    fn name(&self) -> &str;

    /// Return the best permutation found within `iterations` rounds.
    ///
    /// With `continued`, an optimizer may resume from state left by a
    /// previous call on the same dimension.
    fn find_best(
        &mut self,
        fitness: &dyn FitnessFunction,
        dimension: usize,
        iterations: usize,
        continued: bool,
    ) -> CompileResult<Vec<usize>>;
}

/// How candidates are applied and eliminated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PermutationOptions {
    /// Elimination routine used for scoring and synthesis.
    pub mode: EliminationMode,
    /// Apply the permutation to the rows.
    pub permute_rows: bool,
    /// Apply the permutation to the columns.
    pub permute_cols: bool,
    /// Reduce fully instead of to echelon form.
    pub full_reduce: bool,
    /// Optimizer budget.
    pub iterations: usize,
}

impl Default for PermutationOptions {
    fn default() -> Self {
        Self {
            mode: EliminationMode::Steiner,
            permute_rows: true,
            permute_cols: true,
            full_reduce: true,
            iterations: 50,
        }
    }
}

/// Operation count of eliminating a relabeled parity map.
#[derive(Debug, Clone, Copy)]
pub struct PermutationFitness<'a> {
    topology: &'a Topology,
    matrix: &'a BitMatrix,
    options: PermutationOptions,
}

impl<'a> PermutationFitness<'a> {
    /// Score relabelings of `matrix` on `topology`.
    pub fn new(topology: &'a Topology, matrix: &'a BitMatrix, options: PermutationOptions) -> Self {
        Self {
            topology,
            matrix,
            options,
        }
    }

    /// Row and column permutations induced by `permutation`.
    pub fn wiring(&self, permutation: &[usize]) -> (Vec<usize>, Vec<usize>) {
        let row_perm = if self.options.permute_rows {
            permutation.to_vec()
        } else {
            (0..self.matrix.rows()).collect()
        };
        let col_perm = if self.options.permute_cols {
            permutation.to_vec()
        } else {
            (0..self.matrix.cols()).collect()
        };
        (row_perm, col_perm)
    }

    fn relabeled(&self, permutation: &[usize]) -> CompileResult<BitMatrix> {
        validate_permutation(permutation, self.matrix.rows())
            .map_err(|e| CompileError::InvalidPermutation(e.to_string()))?;
        let (row_perm, col_perm) = self.wiring(permutation);
        Ok(self.matrix.permuted(&row_perm, &col_perm)?)
    }
}

impl FitnessFunction for PermutationFitness<'_> {
    fn score(&self, permutation: &[usize]) -> CompileResult<usize> {
        let mut scratch = self.relabeled(permutation)?;
        let mut recorder = OperationRecorder::new(scratch.rows());
        eliminate(
            self.options.mode,
            &mut scratch,
            Some(self.topology),
            self.options.full_reduce,
            &mut [Mirror::Rows(&mut recorder)],
        )?;
        Ok(recorder.len())
    }
}

/// Result of a permutation search.
#[derive(Debug, Clone, Serialize)]
pub struct PermutationOutcome {
    /// The winning relabeling.
    pub permutation: Vec<usize>,
    /// Circuit synthesized under that relabeling.
    pub circuit: RecordedCircuit,
    /// Rank of the parity map.
    pub rank: usize,
    /// Number of operations in `circuit`.
    pub operation_count: usize,
}

/// Search for a relabeling of a square `matrix` and synthesize its circuit.
///
/// The identity relabeling is always scored as well, so the outcome is
/// never worse than eliminating `matrix` as given.
#[instrument(skip(topology, matrix, optimizer), fields(optimizer = optimizer.name(), qubits = matrix.rows()))]
pub fn optimize(
    topology: &Topology,
    matrix: &BitMatrix,
    optimizer: &mut dyn PermutationOptimizer,
    options: &PermutationOptions,
) -> CompileResult<PermutationOutcome> {
    if !matrix.is_square() {
        return Err(LinalgError::DimensionMismatch {
            expected: matrix.rows(),
            got: matrix.cols(),
        }
        .into());
    }
    let n = matrix.rows();
    let fitness = PermutationFitness::new(topology, matrix, *options);

    let candidate = optimizer.find_best(&fitness, n, options.iterations, true)?;
    let candidate_score = fitness.score(&candidate)?;
    let identity: Vec<usize> = (0..n).collect();
    let baseline = fitness.score(&identity)?;
    info!(candidate = candidate_score, baseline, "scored search result");

    let permutation = if candidate_score <= baseline {
        candidate
    } else {
        identity
    };

    let (row_perm, col_perm) = fitness.wiring(&permutation);
    let mut relabeled = fitness.relabeled(&permutation)?;
    let mut recorder = OperationRecorder::new(n).with_permutations(row_perm, col_perm)?;
    let rank = eliminate(
        options.mode,
        &mut relabeled,
        Some(topology),
        options.full_reduce,
        &mut [Mirror::Columns(&mut recorder)],
    )?;

    let circuit = recorder.emit();
    info!(
        operations = circuit.len(),
        baseline,
        rank,
        "permutation search finished"
    );
    Ok(PermutationOutcome {
        permutation,
        operation_count: circuit.len(),
        circuit,
        rank,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parity::ParityMap;

    /// Always proposes the reversal.
    struct Reverse;

    impl PermutationOptimizer for Reverse {
        fn name(&self) -> &str {
            "reverse"
        }

        fn find_best(
            &mut self,
            _fitness: &dyn FitnessFunction,
            dimension: usize,
            _iterations: usize,
            _continued: bool,
        ) -> CompileResult<Vec<usize>> {
            Ok((0..dimension).rev().collect())
        }
    }

    /// Proposes something that is not a permutation.
    struct Broken;

    impl PermutationOptimizer for Broken {
        fn name(&self) -> &str {
            "broken"
        }

        fn find_best(
            &mut self,
            _fitness: &dyn FitnessFunction,
            dimension: usize,
            _iterations: usize,
            _continued: bool,
        ) -> CompileResult<Vec<usize>> {
            Ok(vec![0; dimension])
        }
    }

    #[test]
    fn test_fitness_counts_operations() {
        let topology = Topology::linear(5);
        let map = ParityMap::from_cnots(5, &[(0, 4)]).unwrap();
        let fitness = PermutationFitness::new(&topology, map.matrix(), PermutationOptions::default());
        assert_eq!(fitness.score(&[0, 1, 2, 3, 4]).unwrap(), 12);

        let identity = BitMatrix::identity(5);
        let fitness = PermutationFitness::new(&topology, &identity, PermutationOptions::default());
        assert_eq!(fitness.score(&[4, 3, 2, 1, 0]).unwrap(), 0);
    }

    #[test]
    fn test_fitness_rejects_bad_permutation() {
        let topology = Topology::linear(3);
        let m = BitMatrix::identity(3);
        let fitness = PermutationFitness::new(&topology, &m, PermutationOptions::default());
        assert!(matches!(
            fitness.score(&[0, 1]),
            Err(CompileError::InvalidPermutation(_))
        ));
        assert!(matches!(
            fitness.score(&[0, 2, 2]),
            Err(CompileError::InvalidPermutation(_))
        ));
    }

    #[test]
    fn test_wiring_respects_options() {
        let topology = Topology::linear(3);
        let m = BitMatrix::identity(3);
        let options = PermutationOptions {
            permute_cols: false,
            ..Default::default()
        };
        let fitness = PermutationFitness::new(&topology, &m, options);
        assert_eq!(fitness.wiring(&[2, 0, 1]), (vec![2, 0, 1], vec![0, 1, 2]));
    }

    #[test]
    fn test_optimize_never_worse_than_identity() {
        let topology = Topology::linear(5);
        let map = ParityMap::from_cnots(5, &[(0, 4), (1, 3), (2, 0)]).unwrap();
        let options = PermutationOptions::default();
        let baseline = PermutationFitness::new(&topology, map.matrix(), options)
            .score(&[0, 1, 2, 3, 4])
            .unwrap();

        let outcome = optimize(&topology, map.matrix(), &mut Reverse, &options).unwrap();
        assert!(outcome.operation_count <= baseline);
        assert_eq!(outcome.rank, 5);
        assert!(outcome.circuit.respects(&topology));
        assert_eq!(outcome.circuit.row_permutation, outcome.permutation);
    }

    #[test]
    fn test_optimize_circuit_reproduces_relabeled_map() {
        let topology = Topology::full(4);
        let map = ParityMap::from_cnots(4, &[(0, 1), (2, 3), (3, 0)]).unwrap();
        let options = PermutationOptions::default();
        let outcome = optimize(&topology, map.matrix(), &mut Reverse, &options).unwrap();

        let (rows, cols) = (
            outcome.circuit.row_permutation.clone(),
            outcome.circuit.col_permutation.clone(),
        );
        let relabeled = map.matrix().permuted(&rows, &cols).unwrap();
        assert_eq!(outcome.circuit.circuit_matrix().unwrap(), relabeled);
    }

    #[test]
    fn test_optimize_rejects_invalid_candidate() {
        let topology = Topology::linear(3);
        let m = BitMatrix::identity(3);
        let result = optimize(&topology, &m, &mut Broken, &PermutationOptions::default());
        assert!(matches!(result, Err(CompileError::InvalidPermutation(_))));
    }

    #[test]
    fn test_closure_fitness() {
        let fitness = |p: &[usize]| -> CompileResult<usize> { Ok(p[0]) };
        assert_eq!(FitnessFunction::score(&fitness, &[3, 1]).unwrap(), 3);
    }
}
