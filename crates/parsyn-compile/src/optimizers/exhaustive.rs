//! Brute-force search in lexicographic order.

use tracing::info;

use crate::error::CompileResult;
use crate::permutation::{FitnessFunction, PermutationOptimizer};

/// Scores permutations in lexicographic order, starting at the identity.
///
/// Only practical for small dimensions unless the iteration budget is
/// bounded. The first permutation with the lowest score wins.
#[derive(Debug, Clone, Copy, Default)]
pub struct ExhaustiveOptimizer;

impl ExhaustiveOptimizer {
    /// Create a new exhaustive optimizer.
    pub fn new() -> Self {
        Self
    }
}

impl PermutationOptimizer for ExhaustiveOptimizer {
    fn name(&self) -> &str {
        "exhaustive"
    }

    /// `iterations == 0` enumerates every permutation.
    fn find_best(
        &mut self,
        fitness: &dyn FitnessFunction,
        dimension: usize,
        iterations: usize,
        _continued: bool,
    ) -> CompileResult<Vec<usize>> {
        let mut current: Vec<usize> = (0..dimension).collect();
        let mut best = current.clone();
        let mut best_score = fitness.score(&current)?;
        let mut evaluated = 1;

        while (iterations == 0 || evaluated < iterations) && next_permutation(&mut current) {
            let score = fitness.score(&current)?;
            evaluated += 1;
            if score < best_score {
                best_score = score;
                best.clone_from(&current);
            }
        }

        info!(score = best_score, evaluated, "exhaustive search finished");
        Ok(best)
    }
}

/// Advance to the next permutation in lexicographic order; `false` after
/// the last one.
fn next_permutation(p: &mut [usize]) -> bool {
    let Some(i) = p.windows(2).rposition(|w| w[0] < w[1]) else {
        return false;
    };
    let Some(j) = p.iter().rposition(|&v| v > p[i]) else {
        return false;
    };
    p.swap(i, j);
    p[i + 1..].reverse();
    true
}
