//! Heuristic relabeling before elimination.
//!
//! [`quick_reorder`] picks row and column orders in a single pass without
//! scoring any candidate:
//!
//! 1. Zeros on the diagonal are replaced by swapping columns.
//! 2. Rows and columns that are untouched by the map (a lone one on the
//!    diagonal) are moved to the end.
//! 3. For each remaining pivot, up to two rows holding a one in its column
//!    are swapped onto the nodes closest to the pivot.
//!
//! Steps 2 and 3 swap rows and columns together, so a diagonal of ones
//! established by step 1 is kept.

use tracing::debug;

use parsyn_linalg::{BitMatrix, LinalgError};

use crate::error::{CompileError, CompileResult};
use crate::topology::{RoutingMode, Topology};

/// Row and column orders for `matrix` on `topology`.
///
/// The result is suitable for [`BitMatrix::permuted`] and for
/// [`OperationRecorder::with_permutations`](crate::OperationRecorder::with_permutations).
/// The identity map keeps the identity wiring.
pub fn quick_reorder(
    matrix: &BitMatrix,
    topology: &Topology,
) -> CompileResult<(Vec<usize>, Vec<usize>)> {
    if !matrix.is_square() {
        return Err(LinalgError::DimensionMismatch {
            expected: matrix.rows(),
            got: matrix.cols(),
        }
        .into());
    }
    let n = matrix.rows();
    if n != topology.num_nodes() {
        return Err(CompileError::DimensionMismatch {
            rows: n,
            nodes: topology.num_nodes(),
        });
    }

    let mut view = Reordered {
        matrix,
        rows: (0..n).collect(),
        cols: (0..n).collect(),
    };

    // Fill the diagonal. A column to the left may only be taken if the
    // swap keeps its own diagonal entry set.
    for i in 0..n {
        if view.get(i, i) {
            continue;
        }
        let replacement =
            (0..n).find(|&j| view.get(i, j) && (j > i || view.get(j, i)));
        if let Some(j) = replacement {
            view.cols.swap(i, j);
        }
    }

    // Move identity rows and columns to the end.
    let mut end = n;
    let mut identities = 0;
    for i in (0..n).rev() {
        if view.row_weight(i) == 1 && view.col_weight(i) == 1 {
            view.swap_both(i, end - 1);
            end -= 1;
            identities += 1;
        }
    }

    // Pull rows that share a column with the pivot next to it.
    for i in 0..end {
        let rows: Vec<usize> = (0..n).filter(|&j| j != i && view.get(j, i)).collect();
        let mut nearest: Vec<(usize, usize)> = (0..n)
            .filter(|&k| k != i)
            .filter_map(|k| {
                topology
                    .route(i, k, RoutingMode::Upper, i)
                    .map(|r| (r.hops(), k))
            })
            .chain((0..n).filter(|&k| k != i).filter_map(|k| {
                topology
                    .route(i, k, RoutingMode::Full, i)
                    .map(|r| (r.hops(), k))
            }))
            .collect();
        nearest.sort_by_key(|&(hops, _)| hops);
        let mut nearest = nearest.into_iter().map(|(_, k)| k);

        let mut skipped = Vec::new();
        let mut r = 0;
        while r < rows.len().min(2) {
            let row = rows[r];
            if skipped.contains(&row) {
                r += 1;
                continue;
            }
            let Some(candidate) = nearest.next() else {
                break;
            };
            if rows.contains(&candidate) {
                skipped.push(candidate);
            } else if candidate < n - identities
                && (candidate > 0 || view.col_weight(candidate) == 1)
            {
                debug!(pivot = i, row, candidate, "moving row next to pivot");
                view.swap_both(row, candidate);
                r += 1;
            }
        }
    }

    Ok((view.rows, view.cols))
}

/// `matrix[rows][:, cols]` without materializing it.
struct Reordered<'a> {
    matrix: &'a BitMatrix,
    rows: Vec<usize>,
    cols: Vec<usize>,
}

impl Reordered<'_> {
    fn get(&self, r: usize, c: usize) -> bool {
        self.matrix.get(self.rows[r], self.cols[c])
    }

    fn row_weight(&self, r: usize) -> usize {
        (0..self.cols.len()).filter(|&c| self.get(r, c)).count()
    }

    fn col_weight(&self, c: usize) -> usize {
        (0..self.rows.len()).filter(|&r| self.get(r, c)).count()
    }

    fn swap_both(&mut self, a: usize, b: usize) {
        self.rows.swap(a, b);
        self.cols.swap(a, b);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog;
    use crate::parity::ParityMap;
    use parsyn_linalg::validate_permutation;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn test_identity_keeps_identity_wiring() {
        let topology = Topology::linear(5);
        let (rows, cols) = quick_reorder(&BitMatrix::identity(5), &topology).unwrap();
        assert_eq!(rows, vec![0, 1, 2, 3, 4]);
        assert_eq!(cols, vec![0, 1, 2, 3, 4]);
    }

    #[test]
    fn test_fills_zero_diagonal() {
        let topology = Topology::linear(3);
        let m: BitMatrix = "0 1 0\n0 0 1\n1 0 0".parse().unwrap();
        let (rows, cols) = quick_reorder(&m, &topology).unwrap();
        let reordered = m.permuted(&rows, &cols).unwrap();
        assert!((0..3).all(|i| reordered.get(i, i)), "{reordered:?}");
    }

    #[test]
    fn test_untouched_qubits_move_to_the_end() {
        let topology = Topology::linear(4);
        let m: BitMatrix = "1 0 0 0\n0 1 0 0\n0 0 1 1\n0 0 0 1".parse().unwrap();
        let (rows, cols) = quick_reorder(&m, &topology).unwrap();
        assert_eq!(rows, vec![2, 3, 0, 1]);
        assert_eq!(cols, vec![2, 3, 0, 1]);

        let reordered = m.permuted(&rows, &cols).unwrap();
        assert_eq!(reordered.row_weight(2), 1);
        assert_eq!(reordered.row_weight(3), 1);
        assert!(reordered.get(0, 1));
    }

    #[test]
    fn test_random_maps_give_valid_wiring() {
        let topology = catalog::named("9q-square").unwrap();
        let mut rng = StdRng::seed_from_u64(21);
        for _ in 0..20 {
            let map = ParityMap::random(9, 25, &mut rng);
            let (rows, cols) = quick_reorder(map.matrix(), &topology).unwrap();
            validate_permutation(&rows, 9).unwrap();
            validate_permutation(&cols, 9).unwrap();
        }
    }

    #[test]
    fn test_rejects_mismatched_sizes() {
        let topology = Topology::linear(3);
        assert!(quick_reorder(&BitMatrix::identity(4), &topology).is_err());
        assert!(quick_reorder(&BitMatrix::zeros(3, 4), &topology).is_err());
    }
}
