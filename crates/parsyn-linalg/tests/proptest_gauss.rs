//! Property-based tests for unconstrained GF(2) elimination.

use parsyn_linalg::{BitMatrix, Mirror};
use proptest::prelude::*;

/// Random rectangular matrix with 1-8 rows and 1-8 columns.
fn arb_matrix() -> impl Strategy<Value = BitMatrix> {
    (1_usize..=8, 1_usize..=8).prop_flat_map(|(rows, cols)| {
        prop::collection::vec(any::<bool>(), rows * cols)
            .prop_map(move |bits| BitMatrix::from_fn(rows, cols, |r, c| bits[r * cols + c]))
    })
}

proptest! {
    /// Row rank equals column rank.
    #[test]
    fn test_rank_matches_transpose(m in arb_matrix()) {
        prop_assert_eq!(m.rank(), m.transpose().rank());
    }

    /// The row-side mirror records the elimination matrix: E·M equals the
    /// reduced matrix.
    #[test]
    fn test_row_mirror_reproduces_reduction(m in arb_matrix()) {
        let mut reduced = m.clone();
        let mut e = BitMatrix::identity(m.rows());
        let rank = reduced.gauss(true, &mut [Mirror::Rows(&mut e)]).unwrap();

        prop_assert_eq!(rank, m.rank());
        prop_assert_eq!(e.mul(&m).unwrap(), reduced);
    }

    /// Full reduction is a fixed point.
    #[test]
    fn test_full_reduction_is_idempotent(m in arb_matrix()) {
        let mut once = m.clone();
        once.gauss(true, &mut []).unwrap();
        let mut twice = once.clone();
        twice.gauss(true, &mut []).unwrap();
        prop_assert_eq!(once, twice);
    }

    /// Relabeling rows and columns keeps the rank.
    #[test]
    fn test_permutation_preserves_rank(m in arb_matrix(), seed in any::<u64>()) {
        let rotate = |n: usize| -> Vec<usize> {
            let k = (seed as usize) % n;
            (0..n).map(|i| (i + k) % n).collect()
        };
        let p = m.permuted(&rotate(m.rows()), &rotate(m.cols())).unwrap();
        prop_assert_eq!(p.rank(), m.rank());
    }
}

#[test]
fn test_serde_json_shape() {
    let m: BitMatrix = "1 0 1\n0 1 1".parse().unwrap();
    let json = serde_json::to_string(&m).unwrap();
    assert_eq!(json, "[[1,0,1],[0,1,1]]");
    let back: BitMatrix = serde_json::from_str(&json).unwrap();
    assert_eq!(back, m);
    assert!(serde_json::from_str::<BitMatrix>("[[1,2]]").is_err());
}
