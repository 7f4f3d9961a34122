//! Mirroring of elimination steps onto companion matrices and recorders.
//!
//! Eliminating a matrix `M` with row additions computes `E·M` for some
//! invertible `E`. Companions that should follow the elimination are
//! attached as [`Mirror`]s:
//!
//! - [`Mirror::Rows`] receives the same row additions, so a companion that
//!   starts as the identity ends as `E`.
//! - [`Mirror::Columns`] receives each step transposed as a column addition
//!   (`row_add(s, t)` becomes `col_add(t, s)`), so a companion that starts as
//!   the identity ends as `E⁻¹`. When `E·M = I` that is `M` itself, which is
//!   why gate recorders usually sit on the column side.

use crate::error::LinalgResult;
use crate::matrix::BitMatrix;

/// Something that can follow row and column additions.
pub trait EliminationSink {
    /// Add row `src` into row `dst`.
    fn row_add(&mut self, src: usize, dst: usize) -> LinalgResult<()>;

    /// Add column `src` into column `dst`.
    fn col_add(&mut self, src: usize, dst: usize) -> LinalgResult<()>;
}

impl EliminationSink for BitMatrix {
    fn row_add(&mut self, src: usize, dst: usize) -> LinalgResult<()> {
        BitMatrix::row_add(self, src, dst)
    }

    fn col_add(&mut self, src: usize, dst: usize) -> LinalgResult<()> {
        BitMatrix::col_add(self, src, dst)
    }
}

/// A sink attached to an elimination, and the side it is attached on.
pub enum Mirror<'a> {
    /// Receives row additions unchanged.
    Rows(&'a mut dyn EliminationSink),
    /// Receives row additions as transposed column additions.
    Columns(&'a mut dyn EliminationSink),
}

impl Mirror<'_> {
    /// Forward a row addition performed on the primary matrix.
    pub fn row_add(&mut self, src: usize, dst: usize) -> LinalgResult<()> {
        match self {
            Mirror::Rows(sink) => sink.row_add(src, dst),
            Mirror::Columns(sink) => sink.col_add(dst, src),
        }
    }
}

/// Forward a row addition to every mirror, in order.
pub fn mirror_row_add(mirrors: &mut [Mirror<'_>], src: usize, dst: usize) -> LinalgResult<()> {
    for mirror in mirrors.iter_mut() {
        mirror.row_add(src, dst)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_column_mirror_tracks_inverse() {
        let original: BitMatrix = "1 0 1\n0 1 1\n0 0 1".parse().unwrap();
        let mut m = original.clone();
        let mut right = BitMatrix::identity(3);
        m.gauss(true, &mut [Mirror::Columns(&mut right)]).unwrap();
        assert!(m.is_identity());
        assert_eq!(right, original);
    }

    #[test]
    fn test_mirrors_receive_every_step() {
        let mut m: BitMatrix = "1 1\n1 0".parse().unwrap();
        let mut rows = BitMatrix::identity(2);
        let mut cols = BitMatrix::identity(2);
        m.gauss(
            true,
            &mut [Mirror::Rows(&mut rows), Mirror::Columns(&mut cols)],
        )
        .unwrap();
        assert!(rows.mul(&cols).unwrap().is_identity());
    }
}
