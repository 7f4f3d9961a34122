//! Dense bit matrices over GF(2).
//!
//! Rows are packed into `u64` words. Row and column additions (XOR) are the
//! only structural mutators, which keeps every change to a matrix expressible
//! as a two-index operation that can be mirrored onto other matrices or
//! recorded as a gate.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::error::{Axis, LinalgError, LinalgResult};
use crate::sink::{Mirror, mirror_row_add};

const WORD_BITS: usize = u64::BITS as usize;

/// A dense `rows x cols` matrix over GF(2).
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "Vec<Vec<u8>>", into = "Vec<Vec<u8>>")]
pub struct BitMatrix {
    rows: usize,
    cols: usize,
    /// Number of `u64` words backing one row.
    stride: usize,
    data: Vec<u64>,
}

impl BitMatrix {
    /// Create an all-zero matrix.
    pub fn zeros(rows: usize, cols: usize) -> Self {
        let stride = cols.div_ceil(WORD_BITS);
        Self {
            rows,
            cols,
            stride,
            data: vec![0; rows * stride],
        }
    }

    /// Create the `n x n` identity matrix.
    pub fn identity(n: usize) -> Self {
        let mut m = Self::zeros(n, n);
        for i in 0..n {
            m.set(i, i, true);
        }
        m
    }

    /// Create a matrix by evaluating `f(row, col)` for every entry.
    pub fn from_fn(rows: usize, cols: usize, mut f: impl FnMut(usize, usize) -> bool) -> Self {
        let mut m = Self::zeros(rows, cols);
        for r in 0..rows {
            for c in 0..cols {
                if f(r, c) {
                    m.set(r, c, true);
                }
            }
        }
        m
    }

    /// Create a matrix from boolean rows.
    ///
    /// All rows must have the same length.
    pub fn from_rows<R: AsRef<[bool]>>(rows: &[R]) -> LinalgResult<Self> {
        let cols = rows.first().map_or(0, |r| r.as_ref().len());
        for (i, row) in rows.iter().enumerate() {
            if row.as_ref().len() != cols {
                return Err(LinalgError::RaggedRows {
                    row: i,
                    expected: cols,
                    got: row.as_ref().len(),
                });
            }
        }
        Ok(Self::from_fn(rows.len(), cols, |r, c| rows[r].as_ref()[c]))
    }

    /// Number of rows.
    #[inline]
    pub fn rows(&self) -> usize {
        self.rows
    }

    /// Number of columns.
    #[inline]
    pub fn cols(&self) -> usize {
        self.cols
    }

    /// Whether the matrix is square.
    pub fn is_square(&self) -> bool {
        self.rows == self.cols
    }

    /// Read the entry at `(row, col)`.
    ///
    /// # Panics
    ///
    /// Panics if the position is outside the matrix.
    #[inline]
    pub fn get(&self, row: usize, col: usize) -> bool {
        assert!(
            row < self.rows && col < self.cols,
            "position ({row}, {col}) outside {}x{} matrix",
            self.rows,
            self.cols
        );
        let word = self.data[row * self.stride + col / WORD_BITS];
        (word >> (col % WORD_BITS)) & 1 == 1
    }

    /// Write the entry at `(row, col)`.
    ///
    /// # Panics
    ///
    /// Panics if the position is outside the matrix.
    #[inline]
    pub fn set(&mut self, row: usize, col: usize, value: bool) {
        assert!(
            row < self.rows && col < self.cols,
            "position ({row}, {col}) outside {}x{} matrix",
            self.rows,
            self.cols
        );
        let idx = row * self.stride + col / WORD_BITS;
        let mask = 1u64 << (col % WORD_BITS);
        if value {
            self.data[idx] |= mask;
        } else {
            self.data[idx] &= !mask;
        }
    }

    /// Iterate over the entries of a row.
    pub fn row(&self, row: usize) -> impl Iterator<Item = bool> + '_ {
        (0..self.cols).map(move |c| self.get(row, c))
    }

    /// Iterate over the entries of a column.
    pub fn col(&self, col: usize) -> impl Iterator<Item = bool> + '_ {
        (0..self.rows).map(move |r| self.get(r, col))
    }

    /// Number of ones in a row.
    pub fn row_weight(&self, row: usize) -> usize {
        self.data[row * self.stride..(row + 1) * self.stride]
            .iter()
            .map(|w| w.count_ones() as usize)
            .sum()
    }

    /// XOR row `src` into row `dst`.
    pub fn row_add(&mut self, src: usize, dst: usize) -> LinalgResult<()> {
        self.check_index(Axis::Row, src)?;
        self.check_index(Axis::Row, dst)?;
        if src == dst {
            return Err(LinalgError::SameIndex {
                axis: Axis::Row,
                index: src,
            });
        }
        let (s, d) = (src * self.stride, dst * self.stride);
        for i in 0..self.stride {
            let word = self.data[s + i];
            self.data[d + i] ^= word;
        }
        Ok(())
    }

    /// XOR column `src` into column `dst`.
    pub fn col_add(&mut self, src: usize, dst: usize) -> LinalgResult<()> {
        self.check_index(Axis::Column, src)?;
        self.check_index(Axis::Column, dst)?;
        if src == dst {
            return Err(LinalgError::SameIndex {
                axis: Axis::Column,
                index: src,
            });
        }
        for r in 0..self.rows {
            if self.get(r, src) {
                let flipped = !self.get(r, dst);
                self.set(r, dst, flipped);
            }
        }
        Ok(())
    }

    /// Return a copy with rows and columns relabeled.
    ///
    /// Entry `(i, j)` of the result is entry `(row_perm[i], col_perm[j])` of
    /// `self`.
    pub fn permuted(&self, row_perm: &[usize], col_perm: &[usize]) -> LinalgResult<Self> {
        validate_permutation(row_perm, self.rows)?;
        validate_permutation(col_perm, self.cols)?;
        Ok(Self::from_fn(self.rows, self.cols, |r, c| {
            self.get(row_perm[r], col_perm[c])
        }))
    }

    /// Transpose.
    #[must_use]
    pub fn transpose(&self) -> Self {
        Self::from_fn(self.cols, self.rows, |r, c| self.get(c, r))
    }

    /// Matrix product over GF(2).
    pub fn mul(&self, other: &Self) -> LinalgResult<Self> {
        if self.cols != other.rows {
            return Err(LinalgError::DimensionMismatch {
                expected: self.cols,
                got: other.rows,
            });
        }
        let mut out = Self::zeros(self.rows, other.cols);
        for r in 0..self.rows {
            for k in 0..self.cols {
                if self.get(r, k) {
                    let (s, d) = (k * other.stride, r * out.stride);
                    for i in 0..out.stride {
                        out.data[d + i] ^= other.data[s + i];
                    }
                }
            }
        }
        Ok(out)
    }

    /// Whether this is a square identity matrix.
    pub fn is_identity(&self) -> bool {
        self.is_square() && (0..self.rows).all(|r| self.row_weight(r) == 1 && self.get(r, r))
    }

    /// Rank over GF(2), computed on a scratch copy.
    pub fn rank(&self) -> usize {
        let mut scratch = self.clone();
        // Row additions on in-range, distinct rows cannot fail.
        scratch.gauss(false, &mut []).unwrap_or_default()
    }

    /// Unconstrained Gaussian elimination.
    ///
    /// Brings the matrix into row echelon form (reduced row echelon form if
    /// `full_reduce`) using row additions only. A zero on the pivot position
    /// is fixed by adding the first lower row that has a one there, so no
    /// swaps are needed. Every row addition is mirrored onto `mirrors` in
    /// order. Returns the rank.
    pub fn gauss(&mut self, full_reduce: bool, mirrors: &mut [Mirror<'_>]) -> LinalgResult<usize> {
        let mut pivot_cols = Vec::new();
        let mut pivot = 0;
        for c in 0..self.cols {
            if pivot == self.rows {
                break;
            }
            let Some(first) = (pivot..self.rows).find(|&r| self.get(r, c)) else {
                continue;
            };
            if first != pivot {
                self.apply_row_add(first, pivot, mirrors)?;
            }
            for r in pivot + 1..self.rows {
                if self.get(r, c) {
                    self.apply_row_add(pivot, r, mirrors)?;
                }
            }
            pivot_cols.push(c);
            pivot += 1;
        }
        let rank = pivot;

        if full_reduce {
            for (p, &c) in pivot_cols.iter().enumerate().rev() {
                for r in 0..p {
                    if self.get(r, c) {
                        self.apply_row_add(p, r, mirrors)?;
                    }
                }
            }
        }
        trace!(rank, full_reduce, "unconstrained elimination finished");
        Ok(rank)
    }

    fn apply_row_add(
        &mut self,
        src: usize,
        dst: usize,
        mirrors: &mut [Mirror<'_>],
    ) -> LinalgResult<()> {
        self.row_add(src, dst)?;
        mirror_row_add(mirrors, src, dst)
    }

    fn check_index(&self, axis: Axis, index: usize) -> LinalgResult<()> {
        let size = match axis {
            Axis::Row => self.rows,
            Axis::Column => self.cols,
        };
        if index < size {
            Ok(())
        } else {
            Err(LinalgError::IndexOutOfBounds { axis, index, size })
        }
    }
}

/// Check that `perm` is a permutation of `0..len`.
pub fn validate_permutation(perm: &[usize], len: usize) -> LinalgResult<()> {
    if perm.len() != len {
        return Err(LinalgError::InvalidPermutation(format!(
            "length {} does not match dimension {len}",
            perm.len()
        )));
    }
    let mut seen = vec![false; len];
    for &p in perm {
        if p >= len {
            return Err(LinalgError::InvalidPermutation(format!(
                "entry {p} out of range 0..{len}"
            )));
        }
        if std::mem::replace(&mut seen[p], true) {
            return Err(LinalgError::InvalidPermutation(format!(
                "entry {p} appears twice"
            )));
        }
    }
    Ok(())
}

impl fmt::Display for BitMatrix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for r in 0..self.rows {
            let line: Vec<&str> = self.row(r).map(|b| if b { "1" } else { "0" }).collect();
            writeln!(f, "{}", line.join(" "))?;
        }
        Ok(())
    }
}

impl fmt::Debug for BitMatrix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "BitMatrix {}x{} [", self.rows, self.cols)?;
        for r in 0..self.rows {
            let line: String = self.row(r).map(|b| if b { '1' } else { '0' }).collect();
            writeln!(f, "  {line}")?;
        }
        write!(f, "]")
    }
}

impl FromStr for BitMatrix {
    type Err = LinalgError;

    /// Parse one row per line. `0` and `1` are entries; spaces, tabs, commas
    /// and brackets are ignored; blank lines and `#` comments are skipped.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut rows: Vec<Vec<bool>> = Vec::new();
        for (lineno, line) in s.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let mut row = Vec::new();
            for ch in line.chars() {
                match ch {
                    '0' => row.push(false),
                    '1' => row.push(true),
                    ' ' | '\t' | ',' | '[' | ']' => {}
                    other => {
                        return Err(LinalgError::Parse(format!(
                            "unexpected character '{other}' on line {}",
                            lineno + 1
                        )));
                    }
                }
            }
            if !row.is_empty() {
                rows.push(row);
            }
        }
        Self::from_rows(&rows)
    }
}

impl TryFrom<Vec<Vec<u8>>> for BitMatrix {
    type Error = LinalgError;

    fn try_from(rows: Vec<Vec<u8>>) -> Result<Self, Self::Error> {
        let mut bits = Vec::with_capacity(rows.len());
        for (r, row) in rows.iter().enumerate() {
            let mut bit_row = Vec::with_capacity(row.len());
            for (c, &v) in row.iter().enumerate() {
                match v {
                    0 => bit_row.push(false),
                    1 => bit_row.push(true),
                    other => {
                        return Err(LinalgError::Parse(format!(
                            "entry ({r}, {c}) is {other}, expected 0 or 1"
                        )));
                    }
                }
            }
            bits.push(bit_row);
        }
        Self::from_rows(&bits)
    }
}

impl From<BitMatrix> for Vec<Vec<u8>> {
    fn from(m: BitMatrix) -> Self {
        (0..m.rows)
            .map(|r| m.row(r).map(u8::from).collect())
            .collect()
    }
}
