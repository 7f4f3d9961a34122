//! Parsyn GF(2) Linear Algebra
//!
//! Dense bit matrices for parity-map synthesis. A parity map of a CNOT
//! circuit is an invertible matrix over GF(2); synthesising a circuit for it
//! amounts to eliminating the matrix with row additions, each of which
//! corresponds to one CNOT.
//!
//! # Example
//!
//! ```rust
//! use parsyn_linalg::{BitMatrix, Mirror};
//!
//! let original: BitMatrix = "1 1 0\n0 1 0\n0 1 1".parse().unwrap();
//! let mut m = original.clone();
//!
//! // Follow the elimination on the column side: ends as the original map.
//! let mut circuit = BitMatrix::identity(3);
//! let rank = m.gauss(true, &mut [Mirror::Columns(&mut circuit)]).unwrap();
//!
//! assert_eq!(rank, 3);
//! assert!(m.is_identity());
//! assert_eq!(circuit, original);
//! ```

pub mod error;
pub mod matrix;
pub mod sink;

pub use error::{Axis, LinalgError, LinalgResult};
pub use matrix::{BitMatrix, validate_permutation};
pub use sink::{EliminationSink, Mirror, mirror_row_add};
