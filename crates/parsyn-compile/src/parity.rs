//! Parity maps of CNOT circuits.
//!
//! The parity map of a circuit is the GF(2) matrix it applies to the
//! computational basis. CNOTs use the parity convention: CNOT `(c, t)`
//! multiplies the map by `I + e_{c,t}` on the left, i.e. row `c` gains
//! row `t`.

use rand::Rng;

use parsyn_linalg::{BitMatrix, EliminationSink, LinalgResult};

/// A GF(2) parity map together with the CNOTs that produced it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParityMap {
    matrix: BitMatrix,
    cnots: Vec<(usize, usize)>,
}

impl ParityMap {
    /// Parity map of a CNOT sequence over `n` qubits.
    pub fn from_cnots(n: usize, cnots: &[(usize, usize)]) -> LinalgResult<Self> {
        let mut matrix = BitMatrix::identity(n);
        for &(control, target) in cnots {
            matrix.row_add(target, control)?;
        }
        Ok(Self {
            matrix,
            cnots: cnots.to_vec(),
        })
    }

    /// Parity map of `depth` uniformly random CNOTs over `n` qubits.
    pub fn random<R: Rng + ?Sized>(n: usize, depth: usize, rng: &mut R) -> Self {
        let cnots = random_cnots(n, depth, rng);
        let mut matrix = BitMatrix::identity(n);
        for &(control, target) in &cnots {
            // Indices come from 0..n and differ.
            let _ = matrix.row_add(target, control);
        }
        Self { matrix, cnots }
    }

    /// Replay the CNOTs into another sink, in circuit order.
    pub fn replay(&self, sink: &mut dyn EliminationSink) -> LinalgResult<()> {
        for &(control, target) in &self.cnots {
            sink.row_add(control, target)?;
        }
        Ok(())
    }

    /// The parity matrix.
    pub fn matrix(&self) -> &BitMatrix {
        &self.matrix
    }

    /// The generating CNOTs as `(control, target)`.
    pub fn cnots(&self) -> &[(usize, usize)] {
        &self.cnots
    }

    /// Number of qubits.
    pub fn num_qubits(&self) -> usize {
        self.matrix.rows()
    }

    /// Take the matrix.
    pub fn into_matrix(self) -> BitMatrix {
        self.matrix
    }
}

/// `depth` random CNOTs with distinct control and target.
///
/// Fewer than two qubits admit no CNOT, so the result is empty.
pub fn random_cnots<R: Rng + ?Sized>(n: usize, depth: usize, rng: &mut R) -> Vec<(usize, usize)> {
    if n < 2 {
        return Vec::new();
    }
    (0..depth)
        .map(|_| {
            let control = rng.gen_range(0..n);
            let mut target = rng.gen_range(0..n - 1);
            if target >= control {
                target += 1;
            }
            (control, target)
        })
        .collect()
}
