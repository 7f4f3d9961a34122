//! Recording of elimination steps as a two-qubit operation sequence.
//!
//! An [`OperationRecorder`] is attached to an elimination as a
//! [`Mirror`](parsyn_linalg::Mirror). Row additions are appended to the
//! operation list and column additions are prepended, and every step is
//! also applied to a shadow matrix.
//!
//! Operations use the parity convention: the pair `(a, b)` stands for the
//! elementary matrix `I + e_{a,b}`, i.e. row `a` of the parity map gains
//! row `b`. When the recorder sits on the column side of an elimination
//! that reduces `M` to the identity, replaying the operations from the
//! identity in order reproduces `M`.

use std::collections::VecDeque;
use std::fmt;

use serde::{Deserialize, Serialize};

use parsyn_linalg::{BitMatrix, EliminationSink, LinalgResult, validate_permutation};

use crate::topology::Topology;

/// Collects operations emitted by an elimination.
#[derive(Debug, Clone)]
pub struct OperationRecorder {
    operations: VecDeque<(usize, usize)>,
    shadow: BitMatrix,
    row_permutation: Vec<usize>,
    col_permutation: Vec<usize>,
}

impl OperationRecorder {
    /// Create an empty recorder over `num_qubits` qubits.
    pub fn new(num_qubits: usize) -> Self {
        Self {
            operations: VecDeque::new(),
            shadow: BitMatrix::identity(num_qubits),
            row_permutation: (0..num_qubits).collect(),
            col_permutation: (0..num_qubits).collect(),
        }
    }

    /// Attach the wiring under which the recorded matrix was eliminated.
    pub fn with_permutations(
        mut self,
        row_permutation: Vec<usize>,
        col_permutation: Vec<usize>,
    ) -> LinalgResult<Self> {
        validate_permutation(&row_permutation, self.num_qubits())?;
        validate_permutation(&col_permutation, self.num_qubits())?;
        self.row_permutation = row_permutation;
        self.col_permutation = col_permutation;
        Ok(self)
    }

    /// Number of qubits.
    pub fn num_qubits(&self) -> usize {
        self.shadow.rows()
    }

    /// Record a row addition: appended.
    pub fn record_row_add(&mut self, a: usize, b: usize) -> LinalgResult<()> {
        self.shadow.row_add(a, b)?;
        self.operations.push_back((a, b));
        Ok(())
    }

    /// Record a column addition: prepended.
    pub fn record_col_add(&mut self, a: usize, b: usize) -> LinalgResult<()> {
        self.shadow.col_add(a, b)?;
        self.operations.push_front((a, b));
        Ok(())
    }

    /// Number of recorded operations.
    pub fn len(&self) -> usize {
        self.operations.len()
    }

    /// Whether nothing has been recorded.
    pub fn is_empty(&self) -> bool {
        self.operations.is_empty()
    }

    /// The matrix kept in lockstep with the operations.
    pub fn shadow(&self) -> &BitMatrix {
        &self.shadow
    }

    /// Recorded operations in emission order.
    pub fn operations(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        self.operations.iter().copied()
    }

    /// Finish recording.
    pub fn emit(self) -> RecordedCircuit {
        RecordedCircuit {
            num_qubits: self.shadow.rows(),
            operations: self.operations.into(),
            row_permutation: self.row_permutation,
            col_permutation: self.col_permutation,
        }
    }
}

impl EliminationSink for OperationRecorder {
    fn row_add(&mut self, src: usize, dst: usize) -> LinalgResult<()> {
        self.record_row_add(src, dst)
    }

    fn col_add(&mut self, src: usize, dst: usize) -> LinalgResult<()> {
        self.record_col_add(src, dst)
    }
}

/// An ordered list of two-qubit operations with its wiring.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordedCircuit {
    /// Number of qubits.
    pub num_qubits: usize,
    /// `(control, target)` pairs in application order.
    pub operations: Vec<(usize, usize)>,
    /// Initial wiring: logical row `i` lives on qubit `row_permutation[i]`.
    pub row_permutation: Vec<usize>,
    /// Resulting wiring.
    pub col_permutation: Vec<usize>,
}

impl RecordedCircuit {
    /// Number of operations.
    pub fn len(&self) -> usize {
        self.operations.len()
    }

    /// Whether the circuit is empty.
    pub fn is_empty(&self) -> bool {
        self.operations.is_empty()
    }

    /// Replay the operations from the identity.
    pub fn circuit_matrix(&self) -> LinalgResult<BitMatrix> {
        let mut m = BitMatrix::identity(self.num_qubits);
        for &(a, b) in &self.operations {
            m.row_add(b, a)?;
        }
        Ok(m)
    }

    /// Whether every operation acts on adjacent nodes of `topology`.
    pub fn respects(&self, topology: &Topology) -> bool {
        self.operations
            .iter()
            .all(|&(a, b)| topology.is_adjacent(a, b))
    }

    /// Render as OpenQASM 2.0 with the wiring as leading comments.
    pub fn to_qasm(&self) -> String {
        let mut out = String::new();
        out.push_str(&format!("// Initial wiring: {:?}\n", self.row_permutation));
        out.push_str(&format!("// Resulting wiring: {:?}\n", self.col_permutation));
        out.push_str("OPENQASM 2.0;\n");
        out.push_str("include \"qelib1.inc\";\n");
        out.push_str(&format!("qreg q[{}];\n", self.num_qubits));
        for &(a, b) in &self.operations {
            out.push_str(&format!("cx q[{a}], q[{b}];\n"));
        }
        out
    }
}

impl fmt::Display for RecordedCircuit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for &(a, b) in &self.operations {
            writeln!(f, "CNOT {a} {b}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parsyn_linalg::Mirror;

    #[test]
    fn test_row_adds_append_col_adds_prepend() {
        let mut r = OperationRecorder::new(3);
        r.record_row_add(0, 1).unwrap();
        r.record_row_add(1, 2).unwrap();
        r.record_col_add(2, 0).unwrap();
        assert_eq!(r.operations().collect::<Vec<_>>(), vec![(2, 0), (0, 1), (1, 2)]);
        assert_eq!(r.len(), 3);
    }

    #[test]
    fn test_rejects_out_of_range() {
        let mut r = OperationRecorder::new(2);
        assert!(r.record_row_add(0, 2).is_err());
        assert!(r.record_col_add(1, 1).is_err());
        assert!(r.is_empty());
    }

    #[test]
    fn test_column_side_replay_reproduces_matrix() {
        let original: BitMatrix = "1 1 0\n0 1 1\n1 1 1".parse().unwrap();
        let mut m = original.clone();
        let mut recorder = OperationRecorder::new(3);
        m.gauss(true, &mut [Mirror::Columns(&mut recorder)]).unwrap();
        assert!(m.is_identity());
        assert_eq!(recorder.shadow(), &original);

        let circuit = recorder.emit();
        assert_eq!(circuit.circuit_matrix().unwrap(), original);
    }

    #[test]
    fn test_permutations_are_validated() {
        assert!(
            OperationRecorder::new(3)
                .with_permutations(vec![2, 0, 1], vec![0, 1, 2])
                .is_ok()
        );
        assert!(
            OperationRecorder::new(3)
                .with_permutations(vec![0, 0, 1], vec![0, 1, 2])
                .is_err()
        );
    }

    #[test]
    fn test_qasm_output() {
        let mut r = OperationRecorder::new(2)
            .with_permutations(vec![1, 0], vec![0, 1])
            .unwrap();
        r.record_row_add(0, 1).unwrap();
        let qasm = r.emit().to_qasm();
        assert!(qasm.starts_with("// Initial wiring: [1, 0]\n// Resulting wiring: [0, 1]\n"));
        assert!(qasm.contains("qreg q[2];"));
        assert!(qasm.ends_with("cx q[0], q[1];\n"));
    }

    #[test]
    fn test_serialize_shape() {
        let mut r = OperationRecorder::new(2);
        r.record_row_add(1, 0).unwrap();
        let json = serde_json::to_value(r.emit()).unwrap();
        assert_eq!(json["num_qubits"], 2);
        assert_eq!(json["operations"], serde_json::json!([[1, 0]]));
    }
}
