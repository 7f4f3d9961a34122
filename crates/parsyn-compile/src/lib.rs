//! Parsyn Topology-Constrained CNOT Synthesis
//!
//! This crate synthesizes CNOT circuits for GF(2) parity maps on devices
//! with limited connectivity. Every CNOT it emits acts on two qubits that
//! are coupled on the device, so no SWAP insertion is needed afterwards.
//!
//! # Overview
//!
//! Synthesis eliminates the parity matrix with row additions, each of which
//! is one CNOT. Rows may only be combined along device edges, so every
//! column is cleared along an approximate Steiner tree:
//! 1. **Topology**: Precompute restricted shortest paths for the device
//! 2. **Steiner walk**: Connect the pivot row with the rows to clear
//! 3. **Elimination**: Fill zeros top-down, clear ones bottom-up
//! 4. **Permutation search**: Relabel qubits to reduce the CNOT count
//!
//! # Architecture
//!
//! ```text
//! Parity map (BitMatrix)
//!       |
//!       v
//! +-------------+
//! | SteinerGauss | <-- Topology (restricted distance tables)
//! +-------------+
//!       |
//!       |-- steiner::route (two-phase tree walk)
//!       |-- Mirror::Rows / Mirror::Columns
//!       '-- OperationRecorder
//!       |
//!       v
//! RecordedCircuit (adjacent CNOTs only)
//! ```
//!
//! # Example: Synthesis on a Line
//!
//! ```rust
//! use parsyn_compile::{OperationRecorder, ParityMap, SteinerGauss, Topology};
//! use parsyn_linalg::Mirror;
//!
//! // CNOT between the two ends of a 5-qubit line
//! let map = ParityMap::from_cnots(5, &[(0, 4)]).unwrap();
//! let topology = Topology::linear(5);
//!
//! let mut matrix = map.matrix().clone();
//! let mut recorder = OperationRecorder::new(5);
//! let rank = SteinerGauss::new(&topology)
//!     .full_reduce(true)
//!     .reduce(&mut matrix, &mut [Mirror::Columns(&mut recorder)])
//!     .unwrap();
//!
//! let circuit = recorder.emit();
//! assert_eq!(rank, 5);
//! assert!(circuit.respects(&topology));
//! assert_eq!(&circuit.circuit_matrix().unwrap(), map.matrix());
//! ```

pub mod catalog;
pub mod config;
pub mod eliminate;
pub mod error;
pub mod optimizers;
pub mod parity;
pub mod permutation;
pub mod recorder;
pub mod steiner;
pub mod topology;

pub use config::{GeneticConfig, SynthesisConfig};
pub use eliminate::{EliminationMode, SteinerGauss, eliminate};
pub use error::{CompileError, CompileResult};
pub use optimizers::{ExhaustiveOptimizer, GeneticOptimizer, quick_reorder};
pub use parity::{ParityMap, random_cnots};
pub use permutation::{
    FitnessFunction, PermutationFitness, PermutationOptimizer, PermutationOptions,
    PermutationOutcome, optimize,
};
pub use recorder::{OperationRecorder, RecordedCircuit};
pub use steiner::{SteinerWalk, WalkStep};
pub use topology::{DistanceTable, Route, RoutingMode, Topology, TopologySpec};
