//! End-to-end synthesis scenarios.

use parsyn_compile::{
    CompileError, EliminationMode, ExhaustiveOptimizer, OperationRecorder, ParityMap,
    PermutationOptions, SteinerGauss, SynthesisConfig, Topology, catalog, eliminate, optimize,
    quick_reorder,
};
use parsyn_linalg::{BitMatrix, Mirror};
use rand::SeedableRng;
use rand::rngs::StdRng;

// ---------------------------------------------------------------------------
// Concrete scenarios
// ---------------------------------------------------------------------------

#[test]
fn long_range_cnot_on_line_is_routed() {
    let topology = Topology::linear(5);
    let map = ParityMap::from_cnots(5, &[(0, 4)]).unwrap();
    let mut m = map.matrix().clone();
    let mut recorder = OperationRecorder::new(5);

    let rank = SteinerGauss::new(&topology)
        .full_reduce(true)
        .reduce(&mut m, &mut [Mirror::Columns(&mut recorder)])
        .unwrap();

    assert_eq!(rank, 5);
    let circuit = recorder.emit();
    assert!(circuit.len() >= 4);
    assert!(!circuit.operations.contains(&(0, 4)));
    assert!(circuit.respects(&topology));
    assert_eq!(&circuit.circuit_matrix().unwrap(), map.matrix());
}

#[test]
fn identity_on_fully_connected_needs_nothing() {
    let topology = Topology::full(4);
    let mut m = BitMatrix::identity(4);
    let mut recorder = OperationRecorder::new(4);
    let rank = SteinerGauss::new(&topology)
        .full_reduce(true)
        .reduce(&mut m, &mut [Mirror::Columns(&mut recorder)])
        .unwrap();
    assert_eq!(rank, 4);
    assert!(recorder.is_empty());
}

#[test]
fn adjacent_cnot_costs_one_operation() {
    let topology = Topology::linear(3);
    let map = ParityMap::from_cnots(3, &[(1, 2)]).unwrap();
    let mut m = map.matrix().clone();
    let mut recorder = OperationRecorder::new(3);
    SteinerGauss::new(&topology)
        .full_reduce(true)
        .reduce(&mut m, &mut [Mirror::Columns(&mut recorder)])
        .unwrap();
    assert_eq!(recorder.emit().operations, vec![(1, 2)]);
}

// ---------------------------------------------------------------------------
// Named devices
// ---------------------------------------------------------------------------

#[test]
fn random_maps_on_square_device() {
    let topology = catalog::named("9q-square").unwrap();
    let mut rng = StdRng::seed_from_u64(2019);
    for depth in [3, 10, 20, 30] {
        let map = ParityMap::random(9, depth, &mut rng);
        let mut m = map.matrix().clone();
        let mut recorder = OperationRecorder::new(9);
        let rank = SteinerGauss::new(&topology)
            .full_reduce(true)
            .reduce(&mut m, &mut [Mirror::Columns(&mut recorder)])
            .unwrap();
        assert_eq!(rank, 9);
        assert!(m.is_identity());
        let circuit = recorder.emit();
        assert!(circuit.respects(&topology), "depth {depth}");
        assert_eq!(&circuit.circuit_matrix().unwrap(), map.matrix());
    }
}

#[test]
fn star_device_reports_unreachable_target() {
    let topology = catalog::named("star-4").unwrap();
    assert!(!topology.supports_elimination());
    let mut m: BitMatrix = "1 0 0 0\n0 1 0 0\n0 0 1 0\n0 1 0 1".parse().unwrap();
    let err = SteinerGauss::new(&topology)
        .reduce(&mut m, &mut [])
        .unwrap_err();
    assert!(matches!(err, CompileError::UnreachableTarget { .. }));
}

// ---------------------------------------------------------------------------
// Modes and search
// ---------------------------------------------------------------------------

#[test]
fn gauss_mode_ignores_topology() {
    let map = ParityMap::from_cnots(5, &[(0, 4)]).unwrap();
    let mut m = map.matrix().clone();
    let mut recorder = OperationRecorder::new(5);
    let topology = Topology::linear(5);
    eliminate(
        EliminationMode::Gauss,
        &mut m,
        Some(&topology),
        true,
        &mut [Mirror::Columns(&mut recorder)],
    )
    .unwrap();
    assert_eq!(recorder.emit().operations, vec![(0, 4)]);
}

#[test]
fn exhaustive_search_on_small_device() {
    let topology = Topology::linear(4);
    let map = ParityMap::from_cnots(4, &[(0, 3), (3, 1)]).unwrap();
    let options = PermutationOptions {
        iterations: 0,
        ..Default::default()
    };
    let outcome = optimize(&topology, map.matrix(), &mut ExhaustiveOptimizer::new(), &options)
        .unwrap();

    let relabeled = map
        .matrix()
        .permuted(
            &outcome.circuit.row_permutation,
            &outcome.circuit.col_permutation,
        )
        .unwrap();
    assert_eq!(outcome.circuit.circuit_matrix().unwrap(), relabeled);
    assert!(outcome.circuit.respects(&topology));
}

#[test]
fn configured_genetic_search() {
    let mut config = SynthesisConfig::default();
    config.topology = "5q-line".into();
    config.genetic.iterations = 5;
    config.genetic.seed = Some(1);

    let topology = config.topology().unwrap();
    let map = ParityMap::random(5, 15, &mut StdRng::seed_from_u64(4));
    let mut optimizer = config.genetic_optimizer().unwrap();
    let outcome = optimize(
        &topology,
        map.matrix(),
        &mut optimizer,
        &config.permutation_options(),
    )
    .unwrap();

    assert_eq!(outcome.rank, 5);
    assert_eq!(outcome.permutation.len(), 5);
    assert!(outcome.circuit.respects(&topology));
}

#[test]
fn heuristic_reorder_synthesizes_relabeled_map() {
    let topology = catalog::named("ibm_qx5").unwrap();
    let map = ParityMap::random(16, 40, &mut StdRng::seed_from_u64(8));
    let (rows, cols) = quick_reorder(map.matrix(), &topology).unwrap();

    let relabeled = map.matrix().permuted(&rows, &cols).unwrap();
    let mut m = relabeled.clone();
    let mut recorder = OperationRecorder::new(16)
        .with_permutations(rows, cols)
        .unwrap();
    let rank = SteinerGauss::new(&topology)
        .full_reduce(true)
        .reduce(&mut m, &mut [Mirror::Columns(&mut recorder)])
        .unwrap();

    assert_eq!(rank, 16);
    let circuit = recorder.emit();
    assert_eq!(circuit.circuit_matrix().unwrap(), relabeled);
    assert!(circuit.respects(&topology));
}
