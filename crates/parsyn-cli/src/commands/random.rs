//! Random command implementation.

use std::path::Path;

use anyhow::Result;
use rand::SeedableRng;
use rand::rngs::StdRng;

use parsyn_compile::ParityMap;

use super::common::write_output;

/// Execute the random command.
pub fn execute(
    qubits: usize,
    depth: usize,
    seed: Option<u64>,
    output: Option<&Path>,
    json: bool,
) -> Result<()> {
    if qubits == 0 {
        anyhow::bail!("Number of qubits must be at least 1");
    }

    let mut rng = match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    let map = ParityMap::random(qubits, depth, &mut rng);
    tracing::info!(qubits, depth, cnots = ?map.cnots(), "generated random parity map");

    let content = if json {
        serde_json::to_string(map.matrix())?
    } else {
        map.matrix().to_string()
    };
    write_output(&content, output)
}
