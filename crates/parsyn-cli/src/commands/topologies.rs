//! Topologies command implementation.

use anyhow::Result;
use console::style;

use parsyn_compile::{RoutingMode, catalog};

/// Execute the topologies command.
pub fn execute(name: Option<&str>) -> Result<()> {
    let Some(name) = name else {
        println!("{}", style("Named topologies:").bold());
        for name in catalog::names() {
            println!("  {name}");
        }
        return Ok(());
    };

    let topology = catalog::named(name)?;
    println!("{} {}", style("Topology:").bold(), style(name).cyan());
    println!("  Qubits: {}", topology.num_nodes());
    println!("  Edges:  {}", topology.edges().len());
    println!(
        "  Connected: {}",
        if topology.is_connected() { "yes" } else { "no" }
    );
    println!(
        "  Supports elimination: {}",
        if topology.supports_elimination() {
            style("yes").green()
        } else {
            style("no").red()
        }
    );
    println!();
    for q in 0..topology.num_nodes() {
        let neighbors: Vec<String> = topology.neighbors(q).map(|n| n.to_string()).collect();
        println!("  q{q:<3} -> {}", neighbors.join(", "));
    }

    if topology.num_nodes() > 1 {
        let last = topology.num_nodes() - 1;
        if let Some(route) = topology.distance(0, last, RoutingMode::Upper) {
            println!();
            println!("  Distance q0 -> q{last}: {}", route.hops());
        }
    }

    Ok(())
}
