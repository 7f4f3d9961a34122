//! Version command implementation.

use console::style;

/// Execute the version command.
pub fn execute() {
    let version = env!("CARGO_PKG_VERSION");

    println!(
        "{} {} - CNOT synthesis for parity maps on constrained topologies",
        style("Parsyn").cyan().bold(),
        style(format!("v{version}")).yellow()
    );
    println!();
    println!("Components:");
    println!("  parsyn-linalg   GF(2) matrices and Gaussian elimination");
    println!("  parsyn-compile  Topologies, Steiner elimination, permutation search");
    println!("  parsyn-cli      Command-line interface");
    println!();
    println!("License: {}", style("Apache-2.0").dim());
}
