//! Gate Resolution Demo
//!
//! Rewrites a circuit into a chosen gate basis and verifies that the unitary
//! is unchanged.

#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

use anyhow::Context;
use clap::Parser;
use qcirc_compile::{Basis, EquivalenceReport, PassManagerBuilder};
use qcirc_demos::circuits::resolution_showcase;
use qcirc_demos::{
    gate_counts, init_logging, print_failure, print_header, print_result, print_section,
    print_success,
};
use qcirc_ir::QubitCircuit;
use tracing::info;

#[derive(Parser, Debug)]
#[command(name = "demo-resolve")]
#[command(about = "Resolve a circuit into a target gate basis")]
struct Args {
    /// Two-qubit gate of the basis (CNOT, CSIGN, ISWAP, SQRTSWAP, SQRTISWAP)
    #[arg(short, long, default_value = "CNOT")]
    basis: String,

    /// Rotation gates of the basis, at least two of RX, RY, RZ
    #[arg(short, long, value_delimiter = ',', default_value = "RX,RY,RZ")]
    rotations: Vec<String>,

    /// Number of qubits (at least 3)
    #[arg(short = 'n', long, default_value = "4")]
    qubits: usize,

    /// Move multi-qubit gates onto neighbouring qubits first
    #[arg(long)]
    adjacent: bool,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn print_counts(circuit: &QubitCircuit) {
    for (name, count) in gate_counts(circuit) {
        print_result(&name, count);
    }
    print_result("Total", circuit.len());
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    init_logging(args.verbose);

    print_header("Gate Resolution Demo");

    if args.qubits < 3 {
        anyhow::bail!("the showcase circuit needs at least 3 qubits, got {}", args.qubits);
    }
    let rotations: Vec<String> = args.rotations.iter().map(|r| r.to_uppercase()).collect();
    let rotations: Vec<&str> = rotations.iter().map(String::as_str).collect();
    let basis = Basis::from_names(&args.basis.to_uppercase(), &rotations)?;

    let mut circuit = resolution_showcase(args.qubits)?;

    print_section("Input Circuit");
    print_result("Qubits", circuit.num_qubits());
    print_counts(&circuit);

    let (manager, mut properties) = PassManagerBuilder::new()
        .with_basis(basis.clone())
        .with_adjacent_gates(args.adjacent)
        .with_verification_tolerance(1e-10)
        .build();

    print_section("Compilation");
    print_result("Target basis", &basis);
    print_result("Passes", manager.pass_names().join(" → "));
    manager.run(&mut circuit, &mut properties)?;
    info!("Resolved into {} operations", circuit.len());

    print_section("Resolved Circuit");
    print_counts(&circuit);

    let report = properties
        .get::<EquivalenceReport>()
        .context("equivalence check did not run")?;
    print_result("Distance to original", format!("{:.2e}", report.distance));

    println!();
    if circuit.gates().all(|g| basis.contains(g.name())) {
        print_success("Every gate is in the target basis and the unitary is preserved");
    } else {
        print_failure("Some gates are outside the target basis");
    }
    Ok(())
}
