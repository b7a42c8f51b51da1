//! Quantum Teleportation Demo
//!
//! Teleports a random single-qubit state through a Bell pair, first listing
//! every measurement branch and then sampling individual shots.

#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

use std::collections::BTreeMap;
use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use qcirc_demos::circuits::teleportation;
use qcirc_demos::{
    create_progress_bar, format_cbits, init_logging, print_failure, print_header, print_result,
    print_section, print_success,
};
use qcirc_linalg::Ket;
use qcirc_linalg::random::rand_ket;
use qcirc_sim::{CircuitSimulator, SimulatorConfig, SimulatorMode};
use rand::SeedableRng;
use rand::rngs::SmallRng;
use tracing::debug;

/// Largest distance between the teleported and input qubit counted as exact.
const FIDELITY_TOLERANCE: f64 = 1e-10;

#[derive(Parser, Debug)]
#[command(name = "demo-teleport")]
#[command(about = "Teleport a random qubit state through a Bell pair")]
struct Args {
    /// Seed for the input state and the sampled shots
    #[arg(short, long, default_value = "7")]
    seed: u64,

    /// Number of sampled runs
    #[arg(long, default_value = "200")]
    shots: u64,

    /// Evolve density matrices instead of state vectors
    #[arg(long)]
    density: bool,

    /// Multiply runs of unconditioned gates up front
    #[arg(long)]
    precompute: bool,

    /// YAML simulator configuration (overrides --density and --precompute)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    init_logging(args.verbose);

    print_header("Quantum Teleportation Demo");

    let config = match &args.config {
        Some(path) => SimulatorConfig::from_file(path)
            .with_context(|| format!("failed to load {}", path.display()))?,
        None => {
            let mode = if args.density {
                SimulatorMode::DensityMatrix
            } else {
                SimulatorMode::StateVector
            };
            SimulatorConfig::new()
                .with_mode(mode)
                .with_precompute_unitary(args.precompute)
        }
    };

    debug!("Simulator configuration: {config:?}");

    let circuit = teleportation()?;
    let mut rng = SmallRng::seed_from_u64(args.seed);
    let input = rand_ket(&[2], &mut rng);
    let initial = input.tensor(&Ket::zero_state(&[2, 2]));
    let target = input.to_density();

    print_section("Setup");
    print_result("Qubits", circuit.num_qubits());
    print_result("Classical bits", circuit.num_cbits());
    print_result("Operations", circuit.len());
    print_result("Mode", format!("{:?}", config.mode));
    print_result("Precompute", config.precompute_unitary);
    print_result(
        "Input state",
        format!("{:.4} |0⟩ + {:.4} |1⟩", input.amplitude(0), input.amplitude(1)),
    );

    let mut sim = CircuitSimulator::new(&circuit, config)?;

    print_section("Branch Enumeration");
    let stats = sim.run_statistics(initial.clone())?;
    let mut total = 0.0;
    for i in 0..stats.len() {
        let (Some(state), Some(p), Some(cbits)) =
            (stats.final_state(i), stats.probability(i), stats.cbits(i))
        else {
            continue;
        };
        let teleported = state.to_density().ptrace(&[2])?;
        print_result(
            &format!("Outcome {}", format_cbits(cbits)),
            format!(
                "p = {p:.4}, distance to input = {:.2e}",
                teleported.distance(&target)
            ),
        );
        total += p;
    }
    print_result("Total probability", format!("{total:.6}"));

    print_section("Sampled Runs");
    let pb = create_progress_bar(args.shots, "shots");
    let mut counts: BTreeMap<String, u64> = BTreeMap::new();
    let mut worst: f64 = 0.0;
    for _ in 0..args.shots {
        let result = sim.run_with_rng(initial.clone(), &mut rng)?;
        if let (Some(state), Some(cbits)) = (result.final_state(0), result.cbits(0)) {
            *counts.entry(format_cbits(cbits)).or_insert(0) += 1;
            let teleported = state.to_density().ptrace(&[2])?;
            worst = worst.max(teleported.distance(&target));
        }
        pb.inc(1);
    }
    pb.finish_and_clear();

    for (bits, n) in &counts {
        print_result(&format!("Outcome {bits}"), format!("{n} / {}", args.shots));
    }
    print_result("Worst distance to input", format!("{worst:.2e}"));

    println!();
    if worst < FIDELITY_TOLERANCE {
        print_success("Every shot reproduced the input state on qubit 2");
    } else {
        print_failure("Teleported state differs from the input");
    }
    Ok(())
}
