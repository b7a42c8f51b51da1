//! qcirc demo suite.
//!
//! Shared circuits and terminal output for the demo binaries:
//!
//! - **demo-teleport**: quantum teleportation with mid-circuit measurements,
//!   sampled shot by shot and enumerated branch by branch
//! - **demo-resolve**: rewriting a circuit into a chosen gate basis and
//!   checking that the unitary survived

pub mod circuits;

use std::collections::BTreeMap;

use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use qcirc_ir::QubitCircuit;
use tracing_subscriber::EnvFilter;

/// Install a `tracing` subscriber for `-v` style verbosity counts.
pub fn init_logging(verbose: u8) {
    let filter = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .with_target(false)
        .init();
}

/// Create a progress bar for demo operations.
pub fn create_progress_bar(len: u64, message: &str) -> ProgressBar {
    let pb = ProgressBar::new(len);
    let template = ProgressStyle::with_template(
        "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}",
    )
    .unwrap_or_else(|_| ProgressStyle::default_bar());
    pb.set_style(template.progress_chars("#>-"));
    pb.set_message(message.to_string());
    pb
}

/// Print a demo header.
pub fn print_header(title: &str) {
    println!();
    println!("{}", style("═".repeat(60)).cyan());
    println!("{}", style(format!("  {title}")).cyan().bold());
    println!("{}", style("═".repeat(60)).cyan());
    println!();
}

/// Print a demo section.
pub fn print_section(title: &str) {
    println!();
    println!("{}", style(format!("▶ {title}")).green().bold());
    println!("{}", style("─".repeat(40)).dim());
}

/// Print a result line.
pub fn print_result(label: &str, value: impl std::fmt::Display) {
    println!("  {} {}", style(format!("{label}:")).dim(), value);
}

/// Print a success message.
pub fn print_success(message: &str) {
    println!("{} {}", style("✓").green().bold(), message);
}

/// Print a failure message.
pub fn print_failure(message: &str) {
    println!("{} {}", style("✗").red().bold(), message);
}

/// Render a classical register, `-` for unwritten bits.
pub fn format_cbits(cbits: &[Option<u8>]) -> String {
    cbits
        .iter()
        .map(|bit| bit.map_or_else(|| "-".to_string(), |b| b.to_string()))
        .collect()
}

/// Number of gates per name, measurements included.
pub fn gate_counts(circuit: &QubitCircuit) -> BTreeMap<String, usize> {
    let mut counts = BTreeMap::new();
    for op in circuit.operations() {
        *counts.entry(op.name().to_string()).or_insert(0) += 1;
    }
    counts
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_cbits() {
        assert_eq!(format_cbits(&[Some(1), None, Some(0)]), "1-0");
        assert_eq!(format_cbits(&[]), "");
    }

    #[test]
    fn test_gate_counts() {
        let mut qc = QubitCircuit::with_cbits(2, 1);
        qc.snot(0).unwrap();
        qc.snot(1).unwrap();
        qc.cnot(0, 1).unwrap();
        qc.measure(0, 0).unwrap();
        let counts = gate_counts(&qc);
        assert_eq!(counts["SNOT"], 2);
        assert_eq!(counts["CNOT"], 1);
        assert_eq!(counts["M0"], 1);
    }
}
