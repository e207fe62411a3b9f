use clap::Parser;
use std::path::PathBuf;

/// Rolls a kinematic bicycle model through a scenario and prints the
/// ground-truth states and simulated sensor measurements as CSV.
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// The path to the scenario TOML file to run.
    #[arg(short, long, default_value = "assets/scenarios/straight_line.toml")]
    pub scenario: PathBuf,

    /// Overrides the seed from the scenario file.
    #[arg(long)]
    pub seed: Option<u64>,

    /// Write the CSV trace to this file instead of stdout.
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}
