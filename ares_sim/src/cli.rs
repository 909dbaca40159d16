// ares_sim/src/cli.rs

use clap::Parser;
use std::path::PathBuf;

/// Ares: a headless scenario harness for the rover perception stack.
///
/// This struct defines the command-line arguments that can be passed to
/// the simulator binary.
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// The path to the scenario TOML file to run.
    #[arg(short, long, default_value = "scenarios/flat_plain.toml")]
    pub scenario: PathBuf,

    /// Override the scenario's cycle count.
    #[arg(long)]
    pub cycles: Option<u64>,

    /// List the scenario files found under the scenario directory and exit.
    #[arg(long)]
    pub list: bool,

    /// Directory searched by --list.
    #[arg(long, default_value = "scenarios")]
    pub scenario_dir: PathBuf,
}
