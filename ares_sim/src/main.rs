// ares_sim/src/main.rs

use clap::Parser;
use std::path::Path;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;
use walkdir::WalkDir;

use ares_sim::cli::Cli;
use ares_sim::runner;
use ares_sim::scenario::ScenarioConfig;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    if cli.list {
        list_scenarios(&cli.scenario_dir);
        return;
    }

    let mut config = match ScenarioConfig::load(&cli.scenario) {
        Ok(config) => config,
        Err(e) => {
            error!(scenario = %cli.scenario.display(), error = %e, "could not load scenario");
            std::process::exit(1);
        }
    };
    if let Some(cycles) = cli.cycles {
        config.simulation.cycles = cycles;
    }

    info!(
        scenario = %cli.scenario.display(),
        cycles = config.simulation.cycles,
        world_size = config.simulation.world_size,
        "starting run"
    );
    if let Err(e) = runner::run(&config) {
        error!(error = %e, "run failed");
        std::process::exit(1);
    }
}

/// Prints every scenario TOML found under `dir`.
fn list_scenarios(dir: &Path) {
    let mut found = false;
    for entry in WalkDir::new(dir).into_iter().filter_map(Result::ok) {
        if entry.file_type().is_file()
            && entry.path().extension().is_some_and(|ext| ext == "toml")
        {
            println!("{}", entry.path().display());
            found = true;
        }
    }
    if !found {
        eprintln!("no scenario files under {}", dir.display());
    }
}
