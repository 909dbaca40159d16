// ares_sim/src/lib.rs

// The harness stands in for the rover-state collaborator: it feeds the
// perception core synthetic frames and a scripted pose, and owns the
// world map across cycles.
pub mod cli;
pub mod runner;
pub mod scenario;
pub mod synth;

use thiserror::Error;

/// Errors the harness can produce around the perception core.
#[derive(Debug, Error)]
pub enum SimError {
    #[error("failed to load scenario: {0}")]
    Config(#[from] figment::Error),

    #[error("invalid scenario: {0}")]
    InvalidScenario(String),

    #[error(transparent)]
    Perception(#[from] ares_core::errors::PerceptionError),
}
