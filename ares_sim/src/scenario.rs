// ares_sim/src/scenario.rs

//! Scenario loading: everything a run needs, parsed from one TOML file.

use figment::{
    providers::{Format, Toml},
    Figment,
};
use serde::Deserialize;
use std::path::Path;

use ares_core::prelude::PerceptionConfig;

use crate::SimError;

/// The root of a scenario file. Every section may be omitted; the defaults
/// describe a flat sandy plain with sparse rocks.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields, default)]
pub struct ScenarioConfig {
    pub simulation: Simulation,
    pub trajectory: Trajectory,
    pub terrain: TerrainConfig,
    /// The perception stack's own configuration, embedded verbatim.
    pub perception: PerceptionConfig,
}

impl ScenarioConfig {
    /// Loads and validates a scenario from a TOML file.
    pub fn load(path: &Path) -> Result<Self, SimError> {
        let config: ScenarioConfig = Figment::new().merge(Toml::file(path)).extract()?;
        config.validate()?;
        Ok(config)
    }

    /// Range checks figment cannot express.
    pub fn validate(&self) -> Result<(), SimError> {
        if self.simulation.world_size == 0 {
            return Err(SimError::InvalidScenario(
                "simulation.world_size must be at least 1".into(),
            ));
        }
        if !(self.terrain.ground_stddev.is_finite() && self.terrain.ground_stddev >= 0.0) {
            return Err(SimError::InvalidScenario(
                "terrain.ground_stddev must be finite and non-negative".into(),
            ));
        }
        if !(self.trajectory.tilt_noise.is_finite() && self.trajectory.tilt_noise >= 0.0) {
            return Err(SimError::InvalidScenario(
                "trajectory.tilt_noise must be finite and non-negative".into(),
            ));
        }
        for (name, p) in [
            ("terrain.rock_density", self.terrain.rock_density),
            ("terrain.sample_density", self.terrain.sample_density),
        ] {
            if !(0.0..=1.0).contains(&p) {
                return Err(SimError::InvalidScenario(format!(
                    "{name} must lie in [0, 1], got {p}"
                )));
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Simulation {
    /// Seed for the pseudo-random number generator. Omit for a
    /// nondeterministic run.
    pub seed: Option<u64>,
    /// Number of perception cycles to run.
    #[serde(default = "default_cycles")]
    pub cycles: u64,
    /// Side length of the world map grid.
    #[serde(default = "default_world_size")]
    pub world_size: usize,
}

impl Default for Simulation {
    fn default() -> Self {
        Self {
            seed: None,
            cycles: default_cycles(),
            world_size: default_world_size(),
        }
    }
}

fn default_cycles() -> u64 {
    100
}

fn default_world_size() -> usize {
    200
}

/// A scripted constant-rate drive: the rover advances along its heading
/// every cycle while the heading drifts, tracing an arc across the map.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Trajectory {
    /// Starting world position (x, y).
    #[serde(default = "default_start")]
    pub start: [f64; 2],
    /// Starting heading, degrees.
    #[serde(default)]
    pub yaw_start: f64,
    /// Forward speed, world cells per cycle.
    #[serde(default = "default_speed")]
    pub speed: f64,
    /// Heading drift, degrees per cycle.
    #[serde(default = "default_yaw_rate")]
    pub yaw_rate: f64,
    /// Standard deviation of the per-cycle pitch/roll jitter, degrees.
    /// Spikes past the mapper's attitude limit produce skipped map
    /// updates, like a rover rocking over rubble.
    #[serde(default = "default_tilt_noise")]
    pub tilt_noise: f64,
}

impl Default for Trajectory {
    fn default() -> Self {
        Self {
            start: default_start(),
            yaw_start: 0.0,
            speed: default_speed(),
            yaw_rate: default_yaw_rate(),
            tilt_noise: default_tilt_noise(),
        }
    }
}

fn default_start() -> [f64; 2] {
    [100.0, 100.0]
}

fn default_speed() -> f64 {
    0.4
}

fn default_yaw_rate() -> f64 {
    1.0
}

fn default_tilt_noise() -> f64 {
    0.15
}

/// Parameters for the synthetic camera view.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TerrainConfig {
    /// Rows above this line show distant crater wall instead of ground.
    #[serde(default = "default_horizon_row")]
    pub horizon_row: usize,
    /// Mean brightness of sandy ground pixels.
    #[serde(default = "default_ground_mean")]
    pub ground_mean: f64,
    /// Brightness jitter of ground pixels.
    #[serde(default = "default_ground_stddev")]
    pub ground_stddev: f64,
    /// Per-pixel probability of a dark rock speckle.
    #[serde(default = "default_rock_density")]
    pub rock_density: f64,
    /// Per-pixel probability of a yellow sample speckle.
    #[serde(default = "default_sample_density")]
    pub sample_density: f64,
}

impl Default for TerrainConfig {
    fn default() -> Self {
        Self {
            horizon_row: default_horizon_row(),
            ground_mean: default_ground_mean(),
            ground_stddev: default_ground_stddev(),
            rock_density: default_rock_density(),
            sample_density: default_sample_density(),
        }
    }
}

fn default_horizon_row() -> usize {
    95
}

fn default_ground_mean() -> f64 {
    195.0
}

fn default_ground_stddev() -> f64 {
    12.0
}

fn default_rock_density() -> f64 {
    0.02
}

fn default_sample_density() -> f64 {
    0.001
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_figment_gives_defaults() {
        let config: ScenarioConfig = Figment::new().extract().unwrap();
        assert_eq!(config.simulation.cycles, 100);
        assert_eq!(config.simulation.world_size, 200);
        assert_eq!(config.trajectory.start, [100.0, 100.0]);
        assert_eq!(config.perception.camera.frame_width, 320);
    }

    #[test]
    fn shipped_scenarios_load() {
        for name in ["scenarios/flat_plain.toml", "scenarios/rubble_field.toml"] {
            let config = ScenarioConfig::load(Path::new(name)).unwrap();
            assert!(config.simulation.cycles > 0, "{name}");
        }
    }

    #[test]
    fn toml_overrides_selected_fields() {
        let config: ScenarioConfig = Figment::new()
            .merge(Toml::string(
                r#"
                [simulation]
                seed = 7
                cycles = 12

                [terrain]
                rock_density = 0.2

                [perception.mapper]
                scale = 20.0
                "#,
            ))
            .extract()
            .unwrap();
        assert_eq!(config.simulation.seed, Some(7));
        assert_eq!(config.simulation.cycles, 12);
        assert_eq!(config.terrain.rock_density, 0.2);
        assert_eq!(config.perception.mapper.scale, 20.0);
        // Untouched sections keep their defaults.
        assert_eq!(config.perception.mapper.attitude_limit_deg, 0.4);
        assert_eq!(config.trajectory.speed, 0.4);
    }
}
