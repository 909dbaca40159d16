// ares_sim/src/runner.rs

//! Drives the perception core through a scripted run: synthesize a frame,
//! advance the pose, hand both to the pipeline, keep the map.

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use rand_distr::{Distribution, Normal};
use tracing::{debug, info};

use ares_core::prelude::{PerceptionPipeline, RoverPose, TerrainLayer, WorldMap};

use crate::scenario::ScenarioConfig;
use crate::synth::TerrainSynthesizer;
use crate::SimError;

/// A newtype wrapper around `ChaCha8Rng`: the central, deterministic
/// pseudo-random number generator for one run.
pub struct SimRng(pub ChaCha8Rng);

impl SimRng {
    pub fn from_seed(seed: Option<u64>) -> Self {
        match seed {
            Some(seed) => Self(ChaCha8Rng::seed_from_u64(seed)),
            None => Self(ChaCha8Rng::from_entropy()),
        }
    }
}

/// End-of-run summary.
#[derive(Debug, Clone, Copy, Default)]
pub struct RunStats {
    pub cycles: u64,
    pub map_updates: u64,
    pub skipped_updates: u64,
    pub navigable_cells: usize,
    pub obstacle_cells: usize,
    pub sample_cells: usize,
}

/// Runs a whole scenario and returns its summary statistics.
pub fn run(config: &ScenarioConfig) -> Result<RunStats, SimError> {
    let pipeline = PerceptionPipeline::new(config.perception)?;
    let mut map = WorldMap::new(config.simulation.world_size);
    let mut rng = SimRng::from_seed(config.simulation.seed);
    let synth = TerrainSynthesizer::new(config.terrain.clone());

    // tilt_noise is validated at scenario load.
    let tilt = Normal::new(0.0, config.trajectory.tilt_noise).unwrap();

    let trajectory = &config.trajectory;
    let bound = (config.simulation.world_size - 1) as f64;
    let mut x = trajectory.start[0].clamp(0.0, bound);
    let mut y = trajectory.start[1].clamp(0.0, bound);
    let mut yaw = trajectory.yaw_start.rem_euclid(360.0);

    let mut stats = RunStats::default();
    for cycle in 0..config.simulation.cycles {
        // Telemetry reports attitude wrapped into [0, 360), so a small
        // negative tilt arrives as a value just under 360.
        let pitch = tilt.sample(&mut rng.0).rem_euclid(360.0);
        let roll = tilt.sample(&mut rng.0).rem_euclid(360.0);
        let pose = RoverPose::new(x, y, yaw, pitch, roll);

        let frame = synth.frame(pipeline.geometry(), &mut rng.0);
        let output = pipeline.process(&frame, &pose, &mut map)?;

        stats.cycles += 1;
        if output.map_updated {
            stats.map_updates += 1;
        } else {
            stats.skipped_updates += 1;
        }
        debug!(
            cycle,
            x,
            y,
            yaw,
            nav_pixels = output.nav_polar.len(),
            sample_pixels = output.sample_polar.len(),
            map_updated = output.map_updated,
            "perception cycle"
        );

        // Advance the scripted drive.
        let yaw_rad = yaw.to_radians();
        x = (x + trajectory.speed * yaw_rad.cos()).clamp(0.0, bound);
        y = (y + trajectory.speed * yaw_rad.sin()).clamp(0.0, bound);
        yaw = (yaw + trajectory.yaw_rate).rem_euclid(360.0);
    }

    stats.navigable_cells = map.observed_cells(TerrainLayer::Navigable);
    stats.obstacle_cells = map.observed_cells(TerrainLayer::Obstacle);
    stats.sample_cells = map.observed_cells(TerrainLayer::Sample);
    info!(
        cycles = stats.cycles,
        map_updates = stats.map_updates,
        skipped = stats.skipped_updates,
        navigable_cells = stats.navigable_cells,
        obstacle_cells = stats.obstacle_cells,
        sample_cells = stats.sample_cells,
        "run complete"
    );
    Ok(stats)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scenario::ScenarioConfig;

    fn short_scenario(seed: u64) -> ScenarioConfig {
        let mut config = ScenarioConfig::default();
        config.simulation.seed = Some(seed);
        config.simulation.cycles = 5;
        config
    }

    #[test]
    fn short_run_covers_terrain() {
        let stats = run(&short_scenario(42)).unwrap();
        assert_eq!(stats.cycles, 5);
        assert_eq!(stats.map_updates + stats.skipped_updates, 5);
        // Synthetic terrain always shows ground and wall/border fill, so
        // any run with at least one level cycle observes both layers.
        if stats.map_updates > 0 {
            assert!(stats.navigable_cells > 0);
            assert!(stats.obstacle_cells > 0);
        }
    }

    #[test]
    fn seeded_runs_are_reproducible() {
        let a = run(&short_scenario(7)).unwrap();
        let b = run(&short_scenario(7)).unwrap();
        assert_eq!(a.navigable_cells, b.navigable_cells);
        assert_eq!(a.obstacle_cells, b.obstacle_cells);
        assert_eq!(a.map_updates, b.map_updates);
    }
}
