// ares_sim/src/synth.rs

//! Synthetic camera frames: a sandy plain under a dark crater wall, with
//! rock and sample speckles. Crude, but it exercises every classifier band
//! and keeps runs deterministic under a seeded PRNG.

use rand::Rng;
use rand_distr::{Distribution, Normal};

use ares_core::prelude::{CameraGeometry, Rgb, RgbFrame};

use crate::scenario::TerrainConfig;

const WALL_MEAN: f64 = 90.0;
const WALL_STDDEV: f64 = 18.0;
const ROCK_MEAN: f64 = 70.0;
const ROCK_STDDEV: f64 = 15.0;

/// Generates one camera frame per cycle from terrain parameters.
#[derive(Debug, Clone)]
pub struct TerrainSynthesizer {
    config: TerrainConfig,
    ground: Normal<f64>,
    wall: Normal<f64>,
    rock: Normal<f64>,
}

impl TerrainSynthesizer {
    /// Stddevs are validated at scenario load, so the distributions here
    /// cannot fail to construct.
    pub fn new(config: TerrainConfig) -> Self {
        let ground = Normal::new(config.ground_mean, config.ground_stddev).unwrap();
        let wall = Normal::new(WALL_MEAN, WALL_STDDEV).unwrap();
        let rock = Normal::new(ROCK_MEAN, ROCK_STDDEV).unwrap();
        Self {
            config,
            ground,
            wall,
            rock,
        }
    }

    /// Renders the camera view for one cycle.
    pub fn frame(&self, geometry: &CameraGeometry, rng: &mut impl Rng) -> RgbFrame {
        let width = geometry.frame_width;
        let height = geometry.frame_height;
        let mut frame = RgbFrame::new(width, height);
        for row in 0..height {
            for col in 0..width {
                let px = if row < self.config.horizon_row {
                    gray(self.wall.sample(rng))
                } else if rng.gen_bool(self.config.sample_density) {
                    sample_rock(rng)
                } else if rng.gen_bool(self.config.rock_density) {
                    gray(self.rock.sample(rng))
                } else {
                    gray(self.ground.sample(rng))
                };
                frame.set(row, col, px);
            }
        }
        frame
    }
}

#[inline]
fn gray(v: f64) -> Rgb {
    let v = v.clamp(0.0, 255.0).round() as u8;
    [v, v, v]
}

/// A pixel inside the yellow sample signature band.
fn sample_rock(rng: &mut impl Rng) -> Rgb {
    let rg = rng.gen_range(120..180u8);
    let b = rng.gen_range(5..45u8);
    [rg, rg, b]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scenario::TerrainConfig;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn same_seed_renders_the_same_frame() {
        let synth = TerrainSynthesizer::new(TerrainConfig::default());
        let geometry = CameraGeometry::default();
        let a = synth.frame(&geometry, &mut ChaCha8Rng::seed_from_u64(9));
        let b = synth.frame(&geometry, &mut ChaCha8Rng::seed_from_u64(9));
        assert_eq!(a, b);
    }

    #[test]
    fn ground_is_bright_and_wall_is_dark() {
        let config = TerrainConfig {
            rock_density: 0.0,
            sample_density: 0.0,
            ..TerrainConfig::default()
        };
        let horizon = config.horizon_row;
        let synth = TerrainSynthesizer::new(config);
        let geometry = CameraGeometry::default();
        let frame = synth.frame(&geometry, &mut ChaCha8Rng::seed_from_u64(1));

        let mut ground_bright = 0usize;
        let mut ground_total = 0usize;
        let mut wall_dark = 0usize;
        let mut wall_total = 0usize;
        for (row, _, px) in frame.pixels() {
            if row < horizon {
                wall_total += 1;
                if px[0] < 160 {
                    wall_dark += 1;
                }
            } else {
                ground_total += 1;
                if px[0] > 160 {
                    ground_bright += 1;
                }
            }
        }
        // Within a couple of sigma, the vast majority lands on the right
        // side of the classifier bound.
        assert!(ground_bright * 10 > ground_total * 9);
        assert!(wall_dark * 10 > wall_total * 9);
    }
}
