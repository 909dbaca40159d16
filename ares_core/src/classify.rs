// ares_core/src/classify.rs

use dyn_clone::DynClone;
use serde::Deserialize;
use std::fmt::Debug;

use crate::frame::{BinaryMask, RgbFrame};

/// A per-channel threshold triple, (red, green, blue).
pub type RgbTriple = [u8; 3];

/// The contract for any terrain classifier over a rectified frame.
///
/// Classifiers are strictly per-cell: a cell's label depends only on its own
/// color, never on its neighbors. Implementations carry their thresholds as
/// configuration with documented defaults.
pub trait Classifier: Send + Sync + DynClone + Debug {
    /// Produces a binary mask of the same extent as `frame`.
    fn classify(&self, frame: &RgbFrame) -> BinaryMask;
}

// Make the trait object cloneable.
dyn_clone::clone_trait_object!(Classifier);

/// Labels navigable ground: every channel strictly above its bound.
///
/// A bound of 160 on all three channels does a good job of picking out the
/// sandy ground against crater walls and rocks.
#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct NavigableClassifier {
    #[serde(default = "default_ground_bound")]
    pub min: RgbTriple,
}

impl Default for NavigableClassifier {
    fn default() -> Self {
        Self {
            min: default_ground_bound(),
        }
    }
}

impl Classifier for NavigableClassifier {
    fn classify(&self, frame: &RgbFrame) -> BinaryMask {
        let mut mask = BinaryMask::new(frame.width(), frame.height());
        for (row, col, px) in frame.pixels() {
            if px[0] > self.min[0] && px[1] > self.min[1] && px[2] > self.min[2] {
                mask.set(row, col);
            }
        }
        mask
    }
}

/// Labels obstacles: every channel strictly below its bound.
///
/// Shares its default bound with [`NavigableClassifier`], which makes the
/// two masks mutually exclusive at every cell: strict `>` and strict `<`
/// against the same bound cannot both hold.
#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ObstacleClassifier {
    #[serde(default = "default_ground_bound")]
    pub max: RgbTriple,
}

impl Default for ObstacleClassifier {
    fn default() -> Self {
        Self {
            max: default_ground_bound(),
        }
    }
}

impl Classifier for ObstacleClassifier {
    fn classify(&self, frame: &RgbFrame) -> BinaryMask {
        let mut mask = BinaryMask::new(frame.width(), frame.height());
        for (row, col, px) in frame.pixels() {
            if px[0] < self.max[0] && px[1] < self.max[1] && px[2] < self.max[2] {
                mask.set(row, col);
            }
        }
        mask
    }
}

/// Labels target samples: every channel inside the half-open band
/// `[low, high)`. Defaults are tuned to the yellow rock color signature.
#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SampleClassifier {
    #[serde(default = "default_sample_low")]
    pub low: RgbTriple,
    #[serde(default = "default_sample_high")]
    pub high: RgbTriple,
}

impl Default for SampleClassifier {
    fn default() -> Self {
        Self {
            low: default_sample_low(),
            high: default_sample_high(),
        }
    }
}

impl Classifier for SampleClassifier {
    fn classify(&self, frame: &RgbFrame) -> BinaryMask {
        let mut mask = BinaryMask::new(frame.width(), frame.height());
        for (row, col, px) in frame.pixels() {
            let inside = self.low[0] <= px[0]
                && px[0] < self.high[0]
                && self.low[1] <= px[1]
                && px[1] < self.high[1]
                && self.low[2] <= px[2]
                && px[2] < self.high[2];
            if inside {
                mask.set(row, col);
            }
        }
        mask
    }
}

fn default_ground_bound() -> RgbTriple {
    [160, 160, 160]
}

fn default_sample_low() -> RgbTriple {
    [100, 100, 0]
}

fn default_sample_high() -> RgbTriple {
    [190, 190, 50]
}
