// ares_core/src/prelude.rs

// --- Core Abstractions (The main contracts of the library) ---
pub use crate::classify::Classifier;
pub use crate::errors::PerceptionError;
pub use crate::pipeline::{PerceptionConfig, PerceptionOutput, PerceptionPipeline};

// --- Core Data Structures (The "nouns" of the library) ---
pub use crate::coords::{PixelCloud, PolarCloud};
pub use crate::frame::{BinaryMask, Rgb, RgbFrame};
pub use crate::mapping::{TerrainLayer, WorldMap};
pub use crate::pose::RoverPose;

// --- Concrete Stages (Export common ones for convenience) ---
pub use crate::classify::{NavigableClassifier, ObstacleClassifier, SampleClassifier};
pub use crate::mapping::WorldMapper;
pub use crate::rectify::{CameraGeometry, PerspectiveRectifier, Quad};
