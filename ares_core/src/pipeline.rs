// ares_core/src/pipeline.rs

use serde::Deserialize;

use crate::classify::{Classifier, NavigableClassifier, ObstacleClassifier, SampleClassifier};
use crate::coords::{rover_coords, to_polar, PolarCloud};
use crate::errors::PerceptionError;
use crate::frame::{BinaryMask, RgbFrame};
use crate::mapping::{TerrainLayer, WorldMap, WorldMapper};
use crate::pose::RoverPose;
use crate::rectify::{CameraGeometry, PerspectiveRectifier};

/// Everything the pipeline needs to run, with working defaults for the
/// stock camera calibration. Hosts load this from their scenario config or
/// construct it in code.
#[derive(Debug, Clone, Copy, Default, Deserialize)]
#[serde(deny_unknown_fields, default)]
pub struct PerceptionConfig {
    pub camera: CameraGeometry,
    pub navigable: NavigableClassifier,
    pub obstacle: ObstacleClassifier,
    pub sample: SampleClassifier,
    pub mapper: WorldMapper,
}

/// One cycle's perception result, handed back to the rover-state
/// collaborator. The world map is mutated in place through `process`, not
/// carried here.
#[derive(Debug, Clone)]
pub struct PerceptionOutput {
    /// Navigable-ground mask over the rectified frame.
    pub navigable_mask: BinaryMask,
    /// Obstacle mask over the rectified frame.
    pub obstacle_mask: BinaryMask,
    /// Sample-rock mask over the rectified frame.
    pub sample_mask: BinaryMask,
    /// Polar description of the navigable pixels.
    pub nav_polar: PolarCloud,
    /// Polar description of the sample pixels.
    pub sample_polar: PolarCloud,
    /// Whether this cycle passed the attitude gate and updated the map.
    pub map_updated: bool,
}

impl PerceptionOutput {
    /// The host's visualization composite: obstacle hits in the red
    /// channel, samples in green, navigable ground in blue, each scaled to
    /// the 0/255 display range.
    pub fn display_image(&self) -> RgbFrame {
        let red = self.obstacle_mask.to_display();
        let green = self.sample_mask.to_display();
        let blue = self.navigable_mask.to_display();
        let data = red
            .iter()
            .zip(&green)
            .zip(&blue)
            .map(|((&r, &g), &b)| [r, g, b])
            .collect();
        RgbFrame::from_vec(
            self.navigable_mask.width(),
            self.navigable_mask.height(),
            data,
        )
    }
}

/// The perception stage of the sense-plan-act loop.
///
/// Owns the precomputed rectifier, the three classifiers, and the world
/// mapper. Holds no per-cycle state; the caller owns the frame, the pose,
/// and the world map, and serializes cycles (single-writer map access).
#[derive(Debug, Clone)]
pub struct PerceptionPipeline {
    rectifier: PerspectiveRectifier,
    navigable: Box<dyn Classifier>,
    obstacle: Box<dyn Classifier>,
    sample: Box<dyn Classifier>,
    mapper: WorldMapper,
}

impl PerceptionPipeline {
    /// Builds the pipeline, solving the rectification homography once.
    pub fn new(config: PerceptionConfig) -> Result<Self, PerceptionError> {
        Ok(Self {
            rectifier: PerspectiveRectifier::new(config.camera)?,
            navigable: Box::new(config.navigable),
            obstacle: Box::new(config.obstacle),
            sample: Box::new(config.sample),
            mapper: config.mapper,
        })
    }

    pub fn geometry(&self) -> &CameraGeometry {
        self.rectifier.geometry()
    }

    /// Runs one perception cycle:
    /// rectify, classify, rover-centric conversion, then map accumulation
    /// (attitude-gated, all layers or none) and polar conversion.
    ///
    /// Fails with [`PerceptionError::InvalidInput`] on a frame that is
    /// empty or does not match the calibrated geometry, or on a pose with
    /// non-finite values.
    pub fn process(
        &self,
        frame: &RgbFrame,
        pose: &RoverPose,
        map: &mut WorldMap,
    ) -> Result<PerceptionOutput, PerceptionError> {
        self.validate_frame(frame)?;
        pose.validate()?;

        let warped = self.rectifier.rectify(frame);

        let navigable_mask = self.navigable.classify(&warped);
        let obstacle_mask = self.obstacle.classify(&warped);
        let sample_mask = self.sample.classify(&warped);

        let nav_points = rover_coords(&navigable_mask);
        let obstacle_points = rover_coords(&obstacle_mask);
        let sample_points = rover_coords(&sample_mask);

        let map_updated = self.mapper.attitude_stable(pose);
        if map_updated {
            self.mapper
                .accumulate(&obstacle_points, pose, map, TerrainLayer::Obstacle);
            self.mapper
                .accumulate(&sample_points, pose, map, TerrainLayer::Sample);
            self.mapper
                .accumulate(&nav_points, pose, map, TerrainLayer::Navigable);
        }

        Ok(PerceptionOutput {
            nav_polar: to_polar(&nav_points),
            sample_polar: to_polar(&sample_points),
            navigable_mask,
            obstacle_mask,
            sample_mask,
            map_updated,
        })
    }

    fn validate_frame(&self, frame: &RgbFrame) -> Result<(), PerceptionError> {
        if frame.width() == 0 || frame.height() == 0 {
            return Err(PerceptionError::InvalidInput(format!(
                "frame has zero dimension ({}x{})",
                frame.width(),
                frame.height()
            )));
        }
        let geometry = self.rectifier.geometry();
        if frame.width() != geometry.frame_width || frame.height() != geometry.frame_height {
            return Err(PerceptionError::InvalidInput(format!(
                "frame is {}x{} but the camera is calibrated for {}x{}",
                frame.width(),
                frame.height(),
                geometry.frame_width,
                geometry.frame_height
            )));
        }
        Ok(())
    }
}
