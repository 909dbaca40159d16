// ares_core/src/mapping/mod.rs

use nalgebra::DMatrix;
use serde::Deserialize;

use crate::coords::PixelCloud;
use crate::pose::RoverPose;

// =========================================================================
// == World Map ==
// =========================================================================

/// The three terrain layers the map accumulates independently.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TerrainLayer {
    Obstacle,
    Sample,
    Navigable,
}

/// The mission-lifetime terrain map: a fixed-size square grid of hit
/// counters, one counter set per [`TerrainLayer`].
///
/// Counters build statistical confidence over repeated observations; they
/// are incremented, never overwritten, and the core never shrinks or resets
/// the map. Increments saturate rather than wrap. Cells are addressed as
/// (wx, wy) world coordinates; storage is row = wy, column = wx.
#[derive(Debug, Clone, PartialEq)]
pub struct WorldMap {
    size: usize,
    obstacle: DMatrix<u32>,
    sample: DMatrix<u32>,
    navigable: DMatrix<u32>,
}

impl WorldMap {
    /// Creates an empty square map with the given side length.
    ///
    /// # Panics
    /// Panics if `size` is 0.
    pub fn new(size: usize) -> Self {
        assert!(size > 0, "world map side length must be at least 1");
        Self {
            size,
            obstacle: DMatrix::zeros(size, size),
            sample: DMatrix::zeros(size, size),
            navigable: DMatrix::zeros(size, size),
        }
    }

    /// Side length of the square grid.
    #[inline]
    pub fn size(&self) -> usize {
        self.size
    }

    /// The hit count for `layer` at world cell (wx, wy).
    #[inline]
    pub fn count(&self, layer: TerrainLayer, wx: usize, wy: usize) -> u32 {
        self.layer(layer)[(wy, wx)]
    }

    /// Saturating increment of `layer` at world cell (wx, wy).
    #[inline]
    pub fn increment(&mut self, layer: TerrainLayer, wx: usize, wy: usize) {
        let cell = &mut self.layer_mut(layer)[(wy, wx)];
        *cell = cell.saturating_add(1);
    }

    /// Number of cells in `layer` observed at least once.
    pub fn observed_cells(&self, layer: TerrainLayer) -> usize {
        self.layer(layer).iter().filter(|&&c| c > 0).count()
    }

    fn layer(&self, layer: TerrainLayer) -> &DMatrix<u32> {
        match layer {
            TerrainLayer::Obstacle => &self.obstacle,
            TerrainLayer::Sample => &self.sample,
            TerrainLayer::Navigable => &self.navigable,
        }
    }

    fn layer_mut(&mut self, layer: TerrainLayer) -> &mut DMatrix<u32> {
        match layer {
            TerrainLayer::Obstacle => &mut self.obstacle,
            TerrainLayer::Sample => &mut self.sample,
            TerrainLayer::Navigable => &mut self.navigable,
        }
    }
}

// =========================================================================
// == World Mapper ==
// =========================================================================

/// Projects rover-centric point clouds into the world map.
///
/// Per cycle the mapper rotates each point by the rover's yaw, translates
/// by its world position (with a pixel-to-grid scale divide), truncates,
/// clips into map bounds, and bumps the hit counters. The whole update is
/// gated on chassis attitude: rectification geometry assumes a level
/// camera, so a tilted chassis means the projected points are wrong and
/// the cycle is skipped for all layers.
#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct WorldMapper {
    /// Rectified pixels per world-grid cell.
    #[serde(default = "default_scale")]
    pub scale: f64,
    /// Pitch/roll magnitude (degrees off level) beyond which a cycle's map
    /// update is skipped.
    #[serde(default = "default_attitude_limit")]
    pub attitude_limit_deg: f64,
}

impl Default for WorldMapper {
    fn default() -> Self {
        Self {
            scale: default_scale(),
            attitude_limit_deg: default_attitude_limit(),
        }
    }
}

fn default_scale() -> f64 {
    10.0
}

fn default_attitude_limit() -> f64 {
    0.4
}

impl WorldMapper {
    /// Whether the chassis is level enough for this cycle's observations
    /// to be trusted. Pitch and roll are wrap-normalized first, so a
    /// reading of 359.9 degrees counts as 0.1 degrees off level.
    pub fn attitude_stable(&self, pose: &RoverPose) -> bool {
        pose.pitch_off_level() < self.attitude_limit_deg
            && pose.roll_off_level() < self.attitude_limit_deg
    }

    /// Rotates a rover-centric point by the pose's yaw and translates it
    /// into scaled world coordinates, truncated to integers (unclipped).
    #[inline]
    pub fn to_world(&self, x: f64, y: f64, pose: &RoverPose) -> (i64, i64) {
        let yaw = pose.yaw.to_radians();
        let (sin, cos) = yaw.sin_cos();
        let xr = x * cos - y * sin;
        let yr = x * sin + y * cos;
        let wx = (pose.x + xr / self.scale) as i64;
        let wy = (pose.y + yr / self.scale) as i64;
        (wx, wy)
    }

    /// Projects `cloud` into `map`, incrementing `layer`'s counters.
    ///
    /// Points are clipped into `[0, size - 1]` on both axes, so every
    /// finite input lands somewhere on the map. Multiple points landing in
    /// the same cell each increment it; that duplication is the signal.
    /// If the pose fails the attitude gate the map is left untouched.
    pub fn accumulate(
        &self,
        cloud: &PixelCloud,
        pose: &RoverPose,
        map: &mut WorldMap,
        layer: TerrainLayer,
    ) {
        if !self.attitude_stable(pose) {
            return;
        }
        let bound = (map.size() - 1) as i64;
        for (&x, &y) in cloud.x.iter().zip(cloud.y.iter()) {
            let (wx, wy) = self.to_world(x, y, pose);
            let wx = wx.clamp(0, bound) as usize;
            let wy = wy.clamp(0, bound) as usize;
            map.increment(layer, wx, wy);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn level_pose(x: f64, y: f64, yaw: f64) -> RoverPose {
        RoverPose::new(x, y, yaw, 0.0, 0.0)
    }

    fn single_point(x: f64, y: f64) -> PixelCloud {
        PixelCloud {
            x: vec![x],
            y: vec![y],
        }
    }

    #[test]
    fn rotation_at_zero_yaw_is_identity() {
        let mapper = WorldMapper {
            scale: 1.0,
            ..WorldMapper::default()
        };
        let pose = level_pose(0.0, 0.0, 0.0);
        let (wx, wy) = mapper.to_world(7.0, -3.0, &pose);
        assert_eq!((wx, wy), (7, -3));
    }

    #[test]
    fn rotation_at_90_degrees_sends_forward_to_left() {
        let mapper = WorldMapper {
            scale: 1.0,
            ..WorldMapper::default()
        };
        // +x forward rotated by 90 degrees of yaw lands on +y.
        let pose = level_pose(0.0, 0.0, 90.0);
        let yaw = 90.0f64.to_radians();
        let xr = 10.0 * yaw.cos();
        let yr = 10.0 * yaw.sin();
        assert_abs_diff_eq!(xr, 0.0, epsilon = 1e-12);
        assert_abs_diff_eq!(yr, 10.0, epsilon = 1e-12);
        let (wx, wy) = mapper.to_world(10.0, 0.0, &pose);
        assert_eq!(wx, 0);
        // Truncation may land on 9 or 10 depending on the last ulp of
        // sin(pi/2); accept either side of the cell boundary.
        assert!(wy == 9 || wy == 10, "wy = {wy}");
    }

    #[test]
    fn clipping_keeps_points_on_the_map() {
        let mapper = WorldMapper::default();
        let mut map = WorldMap::new(200);
        // Far beyond the top-right corner, and behind the origin.
        let cloud = PixelCloud {
            x: vec![100_000.0, -100_000.0],
            y: vec![100_000.0, -100_000.0],
        };
        mapper.accumulate(&cloud, &level_pose(100.0, 100.0, 0.0), &mut map, TerrainLayer::Navigable);
        assert_eq!(map.count(TerrainLayer::Navigable, 199, 199), 1);
        assert_eq!(map.count(TerrainLayer::Navigable, 0, 0), 1);
    }

    #[test]
    fn clipping_holds_for_size_one_map() {
        let mapper = WorldMapper::default();
        let mut map = WorldMap::new(1);
        mapper.accumulate(
            &single_point(123.4, -567.8),
            &level_pose(0.0, 0.0, 37.0),
            &mut map,
            TerrainLayer::Obstacle,
        );
        assert_eq!(map.count(TerrainLayer::Obstacle, 0, 0), 1);
    }

    #[test]
    fn wrapped_pitch_skips_the_update() {
        let mapper = WorldMapper::default();
        let mut map = WorldMap::new(200);
        // 370 degrees normalizes to 10 degrees off level: well over 0.4.
        let pose = RoverPose::new(100.0, 100.0, 0.0, 370.0, 0.0);
        mapper.accumulate(&single_point(10.0, 0.0), &pose, &mut map, TerrainLayer::Navigable);
        assert_eq!(map.observed_cells(TerrainLayer::Navigable), 0);
    }

    #[test]
    fn slight_pitch_allows_the_update() {
        let mapper = WorldMapper::default();
        let mut map = WorldMap::new(200);
        let pose = RoverPose::new(100.0, 100.0, 0.0, 0.1, 0.0);
        mapper.accumulate(&single_point(10.0, 0.0), &pose, &mut map, TerrainLayer::Navigable);
        assert_eq!(map.count(TerrainLayer::Navigable, 101, 100), 1);
    }

    #[test]
    fn repeated_accumulation_increments_by_two() {
        let mapper = WorldMapper::default();
        let mut map = WorldMap::new(200);
        let pose = level_pose(100.0, 100.0, 0.0);
        let cloud = single_point(50.0, 0.0);
        mapper.accumulate(&cloud, &pose, &mut map, TerrainLayer::Sample);
        mapper.accumulate(&cloud, &pose, &mut map, TerrainLayer::Sample);
        assert_eq!(map.count(TerrainLayer::Sample, 105, 100), 2);
        assert_eq!(map.observed_cells(TerrainLayer::Sample), 1);
        // Other layers untouched.
        assert_eq!(map.observed_cells(TerrainLayer::Navigable), 0);
        assert_eq!(map.observed_cells(TerrainLayer::Obstacle), 0);
    }

    #[test]
    fn layers_accumulate_independently() {
        let mapper = WorldMapper::default();
        let mut map = WorldMap::new(50);
        let pose = level_pose(10.0, 10.0, 0.0);
        let cloud = single_point(0.0, 0.0);
        mapper.accumulate(&cloud, &pose, &mut map, TerrainLayer::Obstacle);
        mapper.accumulate(&cloud, &pose, &mut map, TerrainLayer::Navigable);
        assert_eq!(map.count(TerrainLayer::Obstacle, 10, 10), 1);
        assert_eq!(map.count(TerrainLayer::Navigable, 10, 10), 1);
        assert_eq!(map.count(TerrainLayer::Sample, 10, 10), 0);
    }
}
