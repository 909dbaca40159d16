// ares_core/src/pose.rs

use serde::Deserialize;

use crate::errors::PerceptionError;

/// The rover's pose as reported by the state collaborator each cycle.
///
/// Position is in world-grid units; all angles are degrees wrapping in
/// [0, 360). Pitch and roll are nominally 0 when the chassis is level.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct RoverPose {
    /// World x position.
    pub x: f64,
    /// World y position.
    pub y: f64,
    /// Heading, degrees.
    pub yaw: f64,
    /// Forward tilt, degrees.
    pub pitch: f64,
    /// Lateral tilt, degrees.
    pub roll: f64,
}

impl RoverPose {
    pub fn new(x: f64, y: f64, yaw: f64, pitch: f64, roll: f64) -> Self {
        Self {
            x,
            y,
            yaw,
            pitch,
            roll,
        }
    }

    /// Rejects poses containing NaN or infinity. The geometry downstream
    /// would silently smear such values across the world map.
    pub fn validate(&self) -> Result<(), PerceptionError> {
        let values = [self.x, self.y, self.yaw, self.pitch, self.roll];
        if values.iter().any(|v| !v.is_finite()) {
            return Err(PerceptionError::InvalidInput(format!(
                "pose contains non-finite values: {self:?}"
            )));
        }
        Ok(())
    }

    /// Pitch magnitude normalized against the 0-360 wrap: a reading of
    /// 370 and a reading of 10 both mean 10 degrees off level.
    #[inline]
    pub fn pitch_off_level(&self) -> f64 {
        wrap_magnitude(self.pitch)
    }

    /// Roll magnitude normalized against the 0-360 wrap.
    #[inline]
    pub fn roll_off_level(&self) -> f64 {
        wrap_magnitude(self.roll)
    }
}

#[inline]
fn wrap_magnitude(angle_deg: f64) -> f64 {
    angle_deg.abs().min((angle_deg - 360.0).abs())
}
