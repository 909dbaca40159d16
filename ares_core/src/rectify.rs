// ares_core/src/rectify.rs

use nalgebra::{Matrix3, SMatrix, SVector};
use serde::Deserialize;

use crate::errors::PerceptionError;
use crate::frame::{Rgb, RgbFrame};

/// A quadrilateral as four (x, y) pixel corners.
pub type Quad = [[f64; 2]; 4];

/// The fixed camera-to-top-down calibration for one camera geometry.
///
/// The source quad is measured once on a calibration frame (the corners of
/// a known ground square as the camera sees them). The destination quad is
/// derived from it: a square of side `2 * dest_half_width` anchored at the
/// bottom-center of the frame, lifted by `bottom_offset` so the rover's own
/// chassis footprint sits just below the warped image.
#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CameraGeometry {
    /// Expected camera frame width, pixels.
    #[serde(default = "default_frame_width")]
    pub frame_width: usize,
    /// Expected camera frame height, pixels.
    #[serde(default = "default_frame_height")]
    pub frame_height: usize,
    /// Ground-square corners in the raw camera frame.
    #[serde(default = "default_source_quad")]
    pub source_quad: Quad,
    /// Half the side length of the destination square, pixels.
    #[serde(default = "default_dest_half_width")]
    pub dest_half_width: f64,
    /// Gap between the destination square and the bottom frame edge, pixels.
    #[serde(default = "default_bottom_offset")]
    pub bottom_offset: f64,
}

impl Default for CameraGeometry {
    fn default() -> Self {
        Self {
            frame_width: default_frame_width(),
            frame_height: default_frame_height(),
            source_quad: default_source_quad(),
            dest_half_width: default_dest_half_width(),
            bottom_offset: default_bottom_offset(),
        }
    }
}

impl CameraGeometry {
    /// The top-down destination quad, in the same corner order as
    /// `source_quad`: bottom-left, bottom-right, top-right, top-left.
    pub fn dest_quad(&self) -> Quad {
        let w = self.frame_width as f64;
        let h = self.frame_height as f64;
        let s = self.dest_half_width;
        let b = self.bottom_offset;
        [
            [w / 2.0 - s, h - b],
            [w / 2.0 + s, h - b],
            [w / 2.0 + s, h - 2.0 * s - b],
            [w / 2.0 - s, h - 2.0 * s - b],
        ]
    }
}

fn default_frame_width() -> usize {
    320
}

fn default_frame_height() -> usize {
    160
}

fn default_source_quad() -> Quad {
    [
        [14.0, 140.0],
        [301.0, 140.0],
        [200.0, 96.0],
        [118.0, 96.0],
    ]
}

fn default_dest_half_width() -> f64 {
    5.0
}

fn default_bottom_offset() -> f64 {
    6.0
}

// =========================================================================
// == Perspective Rectifier ==
// =========================================================================

/// Warps raw camera frames into a fixed top-down view.
///
/// Both homographies are solved once at construction; `rectify` is a pure
/// function of the frame from then on.
#[derive(Debug, Clone)]
pub struct PerspectiveRectifier {
    geometry: CameraGeometry,
    /// Maps source-frame points to top-down points.
    forward: Matrix3<f64>,
    /// Maps top-down points back into the source frame (used for warping).
    inverse: Matrix3<f64>,
}

impl PerspectiveRectifier {
    pub fn new(geometry: CameraGeometry) -> Result<Self, PerceptionError> {
        let dest = geometry.dest_quad();
        let forward = compute_homography(&geometry.source_quad, &dest)?;
        let inverse = compute_homography(&dest, &geometry.source_quad)?;
        Ok(Self {
            geometry,
            forward,
            inverse,
        })
    }

    pub fn geometry(&self) -> &CameraGeometry {
        &self.geometry
    }

    /// Maps a source-frame point into the top-down view.
    #[inline]
    pub fn transform_point(&self, x: f64, y: f64) -> (f64, f64) {
        apply_homography(&self.forward, x, y)
    }

    /// Warps `frame` into the top-down view, keeping its dimensions.
    ///
    /// Each output pixel is inverse-mapped into the source frame and
    /// bilinearly sampled per channel. Output pixels whose preimage falls
    /// outside the source frame are black (0,0,0); with the default
    /// thresholds, black is below the obstacle bound on every channel, so
    /// out-of-view borders classify as obstacle.
    pub fn rectify(&self, frame: &RgbFrame) -> RgbFrame {
        let width = frame.width();
        let height = frame.height();
        let mut warped = RgbFrame::new(width, height);

        // Preimages within a sub-pixel tolerance of the frame boundary are
        // snapped onto it; the homography solve carries rounding error and
        // a border row must not flicker between fill and terrain.
        const EDGE_TOLERANCE: f64 = 1e-6;
        let max_x = (width - 1) as f64;
        let max_y = (height - 1) as f64;

        for row in 0..height {
            for col in 0..width {
                let (sx, sy) = apply_homography(&self.inverse, col as f64, row as f64);
                if sx >= -EDGE_TOLERANCE
                    && sx <= max_x + EDGE_TOLERANCE
                    && sy >= -EDGE_TOLERANCE
                    && sy <= max_y + EDGE_TOLERANCE
                {
                    let sx = sx.clamp(0.0, max_x);
                    let sy = sy.clamp(0.0, max_y);
                    warped.set(row, col, sample_bilinear(frame, sx, sy));
                }
            }
        }
        warped
    }
}

/// Solves the 3x3 homography mapping `src` corners onto `dst` corners with
/// the Direct Linear Transform: eight equations in the eight unknowns
/// h0..h7, with h8 fixed to 1.
fn compute_homography(src: &Quad, dst: &Quad) -> Result<Matrix3<f64>, PerceptionError> {
    let mut a = SMatrix::<f64, 8, 8>::zeros();
    let mut b = SVector::<f64, 8>::zeros();

    for i in 0..4 {
        let [x, y] = src[i];
        let [xp, yp] = dst[i];

        let r = 2 * i;
        a[(r, 0)] = x;
        a[(r, 1)] = y;
        a[(r, 2)] = 1.0;
        a[(r, 6)] = -xp * x;
        a[(r, 7)] = -xp * y;
        b[r] = xp;

        a[(r + 1, 3)] = x;
        a[(r + 1, 4)] = y;
        a[(r + 1, 5)] = 1.0;
        a[(r + 1, 6)] = -yp * x;
        a[(r + 1, 7)] = -yp * y;
        b[r + 1] = yp;
    }

    let h = a.lu().solve(&b).ok_or_else(|| {
        PerceptionError::DegenerateQuad(format!(
            "no homography maps {src:?} onto {dst:?} (collinear or duplicate corners?)"
        ))
    })?;

    Ok(Matrix3::new(
        h[0], h[1], h[2], //
        h[3], h[4], h[5], //
        h[6], h[7], 1.0,
    ))
}

#[inline]
fn apply_homography(h: &Matrix3<f64>, x: f64, y: f64) -> (f64, f64) {
    let w = h[(2, 0)] * x + h[(2, 1)] * y + h[(2, 2)];
    let hx = h[(0, 0)] * x + h[(0, 1)] * y + h[(0, 2)];
    let hy = h[(1, 0)] * x + h[(1, 1)] * y + h[(1, 2)];
    (hx / w, hy / w)
}

/// Bilinear sample of an RGB frame at fractional (x, y). Coordinates must
/// already be inside [0, width-1] x [0, height-1]; the bottom/right edge
/// neighbors clamp onto the edge pixel.
fn sample_bilinear(frame: &RgbFrame, x: f64, y: f64) -> Rgb {
    let x0 = x.floor() as usize;
    let y0 = y.floor() as usize;
    let x1 = (x0 + 1).min(frame.width() - 1);
    let y1 = (y0 + 1).min(frame.height() - 1);
    let fx = x - x0 as f64;
    let fy = y - y0 as f64;

    let p00 = frame.get(y0, x0);
    let p10 = frame.get(y0, x1);
    let p01 = frame.get(y1, x0);
    let p11 = frame.get(y1, x1);

    let mut out = [0u8; 3];
    for c in 0..3 {
        let v = (1.0 - fx) * (1.0 - fy) * p00[c] as f64
            + fx * (1.0 - fy) * p10[c] as f64
            + (1.0 - fx) * fy * p01[c] as f64
            + fx * fy * p11[c] as f64;
        out[c] = v.round().clamp(0.0, 255.0) as u8;
    }
    out
}
