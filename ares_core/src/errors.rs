// ares_core/src/errors.rs

use thiserror::Error;

/// Errors the perception core can produce.
///
/// The pipeline is designed to never fail on valid-shaped input; these
/// variants all describe caller contract violations detected up front.
#[derive(Debug, Error)]
pub enum PerceptionError {
    /// The caller handed us input the geometry cannot be trusted on:
    /// a zero-dimension frame, a frame that does not match the calibrated
    /// camera geometry, or a pose containing non-finite values.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// The four-point correspondence given for the perspective transform is
    /// degenerate (collinear or duplicate corners), so no homography exists.
    #[error("degenerate rectification quad: {0}")]
    DegenerateQuad(String),
}
