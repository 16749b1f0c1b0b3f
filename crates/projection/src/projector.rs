//! Projection of kinematic states and direction vectors onto the screen.
//!
//! All functions are pure. A stale transform yields a stale position, never
//! an error.

use nalgebra::{Point2, Vector2};
use posecore::KinematicState;

use crate::transform::ViewTransform;

/// Screen-space vector (px), +Y down
pub type PixelVector = Vector2<f64>;

/// Projected robot pose
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PixelPose {
    /// Screen position of the robot center (px)
    pub position: Point2<f64>,
    /// Heading measured in screen axes (rad). Field headings are CCW with +Y
    /// up, so this is the negated field heading.
    pub heading: f64,
}

impl PixelPose {
    /// Unit vector along the heading in screen axes
    pub fn forward(&self) -> PixelVector {
        Vector2::new(self.heading.cos(), self.heading.sin())
    }
}

/// Map a state's field-frame pose to screen pixels.
pub fn project(state: &KinematicState, transform: &ViewTransform) -> PixelPose {
    PixelPose {
        position: project_point(state.x, state.y, transform),
        heading: -state.theta,
    }
}

/// Map a field-frame point (m) to screen pixels.
pub fn project_point(x: f64, y: f64, transform: &ViewTransform) -> Point2<f64> {
    Point2::new(
        transform.offset_x + x * transform.scale,
        transform.offset_y - y * transform.scale,
    )
}

/// Inverse of [`project_point`]: screen pixels back to field meters.
pub fn unproject(px: f64, py: f64, transform: &ViewTransform) -> (f64, f64) {
    (
        (px - transform.offset_x) / transform.scale,
        (transform.offset_y - py) / transform.scale,
    )
}

/// Map a field-frame displacement (m) to a screen displacement (px).
///
/// Offsets do not apply to vectors; only scale and the Y flip do.
pub fn project_vector(dx: f64, dy: f64, transform: &ViewTransform) -> PixelVector {
    Vector2::new(dx * transform.scale, -dy * transform.scale)
}

/// Rescale `v` to exactly `length` px; degenerate vectors map to zero.
pub fn scale_to_length(v: PixelVector, length: f64) -> PixelVector {
    let norm = v.norm();
    if norm <= f64::EPSILON || !norm.is_finite() {
        return Vector2::zeros();
    }
    v * (length / norm)
}

/// Shorten `v` to at most `max_length` px.
pub fn clamp_length(v: PixelVector, max_length: f64) -> PixelVector {
    let norm = v.norm();
    if norm > max_length {
        scale_to_length(v, max_length)
    } else {
        v
    }
}
