use serde::{Deserialize, Serialize};

use crate::angle::wrap_angle;
use crate::error::SampleError;

/// One pose sample as read from the telemetry source.
///
/// Rate fields are `None` when the source did not publish them, which is
/// distinct from a published zero: a missing rate has to be derived.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RawSample {
    /// Field-frame X position (m)
    pub x: f64,
    /// Field-frame Y position (m)
    pub y: f64,
    /// Heading (rad), any range
    pub theta: f64,
    /// Field-frame X velocity (m/s), if published
    pub vx: Option<f64>,
    /// Field-frame Y velocity (m/s), if published
    pub vy: Option<f64>,
    /// Angular rate (rad/s, CCW positive), if published
    pub omega: Option<f64>,
    /// Monotonic time of the sample (s)
    pub timestamp: f64,
}

impl RawSample {
    /// A pose-only sample; every rate must be derived.
    pub fn pose(x: f64, y: f64, theta: f64, timestamp: f64) -> Self {
        Self { x, y, theta, vx: None, vy: None, omega: None, timestamp }
    }

    /// Attach published linear velocity
    pub fn with_velocity(mut self, vx: f64, vy: f64) -> Self {
        self.vx = Some(vx);
        self.vy = Some(vy);
        self
    }

    /// Attach published angular rate
    pub fn with_omega(mut self, omega: f64) -> Self {
        self.omega = Some(omega);
        self
    }

    /// Rejects non-finite fields and coordinates beyond `max_abs_coordinate`.
    pub fn validate(&self, max_abs_coordinate: f64) -> Result<(), SampleError> {
        let required = [
            ("x", self.x),
            ("y", self.y),
            ("theta", self.theta),
            ("timestamp", self.timestamp),
        ];
        let optional = [("vx", self.vx), ("vy", self.vy), ("omega", self.omega)];

        let fields = required
            .into_iter()
            .chain(optional.into_iter().filter_map(|(name, v)| v.map(|v| (name, v))));
        for (field, value) in fields {
            if !value.is_finite() {
                return Err(SampleError::NonFinite { field, value });
            }
        }

        for (field, value) in [("x", self.x), ("y", self.y)] {
            if value.abs() > max_abs_coordinate {
                return Err(SampleError::OutOfRange {
                    field,
                    value,
                    limit: max_abs_coordinate,
                });
            }
        }
        Ok(())
    }
}

/// Fully populated kinematic state consumed by rendering.
///
/// `theta` is always wrapped into (-π, π].
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct KinematicState {
    pub x: f64,
    pub y: f64,
    pub theta: f64,
    pub vx: f64,
    pub vy: f64,
    pub omega: f64,
    pub timestamp: f64,
}

impl KinematicState {
    /// Builds a state, wrapping the heading.
    pub fn new(x: f64, y: f64, theta: f64, vx: f64, vy: f64, omega: f64, timestamp: f64) -> Self {
        Self { x, y, theta: wrap_angle(theta), vx, vy, omega, timestamp }
    }

    /// Linear speed (m/s)
    pub fn speed(&self) -> f64 {
        self.vx.hypot(self.vy)
    }

    /// Direction of travel (rad), meaningless at zero speed
    pub fn course(&self) -> f64 {
        self.vy.atan2(self.vx)
    }

    pub fn is_finite(&self) -> bool {
        [self.x, self.y, self.theta, self.vx, self.vy, self.omega, self.timestamp]
            .iter()
            .all(|v| v.is_finite())
    }
}
