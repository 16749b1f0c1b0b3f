use serde::{Deserialize, Serialize};

/// Physical description of the field image and the robot drawn on it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FieldGeometry {
    /// Native width of the field image (px)
    pub image_width_px: f64,
    /// Native height of the field image (px)
    pub image_height_px: f64,
    /// Image pixels per field meter at native size
    pub pixels_per_meter: f64,
    /// Robot footprint along its heading (m)
    pub robot_length_m: f64,
    /// Robot footprint across its heading (m)
    pub robot_width_m: f64,
}

impl Default for FieldGeometry {
    fn default() -> Self {
        // 16.46 m x 8.23 m field rendered at 1340 x 670
        FieldGeometry {
            image_width_px: 1340.0,
            image_height_px: 670.0,
            pixels_per_meter: 81.41,
            robot_length_m: 0.81,
            robot_width_m: 0.61,
        }
    }
}

impl FieldGeometry {
    /// Geometry for an image of the given native size
    pub fn with_image_size(mut self, width_px: f64, height_px: f64) -> Self {
        self.image_width_px = width_px;
        self.image_height_px = height_px;
        self
    }

    pub fn with_robot(mut self, length_m: f64, width_m: f64) -> Self {
        self.robot_length_m = length_m;
        self.robot_width_m = width_m;
        self
    }

    /// Field extent along X (m)
    pub fn width_m(&self) -> f64 {
        self.image_width_px / self.pixels_per_meter
    }

    /// Field extent along Y (m)
    pub fn height_m(&self) -> f64 {
        self.image_height_px / self.pixels_per_meter
    }

    pub fn aspect_ratio(&self) -> f64 {
        self.image_width_px / self.image_height_px
    }

    /// Half the robot's diagonal; the farthest any corner reaches from its center.
    pub fn robot_half_diagonal(&self) -> f64 {
        self.robot_length_m.hypot(self.robot_width_m) / 2.0
    }

    /// Pull a robot position inside the field so every corner stays visible.
    ///
    /// Only used for drawing; the estimated state is never clamped.
    pub fn clamp_to_field(&self, x: f64, y: f64) -> (f64, f64) {
        let margin = self.robot_half_diagonal();
        let clamp = |v: f64, extent: f64| {
            if extent <= 2.0 * margin {
                extent / 2.0
            } else {
                v.max(margin).min(extent - margin)
            }
        };
        (clamp(x, self.width_m()), clamp(y, self.height_m()))
    }
}
