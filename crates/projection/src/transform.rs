use serde::{Deserialize, Serialize};

use crate::geometry::FieldGeometry;

/// Smallest image scale a transform will use; keeps a collapsed window from
/// producing a zero or negative pixels-per-meter.
pub const MIN_FIT_FACTOR: f64 = 0.01;

/// Axis-aligned screen rectangle (px)
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct PixelRect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl PixelRect {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self { x, y, width, height }
    }

    /// Rectangle anchored at the origin
    pub fn sized(width: f64, height: f64) -> Self {
        Self::new(0.0, 0.0, width, height)
    }

    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }

    pub fn contains(&self, px: f64, py: f64) -> bool {
        px >= self.x && px <= self.right() && py >= self.y && py <= self.bottom()
    }
}

/// Affine map from field meters to screen pixels.
///
/// `(offset_x, offset_y)` is where the field origin lands on screen, i.e.
/// the bottom-left corner of the drawn field image.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ViewTransform {
    /// Screen pixels per field meter
    pub scale: f64,
    pub offset_x: f64,
    pub offset_y: f64,
}

impl ViewTransform {
    pub fn new(scale: f64, offset_x: f64, offset_y: f64) -> Self {
        Self { scale, offset_x, offset_y }
    }

    /// The image drawn at native size in the top-left corner.
    pub fn baseline(geometry: &FieldGeometry) -> Self {
        Self::new(geometry.pixels_per_meter, 0.0, geometry.image_height_px)
    }

    /// Letterbox the field image into `viewport`, keeping its aspect ratio.
    pub fn fit(geometry: &FieldGeometry, viewport: PixelRect) -> Self {
        let fit = (viewport.width / geometry.image_width_px)
            .min(viewport.height / geometry.image_height_px)
            .max(MIN_FIT_FACTOR);

        let drawn_w = geometry.image_width_px * fit;
        let drawn_h = geometry.image_height_px * fit;
        let left = viewport.x + (viewport.width.max(0.0) - drawn_w) / 2.0;
        let top = viewport.y + (viewport.height.max(0.0) - drawn_h) / 2.0;

        Self::new(geometry.pixels_per_meter * fit, left, top + drawn_h)
    }

    /// How much the image is magnified relative to native size
    pub fn fit_factor(&self, geometry: &FieldGeometry) -> f64 {
        self.scale / geometry.pixels_per_meter
    }

    /// Where the field image is drawn on screen
    pub fn image_rect(&self, geometry: &FieldGeometry) -> PixelRect {
        let fit = self.fit_factor(geometry);
        let width = geometry.image_width_px * fit;
        let height = geometry.image_height_px * fit;
        PixelRect::new(self.offset_x, self.offset_y - height, width, height)
    }
}

impl Default for ViewTransform {
    fn default() -> Self {
        Self::baseline(&FieldGeometry::default())
    }
}
