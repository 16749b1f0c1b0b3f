//! Field image asset.

use std::path::{Path, PathBuf};

use egui::ColorImage;
use image::{Rgba, RgbaImage};
use log::{info, warn};
use projection::FieldGeometry;

use crate::config::FieldConfig;
use crate::error::{AppError, Result};

const GRASS: Rgba<u8> = Rgba([34, 139, 34, 255]);
const LINE: Rgba<u8> = Rgba([255, 255, 255, 255]);
const MARKER: Rgba<u8> = Rgba([255, 255, 0, 255]);

const BORDER_PX: f64 = 3.0;
const CENTER_LINE_PX: f64 = 2.0;
const MARKER_RADIUS_PX: f64 = 20.0;
const MARKER_RING_PX: f64 = 2.0;

/// Decoded field image, ready to upload as a texture
#[derive(Debug, Clone)]
pub struct FieldImage {
    image: RgbaImage,
    source: Option<PathBuf>,
}

impl FieldImage {
    /// Configured image, or a placeholder when none is configured.
    ///
    /// A configured image that cannot be read is an error, not a fallback.
    pub fn from_config(config: &FieldConfig) -> Result<Self> {
        match &config.image {
            Some(path) => {
                let field = Self::load(path)?;
                field.check_size(&config.geometry);
                Ok(field)
            }
            None => {
                info!("No field image configured, drawing placeholder field");
                Ok(Self::placeholder(&config.geometry))
            }
        }
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let image = image::open(path)
            .map_err(|source| AppError::Asset {
                path: path.to_path_buf(),
                source,
            })?
            .into_rgba8();
        info!(
            "Loaded field image {} ({}x{})",
            path.display(),
            image.width(),
            image.height()
        );
        Ok(Self {
            image,
            source: Some(path.to_path_buf()),
        })
    }

    /// Green field with a border, a center line and corner markers
    pub fn placeholder(geometry: &FieldGeometry) -> Self {
        let width = geometry.image_width_px.round().max(1.0) as u32;
        let height = geometry.image_height_px.round().max(1.0) as u32;
        let (w, h) = (width as f64, height as f64);
        let corners = [(0.0, 0.0), (w, 0.0), (0.0, h), (w, h)];

        let image = RgbaImage::from_fn(width, height, |px, py| {
            let (x, y) = (px as f64 + 0.5, py as f64 + 0.5);
            let on_marker = corners.iter().any(|&(cx, cy)| {
                let d = (x - cx).hypot(y - cy);
                d <= MARKER_RADIUS_PX && d > MARKER_RADIUS_PX - MARKER_RING_PX
            });
            let on_border = x < BORDER_PX || y < BORDER_PX || x > w - BORDER_PX || y > h - BORDER_PX;
            let on_center_line = (y - h / 2.0).abs() < CENTER_LINE_PX / 2.0;

            if on_marker {
                MARKER
            } else if on_border || on_center_line {
                LINE
            } else {
                GRASS
            }
        });

        Self { image, source: None }
    }

    /// Path the image came from; `None` for the placeholder
    pub fn source(&self) -> Option<&Path> {
        self.source.as_deref()
    }

    pub fn size(&self) -> [usize; 2] {
        [self.image.width() as usize, self.image.height() as usize]
    }

    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        self.image.get_pixel_checked(x, y).map(|p| p.0)
    }

    pub fn to_color_image(&self) -> ColorImage {
        ColorImage::from_rgba_unmultiplied(self.size(), self.image.as_raw())
    }

    /// The image is always stretched over the configured field size, so a
    /// mismatch only distorts it.
    fn check_size(&self, geometry: &FieldGeometry) {
        let [w, h] = self.size();
        if (w as f64 - geometry.image_width_px).abs() >= 1.0
            || (h as f64 - geometry.image_height_px).abs() >= 1.0
        {
            warn!(
                "Field image is {}x{} but the field is configured as {}x{} px; scaling to fit",
                w, h, geometry.image_width_px, geometry.image_height_px
            );
        }
    }
}
