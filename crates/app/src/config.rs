//! Display configuration
//!
//! Every section has defaults, so a config file only needs the values it
//! changes:
//!
//! ```json
//! {
//!   "field": { "image": "assets/field.png" },
//!   "estimator": { "smoothing_time_constant": 0.1 },
//!   "telemetry": { "source": "simulated" }
//! }
//! ```

use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use estimation::EstimatorConfig;
use log::LevelFilter;
use projection::FieldGeometry;
use serde::{Deserialize, Serialize};
use telemetry::{ReceiverConfig, SimulationConfig};

use crate::error::{AppError, Result};

/// Top-level configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub field: FieldConfig,
    pub estimator: EstimatorConfig,
    pub render: RenderConfig,
    pub telemetry: TelemetryConfig,
    pub logging: LoggingConfig,
}

impl AppConfig {
    /// Load from a JSON file; missing sections and fields take defaults.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| AppError::ConfigRead {
            path: path.to_path_buf(),
            source,
        })?;
        let config: Self = serde_json::from_str(&content).map_err(|source| AppError::ConfigParse {
            path: path.to_path_buf(),
            source,
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Reject values the display cannot work with.
    pub fn validate(&self) -> Result<()> {
        let g = &self.field.geometry;
        let positive = [
            ("field.geometry.image_width_px", g.image_width_px),
            ("field.geometry.image_height_px", g.image_height_px),
            ("field.geometry.pixels_per_meter", g.pixels_per_meter),
            ("render.target_fps", self.render.target_fps),
        ];
        for (name, value) in positive {
            if !(value.is_finite() && value > 0.0) {
                return Err(AppError::InvalidConfig(format!("{name} must be positive, got {value}")));
            }
        }
        if self.estimator.staleness_threshold <= 0.0 {
            return Err(AppError::InvalidConfig(format!(
                "estimator.staleness_threshold must be positive, got {}",
                self.estimator.staleness_threshold
            )));
        }
        self.logging.level_filter()?;
        Ok(())
    }
}

/// Field image and its physical dimensions
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FieldConfig {
    /// Field image (PNG or JPEG). Without one a placeholder field is drawn.
    pub image: Option<PathBuf>,
    pub geometry: FieldGeometry,
}

/// Marker and indicator sizing
///
/// Pixel lengths are given at the image's native size and scale with the
/// window like the field image does.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    pub target_fps: f64,
    /// Draw the robot inside the field even when its pose is outside
    pub clamp_to_field: bool,
    /// Overlay visibility at startup
    pub overlay_visible: bool,
    /// Heading arrow length as a fraction of the robot length
    pub heading_length_ratio: f64,
    pub velocity_px_per_mps: f64,
    pub velocity_max_px: f64,
    /// Speeds below this draw no velocity arrow (m/s)
    pub velocity_min_mps: f64,
    /// Speeds above this get a label (m/s)
    pub velocity_label_mps: f64,
    pub rotation_px_per_radps: f64,
    pub rotation_max_px: f64,
    /// Rates below this draw no rotation arrow (rad/s)
    pub rotation_min_radps: f64,
    /// Rates above this get a label (deg/s)
    pub rotation_label_degps: f64,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            target_fps: 60.0,
            clamp_to_field: true,
            overlay_visible: true,
            heading_length_ratio: 0.7,
            velocity_px_per_mps: 100.0,
            velocity_max_px: 300.0,
            velocity_min_mps: 0.01,
            velocity_label_mps: 0.1,
            rotation_px_per_radps: 30.0,
            rotation_max_px: 120.0,
            rotation_min_radps: 0.1,
            rotation_label_degps: 15.0,
        }
    }
}

impl RenderConfig {
    pub fn frame_interval(&self) -> Duration {
        Duration::from_secs_f64(1.0 / self.target_fps.max(1.0))
    }
}

/// Where samples come from
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    /// JSON datagrams received over UDP
    #[default]
    Udp,
    /// In-process simulated path
    Simulated,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TelemetryConfig {
    pub source: SourceKind,
    pub receiver: ReceiverConfig,
    pub simulation: SimulationConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// off, error, warn, info, debug or trace
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self { level: "info".to_string() }
    }
}

impl LoggingConfig {
    pub fn level_filter(&self) -> Result<LevelFilter> {
        LevelFilter::from_str(&self.level)
            .map_err(|_| AppError::InvalidConfig(format!("unknown log level '{}'", self.level)))
    }
}
