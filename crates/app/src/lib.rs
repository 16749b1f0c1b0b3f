//! Live robot pose display
//!
//! Wires a telemetry source through the estimator and projector into an
//! egui window. The pieces that do not need a window (configuration,
//! overlay text, scene building) are usable and testable on their own.

pub mod app;
pub mod config;
pub mod error;
pub mod field;
pub mod overlay;
pub mod render;
pub mod scene;

pub use app::{DisplayPipeline, FieldDisplayApp};
pub use config::{AppConfig, LoggingConfig, RenderConfig, SourceKind, TelemetryConfig};
pub use error::{AppError, Result};
pub use field::FieldImage;
pub use overlay::OverlayState;
pub use scene::{build_scene, Scene, SceneShape};
