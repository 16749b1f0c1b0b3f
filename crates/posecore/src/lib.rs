//! Shared data model for the field pose display.
//!
//! Every other crate in the workspace speaks in these types: raw telemetry
//! samples as they arrive from the source, and the fully populated kinematic
//! state that rendering consumes.

pub mod angle;
pub mod error;
pub mod state;

pub use angle::{angle_difference, wrap_angle};
pub use error::SampleError;
pub use state::{KinematicState, RawSample};
