//! Field-frame to screen-pixel mapping.
//!
//! The field frame is in meters with its origin at the bottom-left corner of
//! the field image and +Y pointing up. Pixels grow to the right and *down*,
//! so every mapping here flips the vertical axis.

pub mod geometry;
pub mod projector;
pub mod transform;

pub use geometry::FieldGeometry;
pub use projector::{
    clamp_length, project, project_point, project_vector, scale_to_length, unproject, PixelPose,
    PixelVector,
};
pub use transform::{PixelRect, ViewTransform, MIN_FIT_FACTOR};
