//! Scene building: everything drawn in one frame, as plain data.
//!
//! [`build_scene`] is pure; painting the result is the only step that needs
//! a window. Markers and overlay text are kept apart so hiding the overlay
//! never changes what is drawn for the robot.

use std::f64::consts::FRAC_PI_2;

use egui::{Align2, Color32};
use nalgebra::{Point2, Rotation2, Vector2};
use posecore::KinematicState;
use projection::{
    clamp_length, project_point, project_vector, scale_to_length, FieldGeometry, PixelRect,
    PixelVector, ViewTransform,
};

use crate::config::RenderConfig;
use crate::overlay::{OverlayState, HIDE_HINT, SHOW_HINT};

pub const ROBOT_COLOR: Color32 = Color32::from_rgb(0, 120, 255);
pub const ROBOT_OUTLINE: Color32 = Color32::WHITE;
pub const HEADING_COLOR: Color32 = Color32::from_rgb(255, 0, 0);
pub const VELOCITY_COLOR: Color32 = Color32::from_rgb(0, 255, 0);
pub const ROTATION_COLOR: Color32 = Color32::from_rgb(200, 0, 255);
pub const CENTER_COLOR: Color32 = Color32::from_rgb(255, 255, 0);
pub const TEXT_COLOR: Color32 = Color32::BLACK;

pub const TEXT_SIZE: f32 = 22.0;
pub const SMALL_TEXT_SIZE: f32 = 16.0;

/// Arrowhead barbs sit this far either side of the reversed shaft (rad)
const ARROWHEAD_ANGLE: f64 = 0.75 * std::f64::consts::PI;

/// One drawing primitive in screen pixels
#[derive(Debug, Clone, PartialEq)]
pub enum SceneShape {
    Polygon {
        points: Vec<Point2<f64>>,
        fill: Color32,
        outline: Color32,
        outline_width: f32,
    },
    Segment {
        from: Point2<f64>,
        to: Point2<f64>,
        width: f32,
        color: Color32,
    },
    Circle {
        center: Point2<f64>,
        radius: f64,
        color: Color32,
    },
    Text {
        position: Point2<f64>,
        anchor: Align2,
        text: String,
        size: f32,
        color: Color32,
        background: Option<Color32>,
    },
}

impl SceneShape {
    fn text(position: Point2<f64>, text: impl Into<String>, size: f32, color: Color32) -> Self {
        SceneShape::Text {
            position,
            anchor: Align2::LEFT_TOP,
            text: text.into(),
            size,
            color,
            background: None,
        }
    }
}

/// Everything to draw for one frame, back to front
#[derive(Debug, Clone, PartialEq)]
pub struct Scene {
    /// Where the field image goes
    pub field: PixelRect,
    /// Robot marker and motion indicators
    pub markers: Vec<SceneShape>,
    /// Telemetry text, drawn last
    pub overlay: Vec<SceneShape>,
}

impl Scene {
    /// All shapes in paint order
    pub fn shapes(&self) -> impl Iterator<Item = &SceneShape> {
        self.markers.iter().chain(self.overlay.iter())
    }
}

/// Build the frame for `state` under `transform`.
///
/// Never fails: the default state draws at the field origin and a degenerate
/// transform only shrinks the drawing.
pub fn build_scene(
    state: &KinematicState,
    transform: &ViewTransform,
    geometry: &FieldGeometry,
    overlay: &OverlayState,
    config: &RenderConfig,
) -> Scene {
    let field = transform.image_rect(geometry);
    Scene {
        field,
        markers: build_markers(state, transform, geometry, config),
        overlay: build_overlay(overlay, transform, field),
    }
}

fn build_markers(
    state: &KinematicState,
    transform: &ViewTransform,
    geometry: &FieldGeometry,
    config: &RenderConfig,
) -> Vec<SceneShape> {
    let fit = transform.fit_factor(geometry);
    let (x, y) = if config.clamp_to_field {
        geometry.clamp_to_field(state.x, state.y)
    } else {
        (state.x, state.y)
    };
    let center = project_point(x, y, transform);
    // Screen Y points down, so screen angles are the negated field angles
    let heading = Rotation2::new(-state.theta);

    let mut shapes = Vec::with_capacity(12);

    let half_length = geometry.robot_length_m * transform.scale / 2.0;
    let half_width = geometry.robot_width_m * transform.scale / 2.0;
    let corners = [
        (-half_length, -half_width),
        (half_length, -half_width),
        (half_length, half_width),
        (-half_length, half_width),
    ];
    shapes.push(SceneShape::Polygon {
        points: corners
            .iter()
            .map(|&(lx, ly)| center + heading * Vector2::new(lx, ly))
            .collect(),
        fill: ROBOT_COLOR,
        outline: ROBOT_OUTLINE,
        outline_width: 2.0,
    });

    let heading_length = config.heading_length_ratio * geometry.robot_length_m * transform.scale;
    push_arrow(
        &mut shapes,
        center,
        heading * Vector2::x() * heading_length,
        12.0 * fit,
        line_width(4.0, fit),
        HEADING_COLOR,
    );

    let speed = state.speed();
    if speed.is_finite() && speed >= config.velocity_min_mps {
        let per_meter = config.velocity_px_per_mps * fit / transform.scale;
        let shaft = clamp_length(
            project_vector(state.vx, state.vy, transform) * per_meter,
            config.velocity_max_px * fit,
        );
        push_arrow(&mut shapes, center, shaft, 15.0 * fit, line_width(5.0, fit), VELOCITY_COLOR);
        if speed > config.velocity_label_mps {
            shapes.push(SceneShape::text(
                center + shaft + Vector2::new(10.0, -20.0),
                format!("{speed:.2} m/s"),
                SMALL_TEXT_SIZE,
                VELOCITY_COLOR,
            ));
        }
    }

    let omega = state.omega;
    if omega.is_finite() && omega.abs() >= config.rotation_min_radps {
        // Left of the heading for CCW, right for CW
        let side = if omega > 0.0 { FRAC_PI_2 } else { -FRAC_PI_2 };
        let direction = Rotation2::new(-(state.theta + side)) * Vector2::x();
        let length = (omega.abs() * config.rotation_px_per_radps * fit).min(config.rotation_max_px * fit);
        let shaft = scale_to_length(direction, length);
        push_arrow(&mut shapes, center, shaft, 15.0 * fit, line_width(5.0, fit), ROTATION_COLOR);

        let degrees = omega.abs().to_degrees();
        if degrees > config.rotation_label_degps {
            let turn = if omega > 0.0 { "CCW" } else { "CW" };
            shapes.push(SceneShape::text(
                center + shaft + Vector2::new(10.0, -20.0),
                format!("{degrees:.0}°/s {turn}"),
                SMALL_TEXT_SIZE,
                ROTATION_COLOR,
            ));
        }
    }

    shapes.push(SceneShape::Circle {
        center,
        radius: (5.0 * fit).max(1.0),
        color: CENTER_COLOR,
    });

    shapes
}

fn line_width(native: f64, fit: f64) -> f32 {
    (native * fit).max(1.0) as f32
}

/// Shaft from `tail` along `shaft` with a two-barb head at the tip.
fn push_arrow(
    shapes: &mut Vec<SceneShape>,
    tail: Point2<f64>,
    shaft: PixelVector,
    head_length: f64,
    width: f32,
    color: Color32,
) {
    let tip = tail + shaft;
    shapes.push(SceneShape::Segment { from: tail, to: tip, width, color });

    let barb = scale_to_length(shaft, head_length);
    for angle in [ARROWHEAD_ANGLE, -ARROWHEAD_ANGLE] {
        shapes.push(SceneShape::Segment {
            from: tip,
            to: tip + Rotation2::new(angle) * barb,
            width,
            color,
        });
    }
}

fn build_overlay(overlay: &OverlayState, transform: &ViewTransform, field: PixelRect) -> Vec<SceneShape> {
    let origin = Point2::new(field.x, field.y);

    if !overlay.visible() {
        return vec![SceneShape::Text {
            position: origin + Vector2::new(20.0, 15.0),
            anchor: Align2::LEFT_TOP,
            text: SHOW_HINT.to_string(),
            size: SMALL_TEXT_SIZE,
            color: Color32::from_gray(150),
            background: Some(Color32::from_black_alpha(150)),
        }];
    }

    let mut shapes = Vec::with_capacity(8);
    let mut y = 20.0;
    for line in overlay.lines() {
        shapes.push(SceneShape::text(origin + Vector2::new(20.0, y), line, TEXT_SIZE, TEXT_COLOR));
        y += 35.0;
    }
    shapes.push(SceneShape::text(
        origin + Vector2::new(20.0, y),
        HIDE_HINT,
        SMALL_TEXT_SIZE,
        Color32::from_gray(180),
    ));
    shapes.push(SceneShape::text(
        Point2::new(field.right() - 100.0, field.y + 20.0),
        overlay.fps_line(),
        SMALL_TEXT_SIZE,
        TEXT_COLOR,
    ));
    shapes.push(SceneShape::text(
        Point2::new(field.right() - 180.0, field.bottom() - 30.0),
        format!("Scale: {:.2} px/m", transform.scale),
        SMALL_TEXT_SIZE,
        Color32::from_gray(200),
    ));
    shapes
}
