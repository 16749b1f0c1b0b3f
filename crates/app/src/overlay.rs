use posecore::KinematicState;

pub const HIDE_HINT: &str = "Press 'H' to hide";
pub const SHOW_HINT: &str = "Press 'H' to show telemetry";

/// Telemetry overlay: visibility plus the values it shows.
///
/// Lives for the whole process. Input toggles it, each tick refreshes it,
/// and the scene builder only reads it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OverlayState {
    visible: bool,
    state: KinematicState,
    fps: f64,
}

impl OverlayState {
    pub fn new(visible: bool) -> Self {
        Self {
            visible,
            ..Default::default()
        }
    }

    pub fn visible(&self) -> bool {
        self.visible
    }

    /// Flip visibility; returns the new value.
    pub fn toggle(&mut self) -> bool {
        self.visible = !self.visible;
        self.visible
    }

    pub fn refresh(&mut self, state: KinematicState) {
        self.state = state;
    }

    pub fn set_fps(&mut self, fps: f64) {
        self.fps = fps;
    }

    pub fn fps(&self) -> f64 {
        self.fps
    }

    pub fn state(&self) -> &KinematicState {
        &self.state
    }

    /// Telemetry lines in display order
    pub fn lines(&self) -> Vec<String> {
        let s = &self.state;
        vec![
            format!("X: {:.3} m", s.x),
            format!("Y: {:.3} m", s.y),
            format!("Theta: {:.2}°", s.theta.to_degrees().rem_euclid(360.0)),
            format!("Velocity: {:.3} m/s", s.speed()),
            format!("Rotational Velocity: {:.2} °/s", s.omega.to_degrees()),
        ]
    }

    pub fn fps_line(&self) -> String {
        format!("FPS: {:.1}", self.fps)
    }
}

/// Exponential moving average of the frame rate
#[derive(Debug, Clone, Copy, Default)]
pub struct FpsCounter {
    fps: f64,
}

impl FpsCounter {
    const SMOOTHING: f64 = 0.1;

    /// Record one frame that took `dt` seconds; returns the smoothed rate.
    pub fn tick(&mut self, dt: f64) -> f64 {
        if dt > 0.0 && dt.is_finite() {
            let instant = 1.0 / dt;
            self.fps = if self.fps == 0.0 {
                instant
            } else {
                self.fps + Self::SMOOTHING * (instant - self.fps)
            };
        }
        self.fps
    }
}
