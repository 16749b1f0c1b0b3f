//! Kinematic state estimator
//!
//! Turns raw pose samples into complete kinematic states. Rates the source
//! publishes are taken verbatim; missing ones are finite-differenced against
//! the previous accepted state and low-pass filtered.

use log::{debug, warn};
use posecore::{angle_difference, wrap_angle, KinematicState, RawSample, SampleError};
use serde::{Deserialize, Serialize};

use crate::filter::RateFilter;

/// Configuration for the estimator
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EstimatorConfig {
    /// Time constant of the rate smoothing filter (s); 0 disables smoothing
    pub smoothing_time_constant: f64,
    /// Gaps longer than this hold the previous rates instead of differencing (s)
    pub staleness_threshold: f64,
    /// Gaps shorter than this are too small to difference reliably (s)
    pub min_dt: f64,
    /// Largest plausible |x| or |y| (m); anything beyond is rejected
    pub max_coordinate: f64,
}

impl Default for EstimatorConfig {
    fn default() -> Self {
        Self {
            smoothing_time_constant: 0.05,
            staleness_threshold: 2.0,
            min_dt: 1e-3,
            max_coordinate: 100.0,
        }
    }
}

impl EstimatorConfig {
    /// Set the smoothing time constant
    pub fn with_smoothing(mut self, time_constant: f64) -> Self {
        self.smoothing_time_constant = time_constant;
        self
    }

    /// Disable rate smoothing entirely
    pub fn unsmoothed(self) -> Self {
        self.with_smoothing(0.0)
    }

    /// Set the staleness threshold
    pub fn with_staleness_threshold(mut self, seconds: f64) -> Self {
        self.staleness_threshold = seconds;
        self
    }

    /// Set the coordinate plausibility limit
    pub fn with_max_coordinate(mut self, meters: f64) -> Self {
        self.max_coordinate = meters;
        self
    }
}

/// Estimator holding the single previous state needed for differencing
#[derive(Debug, Clone)]
pub struct Estimator {
    config: EstimatorConfig,
    filter: RateFilter,
    previous: Option<KinematicState>,
}

impl Estimator {
    pub fn new(config: EstimatorConfig) -> Self {
        let filter = RateFilter::new(config.smoothing_time_constant);
        Self {
            config,
            filter,
            previous: None,
        }
    }

    /// The last accepted state, if any
    pub fn previous(&self) -> Option<&KinematicState> {
        self.previous.as_ref()
    }

    /// The state to display: last accepted, or the default before any sample
    pub fn current(&self) -> KinematicState {
        self.previous.unwrap_or_default()
    }

    /// Forget the previous state; the next sample is treated as the first.
    pub fn reset(&mut self) {
        self.previous = None;
    }

    /// Update with a new sample and return the state to display.
    ///
    /// Invalid samples are logged and discarded; the previous state is
    /// returned unchanged so the display freezes instead of corrupting.
    pub fn update(&mut self, raw: RawSample) -> KinematicState {
        match self.try_update(raw) {
            Ok(state) => state,
            Err(err) => {
                warn!("Discarding sample: {err}");
                self.current()
            }
        }
    }

    /// Update with a new sample, reporting rejection to the caller.
    pub fn try_update(&mut self, raw: RawSample) -> Result<KinematicState, SampleError> {
        raw.validate(self.config.max_coordinate)?;

        let state = match self.previous {
            None => KinematicState::new(
                raw.x,
                raw.y,
                raw.theta,
                raw.vx.unwrap_or(0.0),
                raw.vy.unwrap_or(0.0),
                raw.omega.unwrap_or(0.0),
                raw.timestamp,
            ),
            Some(previous) => self.advance(&previous, &raw),
        };

        self.previous = Some(state);
        Ok(state)
    }

    fn advance(&self, previous: &KinematicState, raw: &RawSample) -> KinematicState {
        let dt = raw.timestamp - previous.timestamp;
        let can_difference = dt >= self.config.min_dt && dt <= self.config.staleness_threshold;
        if !can_difference {
            debug!("Holding rates over dt = {dt:.4} s");
        }

        // Published rates win; otherwise difference, or hold when dt is unusable
        let rate = |published: Option<f64>, held: f64, delta: f64| match published {
            Some(value) => value,
            None if can_difference => self.filter.step(held, delta / dt, dt),
            None => held,
        };

        let theta = wrap_angle(raw.theta);
        KinematicState {
            x: raw.x,
            y: raw.y,
            theta,
            vx: rate(raw.vx, previous.vx, raw.x - previous.x),
            vy: rate(raw.vy, previous.vy, raw.y - previous.y),
            omega: rate(raw.omega, previous.omega, angle_difference(theta, previous.theta)),
            timestamp: raw.timestamp,
        }
    }
}

impl Default for Estimator {
    fn default() -> Self {
        Self::new(EstimatorConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};
    use std::f64::consts::PI;

    #[test]
    fn test_first_sample_defaults_rates_to_zero() {
        let mut est = Estimator::default();
        let s = est.update(RawSample::pose(1.0, 2.0, 0.3, 10.0));
        assert_abs_diff_eq!(s.x, 1.0);
        assert_abs_diff_eq!(s.y, 2.0);
        assert_abs_diff_eq!(s.theta, 0.3);
        assert_abs_diff_eq!(s.vx, 0.0);
        assert_abs_diff_eq!(s.vy, 0.0);
        assert_abs_diff_eq!(s.omega, 0.0);
    }

    #[test]
    fn test_first_sample_wraps_heading() {
        let mut est = Estimator::default();
        let s = est.update(RawSample::pose(0.0, 0.0, 2.0 * PI + 0.25, 0.0));
        assert_abs_diff_eq!(s.theta, 0.25, epsilon = 1e-12);
    }

    #[test]
    fn test_velocity_from_position_difference() {
        let mut est = Estimator::default();
        est.update(RawSample::pose(0.0, 0.0, 0.0, 0.0));
        let s = est.update(RawSample::pose(1.0, 0.0, 0.0, 1.0));
        // A 1 s gap is inside the staleness window, and 20 time constants long
        assert_abs_diff_eq!(s.vx, 1.0, epsilon = 1e-3);
        assert_abs_diff_eq!(s.vy, 0.0, epsilon = 1e-9);
        assert_abs_diff_eq!(s.omega, 0.0, epsilon = 1e-9);
    }

    #[test]
    fn test_omega_takes_short_path_across_seam() {
        let mut est = Estimator::new(EstimatorConfig::default().unsmoothed());
        est.update(RawSample::pose(0.0, 0.0, 3.0, 0.0));
        let s = est.update(RawSample::pose(0.0, 0.0, -3.0, 0.1));
        assert_abs_diff_eq!(s.omega, 2.0 * (PI - 3.0) / 0.1, epsilon = 1e-9);
        assert!(s.omega > 0.0);
    }

    #[test]
    fn test_smoothed_omega_still_follows_short_path() {
        let mut est = Estimator::default();
        est.update(RawSample::pose(0.0, 0.0, 3.0, 0.0));
        let s = est.update(RawSample::pose(0.0, 0.0, -3.0, 0.1));
        let expected = 2.0 * (PI - 3.0) / 0.1;
        assert!(s.omega > 0.0 && s.omega <= expected, "omega = {}", s.omega);
        assert!(s.omega > 0.5 * expected);
    }

    #[test]
    fn test_duplicate_timestamp_holds_rates() {
        let mut est = Estimator::default();
        est.update(RawSample::pose(0.0, 0.0, 0.0, 0.0));
        let before = est.update(RawSample::pose(0.5, 0.2, 0.1, 0.1));
        let after = est.update(RawSample::pose(0.9, -0.4, 0.7, 0.1));
        assert_eq!(after.vx, before.vx);
        assert_eq!(after.vy, before.vy);
        assert_eq!(after.omega, before.omega);
        // The pose itself still follows the sample
        assert_abs_diff_eq!(after.x, 0.9);
    }

    #[test]
    fn test_out_of_order_sample_holds_rates() {
        let mut est = Estimator::default();
        est.update(RawSample::pose(0.0, 0.0, 0.0, 1.0));
        let before = est.update(RawSample::pose(0.1, 0.0, 0.0, 1.1));
        let after = est.update(RawSample::pose(5.0, 5.0, 1.0, 0.9));
        assert_eq!(after.vx, before.vx);
        assert_eq!(after.vy, before.vy);
        assert_eq!(after.omega, before.omega);
    }

    #[test]
    fn test_stale_gap_holds_rates() {
        let config = EstimatorConfig::default().with_staleness_threshold(0.5);
        let mut est = Estimator::new(config);
        est.update(RawSample::pose(0.0, 0.0, 0.0, 0.0));
        let moving = est.update(RawSample::pose(0.1, 0.0, 0.0, 0.1));
        let resumed = est.update(RawSample::pose(8.0, 0.0, 0.0, 5.0));
        assert_eq!(resumed.vx, moving.vx);
    }

    #[test]
    fn test_slow_publisher_still_derives_rates() {
        let mut est = Estimator::default();
        est.update(RawSample::pose(0.0, 0.0, 0.0, 0.0));
        est.update(RawSample::pose(1.0, 0.5, 0.0, 1.0));
        let s = est.update(RawSample::pose(3.0, 0.5, 1.5, 2.5));
        assert_abs_diff_eq!(s.vx, 2.0 / 1.5, epsilon = 1e-6);
        assert_abs_diff_eq!(s.vy, 0.0, epsilon = 1e-6);
        assert_abs_diff_eq!(s.omega, 1.0, epsilon = 1e-6);
    }

    #[test]
    fn test_default_staleness_still_holds_after_dropout() {
        let mut est = Estimator::default();
        est.update(RawSample::pose(0.0, 0.0, 0.0, 0.0));
        let moving = est.update(RawSample::pose(0.1, 0.0, 0.0, 0.1));
        let resumed = est.update(RawSample::pose(8.0, 0.0, 0.0, 3.0));
        assert_eq!(resumed.vx, moving.vx);
    }

    #[test]
    fn test_coordinate_limit_is_configurable() {
        let mut est = Estimator::new(EstimatorConfig::default().with_max_coordinate(10.0));
        let good = est.update(RawSample::pose(9.5, -9.5, 0.0, 0.0));
        let far = RawSample::pose(10.5, 0.0, 0.0, 0.1);
        assert!(matches!(est.try_update(far), Err(SampleError::OutOfRange { .. })));
        assert_eq!(est.current(), good);
    }

    #[test]
    fn test_published_rates_are_verbatim() {
        let mut est = Estimator::default();
        est.update(RawSample::pose(0.0, 0.0, 0.0, 0.0).with_velocity(0.3, -0.2).with_omega(1.5));
        let s = est.update(
            RawSample::pose(10.0, 10.0, 2.0, 0.02)
                .with_velocity(0.25, -0.1)
                .with_omega(-0.75),
        );
        assert_eq!(s.vx, 0.25);
        assert_eq!(s.vy, -0.1);
        assert_eq!(s.omega, -0.75);
    }

    #[test]
    fn test_published_zero_is_respected() {
        let mut est = Estimator::default();
        est.update(RawSample::pose(0.0, 0.0, 0.0, 0.0));
        let s = est.update(RawSample::pose(2.0, 0.0, 1.0, 0.1).with_velocity(0.0, 0.0));
        assert_eq!(s.vx, 0.0);
        assert_eq!(s.vy, 0.0);
        // Omega was not published, so it is derived
        assert!(s.omega > 0.0);
    }

    #[test]
    fn test_mixed_fields_derive_only_missing() {
        let mut est = Estimator::new(EstimatorConfig::default().unsmoothed());
        est.update(RawSample::pose(0.0, 0.0, 0.0, 0.0));
        let s = est.update(RawSample::pose(0.2, 0.4, 0.0, 0.1).with_omega(0.9));
        assert_abs_diff_eq!(s.vx, 2.0, epsilon = 1e-9);
        assert_abs_diff_eq!(s.vy, 4.0, epsilon = 1e-9);
        assert_eq!(s.omega, 0.9);
    }

    #[test]
    fn test_invalid_sample_returns_previous_state() {
        let mut est = Estimator::default();
        est.update(RawSample::pose(0.0, 0.0, 0.0, 0.0));
        let good = est.update(RawSample::pose(0.1, 0.0, 0.0, 0.1));

        let bad = RawSample::pose(f64::NAN, 0.0, 0.0, 0.2);
        assert!(matches!(est.try_update(bad), Err(SampleError::NonFinite { .. })));
        assert_eq!(est.update(bad), good);
        assert_eq!(est.previous(), Some(&good));

        let far = RawSample::pose(1.0e6, 0.0, 0.0, 0.2);
        assert_eq!(est.update(far), good);
    }

    #[test]
    fn test_invalid_first_sample_returns_default() {
        let mut est = Estimator::default();
        let s = est.update(RawSample::pose(0.0, f64::INFINITY, 0.0, 0.0));
        assert_eq!(s, KinematicState::default());
        assert!(est.previous().is_none());
    }

    #[test]
    fn test_reset_forgets_previous() {
        let mut est = Estimator::default();
        est.update(RawSample::pose(0.0, 0.0, 0.0, 0.0));
        est.update(RawSample::pose(1.0, 0.0, 0.0, 0.1));
        est.reset();
        let s = est.update(RawSample::pose(3.0, 0.0, 0.0, 0.2));
        assert_eq!(s.vx, 0.0);
    }

    #[test]
    fn test_smoothing_suppresses_jitter() {
        // Alternating position noise differentiates into large swings
        let dt = 1.0 / 60.0;
        let run = |config: EstimatorConfig| {
            let mut est = Estimator::new(config);
            let mut peak: f64 = 0.0;
            for i in 0..240 {
                let jitter = if i % 2 == 0 { 0.005 } else { -0.005 };
                let s = est.update(RawSample::pose(jitter, 0.0, 0.0, i as f64 * dt));
                if i > 60 {
                    peak = peak.max(s.vx.abs());
                }
            }
            peak
        };
        let raw_peak = run(EstimatorConfig::default().unsmoothed());
        let smooth_peak = run(EstimatorConfig::default().with_smoothing(0.1));
        assert!(smooth_peak < 0.25 * raw_peak, "{smooth_peak} vs {raw_peak}");
    }

    #[test]
    fn test_monotonic_sequences_stay_finite() {
        let mut rng = StdRng::seed_from_u64(0x5eed);
        let mut est = Estimator::default();
        let mut t = 0.0;
        for _ in 0..5000 {
            t += rng.random_range(0.0..0.1);
            let mut sample = RawSample::pose(
                rng.random_range(-20.0..20.0),
                rng.random_range(-20.0..20.0),
                rng.random_range(-50.0..50.0),
                t,
            );
            if rng.random_bool(0.3) {
                sample = sample.with_velocity(rng.random_range(-5.0..5.0), rng.random_range(-5.0..5.0));
            }
            if rng.random_bool(0.3) {
                sample = sample.with_omega(rng.random_range(-10.0..10.0));
            }
            let s = est.update(sample);
            assert!(s.is_finite(), "non-finite output {s:?}");
            assert!(s.theta > -PI && s.theta <= PI);
        }
    }
}
