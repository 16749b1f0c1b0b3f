//! Single-pole low-pass filter for derived rates
//!
//! An exponential moving average whose blend factor depends on the elapsed
//! time, so the effective smoothing is the same whatever the sample rate.

/// Exponential moving average with a fixed time constant.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RateFilter {
    time_constant: f64,
}

impl RateFilter {
    /// Create a filter with time constant `tau` in seconds.
    /// A non-positive `tau` disables smoothing.
    pub fn new(time_constant: f64) -> Self {
        Self { time_constant }
    }

    /// Filter that passes measurements through untouched
    pub fn passthrough() -> Self {
        Self::new(0.0)
    }

    /// Blend factor for a step of `dt` seconds, in [0, 1]
    pub fn alpha(&self, dt: f64) -> f64 {
        if self.time_constant <= 0.0 {
            return 1.0;
        }
        if dt <= 0.0 {
            return 0.0;
        }
        1.0 - (-dt / self.time_constant).exp()
    }

    /// Advance the filtered value toward `measurement` over `dt` seconds.
    pub fn step(&self, previous: f64, measurement: f64, dt: f64) -> f64 {
        previous + self.alpha(dt) * (measurement - previous)
    }
}

impl Default for RateFilter {
    fn default() -> Self {
        Self::new(0.05)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_passthrough_returns_measurement() {
        let f = RateFilter::passthrough();
        assert_abs_diff_eq!(f.step(3.0, 7.0, 0.01), 7.0);
    }

    #[test]
    fn test_alpha_matches_time_constant() {
        let f = RateFilter::new(0.1);
        // After one time constant the output covers 1 - 1/e of the step
        assert_abs_diff_eq!(f.alpha(0.1), 1.0 - (-1.0f64).exp(), epsilon = 1e-12);
        assert_abs_diff_eq!(f.alpha(0.0), 0.0);
        assert!(f.alpha(100.0) > 0.999_999);
    }

    #[test]
    fn test_step_converges() {
        let f = RateFilter::new(0.05);
        let mut v = 0.0;
        for _ in 0..120 {
            v = f.step(v, 2.0, 1.0 / 60.0);
        }
        assert_abs_diff_eq!(v, 2.0, epsilon = 1e-6);
    }

    #[test]
    fn test_sample_rate_independence() {
        // Ten 10 ms steps land where one 100 ms step lands
        let f = RateFilter::new(0.08);
        let mut fine = 0.0;
        for _ in 0..10 {
            fine = f.step(fine, 1.0, 0.01);
        }
        let coarse = f.step(0.0, 1.0, 0.1);
        assert_abs_diff_eq!(fine, coarse, epsilon = 1e-12);
    }
}
