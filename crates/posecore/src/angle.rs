use std::f64::consts::{PI, TAU};

/// Wraps an angle in radians into (-π, π].
pub fn wrap_angle(angle: f64) -> f64 {
    let wrapped = PI - (PI - angle).rem_euclid(TAU);
    // rem_euclid can round up to exactly TAU for tiny negative inputs
    if wrapped <= -PI { wrapped + TAU } else { wrapped }
}

/// Shortest signed rotation that takes `from` onto `to`, in (-π, π].
///
/// Taking the difference modulo a full turn keeps a heading that crosses the
/// ±π seam from looking like an almost full revolution the other way.
pub fn angle_difference(to: f64, from: f64) -> f64 {
    wrap_angle(to - from)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_wrap_keeps_values_in_range() {
        assert_abs_diff_eq!(wrap_angle(0.0), 0.0);
        assert_abs_diff_eq!(wrap_angle(1.0), 1.0);
        assert_abs_diff_eq!(wrap_angle(3.0 * PI / 2.0), -PI / 2.0, epsilon = 1e-12);
        assert_abs_diff_eq!(wrap_angle(-3.0 * PI / 2.0), PI / 2.0, epsilon = 1e-12);
        assert_abs_diff_eq!(wrap_angle(10.0 * TAU + 0.5), 0.5, epsilon = 1e-9);
    }

    #[test]
    fn test_wrap_boundaries() {
        // The half-open range includes +π and excludes -π
        assert_abs_diff_eq!(wrap_angle(PI), PI);
        assert_abs_diff_eq!(wrap_angle(-PI), PI);
        assert!(wrap_angle(-1e-17) > -PI);
    }

    #[test]
    fn test_difference_takes_short_path_across_seam() {
        let diff = angle_difference(-3.0, 3.0);
        assert_abs_diff_eq!(diff, 2.0 * (PI - 3.0), epsilon = 1e-12);

        let diff = angle_difference(3.0, -3.0);
        assert_abs_diff_eq!(diff, -2.0 * (PI - 3.0), epsilon = 1e-12);
    }

    #[test]
    fn test_difference_without_wrap() {
        assert_abs_diff_eq!(angle_difference(0.6, 0.1), 0.5, epsilon = 1e-12);
        assert_abs_diff_eq!(angle_difference(-0.2, 0.3), -0.5, epsilon = 1e-12);
    }
}
