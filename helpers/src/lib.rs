pub mod angle;
pub mod general;
pub mod geometry;

#[cfg(test)]
mod angle_tests {
    use crate::angle::{normalize_rad, normalize_rad_180, Angle};
    use approx::{assert_abs_diff_eq, assert_ulps_eq};
    use std::f64::consts::{PI, TAU};

    #[test]
    fn test_normalize_rad_1() {
        assert_ulps_eq!(normalize_rad(-PI / 2.0), 1.5 * PI);
        assert_abs_diff_eq!(normalize_rad(TAU + 0.5), 0.5, epsilon = 1e-12);
        assert_ulps_eq!(normalize_rad(TAU), 0.0);
    }
    #[test]
    fn test_normalize_rad_180_1() {
        assert_ulps_eq!(normalize_rad_180(1.5 * PI), -PI / 2.0);
        assert_ulps_eq!(normalize_rad_180(PI / 2.0), PI / 2.0);
        assert_ulps_eq!(normalize_rad_180(PI), -PI);
        assert_ulps_eq!(normalize_rad_180(-PI), -PI);
    }
    #[test]
    fn test_normalize_rad_tiny_negative() {
        let x = normalize_rad(-1e-18);
        assert!((0.0..TAU).contains(&x));
    }
    #[test]
    fn test_angle_normalized_range() {
        for i in -20..20 {
            let a = Angle::from_degrees(i as f64 * 47.0).normalized();
            assert!(0.0 <= a.to_degrees() && a.to_degrees() < 360.0);

            let b = Angle::from_degrees(i as f64 * 47.0).normalized_180();
            assert!(-180.0 <= b.to_degrees() && b.to_degrees() < 180.0);
        }
    }
    #[test]
    fn test_angle_diff_180() {
        let a = Angle::from_degrees(350.0);
        let b = Angle::from_degrees(10.0);
        assert_abs_diff_eq!(a.diff_180(b).to_degrees(), -20.0, epsilon = 1e-9);
        assert_abs_diff_eq!(b.diff_180(a).to_degrees(), 20.0, epsilon = 1e-9);
    }
    #[test]
    fn test_angle_ops() {
        let mut a = Angle::from_radians(PI) + Angle::from_radians(PI / 2.0);
        assert_ulps_eq!(a.to_radians(), 1.5 * PI);
        a -= Angle::from_radians(2.0 * PI);
        assert_ulps_eq!(a.to_radians(), -0.5 * PI);
        assert_ulps_eq!((a - Angle::from_radians(PI)).normalized().to_radians(), 0.5 * PI);
    }
}
