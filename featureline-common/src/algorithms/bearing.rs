/*
This code is part of the FeatureLine Tools geospatial analysis library.
Authors: FeatureLine Tools contributors
Created: 04/09/2026
Last Modified: 04/09/2026
License: MIT
*/

//! Angle arithmetic for undirected lines. All bearings are azimuths: degrees
//! clockwise from north, in the range [0, 360).

use crate::structures::Point2D;

/// Signed minimal rotation from `angle2` to `angle1`, in [-180, 180). When
/// `absolute_value` is true the magnitude is returned instead.
pub fn smallest_angle_difference(angle1: f64, angle2: f64, absolute_value: bool) -> f64 {
    let diff = (angle1 - angle2 + 180f64).rem_euclid(360f64) - 180f64;
    if absolute_value {
        diff.abs()
    } else {
        diff
    }
}

/// The opposite direction of a bearing.
pub fn reverse_bearing(angle: f64) -> f64 {
    (angle + 180f64).rem_euclid(360f64)
}

/// Smallest angle between the orientations of two undirected lines.
///
/// A line has no inherent direction, so each bearing is paired with its
/// reverse and the minimum over every pairing of the four angles is returned.
/// The result lies in [0, 180]; it is 0 for parallel lines, whichever way
/// each was digitized, and 90 for perpendicular ones.
pub fn relative_angle(bearing_a: f64, bearing_b: f64) -> f64 {
    let angles = [
        bearing_a,
        bearing_b,
        reverse_bearing(bearing_a),
        reverse_bearing(bearing_b),
    ];
    let mut smallest = f64::INFINITY;
    for i in 0..angles.len() {
        for j in i + 1..angles.len() {
            smallest = smallest.min(smallest_angle_difference(angles[i], angles[j], true));
        }
    }
    smallest
}

/// Converts a mathematical angle (degrees counter-clockwise from east, as
/// returned by `atan2`) into an azimuth.
pub fn to_azimuth(angle: f64) -> f64 {
    (90f64 - angle).rem_euclid(360f64)
}

/// Azimuth of the direction from `first` to `last`.
pub fn line_bearing(first: &Point2D, last: &Point2D) -> f64 {
    let angle = (last.y - first.y).atan2(last.x - first.x).to_degrees();
    to_azimuth(angle)
}

#[cfg(test)]
mod test {
    use super::*;
    use rand::rngs::SmallRng;
    use rand::{Rng, SeedableRng};

    const TOLERANCE: f64 = 1e-9;

    #[test]
    fn test_relative_angle_opposite_bearings() {
        assert!(relative_angle(10.0, 190.0).abs() < TOLERANCE);
        assert!(relative_angle(350.0, 170.0).abs() < TOLERANCE);
    }

    #[test]
    fn test_relative_angle_perpendicular() {
        assert!((relative_angle(0.0, 90.0) - 90.0).abs() < TOLERANCE);
        assert!((relative_angle(45.0, 315.0) - 90.0).abs() < TOLERANCE);
    }

    #[test]
    fn test_relative_angle_wraps_north() {
        assert!((relative_angle(355.0, 5.0) - 10.0).abs() < TOLERANCE);
        assert!((relative_angle(175.0, 5.0) - 10.0).abs() < TOLERANCE);
    }

    #[test]
    fn test_relative_angle_properties() {
        let mut rng = SmallRng::seed_from_u64(1234);
        for _ in 0..1000 {
            let a: f64 = rng.gen_range(0.0, 360.0);
            let b: f64 = rng.gen_range(0.0, 360.0);
            let ab = relative_angle(a, b);
            assert!(ab >= 0.0 && ab <= 180.0);
            assert!((ab - relative_angle(b, a)).abs() < TOLERANCE);
            assert!(relative_angle(a, a).abs() < TOLERANCE);
            assert!(relative_angle(a, a + 180.0).abs() < TOLERANCE);
        }
    }

    #[test]
    fn test_smallest_angle_difference() {
        assert_eq!(smallest_angle_difference(10.0, 350.0, false), 20.0);
        assert_eq!(smallest_angle_difference(350.0, 10.0, false), -20.0);
        assert_eq!(smallest_angle_difference(350.0, 10.0, true), 20.0);
    }

    #[test]
    fn test_to_azimuth() {
        assert_eq!(to_azimuth(0.0), 90.0);
        assert_eq!(to_azimuth(90.0), 0.0);
        assert_eq!(to_azimuth(-90.0), 180.0);
        assert_eq!(to_azimuth(180.0), 270.0);
        assert_eq!(to_azimuth(135.0), 315.0);
    }

    #[test]
    fn test_line_bearing() {
        let origin = Point2D::new(0.0, 0.0);
        assert!(line_bearing(&origin, &Point2D::new(0.0, 5.0)).abs() < TOLERANCE);
        assert!((line_bearing(&origin, &Point2D::new(5.0, 0.0)) - 90.0).abs() < TOLERANCE);
        assert!((line_bearing(&origin, &Point2D::new(0.0, -5.0)) - 180.0).abs() < TOLERANCE);
        assert!((line_bearing(&origin, &Point2D::new(-5.0, 0.0)) - 270.0).abs() < TOLERANCE);
    }
}
