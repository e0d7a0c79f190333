/*
This code is part of the FeatureLine Tools geospatial analysis library.
Authors: FeatureLine Tools contributors
Created: 02/09/2026
Last Modified: 21/09/2026
License: MIT
*/

use super::{BoundingBox, Point2D};

/// A data structure to hold line segments, defined by
/// starting and ending points.
#[derive(Default, Copy, Clone, Debug)]
pub struct LineSegment {
    pub p1: Point2D,
    pub p2: Point2D,
}

impl PartialEq for LineSegment {
    fn eq(&self, other: &Self) -> bool {
        (self.p1.nearly_equals(&other.p1) && self.p2.nearly_equals(&other.p2))
            || (self.p1.nearly_equals(&other.p2) && self.p2.nearly_equals(&other.p1))
    }
}

impl LineSegment {
    /// Creates a new LineSegment.
    pub fn new(p1: Point2D, p2: Point2D) -> LineSegment {
        LineSegment { p1, p2 }
    }

    pub fn length(&self) -> f64 {
        self.p1.distance(&self.p2)
    }

    pub fn is_degenerate(&self) -> bool {
        self.p1 == self.p2
    }

    pub fn get_bounding_box(&self) -> BoundingBox {
        BoundingBox::from_two_points(self.p1, self.p2)
    }

    /// Tests whether the two segments share at least one point, including
    /// touching end points and collinear overlaps.
    pub fn intersects(&self, other: &Self) -> bool {
        if !self.get_bounding_box().overlaps(other.get_bounding_box()) {
            return false;
        }
        let d1 = orientation(other.p1, other.p2, self.p1);
        let d2 = orientation(other.p1, other.p2, self.p2);
        let d3 = orientation(self.p1, self.p2, other.p1);
        let d4 = orientation(self.p1, self.p2, other.p2);

        if ((d1 > 0.0 && d2 < 0.0) || (d1 < 0.0 && d2 > 0.0))
            && ((d3 > 0.0 && d4 < 0.0) || (d3 < 0.0 && d4 > 0.0))
        {
            return true;
        }

        (d1 == 0.0 && on_segment(other.p1, other.p2, self.p1))
            || (d2 == 0.0 && on_segment(other.p1, other.p2, self.p2))
            || (d3 == 0.0 && on_segment(self.p1, self.p2, other.p1))
            || (d4 == 0.0 && on_segment(self.p1, self.p2, other.p2))
    }

    pub fn dist_to_segment_squared(&self, p: Point2D) -> f64 {
        let l2 = self.p1.distance_squared(&self.p2);
        if l2 == 0.0 {
            return p.distance_squared(&self.p1);
        };
        let mut t = ((p.x - self.p1.x) * (self.p2.x - self.p1.x)
            + (p.y - self.p1.y) * (self.p2.y - self.p1.y))
            / l2;
        t = 0f64.max(1f64.min(t));
        p.distance_squared(&self.p1.lerp(&self.p2, t))
    }

    pub fn dist_to_segment(&self, p: Point2D) -> f64 {
        self.dist_to_segment_squared(p).sqrt()
    }

    /// Minimum planar distance between two segments; zero when they intersect.
    pub fn distance_to_segment(&self, other: &Self) -> f64 {
        if self.intersects(other) {
            return 0f64;
        }
        self.dist_to_segment_squared(other.p1)
            .min(self.dist_to_segment_squared(other.p2))
            .min(other.dist_to_segment_squared(self.p1))
            .min(other.dist_to_segment_squared(self.p2))
            .sqrt()
    }
}

/// Signed area of the triangle (a, b, c); positive when c lies left of a->b.
fn orientation(a: Point2D, b: Point2D, c: Point2D) -> f64 {
    (b - a).cross(c - a)
}

/// Assumes c is collinear with a and b.
fn on_segment(a: Point2D, b: Point2D, c: Point2D) -> bool {
    c.x >= a.x.min(b.x) && c.x <= a.x.max(b.x) && c.y >= a.y.min(b.y) && c.y <= a.y.max(b.y)
}

#[cfg(test)]
mod test {
    use super::LineSegment;
    use crate::structures::Point2D;

    #[test]
    fn test_crossing_segments() {
        let s1 = LineSegment::new(Point2D::new(0.0, 0.0), Point2D::new(10.0, 10.0));
        let s2 = LineSegment::new(Point2D::new(0.0, 10.0), Point2D::new(10.0, 0.0));
        assert!(s1.intersects(&s2));
        assert_eq!(s1.distance_to_segment(&s2), 0.0);
    }

    #[test]
    fn test_touching_end_points() {
        let s1 = LineSegment::new(Point2D::new(0.0, 0.0), Point2D::new(10.0, 0.0));
        let s2 = LineSegment::new(Point2D::new(10.0, 0.0), Point2D::new(20.0, 0.0));
        assert!(s1.intersects(&s2));
        assert_eq!(s2.distance_to_segment(&s1), 0.0);
    }

    #[test]
    fn test_parallel_offset_segments() {
        let s1 = LineSegment::new(Point2D::new(0.0, 0.0), Point2D::new(10.0, 0.0));
        let s2 = LineSegment::new(Point2D::new(2.0, 3.0), Point2D::new(8.0, 3.0));
        assert!(!s1.intersects(&s2));
        assert!((s1.distance_to_segment(&s2) - 3.0).abs() < 1e-12);
    }

    #[test]
    fn test_collinear_gap() {
        let s1 = LineSegment::new(Point2D::new(0.0, 0.0), Point2D::new(10.0, 0.0));
        let s2 = LineSegment::new(Point2D::new(12.0, 0.0), Point2D::new(22.0, 0.0));
        assert!(!s1.intersects(&s2));
        assert!((s1.distance_to_segment(&s2) - 2.0).abs() < 1e-12);
    }

    #[test]
    fn test_degenerate_segment() {
        let s1 = LineSegment::new(Point2D::new(5.0, 5.0), Point2D::new(5.0, 5.0));
        let s2 = LineSegment::new(Point2D::new(0.0, 1.0), Point2D::new(10.0, 1.0));
        assert!(s1.is_degenerate());
        assert!((s1.distance_to_segment(&s2) - 4.0).abs() < 1e-12);
    }
}
