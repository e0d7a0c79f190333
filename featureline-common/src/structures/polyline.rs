/*
This code is part of the FeatureLine Tools geospatial analysis library.
Authors: FeatureLine Tools contributors
Created: 02/09/2026
Last Modified: 03/10/2026
License: MIT
*/

use super::{BoundingBox, LineSegment, Point2D};
use crate::algorithms::line_bearing;
use std::ops::Index;

/// Tolerance used when a requested distance along the line overshoots
/// the measured length by floating-point noise.
const LENGTH_TOLERANCE: f64 = 1e-9;

#[derive(Default, Clone, Debug)]
pub struct Polyline {
    pub vertices: Vec<Point2D>,
    pub id: usize,
}

impl PartialEq for Polyline {
    fn eq(&self, other: &Self) -> bool {
        // Equality is based on vertices coordinates only.
        self.vertices == other.vertices
    }
}

impl Index<usize> for Polyline {
    type Output = Point2D;

    fn index<'a>(&'a self, index: usize) -> &'a Point2D {
        &self.vertices[index]
    }
}

impl Polyline {
    /// Creates a new Polyline from vertices
    pub fn new(vertices: &[Point2D], id: usize) -> Polyline {
        Polyline {
            vertices: vertices.to_vec(),
            id,
        }
    }

    /// Creates a new empty Polyline
    pub fn new_empty(id: usize) -> Polyline {
        Polyline {
            vertices: vec![],
            id,
        }
    }

    /// Creates a new Polyline with capacity
    pub fn new_with_capacity(id: usize, capacity: usize) -> Polyline {
        Polyline {
            vertices: Vec::with_capacity(capacity),
            id,
        }
    }

    /// returns the number of vertices
    pub fn len(&self) -> usize {
        self.vertices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    /// Returns the feature geometric length.
    pub fn length(&self) -> f64 {
        self.vertices
            .windows(2)
            .map(|w| w[0].distance(&w[1]))
            .sum()
    }

    pub fn get(&self, index: usize) -> Point2D {
        self.vertices[index]
    }

    pub fn first_vertex(&self) -> Point2D {
        self.vertices[0]
    }

    pub fn last_vertex(&self) -> Point2D {
        self.vertices[self.vertices.len() - 1]
    }

    /// Inserts a point vertex at the end of the line.
    pub fn push(&mut self, v: Point2D) {
        self.vertices.push(v);
    }

    /// Returns the line's segments. A single-vertex line yields one
    /// zero-length segment so that it still takes part in proximity searches.
    pub fn segments(&self) -> Vec<LineSegment> {
        match self.len() {
            0 => vec![],
            1 => vec![LineSegment::new(self[0], self[0])],
            _ => self
                .vertices
                .windows(2)
                .map(|w| LineSegment::new(w[0], w[1]))
                .collect(),
        }
    }

    /// Azimuth of the line from its first to its last vertex, in degrees
    /// clockwise from north. `None` when there are fewer than two vertices.
    pub fn bearing(&self) -> Option<f64> {
        if self.len() < 2 {
            return None;
        }
        Some(line_bearing(&self.first_vertex(), &self.last_vertex()))
    }

    pub fn get_bounding_box(&self) -> BoundingBox {
        BoundingBox::from_points(&self.vertices)
    }

    /// Returns the point found `distance` units along the line from its start.
    pub fn point_along_line(&self, distance: f64) -> Option<Point2D> {
        self.segment_along_line(distance, distance)
            .map(|segment| segment.first_vertex())
    }

    /// Extracts the part of the line between the `start` and `end` distances,
    /// both measured from the first vertex. Returns `None` when the range is
    /// reversed or falls outside of the line.
    pub fn segment_along_line(&self, start: f64, end: f64) -> Option<Polyline> {
        if self.len() < 2 || !(start >= 0f64) || !(end >= start) {
            return None;
        }
        let total = self.length();
        if end > total + LENGTH_TOLERANCE {
            return None;
        }
        let end = end.min(total);
        let start = start.min(end);

        let mut ret = Polyline::new_with_capacity(self.id, self.len());
        let mut travelled = 0f64;
        for a in 0..self.len() - 1 {
            let seg_len = self[a].distance(&self[a + 1]);
            let seg_end = travelled + seg_len;
            if ret.is_empty() && start <= seg_end {
                ret.push(self.interpolate(a, start - travelled, seg_len));
            }
            if !ret.is_empty() {
                if end <= seg_end {
                    ret.push(self.interpolate(a, end - travelled, seg_len));
                    return Some(ret);
                }
                if ret.last_vertex() != self[a + 1] {
                    ret.push(self[a + 1]);
                }
            }
            travelled = seg_end;
        }
        if ret.len() < 2 {
            return None;
        }
        Some(ret)
    }

    fn interpolate(&self, segment: usize, offset: f64, seg_len: f64) -> Point2D {
        if seg_len <= 0f64 {
            return self[segment];
        }
        let t = (offset / seg_len).max(0f64).min(1f64);
        self[segment].lerp(&self[segment + 1], t)
    }
}
