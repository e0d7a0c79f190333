/*
This code is part of the FeatureLine Tools geospatial analysis library.
Authors: FeatureLine Tools contributors
Created: 05/09/2026
Last Modified: 30/09/2026
License: MIT
*/

//! Proximity queries that produce near tables, i.e. lists of
//! (in, near, distance) records. Point queries are answered with a k-d tree
//! and line queries with an R-tree of line segments.

use crate::structures::{LineSegment, Point2D, Polyline};
use kdtree::distance::squared_euclidean;
use kdtree::KdTree;
use rstar::primitives::{GeomWithData, Line};
use rstar::{RTree, AABB};
use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::io::{Error, ErrorKind};

/// A single proximity relation between the `in_id` and `near_id` features.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NearRecord {
    pub in_id: usize,
    pub near_id: usize,
    pub distance: f64,
}

impl NearRecord {
    pub fn new(in_id: usize, near_id: usize, distance: f64) -> NearRecord {
        NearRecord {
            in_id,
            near_id,
            distance,
        }
    }
}

/// Orders records by distance, then by the near feature's id, so that ties
/// resolve to insertion order.
fn by_distance_then_id(a: &NearRecord, b: &NearRecord) -> Ordering {
    a.distance
        .partial_cmp(&b.distance)
        .unwrap_or(Ordering::Equal)
        .then(a.near_id.cmp(&b.near_id))
}

/// Finds, for every point, the other points lying within `search_radius`.
///
/// `exclude(in_id, near_id)` removes candidate pairs before the
/// `closest_count` nearest are chosen; a point is never its own neighbour.
/// With `closest_count` set to `None` every point within the radius is kept.
/// Records are grouped by `in_id`, in ascending order, and sorted by
/// distance within each group.
pub fn generate_point_near_table<F>(
    points: &[Point2D],
    search_radius: f64,
    closest_count: Option<usize>,
    exclude: F,
) -> Result<Vec<NearRecord>, Error>
where
    F: Fn(usize, usize) -> bool,
{
    if points.is_empty() {
        return Ok(vec![]);
    }

    let dimensions = 2;
    let capacity_per_node = 64;
    let mut tree = KdTree::with_capacity(dimensions, capacity_per_node);
    for (i, p) in points.iter().enumerate() {
        tree.add(p.to_array(), i).map_err(|e| {
            Error::new(
                ErrorKind::InvalidInput,
                format!("Point {} could not be indexed: {:?}", i, e),
            )
        })?;
    }

    let radius_squared = search_radius * search_radius;
    let mut table = vec![];
    for (i, p) in points.iter().enumerate() {
        let found = tree
            .within(&p.to_array(), radius_squared, &squared_euclidean)
            .map_err(|e| {
                Error::new(
                    ErrorKind::InvalidInput,
                    format!("Point {} could not be searched: {:?}", i, e),
                )
            })?;
        let mut neighbours: Vec<NearRecord> = found
            .into_iter()
            .filter(|(_, j)| **j != i && !exclude(i, **j))
            .map(|(dist_squared, j)| NearRecord::new(i, *j, dist_squared.sqrt()))
            .collect();
        neighbours.sort_by(by_distance_then_id);
        if let Some(k) = closest_count {
            neighbours.truncate(k);
        }
        table.extend(neighbours);
    }
    Ok(table)
}

type IndexedSegment = GeomWithData<Line<[f64; 2]>, usize>;

/// Finds, for every line in `in_lines`, the lines in `near_lines` whose
/// minimum segment-to-segment distance is no greater than `search_radius`.
///
/// When `same_set` is true the two slices are the same collection and a line
/// is not reported as near itself. Lines without vertices, or with non-finite
/// coordinates, take no part in the search. Records are grouped by `in_id`
/// and sorted by distance within each group.
pub fn generate_line_near_table(
    in_lines: &[Polyline],
    near_lines: &[Polyline],
    search_radius: f64,
    same_set: bool,
) -> Vec<NearRecord> {
    let mut indexed: Vec<IndexedSegment> = vec![];
    for (j, line) in near_lines.iter().enumerate() {
        if !has_finite_vertices(line) {
            continue;
        }
        for seg in line.segments() {
            indexed.push(IndexedSegment::new(
                Line::new(seg.p1.to_array(), seg.p2.to_array()),
                j,
            ));
        }
    }
    let tree = RTree::bulk_load(indexed);

    let mut table = vec![];
    for (i, line) in in_lines.iter().enumerate() {
        if !has_finite_vertices(line) {
            continue;
        }
        // nearest distance found so far to each neighbouring line
        let mut nearest: BTreeMap<usize, f64> = BTreeMap::new();
        for seg in line.segments() {
            let bb = seg.get_bounding_box().expand_by(search_radius);
            let envelope = AABB::from_corners([bb.min_x, bb.min_y], [bb.max_x, bb.max_y]);
            for candidate in tree.locate_in_envelope_intersecting(&envelope) {
                let j = candidate.data;
                if same_set && j == i {
                    continue;
                }
                let other = candidate.geom();
                let other = LineSegment::new(
                    Point2D::new(other.from[0], other.from[1]),
                    Point2D::new(other.to[0], other.to[1]),
                );
                let dist = seg.distance_to_segment(&other);
                if dist <= search_radius {
                    let entry = nearest.entry(j).or_insert(dist);
                    if dist < *entry {
                        *entry = dist;
                    }
                }
            }
        }
        let mut neighbours: Vec<NearRecord> = nearest
            .into_iter()
            .map(|(j, dist)| NearRecord::new(i, j, dist))
            .collect();
        neighbours.sort_by(by_distance_then_id);
        table.extend(neighbours);
    }
    table
}

fn has_finite_vertices(line: &Polyline) -> bool {
    !line.is_empty()
        && line
            .vertices
            .iter()
            .all(|p| p.x.is_finite() && p.y.is_finite())
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_point_near_table_closest_count() {
        let points = vec![
            Point2D::new(0.0, 0.0),
            Point2D::new(1.0, 0.0),
            Point2D::new(3.0, 0.0),
            Point2D::new(50.0, 0.0),
        ];
        let table = generate_point_near_table(&points, 5.0, Some(1), |_, _| false).unwrap();
        assert_eq!(
            table,
            vec![
                NearRecord::new(0, 1, 1.0),
                NearRecord::new(1, 0, 1.0),
                NearRecord::new(2, 1, 2.0),
            ]
        );
    }

    #[test]
    fn test_point_near_table_exclusion_precedes_count() {
        let points = vec![
            Point2D::new(0.0, 0.0),
            Point2D::new(1.0, 0.0),
            Point2D::new(2.0, 0.0),
        ];
        // 0 and 1 may not see each other, so 0's single neighbour must be 2
        let table =
            generate_point_near_table(&points, 5.0, Some(1), |a, b| a + b == 1).unwrap();
        assert_eq!(table[0], NearRecord::new(0, 2, 2.0));
    }

    #[test]
    fn test_point_near_table_ties_use_insertion_order() {
        let points = vec![
            Point2D::new(0.0, 0.0),
            Point2D::new(0.0, 1.0),
            Point2D::new(1.0, 0.0),
            Point2D::new(-1.0, 0.0),
        ];
        let table = generate_point_near_table(&points, 1.2, None, |_, _| false).unwrap();
        let from_origin: Vec<usize> = table
            .iter()
            .filter(|r| r.in_id == 0)
            .map(|r| r.near_id)
            .collect();
        assert_eq!(from_origin, vec![1, 2, 3]);
    }

    #[test]
    fn test_point_near_table_keeps_coincident_points() {
        let points = vec![Point2D::new(2.0, 2.0), Point2D::new(2.0, 2.0)];
        let table = generate_point_near_table(&points, 0.5, None, |_, _| false).unwrap();
        assert_eq!(table.len(), 2);
        assert_eq!(table[0].distance, 0.0);
    }

    #[test]
    fn test_line_near_table() {
        let lines = vec![
            Polyline::new(&[Point2D::new(0.0, 0.0), Point2D::new(10.0, 0.0)], 0),
            Polyline::new(&[Point2D::new(0.0, 1.0), Point2D::new(10.0, 1.0)], 1),
            Polyline::new(&[Point2D::new(0.0, 30.0), Point2D::new(10.0, 30.0)], 2),
            Polyline::new_empty(3),
        ];
        let table = generate_line_near_table(&lines, &lines, 2.0, true);
        assert_eq!(
            table,
            vec![NearRecord::new(0, 1, 1.0), NearRecord::new(1, 0, 1.0)]
        );
    }

    #[test]
    fn test_line_near_table_between_sets() {
        let targets = vec![Polyline::new(
            &[Point2D::new(0.0, 0.0), Point2D::new(10.0, 0.0)],
            0,
        )];
        let references = vec![
            Polyline::new(&[Point2D::new(5.0, -5.0), Point2D::new(5.0, 5.0)], 0),
            Polyline::new(&[Point2D::new(0.0, 3.0), Point2D::new(10.0, 3.0)], 1),
        ];
        let table = generate_line_near_table(&targets, &references, 5.0, false);
        assert_eq!(
            table,
            vec![NearRecord::new(0, 0, 0.0), NearRecord::new(0, 1, 3.0)]
        );
    }
}
