/*
This code is part of the FeatureLine Tools geospatial analysis library.
Authors: FeatureLine Tools contributors
Created: 05/09/2026
Last Modified: 30/09/2026
License: MIT
*/

use super::near_table::{generate_point_near_table, NearRecord};
use crate::features::LineFeature;
use crate::structures::Point2D;
use std::io::{Error, ErrorKind};

/*
    Endpoint ids are dense and derived from the owning line's index:
    1. the starting node for line 'a' is a * 2.
    2. the ending node for line 'a' is a * 2 + 1.
    3. endpoint to line = e / 2
    4. is an endpoint a starting point? e % 2 == 0
*/

pub fn first_node_id(line_index: usize) -> usize {
    line_index * 2
}

pub fn last_node_id(line_index: usize) -> usize {
    line_index * 2 + 1
}

pub fn is_first_node(point_id: usize) -> bool {
    point_id % 2 == 0
}

pub fn owning_line(point_id: usize) -> usize {
    point_id / 2
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EndRole {
    Start,
    End,
}

/// One terminal vertex of a line, treated as a standalone point.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Endpoint {
    pub point_id: usize,
    pub line_index: usize,
    pub line_fid: i64,
    pub point: Point2D,
    pub role: EndRole,
}

/// The endpoints of a set of lines and, for each endpoint, its nearest
/// endpoints on other lines.
#[derive(Debug, Clone, Default)]
pub struct EndpointGraph {
    pub endpoints: Vec<Endpoint>,
    /// Keyed by point id; grouped by source endpoint and ordered by distance.
    pub near_table: Vec<NearRecord>,
    /// Lines with no usable vertices; they contribute no endpoints.
    pub skipped_lines: usize,
}

impl EndpointGraph {
    /// Explodes every line into its start and end points and finds, for each
    /// endpoint, the `connection_count` closest endpoints of *other* lines
    /// lying within `search_radius`. Coincident endpoints of distinct lines
    /// are kept as candidates at distance zero.
    pub fn build(
        lines: &[LineFeature],
        search_radius: f64,
        connection_count: usize,
    ) -> Result<EndpointGraph, Error> {
        if !search_radius.is_finite() || search_radius <= 0f64 {
            return Err(Error::new(
                ErrorKind::InvalidInput,
                format!(
                    "The search radius must be greater than zero (found {}).",
                    search_radius
                ),
            ));
        }
        if connection_count == 0 {
            return Err(Error::new(
                ErrorKind::InvalidInput,
                "The connection count must be at least one.",
            ));
        }

        let mut graph = EndpointGraph::default();
        for (line_index, line) in lines.iter().enumerate() {
            let geometry = &line.geometry;
            if geometry.is_empty()
                || !geometry
                    .vertices
                    .iter()
                    .all(|p| p.x.is_finite() && p.y.is_finite())
            {
                graph.skipped_lines += 1;
                continue;
            }
            graph.endpoints.push(Endpoint {
                point_id: first_node_id(line_index),
                line_index,
                line_fid: line.fid,
                point: geometry.first_vertex(),
                role: EndRole::Start,
            });
            graph.endpoints.push(Endpoint {
                point_id: last_node_id(line_index),
                line_index,
                line_fid: line.fid,
                point: geometry.last_vertex(),
                role: EndRole::End,
            });
        }

        let points: Vec<Point2D> = graph.endpoints.iter().map(|e| e.point).collect();
        let endpoints = &graph.endpoints;
        let near_table = generate_point_near_table(
            &points,
            search_radius,
            Some(connection_count),
            |a, b| endpoints[a].line_index == endpoints[b].line_index,
        )?;
        graph.near_table = near_table
            .into_iter()
            .map(|r| {
                NearRecord::new(
                    endpoints[r.in_id].point_id,
                    endpoints[r.near_id].point_id,
                    r.distance,
                )
            })
            .collect();
        Ok(graph)
    }

    pub fn num_endpoints(&self) -> usize {
        self.endpoints.len()
    }

    /// The candidate neighbours of one endpoint, closest first.
    pub fn candidates(&self, point_id: usize) -> Vec<NearRecord> {
        self.near_table
            .iter()
            .filter(|r| r.in_id == point_id)
            .cloned()
            .collect()
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::structures::Polyline;

    fn line(fid: i64, index: usize, pts: &[(f64, f64)]) -> LineFeature {
        let vertices: Vec<Point2D> = pts.iter().map(|&(x, y)| Point2D::new(x, y)).collect();
        LineFeature::new(fid, Polyline::new(&vertices, index))
    }

    #[test]
    fn test_endpoints_carry_owning_line() {
        let lines = vec![
            line(7, 0, &[(0.0, 0.0), (5.0, 5.0), (10.0, 0.0)]),
            line(9, 1, &[(20.0, 0.0), (30.0, 0.0)]),
        ];
        let graph = EndpointGraph::build(&lines, 1.0, 1).unwrap();
        assert_eq!(graph.num_endpoints(), 4);
        for e in &graph.endpoints {
            assert_eq!(e.line_fid, lines[e.line_index].fid);
            assert_eq!(owning_line(e.point_id), e.line_index);
            assert_eq!(is_first_node(e.point_id), e.role == EndRole::Start);
        }
        assert_eq!(graph.endpoints[1].point, Point2D::new(10.0, 0.0));
    }

    #[test]
    fn test_same_line_endpoints_are_not_neighbours() {
        // a short line whose own ends are far closer than any other line
        let lines = vec![
            line(1, 0, &[(0.0, 0.0), (0.5, 0.0)]),
            line(2, 1, &[(3.0, 0.0), (10.0, 0.0)]),
        ];
        let graph = EndpointGraph::build(&lines, 5.0, 1).unwrap();
        for r in &graph.near_table {
            assert_ne!(owning_line(r.in_id), owning_line(r.near_id));
        }
        assert_eq!(graph.candidates(1), vec![NearRecord::new(1, 2, 2.5)]);
        assert_eq!(graph.candidates(0), vec![NearRecord::new(0, 2, 3.0)]);
    }

    #[test]
    fn test_zero_length_and_touching_lines() {
        let lines = vec![
            line(1, 0, &[(4.0, 4.0), (4.0, 4.0)]),
            line(2, 1, &[(4.0, 4.0), (9.0, 4.0)]),
        ];
        let graph = EndpointGraph::build(&lines, 1.0, 2).unwrap();
        assert_eq!(graph.num_endpoints(), 4);
        let from_zero_length = graph.candidates(0);
        assert_eq!(from_zero_length.len(), 1);
        assert_eq!(from_zero_length[0].near_id, 2);
        assert_eq!(from_zero_length[0].distance, 0.0);
    }

    #[test]
    fn test_empty_and_invalid_input() {
        let graph = EndpointGraph::build(&[], 10.0, 1).unwrap();
        assert!(graph.endpoints.is_empty() && graph.near_table.is_empty());

        let lines = vec![LineFeature::new(1, Polyline::new_empty(0))];
        let graph = EndpointGraph::build(&lines, 10.0, 1).unwrap();
        assert_eq!(graph.skipped_lines, 1);

        assert!(EndpointGraph::build(&lines, 0.0, 1).is_err());
        assert!(EndpointGraph::build(&lines, f64::NAN, 1).is_err());
        assert!(EndpointGraph::build(&lines, 1.0, 0).is_err());
    }
}
