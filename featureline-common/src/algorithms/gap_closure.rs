/*
This code is part of the FeatureLine Tools geospatial analysis library.
Authors: FeatureLine Tools contributors
Created: 06/09/2026
Last Modified: 02/10/2026
License: MIT
*/

use super::endpoint_graph::{owning_line, Endpoint, EndpointGraph};
use super::near_table::NearRecord;
use crate::features::{
    AttributeField, Attributes, FieldData, FieldDataType, LineFeature, OutputFeature, OutputLayer,
};
use crate::structures::Polyline;
use std::cmp::Ordering;
use std::collections::HashSet;
use std::io::Error;

/// Name of the id field written by the linker; it cannot be transferred.
pub const RESERVED_ID_FIELD: &str = "LINE_ID";

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GapClosureOptions {
    /// When set, a connector B->A is not created once A->B exists, and the
    /// skipped candidate does not use up B's connection quota.
    pub dedupe_reciprocal: bool,
}

impl Default for GapClosureOptions {
    fn default() -> GapClosureOptions {
        GapClosureOptions {
            dedupe_reciprocal: true,
        }
    }
}

/// A straight two-vertex line bridging the endpoints of two different lines.
#[derive(Debug, Clone, PartialEq)]
pub struct ConnectorLine {
    pub a_node: usize,
    pub b_node: usize,
    pub a_line: i64,
    pub b_line: i64,
    pub distance: f64,
    pub geometry: Polyline,
    /// Transferred `A_<field>` and `B_<field>` values.
    pub attributes: Attributes,
}

#[derive(Debug, Clone, Default)]
pub struct GapClosure {
    pub connectors: Vec<ConnectorLine>,
    /// Output schema: A_NODE, B_NODE, NEAR_DIST and the transferred fields.
    pub fields: Vec<AttributeField>,
    /// Requested transfer fields that could not be carried.
    pub dropped_fields: Vec<String>,
    pub skipped_lines: usize,
}

impl GapClosure {
    pub fn to_output_layer(&self) -> OutputLayer {
        let features = self
            .connectors
            .iter()
            .map(|c| {
                let mut attributes = c.attributes.clone();
                attributes.insert("A_NODE".to_string(), FieldData::Int(c.a_node as i64));
                attributes.insert("B_NODE".to_string(), FieldData::Int(c.b_node as i64));
                attributes.insert("NEAR_DIST".to_string(), FieldData::Real(c.distance));
                OutputFeature {
                    geometry: c.geometry.clone(),
                    attributes,
                }
            })
            .collect();
        OutputLayer {
            fields: self.fields.clone(),
            features,
        }
    }
}

/// Creates connector lines between the nearby endpoints of different lines,
/// using the default options.
pub fn close_gaps(
    lines: &[LineFeature],
    transfer_fields: &[String],
    search_radius: f64,
    connection_count: usize,
) -> Result<GapClosure, Error> {
    close_gaps_with_options(
        lines,
        transfer_fields,
        search_radius,
        connection_count,
        &GapClosureOptions::default(),
    )
}

/// Creates connector lines between the nearby endpoints of different lines.
///
/// Each endpoint originates at most `connection_count` connectors, to its
/// closest eligible endpoints within `search_radius`. Values of each of the
/// `transfer_fields` are copied from the source line into `A_<field>` and
/// from the target line into `B_<field>`.
pub fn close_gaps_with_options(
    lines: &[LineFeature],
    transfer_fields: &[String],
    search_radius: f64,
    connection_count: usize,
    options: &GapClosureOptions,
) -> Result<GapClosure, Error> {
    let graph = EndpointGraph::build(lines, search_radius, connection_count)?;
    let mut connectors = link_endpoints(
        &graph.endpoints,
        &graph.near_table,
        connection_count,
        options,
    );

    let (kept_fields, dropped_fields) = split_transfer_fields(lines, transfer_fields);
    let mut fields = vec![
        AttributeField::new("A_NODE", FieldDataType::Int),
        AttributeField::new("B_NODE", FieldDataType::Int),
        AttributeField::new("NEAR_DIST", FieldDataType::Real),
    ];
    for (name, field_type) in &kept_fields {
        fields.push(AttributeField::new(&format!("A_{}", name), *field_type));
        fields.push(AttributeField::new(&format!("B_{}", name), *field_type));
    }

    for c in connectors.iter_mut() {
        let a = &lines[owning_line(c.a_node)];
        let b = &lines[owning_line(c.b_node)];
        for (name, _) in &kept_fields {
            let value_of = |line: &LineFeature| {
                line.attributes.get(name).cloned().unwrap_or(FieldData::Null)
            };
            c.attributes.insert(format!("A_{}", name), value_of(a));
            c.attributes.insert(format!("B_{}", name), value_of(b));
        }
    }

    Ok(GapClosure {
        connectors,
        fields,
        dropped_fields,
        skipped_lines: graph.skipped_lines,
    })
}

/// Turns an endpoint near table into connectors.
///
/// Candidates are visited by source point id, then distance, then table
/// order. Pairs whose endpoints belong to one line are never linked, and ids
/// that do not resolve to an endpoint are ignored. The returned connectors
/// carry no attributes.
pub fn link_endpoints(
    endpoints: &[Endpoint],
    near_table: &[NearRecord],
    connection_count: usize,
    options: &GapClosureOptions,
) -> Vec<ConnectorLine> {
    let num_ids = endpoints.iter().map(|e| e.point_id + 1).max().unwrap_or(0);
    let mut lookup: Vec<Option<usize>> = vec![None; num_ids];
    for (i, e) in endpoints.iter().enumerate() {
        lookup[e.point_id] = Some(i);
    }
    let resolve = |id: usize| lookup.get(id).and_then(|i| *i).map(|i| &endpoints[i]);

    let mut candidates: Vec<&NearRecord> = near_table.iter().collect();
    // sort_by is stable, so equal keys keep their table order
    candidates.sort_by(|a, b| {
        a.in_id.cmp(&b.in_id).then(
            a.distance
                .partial_cmp(&b.distance)
                .unwrap_or(Ordering::Equal),
        )
    });

    let mut emitted_count = vec![0usize; num_ids];
    let mut linked_pairs: HashSet<(usize, usize)> = HashSet::new();
    let mut connectors = vec![];
    for record in candidates {
        let (a, b) = match (resolve(record.in_id), resolve(record.near_id)) {
            (Some(a), Some(b)) => (a, b),
            _ => continue,
        };
        if a.line_index == b.line_index {
            continue;
        }
        if emitted_count[a.point_id] >= connection_count {
            continue;
        }
        let pair = (
            a.point_id.min(b.point_id),
            a.point_id.max(b.point_id),
        );
        if options.dedupe_reciprocal && linked_pairs.contains(&pair) {
            continue;
        }
        linked_pairs.insert(pair);
        emitted_count[a.point_id] += 1;
        connectors.push(ConnectorLine {
            a_node: a.point_id,
            b_node: b.point_id,
            a_line: a.line_fid,
            b_line: b.line_fid,
            distance: record.distance,
            geometry: Polyline::new(&[a.point, b.point], connectors.len()),
            attributes: Attributes::new(),
        });
    }
    connectors
}

/// Separates the requested fields that can be transferred, with their types,
/// from those that cannot.
fn split_transfer_fields(
    lines: &[LineFeature],
    requested: &[String],
) -> (Vec<(String, FieldDataType)>, Vec<String>) {
    let mut kept: Vec<(String, FieldDataType)> = vec![];
    let mut dropped = vec![];
    for name in requested {
        let name = name.trim();
        if name.is_empty() || kept.iter().any(|(k, _)| k == name) {
            continue;
        }
        let present = lines.iter().any(|l| l.attributes.contains_key(name));
        if !present || name.eq_ignore_ascii_case(RESERVED_ID_FIELD) {
            dropped.push(name.to_string());
            continue;
        }
        let field_type = lines
            .iter()
            .filter_map(|l| l.attributes.get(name).and_then(|v| v.data_type()))
            .next()
            .unwrap_or(FieldDataType::Text);
        kept.push((name.to_string(), field_type));
    }
    (kept, dropped)
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::algorithms::endpoint_graph::EndRole;
    use crate::structures::Point2D;

    fn line(fid: i64, index: usize, pts: &[(f64, f64)]) -> LineFeature {
        let vertices: Vec<Point2D> = pts.iter().map(|&(x, y)| Point2D::new(x, y)).collect();
        LineFeature::new(fid, Polyline::new(&vertices, index))
    }

    fn endpoint(point_id: usize, x: f64, y: f64) -> Endpoint {
        Endpoint {
            point_id,
            line_index: point_id / 2,
            line_fid: (point_id / 2) as i64 + 1,
            point: Point2D::new(x, y),
            role: if point_id % 2 == 0 {
                EndRole::Start
            } else {
                EndRole::End
            },
        }
    }

    #[test]
    fn test_two_collinear_lines_get_one_connector() {
        let lines = vec![
            line(1, 0, &[(0.0, 0.0), (10.0, 0.0)]),
            line(2, 1, &[(12.0, 0.0), (22.0, 0.0)]),
        ];
        let result = close_gaps(&lines, &[], 5.0, 1).unwrap();
        assert_eq!(result.connectors.len(), 1);
        let c = &result.connectors[0];
        assert_eq!((c.a_node, c.b_node), (1, 2));
        assert_eq!((c.a_line, c.b_line), (1, 2));
        assert!((c.distance - 2.0).abs() < 1e-9);
        assert!((c.geometry.length() - 2.0).abs() < 1e-9);
        assert_eq!(c.geometry.first_vertex(), Point2D::new(10.0, 0.0));
        assert_eq!(c.geometry.last_vertex(), Point2D::new(12.0, 0.0));
    }

    #[test]
    fn test_never_joins_a_line_to_itself() {
        // a U-shaped line whose ends are one unit apart
        let lines = vec![line(1, 0, &[(0.0, 0.0), (0.0, 5.0), (1.0, 5.0), (1.0, 0.0)])];
        let result = close_gaps(&lines, &[], 10.0, 3).unwrap();
        assert!(result.connectors.is_empty());

        let endpoints = vec![endpoint(0, 0.0, 0.0), endpoint(1, 1.0, 0.0)];
        let table = vec![NearRecord::new(0, 1, 1.0), NearRecord::new(1, 0, 0.0)];
        let connectors = link_endpoints(&endpoints, &table, 5, &GapClosureOptions::default());
        assert!(connectors.is_empty());
    }

    #[test]
    fn test_connection_count_keeps_closest() {
        let lines = vec![
            line(1, 0, &[(0.0, 0.0), (-10.0, 0.0)]),
            line(2, 1, &[(1.0, 0.0), (20.0, 0.0)]),
            line(3, 2, &[(0.0, -2.0), (0.0, -20.0)]),
            line(4, 3, &[(0.0, 3.0), (0.0, 20.0)]),
        ];
        let options = GapClosureOptions {
            dedupe_reciprocal: false,
        };
        let result = close_gaps_with_options(&lines, &[], 5.0, 2, &options).unwrap();
        let from_hub: Vec<usize> = result
            .connectors
            .iter()
            .filter(|c| c.a_node == 0)
            .map(|c| c.b_node)
            .collect();
        assert_eq!(from_hub, vec![2, 4]);
        for id in 0..8 {
            let n = result.connectors.iter().filter(|c| c.a_node == id).count();
            assert!(n <= 2);
        }
        for c in &result.connectors {
            assert_ne!(c.a_line, c.b_line);
        }
    }

    #[test]
    fn test_reciprocal_dedupe_does_not_use_quota() {
        let endpoints = vec![
            endpoint(0, 0.0, 0.0),
            endpoint(2, 1.0, 0.0),
            endpoint(4, 3.0, 0.0),
        ];
        let table = vec![
            NearRecord::new(0, 2, 1.0),
            NearRecord::new(2, 0, 1.0),
            NearRecord::new(2, 4, 2.0),
        ];
        let deduped = link_endpoints(&endpoints, &table, 1, &GapClosureOptions::default());
        let pairs: Vec<(usize, usize)> = deduped.iter().map(|c| (c.a_node, c.b_node)).collect();
        assert_eq!(pairs, vec![(0, 2), (2, 4)]);

        let options = GapClosureOptions {
            dedupe_reciprocal: false,
        };
        let all = link_endpoints(&endpoints, &table, 1, &options);
        let pairs: Vec<(usize, usize)> = all.iter().map(|c| (c.a_node, c.b_node)).collect();
        assert_eq!(pairs, vec![(0, 2), (2, 0)]);
    }

    #[test]
    fn test_coincident_endpoints_are_linked() {
        let lines = vec![
            line(1, 0, &[(0.0, 0.0), (5.0, 0.0)]),
            line(2, 1, &[(5.0, 0.0), (5.0, 5.0)]),
        ];
        let result = close_gaps(&lines, &[], 1.0, 1).unwrap();
        assert_eq!(result.connectors.len(), 1);
        assert_eq!(result.connectors[0].distance, 0.0);
        assert_eq!(
            (result.connectors[0].a_node, result.connectors[0].b_node),
            (1, 2)
        );
    }

    #[test]
    fn test_unresolved_ids_are_ignored() {
        let endpoints = vec![endpoint(0, 0.0, 0.0), endpoint(2, 1.0, 0.0)];
        let table = vec![NearRecord::new(0, 9, 0.5), NearRecord::new(0, 2, 1.0)];
        let connectors = link_endpoints(&endpoints, &table, 1, &GapClosureOptions::default());
        assert_eq!(connectors.len(), 1);
        assert_eq!(connectors[0].b_node, 2);
    }

    #[test]
    fn test_transfer_fields() {
        let lines = vec![
            line(1, 0, &[(0.0, 0.0), (10.0, 0.0)])
                .with_attribute("NAME", FieldData::Text("Main".to_string()))
                .with_attribute("LINE_ID", FieldData::Int(1)),
            line(2, 1, &[(12.0, 0.0), (22.0, 0.0)])
                .with_attribute("NAME", FieldData::Text("Oak".to_string())),
        ];
        let requested: Vec<String> = vec!["NAME", "MISSING", "LINE_ID"]
            .into_iter()
            .map(|s| s.to_string())
            .collect();
        let result = close_gaps(&lines, &requested, 5.0, 1).unwrap();
        let names: Vec<&str> = result.fields.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, vec!["A_NODE", "B_NODE", "NEAR_DIST", "A_NAME", "B_NAME"]);
        assert_eq!(result.dropped_fields, vec!["MISSING", "LINE_ID"]);

        let layer = result.to_output_layer();
        let attrs = &layer.features[0].attributes;
        assert_eq!(attrs.get("A_NAME"), Some(&FieldData::Text("Main".to_string())));
        assert_eq!(attrs.get("B_NAME"), Some(&FieldData::Text("Oak".to_string())));
        assert_eq!(attrs.get("A_NODE"), Some(&FieldData::Int(1)));
    }

    #[test]
    fn test_no_candidates() {
        let result = close_gaps(&[], &[], 5.0, 1).unwrap();
        assert!(result.connectors.is_empty());

        let lines = vec![
            line(1, 0, &[(0.0, 0.0), (1.0, 0.0)]),
            line(2, 1, &[(100.0, 0.0), (101.0, 0.0)]),
        ];
        let result = close_gaps(&lines, &[], 5.0, 1).unwrap();
        assert!(result.connectors.is_empty());
        assert!(close_gaps(&lines, &[], -1.0, 1).is_err());
    }
}
