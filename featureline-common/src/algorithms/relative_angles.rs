/*
This code is part of the FeatureLine Tools geospatial analysis library.
Authors: FeatureLine Tools contributors
Created: 12/09/2026
Last Modified: 12/09/2026
License: MIT
*/

use super::bearing::relative_angle;
use super::near_table::generate_line_near_table;
use crate::features::LineFeature;
use crate::structures::Polyline;
use std::io::{Error, ErrorKind};

#[derive(Debug, Clone, PartialEq)]
pub struct RelativeAngleRecord {
    pub fid: i64,
    pub bearing: Option<f64>,
    pub reference_count: usize,
    pub smallest_angle: Option<f64>,
    /// The reference line forming `smallest_angle`.
    pub nearest_reference: Option<i64>,
    /// Only set when a threshold was given.
    pub is_parallel: Option<bool>,
}

/// For each target line, the smallest relative angle to any reference line
/// within `search_radius` of it. Equal angles are resolved in favour of the
/// closer reference, then the earlier one.
pub fn relative_angles(
    targets: &[LineFeature],
    references: &[LineFeature],
    search_radius: f64,
    angle_threshold: Option<f64>,
) -> Result<Vec<RelativeAngleRecord>, Error> {
    if !search_radius.is_finite() || search_radius < 0f64 {
        return Err(Error::new(
            ErrorKind::InvalidInput,
            format!(
                "The search radius must be zero or greater (found {}).",
                search_radius
            ),
        ));
    }
    if let Some(threshold) = angle_threshold {
        if !(0f64..=180f64).contains(&threshold) {
            return Err(Error::new(
                ErrorKind::InvalidInput,
                format!(
                    "The angle threshold must lie between 0 and 180 degrees (found {}).",
                    threshold
                ),
            ));
        }
    }

    let target_bearings = bearings_of(targets);
    let reference_bearings = bearings_of(references);
    let near_table = generate_line_near_table(
        &stand_ins(targets, &target_bearings),
        &stand_ins(references, &reference_bearings),
        search_radius,
        false,
    );

    let mut records: Vec<RelativeAngleRecord> = targets
        .iter()
        .enumerate()
        .map(|(i, t)| RelativeAngleRecord {
            fid: t.fid,
            bearing: target_bearings[i],
            reference_count: 0,
            smallest_angle: None,
            nearest_reference: None,
            is_parallel: None,
        })
        .collect();

    // records for one target are in ascending distance order
    for near in &near_table {
        let (target_bearing, reference_bearing) =
            match (target_bearings[near.in_id], reference_bearings[near.near_id]) {
                (Some(a), Some(b)) => (a, b),
                _ => continue,
            };
        let angle = relative_angle(target_bearing, reference_bearing);
        let record = &mut records[near.in_id];
        record.reference_count += 1;
        if record.smallest_angle.map_or(true, |smallest| angle < smallest) {
            record.smallest_angle = Some(angle);
            record.nearest_reference = Some(references[near.near_id].fid);
        }
    }

    if let Some(threshold) = angle_threshold {
        for record in records.iter_mut() {
            record.is_parallel = Some(record.smallest_angle.map_or(false, |a| a <= threshold));
        }
    }
    Ok(records)
}

fn bearings_of(lines: &[LineFeature]) -> Vec<Option<f64>> {
    lines
        .iter()
        .map(|l| l.geometry.bearing().filter(|b| b.is_finite()))
        .collect()
}

fn stand_ins(lines: &[LineFeature], bearings: &[Option<f64>]) -> Vec<Polyline> {
    lines
        .iter()
        .enumerate()
        .map(|(i, l)| match bearings[i] {
            Some(_) => Polyline::new(&l.geometry.vertices, i),
            None => Polyline::new_empty(i),
        })
        .collect()
}
