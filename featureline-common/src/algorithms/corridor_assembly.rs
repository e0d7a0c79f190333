/*
This code is part of the FeatureLine Tools geospatial analysis library.
Authors: FeatureLine Tools contributors
Created: 10/09/2026
Last Modified: 03/10/2026
License: MIT
*/

use super::bearing::relative_angle;
use super::near_table::generate_line_near_table;
use crate::features::LineFeature;
use crate::structures::Polyline;
use std::io::{Error, ErrorKind};

/// The corridor membership and link statistics of one input line.
#[derive(Debug, Clone, PartialEq)]
pub struct CorridorRecord {
    pub fid: i64,
    pub corridor_id: usize,
    /// Number of lines within the connected range, parallel or not.
    pub link_count: usize,
    /// Statistics of the relative angles to the non-parallel neighbours.
    pub min_link_angle: Option<f64>,
    pub max_link_angle: Option<f64>,
    pub mean_link_angle: Option<f64>,
    pub parallel_present: bool,
    pub bearing: Option<f64>,
}

#[derive(Debug, Clone, Default)]
pub struct CorridorAssembly {
    /// One record per input line, in input order.
    pub records: Vec<CorridorRecord>,
    pub num_corridors: usize,
    /// Lines that have no bearing and so cannot take part in any corridor.
    pub skipped_lines: usize,
}

impl CorridorAssembly {
    pub fn get(&self, fid: i64) -> Option<&CorridorRecord> {
        self.records.iter().find(|r| r.fid == fid)
    }

    /// The fids belonging to each corridor, indexed by `corridor_id - 1`.
    pub fn corridors(&self) -> Vec<Vec<i64>> {
        let mut groups = vec![vec![]; self.num_corridors];
        for r in &self.records {
            groups[r.corridor_id - 1].push(r.fid);
        }
        groups
    }
}

/// Groups lines into corridors: maximal sets connected through chains of
/// neighbours that lie within `connected_range` of one another and whose
/// relative angle is no greater than `parallel_threshold` degrees.
///
/// Corridor ids start at 1 and are handed out in the order in which each
/// corridor's first line appears in `lines`. An isolated line forms a
/// corridor of its own.
pub fn assemble_corridors(
    lines: &[LineFeature],
    connected_range: f64,
    parallel_threshold: f64,
) -> Result<CorridorAssembly, Error> {
    if !connected_range.is_finite() || connected_range < 0f64 {
        return Err(Error::new(
            ErrorKind::InvalidInput,
            format!(
                "The connected range must be zero or greater (found {}).",
                connected_range
            ),
        ));
    }
    if !(0f64..=180f64).contains(&parallel_threshold) {
        return Err(Error::new(
            ErrorKind::InvalidInput,
            format!(
                "The parallel threshold must lie between 0 and 180 degrees (found {}).",
                parallel_threshold
            ),
        ));
    }

    let num_lines = lines.len();
    let bearings: Vec<Option<f64>> = lines
        .iter()
        .map(|l| l.geometry.bearing().filter(|b| b.is_finite()))
        .collect();
    let skipped_lines = bearings.iter().filter(|b| b.is_none()).count();

    // lines without a bearing are replaced by empty stand-ins so that they
    // find no neighbours
    let geometries: Vec<Polyline> = lines
        .iter()
        .enumerate()
        .map(|(i, l)| match bearings[i] {
            Some(_) => Polyline::new(&l.geometry.vertices, i),
            None => Polyline::new_empty(i),
        })
        .collect();
    let near_table = generate_line_near_table(&geometries, &geometries, connected_range, true);

    // neighbour index and relative angle, in near-table order
    let mut edges: Vec<Vec<(usize, f64)>> = vec![vec![]; num_lines];
    for record in &near_table {
        if let (Some(a), Some(b)) = (bearings[record.in_id], bearings[record.near_id]) {
            edges[record.in_id].push((record.near_id, relative_angle(a, b)));
        }
    }
    let is_parallel = |angle: f64| angle <= parallel_threshold;

    let mut corridor_ids = vec![0usize; num_lines];
    let mut visited = vec![false; num_lines];
    let mut corridor_id = 1usize;
    let mut stack = vec![];
    for seed in 0..num_lines {
        if visited[seed] {
            continue;
        }
        visited[seed] = true;
        corridor_ids[seed] = corridor_id;
        for &(n, angle) in &edges[seed] {
            if is_parallel(angle) && !visited[n] {
                stack.push(n);
            }
        }
        while let Some(i) = stack.pop() {
            if visited[i] {
                continue;
            }
            visited[i] = true;
            corridor_ids[i] = corridor_id;
            for &(n, angle) in &edges[i] {
                if is_parallel(angle) && !visited[n] {
                    stack.push(n);
                }
            }
        }
        corridor_id += 1;
    }

    let records = (0..num_lines)
        .map(|i| {
            let oblique: Vec<f64> = edges[i]
                .iter()
                .map(|&(_, angle)| angle)
                .filter(|&angle| !is_parallel(angle))
                .collect();
            let (min_link_angle, max_link_angle, mean_link_angle) = if oblique.is_empty() {
                (None, None, None)
            } else {
                let min = oblique.iter().cloned().fold(f64::INFINITY, f64::min);
                let max = oblique.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
                let mean = oblique.iter().sum::<f64>() / oblique.len() as f64;
                (Some(min), Some(max), Some(mean))
            };
            CorridorRecord {
                fid: lines[i].fid,
                corridor_id: corridor_ids[i],
                link_count: edges[i].len(),
                min_link_angle,
                max_link_angle,
                mean_link_angle,
                parallel_present: edges[i].iter().any(|&(_, angle)| is_parallel(angle)),
                bearing: bearings[i],
            }
        })
        .collect();

    Ok(CorridorAssembly {
        records,
        num_corridors: corridor_id - 1,
        skipped_lines,
    })
}
