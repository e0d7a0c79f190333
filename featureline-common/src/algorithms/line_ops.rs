/*
This code is part of the FeatureLine Tools geospatial analysis library.
Authors: FeatureLine Tools contributors
Created: 15/09/2026
Last Modified: 04/10/2026
License: MIT
*/

use crate::structures::{Point2D, Polyline};
use std::io::{Error, ErrorKind};

/// Splits whose computed piece count lands within this much of a whole
/// number are not given an extra sliver piece.
const COUNT_TOLERANCE: f64 = 1e-9;

/// Shortens a line by `pull_value` at its start, its end, or both.
///
/// Returns `None` when the line is not longer than the total amount pulled.
pub fn pull_line(
    polyline: &Polyline,
    pull_value: f64,
    pull_start: bool,
    pull_end: bool,
) -> Option<Polyline> {
    if !pull_value.is_finite() || pull_value < 0f64 {
        return None;
    }
    let length = polyline.length();
    let start = if pull_start { pull_value } else { 0f64 };
    let end = if pull_end { length - pull_value } else { length };
    if end <= start && (pull_start || pull_end) {
        return None;
    }
    polyline.segment_along_line(start, end)
}

/// Splits a line into pieces of `length`.
///
/// With `best_fit` the piece length is adjusted so that the line divides into
/// the nearest whole number of equal pieces; otherwise every piece but the
/// last is exactly `length` long. `overlap_percentage` extends each piece
/// past its interior boundaries by that share of the piece length.
pub fn split_by_length(
    polyline: &Polyline,
    length: f64,
    overlap_percentage: f64,
    best_fit: bool,
) -> Result<Vec<Polyline>, Error> {
    if !length.is_finite() || length <= 0f64 {
        return Err(Error::new(
            ErrorKind::InvalidInput,
            format!("The split length must be greater than zero (found {}).", length),
        ));
    }
    check_overlap(overlap_percentage)?;
    let total = polyline.length();
    if polyline.len() < 2 || total <= 0f64 {
        return Ok(vec![]);
    }

    let (piece_length, num_pieces) = if best_fit {
        let n = (total / length).round().max(1f64);
        (total / n, n as usize)
    } else {
        let n = (total / length - COUNT_TOLERANCE).ceil().max(1f64);
        (length, n as usize)
    };
    Ok(split_into(polyline, piece_length, num_pieces, overlap_percentage))
}

/// Splits a line into `count` pieces of equal length.
pub fn split_by_count(
    polyline: &Polyline,
    count: usize,
    overlap_percentage: f64,
) -> Result<Vec<Polyline>, Error> {
    if count == 0 {
        return Err(Error::new(
            ErrorKind::InvalidInput,
            "The split count must be at least one.",
        ));
    }
    check_overlap(overlap_percentage)?;
    let total = polyline.length();
    if polyline.len() < 2 || total <= 0f64 {
        return Ok(vec![]);
    }
    Ok(split_into(
        polyline,
        total / count as f64,
        count,
        overlap_percentage,
    ))
}

fn check_overlap(overlap_percentage: f64) -> Result<(), Error> {
    if !overlap_percentage.is_finite() || overlap_percentage < 0f64 {
        return Err(Error::new(
            ErrorKind::InvalidInput,
            format!(
                "The overlap percentage must be zero or greater (found {}).",
                overlap_percentage
            ),
        ));
    }
    Ok(())
}

fn split_into(
    polyline: &Polyline,
    piece_length: f64,
    num_pieces: usize,
    overlap_percentage: f64,
) -> Vec<Polyline> {
    let total = polyline.length();
    let extension = overlap_percentage / 100f64 * piece_length;
    let mut pieces = Vec::with_capacity(num_pieces);
    for i in 0..num_pieces {
        let mut start = i as f64 * piece_length;
        let mut end = if i == num_pieces - 1 {
            total
        } else {
            ((i + 1) as f64 * piece_length).min(total)
        };
        if i > 0 {
            start = (start - extension).max(0f64);
        }
        if i < num_pieces - 1 {
            end = (end + extension).min(total);
        }
        if let Some(mut piece) = polyline.segment_along_line(start, end) {
            piece.id = i;
            pieces.push(piece);
        }
    }
    pieces
}

/// The part of a line of `sample_length` centred on its mid-length point.
/// The whole line is returned when the sample would not be shorter than it.
pub fn sample_from_centre(polyline: &Polyline, sample_length: f64) -> Option<Polyline> {
    let total = polyline.length();
    if !(sample_length > 0f64) || sample_length >= total {
        return Some(polyline.clone());
    }
    let mid = total / 2f64;
    polyline.segment_along_line(mid - sample_length / 2f64, mid + sample_length / 2f64)
}

/// A two-vertex line crossing `polyline` at its mid-length point,
/// perpendicular to the bearing of the centre sample and reaching `width`
/// to either side.
pub fn whisker(polyline: &Polyline, width: f64, sample_length: Option<f64>) -> Option<Polyline> {
    if !width.is_finite() || width <= 0f64 {
        return None;
    }
    let centre = polyline.point_along_line(polyline.length() / 2f64)?;
    let sample = match sample_length {
        Some(s) => sample_from_centre(polyline, s)?,
        None => polyline.clone(),
    };
    let bearing = sample.bearing()?.to_radians();
    // bearing is clockwise from north, so its direction is (sin, cos)
    let (dx, dy) = (bearing.cos() * width, -bearing.sin() * width);
    Some(Polyline::new(
        &[
            Point2D::new(centre.x - dx, centre.y - dy),
            Point2D::new(centre.x + dx, centre.y + dy),
        ],
        polyline.id,
    ))
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::algorithms::relative_angle;

    fn straight(length: f64) -> Polyline {
        Polyline::new(&[Point2D::new(0.0, 0.0), Point2D::new(length, 0.0)], 0)
    }

    fn close(a: &Point2D, b: &Point2D) -> bool {
        a.distance(b) < 1e-9
    }

    fn l_shape() -> Polyline {
        Polyline::new(
            &[
                Point2D::new(0.0, 0.0),
                Point2D::new(10.0, 0.0),
                Point2D::new(10.0, 10.0),
            ],
            0,
        )
    }

    #[test]
    fn test_pull_line() {
        let pl = straight(10.0);
        let pulled = pull_line(&pl, 2.0, true, true).unwrap();
        assert_eq!(
            pulled.vertices,
            vec![Point2D::new(2.0, 0.0), Point2D::new(8.0, 0.0)]
        );
        assert!((pull_line(&pl, 2.0, true, false).unwrap().length() - 8.0).abs() < 1e-9);
        assert!((pull_line(&pl, 3.0, false, true).unwrap().length() - 7.0).abs() < 1e-9);
        assert_eq!(pull_line(&pl, 2.0, false, false), Some(pl.clone()));
        assert!(pull_line(&pl, 5.0, true, true).is_none());
        assert!(pull_line(&pl, 11.0, true, false).is_none());
    }

    #[test]
    fn test_split_by_length_with_remainder() {
        let pieces = split_by_length(&straight(25.0), 10.0, 0.0, false).unwrap();
        let lengths: Vec<f64> = pieces.iter().map(|p| p.length()).collect();
        assert_eq!(lengths.len(), 3);
        assert!((lengths[0] - 10.0).abs() < 1e-9);
        assert!((lengths[2] - 5.0).abs() < 1e-9);
        assert!((lengths.iter().sum::<f64>() - 25.0).abs() < 1e-9);

        let pieces = split_by_length(&straight(20.0), 10.0, 0.0, false).unwrap();
        assert_eq!(pieces.len(), 2);
    }

    #[test]
    fn test_split_by_length_best_fit() {
        let pieces = split_by_length(&straight(24.0), 10.0, 0.0, true).unwrap();
        assert_eq!(pieces.len(), 2);
        for p in &pieces {
            assert!((p.length() - 12.0).abs() < 1e-9);
        }
        // shorter than one piece still yields the whole line
        let pieces = split_by_length(&straight(3.0), 10.0, 0.0, true).unwrap();
        assert_eq!(pieces.len(), 1);
        assert!(split_by_length(&straight(3.0), 0.0, 0.0, true).is_err());
    }

    #[test]
    fn test_split_by_count_covers_line() {
        let pl = l_shape();
        let pieces = split_by_count(&pl, 4, 0.0).unwrap();
        assert_eq!(pieces.len(), 4);
        assert_eq!(pieces[0].first_vertex(), pl.first_vertex());
        assert_eq!(pieces[3].last_vertex(), pl.last_vertex());
        for w in pieces.windows(2) {
            assert!(close(&w[0].last_vertex(), &w[1].first_vertex()));
        }
        let total: f64 = pieces.iter().map(|p| p.length()).sum();
        assert!((total - pl.length()).abs() < 1e-9);
        assert!(split_by_count(&pl, 0, 0.0).is_err());
    }

    #[test]
    fn test_split_overlap() {
        let pieces = split_by_count(&straight(20.0), 2, 10.0).unwrap();
        assert_eq!(pieces.len(), 2);
        assert!(close(&pieces[0].last_vertex(), &Point2D::new(11.0, 0.0)));
        assert!(close(&pieces[1].first_vertex(), &Point2D::new(9.0, 0.0)));
        assert_eq!(pieces[0].first_vertex(), Point2D::new(0.0, 0.0));
        assert_eq!(pieces[1].last_vertex(), Point2D::new(20.0, 0.0));
    }

    #[test]
    fn test_whisker_is_perpendicular_and_centred() {
        let pl = straight(10.0);
        let w = whisker(&pl, 3.0, None).unwrap();
        assert_eq!(w.len(), 2);
        assert!((w.length() - 6.0).abs() < 1e-9);
        let centre = Point2D::midpoint(&w.first_vertex(), &w.last_vertex());
        assert!(close(&centre, &Point2D::new(5.0, 0.0)));
        let angle = relative_angle(w.bearing().unwrap(), pl.bearing().unwrap());
        assert!((angle - 90.0).abs() < 1e-9);
    }

    #[test]
    fn test_whisker_uses_centre_sample() {
        let pl = l_shape();
        let w = whisker(&pl, 1.0, Some(4.0)).unwrap();
        let centre = Point2D::midpoint(&w.first_vertex(), &w.last_vertex());
        assert!(close(&centre, &Point2D::new(10.0, 0.0)));
        // the sample runs from (8, 0) to (10, 2), a bearing of 45 degrees
        let angle = relative_angle(w.bearing().unwrap(), 45.0);
        assert!((angle - 90.0).abs() < 1e-9);
        assert!(whisker(&pl, 0.0, None).is_none());
        assert!(whisker(&Polyline::new_empty(0), 1.0, None).is_none());
    }
}
