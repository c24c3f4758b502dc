//! Spatial query utilities for distance calculations.
//!
//! Uses the Haversine formula for distances on Earth's surface.

use geo::{HaversineDistance, Point};

/// Calculate Haversine distance between two points in meters
pub fn haversine_distance(p1: Point, p2: Point) -> f64 {
    p1.haversine_distance(&p2)
}

/// Cumulative Haversine distance along a polyline, one entry per vertex.
///
/// The first entry is always zero.
pub fn cumulative_distances(points: &[Point]) -> Vec<f64> {
    let mut traveled = 0.0;
    let mut distances = Vec::with_capacity(points.len());
    for (i, point) in points.iter().enumerate() {
        if i > 0 {
            traveled += haversine_distance(points[i - 1], *point);
        }
        distances.push(traveled);
    }
    distances
}
