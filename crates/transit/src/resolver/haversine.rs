//! Straight-line shapes measured with great-circle distance.

use std::time::Instant;

use geo::Point;

use crate::error::ResolutionError;
use crate::models::geometry::{Location, Shape, ShapePoint};
use crate::resolver::traits::ShapeResolver;
use crate::spatial::cumulative_distances;

/// Connects consecutive locations with straight segments.
///
/// Useful offline and in tests; the distances it reports are lower bounds of
/// what a road or rail path would measure.
#[derive(Clone, Copy, Debug, Default)]
pub struct HaversineShapeResolver;

impl HaversineShapeResolver {
    pub fn new() -> Self {
        Self
    }
}

impl ShapeResolver for HaversineShapeResolver {
    fn resolve(&self, locations: &[Location], deadline: Instant) -> Result<Shape, ResolutionError> {
        if locations.len() < 2 {
            return Err(ResolutionError::TooFewLocations(locations.len()));
        }
        if Instant::now() >= deadline {
            return Err(ResolutionError::DeadlineExceeded);
        }

        let points: Vec<Point> = locations.iter().map(Location::point).collect();
        let shape_points = locations
            .iter()
            .zip(cumulative_distances(&points))
            .map(|(location, distance)| ShapePoint::new(*location, distance))
            .collect();

        Shape::new(shape_points).map_err(ResolutionError::MalformedShape)
    }
}
