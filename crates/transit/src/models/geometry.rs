//! Locations and the physical path a vehicle follows.

use std::fmt;

use geo::{Coord, LineString, Point};
use rstar::RTree;

use crate::error::{ConfigurationError, ConsistencyError};
use crate::spatial::index::ShapePointNode;

const LATITUDE_AMPLITUDE: f64 = 90.0;
const LONGITUDE_AMPLITUDE: f64 = 180.0;

/// A horizontal position in geographic coordinates.
///
/// Equality is exact on both components; stops are matched to shape points
/// by value, never by proximity.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(
    feature = "serde",
    serde(try_from = "(f64, f64)", into = "(f64, f64)")
)]
pub struct Location {
    latitude: f64,
    longitude: f64,
}

impl Location {
    pub fn new(latitude: f64, longitude: f64) -> Result<Self, ConfigurationError> {
        let valid = (-LATITUDE_AMPLITUDE..=LATITUDE_AMPLITUDE).contains(&latitude)
            && (-LONGITUDE_AMPLITUDE..=LONGITUDE_AMPLITUDE).contains(&longitude);
        if !valid {
            return Err(ConfigurationError::InvalidLocation {
                latitude,
                longitude,
            });
        }
        Ok(Self {
            latitude,
            longitude,
        })
    }

    pub fn latitude(&self) -> f64 {
        self.latitude
    }

    pub fn longitude(&self) -> f64 {
        self.longitude
    }

    /// As a `geo` point (x = longitude, y = latitude).
    pub fn point(&self) -> Point {
        Point::new(self.longitude, self.latitude)
    }
}

impl TryFrom<Point> for Location {
    type Error = ConfigurationError;

    fn try_from(point: Point) -> Result<Self, Self::Error> {
        Self::new(point.y(), point.x())
    }
}

impl TryFrom<(f64, f64)> for Location {
    type Error = ConfigurationError;

    /// `(latitude, longitude)`
    fn try_from((latitude, longitude): (f64, f64)) -> Result<Self, Self::Error> {
        Self::new(latitude, longitude)
    }
}

impl From<Location> for (f64, f64) {
    fn from(location: Location) -> Self {
        (location.latitude, location.longitude)
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.latitude, self.longitude)
    }
}

/// A point of a shape with the distance traveled from the shape's origin, in meters.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ShapePoint {
    location: Location,
    distance_traveled: f64,
}

impl ShapePoint {
    pub fn new(location: Location, distance_traveled: f64) -> Self {
        Self {
            location,
            distance_traveled,
        }
    }

    pub fn location(&self) -> &Location {
        &self.location
    }

    pub fn distance_traveled(&self) -> f64 {
        self.distance_traveled
    }
}

/// Ordered sequence of points describing the path a vehicle follows.
#[derive(Clone)]
pub struct Shape {
    points: Vec<ShapePoint>,
    index: RTree<ShapePointNode>,
}

impl Shape {
    /// Fails if `points` is empty, a distance is not finite, or the cumulative
    /// distance ever decreases.
    pub fn new(points: Vec<ShapePoint>) -> Result<Self, ConsistencyError> {
        if points.is_empty() {
            return Err(ConsistencyError::EmptyShape);
        }

        if let Some((index, point)) = points
            .iter()
            .enumerate()
            .find(|(_, p)| !p.distance_traveled.is_finite())
        {
            return Err(ConsistencyError::NonFiniteDistance {
                index,
                value: point.distance_traveled,
            });
        }

        for (i, pair) in points.windows(2).enumerate() {
            let previous = pair[0].distance_traveled;
            let current = pair[1].distance_traveled;
            if current < previous {
                return Err(ConsistencyError::DecreasingDistance {
                    index: i + 1,
                    previous,
                    current,
                });
            }
        }

        let index = RTree::bulk_load(
            points
                .iter()
                .enumerate()
                .map(|(i, p)| ShapePointNode::new(i, p.location.longitude, p.location.latitude))
                .collect(),
        );

        Ok(Self { points, index })
    }

    pub fn points(&self) -> &[ShapePoint] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Total distance traveled along the shape, in meters.
    pub fn length(&self) -> f64 {
        self.points
            .last()
            .map(|p| p.distance_traveled)
            .unwrap_or_default()
    }

    /// The earliest point whose location equals `location`.
    pub fn locate(&self, location: &Location) -> Option<&ShapePoint> {
        self.locate_from(location, 0).map(|(_, point)| point)
    }

    /// The earliest point at or after position `from` whose location equals
    /// `location`, with its position.
    ///
    /// Walking the stops of a trip with `from` set to the previous stop's
    /// position keeps visiting order, so a loop that returns to its first
    /// station matches the closing point rather than the origin.
    pub fn locate_from(&self, location: &Location, from: usize) -> Option<(usize, &ShapePoint)> {
        self.index
            .locate_all_at_point(&[location.longitude, location.latitude])
            .map(|node| node.index)
            .filter(|&i| i >= from)
            .min()
            .map(|i| (i, &self.points[i]))
    }

    pub fn contains(&self, location: &Location) -> bool {
        self.locate(location).is_some()
    }

    pub fn line_string(&self) -> LineString {
        self.points
            .iter()
            .map(|p| Coord {
                x: p.location.longitude,
                y: p.location.latitude,
            })
            .collect()
    }
}

impl fmt::Debug for Shape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Shape").field("points", &self.points).finish()
    }
}

impl PartialEq for Shape {
    fn eq(&self, other: &Self) -> bool {
        self.points == other.points
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn location(latitude: f64, longitude: f64) -> Location {
        Location::new(latitude, longitude).unwrap()
    }

    #[test]
    fn test_location_bounds() {
        assert!(Location::new(90.0, 180.0).is_ok());
        assert!(Location::new(-90.0, -180.0).is_ok());
        assert!(matches!(
            Location::new(90.5, 0.0),
            Err(ConfigurationError::InvalidLocation { .. })
        ));
        assert!(Location::new(0.0, -180.1).is_err());
        assert!(Location::new(f64::NAN, 0.0).is_err());
    }

    #[test]
    fn test_location_value_equality() {
        assert_eq!(location(50.9, 34.8), location(50.9, 34.8));
        assert_ne!(location(50.9, 34.8), location(34.8, 50.9));
    }

    #[test]
    fn test_location_point_round_trip() {
        let loc = location(40.7128, -74.0060);
        let point = loc.point();
        assert_relative_eq!(point.x(), -74.0060);
        assert_relative_eq!(point.y(), 40.7128);
        assert_eq!(Location::try_from(point).unwrap(), loc);
    }

    #[test]
    fn test_shape_rejects_empty_and_decreasing() {
        assert_eq!(Shape::new(vec![]).unwrap_err(), ConsistencyError::EmptyShape);

        let err = Shape::new(vec![
            ShapePoint::new(location(0.0, 0.0), 0.0),
            ShapePoint::new(location(0.0, 1.0), 100.0),
            ShapePoint::new(location(0.0, 2.0), 90.0),
        ])
        .unwrap_err();
        assert!(matches!(err, ConsistencyError::DecreasingDistance { index: 2, .. }));
    }

    #[test]
    fn test_shape_rejects_non_finite_distance() {
        for (index, bad) in [(1, f64::INFINITY), (0, f64::NAN), (2, f64::NEG_INFINITY)] {
            let mut points = vec![
                ShapePoint::new(location(0.0, 0.0), 0.0),
                ShapePoint::new(location(0.0, 1.0), 100.0),
                ShapePoint::new(location(0.0, 2.0), 200.0),
            ];
            points[index] = ShapePoint::new(*points[index].location(), bad);

            match Shape::new(points).unwrap_err() {
                ConsistencyError::NonFiniteDistance { index: at, .. } => assert_eq!(at, index),
                other => panic!("unexpected error {:?}", other),
            }
        }
    }

    #[test]
    fn test_shape_allows_repeated_distance() {
        let shape = Shape::new(vec![
            ShapePoint::new(location(0.0, 0.0), 0.0),
            ShapePoint::new(location(0.0, 1.0), 0.0),
            ShapePoint::new(location(0.0, 2.0), 50.0),
        ])
        .unwrap();
        assert_eq!(shape.len(), 3);
        assert_relative_eq!(shape.length(), 50.0);
    }

    #[test]
    fn test_shape_locate_prefers_earliest_point() {
        let depot = location(10.0, 10.0);
        let shape = Shape::new(vec![
            ShapePoint::new(depot, 0.0),
            ShapePoint::new(location(10.0, 10.5), 400.0),
            ShapePoint::new(depot, 800.0),
        ])
        .unwrap();

        assert_relative_eq!(shape.locate(&depot).unwrap().distance_traveled(), 0.0);
        assert!(shape.contains(&location(10.0, 10.5)));
        assert!(!shape.contains(&location(10.0, 10.25)));

        let (index, closing) = shape.locate_from(&depot, 1).unwrap();
        assert_eq!(index, 2);
        assert_relative_eq!(closing.distance_traveled(), 800.0);
        assert_eq!(shape.locate_from(&location(10.0, 10.5), 2), None);
    }

    #[test]
    fn test_shape_line_string() {
        let shape = Shape::new(vec![
            ShapePoint::new(location(1.0, 2.0), 0.0),
            ShapePoint::new(location(3.0, 4.0), 10.0),
        ])
        .unwrap();
        let line = shape.line_string();
        assert_eq!(line.0.len(), 2);
        assert_eq!(line.0[1], Coord { x: 4.0, y: 3.0 });
    }
}
