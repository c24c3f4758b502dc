//! Trips and their computed stop times.

use std::sync::Arc;

use chrono::Duration;

use crate::error::ConsistencyError;
use crate::identifiers::TripIdentifier;
use crate::models::geometry::Shape;
use crate::models::route::Route;
use crate::models::station::Station;
use crate::models::types::{Direction, ServiceTime};

/// A station visited by one trip, with its position in the visiting order.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Stop {
    station: Arc<Station>,
    sequence: u32,
}

impl Stop {
    pub fn new(station: Arc<Station>, sequence: u32) -> Self {
        Self { station, sequence }
    }

    /// Numbers `stations` from zero in the given order.
    pub fn sequence_of(stations: impl IntoIterator<Item = Arc<Station>>) -> Vec<Stop> {
        stations
            .into_iter()
            .enumerate()
            .map(|(i, station)| Self::new(station, i as u32))
            .collect()
    }

    pub fn station(&self) -> &Arc<Station> {
        &self.station
    }

    pub fn sequence(&self) -> u32 {
        self.sequence
    }
}

/// Arrival and departure at one stop of a trip.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StopTime {
    pub arrival: ServiceTime,
    pub departure: ServiceTime,
    pub stop: Stop,
}

impl StopTime {
    pub fn new(stop: Stop, arrival: ServiceTime, departure: ServiceTime) -> Self {
        Self {
            arrival,
            departure,
            stop,
        }
    }

    pub fn dwell(&self) -> Duration {
        self.departure.duration_since(self.arrival)
    }
}

/// One journey of a vehicle over a route in one direction.
///
/// Every stop of the trip lies on the trip's shape; this is checked when the
/// trip is built and the trip cannot be changed afterwards.
#[derive(Clone, Debug)]
pub struct Trip {
    id: TripIdentifier,
    direction: Direction,
    route: Arc<Route>,
    headsign: Arc<str>,
    vehicle_id: u32,
    stop_times: Vec<StopTime>,
    shape: Arc<Shape>,
}

impl Trip {
    pub fn new(
        id: TripIdentifier,
        direction: Direction,
        route: Arc<Route>,
        headsign: impl Into<Arc<str>>,
        vehicle_id: u32,
        stop_times: Vec<StopTime>,
        shape: Arc<Shape>,
    ) -> Result<Self, ConsistencyError> {
        if stop_times.is_empty() {
            return Err(ConsistencyError::EmptyTrip);
        }

        if let Some(missing) = stop_times
            .iter()
            .map(|st| &st.stop.station)
            .find(|station| !shape.contains(station.location()))
        {
            return Err(ConsistencyError::StopNotOnShape {
                station: missing.id().clone(),
                location: *missing.location(),
            });
        }

        Ok(Self {
            id,
            direction,
            route,
            headsign: headsign.into(),
            vehicle_id,
            stop_times,
            shape,
        })
    }

    pub fn id(&self) -> &TripIdentifier {
        &self.id
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    pub fn route(&self) -> &Arc<Route> {
        &self.route
    }

    pub fn headsign(&self) -> &str {
        &self.headsign
    }

    pub fn vehicle_id(&self) -> u32 {
        self.vehicle_id
    }

    pub fn stop_times(&self) -> &[StopTime] {
        &self.stop_times
    }

    pub fn shape(&self) -> &Arc<Shape> {
        &self.shape
    }

    /// Nominal completion time: the latest arrival over all stops.
    pub fn latest_arrival(&self) -> ServiceTime {
        self.stop_times
            .iter()
            .map(|st| st.arrival)
            .max()
            .unwrap_or_default()
    }

    pub fn earliest_departure(&self) -> ServiceTime {
        self.stop_times
            .iter()
            .map(|st| st.departure)
            .min()
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::identifiers::{RouteIdentifier, StationIdentifier};
    use crate::models::geometry::{Location, ShapePoint};
    use crate::models::types::VehicleType;

    fn station(id: &str, longitude: f64) -> Arc<Station> {
        Arc::new(
            Station::new(
                StationIdentifier::new(id),
                id,
                [VehicleType::Bus],
                Location::new(50.0, longitude).unwrap(),
                vec![],
            )
            .unwrap(),
        )
    }

    fn at(seconds: u32) -> ServiceTime {
        ServiceTime::from_seconds(8 * 3600 + seconds)
    }

    struct Fixture {
        route: Arc<Route>,
        stops: Vec<Stop>,
        points: Vec<ShapePoint>,
    }

    fn fixture() -> Fixture {
        let stations = vec![station("a", 30.0), station("b", 30.01), station("c", 30.02)];
        let route = Arc::new(Route::through(RouteIdentifier::new("r"), stations.clone()).unwrap());
        let points = stations
            .iter()
            .enumerate()
            .map(|(i, s)| ShapePoint::new(*s.location(), i as f64 * 700.0))
            .collect();
        Fixture {
            route,
            stops: Stop::sequence_of(stations),
            points,
        }
    }

    fn stop_times(stops: &[Stop]) -> Vec<StopTime> {
        stops
            .iter()
            .enumerate()
            .map(|(i, stop)| {
                let offset = i as u32 * 140;
                StopTime::new(stop.clone(), at(offset), at(offset + 30))
            })
            .collect()
    }

    #[test]
    fn test_trip_on_covering_shape() {
        let f = fixture();
        let shape = Arc::new(Shape::new(f.points).unwrap());
        let trip = Trip::new(
            TripIdentifier::new("t1"),
            Direction::Outbound,
            f.route.clone(),
            "C",
            1,
            stop_times(&f.stops),
            shape,
        )
        .unwrap();

        assert_eq!(trip.headsign(), "C");
        assert_eq!(trip.vehicle_id(), 1);
        assert_eq!(trip.stop_times().len(), 3);
        assert_eq!(trip.latest_arrival(), at(280));
        assert_eq!(trip.earliest_departure(), at(30));
        assert_eq!(trip.stop_times()[1].dwell(), Duration::seconds(30));
    }

    #[test]
    fn test_removing_any_covering_point_fails() {
        let f = fixture();
        for removed in 0..f.points.len() {
            let mut points = f.points.clone();
            let gone = points.remove(removed);
            let shape = Arc::new(Shape::new(points).unwrap());

            let err = Trip::new(
                TripIdentifier::new("t1"),
                Direction::Inbound,
                f.route.clone(),
                "A",
                1,
                stop_times(&f.stops),
                shape,
            )
            .unwrap_err();

            match err {
                ConsistencyError::StopNotOnShape { location, .. } => {
                    assert_eq!(&location, gone.location())
                }
                other => panic!("unexpected error {:?}", other),
            }
        }
    }

    #[test]
    fn test_empty_trip_rejected() {
        let f = fixture();
        let shape = Arc::new(Shape::new(f.points).unwrap());
        let err = Trip::new(
            TripIdentifier::new("t1"),
            Direction::Inbound,
            f.route,
            "A",
            1,
            vec![],
            shape,
        )
        .unwrap_err();
        assert_eq!(err, ConsistencyError::EmptyTrip);
    }

    #[test]
    fn test_latest_arrival_ignores_input_order() {
        let f = fixture();
        let shape = Arc::new(Shape::new(f.points).unwrap());
        let mut times = stop_times(&f.stops);
        times.reverse();
        let trip = Trip::new(
            TripIdentifier::new("t1"),
            Direction::Inbound,
            f.route,
            "A",
            1,
            times,
            shape,
        )
        .unwrap();
        assert_eq!(trip.latest_arrival(), at(280));
    }
}
