//! The schedule generator.

use std::sync::Arc;
use std::time::{Duration as StdDuration, Instant};

use tracing::{debug, info, warn};

use crate::error::{ResolutionError, Result};
use crate::generator::blocks::{departures, BlockPlanner, PlannedTrip};
use crate::generator::request::{DirectionPlan, DwellPolicy, GenerationRequest};
use crate::generator::stop_times::{compute_stop_times, compute_stop_times_with};
use crate::identifiers::TripIdentifier;
use crate::models::geometry::{Location, Shape};
use crate::models::schedule::Schedule;
use crate::models::station::Dwell;
use crate::models::trip::{StopTime, Trip};
use crate::models::types::{Direction, ServiceTime};
use crate::resolver::ShapeResolver;

/// Time allowed for each shape resolution unless configured otherwise.
pub const DEFAULT_RESOLVE_TIMEOUT: StdDuration = StdDuration::from_secs(30);

/// Turns a [`GenerationRequest`] into a [`Schedule`].
///
/// The generator holds no mutable state, so one instance can serve concurrent
/// requests from several threads.
#[derive(Clone, Debug)]
pub struct ScheduleGenerator<R> {
    resolver: R,
    resolve_timeout: StdDuration,
}

/// A trip whose times are known but whose vehicle is not.
struct Draft<'a> {
    direction: Direction,
    plan: &'a DirectionPlan,
    departure: ServiceTime,
    stop_times: Vec<StopTime>,
    shape: Arc<Shape>,
}

impl Draft<'_> {
    fn completion(&self) -> ServiceTime {
        self.stop_times
            .iter()
            .map(|st| st.arrival)
            .max()
            .unwrap_or(self.departure)
    }
}

impl<R: ShapeResolver> ScheduleGenerator<R> {
    pub fn new(resolver: R) -> Self {
        Self {
            resolver,
            resolve_timeout: DEFAULT_RESOLVE_TIMEOUT,
        }
    }

    pub fn with_resolve_timeout(mut self, timeout: StdDuration) -> Self {
        self.resolve_timeout = timeout;
        self
    }

    pub fn resolver(&self) -> &R {
        &self.resolver
    }

    pub fn resolve_timeout(&self) -> StdDuration {
        self.resolve_timeout
    }

    /// Generates every trip of the request, or fails with a single error.
    ///
    /// The request is validated before the resolver is called, so parameter
    /// errors never cost a resolution.
    pub fn generate(&self, request: &GenerationRequest) -> Result<Schedule> {
        request.validate()?;
        debug!("generating schedule \"{}\"", request.description);

        let mut drafts = Vec::new();
        for (direction, plan) in request.plans() {
            let shape = Arc::new(self.resolve_shape(direction, plan)?);
            let times = departures(plan.start_time, plan.end_time, request.headway);
            info!(
                "{direction} service on route {}: {} departures between {} and {}",
                plan.route.id(),
                times.len(),
                plan.start_time,
                plan.end_time
            );

            for departure in times {
                let stop_times = self.stop_times(request, plan, &shape, departure)?;
                drafts.push(Draft {
                    direction,
                    plan,
                    departure,
                    stop_times,
                    shape: shape.clone(),
                });
            }
        }

        drafts.sort_by_key(|d| (d.departure, d.direction));

        let planned: Vec<PlannedTrip> = drafts
            .iter()
            .map(|d| PlannedTrip {
                direction: d.direction,
                departure: d.departure,
                completion: d.completion(),
            })
            .collect();
        let alternate = request.plans().count() > 1;
        let vehicles = BlockPlanner::new(request.min_layover, alternate)
            .assign(&planned, |t| request.effective_at(t).fleet)?;

        let trips = drafts
            .into_iter()
            .zip(vehicles)
            .map(|(draft, vehicle)| {
                let id = TripIdentifier::new(format!(
                    "{}:{}:{}",
                    draft.plan.route.id(),
                    draft.direction,
                    draft.departure.compact()
                ));
                Trip::new(
                    id,
                    draft.direction,
                    draft.plan.route.clone(),
                    draft.plan.headsign(),
                    vehicle,
                    draft.stop_times,
                    draft.shape,
                )
            })
            .collect::<std::result::Result<Vec<_>, _>>()?;

        let schedule = Schedule::new(
            request.description.clone(),
            request.availability.clone(),
            trips,
        );
        info!(
            "generated {} trips operated by {} vehicles",
            schedule.trips().len(),
            schedule.vehicle_count()
        );
        Ok(schedule)
    }

    fn resolve_shape(
        &self,
        direction: Direction,
        plan: &DirectionPlan,
    ) -> std::result::Result<Shape, ResolutionError> {
        let locations: Vec<Location> = plan
            .stops
            .iter()
            .map(|stop| *stop.station().location())
            .collect();

        let started = Instant::now();
        let deadline = started + self.resolve_timeout;
        let shape = self.resolver.resolve(&locations, deadline)?;

        if Instant::now() > deadline {
            warn!(
                "{direction} shape resolution took {:?}, longer than the {:?} allowed",
                started.elapsed(),
                self.resolve_timeout
            );
            return Err(ResolutionError::DeadlineExceeded);
        }

        debug!(
            "resolved {direction} shape: {} points, {:.0} m",
            shape.len(),
            shape.length()
        );
        Ok(shape)
    }

    fn stop_times(
        &self,
        request: &GenerationRequest,
        plan: &DirectionPlan,
        shape: &Shape,
        departure: ServiceTime,
    ) -> Result<Vec<StopTime>> {
        let params = request.effective_at(departure);
        match request.dwell_policy {
            DwellPolicy::Fixed => {
                compute_stop_times(&plan.stops, shape, departure, params.speed, params.dwell)
            }
            DwellPolicy::StationRules => compute_stop_times_with(
                &plan.stops,
                shape,
                departure,
                params.speed,
                |stop, arrival| {
                    stop.station()
                        .dwell_at(arrival)
                        .map(Dwell::duration)
                        .unwrap_or(params.dwell)
                },
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use chrono::{Duration, NaiveDate};

    use crate::error::{ConfigurationError, ConsistencyError, ErrorKind, GenerationError};
    use crate::generator::request::PeakOverride;
    use crate::identifiers::{RouteIdentifier, StationIdentifier};
    use crate::models::calendar::Availability;
    use crate::models::geometry::ShapePoint;
    use crate::models::route::Route;
    use crate::models::station::Station;
    use crate::models::types::{Speed, VehicleType};
    use crate::resolver::HaversineShapeResolver;

    /// Places stops 600 m apart and counts how often it is asked.
    #[derive(Default)]
    struct RecordingResolver {
        calls: AtomicUsize,
    }

    impl ShapeResolver for RecordingResolver {
        fn resolve(
            &self,
            locations: &[Location],
            _deadline: Instant,
        ) -> std::result::Result<Shape, ResolutionError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Shape::new(
                locations
                    .iter()
                    .enumerate()
                    .map(|(i, l)| ShapePoint::new(*l, i as f64 * 600.0))
                    .collect(),
            )
            .map_err(ResolutionError::MalformedShape)
        }
    }

    struct FailingResolver;

    impl ShapeResolver for FailingResolver {
        fn resolve(
            &self,
            _locations: &[Location],
            _deadline: Instant,
        ) -> std::result::Result<Shape, ResolutionError> {
            Err(ResolutionError::Provider("routing service unavailable".into()))
        }
    }

    /// Drops the last location from the shape it returns.
    struct TruncatingResolver;

    impl ShapeResolver for TruncatingResolver {
        fn resolve(
            &self,
            locations: &[Location],
            _deadline: Instant,
        ) -> std::result::Result<Shape, ResolutionError> {
            let points = locations[..locations.len() - 1]
                .iter()
                .enumerate()
                .map(|(i, l)| ShapePoint::new(*l, i as f64 * 600.0))
                .collect();
            Shape::new(points).map_err(ResolutionError::MalformedShape)
        }
    }

    struct SlowResolver;

    impl ShapeResolver for SlowResolver {
        fn resolve(
            &self,
            locations: &[Location],
            deadline: Instant,
        ) -> std::result::Result<Shape, ResolutionError> {
            while Instant::now() <= deadline {
                std::thread::sleep(StdDuration::from_millis(1));
            }
            RecordingResolver::default().resolve(locations, deadline)
        }
    }

    fn at(h: u32, m: u32) -> ServiceTime {
        ServiceTime::from_hms(h, m, 0).unwrap()
    }

    fn station(id: &str, name: &str, longitude: f64, dwells: Vec<Dwell>) -> Arc<Station> {
        Arc::new(
            Station::new(
                StationIdentifier::new(id),
                name,
                [VehicleType::Bus],
                Location::new(50.0, longitude).unwrap(),
                dwells,
            )
            .unwrap(),
        )
    }

    fn stations() -> Vec<Arc<Station>> {
        vec![
            station("a", "Alpha", 30.0, vec![]),
            station("b", "Beta", 30.01, vec![]),
            station("c", "Gamma", 30.02, vec![]),
        ]
    }

    fn routes(stations: Vec<Arc<Station>>) -> (Arc<Route>, Arc<Route>) {
        let mut reversed = stations.clone();
        reversed.reverse();
        (
            Arc::new(Route::through(RouteIdentifier::new("7"), stations).unwrap()),
            Arc::new(Route::through(RouteIdentifier::new("7"), reversed).unwrap()),
        )
    }

    fn availability() -> Availability {
        Availability::working_days(
            NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            NaiveDate::from_ymd_opt(2024, 12, 31).unwrap(),
        )
        .unwrap()
    }

    /// Outbound 08:00-09:00 every 15 minutes, 5 m/s, 30 s dwell.
    fn outbound_request() -> GenerationRequest {
        let (outbound, _) = routes(stations());
        GenerationRequest::new(
            "Weekday morning",
            availability(),
            Duration::minutes(15),
            4,
            Duration::seconds(30),
            Speed::meters_per_second(5.0),
            Duration::minutes(5),
        )
        .with_outbound(DirectionPlan::along_route(outbound, at(8, 0), at(9, 0)))
    }

    fn both_directions_request() -> GenerationRequest {
        let (outbound, inbound) = routes(stations());
        outbound_request()
            .with_outbound(DirectionPlan::along_route(outbound, at(8, 0), at(9, 0)))
            .with_inbound(DirectionPlan::along_route(inbound, at(8, 0), at(9, 0)))
    }

    #[test]
    fn test_exclusive_window_end_gives_four_trips() {
        let schedule = ScheduleGenerator::new(RecordingResolver::default())
            .generate(&outbound_request())
            .unwrap();

        let departures: Vec<_> = schedule
            .trips()
            .iter()
            .map(|t| t.stop_times()[0].arrival)
            .collect();
        assert_eq!(departures, vec![at(8, 0), at(8, 15), at(8, 30), at(8, 45)]);
        assert_eq!(schedule.description(), "Weekday morning");
    }

    #[test]
    fn test_trip_contents() {
        let schedule = ScheduleGenerator::new(RecordingResolver::default())
            .generate(&outbound_request())
            .unwrap();

        let trip = &schedule.trips()[0];
        assert_eq!(trip.id().as_str(), "7:outbound:080000");
        assert_eq!(trip.headsign(), "Gamma");
        assert_eq!(trip.direction(), Direction::Outbound);

        // 600 m and 1200 m at 5 m/s
        let arrivals: Vec<_> = trip.stop_times().iter().map(|st| st.arrival).collect();
        assert_eq!(arrivals, vec![at(8, 0), at(8, 2), at(8, 4)]);
        assert_eq!(trip.latest_arrival(), at(8, 4));
        assert!(trip.stop_times().iter().all(|st| st.dwell() == Duration::seconds(30)));
    }

    #[test]
    fn test_window_shorter_than_headway() {
        let mut request = outbound_request();
        if let Some(plan) = request.outbound.as_mut() {
            plan.end_time = at(8, 10);
        }

        let generator = ScheduleGenerator::new(RecordingResolver::default());
        let schedule = generator.generate(&request).unwrap();
        assert!(schedule.is_empty());
        assert_eq!(schedule.vehicle_count(), 0);
        // the shape is still resolved
        assert_eq!(generator.resolver().calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_empty_window_is_configuration_error() {
        let mut request = outbound_request();
        if let Some(plan) = request.outbound.as_mut() {
            plan.end_time = plan.start_time;
        }
        let err = ScheduleGenerator::new(RecordingResolver::default())
            .generate(&request)
            .unwrap_err();
        assert!(matches!(
            err,
            GenerationError::Configuration(ConfigurationError::EmptyWindow { .. })
        ));
    }

    #[test]
    fn test_zero_speed_fails_before_resolution() {
        let mut request = outbound_request();
        request.average_speed = Speed::meters_per_second(0.0);

        let generator = ScheduleGenerator::new(RecordingResolver::default());
        let err = generator.generate(&request).unwrap_err();

        assert_eq!(
            err,
            GenerationError::Configuration(ConfigurationError::NonPositiveSpeed(0.0))
        );
        assert!(!err.is_retryable());
        assert_eq!(generator.resolver().calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_crawling_speed_is_configuration_error() {
        let mut request = outbound_request();
        request.average_speed = Speed::meters_per_second(1e-15);

        let err = ScheduleGenerator::new(RecordingResolver::default())
            .generate(&request)
            .unwrap_err();
        assert!(matches!(
            err,
            GenerationError::Configuration(ConfigurationError::TravelTimeOutOfRange { .. })
        ));
        assert!(!err.is_retryable());
    }

    #[test]
    fn test_single_stop_fails_before_resolution() {
        let mut request = outbound_request();
        if let Some(plan) = request.outbound.as_mut() {
            plan.stops.truncate(1);
        }

        let generator = ScheduleGenerator::new(RecordingResolver::default());
        let err = generator.generate(&request).unwrap_err();

        assert_eq!(
            err,
            GenerationError::Configuration(ConfigurationError::TooFewStops(Direction::Outbound, 1))
        );
        assert_eq!(err.kind(), ErrorKind::Configuration);
        assert!(!err.is_retryable());
        assert_eq!(generator.resolver().calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_each_direction_resolved_once() {
        let generator = ScheduleGenerator::new(RecordingResolver::default());
        let schedule = generator.generate(&both_directions_request()).unwrap();
        assert_eq!(schedule.trips().len(), 8);
        assert_eq!(generator.resolver().calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_generation_is_deterministic() {
        let request = both_directions_request();
        let generator = ScheduleGenerator::new(HaversineShapeResolver::new());

        let first = generator.generate(&request).unwrap();
        let second = generator.generate(&request).unwrap();

        let times = |s: &Schedule| -> Vec<(String, u32, Vec<StopTime>)> {
            s.trips()
                .iter()
                .map(|t| (t.id().to_string(), t.vehicle_id(), t.stop_times().to_vec()))
                .collect()
        };
        assert_eq!(times(&first), times(&second));
    }

    #[test]
    fn test_trips_ordered_by_departure_then_direction() {
        let schedule = ScheduleGenerator::new(RecordingResolver::default())
            .generate(&both_directions_request())
            .unwrap();

        let order: Vec<_> = schedule
            .trips()
            .iter()
            .map(|t| (t.stop_times()[0].arrival, t.direction()))
            .collect();
        let mut sorted = order.clone();
        sorted.sort();
        assert_eq!(order, sorted);
        assert_eq!(order[0], (at(8, 0), Direction::Inbound));
        assert_eq!(order[1], (at(8, 0), Direction::Outbound));
    }

    #[test]
    fn test_layover_chains_opposite_directions() {
        // trips take 4 minutes; with a 5 minute layover a vehicle is ready
        // 9 minutes after departing and takes the next opposite departure
        let schedule = ScheduleGenerator::new(RecordingResolver::default())
            .generate(&both_directions_request())
            .unwrap();

        assert_eq!(schedule.vehicle_count(), 2);
        for trip in schedule.trips() {
            let next = schedule.trips().iter().find(|t| {
                t.vehicle_id() == trip.vehicle_id()
                    && t.stop_times()[0].arrival > trip.stop_times()[0].arrival
            });
            if let Some(next) = next {
                assert_eq!(next.direction(), trip.direction().opposite());
                let ready = trip.latest_arrival().saturating_add(Duration::minutes(5));
                assert!(next.stop_times()[0].arrival >= ready);
            }
        }
    }

    #[test]
    fn test_insufficient_fleet() {
        let mut request = both_directions_request();
        request.fleet_size = 1;
        let err = ScheduleGenerator::new(RecordingResolver::default())
            .generate(&request)
            .unwrap_err();
        assert!(matches!(
            err,
            GenerationError::Configuration(ConfigurationError::InsufficientFleet {
                required: 2,
                available: 1,
                ..
            })
        ));
    }

    #[test]
    fn test_peak_fleet_increase_adds_capacity_only() {
        let mut request = both_directions_request();
        request.fleet_size = 1;
        let request =
            request.with_peak(PeakOverride::new(at(7, 0), at(10, 0)).with_fleet_increase(1));

        let schedule = ScheduleGenerator::new(RecordingResolver::default())
            .generate(&request)
            .unwrap();
        assert_eq!(schedule.trips().len(), 8);
        assert_eq!(schedule.vehicle_count(), 2);
    }

    #[test]
    fn test_peak_speed_and_dwell() {
        let request = outbound_request().with_peak(
            PeakOverride::new(at(8, 15), at(8, 30))
                .with_average_speed(Speed::meters_per_second(10.0))
                .with_dwell_time(Duration::seconds(60)),
        );
        let schedule = ScheduleGenerator::new(RecordingResolver::default())
            .generate(&request)
            .unwrap();

        let trips = schedule.trips();
        assert_eq!(trips[0].latest_arrival(), at(8, 4));
        assert_eq!(trips[1].latest_arrival(), at(8, 17));
        assert_eq!(trips[1].stop_times()[1].dwell(), Duration::seconds(60));
        assert_eq!(trips[2].latest_arrival(), at(8, 34));
    }

    #[test]
    fn test_station_dwell_rules() {
        let busy = Dwell::regular(at(6, 0), at(10, 0), Duration::seconds(90)).unwrap();
        let stations = vec![
            station("a", "Alpha", 30.0, vec![]),
            station("b", "Beta", 30.01, vec![busy]),
            station("c", "Gamma", 30.02, vec![]),
        ];
        let (outbound, _) = routes(stations);
        let request = outbound_request()
            .with_outbound(DirectionPlan::along_route(outbound, at(8, 0), at(8, 15)))
            .with_dwell_policy(DwellPolicy::StationRules);

        let schedule = ScheduleGenerator::new(RecordingResolver::default())
            .generate(&request)
            .unwrap();
        let dwells: Vec<_> = schedule.trips()[0]
            .stop_times()
            .iter()
            .map(StopTime::dwell)
            .collect();
        assert_eq!(
            dwells,
            vec![Duration::seconds(30), Duration::seconds(90), Duration::seconds(30)]
        );
    }

    #[test]
    fn test_resolution_failure_is_retryable() {
        let err = ScheduleGenerator::new(FailingResolver)
            .generate(&outbound_request())
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Resolution);
        assert!(err.is_retryable());
    }

    #[test]
    fn test_resolver_missing_stop_is_consistency_error() {
        let err = ScheduleGenerator::new(TruncatingResolver)
            .generate(&outbound_request())
            .unwrap_err();
        assert!(matches!(
            err,
            GenerationError::Consistency(ConsistencyError::StopNotOnShape { .. })
        ));
        assert!(!err.is_retryable());
    }

    #[test]
    fn test_late_resolution_exceeds_deadline() {
        let err = ScheduleGenerator::new(SlowResolver)
            .with_resolve_timeout(StdDuration::from_millis(5))
            .generate(&outbound_request())
            .unwrap_err();
        assert_eq!(err, GenerationError::Resolution(ResolutionError::DeadlineExceeded));
    }
}
