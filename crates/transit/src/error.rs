//! Error kinds raised while building the timetable model and generating schedules.

use crate::identifiers::{RouteIdentifier, StationIdentifier};
use crate::models::geometry::Location;
use crate::models::station::Dwell;
use crate::models::types::{Direction, ServiceTime, VehicleType};

/// Invalid generator input. The caller must fix the request.
#[derive(Clone, Debug, PartialEq, thiserror::Error)]
pub enum ConfigurationError {
    #[error("Average speed must be positive, got {0} m/s")]
    NonPositiveSpeed(f64),

    #[error("Fleet size must be at least one vehicle")]
    EmptyFleet,

    #[error("Headway must be positive, got {0}s")]
    NonPositiveHeadway(i64),

    #[error("{name} must not be negative, got {seconds}s")]
    NegativeDuration { name: &'static str, seconds: i64 },

    #[error("{direction} service ends at {end}, which is not after its start {start}")]
    EmptyWindow {
        direction: Direction,
        start: ServiceTime,
        end: ServiceTime,
    },

    #[error("Peak period ends at {end}, which is not after its start {start}")]
    EmptyPeakWindow { start: ServiceTime, end: ServiceTime },

    #[error("At least one direction must be requested")]
    NoDirections,

    #[error("{0} stop list is empty")]
    NoStops(Direction),

    #[error("Station {station} is not served by route {route}")]
    StopNotOnRoute {
        station: StationIdentifier,
        route: RouteIdentifier,
    },

    #[error("Station {station} does not support {vehicle_type:?}")]
    UnsupportedVehicleType {
        station: StationIdentifier,
        vehicle_type: VehicleType,
    },

    #[error(
        "Departure at {departure} needs vehicle #{required} but only {available} are available"
    )]
    InsufficientFleet {
        departure: ServiceTime,
        required: u32,
        available: u32,
    },

    #[error("Travel time of {seconds}s to station {station} is out of range")]
    TravelTimeOutOfRange { station: StationIdentifier, seconds: f64 },

    #[error("{0} needs at least two stops, got {1}")]
    TooFewStops(Direction, usize),

    #[error("Location ({latitude}, {longitude}) is outside [-90, 90] x [-180, 180]")]
    InvalidLocation { latitude: f64, longitude: f64 },

    #[error("Invalid dwell: {0}")]
    InvalidDwell(String),

    #[error("Invalid availability: {0}")]
    InvalidAvailability(String),

    #[error("Invalid service time: {0}")]
    InvalidTime(String),
}

/// Route segments do not form a connected chain.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum TopologyError {
    #[error("Route must contain at least one segment")]
    Empty,

    #[error("Segment {index} ends at {end} but segment {} begins at {next_begin}", .index + 1)]
    Disconnected {
        index: usize,
        end: StationIdentifier,
        next_begin: StationIdentifier,
    },
}

/// Two dwell windows of one station intersect.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[error("Station {station}: dwell #{first_index} {first} overlaps dwell #{second_index} {second}")]
pub struct OverlapError {
    pub station: StationIdentifier,
    pub first_index: usize,
    pub first: Dwell,
    pub second_index: usize,
    pub second: Dwell,
}

/// A trip or shape contradicts the geometry it is built on.
#[derive(Clone, Debug, PartialEq, thiserror::Error)]
pub enum ConsistencyError {
    #[error("Station {station} at {location} has no matching point on the shape")]
    StopNotOnShape {
        station: StationIdentifier,
        location: Location,
    },

    #[error("Trip has no stop times")]
    EmptyTrip,

    #[error("Shape has no points")]
    EmptyShape,

    #[error("Shape distance at point {index} is not finite: {value}")]
    NonFiniteDistance { index: usize, value: f64 },

    #[error("Shape distance decreases at point {index}: {previous} m -> {current} m")]
    DecreasingDistance {
        index: usize,
        previous: f64,
        current: f64,
    },
}

/// The shape resolver could not produce a path. Callers may retry.
#[derive(Clone, Debug, PartialEq, thiserror::Error)]
pub enum ResolutionError {
    #[error("At least two locations are required to resolve a shape, got {0}")]
    TooFewLocations(usize),

    #[error("Shape resolution did not finish before its deadline")]
    DeadlineExceeded,

    #[error("Shape provider failed: {0}")]
    Provider(String),

    #[error("Resolved shape is malformed: {0}")]
    MalformedShape(#[source] ConsistencyError),
}

/// Discriminant of a [`GenerationError`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    Configuration,
    Topology,
    Overlap,
    Consistency,
    Resolution,
}

/// The single error a generation run fails with.
#[derive(Clone, Debug, PartialEq, thiserror::Error)]
pub enum GenerationError {
    #[error(transparent)]
    Configuration(#[from] ConfigurationError),

    #[error(transparent)]
    Topology(#[from] TopologyError),

    #[error(transparent)]
    Overlap(#[from] OverlapError),

    #[error(transparent)]
    Consistency(#[from] ConsistencyError),

    #[error(transparent)]
    Resolution(#[from] ResolutionError),
}

impl GenerationError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Configuration(_) => ErrorKind::Configuration,
            Self::Topology(_) => ErrorKind::Topology,
            Self::Overlap(_) => ErrorKind::Overlap,
            Self::Consistency(_) => ErrorKind::Consistency,
            Self::Resolution(_) => ErrorKind::Resolution,
        }
    }

    /// Only shape resolution depends on an external system and may succeed on retry.
    pub fn is_retryable(&self) -> bool {
        self.kind() == ErrorKind::Resolution
    }
}

pub type Result<T> = std::result::Result<T, GenerationError>;
