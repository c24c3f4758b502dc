//! # headway-transit
//!
//! Timetable generation for public-transit routes.
//!
//! Given a route, its stations with their dwell rules, and operating parameters
//! (service window, headway, fleet, speed, layover and optional peak-period
//! overrides), the generator produces every trip of a schedule with arrival and
//! departure times that agree with the route's geometry.
//!
//! ## Features
//!
//! - **Validated model**: routes, stations, shapes and trips can only be built
//!   in a consistent state
//! - **Pluggable shape resolution**: implement [`ShapeResolver`] for your
//!   routing engine, or use the straight-line [`HaversineShapeResolver`]
//! - **Vehicle blocks**: trips are assigned to vehicles honouring the layover
//!   and the available fleet
//! - **Typed errors**: every failure is one [`GenerationError`] telling
//!   retryable resolution failures apart from invalid input
//!
//! ## Example
//!
//! ```
//! use std::sync::Arc;
//! use chrono::{Duration, NaiveDate};
//! use headway_transit::prelude::*;
//!
//! let station = |id: &str, longitude: f64| {
//!     Arc::new(
//!         Station::new(
//!             StationIdentifier::new(id),
//!             id,
//!             [VehicleType::Bus],
//!             Location::new(50.45, longitude).unwrap(),
//!             vec![],
//!         )
//!         .unwrap(),
//!     )
//! };
//!
//! let route = Route::through(
//!     RouteIdentifier::new("24"),
//!     [station("Depot", 30.50), station("Square", 30.51), station("Station", 30.52)],
//! )
//! .unwrap();
//!
//! let request = GenerationRequest::new(
//!     "Weekday morning",
//!     Availability::working_days(
//!         NaiveDate::from_ymd_opt(2024, 9, 2).unwrap(),
//!         NaiveDate::from_ymd_opt(2024, 12, 27).unwrap(),
//!     )
//!     .unwrap(),
//!     Duration::minutes(15),            // headway
//!     3,                                // fleet
//!     Duration::seconds(30),            // dwell
//!     Speed::kilometers_per_hour(20.0), // average speed
//!     Duration::minutes(5),             // layover
//! )
//! .with_outbound(DirectionPlan::along_route(
//!     Arc::new(route),
//!     "07:00".parse().unwrap(),
//!     "08:00".parse().unwrap(),
//! ));
//!
//! let schedule = ScheduleGenerator::new(HaversineShapeResolver::new())
//!     .generate(&request)
//!     .unwrap();
//!
//! assert_eq!(schedule.trips().len(), 4);
//! assert_eq!(schedule.trips()[0].headsign(), "Station");
//! ```

pub mod error;
pub mod generator;
pub mod identifiers;
pub mod models;
pub mod repository;
pub mod resolver;
pub mod spatial;

// Re-exports for convenience
pub mod prelude {
    pub use crate::error::{
        ConfigurationError, ConsistencyError, ErrorKind, GenerationError, OverlapError,
        ResolutionError, Result, TopologyError,
    };
    pub use crate::generator::{
        DirectionPlan, DwellPolicy, GenerationRequest, PeakOverride, ScheduleGenerator,
    };
    pub use crate::identifiers::*;
    pub use crate::models::*;
    pub use crate::repository::{InMemoryRepository, TransitRepository};
    pub use crate::resolver::{HaversineShapeResolver, ShapeResolver};
}

pub use prelude::*;
