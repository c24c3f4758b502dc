//! Timetable domain model.

pub mod calendar;
pub mod geometry;
pub mod route;
pub mod schedule;
pub mod station;
pub mod trip;
pub mod types;

// Re-exports for convenience
pub use calendar::{Availability, WeekdayFlags};
pub use geometry::{Location, Shape, ShapePoint};
pub use route::{Route, Segment};
pub use schedule::Schedule;
pub use station::{Dwell, DwellKind, Station};
pub use trip::{Stop, StopTime, Trip};
pub use types::{Direction, ServiceTime, Speed, VehicleType, SECONDS_PER_DAY};
