//! Pluggable persistence.
//!
//! Implementations can be in-memory, database-backed, or remote.

use std::sync::Arc;

use crate::identifiers::{RouteIdentifier, ScheduleIdentifier, StationIdentifier};
use crate::models::{Route, Schedule, Station};

pub trait TransitRepository: Send + Sync {
    fn get_station(&self, id: &StationIdentifier) -> Option<Arc<Station>>;
    fn get_route(&self, id: &RouteIdentifier) -> Option<Arc<Route>>;
    fn get_schedule(&self, id: &ScheduleIdentifier) -> Option<Arc<Schedule>>;

    /// Stores `station`, replacing any station with the same identifier.
    fn save_station(&mut self, station: Station) -> Arc<Station>;

    /// Stores `route`, replacing any route with the same identifier.
    fn save_route(&mut self, route: Route) -> Arc<Route>;

    /// Stores a complete schedule under a newly assigned identifier.
    fn save_schedule(&mut self, schedule: Schedule) -> ScheduleIdentifier;

    fn all_stations(&self) -> Vec<Arc<Station>>;
    fn all_routes(&self) -> Vec<Arc<Route>>;
}
