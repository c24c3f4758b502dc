//! In-memory repository.

use std::collections::HashMap;
use std::sync::Arc;

use crate::identifiers::{RouteIdentifier, ScheduleIdentifier, StationIdentifier};
use crate::models::{Route, Schedule, Station};
use crate::repository::traits::TransitRepository;

/// `HashMap`-backed repository.
///
/// Cheap to clone: all values are stored in `Arc`s.
#[derive(Clone, Debug, Default)]
pub struct InMemoryRepository {
    stations: HashMap<StationIdentifier, Arc<Station>>,
    routes: HashMap<RouteIdentifier, Arc<Route>>,
    schedules: HashMap<ScheduleIdentifier, Arc<Schedule>>,
    next_schedule: u64,
}

impl InMemoryRepository {
    /// Create a new empty repository
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a repository from already validated stations and routes.
    pub fn from_data(stations: Vec<Station>, routes: Vec<Route>) -> Self {
        let mut repository = Self::new();
        for station in stations {
            repository.save_station(station);
        }
        for route in routes {
            repository.save_route(route);
        }
        repository
    }

    pub fn schedule_count(&self) -> usize {
        self.schedules.len()
    }
}

impl TransitRepository for InMemoryRepository {
    fn get_station(&self, id: &StationIdentifier) -> Option<Arc<Station>> {
        self.stations.get(id).cloned()
    }

    fn get_route(&self, id: &RouteIdentifier) -> Option<Arc<Route>> {
        self.routes.get(id).cloned()
    }

    fn get_schedule(&self, id: &ScheduleIdentifier) -> Option<Arc<Schedule>> {
        self.schedules.get(id).cloned()
    }

    fn save_station(&mut self, station: Station) -> Arc<Station> {
        let station = Arc::new(station);
        self.stations.insert(station.id().clone(), station.clone());
        station
    }

    fn save_route(&mut self, route: Route) -> Arc<Route> {
        let route = Arc::new(route);
        self.routes.insert(route.id().clone(), route.clone());
        route
    }

    fn save_schedule(&mut self, schedule: Schedule) -> ScheduleIdentifier {
        self.next_schedule += 1;
        let id = ScheduleIdentifier::new(format!("schedule-{}", self.next_schedule));
        self.schedules.insert(id.clone(), Arc::new(schedule));
        id
    }

    fn all_stations(&self) -> Vec<Arc<Station>> {
        let mut stations: Vec<_> = self.stations.values().cloned().collect();
        stations.sort_by(|a, b| a.id().cmp(b.id()));
        stations
    }

    fn all_routes(&self) -> Vec<Arc<Route>> {
        let mut routes: Vec<_> = self.routes.values().cloned().collect();
        routes.sort_by(|a, b| a.id().cmp(b.id()));
        routes
    }
}
