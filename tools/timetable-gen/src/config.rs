//! JSON description of the network and of the service to generate.

use anyhow::{bail, Context, Result};
use chrono::{Duration, NaiveDate, Weekday};
use headway_transit::prelude::*;
use serde::Deserialize;
use std::path::Path;
use std::sync::Arc;

#[derive(Debug, Deserialize)]
pub struct Config {
    pub description: String,
    pub availability: AvailabilityConfig,
    pub stations: Vec<StationConfig>,
    pub routes: Vec<RouteConfig>,
    pub inbound: Option<DirectionConfig>,
    pub outbound: Option<DirectionConfig>,
    pub headway_secs: i64,
    pub fleet_size: u32,
    pub dwell_secs: i64,
    pub speed_kmh: f64,
    #[serde(default)]
    pub layover_secs: i64,
    pub peak: Option<PeakConfig>,
    #[serde(default)]
    pub dwell_policy: DwellPolicy,
    pub vehicle_type: Option<VehicleType>,
}

#[derive(Debug, Deserialize)]
pub struct AvailabilityConfig {
    pub start_date: NaiveDate,
    pub end_date: Option<NaiveDate>,
    /// Day names such as "mon" or "Monday"
    pub weekdays: Vec<String>,
    #[serde(default)]
    pub added_dates: Vec<NaiveDate>,
    #[serde(default)]
    pub removed_dates: Vec<NaiveDate>,
}

#[derive(Debug, Deserialize)]
pub struct StationConfig {
    pub id: StationIdentifier,
    pub name: String,
    /// `[latitude, longitude]`
    pub location: Location,
    pub vehicle_types: Vec<VehicleType>,
    #[serde(default)]
    pub dwells: Vec<DwellConfig>,
}

#[derive(Debug, Deserialize)]
pub struct DwellConfig {
    pub start: ServiceTime,
    pub end: ServiceTime,
    pub seconds: i64,
    #[serde(default = "regular")]
    pub kind: DwellKind,
}

fn regular() -> DwellKind {
    DwellKind::Regular
}

#[derive(Debug, Deserialize)]
pub struct RouteConfig {
    pub id: RouteIdentifier,
    /// Station ids in travel order
    pub stations: Vec<StationIdentifier>,
}

#[derive(Debug, Deserialize)]
pub struct DirectionConfig {
    pub route: RouteIdentifier,
    /// Station ids served; every station of the route when absent
    pub stops: Option<Vec<StationIdentifier>>,
    pub start_time: ServiceTime,
    pub end_time: ServiceTime,
    pub headsign: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct PeakConfig {
    pub start_time: ServiceTime,
    pub end_time: ServiceTime,
    #[serde(default)]
    pub fleet_increase: u32,
    pub dwell_secs: Option<i64>,
    pub speed_kmh: Option<f64>,
}

/// Read and parse a configuration file
pub fn load_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse config from: {}", path.display()))
}

impl Config {
    /// Store the stations and routes, then assemble the generation request from them.
    pub fn build(&self) -> Result<(InMemoryRepository, GenerationRequest)> {
        let mut repository = InMemoryRepository::new();

        for station in &self.stations {
            let dwells = station
                .dwells
                .iter()
                .map(|d| -> Result<Dwell> {
                    Ok(Dwell::new(d.start, d.end, seconds("dwell", d.seconds)?, d.kind)?)
                })
                .collect::<Result<Vec<_>>>()
                .with_context(|| format!("Invalid dwell at station {}", station.id))?;

            let station = Station::new(
                station.id.clone(),
                station.name.as_str(),
                station.vehicle_types.iter().copied(),
                station.location,
                dwells,
            )?;
            repository.save_station(station);
        }
        log::debug!("Loaded {} stations", self.stations.len());

        for route in &self.routes {
            let stations = lookup_stations(&repository, &route.stations)
                .with_context(|| format!("Invalid route {}", route.id))?;
            repository.save_route(Route::through(route.id.clone(), stations)?);
        }
        log::debug!("Loaded {} routes", self.routes.len());

        let mut request = GenerationRequest::new(
            self.description.clone(),
            self.availability.build()?,
            seconds("headway_secs", self.headway_secs)?,
            self.fleet_size,
            seconds("dwell_secs", self.dwell_secs)?,
            Speed::kilometers_per_hour(self.speed_kmh),
            seconds("layover_secs", self.layover_secs)?,
        )
        .with_dwell_policy(self.dwell_policy);

        if let Some(inbound) = &self.inbound {
            request = request.with_inbound(inbound.build(&repository)?);
        }
        if let Some(outbound) = &self.outbound {
            request = request.with_outbound(outbound.build(&repository)?);
        }
        if let Some(peak) = &self.peak {
            request = request.with_peak(peak.build()?);
        }
        if let Some(vehicle_type) = self.vehicle_type {
            request = request.with_vehicle_type(vehicle_type);
        }

        Ok((repository, request))
    }
}

impl AvailabilityConfig {
    fn build(&self) -> Result<Availability> {
        let weekdays = self
            .weekdays
            .iter()
            .map(|day| {
                day.parse::<Weekday>()
                    .map_err(|_| anyhow::anyhow!("Unknown day of the week: {day}"))
            })
            .collect::<Result<WeekdayFlags>>()?;

        Ok(Availability::new(self.start_date, self.end_date, weekdays)?
            .with_added_dates(self.added_dates.iter().copied())
            .with_removed_dates(self.removed_dates.iter().copied()))
    }
}

impl DirectionConfig {
    fn build(&self, repository: &InMemoryRepository) -> Result<DirectionPlan> {
        let route = repository
            .get_route(&self.route)
            .with_context(|| format!("Unknown route: {}", self.route))?;

        let mut plan = match &self.stops {
            Some(ids) => {
                let stations = lookup_stations(repository, ids)?;
                DirectionPlan::new(
                    route,
                    Stop::sequence_of(stations),
                    self.start_time,
                    self.end_time,
                )
            }
            None => DirectionPlan::along_route(route, self.start_time, self.end_time),
        };
        if let Some(headsign) = &self.headsign {
            plan = plan.with_headsign(headsign.as_str());
        }
        Ok(plan)
    }
}

impl PeakConfig {
    fn build(&self) -> Result<PeakOverride> {
        let mut peak = PeakOverride::new(self.start_time, self.end_time)
            .with_fleet_increase(self.fleet_increase);
        if let Some(dwell_secs) = self.dwell_secs {
            peak = peak.with_dwell_time(seconds("peak.dwell_secs", dwell_secs)?);
        }
        if let Some(kmh) = self.speed_kmh {
            peak = peak.with_average_speed(Speed::kilometers_per_hour(kmh));
        }
        Ok(peak)
    }
}

/// A whole number of seconds as a duration, rejecting values chrono cannot hold.
fn seconds(field: &str, value: i64) -> Result<Duration> {
    Duration::try_seconds(value).with_context(|| format!("{field} of {value}s is out of range"))
}

fn lookup_stations(
    repository: &InMemoryRepository,
    ids: &[StationIdentifier],
) -> Result<Vec<Arc<Station>>> {
    if ids.is_empty() {
        bail!("No stations listed");
    }
    ids.iter()
        .map(|id| {
            repository
                .get_station(id)
                .with_context(|| format!("Unknown station: {id}"))
        })
        .collect()
}
