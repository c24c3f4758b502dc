//! Parameters of one generation run.

use std::sync::Arc;

use chrono::Duration;

use crate::error::ConfigurationError;
use crate::models::calendar::Availability;
use crate::models::route::Route;
use crate::models::trip::Stop;
use crate::models::types::{Direction, ServiceTime, Speed, VehicleType};

/// Where stop dwell times come from.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum DwellPolicy {
    /// The request's dwell time (or the peak dwell) at every stop.
    #[default]
    Fixed,
    /// The station's dwell rule applying at the computed arrival, falling back
    /// to the request's dwell time where the station has none.
    StationRules,
}

/// Service in one direction: the route, the stops served and the window in
/// which trips depart.
///
/// Departures are `start_time`, `start_time + headway`, ... for as long as a
/// full headway still fits before `end_time`.
#[derive(Clone, Debug)]
pub struct DirectionPlan {
    pub route: Arc<Route>,
    pub stops: Vec<Stop>,
    pub start_time: ServiceTime,
    pub end_time: ServiceTime,
    pub headsign: Option<String>,
}

impl DirectionPlan {
    pub fn new(
        route: Arc<Route>,
        stops: Vec<Stop>,
        start_time: ServiceTime,
        end_time: ServiceTime,
    ) -> Self {
        Self {
            route,
            stops,
            start_time,
            end_time,
            headsign: None,
        }
    }

    /// Serves every station of `route` in order.
    pub fn along_route(route: Arc<Route>, start_time: ServiceTime, end_time: ServiceTime) -> Self {
        let stops = Stop::sequence_of(route.stations());
        Self::new(route, stops, start_time, end_time)
    }

    pub fn with_headsign(mut self, headsign: impl Into<String>) -> Self {
        self.headsign = Some(headsign.into());
        self
    }

    /// The explicit headsign, or the name of the last stop's station.
    pub fn headsign(&self) -> &str {
        match &self.headsign {
            Some(headsign) => headsign,
            None => self.stops.last().map(|s| s.station().name()).unwrap_or_default(),
        }
    }
}

/// Operating parameters that replace the base values for departures inside
/// `[start_time, end_time)`.
#[derive(Clone, Debug, PartialEq)]
pub struct PeakOverride {
    pub start_time: ServiceTime,
    pub end_time: ServiceTime,
    /// Extra vehicles available on top of the base fleet. The headway is unchanged.
    pub fleet_increase: u32,
    pub dwell_time: Option<Duration>,
    pub average_speed: Option<Speed>,
}

impl PeakOverride {
    pub fn new(start_time: ServiceTime, end_time: ServiceTime) -> Self {
        Self {
            start_time,
            end_time,
            fleet_increase: 0,
            dwell_time: None,
            average_speed: None,
        }
    }

    pub fn with_fleet_increase(mut self, vehicles: u32) -> Self {
        self.fleet_increase = vehicles;
        self
    }

    pub fn with_dwell_time(mut self, dwell_time: Duration) -> Self {
        self.dwell_time = Some(dwell_time);
        self
    }

    pub fn with_average_speed(mut self, speed: Speed) -> Self {
        self.average_speed = Some(speed);
        self
    }

    pub fn contains(&self, time: ServiceTime) -> bool {
        self.start_time <= time && time < self.end_time
    }
}

/// Speed, dwell and fleet in force at one departure instant.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EffectiveParameters {
    pub speed: Speed,
    pub dwell: Duration,
    pub fleet: u32,
    pub peak: bool,
}

/// Everything the generator needs to produce one [`Schedule`](crate::models::Schedule).
#[derive(Clone, Debug)]
pub struct GenerationRequest {
    pub description: String,
    pub availability: Availability,
    pub inbound: Option<DirectionPlan>,
    pub outbound: Option<DirectionPlan>,
    pub headway: Duration,
    pub fleet_size: u32,
    pub dwell_time: Duration,
    pub average_speed: Speed,
    /// Minimum time between a vehicle completing a trip and starting its next one.
    pub min_layover: Duration,
    pub peak: Option<PeakOverride>,
    pub dwell_policy: DwellPolicy,
    pub vehicle_type: Option<VehicleType>,
}

impl GenerationRequest {
    /// A request without any direction; add at least one with
    /// [`with_inbound`](Self::with_inbound) or [`with_outbound`](Self::with_outbound).
    pub fn new(
        description: impl Into<String>,
        availability: Availability,
        headway: Duration,
        fleet_size: u32,
        dwell_time: Duration,
        average_speed: Speed,
        min_layover: Duration,
    ) -> Self {
        Self {
            description: description.into(),
            availability,
            inbound: None,
            outbound: None,
            headway,
            fleet_size,
            dwell_time,
            average_speed,
            min_layover,
            peak: None,
            dwell_policy: DwellPolicy::default(),
            vehicle_type: None,
        }
    }

    pub fn with_inbound(mut self, plan: DirectionPlan) -> Self {
        self.inbound = Some(plan);
        self
    }

    pub fn with_outbound(mut self, plan: DirectionPlan) -> Self {
        self.outbound = Some(plan);
        self
    }

    pub fn with_peak(mut self, peak: PeakOverride) -> Self {
        self.peak = Some(peak);
        self
    }

    pub fn with_dwell_policy(mut self, policy: DwellPolicy) -> Self {
        self.dwell_policy = policy;
        self
    }

    pub fn with_vehicle_type(mut self, vehicle_type: VehicleType) -> Self {
        self.vehicle_type = Some(vehicle_type);
        self
    }

    /// Requested directions, inbound first.
    pub fn plans(&self) -> impl Iterator<Item = (Direction, &DirectionPlan)> + '_ {
        [
            (Direction::Inbound, self.inbound.as_ref()),
            (Direction::Outbound, self.outbound.as_ref()),
        ]
        .into_iter()
        .filter_map(|(direction, plan)| plan.map(|p| (direction, p)))
    }

    pub fn plan(&self, direction: Direction) -> Option<&DirectionPlan> {
        match direction {
            Direction::Inbound => self.inbound.as_ref(),
            Direction::Outbound => self.outbound.as_ref(),
        }
    }

    pub fn effective_at(&self, time: ServiceTime) -> EffectiveParameters {
        match &self.peak {
            Some(peak) if peak.contains(time) => EffectiveParameters {
                speed: peak.average_speed.unwrap_or(self.average_speed),
                dwell: peak.dwell_time.unwrap_or(self.dwell_time),
                fleet: self.fleet_size.saturating_add(peak.fleet_increase),
                peak: true,
            },
            _ => EffectiveParameters {
                speed: self.average_speed,
                dwell: self.dwell_time,
                fleet: self.fleet_size,
                peak: false,
            },
        }
    }

    /// Checks every parameter without touching the resolver.
    pub fn validate(&self) -> Result<(), ConfigurationError> {
        let speeds = std::iter::once(self.average_speed)
            .chain(self.peak.as_ref().and_then(|p| p.average_speed));
        for speed in speeds {
            if !speed.is_positive() {
                return Err(ConfigurationError::NonPositiveSpeed(speed.as_meters_per_second()));
            }
        }

        if self.fleet_size == 0 {
            return Err(ConfigurationError::EmptyFleet);
        }

        if self.headway <= Duration::zero() {
            return Err(ConfigurationError::NonPositiveHeadway(self.headway.num_seconds()));
        }

        let durations = [
            ("dwell time", Some(self.dwell_time)),
            ("layover", Some(self.min_layover)),
            ("peak dwell time", self.peak.as_ref().and_then(|p| p.dwell_time)),
        ];
        for (name, duration) in durations {
            if let Some(duration) = duration.filter(|d| *d < Duration::zero()) {
                return Err(ConfigurationError::NegativeDuration {
                    name,
                    seconds: duration.num_seconds(),
                });
            }
        }

        if self.plans().next().is_none() {
            return Err(ConfigurationError::NoDirections);
        }

        for (direction, plan) in self.plans() {
            if plan.end_time <= plan.start_time {
                return Err(ConfigurationError::EmptyWindow {
                    direction,
                    start: plan.start_time,
                    end: plan.end_time,
                });
            }

            if plan.stops.is_empty() {
                return Err(ConfigurationError::NoStops(direction));
            }
            if plan.stops.len() < 2 {
                return Err(ConfigurationError::TooFewStops(direction, plan.stops.len()));
            }

            for stop in &plan.stops {
                let station = stop.station();
                if !plan.route.has_station(station.id()) {
                    return Err(ConfigurationError::StopNotOnRoute {
                        station: station.id().clone(),
                        route: plan.route.id().clone(),
                    });
                }
                if let Some(vehicle_type) = self.vehicle_type {
                    if !station.supports(vehicle_type) {
                        return Err(ConfigurationError::UnsupportedVehicleType {
                            station: station.id().clone(),
                            vehicle_type,
                        });
                    }
                }
            }
        }

        if let Some(peak) = &self.peak {
            if peak.end_time <= peak.start_time {
                return Err(ConfigurationError::EmptyPeakWindow {
                    start: peak.start_time,
                    end: peak.end_time,
                });
            }
        }

        Ok(())
    }
}
