//! Stations and the dwell rules that apply at them.

use std::collections::BTreeSet;
use std::fmt;
use std::sync::Arc;

use chrono::Duration;

use crate::error::{ConfigurationError, OverlapError};
use crate::identifiers::StationIdentifier;
use crate::models::geometry::Location;
use crate::models::types::{ServiceTime, VehicleType};

/// How a vehicle serves a stop during a dwell window.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum DwellKind {
    /// Always stops.
    Regular,
    /// Stops only on request.
    Hail,
}

/// Time a vehicle spends at a station while the time of day lies in `[start, end)`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Dwell {
    start: ServiceTime,
    end: ServiceTime,
    duration: Duration,
    kind: DwellKind,
}

impl Dwell {
    /// The window must lie within one day, be non-empty, and fit the duration.
    pub fn new(
        start: ServiceTime,
        end: ServiceTime,
        duration: Duration,
        kind: DwellKind,
    ) -> Result<Self, ConfigurationError> {
        if end > ServiceTime::END_OF_DAY {
            return Err(ConfigurationError::InvalidDwell(format!(
                "window end {end} is past the end of the day"
            )));
        }
        if start >= end {
            return Err(ConfigurationError::InvalidDwell(format!(
                "window start {start} must be before its end {end}"
            )));
        }
        if duration <= Duration::zero() {
            return Err(ConfigurationError::InvalidDwell(format!(
                "duration must be positive, got {}s",
                duration.num_seconds()
            )));
        }
        if duration > end.duration_since(start) {
            return Err(ConfigurationError::InvalidDwell(format!(
                "duration of {}s does not fit window [{start}, {end})",
                duration.num_seconds()
            )));
        }

        Ok(Self {
            start,
            end,
            duration,
            kind,
        })
    }

    pub fn regular(
        start: ServiceTime,
        end: ServiceTime,
        duration: Duration,
    ) -> Result<Self, ConfigurationError> {
        Self::new(start, end, duration, DwellKind::Regular)
    }

    pub fn hail(
        start: ServiceTime,
        end: ServiceTime,
        duration: Duration,
    ) -> Result<Self, ConfigurationError> {
        Self::new(start, end, duration, DwellKind::Hail)
    }

    pub fn all_day_regular(duration: Duration) -> Result<Self, ConfigurationError> {
        Self::regular(ServiceTime::MIDNIGHT, ServiceTime::END_OF_DAY, duration)
    }

    pub fn all_day_hail(duration: Duration) -> Result<Self, ConfigurationError> {
        Self::hail(ServiceTime::MIDNIGHT, ServiceTime::END_OF_DAY, duration)
    }

    pub fn start(&self) -> ServiceTime {
        self.start
    }

    pub fn end(&self) -> ServiceTime {
        self.end
    }

    pub fn duration(&self) -> Duration {
        self.duration
    }

    pub fn kind(&self) -> DwellKind {
        self.kind
    }

    /// Half-open intersection; windows that only touch do not overlap.
    pub fn overlaps(&self, other: &Dwell) -> bool {
        self.start < other.end && other.start < self.end
    }

    /// Whether the time of day of `time` falls inside this window.
    pub fn applies(&self, time: ServiceTime) -> bool {
        let time = time.time_of_day();
        self.start <= time && time < self.end
    }
}

impl fmt::Display for Dwell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = match self.kind {
            DwellKind::Regular => "regular",
            DwellKind::Hail => "hail",
        };
        write!(
            f,
            "[{}, {}) {}s {}",
            self.start,
            self.end,
            self.duration.num_seconds(),
            kind
        )
    }
}

/// A location where vehicles stop to pick up or drop off passengers.
///
/// Two stations are equal when their identifiers are equal.
#[derive(Clone, Debug)]
pub struct Station {
    id: StationIdentifier,
    name: Arc<str>,
    vehicle_types: BTreeSet<VehicleType>,
    location: Location,
    dwells: Vec<Dwell>,
}

impl Station {
    /// Every pair of dwells is checked; the first intersecting pair is reported.
    pub fn new(
        id: StationIdentifier,
        name: impl Into<Arc<str>>,
        vehicle_types: impl IntoIterator<Item = VehicleType>,
        location: Location,
        dwells: Vec<Dwell>,
    ) -> Result<Self, OverlapError> {
        for (i, first) in dwells.iter().enumerate() {
            for (j, second) in dwells.iter().enumerate().skip(i + 1) {
                if first.overlaps(second) {
                    return Err(OverlapError {
                        station: id,
                        first_index: i,
                        first: first.clone(),
                        second_index: j,
                        second: second.clone(),
                    });
                }
            }
        }

        Ok(Self {
            id,
            name: name.into(),
            vehicle_types: vehicle_types.into_iter().collect(),
            location,
            dwells,
        })
    }

    pub fn id(&self) -> &StationIdentifier {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn location(&self) -> &Location {
        &self.location
    }

    pub fn vehicle_types(&self) -> impl Iterator<Item = VehicleType> + '_ {
        self.vehicle_types.iter().copied()
    }

    pub fn supports(&self, vehicle_type: VehicleType) -> bool {
        self.vehicle_types.contains(&vehicle_type)
    }

    pub fn dwells(&self) -> &[Dwell] {
        &self.dwells
    }

    /// The dwell rule applying at `time`, if any. At most one can match.
    pub fn dwell_at(&self, time: ServiceTime) -> Option<&Dwell> {
        self.dwells.iter().find(|dwell| dwell.applies(time))
    }
}

impl PartialEq for Station {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Station {}
