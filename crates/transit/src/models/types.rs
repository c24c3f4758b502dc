//! Core value types shared by the timetable model.

use std::fmt;
use std::str::FromStr;

use chrono::{Duration, NaiveTime, Timelike};

use crate::error::ConfigurationError;

/// Number of seconds in one service day.
pub const SECONDS_PER_DAY: u32 = 24 * 60 * 60;

// ============================================================================
// Enums
// ============================================================================

/// Vehicle types a station can serve.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum VehicleType {
    Rail,
    MetroRail,
    Subway,
    Tram,
    Monorail,
    HeavyRail,
    CommuterTrain,
    HighSpeedTrain,
    Bus,
    IntercityBus,
    Trolleybus,
    /// A bus that may pick up or drop off passengers anywhere on its route.
    ShareTaxi,
    Ferry,
    /// Cable-operated vehicle running on the ground.
    CableCar,
    /// Aerial cable car.
    GondolaLift,
    Funicular,
    Other,
}

/// Direction of travel along a line.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum Direction {
    Inbound,
    Outbound,
}

impl Direction {
    pub fn opposite(self) -> Self {
        match self {
            Self::Inbound => Self::Outbound,
            Self::Outbound => Self::Inbound,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Inbound => "inbound",
            Self::Outbound => "outbound",
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// Service time
// ============================================================================

/// An instant on the service day, in seconds since its midnight.
///
/// Values may exceed 24 hours for trips that run past midnight
/// (e.g. 25:30:00 is 1:30am of the following calendar day).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ServiceTime(u32);

impl ServiceTime {
    pub const MIDNIGHT: Self = Self(0);
    pub const END_OF_DAY: Self = Self(SECONDS_PER_DAY);

    pub const fn from_seconds(seconds: u32) -> Self {
        Self(seconds)
    }

    pub fn from_hms(hours: u32, minutes: u32, seconds: u32) -> Result<Self, ConfigurationError> {
        if minutes >= 60 || seconds >= 60 {
            return Err(ConfigurationError::InvalidTime(format!(
                "{hours}:{minutes}:{seconds}"
            )));
        }
        hours
            .checked_mul(3600)
            .and_then(|h| h.checked_add(minutes * 60 + seconds))
            .map(Self)
            .ok_or_else(|| ConfigurationError::InvalidTime(format!("{hours}:{minutes}:{seconds}")))
    }

    pub fn seconds(&self) -> u32 {
        self.0
    }

    /// The same instant folded into a single day.
    pub fn time_of_day(&self) -> Self {
        Self(self.0 % SECONDS_PER_DAY)
    }

    pub fn to_naive_time(&self) -> NaiveTime {
        NaiveTime::from_num_seconds_from_midnight_opt(self.time_of_day().0, 0).unwrap_or_default()
    }

    pub fn checked_add(self, duration: Duration) -> Option<Self> {
        let seconds = i64::from(self.0).checked_add(duration.num_seconds())?;
        u32::try_from(seconds).ok().map(Self)
    }

    /// Adds `duration`, clamping at midnight and at the largest representable instant.
    pub fn saturating_add(self, duration: Duration) -> Self {
        let seconds = i64::from(self.0).saturating_add(duration.num_seconds());
        Self(seconds.clamp(0, i64::from(u32::MAX)) as u32)
    }

    pub fn duration_since(self, earlier: Self) -> Duration {
        Duration::seconds(i64::from(self.0) - i64::from(earlier.0))
    }

    /// `HHMMSS` without separators, used in trip identifiers.
    pub fn compact(&self) -> String {
        let (h, m, s) = self.hms();
        format!("{h:02}{m:02}{s:02}")
    }

    fn hms(&self) -> (u32, u32, u32) {
        (self.0 / 3600, (self.0 % 3600) / 60, self.0 % 60)
    }
}

impl From<NaiveTime> for ServiceTime {
    fn from(time: NaiveTime) -> Self {
        Self(time.num_seconds_from_midnight())
    }
}

impl fmt::Display for ServiceTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (h, m, s) = self.hms();
        write!(f, "{h:02}:{m:02}:{s:02}")
    }
}

impl FromStr for ServiceTime {
    type Err = ConfigurationError;

    /// Parses `HH:MM` or `HH:MM:SS`; hours may exceed 23.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || ConfigurationError::InvalidTime(s.to_string());
        let parts = s
            .trim()
            .split(':')
            .map(|part| part.parse::<u32>().map_err(|_| invalid()))
            .collect::<Result<Vec<_>, _>>()?;

        match parts.as_slice() {
            [h, m] => Self::from_hms(*h, *m, 0),
            [h, m, sec] => Self::from_hms(*h, *m, *sec),
            _ => Err(invalid()),
        }
    }
}

#[cfg(feature = "serde")]
impl serde::Serialize for ServiceTime {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

#[cfg(feature = "serde")]
impl<'de> serde::Deserialize<'de> for ServiceTime {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

// ============================================================================
// Speed
// ============================================================================

/// Average vehicle speed, stored in metres per second.
#[derive(Clone, Copy, Debug, PartialEq, PartialOrd)]
pub struct Speed(f64);

impl Speed {
    pub fn meters_per_second(value: f64) -> Self {
        Self(value)
    }

    pub fn kilometers_per_hour(value: f64) -> Self {
        Self(value / 3.6)
    }

    pub fn as_meters_per_second(&self) -> f64 {
        self.0
    }

    pub fn is_positive(&self) -> bool {
        self.0.is_finite() && self.0 > 0.0
    }
}
