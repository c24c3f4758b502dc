//! Arrival and departure times along a resolved shape.
//!
//! For every stop the station's location is looked up on the shape and the
//! cumulative distance `D` at that point is converted to travel time:
//!
//! ```text
//! elapsed   = trunc(D / speed)     (whole seconds, never rounded up)
//! arrival   = start + elapsed
//! departure = arrival + dwell
//! ```
//!
//! Dwell does not accumulate: each stop's arrival depends only on its distance
//! from the origin of the shape. Stops are matched in visiting order, each one
//! at or after the shape point of the stop before it, so a loop back to the
//! first station is timed at the end of the shape.

use chrono::Duration;

use crate::error::{ConfigurationError, ConsistencyError, Result};
use crate::models::geometry::Shape;
use crate::models::trip::{Stop, StopTime};
use crate::models::types::{ServiceTime, Speed};

/// Stop times with the same `dwell` at every stop.
pub fn compute_stop_times(
    stops: &[Stop],
    shape: &Shape,
    start: ServiceTime,
    speed: Speed,
    dwell: Duration,
) -> Result<Vec<StopTime>> {
    compute_stop_times_with(stops, shape, start, speed, |_, _| dwell)
}

/// Stop times where `dwell_for` picks the dwell of each stop from its arrival.
pub fn compute_stop_times_with<F>(
    stops: &[Stop],
    shape: &Shape,
    start: ServiceTime,
    speed: Speed,
    mut dwell_for: F,
) -> Result<Vec<StopTime>>
where
    F: FnMut(&Stop, ServiceTime) -> Duration,
{
    if !speed.is_positive() {
        return Err(ConfigurationError::NonPositiveSpeed(speed.as_meters_per_second()).into());
    }
    let meters_per_second = speed.as_meters_per_second();
    let mut cursor = 0;

    stops
        .iter()
        .map(|stop| -> Result<StopTime> {
            let location = stop.station().location();
            let (index, point) = shape.locate_from(location, cursor).ok_or_else(|| {
                ConsistencyError::StopNotOnShape {
                    station: stop.station().id().clone(),
                    location: *location,
                }
            })?;
            cursor = index;

            let elapsed = (point.distance_traveled() / meters_per_second).trunc();
            let out_of_range = || ConfigurationError::TravelTimeOutOfRange {
                station: stop.station().id().clone(),
                seconds: elapsed,
            };
            let arrival = travel_time(elapsed)
                .and_then(|travel| start.checked_add(travel))
                .ok_or_else(out_of_range)?;
            let departure = arrival
                .checked_add(dwell_for(stop, arrival))
                .ok_or_else(out_of_range)?;

            Ok(StopTime::new(stop.clone(), arrival, departure))
        })
        .collect()
}

/// Whole seconds as a duration, if finite and within what chrono can hold.
fn travel_time(seconds: f64) -> Option<Duration> {
    if !seconds.is_finite() || seconds.abs() >= i64::MAX as f64 {
        return None;
    }
    Duration::try_seconds(seconds as i64)
}
