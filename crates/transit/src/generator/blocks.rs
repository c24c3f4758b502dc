//! Departure cadence and vehicle blocks.
//!
//! A block is the chain of trips one vehicle operates. Departures are handed
//! out in order. Each goes to the lowest-numbered vehicle that has finished its
//! previous trip plus the layover, sits at the right end of the line (it last
//! ran the opposite direction, or the same one when only one direction runs)
//! and is within the fleet available at that departure. When no such vehicle
//! exists a new one enters service.

use chrono::Duration;

use crate::error::ConfigurationError;
use crate::models::types::{Direction, ServiceTime};

/// Departure instants from `start`, every `headway`, whose whole headway
/// interval fits before `end`.
///
/// The window end is exclusive, and a window shorter than one headway has no
/// departures at all.
pub(crate) fn departures(
    start: ServiceTime,
    end: ServiceTime,
    headway: Duration,
) -> Vec<ServiceTime> {
    let mut times = Vec::new();
    if headway <= Duration::zero() {
        return times;
    }

    let mut t = start;
    while let Some(next) = t.checked_add(headway) {
        if next > end {
            break;
        }
        times.push(t);
        t = next;
    }
    times
}

/// What the planner needs to know about a trip.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct PlannedTrip {
    pub direction: Direction,
    pub departure: ServiceTime,
    pub completion: ServiceTime,
}

/// A vehicle in service: when it is next free and where it finished.
struct Vehicle {
    id: u32,
    ready: ServiceTime,
    last: Direction,
}

pub(crate) struct BlockPlanner {
    layover: Duration,
    alternate: bool,
}

impl BlockPlanner {
    /// `alternate` makes vehicles switch direction after every trip.
    pub fn new(layover: Duration, alternate: bool) -> Self {
        Self { layover, alternate }
    }

    /// Vehicle ids (from 1) for `trips`, which must be sorted by departure.
    ///
    /// `fleet_at` gives the number of vehicles available at a departure, and
    /// vehicle `k` only runs departures where `k <= fleet_at(departure)`.
    /// Needing a vehicle beyond that number is an
    /// [`ConfigurationError::InsufficientFleet`].
    pub fn assign<F>(
        &self,
        trips: &[PlannedTrip],
        fleet_at: F,
    ) -> Result<Vec<u32>, ConfigurationError>
    where
        F: Fn(ServiceTime) -> u32,
    {
        let mut fleet: Vec<Vehicle> = Vec::new();
        let mut assigned = Vec::with_capacity(trips.len());

        for trip in trips {
            let available = fleet_at(trip.departure);
            let idle = fleet
                .iter()
                .take(available as usize)
                .position(|v| v.ready <= trip.departure && self.follows(v.last, trip.direction));

            let index = match idle {
                Some(index) => index,
                None => {
                    let required = fleet.len() as u32 + 1;
                    if required > available {
                        return Err(ConfigurationError::InsufficientFleet {
                            departure: trip.departure,
                            required,
                            available,
                        });
                    }
                    tracing::debug!("vehicle {required} enters service at {}", trip.departure);
                    fleet.push(Vehicle {
                        id: required,
                        ready: trip.departure,
                        last: trip.direction,
                    });
                    fleet.len() - 1
                }
            };

            let vehicle = &mut fleet[index];
            vehicle.ready = trip.completion.saturating_add(self.layover);
            vehicle.last = trip.direction;
            assigned.push(vehicle.id);
        }

        Ok(assigned)
    }

    /// Whether a vehicle that last ran `last` can run `next` without deadheading.
    fn follows(&self, last: Direction, next: Direction) -> bool {
        if self.alternate {
            next == last.opposite()
        } else {
            next == last
        }
    }
}
