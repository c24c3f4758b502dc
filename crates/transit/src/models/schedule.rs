//! The generated timetable for one set of operating days.

use std::collections::BTreeSet;

use chrono::NaiveDate;

use crate::models::calendar::Availability;
use crate::models::trip::Trip;
use crate::models::types::Direction;

/// Description, availability and the trips produced by one generation run.
///
/// Only the generator creates schedules; they are never modified afterwards.
#[derive(Clone, Debug)]
pub struct Schedule {
    description: String,
    availability: Availability,
    trips: Vec<Trip>,
}

impl Schedule {
    pub(crate) fn new(description: String, availability: Availability, trips: Vec<Trip>) -> Self {
        Self {
            description,
            availability,
            trips,
        }
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn availability(&self) -> &Availability {
        &self.availability
    }

    pub fn trips(&self) -> &[Trip] {
        &self.trips
    }

    pub fn is_empty(&self) -> bool {
        self.trips.is_empty()
    }

    pub fn trips_in(&self, direction: Direction) -> impl Iterator<Item = &Trip> + '_ {
        self.trips.iter().filter(move |t| t.direction() == direction)
    }

    /// Number of distinct vehicles operating the schedule.
    pub fn vehicle_count(&self) -> usize {
        self.trips
            .iter()
            .map(Trip::vehicle_id)
            .collect::<BTreeSet<_>>()
            .len()
    }

    pub fn runs_on(&self, date: NaiveDate) -> bool {
        self.availability.runs_on(date)
    }
}
