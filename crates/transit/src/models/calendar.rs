//! Calendar availability of a schedule.
//!
//! A date range, the weekdays service runs on inside that range, and explicit
//! exception dates in either direction.

use chrono::{Datelike, NaiveDate, Weekday};
use std::collections::BTreeSet;

use crate::error::ConfigurationError;

/// Days on which a schedule applies.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Availability {
    start_date: NaiveDate,
    end_date: Option<NaiveDate>,
    weekdays: WeekdayFlags,

    // Exception dates
    added_dates: BTreeSet<NaiveDate>,   // Service runs on these dates
    removed_dates: BTreeSet<NaiveDate>, // Service does not run on these dates
}

/// Set of weekdays, one bit per day starting with Monday.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct WeekdayFlags(u8);

impl WeekdayFlags {
    pub const WORKING_DAYS: Self = Self(0b001_1111);
    pub const WEEKEND: Self = Self(0b110_0000);
    pub const ALL: Self = Self(0b111_1111);

    pub fn new() -> Self {
        Self(0)
    }

    fn bit(weekday: Weekday) -> u8 {
        1 << weekday.num_days_from_monday()
    }

    pub fn set(&mut self, weekday: Weekday) {
        self.0 |= Self::bit(weekday);
    }

    pub fn unset(&mut self, weekday: Weekday) {
        self.0 &= !Self::bit(weekday);
    }

    pub fn with(mut self, weekday: Weekday) -> Self {
        self.set(weekday);
        self
    }

    pub fn contains(&self, weekday: Weekday) -> bool {
        self.0 & Self::bit(weekday) != 0
    }

    pub fn is_empty(&self) -> bool {
        self.0 == 0
    }

    /// Contained days, Monday first.
    pub fn iter(&self) -> impl Iterator<Item = Weekday> + '_ {
        std::iter::successors(Some(Weekday::Mon), |day| Some(day.succ()))
            .take(7)
            .filter(|day| self.contains(*day))
    }
}

impl FromIterator<Weekday> for WeekdayFlags {
    fn from_iter<I: IntoIterator<Item = Weekday>>(iter: I) -> Self {
        iter.into_iter().fold(Self::new(), Self::with)
    }
}

impl Availability {
    /// At least one weekday is required and `end_date`, when given, may not precede `start_date`.
    pub fn new(
        start_date: NaiveDate,
        end_date: Option<NaiveDate>,
        weekdays: WeekdayFlags,
    ) -> Result<Self, ConfigurationError> {
        if weekdays.is_empty() {
            return Err(ConfigurationError::InvalidAvailability(
                "at least one day of the week must be specified".into(),
            ));
        }
        if let Some(end) = end_date {
            if end < start_date {
                return Err(ConfigurationError::InvalidAvailability(format!(
                    "end date {end} is before start date {start_date}"
                )));
            }
        }

        Ok(Self {
            start_date,
            end_date,
            weekdays,
            added_dates: BTreeSet::new(),
            removed_dates: BTreeSet::new(),
        })
    }

    /// Monday through Friday.
    pub fn working_days(from: NaiveDate, to: NaiveDate) -> Result<Self, ConfigurationError> {
        Self::new(from, Some(to), WeekdayFlags::WORKING_DAYS)
    }

    pub fn weekend_days(from: NaiveDate, to: NaiveDate) -> Result<Self, ConfigurationError> {
        Self::new(from, Some(to), WeekdayFlags::WEEKEND)
    }

    pub fn every_day(from: NaiveDate, to: NaiveDate) -> Result<Self, ConfigurationError> {
        Self::new(from, Some(to), WeekdayFlags::ALL)
    }

    /// Service additionally runs on `dates`.
    pub fn with_added_dates(mut self, dates: impl IntoIterator<Item = NaiveDate>) -> Self {
        self.added_dates.extend(dates);
        self
    }

    /// Service does not run on `dates` (holidays).
    pub fn with_removed_dates(mut self, dates: impl IntoIterator<Item = NaiveDate>) -> Self {
        self.removed_dates.extend(dates);
        self
    }

    pub fn start_date(&self) -> NaiveDate {
        self.start_date
    }

    pub fn end_date(&self) -> Option<NaiveDate> {
        self.end_date
    }

    pub fn weekdays(&self) -> WeekdayFlags {
        self.weekdays
    }

    pub fn added_dates(&self) -> &BTreeSet<NaiveDate> {
        &self.added_dates
    }

    pub fn removed_dates(&self) -> &BTreeSet<NaiveDate> {
        &self.removed_dates
    }

    /// Check if the schedule applies on a given date
    pub fn runs_on(&self, date: NaiveDate) -> bool {
        // Check explicit additions first
        if self.added_dates.contains(&date) {
            return true;
        }

        // Check explicit removals
        if self.removed_dates.contains(&date) {
            return false;
        }

        if date < self.start_date || self.end_date.is_some_and(|end| date > end) {
            return false;
        }

        self.weekdays.contains(date.weekday())
    }
}
