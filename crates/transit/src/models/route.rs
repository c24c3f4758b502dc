//! Route topology: an ordered, connected chain of station-to-station segments.
//!
//! ```text
//!            Route ST1 -> ST3
//!  ____________________________________
//!  |  ST1                     ST3     |
//!  |   $ -------              $      |
//!  |            \      ST2    |      |
//!  |             ----- $ ----        |
//!  ------------------------------------
//!
//!   segments: [ST1 -> ST2, ST2 -> ST3]
//! ```

use std::sync::Arc;

use crate::error::TopologyError;
use crate::identifiers::{RouteIdentifier, StationIdentifier};
use crate::models::station::Station;

/// A directed edge between two consecutive stations of a route.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Segment {
    begin: Arc<Station>,
    end: Arc<Station>,
}

impl Segment {
    pub fn new(begin: Arc<Station>, end: Arc<Station>) -> Self {
        Self { begin, end }
    }

    pub fn begin(&self) -> &Arc<Station> {
        &self.begin
    }

    pub fn end(&self) -> &Arc<Station> {
        &self.end
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Route {
    id: RouteIdentifier,
    segments: Vec<Segment>,
}

impl Route {
    /// Requires `segments[i].end == segments[i + 1].begin` for every adjacent pair.
    /// The first break is reported with the index of the segment before it.
    pub fn new(id: RouteIdentifier, segments: Vec<Segment>) -> Result<Self, TopologyError> {
        if segments.is_empty() {
            return Err(TopologyError::Empty);
        }

        for (index, pair) in segments.windows(2).enumerate() {
            if pair[0].end != pair[1].begin {
                return Err(TopologyError::Disconnected {
                    index,
                    end: pair[0].end.id().clone(),
                    next_begin: pair[1].begin.id().clone(),
                });
            }
        }

        Ok(Self { id, segments })
    }

    /// Chains consecutive stations into segments.
    pub fn through(
        id: RouteIdentifier,
        stations: impl IntoIterator<Item = Arc<Station>>,
    ) -> Result<Self, TopologyError> {
        let stations: Vec<_> = stations.into_iter().collect();
        let segments = stations
            .windows(2)
            .map(|pair| Segment::new(pair[0].clone(), pair[1].clone()))
            .collect();
        Self::new(id, segments)
    }

    pub fn id(&self) -> &RouteIdentifier {
        &self.id
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Segment> {
        self.segments.iter()
    }

    pub fn head(&self) -> &Arc<Station> {
        &self.segments[0].begin
    }

    pub fn tail(&self) -> &Arc<Station> {
        &self.segments[self.segments.len() - 1].end
    }

    /// Stations in visiting order: the head followed by each segment's end.
    pub fn stations(&self) -> Vec<Arc<Station>> {
        std::iter::once(self.head().clone())
            .chain(self.segments.iter().map(|s| s.end.clone()))
            .collect()
    }

    pub fn has_station(&self, station: &StationIdentifier) -> bool {
        self.segments
            .iter()
            .any(|s| s.begin.id() == station || s.end.id() == station)
    }
}

impl<'a> IntoIterator for &'a Route {
    type Item = &'a Segment;
    type IntoIter = std::slice::Iter<'a, Segment>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
