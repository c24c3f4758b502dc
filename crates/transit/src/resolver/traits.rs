//! Pluggable shape resolution.

use std::sync::Arc;
use std::time::Instant;

use crate::error::ResolutionError;
use crate::models::geometry::{Location, Shape};

/// Resolve the path through `locations`, visited in order.
///
/// The returned shape must contain a point equal to every input location, in
/// the same order, with non-decreasing cumulative distance. Implementations
/// that talk to remote services should give up once `deadline` has passed and
/// report [`ResolutionError::DeadlineExceeded`]. No retries happen here; that
/// is up to the caller.
pub trait ShapeResolver: Send + Sync {
    fn resolve(&self, locations: &[Location], deadline: Instant) -> Result<Shape, ResolutionError>;
}

impl<R: ShapeResolver + ?Sized> ShapeResolver for &R {
    fn resolve(&self, locations: &[Location], deadline: Instant) -> Result<Shape, ResolutionError> {
        (**self).resolve(locations, deadline)
    }
}

impl<R: ShapeResolver + ?Sized> ShapeResolver for Arc<R> {
    fn resolve(&self, locations: &[Location], deadline: Instant) -> Result<Shape, ResolutionError> {
        (**self).resolve(locations, deadline)
    }
}

impl<R: ShapeResolver + ?Sized> ShapeResolver for Box<R> {
    fn resolve(&self, locations: &[Location], deadline: Instant) -> Result<Shape, ResolutionError> {
        (**self).resolve(locations, deadline)
    }
}
