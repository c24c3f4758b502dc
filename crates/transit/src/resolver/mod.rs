//! Shape resolution: turning an ordered list of stop locations into the path a
//! vehicle follows between them.
//!
//! The generator only depends on [`ShapeResolver`]. Routing engines and map
//! services implement it outside this crate; [`HaversineShapeResolver`] is the
//! built-in straight-line implementation.

pub mod haversine;
pub mod traits;

pub use haversine::HaversineShapeResolver;
pub use traits::ShapeResolver;
