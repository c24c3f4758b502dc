//! Storage of stations, routes and generated schedules.
//!
//! The generator never loads anything itself; callers fetch the routes and
//! stations it needs from a [`TransitRepository`] and hand the finished
//! [`Schedule`](crate::models::Schedule) back for saving.

pub mod memory;
pub mod traits;

pub use memory::InMemoryRepository;
pub use traits::TransitRepository;
