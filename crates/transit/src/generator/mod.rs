//! Schedule generation.
//!
//! ```text
//!  GenerationRequest ──validate──▶ resolve shape per direction
//!                                         │
//!        departures every headway ◀───────┘
//!                 │
//!          stop times per departure (effective speed and dwell)
//!                 │
//!          vehicle blocks (layover, fleet limit)
//!                 │
//!              Schedule
//! ```

mod blocks;
pub mod engine;
pub mod request;
pub mod stop_times;

pub use engine::{ScheduleGenerator, DEFAULT_RESOLVE_TIMEOUT};
pub use request::{DirectionPlan, DwellPolicy, EffectiveParameters, GenerationRequest, PeakOverride};
pub use stop_times::{compute_stop_times, compute_stop_times_with};
