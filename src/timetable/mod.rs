//! Course timetabling on top of the GA framework.
//!
//! A [`Catalog`] of [`Activity`] records is expanded into one assignment
//! key per (activity, section, day). A candidate [`Schedule`] places each
//! key at a start time and room; its fitness is `1 / (1 + conflicts)`,
//! where conflicts are counted from an occupancy index over
//! (tick, day, room).
//!
//! # Layers
//!
//! - [`model`]: days, time slots, duration classes, activities, catalog
//! - [`slots`]: feasible start generation on the tick grid
//! - [`schedule`]: assignment keys, placements, candidate schedules
//! - [`fitness`]: occupancy-index conflict counting
//! - [`TimetableProblem`]: the [`GaProblem`](crate::ga::GaProblem) bridge
//! - [`TimetableEngine`]: run a search and read back the timetable

mod config;
mod engine;
pub mod fitness;
pub mod model;
mod problem;
pub mod schedule;
pub mod slots;

pub use config::{
    CollisionCounting, ConflictScope, InitializationPolicy, InstructorPolicy, OperatingWindow,
    TimetableConfig,
};
pub use engine::{ScheduledEntry, TimetableEngine, TimetableResult};
pub use fitness::{Collision, Evaluation, FitnessEvaluator};
pub use model::{Activity, Catalog, Day, DurationClass, SlotSource, TimeSlot};
pub use problem::{Domain, TimetableProblem};
pub use schedule::{AssignmentKey, KeyLayout, Placement, Schedule};
