//! Conflict-minimizing course timetabling with a genetic algorithm.
//!
//! - **GA framework** ([`ga`]): a generic truncation-selection GA. Problems
//!   implement [`ga::GaProblem`]; [`ga::GaRunner`] drives the loop.
//! - **Timetabling** ([`timetable`]): catalog model, duration-derived slot
//!   generation, occupancy-index fitness, and the
//!   [`timetable::TimetableEngine`] that ties them to the GA.
//!
//! # Quick Start
//!
//! ```
//! use timetable_ga::timetable::{Activity, Catalog, Day, DurationClass};
//! use timetable_ga::timetable::{TimetableConfig, TimetableEngine};
//!
//! let catalog: Catalog = [
//!     Activity::new("CS101", DurationClass::Short)
//!         .with_days([Day::Monday, Day::Thursday])
//!         .with_rooms(["Room 1", "Room 2"])
//!         .with_sections(2),
//!     Activity::new("CS103", DurationClass::Long)
//!         .with_days([Day::Wednesday])
//!         .with_rooms(["Room 2"]),
//! ]
//! .into_iter()
//! .collect();
//!
//! let config = TimetableConfig::default()
//!     .with_population_size(30)
//!     .with_generations(50)
//!     .with_seed(1);
//! let result = TimetableEngine::new(catalog, &config)?.run()?;
//! for entry in &result.entries {
//!     println!(
//!         "{} s{} {} {}-{} {}",
//!         entry.activity_id, entry.section, entry.day, entry.start, entry.end, entry.room
//!     );
//! }
//! # Ok::<(), timetable_ga::Error>(())
//! ```
//!
//! # Features
//!
//! - `parallel` (default): fitness evaluation on the rayon pool
//! - `serde`: (de)serialization of catalogs, configuration and results

pub mod error;
pub mod ga;
pub mod random;
pub mod timetable;

pub use error::{Error, Result};
