//! End-to-end timetable search.
//!
//! [`TimetableEngine`] binds a catalog to a configuration, runs the GA and
//! turns the winning [`Schedule`] into readable [`ScheduledEntry`] rows.
//!
//! # Example
//!
//! ```
//! use timetable_ga::timetable::{Activity, Catalog, Day, DurationClass};
//! use timetable_ga::timetable::{TimetableConfig, TimetableEngine};
//!
//! let catalog = Catalog::new(vec![
//!     Activity::new("CS101", DurationClass::Short)
//!         .with_days([Day::Monday, Day::Thursday])
//!         .with_rooms(["Room 1", "Room 2"]),
//!     Activity::new("CS102", DurationClass::Standard)
//!         .with_days([Day::Tuesday])
//!         .with_rooms(["Room 1"]),
//! ]);
//! let config = TimetableConfig::default()
//!     .with_population_size(20)
//!     .with_generations(30)
//!     .with_seed(42);
//!
//! let result = TimetableEngine::new(catalog, &config)?.run()?;
//! assert_eq!(result.entries.len(), 3);
//! assert_eq!(result.fitness_history().len(), result.generations + 1);
//! # Ok::<(), timetable_ga::Error>(())
//! ```

use super::config::TimetableConfig;
use super::fitness::Collision;
use super::model::{Catalog, Day, TimeSlot};
use super::problem::TimetableProblem;
use super::schedule::Schedule;
use crate::error::{Error, Result};
use crate::ga::{GaConfig, GaRunner, GenerationStats};
use log::info;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;

#[cfg(feature = "serde")]
use serde::Serialize;

/// One placed meeting in a finished timetable.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct ScheduledEntry {
    /// Activity identifier.
    pub activity_id: String,
    /// Section number, starting at 0.
    pub section: u32,
    /// Meeting day.
    pub day: Day,
    /// Start time.
    pub start: TimeSlot,
    /// End time.
    pub end: TimeSlot,
    /// Room name.
    pub room: String,
}

/// Outcome of a timetable search.
#[derive(Debug, Clone)]
pub struct TimetableResult {
    /// Best schedule of the final population.
    pub schedule: Schedule,
    /// The best schedule in key order.
    pub entries: Vec<ScheduledEntry>,
    /// Fitness of the best schedule, in `(0, 1]`.
    pub fitness: f64,
    /// Conflict count of the best schedule.
    pub conflicts: u64,
    /// Over-occupied keys of the best schedule.
    pub collisions: Vec<Collision>,
    /// Generations executed.
    pub generations: usize,
    /// Whether the run stopped on a conflict-free schedule.
    pub converged: bool,
    /// Whether the run was cancelled.
    pub cancelled: bool,
    /// Population statistics per generation, starting with the initial one.
    pub history: Vec<GenerationStats>,
}

impl TimetableResult {
    /// Best fitness per generation.
    pub fn fitness_history(&self) -> Vec<f64> {
        self.history.iter().map(|s| s.best).collect()
    }

    /// Whether the best schedule has no conflicts.
    pub fn is_conflict_free(&self) -> bool {
        self.conflicts == 0
    }
}

/// Runs the GA over a catalog.
#[derive(Debug, Clone)]
pub struct TimetableEngine {
    problem: TimetableProblem,
    ga: GaConfig,
}

impl TimetableEngine {
    /// Validates the configuration and the catalog.
    pub fn new(catalog: impl Into<Arc<Catalog>>, config: &TimetableConfig) -> Result<Self> {
        let problem = TimetableProblem::new(catalog, config)?;
        info!(
            "timetable: {} activities, {} assignments, {} rooms",
            problem.catalog().len(),
            problem.layout().len(),
            problem.rooms().len()
        );
        Ok(Self {
            problem,
            ga: config.ga_config(),
        })
    }

    /// The underlying search problem.
    pub fn problem(&self) -> &TimetableProblem {
        &self.problem
    }

    /// Runs the full generation budget.
    pub fn run(&self) -> Result<TimetableResult> {
        self.run_with_cancel(None)
    }

    /// Runs until the budget is spent, a conflict-free schedule is found
    /// (when enabled), or `cancel` is set.
    pub fn run_with_cancel(&self, cancel: Option<Arc<AtomicBool>>) -> Result<TimetableResult> {
        let result = GaRunner::run_with_cancel(&self.problem, &self.ga, cancel)?;
        let evaluation = self.problem.assess(&result.best)?;
        let entries = self.entries(&result.best)?;
        let collisions = self.problem.collisions(&result.best)?;

        info!(
            "timetable done: fitness={:.4} conflicts={} generations={}",
            evaluation.fitness, evaluation.conflicts, result.generations
        );

        Ok(TimetableResult {
            schedule: result.best,
            entries,
            fitness: evaluation.fitness,
            conflicts: evaluation.conflicts,
            collisions,
            generations: result.generations,
            converged: result.converged,
            cancelled: result.cancelled,
            history: result.history,
        })
    }

    /// Readable rows of a schedule, in key order.
    pub fn entries(&self, schedule: &Schedule) -> Result<Vec<ScheduledEntry>> {
        let catalog = self.problem.catalog();
        schedule
            .iter()
            .map(|(key, placement)| {
                let activity = catalog.get(key.activity).ok_or_else(|| {
                    Error::Internal(format!("activity index {} not in catalog", key.activity))
                })?;
                let end = placement.start.plus(activity.duration.minutes())?;
                Ok(ScheduledEntry {
                    activity_id: activity.id.clone(),
                    section: key.section,
                    day: key.day,
                    start: placement.start,
                    end,
                    room: self.problem.evaluator().room_name(placement.room)?.to_string(),
                })
            })
            .collect()
    }
}
