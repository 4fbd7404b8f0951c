//! Timetable search configuration.
//!
//! [`TimetableConfig`] collects every knob of a run: GA budget, the
//! initialization policy, the operating window and tick grid, and the
//! conflict-counting conventions. Nothing is hidden: every default is listed
//! in [`TimetableConfig::default`].

use super::model::TimeSlot;
use crate::error::{Error, Result};
use crate::ga::GaConfig;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Opening and closing time of the facility.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct OperatingWindow {
    /// Earliest start time.
    pub open: TimeSlot,
    /// Latest end time.
    pub close: TimeSlot,
}

impl OperatingWindow {
    /// Creates a window; `open` must be before `close`.
    pub fn new(open: TimeSlot, close: TimeSlot) -> Result<Self> {
        let window = Self { open, close };
        window.validate()?;
        Ok(window)
    }

    /// Length in minutes.
    pub fn length(&self) -> u16 {
        self.close.minutes().saturating_sub(self.open.minutes())
    }

    fn validate(&self) -> Result<()> {
        if self.open >= self.close {
            return Err(Error::InvalidConfig(format!(
                "operating window opens at {} but closes at {}",
                self.open, self.close
            )));
        }
        Ok(())
    }
}

impl Default for OperatingWindow {
    /// 07:00 to 21:00.
    fn default() -> Self {
        Self {
            open: TimeSlot::raw(7 * 60),
            close: TimeSlot::raw(21 * 60),
        }
    }
}

/// How an activity's meeting days share placements.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum InitializationPolicy {
    /// One (time, room) per section, repeated on every meeting day.
    /// Mutation moves all days of the section together.
    #[default]
    SharedSlot,
    /// An independent (time, room) for each meeting day.
    PerDay,
}

/// How collisions at one occupancy key turn into a conflict count.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum CollisionCounting {
    /// Each occupant beyond the first adds one conflict: `k` occupants
    /// count `k - 1`.
    #[default]
    PerAdditionalOccupant,
    /// Every pair of occupants is one conflict: `k` occupants count
    /// `k·(k - 1)/2`.
    PerPair,
}

/// Which assignments compete for the same occupancy key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum ConflictScope {
    /// Key `(tick, day, room)`: any two meetings in one room collide.
    #[default]
    Shared,
    /// Key `(tick, day, room, section)`: only meetings of the same section
    /// number collide.
    PerSection,
}

/// How instructor availability constrains start times.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum InstructorPolicy {
    /// Starts outside the window are never generated.
    #[default]
    Hard,
    /// Any feasible start may be drawn; each assignment outside the window
    /// adds one conflict.
    Soft,
}

/// Configuration of a timetable search.
///
/// # Builder Pattern
///
/// ```
/// use timetable_ga::timetable::{InitializationPolicy, TimetableConfig};
///
/// let config = TimetableConfig::default()
///     .with_population_size(50)
///     .with_generations(200)
///     .with_initialization_policy(InitializationPolicy::PerDay)
///     .with_seed(7);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize), serde(default))]
pub struct TimetableConfig {
    /// Schedules per generation. Positive and even.
    pub population_size: usize,
    /// Generation budget.
    pub generations: usize,
    /// Per-offspring mutation probability.
    pub mutation_rate: f64,
    /// Shared-slot or per-day placements.
    pub initialization_policy: InitializationPolicy,
    /// Facility opening hours.
    pub operating_window: OperatingWindow,
    /// Tick length in minutes.
    pub tick_granularity: u16,
    /// Seed for a reproducible run.
    pub random_seed: Option<u64>,
    /// Conflict counting convention for multi-way collisions.
    pub collision_counting: CollisionCounting,
    /// Occupancy key scope.
    pub conflict_scope: ConflictScope,
    /// Hard or soft instructor availability.
    pub instructor_policy: InstructorPolicy,
    /// Stop as soon as a schedule has zero conflicts.
    pub stop_when_conflict_free: bool,
    /// Evaluate fitness on the rayon pool.
    pub parallel: bool,
}

impl Default for TimetableConfig {
    fn default() -> Self {
        Self {
            population_size: 100,
            generations: 1000,
            mutation_rate: 0.1,
            initialization_policy: InitializationPolicy::SharedSlot,
            operating_window: OperatingWindow::default(),
            tick_granularity: 30,
            random_seed: None,
            collision_counting: CollisionCounting::PerAdditionalOccupant,
            conflict_scope: ConflictScope::Shared,
            instructor_policy: InstructorPolicy::Hard,
            stop_when_conflict_free: false,
            parallel: true,
        }
    }
}

impl TimetableConfig {
    /// Sets the population size.
    pub fn with_population_size(mut self, n: usize) -> Self {
        self.population_size = n;
        self
    }

    /// Sets the generation budget.
    pub fn with_generations(mut self, n: usize) -> Self {
        self.generations = n;
        self
    }

    /// Sets the mutation rate.
    pub fn with_mutation_rate(mut self, rate: f64) -> Self {
        self.mutation_rate = rate.clamp(0.0, 1.0);
        self
    }

    /// Sets the initialization policy.
    pub fn with_initialization_policy(mut self, policy: InitializationPolicy) -> Self {
        self.initialization_policy = policy;
        self
    }

    /// Sets the operating window.
    pub fn with_operating_window(mut self, window: OperatingWindow) -> Self {
        self.operating_window = window;
        self
    }

    /// Sets the tick granularity in minutes.
    pub fn with_tick_granularity(mut self, minutes: u16) -> Self {
        self.tick_granularity = minutes;
        self
    }

    /// Sets the random seed.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.random_seed = Some(seed);
        self
    }

    /// Sets the collision counting convention.
    pub fn with_collision_counting(mut self, counting: CollisionCounting) -> Self {
        self.collision_counting = counting;
        self
    }

    /// Sets the conflict scope.
    pub fn with_conflict_scope(mut self, scope: ConflictScope) -> Self {
        self.conflict_scope = scope;
        self
    }

    /// Sets the instructor policy.
    pub fn with_instructor_policy(mut self, policy: InstructorPolicy) -> Self {
        self.instructor_policy = policy;
        self
    }

    /// Enables or disables stopping at zero conflicts.
    pub fn with_stop_when_conflict_free(mut self, stop: bool) -> Self {
        self.stop_when_conflict_free = stop;
        self
    }

    /// Enables or disables parallel evaluation.
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Validates the configuration.
    pub fn validate(&self) -> Result<()> {
        if self.tick_granularity == 0 {
            return Err(Error::InvalidConfig("tick_granularity must be positive".into()));
        }
        self.operating_window.validate()?;
        self.ga_config().validate()
    }

    /// The GA parameters of this configuration.
    pub fn ga_config(&self) -> GaConfig {
        let mut config = GaConfig::default()
            .with_population_size(self.population_size)
            .with_max_generations(self.generations)
            .with_parallel(self.parallel);
        config.mutation_rate = self.mutation_rate;
        config.seed = self.random_seed;
        if self.stop_when_conflict_free {
            config = config.with_target_fitness(1.0);
        }
        config
    }
}
