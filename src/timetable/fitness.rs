//! Conflict counting and fitness.
//!
//! Every assignment is expanded into the ticks it occupies and written into
//! one occupancy index keyed by `(tick, day, room)`, plus the section number
//! under [`ConflictScope::PerSection`]. A key seen before is a collision.
//! The whole evaluation is a single pass over all occupied ticks; meetings
//! are never compared pairwise.
//!
//! Fitness is `1 / (1 + conflicts)`: 1.0 for a conflict-free schedule,
//! strictly decreasing and never reaching zero.

use super::config::{CollisionCounting, ConflictScope, InstructorPolicy, TimetableConfig};
use super::model::{Activity, Catalog, Day, TimeSlot};
use super::schedule::Schedule;
use super::slots::occupied_ticks;
use crate::error::{Error, Result};
use std::collections::HashMap;
use std::sync::Arc;

/// Converts a conflict count into fitness.
pub fn fitness_from_conflicts(conflicts: u64) -> f64 {
    1.0 / (1.0 + conflicts as f64)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
struct OccupancyKey {
    day: Day,
    tick: u16,
    room: usize,
    section: Option<u32>,
}

/// Score of one schedule.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Evaluation {
    /// Room collisions plus soft-policy instructor violations.
    pub conflicts: u64,
    /// `1 / (1 + conflicts)`.
    pub fitness: f64,
}

/// An over-occupied occupancy key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Collision {
    /// Meeting day.
    pub day: Day,
    /// The contested tick.
    pub tick: TimeSlot,
    /// Room name.
    pub room: String,
    /// Section number, under [`ConflictScope::PerSection`].
    pub section: Option<u32>,
    /// Number of meetings occupying the key (≥ 2).
    pub occupants: u32,
}

/// Scores schedules against a catalog.
#[derive(Debug, Clone)]
pub struct FitnessEvaluator {
    catalog: Arc<Catalog>,
    rooms: Arc<[String]>,
    granularity: u16,
    counting: CollisionCounting,
    scope: ConflictScope,
    instructor_policy: InstructorPolicy,
}

impl FitnessEvaluator {
    /// Creates an evaluator. `rooms` maps placement room indices to names.
    pub fn new(catalog: Arc<Catalog>, rooms: Arc<[String]>, config: &TimetableConfig) -> Self {
        Self {
            catalog,
            rooms,
            granularity: config.tick_granularity,
            counting: config.collision_counting,
            scope: config.conflict_scope,
            instructor_policy: config.instructor_policy,
        }
    }

    /// Counts conflicts and computes fitness.
    ///
    /// # Errors
    /// [`Error::InvalidDuration`] if an activity's duration does not fit the
    /// tick grid; [`Error::Internal`] if a key references an activity
    /// missing from the catalog.
    pub fn evaluate(&self, schedule: &Schedule) -> Result<Evaluation> {
        let occupancy = self.occupancy(schedule)?;
        let mut conflicts: u64 = occupancy
            .values()
            .map(|&k| collisions_at(k, self.counting))
            .sum();

        if self.instructor_policy == InstructorPolicy::Soft {
            conflicts += self.instructor_violations(schedule)?;
        }

        Ok(Evaluation {
            conflicts,
            fitness: fitness_from_conflicts(conflicts),
        })
    }

    /// Lists every over-occupied key, ordered by day, tick, room.
    pub fn collisions(&self, schedule: &Schedule) -> Result<Vec<Collision>> {
        let occupancy = self.occupancy(schedule)?;
        let mut keys: Vec<(OccupancyKey, u32)> =
            occupancy.into_iter().filter(|&(_, k)| k > 1).collect();
        keys.sort();

        keys.into_iter()
            .map(|(key, occupants)| {
                Ok(Collision {
                    day: key.day,
                    tick: TimeSlot::from_minutes(key.tick)?,
                    room: self.room_name(key.room)?.to_string(),
                    section: key.section,
                    occupants,
                })
            })
            .collect()
    }

    /// Number of assignments starting outside their instructor's window.
    pub fn instructor_violations(&self, schedule: &Schedule) -> Result<u64> {
        let mut violations = 0;
        for (key, placement) in schedule.iter() {
            let activity = self.activity(key.activity)?;
            if let Some(window) = &activity.instructor_window {
                if !window.contains(&placement.start) {
                    violations += 1;
                }
            }
        }
        Ok(violations)
    }

    /// Room name for a placement room index.
    pub fn room_name(&self, room: usize) -> Result<&str> {
        self.rooms
            .get(room)
            .map(String::as_str)
            .ok_or_else(|| Error::Internal(format!("unknown room index {room}")))
    }

    fn activity(&self, index: usize) -> Result<&Activity> {
        self.catalog
            .get(index)
            .ok_or_else(|| Error::Internal(format!("activity index {index} not in catalog")))
    }

    /// Occupant count per key. Only the count is kept for each key, so a
    /// later writer replaces the earlier occupant's identity while every
    /// collision is still counted.
    fn occupancy(&self, schedule: &Schedule) -> Result<HashMap<OccupancyKey, u32>> {
        let mut occupancy = HashMap::with_capacity(schedule.len() * 4);
        for (key, placement) in schedule.iter() {
            let activity = self.activity(key.activity)?;
            let section = match self.scope {
                ConflictScope::Shared => None,
                ConflictScope::PerSection => Some(key.section),
            };
            for tick in occupied_ticks(placement.start, activity.duration, self.granularity)? {
                let slot = OccupancyKey {
                    day: key.day,
                    tick,
                    room: placement.room,
                    section,
                };
                *occupancy.entry(slot).or_insert(0) += 1;
            }
        }
        Ok(occupancy)
    }
}

/// Conflicts contributed by `occupants` meetings on one key.
fn collisions_at(occupants: u32, counting: CollisionCounting) -> u64 {
    let k = occupants as u64;
    match counting {
        CollisionCounting::PerAdditionalOccupant => k.saturating_sub(1),
        CollisionCounting::PerPair => k * k.saturating_sub(1) / 2,
    }
}
