//! Candidate schedules.
//!
//! A [`Schedule`] is a sequence of [`Placement`]s aligned position by
//! position with an ordered list of [`AssignmentKey`]s. The key list is built
//! once per catalog by [`KeyLayout`] and shared by every schedule, so
//! positional crossover and mutation always see the same key order.

use super::model::{Catalog, Day, TimeSlot};
use crate::error::{Error, Result};
use crate::ga::{Fitness, Individual};
use std::collections::HashMap;
use std::ops::Range;
use std::sync::Arc;

/// Identifies one meeting to be placed: an activity's section on one day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AssignmentKey {
    /// Index of the activity in the catalog.
    pub activity: usize,
    /// Section number, starting at 0.
    pub section: u32,
    /// Meeting day.
    pub day: Day,
}

/// Where and when a meeting happens.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Placement {
    /// Start time.
    pub start: TimeSlot,
    /// Index into the problem's room table.
    pub room: usize,
}

/// The ordered assignment keys of a catalog.
///
/// Keys are laid out activity by activity in catalog order, then section by
/// section, then day by day in the activity's day order. All days of one
/// (activity, section) therefore form a contiguous *group*.
#[derive(Debug, Clone)]
pub struct KeyLayout {
    keys: Arc<[AssignmentKey]>,
    index: HashMap<AssignmentKey, usize>,
    groups: Vec<Range<usize>>,
    group_of: Vec<usize>,
}

impl KeyLayout {
    /// Lays out every (activity, section, day) of the catalog.
    pub fn build(catalog: &Catalog) -> Self {
        let mut keys = Vec::new();
        let mut groups = Vec::new();
        let mut group_of = Vec::new();

        for (activity, def) in catalog.activities().iter().enumerate() {
            for section in 0..def.section_count.max(1) {
                let start = keys.len();
                for &day in &def.days {
                    keys.push(AssignmentKey {
                        activity,
                        section,
                        day,
                    });
                    group_of.push(groups.len());
                }
                if keys.len() > start {
                    groups.push(start..keys.len());
                }
            }
        }

        let index = keys.iter().enumerate().map(|(i, k)| (*k, i)).collect();
        Self {
            keys: keys.into(),
            index,
            groups,
            group_of,
        }
    }

    /// Keys in order.
    pub fn keys(&self) -> &Arc<[AssignmentKey]> {
        &self.keys
    }

    /// Number of keys.
    pub fn len(&self) -> usize {
        self.keys.len()
    }

    /// Whether there are no keys.
    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// Position of `key`.
    pub fn position(&self, key: &AssignmentKey) -> Option<usize> {
        self.index.get(key).copied()
    }

    /// All (activity, section) groups in order.
    pub fn groups(&self) -> &[Range<usize>] {
        &self.groups
    }

    /// Positions sharing the (activity, section) of the key at `position`.
    pub fn group_of(&self, position: usize) -> Option<Range<usize>> {
        self.group_of
            .get(position)
            .and_then(|&g| self.groups.get(g))
            .cloned()
    }
}

/// One candidate solution.
#[derive(Debug, Clone, PartialEq)]
pub struct Schedule {
    keys: Arc<[AssignmentKey]>,
    placements: Vec<Placement>,
    fitness: f64,
}

impl Schedule {
    /// Pairs an ordered key list with placements. The schedule starts
    /// unevaluated.
    pub fn new(keys: Arc<[AssignmentKey]>, placements: Vec<Placement>) -> Result<Self> {
        if keys.len() != placements.len() {
            return Err(Error::Internal(format!(
                "{} placements for {} assignment keys",
                placements.len(),
                keys.len()
            )));
        }
        Ok(Self {
            keys,
            placements,
            fitness: f64::worst(),
        })
    }

    /// Keys in order.
    pub fn keys(&self) -> &Arc<[AssignmentKey]> {
        &self.keys
    }

    /// Placements aligned with [`keys`](Self::keys).
    pub fn placements(&self) -> &[Placement] {
        &self.placements
    }

    /// Number of assignments.
    pub fn len(&self) -> usize {
        self.placements.len()
    }

    /// Whether the schedule has no assignments.
    pub fn is_empty(&self) -> bool {
        self.placements.is_empty()
    }

    /// Assignments in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&AssignmentKey, &Placement)> {
        self.keys.iter().zip(self.placements.iter())
    }

    /// Placement at a position.
    pub fn placement_at(&self, position: usize) -> Option<Placement> {
        self.placements.get(position).copied()
    }

    /// Replaces the placement at `position`.
    ///
    /// Invalidates the cached fitness.
    pub fn set_placement(&mut self, position: usize, placement: Placement) -> Result<()> {
        let slot = self.placements.get_mut(position).ok_or_else(|| {
            Error::Internal(format!("assignment position {position} out of range"))
        })?;
        *slot = placement;
        self.fitness = f64::worst();
        Ok(())
    }

    /// Whether both schedules are built on the same ordered key list.
    pub fn same_layout(&self, other: &Schedule) -> bool {
        Arc::ptr_eq(&self.keys, &other.keys) || self.keys == other.keys
    }
}

impl Individual for Schedule {
    type Fitness = f64;

    fn fitness(&self) -> f64 {
        self.fitness
    }

    fn set_fitness(&mut self, fitness: f64) {
        self.fitness = fitness;
    }
}
