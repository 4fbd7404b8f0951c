//! Timetabling as a [`GaProblem`].
//!
//! [`TimetableProblem`] validates the catalog once, up front: every
//! activity's candidate starts and rooms are resolved before the search
//! begins, so an activity that cannot be placed fails construction instead
//! of being skipped later.

use super::config::{InitializationPolicy, InstructorPolicy, TimetableConfig};
use super::fitness::{Collision, Evaluation, FitnessEvaluator};
use super::model::{Activity, Catalog, SlotSource, TimeSlot};
use super::schedule::{KeyLayout, Placement, Schedule};
use super::slots::SlotTable;
use crate::error::{Error, Result};
use crate::ga::operators::single_point_crossover;
use crate::ga::GaProblem;
use log::debug;
use rand::Rng;
use std::collections::HashMap;
use std::sync::Arc;

/// Start times and rooms an activity may be placed in.
#[derive(Debug, Clone, PartialEq)]
pub struct Domain {
    /// Candidate starts, ascending.
    pub starts: Vec<TimeSlot>,
    /// Eligible room indices.
    pub rooms: Vec<usize>,
}

/// The timetabling search problem.
#[derive(Debug, Clone)]
pub struct TimetableProblem {
    catalog: Arc<Catalog>,
    layout: KeyLayout,
    rooms: Arc<[String]>,
    domains: Vec<Domain>,
    evaluator: FitnessEvaluator,
    policy: InitializationPolicy,
}

impl TimetableProblem {
    /// Builds the problem.
    ///
    /// # Errors
    /// - [`Error::InvalidConfig`] for a rejected configuration or an empty catalog
    /// - [`Error::InvalidDuration`] for a duration that does not fit the tick grid
    /// - [`Error::InfeasibleConstraint`] for an activity with no days, rooms,
    ///   or candidate starts
    pub fn new(catalog: impl Into<Arc<Catalog>>, config: &TimetableConfig) -> Result<Self> {
        config.validate()?;
        let catalog = catalog.into();
        if catalog.is_empty() {
            return Err(Error::InvalidConfig("catalog has no activities".into()));
        }

        let mut room_index: HashMap<String, usize> = HashMap::new();
        let mut rooms: Vec<String> = Vec::new();
        let mut table = SlotTable::new(config.operating_window, config.tick_granularity);
        let mut domains = Vec::with_capacity(catalog.len());

        for activity in catalog.activities() {
            if activity.days.is_empty() {
                return Err(infeasible(activity, "no meeting days"));
            }
            if activity.rooms.is_empty() {
                return Err(infeasible(activity, "no eligible rooms"));
            }

            let eligible: Vec<usize> = activity
                .rooms
                .iter()
                .map(|name| {
                    *room_index.entry(name.clone()).or_insert_with(|| {
                        rooms.push(name.clone());
                        rooms.len() - 1
                    })
                })
                .collect();

            let starts = candidate_starts(activity, &mut table, config)?;
            debug!(
                "activity {}: {} candidate starts, {} rooms",
                activity.id,
                starts.len(),
                activity.rooms.len()
            );
            domains.push(Domain {
                starts,
                rooms: eligible,
            });
        }

        let rooms: Arc<[String]> = rooms.into();
        let evaluator = FitnessEvaluator::new(catalog.clone(), rooms.clone(), config);
        Ok(Self {
            layout: KeyLayout::build(&catalog),
            catalog,
            rooms,
            domains,
            evaluator,
            policy: config.initialization_policy,
        })
    }

    /// The catalog being scheduled.
    pub fn catalog(&self) -> &Arc<Catalog> {
        &self.catalog
    }

    /// The ordered assignment keys.
    pub fn layout(&self) -> &KeyLayout {
        &self.layout
    }

    /// All room names; placement room indices point into this list.
    pub fn rooms(&self) -> &[String] {
        &self.rooms
    }

    /// Candidate starts and rooms of the activity at `activity`.
    pub fn domain(&self, activity: usize) -> Result<&Domain> {
        self.domains
            .get(activity)
            .ok_or_else(|| Error::Internal(format!("activity index {activity} not in catalog")))
    }

    /// The fitness evaluator.
    pub fn evaluator(&self) -> &FitnessEvaluator {
        &self.evaluator
    }

    /// Conflicts and fitness of a schedule.
    pub fn assess(&self, schedule: &Schedule) -> Result<Evaluation> {
        self.evaluator.evaluate(schedule)
    }

    /// Over-occupied keys of a schedule.
    pub fn collisions(&self, schedule: &Schedule) -> Result<Vec<Collision>> {
        self.evaluator.collisions(schedule)
    }

    /// Draws a uniform (start, room) pair for an activity.
    fn draw_placement<R: Rng>(&self, activity: usize, rng: &mut R) -> Result<Placement> {
        let domain = self.domain(activity)?;
        Ok(Placement {
            start: domain.starts[rng.random_range(0..domain.starts.len())],
            room: domain.rooms[rng.random_range(0..domain.rooms.len())],
        })
    }

    fn check_layout(&self, schedule: &Schedule) -> Result<()> {
        let keys = self.layout.keys();
        if !Arc::ptr_eq(schedule.keys(), keys) && schedule.keys() != keys {
            return Err(Error::Internal(
                "schedule was not built from this problem's catalog".into(),
            ));
        }
        Ok(())
    }
}

fn infeasible(activity: &Activity, reason: impl Into<String>) -> Error {
    Error::InfeasibleConstraint {
        activity: activity.id.clone(),
        reason: reason.into(),
    }
}

/// Feasible starts, narrowed by a fixed slot list and, under the hard
/// policy, the instructor window.
fn candidate_starts(
    activity: &Activity,
    table: &mut SlotTable,
    config: &TimetableConfig,
) -> Result<Vec<TimeSlot>> {
    let mut starts = table.starts(activity.duration)?.to_vec();
    if starts.is_empty() {
        return Err(infeasible(
            activity,
            format!(
                "operating window {}-{} is too short for {}",
                config.operating_window.open, config.operating_window.close, activity.duration
            ),
        ));
    }

    if let SlotSource::Fixed(fixed) = &activity.slot_source {
        starts.retain(|s| fixed.contains(s));
        if starts.is_empty() {
            return Err(infeasible(
                activity,
                "no fixed slot fits the operating window and tick grid",
            ));
        }
    }

    if config.instructor_policy == InstructorPolicy::Hard {
        if let Some(window) = &activity.instructor_window {
            starts.retain(|s| window.contains(s));
            if starts.is_empty() {
                return Err(infeasible(
                    activity,
                    "instructor availability is disjoint from feasible starts",
                ));
            }
        }
    }

    Ok(starts)
}

impl GaProblem for TimetableProblem {
    type Individual = Schedule;

    fn create_individual<R: Rng>(&self, rng: &mut R) -> Result<Schedule> {
        let keys = self.layout.keys();
        let mut placements = Vec::with_capacity(keys.len());

        for group in self.layout.groups() {
            let activity = keys[group.start].activity;
            match self.policy {
                InitializationPolicy::SharedSlot => {
                    let placement = self.draw_placement(activity, rng)?;
                    placements.resize(placements.len() + group.len(), placement);
                }
                InitializationPolicy::PerDay => {
                    for _ in group.clone() {
                        placements.push(self.draw_placement(activity, rng)?);
                    }
                }
            }
        }

        Schedule::new(keys.clone(), placements)
    }

    fn evaluate(&self, schedule: &Schedule) -> Result<f64> {
        Ok(self.evaluator.evaluate(schedule)?.fitness)
    }

    fn crossover<R: Rng>(
        &self,
        parent1: &Schedule,
        parent2: &Schedule,
        rng: &mut R,
    ) -> Result<Vec<Schedule>> {
        self.check_layout(parent1)?;
        if !parent1.same_layout(parent2) {
            return Err(Error::Internal(
                "crossover parents have different assignment keys".into(),
            ));
        }
        if parent1.is_empty() {
            return Ok(vec![parent1.clone(), parent2.clone()]);
        }

        let (c1, c2, _) =
            single_point_crossover(parent1.placements(), parent2.placements(), rng);
        Ok(vec![
            Schedule::new(parent1.keys().clone(), c1)?,
            Schedule::new(parent1.keys().clone(), c2)?,
        ])
    }

    fn mutate<R: Rng>(&self, schedule: &mut Schedule, rng: &mut R) -> Result<()> {
        self.check_layout(schedule)?;
        if schedule.is_empty() {
            return Ok(());
        }

        let position = rng.random_range(0..schedule.len());
        let key = schedule.keys()[position];
        let placement = self.draw_placement(key.activity, rng)?;

        match self.policy {
            InitializationPolicy::SharedSlot => {
                let group = self.layout.group_of(position).ok_or_else(|| {
                    Error::Internal(format!("no key group for position {position}"))
                })?;
                for p in group {
                    schedule.set_placement(p, placement)?;
                }
            }
            InitializationPolicy::PerDay => schedule.set_placement(position, placement)?,
        }
        Ok(())
    }

    fn on_generation(&self, generation: usize, best_fitness: f64) {
        if best_fitness >= 1.0 {
            debug!("generation {generation}: conflict-free schedule found");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ga::Individual;
    use crate::random::create_rng;
    use crate::timetable::config::OperatingWindow;
    use crate::timetable::model::{Day, DurationClass};
    use crate::timetable::schedule::AssignmentKey;

    fn slot(s: &str) -> TimeSlot {
        s.parse().unwrap()
    }

    fn sample_catalog() -> Catalog {
        Catalog::new(vec![
            Activity::new("CS101", DurationClass::Short)
                .with_days([Day::Monday, Day::Thursday])
                .with_rooms(["Room 1", "Room 2"])
                .with_instructor("Prof. A", [slot("08:00"), slot("10:00")])
                .with_sections(3),
            Activity::new("CS102", DurationClass::Standard)
                .with_days([Day::Tuesday, Day::Friday])
                .with_rooms(["Room 1", "Room 3"])
                .with_instructor("Prof. B", [slot("09:00"), slot("13:00")])
                .with_sections(3),
            Activity::new("CS103", DurationClass::Long)
                .with_days([Day::Wednesday])
                .with_rooms(["Room 2", "Room 4"])
                .with_instructor("Prof. C", [slot("11:00")])
                .with_sections(3),
        ])
    }

    fn problem(policy: InitializationPolicy) -> TimetableProblem {
        let config = TimetableConfig::default().with_initialization_policy(policy);
        TimetableProblem::new(sample_catalog(), &config).unwrap()
    }

    fn assert_valid(problem: &TimetableProblem, schedule: &Schedule) {
        assert_eq!(schedule.keys().as_ref(), problem.layout().keys().as_ref());
        for (key, placement) in schedule.iter() {
            let domain = problem.domain(key.activity).unwrap();
            assert!(domain.starts.contains(&placement.start));
            assert!(domain.rooms.contains(&placement.room));
        }
    }

    #[test]
    fn test_rooms_interned_by_name() {
        let p = problem(InitializationPolicy::SharedSlot);
        assert_eq!(p.rooms(), &["Room 1", "Room 2", "Room 3", "Room 4"]);
        assert_eq!(p.domain(1).unwrap().rooms, vec![0, 2]);
    }

    #[test]
    fn test_hard_instructor_window_narrows_starts() {
        let p = problem(InitializationPolicy::SharedSlot);
        assert_eq!(p.domain(0).unwrap().starts, vec![slot("08:00"), slot("10:00")]);
        assert_eq!(p.domain(2).unwrap().starts, vec![slot("11:00")]);
    }

    #[test]
    fn test_soft_instructor_window_keeps_all_starts() {
        let config = TimetableConfig::default().with_instructor_policy(InstructorPolicy::Soft);
        let p = TimetableProblem::new(sample_catalog(), &config).unwrap();
        assert_eq!(p.domain(2).unwrap().starts.len(), 19);
    }

    #[test]
    fn test_shared_slot_initialization() {
        let p = problem(InitializationPolicy::SharedSlot);
        let mut rng = create_rng(42);
        for _ in 0..20 {
            let s = p.create_individual(&mut rng).unwrap();
            assert_eq!(s.len(), 15);
            assert_valid(&p, &s);
            for group in p.layout().groups() {
                let first = s.placements()[group.start];
                assert!(s.placements()[group.clone()].iter().all(|&x| x == first));
            }
        }
    }

    #[test]
    fn test_per_day_initialization_varies_days() {
        let catalog = Catalog::new(vec![Activity::new("A", DurationClass::Short)
            .with_days(Day::ALL)
            .with_rooms(["R1", "R2", "R3"])]);
        let config = TimetableConfig::default().with_initialization_policy(InitializationPolicy::PerDay);
        let p = TimetableProblem::new(catalog, &config).unwrap();
        let mut rng = create_rng(7);
        let differs = (0..20).any(|_| {
            let s = p.create_individual(&mut rng).unwrap();
            s.placements().iter().any(|&x| x != s.placements()[0])
        });
        assert!(differs, "per-day draws should not always coincide");
    }

    #[test]
    fn test_crossover_preserves_keys_and_partitions() {
        let p = problem(InitializationPolicy::PerDay);
        let mut rng = create_rng(1);
        for _ in 0..50 {
            let a = p.create_individual(&mut rng).unwrap();
            let b = p.create_individual(&mut rng).unwrap();
            let children = p.crossover(&a, &b, &mut rng).unwrap();
            assert_eq!(children.len(), 2);
            let (c1, c2) = (&children[0], &children[1]);
            assert_eq!(c1.keys(), a.keys());
            assert_eq!(c2.keys(), b.keys());
            for i in 0..a.len() {
                let (x, y) = (a.placements()[i], b.placements()[i]);
                let (u, v) = (c1.placements()[i], c2.placements()[i]);
                assert!((u == x && v == y) || (u == y && v == x));
            }
        }
    }

    #[test]
    fn test_crossover_rejects_foreign_parent() {
        let p = problem(InitializationPolicy::SharedSlot);
        let other = TimetableProblem::new(
            Catalog::new(vec![Activity::new("Z", DurationClass::Short)
                .with_days([Day::Monday])
                .with_rooms(["R"])]),
            &TimetableConfig::default(),
        )
        .unwrap();
        let mut rng = create_rng(3);
        let a = p.create_individual(&mut rng).unwrap();
        let z = other.create_individual(&mut rng).unwrap();
        assert!(matches!(p.crossover(&a, &z, &mut rng), Err(Error::Internal(_))));
        let z2 = other.create_individual(&mut rng).unwrap();
        assert!(matches!(p.crossover(&z, &z2, &mut rng), Err(Error::Internal(_))));
        assert_eq!(other.crossover(&z, &z2, &mut rng).unwrap().len(), 2);
        let mut z = z;
        assert!(matches!(p.mutate(&mut z, &mut rng), Err(Error::Internal(_))));
    }

    /// Positions whose placement differs between two schedules.
    fn changed(a: &Schedule, b: &Schedule) -> Vec<usize> {
        (0..a.len())
            .filter(|&i| a.placements()[i] != b.placements()[i])
            .collect()
    }

    #[test]
    fn test_shared_slot_mutation_moves_one_group() {
        let p = TimetableProblem::new(
            sample_catalog(),
            &TimetableConfig::default().with_instructor_policy(InstructorPolicy::Soft),
        )
        .unwrap();
        let mut rng = create_rng(5);
        for _ in 0..100 {
            let before = p.create_individual(&mut rng).unwrap();
            let mut after = before.clone();
            p.mutate(&mut after, &mut rng).unwrap();
            assert_valid(&p, &after);

            let diff = changed(&before, &after);
            if let Some(&first) = diff.first() {
                let group = p.layout().group_of(first).unwrap();
                assert!(diff.iter().all(|i| group.contains(i)));
                let moved = after.placements()[group.start];
                assert!(after.placements()[group].iter().all(|&x| x == moved));
            }
        }
    }

    #[test]
    fn test_per_day_mutation_moves_one_key() {
        let config = TimetableConfig::default()
            .with_initialization_policy(InitializationPolicy::PerDay)
            .with_instructor_policy(InstructorPolicy::Soft);
        let p = TimetableProblem::new(sample_catalog(), &config).unwrap();
        let mut rng = create_rng(6);
        let mut moved_any = false;
        for _ in 0..100 {
            let before = p.create_individual(&mut rng).unwrap();
            let mut after = before.clone();
            p.mutate(&mut after, &mut rng).unwrap();
            let diff = changed(&before, &after);
            assert!(diff.len() <= 1);
            moved_any |= !diff.is_empty();
        }
        assert!(moved_any);
    }

    #[test]
    fn test_mutation_invalidates_fitness() {
        let p = problem(InitializationPolicy::SharedSlot);
        let mut rng = create_rng(8);
        let mut s = p.create_individual(&mut rng).unwrap();
        let f = p.evaluate(&s).unwrap();
        s.set_fitness(f);
        p.mutate(&mut s, &mut rng).unwrap();
        assert_eq!(s.fitness(), f64::NEG_INFINITY);
    }

    #[test]
    fn test_forced_same_slot_conflicts() {
        // Both activities can only start at 09:00 in R1 on Monday.
        let only = |id: &str| {
            Activity::new(id, DurationClass::Short)
                .with_days([Day::Monday])
                .with_rooms(["R1"])
                .with_fixed_slots([slot("09:00")])
        };
        let p = TimetableProblem::new(
            Catalog::new(vec![only("A"), only("B")]),
            &TimetableConfig::default(),
        )
        .unwrap();
        let mut rng = create_rng(0);
        let s = p.create_individual(&mut rng).unwrap();
        let e = p.assess(&s).unwrap();
        assert!(e.conflicts >= 1);
        assert!(e.fitness < 1.0);
    }

    #[test]
    fn test_disjoint_rooms_are_perfect() {
        let at = |id: &str, room: &str| {
            Activity::new(id, DurationClass::Short)
                .with_days([Day::Monday])
                .with_rooms([room])
                .with_fixed_slots([slot("09:00")])
        };
        let p = TimetableProblem::new(
            Catalog::new(vec![at("A", "R1"), at("B", "R2")]),
            &TimetableConfig::default(),
        )
        .unwrap();
        let mut rng = create_rng(0);
        let s = p.create_individual(&mut rng).unwrap();
        let e = p.assess(&s).unwrap();
        assert_eq!(e.conflicts, 0);
        assert_eq!(e.fitness, 1.0);
    }

    #[test]
    fn test_infeasible_window() {
        let window = OperatingWindow::new(slot("08:00"), slot("10:00")).unwrap();
        let config = TimetableConfig::default().with_operating_window(window);
        let catalog = Catalog::new(vec![Activity::new("LAB", DurationClass::Long)
            .with_days([Day::Friday])
            .with_rooms(["Lab"])]);
        let err = TimetableProblem::new(catalog, &config).unwrap_err();
        assert!(
            matches!(err, Error::InfeasibleConstraint { ref activity, .. } if activity == "LAB")
        );
    }

    #[test]
    fn test_infeasible_instructor_window() {
        let catalog = Catalog::new(vec![Activity::new("X", DurationClass::Long)
            .with_days([Day::Friday])
            .with_rooms(["R"])
            .with_instructor("Prof. Late", [slot("18:00")])]);
        let err = TimetableProblem::new(catalog.clone(), &TimetableConfig::default()).unwrap_err();
        assert!(matches!(err, Error::InfeasibleConstraint { .. }));

        // The soft policy accepts the same catalog.
        let soft = TimetableConfig::default().with_instructor_policy(InstructorPolicy::Soft);
        assert!(TimetableProblem::new(catalog, &soft).is_ok());
    }

    #[test]
    fn test_missing_days_or_rooms() {
        let no_rooms = Catalog::new(vec![
            Activity::new("A", DurationClass::Short).with_days([Day::Monday])
        ]);
        assert!(matches!(
            TimetableProblem::new(no_rooms, &TimetableConfig::default()),
            Err(Error::InfeasibleConstraint { .. })
        ));
        let no_days = Catalog::new(vec![Activity::new("A", DurationClass::Short).with_rooms(["R"])]);
        assert!(matches!(
            TimetableProblem::new(no_days, &TimetableConfig::default()),
            Err(Error::InfeasibleConstraint { .. })
        ));
    }

    #[test]
    fn test_oversized_duration_fails_construction() {
        let huge: DurationClass = "65520 min".parse().unwrap();
        let catalog = Catalog::new(vec![Activity::new("HUGE", huge)
            .with_days([Day::Monday])
            .with_rooms(["R"])]);
        assert!(matches!(
            TimetableProblem::new(catalog, &TimetableConfig::default()),
            Err(Error::InvalidDuration { .. })
        ));

        let all_day = Catalog::new(vec![Activity::new("DAY", DurationClass::Minutes(1440))
            .with_days([Day::Monday])
            .with_rooms(["R"])]);
        assert!(matches!(
            TimetableProblem::new(all_day, &TimetableConfig::default()),
            Err(Error::InfeasibleConstraint { .. })
        ));
    }

    #[test]
    fn test_invalid_duration_fails_construction() {
        let catalog = Catalog::new(vec![Activity::new("A", DurationClass::Minutes(50))
            .with_days([Day::Monday])
            .with_rooms(["R"])]);
        assert!(matches!(
            TimetableProblem::new(catalog, &TimetableConfig::default()),
            Err(Error::InvalidDuration { .. })
        ));
    }

    #[test]
    fn test_empty_catalog_rejected() {
        assert!(matches!(
            TimetableProblem::new(Catalog::default(), &TimetableConfig::default()),
            Err(Error::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_layout_position_lookup() {
        let p = problem(InitializationPolicy::SharedSlot);
        let key = AssignmentKey {
            activity: 2,
            section: 2,
            day: Day::Wednesday,
        };
        assert_eq!(p.layout().position(&key), Some(14));
    }
}
