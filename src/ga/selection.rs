//! Truncation selection.
//!
//! The population is ranked by descending fitness and the top half becomes
//! the breeding pool. Parents are drawn uniformly, with replacement, from
//! that pool. There is no fitness-proportional weighting: rank alone decides
//! who breeds.
//!
//! # References
//!
//! - Mühlenbein & Schlierkamp-Voosen (1993), "Predictive Models for the
//!   Breeder Genetic Algorithm"
//! - Blickle & Thiele (1996), "A Comparison of Selection Schemes used in
//!   Evolutionary Algorithms"

use super::types::Individual;
use rand::Rng;
use std::cmp::Ordering;

/// Sorts the population by descending fitness.
///
/// The sort is stable, so individuals with equal fitness keep their
/// insertion order. Incomparable values (NaN) are treated as equal.
pub fn rank_descending<I: Individual>(population: &mut [I]) {
    population.sort_by(|a, b| {
        b.fitness()
            .partial_cmp(&a.fitness())
            .unwrap_or(Ordering::Equal)
    });
}

/// Returns the breeding pool: the first `survivors` individuals of a ranked
/// population.
///
/// # Panics
/// Panics if `survivors` is zero or exceeds the population size.
pub fn truncate<I: Individual>(ranked: &[I], survivors: usize) -> &[I] {
    assert!(
        survivors > 0 && survivors <= ranked.len(),
        "breeding pool must be non-empty and fit in the population"
    );
    &ranked[..survivors]
}

/// Draws one parent index uniformly from the pool.
///
/// # Panics
/// Panics if `pool` is empty.
pub fn pick_parent<I: Individual, R: Rng>(pool: &[I], rng: &mut R) -> usize {
    assert!(!pool.is_empty(), "cannot select from empty pool");
    rng.random_range(0..pool.len())
}

/// Index of the best individual; the first one wins ties.
///
/// # Panics
/// Panics if `population` is empty.
pub fn best_index<I: Individual>(population: &[I]) -> usize {
    assert!(!population.is_empty(), "population must not be empty");
    let mut best = 0;
    for (i, ind) in population.iter().enumerate().skip(1) {
        if ind.fitness() > population[best].fitness() {
            best = i;
        }
    }
    best
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::random::create_rng;

    #[derive(Clone, Debug)]
    struct TestInd {
        id: usize,
        fit: f64,
    }

    impl Individual for TestInd {
        type Fitness = f64;
        fn fitness(&self) -> f64 {
            self.fit
        }
        fn set_fitness(&mut self, f: f64) {
            self.fit = f;
        }
    }

    fn make_population(fitnesses: &[f64]) -> Vec<TestInd> {
        fitnesses
            .iter()
            .enumerate()
            .map(|(id, &fit)| TestInd { id, fit })
            .collect()
    }

    #[test]
    fn test_rank_descending() {
        let mut pop = make_population(&[0.2, 1.0, 0.5, 0.25]);
        rank_descending(&mut pop);
        let ids: Vec<usize> = pop.iter().map(|i| i.id).collect();
        assert_eq!(ids, vec![1, 2, 3, 0]);
    }

    #[test]
    fn test_rank_ties_keep_insertion_order() {
        let mut pop = make_population(&[0.5, 1.0, 0.5, 1.0, 0.5]);
        rank_descending(&mut pop);
        let ids: Vec<usize> = pop.iter().map(|i| i.id).collect();
        assert_eq!(ids, vec![1, 3, 0, 2, 4]);
    }

    #[test]
    fn test_truncate_keeps_top() {
        let mut pop = make_population(&[0.1, 0.9, 0.3, 0.7]);
        rank_descending(&mut pop);
        let pool = truncate(&pop, 2);
        let ids: Vec<usize> = pool.iter().map(|i| i.id).collect();
        assert_eq!(ids, vec![1, 3]);
    }

    #[test]
    fn test_pick_parent_uniform() {
        let pool = make_population(&[1.0, 0.5, 0.25, 0.125]);
        let mut rng = create_rng(42);
        let mut counts = [0u32; 4];
        for _ in 0..10_000 {
            counts[pick_parent(&pool, &mut rng)] += 1;
        }
        for &c in &counts {
            assert!(c > 2000, "expected roughly uniform, got {counts:?}");
        }
    }

    #[test]
    fn test_best_index_first_on_tie() {
        let pop = make_population(&[0.5, 1.0, 1.0, 0.2]);
        assert_eq!(best_index(&pop), 1);
    }

    #[test]
    #[should_panic(expected = "cannot select from empty pool")]
    fn test_empty_pool_panics() {
        let pool: Vec<TestInd> = vec![];
        let mut rng = create_rng(42);
        pick_parent(&pool, &mut rng);
    }
}
