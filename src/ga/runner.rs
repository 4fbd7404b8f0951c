//! GA evolutionary loop execution.
//!
//! [`GaRunner`] orchestrates the complete evolutionary process:
//! initialization → evaluation → truncation → crossover → mutation → repeat.

use super::config::GaConfig;
use super::selection::{best_index, pick_parent, rank_descending, truncate};
use super::types::{Fitness, GaProblem, Individual};
use crate::error::Result;
use crate::random::create_rng;
use log::{debug, info, warn};
use rand::Rng;
#[cfg(feature = "parallel")]
use rayon::prelude::*;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Fitness summary of one population.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GenerationStats {
    /// Generation index; 0 is the initial population.
    pub generation: usize,
    /// Highest fitness in the population.
    pub best: f64,
    /// Mean fitness of the population.
    pub mean: f64,
    /// Lowest fitness in the population.
    pub worst: f64,
    /// Number of individuals in the population.
    pub size: usize,
}

impl GenerationStats {
    fn from_population<I: Individual>(generation: usize, population: &[I]) -> Self {
        let mut best = f64::NEG_INFINITY;
        let mut worst = f64::INFINITY;
        let mut sum = 0.0;
        for ind in population {
            let f = ind.fitness().to_f64();
            best = best.max(f);
            worst = worst.min(f);
            sum += f;
        }
        Self {
            generation,
            best,
            mean: sum / population.len().max(1) as f64,
            worst,
            size: population.len(),
        }
    }
}

/// Result of a GA optimization run.
#[derive(Debug, Clone)]
pub struct GaResult<I: Individual> {
    /// The best individual of the final population.
    pub best: I,

    /// Best fitness value (same as `best.fitness()`).
    pub best_fitness: I::Fitness,

    /// Number of generations executed.
    pub generations: usize,

    /// Whether the run stopped because the target fitness was reached.
    pub converged: bool,

    /// Whether the run was cancelled externally.
    pub cancelled: bool,

    /// Population statistics, one entry for the initial population and one
    /// per executed generation.
    pub history: Vec<GenerationStats>,

    /// The final population, ranked by descending fitness.
    pub population: Vec<I>,
}

impl<I: Individual> GaResult<I> {
    /// Best fitness after each generation (index 0 is the initial population).
    pub fn fitness_history(&self) -> Vec<f64> {
        self.history.iter().map(|s| s.best).collect()
    }
}

/// Executes the GA evolutionary loop.
///
/// # Usage
///
/// ```ignore
/// let problem = MyProblem::new();
/// let config = GaConfig::default().with_seed(42);
/// let result = GaRunner::run(&problem, &config)?;
/// println!("Best fitness: {:?}", result.best_fitness);
/// ```
pub struct GaRunner;

impl GaRunner {
    /// Runs the GA optimization.
    pub fn run<P: GaProblem>(problem: &P, config: &GaConfig) -> Result<GaResult<P::Individual>> {
        Self::run_with_cancel(problem, config, None)
    }

    /// Runs the GA with an optional cancellation token.
    ///
    /// The flag is checked once per generation boundary. When it is set the
    /// run stops before starting the next generation and returns the current
    /// population's best, so no partially built generation is ever observed.
    pub fn run_with_cancel<P: GaProblem>(
        problem: &P,
        config: &GaConfig,
        cancel: Option<Arc<AtomicBool>>,
    ) -> Result<GaResult<P::Individual>> {
        config.validate()?;

        let mut rng = match config.seed {
            Some(seed) => create_rng(seed),
            None => create_rng(rand::random()),
        };

        info!(
            "ga start: population={} generations={} mutation_rate={}",
            config.population_size, config.max_generations, config.mutation_rate
        );

        // 1. Initialize population
        let mut population = (0..config.population_size)
            .map(|_| problem.create_individual(&mut rng))
            .collect::<Result<Vec<_>>>()?;

        // 2. Evaluate and rank initial population
        evaluate_population(problem, &mut population, config.parallel)?;
        rank_descending(&mut population);

        let mut history = Vec::with_capacity(config.max_generations.min(4096) + 1);
        history.push(GenerationStats::from_population(0, &population));

        let survivors = config.survivor_count();
        let mut executed = 0usize;
        let mut cancelled = false;
        let mut converged = reached_target(&population, config);

        // 3. Evolutionary loop
        while !converged && executed < config.max_generations {
            if let Some(ref flag) = cancel {
                if flag.load(Ordering::Relaxed) {
                    warn!("ga cancelled after {executed} generations");
                    cancelled = true;
                    break;
                }
            }

            // Truncation: the ranked top half breeds and survives unchanged
            let pool = truncate(&population, survivors);
            let mut next_gen: Vec<P::Individual> = pool.to_vec();

            while next_gen.len() < config.population_size {
                let p1 = pick_parent(pool, &mut rng);
                let p2 = pick_parent(pool, &mut rng);

                let children = problem.crossover(&pool[p1], &pool[p2], &mut rng)?;

                for mut child in children {
                    if next_gen.len() >= config.population_size {
                        break;
                    }
                    if rng.random_range(0.0..1.0) < config.mutation_rate {
                        problem.mutate(&mut child, &mut rng)?;
                    }
                    next_gen.push(child);
                }
            }

            // Survivors keep their fitness; only offspring need evaluation
            evaluate_population(problem, &mut next_gen[survivors..], config.parallel)?;
            rank_descending(&mut next_gen);
            population = next_gen;
            executed += 1;

            let stats = GenerationStats::from_population(executed, &population);
            debug!(
                "generation {}: best={:.6} mean={:.6} worst={:.6}",
                executed, stats.best, stats.mean, stats.worst
            );
            history.push(stats);

            problem.on_generation(executed, population[0].fitness());
            converged = reached_target(&population, config);
        }

        let best = population[best_index(&population)].clone();
        info!(
            "ga finished: generations={} best={:.6} converged={} cancelled={}",
            executed,
            best.fitness().to_f64(),
            converged,
            cancelled
        );

        Ok(GaResult {
            best_fitness: best.fitness(),
            best,
            generations: executed,
            converged,
            cancelled,
            history,
            population,
        })
    }
}

fn reached_target<I: Individual>(population: &[I], config: &GaConfig) -> bool {
    match config.target_fitness {
        Some(target) => population[best_index(population)].fitness().to_f64() >= target,
        None => false,
    }
}

fn evaluate_one<P: GaProblem>(problem: &P, ind: &mut P::Individual) -> Result<()> {
    let f = problem.evaluate(ind)?;
    ind.set_fitness(f);
    Ok(())
}

/// Evaluate all individuals in the slice.
#[cfg(feature = "parallel")]
fn evaluate_population<P: GaProblem>(
    problem: &P,
    population: &mut [P::Individual],
    parallel: bool,
) -> Result<()> {
    if parallel {
        population
            .par_iter_mut()
            .try_for_each(|ind| evaluate_one(problem, ind))
    } else {
        population
            .iter_mut()
            .try_for_each(|ind| evaluate_one(problem, ind))
    }
}

/// Evaluate all individuals in the slice.
#[cfg(not(feature = "parallel"))]
fn evaluate_population<P: GaProblem>(
    problem: &P,
    population: &mut [P::Individual],
    _parallel: bool,
) -> Result<()> {
    population
        .iter_mut()
        .try_for_each(|ind| evaluate_one(problem, ind))
}

// ============================================================================
// Tests
// ============================================================================
