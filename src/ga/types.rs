//! Core trait definitions for the GA framework.
//!
//! The two central traits, [`Individual`] and [`GaProblem`], define the
//! contract between the generic GA engine and domain-specific problem
//! implementations.

use crate::error::Result;
use rand::Rng;

/// Marker trait for fitness values.
///
/// Fitness must support comparison and be cheaply copyable.
/// Higher fitness is considered better (maximization).
///
/// A built-in implementation exists for `f64`.
pub trait Fitness: PartialOrd + Copy + Send + Sync + std::fmt::Debug + 'static {
    /// Returns a value representing the worst possible fitness.
    ///
    /// Used for individuals that have not been evaluated yet.
    fn worst() -> Self;

    /// Converts the fitness to `f64` for logging and statistics.
    fn to_f64(self) -> f64;
}

impl Fitness for f64 {
    fn worst() -> Self {
        f64::NEG_INFINITY
    }

    fn to_f64(self) -> f64 {
        self
    }
}

/// A candidate solution in the GA population.
///
/// Individuals carry their own fitness value. The GA framework calls
/// [`GaProblem::evaluate`] to compute fitness, then stores it via
/// [`set_fitness`](Individual::set_fitness).
pub trait Individual: Clone + Send + Sync {
    /// The fitness type. Must implement [`Fitness`].
    type Fitness: Fitness;

    /// Returns the current fitness of this individual.
    fn fitness(&self) -> Self::Fitness;

    /// Sets the fitness of this individual.
    fn set_fitness(&mut self, fitness: Self::Fitness);
}

/// Defines a GA optimization problem.
///
/// Implementors plug domain logic into [`GaRunner`](super::GaRunner):
///
/// 1. **Initialization**: how to create random individuals
/// 2. **Evaluation**: how to compute fitness
/// 3. **Crossover**: how to recombine two parents
/// 4. **Mutation**: how to perturb an individual
///
/// Every operation is fallible. Errors abort the run immediately; the
/// runner never retries.
///
/// # Thread Safety
///
/// `GaProblem` must be `Send + Sync` because the runner may evaluate
/// individuals in parallel using rayon.
pub trait GaProblem: Send + Sync {
    /// The individual (solution) type for this problem.
    type Individual: Individual;

    /// Creates a random individual.
    fn create_individual<R: Rng>(&self, rng: &mut R) -> Result<Self::Individual>;

    /// Evaluates an individual and returns its fitness.
    ///
    /// Must be a pure function of the individual: the runner may call it
    /// from worker threads in any order.
    fn evaluate(
        &self,
        individual: &Self::Individual,
    ) -> Result<<Self::Individual as Individual>::Fitness>;

    /// Produces offspring by recombining two parents.
    ///
    /// The default implementation clones both parents (no crossover).
    fn crossover<R: Rng>(
        &self,
        parent1: &Self::Individual,
        parent2: &Self::Individual,
        _rng: &mut R,
    ) -> Result<Vec<Self::Individual>> {
        Ok(vec![parent1.clone(), parent2.clone()])
    }

    /// Mutates an individual in place.
    ///
    /// The default implementation is a no-op.
    fn mutate<R: Rng>(&self, _individual: &mut Self::Individual, _rng: &mut R) -> Result<()> {
        Ok(())
    }

    /// Called at the end of each generation with the current best fitness.
    fn on_generation(
        &self,
        _generation: usize,
        _best_fitness: <Self::Individual as Individual>::Fitness,
    ) {
    }
}
