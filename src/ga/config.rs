//! GA configuration.
//!
//! [`GaConfig`] holds all parameters that control the evolutionary loop.

use crate::error::{Error, Result};

/// Configuration for the Genetic Algorithm.
///
/// # Defaults
///
/// ```
/// use timetable_ga::ga::GaConfig;
///
/// let config = GaConfig::default();
/// assert_eq!(config.population_size, 100);
/// assert_eq!(config.max_generations, 1000);
/// ```
///
/// # Builder Pattern
///
/// ```
/// use timetable_ga::ga::GaConfig;
///
/// let config = GaConfig::default()
///     .with_population_size(200)
///     .with_mutation_rate(0.2)
///     .with_seed(42);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct GaConfig {
    /// Number of individuals in the population. Must be positive and even.
    pub population_size: usize,

    /// Number of generations to run. Zero returns the best initial individual.
    pub max_generations: usize,

    /// Probability of mutating each offspring (0.0–1.0).
    pub mutation_rate: f64,

    /// Stop as soon as the best individual reaches this fitness.
    ///
    /// `None` runs the full generation budget (the default).
    pub target_fitness: Option<f64>,

    /// Whether to evaluate individuals in parallel using rayon.
    ///
    /// Has no effect unless the `parallel` feature is enabled.
    pub parallel: bool,

    /// Random seed for reproducibility.
    ///
    /// `None` draws a seed from the thread-local generator.
    pub seed: Option<u64>,
}

impl Default for GaConfig {
    fn default() -> Self {
        Self {
            population_size: 100,
            max_generations: 1000,
            mutation_rate: 0.1,
            target_fitness: None,
            parallel: true,
            seed: None,
        }
    }
}

impl GaConfig {
    /// Sets the population size.
    pub fn with_population_size(mut self, n: usize) -> Self {
        self.population_size = n;
        self
    }

    /// Sets the number of generations.
    pub fn with_max_generations(mut self, n: usize) -> Self {
        self.max_generations = n;
        self
    }

    /// Sets the mutation rate.
    pub fn with_mutation_rate(mut self, rate: f64) -> Self {
        self.mutation_rate = rate.clamp(0.0, 1.0);
        self
    }

    /// Enables early stopping once `fitness` is reached.
    pub fn with_target_fitness(mut self, fitness: f64) -> Self {
        self.target_fitness = Some(fitness);
        self
    }

    /// Enables or disables parallel evaluation.
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Sets the random seed for reproducibility.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Size of the truncation breeding pool: `⌊population_size / 2⌋`.
    pub fn survivor_count(&self) -> usize {
        self.population_size / 2
    }

    /// Validates the configuration.
    pub fn validate(&self) -> Result<()> {
        if self.population_size == 0 {
            return Err(Error::InvalidConfig("population_size must be positive".into()));
        }
        if self.population_size % 2 != 0 {
            return Err(Error::InvalidConfig("population_size must be even".into()));
        }
        if !(0.0..=1.0).contains(&self.mutation_rate) {
            return Err(Error::InvalidConfig(
                "mutation_rate must lie in [0, 1]".into(),
            ));
        }
        if let Some(target) = self.target_fitness {
            if target.is_nan() {
                return Err(Error::InvalidConfig("target_fitness must not be NaN".into()));
            }
        }
        Ok(())
    }
}
