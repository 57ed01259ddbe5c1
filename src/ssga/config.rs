//! SSGA configuration.

/// Configuration for the switching-sequence GA.
///
/// # Examples
///
/// ```
/// use u_restoration::ssga::SsgaConfig;
///
/// let config = SsgaConfig::default()
///     .with_num_individuals(30)
///     .with_mutation_rate(0.2);
/// assert_eq!(config.num_individuals, 30);
/// assert_eq!(config.max_generations, 30);
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct SsgaConfig {
    /// Number of individuals kept after selection.
    pub num_individuals: usize,

    /// Maximum number of generations.
    pub max_generations: usize,

    /// Probability that a pair of individuals produces a child (0.0–1.0).
    pub crossover_rate: f64,

    /// Per-gene probability of drawing a fresh key (0.0–1.0).
    pub mutation_rate: f64,

    /// Convergence threshold, in percent, on `(mean - min) / min` of the
    /// population fitness.
    pub min_fitness_delta_pct: f64,

    /// Whether to score individuals in parallel using rayon.
    ///
    /// Only effective with the `parallel` cargo feature. Decoding always
    /// runs sequentially so results do not depend on this flag.
    pub parallel: bool,
}

impl Default for SsgaConfig {
    fn default() -> Self {
        Self {
            num_individuals: 20,
            max_generations: 30,
            crossover_rate: 0.9,
            mutation_rate: 0.1,
            min_fitness_delta_pct: 3.0,
            parallel: false,
        }
    }
}

impl SsgaConfig {
    pub fn with_num_individuals(mut self, n: usize) -> Self {
        self.num_individuals = n;
        self
    }

    pub fn with_max_generations(mut self, n: usize) -> Self {
        self.max_generations = n;
        self
    }

    pub fn with_crossover_rate(mut self, rate: f64) -> Self {
        self.crossover_rate = rate.clamp(0.0, 1.0);
        self
    }

    pub fn with_mutation_rate(mut self, rate: f64) -> Self {
        self.mutation_rate = rate.clamp(0.0, 1.0);
        self
    }

    /// Sets the convergence threshold in percent.
    pub fn with_min_fitness_delta_pct(mut self, pct: f64) -> Self {
        self.min_fitness_delta_pct = pct.max(0.0);
        self
    }

    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Validates the configuration.
    ///
    /// Returns `Err` with a description if any parameter is invalid.
    pub fn validate(&self) -> Result<(), String> {
        if self.num_individuals == 0 {
            return Err("num_individuals must be at least 1".into());
        }
        if !(0.0..=1.0).contains(&self.crossover_rate) {
            return Err("crossover_rate must be in [0, 1]".into());
        }
        if !(0.0..=1.0).contains(&self.mutation_rate) {
            return Err("mutation_rate must be in [0, 1]".into());
        }
        if !self.min_fitness_delta_pct.is_finite() || self.min_fitness_delta_pct < 0.0 {
            return Err("min_fitness_delta_pct must be finite and non-negative".into());
        }
        Ok(())
    }
}
