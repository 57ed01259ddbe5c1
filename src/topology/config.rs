//! Topology GA configuration.

/// Configuration for the outer GA over radial topologies.
///
/// Every topology individual runs a full SSGA when evaluated, so the
/// defaults are deliberately small.
///
/// # Examples
///
/// ```
/// use u_restoration::topology::TopologyGaConfig;
///
/// let config = TopologyGaConfig::default().with_population_size(8);
/// assert_eq!(config.initial_population(), 10);
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct TopologyGaConfig {
    /// Number of individuals kept after selection.
    pub population_size: usize,

    /// Maximum number of generations.
    pub max_generations: usize,

    /// Size of the initial population relative to `population_size`.
    pub init_factor: f64,

    /// Probability that each initially closed switch is moved to the front
    /// of the Kruskal order when building initial topologies.
    ///
    /// Values close to 1 keep the initial population near the faulted
    /// topology, so few operations are needed.
    pub bias_probability: f64,

    /// Relative gap `|mean - min| / |mean|` below which the population is
    /// considered converged.
    pub convergence_threshold: f64,
}

impl Default for TopologyGaConfig {
    fn default() -> Self {
        Self {
            population_size: 5,
            max_generations: 3,
            init_factor: 1.3,
            bias_probability: 0.99,
            convergence_threshold: 0.01,
        }
    }
}

impl TopologyGaConfig {
    pub fn with_population_size(mut self, n: usize) -> Self {
        self.population_size = n;
        self
    }

    pub fn with_max_generations(mut self, n: usize) -> Self {
        self.max_generations = n;
        self
    }

    pub fn with_init_factor(mut self, factor: f64) -> Self {
        self.init_factor = factor;
        self
    }

    pub fn with_bias_probability(mut self, p: f64) -> Self {
        self.bias_probability = p.clamp(0.0, 1.0);
        self
    }

    pub fn with_convergence_threshold(mut self, threshold: f64) -> Self {
        self.convergence_threshold = threshold.max(0.0);
        self
    }

    /// `round(init_factor * population_size)`.
    pub fn initial_population(&self) -> usize {
        (self.init_factor * self.population_size as f64).round() as usize
    }

    /// Validates the configuration.
    ///
    /// Returns `Err` with a description if any parameter is invalid.
    pub fn validate(&self) -> Result<(), String> {
        if self.population_size == 0 {
            return Err("population_size must be at least 1".into());
        }
        if !self.init_factor.is_finite() || self.init_factor <= 0.0 {
            return Err("init_factor must be positive".into());
        }
        if self.initial_population() == 0 {
            return Err("init_factor * population_size rounds to zero".into());
        }
        if !(0.0..=1.0).contains(&self.bias_probability) {
            return Err("bias_probability must be in [0, 1]".into());
        }
        if !self.convergence_threshold.is_finite() || self.convergence_threshold < 0.0 {
            return Err("convergence_threshold must be finite and non-negative".into());
        }
        Ok(())
    }
}
