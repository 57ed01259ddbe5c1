//! Restoration planning entry point.
//!
//! [`RestorationPlanner`] wires the network data, the crew travel index,
//! the merit weights and both genetic algorithms together.
//!
//! ```
//! use u_restoration::network::{
//!     FaultIsolation, NetworkData, OperableEdge, SwitchKind, SwitchRecord,
//! };
//! use u_restoration::oracle::RadialLoadOracle;
//! use u_restoration::planner::{RestorationConfig, RestorationPlanner};
//!
//! // 0 -A- 1 -B- 2 -T(open)- 3 -C- 0
//! let edges = vec![
//!     OperableEdge::new(0, 1, "A", true),
//!     OperableEdge::new(1, 2, "B", true),
//!     OperableEdge::new(2, 3, "T", false),
//!     OperableEdge::new(3, 0, "C", true),
//! ];
//! let switches = vec![
//!     SwitchRecord::new(0, "A", SwitchKind::Breaker),
//!     SwitchRecord::new(1, "B", SwitchKind::Manual),
//!     SwitchRecord::new(2, "T", SwitchKind::Manual),
//!     SwitchRecord::new(3, "C", SwitchKind::Recloser),
//! ];
//! let network = NetworkData::new(4, edges, switches)?.with_vertex_customers(vec![0, 5, 8, 3])?;
//! let mut oracle = RadialLoadOracle::new(&network, vec![[1.0; 3]; 4])?;
//!
//! let planner = RestorationPlanner::new(&network, RestorationConfig::default().with_seed(7))?;
//! let plan = planner
//!     .plan(&mut oracle, &FaultIsolation::new(["B"]))?
//!     .expect("vertex 2 can be fed through T");
//! assert_eq!(plan.changes.len(), 1);
//! assert_eq!(plan.changes[0].to_string(), "cl T");
//! # Ok::<(), u_restoration::RestorationError>(())
//! ```

use crate::crew::CrewDisplacementIndex;
use crate::error::{RestorationError, Result};
use crate::graph::EdgeKey;
use crate::merit::{AuxiliaryOperations, MeritIndex, MeritIndexEvaluator, MeritWeights, PassThrough};
use crate::network::{FaultIsolation, NetworkData};
use crate::oracle::{LoadFlowOracle, SwitchChange};
use crate::random::rng_from_seed;
use crate::ssga::{SsgaConfig, SwitchPair, SwitchingContext};
use crate::topology::{TopologyGaConfig, TopologyGaRunner};
use rand::Rng;
use tracing::{info, instrument};

/// Full planner configuration.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct RestorationConfig {
    pub topology: TopologyGaConfig,
    pub switching: SsgaConfig,
    pub weights: MeritWeights,
    /// Switch where the field crew starts. Empty means no known position,
    /// which makes the first trip free.
    pub start_switch: String,
    /// Random seed for reproducibility; `None` draws a fresh one per plan.
    pub seed: Option<u64>,
}

impl RestorationConfig {
    pub fn with_topology(mut self, topology: TopologyGaConfig) -> Self {
        self.topology = topology;
        self
    }

    pub fn with_switching(mut self, switching: SsgaConfig) -> Self {
        self.switching = switching;
        self
    }

    pub fn with_weights(mut self, weights: MeritWeights) -> Self {
        self.weights = weights;
        self
    }

    pub fn with_start_switch(mut self, code: impl Into<String>) -> Self {
        self.start_switch = code.into();
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Validates every section.
    ///
    /// # Errors
    /// [`RestorationError::InvalidConfig`] naming the failing section.
    pub fn validate(&self) -> Result<()> {
        let invalid = |section: &str, msg: String| RestorationError::InvalidConfig(format!("{section}: {msg}"));
        self.topology.validate().map_err(|m| invalid("topology", m))?;
        self.switching.validate().map_err(|m| invalid("switching", m))?;
        self.weights.validate().map_err(|m| invalid("weights", m))?;
        Ok(())
    }
}

/// A restoration plan.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RestorationPlan {
    /// Closed switches of the topology to adopt.
    pub final_edges: Vec<EdgeKey>,
    /// Operations to carry out, in order, after auxiliary operations were
    /// added.
    pub changes: Vec<SwitchChange>,
    /// Close-then-open order of the switching pairs.
    pub natural: Vec<SwitchChange>,
    /// Open-then-close order of the switching pairs.
    pub inverted: Vec<SwitchChange>,
    pub pairs: Vec<SwitchPair>,
    pub merit: MeritIndex,
    /// Topology GA generations executed.
    pub generations: usize,
    /// Best fitness after the initial evaluation and each generation.
    pub fitness_history: Vec<f64>,
}

/// Computes restoration plans for one network.
pub struct RestorationPlanner<'a> {
    network: &'a NetworkData,
    crew: CrewDisplacementIndex,
    config: RestorationConfig,
    auxiliary: Box<dyn AuxiliaryOperations>,
}

impl<'a> RestorationPlanner<'a> {
    /// Validates `config` and precomputes crew travel times.
    ///
    /// # Errors
    /// [`RestorationError::InvalidConfig`] for out-of-range parameters and
    /// [`RestorationError::UnknownSwitch`] when the start switch is not
    /// registered.
    pub fn new(network: &'a NetworkData, config: RestorationConfig) -> Result<Self> {
        config.validate()?;
        if !config.start_switch.is_empty() && network.switch(&config.start_switch).is_none() {
            return Err(RestorationError::UnknownSwitch {
                code: config.start_switch.clone(),
            });
        }
        Ok(Self {
            network,
            crew: CrewDisplacementIndex::new(network),
            config,
            auxiliary: Box::new(PassThrough),
        })
    }

    /// Replaces the post-processing of reported change lists.
    pub fn with_auxiliary_operations(mut self, auxiliary: Box<dyn AuxiliaryOperations>) -> Self {
        self.auxiliary = auxiliary;
        self
    }

    pub fn config(&self) -> &RestorationConfig {
        &self.config
    }

    pub fn crew_index(&self) -> &CrewDisplacementIndex {
        &self.crew
    }

    /// Plans the restoration after `isolation`, seeding the RNG from the
    /// configuration.
    ///
    /// Returns `Ok(None)` when no reachable topology differs from the
    /// faulted one.
    ///
    /// # Errors
    /// Unknown isolation switches and oracle failures.
    pub fn plan<O>(&self, oracle: &mut O, isolation: &FaultIsolation) -> Result<Option<RestorationPlan>>
    where
        O: LoadFlowOracle + ?Sized,
    {
        let mut rng = rng_from_seed(self.config.seed);
        self.plan_with_rng(oracle, isolation, &mut rng)
    }

    /// Like [`plan`](Self::plan) with a caller-owned RNG.
    #[instrument(
        name = "planner.plan",
        err,
        skip_all,
        fields(isolated = isolation.open_switches.len()),
    )]
    pub fn plan_with_rng<O, R>(
        &self,
        oracle: &mut O,
        isolation: &FaultIsolation,
        rng: &mut R,
    ) -> Result<Option<RestorationPlan>>
    where
        O: LoadFlowOracle + ?Sized,
        R: Rng,
    {
        let faulted = self.network.isolate(isolation)?;
        let ctx = SwitchingContext {
            evaluator: MeritIndexEvaluator::new(self.network, &self.crew),
            auxiliary: self.auxiliary.as_ref(),
            weights: self.config.weights,
            start_switch: &self.config.start_switch,
            candidates: &faulted.candidates,
            initial: &faulted.initially_closed,
        };

        let result = TopologyGaRunner::run(&ctx, oracle, &self.config.topology, &self.config.switching, rng)?;
        let Some(best) = result.best else {
            info!("no restoration topology found");
            return Ok(None);
        };

        info!(
            fitness = best.fitness,
            operations = best.switching.effective.len(),
            "restoration plan ready"
        );
        let switching = best.switching;
        Ok(Some(RestorationPlan {
            final_edges: best.edges,
            changes: switching.effective,
            natural: switching.natural,
            inverted: switching.inverted,
            pairs: switching.pairs,
            merit: switching.merit,
            generations: result.generations,
            fitness_history: result.fitness_history,
        }))
    }
}
