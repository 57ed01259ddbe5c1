//! Topology GA data types.

use crate::graph::{EdgeKey, FeederGraph};
use crate::ssga::SwitchingRecord;

/// A candidate radial topology and the best way found to reach it.
#[derive(Debug, Clone)]
pub struct TopologyIndividual {
    pub graph: FeederGraph,
    /// Best SSGA fitness; `f64::INFINITY` until evaluated.
    pub fitness: f64,
    pub switching: Option<SwitchingRecord>,
}

impl TopologyIndividual {
    pub fn new(graph: FeederGraph) -> Self {
        Self {
            graph,
            fitness: f64::INFINITY,
            switching: None,
        }
    }

    /// Snapshot of this individual, if it has a switching sequence.
    pub fn record(&self) -> Option<TopologyRecord> {
        self.switching.as_ref().map(|switching| TopologyRecord {
            edges: self.graph.spanning().to_vec(),
            fitness: self.fitness,
            switching: switching.clone(),
        })
    }
}

/// Best topology found, detached from the population.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TopologyRecord {
    /// Closed switches of the final topology.
    pub edges: Vec<EdgeKey>,
    pub fitness: f64,
    pub switching: SwitchingRecord,
}
