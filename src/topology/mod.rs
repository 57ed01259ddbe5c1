//! Topology GA: the outer search over radial reconfigurations.
//!
//! Individuals are spanning trees of the operable-switch graph after fault
//! isolation. Their fitness is the best switching-sequence fitness the
//! [SSGA](crate::ssga) finds for reaching them from the faulted state.
//!
//! Initial trees are built by Kruskal over a shuffled order that puts the
//! initially closed switches first with high probability, so the search
//! starts near the faulted topology. Mutation swaps one closed switch for
//! an open one; crossover draws a fresh tree over the union of both
//! parents' closed switches.

mod config;
mod runner;
mod types;

pub use config::TopologyGaConfig;
pub use runner::{TopologyGaRunner, TopologyResult};
pub use types::{TopologyIndividual, TopologyRecord};
