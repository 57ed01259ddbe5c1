//! Service restoration planning for radial distribution feeders.
//!
//! After a fault is isolated, part of a feeder is left without supply.
//! This crate searches for an alternative radial topology that restores it
//! and for the order in which switches should be operated to reach that
//! topology without ever closing a loop.
//!
//! The search is a two-level genetic algorithm:
//!
//! - **Topology GA** ([`topology`]): individuals are spanning trees of the
//!   operable-switch graph, built by a biased Kruskal that favors the
//!   faulted topology.
//! - **Switching-sequence GA** ([`ssga`]): for each candidate topology,
//!   random-key chromosomes are decoded with the disturbance technique
//!   into close/open pairs and scored with four merit indices
//!   ([`merit`]): load-flow margin, crew displacement, outage duration
//!   and number of operations.
//!
//! Power flow is delegated to a [`LoadFlowOracle`](oracle::LoadFlowOracle)
//! implemented by the caller. [`RadialLoadOracle`](oracle::RadialLoadOracle)
//! is a simple current estimator for tests and dry runs.
//!
//! # Entry point
//!
//! [`RestorationPlanner`](planner::RestorationPlanner) validates the
//! configuration, prepares the faulted topology and runs both GAs.
//!
//! # Features
//!
//! - `parallel`: score SSGA individuals on rayon's thread pool
//! - `serde`: `Serialize`/`Deserialize` for configs, plans and records
//!
//! # References
//!
//! - Bean (1994), *Genetic Algorithms and Random Keys for Sequencing and
//!   Optimization*
//! - Kruskal (1956), *On the Shortest Spanning Subtree of a Graph*

pub mod crew;
pub mod error;
pub mod graph;
pub mod merit;
pub mod network;
pub mod oracle;
pub mod planner;
pub mod random;
pub mod ssga;
pub mod topology;

pub use error::{OracleError, RestorationError, Result};
pub use planner::{RestorationConfig, RestorationPlan, RestorationPlanner};
