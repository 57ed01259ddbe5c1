//! Switching-sequence genetic algorithm (SSGA).
//!
//! Given the topology right after fault isolation and a target radial
//! topology, the SSGA searches the order in which switches should be
//! operated. Chromosomes are random keys, one per switch to close; the
//! [disturbance-technique decoder](decode) turns them into close/open pairs
//! that never leave a mesh in the network.
//!
//! # Key Types
//!
//! - [`SsgaConfig`]: population size, rates, convergence threshold
//! - [`SsgaRunner`]: executes the evolutionary loop
//! - [`SsgaOutcome`]: found sequence, no change needed, or infeasible
//! - [`SwitchingRecord`]: best sequence with its merit breakdown
//!
//! # References
//!
//! - Bean (1994), *Genetic Algorithms and Random Keys for Sequencing and
//!   Optimization*

mod config;
mod decode;
mod runner;
mod types;

pub use config::SsgaConfig;
pub use decode::{decode, random_keys_to_order, switching_sequence};
pub use runner::{SsgaOutcome, SsgaResult, SsgaRunner, SwitchingContext};
pub use types::{SwitchPair, SwitchingDiff, SwitchingIndividual, SwitchingRecord, SwitchingSequence};
