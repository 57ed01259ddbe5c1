//! Error types for the restoration planner.
//!
//! Search failures (an individual that cannot be decoded, a topology with
//! no valid switching sequence) are not errors: they are handled inside
//! the populations. The types here cover invalid inputs and failures
//! reported by the external load-flow oracle.

use thiserror::Error;

/// Error reported by a [`crate::oracle::LoadFlowOracle`] implementation.
#[non_exhaustive]
#[derive(Clone, Debug, Eq, Error, PartialEq)]
pub enum OracleError {
    /// `solve` or a state change was requested before any state was set.
    #[error("oracle has no switch state; call set_state first")]
    NotInitialized,
    /// The oracle does not know the requested switch.
    #[error("oracle does not know switch `{code}`")]
    UnknownSwitch {
        /// Switch code that was not found.
        code: String,
    },
    /// The underlying solver failed.
    #[error("load-flow solver failed: {0}")]
    Solver(String),
}

/// Error type produced when configuring or running the planner.
#[non_exhaustive]
#[derive(Clone, Debug, Error, PartialEq)]
pub enum RestorationError {
    /// A configuration parameter is out of range.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
    /// The network description is inconsistent.
    #[error("invalid network data: {0}")]
    InvalidNetwork(String),
    /// A switch code is not present in the network data.
    #[error("unknown switch `{code}`")]
    UnknownSwitch {
        /// The code that failed to resolve.
        code: String,
    },
    /// An edge has no operable switch attached.
    #[error("no operable switch between vertices {u} and {v}")]
    UnknownEdge {
        /// Lower endpoint.
        u: usize,
        /// Higher endpoint.
        v: usize,
    },
    /// The load-flow oracle failed.
    #[error(transparent)]
    Oracle(#[from] OracleError),
}

/// Convenient result alias for planner operations.
pub type Result<T, E = RestorationError> = std::result::Result<T, E>;
