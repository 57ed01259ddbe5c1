//! Interface to the external load-flow solver.
//!
//! The optimizer never solves power flow itself. It drives an implementation
//! of [`LoadFlowOracle`] through a fixed protocol: set a switch state,
//! solve, read results, apply changes, solve again, read, revert. The
//! oracle is borrowed mutably for the whole sequence, so two evaluations can
//! never interleave on the same instance.
//!
//! [`RadialLoadOracle`] is a small reference implementation that sums
//! constant per-vertex loads along the energized tree. It is meant for
//! tests, benchmarks and dry runs, not for engineering studies.

mod radial;

pub use radial::RadialLoadOracle;

use crate::error::OracleError;
use std::collections::BTreeMap;
use std::fmt;

/// Operation performed on a switch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum SwitchAction {
    #[cfg_attr(feature = "serde", serde(rename = "op"))]
    Open,
    #[cfg_attr(feature = "serde", serde(rename = "cl"))]
    Close,
}

impl SwitchAction {
    /// The action that undoes this one.
    pub fn inverse(self) -> Self {
        match self {
            SwitchAction::Open => SwitchAction::Close,
            SwitchAction::Close => SwitchAction::Open,
        }
    }
}

impl fmt::Display for SwitchAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            SwitchAction::Open => "op",
            SwitchAction::Close => "cl",
        })
    }
}

/// One step of a switching plan.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SwitchChange {
    pub code: String,
    pub action: SwitchAction,
}

impl SwitchChange {
    pub fn new(code: impl Into<String>, action: SwitchAction) -> Self {
        Self {
            code: code.into(),
            action,
        }
    }

    pub fn open(code: impl Into<String>) -> Self {
        Self::new(code, SwitchAction::Open)
    }

    pub fn close(code: impl Into<String>) -> Self {
        Self::new(code, SwitchAction::Close)
    }

    /// The change that undoes this one.
    pub fn inverted(&self) -> Self {
        Self::new(self.code.clone(), self.action.inverse())
    }
}

impl fmt::Display for SwitchChange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.action, self.code)
    }
}

/// Full switch state handed to [`LoadFlowOracle::set_state`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SwitchStates {
    pub closed: Vec<String>,
    pub opened: Vec<String>,
}

/// External electrical network solver.
///
/// Calls may block. Implementations must make
/// [`revert_changes`](Self::revert_changes) undo
/// [`apply_changes`](Self::apply_changes) exactly, since the evaluator
/// relies on leaving the oracle as it found it.
pub trait LoadFlowOracle {
    /// Replaces the whole switch state.
    fn set_state(&mut self, states: &SwitchStates) -> Result<(), OracleError>;

    /// Solves the network for the current switch state.
    fn solve(&mut self) -> Result<(), OracleError>;

    /// Three-phase current magnitudes through each switch, from the last
    /// [`solve`](Self::solve).
    fn branch_currents(&self) -> BTreeMap<String, [f64; 3]>;

    /// Customers left without supply by the last [`solve`](Self::solve).
    fn interrupted_customer_count(&self) -> u64;

    /// Applies one switching operation.
    fn apply_single_change(&mut self, change: &SwitchChange) -> Result<(), OracleError>;

    /// Applies `changes` in order.
    fn apply_changes(&mut self, changes: &[SwitchChange]) -> Result<(), OracleError> {
        for change in changes {
            self.apply_single_change(change)?;
        }
        Ok(())
    }

    /// Undoes `changes`, last one first.
    fn revert_changes(&mut self, changes: &[SwitchChange]) -> Result<(), OracleError> {
        for change in changes.iter().rev() {
            self.apply_single_change(&change.inverted())?;
        }
        Ok(())
    }
}
