//! Post-processing of switching plans before they are reported.

use crate::graph::EdgeKey;
use crate::network::NetworkData;
use crate::oracle::SwitchChange;

/// Turns the optimizer's inverted change list into the list reported to
/// operators.
///
/// Implementations may prepend or append operations, for example to open
/// an upstream recloser before a manual switch is operated under load and
/// close it again afterwards. The result does not feed back into fitness.
pub trait AuxiliaryOperations: Send + Sync {
    /// Returns the effective change list for `changes`.
    ///
    /// `closed_snapshot` holds the switches closed before the first change.
    fn effective_changes(
        &self,
        changes: &[SwitchChange],
        network: &NetworkData,
        closed_snapshot: &[EdgeKey],
    ) -> Vec<SwitchChange>;
}

/// Reports the change list unchanged.
#[derive(Debug, Clone, Copy, Default)]
pub struct PassThrough;

impl AuxiliaryOperations for PassThrough {
    fn effective_changes(
        &self,
        changes: &[SwitchChange],
        _network: &NetworkData,
        _closed_snapshot: &[EdgeKey],
    ) -> Vec<SwitchChange> {
        changes.to_vec()
    }
}
