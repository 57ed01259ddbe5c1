//! Computation of the four merit indices.

use super::{MAX_CREW_MINUTES, MAX_OUTAGE_DURATION, MAX_SWITCH_OPERATIONS, PENALTY};
use crate::crew::CrewDisplacementIndex;
use crate::error::OracleError;
use crate::graph::{unreachable_from_source, EdgeKey};
use crate::network::NetworkData;
use crate::oracle::{LoadFlowOracle, SwitchAction, SwitchChange, SwitchStates};
use std::collections::{BTreeMap, BTreeSet};

/// Weight of a margin sample whose switch is within its ampacity.
const WITHIN_LIMIT_WEIGHT: f64 = 1.0;
/// Weight of a margin sample whose switch is overloaded.
const OVERLOAD_WEIGHT: f64 = 5.0;
const MANUAL_OPERATION_WEIGHT: f64 = 1.0;
const AUTOMATIC_OPERATION_WEIGHT: f64 = 2.0;

/// Scores switching plans against one network.
#[derive(Debug, Clone, Copy)]
pub struct MeritIndexEvaluator<'a> {
    network: &'a NetworkData,
    crew: &'a CrewDisplacementIndex,
}

impl<'a> MeritIndexEvaluator<'a> {
    pub fn new(network: &'a NetworkData, crew: &'a CrewDisplacementIndex) -> Self {
        Self { network, crew }
    }

    pub fn network(&self) -> &'a NetworkData {
        self.network
    }

    /// Relative loss of loading margin at protection devices caused by
    /// `planned_changes`.
    ///
    /// The oracle is set to `initial`, solved, changed, solved again and
    /// reverted, in one call. Positive values mean the plan leaves less
    /// margin than the faulted state. Zero when the initial margin is zero.
    ///
    /// # Errors
    /// Propagates oracle failures.
    pub fn load_flow_merit_index<O: LoadFlowOracle + ?Sized>(
        &self,
        oracle: &mut O,
        initial: &SwitchStates,
        planned_changes: &[SwitchChange],
    ) -> Result<f64, OracleError> {
        oracle.set_state(initial)?;
        oracle.solve()?;
        let before = oracle.branch_currents();

        oracle.apply_changes(planned_changes)?;
        let solved = oracle.solve();
        let after = oracle.branch_currents();
        oracle.revert_changes(planned_changes)?;
        solved?;

        let m_before = self.loading_margin(&before);
        let m_final = self.loading_margin(&after);
        if m_before == 0.0 {
            return Ok(0.0);
        }
        Ok((m_before - m_final) / m_before)
    }

    /// Weighted mean of `capacity - current` over every non-zero phase
    /// current of every protection device; overloads weigh more.
    fn loading_margin(&self, currents: &BTreeMap<String, [f64; 3]>) -> f64 {
        let mut margin = 0.0;
        let mut weight = 0.0;
        for (code, phases) in currents {
            let Some(capacity) = self.network.protection_capacity(code) else {
                continue;
            };
            if capacity <= 0.0 {
                continue;
            }
            for &current in phases.iter().filter(|c| **c != 0.0) {
                let diff = capacity - current;
                let w = if diff >= 0.0 {
                    WITHIN_LIMIT_WEIGHT
                } else {
                    OVERLOAD_WEIGHT
                };
                margin += w * diff;
                weight += w;
            }
        }
        if weight > 0.0 {
            margin / weight
        } else {
            0.0
        }
    }

    /// Crew travel time to execute `ordered_changes` starting at
    /// `start_switch`.
    ///
    /// Returns the index and the time of each leg (start to first switch,
    /// then between consecutive switches). Plans with fewer than two
    /// changes cost nothing and have no legs.
    pub fn crew_displacement_merit_index(
        &self,
        start_switch: &str,
        ordered_changes: &[SwitchChange],
    ) -> (f64, Vec<f64>) {
        if ordered_changes.len() < 2 {
            return (0.0, Vec::new());
        }

        let mut legs = Vec::with_capacity(ordered_changes.len());
        legs.push(self.crew.travel_time(start_switch, &ordered_changes[0].code));
        for pair in ordered_changes.windows(2) {
            legs.push(self.crew.travel_time(&pair[0].code, &pair[1].code));
        }

        let total: f64 = legs.iter().sum();
        let index = if total < MAX_CREW_MINUTES {
            total / MAX_CREW_MINUTES
        } else {
            PENALTY
        };
        (index, legs)
    }

    /// Customer-weighted outage duration while `ordered_changes` are carried
    /// out.
    ///
    /// The switching state starts at `closed_snapshot`. Interrupted customers
    /// are counted before the first change and after each one; the count at
    /// step `i` lasts for `displacement_times[i]`. The accumulated
    /// customer-minutes are divided by the customers involved and by
    /// [`MAX_OUTAGE_DURATION`].
    pub fn outage_duration_merit_index(
        &self,
        ordered_changes: &[SwitchChange],
        displacement_times: &[f64],
        closed_snapshot: &[EdgeKey],
    ) -> f64 {
        let mut closed: BTreeSet<EdgeKey> = closed_snapshot.iter().copied().collect();
        let mut interrupted = Vec::with_capacity(ordered_changes.len() + 1);
        interrupted.push(self.interrupted_customers(&closed));

        for change in ordered_changes {
            if let Some(edge) = self.network.edge_of(&change.code) {
                match change.action {
                    SwitchAction::Close => closed.insert(edge),
                    SwitchAction::Open => closed.remove(&edge),
                };
            }
            interrupted.push(self.interrupted_customers(&closed));
        }

        let mut customer_minutes = 0.0;
        let mut customers = 0.0;
        for (&time, &count) in displacement_times.iter().zip(&interrupted) {
            if count == 0 {
                continue;
            }
            let count = count as f64;
            customer_minutes += count * time;
            customers += count;
        }
        if customers > 0.0 {
            customer_minutes /= customers;
        }

        let index = customer_minutes / MAX_OUTAGE_DURATION;
        if index.is_finite() {
            index
        } else {
            PENALTY
        }
    }

    /// Operation count index: manual operations weigh 1, automatic ones 2,
    /// both normalized by [`MAX_SWITCH_OPERATIONS`]. Switches missing from
    /// the registry are not counted.
    pub fn switching_count_merit_index(&self, changes: &[SwitchChange]) -> f64 {
        let mut manual = 0usize;
        let mut automatic = 0usize;
        for change in changes {
            match self.network.switch_kind(&change.code) {
                Some(kind) if kind.is_automatic() => automatic += 1,
                Some(_) => manual += 1,
                None => {}
            }
        }

        if manual + automatic >= MAX_SWITCH_OPERATIONS {
            return PENALTY;
        }
        let cap = MAX_SWITCH_OPERATIONS as f64;
        MANUAL_OPERATION_WEIGHT * manual as f64 / cap
            + AUTOMATIC_OPERATION_WEIGHT * automatic as f64 / cap
    }

    fn interrupted_customers(&self, closed: &BTreeSet<EdgeKey>) -> u64 {
        let customers = self.network.vertex_customers();
        unreachable_from_source(self.network.num_vertices(), closed)
            .into_iter()
            .map(|v| customers[v])
            .sum()
    }
}
