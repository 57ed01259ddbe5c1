//! Network data consumed by the planner.
//!
//! [`NetworkData`] gathers everything the optimizer needs to know about a
//! feeder: the operable-switch graph, the switch registry (to tell manual
//! from automatic devices), feeder protection limits, customers per vertex
//! and the crew travel-time matrix. Loading it from utility files is left
//! to the caller.

use crate::error::{RestorationError, Result};
use crate::graph::EdgeKey;
use crate::oracle::SwitchStates;
use std::collections::{HashMap, HashSet};

/// Switching device type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum SwitchKind {
    /// Substation circuit breaker (remotely operated).
    Breaker,
    /// Line recloser (remotely operated).
    Recloser,
    /// Manually operated switch; needs a crew on site.
    Manual,
    /// Any other device; treated as manual.
    Other,
}

impl SwitchKind {
    /// Breakers and reclosers operate without dispatching a crew.
    pub fn is_automatic(self) -> bool {
        matches!(self, SwitchKind::Breaker | SwitchKind::Recloser)
    }
}

/// Entry of the switch registry.
///
/// `id` is the row/column of the switch in the travel-time matrix.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SwitchRecord {
    pub id: usize,
    pub code: String,
    pub kind: SwitchKind,
}

impl SwitchRecord {
    pub fn new(id: usize, code: impl Into<String>, kind: SwitchKind) -> Self {
        Self {
            id,
            code: code.into(),
            kind,
        }
    }
}

/// An operable switch as an edge of the feeder graph.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct OperableEdge {
    pub v1: usize,
    pub v2: usize,
    pub switch_code: String,
    /// Whether the switch is closed in the normal (pre-fault) topology.
    pub initially_closed: bool,
}

impl OperableEdge {
    pub fn new(v1: usize, v2: usize, switch_code: impl Into<String>, initially_closed: bool) -> Self {
        Self {
            v1,
            v2,
            switch_code: switch_code.into(),
            initially_closed,
        }
    }

    /// Canonical key of this edge.
    pub fn key(&self) -> EdgeKey {
        EdgeKey::new(self.v1, self.v2)
    }
}

/// Current limit of a feeder's protection device.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FeederProtection {
    pub feeder_code: String,
    pub protection_switch: String,
    /// Ampacity in amperes.
    pub max_current: f64,
}

impl FeederProtection {
    pub fn new(
        feeder_code: impl Into<String>,
        protection_switch: impl Into<String>,
        max_current: f64,
    ) -> Self {
        Self {
            feeder_code: feeder_code.into(),
            protection_switch: protection_switch.into(),
            max_current,
        }
    }
}

/// Switches opened to isolate the faulted section.
///
/// They stay open for the whole restoration: they are removed from the
/// candidate graph and from the initially closed set.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FaultIsolation {
    pub open_switches: Vec<String>,
}

impl FaultIsolation {
    pub fn new<S: Into<String>>(open_switches: impl IntoIterator<Item = S>) -> Self {
        Self {
            open_switches: open_switches.into_iter().map(Into::into).collect(),
        }
    }
}

/// Edge sets of the faulted network, ready for optimization.
#[derive(Debug, Clone, PartialEq)]
pub struct FaultedTopology {
    /// Operable switches that may be used by the restoration.
    pub candidates: Vec<EdgeKey>,
    /// Switches closed right after the fault was isolated.
    pub initially_closed: Vec<EdgeKey>,
}

/// Validated description of a feeder network.
#[derive(Debug, Clone)]
pub struct NetworkData {
    num_vertices: usize,
    edges: Vec<OperableEdge>,
    switches: Vec<SwitchRecord>,
    protections: Vec<FeederProtection>,
    vertex_customers: Vec<u64>,
    travel_times: Vec<Vec<f64>>,
    edge_by_key: HashMap<EdgeKey, usize>,
    edge_by_code: HashMap<String, usize>,
    switch_by_code: HashMap<String, usize>,
}

impl NetworkData {
    /// Creates the network from its graph and switch registry.
    ///
    /// # Errors
    /// [`RestorationError::InvalidNetwork`] when an edge references a
    /// vertex outside `0..num_vertices`, is a self-loop, or repeats a switch
    /// code or a vertex pair already used by another edge.
    pub fn new(
        num_vertices: usize,
        edges: Vec<OperableEdge>,
        switches: Vec<SwitchRecord>,
    ) -> Result<Self> {
        let mut edge_by_key = HashMap::with_capacity(edges.len());
        let mut edge_by_code = HashMap::with_capacity(edges.len());
        for (i, edge) in edges.iter().enumerate() {
            if edge.v1 >= num_vertices || edge.v2 >= num_vertices {
                return Err(RestorationError::InvalidNetwork(format!(
                    "switch `{}` references vertex outside 0..{num_vertices}",
                    edge.switch_code
                )));
            }
            if edge.v1 == edge.v2 {
                return Err(RestorationError::InvalidNetwork(format!(
                    "switch `{}` is a self-loop",
                    edge.switch_code
                )));
            }
            if edge_by_key.insert(edge.key(), i).is_some() {
                return Err(RestorationError::InvalidNetwork(format!(
                    "more than one switch between vertices {}",
                    edge.key()
                )));
            }
            if edge_by_code.insert(edge.switch_code.clone(), i).is_some() {
                return Err(RestorationError::InvalidNetwork(format!(
                    "switch `{}` appears on more than one edge",
                    edge.switch_code
                )));
            }
        }

        let switch_by_code = switches
            .iter()
            .enumerate()
            .map(|(i, s)| (s.code.clone(), i))
            .collect();

        Ok(Self {
            num_vertices,
            edges,
            switches,
            protections: Vec::new(),
            vertex_customers: vec![0; num_vertices],
            travel_times: Vec::new(),
            edge_by_key,
            edge_by_code,
            switch_by_code,
        })
    }

    /// Sets the feeder protection limits.
    pub fn with_protections(mut self, protections: Vec<FeederProtection>) -> Self {
        self.protections = protections;
        self
    }

    /// Sets the number of customers served at each vertex.
    ///
    /// # Errors
    /// [`RestorationError::InvalidNetwork`] when the length differs from the
    /// number of vertices.
    pub fn with_vertex_customers(mut self, customers: Vec<u64>) -> Result<Self> {
        if customers.len() != self.num_vertices {
            return Err(RestorationError::InvalidNetwork(format!(
                "expected {} customer counts, got {}",
                self.num_vertices,
                customers.len()
            )));
        }
        self.vertex_customers = customers;
        Ok(self)
    }

    /// Sets the crew travel-time matrix (minutes) between switches.
    ///
    /// Entry `[i][j] > 0` means a direct route between the switches with
    /// registry ids `i` and `j`.
    ///
    /// # Errors
    /// [`RestorationError::InvalidNetwork`] when the matrix is not square.
    pub fn with_travel_times(mut self, matrix: Vec<Vec<f64>>) -> Result<Self> {
        let n = matrix.len();
        if let Some(row) = matrix.iter().position(|r| r.len() != n) {
            return Err(RestorationError::InvalidNetwork(format!(
                "travel-time matrix row {row} has {} columns, expected {n}",
                matrix[row].len()
            )));
        }
        self.travel_times = matrix;
        Ok(self)
    }

    pub fn num_vertices(&self) -> usize {
        self.num_vertices
    }

    pub fn edges(&self) -> &[OperableEdge] {
        &self.edges
    }

    pub fn switches(&self) -> &[SwitchRecord] {
        &self.switches
    }

    pub fn protections(&self) -> &[FeederProtection] {
        &self.protections
    }

    pub fn vertex_customers(&self) -> &[u64] {
        &self.vertex_customers
    }

    pub fn travel_times(&self) -> &[Vec<f64>] {
        &self.travel_times
    }

    /// Canonical keys of every operable switch, in registry order.
    pub fn edge_keys(&self) -> Vec<EdgeKey> {
        self.edges.iter().map(OperableEdge::key).collect()
    }

    /// Codes of every operable switch, in edge order.
    pub fn all_switch_codes(&self) -> Vec<&str> {
        self.edges.iter().map(|e| e.switch_code.as_str()).collect()
    }

    /// Switches closed in the normal topology.
    pub fn initially_closed(&self) -> Vec<EdgeKey> {
        self.edges
            .iter()
            .filter(|e| e.initially_closed)
            .map(OperableEdge::key)
            .collect()
    }

    /// Switch code of the operable switch on `edge`.
    pub fn switch_code(&self, edge: EdgeKey) -> Option<&str> {
        self.edge_by_key
            .get(&edge)
            .map(|&i| self.edges[i].switch_code.as_str())
    }

    /// Like [`switch_code`](Self::switch_code), failing on unknown edges.
    pub fn require_switch_code(&self, edge: EdgeKey) -> Result<&str> {
        self.switch_code(edge).ok_or(RestorationError::UnknownEdge {
            u: edge.u(),
            v: edge.v(),
        })
    }

    /// Edge controlled by the operable switch `code`.
    pub fn edge_of(&self, code: &str) -> Option<EdgeKey> {
        self.edge_by_code.get(code).map(|&i| self.edges[i].key())
    }

    /// Registry entry for `code`.
    pub fn switch(&self, code: &str) -> Option<&SwitchRecord> {
        self.switch_by_code.get(code).map(|&i| &self.switches[i])
    }

    /// Device type of `code`, if registered.
    pub fn switch_kind(&self, code: &str) -> Option<SwitchKind> {
        self.switch(code).map(|s| s.kind)
    }

    /// Whether `code` is a registered breaker or recloser.
    pub fn is_automatic(&self, code: &str) -> bool {
        self.switch_kind(code).is_some_and(SwitchKind::is_automatic)
    }

    /// Ampacity of the protection device `code`, if it protects a feeder.
    pub fn protection_capacity(&self, code: &str) -> Option<f64> {
        self.protections
            .iter()
            .find(|p| p.protection_switch == code)
            .map(|p| p.max_current)
    }

    /// Applies a fault isolation to the normal topology.
    ///
    /// # Errors
    /// [`RestorationError::UnknownSwitch`] when an isolation switch is not
    /// an operable switch of this network.
    pub fn isolate(&self, isolation: &FaultIsolation) -> Result<FaultedTopology> {
        let mut locked = HashSet::with_capacity(isolation.open_switches.len());
        for code in &isolation.open_switches {
            let edge = self
                .edge_of(code)
                .ok_or_else(|| RestorationError::UnknownSwitch { code: code.clone() })?;
            locked.insert(edge);
        }

        let candidates = self
            .edge_keys()
            .into_iter()
            .filter(|e| !locked.contains(e))
            .collect();
        let initially_closed = self
            .initially_closed()
            .into_iter()
            .filter(|e| !locked.contains(e))
            .collect();

        Ok(FaultedTopology {
            candidates,
            initially_closed,
        })
    }

    /// Switch states for the oracle: `closed` edges closed, every other
    /// operable switch open.
    pub fn switch_states(&self, closed: &[EdgeKey]) -> SwitchStates {
        let closed: HashSet<EdgeKey> = closed.iter().copied().collect();
        let (closed, opened): (Vec<&OperableEdge>, Vec<&OperableEdge>) =
            self.edges.iter().partition(|e| closed.contains(&e.key()));
        SwitchStates {
            closed: closed.into_iter().map(|e| e.switch_code.clone()).collect(),
            opened: opened.into_iter().map(|e| e.switch_code.clone()).collect(),
        }
    }
}
