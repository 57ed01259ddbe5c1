//! Reference oracle for radial feeders with constant loads.

use super::{LoadFlowOracle, SwitchAction, SwitchChange, SwitchStates};
use crate::error::{OracleError, RestorationError};
use crate::graph::EdgeKey;
use crate::network::NetworkData;
use std::collections::{BTreeMap, HashMap, HashSet, VecDeque};

/// Current estimator that treats every vertex as a constant three-phase
/// current sink fed from vertex `0`.
///
/// [`solve`](LoadFlowOracle::solve) walks the closed switches breadth-first
/// from the source; each switch on that tree carries the summed load of the
/// vertices behind it. Closed switches that are not on the tree (a mesh, or
/// an island with no source) carry nothing.
#[derive(Debug, Clone)]
pub struct RadialLoadOracle {
    num_vertices: usize,
    edges: Vec<(EdgeKey, String)>,
    index_by_code: HashMap<String, usize>,
    customers: Vec<u64>,
    loads: Vec<[f64; 3]>,
    closed: Option<HashSet<usize>>,
    currents: BTreeMap<String, [f64; 3]>,
    interrupted: u64,
}

impl RadialLoadOracle {
    /// Builds the oracle for `network` with per-vertex phase loads in amperes.
    ///
    /// # Errors
    /// [`RestorationError::InvalidNetwork`] when `loads` does not have one
    /// entry per vertex.
    pub fn new(network: &NetworkData, loads: Vec<[f64; 3]>) -> Result<Self, RestorationError> {
        if loads.len() != network.num_vertices() {
            return Err(RestorationError::InvalidNetwork(format!(
                "expected {} vertex loads, got {}",
                network.num_vertices(),
                loads.len()
            )));
        }
        let edges: Vec<(EdgeKey, String)> = network
            .edges()
            .iter()
            .map(|e| (e.key(), e.switch_code.clone()))
            .collect();
        let index_by_code = edges
            .iter()
            .enumerate()
            .map(|(i, (_, code))| (code.clone(), i))
            .collect();
        Ok(Self {
            num_vertices: network.num_vertices(),
            edges,
            index_by_code,
            customers: network.vertex_customers().to_vec(),
            loads,
            closed: None,
            currents: BTreeMap::new(),
            interrupted: 0,
        })
    }

    /// Codes of the switches currently closed, in network order.
    pub fn closed_switches(&self) -> Vec<&str> {
        match &self.closed {
            Some(closed) => self
                .edges
                .iter()
                .enumerate()
                .filter(|(i, _)| closed.contains(i))
                .map(|(_, (_, code))| code.as_str())
                .collect(),
            None => Vec::new(),
        }
    }

    fn index_of(&self, code: &str) -> Result<usize, OracleError> {
        self.index_by_code
            .get(code)
            .copied()
            .ok_or_else(|| OracleError::UnknownSwitch { code: code.to_string() })
    }
}

impl LoadFlowOracle for RadialLoadOracle {
    fn set_state(&mut self, states: &SwitchStates) -> Result<(), OracleError> {
        let mut closed = HashSet::with_capacity(states.closed.len());
        for code in &states.closed {
            closed.insert(self.index_of(code)?);
        }
        for code in &states.opened {
            closed.remove(&self.index_of(code)?);
        }
        self.closed = Some(closed);
        Ok(())
    }

    fn solve(&mut self) -> Result<(), OracleError> {
        let closed = self.closed.as_ref().ok_or(OracleError::NotInitialized)?;
        let n = self.num_vertices;

        let mut adjacency: Vec<Vec<(usize, usize)>> = vec![Vec::new(); n];
        for (i, (edge, _)) in self.edges.iter().enumerate() {
            if closed.contains(&i) {
                adjacency[edge.u()].push((edge.v(), i));
                adjacency[edge.v()].push((edge.u(), i));
            }
        }

        // BFS tree from the source: parent switch of each reached vertex.
        let mut parent: Vec<Option<(usize, usize)>> = vec![None; n];
        let mut reached = vec![false; n];
        let mut order = Vec::with_capacity(n);
        if n > 0 {
            reached[0] = true;
            let mut queue = VecDeque::from([0usize]);
            while let Some(node) = queue.pop_front() {
                order.push(node);
                for &(next, edge_idx) in &adjacency[node] {
                    if !reached[next] {
                        reached[next] = true;
                        parent[next] = Some((node, edge_idx));
                        queue.push_back(next);
                    }
                }
            }
        }

        let mut subtree = self.loads.clone();
        let mut through = vec![[0.0f64; 3]; self.edges.len()];
        for &node in order.iter().rev() {
            if let Some((up, edge_idx)) = parent[node] {
                let load = subtree[node];
                through[edge_idx] = load;
                for ph in 0..3 {
                    subtree[up][ph] += load[ph];
                }
            }
        }

        self.currents = self
            .edges
            .iter()
            .zip(through)
            .map(|((_, code), current)| (code.clone(), current))
            .collect();
        self.interrupted = (0..n)
            .filter(|&v| !reached[v])
            .map(|v| self.customers[v])
            .sum();
        Ok(())
    }

    fn branch_currents(&self) -> BTreeMap<String, [f64; 3]> {
        self.currents.clone()
    }

    fn interrupted_customer_count(&self) -> u64 {
        self.interrupted
    }

    fn apply_single_change(&mut self, change: &SwitchChange) -> Result<(), OracleError> {
        let idx = self.index_of(&change.code)?;
        let closed = self.closed.as_mut().ok_or(OracleError::NotInitialized)?;
        match change.action {
            SwitchAction::Close => closed.insert(idx),
            SwitchAction::Open => closed.remove(&idx),
        };
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::network::tests::two_feeder_network;

    fn oracle() -> RadialLoadOracle {
        let loads = vec![
            [0.0; 3],
            [10.0; 3],
            [20.0; 3],
            [30.0; 3],
            [40.0; 3],
            [50.0; 3],
        ];
        RadialLoadOracle::new(&two_feeder_network(), loads).expect("valid loads")
    }

    fn normal_state() -> SwitchStates {
        two_feeder_network().switch_states(&two_feeder_network().initially_closed())
    }

    #[test]
    fn test_solve_requires_state() {
        let mut o = oracle();
        assert_eq!(o.solve(), Err(OracleError::NotInitialized));
    }

    #[test]
    fn test_currents_sum_downstream() {
        let mut o = oracle();
        o.set_state(&normal_state()).expect("known switches");
        o.solve().expect("solves");
        let currents = o.branch_currents();
        assert_eq!(currents["CB1"], [60.0; 3]);
        assert_eq!(currents["S2"], [30.0; 3]);
        assert_eq!(currents["R2"], [90.0; 3]);
        assert_eq!(currents["T1"], [0.0; 3]);
        assert_eq!(o.interrupted_customer_count(), 0);
    }

    #[test]
    fn test_apply_and_revert() {
        let mut o = oracle();
        o.set_state(&normal_state()).expect("known switches");
        let changes = vec![SwitchChange::open("S1"), SwitchChange::close("T1")];

        o.apply_changes(&changes).expect("apply");
        o.solve().expect("solves");
        // Vertex 2 is now fed through T1 and S2.
        assert_eq!(o.branch_currents()["R2"], [140.0; 3]);
        assert_eq!(o.branch_currents()["CB1"], [10.0; 3]);
        assert_eq!(o.interrupted_customer_count(), 0);

        o.apply_single_change(&SwitchChange::open("S2")).expect("apply");
        o.solve().expect("solves");
        assert_eq!(o.interrupted_customer_count(), 20);
        o.apply_single_change(&SwitchChange::close("S2")).expect("apply");

        o.revert_changes(&changes).expect("revert");
        o.solve().expect("solves");
        assert_eq!(o.branch_currents()["R2"], [90.0; 3]);
        assert_eq!(o.interrupted_customer_count(), 0);
    }

    #[test]
    fn test_unknown_switch() {
        let mut o = oracle();
        o.set_state(&normal_state()).expect("known switches");
        let err = o.apply_single_change(&SwitchChange::open("X9")).unwrap_err();
        assert_eq!(err, OracleError::UnknownSwitch { code: "X9".into() });
    }

    #[test]
    fn test_rejects_wrong_load_count() {
        assert!(RadialLoadOracle::new(&two_feeder_network(), vec![[0.0; 3]]).is_err());
    }
}
