//! Disturbance-technique decoding of random-key chromosomes.
//!
//! The decoder replays the switching on a copy of the initial topology.
//! Each edge to close is closed in turn; when that closes a loop, the first
//! still-closed edge to open whose removal breaks the loop is opened right
//! away. The result is a sequence of [`SwitchPair`]s whose net effect is the
//! target topology.

use super::types::{SwitchPair, SwitchingDiff, SwitchingSequence};
use crate::error::Result;
use crate::graph::{EdgeKey, FeederGraph};
use crate::network::NetworkData;
use crate::oracle::SwitchChange;
use rand::Rng;

/// Indices of `keys` sorted by ascending key.
///
/// The sort is stable and uses the IEEE total order, so equal keys keep
/// their index order and NaN never panics.
///
/// ```
/// use u_restoration::ssga::random_keys_to_order;
///
/// assert_eq!(random_keys_to_order(&[0.7, 0.1, 0.4]), vec![1, 2, 0]);
/// ```
pub fn random_keys_to_order(keys: &[f64]) -> Vec<usize> {
    let mut order: Vec<usize> = (0..keys.len()).collect();
    order.sort_by(|&a, &b| keys[a].total_cmp(&keys[b]));
    order
}

/// Decodes `keys` into switch pairs.
///
/// `simulation` must hold the initial topology as its realized edges and
/// every operable switch as candidates. Edges are taken from the key-sorted
/// priority list at a uniformly random position each step.
///
/// Returns `None` when a loop cannot be broken by any remaining edge to
/// open, or when edges to open are left over at the end.
pub fn decode<R: Rng>(
    simulation: &FeederGraph,
    diff: &SwitchingDiff,
    keys: &[f64],
    rng: &mut R,
) -> Option<Vec<SwitchPair>> {
    let mut graph = simulation.clone();
    let mut priority: Vec<EdgeKey> = random_keys_to_order(keys)
        .into_iter()
        .filter_map(|i| diff.to_close.get(i).copied())
        .collect();
    let mut open_remaining = diff.to_open.clone();
    let mut pairs = Vec::with_capacity(priority.len());

    while !priority.is_empty() {
        let edge = priority.remove(rng.random_range(0..priority.len()));

        if graph.creates_cycle(edge) {
            graph.push_spanning(edge);
            let opened = graph.edge_to_open_for_radiality(&open_remaining)?;
            open_remaining.retain(|e| *e != opened);
            pairs.push(SwitchPair::compensated(edge, opened));
        } else {
            graph.push_spanning(edge);
            pairs.push(SwitchPair::reconnection(edge));
        }
    }

    if open_remaining.is_empty() {
        Some(pairs)
    } else {
        None
    }
}

/// Builds the natural and inverted change lists of `pairs`.
///
/// # Errors
/// [`crate::RestorationError::UnknownEdge`] when an edge has no switch in
/// `network`.
pub fn switching_sequence(pairs: Vec<SwitchPair>, network: &NetworkData) -> Result<SwitchingSequence> {
    let mut natural = Vec::with_capacity(2 * pairs.len());
    let mut inverted = Vec::with_capacity(2 * pairs.len());

    for pair in &pairs {
        let close = SwitchChange::close(network.require_switch_code(pair.close)?);
        match pair.open {
            Some(open_edge) => {
                let open = SwitchChange::open(network.require_switch_code(open_edge)?);
                natural.push(close.clone());
                natural.push(open.clone());
                inverted.push(open);
                inverted.push(close);
            }
            None => {
                natural.push(close.clone());
                inverted.push(close);
            }
        }
    }

    Ok(SwitchingSequence {
        pairs,
        natural,
        inverted,
    })
}
