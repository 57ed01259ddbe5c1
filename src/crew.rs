//! Crew travel times between switches.
//!
//! Travel times are precomputed once per network with Dijkstra's algorithm
//! from every switch over the dense travel-time matrix. Networks have a few
//! hundred switches at most, so the O(N²) array scan is used instead of a
//! priority queue.

use crate::network::NetworkData;
use std::collections::HashMap;

/// All-pairs shortest travel times, indexed by switch code.
#[derive(Debug, Clone)]
pub struct CrewDisplacementIndex {
    distances: Vec<Vec<f64>>,
    index_by_code: HashMap<String, usize>,
    automatic: HashMap<String, bool>,
}

impl CrewDisplacementIndex {
    /// Precomputes shortest paths for `network`.
    pub fn new(network: &NetworkData) -> Self {
        let distances = all_pairs_shortest_paths(network.travel_times());
        let index_by_code = network
            .switches()
            .iter()
            .map(|s| (s.code.clone(), s.id))
            .collect();
        let automatic = network
            .switches()
            .iter()
            .map(|s| (s.code.clone(), s.kind.is_automatic()))
            .collect();
        Self {
            distances,
            index_by_code,
            automatic,
        }
    }

    /// Minutes for a crew to drive from switch `from` to switch `to`.
    ///
    /// Zero when `to` is automatic (no crew needed), when either switch is
    /// unknown, or when both share the same matrix index. Unreachable
    /// pairs yield `f64::INFINITY`.
    pub fn travel_time(&self, from: &str, to: &str) -> f64 {
        if self.automatic.get(to).copied().unwrap_or(false) {
            return 0.0;
        }
        let (Some(&a), Some(&b)) = (self.index_by_code.get(from), self.index_by_code.get(to)) else {
            return 0.0;
        };
        if a == b {
            return 0.0;
        }
        let (row, col) = if a < b { (a, b) } else { (b, a) };
        self.distances
            .get(row)
            .and_then(|r| r.get(col))
            .copied()
            .unwrap_or(0.0)
    }

    /// The full distance matrix.
    pub fn distances(&self) -> &[Vec<f64>] {
        &self.distances
    }
}

/// Runs [`dijkstra`] from every node.
pub fn all_pairs_shortest_paths(matrix: &[Vec<f64>]) -> Vec<Vec<f64>> {
    (0..matrix.len()).map(|s| dijkstra(matrix, s)).collect()
}

/// Single-source shortest paths on a dense matrix where `matrix[u][v] > 0`
/// is an arc of that length.
pub fn dijkstra(matrix: &[Vec<f64>], source: usize) -> Vec<f64> {
    let n = matrix.len();
    let mut dist = vec![f64::INFINITY; n];
    let mut done = vec![false; n];
    if source >= n {
        return dist;
    }
    dist[source] = 0.0;

    for _ in 0..n {
        let Some(u) = (0..n)
            .filter(|&v| !done[v] && dist[v].is_finite())
            .min_by(|&a, &b| dist[a].total_cmp(&dist[b]))
        else {
            break;
        };
        done[u] = true;

        for (v, &w) in matrix[u].iter().enumerate() {
            if w > 0.0 && !done[v] && dist[u] + w < dist[v] {
                dist[v] = dist[u] + w;
            }
        }
    }

    dist
}
