//! Operable-switch graph with radial (spanning-forest) operators.

use super::edge::EdgeKey;
use super::union_find::UnionFind;
use rand::seq::SliceRandom;
use rand::Rng;
use std::collections::{HashSet, VecDeque};

/// Graph of a feeder's operable switches plus the radial topology currently
/// realized on it.
///
/// `candidates` holds every operable switch as a canonical [`EdgeKey`];
/// `spanning` is the subset currently closed. All operators in this type
/// keep `spanning` acyclic, except [`push_spanning`](Self::push_spanning),
/// which callers use to provisionally close a switch before restoring
/// radiality with [`edge_to_open_for_radiality`](Self::edge_to_open_for_radiality).
///
/// # Examples
///
/// ```
/// use u_restoration::graph::{EdgeKey, FeederGraph};
/// use u_restoration::random::create_rng;
///
/// let edges = [(0, 1), (1, 2), (0, 2)].map(EdgeKey::from);
/// let mut graph = FeederGraph::new(3, edges);
/// graph.random_spanning_tree(&mut create_rng(1));
///
/// assert_eq!(graph.spanning().len(), 2);
/// assert!(graph.is_radial());
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct FeederGraph {
    num_vertices: usize,
    candidates: Vec<EdgeKey>,
    spanning: Vec<EdgeKey>,
}

impl FeederGraph {
    /// Creates a graph with no closed switches.
    ///
    /// Duplicate pairs keep their first occurrence; self-loops and edges
    /// referencing vertices outside `0..num_vertices` are ignored.
    pub fn new(num_vertices: usize, candidates: impl IntoIterator<Item = EdgeKey>) -> Self {
        Self::with_spanning(num_vertices, candidates, Vec::new())
    }

    /// Creates a graph whose realized topology is `spanning`, taken as is.
    pub fn with_spanning(
        num_vertices: usize,
        candidates: impl IntoIterator<Item = EdgeKey>,
        spanning: Vec<EdgeKey>,
    ) -> Self {
        let candidates = dedup_edges(
            candidates
                .into_iter()
                .filter(|e| e.u() != e.v() && e.v() < num_vertices),
        );
        Self {
            num_vertices,
            candidates,
            spanning,
        }
    }

    /// Number of vertices.
    pub fn num_vertices(&self) -> usize {
        self.num_vertices
    }

    /// All operable switches.
    pub fn candidates(&self) -> &[EdgeKey] {
        &self.candidates
    }

    /// The realized topology, in insertion order.
    pub fn spanning(&self) -> &[EdgeKey] {
        &self.spanning
    }

    /// Whether `edge` is currently closed.
    pub fn is_closed(&self, edge: EdgeKey) -> bool {
        self.spanning.contains(&edge)
    }

    /// Builds a random spanning forest that prefers the edges of `initial`.
    ///
    /// Candidates are shuffled; then each member of `initial`, in order, is
    /// moved to the front with probability `bias_probability`. Kruskal's
    /// algorithm over that order yields the new topology. It stops after
    /// `V - 1` edges or when candidates run out, so a disconnected graph
    /// produces a forest.
    pub fn biased_spanning_tree<R: Rng>(
        &mut self,
        initial: &[EdgeKey],
        bias_probability: f64,
        rng: &mut R,
    ) {
        let mut order = self.candidates.clone();
        order.shuffle(rng);

        let bias = bias_probability.clamp(0.0, 1.0);
        for edge in initial {
            if !rng.random_bool(bias) {
                continue;
            }
            if let Some(pos) = order.iter().position(|e| e == edge) {
                let item = order.remove(pos);
                order.insert(0, item);
            }
        }

        self.spanning = kruskal(self.num_vertices, &order);
    }

    /// Builds a uniformly shuffled Kruskal spanning forest.
    pub fn random_spanning_tree<R: Rng>(&mut self, rng: &mut R) {
        self.biased_spanning_tree(&[], 0.0, rng);
    }

    /// Whether closing `edge` would connect two already-connected vertices.
    pub fn creates_cycle(&self, edge: EdgeKey) -> bool {
        let mut uf = self.union_find();
        uf.connected(edge.u(), edge.v())
    }

    /// Whether the realized topology is free of cycles.
    pub fn is_radial(&self) -> bool {
        let mut uf = UnionFind::new(self.num_vertices);
        self.spanning.iter().all(|e| uf.union(e.u(), e.v()))
    }

    /// Closes `edge` without any radiality check.
    pub fn push_spanning(&mut self, edge: EdgeKey) {
        self.spanning.push(edge);
    }

    /// Opens the first of `candidates` whose removal makes the topology
    /// radial again.
    ///
    /// Candidates are tried in input order; ones that are not closed are
    /// skipped. A candidate that does not restore radiality is put back at
    /// its former position. Returns `None` when no candidate works, which
    /// means the candidate set is inconsistent with the current mesh.
    pub fn edge_to_open_for_radiality(&mut self, candidates: &[EdgeKey]) -> Option<EdgeKey> {
        for &candidate in candidates {
            let Some(pos) = self.spanning.iter().position(|e| *e == candidate) else {
                continue;
            };
            let removed = self.spanning.remove(pos);
            if self.is_radial() {
                return Some(removed);
            }
            self.spanning.insert(pos, removed);
        }
        None
    }

    /// Replaces one random closed switch by a random open one that keeps the
    /// topology radial.
    ///
    /// Returns `false`, with the topology untouched, when the tree is empty
    /// or no replacement exists.
    pub fn mutate<R: Rng>(&mut self, rng: &mut R) -> bool {
        if self.spanning.is_empty() {
            return false;
        }

        let idx = rng.random_range(0..self.spanning.len());
        let removed = self.spanning.remove(idx);

        let closed: HashSet<EdgeKey> = self.spanning.iter().copied().collect();
        let mut pool: Vec<EdgeKey> = self
            .candidates
            .iter()
            .filter(|e| **e != removed && !closed.contains(e))
            .copied()
            .collect();
        pool.shuffle(rng);

        let mut uf = self.union_find();
        for edge in pool {
            if !uf.connected(edge.u(), edge.v()) {
                self.spanning.push(edge);
                return true;
            }
        }

        self.spanning.insert(idx, removed);
        false
    }

    /// Recombines this topology with `other_spanning`.
    ///
    /// The child's candidates are the union of both parents' closed
    /// switches (this parent first); its topology is a fresh unbiased
    /// Kruskal tree over them.
    pub fn crossover<R: Rng>(&self, other_spanning: &[EdgeKey], rng: &mut R) -> FeederGraph {
        let union = self.spanning.iter().chain(other_spanning.iter()).copied();
        let mut child = FeederGraph::new(self.num_vertices, union);
        child.random_spanning_tree(rng);
        child
    }

    fn union_find(&self) -> UnionFind {
        let mut uf = UnionFind::new(self.num_vertices);
        for e in &self.spanning {
            uf.union(e.u(), e.v());
        }
        uf
    }
}

/// Kruskal over a fixed edge order.
fn kruskal(num_vertices: usize, order: &[EdgeKey]) -> Vec<EdgeKey> {
    let target = num_vertices.saturating_sub(1);
    let mut uf = UnionFind::new(num_vertices);
    let mut accepted = Vec::with_capacity(target);
    for &edge in order {
        if accepted.len() >= target {
            break;
        }
        if uf.union(edge.u(), edge.v()) {
            accepted.push(edge);
        }
    }
    accepted
}

/// Removes duplicate edges, keeping first occurrences in order.
pub(crate) fn dedup_edges(edges: impl IntoIterator<Item = EdgeKey>) -> Vec<EdgeKey> {
    let mut seen = HashSet::new();
    edges.into_iter().filter(|e| seen.insert(*e)).collect()
}

/// Vertices that cannot be reached from the source vertex `0` through the
/// `closed` edges, in ascending order.
pub fn unreachable_from_source<'a>(
    num_vertices: usize,
    closed: impl IntoIterator<Item = &'a EdgeKey>,
) -> Vec<usize> {
    if num_vertices == 0 {
        return Vec::new();
    }

    let mut adjacency: Vec<Vec<usize>> = vec![Vec::new(); num_vertices];
    for e in closed {
        if e.v() < num_vertices {
            adjacency[e.u()].push(e.v());
            adjacency[e.v()].push(e.u());
        }
    }

    let mut reached = vec![false; num_vertices];
    let mut queue = VecDeque::from([0usize]);
    reached[0] = true;
    while let Some(node) = queue.pop_front() {
        for &next in &adjacency[node] {
            if !reached[next] {
                reached[next] = true;
                queue.push_back(next);
            }
        }
    }

    (0..num_vertices).filter(|&v| !reached[v]).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::random::create_rng;
    use proptest::prelude::*;
    use std::collections::BTreeSet;

    fn keys(pairs: &[(usize, usize)]) -> Vec<EdgeKey> {
        pairs.iter().map(|&p| EdgeKey::from(p)).collect()
    }

    /// Ring 0-1-2-3-4-0 plus chord 1-3.
    fn ring() -> FeederGraph {
        FeederGraph::new(5, keys(&[(0, 1), (1, 2), (2, 3), (3, 4), (4, 0), (1, 3)]))
    }

    #[test]
    fn test_new_drops_duplicates_and_invalid() {
        let g = FeederGraph::new(3, keys(&[(0, 1), (1, 0), (2, 2), (1, 7), (1, 2)]));
        assert_eq!(g.candidates(), keys(&[(0, 1), (1, 2)]).as_slice());
    }

    #[test]
    fn test_spanning_tree_size() {
        let mut g = ring();
        g.random_spanning_tree(&mut create_rng(3));
        assert_eq!(g.spanning().len(), 4);
        assert!(g.is_radial());
    }

    #[test]
    fn test_disconnected_graph_yields_forest() {
        let mut g = FeederGraph::new(5, keys(&[(0, 1), (1, 2), (3, 4)]));
        g.random_spanning_tree(&mut create_rng(5));
        assert_eq!(g.spanning().len(), 3);
        assert!(g.is_radial());
    }

    #[test]
    fn test_full_bias_reproduces_initial_tree() {
        let initial = keys(&[(0, 1), (1, 2), (2, 3), (3, 4)]);
        for seed in 0..20 {
            let mut g = ring();
            g.biased_spanning_tree(&initial, 1.0, &mut create_rng(seed));
            let got: BTreeSet<_> = g.spanning().iter().copied().collect();
            let want: BTreeSet<_> = initial.iter().copied().collect();
            assert_eq!(got, want, "seed {seed}");
        }
    }

    #[test]
    fn test_creates_cycle() {
        let g = FeederGraph::with_spanning(5, ring().candidates().to_vec(), keys(&[(0, 1), (1, 2)]));
        assert!(g.creates_cycle(EdgeKey::new(0, 2)));
        assert!(!g.creates_cycle(EdgeKey::new(2, 3)));
    }

    #[test]
    fn test_is_radial_detects_mesh() {
        let mut g = FeederGraph::with_spanning(3, keys(&[(0, 1), (1, 2), (0, 2)]), keys(&[(0, 1), (1, 2)]));
        assert!(g.is_radial());
        g.push_spanning(EdgeKey::new(0, 2));
        assert!(!g.is_radial());
    }

    #[test]
    fn test_edge_to_open_restores_radiality() {
        let candidates = ring().candidates().to_vec();
        let mut g = FeederGraph::with_spanning(5, candidates, keys(&[(0, 1), (1, 2), (2, 3), (3, 4)]));
        g.push_spanning(EdgeKey::new(4, 0));

        // (1, 3) is not closed and is skipped; (2, 3) is on the loop.
        let opened = g.edge_to_open_for_radiality(&keys(&[(1, 3), (2, 3)]));
        assert_eq!(opened, Some(EdgeKey::new(2, 3)));
        assert!(g.is_radial());
        assert!(!g.is_closed(EdgeKey::new(2, 3)));
    }

    #[test]
    fn test_edge_to_open_restores_order_on_failure() {
        let candidates = keys(&[(0, 1), (1, 2), (0, 2), (2, 3)]);
        let mut g = FeederGraph::with_spanning(4, candidates, keys(&[(0, 1), (1, 2), (2, 3)]));
        g.push_spanning(EdgeKey::new(0, 2));
        let before = g.spanning().to_vec();

        // (2, 3) is off the loop: removing it leaves the mesh.
        assert_eq!(g.edge_to_open_for_radiality(&keys(&[(2, 3)])), None);
        assert_eq!(g.spanning(), before.as_slice());
    }

    #[test]
    fn test_mutate_without_alternative_is_noop() {
        // A path graph has no spare edges.
        let candidates = keys(&[(0, 1), (1, 2), (2, 3)]);
        let mut g = FeederGraph::with_spanning(4, candidates.clone(), candidates.clone());
        for seed in 0..10 {
            assert!(!g.mutate(&mut create_rng(seed)));
            assert_eq!(g.spanning(), candidates.as_slice());
        }
    }

    #[test]
    fn test_mutate_empty_tree() {
        let mut g = FeederGraph::new(3, keys(&[(0, 1)]));
        assert!(!g.mutate(&mut create_rng(0)));
    }

    #[test]
    fn test_crossover_candidates_are_union() {
        let base = ring();
        let a = FeederGraph::with_spanning(5, base.candidates().to_vec(), keys(&[(0, 1), (1, 2), (2, 3), (3, 4)]));
        let b_edges = keys(&[(4, 0), (1, 3), (3, 2), (1, 2)]);

        let child = a.crossover(&b_edges, &mut create_rng(11));

        let got: BTreeSet<_> = child.candidates().iter().copied().collect();
        let want: BTreeSet<_> = a.spanning().iter().chain(b_edges.iter()).copied().collect();
        assert_eq!(got, want);
        assert_eq!(child.candidates().len(), want.len());
        assert!(child.is_radial());
        assert_eq!(child.spanning().len(), 4);
    }

    #[test]
    fn test_unreachable_from_source() {
        let closed = keys(&[(0, 1), (2, 3)]);
        assert_eq!(unreachable_from_source(5, &closed), vec![2, 3, 4]);
        assert!(unreachable_from_source(0, &closed).is_empty());
    }

    fn arb_graph() -> impl Strategy<Value = (usize, Vec<(usize, usize)>)> {
        (3usize..10).prop_flat_map(|n| (Just(n), prop::collection::vec((0..n, 0..n), 1..30)))
    }

    proptest! {
        #[test]
        fn prop_spanning_tree_is_radial_subset((n, pairs) in arb_graph(), seed in any::<u64>()) {
            let mut g = FeederGraph::new(n, pairs.iter().map(|&p| EdgeKey::from(p)));
            g.random_spanning_tree(&mut create_rng(seed));
            prop_assert!(g.is_radial());
            for e in g.spanning() {
                prop_assert!(g.candidates().contains(e));
            }
        }

        #[test]
        fn prop_mutation_keeps_radiality((n, pairs) in arb_graph(), seed in any::<u64>()) {
            let mut rng = create_rng(seed);
            let mut g = FeederGraph::new(n, pairs.iter().map(|&p| EdgeKey::from(p)));
            g.random_spanning_tree(&mut rng);
            let before = g.spanning().to_vec();
            for _ in 0..5 {
                g.mutate(&mut rng);
                prop_assert!(g.is_radial());
                prop_assert_eq!(g.spanning().len(), before.len());
                for e in g.spanning() {
                    prop_assert!(g.candidates().contains(e));
                }
            }
        }

        #[test]
        fn prop_crossover_conserves_edge_union((n, pairs) in arb_graph(), seed in any::<u64>()) {
            let mut rng = create_rng(seed);
            let mut a = FeederGraph::new(n, pairs.iter().map(|&p| EdgeKey::from(p)));
            let mut b = a.clone();
            a.random_spanning_tree(&mut rng);
            b.random_spanning_tree(&mut rng);

            let child = a.crossover(b.spanning(), &mut rng);
            let union: BTreeSet<_> = a.spanning().iter().chain(b.spanning()).copied().collect();
            let got: BTreeSet<_> = child.candidates().iter().copied().collect();
            prop_assert_eq!(got, union.clone());
            prop_assert_eq!(child.candidates().len(), union.len());
            prop_assert!(child.is_radial());
        }
    }
}
