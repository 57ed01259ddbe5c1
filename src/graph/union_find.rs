//! Disjoint-set union used for cycle detection while building and checking
//! spanning forests.

/// Union-find over vertices `0..n` with path compression and union by rank.
///
/// Instances are built on demand from an edge sequence and dropped; they are
/// never stored on a graph. Given the same insertion order the resulting
/// partition is always the same.
#[derive(Clone, Debug)]
pub struct UnionFind {
    parent: Vec<usize>,
    rank: Vec<u8>,
}

impl UnionFind {
    /// Creates `n` singleton sets.
    pub fn new(n: usize) -> Self {
        Self {
            parent: (0..n).collect(),
            rank: vec![0; n],
        }
    }

    /// Returns the representative of `node`, compressing the path to it.
    pub fn find(&mut self, mut node: usize) -> usize {
        let mut root = node;
        while self.parent[root] != root {
            root = self.parent[root];
        }

        while self.parent[node] != node {
            let parent = self.parent[node];
            self.parent[node] = root;
            node = parent;
        }

        root
    }

    /// Merges the sets holding `left` and `right`.
    ///
    /// Returns `false` when both were already in the same set, which is
    /// exactly the case where the edge `(left, right)` closes a cycle.
    pub fn union(&mut self, left: usize, right: usize) -> bool {
        let mut left = self.find(left);
        let mut right = self.find(right);
        if left == right {
            return false;
        }
        let left_rank = self.rank[left];
        let right_rank = self.rank[right];
        if left_rank < right_rank {
            std::mem::swap(&mut left, &mut right);
        }
        self.parent[right] = left;
        if left_rank == right_rank {
            self.rank[left] = left_rank.saturating_add(1);
        }
        true
    }

    /// Whether `left` and `right` share a set.
    pub fn connected(&mut self, left: usize, right: usize) -> bool {
        self.find(left) == self.find(right)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_union_detects_cycle() {
        let mut uf = UnionFind::new(4);
        assert!(uf.union(0, 1));
        assert!(uf.union(1, 2));
        assert!(!uf.union(0, 2));
        assert!(uf.connected(0, 2));
        assert!(!uf.connected(0, 3));
    }

    #[test]
    fn test_deterministic_partition() {
        let edges = [(0, 1), (2, 3), (1, 3), (4, 5)];
        let roots = |edges: &[(usize, usize)]| {
            let mut uf = UnionFind::new(6);
            for &(a, b) in edges {
                uf.union(a, b);
            }
            (0..6).map(|v| uf.find(v)).collect::<Vec<_>>()
        };
        assert_eq!(roots(&edges), roots(&edges));
    }

    #[test]
    fn test_rank_keeps_tree_shallow() {
        let mut uf = UnionFind::new(8);
        for v in 1..8 {
            uf.union(0, v);
        }
        let root = uf.find(0);
        for v in 0..8 {
            assert_eq!(uf.find(v), root);
        }
    }
}
