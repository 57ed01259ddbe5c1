//! SSGA data types.

use crate::graph::{dedup_edges, EdgeKey};
use crate::merit::MeritIndex;
use crate::oracle::SwitchChange;
use std::collections::HashSet;

/// Switch operations needed to move from one topology to another.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SwitchingDiff {
    /// Edges closed in the final topology but open initially.
    pub to_close: Vec<EdgeKey>,
    /// Edges closed initially but open in the final topology.
    pub to_open: Vec<EdgeKey>,
}

impl SwitchingDiff {
    /// Set differences on canonical pairs, each in the order of its source
    /// list.
    ///
    /// ```
    /// use u_restoration::graph::EdgeKey;
    /// use u_restoration::ssga::SwitchingDiff;
    ///
    /// let initial = [EdgeKey::new(0, 1), EdgeKey::new(1, 2)];
    /// let target = [EdgeKey::new(0, 1), EdgeKey::new(2, 0)];
    /// let diff = SwitchingDiff::between(&initial, &target);
    /// assert_eq!(diff.to_close, vec![EdgeKey::new(0, 2)]);
    /// assert_eq!(diff.to_open, vec![EdgeKey::new(1, 2)]);
    /// ```
    pub fn between(initial: &[EdgeKey], target: &[EdgeKey]) -> Self {
        let initial_set: HashSet<EdgeKey> = initial.iter().copied().collect();
        let target_set: HashSet<EdgeKey> = target.iter().copied().collect();
        Self {
            to_close: dedup_edges(target.iter().copied().filter(|e| !initial_set.contains(e))),
            to_open: dedup_edges(initial.iter().copied().filter(|e| !target_set.contains(e))),
        }
    }

    /// Whether both topologies are identical.
    pub fn is_empty(&self) -> bool {
        self.to_close.is_empty() && self.to_open.is_empty()
    }

    /// `to_close` followed by `to_open`.
    pub fn all_changes(&self) -> Vec<EdgeKey> {
        self.to_close.iter().chain(&self.to_open).copied().collect()
    }

    /// Number of operations, which is the same for every valid sequence.
    pub fn len(&self) -> usize {
        self.to_close.len() + self.to_open.len()
    }
}

/// A switch to close, and the switch opened right after to keep the
/// network radial, if closing it creates a mesh.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SwitchPair {
    pub close: EdgeKey,
    pub open: Option<EdgeKey>,
}

impl SwitchPair {
    pub fn reconnection(close: EdgeKey) -> Self {
        Self { close, open: None }
    }

    pub fn compensated(close: EdgeKey, open: EdgeKey) -> Self {
        Self {
            close,
            open: Some(open),
        }
    }
}

/// A fully decoded switching sequence.
#[derive(Debug, Clone, PartialEq)]
pub struct SwitchingSequence {
    pub pairs: Vec<SwitchPair>,
    /// Closing first, then opening, for each pair.
    pub natural: Vec<SwitchChange>,
    /// Opening before closing for compensated pairs, so that no transient
    /// mesh is formed. This is the order carried out in the field.
    pub inverted: Vec<SwitchChange>,
}

/// Random-key chromosome with its decoded sequence and score.
#[derive(Debug, Clone)]
pub struct SwitchingIndividual {
    /// One key in `[0, 1)` per edge to close.
    pub keys: Vec<f64>,
    pub sequence: Option<SwitchingSequence>,
    /// The inverted list after the auxiliary-operations hook.
    pub effective: Vec<SwitchChange>,
    pub merit: MeritIndex,
}

impl SwitchingIndividual {
    pub fn new(keys: Vec<f64>) -> Self {
        Self {
            keys,
            sequence: None,
            effective: Vec::new(),
            merit: MeritIndex::default(),
        }
    }

    /// Total fitness (lower is better).
    pub fn fitness(&self) -> f64 {
        self.merit.ff
    }

    /// Snapshot of this individual, if it has been decoded.
    pub fn record(&self) -> Option<SwitchingRecord> {
        self.sequence.as_ref().map(|seq| SwitchingRecord {
            pairs: seq.pairs.clone(),
            natural: seq.natural.clone(),
            inverted: seq.inverted.clone(),
            effective: self.effective.clone(),
            merit: self.merit,
        })
    }
}

/// Best switching sequence found, detached from the population.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SwitchingRecord {
    pub pairs: Vec<SwitchPair>,
    pub natural: Vec<SwitchChange>,
    pub inverted: Vec<SwitchChange>,
    pub effective: Vec<SwitchChange>,
    pub merit: MeritIndex,
}

impl SwitchingRecord {
    pub fn fitness(&self) -> f64 {
        self.merit.ff
    }

    /// Number of switching operations in the sequence.
    pub fn num_operations(&self) -> usize {
        self.inverted.len()
    }
}
