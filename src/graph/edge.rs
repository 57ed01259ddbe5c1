//! Canonical unordered edge identity.

use std::fmt;

/// An undirected edge stored as `(min(u, v), max(u, v))`.
///
/// Both directions of the same switch compare, hash and sort equal, so
/// edge sets can be built with ordinary `HashSet`/`BTreeSet` and plain
/// `Vec` membership tests.
///
/// # Examples
///
/// ```
/// use u_restoration::graph::EdgeKey;
///
/// assert_eq!(EdgeKey::new(4, 1), EdgeKey::new(1, 4));
/// assert_eq!(EdgeKey::new(4, 1).endpoints(), (1, 4));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EdgeKey {
    u: usize,
    v: usize,
}

impl EdgeKey {
    /// Creates the canonical key for the pair `{a, b}`.
    pub fn new(a: usize, b: usize) -> Self {
        if a <= b {
            Self { u: a, v: b }
        } else {
            Self { u: b, v: a }
        }
    }

    /// Lower endpoint.
    pub fn u(&self) -> usize {
        self.u
    }

    /// Higher endpoint.
    pub fn v(&self) -> usize {
        self.v
    }

    /// Both endpoints, lower first.
    pub fn endpoints(&self) -> (usize, usize) {
        (self.u, self.v)
    }
}

impl From<(usize, usize)> for EdgeKey {
    fn from((a, b): (usize, usize)) -> Self {
        Self::new(a, b)
    }
}

impl fmt::Display for EdgeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.u, self.v)
    }
}
