//! Feeder graph primitives.
//!
//! Vertices are dense indices `0..N` with vertex `0` as the feeder source.
//! Edges are operable switches identified by a canonical [`EdgeKey`].
//! A *radial* topology is a set of closed switches with no cycle.
//!
//! - [`UnionFind`]: disjoint sets for cycle detection
//! - [`FeederGraph`]: biased random spanning trees, cycle and radiality
//!   checks, compensating-switch search, mutation and crossover

mod edge;
mod feeder;
mod union_find;

pub use edge::EdgeKey;
pub use feeder::{unreachable_from_source, FeederGraph};
pub(crate) use feeder::dedup_edges;
pub use union_find::UnionFind;
