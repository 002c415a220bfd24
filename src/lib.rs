//! dci: approximate nearest neighbor search by Dynamic Continuous Indexing.
//!
//! Points are indexed by their scalar projections onto random directions.
//! A query walks each sorted projection list outward from its own projection
//! and keeps the points that come up close in every direction of a level,
//! then re-ranks the survivors by true Euclidean distance.
//!
//! - [`dci`]: the index (levels, projection stores, quorum scan, re-ranking)
//! - [`projection`]: seeded random (optionally orthonormal) directions
//! - [`flat`]: exact brute-force baseline
//! - [`ann`]: the [`ANNIndex`] trait both implement
//! - [`benchmark`]: datasets, ground truth and recall
//!
//! # Why projections
//!
//! Space-partitioning indexes (k-d trees, cover trees) degrade exponentially
//! with ambient dimension. DCI never partitions space: its cost depends on the
//! intrinsic dimensionality of the data, and inserting a point only touches
//! `L · m` sorted lists.
//!
//! # Feature Flags
//!
//! - `parallel` (default): scan levels and re-rank candidates on the rayon
//!   pool. Results are identical with or without it.
//! - `innr` (default): SIMD distance kernels from the `innr` crate; portable
//!   loops otherwise.

pub mod ann;
pub mod benchmark;
pub mod dci;
pub mod error;
pub mod flat;
pub mod projection;
pub mod simd;

// Re-exports
pub use ann::traits::ANNIndex;
pub use dci::{DciIndex, DciParams, QueryStats, SortedStore, TreeStore};
pub use error::{Result, RetrieveError};
pub use flat::ExactIndex;
