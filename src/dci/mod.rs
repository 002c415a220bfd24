//! Dynamic Continuous Indexing (DCI).
//!
//! Projection-based approximate nearest neighbor search that avoids
//! space partitioning altogether, so it degrades gracefully with ambient
//! dimension and supports cheap incremental insertion.
//!
//! # Algorithm
//!
//! - **Index**: draw `L · m` random unit directions in `L` groups of `m`.
//!   Every point is projected onto each direction and its scalar projection
//!   stored in a sorted structure (a *simple*).
//! - **Query**: project the query onto the same directions. Within a level,
//!   walk every simple outward from the query's projection, nearest value
//!   first. A point becomes a candidate once all `m` simples of the level have
//!   reached it. Stop once enough candidates qualified.
//! - **Re-rank**: union the candidates of all `L` levels, compute true
//!   Euclidean distances and keep the best `k`.
//!
//! ```text
//!  level 0:  simple 0  ....[q]....     ids reached by all m simples
//!            simple 1  ..[q]......  -> level candidates ─┐
//!  level 1:  ...                                          ├─> union -> exact top-k
//!  level L:  ...                                          ┘
//! ```
//!
//! More simples per level (`m`) make the quorum stricter and candidates more
//! precise; more levels (`L`) give independent chances to catch a true
//! neighbor. ε sets how many candidates each level collects (see
//! [`DciParams::level_target`]).
//!
//! # Usage
//!
//! ```rust
//! use dci::dci::{DciIndex, DciParams};
//!
//! # fn main() -> Result<(), dci::RetrieveError> {
//! let params = DciParams::new(3, 5, 1e-3, true).with_seed(42);
//! let mut index = DciIndex::new(8, params)?;
//!
//! for i in 0..100 {
//!     let v: Vec<f32> = (0..8).map(|d| ((i * 7 + d) % 13) as f32).collect();
//!     index.add_item(&v)?;
//! }
//!
//! let query = index.get(17).unwrap().to_vec();
//! let results = index.query(&query, 5)?;
//! assert_eq!(results[0].1, 0.0);
//! # Ok(())
//! # }
//! ```
//!
//! # References
//!
//! - Li & Malik (2016): "Fast k-Nearest Neighbour Search via Dynamic
//!   Continuous Indexing"
//! - Li & Malik (2017): "Fast k-Nearest Neighbour Search via Prioritized DCI"

mod index;
mod level;
mod params;
pub mod store;
mod topk;

pub use index::{DciIndex, QueryStats, MAX_POINTS};
pub use level::{LevelIndex, LevelScan};
pub use params::DciParams;
pub use store::{ProjectionEntry, ProjectionStore, SortedStore, TreeStore};
pub use topk::{BoundedTopK, ProjId};
