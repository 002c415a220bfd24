//! Unified nearest-neighbor index interface.
//!
//! Implemented by:
//! - **DCI**: Dynamic Continuous Indexing (projection-based) - see [`crate::dci`]
//! - **Exact**: brute-force scan - see [`crate::flat`]
//!
//! ```rust
//! use dci::ann::ANNIndex;
//! use dci::{DciIndex, DciParams, ExactIndex};
//!
//! # fn main() -> Result<(), dci::RetrieveError> {
//! let mut indexes: Vec<Box<dyn ANNIndex>> = vec![
//!     Box::new(DciIndex::new(2, DciParams::new(2, 4, 0.01, true).with_seed(1))?),
//!     Box::new(ExactIndex::new(2)?),
//! ];
//! for index in &mut indexes {
//!     index.add(&[0.0, 0.0])?;
//!     index.add(&[3.0, 4.0])?;
//!     assert_eq!(index.search(&[3.0, 4.0], 1)?, vec![(1, 0.0)]);
//! }
//! # Ok(())
//! # }
//! ```

pub mod traits;

pub use traits::{ANNIndex, ANNStats};
