//! Unified trait for nearest-neighbor indexes.

use crate::dci::{DciIndex, ProjectionStore};
use crate::flat::ExactIndex;
use crate::RetrieveError;

/// Common surface of the indexes in this crate.
///
/// Indexes assign ids themselves, densely and in insertion order, so the same
/// sequence of `add` calls yields the same ids in every implementation. That
/// makes an [`ExactIndex`] a drop-in ground truth for any approximate index.
pub trait ANNIndex {
    /// Add a vector, returning the id it was stored under.
    fn add(&mut self, vector: &[f32]) -> Result<u32, RetrieveError>;

    /// Search for the k nearest neighbors, ascending by distance.
    fn search(&self, query: &[f32], k: usize) -> Result<Vec<(u32, f32)>, RetrieveError>;

    /// Get index size in bytes (approximate).
    fn size_bytes(&self) -> usize;

    /// Get index statistics.
    fn stats(&self) -> ANNStats;

    /// Get vector dimension.
    fn dimension(&self) -> usize;

    /// Get number of vectors.
    fn num_vectors(&self) -> usize;
}

/// Statistics about an ANN index.
#[derive(Debug, Clone)]
pub struct ANNStats {
    pub num_vectors: usize,
    pub dimension: usize,
    pub size_bytes: usize,
    pub algorithm: String,
}

impl<S: ProjectionStore> ANNIndex for DciIndex<S> {
    fn add(&mut self, vector: &[f32]) -> Result<u32, RetrieveError> {
        self.add_item(vector)
    }

    fn search(&self, query: &[f32], k: usize) -> Result<Vec<(u32, f32)>, RetrieveError> {
        self.query(query, k)
    }

    fn size_bytes(&self) -> usize {
        DciIndex::size_bytes(self)
    }

    fn stats(&self) -> ANNStats {
        let p = self.params();
        ANNStats {
            num_vectors: self.num_vectors,
            dimension: self.dimension,
            size_bytes: DciIndex::size_bytes(self),
            algorithm: format!(
                "DCI(m={}, L={}, store={})",
                p.num_simples,
                p.num_levels,
                self.storage_kind()
            ),
        }
    }

    fn dimension(&self) -> usize {
        self.dimension
    }

    fn num_vectors(&self) -> usize {
        self.num_vectors
    }
}

impl ANNIndex for ExactIndex {
    fn add(&mut self, vector: &[f32]) -> Result<u32, RetrieveError> {
        self.add(vector)
    }

    fn search(&self, query: &[f32], k: usize) -> Result<Vec<(u32, f32)>, RetrieveError> {
        self.search(query, k)
    }

    fn size_bytes(&self) -> usize {
        self.vectors.len() * std::mem::size_of::<f32>()
    }

    fn stats(&self) -> ANNStats {
        ANNStats {
            num_vectors: self.num_vectors,
            dimension: self.dimension,
            size_bytes: ANNIndex::size_bytes(self),
            algorithm: "Exact".to_string(),
        }
    }

    fn dimension(&self) -> usize {
        self.dimension
    }

    fn num_vectors(&self) -> usize {
        self.num_vectors
    }
}
