//! Exact brute-force index.
//!
//! Scans every stored vector and keeps the best `k` with the same bounded
//! heap DCI re-ranks with, so ids, distances and tie-breaking match DCI's
//! output format exactly. Used as ground truth when measuring recall.

use crate::dci::{BoundedTopK, ProjId};
use crate::simd;
use crate::RetrieveError;

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// Exact, row-major flat index with Euclidean distance.
#[derive(Debug, Clone)]
pub struct ExactIndex {
    pub(crate) vectors: Vec<f32>,
    pub(crate) dimension: usize,
    pub(crate) num_vectors: usize,
}

impl ExactIndex {
    pub fn new(dimension: usize) -> Result<Self, RetrieveError> {
        if dimension == 0 {
            return Err(RetrieveError::InvalidConfig(
                "dimension must be greater than 0".to_string(),
            ));
        }
        Ok(Self {
            vectors: Vec::new(),
            dimension,
            num_vectors: 0,
        })
    }

    pub fn len(&self) -> usize {
        self.num_vectors
    }

    pub fn is_empty(&self) -> bool {
        self.num_vectors == 0
    }

    /// Add a vector; ids are assigned in insertion order.
    pub fn add(&mut self, vector: &[f32]) -> Result<u32, RetrieveError> {
        if vector.len() != self.dimension {
            return Err(RetrieveError::DimensionMismatch {
                expected: self.dimension,
                actual: vector.len(),
            });
        }
        if self.num_vectors >= crate::dci::MAX_POINTS {
            return Err(RetrieveError::CapacityExceeded {
                limit: crate::dci::MAX_POINTS,
            });
        }
        self.vectors.extend_from_slice(vector);
        self.num_vectors += 1;
        Ok((self.num_vectors - 1) as u32)
    }

    /// Exact k nearest neighbors, ascending by distance then id.
    pub fn search(&self, query: &[f32], k: usize) -> Result<Vec<(u32, f32)>, RetrieveError> {
        if query.len() != self.dimension {
            return Err(RetrieveError::DimensionMismatch {
                expected: self.dimension,
                actual: query.len(),
            });
        }
        if self.num_vectors == 0 {
            return Err(RetrieveError::EmptyIndex);
        }

        Ok(self
            .top_k(query, k)
            .into_sorted_vec()
            .into_iter()
            .map(|p| (p.id(), p.score()))
            .collect())
    }

    #[cfg(feature = "parallel")]
    fn top_k(&self, query: &[f32], k: usize) -> BoundedTopK {
        self.vectors
            .par_chunks_exact(self.dimension)
            .enumerate()
            .with_min_len(1024)
            .fold(
                || BoundedTopK::new(k),
                |mut top, (i, v)| {
                    top.push(ProjId::new(simd::l2_distance(query, v), i as u32));
                    top
                },
            )
            .reduce(|| BoundedTopK::new(k), BoundedTopK::merge)
    }

    #[cfg(not(feature = "parallel"))]
    fn top_k(&self, query: &[f32], k: usize) -> BoundedTopK {
        let mut top = BoundedTopK::new(k);
        top.extend(
            self.vectors
                .chunks_exact(self.dimension)
                .enumerate()
                .map(|(i, v)| ProjId::new(simd::l2_distance(query, v), i as u32)),
        );
        top
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn finds_true_neighbors() {
        let mut index = ExactIndex::new(2).unwrap();
        for v in [[0.0f32, 0.0], [1.0, 0.0], [0.0, 2.0], [5.0, 5.0]] {
            index.add(&v).unwrap();
        }
        let results = index.search(&[0.1, 0.0], 3).unwrap();
        let ids: Vec<u32> = results.iter().map(|r| r.0).collect();
        assert_eq!(ids, vec![0, 1, 2]);
        assert!((results[0].1 - 0.1).abs() < 1e-6);
    }

    #[test]
    fn k_larger_than_index() {
        let mut index = ExactIndex::new(1).unwrap();
        index.add(&[1.0]).unwrap();
        index.add(&[2.0]).unwrap();
        assert_eq!(index.search(&[0.0], 10).unwrap().len(), 2);
    }

    #[test]
    fn errors() {
        let mut index = ExactIndex::new(3).unwrap();
        assert_eq!(index.search(&[0.0; 3], 1), Err(RetrieveError::EmptyIndex));
        assert!(matches!(
            index.add(&[0.0; 2]),
            Err(RetrieveError::DimensionMismatch { expected: 3, actual: 2 })
        ));
        assert!(ExactIndex::new(0).is_err());
    }
}
