//! The DCI index: point store, levels, insertion and query.

use super::level::{LevelIndex, LevelScan};
use super::params::DciParams;
use super::store::{ProjectionStore, TreeStore};
use super::topk::{BoundedTopK, ProjId};
use crate::error::{Result, RetrieveError};
use crate::projection::{DirectionGenerator, Directions};
use crate::simd;
use rand::Rng;
use std::ops::Range;

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// Largest number of points an index can hold (ids are `u32`).
pub const MAX_POINTS: usize = u32::MAX as usize;

/// Candidate unions smaller than this are re-ranked on the calling thread.
#[cfg(feature = "parallel")]
const PAR_RERANK_MIN: usize = 1024;

/// Per-query diagnostics.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QueryStats {
    /// Candidates each level was asked for.
    pub target: usize,
    /// Candidates each level returned.
    pub level_candidates: Vec<usize>,
    /// Levels that ran out of entries before meeting the target.
    pub exhausted_levels: usize,
    /// Distinct ids re-ranked by exact distance.
    pub union_size: usize,
}

/// Dynamic Continuous Indexing over `L` levels of `m` random projections.
///
/// `S` selects how each simple stores its projections. [`TreeStore`] is the
/// default; [`super::store::SortedStore`] trades insert speed for scan speed
/// and is reachable through [`DciIndex::cvt`] or an explicit type.
///
/// Insertion takes `&mut self` and queries take `&self`, so writers are
/// serialised by the borrow checker while any number of queries can share
/// an index.
#[derive(Debug, Clone)]
pub struct DciIndex<S: ProjectionStore = TreeStore> {
    /// Points, row-major: point `i` is `vectors[i * dimension..(i + 1) * dimension]`.
    pub(crate) vectors: Vec<f32>,
    pub(crate) dimension: usize,
    pub(crate) num_vectors: usize,
    params: DciParams,
    seed: u64,
    directions: Directions,
    levels: Vec<LevelIndex<S>>,
}

impl DciIndex<TreeStore> {
    /// Create an empty index over `dimension`-dimensional points.
    ///
    /// Fails with [`RetrieveError::InvalidConfig`] when the parameters are
    /// unusable or the directions cannot be generated (for example more
    /// orthonormal simples per level than dimensions).
    ///
    /// ```rust
    /// use dci::{DciIndex, DciParams};
    ///
    /// # fn main() -> Result<(), dci::RetrieveError> {
    /// let mut index = DciIndex::new(4, DciParams::new(2, 3, 0.01, true).with_seed(7))?;
    /// index.add_item(&[0.0, 1.0, 0.0, 1.0])?;
    /// index.add_item(&[1.0, 0.0, 1.0, 0.0])?;
    ///
    /// let hits = index.query(&[0.0, 1.0, 0.0, 0.9], 2)?;
    /// assert_eq!(hits.len(), 2);
    /// assert_eq!(hits[0].0, 0);
    /// # Ok(())
    /// # }
    /// ```
    pub fn new(dimension: usize, params: DciParams) -> Result<Self> {
        Self::with_storage(dimension, params)
    }
}

impl<S: ProjectionStore> DciIndex<S> {
    /// Create an empty index with an explicit projection store.
    ///
    /// ```rust
    /// use dci::{DciIndex, DciParams, SortedStore};
    ///
    /// # fn main() -> Result<(), dci::RetrieveError> {
    /// let index = DciIndex::<SortedStore>::with_storage(8, DciParams::default())?;
    /// assert_eq!(index.storage_kind(), "sorted-vec");
    /// # Ok(())
    /// # }
    /// ```
    pub fn with_storage(dimension: usize, params: DciParams) -> Result<Self> {
        params.validate()?;
        if dimension == 0 {
            return Err(RetrieveError::InvalidConfig(
                "dimension must be greater than 0".to_string(),
            ));
        }

        let seed = params.seed.unwrap_or_else(|| rand::rng().random());
        let directions = DirectionGenerator::new(dimension, seed).generate(
            params.num_levels,
            params.num_simples,
            params.orthonormal,
        )?;
        let levels = (0..params.num_levels)
            .map(|_| LevelIndex::new(params.num_simples))
            .collect();

        log::debug!(
            "created DCI index: d={dimension} m={} L={} epsilon={} orthonormal={} store={}",
            params.num_simples,
            params.num_levels,
            params.epsilon,
            params.orthonormal,
            S::KIND
        );

        Ok(Self {
            vectors: Vec::new(),
            dimension,
            num_vectors: 0,
            params,
            seed,
            directions,
            levels,
        })
    }

    pub fn params(&self) -> &DciParams {
        &self.params
    }

    /// Seed the directions were generated from (drawn from entropy if none was configured).
    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn directions(&self) -> &Directions {
        &self.directions
    }

    pub fn dimension(&self) -> usize {
        self.dimension
    }

    /// Number of stored points.
    pub fn len(&self) -> usize {
        self.num_vectors
    }

    pub fn is_empty(&self) -> bool {
        self.num_vectors == 0
    }

    /// The point stored under `id`.
    pub fn get(&self, id: u32) -> Option<&[f32]> {
        let idx = id as usize;
        (idx < self.num_vectors).then(|| self.vector(idx))
    }

    /// All points with their ids, in insertion order.
    pub fn iter(&self) -> impl ExactSizeIterator<Item = (u32, &[f32])> + '_ {
        self.vectors
            .chunks_exact(self.dimension)
            .enumerate()
            .map(|(i, v)| (i as u32, v))
    }

    /// Insert a point and return its id.
    ///
    /// Ids are assigned densely in insertion order, starting at 0.
    pub fn add_item(&mut self, point: &[f32]) -> Result<u32> {
        self.check_dimension(point)?;
        if self.num_vectors >= MAX_POINTS {
            return Err(RetrieveError::CapacityExceeded { limit: MAX_POINTS });
        }
        let id = self.num_vectors as u32;

        let projections = self.directions.project(point);
        for (level, chunk) in self
            .levels
            .iter_mut()
            .zip(projections.chunks_exact(self.params.num_simples))
        {
            level.insert(chunk, id);
        }
        self.vectors.extend_from_slice(point);
        self.num_vectors += 1;

        Ok(id)
    }

    /// Insert several points, returning the ids they received.
    ///
    /// Every point is checked before anything is inserted, so a dimension
    /// error leaves the index untouched.
    pub fn add_items<P: AsRef<[f32]>>(&mut self, points: &[P]) -> Result<Range<u32>> {
        for p in points {
            self.check_dimension(p.as_ref())?;
        }
        if self.num_vectors + points.len() > MAX_POINTS {
            return Err(RetrieveError::CapacityExceeded { limit: MAX_POINTS });
        }

        let start = self.num_vectors as u32;
        self.vectors.reserve(points.len() * self.dimension);
        for p in points {
            self.add_item(p.as_ref())?;
        }
        log::trace!("inserted {} points, index now holds {}", points.len(), self.num_vectors);
        Ok(start..self.num_vectors as u32)
    }

    /// Approximate `k` nearest neighbours of `query` by Euclidean distance.
    ///
    /// Returns `(id, distance)` pairs sorted by ascending distance, ties by
    /// id. Fewer than `k` pairs come back when the candidate pool is smaller
    /// than `k`.
    pub fn query(&self, query: &[f32], k: usize) -> Result<Vec<(u32, f32)>> {
        self.query_with_stats(query, k).map(|(results, _)| results)
    }

    /// [`DciIndex::query`] plus diagnostics about the candidate search.
    pub fn query_with_stats(&self, query: &[f32], k: usize) -> Result<(Vec<(u32, f32)>, QueryStats)> {
        self.check_dimension(query)?;
        if self.num_vectors == 0 {
            return Err(RetrieveError::EmptyIndex);
        }
        if k == 0 {
            return Ok((Vec::new(), QueryStats::default()));
        }
        self.assert_consistent();

        let target = self.params.level_target(k);
        let projections = self.directions.project(query);
        let scans = self.scan_levels(&projections, target);

        let union = candidate_union(&scans);

        let results: Vec<(u32, f32)> = self
            .rerank(query, &union, k)
            .into_sorted_vec()
            .into_iter()
            .map(|p| (p.id(), p.score()))
            .collect();

        let stats = QueryStats {
            target,
            level_candidates: scans.iter().map(|s| s.candidates.len()).collect(),
            exhausted_levels: scans.iter().filter(|s| s.exhausted).count(),
            union_size: union.len(),
        };
        log::debug!(
            "query k={k}: target={target} union={} exhausted_levels={} returned={}",
            stats.union_size,
            stats.exhausted_levels,
            results.len()
        );

        Ok((results, stats))
    }

    /// Rebuild the same index over a different projection store.
    ///
    /// Directions, points, ids and parameters carry over unchanged, so query
    /// results are identical.
    pub fn cvt<T: ProjectionStore>(&self) -> DciIndex<T> {
        log::debug!(
            "converting DCI index with {} points from {} to {} storage",
            self.num_vectors,
            S::KIND,
            T::KIND
        );
        DciIndex {
            vectors: self.vectors.clone(),
            dimension: self.dimension,
            num_vectors: self.num_vectors,
            params: self.params.clone(),
            seed: self.seed,
            directions: self.directions.clone(),
            levels: self.levels.iter().map(LevelIndex::convert).collect(),
        }
    }

    /// Name of the projection store in use.
    pub fn storage_kind(&self) -> &'static str {
        S::KIND
    }

    /// Approximate heap footprint in bytes.
    pub fn size_bytes(&self) -> usize {
        self.vectors.len() * std::mem::size_of::<f32>()
            + self.directions.size_bytes()
            + self.levels.iter().map(LevelIndex::size_bytes).sum::<usize>()
    }

    fn check_dimension(&self, v: &[f32]) -> Result<()> {
        if v.len() != self.dimension {
            return Err(RetrieveError::DimensionMismatch {
                expected: self.dimension,
                actual: v.len(),
            });
        }
        Ok(())
    }

    /// Every simple must hold exactly one entry per stored point.
    fn assert_consistent(&self) {
        for (l, level) in self.levels.iter().enumerate() {
            for (s, store) in level.simples().iter().enumerate() {
                assert_eq!(
                    store.len(),
                    self.num_vectors,
                    "simple {s} of level {l} out of sync with the point store"
                );
            }
        }
    }

    fn vector(&self, idx: usize) -> &[f32] {
        let start = idx * self.dimension;
        &self.vectors[start..start + self.dimension]
    }

    fn scan_levels(&self, projections: &[f32], target: usize) -> Vec<LevelScan> {
        #[cfg(feature = "parallel")]
        {
            if self.levels.len() > 1 {
                return self.scan_levels_par(projections, target);
            }
        }
        self.scan_levels_seq(projections, target)
    }

    fn scan_levels_seq(&self, projections: &[f32], target: usize) -> Vec<LevelScan> {
        self.levels
            .iter()
            .zip(projections.chunks_exact(self.params.num_simples))
            .map(|(level, proj)| level.scan(proj, target))
            .collect()
    }

    #[cfg(feature = "parallel")]
    fn scan_levels_par(&self, projections: &[f32], target: usize) -> Vec<LevelScan> {
        self.levels
            .par_iter()
            .zip(projections.par_chunks_exact(self.params.num_simples))
            .map(|(level, proj)| level.scan(proj, target))
            .collect()
    }

    /// Exact distances over the candidate union, keeping the best `k`.
    fn rerank(&self, query: &[f32], candidates: &[u32], k: usize) -> BoundedTopK {
        #[cfg(feature = "parallel")]
        {
            if candidates.len() >= PAR_RERANK_MIN {
                return self.rerank_par(query, candidates, k);
            }
        }
        self.rerank_seq(query, candidates, k)
    }

    fn rerank_seq(&self, query: &[f32], candidates: &[u32], k: usize) -> BoundedTopK {
        let mut top = BoundedTopK::new(k);
        top.extend(
            candidates
                .iter()
                .map(|&id| ProjId::new(simd::l2_distance(query, self.vector(id as usize)), id)),
        );
        top
    }

    #[cfg(feature = "parallel")]
    fn rerank_par(&self, query: &[f32], candidates: &[u32], k: usize) -> BoundedTopK {
        // Each worker fills its own heap; the heaps are merged pairwise.
        candidates
            .par_iter()
            .with_min_len(256)
            .fold(
                || BoundedTopK::new(k),
                |mut top, &id| {
                    top.push(ProjId::new(
                        simd::l2_distance(query, self.vector(id as usize)),
                        id,
                    ));
                    top
                },
            )
            .reduce(|| BoundedTopK::new(k), BoundedTopK::merge)
    }
}

/// Sorted, deduplicated ids from every level's candidates.
fn candidate_union(scans: &[LevelScan]) -> Vec<u32> {
    let mut union: Vec<u32> = scans
        .iter()
        .flat_map(|s| s.candidates.iter().copied())
        .collect();
    union.sort_unstable();
    union.dedup();
    union
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dci::store::SortedStore;

    fn grid_index() -> DciIndex {
        let mut index = DciIndex::new(2, DciParams::new(2, 3, 0.5, true).with_seed(1)).unwrap();
        for x in 0..5 {
            for y in 0..5 {
                index.add_item(&[x as f32, y as f32]).unwrap();
            }
        }
        index
    }

    #[test]
    fn ids_follow_insertion_order() {
        let mut index: DciIndex = DciIndex::new(3, DciParams::new(2, 2, 0.1, true).with_seed(5)).unwrap();
        assert_eq!(index.add_item(&[1.0, 2.0, 3.0]).unwrap(), 0);
        assert_eq!(index.add_item(&[4.0, 5.0, 6.0]).unwrap(), 1);
        assert_eq!(index.get(1), Some(&[4.0, 5.0, 6.0][..]));
        assert_eq!(index.get(2), None);
        let ids: Vec<u32> = index.iter().map(|(id, _)| id).collect();
        assert_eq!(ids, vec![0, 1]);
    }

    #[test]
    fn every_simple_holds_every_point() {
        let index = grid_index();
        for level in &index.levels {
            for store in level.simples() {
                assert_eq!(store.len(), 25);
            }
        }
    }

    #[test]
    fn exact_match_comes_first() {
        let index = grid_index();
        let results = index.query(&[2.0, 3.0], 3).unwrap();
        assert_eq!(results[0], (13, 0.0));
        assert!(results.windows(2).all(|w| w[0].1 <= w[1].1));
    }

    #[test]
    fn stats_report_levels() {
        let index = grid_index();
        let (results, stats) = index.query_with_stats(&[1.0, 1.0], 2).unwrap();
        assert_eq!(results.len(), 2);
        assert_eq!(stats.level_candidates.len(), 3);
        assert_eq!(stats.target, index.params().level_target(2));
        assert!(stats.union_size >= 2);
    }

    #[test]
    fn k_zero_is_empty() {
        let index = grid_index();
        assert!(index.query(&[0.0, 0.0], 0).unwrap().is_empty());
    }

    #[test]
    fn add_items_is_all_or_nothing() {
        let mut index: DciIndex = DciIndex::new(2, DciParams::new(2, 2, 0.1, true).with_seed(5)).unwrap();
        let bad: Vec<Vec<f32>> = vec![vec![0.0, 1.0], vec![1.0]];
        assert!(index.add_items(&bad).is_err());
        assert!(index.is_empty());

        let good = vec![[0.0f32, 1.0], [1.0, 0.0], [1.0, 1.0]];
        assert_eq!(index.add_items(&good).unwrap(), 0..3);
        assert_eq!(index.add_items(&good).unwrap(), 3..6);
    }

    #[test]
    fn cvt_preserves_results() {
        let index = grid_index();
        let sorted: DciIndex<SortedStore> = index.cvt();
        assert_eq!(sorted.storage_kind(), "sorted-vec");
        assert_eq!(sorted.len(), index.len());
        for q in [[0.2f32, 0.1], [3.7, 2.2], [4.9, 4.9]] {
            assert_eq!(index.query(&q, 4).unwrap(), sorted.query(&q, 4).unwrap());
        }
        let back: DciIndex<TreeStore> = sorted.cvt();
        assert_eq!(back.query(&[2.0, 2.0], 5).unwrap(), index.query(&[2.0, 2.0], 5).unwrap());
    }

    #[cfg(feature = "parallel")]
    #[test]
    fn parallel_and_sequential_paths_agree() {
        let ds = crate::benchmark::create_gaussian_dataset(3000, 20, 16, 0.0, 1.0, 31);
        let mut index = DciIndex::new(16, DciParams::new(3, 5, 1e-3, true).with_seed(31)).unwrap();
        index.add_items(&ds.train).unwrap();
        let k = 10;
        let target = index.params().level_target(k);

        for q in &ds.test {
            let projections = index.directions.project(q);
            let seq = index.scan_levels_seq(&projections, target);
            assert_eq!(index.scan_levels_par(&projections, target), seq);

            let union = candidate_union(&seq);
            let expected = index.rerank_seq(q, &union, k).into_sorted_vec();
            assert_eq!(index.rerank_par(q, &union, k).into_sorted_vec(), expected);

            let (results, stats) = index.query_with_stats(q, k).unwrap();
            let expected: Vec<(u32, f32)> = expected.iter().map(|p| (p.id(), p.score())).collect();
            assert_eq!(results, expected);
            assert_eq!(stats.union_size, union.len());
            assert_eq!(
                stats.level_candidates,
                seq.iter().map(|s| s.candidates.len()).collect::<Vec<_>>()
            );
        }
    }

    #[test]
    #[should_panic(expected = "out of sync")]
    fn corrupted_store_panics() {
        let mut index = grid_index();
        index.levels[1] = LevelIndex::new(2);
        let _ = index.query(&[0.0, 0.0], 1);
    }
}
