//! One level: `m` simples and the quorum scan over them.

use super::store::{ProjectionEntry, ProjectionStore};
use smallvec::SmallVec;
use std::collections::HashMap;
use std::iter::Peekable;

/// Outcome of one level's scan.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LevelScan {
    /// Ids reached by every simple of the level, in the order they qualified.
    /// On exhaustion: every id the level visited, ascending.
    pub candidates: Vec<u32>,
    /// Distinct ids touched by any simple.
    pub visited: usize,
    /// All walks ran dry before the target was met.
    pub exhausted: bool,
}

/// Outward walk over one simple, nearest projection first.
struct Cursor<'a, S: ProjectionStore + 'a> {
    key: f32,
    below: Peekable<S::Below<'a>>,
    above: Peekable<S::Above<'a>>,
}

impl<'a, S: ProjectionStore + 'a> Cursor<'a, S> {
    fn new(store: &'a S, key: f32) -> Self {
        let (below, above) = store.locate(key);
        Self {
            key,
            below: below.peekable(),
            above: above.peekable(),
        }
    }

    /// Next id in order of distance from the key. Ties go below.
    fn step(&mut self) -> Option<u32> {
        let take_below = match (self.below.peek(), self.above.peek()) {
            (None, None) => return None,
            (Some(_), None) => true,
            (None, Some(_)) => false,
            (Some(b), Some(a)) => (self.key - b.value).abs() <= (a.value - self.key).abs(),
        };
        let entry = if take_below {
            self.below.next()
        } else {
            self.above.next()
        };
        entry.map(|e| e.id)
    }
}

/// The `m` simples of one level.
#[derive(Debug, Clone)]
pub struct LevelIndex<S> {
    simples: Vec<S>,
}

impl<S: ProjectionStore> LevelIndex<S> {
    pub fn new(num_simples: usize) -> Self {
        Self {
            simples: (0..num_simples).map(|_| S::default()).collect(),
        }
    }

    pub(crate) fn from_simples(simples: Vec<S>) -> Self {
        Self { simples }
    }

    pub fn simples(&self) -> &[S] {
        &self.simples
    }

    pub fn num_simples(&self) -> usize {
        self.simples.len()
    }

    /// Record a point's projections onto this level's directions.
    pub fn insert(&mut self, projections: &[f32], id: u32) {
        assert_eq!(projections.len(), self.simples.len());
        for (store, &value) in self.simples.iter_mut().zip(projections) {
            store.insert(ProjectionEntry::new(value, id));
        }
    }

    /// Rebuild every simple in another store representation.
    pub(crate) fn convert<T: ProjectionStore>(&self) -> LevelIndex<T> {
        LevelIndex::from_simples(
            self.simples
                .iter()
                .map(|s| T::from_sorted(s.ascending().collect()))
                .collect(),
        )
    }

    pub fn size_bytes(&self) -> usize {
        self.simples.iter().map(ProjectionStore::size_bytes).sum()
    }

    /// Quorum scan.
    ///
    /// Every round advances each simple one step outward from the query's
    /// projection. An id qualifies once all `m` simples have reached it. The
    /// scan stops when `target` ids qualified or every walk is exhausted.
    pub fn scan(&self, projections: &[f32], target: usize) -> LevelScan {
        let m = self.simples.len();
        debug_assert_eq!(projections.len(), m);
        if target == 0 || m == 0 {
            return LevelScan::default();
        }

        let population = self.simples[0].len();
        let mut cursors: SmallVec<[Cursor<'_, S>; 8]> = self
            .simples
            .iter()
            .zip(projections)
            .map(|(store, &key)| Cursor::new(store, key))
            .collect();

        let mut counts: HashMap<u32, u32> =
            HashMap::with_capacity(target.saturating_mul(m).min(population));
        let mut candidates = Vec::with_capacity(target.min(population));
        let mut exhausted = false;

        'rounds: loop {
            let mut advanced = false;
            for cursor in cursors.iter_mut() {
                let Some(id) = cursor.step() else {
                    continue;
                };
                advanced = true;
                let count = counts.entry(id).or_insert(0);
                *count += 1;
                if *count as usize == m {
                    candidates.push(id);
                    if candidates.len() >= target {
                        break 'rounds;
                    }
                }
            }
            if !advanced {
                exhausted = true;
                break;
            }
        }

        if exhausted {
            log::trace!(
                "level exhausted with {} of {} target candidates",
                candidates.len(),
                target
            );
            // Hand back everything seen rather than starve the query.
            candidates = counts.keys().copied().collect();
            candidates.sort_unstable();
        }

        LevelScan {
            visited: counts.len(),
            candidates,
            exhausted,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dci::store::{SortedStore, TreeStore};

    /// Two simples over ids 0..10 with projections `id` and `-id`.
    fn mirrored<S: ProjectionStore>() -> LevelIndex<S> {
        let mut level = LevelIndex::new(2);
        for id in 0..10u32 {
            level.insert(&[id as f32, -(id as f32)], id);
        }
        level
    }

    #[test]
    fn cursor_walks_nearest_first() {
        let mut store = TreeStore::default();
        for (id, v) in [(0, 0.0), (1, 1.0), (2, 2.5), (3, 4.0)] {
            store.insert(ProjectionEntry::new(v, id));
        }
        let mut cursor = Cursor::new(&store, 2.0);
        let order: Vec<u32> = std::iter::from_fn(|| cursor.step()).collect();
        assert_eq!(order, vec![2, 1, 0, 3]);
    }

    #[test]
    fn scan_finds_ids_near_query_in_all_simples() {
        let level: LevelIndex<TreeStore> = mirrored();
        let scan = level.scan(&[4.0, -4.0], 1);
        assert_eq!(scan.candidates, vec![4]);
        assert!(!scan.exhausted);
    }

    #[test]
    fn scan_grows_with_target() {
        let level: LevelIndex<TreeStore> = mirrored();
        let small = level.scan(&[4.2, -4.2], 2);
        let large = level.scan(&[4.2, -4.2], 5);
        assert_eq!(small.candidates.len(), 2);
        assert_eq!(large.candidates.len(), 5);
        assert_eq!(&large.candidates[..2], &small.candidates[..]);
    }

    #[test]
    fn scan_requires_quorum() {
        let mut level: LevelIndex<TreeStore> = LevelIndex::new(2);
        // id 0 is near the query in simple 0 only, id 1 in simple 1 only.
        level.insert(&[0.0, 100.0], 0);
        level.insert(&[100.0, 0.0], 1);
        level.insert(&[1.0, 1.0], 2);
        let scan = level.scan(&[0.0, 0.0], 1);
        assert_eq!(scan.candidates, vec![2]);
    }

    #[test]
    fn exhausted_scan_returns_everything_visited() {
        let level: LevelIndex<SortedStore> = mirrored();
        let scan = level.scan(&[0.0, 0.0], 100);
        assert!(scan.exhausted);
        assert_eq!(scan.visited, 10);
        assert_eq!(scan.candidates, (0..10).collect::<Vec<u32>>());
    }

    #[test]
    fn zero_target_scans_nothing() {
        let level: LevelIndex<TreeStore> = mirrored();
        let scan = level.scan(&[0.0, 0.0], 0);
        assert!(scan.candidates.is_empty());
        assert_eq!(scan.visited, 0);
    }

    #[test]
    fn stores_agree() {
        let tree: LevelIndex<TreeStore> = mirrored();
        let sorted: LevelIndex<SortedStore> = tree.convert();
        for target in [1, 3, 7, 20] {
            assert_eq!(
                tree.scan(&[3.3, -6.1], target).candidates,
                sorted.scan(&[3.3, -6.1], target).candidates
            );
        }
    }
}
