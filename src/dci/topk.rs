//! Scored ids and a bounded top-k heap.

use std::cmp::Ordering;
use std::collections::BinaryHeap;

/// A score paired with a point id.
///
/// Ordered by score (IEEE total order), then id, so every set of `ProjId`s
/// sorts the same way regardless of arrival order.
#[derive(Debug, Clone, Copy)]
pub struct ProjId {
    score: f32,
    id: u32,
}

impl ProjId {
    pub fn new(score: f32, id: u32) -> Self {
        Self { score, id }
    }

    pub fn score(&self) -> f32 {
        self.score
    }

    pub fn id(&self) -> u32 {
        self.id
    }
}

impl PartialEq for ProjId {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for ProjId {}

impl PartialOrd for ProjId {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for ProjId {
    fn cmp(&self, other: &Self) -> Ordering {
        self.score
            .total_cmp(&other.score)
            .then_with(|| self.id.cmp(&other.id))
    }
}

/// Keeps the `k` smallest [`ProjId`]s pushed into it.
///
/// A max-heap capped at `k`: once full, anything larger than the current
/// maximum is rejected, otherwise the maximum is evicted.
#[derive(Debug, Clone)]
pub struct BoundedTopK {
    k: usize,
    heap: BinaryHeap<ProjId>,
}

impl BoundedTopK {
    pub fn new(k: usize) -> Self {
        Self {
            k,
            // k may be huge (k >= n queries); don't reserve past a sane bound.
            heap: BinaryHeap::with_capacity(k.min(1024) + 1),
        }
    }

    pub fn capacity(&self) -> usize {
        self.k
    }

    pub fn len(&self) -> usize {
        self.heap.len()
    }

    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }

    /// Current k-th best score, once the heap is full.
    pub fn threshold(&self) -> Option<f32> {
        if self.heap.len() == self.k {
            self.heap.peek().map(ProjId::score)
        } else {
            None
        }
    }

    pub fn push(&mut self, item: ProjId) {
        if self.k == 0 {
            return;
        }
        if self.heap.len() == self.k {
            match self.heap.peek() {
                Some(top) if item < *top => {
                    self.heap.pop();
                }
                _ => return,
            }
        }
        self.heap.push(item);
    }

    /// Fold another heap into this one.
    #[must_use]
    pub fn merge(mut self, other: BoundedTopK) -> BoundedTopK {
        let (mut big, small) = if self.heap.len() >= other.heap.len() {
            (std::mem::take(&mut self.heap), other.heap)
        } else {
            (other.heap, std::mem::take(&mut self.heap))
        };
        let k = self.k;
        for item in small {
            if big.len() < k {
                big.push(item);
            } else if big.peek().is_some_and(|top| item < *top) {
                big.pop();
                big.push(item);
            }
        }
        BoundedTopK { k, heap: big }
    }

    /// Drain into ascending order.
    pub fn into_sorted_vec(self) -> Vec<ProjId> {
        self.heap.into_sorted_vec()
    }
}

impl Extend<ProjId> for BoundedTopK {
    fn extend<I: IntoIterator<Item = ProjId>>(&mut self, iter: I) {
        for item in iter {
            self.push(item);
        }
    }
}
