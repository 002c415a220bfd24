//! Per-direction projection stores.
//!
//! Each simple keeps the projections of every inserted point onto its
//! direction, ordered by value (ties by id). A query anchors at its own
//! projection and walks outwards in both directions, so a store only needs
//! ordered insert plus two ordered walks from a key.
//!
//! | Store | Insert | Walk | Use |
//! |-------|--------|------|-----|
//! | [`TreeStore`] | O(log n) | pointer chasing | default, growing indexes |
//! | [`SortedStore`] | O(n) shift | contiguous | small or read-heavy indexes |
//!
//! The two are interchangeable; [`crate::dci::DciIndex::cvt`] migrates an
//! index between them without changing results.

use std::cmp::Ordering;
use std::collections::BTreeSet;
use std::fmt::Debug;

/// One projection value and the id of the point it came from.
#[derive(Debug, Clone, Copy)]
pub struct ProjectionEntry {
    pub value: f32,
    pub id: u32,
}

impl ProjectionEntry {
    pub fn new(value: f32, id: u32) -> Self {
        Self { value, id }
    }

    /// Smallest entry whose value equals `key`; the split point of [`ProjectionStore::locate`].
    fn probe(key: f32) -> Self {
        Self { value: key, id: 0 }
    }
}

impl PartialEq for ProjectionEntry {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for ProjectionEntry {}

impl PartialOrd for ProjectionEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for ProjectionEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        // total_cmp gives a total order even for NaN projections.
        self.value
            .total_cmp(&other.value)
            .then_with(|| self.id.cmp(&other.id))
    }
}

/// Ordered storage for one direction's projections.
///
/// `locate(key)` splits the entries at `(key, id = 0)`: `below` walks the
/// entries strictly smaller, nearest first; `above` walks the rest, nearest
/// first. Each `next()` is one expansion step.
pub trait ProjectionStore: Debug + Default + Clone + Send + Sync {
    /// Descending walk from the split point.
    type Below<'a>: Iterator<Item = ProjectionEntry> + 'a
    where
        Self: 'a;

    /// Ascending walk from the split point.
    type Above<'a>: Iterator<Item = ProjectionEntry> + 'a
    where
        Self: 'a;

    /// Human-readable name of the representation.
    const KIND: &'static str;

    /// Build from entries already in ascending order.
    fn from_sorted(entries: Vec<ProjectionEntry>) -> Self;

    /// Insert one entry, keeping the order.
    fn insert(&mut self, entry: ProjectionEntry);

    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Split at `key` and return the two outward walks.
    fn locate(&self, key: f32) -> (Self::Below<'_>, Self::Above<'_>);

    /// Every entry in ascending order.
    fn ascending(&self) -> Self::Above<'_>;

    /// Approximate heap footprint in bytes.
    fn size_bytes(&self) -> usize {
        self.len() * std::mem::size_of::<ProjectionEntry>()
    }
}

/// Balanced-tree store (`BTreeSet`). Logarithmic insert.
#[derive(Debug, Clone, Default)]
pub struct TreeStore {
    entries: BTreeSet<ProjectionEntry>,
}

impl ProjectionStore for TreeStore {
    type Below<'a> = std::iter::Copied<std::iter::Rev<std::collections::btree_set::Range<'a, ProjectionEntry>>>;
    type Above<'a> = std::iter::Copied<std::collections::btree_set::Range<'a, ProjectionEntry>>;

    const KIND: &'static str = "btree";

    fn from_sorted(entries: Vec<ProjectionEntry>) -> Self {
        Self {
            entries: entries.into_iter().collect(),
        }
    }

    fn insert(&mut self, entry: ProjectionEntry) {
        let fresh = self.entries.insert(entry);
        debug_assert!(fresh, "duplicate projection entry for id {}", entry.id);
    }

    fn len(&self) -> usize {
        self.entries.len()
    }

    fn locate(&self, key: f32) -> (Self::Below<'_>, Self::Above<'_>) {
        let probe = ProjectionEntry::probe(key);
        (
            self.entries.range(..probe).rev().copied(),
            self.entries.range(probe..).copied(),
        )
    }

    fn ascending(&self) -> Self::Above<'_> {
        self.entries.range(..).copied()
    }

    fn size_bytes(&self) -> usize {
        // B-tree nodes carry roughly a pointer of overhead per entry.
        self.entries.len()
            * (std::mem::size_of::<ProjectionEntry>() + std::mem::size_of::<usize>())
    }
}

/// Sorted-array store. Linear insert, contiguous scans.
#[derive(Debug, Clone, Default)]
pub struct SortedStore {
    entries: Vec<ProjectionEntry>,
}

impl ProjectionStore for SortedStore {
    type Below<'a> = std::iter::Copied<std::iter::Rev<std::slice::Iter<'a, ProjectionEntry>>>;
    type Above<'a> = std::iter::Copied<std::slice::Iter<'a, ProjectionEntry>>;

    const KIND: &'static str = "sorted-vec";

    fn from_sorted(entries: Vec<ProjectionEntry>) -> Self {
        debug_assert!(entries.windows(2).all(|w| w[0] < w[1]));
        Self { entries }
    }

    fn insert(&mut self, entry: ProjectionEntry) {
        let pos = self.entries.partition_point(|e| *e < entry);
        self.entries.insert(pos, entry);
    }

    fn len(&self) -> usize {
        self.entries.len()
    }

    fn locate(&self, key: f32) -> (Self::Below<'_>, Self::Above<'_>) {
        let probe = ProjectionEntry::probe(key);
        let split = self.entries.partition_point(|e| *e < probe);
        let (below, above) = self.entries.split_at(split);
        (below.iter().rev().copied(), above.iter().copied())
    }

    fn ascending(&self) -> Self::Above<'_> {
        self.entries.iter().copied()
    }

    fn size_bytes(&self) -> usize {
        self.entries.capacity() * std::mem::size_of::<ProjectionEntry>()
    }
}
