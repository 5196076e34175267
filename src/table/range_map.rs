use crate::models::AddressFamily;
use std::cmp::Ordering;
use std::collections::btree_map::Entry;
use std::collections::BTreeMap;

/// Key of a range: its first address and its size.
///
/// Keys order by start ascending, then by size descending, so that a broader block sharing its
/// start with a narrower one sorts first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RangeKey<A> {
    pub start: A,
    pub size: A,
}

impl<A: AddressFamily> RangeKey<A> {
    pub fn new(start: A, size: A) -> Self {
        RangeKey { start, size }
    }

    pub fn end(&self) -> A {
        self.start + (self.size - A::ONE)
    }

    /// Largest possible key starting at `addr`. A zero size sorts after every real range with
    /// the same start, so a `..=` range up to this key includes all of them.
    fn upper_bound_from(addr: A) -> Self {
        RangeKey {
            start: addr,
            size: A::ZERO,
        }
    }
}

impl<A: Ord> Ord for RangeKey<A> {
    fn cmp(&self, other: &Self) -> Ordering {
        self.start
            .cmp(&other.start)
            .then_with(|| other.size.cmp(&self.size))
    }
}

impl<A: Ord> PartialOrd for RangeKey<A> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Ordered map of address ranges of one family.
///
/// Insertion never overwrites: an exact `(start, size)` duplicate leaves the stored value alone.
/// Point queries assume the stored ranges are disjoint, which holds once the owning table has
/// been deaggregated.
#[derive(Debug, Clone)]
pub struct RangeMap<A, V> {
    map: BTreeMap<RangeKey<A>, V>,
}

impl<A, V> Default for RangeMap<A, V> {
    fn default() -> Self {
        RangeMap {
            map: BTreeMap::new(),
        }
    }
}

impl<A: AddressFamily, V> RangeMap<A, V> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert the value built by `value` unless `key` is already present.
    ///
    /// Returns the stored value and whether it was inserted by this call.
    pub fn insert_if_absent(&mut self, key: RangeKey<A>, value: impl FnOnce() -> V) -> (&V, bool) {
        match self.map.entry(key) {
            Entry::Occupied(entry) => (&*entry.into_mut(), false),
            Entry::Vacant(entry) => (&*entry.insert(value()), true),
        }
    }

    pub fn remove(&mut self, key: &RangeKey<A>) -> Option<V> {
        self.map.remove(key)
    }

    /// Find the range containing `addr`.
    ///
    /// Takes the last range starting at or before `addr` and checks that it reaches `addr`.
    pub fn find_covering(&self, addr: A) -> Option<(&RangeKey<A>, &V)> {
        self.map
            .range(..=RangeKey::upper_bound_from(addr))
            .next_back()
            .filter(|(key, _)| addr <= key.end())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&RangeKey<A>, &V)> {
        self.map.iter()
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }
}
