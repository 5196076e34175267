use crate::models::{AddressFamily, Asn, PrefixRange, RangeId};
use crate::table::{RangeKey, RangeMap};
use std::sync::Arc;

/// All announced ranges of one address family.
///
/// Ranges live in an arena and are addressed by [RangeId]; the ordered [RangeMap] indexes the
/// live ones by `(start, size)`. During deaggregation the live ranges are additionally threaded
/// through a doubly linked list (by id) in map order. Removed ranges stay in the arena, flagged,
/// so ids held during a pass never dangle.
#[derive(Debug, Clone)]
pub struct PrefixTable<A: AddressFamily> {
    ranges: Vec<PrefixRange<A>>,
    index: RangeMap<A, RangeId>,
    head: Option<RangeId>,
}

impl<A: AddressFamily> Default for PrefixTable<A> {
    fn default() -> Self {
        PrefixTable {
            ranges: vec![],
            index: RangeMap::new(),
            head: None,
        }
    }
}

impl<A: AddressFamily> PrefixTable<A> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of live ranges.
    pub fn len(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    pub fn get(&self, id: RangeId) -> &PrefixRange<A> {
        &self.ranges[id.0]
    }

    /// Insert the range `[start, start + size - 1]` unless a range with the same start and size
    /// exists. Returns the id of the stored range and whether this call created it; an existing
    /// range is returned untouched.
    pub fn insert_if_absent(&mut self, start: A, size: A) -> (RangeId, bool) {
        let ranges = &mut self.ranges;
        let (id, inserted) = self.index.insert_if_absent(RangeKey::new(start, size), || {
            ranges.push(PrefixRange::new(start, size));
            RangeId(ranges.len() - 1)
        });
        (*id, inserted)
    }

    /// Record an announcement of the CIDR block `start/prefix_len` originated by `origin`.
    ///
    /// The first announcement of a block wins: a repeat leaves origin and text of the stored
    /// range as they are and returns `false`.
    pub fn announce(&mut self, start: A, prefix_len: u8, origin: Asn) -> Option<bool> {
        let size = A::block_size(prefix_len)?;
        let (id, inserted) = self.insert_if_absent(start, size);
        if inserted {
            let range = &mut self.ranges[id.0];
            range.origin = origin;
            range.prefix_len = Some(prefix_len);
            range.text = Some(Arc::from(format!(
                "{}/{}",
                start.to_ip_addr(),
                prefix_len
            )));
        }
        Some(inserted)
    }

    /// Set the origin of a range. Meant for ranges just created by [Self::insert_if_absent].
    pub fn set_origin(&mut self, id: RangeId, origin: Asn) {
        self.ranges[id.0].origin = origin;
    }

    /// The live range containing `addr`. Only meaningful once the table has been deaggregated.
    pub fn find_covering(&self, addr: A) -> Option<&PrefixRange<A>> {
        self.index
            .find_covering(addr)
            .map(|(_, id)| &self.ranges[id.0])
    }

    /// Live ranges in `(start ascending, size descending)` order.
    pub fn iter(&self) -> impl Iterator<Item = &PrefixRange<A>> {
        self.index.iter().map(|(_, id)| &self.ranges[id.0])
    }

    /// Ranges in linked-list order. Empty until the table has been linked by a deaggregation
    /// pass.
    pub fn linked(&self) -> LinkedRanges<'_, A> {
        LinkedRanges {
            table: self,
            cursor: self.head,
        }
    }

    pub(crate) fn head(&self) -> Option<RangeId> {
        self.head
    }

    pub(crate) fn key_of(&self, id: RangeId) -> RangeKey<A> {
        let range = &self.ranges[id.0];
        RangeKey::new(range.start, range.size)
    }

    pub(crate) fn get_mut(&mut self, id: RangeId) -> &mut PrefixRange<A> {
        &mut self.ranges[id.0]
    }

    /// Thread all live ranges into the linked list following map order.
    pub(crate) fn link(&mut self) {
        let order = self.index.iter().map(|(_, id)| *id).collect::<Vec<_>>();
        self.head = order.first().copied();
        for (i, id) in order.iter().enumerate() {
            let range = &mut self.ranges[id.0];
            range.prev = i.checked_sub(1).map(|p| order[p]);
            range.next = order.get(i + 1).copied();
        }
    }

    /// Move the end of a range, keeping its start, and re-key it in the map.
    pub(crate) fn set_end(&mut self, id: RangeId, end: A) {
        let old_key = self.key_of(id);
        self.index.remove(&old_key);
        let range = &mut self.ranges[id.0];
        range.end = end;
        range.size = end - range.start + A::ONE;
        let new_key = self.key_of(id);
        let (_, inserted) = self.index.insert_if_absent(new_key, || id);
        debug_assert!(inserted, "re-keyed range collides with a live range");
    }

    /// Drop a range from the map and the list.
    ///
    /// The removed range keeps its own `next` pointer so a forward scan can step past it.
    pub(crate) fn remove(&mut self, id: RangeId) {
        let key = self.key_of(id);
        self.index.remove(&key);

        let (prev, next) = {
            let range = &mut self.ranges[id.0];
            range.removed = true;
            (range.prev, range.next)
        };
        match prev {
            Some(p) => self.ranges[p.0].next = next,
            None => self.head = next,
        }
        if let Some(n) = next {
            self.ranges[n.0].prev = prev;
        }
    }

    /// Link `id` into the list at its sorted position, searching forward from `from`.
    pub(crate) fn splice_from(&mut self, id: RangeId, from: RangeId) {
        let key = self.key_of(id);
        let mut prev = self.ranges[from.0].prev;
        let mut next = Some(from);
        while let Some(n) = next {
            if self.key_of(n) >= key {
                break;
            }
            prev = Some(n);
            next = self.ranges[n.0].next;
        }

        let range = &mut self.ranges[id.0];
        range.prev = prev;
        range.next = next;
        match prev {
            Some(p) => self.ranges[p.0].next = Some(id),
            None => self.head = Some(id),
        }
        if let Some(n) = next {
            self.ranges[n.0].prev = Some(id);
        }
    }
}

/// Iterator following the linked list of a [PrefixTable].
pub struct LinkedRanges<'a, A: AddressFamily> {
    table: &'a PrefixTable<A>,
    cursor: Option<RangeId>,
}

impl<'a, A: AddressFamily> Iterator for LinkedRanges<'a, A> {
    type Item = &'a PrefixRange<A>;

    fn next(&mut self) -> Option<Self::Item> {
        let range = self.table.get(self.cursor?);
        self.cursor = range.next;
        Some(range)
    }
}
