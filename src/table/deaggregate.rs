/*!
Deaggregation turns the overlapping announcements of a [PrefixTable] into a disjoint partition.

A single forward scan over the ranges in `(start ascending, size descending)` order compares each
range `a` with its successor `b`:

- `a` ends before `b` starts: nothing to do.
- `a` starts before `b`: `a` keeps only its leading part up to `b.start - 1`.
- `a` and `b` share a start: `b` is narrower and takes the shared region, `a` is dropped.

In both overlap cases a part of `a` extending beyond `b` becomes a new remainder range with `a`'s
origin, spliced back into sorted position after `b` where the scan will meet it again. The more
specific announcement therefore always wins the addresses it covers.

An optional second pass merges neighbours that touch and share an origin.
*/
use crate::models::{AddressFamily, RangeId, RangeStatus};
use crate::table::PrefixTable;
use log::trace;

/// Counters of one deaggregation run.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct DeaggregateStats {
    /// Live ranges before the run.
    pub before: usize,
    /// Ranges cut back to their exclusive leading part.
    pub truncated: usize,
    /// Ranges dropped because a narrower range shares their start.
    pub removed: usize,
    /// Remainder ranges created.
    pub remainders: usize,
    /// Remainders not created because an identical range already existed.
    pub collisions: usize,
    /// Neighbours merged by coalescing.
    pub merged: usize,
    /// Live ranges after the run.
    pub after: usize,
}

impl<A: AddressFamily> PrefixTable<A> {
    /// Resolve overlaps into a disjoint cover, then merge adjacent ranges with equal origins if
    /// `coalesce` is set.
    pub fn deaggregate(&mut self, coalesce: bool) -> DeaggregateStats {
        let mut stats = DeaggregateStats {
            before: self.len(),
            ..Default::default()
        };
        self.link();
        self.split_overlaps(&mut stats);
        if coalesce {
            self.coalesce(&mut stats);
        }
        stats.after = self.len();
        stats
    }

    fn split_overlaps(&mut self, stats: &mut DeaggregateStats) {
        let mut cursor = self.head();
        while let Some(a) = cursor {
            if let Some(b) = self.get(a).next() {
                let (a_start, a_end) = (self.get(a).start, self.get(a).end);
                let (b_start, b_end) = (self.get(b).start, self.get(b).end);

                if a_end >= b_start {
                    if a_start < b_start {
                        self.set_end(a, b_start - A::ONE);
                        stats.truncated += 1;
                    } else {
                        self.remove(a);
                        stats.removed += 1;
                    }
                    if a_end > b_end {
                        self.insert_remainder(a, b, b_end + A::ONE, a_end, stats);
                    }
                }
            }
            cursor = self.get(a).next();
        }
    }

    /// Create the remainder `[start, end]` of `parent`, placed after `after` in the list.
    fn insert_remainder(
        &mut self,
        parent: RangeId,
        after: RangeId,
        start: A,
        end: A,
        stats: &mut DeaggregateStats,
    ) {
        let size = end - start + A::ONE;
        let (id, inserted) = self.insert_if_absent(start, size);
        if !inserted {
            trace!(
                "remainder {} - {} already present",
                start.to_ip_addr(),
                end.to_ip_addr()
            );
            stats.collisions += 1;
            return;
        }

        let (origin, text, prefix_len) = {
            let p = self.get(parent);
            (p.origin, p.text.clone(), p.prefix_len)
        };
        let remainder = self.get_mut(id);
        remainder.origin = origin;
        remainder.text = text;
        remainder.prefix_len = prefix_len;
        remainder.status = RangeStatus::Remainder;

        self.splice_from(id, after);
        stats.remainders += 1;
    }

    fn coalesce(&mut self, stats: &mut DeaggregateStats) {
        let mut cursor = self.head();
        while let Some(a) = cursor {
            let Some(b) = self.get(a).next() else {
                break;
            };
            let (ra, rb) = (self.get(a), self.get(b));
            let touching = ra.end < rb.start && rb.start - ra.end == A::ONE;
            if touching && ra.origin == rb.origin {
                let end = rb.end;
                self.remove(b);
                self.set_end(a, end);
                stats.merged += 1;
            } else {
                cursor = Some(b);
            }
        }
    }
}
