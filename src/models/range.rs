use crate::models::{AddressFamily, Asn};
use std::fmt::{Display, Formatter};
use std::sync::Arc;

/// Stable handle of a [PrefixRange] inside its table's arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RangeId(pub(crate) usize);

/// How a range came to exist.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RangeStatus {
    /// Inserted from an announcement in a dump.
    Announced,
    /// Synthesized during deaggregation from the uncovered tail of a broader announcement.
    Remainder,
}

/// A contiguous block of addresses of one family attributed to an origin AS.
///
/// Freshly inserted ranges are CIDR blocks. After deaggregation a range may be any contiguous
/// span, and `text`/`prefix_len` then describe the announcement it was carved from.
#[derive(Debug, Clone, PartialEq)]
pub struct PrefixRange<A: AddressFamily> {
    pub start: A,
    pub end: A,
    pub size: A,
    pub origin: Asn,
    pub text: Option<Arc<str>>,
    pub prefix_len: Option<u8>,
    pub status: RangeStatus,
    pub removed: bool,
    pub(crate) prev: Option<RangeId>,
    pub(crate) next: Option<RangeId>,
}

impl<A: AddressFamily> PrefixRange<A> {
    pub(crate) fn new(start: A, size: A) -> Self {
        PrefixRange {
            start,
            end: start + (size - A::ONE),
            size,
            origin: Asn::UNKNOWN,
            text: None,
            prefix_len: None,
            status: RangeStatus::Announced,
            removed: false,
            prev: None,
            next: None,
        }
    }

    pub fn contains(&self, addr: A) -> bool {
        self.start <= addr && addr <= self.end
    }

    /// Numeric status code: 1 for announced, 2 for remainder, plus 10 once removed.
    pub fn status_code(&self) -> u8 {
        let code = match self.status {
            RangeStatus::Announced => 1,
            RangeStatus::Remainder => 2,
        };
        match self.removed {
            true => code + 10,
            false => code,
        }
    }

    pub fn prev(&self) -> Option<RangeId> {
        self.prev
    }

    pub fn next(&self) -> Option<RangeId> {
        self.next
    }
}

impl<A: AddressFamily> Display for PrefixRange<A> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} - {} AS{} ({})",
            self.start.to_ip_addr(),
            self.end.to_ip_addr(),
            self.origin,
            self.size
        )
    }
}
