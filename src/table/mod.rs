//! Per-family range storage: the ordered range map, the prefix table built on it, and the
//! deaggregation pass that makes the table a disjoint partition.

mod deaggregate;
mod prefix_table;
mod range_map;

pub use deaggregate::*;
pub use prefix_table::*;
pub use range_map::*;
