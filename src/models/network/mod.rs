//! Common network-related structs.

mod address;
mod afi;
mod asn;
mod prefix;

pub use address::*;
pub use afi::*;
pub use asn::*;
pub use prefix::*;
