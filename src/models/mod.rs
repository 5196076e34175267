/*!
Data types shared by the table, parser and annotation modules.
*/
mod aspath;
mod network;
mod range;

pub use aspath::*;
pub use network::*;
pub use range::*;
