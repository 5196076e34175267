/*!
Text input readers: the routing table dump parser, the AS path interner that canonicalizes the
paths it yields, and the AS name directory.
*/
mod asnames;
mod aspath;
mod dump;

pub use asnames::AsNameDirectory;
pub use aspath::AsPathInterner;
pub use dump::{DumpParser, DumpRoute, DumpState, DumpStats};
