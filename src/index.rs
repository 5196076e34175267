/*!
The origin index: both per-family prefix tables, built from routing table dumps and normalized
into disjoint partitions before they are queried.

Building and querying are separate types. An [OriginIndexBuilder] ingests dump sources in order;
[OriginIndexBuilder::finish] deaggregates both tables and freezes them into an [OriginIndex],
which only answers lookups.

```no_run
use bgpkit_originas::OriginIndex;
use std::net::IpAddr;

let mut builder = OriginIndex::builder();
builder.load_dump("bgp4.txt.gz").unwrap();
let index = builder.finish(true);
let addr: IpAddr = "10.1.5.5".parse().unwrap();
if let Some(found) = index.lookup(addr) {
    println!("{} AS{}", addr, found.origin);
}
```
*/
use crate::error::OriginAsError;
use crate::io::get_reader;
use crate::models::{AddressFamily, Asn, NetworkPrefix, PrefixRange};
use crate::parser::{AsPathInterner, DumpParser};
use crate::table::PrefixTable;
use ipnet::IpNet;
use log::{debug, info, trace};
use std::io::{self, BufRead, Write};
use std::net::IpAddr;
use std::str::FromStr;

/// Per-source ingestion counters.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct BuildStats {
    /// Lines read from the source.
    pub lines: usize,
    /// Selected routes the dump parser produced.
    pub accepted: usize,
    /// Routes that created a new range.
    pub inserted: usize,
    /// Routes for a block that was already present; the first origin stands.
    pub duplicates: usize,
    /// Routes whose network could not be parsed.
    pub skipped: usize,
    /// Routes whose path yielded no AS numbers.
    pub no_path: usize,
    /// Routes for a network starting at address zero.
    pub default_routes: usize,
}

impl BuildStats {
    fn count(&mut self, outcome: RouteOutcome) {
        match outcome {
            RouteOutcome::Inserted => self.inserted += 1,
            RouteOutcome::Duplicate => self.duplicates += 1,
            RouteOutcome::NoPath => self.no_path += 1,
            RouteOutcome::DefaultRoute => self.default_routes += 1,
            RouteOutcome::Skipped => self.skipped += 1,
        }
    }
}

/// What happened to a single route handed to [OriginIndexBuilder::add_route].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteOutcome {
    Inserted,
    Duplicate,
    NoPath,
    DefaultRoute,
    Skipped,
}

/// A parsed route waiting to be applied to its family's table.
#[derive(Debug, Clone, Copy)]
struct PendingRoute {
    network: NetworkPrefix,
    origin: Asn,
}

#[derive(Debug, Default)]
pub struct OriginIndexBuilder {
    interner: AsPathInterner,
    ipv4: PrefixTable<u32>,
    ipv6: PrefixTable<u128>,
}

impl OriginIndexBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Ingest a dump file; `.gz` files are decompressed on the fly.
    ///
    /// Nothing from the source is applied unless it was read completely.
    pub fn load_dump(&mut self, path: &str) -> Result<BuildStats, OriginAsError> {
        let reader = get_reader(path)?;
        let stats = self
            .load_dump_reader(reader)
            .map_err(|e| OriginAsError::read_failed(path, e))?;
        info!(
            "{}: {} lines, {} routes accepted, {} inserted, {} duplicates, {} skipped, {} without path, {} default routes",
            path,
            stats.lines,
            stats.accepted,
            stats.inserted,
            stats.duplicates,
            stats.skipped,
            stats.no_path,
            stats.default_routes
        );
        Ok(stats)
    }

    /// Ingest a dump from any reader. Routes are parsed as they are read but only applied once
    /// the reader is exhausted, so a read error leaves the tables untouched.
    pub fn load_dump_reader<R: BufRead>(&mut self, reader: R) -> io::Result<BuildStats> {
        let mut parser = DumpParser::new(reader);
        let mut stats = BuildStats::default();
        let mut pending = vec![];
        while let Some(route) = parser.next_route()? {
            stats.accepted += 1;
            match self.prepare_route(&route.prefix, &route.path) {
                Ok(route) => pending.push(route),
                Err(outcome) => stats.count(outcome),
            }
        }
        stats.lines = parser.stats().lines;

        for route in pending {
            let outcome = self.apply_route(route);
            stats.count(outcome);
        }
        Ok(stats)
    }

    /// Record one selected route: network text as printed in a dump and its AS path text.
    pub fn add_route(&mut self, prefix: &str, path: &str) -> RouteOutcome {
        match self.prepare_route(prefix, path) {
            Ok(route) => self.apply_route(route),
            Err(outcome) => outcome,
        }
    }

    /// Parse a route down to what the tables need. Routes that can never be inserted come back
    /// as their final outcome.
    fn prepare_route(&mut self, prefix: &str, path: &str) -> Result<PendingRoute, RouteOutcome> {
        let network = match NetworkPrefix::from_str(prefix) {
            Ok(network) => network,
            Err(e) => {
                debug!("skipping route: {}", e);
                return Err(RouteOutcome::Skipped);
            }
        };
        if network.is_default() {
            debug!("ignoring default route {}", prefix);
            return Err(RouteOutcome::DefaultRoute);
        }

        let as_path = self.interner.intern(path);
        if as_path.is_empty() {
            debug!("skipping {}: no AS numbers in path \"{}\"", network, as_path);
            return Err(RouteOutcome::NoPath);
        }
        Ok(PendingRoute {
            network,
            origin: as_path.origin(),
        })
    }

    fn apply_route(&mut self, route: PendingRoute) -> RouteOutcome {
        let PendingRoute { network, origin } = route;
        let inserted = match network.prefix {
            IpNet::V4(net) => {
                self.ipv4
                    .announce(u32::from(net.network()), net.prefix_len(), origin)
            }
            IpNet::V6(net) => {
                self.ipv6
                    .announce(u128::from(net.network()), net.prefix_len(), origin)
            }
        };
        match inserted {
            Some(true) => RouteOutcome::Inserted,
            Some(false) => {
                trace!("{} already announced, ignoring AS{}", network, origin);
                RouteOutcome::Duplicate
            }
            None => RouteOutcome::Skipped,
        }
    }

    /// Number of distinct AS path texts seen so far.
    pub fn paths(&self) -> usize {
        self.interner.len()
    }

    /// Deaggregate both families and freeze the result. With `coalesce` adjacent ranges of the
    /// same origin are merged.
    pub fn finish(mut self, coalesce: bool) -> OriginIndex {
        info!("{} distinct AS paths", self.interner.len());
        normalize(&mut self.ipv4, coalesce);
        normalize(&mut self.ipv6, coalesce);
        OriginIndex {
            ipv4: self.ipv4,
            ipv6: self.ipv6,
        }
    }
}

fn normalize<A: AddressFamily>(table: &mut PrefixTable<A>, coalesce: bool) {
    let stats = table.deaggregate(coalesce);
    info!(
        "{}: {} ranges before, {} after ({} truncated, {} removed, {} remainders, {} collisions, {} merged)",
        A::AFI,
        stats.before,
        stats.after,
        stats.truncated,
        stats.removed,
        stats.remainders,
        stats.collisions,
        stats.merged
    );
}

/// An address lookup result.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OriginMatch<'a> {
    pub origin: Asn,
    /// The announced block the covering range was carved from, e.g. `10.0.0.0/8`.
    pub prefix: Option<&'a str>,
}

impl<'a, A: AddressFamily> From<&'a PrefixRange<A>> for OriginMatch<'a> {
    fn from(range: &'a PrefixRange<A>) -> Self {
        OriginMatch {
            origin: range.origin,
            prefix: range.text.as_deref(),
        }
    }
}

/// Deaggregated, read-only prefix tables of both families.
#[derive(Debug, Clone)]
pub struct OriginIndex {
    ipv4: PrefixTable<u32>,
    ipv6: PrefixTable<u128>,
}

impl OriginIndex {
    pub fn builder() -> OriginIndexBuilder {
        OriginIndexBuilder::new()
    }

    /// Build from dump files in order, stopping at the first one that cannot be read.
    pub fn from_dumps<P: AsRef<str>>(paths: &[P], coalesce: bool) -> Result<Self, OriginAsError> {
        let mut builder = OriginIndexBuilder::new();
        for path in paths {
            builder.load_dump(path.as_ref())?;
        }
        Ok(builder.finish(coalesce))
    }

    /// The range covering `addr`, if any.
    pub fn lookup(&self, addr: IpAddr) -> Option<OriginMatch<'_>> {
        match addr {
            IpAddr::V4(addr) => self.ipv4.find_covering(u32::from(addr)).map(Into::into),
            IpAddr::V6(addr) => self.ipv6.find_covering(u128::from(addr)).map(Into::into),
        }
    }

    pub fn ipv4(&self) -> &PrefixTable<u32> {
        &self.ipv4
    }

    pub fn ipv6(&self) -> &PrefixTable<u128> {
        &self.ipv6
    }

    /// Total number of ranges over both families.
    pub fn len(&self) -> usize {
        self.ipv4.len() + self.ipv6.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ipv4.is_empty() && self.ipv6.is_empty()
    }

    /// Write every range, IPv4 first, one `<start> - <end> AS<origin> (<size>)` line each.
    pub fn write_ranges<W: Write>(&self, writer: &mut W) -> io::Result<()> {
        for range in self.ipv4.iter() {
            writeln!(writer, "{}", range)?;
        }
        for range in self.ipv6.iter() {
            writeln!(writer, "{}", range)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{BufReader, Cursor, Read};

    struct BrokenSource;

    impl Read for BrokenSource {
        fn read(&mut self, _buf: &mut [u8]) -> io::Result<usize> {
            Err(io::Error::new(io::ErrorKind::UnexpectedEof, "truncated dump"))
        }
    }

    fn route_line(network: &str, path: &str) -> String {
        format!(
            "*> {:<17}{:<20}{:>20} {}\n",
            network, "192.0.2.1", "0", path
        )
    }

    fn addr(s: &str) -> IpAddr {
        s.parse().unwrap()
    }

    #[test]
    fn test_add_route_outcomes() {
        let mut builder = OriginIndexBuilder::new();
        assert_eq!(
            builder.add_route("10.0.0.0/8", "65001 65003"),
            RouteOutcome::Inserted
        );
        assert_eq!(
            builder.add_route("10.0.0.0/8", "65009 65010"),
            RouteOutcome::Duplicate
        );
        assert_eq!(builder.add_route("0.0.0.0", "65001"), RouteOutcome::DefaultRoute);
        assert_eq!(builder.add_route("::/0", "65001"), RouteOutcome::DefaultRoute);
        assert_eq!(builder.add_route("Network", "Path"), RouteOutcome::Skipped);
        assert_eq!(builder.add_route("10.2.0.0/16", "{65001}"), RouteOutcome::NoPath);
        assert_eq!(builder.paths(), 3);

        let index = builder.finish(false);
        assert_eq!(index.lookup(addr("10.9.9.9")).unwrap().origin, 65003);
        assert_eq!(index.len(), 1);
    }

    #[test]
    fn test_end_to_end_split() {
        let dump = [
            route_line("10.0.0.0/8", "65001 65002 65003 i"),
            route_line("10.1.0.0/16", "65001 65004 i"),
        ]
        .concat();
        let mut builder = OriginIndex::builder();
        let stats = builder.load_dump_reader(Cursor::new(dump)).unwrap();
        assert_eq!(stats.accepted, 2);
        assert_eq!(stats.inserted, 2);

        let index = builder.finish(false);
        let ranges = index
            .ipv4()
            .iter()
            .map(|r| (r.start, r.end, r.origin.to_u32()))
            .collect::<Vec<_>>();
        assert_eq!(
            ranges,
            vec![
                (0x0a00_0000, 0x0a00_ffff, 65003),
                (0x0a01_0000, 0x0a01_ffff, 65004),
                (0x0a02_0000, 0x0aff_ffff, 65003),
            ]
        );

        let found = index.lookup(addr("10.1.5.5")).unwrap();
        assert_eq!(found.origin, 65004);
        assert_eq!(found.prefix, Some("10.1.0.0/16"));
        assert_eq!(
            index.lookup(addr("10.200.0.1")).unwrap().prefix,
            Some("10.0.0.0/8")
        );
        assert!(index.lookup(addr("11.0.0.1")).is_none());
    }

    #[test]
    fn test_read_error_applies_nothing() {
        let dump = [
            route_line("10.0.0.0/8", "65001 65003 i"),
            route_line("10.1.0.0/16", "65001 65004 i"),
        ]
        .concat();
        let mut builder = OriginIndex::builder();
        let reader = BufReader::new(Cursor::new(dump).chain(BrokenSource));
        let err = builder.load_dump_reader(reader).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::UnexpectedEof);

        let index = builder.finish(false);
        assert!(index.is_empty());
        assert!(index.lookup(addr("10.1.5.5")).is_none());
    }

    #[test]
    fn test_routes_at_top_of_space() {
        let dump = [
            route_line("240.0.0.0/4", "65001 7 i"),
            route_line("255.255.255.0/24", "65001 8 i"),
        ]
        .concat();
        let mut builder = OriginIndex::builder();
        let stats = builder.load_dump_reader(Cursor::new(dump)).unwrap();
        assert_eq!(stats.inserted, 2);
        assert_eq!(builder.add_route("8000::/1", "9"), RouteOutcome::Inserted);
        assert_eq!(builder.add_route("ffff::/16", "10"), RouteOutcome::Inserted);

        let index = builder.finish(true);
        let found = index.lookup(addr("255.255.255.255")).unwrap();
        assert_eq!(found.origin, 8);
        assert_eq!(found.prefix, Some("255.255.255.0/24"));
        assert_eq!(index.lookup(addr("255.255.254.255")).unwrap().origin, 7);
        assert_eq!(index.ipv4().iter().last().unwrap().end, u32::MAX);

        let found = index
            .lookup(addr("ffff:ffff:ffff:ffff:ffff:ffff:ffff:ffff"))
            .unwrap();
        assert_eq!(found.origin, 10);
        assert_eq!(found.prefix, Some("ffff::/16"));
        assert_eq!(index.lookup(addr("fffe::1")).unwrap().origin, 9);
        assert_eq!(index.ipv6().iter().last().unwrap().end, u128::MAX);
    }

    #[test]
    fn test_families_are_separate() {
        let mut builder = OriginIndexBuilder::new();
        builder.add_route("2001:db8::/32", "65001 65005");
        builder.add_route("32.1.13.184/29", "65001 65006");
        let index = builder.finish(true);

        assert_eq!(index.lookup(addr("2001:db8::1")).unwrap().origin, 65005);
        assert_eq!(index.lookup(addr("32.1.13.185")).unwrap().origin, 65006);
        assert!(index.lookup(addr("2001:db9::1")).is_none());
        assert_eq!(index.ipv4().len(), 1);
        assert_eq!(index.ipv6().len(), 1);
    }

    #[test]
    fn test_classful_default_text() {
        let mut builder = OriginIndexBuilder::new();
        builder.add_route("172.16.0.0", "65001 64512");
        let index = builder.finish(false);
        let found = index.lookup(addr("172.16.200.1")).unwrap();
        assert_eq!(found.prefix, Some("172.16.0.0/16"));
        assert_eq!(found.origin, 64512);
    }

    #[test]
    fn test_write_ranges() {
        let mut builder = OriginIndexBuilder::new();
        builder.add_route("2001:db8::/32", "65005");
        builder.add_route("10.0.0.0/8", "65001 65003");
        let index = builder.finish(true);

        let mut out = vec![];
        index.write_ranges(&mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        let lines = text.lines().collect::<Vec<_>>();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0], index.ipv4().iter().next().unwrap().to_string());
        assert!(lines[0].contains("AS65003"));
        assert!(lines[1].contains("AS65005"));
    }
}
