/*!
Reader for fixed-column "show ip bgp" style routing table dumps.

A route line looks like

```text
*> 10.0.0.0/8       192.0.2.1                0             0 65001 65002 65003 i
```

with the best-path marker in column 1, the network at column 3 and the AS path at column 61.
Networks wider than the column push the rest of the line to the right. IPv6 routes usually wrap:
the next hop and the path move to one or two continuation lines. Lines of a multipath group after
the first leave the network blank, meaning "same as above".
*/
use crate::io::read_line;
use log::debug;
use std::io::{self, BufRead};

const SELECTED_COLUMN: usize = 1;
const NETWORK_COLUMN: usize = 3;
/// Last column of the nominal network field; a non-blank here means the network overflowed.
const NETWORK_LIMIT_COLUMN: usize = 19;
const PATH_COLUMN: usize = 61;
/// An IPv6 line with less than this after the network wraps its path onto following lines.
const MIN_IPV6_TAIL: usize = 35;
/// A continuation line shorter than this only holds the next hop; the path is on the next one.
const MIN_IPV6_CONTINUATION: usize = 60;

const HEADER_COMMAND: &[u8] = b"show";
const HEADER_LAST_LINE: &[u8] = b"Prf";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DumpState {
    /// Looking at route lines.
    Scan,
    /// Inside the command echo and column header block.
    InHeader,
}

/// A selected route: network text as printed and the AS path text with status letters stripped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DumpRoute {
    pub prefix: String,
    pub path: String,
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct DumpStats {
    /// Lines read, continuation lines included.
    pub lines: usize,
    /// Lines of the command echo and header block.
    pub header_lines: usize,
    /// Lines without the best-path marker or without any network.
    pub not_selected: usize,
    /// IPv6 entries whose path column holds only the origin code.
    pub empty_paths: usize,
    /// Selected routes produced.
    pub routes: usize,
}

pub struct DumpParser<R> {
    reader: R,
    state: DumpState,
    last_prefix: Vec<u8>,
    line: Vec<u8>,
    continuation: Vec<u8>,
    stats: DumpStats,
}

impl<R: BufRead> DumpParser<R> {
    pub fn new(reader: R) -> Self {
        DumpParser {
            reader,
            state: DumpState::Scan,
            last_prefix: vec![],
            line: vec![],
            continuation: vec![],
            stats: DumpStats::default(),
        }
    }

    pub fn state(&self) -> DumpState {
        self.state
    }

    pub fn stats(&self) -> DumpStats {
        self.stats
    }

    /// Read up to the next selected route. `Ok(None)` marks the end of the dump.
    pub fn next_route(&mut self) -> io::Result<Option<DumpRoute>> {
        loop {
            if !read_line(&mut self.reader, &mut self.line)? {
                return Ok(None);
            }
            self.stats.lines += 1;

            let line = std::mem::take(&mut self.line);
            let route = self.parse_line(&line);
            self.line = line;
            if let Some(route) = route? {
                self.stats.routes += 1;
                return Ok(Some(route));
            }
        }
    }

    fn parse_line(&mut self, line: &[u8]) -> io::Result<Option<DumpRoute>> {
        if self.state == DumpState::InHeader {
            self.stats.header_lines += 1;
            if contains(line, HEADER_LAST_LINE) {
                self.state = DumpState::Scan;
            }
            return Ok(None);
        }
        if line.starts_with(HEADER_COMMAND) {
            self.stats.header_lines += 1;
            self.state = DumpState::InHeader;
            return Ok(None);
        }

        let path_offset = line
            .get(NETWORK_LIMIT_COLUMN..)
            .map(|tail| tail.iter().take_while(|c| !c.is_ascii_whitespace()).count())
            .unwrap_or(0);

        let field = line.get(NETWORK_COLUMN..).unwrap_or_default();
        let (prefix, tail) = match field.iter().position(|c| c.is_ascii_whitespace()) {
            Some(i) => (&field[..i], Some(&field[i + 1..])),
            None => (field, None),
        };
        let prefix = match chop(prefix) {
            [] => self.last_prefix.clone(),
            prefix => prefix.to_vec(),
        };
        self.last_prefix.clone_from(&prefix);

        let path = if prefix.contains(&b':') {
            let wrapped = tail.is_none_or(|t| t.len() < MIN_IPV6_TAIL);
            let path = match wrapped {
                true => {
                    self.read_continuation()?;
                    column(&self.continuation, PATH_COLUMN)
                }
                false => column(line, PATH_COLUMN),
            };
            if path.first() == Some(&b'i') {
                self.stats.empty_paths += 1;
                return Ok(None);
            }
            lossy(chop(path))
        } else {
            lossy(chop(column(line, PATH_COLUMN + path_offset)))
        };

        if line.get(SELECTED_COLUMN) != Some(&b'>') || prefix.is_empty() {
            self.stats.not_selected += 1;
            return Ok(None);
        }

        Ok(Some(DumpRoute {
            prefix: lossy(&prefix),
            path,
        }))
    }

    fn read_continuation(&mut self) -> io::Result<()> {
        if read_line(&mut self.reader, &mut self.continuation)? {
            self.stats.lines += 1;
        }
        if self.continuation.len() < MIN_IPV6_CONTINUATION
            && read_line(&mut self.reader, &mut self.continuation)?
        {
            self.stats.lines += 1;
        }
        if self.continuation.is_empty() {
            debug!("dump ended inside a wrapped IPv6 entry");
        }
        Ok(())
    }
}

impl<R: BufRead> Iterator for DumpParser<R> {
    type Item = io::Result<DumpRoute>;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_route().transpose()
    }
}

/// Strip trailing whitespace and path status letters (`i`, `e`, `?`).
fn chop(s: &[u8]) -> &[u8] {
    let end = s
        .iter()
        .rposition(|c| !(c.is_ascii_whitespace() || matches!(c, b'i' | b'e' | b'?')))
        .map_or(0, |i| i + 1);
    &s[..end]
}

fn column(line: &[u8], col: usize) -> &[u8] {
    line.get(col..).unwrap_or_default()
}

fn contains(haystack: &[u8], needle: &[u8]) -> bool {
    haystack.windows(needle.len()).any(|w| w == needle)
}

fn lossy(bytes: &[u8]) -> String {
    String::from_utf8_lossy(bytes).into_owned()
}
