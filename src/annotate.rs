/*!
Annotating delimited records with the origin AS of their fields.

Each configured field of a record is classified as a [QueryToken] and resolved against an
[OriginIndex]: addresses are looked up, AS numbers stand for themselves, anything else resolves
to AS 0. The record is echoed followed by one column per configured field, and in prefix mode by
one more column per field holding the matched announcement.

```text
input   65001,10.1.5.5
fields  2
output  65001,10.1.5.5,65004
```
*/
use crate::error::OriginAsError;
use crate::index::{OriginIndex, OriginMatch};
use crate::io::read_line;
use crate::models::Asn;
use crate::parser::AsNameDirectory;
use itertools::Itertools;
use std::io::{BufRead, Write};
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};
use std::str::FromStr;

/// What a query field holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryToken {
    /// An IPv4 or IPv6 address, optionally written with a `/mask` that is ignored.
    Address(IpAddr),
    /// A plain AS number, or one written as `AS<digits>`.
    Asn(Asn),
    /// Anything else, including the IPv6 unspecified address.
    Unresolvable,
}

impl QueryToken {
    pub fn classify(text: &str) -> QueryToken {
        let text = text.trim();
        let address = text.split_once('/').map_or(text, |(addr, _)| addr);

        if text.contains(':') {
            return match Ipv6Addr::from_str(address) {
                Ok(addr) if !addr.is_unspecified() => QueryToken::Address(IpAddr::V6(addr)),
                _ => QueryToken::Unresolvable,
            };
        }
        if text.contains('.') {
            return match parse_dotted_quad(address) {
                Some(addr) => QueryToken::Address(IpAddr::V4(addr)),
                None => QueryToken::Unresolvable,
            };
        }

        let digits = match text.get(..2) {
            Some(p) if p.eq_ignore_ascii_case("as") => &text[2..],
            _ => text,
        };
        match digits.bytes().all(|b| b.is_ascii_digit()) {
            true => u32::from_str(digits)
                .map(|asn| QueryToken::Asn(Asn::new(asn)))
                .unwrap_or(QueryToken::Unresolvable),
            false => QueryToken::Unresolvable,
        }
    }
}

/// Parse four dot separated decimal octets. Unlike `Ipv4Addr::from_str`, octets may carry leading
/// zeros (`010.001.005.005` is `10.1.5.5`).
fn parse_dotted_quad(text: &str) -> Option<Ipv4Addr> {
    let octets = text
        .split('.')
        .map(|octet| match !octet.is_empty() && octet.bytes().all(|b| b.is_ascii_digit()) {
            true => u8::from_str(octet).ok(),
            false => None,
        })
        .collect::<Option<Vec<u8>>>()?;
    let octets: [u8; 4] = octets.try_into().ok()?;
    Some(Ipv4Addr::from(octets))
}

/// Resolve a query field to its origin AS. The matched prefix text is only present for address
/// lookups that hit a range.
pub fn resolve<'a>(index: &'a OriginIndex, text: &str) -> OriginMatch<'a> {
    let unresolved = OriginMatch {
        origin: Asn::UNKNOWN,
        prefix: None,
    };
    match QueryToken::classify(text) {
        QueryToken::Address(addr) => index.lookup(addr).unwrap_or(unresolved),
        QueryToken::Asn(asn) => OriginMatch {
            origin: asn,
            prefix: None,
        },
        QueryToken::Unresolvable => unresolved,
    }
}

/// Parse a comma separated list of 1-based field indices, e.g. `1,3`.
pub fn parse_fields(text: &str) -> Result<Vec<usize>, OriginAsError> {
    text.split(',')
        .map(|entry| match usize::from_str(entry.trim()) {
            Ok(field) if field > 0 => Ok(field),
            _ => Err(OriginAsError::InvalidFieldSelector(entry.to_string())),
        })
        .collect()
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnnotateOptions {
    /// Field separator of input records, also used between appended columns.
    pub delimiter: char,
    /// 1-based indices of the fields to resolve.
    pub fields: Vec<usize>,
    /// Append the matched announcement of every field after the AS columns.
    pub show_prefix: bool,
    /// Print AS names instead of numbers.
    pub use_names: bool,
}

impl Default for AnnotateOptions {
    fn default() -> Self {
        AnnotateOptions {
            delimiter: ',',
            fields: vec![1],
            show_prefix: false,
            use_names: false,
        }
    }
}

pub struct Annotator<'a> {
    index: &'a OriginIndex,
    names: Option<&'a AsNameDirectory>,
    options: AnnotateOptions,
}

impl<'a> Annotator<'a> {
    pub fn new(index: &'a OriginIndex, options: AnnotateOptions) -> Self {
        Annotator {
            index,
            names: None,
            options,
        }
    }

    pub fn with_names(self, names: &'a AsNameDirectory) -> Self {
        Annotator {
            names: Some(names),
            ..self
        }
    }

    /// Annotate one record. Anything from the first line terminator on is dropped.
    pub fn annotate_record(&self, record: &str) -> String {
        let record = record.split(['\r', '\n']).next().unwrap_or_default();
        let columns = record.split(self.options.delimiter).collect::<Vec<_>>();

        let mut output = vec![record.to_string()];
        let mut prefixes = Vec::with_capacity(self.options.fields.len());
        for field in &self.options.fields {
            let text = field
                .checked_sub(1)
                .and_then(|i| columns.get(i))
                .map(|c| c.trim())
                .filter(|c| !c.is_empty());
            match text {
                Some(text) => {
                    let found = resolve(self.index, text);
                    output.push(self.display_asn(found.origin));
                    prefixes.push(found.prefix);
                }
                None => {
                    output.push("0".to_string());
                    prefixes.push(None);
                }
            }
        }

        if self.options.show_prefix {
            output.extend(
                prefixes
                    .into_iter()
                    .map(|prefix| prefix.unwrap_or_default().to_string()),
            );
        }
        output.iter().join(&self.options.delimiter.to_string())
    }

    /// Annotate every record of `input`, writing and flushing one line per record. Returns the
    /// number of records processed.
    pub fn run<R: BufRead, W: Write>(
        &self,
        mut input: R,
        output: &mut W,
    ) -> Result<usize, OriginAsError> {
        let mut buf = vec![];
        let mut count = 0;
        while read_line(&mut input, &mut buf)? {
            let record = String::from_utf8_lossy(&buf);
            writeln!(output, "{}", self.annotate_record(&record))?;
            output.flush()?;
            count += 1;
        }
        Ok(count)
    }

    fn display_asn(&self, asn: Asn) -> String {
        if !self.options.use_names {
            return asn.to_string();
        }
        match self.names.and_then(|names| names.get(asn)) {
            Some(name) => name.to_string(),
            None => format!("AS{}", asn),
        }
    }
}
