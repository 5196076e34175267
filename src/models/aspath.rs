use crate::models::Asn;
use std::fmt::{Display, Formatter};

/// An AS path as printed in the path column of a routing table dump.
///
/// The path text is kept byte-exact and is the identity of the path: two texts describing
/// the same AS sequence (e.g. differing in spacing) are different paths. The parsed sequence is
/// verbatim, without removing prepends or private ASNs.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct AsPath {
    text: Box<str>,
    asns: Vec<Asn>,
}

impl AsPath {
    /// Parse path text into its AS sequence.
    ///
    /// Tokens are separated by whitespace and are either plain decimal or `hi.lo` dotted ASNs.
    /// Parsing stops, without error, at the first AS-set opener (`{`), at the first token that is
    /// not a valid ASN, and at AS 0; whatever was parsed before stands.
    pub fn parse(text: &str) -> AsPath {
        let mut asns = vec![];
        for token in text.split_ascii_whitespace() {
            if token.starts_with('{') {
                break;
            }
            match Asn::parse_token(token) {
                Some(asn) if !asn.is_unknown() => asns.push(asn),
                _ => break,
            }
        }
        AsPath {
            text: text.into(),
            asns,
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn asns(&self) -> &[Asn] {
        &self.asns
    }

    pub fn len(&self) -> usize {
        self.asns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.asns.is_empty()
    }

    /// The originating (last) AS of the path, or [Asn::UNKNOWN] for an empty sequence.
    pub fn origin(&self) -> Asn {
        self.asns.last().copied().unwrap_or(Asn::UNKNOWN)
    }
}

impl Display for AsPath {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.text)
    }
}
