use crate::error::OriginAsError;
use std::fmt::{Display, Formatter};
use std::str::FromStr;

/// ASN -- Autonomous System Number
///
/// AS 0 is reserved (RFC 7607) and is used throughout this crate to mean "no origin found".
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Ord, PartialOrd)]
pub struct Asn(u32);

impl Asn {
    /// The reserved AS 0, reported when a lookup finds nothing.
    pub const UNKNOWN: Asn = Asn(0);

    pub const fn new(asn: u32) -> Self {
        Asn(asn)
    }

    pub const fn to_u32(self) -> u32 {
        self.0
    }

    pub const fn is_unknown(&self) -> bool {
        self.0 == 0
    }

    /// Parse a single AS token: plain decimal (`65001`) or `asdot` notation (`1.10`, meaning
    /// `1 << 16 | 10`).
    ///
    /// Returns `None` for anything else, including digit runs that overflow their field.
    pub fn parse_token(token: &str) -> Option<Asn> {
        match token.split_once('.') {
            Some((hi, lo)) => {
                let hi = parse_digits::<u16>(hi)?;
                let lo = parse_digits::<u16>(lo)?;
                Some(Asn(((hi as u32) << 16) | lo as u32))
            }
            None => parse_digits::<u32>(token).map(Asn),
        }
    }
}

/// Parse a non-empty run of ASCII digits. Unlike `str::parse` this rejects a leading `+`.
fn parse_digits<T: FromStr>(s: &str) -> Option<T> {
    if s.is_empty() || !s.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    s.parse().ok()
}

impl FromStr for Asn {
    type Err = OriginAsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Asn::parse_token(s).ok_or_else(|| OriginAsError::InvalidAsn(s.to_string()))
    }
}

impl PartialEq<u32> for Asn {
    fn eq(&self, other: &u32) -> bool {
        self.0 == *other
    }
}

impl From<u32> for Asn {
    fn from(v: u32) -> Self {
        Asn(v)
    }
}

impl From<Asn> for u32 {
    fn from(value: Asn) -> Self {
        value.0
    }
}

impl Display for Asn {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_plain_and_dotted() {
        assert_eq!(Asn::from_str("65001").unwrap(), 65001);
        assert_eq!(Asn::from_str("1.10").unwrap(), (1 << 16) + 10);
        assert_eq!(Asn::from_str("4294967295").unwrap(), u32::MAX);
    }

    #[test]
    fn test_parse_invalid() {
        assert!(Asn::from_str("").is_err());
        assert!(Asn::from_str("AS65001").is_err());
        assert!(Asn::from_str("+5").is_err());
        assert!(Asn::from_str("4294967296").is_err());
        assert!(Asn::from_str("65536.1").is_err());
        assert!(Asn::from_str("1.").is_err());
        assert!(Asn::from_str("12x").is_err());
    }

    #[test]
    fn test_unknown() {
        assert!(Asn::UNKNOWN.is_unknown());
        assert!(!Asn::new(1).is_unknown());
        assert_eq!(Asn::default(), Asn::UNKNOWN);
        assert_eq!(Asn::new(13335).to_string(), "13335");
    }
}
