use std::fmt::{Display, Formatter};

/// AFI -- Address Family Identifier
///
/// <https://www.iana.org/assignments/address-family-numbers/address-family-numbers.xhtml>
#[derive(Debug, PartialEq, Clone, Copy, Eq, Hash)]
#[repr(u16)]
pub enum Afi {
    Ipv4 = 1,
    Ipv6 = 2,
}

impl Afi {
    /// Pick the family of a textual address the way dump lines are classified: anything with a
    /// colon is IPv6, everything else is treated as IPv4.
    pub fn of_text(text: &str) -> Afi {
        match text.contains(':') {
            true => Afi::Ipv6,
            false => Afi::Ipv4,
        }
    }
}

impl Display for Afi {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Afi::Ipv4 => write!(f, "ipv4"),
            Afi::Ipv6 => write!(f, "ipv6"),
        }
    }
}
