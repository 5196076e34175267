use crate::error::OriginAsError;
use crate::models::Afi;
use ipnet::{IpNet, Ipv4Net, Ipv6Net};
use std::fmt::{Debug, Display, Formatter};
use std::net::{Ipv4Addr, Ipv6Addr};
use std::str::FromStr;

/// A network prefix as it appears in the address column of a routing table dump.
///
/// IPv6 prefixes always carry an explicit mask. IPv4 prefixes may omit it, in which case the
/// classful default is applied: `/8` below `128.0.0.0`, `/16` below `192.0.0.0` and `/24`
/// otherwise. Host bits beyond the mask are cleared, so `10.1.2.3/8` becomes `10.0.0.0/8`.
#[derive(PartialEq, Eq, Clone, Copy, Hash)]
pub struct NetworkPrefix {
    pub prefix: IpNet,
}

// Attempt to reduce the size of the debug output
impl Debug for NetworkPrefix {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.prefix)
    }
}

impl NetworkPrefix {
    pub fn new(prefix: IpNet) -> NetworkPrefix {
        NetworkPrefix {
            prefix: prefix.trunc(),
        }
    }

    pub fn prefix_len(&self) -> u8 {
        self.prefix.prefix_len()
    }

    /// The default route, or anything that truncates down to the all-zero network.
    pub fn is_default(&self) -> bool {
        match self.prefix {
            IpNet::V4(net) => net.network().is_unspecified(),
            IpNet::V6(net) => net.network().is_unspecified(),
        }
    }
}

/// Classful default mask for an IPv4 network written without one.
pub fn classful_prefix_len(first_octet: u8) -> u8 {
    match first_octet {
        0..=127 => 8,
        128..=191 => 16,
        _ => 24,
    }
}

fn parse_mask(s: &str, text: &str) -> Result<u8, OriginAsError> {
    u8::from_str(s.trim()).map_err(|_| OriginAsError::InvalidPrefix(text.to_string()))
}

impl FromStr for NetworkPrefix {
    type Err = OriginAsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || OriginAsError::InvalidPrefix(s.to_string());

        if Afi::of_text(s) == Afi::Ipv6 {
            let (addr, mask) = s.split_once('/').ok_or_else(invalid)?;
            let addr = Ipv6Addr::from_str(addr).map_err(|_| invalid())?;
            let net = Ipv6Net::new(addr, parse_mask(mask, s)?)?;
            return Ok(NetworkPrefix::new(IpNet::V6(net)));
        }

        if !s.starts_with(|c: char| c.is_ascii_digit()) {
            return Err(invalid());
        }
        let (addr, mask) = match s.split_once('/') {
            Some((addr, mask)) => (addr, Some(parse_mask(mask, s)?)),
            None => (s, None),
        };
        let addr = Ipv4Addr::from_str(addr).map_err(|_| invalid())?;
        let mask = mask.unwrap_or_else(|| classful_prefix_len(addr.octets()[0]));
        let net = Ipv4Net::new(addr, mask)?;
        Ok(NetworkPrefix::new(IpNet::V4(net)))
    }
}

impl Display for NetworkPrefix {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.prefix)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_ipv4() {
        let prefix = NetworkPrefix::from_str("10.1.0.0/16").unwrap();
        assert_eq!(prefix.to_string(), "10.1.0.0/16");
        assert_eq!(prefix.prefix_len(), 16);

        let prefix = NetworkPrefix::from_str("10.1.2.3/8").unwrap();
        assert_eq!(prefix.to_string(), "10.0.0.0/8");
    }

    #[test]
    fn test_parse_ipv4_classful() {
        assert_eq!(
            NetworkPrefix::from_str("10.0.0.0").unwrap().to_string(),
            "10.0.0.0/8"
        );
        assert_eq!(
            NetworkPrefix::from_str("172.16.0.0").unwrap().to_string(),
            "172.16.0.0/16"
        );
        assert_eq!(
            NetworkPrefix::from_str("192.0.2.0").unwrap().to_string(),
            "192.0.2.0/24"
        );
    }

    #[test]
    fn test_parse_ipv6_expanded_equivalent() {
        let short = NetworkPrefix::from_str("2001:db8::/32").unwrap();
        let long = NetworkPrefix::from_str("2001:0db8:0000:0000:0000:0000:0000:0000/32").unwrap();
        assert_eq!(short, long);
        assert_eq!(long.to_string(), "2001:db8::/32");
    }

    #[test]
    fn test_parse_invalid() {
        assert!(NetworkPrefix::from_str("").is_err());
        assert!(NetworkPrefix::from_str("Network").is_err());
        assert!(NetworkPrefix::from_str("10.0.0/8").is_err());
        assert!(NetworkPrefix::from_str("10.0.0.0/33").is_err());
        assert!(NetworkPrefix::from_str("10.0.0.0/x").is_err());
        // IPv6 needs an explicit mask
        assert!(NetworkPrefix::from_str("2001:db8::").is_err());
        assert!(NetworkPrefix::from_str("2001:db8::/129").is_err());
    }

    #[test]
    fn test_default_route() {
        assert!(NetworkPrefix::from_str("0.0.0.0/0").unwrap().is_default());
        assert!(NetworkPrefix::from_str("0.0.0.0").unwrap().is_default());
        assert!(NetworkPrefix::from_str("::/0").unwrap().is_default());
        assert!(NetworkPrefix::from_str("10.0.0.0/0").unwrap().is_default());
        assert!(!NetworkPrefix::from_str("10.0.0.0/8").unwrap().is_default());
    }
}
