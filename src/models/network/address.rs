use crate::models::Afi;
use std::fmt::{Debug, Display};
use std::hash::Hash;
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};
use std::ops::{Add, Sub};

/// Integer representation of the addresses of one family.
///
/// IPv4 addresses are handled as `u32` and IPv6 addresses as `u128`, both in host order where
/// the most significant bits are the leading bits of the address. Range arithmetic for a family is
/// done entirely on this type, so the two families never mix.
pub trait AddressFamily:
    Copy
    + Ord
    + Hash
    + Debug
    + Display
    + Add<Output = Self>
    + Sub<Output = Self>
    + Send
    + Sync
    + 'static
{
    const AFI: Afi;
    const ADDR_BITS: u8;
    const ZERO: Self;
    const ONE: Self;

    /// Number of addresses covered by a prefix of length `prefix_len`.
    ///
    /// Returns `None` for a zero length (the whole address space does not fit the integer type)
    /// and for lengths beyond the address width.
    fn block_size(prefix_len: u8) -> Option<Self>;

    fn to_ip_addr(self) -> IpAddr;
}

impl AddressFamily for u32 {
    const AFI: Afi = Afi::Ipv4;
    const ADDR_BITS: u8 = 32;
    const ZERO: Self = 0;
    const ONE: Self = 1;

    fn block_size(prefix_len: u8) -> Option<Self> {
        (1..=Self::ADDR_BITS)
            .contains(&prefix_len)
            .then(|| 1u32 << (Self::ADDR_BITS - prefix_len))
    }

    fn to_ip_addr(self) -> IpAddr {
        IpAddr::V4(Ipv4Addr::from(self))
    }
}

impl AddressFamily for u128 {
    const AFI: Afi = Afi::Ipv6;
    const ADDR_BITS: u8 = 128;
    const ZERO: Self = 0;
    const ONE: Self = 1;

    fn block_size(prefix_len: u8) -> Option<Self> {
        (1..=Self::ADDR_BITS)
            .contains(&prefix_len)
            .then(|| 1u128 << (Self::ADDR_BITS - prefix_len))
    }

    fn to_ip_addr(self) -> IpAddr {
        IpAddr::V6(Ipv6Addr::from(self))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_block_size_v4() {
        assert_eq!(u32::block_size(0), None);
        assert_eq!(u32::block_size(1), Some(1 << 31));
        assert_eq!(u32::block_size(8), Some(1 << 24));
        assert_eq!(u32::block_size(32), Some(1));
        assert_eq!(u32::block_size(33), None);
    }

    #[test]
    fn test_block_size_v6() {
        assert_eq!(u128::block_size(0), None);
        assert_eq!(u128::block_size(32), Some(1 << 96));
        assert_eq!(u128::block_size(128), Some(1));
        assert_eq!(u128::block_size(129), None);
    }

    #[test]
    fn test_address_width() {
        assert_eq!(<u32 as AddressFamily>::ADDR_BITS, 32);
        assert_eq!(<u128 as AddressFamily>::ADDR_BITS, 128);
        assert_eq!(u32::block_size(u32::ADDR_BITS), Some(1));
        assert_eq!(u128::block_size(u128::ADDR_BITS - 16), Some(1 << 16));
    }

    #[test]
    fn test_to_ip_addr() {
        assert_eq!(
            0x0a01_0000u32.to_ip_addr().to_string(),
            "10.1.0.0".to_string()
        );
        assert_eq!(
            0x2001_0db8_0000_0000_0000_0000_0000_0001u128
                .to_ip_addr()
                .to_string(),
            "2001:db8::1".to_string()
        );
    }
}
