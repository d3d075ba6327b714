#![no_std]

pub mod rev_nat_v4;
pub mod service_v4;

use core::{
    fmt::Display,
    hash::Hash,
    net::{IpAddr, Ipv4Addr, Ipv6Addr},
};

pub use rev_nat_v4::{RevNat4Key, RevNat4Value};
pub use service_v4::{Service4Key, Service4Value};

/// Upper bound shared by every load balancer map
pub const MAX_ENTRIES: u32 = 65536;

pub const SERVICE4_MAP: BpfMapDef = BpfMapDef {
    name: "cilium_lb4_services",
    max_entries: MAX_ENTRIES,
};

pub const REV_NAT4_MAP: BpfMapDef = BpfMapDef {
    name: "cilium_lb4_reverse_nat",
    max_entries: MAX_ENTRIES,
};

/// Name and capacity of a map shared with the datapath. Key and value sizes
/// come from the record types bound to it through [`MapKey`].
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub struct BpfMapDef {
    pub name: &'static str,
    pub max_entries: u32,
}

/// Converts a host order u16 into the bit pattern the datapath expects.
#[inline]
pub const fn to_network(value: u16) -> u16 {
    value.to_be()
}

/// Inverse of [`to_network`].
#[inline]
pub const fn from_network(value: u16) -> u16 {
    u16::from_be(value)
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum CodecError {
    /// Buffer handed to a decoder is smaller than the record
    Truncated {
        record: &'static str,
        expected: usize,
        actual: usize,
    },
    /// Address does not have the width required by the record
    AddressLength { expected: usize, actual: usize },
}

impl Display for CodecError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            CodecError::Truncated {
                record,
                expected,
                actual,
            } => write!(
                f,
                "{record} needs {expected} bytes but buffer holds {actual}"
            ),
            CodecError::AddressLength { expected, actual } => {
                write!(f, "expected a {expected} byte address, got {actual} bytes")
            }
        }
    }
}

impl core::error::Error for CodecError {}

/// Fixed size binary representation of a map record.
///
/// `to_bytes` produces exactly the memory image of the `#[repr(C)]` struct the
/// datapath declares, so the output can be handed straight to a map update.
/// `from_bytes` reads the first `SIZE` bytes of a buffer returned by a map
/// lookup or dump.
pub trait WireFormat: Sized {
    const SIZE: usize;
    type Bytes: AsRef<[u8]> + Copy + Eq + Hash;

    fn to_bytes(&self) -> Self::Bytes;
    fn from_bytes(buf: &[u8]) -> Result<Self, CodecError>;
}

/// Ties a key type to the map that stores it and to the value it maps to.
pub trait MapKey: WireFormat {
    type Value: WireFormat + Default;
    const MAP: BpfMapDef;

    fn is_ipv6(&self) -> bool;

    fn new_value(&self) -> Self::Value {
        Self::Value::default()
    }
}

/// Copies the leading `N` bytes out of `buf`.
pub(crate) fn read_fixed<const N: usize>(
    buf: &[u8],
    record: &'static str,
) -> Result<[u8; N], CodecError> {
    let Some(head) = buf.first_chunk::<N>() else {
        return Err(CodecError::Truncated {
            record,
            expected: N,
            actual: buf.len(),
        });
    };
    Ok(*head)
}

pub(crate) fn u16_at(buf: &[u8], offset: usize) -> u16 {
    u16::from_ne_bytes([buf[offset], buf[offset + 1]])
}

/// Address bytes in network order, copied verbatim in both directions.
#[repr(C)]
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub struct Address<const N: usize> {
    pub octets: [u8; N],
}

pub type Ipv4Bytes = Address<4>;
pub type Ipv6Bytes = Address<16>;

impl<const N: usize> Address<N> {
    pub const fn new(octets: [u8; N]) -> Self {
        Self { octets }
    }
}

impl<const N: usize> Default for Address<N> {
    fn default() -> Self {
        Self { octets: [0; N] }
    }
}

impl<const N: usize> TryFrom<&[u8]> for Address<N> {
    type Error = CodecError;

    fn try_from(value: &[u8]) -> Result<Self, Self::Error> {
        let octets = <[u8; N]>::try_from(value).map_err(|_| CodecError::AddressLength {
            expected: N,
            actual: value.len(),
        })?;
        Ok(Self { octets })
    }
}

impl From<Ipv4Addr> for Address<4> {
    fn from(value: Ipv4Addr) -> Self {
        Self {
            octets: value.octets(),
        }
    }
}

impl From<Address<4>> for Ipv4Addr {
    fn from(value: Address<4>) -> Self {
        Ipv4Addr::from(value.octets)
    }
}

impl From<Ipv6Addr> for Address<16> {
    fn from(value: Ipv6Addr) -> Self {
        Self {
            octets: value.octets(),
        }
    }
}

impl From<Address<16>> for Ipv6Addr {
    fn from(value: Address<16>) -> Self {
        Ipv6Addr::from(value.octets)
    }
}

impl TryFrom<IpAddr> for Address<4> {
    type Error = CodecError;

    /// v4 mapped v6 addresses are accepted, anything else v6 is rejected.
    fn try_from(value: IpAddr) -> Result<Self, Self::Error> {
        match value {
            IpAddr::V4(ipv4_addr) => Ok(ipv4_addr.into()),
            IpAddr::V6(ipv6_addr) => match ipv6_addr.to_ipv4_mapped() {
                Some(ipv4_addr) => Ok(ipv4_addr.into()),
                None => Err(CodecError::AddressLength {
                    expected: 4,
                    actual: 16,
                }),
            },
        }
    }
}

impl Display for Address<4> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        Ipv4Addr::from(*self).fmt(f)
    }
}
