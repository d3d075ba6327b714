use core::{
    fmt::Display,
    mem::size_of,
    net::{IpAddr, Ipv4Addr},
};

use crate::{
    BpfMapDef, CodecError, Ipv4Bytes, MapKey, REV_NAT4_MAP, WireFormat, from_network, read_fixed,
    to_network, u16_at,
};

/// Reverse NAT id, stored in network order.
#[repr(transparent)]
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Hash)]
pub struct RevNat4Key(u16);

const _: () = assert!(size_of::<RevNat4Key>() == <RevNat4Key as WireFormat>::SIZE);

impl RevNat4Key {
    pub fn new(id: u16) -> Self {
        Self(to_network(id))
    }

    pub fn id(&self) -> u16 {
        from_network(self.0)
    }
}

impl WireFormat for RevNat4Key {
    const SIZE: usize = 2;
    type Bytes = [u8; 2];

    fn to_bytes(&self) -> Self::Bytes {
        self.0.to_ne_bytes()
    }

    fn from_bytes(buf: &[u8]) -> Result<Self, CodecError> {
        let raw = u16::from_ne_bytes(read_fixed::<2>(buf, "revnat4 key")?);
        // rebuilt through the constructor, the stored bits are unchanged
        Ok(Self::new(from_network(raw)))
    }
}

impl MapKey for RevNat4Key {
    type Value = RevNat4Value;
    const MAP: BpfMapDef = REV_NAT4_MAP;

    fn is_ipv6(&self) -> bool {
        false
    }
}

impl Display for RevNat4Key {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}", self.id())
    }
}

/// Original service address a backend reply is translated back to.
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Hash)]
pub struct RevNat4Value {
    address: Ipv4Bytes,
    /// Stored in network order
    port: u16,
}

const _: () = assert!(size_of::<RevNat4Value>() == <RevNat4Value as WireFormat>::SIZE);

impl RevNat4Value {
    pub fn new(ip: Ipv4Addr, port: u16) -> Self {
        Self {
            address: ip.into(),
            port: to_network(port),
        }
    }

    pub fn try_new(ip: IpAddr, port: u16) -> Result<Self, CodecError> {
        let address = Ipv4Bytes::try_from(ip)?;
        Ok(Self::new(address.into(), port))
    }

    pub fn address(&self) -> Ipv4Addr {
        self.address.into()
    }

    pub fn port(&self) -> u16 {
        from_network(self.port)
    }
}

impl WireFormat for RevNat4Value {
    const SIZE: usize = 6;
    type Bytes = [u8; 6];

    fn to_bytes(&self) -> Self::Bytes {
        let mut buf = [0; Self::SIZE];
        buf[0..4].copy_from_slice(&self.address.octets);
        buf[4..6].copy_from_slice(&self.port.to_ne_bytes());
        buf
    }

    fn from_bytes(buf: &[u8]) -> Result<Self, CodecError> {
        let buf = read_fixed::<6>(buf, "revnat4 value")?;
        Ok(Self {
            address: Ipv4Bytes::new([buf[0], buf[1], buf[2], buf[3]]),
            port: u16_at(&buf, 4),
        })
    }
}

impl Display for RevNat4Value {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}:{}", self.address, self.port())
    }
}
