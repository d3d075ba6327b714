use core::{
    fmt::Display,
    mem::size_of,
    net::{IpAddr, Ipv4Addr},
};

use crate::{
    BpfMapDef, CodecError, Ipv4Bytes, MapKey, SERVICE4_MAP, WireFormat, from_network, read_fixed,
    to_network, u16_at,
};

/// Must match `struct lb4_key` in the datapath.
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Hash)]
pub struct Service4Key {
    address: Ipv4Bytes,
    /// Stored in network order
    port: u16,
    /// Stored in host order
    slot: u16,
}

const _: () = assert!(size_of::<Service4Key>() == <Service4Key as WireFormat>::SIZE);

impl Service4Key {
    /// Bucket `slot` of the service listening on `ip:port`. Slot 0 is the
    /// head entry that carries the backend count.
    pub fn new(ip: Ipv4Addr, port: u16, slot: u16) -> Self {
        Self {
            address: ip.into(),
            port: to_network(port),
            slot,
        }
    }

    pub fn try_new(ip: IpAddr, port: u16, slot: u16) -> Result<Self, CodecError> {
        let address = Ipv4Bytes::try_from(ip)?;
        Ok(Self::new(address.into(), port, slot))
    }

    pub fn address(&self) -> Ipv4Addr {
        self.address.into()
    }

    pub fn port(&self) -> u16 {
        from_network(self.port)
    }

    pub fn slot(&self) -> u16 {
        self.slot
    }

    /// Key of the head entry for the same service.
    pub fn head(&self) -> Self {
        Self { slot: 0, ..*self }
    }
}

impl WireFormat for Service4Key {
    const SIZE: usize = 8;
    type Bytes = [u8; 8];

    fn to_bytes(&self) -> Self::Bytes {
        let mut buf = [0; Self::SIZE];
        buf[0..4].copy_from_slice(&self.address.octets);
        buf[4..6].copy_from_slice(&self.port.to_ne_bytes());
        buf[6..8].copy_from_slice(&self.slot.to_ne_bytes());
        buf
    }

    fn from_bytes(buf: &[u8]) -> Result<Self, CodecError> {
        let buf = read_fixed::<8>(buf, "service4 key")?;
        Ok(Self {
            address: Ipv4Bytes::new([buf[0], buf[1], buf[2], buf[3]]),
            port: u16_at(&buf, 4),
            slot: u16_at(&buf, 6),
        })
    }
}

impl MapKey for Service4Key {
    type Value = Service4Value;
    const MAP: BpfMapDef = SERVICE4_MAP;

    fn is_ipv6(&self) -> bool {
        false
    }
}

impl Display for Service4Key {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}:{} (slot {})", self.address, self.port(), self.slot)
    }
}

/// Must match `struct lb4_service` in the datapath.
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Hash)]
pub struct Service4Value {
    address: Ipv4Bytes,
    /// Stored in network order
    port: u16,
    /// Stored in host order. Only meaningful on the head entry
    count: u16,
    /// Stored in network order
    rev_nat_id: u16,
}

const _: () = assert!(size_of::<Service4Value>() == <Service4Value as WireFormat>::SIZE);

impl Service4Value {
    pub fn new(count: u16, target: Ipv4Addr, port: u16, rev_nat_id: u16) -> Self {
        Self {
            address: target.into(),
            port: to_network(port),
            count,
            rev_nat_id: to_network(rev_nat_id),
        }
    }

    pub fn try_new(
        count: u16,
        target: IpAddr,
        port: u16,
        rev_nat_id: u16,
    ) -> Result<Self, CodecError> {
        let address = Ipv4Bytes::try_from(target)?;
        Ok(Self::new(count, address.into(), port, rev_nat_id))
    }

    pub fn address(&self) -> Ipv4Addr {
        self.address.into()
    }

    pub fn port(&self) -> u16 {
        from_network(self.port)
    }

    pub fn count(&self) -> u16 {
        self.count
    }

    pub fn rev_nat_id(&self) -> u16 {
        from_network(self.rev_nat_id)
    }
}

impl WireFormat for Service4Value {
    const SIZE: usize = 10;
    type Bytes = [u8; 10];

    fn to_bytes(&self) -> Self::Bytes {
        let mut buf = [0; Self::SIZE];
        buf[0..4].copy_from_slice(&self.address.octets);
        buf[4..6].copy_from_slice(&self.port.to_ne_bytes());
        buf[6..8].copy_from_slice(&self.count.to_ne_bytes());
        buf[8..10].copy_from_slice(&self.rev_nat_id.to_ne_bytes());
        buf
    }

    fn from_bytes(buf: &[u8]) -> Result<Self, CodecError> {
        let buf = read_fixed::<10>(buf, "service4 value")?;
        Ok(Self {
            address: Ipv4Bytes::new([buf[0], buf[1], buf[2], buf[3]]),
            port: u16_at(&buf, 4),
            count: u16_at(&buf, 6),
            rev_nat_id: u16_at(&buf, 8),
        })
    }
}

impl Display for Service4Value {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(
            f,
            "{}:{} (count {}, revnat {})",
            self.address,
            self.port(),
            self.count,
            self.rev_nat_id()
        )
    }
}
