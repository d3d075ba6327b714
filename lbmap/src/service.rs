use aya::maps::{HashMap, MapData};
use lbmap_common::{Service4Key, Service4Value, WireFormat};

use crate::map::{Table, load_pinned, parse_entry};
use crate::{MapConfig, Result};

pub type Service4Map = HashMap<
    MapData,
    <Service4Key as WireFormat>::Bytes,
    <Service4Value as WireFormat>::Bytes,
>;
pub type Service4Table<M = Service4Map> = Table<M, Service4Key>;

pub fn load_service4_map(config: &MapConfig) -> Result<Service4Table> {
    load_pinned::<Service4Key>(config)
}

/// Decodes a raw entry dumped from the v4 service map. Ports and the revNAT
/// id come back in host order through the record accessors.
pub fn service4_dump_parser(key: &[u8], value: &[u8]) -> Result<(Service4Key, Service4Value)> {
    parse_entry(key, value)
}

#[cfg(test)]
mod test {
    use std::net::Ipv4Addr;

    use lbmap_common::CodecError;

    use super::*;
    use crate::Error;

    #[test]
    fn test_dump_parser_scenario() -> crate::Result<()> {
        let key = Service4Key::new(Ipv4Addr::new(10, 0, 0, 1), 80, 1);
        let value = Service4Value::new(2, Ipv4Addr::new(192, 168, 1, 5), 8080, 1);

        let (parsed_key, parsed_value) =
            service4_dump_parser(&key.to_bytes(), &value.to_bytes())?;

        assert_eq!(parsed_key.address(), Ipv4Addr::new(10, 0, 0, 1));
        assert_eq!(parsed_key.port(), 80);
        assert_eq!(parsed_key.slot(), 1);
        assert_eq!(parsed_value.count(), 2);
        assert_eq!(parsed_value.address(), Ipv4Addr::new(192, 168, 1, 5));
        assert_eq!(parsed_value.port(), 8080);
        assert_eq!(parsed_value.rev_nat_id(), 1);
        assert_eq!(parsed_value, value);
        Ok(())
    }

    #[test]
    fn test_dump_parser_from_kernel_bytes() -> crate::Result<()> {
        // 10.0.0.1:80 slot 0 -> 192.168.1.5:8080, count 256, revnat 1
        let key = [10, 0, 0, 1, 0x00, 0x50, 0, 0];
        let mut value = [192, 168, 1, 5, 0x1f, 0x90, 0, 0, 0x00, 0x01];
        value[6..8].copy_from_slice(&256u16.to_ne_bytes());

        let (key, value) = service4_dump_parser(&key, &value)?;
        assert_eq!(key.port(), 80);
        assert_eq!(key.slot(), 0);
        assert_eq!(value.port(), 8080);
        assert_eq!(value.count(), 256);
        assert_eq!(value.rev_nat_id(), 1);
        Ok(())
    }

    #[test]
    fn test_dump_parser_truncated_key() {
        let err = service4_dump_parser(&[0; 7], &[0; 10]).unwrap_err();
        match err {
            Error::DecodeKey { map, source } => {
                assert_eq!(map, "cilium_lb4_services");
                assert_eq!(
                    source,
                    CodecError::Truncated {
                        record: "service4 key",
                        expected: 8,
                        actual: 7
                    }
                );
            }
            e => panic!("unexpected error {e}"),
        }
    }

    #[test]
    fn test_non_ipv4_frontend() {
        fn frontend(ip: std::net::IpAddr) -> crate::Result<Service4Key> {
            Ok(Service4Key::try_new(ip, 80, 0)?)
        }
        let err = frontend(std::net::Ipv6Addr::LOCALHOST.into()).unwrap_err();
        assert!(matches!(
            err,
            Error::Address(CodecError::AddressLength {
                expected: 4,
                actual: 16
            })
        ));
        assert!(frontend(Ipv4Addr::new(10, 0, 0, 1).into()).is_ok());
    }

    #[test]
    fn test_dump_parser_truncated_value() {
        let err = service4_dump_parser(&[0; 8], &[]).unwrap_err();
        assert!(matches!(
            err,
            Error::DecodeValue {
                source: CodecError::Truncated { actual: 0, .. },
                ..
            }
        ));
    }
}
