use std::borrow::BorrowMut;
use std::fmt::Display;
use std::hash::Hash;
use std::marker::PhantomData;

use aya::Pod;
use aya::maps::{HashMap, Map, MapData, MapError};
use lbmap_common::{MapKey, WireFormat};
use tracing::{debug, info};

use crate::{Error, MapConfig, Result};

pub type KeyBytes<K> = <K as WireFormat>::Bytes;
pub type ValueBytes<K> = <<K as MapKey>::Value as WireFormat>::Bytes;

/// Key/value table shared with the datapath.
pub trait BpfMap<K, V> {
    fn update(&mut self, key: K, value: V) -> Result<()>;
    fn delete(&mut self, key: &K) -> Result<()>;
    fn get(&self, key: &K) -> Result<V>;
    fn get_state(&self) -> Result<ahash::HashMap<K, V>>;
}

impl<T: BorrowMut<MapData>, K: Pod + Eq + Hash, V: Pod> BpfMap<K, V> for HashMap<T, K, V> {
    fn update(&mut self, key: K, value: V) -> Result<()> {
        Ok(self.insert(key, value, 0)?)
    }
    fn delete(&mut self, key: &K) -> Result<()> {
        Ok(self.remove(key)?)
    }
    fn get(&self, key: &K) -> Result<V> {
        Ok(<HashMap<T, K, V>>::get(self, key, 0)?)
    }
    fn get_state(&self) -> Result<ahash::HashMap<K, V>> {
        let mut map = ahash::HashMap::default();
        for v in self.iter() {
            match v {
                Ok((k, v)) => {
                    map.insert(k, v);
                }
                Err(e) => return Err(e.into()),
            }
        }
        Ok(map)
    }
}

impl<K: Pod + Eq + Hash, V: Pod> BpfMap<K, V> for ahash::HashMap<K, V> {
    fn update(&mut self, key: K, value: V) -> Result<()> {
        self.insert(key, value);
        Ok(())
    }
    fn delete(&mut self, key: &K) -> Result<()> {
        match self.remove(key) {
            Some(_) => Ok(()),
            None => Err(MapError::KeyNotFound.into()),
        }
    }
    fn get(&self, key: &K) -> Result<V> {
        match <ahash::HashMap<K, V>>::get(self, key) {
            Some(i) => Ok(*i),
            None => Err(MapError::KeyNotFound.into()),
        }
    }
    fn get_state(&self) -> Result<ahash::HashMap<K, V>> {
        Ok(self.clone())
    }
}

/// Decodes one raw entry read back from the map bound to `K`.
pub fn parse_entry<K: MapKey>(key: &[u8], value: &[u8]) -> Result<(K, K::Value)> {
    let map = K::MAP.name;
    let key = K::from_bytes(key).map_err(|source| Error::DecodeKey { map, source })?;
    let value = K::Value::from_bytes(value).map_err(|source| Error::DecodeValue { map, source })?;
    Ok((key, value))
}

/// Handle to the single map that stores entries keyed by `K`. Records are
/// encoded on the way in and decoded on the way out, the underlying map only
/// ever sees raw bytes.
pub struct Table<M, K>
where
    K: MapKey,
    M: BpfMap<KeyBytes<K>, ValueBytes<K>>,
{
    map: M,
    _key: PhantomData<K>,
}

impl<M, K> Table<M, K>
where
    K: MapKey + Display,
    K::Value: Display,
    M: BpfMap<KeyBytes<K>, ValueBytes<K>>,
{
    pub fn new(map: M) -> Self {
        Self {
            map,
            _key: PhantomData,
        }
    }

    pub fn name(&self) -> &'static str {
        K::MAP.name
    }

    pub fn update(&mut self, key: &K, value: &K::Value) -> Result<()> {
        debug!(map = K::MAP.name, %key, %value, "updating entry");
        self.map.update(key.to_bytes(), value.to_bytes())
    }

    pub fn delete(&mut self, key: &K) -> Result<()> {
        debug!(map = K::MAP.name, %key, "deleting entry");
        self.map.delete(&key.to_bytes())
    }

    pub fn get(&self, key: &K) -> Result<K::Value> {
        let value = self.map.get(&key.to_bytes())?;
        K::Value::from_bytes(value.as_ref()).map_err(|source| Error::DecodeValue {
            map: K::MAP.name,
            source,
        })
    }

    /// Every entry exactly as stored in the map.
    pub fn dump_raw(&self) -> Result<Vec<(KeyBytes<K>, ValueBytes<K>)>> {
        Ok(self.map.get_state()?.into_iter().collect())
    }

    /// Decodes every entry, failing on the first one that cannot be decoded.
    pub fn dump(&self) -> Result<Vec<(K, K::Value)>> {
        self.dump_raw()?
            .iter()
            .map(|(k, v)| parse_entry::<K>(k.as_ref(), v.as_ref()))
            .collect()
    }

    /// Decodes every entry and leaves it to the caller to decide what to do
    /// with the ones that fail.
    pub fn dump_entries(&self) -> Result<Vec<Result<(K, K::Value)>>> {
        Ok(self
            .dump_raw()?
            .iter()
            .map(|(k, v)| parse_entry::<K>(k.as_ref(), v.as_ref()))
            .collect())
    }
}

/// Opens the map pinned for `K` under the configured bpf fs. Key and value
/// sizes are checked against the pinned map on conversion.
pub(crate) fn load_pinned<K>(
    config: &MapConfig,
) -> Result<Table<HashMap<MapData, KeyBytes<K>, ValueBytes<K>>, K>>
where
    K: MapKey + Display,
    K::Value: Display,
    KeyBytes<K>: Pod,
    ValueBytes<K>: Pod,
{
    let path = config.pin_path(&K::MAP);
    if !path.exists() {
        return Err(Error::MapNotFound {
            name: K::MAP.name,
            path,
        });
    }
    info!(map = K::MAP.name, path = %path.display(), "loading pinned map");
    let map = MapData::from_pin(&path)?;
    let map = Map::HashMap(map);
    let map = map.try_into()?;
    Ok(Table::new(map))
}

#[cfg(test)]
mod test {
    use std::net::Ipv4Addr;
    use std::path::PathBuf;

    use lbmap_common::{RevNat4Key, RevNat4Value, Service4Key, Service4Value};

    use super::*;

    fn new_service_table() -> Table<ahash::HashMap<[u8; 8], [u8; 10]>, Service4Key> {
        Table::new(ahash::HashMap::default())
    }

    #[test]
    fn test_update_get_delete() -> crate::Result<()> {
        let mut table = new_service_table();
        let key = Service4Key::new(Ipv4Addr::new(10, 96, 0, 1), 80, 0);
        let value = Service4Value::new(2, Ipv4Addr::new(0, 0, 0, 0), 0, 7);

        table.update(&key, &value)?;
        assert_eq!(table.get(&key)?, value);

        table.delete(&key)?;
        assert!(matches!(
            table.get(&key),
            Err(Error::MapError(MapError::KeyNotFound))
        ));
        Ok(())
    }

    #[test]
    fn test_update_replaces_value() -> crate::Result<()> {
        let mut table = new_service_table();
        let key = Service4Key::new(Ipv4Addr::new(10, 96, 0, 1), 80, 1);
        let first = Service4Value::new(0, Ipv4Addr::new(10, 0, 0, 1), 8080, 7);
        let second = Service4Value::new(0, Ipv4Addr::new(10, 0, 0, 2), 8080, 7);

        table.update(&key, &first)?;
        table.update(&key, &second)?;
        assert_eq!(table.get(&key)?, second);
        assert_eq!(table.dump()?.len(), 1);
        Ok(())
    }

    #[test]
    fn test_dump_decodes_stored_bytes() -> crate::Result<()> {
        let vip = Ipv4Addr::new(10, 96, 0, 1);
        let mut table = new_service_table();
        table.update(
            &Service4Key::new(vip, 443, 0),
            &Service4Value::new(2, Ipv4Addr::UNSPECIFIED, 0, 3),
        )?;
        table.update(
            &Service4Key::new(vip, 443, 1),
            &Service4Value::new(0, Ipv4Addr::new(10, 0, 0, 1), 8443, 3),
        )?;
        table.update(
            &Service4Key::new(vip, 443, 2),
            &Service4Value::new(0, Ipv4Addr::new(10, 0, 0, 2), 8443, 3),
        )?;

        let mut entries = table.dump()?;
        entries.sort_by_key(|(k, _)| k.slot());

        assert_eq!(entries.len(), 3);
        assert_eq!(entries[0].1.count(), 2);
        for (key, value) in &entries[1..] {
            assert_eq!(key.address(), vip);
            assert_eq!(key.port(), 443);
            assert_eq!(value.port(), 8443);
            assert_eq!(value.rev_nat_id(), 3);
        }
        Ok(())
    }

    #[test]
    fn test_dump_raw_is_wire_layout() -> crate::Result<()> {
        let mut table: Table<ahash::HashMap<[u8; 2], [u8; 6]>, RevNat4Key> =
            Table::new(ahash::HashMap::default());
        table.update(
            &RevNat4Key::new(1),
            &RevNat4Value::new(Ipv4Addr::new(10, 96, 0, 10), 53),
        )?;

        let raw = table.dump_raw()?;
        assert_eq!(raw, vec![([0x00, 0x01], [10, 96, 0, 10, 0x00, 0x35])]);
        assert_eq!(table.name(), "cilium_lb4_reverse_nat");
        Ok(())
    }

    #[test]
    fn test_dump_entries_reports_each_entry() -> crate::Result<()> {
        let mut table = new_service_table();
        table.update(
            &Service4Key::new(Ipv4Addr::new(10, 96, 0, 1), 80, 0),
            &Service4Value::new(1, Ipv4Addr::UNSPECIFIED, 0, 1),
        )?;
        let entries = table.dump_entries()?;
        assert_eq!(entries.len(), 1);
        assert!(entries[0].is_ok());
        Ok(())
    }

    #[test]
    fn test_parse_entry_distinguishes_key_and_value() {
        let err = parse_entry::<Service4Key>(&[0; 7], &[0; 10]).unwrap_err();
        assert!(matches!(
            err,
            Error::DecodeKey {
                map: "cilium_lb4_services",
                ..
            }
        ));
        assert!(err.to_string().contains("unable to convert key"));

        let err = parse_entry::<Service4Key>(&[0; 8], &[0; 9]).unwrap_err();
        assert!(matches!(err, Error::DecodeValue { .. }));
        assert_eq!(
            err.to_string(),
            "unable to convert value from map cilium_lb4_services: service4 value needs 10 bytes but buffer holds 9"
        );
    }

    #[test]
    fn test_load_missing_pin() {
        let config = MapConfig {
            bpf_fs: PathBuf::from("/nonexistent/lbmap-test"),
        };
        let err = load_pinned::<Service4Key>(&config).err();
        assert!(matches!(
            err,
            Some(Error::MapNotFound {
                name: "cilium_lb4_services",
                ..
            })
        ));
    }
}
