use aya::maps::{HashMap, MapData};
use lbmap_common::{RevNat4Key, RevNat4Value, WireFormat};

use crate::map::{Table, load_pinned, parse_entry};
use crate::{MapConfig, Result};

pub type RevNat4Map = HashMap<
    MapData,
    <RevNat4Key as WireFormat>::Bytes,
    <RevNat4Value as WireFormat>::Bytes,
>;
pub type RevNat4Table<M = RevNat4Map> = Table<M, RevNat4Key>;

pub fn load_rev_nat4_map(config: &MapConfig) -> Result<RevNat4Table> {
    load_pinned::<RevNat4Key>(config)
}

pub fn rev_nat4_dump_parser(key: &[u8], value: &[u8]) -> Result<(RevNat4Key, RevNat4Value)> {
    parse_entry(key, value)
}
