pub mod config;
pub mod error;
pub mod map;
pub mod rev_nat;
pub mod service;

pub use config::MapConfig;
pub use error::Error;
pub use map::{BpfMap, Table, parse_entry};
pub use rev_nat::{RevNat4Map, RevNat4Table, load_rev_nat4_map, rev_nat4_dump_parser};
pub use service::{Service4Map, Service4Table, load_service4_map, service4_dump_parser};

pub type Result<T, E = Error> = std::result::Result<T, E>;
