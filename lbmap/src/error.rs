use std::path::PathBuf;

use lbmap_common::CodecError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("unable to convert key from map {map}: {source}")]
    DecodeKey {
        map: &'static str,
        #[source]
        source: CodecError,
    },

    #[error("unable to convert value from map {map}: {source}")]
    DecodeValue {
        map: &'static str,
        #[source]
        source: CodecError,
    },

    #[error("invalid address: {0}")]
    Address(#[from] CodecError),

    #[error("map {name} not found at {}", .path.display())]
    MapNotFound { name: &'static str, path: PathBuf },

    #[error("map error: {0}")]
    MapError(#[from] aya::maps::MapError),
}
