use std::path::PathBuf;

use clap::Args;
use lbmap_common::BpfMapDef;

pub const DEFAULT_BPF_FS: &str = "/sys/fs/bpf/tc/globals";

#[derive(Args, Debug, Clone, PartialEq, Eq)]
pub struct MapConfig {
    /// Directory the datapath pins its load balancer maps under
    #[arg(long, env = "LBMAP_BPF_FS", default_value = DEFAULT_BPF_FS)]
    pub bpf_fs: PathBuf,
}

impl Default for MapConfig {
    fn default() -> Self {
        Self {
            bpf_fs: PathBuf::from(DEFAULT_BPF_FS),
        }
    }
}

impl MapConfig {
    pub fn pin_path(&self, map: &BpfMapDef) -> PathBuf {
        self.bpf_fs.join(map.name)
    }
}
