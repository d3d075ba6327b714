use std::net::Ipv4Addr;

use clap::{Parser, Subcommand};
use lbmap::MapConfig;

#[derive(Debug, Parser)]
#[command(version, about = "A cli for inspecting the load balancer bpf maps", long_about = None)]
pub struct Cli {
    #[command(flatten)]
    pub maps: MapConfig,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Clone, Subcommand, Debug)]
pub enum Commands {
    /// Used to interact with the service map
    #[command(subcommand)]
    Service(ServiceCommands),

    /// Used to interact with the reverse NAT map
    #[command(subcommand)]
    RevNat(RevNatCommands),
}

#[derive(Clone, Subcommand, Debug)]
pub enum ServiceCommands {
    /// List every service entry
    List {
        #[arg(long)]
        /// When set, prints the raw bytes of each entry alongside the decoded fields
        raw: bool,
    },
    /// Show a single service entry
    Get {
        #[arg(long)]
        address: Ipv4Addr,
        #[arg(long)]
        port: u16,
        #[arg(long, default_value_t = 0)]
        slot: u16,
    },
}

#[derive(Clone, Subcommand, Debug)]
pub enum RevNatCommands {
    /// List every reverse NAT entry
    List,
    /// Show the reverse NAT entry for an id
    Get {
        #[arg(long)]
        id: u16,
    },
}
