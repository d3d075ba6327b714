mod cli;
mod rev_nat;
mod service;

use crate::cli::Cli;
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

fn main() -> anyhow::Result<()> {
    setup_subscriber();
    let cli = Cli::parse();
    match cli.command {
        crate::cli::Commands::Service(service_commands) => {
            service::run(&cli.maps, service_commands)?
        }
        crate::cli::Commands::RevNat(rev_nat_commands) => {
            rev_nat::run(&cli.maps, rev_nat_commands)?
        }
    };
    Ok(())
}

fn setup_subscriber() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "lbmap_cli=info,lbmap=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}
