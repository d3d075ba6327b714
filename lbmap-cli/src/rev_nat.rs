use lbmap::{MapConfig, RevNat4Table, load_rev_nat4_map};
use lbmap_common::{RevNat4Key, RevNat4Value};
use tabled::settings::Style;
use tabled::{Table, Tabled};
use tracing::warn;

use crate::cli::RevNatCommands;

#[derive(Tabled)]
struct RevNatRow {
    id: u16,
    address: String,
}

impl From<&(RevNat4Key, RevNat4Value)> for RevNatRow {
    fn from((key, value): &(RevNat4Key, RevNat4Value)) -> Self {
        Self {
            id: key.id(),
            address: value.to_string(),
        }
    }
}

pub(crate) fn run(config: &MapConfig, cmd: RevNatCommands) -> anyhow::Result<()> {
    let table = load_rev_nat4_map(config)?;
    match cmd {
        RevNatCommands::List => list(&table)?,
        RevNatCommands::Get { id } => get(&table, RevNat4Key::new(id))?,
    }
    Ok(())
}

fn list(table: &RevNat4Table) -> anyhow::Result<()> {
    let mut entries = vec![];
    for entry in table.dump_entries()? {
        match entry {
            Ok(entry) => entries.push(entry),
            Err(e) => warn!(%e, "skipping revnat entry"),
        }
    }
    entries.sort_by_key(|(k, _)| k.id());
    let rows: Vec<RevNatRow> = entries.iter().map(RevNatRow::from).collect();

    let table = Table::new(rows).with(Style::modern()).to_string();
    println!("{table}");
    Ok(())
}

fn get(table: &RevNat4Table, key: RevNat4Key) -> anyhow::Result<()> {
    let value = table.get(&key)?;
    let table = Table::new([RevNatRow::from(&(key, value))])
        .with(Style::modern())
        .to_string();
    println!("{table}");
    Ok(())
}
