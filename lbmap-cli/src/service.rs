use lbmap::{MapConfig, Service4Table, load_service4_map};
use lbmap_common::{Service4Key, Service4Value, WireFormat};
use tabled::settings::Style;
use tabled::{Table, Tabled};
use tracing::warn;

use crate::cli::ServiceCommands;

#[derive(Tabled)]
struct ServiceRow {
    frontend: String,
    slot: u16,
    backend: String,
    count: u16,
    rev_nat_id: u16,
    raw: String,
}

impl ServiceRow {
    fn new(key: &Service4Key, value: &Service4Value, raw: bool) -> Self {
        let raw = if raw {
            format!("{:02x?} {:02x?}", key.to_bytes(), value.to_bytes())
        } else {
            String::new()
        };
        Self {
            frontend: format!("{}:{}", key.address(), key.port()),
            slot: key.slot(),
            backend: format!("{}:{}", value.address(), value.port()),
            count: value.count(),
            rev_nat_id: value.rev_nat_id(),
            raw,
        }
    }
}

pub(crate) fn run(config: &MapConfig, cmd: ServiceCommands) -> anyhow::Result<()> {
    let table = load_service4_map(config)?;
    match cmd {
        ServiceCommands::List { raw } => list(&table, raw)?,
        ServiceCommands::Get {
            address,
            port,
            slot,
        } => get(&table, Service4Key::new(address, port, slot))?,
    }
    Ok(())
}

fn list(table: &Service4Table, raw: bool) -> anyhow::Result<()> {
    let mut rows = vec![];
    for entry in table.dump_entries()? {
        match entry {
            Ok((key, value)) => rows.push((key, value)),
            Err(e) => warn!(%e, "skipping service entry"),
        }
    }
    rows.sort_by_key(|(k, _)| (k.address(), k.port(), k.slot()));
    let rows: Vec<ServiceRow> = rows
        .iter()
        .map(|(k, v)| ServiceRow::new(k, v, raw))
        .collect();

    print_rows(rows);
    Ok(())
}

fn get(table: &Service4Table, key: Service4Key) -> anyhow::Result<()> {
    let value = table.get(&key)?;
    print_rows(vec![ServiceRow::new(&key, &value, false)]);
    Ok(())
}

fn print_rows(rows: Vec<ServiceRow>) {
    let table = Table::new(rows).with(Style::modern()).to_string();
    println!("{table}");
}
