//! Status command - summarize the entry store.

use std::path::PathBuf;

use colored::Colorize;
use serde::Serialize;

use bravais::store::{entry_number, EntryStore};
use bravais::JsonStore;

#[derive(Serialize)]
struct StoreStatus {
    path: PathBuf,
    entries: usize,
    max_entry_id: Option<String>,
}

pub fn run(store_path: PathBuf, json: bool) -> Result<(), Box<dyn std::error::Error>> {
    let store = JsonStore::open(&store_path)?;

    let max_entry_id = store
        .documents()
        .iter()
        .filter_map(|d| entry_number(&d.entry_id).map(|n| (n, d.entry_id.clone())))
        .max_by_key(|(n, _)| *n)
        .map(|(_, id)| id);

    let status = StoreStatus {
        path: store_path,
        entries: store.count()?,
        max_entry_id,
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&status)?);
    } else {
        println!(
            "{} {}",
            "Store".cyan().bold(),
            status.path.display().to_string().white()
        );
        println!("Entries: {}", status.entries.to_string().white().bold());
        match &status.max_entry_id {
            Some(id) => println!("Highest id: {}", id.white().bold()),
            None => println!("Highest id: {}", "none".dimmed()),
        }
    }

    Ok(())
}
