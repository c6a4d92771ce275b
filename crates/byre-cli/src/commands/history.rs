use anyhow::Result;
use byre_core::store::JsonStore;

use crate::cli::HistoryCommand;
use crate::commands::load_document;
use crate::views::table::{display_history, ViewHistoryEntry};

pub fn show_history(store: &JsonStore, command: HistoryCommand) -> Result<()> {
    let doc = load_document(store)?;

    let mut entries: Vec<ViewHistoryEntry> = doc
        .history
        .iter()
        .map(|entry| ViewHistoryEntry {
            action: entry.action,
            // Attempts against unknown ids are audited too; show the raw id.
            title: doc
                .find_occurrence(&entry.occurrence_id)
                .map(|o| o.title.clone())
                .unwrap_or_else(|| entry.occurrence_id.clone()),
            timestamp: entry.timestamp,
        })
        .collect();

    entries.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
    entries.truncate(command.limit);

    display_history(&entries);
    Ok(())
}
