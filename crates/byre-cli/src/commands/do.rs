use anyhow::{anyhow, Result};
use byre_core::error::CoreError;
use byre_core::store::JsonStore;
use chrono::Utc;

use crate::cli::DoCommand;
use crate::commands::load_document;
use crate::util::resolve_occurrence_id;

pub fn do_occurrence(store: &JsonStore, command: DoCommand) -> Result<()> {
    let mut doc = load_document(store)?;
    let occurrence_id = resolve_occurrence_id(&doc, &command.id)?;
    let receipt = doc.mark_done(&occurrence_id, Utc::now());

    // The attempt is recorded in history either way.
    store.save(&doc)?;

    match receipt.completed {
        Some(completed) => {
            println!("Completed: '{}'", completed.title);
            if let Some(next) = receipt.generated {
                println!("Scheduled follow-up '{}' for {}", next.title, next.due_date);
            }
            Ok(())
        }
        None => Err(anyhow!(CoreError::InvalidInput(format!(
            "Occurrence '{}' is already done or skipped.",
            command.id
        )))),
    }
}
