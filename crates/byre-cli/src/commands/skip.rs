use anyhow::{anyhow, Result};
use byre_core::error::CoreError;
use byre_core::store::JsonStore;
use chrono::Utc;

use crate::cli::SkipCommand;
use crate::commands::load_document;
use crate::util::resolve_occurrence_id;

pub fn skip_occurrence(store: &JsonStore, command: SkipCommand) -> Result<()> {
    let mut doc = load_document(store)?;
    let occurrence_id = resolve_occurrence_id(&doc, &command.id)?;
    let receipt = doc.mark_skipped(&occurrence_id, Utc::now());

    store.save(&doc)?;

    match receipt.completed {
        Some(skipped) => {
            println!("Skipped: '{}'", skipped.title);
            println!("No follow-up was scheduled.");
            Ok(())
        }
        None => Err(anyhow!(CoreError::InvalidInput(format!(
            "Occurrence '{}' is already done or skipped.",
            command.id
        )))),
    }
}
