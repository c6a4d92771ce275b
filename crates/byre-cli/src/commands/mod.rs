pub mod add;
pub mod cow;
pub mod r#do;
pub mod history;
pub mod insights;
pub mod list;
pub mod log;
pub mod plan;
pub mod report;
pub mod skip;
pub mod template;

use anyhow::Result;
use byre_core::models::FarmDocument;
use byre_core::store::JsonStore;
use owo_colors::OwoColorize;

/// Load the farm document and repair out-of-range signal values before any
/// command touches them. Repairs are reported but only persisted when the
/// command itself saves.
pub fn load_document(store: &JsonStore) -> Result<FarmDocument> {
    let mut doc = store.load()?;
    for note in doc.sanitize_signals() {
        eprintln!("{} {}", "Warning:".yellow().bold(), note);
    }
    Ok(doc)
}
