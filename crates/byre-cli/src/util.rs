use anyhow::{anyhow, Result};
use byre_core::error::CoreError;
use byre_core::models::FarmDocument;

/// Resolve a user-entered prefix to a full occurrence ID.
pub fn resolve_occurrence_id(doc: &FarmDocument, short_id: &str) -> Result<String> {
    if short_id.len() < 2 {
        return Err(anyhow!(CoreError::InvalidInput(
            "Short ID must be at least 2 characters long.".to_string()
        )));
    }
    let matches: Vec<(String, String)> = doc
        .occurrences
        .iter()
        .filter(|o| o.occurrence_id.starts_with(short_id))
        .map(|o| (o.occurrence_id.clone(), o.title.clone()))
        .collect();

    if matches.len() == 1 {
        Ok(matches[0].0.clone())
    } else if matches.is_empty() {
        Err(anyhow!(CoreError::NotFound(format!(
            "No occurrence found with ID prefix '{}'",
            short_id
        ))))
    } else {
        Err(anyhow!(CoreError::AmbiguousId(matches)))
    }
}

/// Resolve a user-entered prefix to a full template ID.
pub fn resolve_template_id(doc: &FarmDocument, short_id: &str) -> Result<String> {
    if short_id.len() < 2 {
        return Err(anyhow!(CoreError::InvalidInput(
            "Short ID must be at least 2 characters long.".to_string()
        )));
    }
    let matches: Vec<(String, String)> = doc
        .templates
        .iter()
        .filter(|t| t.template_id.starts_with(short_id))
        .map(|t| (t.template_id.clone(), t.title.clone()))
        .collect();

    if matches.len() == 1 {
        Ok(matches[0].0.clone())
    } else if matches.is_empty() {
        Err(anyhow!(CoreError::NotFound(format!(
            "No template found with ID prefix '{}'",
            short_id
        ))))
    } else {
        Err(anyhow!(CoreError::AmbiguousId(matches)))
    }
}

/// Resolve an ear tag or cow ID prefix to a full cow ID. Ear tags win when
/// both could match.
pub fn resolve_cow_id(doc: &FarmDocument, key: &str) -> Result<String> {
    if let Some(cow) = doc.find_cow_by_tag(key) {
        return Ok(cow.cow_id.clone());
    }
    let matches: Vec<(String, String)> = doc
        .cows
        .iter()
        .filter(|c| c.cow_id.starts_with(key))
        .map(|c| (c.cow_id.clone(), c.name.clone()))
        .collect();

    if matches.len() == 1 {
        Ok(matches[0].0.clone())
    } else if matches.is_empty() {
        Err(anyhow!(CoreError::NotFound(format!(
            "No cow found matching '{}'",
            key
        ))))
    } else {
        Err(anyhow!(CoreError::AmbiguousId(matches)))
    }
}

/// Shorten a document ID for table display.
pub fn short_id(id: &str) -> &str {
    &id[..id.len().min(18)]
}
