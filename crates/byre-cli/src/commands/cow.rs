use anyhow::{anyhow, Result};
use byre_core::error::CoreError;
use byre_core::models::{
    normalize_ear_tag, Cow, ProductionType, RecurrenceRule, RecurrenceUnit, Sex, TaskTemplate,
};
use byre_core::recurrence::ProjectionConfig;
use byre_core::store::JsonStore;
use byre_core::timezone::{today_in, validate_timezone};
use chrono::{Days, NaiveDate, NaiveTime, Utc};
use dialoguer::Confirm;

use crate::cli::{
    AddCowCommand, CowCommand, CowIdCommand, CowSubcommand, ListCowCommand, RemoveCowCommand,
};
use crate::commands::load_document;
use crate::config::Config;
use crate::parser::parse_natural_date;
use crate::util::resolve_cow_id;
use crate::views::table::display_cows;

/// Boosters are scheduled three weeks out so the first one is plannable
/// rather than instantly overdue.
const VACCINE_LEAD_DAYS: u64 = 21;

pub fn cow_command(store: &JsonStore, config: &Config, command: CowCommand) -> Result<()> {
    match command.command {
        CowSubcommand::Add(cmd) => add_cow(store, config, cmd),
        CowSubcommand::List(cmd) => list_cows(store, cmd),
        CowSubcommand::Archive(cmd) => set_active(store, cmd, false),
        CowSubcommand::Restore(cmd) => set_active(store, cmd, true),
        CowSubcommand::Remove(cmd) => remove_cow(store, cmd),
    }
}

fn add_cow(store: &JsonStore, config: &Config, command: AddCowCommand) -> Result<()> {
    validate_timezone(&config.timezone)?;
    let today = today_in(&config.timezone);

    let sex = command.sex.parse::<Sex>()?;
    let production_type = command.production.parse::<ProductionType>()?;
    let date_of_birth = command
        .born
        .as_deref()
        .map(|raw| parse_natural_date(raw, today))
        .transpose()?;
    if let Some(born) = date_of_birth {
        if born > today {
            return Err(anyhow!(CoreError::InvalidInput(
                "Date of birth cannot be in the future.".to_string()
            )));
        }
    }
    let pregnancy_due_date = command
        .due_date
        .as_deref()
        .map(|raw| parse_natural_date(raw, today))
        .transpose()?;

    let mut doc = load_document(store)?;
    let cow_id = format!("cow-{}", Utc::now().timestamp_millis());
    let name = command.name.map(|n| n.trim().to_string()).unwrap_or_default();
    let display = if name.is_empty() {
        cow_id.clone()
    } else {
        name.clone()
    };

    doc.upsert_cow(Cow {
        cow_id: cow_id.clone(),
        ear_tag_id: command.ear_tag.clone(),
        name,
        sex,
        production_type,
        date_of_birth,
        pregnancy_due_date,
        vaccination_status: Vec::new(),
        weight_kg: command.weight,
        notes: command.notes.unwrap_or_default(),
        is_active: true,
    })?;

    let mut booster_start = None;
    if command.vaccines {
        let start = today
            .checked_add_days(Days::new(VACCINE_LEAD_DAYS))
            .unwrap_or(NaiveDate::MAX);
        doc.upsert_template(TaskTemplate {
            template_id: format!("tmpl-vaccine-{}", cow_id),
            title: format!("Vaccination booster review ({})", display),
            category: "vaccine".to_string(),
            start_date: start,
            recurrence: Some(RecurrenceRule::new(6, RecurrenceUnit::Months)),
            default_time: NaiveTime::from_hms_opt(11, 0, 0),
            assigned_to: Some(cow_id.clone()),
            notes: String::new(),
        });
        doc.sync_projections(
            &ProjectionConfig {
                horizon_days: config.horizon_days,
                ..ProjectionConfig::default()
            },
            today,
            Utc::now(),
        );
        booster_start = Some(start);
    }
    store.save(&doc)?;

    use owo_colors::{OwoColorize, Style};
    let success_style = Style::new().green().bold();
    let info_style = Style::new().blue();
    println!(
        "{} Registered cow: {} ({})",
        "✓".style(success_style),
        display.bright_white().bold(),
        normalize_ear_tag(&command.ear_tag).yellow()
    );
    if let Some(start) = booster_start {
        println!(
            "  {} Vaccination booster scheduled every 6 months from {}",
            "→".style(info_style),
            start.to_string().cyan()
        );
    }

    Ok(())
}

fn list_cows(store: &JsonStore, command: ListCowCommand) -> Result<()> {
    let doc = load_document(store)?;
    let rows: Vec<&Cow> = doc
        .cows
        .iter()
        .filter(|c| command.all || c.is_active)
        .collect();
    display_cows(&rows);
    Ok(())
}

fn set_active(store: &JsonStore, command: CowIdCommand, active: bool) -> Result<()> {
    let mut doc = load_document(store)?;
    let cow_id = resolve_cow_id(&doc, &command.id)?;
    if !doc.set_cow_active(&cow_id, active) {
        return Err(anyhow!(CoreError::NotFound(format!(
            "No cow found matching '{}'",
            command.id
        ))));
    }
    store.save(&doc)?;

    let tag = doc
        .find_cow(&cow_id)
        .map(|c| c.ear_tag_id.clone())
        .unwrap_or(cow_id);
    if active {
        println!("Restored {} to the active herd.", tag);
    } else {
        println!("Archived {}. Records are kept; planning ignores it.", tag);
    }
    Ok(())
}

fn remove_cow(store: &JsonStore, command: RemoveCowCommand) -> Result<()> {
    let mut doc = load_document(store)?;
    let cow_id = resolve_cow_id(&doc, &command.id)?;
    let label = doc
        .find_cow(&cow_id)
        .map(|c| {
            if c.name.is_empty() {
                c.ear_tag_id.clone()
            } else {
                c.name.clone()
            }
        })
        .unwrap_or_else(|| cow_id.clone());

    if !command.yes {
        let confirmation = Confirm::new()
            .with_prompt(format!(
                "Remove '{}' along with its logs and scheduled tasks?",
                label
            ))
            .default(false)
            .interact()
            .unwrap_or(false);
        if !confirmation {
            println!("Removal cancelled.");
            return Ok(());
        }
    }

    doc.remove_cow(&cow_id);
    store.save(&doc)?;
    println!("Removed '{}'", label);
    Ok(())
}
