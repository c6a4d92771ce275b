use anyhow::Result;
use byre_core::models::{NewOccurrenceData, RecurrenceAnchor, RecurrenceRule, RecurrenceUnit};
use byre_core::store::JsonStore;
use byre_core::timezone::{today_in, validate_timezone};
use chrono::Utc;

use crate::cli::AddCommand;
use crate::commands::load_document;
use crate::config::Config;
use crate::parser::{parse_natural_date, parse_time_string};
use crate::util::short_id;

pub fn add_occurrence(store: &JsonStore, config: &Config, command: AddCommand) -> Result<()> {
    validate_timezone(&config.timezone)?;
    let today = today_in(&config.timezone);

    let due_date = match command.due.as_deref() {
        Some(raw) => parse_natural_date(raw, today)?,
        None => today,
    };
    let due_time = command.time.as_deref().map(parse_time_string).transpose()?;

    let recurrence = match command.every {
        Some(every) => {
            let unit = match command.unit.as_deref() {
                Some(raw) => raw.parse::<RecurrenceUnit>()?,
                None => RecurrenceUnit::Days,
            };
            Some(RecurrenceRule::new(every, unit))
        }
        None => None,
    };
    let recurrence_anchor = if command.anchor_due_date {
        RecurrenceAnchor::DueDate
    } else {
        RecurrenceAnchor::Completion
    };

    let mut doc = load_document(store)?;
    let occurrence = doc.add_custom_occurrence(
        NewOccurrenceData {
            title: command.title,
            category: command.category.unwrap_or_default(),
            due_date,
            due_time,
            assigned_to: command.assigned,
            recurrence,
            recurrence_anchor,
            notes: command.notes.unwrap_or_default(),
        },
        Utc::now(),
    );
    store.save(&doc)?;

    use owo_colors::{OwoColorize, Style};
    let success_style = Style::new().green().bold();
    let info_style = Style::new().blue();

    if occurrence.recurrence.is_some() {
        println!(
            "{} Added recurring task: {}",
            "✓".style(success_style),
            occurrence.title.bright_white().bold()
        );
    } else {
        println!(
            "{} Added task: {}",
            "✓".style(success_style),
            occurrence.title.bright_white().bold()
        );
    }
    println!(
        "  {} ID: {}",
        "→".style(info_style),
        short_id(&occurrence.occurrence_id).yellow()
    );
    println!(
        "  {} Due: {}",
        "→".style(info_style),
        occurrence.due_date.to_string().cyan()
    );
    if occurrence.recurrence.is_some() {
        println!(
            "  {} A follow-up will be scheduled each time you run: byre do {}",
            "→".style(info_style),
            short_id(&occurrence.occurrence_id).yellow()
        );
    }

    Ok(())
}
