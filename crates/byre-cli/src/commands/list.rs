use anyhow::Result;
use byre_core::models::{OccurrenceStatus, TaskOccurrence};
use byre_core::recurrence::{overdue, tasks_on, upcoming};
use byre_core::store::JsonStore;
use byre_core::timezone::{today_in, validate_timezone};
use chrono::{Days, NaiveDate};

use crate::cli::ListCommand;
use crate::commands::load_document;
use crate::config::Config;
use crate::parser::parse_natural_date;
use crate::views::table::display_occurrences;

pub fn list_occurrences(store: &JsonStore, config: &Config, command: ListCommand) -> Result<()> {
    validate_timezone(&config.timezone)?;
    let today = today_in(&config.timezone);
    let doc = load_document(store)?;

    let status_filter = command
        .status
        .as_deref()
        .map(str::parse::<OccurrenceStatus>)
        .transpose()?;

    let base: Vec<&TaskOccurrence> = if let Some(raw) = &command.on {
        let day = parse_natural_date(raw, today)?;
        tasks_on(&doc.occurrences, day)
    } else if command.overdue {
        overdue(&doc.occurrences, today)
    } else if command.all || status_filter.is_some() {
        window_any_status(&doc.occurrences, today, command.days)
    } else {
        upcoming(&doc.occurrences, today, command.days)
    };

    let rows: Vec<&TaskOccurrence> = base
        .into_iter()
        .filter(|o| status_filter.map_or(true, |s| o.status == s))
        .filter(|o| {
            command
                .category
                .as_deref()
                .map_or(true, |c| o.category.eq_ignore_ascii_case(c))
        })
        .collect();

    display_occurrences(&rows, today);
    Ok(())
}

/// Window query that keeps done and skipped rows, for `--all` and
/// `--status` views.
fn window_any_status(
    occurrences: &[TaskOccurrence],
    from: NaiveDate,
    days: u32,
) -> Vec<&TaskOccurrence> {
    let end = from
        .checked_add_days(Days::new(u64::from(days.saturating_sub(1))))
        .unwrap_or(NaiveDate::MAX);
    let mut hits: Vec<&TaskOccurrence> = occurrences
        .iter()
        .filter(|o| o.due_date >= from && o.due_date <= end)
        .collect();
    hits.sort_by(|a, b| {
        a.due_date
            .cmp(&b.due_date)
            .then_with(|| a.due_time.cmp(&b.due_time))
            .then_with(|| a.title.cmp(&b.title))
    });
    hits
}
