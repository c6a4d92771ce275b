use anyhow::Result;
use byre_core::recurrence::ProjectionConfig;
use byre_core::store::JsonStore;
use byre_core::timezone::{today_in, validate_timezone};
use chrono::{Days, NaiveDate, Utc};

use crate::cli::PlanCommand;
use crate::commands::load_document;
use crate::config::Config;

pub fn plan_occurrences(store: &JsonStore, config: &Config, command: PlanCommand) -> Result<()> {
    validate_timezone(&config.timezone)?;
    let today = today_in(&config.timezone);

    let projection = ProjectionConfig {
        horizon_days: command.days.unwrap_or(config.horizon_days),
        ..ProjectionConfig::default()
    };
    let end = today
        .checked_add_days(Days::new(u64::from(projection.horizon_days)))
        .unwrap_or(NaiveDate::MAX);

    let mut doc = load_document(store)?;
    let added = doc.sync_projections(&projection, today, Utc::now());
    store.save(&doc)?;

    if added == 0 {
        println!("Plan is already up to date through {}.", end);
    } else {
        println!("Planned {} new occurrence(s) through {}.", added, end);
    }
    Ok(())
}
