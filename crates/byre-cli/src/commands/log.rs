use anyhow::{anyhow, Result};
use byre_core::error::CoreError;
use byre_core::models::DailySignal;
use byre_core::store::JsonStore;
use byre_core::timezone::{today_in, validate_timezone};
use chrono::Timelike;

use crate::cli::LogCommand;
use crate::commands::load_document;
use crate::config::Config;
use crate::parser::{parse_natural_date, parse_time_string};
use crate::util::resolve_cow_id;

pub fn log_signal(store: &JsonStore, config: &Config, command: LogCommand) -> Result<()> {
    validate_timezone(&config.timezone)?;
    let today = today_in(&config.timezone);

    let day = match command.date.as_deref() {
        Some(raw) => parse_natural_date(raw, today)?,
        None => today,
    };

    let mut doc = load_document(store)?;
    let cow_id = resolve_cow_id(&doc, &command.ear_tag)?;
    let Some(cow) = doc.find_cow(&cow_id) else {
        return Err(anyhow!(CoreError::NotFound(format!(
            "No cow found matching '{}'",
            command.ear_tag
        ))));
    };
    let tag = cow.ear_tag_id.clone();

    let mut signal = DailySignal::empty(day);
    signal.trough_minutes_today = command.trough_minutes;
    signal.meals_count_today = command.meals;
    signal.avg_meal_minutes_today = command.avg_meal_minutes;
    signal.feed_intake_est_kg_today = command.feed_kg;
    signal.activity_index_today = command.activity;
    signal.alone_minutes_today = command.alone_minutes;
    signal.water_visits_today = command.water_visits;
    signal.water_minutes_today = command.water_minutes;
    signal.lying_minutes_today = command.lying_minutes;
    signal.temp_c_today = command.temp;
    signal.humidity_pct_today = command.humidity;
    signal.milk_liters_today = command.milk;
    for raw in &command.meal_at {
        let time = parse_time_string(raw)?;
        signal.meal_timestamps.push(f64::from(time.hour() * 60 + time.minute()));
    }

    let replaced = doc
        .daily_logs_by_ear_tag
        .get(&tag)
        .map_or(false, |series| series.iter().any(|s| s.day == day));

    doc.append_daily_log(&tag, signal);
    for note in doc.sanitize_signals() {
        use owo_colors::OwoColorize;
        eprintln!("{} {}", "Warning:".yellow().bold(), note);
    }
    store.save(&doc)?;

    if replaced {
        println!("Logged {} for {} (supersedes the earlier entry for that day)", tag, day);
    } else {
        println!("Logged {} for {}", tag, day);
    }
    Ok(())
}
