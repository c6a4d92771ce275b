use anyhow::{anyhow, Result};
use byre_core::error::CoreError;
use byre_core::insights::{rolling_baseline, score_insights, RiskBucket, BASELINE_WINDOW};
use byre_core::models::{Cow, FarmDocument};
use byre_core::store::JsonStore;
use byre_core::timezone::{today_in, validate_timezone};
use chrono::NaiveDate;

use crate::cli::InsightsCommand;
use crate::commands::load_document;
use crate::config::Config;
use crate::parser::parse_natural_date;
use crate::util::resolve_cow_id;
use crate::views::table::{display_insights, ViewInsight};

pub fn show_insights(store: &JsonStore, config: &Config, command: InsightsCommand) -> Result<()> {
    validate_timezone(&config.timezone)?;
    let today = today_in(&config.timezone);
    let doc = load_document(store)?;

    let date_override = command
        .date
        .as_deref()
        .map(|raw| parse_natural_date(raw, today))
        .transpose()?;

    if let Some(key) = &command.ear_tag {
        let cow_id = resolve_cow_id(&doc, key)?;
        let Some(cow) = doc.find_cow(&cow_id) else {
            return Err(anyhow!(CoreError::NotFound(format!(
                "No cow found matching '{}'",
                key
            ))));
        };
        let Some(insight) = score_cow(&doc, cow, date_override) else {
            return Err(anyhow!(CoreError::NotFound(format!(
                "No logged day to score for '{}'. Use 'byre log' first.",
                cow.ear_tag_id
            ))));
        };
        print_detail(cow, &insight);
    } else {
        let mut rows = Vec::new();
        for cow in doc.cows.iter().filter(|c| c.is_active) {
            if let Some(insight) = score_cow(&doc, cow, date_override) {
                rows.push(insight);
            }
        }
        display_insights(&rows);
    }
    Ok(())
}

/// Score one cow's chosen day against the rolling baseline built from the
/// days before it. Returns `None` when there is nothing to score.
pub(crate) fn score_cow(
    doc: &FarmDocument,
    cow: &Cow,
    date_override: Option<NaiveDate>,
) -> Option<ViewInsight> {
    let series = doc.daily_logs_by_ear_tag.get(&cow.ear_tag_id)?;
    let idx = match date_override {
        Some(day) => series.iter().rposition(|s| s.day == day)?,
        None => series.len().checked_sub(1)?,
    };
    let signal = &series[idx];
    let baseline = rolling_baseline(&series[..idx], BASELINE_WINDOW);
    let report = score_insights(cow, signal, &baseline, signal.day);
    Some(ViewInsight {
        ear_tag_id: cow.ear_tag_id.clone(),
        name: cow.name.clone(),
        day: signal.day,
        report,
    })
}

fn print_detail(cow: &Cow, insight: &ViewInsight) {
    use owo_colors::OwoColorize;

    let who = if cow.name.is_empty() {
        cow.ear_tag_id.clone()
    } else {
        format!("{} ({})", cow.name, cow.ear_tag_id)
    };
    println!("{} on {}", who.bright_white().bold(), insight.day);

    let label = insight.report.top_bucket.label();
    let styled = if insight.report.top_bucket == RiskBucket::Normal {
        label.green().to_string()
    } else {
        label.red().bold().to_string()
    };
    println!(
        "Top risk: {} ({:.0}% probability, {:.0}% confidence)",
        styled,
        insight.report.top_probability() * 100.0,
        insight.report.confidence * 100.0
    );

    if !insight.report.why.is_empty() {
        println!();
        println!("What moved:");
        for line in &insight.report.why {
            println!("  • {}", line);
        }
    }

    println!();
    println!("Suggested actions:");
    for action in insight.report.actions {
        println!("  • {}", action);
    }

    println!();
    println!("All buckets:");
    for (bucket, probability) in &insight.report.probabilities {
        println!("  {:>3.0}%  {}", probability * 100.0, bucket.label());
    }
}
