use anyhow::Result;
use byre_core::insights::RiskBucket;
use byre_core::models::FarmDocument;
use byre_core::optimization::{
    congestion_summary, feed_rows, recommendation_set, roi_summary, CongestionLevel, FeedRow,
};
use byre_core::report::{money_leaks, weekly_feed_spend, weekly_milk_revenue, REPORT_WINDOW_DAYS};
use byre_core::store::JsonStore;
use byre_core::timezone::{today_in, validate_timezone};
use owo_colors::{OwoColorize, Style};

use crate::cli::ReportCommand;
use crate::commands::insights::score_cow;
use crate::commands::load_document;
use crate::config::Config;
use crate::views::table::display_feed_rows;

pub fn show_report(store: &JsonStore, config: &Config, command: ReportCommand) -> Result<()> {
    validate_timezone(&config.timezone)?;
    let today = today_in(&config.timezone);
    let doc = load_document(store)?;

    let signals = doc.signals_on(today);
    let rows = feed_rows(&doc.cows, &signals, config.farm.feed_cost_per_kg);
    let congestion = congestion_summary(&doc.cows, &signals);

    let heat_risk_count = doc
        .cows
        .iter()
        .filter(|c| c.is_active)
        .filter_map(|cow| score_cow(&doc, cow, Some(today)))
        .filter(|insight| insight.report.top_bucket == RiskBucket::HeatStress)
        .count();

    let roi = roi_summary(&rows, &config.farm, heat_risk_count);
    let recommendations = recommendation_set(&rows, &roi, &congestion);

    let spend = weekly_feed_spend(
        &doc.daily_logs_by_ear_tag,
        config.farm.feed_cost_per_kg,
        REPORT_WINDOW_DAYS,
    );
    let revenue = weekly_milk_revenue(
        &doc.daily_logs_by_ear_tag,
        config.farm.milk_price_per_liter,
        REPORT_WINDOW_DAYS,
    );
    let leaks = money_leaks(
        spend.feed_spend_week,
        CongestionLevel::from_score(congestion.score),
        heat_risk_count,
        underperformer_name(&doc, &rows).as_deref(),
    );

    let header_style = Style::new().bold().underline();

    println!("{}", format!("Weekly money report for {}", today).style(header_style));
    println!(
        "  Feed spend (last {} days):   ${:.2}{}",
        REPORT_WINDOW_DAYS,
        spend.feed_spend_week,
        if spend.is_estimated { " (estimated)" } else { "" }
    );
    match revenue.milk_revenue_week {
        Some(amount) => println!(
            "  Milk revenue (last {} days): ${:.2} ({:.1} L)",
            REPORT_WINDOW_DAYS, amount, revenue.milk_liters_week
        ),
        None => println!(
            "  Milk revenue (last {} days): not tracked (set milk_price_per_liter)",
            REPORT_WINDOW_DAYS
        ),
    }

    println!();
    println!("{}", "Where money is leaking".style(header_style));
    for (idx, leak) in leaks.iter().enumerate() {
        println!(
            "  {}. {} {}",
            idx + 1,
            leak.title.bright_white(),
            format!("({}/week)", leak.impact_range_week).yellow()
        );
        println!("     {}", leak.why);
        println!("     Do next: {}", leak.action);
    }

    println!();
    println!("{}", "Feeding congestion".style(header_style));
    let level = CongestionLevel::from_score(congestion.score);
    println!(
        "  {} (score {:.2}, about {:.1} cows at once)",
        level, congestion.score, congestion.avg_cows_simultaneous
    );
    println!("  {}", congestion.explanation);
    if !congestion.peak_windows.is_empty() {
        println!("  Peaks: {}", congestion.peak_windows.join(", "));
    }
    for action in congestion.actions {
        println!("  - {}", action);
    }

    println!();
    println!("{}", "Month ahead".style(header_style));
    println!(
        "  Feed burn: {:.1} kg/day, about ${:.0}/month",
        roi.feed_burn_rate_kg_day, roi.projected_monthly_feed_cost
    );
    match roi.projected_monthly_revenue {
        Some(amount) => println!("  Milk revenue: about ${:.0}/month", amount),
        None => println!("  Milk revenue: not tracked"),
    }
    if let Some(profit) = roi.estimated_profit {
        println!("  Estimated margin: ${:.0}/month", profit);
    }
    match roi.days_of_feed_remaining {
        Some(days) => println!("  Feed on hand: about {:.1} days", days),
        None => println!("  Feed on hand: not tracked (set available_feed_kg_current)"),
    }
    println!(
        "  Cutting typical feed waste saves ${:.0}-${:.0}/month",
        roi.waste_savings_range.0, roi.waste_savings_range.1
    );
    println!(
        "  Catching lameness early avoids ${:.0}-${:.0} per case",
        roi.avoided_lameness_range.0, roi.avoided_lameness_range.1
    );

    println!();
    println!("{}", "Recommendations".style(header_style));
    for (idx, rec) in recommendations.iter().enumerate() {
        println!(
            "  {}. {} {} (confidence: {})",
            idx + 1,
            rec.title.bright_white(),
            format!("({})", rec.impact_range).yellow(),
            rec.confidence
        );
        println!("     {}", rec.why);
        println!("     Do next: {}", rec.instruction);
    }

    if command.feed {
        println!();
        println!("{}", "Per-cow feed economics (today)".style(header_style));
        display_feed_rows(&rows);
    }

    Ok(())
}

/// Name of the cow burning the most feed per liter today, for the leak
/// card. First strict maximum wins ties, unnamed cows yield nothing.
fn underperformer_name(doc: &FarmDocument, rows: &[FeedRow]) -> Option<String> {
    let mut worst: Option<&FeedRow> = None;
    for row in rows.iter().filter(|r| r.cost_per_liter.is_some()) {
        if worst.map_or(true, |w| row.cost_per_liter > w.cost_per_liter) {
            worst = Some(row);
        }
    }
    worst
        .and_then(|row| doc.find_cow(&row.cow_id))
        .map(|cow| cow.name.clone())
}
