//! Weekly money report: feed spend, milk revenue, and leak cards.
//!
//! Leak cards are deliberately padded to a fixed count of three so the
//! report always has the same shape, quiet weeks included.

use std::collections::BTreeMap;

use crate::models::DailySignal;
use crate::optimization::{estimate_feed_kg, CongestionLevel};

/// Trailing window the report aggregates over.
pub const REPORT_WINDOW_DAYS: usize = 7;

const LEAK_CARD_COUNT: usize = 3;

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

fn dollar_range(base: f64, low: f64, high: f64) -> String {
    format!(
        "${}-${}",
        (base * low).round() as i64,
        (base * high).round() as i64
    )
}

#[derive(Debug, Clone, PartialEq)]
pub struct WeeklyFeedSpend {
    pub feed_kg_week: f64,
    pub feed_spend_week: f64,
    /// True when any day in the window had no manually logged intake.
    pub is_estimated: bool,
}

pub fn weekly_feed_spend(
    history_by_tag: &BTreeMap<String, Vec<DailySignal>>,
    feed_cost_per_kg: f64,
    days: usize,
) -> WeeklyFeedSpend {
    let mut total_kg = 0.0;
    let mut estimated = false;

    for series in history_by_tag.values() {
        let start = series.len().saturating_sub(days);
        for day in &series[start..] {
            if day.feed_intake_est_kg_today.is_none() {
                estimated = true;
            }
            total_kg += estimate_feed_kg(day);
        }
    }

    WeeklyFeedSpend {
        feed_kg_week: round2(total_kg),
        feed_spend_week: round2(total_kg * feed_cost_per_kg),
        is_estimated: estimated,
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct WeeklyMilkRevenue {
    pub milk_liters_week: f64,
    /// `None` when no milk price is configured.
    pub milk_revenue_week: Option<f64>,
}

pub fn weekly_milk_revenue(
    history_by_tag: &BTreeMap<String, Vec<DailySignal>>,
    milk_price_per_liter: Option<f64>,
    days: usize,
) -> WeeklyMilkRevenue {
    let Some(price) = milk_price_per_liter else {
        return WeeklyMilkRevenue {
            milk_liters_week: 0.0,
            milk_revenue_week: None,
        };
    };

    let mut liters = 0.0;
    for series in history_by_tag.values() {
        let start = series.len().saturating_sub(days);
        for day in &series[start..] {
            liters += day.milk_liters_today.unwrap_or(0.0);
        }
    }

    WeeklyMilkRevenue {
        milk_liters_week: round2(liters),
        milk_revenue_week: Some(round2(liters * price)),
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct MoneyLeak {
    pub title: String,
    pub why: &'static str,
    pub action: &'static str,
    pub impact_range_week: String,
}

/// Always returns exactly three cards, padding quiet weeks with a routine
/// maintenance reminder.
pub fn money_leaks(
    weekly_spend: f64,
    congestion_level: CongestionLevel,
    heat_risk_count: usize,
    underperformer: Option<&str>,
) -> Vec<MoneyLeak> {
    let mut leaks = Vec::new();

    if let Some(name) = underperformer.filter(|n| !n.is_empty()) {
        leaks.push(MoneyLeak {
            title: format!("Cow {name}: high feed cost with weak output trend"),
            why: "Estimated feed spend is elevated while output trend is soft.",
            action: "Re-check eating consistency and investigate early lameness/illness if trend persists 24-48h.",
            impact_range_week: dollar_range(weekly_spend, 0.01, 0.03),
        });
    }

    if matches!(
        congestion_level,
        CongestionLevel::High | CongestionLevel::Medium
    ) {
        let (low, high) = if congestion_level == CongestionLevel::High {
            (0.012, 0.035)
        } else {
            (0.006, 0.018)
        };
        leaks.push(MoneyLeak {
            title: "Feeding congestion may be reducing intake consistency".to_string(),
            why: "Crowded feeding windows can displace lower-ranking cows.",
            action: "Stagger feeding in two waves or add feeding space during peak windows.",
            impact_range_week: dollar_range(weekly_spend, low, high),
        });
    }

    if heat_risk_count > 0 {
        leaks.push(MoneyLeak {
            title: "Heat window intake loss".to_string(),
            why: "Hot/humid periods can suppress intake and output consistency.",
            action: "Shift feeding earlier/later and ensure water + shade before hot hours.",
            impact_range_week: dollar_range(weekly_spend, 0.01, 0.025),
        });
    }

    while leaks.len() < LEAK_CARD_COUNT {
        leaks.push(MoneyLeak {
            title: "Routine maintenance gap".to_string(),
            why: "Missed maintenance can cause avoidable feed and labor losses.",
            action: "Keep camera/feeder/water maintenance tasks on schedule this week.",
            impact_range_week: "$5-$20".to_string(),
        });
    }

    leaks.truncate(LEAK_CARD_COUNT);
    leaks
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn series_of(days: usize, trough: f64, manual_kg: Option<f64>, milk: Option<f64>) -> Vec<DailySignal> {
        let base = NaiveDate::from_ymd_opt(2024, 6, 1).unwrap();
        (0..days)
            .map(|i| {
                let mut s = DailySignal::empty(base + chrono::Duration::days(i as i64));
                s.trough_minutes_today = Some(trough);
                s.feed_intake_est_kg_today = manual_kg;
                s.milk_liters_today = milk;
                s
            })
            .collect()
    }

    #[test]
    fn feed_spend_sums_the_trailing_window_per_cow() {
        let mut history = BTreeMap::new();
        // 14 days logged, only the last 7 count: 7 * 10kg manual.
        history.insert("DE-101".to_string(), series_of(14, 0.0, Some(10.0), None));

        let spend = weekly_feed_spend(&history, 0.32, REPORT_WINDOW_DAYS);
        assert_eq!(spend.feed_kg_week, 70.0);
        assert_eq!(spend.feed_spend_week, 22.4);
        assert!(!spend.is_estimated);
    }

    #[test]
    fn derived_intake_flags_the_report_as_estimated() {
        let mut history = BTreeMap::new();
        history.insert("DE-101".to_string(), series_of(3, 100.0, None, None));

        let spend = weekly_feed_spend(&history, 0.32, REPORT_WINDOW_DAYS);
        // 3 days * (100 * 0.048)
        assert_eq!(spend.feed_kg_week, 14.4);
        assert!(spend.is_estimated);
    }

    #[test]
    fn milk_revenue_requires_a_price() {
        let mut history = BTreeMap::new();
        history.insert("DE-101".to_string(), series_of(7, 0.0, None, Some(20.0)));

        let none = weekly_milk_revenue(&history, None, REPORT_WINDOW_DAYS);
        assert_eq!(none.milk_liters_week, 0.0);
        assert_eq!(none.milk_revenue_week, None);

        let priced = weekly_milk_revenue(&history, Some(0.5), REPORT_WINDOW_DAYS);
        assert_eq!(priced.milk_liters_week, 140.0);
        assert_eq!(priced.milk_revenue_week, Some(70.0));
    }

    #[test]
    fn quiet_weeks_pad_out_to_three_routine_cards() {
        let leaks = money_leaks(1000.0, CongestionLevel::Low, 0, None);
        assert_eq!(leaks.len(), 3);
        assert!(leaks.iter().all(|l| l.title == "Routine maintenance gap"));
        assert_eq!(leaks[0].impact_range_week, "$5-$20");
    }

    #[test]
    fn triggered_leaks_come_before_padding() {
        let leaks = money_leaks(1000.0, CongestionLevel::Low, 2, None);
        assert_eq!(leaks.len(), 3);
        assert_eq!(leaks[0].title, "Heat window intake loss");
        assert_eq!(leaks[0].impact_range_week, "$10-$25");
        assert_eq!(leaks[1].title, "Routine maintenance gap");
    }

    #[test]
    fn a_busy_week_fills_all_three_cards() {
        let leaks = money_leaks(1000.0, CongestionLevel::High, 1, Some("Bella"));
        assert_eq!(leaks.len(), 3);
        assert_eq!(
            leaks[0].title,
            "Cow Bella: high feed cost with weak output trend"
        );
        assert_eq!(leaks[0].impact_range_week, "$10-$30");
        assert_eq!(leaks[1].impact_range_week, "$12-$35");
        assert_eq!(leaks[2].title, "Heat window intake loss");
    }

    #[test]
    fn medium_congestion_uses_the_softer_multipliers() {
        let leaks = money_leaks(1000.0, CongestionLevel::Medium, 0, None);
        assert_eq!(leaks[0].impact_range_week, "$6-$18");
    }

    #[test]
    fn empty_underperformer_name_is_ignored() {
        let leaks = money_leaks(1000.0, CongestionLevel::Low, 0, Some(""));
        assert!(leaks.iter().all(|l| l.title == "Routine maintenance gap"));
    }
}
