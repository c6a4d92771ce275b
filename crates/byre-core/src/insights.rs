//! Behaviour-based risk scoring.
//!
//! Each cow's day is compared against her rolling baseline and scored into
//! seven risk buckets with a softmax; the result is a probability ranking,
//! a confidence grade from sensor coverage, and a short "why" list of the
//! deltas that drove it.

use chrono::NaiveDate;

use crate::models::{Cow, DailySignal, Sex};

/// How many trailing days feed the rolling baseline.
pub const BASELINE_WINDOW: usize = 21;

/// Relative change below this is treated as ordinary day-to-day noise.
const WHY_THRESHOLD: f64 = 0.12;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RiskBucket {
    HeatStress,
    PreCalving,
    Illness,
    LowIntake,
    WaterAccess,
    SocialStress,
    Normal,
}

impl RiskBucket {
    pub const ALL: [RiskBucket; 7] = [
        RiskBucket::HeatStress,
        RiskBucket::PreCalving,
        RiskBucket::Illness,
        RiskBucket::LowIntake,
        RiskBucket::WaterAccess,
        RiskBucket::SocialStress,
        RiskBucket::Normal,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            RiskBucket::HeatStress => "Heat stress risk",
            RiskBucket::PreCalving => "Pre-calving / calving soon risk",
            RiskBucket::Illness => "Illness/injury risk",
            RiskBucket::LowIntake => "Low intake anomaly",
            RiskBucket::WaterAccess => "Water access issue",
            RiskBucket::SocialStress => "Social stress / resource competition",
            RiskBucket::Normal => "Normal variation / Other",
        }
    }

    pub fn actions(&self) -> &'static [&'static str] {
        match self {
            RiskBucket::HeatStress => &[
                "Check water trough flow/cleanliness",
                "Add shade near feeder",
                "Feed during cooler hours",
                "Watch for rapid breathing",
            ],
            RiskBucket::PreCalving => &[
                "Increase monitoring",
                "Prepare calving area",
                "Look for restlessness/isolation",
                "Contact experienced handler if distressed",
            ],
            RiskBucket::Illness => &[
                "Inspect gait/hooves",
                "Check appetite again in 6 hours",
                "Check manure/hydration",
                "If worsening contact vet",
            ],
            RiskBucket::LowIntake => &[
                "Re-check feed quality",
                "Confirm feeder access",
                "Observe next meal attendance",
            ],
            RiskBucket::WaterAccess => &[
                "Inspect trough",
                "Add second trough",
                "Move trough closer to shade",
            ],
            RiskBucket::SocialStress => &[
                "Increase feeding space",
                "Separate during feeding",
                "Observe bullying",
            ],
            RiskBucket::Normal => &["Continue routine checks"],
        }
    }
}

impl std::fmt::Display for RiskBucket {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// Per-metric rolling means for one cow. `None` means the metric never
/// appeared in the window.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SignalBaseline {
    pub trough_minutes_today: Option<f64>,
    pub meals_count_today: Option<f64>,
    pub avg_meal_minutes_today: Option<f64>,
    pub feed_intake_est_kg_today: Option<f64>,
    pub activity_index_today: Option<f64>,
    pub alone_minutes_today: Option<f64>,
    pub water_visits_today: Option<f64>,
    pub water_minutes_today: Option<f64>,
    pub lying_minutes_today: Option<f64>,
    pub temp_c_today: Option<f64>,
    pub humidity_pct_today: Option<f64>,
    pub milk_liters_today: Option<f64>,
}

#[derive(Debug, Clone)]
pub struct InsightReport {
    /// All seven buckets in canonical order; values sum to 1.
    pub probabilities: Vec<(RiskBucket, f64)>,
    pub confidence: f64,
    pub top_bucket: RiskBucket,
    pub why: Vec<String>,
    pub actions: &'static [&'static str],
}

impl InsightReport {
    /// Probability mass assigned to the winning bucket.
    pub fn top_probability(&self) -> f64 {
        self.probabilities
            .iter()
            .find(|(bucket, _)| *bucket == self.top_bucket)
            .map(|(_, p)| *p)
            .unwrap_or(0.0)
    }
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

fn mean_of<I: Iterator<Item = Option<f64>>>(values: I) -> Option<f64> {
    let vals: Vec<f64> = values.flatten().filter(|v| v.is_finite()).collect();
    if vals.is_empty() {
        None
    } else {
        Some(round2(vals.iter().sum::<f64>() / vals.len() as f64))
    }
}

/// Mean of the last [`BASELINE_WINDOW`] entries per metric, skipping gaps.
pub fn rolling_baseline(series: &[DailySignal], window: usize) -> SignalBaseline {
    let start = series.len().saturating_sub(window);
    let recent = &series[start..];
    SignalBaseline {
        trough_minutes_today: mean_of(recent.iter().map(|s| s.trough_minutes_today)),
        meals_count_today: mean_of(recent.iter().map(|s| s.meals_count_today)),
        avg_meal_minutes_today: mean_of(recent.iter().map(|s| s.avg_meal_minutes_today)),
        feed_intake_est_kg_today: mean_of(recent.iter().map(|s| s.feed_intake_est_kg_today)),
        activity_index_today: mean_of(recent.iter().map(|s| s.activity_index_today)),
        alone_minutes_today: mean_of(recent.iter().map(|s| s.alone_minutes_today)),
        water_visits_today: mean_of(recent.iter().map(|s| s.water_visits_today)),
        water_minutes_today: mean_of(recent.iter().map(|s| s.water_minutes_today)),
        lying_minutes_today: mean_of(recent.iter().map(|s| s.lying_minutes_today)),
        temp_c_today: mean_of(recent.iter().map(|s| s.temp_c_today)),
        humidity_pct_today: mean_of(recent.iter().map(|s| s.humidity_pct_today)),
        milk_liters_today: mean_of(recent.iter().map(|s| s.milk_liters_today)),
    }
}

/// Relative change of `value` against `baseline`. `None` when either side
/// is missing or the baseline is zero.
pub fn pct_change(value: Option<f64>, baseline: Option<f64>) -> Option<f64> {
    match (value, baseline) {
        (Some(v), Some(b)) if b != 0.0 => Some((v - b) / b),
        _ => None,
    }
}

fn softmax(scores: &[(RiskBucket, f64)]) -> Vec<(RiskBucket, f64)> {
    let max_score = scores
        .iter()
        .map(|(_, s)| *s)
        .fold(f64::NEG_INFINITY, f64::max);
    let exps: Vec<(RiskBucket, f64)> = scores
        .iter()
        .map(|(b, s)| (*b, (s - max_score).exp()))
        .collect();
    let total: f64 = exps.iter().map(|(_, e)| e).sum();
    let total = if total > 0.0 { total } else { 1.0 };
    exps.into_iter().map(|(b, e)| (b, e / total)).collect()
}

/// Scores one cow-day against her baseline.
pub fn score_insights(
    cow: &Cow,
    today: &DailySignal,
    baseline: &SignalBaseline,
    on: NaiveDate,
) -> InsightReport {
    let intake_delta =
        pct_change(today.trough_minutes_today, baseline.trough_minutes_today).unwrap_or(0.0);
    let meals_delta =
        pct_change(today.meals_count_today, baseline.meals_count_today).unwrap_or(0.0);
    let activity_delta =
        pct_change(today.activity_index_today, baseline.activity_index_today).unwrap_or(0.0);
    let alone_delta =
        pct_change(today.alone_minutes_today, baseline.alone_minutes_today).unwrap_or(0.0);
    let water_delta =
        pct_change(today.water_visits_today, baseline.water_visits_today).unwrap_or(0.0);

    let heat_day = matches!(
        (today.temp_c_today, today.humidity_pct_today),
        (Some(t), Some(h)) if t >= 30.0 && h >= 65.0
    );

    let pre_calving_pressure = match (cow.sex, cow.pregnancy_due_date) {
        (Sex::Female, Some(due)) => {
            let days_until = (due - on).num_days() as f64;
            ((21.0 - days_until) / 14.0).max(0.0)
        }
        _ => 0.0,
    };

    let scores = [
        (
            RiskBucket::HeatStress,
            0.2 + if heat_day { 1.1 } else { 0.0 } + (-intake_delta).max(0.0) * 0.8,
        ),
        (
            RiskBucket::PreCalving,
            0.2 + pre_calving_pressure + alone_delta.max(0.0) * 0.5,
        ),
        (
            RiskBucket::Illness,
            0.2 + (-activity_delta).max(0.0) * 1.0 + (-intake_delta).max(0.0) * 0.6,
        ),
        (
            RiskBucket::LowIntake,
            0.2 + (-intake_delta).max(0.0) * 1.1 + (-meals_delta).max(0.0) * 0.9,
        ),
        (
            RiskBucket::WaterAccess,
            0.2 + (-water_delta).max(0.0) * 1.2 + if heat_day { 0.5 } else { 0.0 },
        ),
        (
            RiskBucket::SocialStress,
            0.2 + alone_delta.max(0.0) * 1.0 + (-meals_delta).max(0.0) * 0.3,
        ),
        (RiskBucket::Normal, 0.45),
    ];

    let probabilities = softmax(&scores);
    let top_bucket = probabilities
        .iter()
        .fold((RiskBucket::Normal, f64::NEG_INFINITY), |best, &(b, p)| {
            if p > best.1 {
                (b, p)
            } else {
                best
            }
        })
        .0;

    let available = [
        today.trough_minutes_today,
        today.meals_count_today,
        today.activity_index_today,
        today.alone_minutes_today,
        today.water_visits_today,
    ]
    .iter()
    .filter(|v| v.is_some())
    .count();
    let confidence = (available as f64 / 5.0).clamp(0.15, 0.98);

    let mut why = Vec::new();
    for (label, delta) in [
        ("Eating time", intake_delta),
        ("Meal count", meals_delta),
        ("Activity", activity_delta),
        ("Alone time", alone_delta),
        ("Water visits", water_delta),
    ] {
        if delta.abs() >= WHY_THRESHOLD {
            why.push(format!("{} {:+.0}% vs baseline", label, delta * 100.0));
        }
    }
    why.truncate(4);

    InsightReport {
        probabilities,
        confidence,
        top_bucket,
        why,
        actions: top_bucket.actions(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ProductionType;

    fn day() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, 20).unwrap()
    }

    fn create_test_cow() -> Cow {
        Cow {
            cow_id: "cow-1".to_string(),
            ear_tag_id: "DE-102".to_string(),
            name: "Bella".to_string(),
            sex: Sex::Female,
            production_type: ProductionType::Dairy,
            date_of_birth: None,
            pregnancy_due_date: None,
            vaccination_status: vec![],
            weight_kg: None,
            notes: String::new(),
            is_active: true,
        }
    }

    fn steady_baseline() -> SignalBaseline {
        SignalBaseline {
            trough_minutes_today: Some(150.0),
            meals_count_today: Some(8.0),
            activity_index_today: Some(1.0),
            alone_minutes_today: Some(60.0),
            water_visits_today: Some(6.0),
            ..SignalBaseline::default()
        }
    }

    fn steady_day() -> DailySignal {
        let mut signal = DailySignal::empty(day());
        signal.trough_minutes_today = Some(150.0);
        signal.meals_count_today = Some(8.0);
        signal.activity_index_today = Some(1.0);
        signal.alone_minutes_today = Some(60.0);
        signal.water_visits_today = Some(6.0);
        signal
    }

    #[test]
    fn probabilities_cover_all_buckets_and_sum_to_one() {
        let report = score_insights(&create_test_cow(), &steady_day(), &steady_baseline(), day());
        assert_eq!(report.probabilities.len(), 7);
        let total: f64 = report.probabilities.iter().map(|(_, p)| p).sum();
        assert!((total - 1.0).abs() < 1e-9);
    }

    #[test]
    fn an_uneventful_day_reads_as_normal_variation() {
        let report = score_insights(&create_test_cow(), &steady_day(), &steady_baseline(), day());
        assert_eq!(report.top_bucket, RiskBucket::Normal);
        assert!(report.why.is_empty());
    }

    #[test]
    fn hot_humid_days_with_suppressed_intake_rank_heat_stress_first() {
        let mut signal = steady_day();
        signal.temp_c_today = Some(33.0);
        signal.humidity_pct_today = Some(72.0);
        signal.trough_minutes_today = Some(75.0); // half the baseline

        let report = score_insights(&create_test_cow(), &signal, &steady_baseline(), day());
        assert_eq!(report.top_bucket, RiskBucket::HeatStress);
        assert!(report.why.iter().any(|w| w.contains("Eating time -50%")));
    }

    #[test]
    fn imminent_calving_dominates_for_pregnant_cows() {
        let mut cow = create_test_cow();
        cow.pregnancy_due_date = Some(day() + chrono::Duration::days(3));

        let report = score_insights(&cow, &steady_day(), &steady_baseline(), day());
        assert_eq!(report.top_bucket, RiskBucket::PreCalving);
        assert_eq!(report.actions, RiskBucket::PreCalving.actions());
    }

    #[test]
    fn pregnancy_is_ignored_for_males() {
        let mut cow = create_test_cow();
        cow.sex = Sex::Male;
        cow.pregnancy_due_date = Some(day() + chrono::Duration::days(3));

        let report = score_insights(&cow, &steady_day(), &steady_baseline(), day());
        assert_eq!(report.top_bucket, RiskBucket::Normal);
    }

    #[test]
    fn confidence_tracks_sensor_coverage() {
        let full = score_insights(&create_test_cow(), &steady_day(), &steady_baseline(), day());
        assert!((full.confidence - 0.98).abs() < 1e-9);

        let empty = score_insights(
            &create_test_cow(),
            &DailySignal::empty(day()),
            &steady_baseline(),
            day(),
        );
        assert!((empty.confidence - 0.15).abs() < 1e-9);
    }

    #[test]
    fn small_deltas_stay_out_of_the_why_list() {
        let mut signal = steady_day();
        signal.trough_minutes_today = Some(140.0); // ~-7%, under the threshold

        let report = score_insights(&create_test_cow(), &signal, &steady_baseline(), day());
        assert!(report.why.is_empty());
    }

    #[test]
    fn pct_change_handles_gaps_and_zero_baselines() {
        assert_eq!(pct_change(Some(10.0), Some(0.0)), None);
        assert_eq!(pct_change(None, Some(5.0)), None);
        assert_eq!(pct_change(Some(10.0), None), None);
        assert_eq!(pct_change(Some(6.0), Some(5.0)), Some(0.2));
    }

    #[test]
    fn rolling_baseline_means_recent_entries_and_skips_gaps() {
        let base = NaiveDate::from_ymd_opt(2024, 6, 1).unwrap();
        let mut series = Vec::new();
        for i in 0..30 {
            let mut s = DailySignal::empty(base + chrono::Duration::days(i));
            // Old entries carry an outlier that must age out of the window.
            s.trough_minutes_today = if i < 9 { Some(999.0) } else { Some(100.0) };
            s.milk_liters_today = if i % 2 == 0 { Some(20.0) } else { None };
            series.push(s);
        }

        let baseline = rolling_baseline(&series, BASELINE_WINDOW);
        assert_eq!(baseline.trough_minutes_today, Some(100.0));
        assert_eq!(baseline.milk_liters_today, Some(20.0));
        assert_eq!(baseline.temp_c_today, None);
    }
}
