//! Range normalization for incoming daily signals.
//!
//! Camera exports sometimes arrive in the wrong unit (seconds or even
//! milliseconds instead of minutes) or with out-of-range values. The
//! sanitizer repairs what it can and reports every adjustment as a note;
//! the caller decides how to surface them. Nothing here ever fails.

use crate::models::{DailySignal, FarmDocument};

const MINUTES_PER_DAY: f64 = 1440.0;

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

fn normalize_minutes(slot: &mut Option<f64>, field: &str, context: &str, notes: &mut Vec<String>) {
    let Some(raw) = *slot else { return };
    if !raw.is_finite() {
        notes.push(format!("{context}.{field}: dropped non-numeric value"));
        *slot = None;
        return;
    }

    let mut value = raw;
    if value > MINUTES_PER_DAY {
        if value > 100_000.0 {
            value /= 60_000.0;
            notes.push(format!(
                "{context}.{field}: {raw} looked oversized, converted from milliseconds to minutes"
            ));
        } else if value > MINUTES_PER_DAY * 3.0 {
            value /= 60.0;
            notes.push(format!(
                "{context}.{field}: {raw} looked oversized, converted from seconds to minutes"
            ));
        }
    }

    if !(0.0..=MINUTES_PER_DAY).contains(&value) {
        notes.push(format!(
            "{context}.{field}: {raw} out of range, clamped to 0-1440"
        ));
        value = value.clamp(0.0, MINUTES_PER_DAY);
    }

    *slot = Some(round2(value));
}

/// Repairs one signal in place and returns notes describing what changed.
/// An empty result means the record was already clean.
pub fn sanitize_signal(signal: &mut DailySignal, context: &str) -> Vec<String> {
    let mut notes = Vec::new();

    normalize_minutes(
        &mut signal.alone_minutes_today,
        "alone_minutes_today",
        context,
        &mut notes,
    );
    normalize_minutes(
        &mut signal.trough_minutes_today,
        "trough_minutes_today",
        context,
        &mut notes,
    );
    normalize_minutes(
        &mut signal.lying_minutes_today,
        "lying_minutes_today",
        context,
        &mut notes,
    );
    normalize_minutes(
        &mut signal.water_minutes_today,
        "water_minutes_today",
        context,
        &mut notes,
    );
    normalize_minutes(
        &mut signal.avg_meal_minutes_today,
        "avg_meal_minutes_today",
        context,
        &mut notes,
    );

    let mut repaired: Vec<f64> = Vec::with_capacity(signal.meal_timestamps.len());
    for &minute in &signal.meal_timestamps {
        if !minute.is_finite() {
            notes.push(format!("{context}.meal_timestamps: dropped non-numeric entry"));
            continue;
        }
        if !(0.0..=MINUTES_PER_DAY).contains(&minute) {
            notes.push(format!(
                "{context}.meal_timestamps: entry {minute} out of range, clamped to 0-1440"
            ));
        }
        repaired.push(minute.clamp(0.0, MINUTES_PER_DAY).round());
    }
    repaired.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
    signal.meal_timestamps = repaired;

    if let Some(raw) = signal.activity_index_today {
        if raw.is_finite() {
            if !(0.0..=2.0).contains(&raw) {
                notes.push(format!(
                    "{context}.activity_index_today: {raw} out of range, clamped to 0-2"
                ));
            }
            signal.activity_index_today = Some(round2(raw.clamp(0.0, 2.0)));
        } else {
            notes.push(format!(
                "{context}.activity_index_today: dropped non-numeric value"
            ));
            signal.activity_index_today = None;
        }
    }

    notes
}

impl FarmDocument {
    /// Repairs every stored signal in place, returning the combined notes.
    pub fn sanitize_signals(&mut self) -> Vec<String> {
        let mut notes = Vec::new();
        for (tag, series) in &mut self.daily_logs_by_ear_tag {
            for (idx, signal) in series.iter_mut().enumerate() {
                let context = format!("{tag}[{idx}]");
                notes.extend(sanitize_signal(signal, &context));
            }
        }
        notes
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn day() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, 10).unwrap()
    }

    #[test]
    fn clean_signals_produce_no_notes() {
        let mut signal = DailySignal::empty(day());
        signal.trough_minutes_today = Some(148.0);
        signal.meal_timestamps = vec![360.0, 780.0];
        assert!(sanitize_signal(&mut signal, "t").is_empty());
        assert_eq!(signal.trough_minutes_today, Some(148.0));
    }

    #[test]
    fn second_valued_minutes_are_converted() {
        let mut signal = DailySignal::empty(day());
        // 2.5 hours expressed in seconds.
        signal.trough_minutes_today = Some(9000.0);
        let notes = sanitize_signal(&mut signal, "t");
        assert_eq!(signal.trough_minutes_today, Some(150.0));
        assert_eq!(notes.len(), 1);
        assert!(notes[0].contains("seconds"));
    }

    #[test]
    fn millisecond_valued_minutes_are_converted() {
        let mut signal = DailySignal::empty(day());
        signal.alone_minutes_today = Some(5_400_000.0);
        let notes = sanitize_signal(&mut signal, "t");
        assert_eq!(signal.alone_minutes_today, Some(90.0));
        assert!(notes[0].contains("milliseconds"));
    }

    #[test]
    fn negative_minutes_are_clamped_to_zero() {
        let mut signal = DailySignal::empty(day());
        signal.lying_minutes_today = Some(-30.0);
        let notes = sanitize_signal(&mut signal, "t");
        assert_eq!(signal.lying_minutes_today, Some(0.0));
        assert_eq!(notes.len(), 1);
    }

    #[test]
    fn meal_timestamps_are_clamped_rounded_and_sorted() {
        let mut signal = DailySignal::empty(day());
        signal.meal_timestamps = vec![780.4, -5.0, 2000.0, 360.0];
        sanitize_signal(&mut signal, "t");
        assert_eq!(signal.meal_timestamps, vec![0.0, 360.0, 780.0, 1440.0]);
    }

    #[test]
    fn activity_index_is_clamped_to_its_band() {
        let mut signal = DailySignal::empty(day());
        signal.activity_index_today = Some(3.7);
        let notes = sanitize_signal(&mut signal, "t");
        assert_eq!(signal.activity_index_today, Some(2.0));
        assert_eq!(notes.len(), 1);
    }

    #[test]
    fn document_sanitize_walks_every_series() {
        let mut doc = FarmDocument::default();
        let mut bad = DailySignal::empty(day());
        bad.trough_minutes_today = Some(9000.0);
        doc.append_daily_log("de-102", bad);
        doc.append_daily_log("de-103", DailySignal::empty(day()));

        let notes = doc.sanitize_signals();
        assert_eq!(notes.len(), 1);
        assert!(notes[0].starts_with("DE-102[0]"));
        assert_eq!(
            doc.daily_logs_by_ear_tag["DE-102"][0].trough_minutes_today,
            Some(150.0)
        );
    }
}
