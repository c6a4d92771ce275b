use byre_core::insights::{rolling_baseline, score_insights, RiskBucket, BASELINE_WINDOW};
use byre_core::models::*;
use byre_core::optimization::{congestion_summary, feed_rows};
use byre_core::recurrence::ProjectionConfig;
use byre_core::store::JsonStore;
use chrono::{DateTime, Duration, NaiveDate, TimeZone, Utc};
use tempfile::TempDir;

/// Helper function to create a test store backed by a temp directory
fn setup_test_store() -> (JsonStore, TempDir) {
    let temp_dir = tempfile::tempdir().expect("Failed to create temp directory");
    let store = JsonStore::new(temp_dir.path().join("byre.json"));
    (store, temp_dir)
}

fn test_now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 3, 10, 9, 30, 0).unwrap()
}

/// Helper function to create a test template
fn create_test_template(template_id: &str, every: u32, unit: RecurrenceUnit) -> TaskTemplate {
    TaskTemplate {
        template_id: template_id.to_string(),
        title: format!("Template {template_id}"),
        category: "equipment".to_string(),
        start_date: test_now().date_naive(),
        recurrence: Some(RecurrenceRule { every, unit }),
        default_time: None,
        assigned_to: None,
        notes: String::new(),
    }
}

/// Helper function to create a test cow
fn create_test_cow(cow_id: &str, ear_tag: &str) -> Cow {
    Cow {
        cow_id: cow_id.to_string(),
        ear_tag_id: ear_tag.to_string(),
        name: format!("Cow {ear_tag}"),
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

#[test]
fn test_recurring_occurrence_lifecycle_workflow() {
    let (store, _temp_dir) = setup_test_store();
    let now = test_now();

    // Create a weekly task and persist it.
    let mut doc = store.load().expect("Failed to load empty store");
    let occurrence = doc.add_custom_occurrence(
        NewOccurrenceData {
            title: "Flush water lines".to_string(),
            category: "equipment".to_string(),
            due_date: now.date_naive(),
            due_time: None,
            assigned_to: Some("Jonas".to_string()),
            recurrence: Some(RecurrenceRule {
                every: 1,
                unit: RecurrenceUnit::Weeks,
            }),
            recurrence_anchor: RecurrenceAnchor::Completion,
            notes: String::new(),
        },
        now,
    );
    store.save(&doc).expect("Failed to save document");

    // Reload and complete it.
    let mut doc = store.load().expect("Failed to reload document");
    let receipt = doc.mark_done(&occurrence.occurrence_id, now);
    let completed = receipt.completed.expect("Expected the occurrence to complete");
    assert_eq!(completed.status, OccurrenceStatus::Done);
    let next = receipt.generated.expect("Expected a follow-up occurrence");
    assert_eq!(next.due_date, now.date_naive() + Duration::days(7));
    store.save(&doc).expect("Failed to save document");

    // The outcome survives another round trip.
    let doc = store.load().expect("Failed to reload document");
    let done = doc
        .find_occurrence(&occurrence.occurrence_id)
        .expect("Original occurrence missing after reload");
    assert_eq!(done.status, OccurrenceStatus::Done);
    assert!(done.completed_at.is_some());
    assert!(doc.find_occurrence(&next.occurrence_id).is_some());
    assert_eq!(doc.history.len(), 1);
    assert_eq!(doc.history[0].occurrence_id, occurrence.occurrence_id);
    assert_eq!(doc.history[0].action, HistoryAction::Done);
}

#[test]
fn test_skip_does_not_reschedule_workflow() {
    let (store, _temp_dir) = setup_test_store();
    let now = test_now();

    let mut doc = store.load().expect("Failed to load empty store");
    let occurrence = doc.add_custom_occurrence(
        NewOccurrenceData {
            title: "Hoof check".to_string(),
            category: "health".to_string(),
            due_date: now.date_naive(),
            due_time: None,
            assigned_to: None,
            recurrence: Some(RecurrenceRule {
                every: 2,
                unit: RecurrenceUnit::Days,
            }),
            recurrence_anchor: RecurrenceAnchor::Completion,
            notes: String::new(),
        },
        now,
    );

    let receipt = doc.mark_skipped(&occurrence.occurrence_id, now);
    assert!(receipt.generated.is_none());
    store.save(&doc).expect("Failed to save document");

    let doc = store.load().expect("Failed to reload document");
    assert_eq!(doc.occurrences.len(), 1);
    assert_eq!(doc.occurrences[0].status, OccurrenceStatus::Skipped);
    assert_eq!(doc.history.len(), 1);
    assert_eq!(doc.history[0].action, HistoryAction::Skipped);
}

#[test]
fn test_template_projection_workflow() {
    let (store, _temp_dir) = setup_test_store();
    let now = test_now();
    let today = now.date_naive();
    let config = ProjectionConfig::default();

    let mut doc = store.load().expect("Failed to load empty store");
    doc.upsert_template(create_test_template("tmpl-filters", 2, RecurrenceUnit::Weeks));
    let generated = doc.sync_projections(&config, today, now);
    // 90-day horizon at a 2-week step: start date plus six more slots.
    assert_eq!(generated, 7);
    store.save(&doc).expect("Failed to save document");

    // Resyncing a persisted plan adds nothing.
    let mut doc = store.load().expect("Failed to reload document");
    assert_eq!(doc.sync_projections(&config, today, now), 0);

    // Skipping a projected slot must not let resync recreate it.
    let first_id = doc.occurrences[0].occurrence_id.clone();
    doc.mark_skipped(&first_id, now);
    assert_eq!(doc.sync_projections(&config, today, now), 0);
    assert_eq!(doc.occurrences.len(), 7);
}

#[test]
fn test_template_removal_prunes_pending_workflow() {
    let (store, _temp_dir) = setup_test_store();
    let now = test_now();
    let today = now.date_naive();
    let config = ProjectionConfig::default();

    let mut doc = store.load().expect("Failed to load empty store");
    doc.upsert_template(create_test_template("tmpl-scale", 1, RecurrenceUnit::Months));
    doc.sync_projections(&config, today, now);
    let first_id = doc.occurrences[0].occurrence_id.clone();
    doc.mark_done(&first_id, now);

    assert!(doc.remove_template("tmpl-scale"));
    store.save(&doc).expect("Failed to save document");

    // Completed work stays on the books; pending projections are gone.
    let doc = store.load().expect("Failed to reload document");
    assert!(doc.templates.is_empty());
    assert!(doc.occurrences.iter().all(|o| !o.is_pending()));
    assert!(doc
        .occurrences
        .iter()
        .any(|o| o.occurrence_id == first_id && o.status == OccurrenceStatus::Done));
}

#[test]
fn test_daily_signal_pipeline_workflow() {
    let (store, _temp_dir) = setup_test_store();
    let day = NaiveDate::from_ymd_opt(2024, 6, 20).unwrap();

    let mut doc = store.load().expect("Failed to load empty store");
    doc.upsert_cow(create_test_cow("cow-1", "de-101"))
        .expect("Failed to add cow");
    // Tag was normalized on the way in.
    assert!(doc.find_cow_by_tag("DE-101").is_some());

    // Three weeks of steady days, then a sensor dump with trough time
    // mistakenly logged in seconds.
    for i in 0..BASELINE_WINDOW {
        let mut signal = DailySignal::empty(day - Duration::days((BASELINE_WINDOW - i) as i64));
        signal.trough_minutes_today = Some(150.0);
        signal.meals_count_today = Some(8.0);
        signal.milk_liters_today = Some(20.0);
        doc.append_daily_log("DE-101", signal);
    }
    let mut today = DailySignal::empty(day);
    today.trough_minutes_today = Some(9000.0);
    today.meals_count_today = Some(8.0);
    today.milk_liters_today = Some(20.0);
    doc.append_daily_log("DE-101", today);

    let notes = doc.sanitize_signals();
    assert_eq!(notes.len(), 1);
    assert!(notes[0].contains("DE-101"));
    store.save(&doc).expect("Failed to save document");

    // After repair the day reads as 150 minutes and scores as normal.
    let doc = store.load().expect("Failed to reload document");
    let series = &doc.daily_logs_by_ear_tag["DE-101"];
    let repaired = series.last().expect("Missing repaired signal");
    assert_eq!(repaired.trough_minutes_today, Some(150.0));

    let baseline = rolling_baseline(&series[..series.len() - 1], BASELINE_WINDOW);
    let cow = doc.find_cow("cow-1").expect("Missing cow");
    let report = score_insights(cow, repaired, &baseline, day);
    assert_eq!(report.top_bucket, RiskBucket::Normal);

    // The same sanitized day feeds the economics pipeline.
    let today_by_tag = doc.signals_on(day);
    let rows = feed_rows(&doc.cows, &today_by_tag, 0.32);
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].feed_kg, 8.0);
    let congestion = congestion_summary(&doc.cows, &today_by_tag);
    assert_eq!(congestion.score, 0.0);
}

#[test]
fn test_sanitize_is_a_fixpoint_workflow() {
    let (store, _temp_dir) = setup_test_store();
    let day = NaiveDate::from_ymd_opt(2024, 6, 20).unwrap();

    let mut doc = store.load().expect("Failed to load empty store");
    doc.upsert_cow(create_test_cow("cow-1", "DE-101"))
        .expect("Failed to add cow");
    let mut signal = DailySignal::empty(day);
    signal.trough_minutes_today = Some(5_400_000.0);
    signal.meal_timestamps = vec![2000.0, -5.0, 360.0];
    doc.append_daily_log("DE-101", signal);

    assert!(!doc.sanitize_signals().is_empty());
    let repaired = doc.clone();

    // A second pass over already-clean data changes nothing.
    assert!(doc.sanitize_signals().is_empty());
    assert_eq!(doc, repaired);
}
