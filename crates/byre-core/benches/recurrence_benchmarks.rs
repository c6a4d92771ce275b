use byre_core::models::{
    NewOccurrenceData, OccurrenceSource, OccurrenceStatus, RecurrenceAnchor, RecurrenceRule,
    RecurrenceUnit, TaskHistoryEntry, TaskOccurrence, TaskTemplate,
};
use byre_core::recurrence::{
    custom_occurrence, mark_done, next_due_date, project_templates, ProjectionConfig,
};
use chrono::{Duration, NaiveDate, TimeZone, Utc};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

fn bench_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 3, 10).unwrap()
}

fn create_test_occurrence(i: i64) -> TaskOccurrence {
    let now = Utc.with_ymd_and_hms(2024, 3, 10, 9, 0, 0).unwrap();
    let mut occurrence = custom_occurrence(
        NewOccurrenceData {
            title: format!("Benchmark occurrence {i}"),
            category: "equipment".to_string(),
            due_date: bench_date() + Duration::days(fastrand::i64(0..60)),
            due_time: None,
            assigned_to: None,
            recurrence: Some(RecurrenceRule {
                every: 1,
                unit: RecurrenceUnit::Weeks,
            }),
            recurrence_anchor: RecurrenceAnchor::Completion,
            notes: String::new(),
        },
        now,
    );
    occurrence.occurrence_id = format!("occ-bench-{i}");
    occurrence.status = OccurrenceStatus::Pending;
    occurrence.source = OccurrenceSource::Custom;
    occurrence
}

fn create_test_template(i: usize) -> TaskTemplate {
    TaskTemplate {
        template_id: format!("tmpl-bench-{i}"),
        title: format!("Benchmark template {i}"),
        category: "equipment".to_string(),
        start_date: bench_date() - Duration::days(fastrand::i64(0..30)),
        recurrence: Some(RecurrenceRule {
            every: fastrand::u32(1..4),
            unit: RecurrenceUnit::Days,
        }),
        default_time: None,
        assigned_to: None,
        notes: String::new(),
    }
}

fn bench_next_due_date(c: &mut Criterion) {
    let base = bench_date();

    let mut group = c.benchmark_group("next_due_date");
    for unit in [
        RecurrenceUnit::Days,
        RecurrenceUnit::Weeks,
        RecurrenceUnit::Months,
    ] {
        let rule = RecurrenceRule { every: 3, unit };
        group.bench_with_input(
            BenchmarkId::new("unit", format!("{unit:?}")),
            &rule,
            |b, rule| b.iter(|| next_due_date(black_box(base), black_box(rule))),
        );
    }
    group.finish();
}

fn bench_mark_done(c: &mut Criterion) {
    let now = Utc.with_ymd_and_hms(2024, 3, 10, 9, 0, 0).unwrap();
    let history: Vec<TaskHistoryEntry> = Vec::new();

    let mut group = c.benchmark_group("mark_done");
    for size in [10usize, 100, 1000] {
        fastrand::seed(42);
        let occurrences: Vec<TaskOccurrence> =
            (0..size as i64).map(create_test_occurrence).collect();
        let target = occurrences[size / 2].occurrence_id.clone();

        group.bench_with_input(BenchmarkId::new("occurrences", size), &size, |b, _| {
            b.iter(|| {
                mark_done(
                    black_box(&occurrences),
                    black_box(&history),
                    black_box(&target),
                    black_box(now),
                )
            })
        });
    }
    group.finish();
}

fn bench_project_templates(c: &mut Criterion) {
    let now = Utc.with_ymd_and_hms(2024, 3, 10, 9, 0, 0).unwrap();
    let today = bench_date();

    fastrand::seed(7);
    let templates: Vec<TaskTemplate> = (0..20).map(create_test_template).collect();
    let existing: Vec<TaskOccurrence> = Vec::new();

    let mut group = c.benchmark_group("project_templates");
    for horizon in [30u32, 90, 365] {
        let config = ProjectionConfig {
            horizon_days: horizon,
            ..ProjectionConfig::default()
        };
        group.bench_with_input(BenchmarkId::new("horizon_days", horizon), &config, |b, config| {
            b.iter(|| {
                project_templates(
                    black_box(&templates),
                    black_box(&existing),
                    black_box(config),
                    black_box(today),
                    black_box(now),
                )
            })
        });
    }
    group.finish();
}

criterion_group!(
    benches,
    bench_next_due_date,
    bench_mark_done,
    bench_project_templates
);
criterion_main!(benches);
