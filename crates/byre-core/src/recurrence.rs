//! Task occurrence lifecycle and recurrence calculation.
//!
//! Everything in this module is a pure transformation: callers pass the
//! current collections plus an explicit `now`, and get new collections
//! back. Persistence is the caller's job (load, transform, save).

use chrono::{DateTime, Datelike, Duration, NaiveDate, Utc};
use sha2::{Digest, Sha256};
use std::collections::HashSet;
use uuid::Uuid;

use crate::models::{
    FarmDocument, HistoryAction, NewOccurrenceData, OccurrenceSource, OccurrenceStatus,
    RecurrenceAnchor, RecurrenceRule, RecurrenceUnit, SlotKey, TaskHistoryEntry, TaskOccurrence,
    TaskTemplate,
};

// ============================================================================
// Interval calculation
// ============================================================================

/// Calculates the next due date by stepping `base` forward by one rule
/// interval.
///
/// # Behavior
///
/// - `every` is clamped to at least 1; a rule can slow a task down but
///   never stop it.
/// - `days` and `weeks` are plain day arithmetic (a week is 7 days).
/// - `months` advances the calendar month with year carry, keeping the
///   day-of-month but clamping it to 28 so the result always lands in the
///   target month. A task due on the 31st therefore drifts to the 28th;
///   accepted in exchange for never skipping a month.
/// - The function is total: it never fails, and saturates at the far end
///   of the supported date range instead of overflowing.
pub fn next_due_date(base: NaiveDate, rule: &RecurrenceRule) -> NaiveDate {
    let every = i64::from(rule.every.max(1));
    match rule.unit {
        RecurrenceUnit::Days => saturating_add_days(base, every),
        RecurrenceUnit::Weeks => saturating_add_days(base, every * 7),
        RecurrenceUnit::Months => add_months_clamped(base, every),
    }
}

fn saturating_add_days(base: NaiveDate, days: i64) -> NaiveDate {
    base.checked_add_signed(Duration::days(days))
        .unwrap_or(NaiveDate::MAX)
}

fn add_months_clamped(base: NaiveDate, months: i64) -> NaiveDate {
    let zero_based = i64::from(base.month0()) + months;
    let year = i64::from(base.year()) + zero_based.div_euclid(12);
    let month = zero_based.rem_euclid(12) as u32 + 1;
    let day = base.day().min(28);
    i32::try_from(year)
        .ok()
        .and_then(|y| NaiveDate::from_ymd_opt(y, month, day))
        .unwrap_or(NaiveDate::MAX)
}

// ============================================================================
// Deterministic identifiers
// ============================================================================

fn short_hash(input: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(input.as_bytes());
    let digest = hex::encode(hasher.finalize());
    digest[..16].to_string()
}

fn generated_occurrence_id(
    source_id: &str,
    template_id: Option<&str>,
    next_due: NaiveDate,
) -> String {
    format!(
        "occ-{}-{}-{}",
        template_id.unwrap_or("custom"),
        next_due,
        short_hash(&format!("{source_id}:{next_due}"))
    )
}

fn projected_occurrence_id(template_id: &str, due_date: NaiveDate) -> String {
    format!(
        "occ-{}-{}-{}",
        template_id,
        due_date,
        short_hash(&format!("{template_id}:{due_date}"))
    )
}

fn history_entry(occurrence_id: &str, action: HistoryAction, now: DateTime<Utc>) -> TaskHistoryEntry {
    let history_id = format!(
        "hist-{}",
        short_hash(&format!("{}:{}:{}", occurrence_id, action, now.to_rfc3339()))
    );
    TaskHistoryEntry {
        history_id,
        occurrence_id: occurrence_id.to_string(),
        action,
        timestamp: now,
    }
}

// ============================================================================
// Lifecycle transitions
// ============================================================================

/// Result of a lifecycle transition over the occurrence and history
/// collections.
#[derive(Debug, Clone, PartialEq)]
pub struct MarkOutcome {
    pub occurrences: Vec<TaskOccurrence>,
    pub history: Vec<TaskHistoryEntry>,
    /// The occurrence that changed state, if the id matched something still
    /// pending.
    pub completed: Option<TaskOccurrence>,
    /// Follow-up occurrence created for a recurring task, also present at
    /// the end of `occurrences`.
    pub generated: Option<TaskOccurrence>,
}

/// Marks an occurrence as done and, for recurring tasks, schedules the next
/// occurrence.
///
/// # Behavior
///
/// - The matched pending occurrence is replaced in place (collection order
///   is preserved) with `status = done` and `completed_at = now`.
/// - `done` and `skipped` are terminal. Marking a terminal occurrence
///   again leaves it untouched and comes back with `completed = None`.
/// - If it carries a recurrence rule, the next due date is computed from
///   the completion day (or from the old due date when the occurrence is
///   anchored to `due_date`) and a pending follow-up is appended, unless
///   an occurrence for that `(template, date)` slot already exists in any
///   status. The slot index is taken before any mutation and extended as
///   follow-ups are appended, so repeated calls never double-book a slot.
/// - Exactly one history entry is appended per call. This holds even when
///   `occurrence_id` matches nothing or only a terminal occurrence: the
///   occurrence collection comes back value-identical, and the attempt is
///   still recorded.
pub fn mark_done(
    occurrences: &[TaskOccurrence],
    history: &[TaskHistoryEntry],
    occurrence_id: &str,
    now: DateTime<Utc>,
) -> MarkOutcome {
    let mut taken: HashSet<SlotKey> = occurrences.iter().map(TaskOccurrence::slot_key).collect();

    let mut updated: Vec<TaskOccurrence> = Vec::with_capacity(occurrences.len() + 1);
    let mut completed = None;
    let mut generated = None;

    for occ in occurrences {
        if occ.occurrence_id != occurrence_id || occ.status.is_terminal() {
            updated.push(occ.clone());
            continue;
        }

        let mut done = occ.clone();
        done.status = OccurrenceStatus::Done;
        done.completed_at = Some(now);

        if let Some(rule) = done.recurrence {
            let anchor = match done.recurrence_anchor {
                RecurrenceAnchor::Completion => now.date_naive(),
                RecurrenceAnchor::DueDate => done.due_date,
            };
            let next_due = next_due_date(anchor, &rule);
            let key: SlotKey = (done.template_id.clone(), next_due);
            if !taken.contains(&key) {
                generated = Some(successor_of(&done, next_due, now));
                taken.insert(key);
            }
        }

        completed = Some(done.clone());
        updated.push(done);
    }

    if let Some(next) = &generated {
        updated.push(next.clone());
    }

    let mut log = history.to_vec();
    log.push(history_entry(occurrence_id, HistoryAction::Done, now));

    MarkOutcome {
        occurrences: updated,
        history: log,
        completed,
        generated,
    }
}

/// Marks an occurrence as skipped. Skipping never schedules a follow-up;
/// the slot stays on record and blocks later regeneration. Terminal
/// occurrences are left untouched, as in [`mark_done`].
pub fn mark_skipped(
    occurrences: &[TaskOccurrence],
    history: &[TaskHistoryEntry],
    occurrence_id: &str,
    now: DateTime<Utc>,
) -> MarkOutcome {
    let mut updated: Vec<TaskOccurrence> = Vec::with_capacity(occurrences.len());
    let mut completed = None;

    for occ in occurrences {
        if occ.occurrence_id != occurrence_id || occ.status.is_terminal() {
            updated.push(occ.clone());
            continue;
        }
        let mut skipped = occ.clone();
        skipped.status = OccurrenceStatus::Skipped;
        skipped.completed_at = Some(now);
        completed = Some(skipped.clone());
        updated.push(skipped);
    }

    let mut log = history.to_vec();
    log.push(history_entry(occurrence_id, HistoryAction::Skipped, now));

    MarkOutcome {
        occurrences: updated,
        history: log,
        completed,
        generated: None,
    }
}

fn successor_of(done: &TaskOccurrence, next_due: NaiveDate, now: DateTime<Utc>) -> TaskOccurrence {
    TaskOccurrence {
        occurrence_id: generated_occurrence_id(
            &done.occurrence_id,
            done.template_id.as_deref(),
            next_due,
        ),
        template_id: done.template_id.clone(),
        title: done.title.clone(),
        category: done.category.clone(),
        due_date: next_due,
        due_time: done.due_time,
        assigned_to: done.assigned_to.clone(),
        status: OccurrenceStatus::Pending,
        recurrence: done.recurrence,
        source: done.source,
        recurrence_anchor: done.recurrence_anchor,
        created_at: now,
        completed_at: None,
        notes: done.notes.clone(),
    }
}

// ============================================================================
// One-off occurrences
// ============================================================================

/// Builds a one-off occurrence from user input. One-offs get a random id;
/// they are created once, not replayed.
pub fn custom_occurrence(input: NewOccurrenceData, now: DateTime<Utc>) -> TaskOccurrence {
    let category = if input.category.trim().is_empty() {
        "custom".to_string()
    } else {
        input.category
    };
    TaskOccurrence {
        occurrence_id: format!("occ-custom-{}", Uuid::new_v4().simple()),
        template_id: None,
        title: input.title,
        category,
        due_date: input.due_date,
        due_time: input.due_time,
        assigned_to: input.assigned_to,
        status: OccurrenceStatus::Pending,
        recurrence: input.recurrence,
        source: OccurrenceSource::Custom,
        recurrence_anchor: input.recurrence_anchor,
        created_at: now,
        completed_at: None,
        notes: input.notes,
    }
}

// ============================================================================
// Template projection
// ============================================================================

/// Bounds for materializing template occurrences ahead of time.
#[derive(Debug, Clone)]
pub struct ProjectionConfig {
    /// How far past `today` to materialize, in days.
    pub horizon_days: u32,
    /// Hard cap on cursor steps per template, so a degenerate rule cannot
    /// flood the document.
    pub max_per_template: u32,
}

impl Default for ProjectionConfig {
    fn default() -> Self {
        Self {
            horizon_days: 90,
            max_per_template: 400,
        }
    }
}

/// Materializes pending occurrences for every recurring template from
/// `today` through the horizon.
///
/// Walks each template's cadence from its `start_date`, skipping dates in
/// the past and `(template, date)` slots that already have an occurrence in
/// any status. Returns only the newly created occurrences; ids are derived
/// from `(template_id, due_date)`, so re-running the projection is
/// idempotent.
pub fn project_templates(
    templates: &[TaskTemplate],
    existing: &[TaskOccurrence],
    config: &ProjectionConfig,
    today: NaiveDate,
    now: DateTime<Utc>,
) -> Vec<TaskOccurrence> {
    let horizon_end = saturating_add_days(today, i64::from(config.horizon_days));
    let mut taken: HashSet<SlotKey> = existing.iter().map(TaskOccurrence::slot_key).collect();
    let mut generated = Vec::new();

    for template in templates {
        let Some(rule) = template.recurrence else {
            continue;
        };

        let mut cursor = template.start_date;
        for _ in 0..config.max_per_template {
            if cursor > horizon_end {
                break;
            }
            if cursor >= today {
                let key: SlotKey = (Some(template.template_id.clone()), cursor);
                if !taken.contains(&key) {
                    generated.push(occurrence_from_template(template, cursor, now));
                    taken.insert(key);
                }
            }
            cursor = next_due_date(cursor, &rule);
        }
    }

    generated
}

fn occurrence_from_template(
    template: &TaskTemplate,
    due_date: NaiveDate,
    now: DateTime<Utc>,
) -> TaskOccurrence {
    TaskOccurrence {
        occurrence_id: projected_occurrence_id(&template.template_id, due_date),
        template_id: Some(template.template_id.clone()),
        title: template.title.clone(),
        category: template.category.clone(),
        due_date,
        due_time: template.default_time,
        assigned_to: template.assigned_to.clone(),
        status: OccurrenceStatus::Pending,
        recurrence: template.recurrence,
        source: OccurrenceSource::Template,
        recurrence_anchor: RecurrenceAnchor::Completion,
        created_at: now,
        completed_at: None,
        notes: template.notes.clone(),
    }
}

// ============================================================================
// Document-level wrappers
// ============================================================================

/// What a document-level mark operation did, for caller feedback.
#[derive(Debug, Clone, PartialEq)]
pub struct MarkReceipt {
    pub completed: Option<TaskOccurrence>,
    pub generated: Option<TaskOccurrence>,
}

impl FarmDocument {
    pub fn mark_done(&mut self, occurrence_id: &str, now: DateTime<Utc>) -> MarkReceipt {
        let outcome = mark_done(&self.occurrences, &self.history, occurrence_id, now);
        self.occurrences = outcome.occurrences;
        self.history = outcome.history;
        MarkReceipt {
            completed: outcome.completed,
            generated: outcome.generated,
        }
    }

    pub fn mark_skipped(&mut self, occurrence_id: &str, now: DateTime<Utc>) -> MarkReceipt {
        let outcome = mark_skipped(&self.occurrences, &self.history, occurrence_id, now);
        self.occurrences = outcome.occurrences;
        self.history = outcome.history;
        MarkReceipt {
            completed: outcome.completed,
            generated: outcome.generated,
        }
    }

    pub fn add_custom_occurrence(
        &mut self,
        input: NewOccurrenceData,
        now: DateTime<Utc>,
    ) -> TaskOccurrence {
        let occurrence = custom_occurrence(input, now);
        self.occurrences.push(occurrence.clone());
        occurrence
    }

    /// Projects templates over the horizon and appends the new occurrences.
    /// Returns how many were added; zero means the window was already
    /// covered.
    pub fn sync_projections(
        &mut self,
        config: &ProjectionConfig,
        today: NaiveDate,
        now: DateTime<Utc>,
    ) -> usize {
        let generated = project_templates(&self.templates, &self.occurrences, config, today, now);
        let count = generated.len();
        self.occurrences.extend(generated);
        count
    }

    pub fn upsert_template(&mut self, template: TaskTemplate) {
        match self
            .templates
            .iter_mut()
            .find(|t| t.template_id == template.template_id)
        {
            Some(existing) => *existing = template,
            None => self.templates.push(template),
        }
    }

    /// Removes a template and prunes its still-pending occurrences. Done
    /// and skipped occurrences stay for the record, as does history.
    pub fn remove_template(&mut self, template_id: &str) -> bool {
        let before = self.templates.len();
        self.templates.retain(|t| t.template_id != template_id);
        let removed = self.templates.len() != before;
        if removed {
            self.occurrences
                .retain(|o| !(o.template_id.as_deref() == Some(template_id) && o.is_pending()));
        }
        removed
    }
}

// ============================================================================
// Schedule queries
// ============================================================================

/// All occurrences due on `day`, any status, ordered by time then title.
/// Occurrences without a time sort first.
pub fn tasks_on(occurrences: &[TaskOccurrence], day: NaiveDate) -> Vec<&TaskOccurrence> {
    let mut hits: Vec<&TaskOccurrence> =
        occurrences.iter().filter(|o| o.due_date == day).collect();
    hits.sort_by(|a, b| {
        a.due_time
            .cmp(&b.due_time)
            .then_with(|| a.title.cmp(&b.title))
    });
    hits
}

/// Pending occurrences due within `days` days starting at `from`
/// (inclusive window), ordered by due date.
pub fn upcoming(occurrences: &[TaskOccurrence], from: NaiveDate, days: u32) -> Vec<&TaskOccurrence> {
    let end = saturating_add_days(from, (i64::from(days) - 1).max(0));
    let mut hits: Vec<&TaskOccurrence> = occurrences
        .iter()
        .filter(|o| o.is_pending() && o.due_date >= from && o.due_date <= end)
        .collect();
    hits.sort_by_key(|o| o.due_date);
    hits
}

/// Pending occurrences already past due, oldest first.
pub fn overdue(occurrences: &[TaskOccurrence], today: NaiveDate) -> Vec<&TaskOccurrence> {
    let mut hits: Vec<&TaskOccurrence> = occurrences
        .iter()
        .filter(|o| o.is_pending() && o.due_date < today)
        .collect();
    hits.sort_by_key(|o| o.due_date);
    hits
}
