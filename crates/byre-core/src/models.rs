use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::str::FromStr;
use thiserror::Error;

/// Daily behaviour logs are capped per cow; older entries roll off.
pub const DAILY_LOG_RETENTION: usize = 120;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum OccurrenceStatus {
    Pending,
    Done,
    Skipped,
}

impl OccurrenceStatus {
    /// `done` and `skipped` are terminal states of the lifecycle.
    pub fn is_terminal(&self) -> bool {
        !matches!(self, OccurrenceStatus::Pending)
    }
}

impl std::fmt::Display for OccurrenceStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OccurrenceStatus::Pending => write!(f, "pending"),
            OccurrenceStatus::Done => write!(f, "done"),
            OccurrenceStatus::Skipped => write!(f, "skipped"),
        }
    }
}

#[derive(Error, Debug, PartialEq)]
#[error("Invalid occurrence status: {0}")]
pub struct ParseOccurrenceStatusError(String);

impl FromStr for OccurrenceStatus {
    type Err = ParseOccurrenceStatusError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "pending" => Ok(OccurrenceStatus::Pending),
            "done" => Ok(OccurrenceStatus::Done),
            "skipped" => Ok(OccurrenceStatus::Skipped),
            _ => Err(ParseOccurrenceStatusError(s.to_string())),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum HistoryAction {
    Done,
    Skipped,
}

impl std::fmt::Display for HistoryAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            HistoryAction::Done => write!(f, "done"),
            HistoryAction::Skipped => write!(f, "skipped"),
        }
    }
}

/// Calendar unit of a recurrence rule.
///
/// Deserialization is deliberately permissive: documents written by hand or
/// by older tools may carry unit strings this version does not know, and
/// those degrade to day arithmetic instead of failing the whole load.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase", from = "String")]
pub enum RecurrenceUnit {
    Days,
    Weeks,
    Months,
}

impl From<String> for RecurrenceUnit {
    fn from(s: String) -> Self {
        match s.to_lowercase().as_str() {
            "weeks" => RecurrenceUnit::Weeks,
            "months" => RecurrenceUnit::Months,
            _ => RecurrenceUnit::Days,
        }
    }
}

impl std::fmt::Display for RecurrenceUnit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RecurrenceUnit::Days => write!(f, "days"),
            RecurrenceUnit::Weeks => write!(f, "weeks"),
            RecurrenceUnit::Months => write!(f, "months"),
        }
    }
}

#[derive(Error, Debug, PartialEq)]
#[error("Invalid recurrence unit: {0} (expected days, weeks, or months)")]
pub struct ParseRecurrenceUnitError(String);

/// Strict parser for user-entered units. The serde path above stays
/// permissive for stored documents; typos on the command line should fail
/// loudly instead.
impl FromStr for RecurrenceUnit {
    type Err = ParseRecurrenceUnitError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "days" | "day" => Ok(RecurrenceUnit::Days),
            "weeks" | "week" => Ok(RecurrenceUnit::Weeks),
            "months" | "month" => Ok(RecurrenceUnit::Months),
            _ => Err(ParseRecurrenceUnitError(s.to_string())),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct RecurrenceRule {
    /// Interval count. Stored documents may carry fractional or non-positive
    /// numbers; they are truncated and clamped to at least 1 on the way in.
    #[serde(deserialize_with = "deserialize_every")]
    pub every: u32,
    pub unit: RecurrenceUnit,
}

impl RecurrenceRule {
    pub fn new(every: u32, unit: RecurrenceUnit) -> Self {
        Self { every, unit }
    }
}

impl Default for RecurrenceRule {
    fn default() -> Self {
        Self {
            every: 1,
            unit: RecurrenceUnit::Days,
        }
    }
}

fn deserialize_every<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let raw = f64::deserialize(deserializer)?;
    Ok(clamp_every(raw))
}

pub(crate) fn clamp_every(raw: f64) -> u32 {
    if raw.is_finite() && raw >= 1.0 {
        raw.trunc() as u32
    } else {
        1
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum OccurrenceSource {
    Template,
    #[default]
    Custom,
}

impl std::fmt::Display for OccurrenceSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OccurrenceSource::Template => write!(f, "template"),
            OccurrenceSource::Custom => write!(f, "custom"),
        }
    }
}

/// Which date the next occurrence of a recurring task is computed from.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum RecurrenceAnchor {
    /// Step from the day the task was actually completed (the default).
    #[default]
    Completion,
    /// Step from the scheduled due date, keeping the cadence fixed even
    /// when the task is done early or late.
    DueDate,
}

impl RecurrenceAnchor {
    pub fn is_completion(&self) -> bool {
        matches!(self, RecurrenceAnchor::Completion)
    }
}

#[derive(Error, Debug, PartialEq)]
#[error("Invalid recurrence anchor: {0} (expected completion or due-date)")]
pub struct ParseRecurrenceAnchorError(String);

impl FromStr for RecurrenceAnchor {
    type Err = ParseRecurrenceAnchorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "completion" | "done" => Ok(RecurrenceAnchor::Completion),
            "due_date" | "due-date" | "due" => Ok(RecurrenceAnchor::DueDate),
            _ => Err(ParseRecurrenceAnchorError(s.to_string())),
        }
    }
}

/// Dedup key for slot occupancy: one scheduled slot per template per day.
/// One-off occurrences (no template) all share the `None` bucket.
pub type SlotKey = (Option<String>, NaiveDate);

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TaskOccurrence {
    pub occurrence_id: String,
    /// `None` marks a one-off task that was never materialized from a
    /// template.
    #[serde(default)]
    pub template_id: Option<String>,
    pub title: String,
    #[serde(default)]
    pub category: String,
    pub due_date: NaiveDate,
    #[serde(default)]
    pub due_time: Option<NaiveTime>,
    /// Person responsible, free text.
    #[serde(default)]
    pub assigned_to: Option<String>,
    pub status: OccurrenceStatus,
    #[serde(default)]
    pub recurrence: Option<RecurrenceRule>,
    #[serde(default)]
    pub source: OccurrenceSource,
    #[serde(default, skip_serializing_if = "RecurrenceAnchor::is_completion")]
    pub recurrence_anchor: RecurrenceAnchor,
    pub created_at: DateTime<Utc>,
    /// Set when the occurrence leaves `pending`; for skipped occurrences
    /// this records the skip time.
    #[serde(default)]
    pub completed_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub notes: String,
}

impl TaskOccurrence {
    pub fn is_pending(&self) -> bool {
        self.status == OccurrenceStatus::Pending
    }

    pub fn slot_key(&self) -> SlotKey {
        (self.template_id.clone(), self.due_date)
    }
}

/// Append-only audit record. `occurrence_id` is a weak reference: the
/// occurrence it names may have been pruned since, and the entry stays.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TaskHistoryEntry {
    pub history_id: String,
    pub occurrence_id: String,
    pub action: HistoryAction,
    pub timestamp: DateTime<Utc>,
}

/// Recurring task definition. The projector materializes pending
/// occurrences from these over a rolling horizon.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TaskTemplate {
    pub template_id: String,
    pub title: String,
    #[serde(default)]
    pub category: String,
    pub start_date: NaiveDate,
    #[serde(default)]
    pub recurrence: Option<RecurrenceRule>,
    #[serde(default)]
    pub default_time: Option<NaiveTime>,
    #[serde(default)]
    pub assigned_to: Option<String>,
    #[serde(default)]
    pub notes: String,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum ProductionType {
    #[default]
    Dairy,
    Beef,
}

impl std::fmt::Display for ProductionType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ProductionType::Dairy => write!(f, "dairy"),
            ProductionType::Beef => write!(f, "beef"),
        }
    }
}

#[derive(Error, Debug, PartialEq)]
#[error("Invalid production type: {0} (expected dairy or beef)")]
pub struct ParseProductionTypeError(String);

impl FromStr for ProductionType {
    type Err = ParseProductionTypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "dairy" => Ok(ProductionType::Dairy),
            "beef" => Ok(ProductionType::Beef),
            _ => Err(ParseProductionTypeError(s.to_string())),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum Sex {
    #[default]
    Female,
    Male,
}

impl std::fmt::Display for Sex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Sex::Female => write!(f, "female"),
            Sex::Male => write!(f, "male"),
        }
    }
}

#[derive(Error, Debug, PartialEq)]
#[error("Invalid sex: {0} (expected female or male)")]
pub struct ParseSexError(String);

impl FromStr for Sex {
    type Err = ParseSexError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "female" | "f" => Ok(Sex::Female),
            "male" | "m" => Ok(Sex::Male),
            _ => Err(ParseSexError(s.to_string())),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Cow {
    pub cow_id: String,
    /// Physical ear tag, the key daily logs are filed under. Stored
    /// trimmed and uppercased.
    pub ear_tag_id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub sex: Sex,
    #[serde(default)]
    pub production_type: ProductionType,
    #[serde(default)]
    pub date_of_birth: Option<NaiveDate>,
    #[serde(default)]
    pub pregnancy_due_date: Option<NaiveDate>,
    #[serde(default)]
    pub vaccination_status: Vec<String>,
    #[serde(default)]
    pub weight_kg: Option<f64>,
    #[serde(default)]
    pub notes: String,
    #[serde(default = "default_true")]
    pub is_active: bool,
}

fn default_true() -> bool {
    true
}

/// One day of camera-derived behaviour for one cow. Every metric is
/// optional; a missing value means the sensor pipeline had a gap, not zero.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DailySignal {
    pub day: NaiveDate,
    #[serde(default)]
    pub trough_minutes_today: Option<f64>,
    #[serde(default)]
    pub meals_count_today: Option<f64>,
    #[serde(default)]
    pub avg_meal_minutes_today: Option<f64>,
    #[serde(default)]
    pub feed_intake_est_kg_today: Option<f64>,
    #[serde(default)]
    pub activity_index_today: Option<f64>,
    #[serde(default)]
    pub alone_minutes_today: Option<f64>,
    #[serde(default)]
    pub water_visits_today: Option<f64>,
    #[serde(default)]
    pub water_minutes_today: Option<f64>,
    #[serde(default)]
    pub lying_minutes_today: Option<f64>,
    #[serde(default)]
    pub temp_c_today: Option<f64>,
    #[serde(default)]
    pub humidity_pct_today: Option<f64>,
    #[serde(default)]
    pub milk_liters_today: Option<f64>,
    /// Meal start times as minutes after midnight.
    #[serde(default)]
    pub meal_timestamps: Vec<f64>,
}

impl DailySignal {
    pub fn empty(day: NaiveDate) -> Self {
        Self {
            day,
            trough_minutes_today: None,
            meals_count_today: None,
            avg_meal_minutes_today: None,
            feed_intake_est_kg_today: None,
            activity_index_today: None,
            alone_minutes_today: None,
            water_visits_today: None,
            water_minutes_today: None,
            lying_minutes_today: None,
            temp_c_today: None,
            humidity_pct_today: None,
            milk_liters_today: None,
            meal_timestamps: Vec::new(),
        }
    }
}

/// Pricing and capacity parameters for the analytics engines. These live in
/// the caller's configuration, not in the farm document.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct FarmSettings {
    pub feed_cost_per_kg: f64,
    pub milk_price_per_liter: Option<f64>,
    pub available_feed_kg_current: Option<f64>,
    pub vet_visit_cost_estimate: f64,
    pub labor_value_per_hour: f64,
}

impl Default for FarmSettings {
    fn default() -> Self {
        Self {
            feed_cost_per_kg: 0.32,
            milk_price_per_liter: Some(0.68),
            available_feed_kg_current: None,
            vet_visit_cost_estimate: 120.0,
            labor_value_per_hour: 18.0,
        }
    }
}

/// Input for creating a one-off occurrence.
#[derive(Debug, Clone)]
pub struct NewOccurrenceData {
    pub title: String,
    /// Defaults to "custom" when empty.
    pub category: String,
    pub due_date: NaiveDate,
    pub due_time: Option<NaiveTime>,
    pub assigned_to: Option<String>,
    pub recurrence: Option<RecurrenceRule>,
    pub recurrence_anchor: RecurrenceAnchor,
    pub notes: String,
}

/// The entire persisted state of one farm. Loaded, transformed by pure
/// engine functions, and saved back as a whole.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct FarmDocument {
    #[serde(default)]
    pub occurrences: Vec<TaskOccurrence>,
    #[serde(default)]
    pub history: Vec<TaskHistoryEntry>,
    #[serde(default)]
    pub templates: Vec<TaskTemplate>,
    #[serde(default)]
    pub cows: Vec<Cow>,
    #[serde(default)]
    pub daily_logs_by_ear_tag: BTreeMap<String, Vec<DailySignal>>,
}

impl FarmDocument {
    pub fn find_occurrence(&self, occurrence_id: &str) -> Option<&TaskOccurrence> {
        self.occurrences
            .iter()
            .find(|o| o.occurrence_id == occurrence_id)
    }

    pub fn find_template(&self, template_id: &str) -> Option<&TaskTemplate> {
        self.templates
            .iter()
            .find(|t| t.template_id == template_id)
    }

    pub fn find_cow(&self, cow_id: &str) -> Option<&Cow> {
        self.cows.iter().find(|c| c.cow_id == cow_id)
    }

    pub fn find_cow_by_tag(&self, ear_tag: &str) -> Option<&Cow> {
        let tag = normalize_ear_tag(ear_tag);
        self.cows.iter().find(|c| c.ear_tag_id == tag)
    }

    /// Signal rows for the given day, keyed by ear tag.
    pub fn signals_on(&self, day: NaiveDate) -> BTreeMap<String, &DailySignal> {
        self.daily_logs_by_ear_tag
            .iter()
            .filter_map(|(tag, series)| {
                series
                    .iter()
                    .rev()
                    .find(|s| s.day == day)
                    .map(|s| (tag.clone(), s))
            })
            .collect()
    }

    /// Insert or merge a cow record. Ear tags are normalized to uppercase
    /// and must be unique across the herd; a tag already used by a
    /// different cow is rejected.
    pub fn upsert_cow(&mut self, mut cow: Cow) -> Result<(), crate::error::CoreError> {
        cow.ear_tag_id = normalize_ear_tag(&cow.ear_tag_id);
        if cow.ear_tag_id.is_empty() {
            return Err(crate::error::CoreError::InvalidInput(
                "Ear tag is required".to_string(),
            ));
        }
        let taken = self
            .cows
            .iter()
            .any(|c| c.ear_tag_id == cow.ear_tag_id && c.cow_id != cow.cow_id);
        if taken {
            return Err(crate::error::CoreError::InvalidInput(format!(
                "Ear tag {} is already in use",
                cow.ear_tag_id
            )));
        }
        match self.cows.iter_mut().find(|c| c.cow_id == cow.cow_id) {
            Some(existing) => *existing = cow,
            None => self.cows.push(cow),
        }
        Ok(())
    }

    /// Archive or restore a cow. Returns false when the id is unknown.
    pub fn set_cow_active(&mut self, cow_id: &str, active: bool) -> bool {
        match self.cows.iter_mut().find(|c| c.cow_id == cow_id) {
            Some(cow) => {
                cow.is_active = active;
                true
            }
            None => false,
        }
    }

    /// Delete a cow along with its daily logs and any templates and
    /// occurrences filed under its id. Returns false when the id is
    /// unknown.
    pub fn remove_cow(&mut self, cow_id: &str) -> bool {
        let Some(tag) = self.find_cow(cow_id).map(|c| c.ear_tag_id.clone()) else {
            return false;
        };
        self.cows.retain(|c| c.cow_id != cow_id);
        self.daily_logs_by_ear_tag.remove(&tag);
        self.templates
            .retain(|t| t.assigned_to.as_deref() != Some(cow_id));
        self.occurrences
            .retain(|o| o.assigned_to.as_deref() != Some(cow_id));
        true
    }

    /// Append one day of signals for a cow, keeping only the most recent
    /// [`DAILY_LOG_RETENTION`] entries.
    pub fn append_daily_log(&mut self, ear_tag: &str, signal: DailySignal) {
        let tag = normalize_ear_tag(ear_tag);
        let series = self.daily_logs_by_ear_tag.entry(tag).or_default();
        series.push(signal);
        if series.len() > DAILY_LOG_RETENTION {
            let excess = series.len() - DAILY_LOG_RETENTION;
            series.drain(..excess);
        }
    }
}

pub fn normalize_ear_tag(raw: &str) -> String {
    raw.trim().to_uppercase()
}
