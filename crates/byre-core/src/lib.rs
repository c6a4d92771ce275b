//! # Byre Core Library
//!
//! A livestock maintenance library with occurrence-based task recurrence,
//! herd behaviour insights, and feed economics built on a single JSON
//! document store.
//!
//! ## Features
//!
//! - **Occurrence Lifecycle**: Pending/done/skipped task occurrences where
//!   completing a recurring task schedules the next one
//! - **Calendar-Aware Intervals**: Day, week, and month arithmetic with
//!   end-of-month clamping so schedules never drift past short months
//! - **Template Projection**: Maintenance templates project bounded windows
//!   of upcoming occurrences, idempotently and duplicate-free
//! - **Signal Hygiene**: Behaviour signals are normalized on the way in,
//!   with unit mistakes (seconds, milliseconds) repaired and reported
//! - **Herd Insights**: Per-cow risk scoring against rolling baselines
//! - **Feed Economics**: Congestion, ROI, and money-leak reporting
//!
//! ## Core Modules
//!
//! - [`models`]: Core data structures and the farm document
//! - [`recurrence`]: Interval arithmetic, the mark engine, and projection
//! - [`store`]: Whole-document JSON persistence
//! - [`sanitize`]: Signal normalization and repair notes
//! - [`insights`]: Risk bucket scoring against rolling baselines
//! - [`optimization`]: Feed rows, congestion, ROI, recommendations
//! - [`report`]: Weekly money report
//! - [`timezone`]: Timezone validation and farm-local dates
//! - [`error`]: Error types shared across the crate
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use byre_core::{
//!     error::CoreError,
//!     models::{NewOccurrenceData, RecurrenceAnchor, RecurrenceRule, RecurrenceUnit},
//!     store::JsonStore,
//! };
//!
//! fn main() -> Result<(), CoreError> {
//!     let store = JsonStore::new("byre.json");
//!     let mut doc = store.load()?;
//!
//!     let now = chrono::Utc::now();
//!     let occurrence = doc.add_custom_occurrence(
//!         NewOccurrenceData {
//!             title: "Check water trough".to_string(),
//!             category: "equipment".to_string(),
//!             due_date: now.date_naive(),
//!             due_time: None,
//!             assigned_to: None,
//!             recurrence: Some(RecurrenceRule {
//!                 every: 3,
//!                 unit: RecurrenceUnit::Days,
//!             }),
//!             recurrence_anchor: RecurrenceAnchor::Completion,
//!             notes: String::new(),
//!         },
//!         now,
//!     );
//!     println!("Created: {}", occurrence.title);
//!
//!     // Completing it schedules the next one three days out.
//!     doc.mark_done(&occurrence.occurrence_id, now);
//!     store.save(&doc)?;
//!
//!     Ok(())
//! }
//! ```

pub mod error;
pub mod insights;
pub mod models;
pub mod optimization;
pub mod recurrence;
pub mod report;
pub mod sanitize;
pub mod store;
pub mod timezone;
