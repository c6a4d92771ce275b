use byre_core::insights::{InsightReport, RiskBucket};
use byre_core::models::{Cow, HistoryAction, OccurrenceStatus, TaskOccurrence, TaskTemplate};
use byre_core::optimization::FeedRow;
use chrono::{DateTime, NaiveDate, Utc};
use chrono_humanize::Humanize;
use comfy_table::{Attribute, Cell, Color, Row, Table};

use crate::util::short_id;

/// A history entry joined with the title of the occurrence it acted on.
#[derive(Debug, Clone)]
pub struct ViewHistoryEntry {
    pub action: HistoryAction,
    pub title: String,
    pub timestamp: DateTime<Utc>,
}

/// One cow's scored day, ready for the herd overview table.
#[derive(Debug, Clone)]
pub struct ViewInsight {
    pub ear_tag_id: String,
    pub name: String,
    pub day: NaiveDate,
    pub report: InsightReport,
}

pub fn display_occurrences(occurrences: &[&TaskOccurrence], today: NaiveDate) {
    if occurrences.is_empty() {
        println!("No tasks found.");
        return;
    }

    let mut table = Table::new();
    table.set_header(vec!["ID", "Title", "Category", "Status", "Due", "Assigned"]);

    for occ in occurrences {
        let mut row = Row::new();
        row.add_cell(Cell::new(short_id(&occ.occurrence_id)));

        let overdue = occ.status == OccurrenceStatus::Pending && occ.due_date < today;
        let due_today = occ.status == OccurrenceStatus::Pending && occ.due_date == today;

        let mut title_cell = Cell::new(&occ.title);
        match occ.status {
            OccurrenceStatus::Done | OccurrenceStatus::Skipped => {
                title_cell = title_cell
                    .add_attribute(Attribute::CrossedOut)
                    .fg(Color::DarkGrey);
            }
            OccurrenceStatus::Pending => {
                if overdue {
                    title_cell = title_cell.fg(Color::Red).add_attribute(Attribute::Bold);
                } else if due_today {
                    title_cell = title_cell.fg(Color::Yellow);
                }
            }
        }
        row.add_cell(title_cell);

        row.add_cell(Cell::new(&occ.category));

        let mut status_cell = Cell::new(occ.status.to_string());
        status_cell = match occ.status {
            OccurrenceStatus::Done => status_cell.fg(Color::Green),
            OccurrenceStatus::Skipped => status_cell.fg(Color::DarkGrey),
            OccurrenceStatus::Pending => status_cell,
        };
        row.add_cell(status_cell);

        let mut due_text = occ.due_date.to_string();
        if let Some(time) = occ.due_time {
            due_text.push(' ');
            due_text.push_str(&time.format("%H:%M").to_string());
        }
        let delta = occ.due_date.signed_duration_since(today);
        due_text.push_str(&format!(" ({})", delta.humanize()));
        let due_cell = if overdue {
            Cell::new(due_text).fg(Color::Red)
        } else if due_today {
            Cell::new(due_text).fg(Color::Yellow)
        } else {
            Cell::new(due_text)
        };
        row.add_cell(due_cell);

        row.add_cell(Cell::new(occ.assigned_to.as_deref().unwrap_or("None")));
        table.add_row(row);
    }

    println!("{table}");
}

pub fn display_history(entries: &[ViewHistoryEntry]) {
    if entries.is_empty() {
        println!("No history yet.");
        return;
    }

    let mut table = Table::new();
    table.set_header(vec!["When", "Action", "Task"]);

    for entry in entries {
        let mut row = Row::new();
        row.add_cell(Cell::new(entry.timestamp.humanize()));

        let action_cell = match entry.action {
            HistoryAction::Done => Cell::new(entry.action.to_string()).fg(Color::Green),
            HistoryAction::Skipped => Cell::new(entry.action.to_string()).fg(Color::DarkGrey),
        };
        row.add_cell(action_cell);

        row.add_cell(Cell::new(&entry.title));
        table.add_row(row);
    }

    println!("{table}");
}

pub fn display_templates(templates: &[TaskTemplate]) {
    if templates.is_empty() {
        println!("No templates found.");
        return;
    }

    let mut table = Table::new();
    table.set_header(vec!["ID", "Title", "Category", "Repeats", "Starts", "Assigned"]);

    for template in templates {
        let mut row = Row::new();
        row.add_cell(Cell::new(short_id(&template.template_id)));
        row.add_cell(Cell::new(&template.title));
        row.add_cell(Cell::new(&template.category));

        let repeats = match &template.recurrence {
            Some(rule) => format!("every {} {}", rule.every, rule.unit),
            None => "never".to_string(),
        };
        row.add_cell(Cell::new(repeats));

        row.add_cell(Cell::new(template.start_date.to_string()));
        row.add_cell(Cell::new(template.assigned_to.as_deref().unwrap_or("None")));
        table.add_row(row);
    }

    println!("{table}");
}

pub fn display_cows(cows: &[&Cow]) {
    if cows.is_empty() {
        println!("No cows registered.");
        return;
    }

    let mut table = Table::new();
    table.set_header(vec!["Tag", "Name", "Sex", "Production", "Born", "Calving due", "Status"]);

    for cow in cows {
        let mut row = Row::new();
        row.add_cell(Cell::new(&cow.ear_tag_id));
        row.add_cell(Cell::new(if cow.name.is_empty() { "None" } else { &cow.name }));
        row.add_cell(Cell::new(cow.sex.to_string()));
        row.add_cell(Cell::new(cow.production_type.to_string()));
        row.add_cell(Cell::new(
            cow.date_of_birth
                .map(|d| d.to_string())
                .unwrap_or_else(|| "None".to_string()),
        ));
        row.add_cell(Cell::new(
            cow.pregnancy_due_date
                .map(|d| d.to_string())
                .unwrap_or_else(|| "None".to_string()),
        ));

        let status_cell = if cow.is_active {
            Cell::new("active").fg(Color::Green)
        } else {
            Cell::new("archived").fg(Color::DarkGrey)
        };
        row.add_cell(status_cell);
        table.add_row(row);
    }

    println!("{table}");
}

pub fn display_feed_rows(rows: &[FeedRow]) {
    if rows.is_empty() {
        println!("No active cows to report on.");
        return;
    }

    // Flag the priciest liter only when there is something to compare it to.
    let priced = rows.iter().filter(|r| r.cost_per_liter.is_some()).count();
    let mut worst_idx: Option<usize> = None;
    if priced >= 2 {
        for (idx, row) in rows.iter().enumerate() {
            if let Some(cpl) = row.cost_per_liter {
                let beats = match worst_idx {
                    Some(w) => rows[w].cost_per_liter.map_or(true, |wc| cpl > wc),
                    None => true,
                };
                if beats {
                    worst_idx = Some(idx);
                }
            }
        }
    }

    let mut table = Table::new();
    table.set_header(vec!["Tag", "Feed kg", "Feed cost", "Milk L", "Cost per liter"]);

    for (idx, row_data) in rows.iter().enumerate() {
        let mut row = Row::new();
        row.add_cell(Cell::new(&row_data.ear_tag_id));
        row.add_cell(Cell::new(format!("{:.2}", row_data.feed_kg)));
        row.add_cell(Cell::new(format!("${:.2}", row_data.feed_cost)));
        row.add_cell(Cell::new(
            row_data
                .milk_liters
                .map(|l| format!("{:.1}", l))
                .unwrap_or_else(|| "None".to_string()),
        ));

        let cpl_cell = match row_data.cost_per_liter {
            Some(cpl) if worst_idx == Some(idx) => {
                Cell::new(format!("${:.2}", cpl)).fg(Color::Red)
            }
            Some(cpl) => Cell::new(format!("${:.2}", cpl)),
            None => Cell::new("None"),
        };
        row.add_cell(cpl_cell);
        table.add_row(row);
    }

    println!("{table}");
}

pub fn display_insights(insights: &[ViewInsight]) {
    if insights.is_empty() {
        println!("No logged days to score. Use 'byre log' first.");
        return;
    }

    let mut table = Table::new();
    table.set_header(vec!["Tag", "Cow", "Day", "Top risk", "Prob", "Conf", "Signals"]);

    for insight in insights {
        let mut row = Row::new();
        row.add_cell(Cell::new(&insight.ear_tag_id));
        row.add_cell(Cell::new(if insight.name.is_empty() {
            "None"
        } else {
            &insight.name
        }));
        row.add_cell(Cell::new(insight.day.to_string()));

        let probability = insight.report.top_probability();
        let mut risk_cell = Cell::new(insight.report.top_bucket.label());
        risk_cell = if insight.report.top_bucket == RiskBucket::Normal {
            risk_cell.fg(Color::Green)
        } else if probability >= 0.5 {
            risk_cell.fg(Color::Red).add_attribute(Attribute::Bold)
        } else if probability >= 0.35 {
            risk_cell.fg(Color::Yellow)
        } else {
            risk_cell
        };
        row.add_cell(risk_cell);

        row.add_cell(Cell::new(format!("{:.0}%", probability * 100.0)));
        row.add_cell(Cell::new(format!("{:.0}%", insight.report.confidence * 100.0)));
        row.add_cell(Cell::new(if insight.report.why.is_empty() {
            "steady".to_string()
        } else {
            insight.report.why.join("; ")
        }));
        table.add_row(row);
    }

    println!("{table}");
}
