use anyhow::Result;
use byre_core::models::{FarmDocument, RecurrenceRule, RecurrenceUnit, TaskTemplate};
use byre_core::store::JsonStore;
use byre_core::timezone::{today_in, validate_timezone};

use crate::cli::{AddTemplateCommand, RemoveTemplateCommand, TemplateCommand, TemplateSubcommand};
use crate::commands::load_document;
use crate::config::Config;
use crate::parser::{parse_natural_date, parse_time_string};
use crate::util::resolve_template_id;
use crate::views::table::display_templates;

pub fn template_command(store: &JsonStore, config: &Config, command: TemplateCommand) -> Result<()> {
    match command.command {
        TemplateSubcommand::Add(cmd) => add_template(store, config, cmd),
        TemplateSubcommand::List => list_templates(store),
        TemplateSubcommand::Remove(cmd) => remove_template(store, cmd),
    }
}

fn add_template(store: &JsonStore, config: &Config, command: AddTemplateCommand) -> Result<()> {
    validate_timezone(&config.timezone)?;
    let today = today_in(&config.timezone);

    let start_date = match command.start.as_deref() {
        Some(raw) => parse_natural_date(raw, today)?,
        None => today,
    };
    let default_time = command.time.as_deref().map(parse_time_string).transpose()?;
    let unit = command.unit.parse::<RecurrenceUnit>()?;

    let mut doc = load_document(store)?;
    let template = TaskTemplate {
        template_id: fresh_template_id(&doc, &command.title),
        title: command.title,
        category: command.category.unwrap_or_default(),
        start_date,
        recurrence: Some(RecurrenceRule::new(command.every, unit)),
        default_time,
        assigned_to: command.assigned,
        notes: command.notes.unwrap_or_default(),
    };
    let template_id = template.template_id.clone();
    let title = template.title.clone();
    doc.upsert_template(template);
    store.save(&doc)?;

    use owo_colors::{OwoColorize, Style};
    let success_style = Style::new().green().bold();
    let info_style = Style::new().blue();
    println!(
        "{} Added template: {}",
        "✓".style(success_style),
        title.bright_white().bold()
    );
    println!(
        "  {} ID: {}",
        "→".style(info_style),
        template_id.yellow()
    );
    println!(
        "  {} Run 'byre plan' to materialize its occurrences",
        "→".style(info_style)
    );
    Ok(())
}

fn list_templates(store: &JsonStore) -> Result<()> {
    let doc = load_document(store)?;
    display_templates(&doc.templates);
    Ok(())
}

fn remove_template(store: &JsonStore, command: RemoveTemplateCommand) -> Result<()> {
    let mut doc = load_document(store)?;
    let template_id = resolve_template_id(&doc, &command.id)?;
    let title = doc
        .find_template(&template_id)
        .map(|t| t.title.clone())
        .unwrap_or_else(|| template_id.clone());

    let pending_before = doc.occurrences.iter().filter(|o| o.is_pending()).count();
    doc.remove_template(&template_id);
    let pruned = pending_before - doc.occurrences.iter().filter(|o| o.is_pending()).count();
    store.save(&doc)?;

    println!("Removed template '{}'", title);
    if pruned > 0 {
        println!("Pruned {} pending occurrence(s); completed records were kept.", pruned);
    }
    Ok(())
}

/// Seed-style slug id, with a numeric suffix when the slug is taken.
fn fresh_template_id(doc: &FarmDocument, title: &str) -> String {
    let slug = slugify(title);
    let base = if slug.is_empty() {
        "tmpl-task".to_string()
    } else {
        format!("tmpl-{}", slug)
    };
    if doc.find_template(&base).is_none() {
        return base;
    }
    let mut counter = 2;
    loop {
        let candidate = format!("{}-{}", base, counter);
        if doc.find_template(&candidate).is_none() {
            return candidate;
        }
        counter += 1;
    }
}

fn slugify(title: &str) -> String {
    let mut slug = String::with_capacity(title.len());
    let mut last_dash = true;
    for ch in title.chars() {
        if ch.is_ascii_alphanumeric() {
            slug.push(ch.to_ascii_lowercase());
            last_dash = false;
        } else if !last_dash {
            slug.push('-');
            last_dash = true;
        }
    }
    while slug.ends_with('-') {
        slug.pop();
    }
    slug.truncate(40);
    slug
}
