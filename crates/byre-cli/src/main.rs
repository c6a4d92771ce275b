use byre_core::error::CoreError;
use byre_core::store::JsonStore;
use clap::Parser;
use owo_colors::{OwoColorize, Style};

mod cli;
mod commands;
mod config;
mod parser;
mod util;
mod views;

fn main() {
    let config = config::Config::new().unwrap_or_else(|_| config::Config::default());
    let store = JsonStore::new(&config.data_file);

    let cli = cli::Cli::parse();

    let result = match cli.command {
        cli::Commands::Add(command) => commands::add::add_occurrence(&store, &config, command),
        cli::Commands::List(command) => commands::list::list_occurrences(&store, &config, command),
        cli::Commands::Do(command) => commands::r#do::do_occurrence(&store, command),
        cli::Commands::Skip(command) => commands::skip::skip_occurrence(&store, command),
        cli::Commands::History(command) => commands::history::show_history(&store, command),
        cli::Commands::Plan(command) => commands::plan::plan_occurrences(&store, &config, command),
        cli::Commands::Template(command) => {
            commands::template::template_command(&store, &config, command)
        }
        cli::Commands::Cow(command) => commands::cow::cow_command(&store, &config, command),
        cli::Commands::Log(command) => commands::log::log_signal(&store, &config, command),
        cli::Commands::Insights(command) => {
            commands::insights::show_insights(&store, &config, command)
        }
        cli::Commands::Report(command) => commands::report::show_report(&store, &config, command),
    };

    if let Err(e) = result {
        handle_error(e);
        std::process::exit(1);
    }
}

fn handle_error(err: anyhow::Error) {
    let error_style = Style::new().red().bold();

    let core_error = err
        .chain()
        .find_map(|cause| cause.downcast_ref::<CoreError>());

    if let Some(core_error) = core_error {
        match core_error {
            CoreError::NotFound(message) => {
                eprintln!("{} {}", "Error:".style(error_style), message);
            }
            CoreError::AmbiguousId(matches) => {
                eprintln!("{}", "Error: Ambiguous ID.".style(error_style));
                eprintln!("Did you mean one of these?");
                for (id, title) in matches {
                    eprintln!("  {} ({})", id.yellow(), title);
                }
            }
            CoreError::InvalidInput(message) => {
                eprintln!("{} Invalid input: {}", "Error:".style(error_style), message);
            }
            CoreError::InvalidTimezone(timezone) => {
                eprintln!(
                    "{} Invalid timezone: {}",
                    "Error:".style(error_style),
                    timezone.yellow()
                );
                let suggestions = config::suggest_timezone(timezone);
                if !suggestions.is_empty() {
                    eprintln!("Did you mean one of these?");
                    for suggestion in suggestions {
                        eprintln!("  {}", suggestion);
                    }
                }
            }
            _ => eprintln!("{} {}", "Error:".style(error_style), err),
        }
    } else {
        eprintln!("{} {}", "Error:".style(error_style), err);
    }
}
