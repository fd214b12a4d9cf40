//! raspored CLI: weekly task planner.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use serde::Serialize;

use raspored_lib::board::render_text;
use raspored_lib::commands::{self, CommandResult, LogCtx};
use raspored_lib::config::Config;
use raspored_lib::logging::init_logging;
use raspored_lib::{
    DayKey, FileStore, Filters, Priority, Selector, Status, TaskDraft, TaskPatch, TaskStore,
    ThemeMode,
};

#[derive(Parser)]
#[command(name = "raspored", version, about = "Weekly task planner")]
struct Cli {
    /// Directory holding the task and theme slots.
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    /// Print the command result as JSON.
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Add a task to a day.
    Add {
        title: String,
        #[arg(long, default_value = "mon")]
        day: DayKey,
        #[arg(long, default_value = "medium")]
        priority: Priority,
        #[arg(long, default_value = "todo")]
        status: Status,
    },

    /// Change fields of an existing task. Fields that are not given are kept.
    Edit {
        id: String,
        #[arg(long)]
        title: Option<String>,
        #[arg(long)]
        day: Option<DayKey>,
        #[arg(long)]
        priority: Option<Priority>,
        #[arg(long)]
        status: Option<Status>,
    },

    /// Mark a task as done.
    Done { id: String },

    /// Move a done task back to todo.
    Undo { id: String },

    /// Delete a task.
    Delete { id: String },

    /// Show the weekly board.
    List {
        /// A day key (mon..sun) or "all".
        #[arg(long, default_value = "all")]
        day: Selector<DayKey>,
        /// low, medium, high or "all".
        #[arg(long, default_value = "all")]
        priority: Selector<Priority>,
        /// todo, inprogress, done or "all".
        #[arg(long, default_value = "all")]
        status: Selector<Status>,
        /// Case-insensitive text to look for in titles.
        #[arg(long, default_value = "")]
        query: String,
    },

    /// Show completion progress.
    Stats,

    /// Show or change the display mode.
    Theme {
        #[command(subcommand)]
        action: Option<ThemeAction>,
    },
}

#[derive(Subcommand)]
enum ThemeAction {
    /// Switch to the light mode.
    Light,
    /// Switch to the dark mode.
    Dark,
    /// Flip between light and dark.
    Toggle,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let config = match Config::resolve(cli.data_dir.clone()) {
        Ok(config) => config,
        Err(error) => {
            eprintln!("error: {error}");
            return ExitCode::FAILURE;
        }
    };
    if let Err(error) = config.ensure_data_dir() {
        eprintln!("error: {error}");
        return ExitCode::FAILURE;
    }
    let _logger = match init_logging(&config) {
        Ok(handle) => Some(handle),
        Err(error) => {
            eprintln!("warning: logging disabled: {error}");
            None
        }
    };

    let mut state = TaskStore::open(FileStore::new(config.data_dir.clone()));
    let ctx = LogCtx;
    let json = cli.json;

    match cli.command {
        Commands::Add {
            title,
            day,
            priority,
            status,
        } => {
            let draft = TaskDraft {
                title,
                day,
                priority,
                status,
            };
            let result = commands::create_task(&ctx, &mut state, draft);
            report(json, result, |task| {
                format!("added {} ({}) {}", task.title, task.day.short_label(), task.id)
            })
        }
        Commands::Edit {
            id,
            title,
            day,
            priority,
            status,
        } => {
            let patch = TaskPatch {
                title,
                day,
                priority,
                status,
            };
            let result = if patch.is_empty() {
                CommandResult::failure("nothing to change")
            } else {
                commands::update_task(&ctx, &mut state, &id, patch)
            };
            report(json, result, |task| {
                format!("updated {} ({}) {}", task.title, task.day.short_label(), task.id)
            })
        }
        Commands::Done { id } => {
            let result = commands::set_done(&ctx, &mut state, &id, true);
            report(json, result, |task| format!("done: {}", task.title))
        }
        Commands::Undo { id } => {
            let result = commands::set_done(&ctx, &mut state, &id, false);
            report(json, result, |task| format!("todo: {}", task.title))
        }
        Commands::Delete { id } => {
            let result = commands::delete_task(&ctx, &mut state, &id);
            report(json, result, |_| format!("deleted {id}"))
        }
        Commands::List {
            day,
            priority,
            status,
            query,
        } => {
            let filters = Filters {
                day,
                priority,
                status,
                query,
            };
            report(json, commands::board(&state, &filters), render_text)
        }
        Commands::Stats => report(json, commands::stats(&state), |stats| {
            format!("Završeno: {}/{} • {}%", stats.done, stats.total, stats.percent)
        }),
        Commands::Theme { action } => {
            let result = match action {
                None => commands::current_theme(&state),
                Some(ThemeAction::Light) => commands::set_theme(&ctx, &state, ThemeMode::Light),
                Some(ThemeAction::Dark) => commands::set_theme(&ctx, &state, ThemeMode::Dark),
                Some(ThemeAction::Toggle) => commands::toggle_theme(&ctx, &state),
            };
            report(json, result, |mode| mode.to_string())
        }
    }
}

/// Prints a command result and maps it to the process exit code.
fn report<T: Serialize>(
    json: bool,
    result: CommandResult<T>,
    human: impl Fn(&T) -> String,
) -> ExitCode {
    if json {
        match serde_json::to_string_pretty(&result) {
            Ok(text) => println!("{text}"),
            Err(error) => {
                eprintln!("error: {error}");
                return ExitCode::FAILURE;
            }
        }
    } else if let Some(data) = &result.data {
        println!("{}", human(data).trim_end());
    }

    if result.ok {
        return ExitCode::SUCCESS;
    }
    if let Some(error) = &result.error {
        log::debug!("command failed: {error}");
        if !json {
            eprintln!("error: {error}");
        }
    }
    ExitCode::FAILURE
}
