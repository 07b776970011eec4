//! # todo - Prioritised to-do list
//!
//! A single-user to-do list backed by an embedded SQLite file, with a full-screen
//! terminal user interface (TUI) and a scriptable CLI.
//!
//! ## Key Features
//!
//! - **Urgency/duration ordering**: urgent short-term work floats to the top, then open
//!   before done, then newest first
//! - **Rich Task Metadata**: category, priority, urgency and duration on every task
//! - **Batch add**: paste one `title|description` per line, all added in one transaction
//! - **Batch delete**: clear every completed task at once
//! - **Minimize to tray**: closing the main view can park the app instead of exiting
//! - **Schema upgrades**: older databases gain missing columns on open
//!
//! ## Quick Start
//!
//! ```bash
//! # Launch the TUI
//! todo
//!
//! # Add a task via CLI
//! todo add "Renew passport" --urgency urgent --duration short-term --category personal
//!
//! # Add several at once
//! printf 'Buy groceries|Get vegetables\nCall mom\n' | todo batch-add --category family
//!
//! # List tasks
//! todo list
//! ```
//!
//! Data is stored in `./data/` (database `tasks.db`, `settings.json` and `todo.log`).
//! Use `--data-dir` or `--db` to keep it elsewhere.

use clap::Parser;
use tracing::error;

pub mod cli;
pub mod cmd;
pub mod db;
pub mod error;
pub mod fields;
pub mod logging;
pub mod migrations;
pub mod settings;
pub mod task;
pub mod tray;
pub mod tui {
    pub mod app;
    pub mod colors;
    pub mod enums;
    pub mod input;
    pub mod run;
    pub mod task_form;
    pub mod utils;
}

use cli::Cli;
use cmd::*;
use db::TaskRepository;
use settings::Settings;

fn main() {
    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        error!(error = %e, "command failed");
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> error::Result<()> {
    if let Some(Commands::Completions { shell }) = &cli.command {
        cmd_completions(*shell);
        return Ok(());
    }

    let data_dir = cli.data_dir();
    if let Err(e) = logging::init_tracing(&logging::log_path_in(&data_dir), cli.verbose) {
        eprintln!("Warning: logging disabled: {e}");
    }

    let repo = TaskRepository::open(cli.db_path())?;
    let settings_path = Settings::path_in(&data_dir);

    match cli.command.unwrap_or(Commands::Ui) {
        Commands::Ui => cmd_ui(repo, settings_path),
        Commands::Add { title, desc, attrs } => cmd_add(&repo, title, desc, attrs),
        Commands::BatchAdd { file, defaults } => cmd_batch_add(&repo, file, defaults),
        Commands::List { json } => cmd_list(&repo, json),
        Commands::View { id } => cmd_view(&repo, id),
        Commands::Edit { id, title, desc, attrs } => cmd_edit(&repo, id, title, desc, attrs),
        Commands::Done { id } => cmd_set_completed(&repo, id, true),
        Commands::Undone { id } => cmd_set_completed(&repo, id, false),
        Commands::Delete { ids, yes } => cmd_delete(&repo, ids, yes),
        Commands::PurgeDone { yes } => cmd_purge_done(&repo, yes),
        Commands::Settings { close_to_tray } => cmd_settings(&settings_path, close_to_tray),
        Commands::Completions { .. } => unreachable!("completions handled above"),
    }
}
