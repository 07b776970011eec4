use std::path::PathBuf;

use clap::Parser;

use crate::cmd::Commands;

/// Database file name inside the data directory.
pub const DB_FILE: &str = "tasks.db";

/// Single-user to-do list with a terminal UI.
/// Storage defaults to ./data/tasks.db or a path passed via --db.
#[derive(Parser)]
#[command(name = "todo", version, about = "Prioritised to-do list")]
pub struct Cli {
    /// Directory holding the database, settings and log file.
    #[arg(long, global = true, default_value = "data")]
    pub data_dir: PathBuf,

    /// Path to the SQLite database file. Settings and logs go next to it.
    #[arg(long, global = true)]
    pub db: Option<PathBuf>,

    /// Log at debug level (overridden by TODO_LOG).
    #[arg(long, short, global = true)]
    pub verbose: bool,

    /// Command to run; the terminal UI starts when omitted.
    #[command(subcommand)]
    pub command: Option<Commands>,
}

impl Cli {
    /// Directory for the settings and log files.
    pub fn data_dir(&self) -> PathBuf {
        match self.db.as_ref().and_then(|db| db.parent()) {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            Some(_) => PathBuf::from("."),
            None => self.data_dir.clone(),
        }
    }

    pub fn db_path(&self) -> PathBuf {
        self.db
            .clone()
            .unwrap_or_else(|| self.data_dir.join(DB_FILE))
    }
}
