//! Command implementations for the CLI interface.
//!
//! This module contains the command handlers behind each subcommand. Every handler
//! works on an opened `TaskRepository` and returns the crate `Result`; `main` turns an
//! error into a message on stderr and a non-zero exit status.

use std::fs;
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};

use clap::{Args, Subcommand};
use clap_complete::{generate, Shell};
use tracing::info;

use crate::db::*;
use crate::error::{Error, Result};
use crate::fields::*;
use crate::settings::Settings;
use crate::task::parse_batch_text;
use crate::tui::run::run_tui;

#[derive(Subcommand)]
pub enum Commands {
    /// Launch the interactive UI interface.
    Ui,

    /// Add a new task.
    Add {
        /// Short title for the task.
        title: String,
        /// Optional longer description.
        #[arg(long)]
        desc: Option<String>,
        #[command(flatten)]
        attrs: AttributeArgs,
    },

    /// Add many tasks, one `title|description` per line.
    BatchAdd {
        /// Read lines from this file instead of stdin.
        #[arg(long)]
        file: Option<PathBuf>,
        /// Attributes applied to every task.
        #[command(flatten)]
        defaults: AttributeArgs,
    },

    /// List all tasks in display order.
    List {
        /// Print JSON instead of a table.
        #[arg(long)]
        json: bool,
    },

    /// View a single task by ID.
    View {
        /// Task ID to view
        id: i64,
    },

    /// Update fields on a task. Fields not given keep their current value.
    Edit {
        /// Task ID to edit
        id: i64,
        #[arg(long)]
        title: Option<String>,
        #[arg(long)]
        desc: Option<String>,
        #[command(flatten)]
        attrs: AttributeArgs,
    },

    /// Mark a task done.
    Done {
        /// Task ID to complete
        id: i64,
    },

    /// Mark a task not done.
    Undone {
        /// Task ID to reopen
        id: i64,
    },

    /// Delete tasks by ID.
    Delete {
        /// Task IDs to delete
        #[arg(required = true)]
        ids: Vec<i64>,
        /// Skip the confirmation prompt.
        #[arg(long, short)]
        yes: bool,
    },

    /// Delete every completed task.
    PurgeDone {
        /// Skip the confirmation prompt.
        #[arg(long, short)]
        yes: bool,
    },

    /// Show or change settings.
    Settings {
        /// Hide to the tray instead of exiting when the main view is closed.
        #[arg(long)]
        close_to_tray: Option<bool>,
    },

    /// Generate shell completions.
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

/// Optional attribute flags shared by `add`, `batch-add` and `edit`.
#[derive(Args, Debug, Default, Clone)]
pub struct AttributeArgs {
    /// Category: uncategorized | work | personal | study | family | health | entertainment.
    #[arg(long, value_enum)]
    pub category: Option<Category>,
    /// Priority: low | medium | high.
    #[arg(long, value_enum)]
    pub priority: Option<Priority>,
    /// Urgency: not-urgent | normal | urgent.
    #[arg(long, value_enum)]
    pub urgency: Option<Urgency>,
    /// Duration: short-term | mid-term | long-term.
    #[arg(long, value_enum)]
    pub duration: Option<Duration>,
}

impl AttributeArgs {
    /// Overlay the given flags on `base`.
    pub fn apply(&self, base: Attributes) -> Attributes {
        Attributes {
            category: self.category.unwrap_or(base.category),
            priority: self.priority.unwrap_or(base.priority),
            urgency: self.urgency.unwrap_or(base.urgency),
            duration: self.duration.unwrap_or(base.duration),
        }
    }
}

/// Ask a yes/no question on stdin; anything but `y...` means no.
fn confirm(prompt: &str) -> Result<bool> {
    print!("{prompt} (y/N): ");
    io::stdout().flush()?;
    let mut response = String::new();
    io::stdin().read_line(&mut response)?;
    Ok(response.trim().to_lowercase().starts_with('y'))
}

/// Launch the terminal user interface.
pub fn cmd_ui(repo: TaskRepository, settings_path: PathBuf) -> Result<()> {
    run_tui(repo, settings_path)
}

/// Add a new task to the database.
pub fn cmd_add(repo: &TaskRepository, title: String, desc: Option<String>, attrs: AttributeArgs) -> Result<()> {
    let task = repo.create(&title, desc.as_deref().unwrap_or(""), attrs.apply(Attributes::default()))?;
    println!("Added task {}: {}", task.id, task.title);
    Ok(())
}

/// Add every line of `file` (or stdin) as a task, all or nothing.
pub fn cmd_batch_add(repo: &TaskRepository, file: Option<PathBuf>, defaults: AttributeArgs) -> Result<()> {
    let text = match file {
        Some(path) => fs::read_to_string(path)?,
        None => {
            let mut buf = String::new();
            io::stdin().read_to_string(&mut buf)?;
            buf
        }
    };
    let items = parse_batch_text(&text);
    if items.is_empty() {
        println!("No tasks to add.");
        return Ok(());
    }
    let created = repo.create_batch(&items, defaults.apply(Attributes::default()))?;
    println!("Added {} task(s).", created.len());
    Ok(())
}

/// List all tasks in display order.
pub fn cmd_list(repo: &TaskRepository, json: bool) -> Result<()> {
    let tasks = repo.list_all()?;
    if json {
        println!("{}", serde_json::to_string_pretty(&tasks)?);
    } else if tasks.is_empty() {
        println!("No tasks.");
    } else {
        print_table(&tasks);
    }
    Ok(())
}

/// Print every field of one task.
pub fn cmd_view(repo: &TaskRepository, id: i64) -> Result<()> {
    let task = repo.get(id)?.ok_or(Error::TaskNotFound(id))?;
    println!("ID:           {}", task.id);
    println!("Title:        {}", task.title);
    println!("Completed:    {}", if task.completed { "yes" } else { "no" });
    println!("Category:     {}", task.category.label());
    println!("Priority:     {}", task.priority.label());
    println!("Urgency:      {}", task.urgency.label());
    println!("Duration:     {}", task.duration.label());
    println!("Created:      {}", format_time(task.created_time));
    println!("Updated:      {}", format_time(task.updated_time));
    println!(
        "Description:\n{}",
        if task.description.is_empty() { "-" } else { task.description.as_str() }
    );
    Ok(())
}

/// Merge the given fields with the stored task and write the full row back.
pub fn cmd_edit(
    repo: &TaskRepository,
    id: i64,
    title: Option<String>,
    desc: Option<String>,
    attrs: AttributeArgs,
) -> Result<()> {
    let task = repo.get(id)?.ok_or(Error::TaskNotFound(id))?;
    let title = title.unwrap_or(task.title.clone());
    let desc = desc.unwrap_or(task.description.clone());
    if title.trim().is_empty() {
        return Err(Error::EmptyTitle);
    }
    if !repo.update(id, &title, &desc, attrs.apply(task.attributes()))? {
        return Err(Error::TaskNotFound(id));
    }
    println!("Updated task {id}.");
    Ok(())
}

/// Set the completion flag of one task.
pub fn cmd_set_completed(repo: &TaskRepository, id: i64, completed: bool) -> Result<()> {
    if !repo.set_completed(id, completed)? {
        return Err(Error::TaskNotFound(id));
    }
    if completed {
        println!("Task {id} marked done.");
    } else {
        println!("Task {id} reopened.");
    }
    Ok(())
}

/// Delete tasks by ID after confirmation.
pub fn cmd_delete(repo: &TaskRepository, ids: Vec<i64>, yes: bool) -> Result<()> {
    if !yes && !confirm(&format!("Delete {} task(s)?", ids.len()))? {
        println!("Delete cancelled.");
        return Ok(());
    }
    let deleted = repo.delete_many(&ids)?;
    println!("Deleted {deleted} task(s).");
    Ok(())
}

/// Delete every completed task after confirmation.
pub fn cmd_purge_done(repo: &TaskRepository, yes: bool) -> Result<()> {
    let ids: Vec<i64> = repo
        .list_all()?
        .into_iter()
        .filter(|t| t.completed)
        .map(|t| t.id)
        .collect();
    if ids.is_empty() {
        println!("No completed tasks to delete.");
        return Ok(());
    }
    if !yes && !confirm(&format!("Delete {} completed task(s)?", ids.len()))? {
        println!("Delete cancelled.");
        return Ok(());
    }
    let deleted = repo.delete_many(&ids)?;
    println!("Deleted {deleted} task(s), {} remaining.", repo.count()?);
    Ok(())
}

/// Show settings, saving first when a new value is given.
pub fn cmd_settings(settings_path: &Path, close_to_tray: Option<bool>) -> Result<()> {
    let mut settings = Settings::load(settings_path);
    if let Some(value) = close_to_tray {
        settings.close_to_tray = value;
        settings.save(settings_path)?;
        info!(close_to_tray = value, "settings saved");
    }
    println!("close_to_tray: {}", settings.close_to_tray);
    Ok(())
}

/// Generate shell completion scripts.
pub fn cmd_completions(shell: Shell) {
    use clap::CommandFactory;
    use crate::cli::Cli;

    let mut app = Cli::command();
    let app_name = app.get_name().to_string();
    generate(shell, &mut app, app_name, &mut std::io::stdout());
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::Cli;
    use clap::Parser;
    use tempfile::TempDir;

    fn create_test_repo() -> (TempDir, TaskRepository) {
        let dir = TempDir::new().unwrap();
        let repo = TaskRepository::open(dir.path().join("tasks.db")).unwrap();
        (dir, repo)
    }

    #[test]
    fn test_parse_add_with_attributes() {
        let cli = Cli::parse_from([
            "todo", "add", "Ship it", "--urgency", "urgent", "--duration", "short-term",
            "--category", "work",
        ]);
        let Some(Commands::Add { title, attrs, .. }) = cli.command else {
            panic!("expected add");
        };
        assert_eq!(title, "Ship it");
        let attrs = attrs.apply(Attributes::default());
        assert_eq!(attrs.urgency, Urgency::Urgent);
        assert_eq!(attrs.duration, Duration::ShortTerm);
        assert_eq!(attrs.category, Category::Work);
        assert_eq!(attrs.priority, Priority::Low);
    }

    #[test]
    fn test_delete_requires_ids() {
        assert!(Cli::try_parse_from(["todo", "delete"]).is_err());
        assert!(Cli::try_parse_from(["todo", "delete", "1", "2", "--yes"]).is_ok());
    }

    #[test]
    fn test_edit_keeps_unspecified_fields() {
        let (_dir, repo) = create_test_repo();
        let attrs = Attributes {
            category: Category::Health,
            priority: Priority::High,
            urgency: Urgency::Normal,
            duration: Duration::LongTerm,
        };
        let task = repo.create("Dentist", "Tuesday", attrs).unwrap();

        let flags = AttributeArgs {
            urgency: Some(Urgency::Urgent),
            ..Default::default()
        };
        cmd_edit(&repo, task.id, None, Some("Wednesday".into()), flags).unwrap();

        let edited = repo.get(task.id).unwrap().unwrap();
        assert_eq!(edited.title, "Dentist");
        assert_eq!(edited.description, "Wednesday");
        assert_eq!(edited.category, Category::Health);
        assert_eq!(edited.priority, Priority::High);
        assert_eq!(edited.urgency, Urgency::Urgent);
        assert_eq!(edited.duration, Duration::LongTerm);
    }

    #[test]
    fn test_edit_with_blank_title_reports_empty_title() {
        let (_dir, repo) = create_test_repo();
        let task = repo.create("Keep", "", Attributes::default()).unwrap();
        assert!(matches!(
            cmd_edit(&repo, task.id, Some("  ".into()), None, AttributeArgs::default()),
            Err(Error::EmptyTitle)
        ));
        assert_eq!(repo.get(task.id).unwrap().unwrap().title, "Keep");
    }

    #[test]
    fn test_missing_ids_are_errors() {
        let (_dir, repo) = create_test_repo();
        assert!(matches!(cmd_view(&repo, 42), Err(Error::TaskNotFound(42))));
        assert!(matches!(
            cmd_set_completed(&repo, 42, true),
            Err(Error::TaskNotFound(42))
        ));
        assert!(matches!(
            cmd_edit(&repo, 42, None, None, AttributeArgs::default()),
            Err(Error::TaskNotFound(42))
        ));
    }

    #[test]
    fn test_batch_add_from_file() {
        let (dir, repo) = create_test_repo();
        let path = dir.path().join("batch.txt");
        fs::write(&path, "Buy groceries|Get vegetables\n\n  Call mom  \n").unwrap();
        let defaults = AttributeArgs {
            category: Some(Category::Personal),
            ..Default::default()
        };
        cmd_batch_add(&repo, Some(path), defaults).unwrap();

        let tasks = repo.list_all().unwrap();
        assert_eq!(tasks.len(), 2);
        assert!(tasks.iter().all(|t| t.category == Category::Personal));
        assert!(tasks
            .iter()
            .any(|t| t.title == "Buy groceries" && t.description == "Get vegetables"));
    }

    #[test]
    fn test_purge_done_keeps_open_tasks() {
        let (_dir, repo) = create_test_repo();
        let done = repo.create("done", "", Attributes::default()).unwrap();
        let open = repo.create("open", "", Attributes::default()).unwrap();
        repo.set_completed(done.id, true).unwrap();

        cmd_purge_done(&repo, true).unwrap();
        let ids: Vec<i64> = repo.list_all().unwrap().iter().map(|t| t.id).collect();
        assert_eq!(ids, vec![open.id]);
    }

    #[test]
    fn test_settings_command_saves() {
        let dir = TempDir::new().unwrap();
        let path = Settings::path_in(dir.path());
        cmd_settings(&path, Some(false)).unwrap();
        assert!(!Settings::load(&path).close_to_tray);
        cmd_settings(&path, None).unwrap();
        assert!(!Settings::load(&path).close_to_tray);
    }
}
