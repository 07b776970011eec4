//! Database operations and display helpers for task management.
//!
//! This module provides the `TaskRepository` that owns the `SQLite` task store,
//! along with the formatting utilities shared by the CLI and the TUI.

use std::path::PathBuf;

use chrono::{DateTime, Local, NaiveDateTime, TimeZone, Utc};
use rusqlite::types::{Type, Value};
use rusqlite::{params, params_from_iter, Connection, OptionalExtension, Row};
use tracing::{debug, info};

use crate::error::{Error, Result};
use crate::fields::*;
use crate::migrations;
use crate::task::{BatchItem, Task};

/// Bucket rank as an SQL expression over the `urgency` and `duration` columns.
///
/// Codes outside 1..=3 (or NULL) rank as the value `Urgency::from_code` and
/// `Duration::from_code` decode them to.
pub const RANK_SQL: &str = "((3 - CASE urgency WHEN 2 THEN 2 WHEN 3 THEN 3 ELSE 1 END) * 3 \
                            + (CASE duration WHEN 1 THEN 1 WHEN 3 THEN 3 ELSE 2 END - 1))";

/// Completion flag as decoded by `task_from_row`: NULL is open, any non-zero is done.
const COMPLETED_SQL: &str = "(COALESCE(completed, 0) != 0)";

const SELECT_COLUMNS: &str = "id, title, description, category, priority, urgency, duration, \
                              completed, created_time, updated_time";

/// `SQLite`-backed task store.
///
/// Each operation opens a new connection to the database file and closes it
/// when done; the store is single-user and operations are infrequent.
#[derive(Debug, Clone)]
pub struct TaskRepository {
    db_path: PathBuf,
}

impl TaskRepository {
    /// Open (creating if needed) the store at `db_path` and upgrade its schema.
    pub fn open(db_path: impl Into<PathBuf>) -> Result<Self> {
        let repo = Self {
            db_path: db_path.into(),
        };
        let conn = repo.connect()?;
        migrations::apply(&conn)?;
        info!(path = %repo.db_path.display(), "opened task store");
        Ok(repo)
    }

    fn connect(&self) -> Result<Connection> {
        if let Some(parent) = self.db_path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        Ok(Connection::open(&self.db_path)?)
    }

    /// Insert a single task. Empty titles are rejected before touching the store.
    pub fn create(&self, title: &str, description: &str, attrs: Attributes) -> Result<Task> {
        let title = title.trim();
        if title.is_empty() {
            return Err(Error::EmptyTitle);
        }
        let conn = self.connect()?;
        let task = insert_task(&conn, title, description.trim(), attrs, Utc::now())?;
        info!(id = task.id, "created task");
        Ok(task)
    }

    /// Insert every item with the shared `defaults`, all or nothing.
    ///
    /// Items with a blank title are skipped. Returns the inserted tasks in input order.
    pub fn create_batch(&self, items: &[BatchItem], defaults: Attributes) -> Result<Vec<Task>> {
        let mut conn = self.connect()?;
        let tx = conn.transaction()?;
        let now = Utc::now();
        let mut created = Vec::with_capacity(items.len());
        for item in items {
            let title = item.title.trim();
            if title.is_empty() {
                continue;
            }
            created.push(insert_task(&tx, title, item.description.trim(), defaults, now)?);
        }
        tx.commit()?;
        info!(count = created.len(), "created task batch");
        Ok(created)
    }

    /// Replace every mutable field of task `id`.
    ///
    /// Returns `false` without writing when the title is empty or the task is absent.
    pub fn update(&self, id: i64, title: &str, description: &str, attrs: Attributes) -> Result<bool> {
        let title = title.trim();
        if title.is_empty() {
            debug!(id, "ignoring update with empty title");
            return Ok(false);
        }
        let conn = self.connect()?;
        let changed = conn.execute(
            "UPDATE tasks
             SET title = ?1, description = ?2, category = ?3, priority = ?4,
                 urgency = ?5, duration = ?6,
                 updated_time = MAX(?7, COALESCE(updated_time, 0) + 1)
             WHERE id = ?8",
            params![
                title,
                description.trim(),
                attrs.category.label(),
                attrs.priority.code(),
                attrs.urgency.code(),
                attrs.duration.code(),
                Utc::now().timestamp_millis(),
                id
            ],
        )?;
        if changed > 0 {
            info!(id, "updated task");
        }
        Ok(changed > 0)
    }

    /// Set only the completion flag of task `id`. Absent ids are a no-op.
    pub fn set_completed(&self, id: i64, completed: bool) -> Result<bool> {
        let conn = self.connect()?;
        let changed = conn.execute(
            "UPDATE tasks
             SET completed = ?1, updated_time = MAX(?2, COALESCE(updated_time, 0) + 1)
             WHERE id = ?3",
            params![completed, Utc::now().timestamp_millis(), id],
        )?;
        debug!(id, completed, changed, "set completion");
        Ok(changed > 0)
    }

    /// Delete task `id`, returning the number of rows removed.
    pub fn delete(&self, id: i64) -> Result<usize> {
        self.delete_many(&[id])
    }

    /// Delete every task in `ids`. Ids with no row are ignored.
    pub fn delete_many(&self, ids: &[i64]) -> Result<usize> {
        if ids.is_empty() {
            return Ok(0);
        }
        let conn = self.connect()?;
        let placeholders = vec!["?"; ids.len()].join(",");
        let removed = conn.execute(
            &format!("DELETE FROM tasks WHERE id IN ({placeholders})"),
            params_from_iter(ids.iter()),
        )?;
        info!(requested = ids.len(), removed, "deleted tasks");
        Ok(removed)
    }

    /// Get a task by ID.
    pub fn get(&self, id: i64) -> Result<Option<Task>> {
        let conn = self.connect()?;
        let task = conn
            .query_row(
                &format!("SELECT {SELECT_COLUMNS} FROM tasks WHERE id = ?1"),
                params![id],
                task_from_row,
            )
            .optional()?;
        Ok(task)
    }

    /// Every task, in listing order.
    pub fn list_all(&self) -> Result<Vec<Task>> {
        let conn = self.connect()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {SELECT_COLUMNS} FROM tasks
             ORDER BY {RANK_SQL} ASC, {COMPLETED_SQL} ASC, created_time DESC, id DESC"
        ))?;
        let tasks = stmt
            .query_map([], task_from_row)?
            .collect::<rusqlite::Result<Vec<Task>>>()?;
        Ok(tasks)
    }

    /// Number of stored tasks.
    pub fn count(&self) -> Result<usize> {
        let conn = self.connect()?;
        let n: i64 = conn.query_row("SELECT COUNT(*) FROM tasks", [], |row| row.get(0))?;
        Ok(usize::try_from(n).unwrap_or(0))
    }
}

fn insert_task(
    conn: &Connection,
    title: &str,
    description: &str,
    attrs: Attributes,
    now: DateTime<Utc>,
) -> Result<Task> {
    let millis = now.timestamp_millis();
    conn.execute(
        "INSERT INTO tasks (title, description, category, priority, urgency, duration,
                            completed, created_time, updated_time)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, 0, ?7, ?7)",
        params![
            title,
            description,
            attrs.category.label(),
            attrs.priority.code(),
            attrs.urgency.code(),
            attrs.duration.code(),
            millis
        ],
    )?;
    let stamp = millis_to_utc(millis).unwrap_or(now);
    Ok(Task {
        id: conn.last_insert_rowid(),
        title: title.to_string(),
        description: description.to_string(),
        category: attrs.category,
        priority: attrs.priority,
        urgency: attrs.urgency,
        duration: attrs.duration,
        completed: false,
        created_time: stamp,
        updated_time: stamp,
    })
}

fn task_from_row(row: &Row<'_>) -> rusqlite::Result<Task> {
    let created_time = decode_time("created_time", row.get(8)?)
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(8, Type::Integer, Box::new(e)))?;
    let updated_time = match row.get::<_, Value>(9)? {
        Value::Null => created_time,
        value => decode_time("updated_time", value)
            .map_err(|e| rusqlite::Error::FromSqlConversionFailure(9, Type::Integer, Box::new(e)))?,
    };
    Ok(Task {
        id: row.get(0)?,
        title: row.get(1)?,
        description: row.get::<_, Option<String>>(2)?.unwrap_or_default(),
        category: Category::from_label(&row.get::<_, Option<String>>(3)?.unwrap_or_default()),
        priority: Priority::from_code(row.get::<_, Option<i64>>(4)?.unwrap_or(1)),
        urgency: Urgency::from_code(row.get::<_, Option<i64>>(5)?.unwrap_or(1)),
        duration: Duration::from_code(row.get::<_, Option<i64>>(6)?.unwrap_or(2)),
        completed: row.get::<_, Option<i64>>(7)?.unwrap_or(0) != 0,
        created_time,
        updated_time,
    })
}

fn millis_to_utc(millis: i64) -> Option<DateTime<Utc>> {
    Utc.timestamp_millis_opt(millis).single()
}

/// Decode a stored timestamp: Unix milliseconds, or the UTC text form written by
/// older releases (`YYYY-MM-DD HH:MM:SS[.fff]`).
pub fn decode_time(column: &'static str, value: Value) -> Result<DateTime<Utc>> {
    let invalid = |value: String| Error::InvalidTimestamp { column, value };
    match value {
        Value::Integer(millis) => millis_to_utc(millis).ok_or_else(|| invalid(millis.to_string())),
        Value::Text(text) => parse_legacy_time(&text).ok_or_else(|| invalid(text)),
        Value::Null => Err(invalid("NULL".to_string())),
        Value::Real(r) => Err(invalid(r.to_string())),
        Value::Blob(_) => Err(invalid("<blob>".to_string())),
    }
}

fn parse_legacy_time(text: &str) -> Option<DateTime<Utc>> {
    let text = text.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
        return Some(dt.with_timezone(&Utc));
    }
    ["%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S%.f"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(text, fmt).ok())
        .map(|naive| naive.and_utc())
}

/// Format a timestamp in local time for list rows.
pub fn format_time(t: DateTime<Utc>) -> String {
    t.with_timezone(&Local).format("%Y-%m-%d %H:%M").to_string()
}

/// Attribute summary shown under a task title.
pub fn format_tags(task: &Task) -> String {
    format!(
        "{} · {} · {} · {}",
        task.category.label(),
        task.priority.label(),
        task.urgency.label(),
        task.duration.label()
    )
}

/// Checkbox glyph for the completion flag.
pub fn format_completed(completed: bool) -> &'static str {
    if completed {
        "[x]"
    } else {
        "[ ]"
    }
}

/// Print tasks in a formatted table.
pub fn print_table(tasks: &[Task]) {
    println!(
        "{:<5} {:<4} {:<14} {:<7} {:<11} {:<11} {:<17} {}",
        "ID", "Done", "Category", "Pri", "Urgency", "Duration", "Created", "Title"
    );
    for t in tasks {
        let description = if t.description.is_empty() {
            String::new()
        } else {
            format!(" - {}", truncate(&t.description, 40))
        };
        println!(
            "{:<5} {:<4} {:<14} {:<7} {:<11} {:<11} {:<17} {}{}",
            t.id,
            format_completed(t.completed),
            t.category.label(),
            t.priority.label(),
            t.urgency.label(),
            t.duration.label(),
            format_time(t.created_time),
            t.title,
            description
        );
    }
}

/// Truncate a string to a maximum width, adding ellipsis if needed.
pub fn truncate(s: &str, width: usize) -> String {
    if s.chars().count() <= width {
        s.to_string()
    } else {
        let mut out = String::new();
        for (i, ch) in s.chars().enumerate() {
            if i + 1 >= width {
                out.push('…');
                break;
            }
            out.push(ch);
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::task::parse_batch_text;
    use proptest::prelude::*;
    use tempfile::TempDir;

    fn create_test_repo() -> (TempDir, TaskRepository) {
        let dir = TempDir::new().unwrap();
        let repo = TaskRepository::open(dir.path().join("data").join("tasks.db")).unwrap();
        (dir, repo)
    }

    fn attrs(urgency: Urgency, duration: Duration) -> Attributes {
        Attributes {
            urgency,
            duration,
            ..Attributes::default()
        }
    }

    #[test]
    fn test_open_creates_database_file() {
        let (dir, repo) = create_test_repo();
        assert!(dir.path().join("data").join("tasks.db").exists());
        assert_eq!(repo.count().unwrap(), 0);
    }

    #[test]
    fn test_create_assigns_defaults() {
        let (_dir, repo) = create_test_repo();
        let task = repo.create("  Write report ", "", Attributes::default()).unwrap();
        assert_eq!(task.title, "Write report");
        assert!(!task.completed);
        assert_eq!(task.created_time, task.updated_time);
        assert_eq!(repo.get(task.id).unwrap(), Some(task));
    }

    #[test]
    fn test_create_empty_title_leaves_store_unchanged() {
        let (_dir, repo) = create_test_repo();
        repo.create("keep", "", Attributes::default()).unwrap();
        let err = repo.create("   ", "desc", Attributes::default()).unwrap_err();
        assert!(matches!(err, Error::EmptyTitle));
        assert_eq!(repo.count().unwrap(), 1);
    }

    #[test]
    fn test_ids_are_not_reused() {
        let (_dir, repo) = create_test_repo();
        let first = repo.create("one", "", Attributes::default()).unwrap();
        repo.delete(first.id).unwrap();
        let second = repo.create("two", "", Attributes::default()).unwrap();
        assert!(second.id > first.id);
    }

    #[test]
    fn test_list_all_example_order() {
        let (_dir, repo) = create_test_repo();
        let a = repo.create("A", "", attrs(Urgency::Urgent, Duration::ShortTerm)).unwrap();
        let b = repo.create("B", "", attrs(Urgency::Urgent, Duration::LongTerm)).unwrap();
        let c = repo.create("C", "", attrs(Urgency::NotUrgent, Duration::ShortTerm)).unwrap();
        let ids: Vec<i64> = repo.list_all().unwrap().iter().map(|t| t.id).collect();
        assert_eq!(ids, vec![a.id, b.id, c.id]);
    }

    #[test]
    fn test_list_all_completion_and_age_tie_breaks() {
        let (_dir, repo) = create_test_repo();
        let same = attrs(Urgency::Normal, Duration::MidTerm);
        let older = repo.create("older", "", same).unwrap();
        std::thread::sleep(std::time::Duration::from_millis(5));
        let newer = repo.create("newer", "", same).unwrap();
        std::thread::sleep(std::time::Duration::from_millis(5));
        let done = repo.create("done", "", same).unwrap();
        repo.set_completed(done.id, true).unwrap();

        let ids: Vec<i64> = repo.list_all().unwrap().iter().map(|t| t.id).collect();
        assert_eq!(ids, vec![newer.id, older.id, done.id]);
    }

    #[test]
    fn test_toggle_completion_advances_updated_time() {
        let (_dir, repo) = create_test_repo();
        let task = repo.create("toggle me", "", Attributes::default()).unwrap();

        assert!(repo.set_completed(task.id, true).unwrap());
        let first = repo.get(task.id).unwrap().unwrap();
        assert!(first.completed);

        assert!(repo.set_completed(task.id, false).unwrap());
        let second = repo.get(task.id).unwrap().unwrap();
        assert!(!second.completed);

        assert!(task.updated_time < first.updated_time);
        assert!(first.updated_time < second.updated_time);
        assert_eq!(second.created_time, task.created_time);
    }

    #[test]
    fn test_update_replaces_fields() {
        let (_dir, repo) = create_test_repo();
        let task = repo.create("draft", "", Attributes::default()).unwrap();
        let new_attrs = Attributes {
            category: Category::Study,
            priority: Priority::High,
            urgency: Urgency::Urgent,
            duration: Duration::LongTerm,
        };
        assert!(repo.update(task.id, "final", "notes", new_attrs).unwrap());
        let stored = repo.get(task.id).unwrap().unwrap();
        assert_eq!(stored.title, "final");
        assert_eq!(stored.description, "notes");
        assert_eq!(stored.attributes(), new_attrs);
        assert!(stored.updated_time > stored.created_time);
    }

    #[test]
    fn test_update_with_empty_title_is_noop() {
        let (_dir, repo) = create_test_repo();
        let task = repo.create("draft", "d", Attributes::default()).unwrap();
        assert!(!repo.update(task.id, "", "changed", Attributes::default()).unwrap());
        assert_eq!(repo.get(task.id).unwrap(), Some(task));
        assert!(!repo.update(9_999, "ghost", "", Attributes::default()).unwrap());
    }

    #[test]
    fn test_delete_missing_id_is_noop() {
        let (_dir, repo) = create_test_repo();
        repo.create("stay", "", Attributes::default()).unwrap();
        assert_eq!(repo.delete(12_345).unwrap(), 0);
        assert_eq!(repo.delete_many(&[]).unwrap(), 0);
        assert_eq!(repo.count().unwrap(), 1);
    }

    #[test]
    fn test_delete_many_ignores_absent_ids() {
        let (_dir, repo) = create_test_repo();
        let a = repo.create("a", "", Attributes::default()).unwrap();
        let b = repo.create("b", "", Attributes::default()).unwrap();
        let c = repo.create("c", "", Attributes::default()).unwrap();
        assert_eq!(repo.delete_many(&[a.id, c.id, 777]).unwrap(), 2);
        let remaining: Vec<i64> = repo.list_all().unwrap().iter().map(|t| t.id).collect();
        assert_eq!(remaining, vec![b.id]);
    }

    #[test]
    fn test_batch_applies_shared_defaults() {
        let (_dir, repo) = create_test_repo();
        let defaults = Attributes {
            category: Category::Personal,
            priority: Priority::Medium,
            urgency: Urgency::Normal,
            duration: Duration::ShortTerm,
        };
        let items = parse_batch_text("Buy groceries|Get vegetables\nCall mom");
        let created = repo.create_batch(&items, defaults).unwrap();
        assert_eq!(created.len(), 2);

        let mut stored = repo.list_all().unwrap();
        stored.sort_by_key(|t| t.id);
        let rows: Vec<(&str, &str, Attributes)> = stored
            .iter()
            .map(|t| (t.title.as_str(), t.description.as_str(), t.attributes()))
            .collect();
        assert_eq!(
            rows,
            vec![
                ("Buy groceries", "Get vegetables", defaults),
                ("Call mom", "", defaults),
            ]
        );
    }

    #[test]
    fn test_batch_is_all_or_nothing() {
        let (_dir, repo) = create_test_repo();
        {
            let conn = repo.connect().unwrap();
            conn.execute_batch(
                "CREATE TRIGGER reject_poison BEFORE INSERT ON tasks
                 WHEN NEW.title = 'poison'
                 BEGIN SELECT RAISE(ABORT, 'rejected'); END;",
            )
            .unwrap();
        }
        let items = vec![BatchItem::new("fine", ""), BatchItem::new("poison", "")];
        assert!(repo.create_batch(&items, Attributes::default()).is_err());
        assert_eq!(repo.count().unwrap(), 0);
    }

    #[test]
    fn test_out_of_range_codes_sort_as_decoded() {
        let (_dir, repo) = create_test_repo();
        let urgent = repo.create("urgent", "", attrs(Urgency::Urgent, Duration::ShortTerm)).unwrap();
        let odd = repo.create("odd", "", Attributes::default()).unwrap();
        let nul = repo.create("nul", "", Attributes::default()).unwrap();
        let flag = repo.create("flag", "", Attributes::default()).unwrap();
        {
            let conn = repo.connect().unwrap();
            conn.execute("UPDATE tasks SET urgency = 7 WHERE id = ?1", params![odd.id]).unwrap();
            conn.execute("UPDATE tasks SET duration = NULL WHERE id = ?1", params![nul.id]).unwrap();
            conn.execute("UPDATE tasks SET completed = NULL WHERE id = ?1", params![flag.id]).unwrap();
        }

        let from_sql = repo.list_all().unwrap();
        let mut sorted = from_sql.clone();
        sorted.sort_by(Task::listing_order);
        assert_eq!(from_sql, sorted);
        assert_eq!(from_sql[0].id, urgent.id);
        let odd_row = from_sql.iter().find(|t| t.id == odd.id).unwrap();
        assert_eq!(odd_row.urgency, Urgency::NotUrgent);
        assert!(!from_sql.iter().find(|t| t.id == flag.id).unwrap().completed);
    }

    #[test]
    fn test_reopen_keeps_rows() {
        let (dir, repo) = create_test_repo();
        repo.create("persisted", "", Attributes::default()).unwrap();
        let reopened = TaskRepository::open(dir.path().join("data").join("tasks.db")).unwrap();
        assert_eq!(reopened.count().unwrap(), 1);
    }

    #[test]
    fn test_legacy_store_is_readable() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("tasks.db");
        {
            let conn = Connection::open(&path).unwrap();
            conn.execute_batch(
                "CREATE TABLE tasks (
                    id INTEGER PRIMARY KEY AUTOINCREMENT,
                    title TEXT NOT NULL,
                    description TEXT,
                    completed INTEGER DEFAULT 0,
                    created_time TIMESTAMP DEFAULT CURRENT_TIMESTAMP,
                    updated_time TIMESTAMP DEFAULT CURRENT_TIMESTAMP
                );
                INSERT INTO tasks (title, description) VALUES ('legacy', 'from before');",
            )
            .unwrap();
        }
        let repo = TaskRepository::open(&path).unwrap();
        let tasks = repo.list_all().unwrap();
        assert_eq!(tasks.len(), 1);
        assert_eq!(tasks[0].title, "legacy");
        assert_eq!(tasks[0].attributes(), Attributes::default());
        assert!(!tasks[0].completed);
    }

    #[test]
    fn test_decode_time_forms() {
        let from_text = decode_time("created_time", Value::Text("2024-03-01 08:30:00".into())).unwrap();
        assert_eq!(from_text.timestamp_millis(), 1_709_281_800_000);
        let from_iso = decode_time("created_time", Value::Text("2024-03-01T08:30:00.250".into())).unwrap();
        assert_eq!(from_iso.timestamp_millis(), 1_709_281_800_250);
        let from_int = decode_time("created_time", Value::Integer(1_709_281_800_000)).unwrap();
        assert_eq!(from_int, from_text);
        assert!(decode_time("created_time", Value::Null).is_err());
    }

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("a longer title", 6), "a lon…");
    }

    fn arb_attrs() -> impl Strategy<Value = Attributes> {
        (0usize..7, 0usize..3, 0usize..3, 0usize..3).prop_map(|(c, p, u, d)| Attributes {
            category: Category::ALL[c],
            priority: Priority::ALL[p],
            urgency: Urgency::ALL[u],
            duration: Duration::ALL[d],
        })
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(24))]

        #[test]
        fn prop_sql_order_matches_listing_order(
            rows in prop::collection::vec((arb_attrs(), any::<bool>()), 1..12)
        ) {
            let (_dir, repo) = create_test_repo();
            for (i, (attrs, completed)) in rows.iter().enumerate() {
                let task = repo.create(&format!("task {i}"), "", *attrs).unwrap();
                if *completed {
                    repo.set_completed(task.id, true).unwrap();
                }
            }
            let from_sql = repo.list_all().unwrap();
            let mut sorted = from_sql.clone();
            sorted.sort_by(Task::listing_order);
            prop_assert_eq!(from_sql, sorted);
        }
    }
}
