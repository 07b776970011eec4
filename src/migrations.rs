//! Numbered schema upgrades for the task store.
//!
//! Applied steps are recorded in `schema_migrations`, so each runs at most once per
//! database file. Stores written by earlier releases (a six-column `tasks` table with
//! text timestamps and no bookkeeping table) are brought up to the current column set
//! by the same steps.

use std::collections::HashSet;

use chrono::Utc;
use rusqlite::{params, Connection};
use tracing::{debug, info};

use crate::db::decode_time;
use crate::error::Result;

/// Highest migration version known to this build.
pub const LATEST_VERSION: i64 = 3;

type Step = fn(&Connection) -> Result<()>;

const MIGRATIONS: &[(i64, &str, Step)] = &[
    (1, "create tasks table", create_tasks_table),
    (2, "add missing task columns", add_missing_columns),
    (3, "normalise timestamps to milliseconds", normalise_timestamps),
];

/// Columns added after the first release, with the definition used by `ADD COLUMN`.
///
/// Timestamp columns get no default here because `ADD COLUMN` only accepts constants;
/// step 3 fills them in.
const ADDED_COLUMNS: &[(&str, &str)] = &[
    ("description", "TEXT DEFAULT ''"),
    ("category", "TEXT DEFAULT 'Uncategorized'"),
    ("priority", "INTEGER DEFAULT 1"),
    ("urgency", "INTEGER DEFAULT 1"),
    ("duration", "INTEGER DEFAULT 2"),
    ("completed", "INTEGER DEFAULT 0"),
    ("created_time", "INTEGER"),
    ("updated_time", "INTEGER"),
];

/// Bring the schema up to [`LATEST_VERSION`]. Running it again is a no-op.
pub fn apply(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS schema_migrations (
            version INTEGER PRIMARY KEY,
            applied_at INTEGER NOT NULL
        );",
    )?;

    let applied = applied_versions(conn)?;
    for &(version, name, step) in MIGRATIONS {
        if applied.contains(&version) {
            continue;
        }
        step(conn)?;
        conn.execute(
            "INSERT INTO schema_migrations (version, applied_at) VALUES (?1, ?2)",
            params![version, Utc::now().timestamp_millis()],
        )?;
        info!(version, name, "applied schema migration");
    }
    debug!(version = LATEST_VERSION, "schema up to date");
    Ok(())
}

/// Versions recorded in `schema_migrations`.
pub fn applied_versions(conn: &Connection) -> Result<HashSet<i64>> {
    let mut stmt = conn.prepare("SELECT version FROM schema_migrations")?;
    let versions = stmt
        .query_map([], |row| row.get::<_, i64>(0))?
        .collect::<rusqlite::Result<HashSet<i64>>>()?;
    Ok(versions)
}

fn create_tasks_table(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS tasks (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            title TEXT NOT NULL,
            description TEXT DEFAULT '',
            category TEXT DEFAULT 'Uncategorized',
            priority INTEGER DEFAULT 1,
            urgency INTEGER DEFAULT 1,
            duration INTEGER DEFAULT 2,
            completed INTEGER DEFAULT 0,
            created_time INTEGER DEFAULT (CAST(strftime('%s', 'now') AS INTEGER) * 1000),
            updated_time INTEGER DEFAULT (CAST(strftime('%s', 'now') AS INTEGER) * 1000)
        );",
    )?;
    Ok(())
}

fn existing_columns(conn: &Connection) -> Result<HashSet<String>> {
    let mut stmt = conn.prepare("PRAGMA table_info(tasks)")?;
    let names = stmt
        .query_map([], |row| row.get::<_, String>(1))?
        .collect::<rusqlite::Result<HashSet<String>>>()?;
    Ok(names)
}

fn add_missing_columns(conn: &Connection) -> Result<()> {
    let existing = existing_columns(conn)?;
    for (name, definition) in ADDED_COLUMNS {
        if existing.contains(*name) {
            debug!(column = name, "column already present");
            continue;
        }
        conn.execute_batch(&format!("ALTER TABLE tasks ADD COLUMN {name} {definition};"))?;
        info!(column = name, "added column to tasks");
    }
    Ok(())
}

/// Rewrite text timestamps as Unix milliseconds and fill in missing ones.
fn normalise_timestamps(conn: &Connection) -> Result<()> {
    for column in ["created_time", "updated_time"] {
        let rows = {
            let mut stmt = conn.prepare(&format!(
                "SELECT id, {column} FROM tasks WHERE typeof({column}) = 'text'"
            ))?;
            let rows = stmt
                .query_map([], |row| Ok((row.get::<_, i64>(0)?, row.get::<_, rusqlite::types::Value>(1)?)))?
                .collect::<rusqlite::Result<Vec<_>>>()?;
            rows
        };
        for (id, value) in rows {
            let millis = decode_time(column, value)?.timestamp_millis();
            conn.execute(
                &format!("UPDATE tasks SET {column} = ?1 WHERE id = ?2"),
                params![millis, id],
            )?;
        }
    }

    let now = Utc::now().timestamp_millis();
    conn.execute(
        "UPDATE tasks SET created_time = ?1 WHERE created_time IS NULL",
        params![now],
    )?;
    conn.execute(
        "UPDATE tasks SET updated_time = created_time
         WHERE updated_time IS NULL OR updated_time < created_time",
        [],
    )?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn legacy_connection() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute_batch(
            "CREATE TABLE tasks (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                title TEXT NOT NULL,
                description TEXT,
                completed INTEGER DEFAULT 0,
                created_time TIMESTAMP DEFAULT CURRENT_TIMESTAMP,
                updated_time TIMESTAMP DEFAULT CURRENT_TIMESTAMP
            );
            INSERT INTO tasks (title, description, completed, created_time, updated_time)
                VALUES ('Water plants', 'balcony', 1, '2024-03-01 08:30:00', '2024-03-02 09:00:00');
            INSERT INTO tasks (title, description, created_time, updated_time)
                VALUES ('Old row', NULL, '2024-03-01 08:00:00', NULL);",
        )
        .unwrap();
        conn
    }

    #[test]
    fn test_fresh_database_gets_all_steps() {
        let conn = Connection::open_in_memory().unwrap();
        apply(&conn).unwrap();
        let applied = applied_versions(&conn).unwrap();
        assert_eq!(applied, (1..=LATEST_VERSION).collect());
        let columns = existing_columns(&conn).unwrap();
        for (name, _) in ADDED_COLUMNS {
            assert!(columns.contains(*name), "missing column {name}");
        }
    }

    #[test]
    fn test_apply_twice_is_noop() {
        let conn = Connection::open_in_memory().unwrap();
        apply(&conn).unwrap();
        apply(&conn).unwrap();
        let count: i64 = conn
            .query_row("SELECT COUNT(*) FROM schema_migrations", [], |r| r.get(0))
            .unwrap();
        assert_eq!(count, LATEST_VERSION);
    }

    #[test]
    fn test_legacy_table_is_upgraded() {
        let conn = legacy_connection();
        apply(&conn).unwrap();

        let (category, priority, urgency, duration, created, updated): (String, i64, i64, i64, i64, i64) = conn
            .query_row(
                "SELECT category, priority, urgency, duration, created_time, updated_time
                 FROM tasks WHERE title = 'Water plants'",
                [],
                |r| Ok((r.get(0)?, r.get(1)?, r.get(2)?, r.get(3)?, r.get(4)?, r.get(5)?)),
            )
            .unwrap();
        assert_eq!(category, "Uncategorized");
        assert_eq!((priority, urgency, duration), (1, 1, 2));
        assert_eq!(created, 1_709_281_800_000);
        assert_eq!(updated, 1_709_370_000_000);

        let (created, updated): (i64, i64) = conn
            .query_row(
                "SELECT created_time, updated_time FROM tasks WHERE title = 'Old row'",
                [],
                |r| Ok((r.get(0)?, r.get(1)?)),
            )
            .unwrap();
        assert_eq!(updated, created);
    }

    #[test]
    fn test_unparsable_legacy_timestamp_is_reported() {
        let conn = legacy_connection();
        conn.execute("UPDATE tasks SET created_time = 'yesterday-ish' WHERE title = 'Old row'", [])
            .unwrap();
        let err = apply(&conn).unwrap_err();
        assert!(matches!(err, crate::error::Error::InvalidTimestamp { .. }));
    }
}
