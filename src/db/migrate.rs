//! Schema creation and upgrades.
//!
//! Each database records the applied schema in `PRAGMA user_version`, so
//! running the migrations on every open is cheap and idempotent.

use rusqlite::{Connection, Result};
use tracing::debug;

const LOCAL_SCHEMA_VERSION: i32 = 1;
const REMOTE_SCHEMA_VERSION: i32 = 2;

fn user_version(conn: &Connection) -> Result<i32> {
    conn.query_row("PRAGMA user_version", [], |row| row.get(0))
}

fn set_user_version(conn: &Connection, version: i32) -> Result<()> {
    conn.pragma_update(None, "user_version", version)
}

/// Key-value table backing the on-device store.
fn create_kv_table(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS kv (
            key         TEXT PRIMARY KEY,
            value       TEXT NOT NULL,
            updated_at  TEXT NOT NULL
        );
        "#,
    )
}

pub fn run_local_migrations(conn: &Connection) -> Result<()> {
    let version = user_version(conn)?;
    if version >= LOCAL_SCHEMA_VERSION {
        return Ok(());
    }

    create_kv_table(conn)?;
    set_user_version(conn, LOCAL_SCHEMA_VERSION)?;
    debug!(from = version, to = LOCAL_SCHEMA_VERSION, "local store migrated");
    Ok(())
}

/// Users, shifts and settings, scoped per user like the hosted backend.
fn create_remote_tables(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS users (
            id          TEXT PRIMARY KEY,
            email       TEXT NOT NULL UNIQUE,
            created_at  TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS shifts (
            id           TEXT PRIMARY KEY,
            user_id      TEXT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
            date         TEXT NOT NULL,
            clock_in     TEXT NOT NULL,
            clock_out    TEXT,
            breaks       TEXT NOT NULL DEFAULT '[]',
            total_hours  REAL,
            hourly_rate  REAL NOT NULL,
            earnings     REAL,
            created_at   TEXT NOT NULL,
            updated_at   TEXT NOT NULL
        );

        CREATE INDEX IF NOT EXISTS idx_shifts_user_date ON shifts(user_id, date);
        "#,
    )
}

fn create_settings_table(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS user_settings (
            user_id                TEXT PRIMARY KEY REFERENCES users(id) ON DELETE CASCADE,
            hourly_rate            REAL NOT NULL DEFAULT 15,
            monthly_goal           REAL NOT NULL DEFAULT 1000,
            work_start_time        TEXT NOT NULL DEFAULT '09:00:00',
            work_end_time          TEXT NOT NULL DEFAULT '17:00:00',
            notifications_enabled  INTEGER NOT NULL DEFAULT 1,
            auto_clock_out         INTEGER NOT NULL DEFAULT 0,
            created_at             TEXT NOT NULL,
            updated_at             TEXT NOT NULL
        );
        "#,
    )
}

pub fn run_remote_migrations(conn: &Connection) -> Result<()> {
    let version = user_version(conn)?;

    if version < 1 {
        create_remote_tables(conn)?;
    }
    if version < 2 {
        create_settings_table(conn)?;
    }

    if version < REMOTE_SCHEMA_VERSION {
        set_user_version(conn, REMOTE_SCHEMA_VERSION)?;
        debug!(from = version, to = REMOTE_SCHEMA_VERSION, "remote store migrated");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table_exists(conn: &Connection, name: &str) -> bool {
        conn.query_row(
            "SELECT COUNT(*) FROM sqlite_master WHERE type='table' AND name=?1",
            [name],
            |row| row.get::<_, i64>(0),
        )
        .unwrap()
            == 1
    }

    #[test]
    fn local_migrations_are_idempotent() {
        let conn = Connection::open_in_memory().unwrap();
        run_local_migrations(&conn).unwrap();
        run_local_migrations(&conn).unwrap();

        assert!(table_exists(&conn, "kv"));
        assert_eq!(user_version(&conn).unwrap(), LOCAL_SCHEMA_VERSION);
    }

    #[test]
    fn remote_migrations_create_all_tables() {
        let conn = Connection::open_in_memory().unwrap();
        run_remote_migrations(&conn).unwrap();
        run_remote_migrations(&conn).unwrap();

        for t in ["users", "shifts", "user_settings"] {
            assert!(table_exists(&conn, t), "missing table {t}");
        }
        assert_eq!(user_version(&conn).unwrap(), REMOTE_SCHEMA_VERSION);
    }
}
