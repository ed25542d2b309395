use anyhow::Result;
use rusqlite::{Connection, OptionalExtension};

/// Bump when adding a migration step below.
pub const SCHEMA_VERSION: i64 = 2;

pub fn run_migrations(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS schema_version (
            version INTEGER NOT NULL
        );",
    )?;

    let current = schema_version(conn)?;
    if current < 1 {
        migrate_v1(conn)?;
    }
    if current < 2 {
        migrate_v2(conn)?;
    }
    if current < SCHEMA_VERSION {
        log::info!("database schema upgraded {} -> {}", current, SCHEMA_VERSION);
    }
    Ok(())
}

pub fn schema_version(conn: &Connection) -> Result<i64> {
    let v = conn
        .query_row("SELECT MAX(version) FROM schema_version", [], |row| {
            row.get::<_, Option<i64>>(0)
        })
        .optional()?
        .flatten();
    Ok(v.unwrap_or(0))
}

fn set_schema_version(conn: &Connection, version: i64) -> Result<()> {
    conn.execute("DELETE FROM schema_version", [])?;
    conn.execute(
        "INSERT INTO schema_version (version) VALUES (?1)",
        [version],
    )?;
    Ok(())
}

/// Key/value snapshot store and app metadata.
fn migrate_v1(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS snapshots (
            key    TEXT PRIMARY KEY,
            value  TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS app_meta (
            key   TEXT PRIMARY KEY,
            value TEXT
        );
    ",
    )?;
    set_schema_version(conn, 1)
}

/// Track when each snapshot was last written.
fn migrate_v2(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "ALTER TABLE snapshots ADD COLUMN updated_at TEXT;
         UPDATE snapshots SET updated_at = datetime('now') WHERE updated_at IS NULL;",
    )?;
    set_schema_version(conn, 2)
}
