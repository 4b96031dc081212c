use std::fs;
use std::path::{Path, PathBuf};

use rusqlite::Connection;

use crate::error::SprintdeskError;

use super::migrations;

pub const DEFAULT_DB_PATH: &str = ".sprintdesk/sprintdesk.db";

/// Get the path to the sprintdesk database.
pub fn db_path(flag: Option<&Path>) -> PathBuf {
    flag.map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_DB_PATH))
}

/// Get the config file path. It lives next to the database.
pub fn config_path(db: &Path) -> PathBuf {
    match db.parent() {
        Some(parent) => parent.join("config.json"),
        None => PathBuf::from("config.json"),
    }
}

/// Open a connection to the database. Returns error if not initialized.
pub fn open_db(path: &Path) -> Result<Connection, SprintdeskError> {
    if !path.exists() {
        return Err(SprintdeskError::not_initialized());
    }
    let conn = Connection::open(path)?;
    configure_connection(&conn)?;
    Ok(conn)
}

/// Initialize the database: create directories, database, and run migrations.
pub fn init_db(path: &Path) -> Result<Connection, SprintdeskError> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).map_err(|e| SprintdeskError::database(e.to_string()))?;
        }
    }
    let conn = Connection::open(path)?;
    configure_connection(&conn)?;
    migrations::run_migrations(&conn)?;
    Ok(conn)
}

fn configure_connection(conn: &Connection) -> Result<(), SprintdeskError> {
    conn.execute_batch(
        "PRAGMA journal_mode=WAL;
         PRAGMA busy_timeout=5000;
         PRAGMA foreign_keys=ON;",
    )?;
    Ok(())
}

/// Run `f` inside a `BEGIN IMMEDIATE` transaction.
///
/// The write lock is taken before `f` reads anything, so every
/// validate-then-write sequence in `f` is serialized against other
/// connections. Any error rolls the whole unit back.
pub fn immediate<T>(
    conn: &Connection,
    f: impl FnOnce(&Connection) -> Result<T, SprintdeskError>,
) -> Result<T, SprintdeskError> {
    conn.execute_batch("BEGIN IMMEDIATE")?;
    match f(conn) {
        Ok(value) => {
            if let Err(e) = conn.execute_batch("COMMIT") {
                let _ = conn.execute_batch("ROLLBACK");
                return Err(e.into());
            }
            Ok(value)
        }
        Err(e) => {
            let _ = conn.execute_batch("ROLLBACK");
            Err(e)
        }
    }
}
