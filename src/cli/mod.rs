pub mod commands;
pub mod init;
pub mod users;
pub mod projects;
pub mod tasks;
pub mod subtasks;
pub mod dailies;
pub mod report;

pub use commands::*;

use std::path::PathBuf;

use rusqlite::Connection;
use serde_json::Value;

use crate::config::Config;
use crate::db::connection;
use crate::engine::roles::Actor;
use crate::error::SprintdeskError;
use crate::models::money;
use crate::output;

/// What every command needs from the global flags.
pub struct Context {
    pub json: bool,
    pub db: PathBuf,
    pub actor: Option<String>,
}

impl Context {
    pub fn open(&self) -> Result<Connection, SprintdeskError> {
        connection::open_db(&self.db)
    }

    /// Open the database and load the acting user.
    pub fn session(&self) -> Result<(Connection, Actor), SprintdeskError> {
        let conn = self.open()?;
        let username = self.actor.as_deref().ok_or_else(SprintdeskError::no_actor)?;
        let actor = Actor::load(&conn, username)?;
        Ok((conn, actor))
    }

    pub fn config(&self) -> Result<Config, SprintdeskError> {
        Config::load(&connection::config_path(&self.db))
    }

    /// Print `data` as the JSON envelope, or run the text printer.
    pub fn emit(&self, data: Value, text: impl FnOnce()) {
        if self.json {
            output::json::print(&output::json::success(data));
        } else {
            text();
        }
    }
}

/// Turn a command result into an exit code, reporting the error.
pub fn finish(result: Result<(), SprintdeskError>, json_output: bool) -> i32 {
    match result {
        Ok(()) => 0,
        Err(e) => {
            if json_output {
                output::json::print(&output::json::error(&e));
            } else {
                eprintln!("Error: {}", e.message);
            }
            1
        }
    }
}

pub(crate) fn amount(value: &str) -> Result<i64, SprintdeskError> {
    money::parse_amount(value)
}

pub(crate) fn opt_amount(value: Option<&str>) -> Result<Option<i64>, SprintdeskError> {
    value.map(money::parse_amount).transpose()
}
