//! Task status workflow: `new → in_progress → completed`.
//!
//! Users without the regress capability step forward one state at a time on
//! tasks they are responsible for. Elevated users may jump anywhere, but a
//! move to an earlier state needs a comment. Every accepted move appends one
//! status log row.

use rusqlite::Connection;
use serde::Serialize;
use tracing::{info, warn};

use crate::db::{connection, status_log_repo, task_repo};
use crate::engine::progress;
use crate::engine::roles::{Actor, Capabilities};
use crate::error::SprintdeskError;
use crate::models::{StatusLog, TaskStatus};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Forward,
    Regression,
}

/// Decide whether `from → to` is allowed. Pure; no I/O.
pub fn decide(
    caps: Capabilities,
    is_responsible: bool,
    from: TaskStatus,
    to: TaskStatus,
    comment: &str,
) -> Result<Direction, SprintdeskError> {
    if !caps.act_on_any_task && !is_responsible {
        return Err(SprintdeskError::permission_denied(
            "Only the task's responsible users may change its status",
        ));
    }

    if !caps.regress_status {
        if from.next() != Some(to) {
            return Err(SprintdeskError::permission_denied(format!(
                "You may only advance to the next status ({} → {} not allowed)",
                from.as_str(),
                to.as_str()
            )));
        }
        return Ok(Direction::Forward);
    }

    if from == to {
        return Err(SprintdeskError::validation(format!(
            "Task is already {}",
            to.as_str()
        )));
    }
    if to.rank() < from.rank() {
        if comment.trim().is_empty() {
            return Err(SprintdeskError::validation("comment required for regression"));
        }
        return Ok(Direction::Regression);
    }
    Ok(Direction::Forward)
}

#[derive(Debug, Clone, Serialize)]
pub struct Transition {
    pub task_id: String,
    pub from: TaskStatus,
    pub to: TaskStatus,
    pub direction: Direction,
    pub log: StatusLog,
    pub progress_pct: u8,
}

pub fn change_status(
    conn: &Connection,
    actor: &Actor,
    task_ref: &str,
    to: TaskStatus,
    comment: Option<&str>,
) -> Result<Transition, SprintdeskError> {
    let comment = comment.map(str::trim).unwrap_or_default();

    let result = connection::immediate(conn, |conn| {
        let task = task_repo::resolve_task(conn, task_ref)?;
        let from = task.status;
        let direction = decide(
            actor.caps(),
            task.is_responsible(&actor.username),
            from,
            to,
            comment,
        )?;

        task_repo::update_task_status(conn, &task.id, to)?;
        let log_id = ulid::Ulid::new().to_string();
        let log = status_log_repo::append_log(
            conn,
            &log_id,
            &task.id,
            from,
            to,
            &actor.username,
            comment,
        )?;

        let updated = task_repo::get_task_by_id(conn, &task.id)?;
        let progress_pct = progress::progress_pct(conn, &updated)?;

        Ok(Transition {
            task_id: task.id,
            from,
            to,
            direction,
            log,
            progress_pct,
        })
    });

    match &result {
        Ok(t) => info!(
            task = %t.task_id,
            from = t.from.as_str(),
            to = t.to.as_str(),
            direction = ?t.direction,
            actor = %actor.username,
            "status changed"
        ),
        Err(e) => warn!(task = task_ref, to = to.as_str(), code = e.code.as_str(), "status change rejected"),
    }
    result
}

/// Status log of a task, newest first. Readable by elevated users and by
/// the task's responsible users.
pub fn status_history(
    conn: &Connection,
    actor: &Actor,
    task_ref: &str,
) -> Result<Vec<StatusLog>, SprintdeskError> {
    let task = task_repo::resolve_task(conn, task_ref)?;
    actor.require_task_access(&task)?;
    status_log_repo::list_logs(conn, &task.id)
}
