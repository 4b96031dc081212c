use rusqlite::Connection;

use crate::db::{subtask_repo, task_repo};
use crate::error::SprintdeskError;
use crate::models::{Task, TaskStatus};

/// Progress of a task with no subtasks, from its own status.
pub fn status_progress(status: TaskStatus) -> u8 {
    match status {
        TaskStatus::New => 0,
        TaskStatus::InProgress => 50,
        TaskStatus::Completed => 100,
    }
}

/// `completed / total` as a whole percentage, rounded half up.
///
/// Held at 99 until every item is done, so 100 means exactly "all completed".
pub fn ratio_pct(completed: i64, total: i64) -> u8 {
    if total <= 0 {
        return 0;
    }
    let completed = completed.clamp(0, total);
    let rounded = (200 * completed + total) / (2 * total);
    if completed < total {
        rounded.min(99) as u8
    } else {
        100
    }
}

/// Progress given the task status and its subtask counts.
pub fn progress_from_counts(status: TaskStatus, completed: i64, total: i64) -> u8 {
    if total == 0 {
        status_progress(status)
    } else {
        ratio_pct(completed, total)
    }
}

pub fn progress_pct(conn: &Connection, task: &Task) -> Result<u8, SprintdeskError> {
    let (completed, total) = subtask_repo::completion_counts(conn, &task.id)?;
    Ok(progress_from_counts(task.status, completed, total))
}

/// Share of completed tasks in a project.
pub fn project_progress_pct(conn: &Connection, project_id: &str) -> Result<u8, SprintdeskError> {
    let counts = task_repo::status_counts(conn, project_id)?;
    Ok(ratio_pct(counts.completed, counts.total))
}
