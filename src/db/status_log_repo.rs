use rusqlite::{params, Connection};

use crate::error::SprintdeskError;
use crate::models::{StatusLog, TaskStatus};

/// Append one log row. There is no update or delete counterpart.
pub fn append_log(
    conn: &Connection,
    id: &str,
    task_id: &str,
    from: TaskStatus,
    to: TaskStatus,
    actor: &str,
    comment: &str,
) -> Result<StatusLog, SprintdeskError> {
    conn.execute(
        "INSERT INTO status_logs (id, task_id, from_status, to_status, actor, comment)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        params![id, task_id, from.as_str(), to.as_str(), actor, comment],
    )?;
    conn.query_row(
        "SELECT id, task_id, from_status, to_status, actor, comment, created_at
         FROM status_logs WHERE id = ?1",
        params![id],
        row_to_log,
    )
    .map_err(SprintdeskError::from)
}

/// History of a task, newest first.
pub fn list_logs(conn: &Connection, task_id: &str) -> Result<Vec<StatusLog>, SprintdeskError> {
    let mut stmt = conn.prepare(
        "SELECT id, task_id, from_status, to_status, actor, comment, created_at
         FROM status_logs WHERE task_id = ?1
         ORDER BY created_at DESC, rowid DESC",
    )?;
    let logs = stmt
        .query_map(params![task_id], row_to_log)?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(logs)
}

fn row_to_log(row: &rusqlite::Row) -> rusqlite::Result<StatusLog> {
    Ok(StatusLog {
        id: row.get(0)?,
        task_id: row.get(1)?,
        from_status: TaskStatus::from_str(&row.get::<_, String>(2)?).unwrap_or(TaskStatus::New),
        to_status: TaskStatus::from_str(&row.get::<_, String>(3)?).unwrap_or(TaskStatus::New),
        actor: row.get(4)?,
        comment: row.get(5)?,
        created_at: row.get(6)?,
    })
}
