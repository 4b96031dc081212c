use rusqlite::{params, Connection};

use crate::error::SprintdeskError;
use crate::models::{Attachment, SubTask, SubTaskComment, TaskStatus};

use super::resolve::resolve_id;

const SUBTASK_COLUMNS: &str =
    "id, task_id, title, description, story_points, budget, status, created_by, created_at";

pub fn create_subtask(
    conn: &Connection,
    id: &str,
    task_id: &str,
    title: &str,
    description: Option<&str>,
    story_points: i32,
    budget: i64,
    status: TaskStatus,
    created_by: &str,
) -> Result<SubTask, SprintdeskError> {
    conn.execute(
        "INSERT INTO subtasks (id, task_id, title, description, story_points, budget, status, created_by)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
        params![id, task_id, title, description, story_points, budget, status.as_str(), created_by],
    )?;
    get_subtask_by_id(conn, id)
}

pub fn get_subtask_by_id(conn: &Connection, id: &str) -> Result<SubTask, SprintdeskError> {
    conn.query_row(
        &format!("SELECT {SUBTASK_COLUMNS} FROM subtasks WHERE id = ?1"),
        params![id],
        row_to_subtask,
    )
    .map_err(|e| match e {
        rusqlite::Error::QueryReturnedNoRows => SprintdeskError::not_found("Subtask", id),
        _ => SprintdeskError::from(e),
    })
}

pub fn resolve_subtask(conn: &Connection, reference: &str) -> Result<SubTask, SprintdeskError> {
    let id = resolve_id(conn, "subtasks", "Subtask", reference)?;
    get_subtask_by_id(conn, &id)
}

pub fn list_subtasks(conn: &Connection, task_id: &str) -> Result<Vec<SubTask>, SprintdeskError> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {SUBTASK_COLUMNS} FROM subtasks WHERE task_id = ?1 ORDER BY created_at, id"
    ))?;
    let subtasks = stmt
        .query_map(params![task_id], row_to_subtask)?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(subtasks)
}

pub struct SubTaskUpdate<'a> {
    pub title: Option<&'a str>,
    pub description: Option<&'a str>,
    pub story_points: Option<i32>,
    pub budget: Option<i64>,
    pub status: Option<TaskStatus>,
}

pub fn update_subtask(
    conn: &Connection,
    id: &str,
    update: &SubTaskUpdate,
) -> Result<SubTask, SprintdeskError> {
    conn.execute(
        "UPDATE subtasks SET
            title = COALESCE(?1, title),
            description = COALESCE(?2, description),
            story_points = COALESCE(?3, story_points),
            budget = COALESCE(?4, budget),
            status = COALESCE(?5, status)
         WHERE id = ?6",
        params![
            update.title,
            update.description,
            update.story_points,
            update.budget,
            update.status.map(|s| s.as_str()),
            id
        ],
    )?;
    get_subtask_by_id(conn, id)
}

pub fn delete_subtask(conn: &Connection, id: &str) -> Result<(), SprintdeskError> {
    let changed = conn.execute("DELETE FROM subtasks WHERE id = ?1", params![id])?;
    if changed == 0 {
        return Err(SprintdeskError::not_found("Subtask", id));
    }
    Ok(())
}

/// Sum of subtask budgets for a task, optionally leaving one subtask out.
pub fn allocated_budget(
    conn: &Connection,
    task_id: &str,
    exclude: Option<&str>,
) -> Result<i64, SprintdeskError> {
    let sum = conn.query_row(
        "SELECT COALESCE(SUM(budget), 0) FROM subtasks
         WHERE task_id = ?1 AND (?2 IS NULL OR id != ?2)",
        params![task_id, exclude],
        |row| row.get(0),
    )?;
    Ok(sum)
}

/// Sum of budgets of completed subtasks.
pub fn spent_budget(conn: &Connection, task_id: &str) -> Result<i64, SprintdeskError> {
    let sum = conn.query_row(
        "SELECT COALESCE(SUM(budget), 0) FROM subtasks WHERE task_id = ?1 AND status = 'completed'",
        params![task_id],
        |row| row.get(0),
    )?;
    Ok(sum)
}

/// Spent budget across all tasks of a project.
pub fn project_spent_budget(conn: &Connection, project_id: &str) -> Result<i64, SprintdeskError> {
    let sum = conn.query_row(
        "SELECT COALESCE(SUM(s.budget), 0) FROM subtasks s
         JOIN tasks t ON t.id = s.task_id
         WHERE t.project_id = ?1 AND s.status = 'completed'",
        params![project_id],
        |row| row.get(0),
    )?;
    Ok(sum)
}

/// `(completed, total)` subtask counts for a task.
pub fn completion_counts(conn: &Connection, task_id: &str) -> Result<(i64, i64), SprintdeskError> {
    let counts = conn.query_row(
        "SELECT COALESCE(SUM(status = 'completed'), 0), COUNT(*) FROM subtasks WHERE task_id = ?1",
        params![task_id],
        |row| Ok((row.get(0)?, row.get(1)?)),
    )?;
    Ok(counts)
}

// ─── comments ──────────────────────────────────────────────────────

pub fn add_comment(
    conn: &Connection,
    id: &str,
    subtask_id: &str,
    author: &str,
    text: &str,
) -> Result<SubTaskComment, SprintdeskError> {
    conn.execute(
        "INSERT INTO subtask_comments (id, subtask_id, author, text) VALUES (?1, ?2, ?3, ?4)",
        params![id, subtask_id, author, text],
    )?;
    conn.query_row(
        "SELECT id, subtask_id, author, text, created_at FROM subtask_comments WHERE id = ?1",
        params![id],
        row_to_comment,
    )
    .map_err(SprintdeskError::from)
}

pub fn list_comments(conn: &Connection, subtask_id: &str) -> Result<Vec<SubTaskComment>, SprintdeskError> {
    let mut stmt = conn.prepare(
        "SELECT id, subtask_id, author, text, created_at FROM subtask_comments
         WHERE subtask_id = ?1 ORDER BY created_at DESC, rowid DESC",
    )?;
    let comments = stmt
        .query_map(params![subtask_id], row_to_comment)?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(comments)
}

// ─── attachments ───────────────────────────────────────────────────

pub fn add_attachment(
    conn: &Connection,
    id: &str,
    subtask_id: &str,
    uploaded_by: &str,
    file_name: &str,
    label: Option<&str>,
) -> Result<Attachment, SprintdeskError> {
    conn.execute(
        "INSERT INTO attachments (id, subtask_id, uploaded_by, file_name, label)
         VALUES (?1, ?2, ?3, ?4, ?5)",
        params![id, subtask_id, uploaded_by, file_name, label],
    )?;
    get_attachment_by_id(conn, id)
}

pub fn get_attachment_by_id(conn: &Connection, id: &str) -> Result<Attachment, SprintdeskError> {
    conn.query_row(
        "SELECT id, subtask_id, uploaded_by, file_name, label, created_at FROM attachments WHERE id = ?1",
        params![id],
        row_to_attachment,
    )
    .map_err(|e| match e {
        rusqlite::Error::QueryReturnedNoRows => SprintdeskError::not_found("Attachment", id),
        _ => SprintdeskError::from(e),
    })
}

pub fn resolve_attachment(conn: &Connection, reference: &str) -> Result<Attachment, SprintdeskError> {
    let id = resolve_id(conn, "attachments", "Attachment", reference)?;
    get_attachment_by_id(conn, &id)
}

pub fn list_attachments(conn: &Connection, subtask_id: &str) -> Result<Vec<Attachment>, SprintdeskError> {
    let mut stmt = conn.prepare(
        "SELECT id, subtask_id, uploaded_by, file_name, label, created_at FROM attachments
         WHERE subtask_id = ?1 ORDER BY created_at DESC, rowid DESC",
    )?;
    let attachments = stmt
        .query_map(params![subtask_id], row_to_attachment)?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(attachments)
}

pub fn delete_attachment(conn: &Connection, id: &str) -> Result<(), SprintdeskError> {
    let changed = conn.execute("DELETE FROM attachments WHERE id = ?1", params![id])?;
    if changed == 0 {
        return Err(SprintdeskError::not_found("Attachment", id));
    }
    Ok(())
}

pub fn count_attachments(conn: &Connection) -> Result<i64, SprintdeskError> {
    let count = conn.query_row("SELECT COUNT(*) FROM attachments", [], |row| row.get(0))?;
    Ok(count)
}

fn row_to_subtask(row: &rusqlite::Row) -> rusqlite::Result<SubTask> {
    Ok(SubTask {
        id: row.get(0)?,
        task_id: row.get(1)?,
        title: row.get(2)?,
        description: row.get(3)?,
        story_points: row.get(4)?,
        budget: row.get(5)?,
        status: TaskStatus::from_str(&row.get::<_, String>(6)?).unwrap_or(TaskStatus::New),
        created_by: row.get(7)?,
        created_at: row.get(8)?,
    })
}

fn row_to_comment(row: &rusqlite::Row) -> rusqlite::Result<SubTaskComment> {
    Ok(SubTaskComment {
        id: row.get(0)?,
        subtask_id: row.get(1)?,
        author: row.get(2)?,
        text: row.get(3)?,
        created_at: row.get(4)?,
    })
}

fn row_to_attachment(row: &rusqlite::Row) -> rusqlite::Result<Attachment> {
    Ok(Attachment {
        id: row.get(0)?,
        subtask_id: row.get(1)?,
        uploaded_by: row.get(2)?,
        file_name: row.get(3)?,
        label: row.get(4)?,
        created_at: row.get(5)?,
    })
}
