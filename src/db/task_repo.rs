use rusqlite::{params, params_from_iter, Connection};

use crate::error::SprintdeskError;
use crate::models::{Priority, Task, TaskStatus};

use super::resolve::resolve_id;

const TASK_COLUMNS: &str = "t.id, t.project_id, t.sprint_id, t.epic_id, t.title, t.description, t.kpis,
                t.story_points, t.budget, t.status, t.priority, t.created_by, t.created_at";

pub struct NewTask<'a> {
    pub project_id: &'a str,
    pub sprint_id: Option<&'a str>,
    pub epic_id: Option<&'a str>,
    pub title: &'a str,
    pub description: Option<&'a str>,
    pub kpis: Option<&'a str>,
    pub story_points: i32,
    pub budget: i64,
    pub status: TaskStatus,
    pub priority: Priority,
    pub responsibles: &'a [String],
}

pub fn create_task(
    conn: &Connection,
    id: &str,
    task: &NewTask,
    created_by: &str,
) -> Result<Task, SprintdeskError> {
    conn.execute(
        "INSERT INTO tasks (id, project_id, sprint_id, epic_id, title, description, kpis,
                            story_points, budget, status, priority, created_by)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)",
        params![
            id,
            task.project_id,
            task.sprint_id,
            task.epic_id,
            task.title,
            task.description,
            task.kpis,
            task.story_points,
            task.budget,
            task.status.as_str(),
            task.priority.as_str(),
            created_by
        ],
    )?;
    set_responsibles(conn, id, task.responsibles)?;
    get_task_by_id(conn, id)
}

pub fn get_task_by_id(conn: &Connection, id: &str) -> Result<Task, SprintdeskError> {
    let mut task = conn
        .query_row(
            &format!("SELECT {TASK_COLUMNS} FROM tasks t WHERE t.id = ?1"),
            params![id],
            row_to_task,
        )
        .map_err(|e| match e {
            rusqlite::Error::QueryReturnedNoRows => SprintdeskError::not_found("Task", id),
            _ => SprintdeskError::from(e),
        })?;
    task.responsibles = get_responsibles(conn, id)?;
    Ok(task)
}

pub fn resolve_task(conn: &Connection, reference: &str) -> Result<Task, SprintdeskError> {
    let id = resolve_id(conn, "tasks", "Task", reference)?;
    get_task_by_id(conn, &id)
}

#[derive(Debug, Default, Clone)]
pub struct TaskFilter {
    pub project_id: Option<String>,
    pub sprint_id: Option<String>,
    pub responsible: Option<String>,
    pub status: Option<TaskStatus>,
    /// Case-insensitive match on title, description, project, sprint and epic names.
    pub query: Option<String>,
    /// Restrict to tasks this user is responsible for.
    pub visible_to: Option<String>,
}

pub fn list_tasks(conn: &Connection, filter: &TaskFilter) -> Result<Vec<Task>, SprintdeskError> {
    let mut clauses = Vec::new();
    let mut values: Vec<String> = Vec::new();

    if let Some(ref project_id) = filter.project_id {
        values.push(project_id.clone());
        clauses.push(format!("t.project_id = ?{}", values.len()));
    }
    if let Some(ref sprint_id) = filter.sprint_id {
        values.push(sprint_id.clone());
        clauses.push(format!("t.sprint_id = ?{}", values.len()));
    }
    for user in [&filter.responsible, &filter.visible_to].into_iter().flatten() {
        values.push(user.clone());
        clauses.push(format!(
            "EXISTS (SELECT 1 FROM task_responsibles r WHERE r.task_id = t.id AND r.username = ?{} COLLATE NOCASE)",
            values.len()
        ));
    }
    if let Some(status) = filter.status {
        values.push(status.as_str().to_string());
        clauses.push(format!("t.status = ?{}", values.len()));
    }
    if let Some(ref q) = filter.query {
        values.push(format!("%{}%", q.trim()));
        let n = values.len();
        clauses.push(format!(
            "(t.title LIKE ?{n} OR t.description LIKE ?{n} OR p.name LIKE ?{n}
              OR s.name LIKE ?{n} OR e.name LIKE ?{n})"
        ));
    }

    let where_clause = if clauses.is_empty() {
        String::new()
    } else {
        format!("WHERE {}", clauses.join(" AND "))
    };
    let sql = format!(
        "SELECT {TASK_COLUMNS}
         FROM tasks t
         JOIN projects p ON p.id = t.project_id
         LEFT JOIN sprints s ON s.id = t.sprint_id
         LEFT JOIN epics e ON e.id = t.epic_id
         {where_clause}
         ORDER BY p.name COLLATE NOCASE,
                  CASE t.status WHEN 'new' THEN 0 WHEN 'in_progress' THEN 1 ELSE 2 END,
                  CASE t.priority WHEN 'urgent' THEN 0 WHEN 'important' THEN 1 WHEN 'not_urgent' THEN 2 ELSE 3 END,
                  t.created_at DESC"
    );

    let mut stmt = conn.prepare(&sql)?;
    let mut tasks = stmt
        .query_map(params_from_iter(values.iter()), row_to_task)?
        .collect::<Result<Vec<_>, _>>()?;
    for task in &mut tasks {
        task.responsibles = get_responsibles(conn, &task.id)?;
    }
    Ok(tasks)
}

/// Count tasks, globally or within one project.
pub fn count_tasks(conn: &Connection, project_id: Option<&str>) -> Result<i64, SprintdeskError> {
    let count = conn.query_row(
        "SELECT COUNT(*) FROM tasks WHERE (?1 IS NULL OR project_id = ?1)",
        params![project_id],
        |row| row.get(0),
    )?;
    Ok(count)
}

#[derive(Default)]
pub struct TaskUpdate<'a> {
    pub sprint_id: Option<&'a str>,
    pub epic_id: Option<&'a str>,
    pub title: Option<&'a str>,
    pub description: Option<&'a str>,
    pub kpis: Option<&'a str>,
    pub story_points: Option<i32>,
    pub budget: Option<i64>,
    pub priority: Option<Priority>,
    pub responsibles: Option<&'a [String]>,
}

pub fn update_task(conn: &Connection, id: &str, update: &TaskUpdate) -> Result<Task, SprintdeskError> {
    conn.execute(
        "UPDATE tasks SET
            sprint_id = COALESCE(?1, sprint_id),
            epic_id = COALESCE(?2, epic_id),
            title = COALESCE(?3, title),
            description = COALESCE(?4, description),
            kpis = COALESCE(?5, kpis),
            story_points = COALESCE(?6, story_points),
            budget = COALESCE(?7, budget),
            priority = COALESCE(?8, priority)
         WHERE id = ?9",
        params![
            update.sprint_id,
            update.epic_id,
            update.title,
            update.description,
            update.kpis,
            update.story_points,
            update.budget,
            update.priority.map(|p| p.as_str()),
            id
        ],
    )?;
    if let Some(responsibles) = update.responsibles {
        set_responsibles(conn, id, responsibles)?;
    }
    get_task_by_id(conn, id)
}

pub fn update_task_status(conn: &Connection, id: &str, status: TaskStatus) -> Result<(), SprintdeskError> {
    let changed = conn.execute(
        "UPDATE tasks SET status = ?1 WHERE id = ?2",
        params![status.as_str(), id],
    )?;
    if changed == 0 {
        return Err(SprintdeskError::not_found("Task", id));
    }
    Ok(())
}

pub fn delete_task(conn: &Connection, id: &str) -> Result<(), SprintdeskError> {
    let changed = conn.execute("DELETE FROM tasks WHERE id = ?1", params![id])?;
    if changed == 0 {
        return Err(SprintdeskError::not_found("Task", id));
    }
    Ok(())
}

/// Task status counts for a project.
pub fn status_counts(conn: &Connection, project_id: &str) -> Result<StatusCounts, SprintdeskError> {
    let mut stmt = conn.prepare(
        "SELECT status, COUNT(*) FROM tasks WHERE project_id = ?1 GROUP BY status",
    )?;
    let mut counts = StatusCounts::default();
    let rows = stmt.query_map(params![project_id], |row| {
        Ok((row.get::<_, String>(0)?, row.get::<_, i64>(1)?))
    })?;
    for row in rows {
        let (status, count) = row?;
        match TaskStatus::from_str(&status) {
            Some(TaskStatus::New) => counts.new = count,
            Some(TaskStatus::InProgress) => counts.in_progress = count,
            Some(TaskStatus::Completed) => counts.completed = count,
            None => {}
        }
    }
    counts.total = counts.new + counts.in_progress + counts.completed;
    Ok(counts)
}

#[derive(Debug, Default, Clone, Copy, serde::Serialize)]
pub struct StatusCounts {
    pub total: i64,
    pub new: i64,
    pub in_progress: i64,
    pub completed: i64,
}

fn set_responsibles(conn: &Connection, task_id: &str, usernames: &[String]) -> Result<(), SprintdeskError> {
    conn.execute("DELETE FROM task_responsibles WHERE task_id = ?1", params![task_id])?;
    for username in usernames {
        conn.execute(
            "INSERT OR IGNORE INTO task_responsibles (task_id, username) VALUES (?1, ?2)",
            params![task_id, username],
        )?;
    }
    Ok(())
}

fn get_responsibles(conn: &Connection, task_id: &str) -> Result<Vec<String>, SprintdeskError> {
    let mut stmt = conn.prepare(
        "SELECT username FROM task_responsibles WHERE task_id = ?1 ORDER BY username",
    )?;
    let users = stmt
        .query_map(params![task_id], |row| row.get(0))?
        .collect::<Result<Vec<String>, _>>()?;
    Ok(users)
}

fn row_to_task(row: &rusqlite::Row) -> rusqlite::Result<Task> {
    Ok(Task {
        id: row.get(0)?,
        project_id: row.get(1)?,
        sprint_id: row.get(2)?,
        epic_id: row.get(3)?,
        title: row.get(4)?,
        description: row.get(5)?,
        kpis: row.get(6)?,
        story_points: row.get(7)?,
        budget: row.get(8)?,
        status: TaskStatus::from_str(&row.get::<_, String>(9)?).unwrap_or(TaskStatus::New),
        priority: Priority::from_str(&row.get::<_, String>(10)?).unwrap_or(Priority::Other),
        created_by: row.get(11)?,
        created_at: row.get(12)?,
        responsibles: Vec::new(),
    })
}
