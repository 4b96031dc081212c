use rusqlite::{params, Connection};

use crate::error::SprintdeskError;
use crate::models::{Epic, Project, Sprint};

use super::resolve::resolve_id;

const PROJECT_COLUMNS: &str =
    "id, name, description, budget, start_date, end_date, created_by, created_at";

pub struct NewProject<'a> {
    pub name: &'a str,
    pub description: Option<&'a str>,
    pub budget: i64,
    pub start_date: Option<&'a str>,
    pub end_date: Option<&'a str>,
}

pub fn create_project(
    conn: &Connection,
    id: &str,
    project: &NewProject,
    created_by: &str,
) -> Result<Project, SprintdeskError> {
    conn.execute(
        "INSERT INTO projects (id, name, description, budget, start_date, end_date, created_by)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        params![
            id,
            project.name,
            project.description,
            project.budget,
            project.start_date,
            project.end_date,
            created_by
        ],
    )?;
    get_project_by_id(conn, id)
}

pub fn get_project_by_id(conn: &Connection, id: &str) -> Result<Project, SprintdeskError> {
    conn.query_row(
        &format!("SELECT {PROJECT_COLUMNS} FROM projects WHERE id = ?1"),
        params![id],
        row_to_project,
    )
    .map_err(|e| match e {
        rusqlite::Error::QueryReturnedNoRows => SprintdeskError::not_found("Project", id),
        _ => SprintdeskError::from(e),
    })
}

pub fn resolve_project(conn: &Connection, reference: &str) -> Result<Project, SprintdeskError> {
    let id = resolve_id(conn, "projects", "Project", reference)?;
    get_project_by_id(conn, &id)
}

pub fn list_projects(conn: &Connection) -> Result<Vec<Project>, SprintdeskError> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {PROJECT_COLUMNS} FROM projects ORDER BY name COLLATE NOCASE"
    ))?;
    let projects = stmt
        .query_map([], row_to_project)?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(projects)
}

pub fn count_projects(conn: &Connection) -> Result<i64, SprintdeskError> {
    let count = conn.query_row("SELECT COUNT(*) FROM projects", [], |row| row.get(0))?;
    Ok(count)
}

#[derive(Default)]
pub struct ProjectUpdate<'a> {
    pub name: Option<&'a str>,
    pub description: Option<&'a str>,
    pub budget: Option<i64>,
    pub start_date: Option<&'a str>,
    pub end_date: Option<&'a str>,
}

pub fn update_project(
    conn: &Connection,
    id: &str,
    update: &ProjectUpdate,
) -> Result<Project, SprintdeskError> {
    conn.execute(
        "UPDATE projects SET
            name = COALESCE(?1, name),
            description = COALESCE(?2, description),
            budget = COALESCE(?3, budget),
            start_date = COALESCE(?4, start_date),
            end_date = COALESCE(?5, end_date)
         WHERE id = ?6",
        params![
            update.name,
            update.description,
            update.budget,
            update.start_date,
            update.end_date,
            id
        ],
    )?;
    get_project_by_id(conn, id)
}

pub fn delete_project(conn: &Connection, id: &str) -> Result<(), SprintdeskError> {
    let changed = conn.execute("DELETE FROM projects WHERE id = ?1", params![id])?;
    if changed == 0 {
        return Err(SprintdeskError::not_found("Project", id));
    }
    Ok(())
}

pub fn add_member(conn: &Connection, project_id: &str, username: &str) -> Result<(), SprintdeskError> {
    conn.execute(
        "INSERT OR IGNORE INTO project_members (project_id, username) VALUES (?1, ?2)",
        params![project_id, username],
    )?;
    Ok(())
}

pub fn remove_member(conn: &Connection, project_id: &str, username: &str) -> Result<(), SprintdeskError> {
    conn.execute(
        "DELETE FROM project_members WHERE project_id = ?1 AND username = ?2",
        params![project_id, username],
    )?;
    Ok(())
}

pub fn get_members(conn: &Connection, project_id: &str) -> Result<Vec<String>, SprintdeskError> {
    let mut stmt = conn.prepare(
        "SELECT username FROM project_members WHERE project_id = ?1 ORDER BY username",
    )?;
    let members = stmt
        .query_map(params![project_id], |row| row.get(0))?
        .collect::<Result<Vec<String>, _>>()?;
    Ok(members)
}

// ─── sprints ───────────────────────────────────────────────────────

pub fn create_sprint(
    conn: &Connection,
    id: &str,
    project_id: &str,
    name: &str,
    start_date: Option<&str>,
    end_date: Option<&str>,
    created_by: &str,
) -> Result<Sprint, SprintdeskError> {
    conn.execute(
        "INSERT INTO sprints (id, project_id, name, start_date, end_date, created_by)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        params![id, project_id, name, start_date, end_date, created_by],
    )?;
    get_sprint_by_id(conn, id)
}

pub fn get_sprint_by_id(conn: &Connection, id: &str) -> Result<Sprint, SprintdeskError> {
    conn.query_row(
        "SELECT id, project_id, name, start_date, end_date, created_by FROM sprints WHERE id = ?1",
        params![id],
        row_to_sprint,
    )
    .map_err(|e| match e {
        rusqlite::Error::QueryReturnedNoRows => SprintdeskError::not_found("Sprint", id),
        _ => SprintdeskError::from(e),
    })
}

pub fn resolve_sprint(conn: &Connection, reference: &str) -> Result<Sprint, SprintdeskError> {
    let id = resolve_id(conn, "sprints", "Sprint", reference)?;
    get_sprint_by_id(conn, &id)
}

pub fn list_sprints(conn: &Connection, project_id: &str) -> Result<Vec<Sprint>, SprintdeskError> {
    let mut stmt = conn.prepare(
        "SELECT id, project_id, name, start_date, end_date, created_by
         FROM sprints WHERE project_id = ?1 ORDER BY start_date, name",
    )?;
    let sprints = stmt
        .query_map(params![project_id], row_to_sprint)?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(sprints)
}

pub fn delete_sprint(conn: &Connection, id: &str) -> Result<(), SprintdeskError> {
    let changed = conn.execute("DELETE FROM sprints WHERE id = ?1", params![id])?;
    if changed == 0 {
        return Err(SprintdeskError::not_found("Sprint", id));
    }
    Ok(())
}

// ─── epics ─────────────────────────────────────────────────────────

pub fn create_epic(
    conn: &Connection,
    id: &str,
    project_id: &str,
    name: &str,
    description: Option<&str>,
    created_by: &str,
) -> Result<Epic, SprintdeskError> {
    conn.execute(
        "INSERT INTO epics (id, project_id, name, description, created_by)
         VALUES (?1, ?2, ?3, ?4, ?5)",
        params![id, project_id, name, description, created_by],
    )?;
    get_epic_by_id(conn, id)
}

pub fn get_epic_by_id(conn: &Connection, id: &str) -> Result<Epic, SprintdeskError> {
    conn.query_row(
        "SELECT id, project_id, name, description, created_by FROM epics WHERE id = ?1",
        params![id],
        row_to_epic,
    )
    .map_err(|e| match e {
        rusqlite::Error::QueryReturnedNoRows => SprintdeskError::not_found("Epic", id),
        _ => SprintdeskError::from(e),
    })
}

pub fn resolve_epic(conn: &Connection, reference: &str) -> Result<Epic, SprintdeskError> {
    let id = resolve_id(conn, "epics", "Epic", reference)?;
    get_epic_by_id(conn, &id)
}

pub fn list_epics(conn: &Connection, project_id: &str) -> Result<Vec<Epic>, SprintdeskError> {
    let mut stmt = conn.prepare(
        "SELECT id, project_id, name, description, created_by
         FROM epics WHERE project_id = ?1 ORDER BY name",
    )?;
    let epics = stmt
        .query_map(params![project_id], row_to_epic)?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(epics)
}

pub fn delete_epic(conn: &Connection, id: &str) -> Result<(), SprintdeskError> {
    let changed = conn.execute("DELETE FROM epics WHERE id = ?1", params![id])?;
    if changed == 0 {
        return Err(SprintdeskError::not_found("Epic", id));
    }
    Ok(())
}

fn row_to_project(row: &rusqlite::Row) -> rusqlite::Result<Project> {
    Ok(Project {
        id: row.get(0)?,
        name: row.get(1)?,
        description: row.get(2)?,
        budget: row.get(3)?,
        start_date: row.get(4)?,
        end_date: row.get(5)?,
        created_by: row.get(6)?,
        created_at: row.get(7)?,
    })
}

fn row_to_sprint(row: &rusqlite::Row) -> rusqlite::Result<Sprint> {
    Ok(Sprint {
        id: row.get(0)?,
        project_id: row.get(1)?,
        name: row.get(2)?,
        start_date: row.get(3)?,
        end_date: row.get(4)?,
        created_by: row.get(5)?,
    })
}

fn row_to_epic(row: &rusqlite::Row) -> rusqlite::Result<Epic> {
    Ok(Epic {
        id: row.get(0)?,
        project_id: row.get(1)?,
        name: row.get(2)?,
        description: row.get(3)?,
        created_by: row.get(4)?,
    })
}
