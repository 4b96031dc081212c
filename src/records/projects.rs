use chrono::NaiveDate;
use rusqlite::Connection;
use tracing::info;

use crate::config::TaskLimitScope;
use crate::db::project_repo::{self, NewProject, ProjectUpdate};
use crate::db::{connection, limits_repo, user_repo};
use crate::engine::limiter::{self, Request};
use crate::engine::roles::Actor;
use crate::error::SprintdeskError;
use crate::models::{Epic, Project, Sprint};

pub fn validate_date(value: &str) -> Result<(), SprintdeskError> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .map(|_| ())
        .map_err(|_| SprintdeskError::validation(format!("Invalid date '{value}', expected YYYY-MM-DD")))
}

fn validate_range(start: Option<&str>, end: Option<&str>) -> Result<(), SprintdeskError> {
    for date in [start, end].into_iter().flatten() {
        validate_date(date)?;
    }
    if let (Some(start), Some(end)) = (start, end) {
        if start > end {
            return Err(SprintdeskError::validation("Start date must not be after end date"));
        }
    }
    Ok(())
}

pub fn add_project(conn: &Connection, actor: &Actor, project: &NewProject) -> Result<Project, SprintdeskError> {
    actor.require_manage("create projects")?;
    if project.name.trim().is_empty() {
        return Err(SprintdeskError::validation("Project name is required"));
    }
    if project.budget < 0 {
        return Err(SprintdeskError::validation("Project budget cannot be negative"));
    }
    validate_range(project.start_date, project.end_date)?;

    connection::immediate(conn, |conn| {
        let limits = limits_repo::get_limits(conn)?;
        limiter::check_capacity(conn, &limits, TaskLimitScope::Global, Request::Project)?;
        let id = ulid::Ulid::new().to_string();
        let created = project_repo::create_project(conn, &id, project, &actor.username)?;
        info!(project = %created.id, name = %created.name, actor = %actor.username, "project created");
        Ok(created)
    })
}

pub fn update_project(
    conn: &Connection,
    actor: &Actor,
    reference: &str,
    update: &ProjectUpdate,
) -> Result<Project, SprintdeskError> {
    actor.require_manage("edit projects")?;
    if matches!(update.name, Some(n) if n.trim().is_empty()) {
        return Err(SprintdeskError::validation("Project name cannot be empty"));
    }
    if matches!(update.budget, Some(b) if b < 0) {
        return Err(SprintdeskError::validation("Project budget cannot be negative"));
    }
    connection::immediate(conn, |conn| {
        let project = project_repo::resolve_project(conn, reference)?;
        validate_range(
            update.start_date.or(project.start_date.as_deref()),
            update.end_date.or(project.end_date.as_deref()),
        )?;
        project_repo::update_project(conn, &project.id, update)
    })
}

/// Delete a project with its sprints, epics, tasks and subtasks.
pub fn delete_project(conn: &Connection, actor: &Actor, reference: &str) -> Result<Project, SprintdeskError> {
    actor.require_manage("delete projects")?;
    connection::immediate(conn, |conn| {
        let project = project_repo::resolve_project(conn, reference)?;
        project_repo::delete_project(conn, &project.id)?;
        info!(project = %project.id, actor = %actor.username, "project deleted");
        Ok(project)
    })
}

pub fn add_member(conn: &Connection, actor: &Actor, reference: &str, username: &str) -> Result<Vec<String>, SprintdeskError> {
    actor.require_manage("edit project members")?;
    connection::immediate(conn, |conn| {
        let project = project_repo::resolve_project(conn, reference)?;
        let user = user_repo::get_user(conn, username)?;
        project_repo::add_member(conn, &project.id, &user.username)?;
        project_repo::get_members(conn, &project.id)
    })
}

pub fn remove_member(conn: &Connection, actor: &Actor, reference: &str, username: &str) -> Result<Vec<String>, SprintdeskError> {
    actor.require_manage("edit project members")?;
    connection::immediate(conn, |conn| {
        let project = project_repo::resolve_project(conn, reference)?;
        project_repo::remove_member(conn, &project.id, username)?;
        project_repo::get_members(conn, &project.id)
    })
}

pub fn add_sprint(
    conn: &Connection,
    actor: &Actor,
    project_ref: &str,
    name: &str,
    start_date: Option<&str>,
    end_date: Option<&str>,
) -> Result<Sprint, SprintdeskError> {
    actor.require_manage("create sprints")?;
    if name.trim().is_empty() {
        return Err(SprintdeskError::validation("Sprint name is required"));
    }
    validate_range(start_date, end_date)?;
    connection::immediate(conn, |conn| {
        let project = project_repo::resolve_project(conn, project_ref)?;
        let id = ulid::Ulid::new().to_string();
        project_repo::create_sprint(conn, &id, &project.id, name.trim(), start_date, end_date, &actor.username)
    })
}

/// Delete a sprint. Its tasks stay in the project without a sprint.
pub fn delete_sprint(conn: &Connection, actor: &Actor, reference: &str) -> Result<Sprint, SprintdeskError> {
    actor.require_manage("delete sprints")?;
    connection::immediate(conn, |conn| {
        let sprint = project_repo::resolve_sprint(conn, reference)?;
        project_repo::delete_sprint(conn, &sprint.id)?;
        Ok(sprint)
    })
}

pub fn add_epic(
    conn: &Connection,
    actor: &Actor,
    project_ref: &str,
    name: &str,
    description: Option<&str>,
) -> Result<Epic, SprintdeskError> {
    actor.require_manage("create epics")?;
    if name.trim().is_empty() {
        return Err(SprintdeskError::validation("Epic name is required"));
    }
    connection::immediate(conn, |conn| {
        let project = project_repo::resolve_project(conn, project_ref)?;
        let id = ulid::Ulid::new().to_string();
        project_repo::create_epic(conn, &id, &project.id, name.trim(), description, &actor.username)
    })
}

/// Delete an epic. Its tasks stay in the project without an epic.
pub fn delete_epic(conn: &Connection, actor: &Actor, reference: &str) -> Result<Epic, SprintdeskError> {
    actor.require_manage("delete epics")?;
    connection::immediate(conn, |conn| {
        let epic = project_repo::resolve_epic(conn, reference)?;
        project_repo::delete_epic(conn, &epic.id)?;
        Ok(epic)
    })
}
