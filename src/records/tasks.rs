use rusqlite::Connection;
use serde::Serialize;
use tracing::info;

use crate::config::Config;
use crate::db::task_repo::{self, NewTask, TaskFilter, TaskUpdate};
use crate::db::{connection, limits_repo, project_repo, status_log_repo, subtask_repo, user_repo};
use crate::engine::limiter::{self, Request};
use crate::engine::reporting::{self, TaskSnapshot};
use crate::engine::roles::Actor;
use crate::error::SprintdeskError;
use crate::models::{Priority, StatusLog, SubTask, Task, TaskStatus, TASK_STORY_POINTS};

#[derive(Debug, Clone)]
pub struct TaskInput {
    pub project: String,
    pub sprint: Option<String>,
    pub epic: Option<String>,
    pub title: String,
    pub description: Option<String>,
    pub kpis: Option<String>,
    pub story_points: i32,
    pub budget: i64,
    pub status: TaskStatus,
    pub priority: Priority,
    pub responsibles: Vec<String>,
}

#[derive(Debug, Clone, Default)]
pub struct TaskChanges {
    pub sprint: Option<String>,
    pub epic: Option<String>,
    pub title: Option<String>,
    pub description: Option<String>,
    pub kpis: Option<String>,
    pub story_points: Option<i32>,
    pub budget: Option<i64>,
    pub priority: Option<Priority>,
    pub responsibles: Option<Vec<String>>,
}

fn validate_story_points(points: i32) -> Result<(), SprintdeskError> {
    if TASK_STORY_POINTS.contains(&points) {
        Ok(())
    } else {
        Err(SprintdeskError::validation(format!(
            "Task story points must be one of {TASK_STORY_POINTS:?}"
        )))
    }
}

/// Resolve sprint/epic references and check they belong to `project_id`.
fn resolve_grouping(
    conn: &Connection,
    project_id: &str,
    sprint: Option<&str>,
    epic: Option<&str>,
) -> Result<(Option<String>, Option<String>), SprintdeskError> {
    let sprint_id = match sprint {
        Some(reference) => {
            let sprint = project_repo::resolve_sprint(conn, reference)?;
            if sprint.project_id != project_id {
                return Err(SprintdeskError::validation(format!(
                    "Sprint {} belongs to another project",
                    sprint.id
                )));
            }
            Some(sprint.id)
        }
        None => None,
    };
    let epic_id = match epic {
        Some(reference) => {
            let epic = project_repo::resolve_epic(conn, reference)?;
            if epic.project_id != project_id {
                return Err(SprintdeskError::validation(format!(
                    "Epic {} belongs to another project",
                    epic.id
                )));
            }
            Some(epic.id)
        }
        None => None,
    };
    Ok((sprint_id, epic_id))
}

fn resolve_users(conn: &Connection, usernames: &[String]) -> Result<Vec<String>, SprintdeskError> {
    usernames
        .iter()
        .map(|u| user_repo::get_user(conn, u).map(|user| user.username))
        .collect()
}

pub fn add_task(
    conn: &Connection,
    actor: &Actor,
    config: &Config,
    input: &TaskInput,
) -> Result<Task, SprintdeskError> {
    actor.require_manage("create tasks")?;
    if input.title.trim().is_empty() {
        return Err(SprintdeskError::validation("Task title is required"));
    }
    if input.budget < 0 {
        return Err(SprintdeskError::validation("Task budget cannot be negative"));
    }
    validate_story_points(input.story_points)?;

    connection::immediate(conn, |conn| {
        let project = project_repo::resolve_project(conn, &input.project)?;
        let limits = limits_repo::get_limits(conn)?;
        limiter::check_capacity(
            conn,
            &limits,
            config.task_limit_scope,
            Request::Task {
                project_id: &project.id,
            },
        )?;

        let (sprint_id, epic_id) =
            resolve_grouping(conn, &project.id, input.sprint.as_deref(), input.epic.as_deref())?;
        let responsibles = resolve_users(conn, &input.responsibles)?;

        let id = ulid::Ulid::new().to_string();
        let task = task_repo::create_task(
            conn,
            &id,
            &NewTask {
                project_id: &project.id,
                sprint_id: sprint_id.as_deref(),
                epic_id: epic_id.as_deref(),
                title: input.title.trim(),
                description: input.description.as_deref(),
                kpis: input.kpis.as_deref(),
                story_points: input.story_points,
                budget: input.budget,
                status: input.status,
                priority: input.priority,
                responsibles: &responsibles,
            },
            &actor.username,
        )?;
        info!(task = %task.id, project = %project.id, actor = %actor.username, "task created");
        Ok(task)
    })
}

/// List tasks. Users who cannot act on any task only see their own.
pub fn list_tasks(conn: &Connection, actor: &Actor, filter: &TaskFilter) -> Result<Vec<TaskSnapshot>, SprintdeskError> {
    let filter = scoped_filter(actor, filter);
    task_repo::list_tasks(conn, &filter)?
        .into_iter()
        .map(|task| reporting::task_snapshot(conn, task))
        .collect()
}

pub fn scoped_filter(actor: &Actor, filter: &TaskFilter) -> TaskFilter {
    let mut filter = filter.clone();
    if !actor.caps().act_on_any_task {
        filter.visible_to = Some(actor.username.clone());
    }
    filter
}

#[derive(Debug, Clone, Serialize)]
pub struct TaskDetail {
    pub task: TaskSnapshot,
    pub subtasks: Vec<SubTask>,
    pub history: Vec<StatusLog>,
}

pub fn show_task(conn: &Connection, actor: &Actor, reference: &str) -> Result<TaskDetail, SprintdeskError> {
    let task = task_repo::resolve_task(conn, reference)?;
    actor.require_task_access(&task)?;
    let subtasks = subtask_repo::list_subtasks(conn, &task.id)?;
    let history = status_log_repo::list_logs(conn, &task.id)?;
    Ok(TaskDetail {
        task: reporting::task_snapshot(conn, task)?,
        subtasks,
        history,
    })
}

/// Edit task fields. Status changes go through the workflow instead.
pub fn update_task(
    conn: &Connection,
    actor: &Actor,
    reference: &str,
    changes: &TaskChanges,
) -> Result<Task, SprintdeskError> {
    actor.require_manage("edit tasks")?;
    if let Some(points) = changes.story_points {
        validate_story_points(points)?;
    }
    if matches!(changes.budget, Some(b) if b < 0) {
        return Err(SprintdeskError::validation("Task budget cannot be negative"));
    }
    if matches!(changes.title.as_deref(), Some(t) if t.trim().is_empty()) {
        return Err(SprintdeskError::validation("Task title cannot be empty"));
    }

    connection::immediate(conn, |conn| {
        let task = task_repo::resolve_task(conn, reference)?;
        let (sprint_id, epic_id) =
            resolve_grouping(conn, &task.project_id, changes.sprint.as_deref(), changes.epic.as_deref())?;
        let responsibles = match changes.responsibles {
            Some(ref users) => Some(resolve_users(conn, users)?),
            None => None,
        };
        let updated = task_repo::update_task(
            conn,
            &task.id,
            &TaskUpdate {
                sprint_id: sprint_id.as_deref(),
                epic_id: epic_id.as_deref(),
                title: changes.title.as_deref().map(str::trim),
                description: changes.description.as_deref(),
                kpis: changes.kpis.as_deref(),
                story_points: changes.story_points,
                budget: changes.budget,
                priority: changes.priority,
                responsibles: responsibles.as_deref(),
            },
        )?;
        info!(task = %updated.id, actor = %actor.username, "task updated");
        Ok(updated)
    })
}

pub fn delete_task(conn: &Connection, actor: &Actor, reference: &str) -> Result<Task, SprintdeskError> {
    actor.require_manage("delete tasks")?;
    connection::immediate(conn, |conn| {
        let task = task_repo::resolve_task(conn, reference)?;
        task_repo::delete_task(conn, &task.id)?;
        info!(task = %task.id, actor = %actor.username, "task deleted");
        Ok(task)
    })
}
