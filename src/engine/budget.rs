//! Budget ledger: a task's budget is split among its subtasks.
//!
//! Remaining budget is always derived, never stored. Subtask writes validate
//! and persist inside one immediate transaction, so concurrent writers
//! against the same task are serialized and the sum of subtask budgets never
//! exceeds the task's assigned budget at write time.

use rusqlite::Connection;
use tracing::{info, warn};

use crate::db::{connection, project_repo, subtask_repo, task_repo};
use crate::engine::roles::Actor;
use crate::error::SprintdeskError;
use crate::models::money::format_amount;
use crate::models::{SubTask, Task, TaskStatus, SUBTASK_STORY_POINTS};

/// Reject `proposed` when it does not fit in what is left of `assigned`
/// after `allocated` (which must already exclude the subtask being edited).
pub fn check_allocation(assigned: i64, allocated: i64, proposed: i64) -> Result<(), SprintdeskError> {
    if proposed < 0 {
        return Err(SprintdeskError::validation("Subtask budget cannot be negative"));
    }
    let remaining = assigned - allocated;
    if proposed > remaining {
        return Err(SprintdeskError::budget_exceeded(
            &format_amount(proposed),
            &format_amount(remaining),
        ));
    }
    Ok(())
}

pub fn remaining_budget(conn: &Connection, task: &Task) -> Result<i64, SprintdeskError> {
    remaining_budget_excluding(conn, task, None)
}

pub fn remaining_budget_excluding(
    conn: &Connection,
    task: &Task,
    exclude_subtask: Option<&str>,
) -> Result<i64, SprintdeskError> {
    let allocated = subtask_repo::allocated_budget(conn, &task.id, exclude_subtask)?;
    Ok(task.budget - allocated)
}

pub fn validate_subtask_budget(
    conn: &Connection,
    task: &Task,
    proposed: i64,
    existing_subtask: Option<&str>,
) -> Result<(), SprintdeskError> {
    let allocated = subtask_repo::allocated_budget(conn, &task.id, existing_subtask)?;
    check_allocation(task.budget, allocated, proposed)
}

/// Budget of completed subtasks.
pub fn spent_budget(conn: &Connection, task: &Task) -> Result<i64, SprintdeskError> {
    subtask_repo::spent_budget(conn, &task.id)
}

/// Project budget minus what its tasks have spent.
pub fn project_remaining_budget(conn: &Connection, project_id: &str) -> Result<i64, SprintdeskError> {
    let project = project_repo::get_project_by_id(conn, project_id)?;
    let spent = subtask_repo::project_spent_budget(conn, project_id)?;
    Ok(project.budget - spent)
}

#[derive(Debug, Clone)]
pub struct NewSubTask {
    pub title: String,
    pub description: Option<String>,
    pub story_points: i32,
    pub budget: i64,
    pub status: TaskStatus,
}

#[derive(Debug, Clone, Default)]
pub struct SubTaskChanges {
    pub title: Option<String>,
    pub description: Option<String>,
    pub story_points: Option<i32>,
    pub budget: Option<i64>,
    pub status: Option<TaskStatus>,
}

fn validate_story_points(points: i32) -> Result<(), SprintdeskError> {
    if SUBTASK_STORY_POINTS.contains(&points) {
        Ok(())
    } else {
        Err(SprintdeskError::validation(format!(
            "Subtask story points must be one of {SUBTASK_STORY_POINTS:?}"
        )))
    }
}

/// Create a subtask under `task_ref`. Elevated actors and the task's
/// responsible users may do this.
pub fn create_subtask(
    conn: &Connection,
    actor: &Actor,
    task_ref: &str,
    new: &NewSubTask,
) -> Result<SubTask, SprintdeskError> {
    if new.title.trim().is_empty() {
        return Err(SprintdeskError::validation("Subtask title is required"));
    }
    validate_story_points(new.story_points)?;

    let result = connection::immediate(conn, |conn| {
        let task = task_repo::resolve_task(conn, task_ref)?;
        actor.require_task_access(&task)?;
        validate_subtask_budget(conn, &task, new.budget, None)?;

        let id = ulid::Ulid::new().to_string();
        subtask_repo::create_subtask(
            conn,
            &id,
            &task.id,
            new.title.trim(),
            new.description.as_deref(),
            new.story_points,
            new.budget,
            new.status,
            &actor.username,
        )
    });

    match &result {
        Ok(sub) => info!(task = %sub.task_id, subtask = %sub.id, budget = sub.budget, actor = %actor.username, "subtask created"),
        Err(e) => warn!(task = task_ref, code = e.code.as_str(), "subtask create rejected"),
    }
    result
}

/// Edit a subtask. A new budget is validated against the pool that excludes
/// this subtask's own prior allocation.
pub fn update_subtask(
    conn: &Connection,
    actor: &Actor,
    subtask_ref: &str,
    changes: &SubTaskChanges,
) -> Result<SubTask, SprintdeskError> {
    if let Some(points) = changes.story_points {
        validate_story_points(points)?;
    }
    if matches!(changes.title.as_deref(), Some(t) if t.trim().is_empty()) {
        return Err(SprintdeskError::validation("Subtask title cannot be empty"));
    }

    let result = connection::immediate(conn, |conn| {
        let sub = subtask_repo::resolve_subtask(conn, subtask_ref)?;
        let task = task_repo::get_task_by_id(conn, &sub.task_id)?;
        let is_creator = sub
            .created_by
            .as_deref()
            .is_some_and(|c| c.eq_ignore_ascii_case(&actor.username));
        if !is_creator {
            actor.require_task_access(&task)?;
        }

        if let Some(budget) = changes.budget {
            validate_subtask_budget(conn, &task, budget, Some(&sub.id))?;
        }

        subtask_repo::update_subtask(
            conn,
            &sub.id,
            &subtask_repo::SubTaskUpdate {
                title: changes.title.as_deref().map(str::trim),
                description: changes.description.as_deref(),
                story_points: changes.story_points,
                budget: changes.budget,
                status: changes.status,
            },
        )
    });

    match &result {
        Ok(sub) => info!(subtask = %sub.id, budget = sub.budget, actor = %actor.username, "subtask updated"),
        Err(e) => warn!(subtask = subtask_ref, code = e.code.as_str(), "subtask update rejected"),
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;

    #[test]
    fn test_fits_exactly() {
        assert!(check_allocation(100_000, 40_000, 60_000).is_ok());
    }

    #[test]
    fn test_over_remaining() {
        let err = check_allocation(100_000, 40_000, 70_000).unwrap_err();
        assert_eq!(err.code, ErrorCode::BudgetExceeded);
        assert!(err.message.contains("600.00"));
    }

    #[test]
    fn test_negative_is_validation_error() {
        let err = check_allocation(100, 0, -1).unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationError);
    }

    #[test]
    fn test_overdrawn_task_rejects_new_allocations() {
        // Assigned budget lowered below existing allocations.
        assert!(check_allocation(100, 300, 1).is_err());
        assert!(check_allocation(100, 300, 0).is_err());
    }
}
