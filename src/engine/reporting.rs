//! Read-only views for dashboards and exports.

use rusqlite::Connection;
use serde::Serialize;

use crate::db::daily_repo::{self, DailyFilter};
use crate::db::task_repo::{self, StatusCounts, TaskFilter};
use crate::db::{project_repo, subtask_repo};
use crate::engine::timeliness::{self, DailyStats, DailyWindow};
use crate::engine::{budget, progress};
use crate::error::SprintdeskError;
use crate::models::{Daily, Priority, Project, Task};

#[derive(Debug, Clone, Serialize)]
pub struct ProjectSummary {
    pub project: Project,
    pub members: Vec<String>,
    pub tasks: StatusCounts,
    pub progress_pct: u8,
    pub budget: i64,
    pub spent_budget: i64,
    pub remaining_budget: i64,
}

pub fn project_summary(conn: &Connection, project_id: &str) -> Result<ProjectSummary, SprintdeskError> {
    let project = project_repo::get_project_by_id(conn, project_id)?;
    let members = project_repo::get_members(conn, &project.id)?;
    let tasks = task_repo::status_counts(conn, &project.id)?;
    let progress_pct = progress::project_progress_pct(conn, &project.id)?;
    let spent_budget = subtask_repo::project_spent_budget(conn, &project.id)?;
    let remaining_budget = budget::project_remaining_budget(conn, &project.id)?;
    Ok(ProjectSummary {
        budget: project.budget,
        project,
        members,
        tasks,
        progress_pct,
        spent_budget,
        remaining_budget,
    })
}

#[derive(Debug, Clone, Serialize)]
pub struct TaskSnapshot {
    #[serde(flatten)]
    pub task: Task,
    pub progress_pct: u8,
    pub remaining_budget: i64,
    pub spent_budget: i64,
}

pub fn task_snapshot(conn: &Connection, task: Task) -> Result<TaskSnapshot, SprintdeskError> {
    let progress_pct = progress::progress_pct(conn, &task)?;
    let remaining_budget = budget::remaining_budget(conn, &task)?;
    let spent_budget = budget::spent_budget(conn, &task)?;
    Ok(TaskSnapshot {
        task,
        progress_pct,
        remaining_budget,
        spent_budget,
    })
}

#[derive(Debug, Clone, Serialize)]
pub struct PriorityBucket {
    pub priority: Priority,
    pub tasks: Vec<TaskSnapshot>,
}

/// Tasks matching `filter`, annotated and grouped by priority bucket in
/// urgent, important, not_urgent, other order. Empty buckets are kept.
pub fn export_snapshot(conn: &Connection, filter: &TaskFilter) -> Result<Vec<PriorityBucket>, SprintdeskError> {
    let mut buckets: Vec<PriorityBucket> = Priority::ALL
        .iter()
        .map(|&priority| PriorityBucket {
            priority,
            tasks: Vec::new(),
        })
        .collect();

    for task in task_repo::list_tasks(conn, filter)? {
        let snapshot = task_snapshot(conn, task)?;
        if let Some(bucket) = buckets
            .iter_mut()
            .find(|b| b.priority == snapshot.task.priority)
        {
            bucket.tasks.push(snapshot);
        }
    }
    Ok(buckets)
}

#[derive(Debug, Clone, Serialize)]
pub struct DailyEntry {
    #[serde(flatten)]
    pub daily: Daily,
    pub on_time: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct DailyReport {
    pub entries: Vec<DailyEntry>,
    pub stats: DailyStats,
}

pub fn daily_report(
    conn: &Connection,
    filter: &DailyFilter,
    window: &DailyWindow,
) -> Result<DailyReport, SprintdeskError> {
    let dailies = daily_repo::list_dailies(conn, filter)?;
    let stats = timeliness::daily_stats(&dailies, window);
    let entries = dailies
        .into_iter()
        .map(|daily| {
            let on_time = timeliness::parse_submitted_at(&daily.submitted_at)
                .map(|at| window.contains(at))
                .unwrap_or(false);
            DailyEntry { daily, on_time }
        })
        .collect();
    Ok(DailyReport { entries, stats })
}
