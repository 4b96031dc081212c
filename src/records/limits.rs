use rusqlite::Connection;
use tracing::info;

use crate::db::{connection, limits_repo};
use crate::engine::roles::Actor;
use crate::error::SprintdeskError;
use crate::models::PlanLimits;

#[derive(Debug, Default, Clone, Copy)]
pub struct LimitChanges {
    pub max_admins: Option<i64>,
    pub max_users: Option<i64>,
    pub max_projects: Option<i64>,
    pub max_tasks: Option<i64>,
    pub max_files: Option<i64>,
}

pub fn show(conn: &Connection) -> Result<PlanLimits, SprintdeskError> {
    limits_repo::get_limits(conn)
}

/// Administrative edit of the plan ceilings. Owner only.
pub fn set(conn: &Connection, actor: &Actor, changes: &LimitChanges) -> Result<PlanLimits, SprintdeskError> {
    if !actor.superuser {
        return Err(SprintdeskError::permission_denied(
            "Only the owner account may change plan limits",
        ));
    }
    let values = [
        changes.max_admins,
        changes.max_users,
        changes.max_projects,
        changes.max_tasks,
        changes.max_files,
    ];
    if values.iter().flatten().any(|v| *v < 0) {
        return Err(SprintdeskError::validation("Plan limits cannot be negative"));
    }

    connection::immediate(conn, |conn| {
        let current = limits_repo::get_limits(conn)?;
        let updated = PlanLimits {
            max_admins: changes.max_admins.unwrap_or(current.max_admins),
            max_users: changes.max_users.unwrap_or(current.max_users),
            max_projects: changes.max_projects.unwrap_or(current.max_projects),
            max_tasks: changes.max_tasks.unwrap_or(current.max_tasks),
            max_files: changes.max_files.unwrap_or(current.max_files),
        };
        limits_repo::save_limits(conn, &updated)?;
        info!(?updated, actor = %actor.username, "plan limits changed");
        Ok(updated)
    })
}
