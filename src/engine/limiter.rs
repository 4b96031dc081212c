use rusqlite::Connection;
use tracing::{debug, warn};

use crate::config::TaskLimitScope;
use crate::db::{project_repo, subtask_repo, task_repo, user_repo};
use crate::engine::roles::capabilities;
use crate::error::SprintdeskError;
use crate::models::{PlanLimits, Role};

/// A create (or tier change) that consumes plan capacity.
#[derive(Debug, Clone, Copy)]
pub enum Request<'a> {
    /// A user entering `role`'s tier. `exclude` leaves the edited user out of the count.
    User { role: Role, exclude: Option<&'a str> },
    Project,
    Task { project_id: &'a str },
    Files { incoming: i64 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceKind {
    AdminUser,
    User,
    Project,
    Task,
    File,
}

impl ResourceKind {
    fn label(&self) -> &'static str {
        match self {
            Self::AdminUser => "admin/leader/scrum users",
            Self::User => "normal users",
            Self::Project => "projects",
            Self::Task => "tasks",
            Self::File => "files",
        }
    }
}

/// Decide whether `incoming` more records fit on top of `current`.
pub fn evaluate(
    kind: ResourceKind,
    current: i64,
    incoming: i64,
    ceiling: i64,
) -> Result<(), SprintdeskError> {
    if current + incoming > ceiling {
        return Err(SprintdeskError::limit_exceeded(format!(
            "Plan limit reached: at most {ceiling} {} allowed ({current} in use). \
             Delete existing records or contact support to change the plan.",
            kind.label()
        )));
    }
    Ok(())
}

/// Roles that share a seat tier: the elevated tier or the normal one.
pub fn tier_roles(elevated: bool) -> Vec<Role> {
    Role::ALL
        .into_iter()
        .filter(|r| capabilities(*r).elevated == elevated)
        .collect()
}

/// Check plan capacity before a create. Call inside the same transaction as the write.
pub fn check_capacity(
    conn: &Connection,
    limits: &PlanLimits,
    scope: TaskLimitScope,
    request: Request,
) -> Result<(), SprintdeskError> {
    let (kind, current, incoming, ceiling) = match request {
        Request::User { role, exclude } => {
            let elevated = capabilities(role).elevated;
            let tier = tier_roles(elevated);
            let current = user_repo::count_with_roles(conn, &tier, exclude)?;
            if elevated {
                (ResourceKind::AdminUser, current, 1, limits.max_admins)
            } else {
                (ResourceKind::User, current, 1, limits.max_users)
            }
        }
        Request::Project => (
            ResourceKind::Project,
            project_repo::count_projects(conn)?,
            1,
            limits.max_projects,
        ),
        Request::Task { project_id } => {
            let current = match scope {
                TaskLimitScope::Global => task_repo::count_tasks(conn, None)?,
                TaskLimitScope::Project => task_repo::count_tasks(conn, Some(project_id))?,
            };
            (ResourceKind::Task, current, 1, limits.max_tasks)
        }
        Request::Files { incoming } => (
            ResourceKind::File,
            subtask_repo::count_attachments(conn)?,
            incoming,
            limits.max_files,
        ),
    };

    debug!(?kind, current, incoming, ceiling, "capacity check");
    evaluate(kind, current, incoming, ceiling).inspect_err(|_| {
        warn!(?kind, current, ceiling, "plan limit reached");
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;

    #[test]
    fn test_below_ceiling_passes() {
        assert!(evaluate(ResourceKind::Project, 4, 1, 5).is_ok());
        assert!(evaluate(ResourceKind::File, 990, 10, 1000).is_ok());
    }

    #[test]
    fn test_at_ceiling_fails() {
        let err = evaluate(ResourceKind::Project, 5, 1, 5).unwrap_err();
        assert_eq!(err.code, ErrorCode::LimitExceeded);
        assert!(err.message.contains("projects"));
    }

    #[test]
    fn test_batch_of_files_counts_whole_batch() {
        assert!(evaluate(ResourceKind::File, 995, 6, 1000).is_err());
    }

    #[test]
    fn test_zero_ceiling_blocks_everything() {
        assert!(evaluate(ResourceKind::Task, 0, 1, 0).is_err());
    }

    #[test]
    fn test_tiers_follow_capabilities() {
        assert_eq!(tier_roles(true), vec![Role::Admin, Role::Leader, Role::Scrum]);
        assert_eq!(tier_roles(false), vec![Role::Normal]);
    }
}
