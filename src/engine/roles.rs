use rusqlite::Connection;

use crate::db::user_repo;
use crate::error::SprintdeskError;
use crate::models::{Role, Task, User};

/// What a role tag is allowed to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Capabilities {
    /// Create, edit and delete projects, sprints, epics, tasks and users.
    pub manage_records: bool,
    /// Move a task to an earlier status (with a comment).
    pub regress_status: bool,
    /// Act on tasks without being listed as responsible.
    pub act_on_any_task: bool,
    /// Counts against `max_admins` rather than `max_users`.
    pub elevated: bool,
}

pub fn capabilities(role: Role) -> Capabilities {
    match role {
        Role::Admin | Role::Leader | Role::Scrum => Capabilities {
            manage_records: true,
            regress_status: true,
            act_on_any_task: true,
            elevated: true,
        },
        Role::Normal => Capabilities {
            manage_records: false,
            regress_status: false,
            act_on_any_task: false,
            elevated: false,
        },
    }
}

/// The user on whose behalf an operation runs.
#[derive(Debug, Clone)]
pub struct Actor {
    pub username: String,
    pub role: Role,
    pub superuser: bool,
}

impl Actor {
    pub fn load(conn: &Connection, username: &str) -> Result<Self, SprintdeskError> {
        match user_repo::find_user(conn, username)? {
            Some(user) => Ok(Self::from(&user)),
            None => Err(SprintdeskError::unknown_actor(username)),
        }
    }

    pub fn caps(&self) -> Capabilities {
        let mut caps = capabilities(self.role);
        if self.superuser {
            caps.manage_records = true;
            caps.regress_status = true;
            caps.act_on_any_task = true;
        }
        caps
    }

    pub fn require_manage(&self, action: &str) -> Result<(), SprintdeskError> {
        if self.caps().manage_records {
            Ok(())
        } else {
            Err(SprintdeskError::permission_denied(format!(
                "Role '{}' may not {action}",
                self.role.as_str()
            )))
        }
    }

    /// Elevated actors see every task; others only those they are responsible for.
    pub fn can_view_task(&self, task: &Task) -> bool {
        self.caps().act_on_any_task || task.is_responsible(&self.username)
    }

    pub fn require_task_access(&self, task: &Task) -> Result<(), SprintdeskError> {
        if self.can_view_task(task) {
            Ok(())
        } else {
            Err(SprintdeskError::permission_denied(format!(
                "{} is not responsible for task {}",
                self.username, task.id
            )))
        }
    }
}

impl From<&User> for Actor {
    fn from(user: &User) -> Self {
        Self {
            username: user.username.clone(),
            role: user.role,
            superuser: user.superuser,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_elevated_roles_share_capabilities() {
        let admin = capabilities(Role::Admin);
        assert_eq!(admin, capabilities(Role::Leader));
        assert_eq!(admin, capabilities(Role::Scrum));
        assert!(admin.regress_status && admin.elevated);
    }

    #[test]
    fn test_normal_role_has_no_capabilities() {
        let normal = capabilities(Role::Normal);
        assert!(!normal.manage_records);
        assert!(!normal.regress_status);
        assert!(!normal.act_on_any_task);
        assert!(!normal.elevated);
    }

    #[test]
    fn test_require_manage() {
        let actor = Actor {
            username: "ana".into(),
            role: Role::Normal,
            superuser: false,
        };
        let err = actor.require_manage("create projects").unwrap_err();
        assert_eq!(err.code, crate::error::ErrorCode::PermissionDenied);
    }
}
