use rusqlite::Connection;
use tracing::info;

use crate::config::TaskLimitScope;
use crate::db::{connection, limits_repo, user_repo};
use crate::engine::limiter::{self, Request};
use crate::engine::roles::{capabilities, Actor};
use crate::error::SprintdeskError;
use crate::models::{Role, User};

pub fn validate_username(username: &str) -> Result<(), SprintdeskError> {
    let ok = !username.is_empty()
        && username.len() <= 150
        && username
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-' | '@' | '+'));
    if ok {
        Ok(())
    } else {
        Err(SprintdeskError::validation(
            "Username must be 1-150 characters of letters, digits and . _ - @ +",
        ))
    }
}

/// Create the protected owner account. Re-running with the same owner is a no-op.
pub fn bootstrap_owner(conn: &Connection, username: &str) -> Result<User, SprintdeskError> {
    validate_username(username)?;
    connection::immediate(conn, |conn| {
        if let Some(existing) = user_repo::list_users(conn)?.into_iter().find(|u| u.superuser) {
            if existing.username.eq_ignore_ascii_case(username) {
                return Ok(existing);
            }
            return Err(SprintdeskError::conflict(format!(
                "Already initialized with owner '{}'",
                existing.username
            )));
        }
        let user = user_repo::create_user(conn, username, None, Role::Admin, true)?;
        limits_repo::get_limits(conn)?;
        info!(owner = %user.username, "initialized");
        Ok(user)
    })
}

pub fn add_user(
    conn: &Connection,
    actor: &Actor,
    username: &str,
    display_name: Option<&str>,
    role: Role,
) -> Result<User, SprintdeskError> {
    actor.require_manage("create users")?;
    validate_username(username)?;
    connection::immediate(conn, |conn| {
        let limits = limits_repo::get_limits(conn)?;
        limiter::check_capacity(
            conn,
            &limits,
            TaskLimitScope::Global,
            Request::User { role, exclude: None },
        )?;
        let user = user_repo::create_user(conn, username, display_name, role, false)?;
        info!(user = %user.username, role = role.as_str(), actor = %actor.username, "user created");
        Ok(user)
    })
}

pub fn set_role(
    conn: &Connection,
    actor: &Actor,
    username: &str,
    role: Role,
) -> Result<User, SprintdeskError> {
    actor.require_manage("change roles")?;
    connection::immediate(conn, |conn| {
        let user = user_repo::get_user(conn, username)?;
        if user.superuser {
            return Err(SprintdeskError::permission_denied(
                "The owner account is protected and cannot be edited",
            ));
        }
        if user.role == role {
            return Ok(user);
        }
        if capabilities(user.role).elevated != capabilities(role).elevated {
            let limits = limits_repo::get_limits(conn)?;
            limiter::check_capacity(
                conn,
                &limits,
                TaskLimitScope::Global,
                Request::User {
                    role,
                    exclude: Some(&user.username),
                },
            )?;
        }
        user_repo::update_role(conn, &user.username, role)?;
        info!(user = %user.username, from = user.role.as_str(), to = role.as_str(), "role changed");
        user_repo::get_user(conn, &user.username)
    })
}

pub fn remove_user(conn: &Connection, actor: &Actor, username: &str) -> Result<User, SprintdeskError> {
    actor.require_manage("delete users")?;
    connection::immediate(conn, |conn| {
        let user = user_repo::get_user(conn, username)?;
        if user.superuser {
            return Err(SprintdeskError::permission_denied(
                "The owner account is protected and cannot be deleted",
            ));
        }
        if user.username.eq_ignore_ascii_case(&actor.username) {
            return Err(SprintdeskError::validation("You cannot delete your own account"));
        }
        user_repo::delete_user(conn, &user.username)?;
        info!(user = %user.username, actor = %actor.username, "user deleted");
        Ok(user)
    })
}
