use rusqlite::{params, params_from_iter, Connection};

use crate::error::SprintdeskError;
use crate::models::{Role, User};

pub fn create_user(
    conn: &Connection,
    username: &str,
    display_name: Option<&str>,
    role: Role,
    superuser: bool,
) -> Result<User, SprintdeskError> {
    if find_user(conn, username)?.is_some() {
        return Err(SprintdeskError::conflict(format!(
            "User '{username}' already exists"
        )));
    }
    conn.execute(
        "INSERT INTO users (username, display_name, role, superuser) VALUES (?1, ?2, ?3, ?4)",
        params![username, display_name, role.as_str(), superuser],
    )?;
    get_user(conn, username)
}

pub fn get_user(conn: &Connection, username: &str) -> Result<User, SprintdeskError> {
    find_user(conn, username)?.ok_or_else(|| SprintdeskError::not_found("User", username))
}

pub fn find_user(conn: &Connection, username: &str) -> Result<Option<User>, SprintdeskError> {
    let mut stmt = conn.prepare(
        "SELECT username, display_name, role, superuser, created_at FROM users WHERE username = ?1",
    )?;
    let mut rows = stmt.query(params![username])?;
    match rows.next()? {
        Some(row) => Ok(Some(row_to_user(row)?)),
        None => Ok(None),
    }
}

pub fn list_users(conn: &Connection) -> Result<Vec<User>, SprintdeskError> {
    let mut stmt = conn.prepare(
        "SELECT username, display_name, role, superuser, created_at FROM users ORDER BY username",
    )?;
    let users = stmt
        .query_map([], row_to_user)?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(users)
}

pub fn update_role(conn: &Connection, username: &str, role: Role) -> Result<(), SprintdeskError> {
    let changed = conn.execute(
        "UPDATE users SET role = ?1 WHERE username = ?2",
        params![role.as_str(), username],
    )?;
    if changed == 0 {
        return Err(SprintdeskError::not_found("User", username));
    }
    Ok(())
}

pub fn delete_user(conn: &Connection, username: &str) -> Result<(), SprintdeskError> {
    let changed = conn.execute("DELETE FROM users WHERE username = ?1", params![username])?;
    if changed == 0 {
        return Err(SprintdeskError::not_found("User", username));
    }
    Ok(())
}

/// Count non-superuser users holding any of `roles`, optionally leaving one
/// user out (used when that user's role is edited).
pub fn count_with_roles(
    conn: &Connection,
    roles: &[Role],
    exclude: Option<&str>,
) -> Result<i64, SprintdeskError> {
    if roles.is_empty() {
        return Ok(0);
    }
    let mut values: Vec<&str> = roles.iter().map(|r| r.as_str()).collect();
    let placeholders = (1..=values.len())
        .map(|n| format!("?{n}"))
        .collect::<Vec<_>>()
        .join(", ");
    let mut sql = format!("SELECT COUNT(*) FROM users WHERE superuser = 0 AND role IN ({placeholders})");
    if let Some(username) = exclude {
        values.push(username);
        sql.push_str(&format!(" AND username != ?{}", values.len()));
    }
    let count = conn.query_row(&sql, params_from_iter(values.iter()), |row| row.get(0))?;
    Ok(count)
}

fn row_to_user(row: &rusqlite::Row) -> rusqlite::Result<User> {
    Ok(User {
        username: row.get(0)?,
        display_name: row.get(1)?,
        role: Role::from_str(&row.get::<_, String>(2)?).unwrap_or(Role::Normal),
        superuser: row.get(3)?,
        created_at: row.get(4)?,
    })
}
