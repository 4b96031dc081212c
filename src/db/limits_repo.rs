use rusqlite::{params, Connection, OptionalExtension};

use crate::error::SprintdeskError;
use crate::models::PlanLimits;

/// Read the singleton limits row, creating it with defaults on first use.
pub fn get_limits(conn: &Connection) -> Result<PlanLimits, SprintdeskError> {
    let existing = conn
        .query_row(
            "SELECT max_admins, max_users, max_projects, max_tasks, max_files
             FROM plan_limits WHERE id = 1",
            [],
            |row| {
                Ok(PlanLimits {
                    max_admins: row.get(0)?,
                    max_users: row.get(1)?,
                    max_projects: row.get(2)?,
                    max_tasks: row.get(3)?,
                    max_files: row.get(4)?,
                })
            },
        )
        .optional()?;

    match existing {
        Some(limits) => Ok(limits),
        None => {
            let limits = PlanLimits::default();
            save_limits(conn, &limits)?;
            Ok(limits)
        }
    }
}

pub fn save_limits(conn: &Connection, limits: &PlanLimits) -> Result<(), SprintdeskError> {
    conn.execute(
        "INSERT INTO plan_limits (id, max_admins, max_users, max_projects, max_tasks, max_files)
         VALUES (1, ?1, ?2, ?3, ?4, ?5)
         ON CONFLICT(id) DO UPDATE SET
            max_admins = excluded.max_admins,
            max_users = excluded.max_users,
            max_projects = excluded.max_projects,
            max_tasks = excluded.max_tasks,
            max_files = excluded.max_files",
        params![
            limits.max_admins,
            limits.max_users,
            limits.max_projects,
            limits.max_tasks,
            limits.max_files
        ],
    )?;
    Ok(())
}
