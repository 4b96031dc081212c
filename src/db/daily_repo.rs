use rusqlite::{params, params_from_iter, Connection};

use crate::error::SprintdeskError;
use crate::models::{Availability, Daily};

use super::resolve::resolve_id;

pub struct NewDaily<'a> {
    pub username: &'a str,
    pub date: &'a str,
    pub yesterday: &'a str,
    pub today: &'a str,
    pub impediment: &'a str,
    pub submitted_at: &'a str,
}

pub fn create_daily(conn: &Connection, id: &str, daily: &NewDaily) -> Result<Daily, SprintdeskError> {
    conn.execute(
        "INSERT INTO dailies (id, username, date, yesterday, today, impediment, submitted_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        params![
            id,
            daily.username,
            daily.date,
            daily.yesterday,
            daily.today,
            daily.impediment,
            daily.submitted_at
        ],
    )?;
    conn.query_row(
        "SELECT id, username, date, yesterday, today, impediment, submitted_at FROM dailies WHERE id = ?1",
        params![id],
        row_to_daily,
    )
    .map_err(SprintdeskError::from)
}

#[derive(Debug, Default, Clone)]
pub struct DailyFilter {
    pub username: Option<String>,
    pub from: Option<String>,
    pub to: Option<String>,
}

pub fn list_dailies(conn: &Connection, filter: &DailyFilter) -> Result<Vec<Daily>, SprintdeskError> {
    let (where_clause, values) = daily_where(filter);
    let sql = format!(
        "SELECT id, username, date, yesterday, today, impediment, submitted_at
         FROM dailies {where_clause}
         ORDER BY date DESC, submitted_at DESC"
    );
    let mut stmt = conn.prepare(&sql)?;
    let dailies = stmt
        .query_map(params_from_iter(values.iter()), row_to_daily)?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(dailies)
}

pub fn delete_dailies_by_ids(conn: &Connection, ids: &[String]) -> Result<usize, SprintdeskError> {
    let mut deleted = 0;
    for reference in ids {
        let id = resolve_id(conn, "dailies", "Daily", reference)?;
        deleted += conn.execute("DELETE FROM dailies WHERE id = ?1", params![id])?;
    }
    Ok(deleted)
}

/// Delete dailies in an inclusive date range, optionally for one user.
pub fn delete_dailies_in_range(
    conn: &Connection,
    from: &str,
    to: &str,
    username: Option<&str>,
) -> Result<usize, SprintdeskError> {
    let deleted = conn.execute(
        "DELETE FROM dailies WHERE date >= ?1 AND date <= ?2 AND (?3 IS NULL OR username = ?3)",
        params![from, to, username],
    )?;
    Ok(deleted)
}

fn daily_where(filter: &DailyFilter) -> (String, Vec<String>) {
    let mut clauses = Vec::new();
    let mut values = Vec::new();
    if let Some(ref username) = filter.username {
        values.push(username.clone());
        clauses.push(format!("username = ?{}", values.len()));
    }
    if let Some(ref from) = filter.from {
        values.push(from.clone());
        clauses.push(format!("date >= ?{}", values.len()));
    }
    if let Some(ref to) = filter.to {
        values.push(to.clone());
        clauses.push(format!("date <= ?{}", values.len()));
    }
    if clauses.is_empty() {
        (String::new(), values)
    } else {
        (format!("WHERE {}", clauses.join(" AND ")), values)
    }
}

// ─── availability ──────────────────────────────────────────────────

pub fn create_availability(
    conn: &Connection,
    id: &str,
    username: &str,
    title: &str,
    description: Option<&str>,
    start_at: &str,
    end_at: &str,
    link: Option<&str>,
) -> Result<Availability, SprintdeskError> {
    conn.execute(
        "INSERT INTO availability (id, username, title, description, start_at, end_at, link)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        params![id, username, title, description, start_at, end_at, link],
    )?;
    get_availability_by_id(conn, id)
}

pub fn get_availability_by_id(conn: &Connection, id: &str) -> Result<Availability, SprintdeskError> {
    conn.query_row(
        "SELECT id, username, title, description, start_at, end_at, link FROM availability WHERE id = ?1",
        params![id],
        row_to_availability,
    )
    .map_err(|e| match e {
        rusqlite::Error::QueryReturnedNoRows => SprintdeskError::not_found("Availability", id),
        _ => SprintdeskError::from(e),
    })
}

pub fn resolve_availability(conn: &Connection, reference: &str) -> Result<Availability, SprintdeskError> {
    let id = resolve_id(conn, "availability", "Availability", reference)?;
    get_availability_by_id(conn, &id)
}

pub fn list_availability(conn: &Connection, username: Option<&str>) -> Result<Vec<Availability>, SprintdeskError> {
    let mut stmt = conn.prepare(
        "SELECT id, username, title, description, start_at, end_at, link FROM availability
         WHERE (?1 IS NULL OR username = ?1) ORDER BY start_at",
    )?;
    let entries = stmt
        .query_map(params![username], row_to_availability)?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(entries)
}

pub fn delete_availability(conn: &Connection, id: &str) -> Result<(), SprintdeskError> {
    let changed = conn.execute("DELETE FROM availability WHERE id = ?1", params![id])?;
    if changed == 0 {
        return Err(SprintdeskError::not_found("Availability", id));
    }
    Ok(())
}

fn row_to_daily(row: &rusqlite::Row) -> rusqlite::Result<Daily> {
    Ok(Daily {
        id: row.get(0)?,
        username: row.get(1)?,
        date: row.get(2)?,
        yesterday: row.get(3)?,
        today: row.get(4)?,
        impediment: row.get(5)?,
        submitted_at: row.get(6)?,
    })
}

fn row_to_availability(row: &rusqlite::Row) -> rusqlite::Result<Availability> {
    Ok(Availability {
        id: row.get(0)?,
        username: row.get(1)?,
        title: row.get(2)?,
        description: row.get(3)?,
        start_at: row.get(4)?,
        end_at: row.get(5)?,
        link: row.get(6)?,
    })
}
