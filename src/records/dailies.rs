use chrono::{Local, NaiveDateTime};
use rusqlite::Connection;
use tracing::info;

use crate::db::daily_repo::{self, DailyFilter, NewDaily};
use crate::db::{connection, user_repo};
use crate::engine::roles::Actor;
use crate::engine::timeliness::{parse_submitted_at, SUBMITTED_AT_FORMAT};
use crate::error::SprintdeskError;
use crate::models::{Availability, Daily};
use crate::records::projects::validate_date;

/// Record a daily check-in. Timeliness is never a gate here; a late daily
/// is stored like any other. Only elevated users may backdate with `at`.
pub fn add_daily(
    conn: &Connection,
    actor: &Actor,
    yesterday: &str,
    today: &str,
    impediment: Option<&str>,
    at: Option<NaiveDateTime>,
) -> Result<Daily, SprintdeskError> {
    if yesterday.trim().is_empty() || today.trim().is_empty() {
        return Err(SprintdeskError::validation(
            "Both 'yesterday' and 'today' are required",
        ));
    }
    if at.is_some() {
        actor.require_manage("backdate dailies")?;
    }
    let submitted_at = at.unwrap_or_else(|| Local::now().naive_local());
    let submitted = submitted_at.format(SUBMITTED_AT_FORMAT).to_string();
    let date = submitted_at.date().format("%Y-%m-%d").to_string();

    let id = ulid::Ulid::new().to_string();
    let daily = daily_repo::create_daily(
        conn,
        &id,
        &NewDaily {
            username: &actor.username,
            date: &date,
            yesterday: yesterday.trim(),
            today: today.trim(),
            impediment: impediment.map(str::trim).unwrap_or_default(),
            submitted_at: &submitted,
        },
    )?;
    info!(daily = %daily.id, user = %actor.username, submitted_at = %daily.submitted_at, "daily recorded");
    Ok(daily)
}

fn validate_filter(filter: &DailyFilter) -> Result<(), SprintdeskError> {
    for date in [&filter.from, &filter.to].into_iter().flatten() {
        validate_date(date)?;
    }
    Ok(())
}

/// The filter an actor is allowed to use: users without the manage
/// capability only see their own dailies.
pub fn scoped_filter(actor: &Actor, filter: &DailyFilter) -> Result<DailyFilter, SprintdeskError> {
    validate_filter(filter)?;
    let mut filter = filter.clone();
    if !actor.caps().manage_records {
        filter.username = Some(actor.username.clone());
    }
    Ok(filter)
}

pub enum BulkDelete {
    Ids(Vec<String>),
    Range {
        from: String,
        to: String,
        username: Option<String>,
    },
}

pub fn bulk_delete(conn: &Connection, actor: &Actor, request: &BulkDelete) -> Result<usize, SprintdeskError> {
    actor.require_manage("delete dailies")?;
    let deleted = connection::immediate(conn, |conn| match request {
        BulkDelete::Ids(ids) => {
            if ids.is_empty() {
                return Err(SprintdeskError::validation("No dailies selected"));
            }
            daily_repo::delete_dailies_by_ids(conn, ids)
        }
        BulkDelete::Range { from, to, username } => {
            validate_date(from)?;
            validate_date(to)?;
            if from > to {
                return Err(SprintdeskError::validation("'from' date must not be after 'to' date"));
            }
            daily_repo::delete_dailies_in_range(conn, from, to, username.as_deref())
        }
    })?;
    info!(deleted, actor = %actor.username, "dailies deleted");
    Ok(deleted)
}

// ─── availability ──────────────────────────────────────────────────

pub fn add_availability(
    conn: &Connection,
    actor: &Actor,
    title: &str,
    description: Option<&str>,
    start: &str,
    end: &str,
    link: Option<&str>,
) -> Result<Availability, SprintdeskError> {
    if title.trim().is_empty() {
        return Err(SprintdeskError::validation("Title is required"));
    }
    let start_at = parse_submitted_at(start)?;
    let end_at = parse_submitted_at(end)?;
    if start_at >= end_at {
        return Err(SprintdeskError::validation("Start must be before end"));
    }
    let id = ulid::Ulid::new().to_string();
    daily_repo::create_availability(
        conn,
        &id,
        &actor.username,
        title.trim(),
        description,
        &start_at.format(SUBMITTED_AT_FORMAT).to_string(),
        &end_at.format(SUBMITTED_AT_FORMAT).to_string(),
        link,
    )
}

pub fn list_availability(
    conn: &Connection,
    username: Option<&str>,
) -> Result<Vec<Availability>, SprintdeskError> {
    if let Some(username) = username {
        user_repo::get_user(conn, username)?;
    }
    daily_repo::list_availability(conn, username)
}

pub fn remove_availability(conn: &Connection, actor: &Actor, reference: &str) -> Result<Availability, SprintdeskError> {
    connection::immediate(conn, |conn| {
        let entry = daily_repo::resolve_availability(conn, reference)?;
        if !entry.username.eq_ignore_ascii_case(&actor.username) {
            actor.require_manage("remove other users' availability")?;
        }
        daily_repo::delete_availability(conn, &entry.id)?;
        Ok(entry)
    })
}
