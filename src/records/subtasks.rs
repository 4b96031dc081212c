use rusqlite::Connection;
use serde::Serialize;
use tracing::{info, warn};

use crate::config::Config;
use crate::db::{connection, limits_repo, subtask_repo, task_repo};
use crate::engine::limiter::{self, Request};
use crate::engine::roles::Actor;
use crate::error::SprintdeskError;
use crate::models::{Attachment, SubTask, SubTaskComment};

fn same_user(a: Option<&str>, b: &str) -> bool {
    a.is_some_and(|a| a.eq_ignore_ascii_case(b))
}

/// Elevated users, the subtask's creator and the task's responsible users
/// may edit, comment on and attach files to a subtask.
fn require_edit(conn: &Connection, actor: &Actor, sub: &SubTask) -> Result<(), SprintdeskError> {
    if same_user(sub.created_by.as_deref(), &actor.username) {
        return Ok(());
    }
    let task = task_repo::get_task_by_id(conn, &sub.task_id)?;
    actor.require_task_access(&task)
}

#[derive(Debug, Clone, Serialize)]
pub struct SubTaskDetail {
    pub subtask: SubTask,
    pub comments: Vec<SubTaskComment>,
    pub attachments: Vec<Attachment>,
}

pub fn show_subtask(conn: &Connection, actor: &Actor, reference: &str) -> Result<SubTaskDetail, SprintdeskError> {
    let subtask = subtask_repo::resolve_subtask(conn, reference)?;
    require_edit(conn, actor, &subtask)?;
    let comments = subtask_repo::list_comments(conn, &subtask.id)?;
    let attachments = subtask_repo::list_attachments(conn, &subtask.id)?;
    Ok(SubTaskDetail {
        subtask,
        comments,
        attachments,
    })
}

pub fn delete_subtask(conn: &Connection, actor: &Actor, reference: &str) -> Result<SubTask, SprintdeskError> {
    actor.require_manage("delete subtasks")?;
    connection::immediate(conn, |conn| {
        let sub = subtask_repo::resolve_subtask(conn, reference)?;
        subtask_repo::delete_subtask(conn, &sub.id)?;
        info!(subtask = %sub.id, actor = %actor.username, "subtask deleted");
        Ok(sub)
    })
}

pub fn add_comment(
    conn: &Connection,
    actor: &Actor,
    reference: &str,
    text: &str,
) -> Result<SubTaskComment, SprintdeskError> {
    let text = text.trim();
    if text.is_empty() {
        return Err(SprintdeskError::validation("Comment text is required"));
    }
    connection::immediate(conn, |conn| {
        let sub = subtask_repo::resolve_subtask(conn, reference)?;
        require_edit(conn, actor, &sub)?;
        let id = ulid::Ulid::new().to_string();
        subtask_repo::add_comment(conn, &id, &sub.id, &actor.username, text)
    })
}

/// Record one or more attachments. The whole batch is checked against
/// `max_files` and rejected together.
pub fn attach(
    conn: &Connection,
    actor: &Actor,
    config: &Config,
    reference: &str,
    file_names: &[String],
    label: Option<&str>,
) -> Result<Vec<Attachment>, SprintdeskError> {
    if file_names.is_empty() {
        return Err(SprintdeskError::validation("No files given"));
    }
    for name in file_names {
        if name.trim().is_empty() {
            return Err(SprintdeskError::validation("File name cannot be empty"));
        }
        if !config.attachment_allowed(name) {
            return Err(SprintdeskError::validation(format!(
                "File type not allowed: {name}. Allowed: {}",
                config.allowed_attachment_exts.join(", ")
            )));
        }
    }

    let result = connection::immediate(conn, |conn| {
        let sub = subtask_repo::resolve_subtask(conn, reference)?;
        require_edit(conn, actor, &sub)?;
        let limits = limits_repo::get_limits(conn)?;
        limiter::check_capacity(
            conn,
            &limits,
            config.task_limit_scope,
            Request::Files {
                incoming: file_names.len() as i64,
            },
        )?;
        file_names
            .iter()
            .map(|name| {
                let id = ulid::Ulid::new().to_string();
                subtask_repo::add_attachment(conn, &id, &sub.id, &actor.username, name.trim(), label)
            })
            .collect::<Result<Vec<_>, _>>()
    });

    match &result {
        Ok(files) => info!(subtask = reference, count = files.len(), actor = %actor.username, "attachments added"),
        Err(e) => warn!(subtask = reference, code = e.code.as_str(), "attachments rejected"),
    }
    result
}

/// Remove an attachment. Allowed for elevated users, the uploader, the
/// subtask's creator and the task's responsible users.
pub fn detach(conn: &Connection, actor: &Actor, reference: &str) -> Result<Attachment, SprintdeskError> {
    connection::immediate(conn, |conn| {
        let attachment = subtask_repo::resolve_attachment(conn, reference)?;
        if !same_user(attachment.uploaded_by.as_deref(), &actor.username) {
            let sub = subtask_repo::get_subtask_by_id(conn, &attachment.subtask_id)?;
            require_edit(conn, actor, &sub)?;
        }
        subtask_repo::delete_attachment(conn, &attachment.id)?;
        Ok(attachment)
    })
}
