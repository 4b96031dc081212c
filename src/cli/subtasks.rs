use serde_json::json;

use crate::cli::commands::SubtaskCommands;
use crate::cli::{amount, finish, opt_amount, Context};
use crate::db::task_repo;
use crate::engine::budget::{self, NewSubTask, SubTaskChanges};
use crate::error::SprintdeskError;
use crate::models::money::format_amount;
use crate::output::{self, json::to_data};
use crate::records::subtasks;

pub fn run(cmd: SubtaskCommands, ctx: &Context) -> i32 {
    let result = match cmd {
        SubtaskCommands::Add { task, title, description, story_points, budget, status } => {
            amount(&budget).and_then(|budget| {
                run_add(
                    &task,
                    &NewSubTask {
                        title,
                        description,
                        story_points,
                        budget,
                        status,
                    },
                    ctx,
                )
            })
        }
        SubtaskCommands::Update { id, title, description, story_points, budget, status } => {
            opt_amount(budget.as_deref()).and_then(|budget| {
                run_update(
                    &id,
                    &SubTaskChanges {
                        title,
                        description,
                        story_points,
                        budget,
                        status,
                    },
                    ctx,
                )
            })
        }
        SubtaskCommands::Show { id } => run_show(&id, ctx),
        SubtaskCommands::Delete { id } => run_delete(&id, ctx),
        SubtaskCommands::Comment { id, text } => run_comment(&id, &text, ctx),
        SubtaskCommands::Attach { id, files, label } => run_attach(&id, &files, label.as_deref(), ctx),
        SubtaskCommands::Detach { id } => run_detach(&id, ctx),
    };
    finish(result, ctx.json)
}

fn run_add(task: &str, new: &NewSubTask, ctx: &Context) -> Result<(), SprintdeskError> {
    let (conn, actor) = ctx.session()?;
    let sub = budget::create_subtask(&conn, &actor, task, new)?;
    let task = task_repo::get_task_by_id(&conn, &sub.task_id)?;
    let remaining = budget::remaining_budget(&conn, &task)?;
    ctx.emit(
        json!({ "subtask": to_data(&sub)?, "remaining_budget": remaining }),
        || {
            println!("Added subtask: {} ({})", sub.title, sub.id);
            println!("  Remaining task budget: {}", format_amount(remaining));
        },
    );
    Ok(())
}

fn run_update(id: &str, changes: &SubTaskChanges, ctx: &Context) -> Result<(), SprintdeskError> {
    let (conn, actor) = ctx.session()?;
    let sub = budget::update_subtask(&conn, &actor, id, changes)?;
    ctx.emit(json!({ "subtask": to_data(&sub)? }), || {
        println!("Updated subtask: {} ({})", sub.title, sub.id)
    });
    Ok(())
}

fn run_show(id: &str, ctx: &Context) -> Result<(), SprintdeskError> {
    let (conn, actor) = ctx.session()?;
    let detail = subtasks::show_subtask(&conn, &actor, id)?;
    ctx.emit(to_data(&detail)?, || {
        println!("Subtask: {} ({})", detail.subtask.title, detail.subtask.id);
        output::text::print_subtask(&detail.subtask);
        if !detail.comments.is_empty() {
            println!("\nComments:");
            output::text::print_comments(&detail.comments);
        }
        if !detail.attachments.is_empty() {
            println!("\nAttachments:");
            output::text::print_attachments(&detail.attachments);
        }
    });
    Ok(())
}

fn run_delete(id: &str, ctx: &Context) -> Result<(), SprintdeskError> {
    let (conn, actor) = ctx.session()?;
    let sub = subtasks::delete_subtask(&conn, &actor, id)?;
    ctx.emit(json!({ "deleted": sub.id }), || {
        println!("Deleted subtask: {} ({})", sub.title, sub.id)
    });
    Ok(())
}

fn run_comment(id: &str, text: &str, ctx: &Context) -> Result<(), SprintdeskError> {
    let (conn, actor) = ctx.session()?;
    let comment = subtasks::add_comment(&conn, &actor, id, text)?;
    ctx.emit(json!({ "comment": to_data(&comment)? }), || {
        println!("Added comment ({})", comment.id)
    });
    Ok(())
}

fn run_attach(id: &str, files: &[String], label: Option<&str>, ctx: &Context) -> Result<(), SprintdeskError> {
    let config = ctx.config()?;
    let (conn, actor) = ctx.session()?;
    let added = subtasks::attach(&conn, &actor, &config, id, files, label)?;
    ctx.emit(json!({ "attachments": to_data(&added)? }), || {
        println!("Attached {} file(s):", added.len());
        output::text::print_attachments(&added);
    });
    Ok(())
}

fn run_detach(id: &str, ctx: &Context) -> Result<(), SprintdeskError> {
    let (conn, actor) = ctx.session()?;
    let removed = subtasks::detach(&conn, &actor, id)?;
    ctx.emit(json!({ "deleted": removed.id }), || {
        println!("Removed attachment: {} ({})", removed.file_name, removed.id)
    });
    Ok(())
}
