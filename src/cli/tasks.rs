use serde_json::json;

use crate::cli::commands::{TaskCommands, TaskFilterArgs};
use crate::cli::{amount, finish, opt_amount, Context};
use crate::db::{project_repo, task_repo::TaskFilter};
use crate::engine::workflow;
use crate::error::SprintdeskError;
use crate::models::TaskStatus;
use crate::output::{self, json::to_data};
use crate::records::tasks::{self, TaskChanges, TaskInput};

pub fn run(cmd: TaskCommands, ctx: &Context) -> i32 {
    let result = match cmd {
        TaskCommands::Add {
            project,
            title,
            sprint,
            epic,
            description,
            kpis,
            story_points,
            budget,
            status,
            priority,
            responsibles,
        } => amount(&budget).and_then(|budget| {
            run_add(
                &TaskInput {
                    project,
                    sprint,
                    epic,
                    title,
                    description,
                    kpis,
                    story_points,
                    budget,
                    status,
                    priority,
                    responsibles,
                },
                ctx,
            )
        }),
        TaskCommands::List { filter, status, query } => {
            run_list(&filter, status, query, ctx)
        }
        TaskCommands::Show { id } => run_show(&id, ctx),
        TaskCommands::Update {
            id,
            title,
            description,
            kpis,
            sprint,
            epic,
            story_points,
            budget,
            priority,
            responsibles,
        } => opt_amount(budget.as_deref()).and_then(|budget| {
            let changes = TaskChanges {
                sprint,
                epic,
                title,
                description,
                kpis,
                story_points,
                budget,
                priority,
                responsibles: (!responsibles.is_empty()).then_some(responsibles),
            };
            run_update(&id, &changes, ctx)
        }),
        TaskCommands::Delete { id } => run_delete(&id, ctx),
        TaskCommands::Move { id, to, comment } => run_move(&id, to, comment.as_deref(), ctx),
        TaskCommands::Log { id } => run_log(&id, ctx),
    };
    finish(result, ctx.json)
}

/// Resolve the project/sprint references of a filter to IDs.
pub(crate) fn resolve_filter(
    conn: &rusqlite::Connection,
    args: &TaskFilterArgs,
) -> Result<TaskFilter, SprintdeskError> {
    let project_id = match args.project {
        Some(ref reference) => Some(project_repo::resolve_project(conn, reference)?.id),
        None => None,
    };
    let sprint_id = match args.sprint {
        Some(ref reference) => Some(project_repo::resolve_sprint(conn, reference)?.id),
        None => None,
    };
    Ok(TaskFilter {
        project_id,
        sprint_id,
        responsible: args.responsible.clone(),
        ..Default::default()
    })
}

fn run_add(input: &TaskInput, ctx: &Context) -> Result<(), SprintdeskError> {
    let config = ctx.config()?;
    let (conn, actor) = ctx.session()?;
    let task = tasks::add_task(&conn, &actor, &config, input)?;
    ctx.emit(json!({ "task": to_data(&task)? }), || {
        println!("Added task: {} ({})", task.title, task.id)
    });
    Ok(())
}

fn run_list(
    args: &TaskFilterArgs,
    status: Option<TaskStatus>,
    query: Option<String>,
    ctx: &Context,
) -> Result<(), SprintdeskError> {
    let (conn, actor) = ctx.session()?;
    let mut filter = resolve_filter(&conn, args)?;
    filter.status = status;
    filter.query = query;
    let list = tasks::list_tasks(&conn, &actor, &filter)?;
    ctx.emit(json!({ "tasks": to_data(&list)? }), || {
        output::text::print_task_list(&list)
    });
    Ok(())
}

fn run_show(id: &str, ctx: &Context) -> Result<(), SprintdeskError> {
    let (conn, actor) = ctx.session()?;
    let detail = tasks::show_task(&conn, &actor, id)?;
    ctx.emit(to_data(&detail)?, || {
        output::text::print_task(&detail.task);
        if !detail.subtasks.is_empty() {
            println!("\nSubtasks:");
            for s in &detail.subtasks {
                output::text::print_subtask(s);
            }
        }
        if !detail.history.is_empty() {
            println!("\nHistory:");
            output::text::print_history(&detail.history);
        }
    });
    Ok(())
}

fn run_update(id: &str, changes: &TaskChanges, ctx: &Context) -> Result<(), SprintdeskError> {
    let (conn, actor) = ctx.session()?;
    let task = tasks::update_task(&conn, &actor, id, changes)?;
    ctx.emit(json!({ "task": to_data(&task)? }), || {
        println!("Updated task: {} ({})", task.title, task.id)
    });
    Ok(())
}

fn run_delete(id: &str, ctx: &Context) -> Result<(), SprintdeskError> {
    let (conn, actor) = ctx.session()?;
    let task = tasks::delete_task(&conn, &actor, id)?;
    ctx.emit(json!({ "deleted": task.id }), || {
        println!("Deleted task: {} ({})", task.title, task.id)
    });
    Ok(())
}

fn run_move(id: &str, to: TaskStatus, comment: Option<&str>, ctx: &Context) -> Result<(), SprintdeskError> {
    let (conn, actor) = ctx.session()?;
    let transition = workflow::change_status(&conn, &actor, id, to, comment)?;
    ctx.emit(to_data(&transition)?, || output::text::print_transition(&transition));
    Ok(())
}

fn run_log(id: &str, ctx: &Context) -> Result<(), SprintdeskError> {
    let (conn, actor) = ctx.session()?;
    let logs = workflow::status_history(&conn, &actor, id)?;
    ctx.emit(json!({ "history": to_data(&logs)? }), || {
        output::text::print_history(&logs)
    });
    Ok(())
}
