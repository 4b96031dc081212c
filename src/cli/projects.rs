use serde_json::json;

use crate::cli::commands::{EpicCommands, MemberCommands, ProjectCommands, SprintCommands};
use crate::cli::{amount, finish, opt_amount, Context};
use crate::db::project_repo::{self, NewProject, ProjectUpdate};
use crate::engine::reporting;
use crate::error::SprintdeskError;
use crate::output::{self, json::to_data};
use crate::records::projects;

pub fn run(cmd: ProjectCommands, ctx: &Context) -> i32 {
    let result = match cmd {
        ProjectCommands::Add { name, description, budget, start, end } => run_add(
            &name,
            description.as_deref(),
            &budget,
            start.as_deref(),
            end.as_deref(),
            ctx,
        ),
        ProjectCommands::List => run_list(ctx),
        ProjectCommands::Show { reference } => run_show(&reference, ctx),
        ProjectCommands::Update { reference, name, description, budget, start, end } => {
            opt_amount(budget.as_deref()).and_then(|budget| {
                run_update(
                    &reference,
                    &ProjectUpdate {
                        name: name.as_deref(),
                        description: description.as_deref(),
                        budget,
                        start_date: start.as_deref(),
                        end_date: end.as_deref(),
                    },
                    ctx,
                )
            })
        }
        ProjectCommands::Delete { reference } => run_delete(&reference, ctx),
        ProjectCommands::Member(member_cmd) => run_member(member_cmd, ctx),
    };
    finish(result, ctx.json)
}

fn run_add(
    name: &str,
    description: Option<&str>,
    budget: &str,
    start: Option<&str>,
    end: Option<&str>,
    ctx: &Context,
) -> Result<(), SprintdeskError> {
    let new = NewProject {
        name,
        description,
        budget: amount(budget)?,
        start_date: start,
        end_date: end,
    };
    let (conn, actor) = ctx.session()?;
    let project = projects::add_project(&conn, &actor, &new)?;
    ctx.emit(json!({ "project": to_data(&project)? }), || {
        println!("Added project: {} ({})", project.name, project.id)
    });
    Ok(())
}

fn run_list(ctx: &Context) -> Result<(), SprintdeskError> {
    let (conn, _actor) = ctx.session()?;
    let list = project_repo::list_projects(&conn)?;
    ctx.emit(json!({ "projects": to_data(&list)? }), || {
        output::text::print_project_list(&list)
    });
    Ok(())
}

fn run_show(reference: &str, ctx: &Context) -> Result<(), SprintdeskError> {
    let (conn, _actor) = ctx.session()?;
    let project = project_repo::resolve_project(&conn, reference)?;
    let summary = reporting::project_summary(&conn, &project.id)?;
    ctx.emit(to_data(&summary)?, || output::text::print_project_summary(&summary));
    Ok(())
}

fn run_update(reference: &str, update: &ProjectUpdate, ctx: &Context) -> Result<(), SprintdeskError> {
    let (conn, actor) = ctx.session()?;
    let project = projects::update_project(&conn, &actor, reference, update)?;
    ctx.emit(json!({ "project": to_data(&project)? }), || {
        println!("Updated project: {} ({})", project.name, project.id)
    });
    Ok(())
}

fn run_delete(reference: &str, ctx: &Context) -> Result<(), SprintdeskError> {
    let (conn, actor) = ctx.session()?;
    let project = projects::delete_project(&conn, &actor, reference)?;
    ctx.emit(json!({ "deleted": project.id }), || {
        println!("Deleted project: {} ({})", project.name, project.id)
    });
    Ok(())
}

fn run_member(cmd: MemberCommands, ctx: &Context) -> Result<(), SprintdeskError> {
    let (conn, actor) = ctx.session()?;
    let members = match cmd {
        MemberCommands::Add { project, username } => {
            projects::add_member(&conn, &actor, &project, &username)?
        }
        MemberCommands::Remove { project, username } => {
            projects::remove_member(&conn, &actor, &project, &username)?
        }
    };
    ctx.emit(json!({ "members": members }), || {
        println!("Members: {}", members.join(", "))
    });
    Ok(())
}

pub fn run_sprint(cmd: SprintCommands, ctx: &Context) -> i32 {
    let result = match cmd {
        SprintCommands::Add { project, name, start, end } => {
            run_sprint_add(&project, &name, start.as_deref(), end.as_deref(), ctx)
        }
        SprintCommands::List { project } => run_sprint_list(&project, ctx),
        SprintCommands::Delete { reference } => run_sprint_delete(&reference, ctx),
    };
    finish(result, ctx.json)
}

fn run_sprint_add(
    project: &str,
    name: &str,
    start: Option<&str>,
    end: Option<&str>,
    ctx: &Context,
) -> Result<(), SprintdeskError> {
    let (conn, actor) = ctx.session()?;
    let sprint = projects::add_sprint(&conn, &actor, project, name, start, end)?;
    ctx.emit(json!({ "sprint": to_data(&sprint)? }), || {
        println!("Added sprint: {} ({})", sprint.name, sprint.id)
    });
    Ok(())
}

fn run_sprint_list(project: &str, ctx: &Context) -> Result<(), SprintdeskError> {
    let (conn, _actor) = ctx.session()?;
    let project = project_repo::resolve_project(&conn, project)?;
    let list = project_repo::list_sprints(&conn, &project.id)?;
    ctx.emit(json!({ "sprints": to_data(&list)? }), || {
        if list.is_empty() {
            println!("No sprints found.");
        }
        for s in &list {
            println!(
                "  {} ({}) {} .. {}",
                s.name,
                s.id,
                s.start_date.as_deref().unwrap_or("-"),
                s.end_date.as_deref().unwrap_or("-")
            );
        }
    });
    Ok(())
}

fn run_sprint_delete(reference: &str, ctx: &Context) -> Result<(), SprintdeskError> {
    let (conn, actor) = ctx.session()?;
    let sprint = projects::delete_sprint(&conn, &actor, reference)?;
    ctx.emit(json!({ "deleted": sprint.id }), || {
        println!("Deleted sprint: {} ({})", sprint.name, sprint.id)
    });
    Ok(())
}

pub fn run_epic(cmd: EpicCommands, ctx: &Context) -> i32 {
    let result = match cmd {
        EpicCommands::Add { project, name, description } => {
            run_epic_add(&project, &name, description.as_deref(), ctx)
        }
        EpicCommands::List { project } => run_epic_list(&project, ctx),
        EpicCommands::Delete { reference } => run_epic_delete(&reference, ctx),
    };
    finish(result, ctx.json)
}

fn run_epic_add(
    project: &str,
    name: &str,
    description: Option<&str>,
    ctx: &Context,
) -> Result<(), SprintdeskError> {
    let (conn, actor) = ctx.session()?;
    let epic = projects::add_epic(&conn, &actor, project, name, description)?;
    ctx.emit(json!({ "epic": to_data(&epic)? }), || {
        println!("Added epic: {} ({})", epic.name, epic.id)
    });
    Ok(())
}

fn run_epic_list(project: &str, ctx: &Context) -> Result<(), SprintdeskError> {
    let (conn, _actor) = ctx.session()?;
    let project = project_repo::resolve_project(&conn, project)?;
    let list = project_repo::list_epics(&conn, &project.id)?;
    ctx.emit(json!({ "epics": to_data(&list)? }), || {
        if list.is_empty() {
            println!("No epics found.");
        }
        for e in &list {
            println!("  {} ({})", e.name, e.id);
        }
    });
    Ok(())
}

fn run_epic_delete(reference: &str, ctx: &Context) -> Result<(), SprintdeskError> {
    let (conn, actor) = ctx.session()?;
    let epic = projects::delete_epic(&conn, &actor, reference)?;
    ctx.emit(json!({ "deleted": epic.id }), || {
        println!("Deleted epic: {} ({})", epic.name, epic.id)
    });
    Ok(())
}
