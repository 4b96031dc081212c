use serde_json::json;

use crate::cli::commands::{LimitsCommands, UserCommands};
use crate::cli::{finish, Context};
use crate::db::user_repo;
use crate::error::SprintdeskError;
use crate::output::{self, json::to_data};
use crate::records::limits::{self, LimitChanges};
use crate::records::users;

pub fn run(cmd: UserCommands, ctx: &Context) -> i32 {
    let result = match cmd {
        UserCommands::Add { username, role, display_name } => {
            run_add(&username, display_name.as_deref(), role, ctx)
        }
        UserCommands::List => run_list(ctx),
        UserCommands::SetRole { username, role } => run_set_role(&username, role, ctx),
        UserCommands::Remove { username } => run_remove(&username, ctx),
    };
    finish(result, ctx.json)
}

fn run_add(
    username: &str,
    display_name: Option<&str>,
    role: crate::models::Role,
    ctx: &Context,
) -> Result<(), SprintdeskError> {
    let (conn, actor) = ctx.session()?;
    let user = users::add_user(&conn, &actor, username, display_name, role)?;
    ctx.emit(json!({ "user": to_data(&user)? }), || {
        println!("Added user: {} [{}]", user.username, user.role.as_str())
    });
    Ok(())
}

fn run_list(ctx: &Context) -> Result<(), SprintdeskError> {
    let (conn, _actor) = ctx.session()?;
    let list = user_repo::list_users(&conn)?;
    ctx.emit(json!({ "users": to_data(&list)? }), || {
        output::text::print_user_list(&list)
    });
    Ok(())
}

fn run_set_role(username: &str, role: crate::models::Role, ctx: &Context) -> Result<(), SprintdeskError> {
    let (conn, actor) = ctx.session()?;
    let user = users::set_role(&conn, &actor, username, role)?;
    ctx.emit(json!({ "user": to_data(&user)? }), || {
        println!("{} is now {}", user.username, user.role.as_str())
    });
    Ok(())
}

fn run_remove(username: &str, ctx: &Context) -> Result<(), SprintdeskError> {
    let (conn, actor) = ctx.session()?;
    let user = users::remove_user(&conn, &actor, username)?;
    ctx.emit(json!({ "removed": user.username }), || {
        println!("Removed user: {}", user.username)
    });
    Ok(())
}

pub fn run_limits(cmd: LimitsCommands, ctx: &Context) -> i32 {
    let result = match cmd {
        LimitsCommands::Show => run_limits_show(ctx),
        LimitsCommands::Set {
            max_admins,
            max_users,
            max_projects,
            max_tasks,
            max_files,
        } => run_limits_set(
            &LimitChanges {
                max_admins,
                max_users,
                max_projects,
                max_tasks,
                max_files,
            },
            ctx,
        ),
    };
    finish(result, ctx.json)
}

fn run_limits_show(ctx: &Context) -> Result<(), SprintdeskError> {
    let conn = ctx.open()?;
    let current = limits::show(&conn)?;
    ctx.emit(json!({ "limits": to_data(&current)? }), || {
        output::text::print_limits(&current)
    });
    Ok(())
}

fn run_limits_set(changes: &LimitChanges, ctx: &Context) -> Result<(), SprintdeskError> {
    let (conn, actor) = ctx.session()?;
    let updated = limits::set(&conn, &actor, changes)?;
    ctx.emit(json!({ "limits": to_data(&updated)? }), || {
        output::text::print_limits(&updated)
    });
    Ok(())
}
