use serde_json::json;

use crate::cli::commands::{AvailabilityCommands, DailyCommands};
use crate::cli::{finish, Context};
use crate::db::daily_repo::{self, DailyFilter};
use crate::engine::timeliness;
use crate::error::SprintdeskError;
use crate::output::{self, json::to_data};
use crate::records::dailies::{self, BulkDelete};

pub fn run(cmd: DailyCommands, ctx: &Context) -> i32 {
    let result = match cmd {
        DailyCommands::Add { yesterday, today, impediment, at } => {
            run_add(&yesterday, &today, impediment.as_deref(), at.as_deref(), ctx)
        }
        DailyCommands::List { user, from, to } => run_list(DailyFilter { username: user, from, to }, ctx),
        DailyCommands::Delete { ids, from, to, user } => {
            let request = match (from, to) {
                (Some(from), Some(to)) => BulkDelete::Range { from, to, username: user },
                _ => BulkDelete::Ids(ids),
            };
            run_delete(&request, ctx)
        }
    };
    finish(result, ctx.json)
}

fn run_add(
    yesterday: &str,
    today: &str,
    impediment: Option<&str>,
    at: Option<&str>,
    ctx: &Context,
) -> Result<(), SprintdeskError> {
    let at = at.map(timeliness::parse_submitted_at).transpose()?;
    let config = ctx.config()?;
    let window = config.daily_window()?;
    let (conn, actor) = ctx.session()?;
    let daily = dailies::add_daily(&conn, &actor, yesterday, today, impediment, at)?;
    let on_time = timeliness::parse_submitted_at(&daily.submitted_at)
        .map(|t| window.contains(t))
        .unwrap_or(false);
    ctx.emit(json!({ "daily": to_data(&daily)?, "on_time": on_time }), || {
        output::text::print_daily(&daily);
        if !on_time {
            println!("  (submitted outside the daily window)");
        }
    });
    Ok(())
}

fn run_list(filter: DailyFilter, ctx: &Context) -> Result<(), SprintdeskError> {
    let (conn, actor) = ctx.session()?;
    let filter = dailies::scoped_filter(&actor, &filter)?;
    let list = daily_repo::list_dailies(&conn, &filter)?;
    ctx.emit(json!({ "dailies": to_data(&list)? }), || {
        if list.is_empty() {
            println!("No dailies found.");
        }
        for d in &list {
            output::text::print_daily(d);
        }
    });
    Ok(())
}

fn run_delete(request: &BulkDelete, ctx: &Context) -> Result<(), SprintdeskError> {
    let (conn, actor) = ctx.session()?;
    let deleted = dailies::bulk_delete(&conn, &actor, request)?;
    ctx.emit(json!({ "deleted": deleted }), || println!("Deleted {deleted} daily(s)"));
    Ok(())
}

pub fn run_availability(cmd: AvailabilityCommands, ctx: &Context) -> i32 {
    let result = match cmd {
        AvailabilityCommands::Add { title, start, end, description, link } => run_availability_add(
            &title,
            description.as_deref(),
            &start,
            &end,
            link.as_deref(),
            ctx,
        ),
        AvailabilityCommands::List { user } => run_availability_list(user.as_deref(), ctx),
        AvailabilityCommands::Remove { id } => run_availability_remove(&id, ctx),
    };
    finish(result, ctx.json)
}

fn run_availability_add(
    title: &str,
    description: Option<&str>,
    start: &str,
    end: &str,
    link: Option<&str>,
    ctx: &Context,
) -> Result<(), SprintdeskError> {
    let (conn, actor) = ctx.session()?;
    let entry = dailies::add_availability(&conn, &actor, title, description, start, end, link)?;
    ctx.emit(json!({ "availability": to_data(&entry)? }), || {
        println!("Added availability: {} ({})", entry.title, entry.id)
    });
    Ok(())
}

fn run_availability_list(user: Option<&str>, ctx: &Context) -> Result<(), SprintdeskError> {
    let (conn, _actor) = ctx.session()?;
    let list = dailies::list_availability(&conn, user)?;
    ctx.emit(json!({ "availability": to_data(&list)? }), || {
        output::text::print_availability_list(&list)
    });
    Ok(())
}

fn run_availability_remove(id: &str, ctx: &Context) -> Result<(), SprintdeskError> {
    let (conn, actor) = ctx.session()?;
    let entry = dailies::remove_availability(&conn, &actor, id)?;
    ctx.emit(json!({ "deleted": entry.id }), || {
        println!("Removed availability: {} ({})", entry.title, entry.id)
    });
    Ok(())
}
