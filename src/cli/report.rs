use serde_json::json;

use crate::cli::commands::{ReportCommands, TaskFilterArgs};
use crate::cli::tasks::resolve_filter;
use crate::cli::{finish, Context};
use crate::db::daily_repo::DailyFilter;
use crate::db::project_repo;
use crate::engine::reporting;
use crate::error::SprintdeskError;
use crate::output::{self, json::to_data};
use crate::records::{dailies, tasks};

pub fn run(cmd: ReportCommands, ctx: &Context) -> i32 {
    let result = match cmd {
        ReportCommands::Project { reference } => run_project(&reference, ctx),
        ReportCommands::Export { filter } => run_export(&filter, ctx),
        ReportCommands::Dailies { user, from, to } => {
            run_dailies(DailyFilter { username: user, from, to }, ctx)
        }
    };
    finish(result, ctx.json)
}

fn run_project(reference: &str, ctx: &Context) -> Result<(), SprintdeskError> {
    let (conn, _actor) = ctx.session()?;
    let project = project_repo::resolve_project(&conn, reference)?;
    let summary = reporting::project_summary(&conn, &project.id)?;
    ctx.emit(to_data(&summary)?, || output::text::print_project_summary(&summary));
    Ok(())
}

fn run_export(args: &TaskFilterArgs, ctx: &Context) -> Result<(), SprintdeskError> {
    let (conn, actor) = ctx.session()?;
    let filter = tasks::scoped_filter(&actor, &resolve_filter(&conn, args)?);
    let buckets = reporting::export_snapshot(&conn, &filter)?;
    ctx.emit(json!({ "buckets": to_data(&buckets)? }), || {
        output::text::print_export(&buckets)
    });
    Ok(())
}

fn run_dailies(filter: DailyFilter, ctx: &Context) -> Result<(), SprintdeskError> {
    let window = ctx.config()?.daily_window()?;
    let (conn, actor) = ctx.session()?;
    let filter = dailies::scoped_filter(&actor, &filter)?;
    let report = reporting::daily_report(&conn, &filter, &window)?;
    ctx.emit(to_data(&report)?, || output::text::print_daily_report(&report));
    Ok(())
}
