use serde_json::json;

use crate::cli::Context;
use crate::db::connection;
use crate::error::SprintdeskError;
use crate::records::users;

pub fn run(owner: &str, ctx: &Context) -> i32 {
    crate::cli::finish(run_init(owner, ctx), ctx.json)
}

fn run_init(owner: &str, ctx: &Context) -> Result<(), SprintdeskError> {
    let conn = connection::init_db(&ctx.db)?;
    let user = users::bootstrap_owner(&conn, owner)?;
    ctx.emit(
        json!({
            "path": ctx.db.to_string_lossy(),
            "owner": user.username
        }),
        || println!("Initialized sprintdesk at {} (owner: {})", ctx.db.display(), user.username),
    );
    Ok(())
}
