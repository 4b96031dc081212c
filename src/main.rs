use clap::Parser;
use std::process;

use sprintdesk::cli::commands::{Cli, Commands};
use sprintdesk::cli::{self, Context};
use sprintdesk::db::connection;
use sprintdesk::logging::{self, LoggingConfig};

fn main() {
    let cli_args = Cli::parse();
    if let Err(e) = logging::init_logging(LoggingConfig::from_args(cli_args.quiet, cli_args.verbose)) {
        eprintln!("warning: logging disabled: {e}");
    }

    let ctx = Context {
        json: cli_args.json,
        db: connection::db_path(cli_args.db.as_deref()),
        actor: cli_args.actor,
    };

    let exit_code = match cli_args.command {
        Commands::Init { owner } => cli::init::run(&owner, &ctx),
        Commands::User(cmd) => cli::users::run(cmd, &ctx),
        Commands::Limits(cmd) => cli::users::run_limits(cmd, &ctx),
        Commands::Project(cmd) => cli::projects::run(cmd, &ctx),
        Commands::Sprint(cmd) => cli::projects::run_sprint(cmd, &ctx),
        Commands::Epic(cmd) => cli::projects::run_epic(cmd, &ctx),
        Commands::Task(cmd) => cli::tasks::run(cmd, &ctx),
        Commands::Subtask(cmd) => cli::subtasks::run(cmd, &ctx),
        Commands::Daily(cmd) => cli::dailies::run(cmd, &ctx),
        Commands::Availability(cmd) => cli::dailies::run_availability(cmd, &ctx),
        Commands::Report(cmd) => cli::report::run(cmd, &ctx),
    };

    process::exit(exit_code);
}
