use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::models::{Priority, Role, TaskStatus};

const VERSION: &str = env!("CARGO_PKG_VERSION");

fn parse_role(s: &str) -> Result<Role, String> {
    Role::from_str(s).ok_or_else(|| format!("invalid role '{s}' (admin, leader, scrum, normal)"))
}

fn parse_status(s: &str) -> Result<TaskStatus, String> {
    TaskStatus::from_str(s).ok_or_else(|| format!("invalid status '{s}' (new, in_progress, completed)"))
}

fn parse_priority(s: &str) -> Result<Priority, String> {
    Priority::from_str(s)
        .ok_or_else(|| format!("invalid priority '{s}' (urgent, important, not_urgent, other)"))
}

#[derive(Parser)]
#[command(
    name = "sprintdesk",
    version = VERSION,
    about = "Agile project tracking: budgets, task workflow, plan limits and dailies",
    after_help = "\
NOTE:
  DB is stored at ./.sprintdesk/sprintdesk.db unless --db / SPRINTDESK_DB is set.
  config.json next to the DB sets the daily window, task limit scope and
  allowed attachment extensions.
  Run `sprintdesk init --owner <username>` before any other command.
  Every other command acts as the user given by --as / SPRINTDESK_USER.

AMOUNTS:
  Budgets are given as decimals (`1000`, `12.50`) and stored as cents.
  JSON output reports amounts in cents.

EXIT CODES:
  0  Success
  1  Error (budget exceeded, permission denied, limit reached, validation, etc.)

STATUS RULES:
  new -> in_progress -> completed.
  Normal users advance one step on tasks they are responsible for.
  Admin, leader and scrum users may move anywhere; moving back needs --comment."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Output as JSON
    #[arg(long, global = true)]
    pub json: bool,

    /// Database path
    #[arg(long, global = true, env = "SPRINTDESK_DB")]
    pub db: Option<PathBuf>,

    /// Act as this user
    #[arg(long = "as", global = true, env = "SPRINTDESK_USER")]
    pub actor: Option<String>,

    /// Debug logging on stderr
    #[arg(long, short, global = true)]
    pub verbose: bool,

    /// Only log errors
    #[arg(long, short, global = true, conflicts_with = "verbose")]
    pub quiet: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Initialize the database and create the owner account
    Init {
        /// Username of the owner (admin superuser)
        #[arg(long)]
        owner: String,
    },

    /// User management
    #[command(subcommand)]
    User(UserCommands),

    /// Plan limits
    #[command(subcommand)]
    Limits(LimitsCommands),

    /// Project management
    #[command(subcommand)]
    Project(ProjectCommands),

    /// Sprint management
    #[command(subcommand)]
    Sprint(SprintCommands),

    /// Epic management
    #[command(subcommand)]
    Epic(EpicCommands),

    /// Task management
    #[command(subcommand)]
    Task(TaskCommands),

    /// Subtask management
    #[command(subcommand)]
    Subtask(SubtaskCommands),

    /// Daily check-ins
    #[command(subcommand)]
    Daily(DailyCommands),

    /// Availability calendar
    #[command(subcommand)]
    Availability(AvailabilityCommands),

    /// Reports and exports
    #[command(subcommand)]
    Report(ReportCommands),
}

#[derive(Subcommand)]
pub enum UserCommands {
    /// Add a user
    Add {
        username: String,
        #[arg(long, default_value = "normal", value_parser = parse_role)]
        role: Role,
        #[arg(long)]
        display_name: Option<String>,
    },
    /// List users
    List,
    /// Change a user's role
    SetRole {
        username: String,
        #[arg(value_parser = parse_role)]
        role: Role,
    },
    /// Remove a user
    Remove { username: String },
}

#[derive(Subcommand)]
pub enum LimitsCommands {
    /// Show plan limits
    Show,
    /// Change plan limits (owner only)
    Set {
        #[arg(long)]
        max_admins: Option<i64>,
        #[arg(long)]
        max_users: Option<i64>,
        #[arg(long)]
        max_projects: Option<i64>,
        #[arg(long)]
        max_tasks: Option<i64>,
        #[arg(long)]
        max_files: Option<i64>,
    },
}

#[derive(Subcommand)]
pub enum ProjectCommands {
    /// Create a project
    Add {
        name: String,
        #[arg(long)]
        description: Option<String>,
        #[arg(long, default_value = "0")]
        budget: String,
        /// YYYY-MM-DD
        #[arg(long)]
        start: Option<String>,
        /// YYYY-MM-DD
        #[arg(long)]
        end: Option<String>,
    },
    /// List projects
    List,
    /// Show project summary
    Show {
        /// Project ID or prefix
        reference: String,
    },
    /// Update a project
    Update {
        reference: String,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        description: Option<String>,
        #[arg(long)]
        budget: Option<String>,
        #[arg(long)]
        start: Option<String>,
        #[arg(long)]
        end: Option<String>,
    },
    /// Delete a project with its sprints, epics and tasks
    Delete { reference: String },
    /// Manage project members
    #[command(subcommand)]
    Member(MemberCommands),
}

#[derive(Subcommand)]
pub enum MemberCommands {
    /// Add a member
    Add { project: String, username: String },
    /// Remove a member
    Remove { project: String, username: String },
}

#[derive(Subcommand)]
pub enum SprintCommands {
    /// Add a sprint to a project
    Add {
        project: String,
        name: String,
        #[arg(long)]
        start: Option<String>,
        #[arg(long)]
        end: Option<String>,
    },
    /// List sprints of a project
    List { project: String },
    /// Delete a sprint (its tasks are kept)
    Delete { reference: String },
}

#[derive(Subcommand)]
pub enum EpicCommands {
    /// Add an epic to a project
    Add {
        project: String,
        name: String,
        #[arg(long)]
        description: Option<String>,
    },
    /// List epics of a project
    List { project: String },
    /// Delete an epic (its tasks are kept)
    Delete { reference: String },
}

#[derive(Args)]
pub struct TaskFilterArgs {
    #[arg(long)]
    pub project: Option<String>,
    #[arg(long)]
    pub sprint: Option<String>,
    #[arg(long)]
    pub responsible: Option<String>,
}

#[derive(Subcommand)]
pub enum TaskCommands {
    /// Add a task to a project
    Add {
        /// Project ID or prefix
        project: String,
        title: String,
        #[arg(long)]
        sprint: Option<String>,
        #[arg(long)]
        epic: Option<String>,
        #[arg(long)]
        description: Option<String>,
        #[arg(long)]
        kpis: Option<String>,
        /// One of 1, 2, 3, 5, 8, 13, 21
        #[arg(long, default_value = "1")]
        story_points: i32,
        #[arg(long, default_value = "0")]
        budget: String,
        #[arg(long, default_value = "new", value_parser = parse_status)]
        status: TaskStatus,
        #[arg(long, default_value = "important", value_parser = parse_priority)]
        priority: Priority,
        /// Responsible user (repeatable)
        #[arg(long = "responsible")]
        responsibles: Vec<String>,
    },
    /// List tasks
    List {
        #[command(flatten)]
        filter: TaskFilterArgs,
        #[arg(long, value_parser = parse_status)]
        status: Option<TaskStatus>,
        /// Free-text search over title, description, project, sprint and epic
        #[arg(long)]
        query: Option<String>,
    },
    /// Show task details
    Show {
        /// Task ID or prefix
        id: String,
    },
    /// Update task fields (use `task move` for status)
    Update {
        id: String,
        #[arg(long)]
        title: Option<String>,
        #[arg(long)]
        description: Option<String>,
        #[arg(long)]
        kpis: Option<String>,
        #[arg(long)]
        sprint: Option<String>,
        #[arg(long)]
        epic: Option<String>,
        #[arg(long)]
        story_points: Option<i32>,
        #[arg(long)]
        budget: Option<String>,
        #[arg(long, value_parser = parse_priority)]
        priority: Option<Priority>,
        /// Replace responsible users (repeatable)
        #[arg(long = "responsible")]
        responsibles: Vec<String>,
    },
    /// Delete a task
    Delete { id: String },
    /// Change task status
    #[command(after_help = "\
NOTE:
  Moving to an earlier status requires --comment.
  Every accepted move is recorded in the status log (`task log`).")]
    Move {
        id: String,
        #[arg(long, value_parser = parse_status)]
        to: TaskStatus,
        #[arg(long)]
        comment: Option<String>,
    },
    /// Show status history, newest first
    Log { id: String },
}

#[derive(Subcommand)]
pub enum SubtaskCommands {
    /// Add a subtask to a task
    Add {
        /// Task ID or prefix
        task: String,
        title: String,
        #[arg(long)]
        description: Option<String>,
        /// One of 1, 2, 3, 5, 7
        #[arg(long, default_value = "1")]
        story_points: i32,
        #[arg(long, default_value = "0")]
        budget: String,
        #[arg(long, default_value = "new", value_parser = parse_status)]
        status: TaskStatus,
    },
    /// Update a subtask
    Update {
        id: String,
        #[arg(long)]
        title: Option<String>,
        #[arg(long)]
        description: Option<String>,
        #[arg(long)]
        story_points: Option<i32>,
        #[arg(long)]
        budget: Option<String>,
        #[arg(long, value_parser = parse_status)]
        status: Option<TaskStatus>,
    },
    /// Show a subtask with comments and attachments
    Show { id: String },
    /// Delete a subtask
    Delete { id: String },
    /// Comment on a subtask
    Comment { id: String, text: String },
    /// Record file attachments
    Attach {
        id: String,
        #[arg(required = true)]
        files: Vec<String>,
        #[arg(long)]
        label: Option<String>,
    },
    /// Remove an attachment
    Detach {
        /// Attachment ID or prefix
        id: String,
    },
}

#[derive(Subcommand)]
pub enum DailyCommands {
    /// Submit a daily check-in
    Add {
        #[arg(long)]
        yesterday: String,
        #[arg(long)]
        today: String,
        #[arg(long)]
        impediment: Option<String>,
        /// Submission time, "YYYY-MM-DD HH:MM[:SS]" (admin, leader, scrum only)
        #[arg(long)]
        at: Option<String>,
    },
    /// List dailies
    List {
        #[arg(long)]
        user: Option<String>,
        #[arg(long)]
        from: Option<String>,
        #[arg(long)]
        to: Option<String>,
    },
    /// Delete dailies by ID, or all in a date range
    Delete {
        ids: Vec<String>,
        #[arg(long, requires = "to", conflicts_with = "ids")]
        from: Option<String>,
        #[arg(long, requires = "from")]
        to: Option<String>,
        #[arg(long, requires = "from")]
        user: Option<String>,
    },
}

#[derive(Subcommand)]
pub enum AvailabilityCommands {
    /// Add an availability entry
    Add {
        title: String,
        /// "YYYY-MM-DD HH:MM[:SS]"
        #[arg(long)]
        start: String,
        /// "YYYY-MM-DD HH:MM[:SS]"
        #[arg(long)]
        end: String,
        #[arg(long)]
        description: Option<String>,
        #[arg(long)]
        link: Option<String>,
    },
    /// List availability entries
    List {
        #[arg(long)]
        user: Option<String>,
    },
    /// Remove an availability entry
    Remove { id: String },
}

#[derive(Subcommand)]
pub enum ReportCommands {
    /// Project dashboard: status counts, progress and budget
    Project { reference: String },
    /// Tasks grouped by priority bucket
    Export {
        #[command(flatten)]
        filter: TaskFilterArgs,
    },
    /// Dailies with on-time flags and counts
    Dailies {
        #[arg(long)]
        user: Option<String>,
        #[arg(long)]
        from: Option<String>,
        #[arg(long)]
        to: Option<String>,
    },
}
