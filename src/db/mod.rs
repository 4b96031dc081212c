pub mod connection;
pub mod migrations;
pub mod resolve;
pub mod user_repo;
pub mod limits_repo;
pub mod project_repo;
pub mod task_repo;
pub mod subtask_repo;
pub mod status_log_repo;
pub mod daily_repo;

pub use connection::*;
