pub mod money;
pub mod user;
pub mod project;
pub mod task;
pub mod status_log;
pub mod daily;
pub mod plan_limits;

pub use user::*;
pub use project::*;
pub use task::*;
pub use status_log::*;
pub use daily::*;
pub use plan_limits::*;
