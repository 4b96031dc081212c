pub mod roles;
pub mod budget;
pub mod progress;
pub mod workflow;
pub mod limiter;
pub mod timeliness;
pub mod reporting;
