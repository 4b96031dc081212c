use serde::{Deserialize, Serialize};

/// Plan tier ceilings. One row per database.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlanLimits {
    pub max_admins: i64,
    pub max_users: i64,
    pub max_projects: i64,
    pub max_tasks: i64,
    pub max_files: i64,
}

impl Default for PlanLimits {
    fn default() -> Self {
        Self {
            max_admins: 5,
            max_users: 10,
            max_projects: 5,
            max_tasks: 50,
            max_files: 1000,
        }
    }
}
