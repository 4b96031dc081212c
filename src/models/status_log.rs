use serde::{Deserialize, Serialize};

use super::TaskStatus;

/// Append-only record of one accepted status transition.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusLog {
    pub id: String,
    pub task_id: String,
    pub from_status: TaskStatus,
    pub to_status: TaskStatus,
    pub actor: Option<String>,
    pub comment: String,
    pub created_at: String,
}
