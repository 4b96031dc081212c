use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Daily {
    pub id: String,
    pub username: String,
    pub date: String,
    pub yesterday: String,
    pub today: String,
    pub impediment: String,
    /// Local wall-clock time, `YYYY-MM-DD HH:MM:SS`.
    pub submitted_at: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Availability {
    pub id: String,
    pub username: String,
    pub title: String,
    pub description: Option<String>,
    pub start_at: String,
    pub end_at: String,
    pub link: Option<String>,
}
