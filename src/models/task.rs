use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    New,
    InProgress,
    Completed,
}

impl TaskStatus {
    pub const ALL: [TaskStatus; 3] = [Self::New, Self::InProgress, Self::Completed];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::New => "new",
            Self::InProgress => "in_progress",
            Self::Completed => "completed",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "new" => Some(Self::New),
            "in_progress" => Some(Self::InProgress),
            "completed" => Some(Self::Completed),
            _ => None,
        }
    }

    /// Position in the workflow order `new < in_progress < completed`.
    pub fn rank(&self) -> u8 {
        match self {
            Self::New => 0,
            Self::InProgress => 1,
            Self::Completed => 2,
        }
    }

    pub fn next(&self) -> Option<Self> {
        match self {
            Self::New => Some(Self::InProgress),
            Self::InProgress => Some(Self::Completed),
            Self::Completed => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    Urgent,
    Important,
    NotUrgent,
    Other,
}

impl Priority {
    /// Bucket order used by exports.
    pub const ALL: [Priority; 4] = [Self::Urgent, Self::Important, Self::NotUrgent, Self::Other];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Urgent => "urgent",
            Self::Important => "important",
            Self::NotUrgent => "not_urgent",
            Self::Other => "other",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "urgent" => Some(Self::Urgent),
            "important" => Some(Self::Important),
            "not_urgent" => Some(Self::NotUrgent),
            "other" => Some(Self::Other),
            _ => None,
        }
    }
}

pub const TASK_STORY_POINTS: [i32; 7] = [1, 2, 3, 5, 8, 13, 21];
pub const SUBTASK_STORY_POINTS: [i32; 5] = [1, 2, 3, 5, 7];

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Task {
    pub id: String,
    pub project_id: String,
    pub sprint_id: Option<String>,
    pub epic_id: Option<String>,
    pub title: String,
    pub description: Option<String>,
    pub kpis: Option<String>,
    pub story_points: i32,
    pub budget: i64,
    pub status: TaskStatus,
    pub priority: Priority,
    pub created_by: Option<String>,
    pub created_at: String,
    pub responsibles: Vec<String>,
}

impl Task {
    pub fn is_responsible(&self, username: &str) -> bool {
        self.responsibles.iter().any(|r| r.eq_ignore_ascii_case(username))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubTask {
    pub id: String,
    pub task_id: String,
    pub title: String,
    pub description: Option<String>,
    pub story_points: i32,
    pub budget: i64,
    pub status: TaskStatus,
    pub created_by: Option<String>,
    pub created_at: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubTaskComment {
    pub id: String,
    pub subtask_id: String,
    pub author: Option<String>,
    pub text: String,
    pub created_at: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Attachment {
    pub id: String,
    pub subtask_id: String,
    pub uploaded_by: Option<String>,
    pub file_name: String,
    pub label: Option<String>,
    pub created_at: String,
}
