//! `config.json`, stored next to the database.
//!
//! Every key is optional; missing keys take the defaults below. Plan limits
//! are not configured here, they live in the database.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::engine::timeliness::DailyWindow;
use crate::error::SprintdeskError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum TaskLimitScope {
    /// `max_tasks` caps the total number of tasks in the database.
    #[default]
    Global,
    /// `max_tasks` caps the number of tasks in each project.
    Project,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WindowConfig {
    pub start: String,
    pub end: String,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            start: "06:00".into(),
            end: "09:00".into(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub daily_window: WindowConfig,
    pub task_limit_scope: TaskLimitScope,
    pub allowed_attachment_exts: Vec<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            daily_window: WindowConfig::default(),
            task_limit_scope: TaskLimitScope::Global,
            allowed_attachment_exts: [".pdf", ".png", ".jpg", ".jpeg", ".doc", ".docx", ".xlsx"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
        }
    }
}

impl Config {
    /// Load config from `path`, falling back to defaults when the file is absent.
    pub fn load(path: &Path) -> Result<Self, SprintdeskError> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = fs::read_to_string(path)
            .map_err(|e| SprintdeskError::config(format!("{}: {e}", path.display())))?;
        let config: Config = serde_json::from_str(&content)
            .map_err(|e| SprintdeskError::config(format!("{}: {e}", path.display())))?;
        config.daily_window()?;
        Ok(config)
    }

    pub fn daily_window(&self) -> Result<DailyWindow, SprintdeskError> {
        DailyWindow::parse(&self.daily_window.start, &self.daily_window.end)
    }

    /// Whether a file name carries one of the allowed extensions.
    /// An empty allow-list accepts everything.
    pub fn attachment_allowed(&self, file_name: &str) -> bool {
        if self.allowed_attachment_exts.is_empty() {
            return true;
        }
        let ext = match Path::new(file_name).extension() {
            Some(ext) => format!(".{}", ext.to_string_lossy().to_ascii_lowercase()),
            None => return false,
        };
        self.allowed_attachment_exts
            .iter()
            .any(|allowed| allowed.eq_ignore_ascii_case(&ext))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_config_keeps_defaults() {
        let config: Config = serde_json::from_str(r#"{"task_limit_scope": "project"}"#).unwrap();
        assert_eq!(config.task_limit_scope, TaskLimitScope::Project);
        assert_eq!(config.daily_window.start, "06:00");
        assert!(!config.allowed_attachment_exts.is_empty());
    }

    #[test]
    fn test_attachment_extensions() {
        let config = Config::default();
        assert!(config.attachment_allowed("report.PDF"));
        assert!(config.attachment_allowed("scan.jpeg"));
        assert!(!config.attachment_allowed("payload.exe"));
        assert!(!config.attachment_allowed("README"));
    }

    #[test]
    fn test_missing_file_is_default() {
        let dir = tempfile::TempDir::new().unwrap();
        let config = Config::load(&dir.path().join("config.json")).unwrap();
        assert_eq!(config.task_limit_scope, TaskLimitScope::Global);
    }

    #[test]
    fn test_bad_window_rejected() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, r#"{"daily_window": {"start": "10:00", "end": "09:00"}}"#).unwrap();
        assert!(Config::load(&path).is_err());
        fs::write(&path, r#"{"daily_window": {"start": "six", "end": "09:00"}}"#).unwrap();
        assert!(Config::load(&path).is_err());
    }
}
