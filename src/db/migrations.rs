use rusqlite::Connection;

use crate::error::SprintdeskError;

pub fn run_migrations(conn: &Connection) -> Result<(), SprintdeskError> {
    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS users (
            username TEXT PRIMARY KEY COLLATE NOCASE,
            display_name TEXT,
            role TEXT NOT NULL DEFAULT 'normal'
                CHECK (role IN ('admin', 'leader', 'scrum', 'normal')),
            superuser INTEGER NOT NULL DEFAULT 0,
            created_at TEXT NOT NULL DEFAULT (datetime('now'))
        );

        CREATE TABLE IF NOT EXISTS plan_limits (
            id INTEGER PRIMARY KEY CHECK (id = 1),
            max_admins INTEGER NOT NULL CHECK (max_admins >= 0),
            max_users INTEGER NOT NULL CHECK (max_users >= 0),
            max_projects INTEGER NOT NULL CHECK (max_projects >= 0),
            max_tasks INTEGER NOT NULL CHECK (max_tasks >= 0),
            max_files INTEGER NOT NULL CHECK (max_files >= 0)
        );

        CREATE TABLE IF NOT EXISTS projects (
            id TEXT PRIMARY KEY,
            name TEXT NOT NULL,
            description TEXT,
            budget INTEGER NOT NULL DEFAULT 0,
            start_date TEXT,
            end_date TEXT,
            created_by TEXT REFERENCES users(username) ON DELETE SET NULL,
            created_at TEXT NOT NULL DEFAULT (datetime('now'))
        );

        CREATE TABLE IF NOT EXISTS project_members (
            project_id TEXT NOT NULL REFERENCES projects(id) ON DELETE CASCADE,
            username TEXT NOT NULL REFERENCES users(username) ON DELETE CASCADE,
            PRIMARY KEY (project_id, username)
        );

        CREATE TABLE IF NOT EXISTS sprints (
            id TEXT PRIMARY KEY,
            project_id TEXT NOT NULL REFERENCES projects(id) ON DELETE CASCADE,
            name TEXT NOT NULL,
            start_date TEXT,
            end_date TEXT,
            created_by TEXT REFERENCES users(username) ON DELETE SET NULL
        );

        CREATE TABLE IF NOT EXISTS epics (
            id TEXT PRIMARY KEY,
            project_id TEXT NOT NULL REFERENCES projects(id) ON DELETE CASCADE,
            name TEXT NOT NULL,
            description TEXT,
            created_by TEXT REFERENCES users(username) ON DELETE SET NULL
        );

        CREATE TABLE IF NOT EXISTS tasks (
            id TEXT PRIMARY KEY,
            project_id TEXT NOT NULL REFERENCES projects(id) ON DELETE CASCADE,
            sprint_id TEXT REFERENCES sprints(id) ON DELETE SET NULL,
            epic_id TEXT REFERENCES epics(id) ON DELETE SET NULL,
            title TEXT NOT NULL,
            description TEXT,
            kpis TEXT,
            story_points INTEGER NOT NULL DEFAULT 3,
            budget INTEGER NOT NULL DEFAULT 0 CHECK (budget >= 0),
            status TEXT NOT NULL DEFAULT 'new'
                CHECK (status IN ('new', 'in_progress', 'completed')),
            priority TEXT NOT NULL DEFAULT 'important'
                CHECK (priority IN ('urgent', 'important', 'not_urgent', 'other')),
            created_by TEXT REFERENCES users(username) ON DELETE SET NULL,
            created_at TEXT NOT NULL DEFAULT (datetime('now'))
        );

        CREATE TABLE IF NOT EXISTS task_responsibles (
            task_id TEXT NOT NULL REFERENCES tasks(id) ON DELETE CASCADE,
            username TEXT NOT NULL COLLATE NOCASE REFERENCES users(username) ON DELETE CASCADE,
            PRIMARY KEY (task_id, username)
        );

        CREATE TABLE IF NOT EXISTS subtasks (
            id TEXT PRIMARY KEY,
            task_id TEXT NOT NULL REFERENCES tasks(id) ON DELETE CASCADE,
            title TEXT NOT NULL,
            description TEXT,
            story_points INTEGER NOT NULL DEFAULT 1,
            budget INTEGER NOT NULL DEFAULT 0 CHECK (budget >= 0),
            status TEXT NOT NULL DEFAULT 'new'
                CHECK (status IN ('new', 'in_progress', 'completed')),
            created_by TEXT REFERENCES users(username) ON DELETE SET NULL,
            created_at TEXT NOT NULL DEFAULT (datetime('now'))
        );

        CREATE TABLE IF NOT EXISTS subtask_comments (
            id TEXT PRIMARY KEY,
            subtask_id TEXT NOT NULL REFERENCES subtasks(id) ON DELETE CASCADE,
            author TEXT REFERENCES users(username) ON DELETE SET NULL,
            text TEXT NOT NULL,
            created_at TEXT NOT NULL DEFAULT (datetime('now'))
        );

        CREATE TABLE IF NOT EXISTS attachments (
            id TEXT PRIMARY KEY,
            subtask_id TEXT NOT NULL REFERENCES subtasks(id) ON DELETE CASCADE,
            uploaded_by TEXT REFERENCES users(username) ON DELETE SET NULL,
            file_name TEXT NOT NULL,
            label TEXT,
            created_at TEXT NOT NULL DEFAULT (datetime('now'))
        );

        CREATE TABLE IF NOT EXISTS status_logs (
            id TEXT PRIMARY KEY,
            task_id TEXT NOT NULL REFERENCES tasks(id) ON DELETE CASCADE,
            from_status TEXT NOT NULL,
            to_status TEXT NOT NULL,
            actor TEXT,
            comment TEXT NOT NULL DEFAULT '',
            created_at TEXT NOT NULL DEFAULT (strftime('%Y-%m-%d %H:%M:%f', 'now'))
        );

        CREATE TRIGGER IF NOT EXISTS status_logs_no_update
            BEFORE UPDATE ON status_logs
        BEGIN
            SELECT RAISE(ABORT, 'status_logs is append-only');
        END;

        CREATE TABLE IF NOT EXISTS dailies (
            id TEXT PRIMARY KEY,
            username TEXT NOT NULL REFERENCES users(username) ON DELETE CASCADE,
            date TEXT NOT NULL,
            yesterday TEXT NOT NULL,
            today TEXT NOT NULL,
            impediment TEXT NOT NULL DEFAULT '',
            submitted_at TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS availability (
            id TEXT PRIMARY KEY,
            username TEXT NOT NULL REFERENCES users(username) ON DELETE CASCADE,
            title TEXT NOT NULL,
            description TEXT,
            start_at TEXT NOT NULL,
            end_at TEXT NOT NULL,
            link TEXT,
            CHECK (start_at < end_at)
        );

        CREATE INDEX IF NOT EXISTS idx_tasks_project ON tasks(project_id, status);
        CREATE INDEX IF NOT EXISTS idx_subtasks_task ON subtasks(task_id);
        CREATE INDEX IF NOT EXISTS idx_logs_task ON status_logs(task_id, created_at);
        CREATE INDEX IF NOT EXISTS idx_dailies_user_date ON dailies(username, date);
        CREATE INDEX IF NOT EXISTS idx_responsibles_user ON task_responsibles(username);
        ",
    )?;
    Ok(())
}
