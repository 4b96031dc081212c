use std::path::{Path, PathBuf};
use std::sync::{Arc, Barrier};
use std::thread;

use chrono::NaiveDate;
use rusqlite::Connection;
use tempfile::TempDir;

use sprintdesk::config::{Config, TaskLimitScope};
use sprintdesk::db::daily_repo::DailyFilter;
use sprintdesk::db::{connection, project_repo, status_log_repo, subtask_repo, task_repo, user_repo};
use sprintdesk::engine::budget::{self, NewSubTask, SubTaskChanges};
use sprintdesk::engine::roles::Actor;
use sprintdesk::engine::{limiter, progress, reporting, workflow};
use sprintdesk::error::ErrorCode;
use sprintdesk::models::{Priority, Role, Task, TaskStatus};
use sprintdesk::records::dailies::{self, BulkDelete};
use sprintdesk::records::limits::{self, LimitChanges};
use sprintdesk::records::projects;
use sprintdesk::records::subtasks;
use sprintdesk::records::tasks::{self, TaskInput};
use sprintdesk::records::users;

// ─── helpers ───────────────────────────────────────────────────────

struct TestDb {
    _dir: TempDir,
    path: PathBuf,
    conn: Connection,
    owner: Actor,
}

impl TestDb {
    fn new() -> Self {
        let dir = TempDir::new().expect("create tempdir");
        let path = dir.path().join("sprintdesk.db");
        let conn = connection::init_db(&path).expect("init db");
        users::bootstrap_owner(&conn, "owner").expect("bootstrap owner");
        let owner = Actor::load(&conn, "owner").expect("load owner");
        Self {
            _dir: dir,
            path,
            conn,
            owner,
        }
    }

    fn user(&self, username: &str, role: Role) -> Actor {
        users::add_user(&self.conn, &self.owner, username, None, role).expect("add user");
        Actor::load(&self.conn, username).expect("load user")
    }

    fn project(&self, name: &str) -> String {
        projects::add_project(
            &self.conn,
            &self.owner,
            &project_repo::NewProject {
                name,
                description: None,
                budget: 1_000_000,
                start_date: None,
                end_date: None,
            },
        )
        .expect("add project")
        .id
    }

    fn task(&self, project_id: &str, budget: i64, responsibles: &[&str]) -> Task {
        self.task_with(&Config::default(), project_id, budget, responsibles)
            .expect("add task")
    }

    fn task_with(
        &self,
        config: &Config,
        project_id: &str,
        budget: i64,
        responsibles: &[&str],
    ) -> Result<Task, sprintdesk::error::SprintdeskError> {
        tasks::add_task(
            &self.conn,
            &self.owner,
            config,
            &TaskInput {
                project: project_id.to_string(),
                sprint: None,
                epic: None,
                title: "Build login".into(),
                description: None,
                kpis: None,
                story_points: 5,
                budget,
                status: TaskStatus::New,
                priority: Priority::Important,
                responsibles: responsibles.iter().map(|s| s.to_string()).collect(),
            },
        )
    }

    fn set_limits(&self, changes: LimitChanges) {
        limits::set(&self.conn, &self.owner, &changes).expect("set limits");
    }
}

fn subtask(budget: i64) -> NewSubTask {
    NewSubTask {
        title: "Piece of work".into(),
        description: None,
        story_points: 3,
        budget,
        status: TaskStatus::New,
    }
}

fn remaining(conn: &Connection, task_id: &str) -> i64 {
    let task = task_repo::get_task_by_id(conn, task_id).unwrap();
    budget::remaining_budget(conn, &task).unwrap()
}

fn reopen(path: &Path) -> Connection {
    connection::open_db(path).expect("open db")
}

// ─── budget ledger ─────────────────────────────────────────────────

#[test]
fn test_budget_allocation_sequence() {
    let db = TestDb::new();
    let project = db.project("Web");
    let task = db.task(&project, 100_000, &[]);

    budget::create_subtask(&db.conn, &db.owner, &task.id, &subtask(40_000)).unwrap();
    assert_eq!(remaining(&db.conn, &task.id), 60_000);

    let err = budget::create_subtask(&db.conn, &db.owner, &task.id, &subtask(70_000)).unwrap_err();
    assert_eq!(err.code, ErrorCode::BudgetExceeded);
    assert!(err.message.contains("700.00"), "{}", err.message);
    assert!(err.message.contains("600.00"), "{}", err.message);
    assert_eq!(remaining(&db.conn, &task.id), 60_000);
    assert_eq!(subtask_repo::list_subtasks(&db.conn, &task.id).unwrap().len(), 1);

    budget::create_subtask(&db.conn, &db.owner, &task.id, &subtask(60_000)).unwrap();
    assert_eq!(remaining(&db.conn, &task.id), 0);

    // A zero allocation still fits on an exhausted task.
    budget::create_subtask(&db.conn, &db.owner, &task.id, &subtask(0)).unwrap();
}

#[test]
fn test_negative_allocation_rejected() {
    let db = TestDb::new();
    let project = db.project("Web");
    let task = db.task(&project, 100_000, &[]);
    let err = budget::create_subtask(&db.conn, &db.owner, &task.id, &subtask(-1)).unwrap_err();
    assert_eq!(err.code, ErrorCode::ValidationError);
}

#[test]
fn test_update_excludes_own_allocation() {
    let db = TestDb::new();
    let project = db.project("Web");
    let task = db.task(&project, 100_000, &[]);
    let sub = budget::create_subtask(&db.conn, &db.owner, &task.id, &subtask(80_000)).unwrap();

    let grow = SubTaskChanges {
        budget: Some(100_000),
        ..Default::default()
    };
    budget::update_subtask(&db.conn, &db.owner, &sub.id, &grow).unwrap();
    assert_eq!(remaining(&db.conn, &task.id), 0);

    let too_much = SubTaskChanges {
        budget: Some(100_001),
        ..Default::default()
    };
    let err = budget::update_subtask(&db.conn, &db.owner, &sub.id, &too_much).unwrap_err();
    assert_eq!(err.code, ErrorCode::BudgetExceeded);
}

#[test]
fn test_spent_counts_completed_subtasks_only() {
    let db = TestDb::new();
    let project = db.project("Web");
    let task = db.task(&project, 100_000, &[]);
    let a = budget::create_subtask(&db.conn, &db.owner, &task.id, &subtask(30_000)).unwrap();
    budget::create_subtask(&db.conn, &db.owner, &task.id, &subtask(20_000)).unwrap();

    let done = SubTaskChanges {
        status: Some(TaskStatus::Completed),
        ..Default::default()
    };
    budget::update_subtask(&db.conn, &db.owner, &a.id, &done).unwrap();

    let task = task_repo::get_task_by_id(&db.conn, &task.id).unwrap();
    assert_eq!(budget::spent_budget(&db.conn, &task).unwrap(), 30_000);
    let summary = reporting::project_summary(&db.conn, &project).unwrap();
    assert_eq!(summary.spent_budget, 30_000);
    assert_eq!(summary.remaining_budget, 1_000_000 - 30_000);
}

#[test]
fn test_concurrent_allocations_cannot_overdraw() {
    let db = TestDb::new();
    let project = db.project("Web");
    let task = db.task(&project, 100_000, &[]);

    let barrier = Arc::new(Barrier::new(2));
    let handles: Vec<_> = (0..2)
        .map(|_| {
            let path = db.path.clone();
            let task_id = task.id.clone();
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                let conn = reopen(&path);
                let actor = Actor::load(&conn, "owner").unwrap();
                barrier.wait();
                budget::create_subtask(&conn, &actor, &task_id, &subtask(60_000))
            })
        })
        .collect();

    let results: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();
    let ok = results.iter().filter(|r| r.is_ok()).count();
    assert_eq!(ok, 1, "exactly one allocation should win");
    let failed = results.iter().find_map(|r| r.as_ref().err()).unwrap();
    assert_eq!(failed.code, ErrorCode::BudgetExceeded);
    assert_eq!(remaining(&db.conn, &task.id), 40_000);
}

#[test]
fn test_concurrent_budget_edits_cannot_overdraw() {
    let db = TestDb::new();
    let project = db.project("Web");
    let task = db.task(&project, 100_000, &[]);
    let first = budget::create_subtask(&db.conn, &db.owner, &task.id, &subtask(30_000)).unwrap();
    let second = budget::create_subtask(&db.conn, &db.owner, &task.id, &subtask(30_000)).unwrap();

    // Each edit fits on its own; together they would need 120000.
    let barrier = Arc::new(Barrier::new(2));
    let handles: Vec<_> = [first.id.clone(), second.id.clone()]
        .into_iter()
        .map(|sub_id| {
            let path = db.path.clone();
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                let conn = reopen(&path);
                let actor = Actor::load(&conn, "owner").unwrap();
                let grow = SubTaskChanges {
                    budget: Some(60_000),
                    ..Default::default()
                };
                barrier.wait();
                budget::update_subtask(&conn, &actor, &sub_id, &grow)
            })
        })
        .collect();

    let results: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();
    assert_eq!(results.iter().filter(|r| r.is_ok()).count(), 1);
    let failed = results.iter().find_map(|r| r.as_ref().err()).unwrap();
    assert_eq!(failed.code, ErrorCode::BudgetExceeded);

    let allocated = subtask_repo::list_subtasks(&db.conn, &task.id)
        .unwrap()
        .iter()
        .map(|s| s.budget)
        .sum::<i64>();
    assert_eq!(allocated, 90_000);
    assert_eq!(remaining(&db.conn, &task.id), 10_000);
}

#[test]
fn test_responsible_user_may_add_subtasks() {
    let db = TestDb::new();
    let bob = db.user("bob", Role::Normal);
    let carol = db.user("carol", Role::Normal);
    let project = db.project("Web");
    let task = db.task(&project, 100_000, &["bob"]);

    budget::create_subtask(&db.conn, &bob, &task.id, &subtask(10_000)).unwrap();
    let err = budget::create_subtask(&db.conn, &carol, &task.id, &subtask(10_000)).unwrap_err();
    assert_eq!(err.code, ErrorCode::PermissionDenied);
}

// ─── progress ──────────────────────────────────────────────────────

#[test]
fn test_progress_follows_subtasks() {
    let db = TestDb::new();
    let project = db.project("Web");
    let task = db.task(&project, 100_000, &[]);
    let subs: Vec<_> = (0..3)
        .map(|_| budget::create_subtask(&db.conn, &db.owner, &task.id, &subtask(0)).unwrap())
        .collect();

    let done = SubTaskChanges {
        status: Some(TaskStatus::Completed),
        ..Default::default()
    };
    let mut seen = Vec::new();
    for sub in &subs {
        budget::update_subtask(&db.conn, &db.owner, &sub.id, &done).unwrap();
        let task = task_repo::get_task_by_id(&db.conn, &task.id).unwrap();
        seen.push(progress::progress_pct(&db.conn, &task).unwrap());
    }
    assert_eq!(seen, vec![33, 67, 100]);
}

#[test]
fn test_progress_without_subtasks_uses_status() {
    let db = TestDb::new();
    let project = db.project("Web");
    let task = db.task(&project, 0, &[]);
    let moved = workflow::change_status(&db.conn, &db.owner, &task.id, TaskStatus::InProgress, None).unwrap();
    assert_eq!(moved.progress_pct, 50);
}

// ─── workflow ──────────────────────────────────────────────────────

#[test]
fn test_normal_user_walks_forward() {
    let db = TestDb::new();
    let bob = db.user("bob", Role::Normal);
    let project = db.project("Web");
    let task = db.task(&project, 0, &["bob"]);

    workflow::change_status(&db.conn, &bob, &task.id, TaskStatus::InProgress, None).unwrap();
    let err = workflow::change_status(&db.conn, &bob, &task.id, TaskStatus::New, Some("oops")).unwrap_err();
    assert_eq!(err.code, ErrorCode::PermissionDenied);
    workflow::change_status(&db.conn, &bob, &task.id, TaskStatus::Completed, None).unwrap();

    let logs = status_log_repo::list_logs(&db.conn, &task.id).unwrap();
    assert_eq!(logs.len(), 2);
    assert_eq!(logs[0].to_status, TaskStatus::Completed);
}

#[test]
fn test_non_responsible_user_rejected() {
    let db = TestDb::new();
    db.user("bob", Role::Normal);
    let carol = db.user("carol", Role::Normal);
    let project = db.project("Web");
    let task = db.task(&project, 0, &["bob"]);

    let err = workflow::change_status(&db.conn, &carol, &task.id, TaskStatus::InProgress, None).unwrap_err();
    assert_eq!(err.code, ErrorCode::PermissionDenied);
    let task = task_repo::get_task_by_id(&db.conn, &task.id).unwrap();
    assert_eq!(task.status, TaskStatus::New);
}

#[test]
fn test_admin_regression_needs_comment_and_logs_once() {
    let db = TestDb::new();
    let lead = db.user("lead", Role::Leader);
    let project = db.project("Web");
    let task = db.task(&project, 0, &[]);
    workflow::change_status(&db.conn, &lead, &task.id, TaskStatus::Completed, None).unwrap();

    let err = workflow::change_status(&db.conn, &lead, &task.id, TaskStatus::InProgress, None).unwrap_err();
    assert_eq!(err.code, ErrorCode::ValidationError);
    assert_eq!(status_log_repo::list_logs(&db.conn, &task.id).unwrap().len(), 1);

    let moved = workflow::change_status(
        &db.conn,
        &lead,
        &task.id,
        TaskStatus::InProgress,
        Some("tests missing"),
    )
    .unwrap();
    assert_eq!(moved.direction, workflow::Direction::Regression);

    let logs = status_log_repo::list_logs(&db.conn, &task.id).unwrap();
    assert_eq!(logs.len(), 2);
    assert_eq!(logs[0].from_status, TaskStatus::Completed);
    assert_eq!(logs[0].to_status, TaskStatus::InProgress);
    assert_eq!(logs[0].comment, "tests missing");
    assert_eq!(logs[0].actor.as_deref(), Some("lead"));
}

// ─── plan limits ───────────────────────────────────────────────────

#[test]
fn test_project_limit_blocks_at_ceiling() {
    let db = TestDb::new();
    db.set_limits(LimitChanges {
        max_projects: Some(2),
        ..Default::default()
    });
    db.project("One");
    db.project("Two");

    let err = projects::add_project(
        &db.conn,
        &db.owner,
        &project_repo::NewProject {
            name: "Three",
            description: None,
            budget: 0,
            start_date: None,
            end_date: None,
        },
    )
    .unwrap_err();
    assert_eq!(err.code, ErrorCode::LimitExceeded);
    assert_eq!(project_repo::count_projects(&db.conn).unwrap(), 2);
}

#[test]
fn test_task_limit_per_project_scope() {
    let db = TestDb::new();
    db.set_limits(LimitChanges {
        max_tasks: Some(1),
        ..Default::default()
    });
    let a = db.project("A");
    let b = db.project("B");
    let config = Config {
        task_limit_scope: TaskLimitScope::Project,
        ..Default::default()
    };

    db.task_with(&config, &a, 0, &[]).unwrap();
    let err = db.task_with(&config, &a, 0, &[]).unwrap_err();
    assert_eq!(err.code, ErrorCode::LimitExceeded);
    db.task_with(&config, &b, 0, &[]).unwrap();

    let err = db.task_with(&Config::default(), &b, 0, &[]).unwrap_err();
    assert_eq!(err.code, ErrorCode::LimitExceeded);
}

#[test]
fn test_admin_tier_excludes_owner() {
    let db = TestDb::new();
    db.set_limits(LimitChanges {
        max_admins: Some(1),
        max_users: Some(1),
        ..Default::default()
    });
    db.user("lead", Role::Leader);
    let err = users::add_user(&db.conn, &db.owner, "scrum", None, Role::Scrum).unwrap_err();
    assert_eq!(err.code, ErrorCode::LimitExceeded);

    db.user("bob", Role::Normal);
    let err = users::add_user(&db.conn, &db.owner, "carol", None, Role::Normal).unwrap_err();
    assert_eq!(err.code, ErrorCode::LimitExceeded);

    // Promoting bob would need a second elevated seat.
    let err = users::set_role(&db.conn, &db.owner, "bob", Role::Admin).unwrap_err();
    assert_eq!(err.code, ErrorCode::LimitExceeded);
    // Moving within a tier consumes nothing.
    users::set_role(&db.conn, &db.owner, "lead", Role::Scrum).unwrap();
}

#[test]
fn test_tier_counts_skip_owner_and_edited_user() {
    let db = TestDb::new();
    db.user("lead", Role::Leader);
    db.user("sm", Role::Scrum);
    db.user("bob", Role::Normal);

    let elevated = limiter::tier_roles(true);
    assert_eq!(user_repo::count_with_roles(&db.conn, &elevated, None).unwrap(), 2);
    assert_eq!(user_repo::count_with_roles(&db.conn, &elevated, Some("LEAD")).unwrap(), 1);
    let normal = limiter::tier_roles(false);
    assert_eq!(user_repo::count_with_roles(&db.conn, &normal, None).unwrap(), 1);
}

#[test]
fn test_file_limit_counts_whole_batch() {
    let db = TestDb::new();
    db.set_limits(LimitChanges {
        max_files: Some(2),
        ..Default::default()
    });
    let project = db.project("Web");
    let task = db.task(&project, 0, &[]);
    let sub = budget::create_subtask(&db.conn, &db.owner, &task.id, &subtask(0)).unwrap();
    let config = Config::default();
    let files = |names: &[&str]| names.iter().map(|s| s.to_string()).collect::<Vec<_>>();

    let err = subtasks::attach(&db.conn, &db.owner, &config, &sub.id, &files(&["a.pdf", "b.pdf", "c.pdf"]), None)
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::LimitExceeded);
    assert_eq!(subtask_repo::count_attachments(&db.conn).unwrap(), 0);

    subtasks::attach(&db.conn, &db.owner, &config, &sub.id, &files(&["a.pdf", "b.png"]), None).unwrap();
    let err = subtasks::attach(&db.conn, &db.owner, &config, &sub.id, &files(&["c.pdf"]), None).unwrap_err();
    assert_eq!(err.code, ErrorCode::LimitExceeded);

    let err = subtasks::attach(&db.conn, &db.owner, &config, &sub.id, &files(&["run.exe"]), None).unwrap_err();
    assert_eq!(err.code, ErrorCode::ValidationError);
}

#[test]
fn test_only_owner_sets_limits() {
    let db = TestDb::new();
    let lead = db.user("lead", Role::Admin);
    let err = limits::set(
        &db.conn,
        &lead,
        &LimitChanges {
            max_projects: Some(100),
            ..Default::default()
        },
    )
    .unwrap_err();
    assert_eq!(err.code, ErrorCode::PermissionDenied);
}

// ─── records ───────────────────────────────────────────────────────

#[test]
fn test_owner_is_protected() {
    let db = TestDb::new();
    let admin = db.user("admin2", Role::Admin);
    let err = users::remove_user(&db.conn, &admin, "owner").unwrap_err();
    assert_eq!(err.code, ErrorCode::PermissionDenied);
    let err = users::set_role(&db.conn, &admin, "owner", Role::Normal).unwrap_err();
    assert_eq!(err.code, ErrorCode::PermissionDenied);
}

#[test]
fn test_delete_project_cascades() {
    let db = TestDb::new();
    let project = db.project("Web");
    let task = db.task(&project, 100_000, &[]);
    let sub = budget::create_subtask(&db.conn, &db.owner, &task.id, &subtask(10_000)).unwrap();
    workflow::change_status(&db.conn, &db.owner, &task.id, TaskStatus::InProgress, None).unwrap();

    projects::delete_project(&db.conn, &db.owner, &project).unwrap();
    assert_eq!(
        task_repo::get_task_by_id(&db.conn, &task.id).unwrap_err().code,
        ErrorCode::NotFound
    );
    assert_eq!(
        subtask_repo::get_subtask_by_id(&db.conn, &sub.id).unwrap_err().code,
        ErrorCode::NotFound
    );
    assert!(status_log_repo::list_logs(&db.conn, &task.id).unwrap().is_empty());
}

#[test]
fn test_delete_sprint_detaches_tasks() {
    let db = TestDb::new();
    let project = db.project("Web");
    let sprint = projects::add_sprint(&db.conn, &db.owner, &project, "Sprint 1", None, None).unwrap();
    let task = tasks::add_task(
        &db.conn,
        &db.owner,
        &Config::default(),
        &TaskInput {
            project: project.clone(),
            sprint: Some(sprint.id.clone()),
            epic: None,
            title: "Sprint work".into(),
            description: None,
            kpis: None,
            story_points: 3,
            budget: 0,
            status: TaskStatus::New,
            priority: Priority::Urgent,
            responsibles: vec![],
        },
    )
    .unwrap();
    assert_eq!(task.sprint_id.as_deref(), Some(sprint.id.as_str()));

    projects::delete_sprint(&db.conn, &db.owner, &sprint.id).unwrap();
    let task = task_repo::get_task_by_id(&db.conn, &task.id).unwrap();
    assert_eq!(task.sprint_id, None);
}

#[test]
fn test_sprint_from_other_project_rejected() {
    let db = TestDb::new();
    let a = db.project("A");
    let b = db.project("B");
    let sprint = projects::add_sprint(&db.conn, &db.owner, &b, "Sprint 1", None, None).unwrap();
    let err = tasks::add_task(
        &db.conn,
        &db.owner,
        &Config::default(),
        &TaskInput {
            project: a,
            sprint: Some(sprint.id),
            epic: None,
            title: "Mismatch".into(),
            description: None,
            kpis: None,
            story_points: 3,
            budget: 0,
            status: TaskStatus::New,
            priority: Priority::Other,
            responsibles: vec![],
        },
    )
    .unwrap_err();
    assert_eq!(err.code, ErrorCode::ValidationError);
}

#[test]
fn test_normal_user_sees_only_own_tasks() {
    let db = TestDb::new();
    let bob = db.user("bob", Role::Normal);
    db.user("carol", Role::Normal);
    let project = db.project("Web");
    let mine = db.task(&project, 0, &["bob"]);
    db.task(&project, 0, &["carol"]);

    let visible = tasks::list_tasks(&db.conn, &bob, &Default::default()).unwrap();
    assert_eq!(visible.len(), 1);
    assert_eq!(visible[0].task.id, mine.id);
    assert_eq!(tasks::list_tasks(&db.conn, &db.owner, &Default::default()).unwrap().len(), 2);
}

#[test]
fn test_export_groups_by_priority() {
    let db = TestDb::new();
    let project = db.project("Web");
    db.task(&project, 0, &[]);
    let buckets = reporting::export_snapshot(&db.conn, &Default::default()).unwrap();
    let order: Vec<_> = buckets.iter().map(|b| b.priority).collect();
    assert_eq!(
        order,
        vec![Priority::Urgent, Priority::Important, Priority::NotUrgent, Priority::Other]
    );
    assert_eq!(buckets[1].tasks.len(), 1);
    assert!(buckets[0].tasks.is_empty());
}

#[test]
fn test_responsible_filter_ignores_case() {
    let db = TestDb::new();
    let bob = db.user("bob", Role::Normal);
    let project = db.project("Web");
    let task = db.task(&project, 0, &["BOB"]);
    db.task(&project, 0, &[]);

    let filter = task_repo::TaskFilter {
        responsible: Some("Bob".into()),
        ..Default::default()
    };
    let listed = tasks::list_tasks(&db.conn, &db.owner, &filter).unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].task.id, task.id);

    let buckets = reporting::export_snapshot(&db.conn, &filter).unwrap();
    let exported: usize = buckets.iter().map(|b| b.tasks.len()).sum();
    assert_eq!(exported, 1);

    assert_eq!(tasks::list_tasks(&db.conn, &bob, &Default::default()).unwrap().len(), 1);
    tasks::show_task(&db.conn, &bob, &task.id).unwrap();
}

#[test]
fn test_export_filtered_by_sprint() {
    let db = TestDb::new();
    let project = db.project("Web");
    let sprint = projects::add_sprint(&db.conn, &db.owner, &project, "Sprint 1", None, None).unwrap();
    let planned = tasks::add_task(
        &db.conn,
        &db.owner,
        &Config::default(),
        &TaskInput {
            project: project.clone(),
            sprint: Some(sprint.id.clone()),
            epic: None,
            title: "Sprint work".into(),
            description: None,
            kpis: None,
            story_points: 3,
            budget: 0,
            status: TaskStatus::New,
            priority: Priority::Urgent,
            responsibles: vec![],
        },
    )
    .unwrap();
    db.task(&project, 0, &[]);

    let filter = task_repo::TaskFilter {
        sprint_id: Some(sprint.id.clone()),
        ..Default::default()
    };
    let buckets = reporting::export_snapshot(&db.conn, &filter).unwrap();
    assert_eq!(buckets[0].tasks.len(), 1);
    assert_eq!(buckets[0].tasks[0].task.id, planned.id);
    assert!(buckets[1].tasks.is_empty());
}

#[test]
fn test_status_log_rows_cannot_be_edited() {
    let db = TestDb::new();
    let project = db.project("Web");
    let task = db.task(&project, 0, &[]);
    workflow::change_status(&db.conn, &db.owner, &task.id, TaskStatus::InProgress, Some("started")).unwrap();

    let result = db.conn.execute("UPDATE status_logs SET comment = 'rewritten'", []);
    assert!(result.is_err());

    let logs = status_log_repo::list_logs(&db.conn, &task.id).unwrap();
    assert_eq!(logs.len(), 1);
    assert_eq!(logs[0].comment, "started");
}

// ─── dailies ───────────────────────────────────────────────────────

fn at(date: (i32, u32, u32), time: (u32, u32, u32)) -> chrono::NaiveDateTime {
    NaiveDate::from_ymd_opt(date.0, date.1, date.2)
        .unwrap()
        .and_hms_opt(time.0, time.1, time.2)
        .unwrap()
}

#[test]
fn test_daily_report_flags_late_submissions() {
    let db = TestDb::new();
    let lead = db.user("lead", Role::Scrum);
    dailies::add_daily(&db.conn, &lead, "wrote code", "review", None, Some(at((2024, 3, 4), (7, 30, 0)))).unwrap();
    dailies::add_daily(&db.conn, &lead, "review", "deploy", Some("CI down"), Some(at((2024, 3, 5), (9, 0, 1))))
        .unwrap();

    let window = Config::default().daily_window().unwrap();
    let report = reporting::daily_report(&db.conn, &DailyFilter::default(), &window).unwrap();
    assert_eq!(report.stats.total, 2);
    assert_eq!(report.stats.on_time, 1);
    assert_eq!(report.stats.late, 1);
    let late = report.entries.iter().find(|e| !e.on_time).unwrap();
    assert_eq!(late.daily.date, "2024-03-05");
    assert_eq!(late.daily.impediment, "CI down");
}

#[test]
fn test_normal_user_cannot_backdate() {
    let db = TestDb::new();
    let bob = db.user("bob", Role::Normal);
    let err = dailies::add_daily(&db.conn, &bob, "a", "b", None, Some(at((2024, 3, 4), (7, 0, 0)))).unwrap_err();
    assert_eq!(err.code, ErrorCode::PermissionDenied);
    dailies::add_daily(&db.conn, &bob, "a", "b", None, None).unwrap();
}

#[test]
fn test_daily_scope_and_range_delete() {
    let db = TestDb::new();
    let bob = db.user("bob", Role::Normal);
    for day in 1..=3 {
        dailies::add_daily(&db.conn, &db.owner, "x", "y", None, Some(at((2024, 3, day), (7, 0, 0)))).unwrap();
    }
    dailies::add_daily(&db.conn, &bob, "x", "y", None, None).unwrap();

    let own = dailies::scoped_filter(&bob, &DailyFilter::default()).unwrap();
    assert_eq!(own.username.as_deref(), Some("bob"));

    let err = dailies::bulk_delete(
        &db.conn,
        &bob,
        &BulkDelete::Range {
            from: "2024-03-01".into(),
            to: "2024-03-02".into(),
            username: None,
        },
    )
    .unwrap_err();
    assert_eq!(err.code, ErrorCode::PermissionDenied);

    let deleted = dailies::bulk_delete(
        &db.conn,
        &db.owner,
        &BulkDelete::Range {
            from: "2024-03-01".into(),
            to: "2024-03-02".into(),
            username: None,
        },
    )
    .unwrap();
    assert_eq!(deleted, 2);
}

#[test]
fn test_availability_requires_ordered_range() {
    let db = TestDb::new();
    let bob = db.user("bob", Role::Normal);
    let err = dailies::add_availability(&db.conn, &bob, "Vacation", None, "2024-03-05 10:00", "2024-03-05 09:00", None)
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::ValidationError);

    let entry =
        dailies::add_availability(&db.conn, &bob, "Vacation", None, "2024-03-05 09:00", "2024-03-06 18:00", None)
            .unwrap();
    let carol = db.user("carol", Role::Normal);
    let err = dailies::remove_availability(&db.conn, &carol, &entry.id).unwrap_err();
    assert_eq!(err.code, ErrorCode::PermissionDenied);
    dailies::remove_availability(&db.conn, &bob, &entry.id).unwrap();
}
