use crate::db::task_repo::StatusCounts;
use crate::engine::reporting::{DailyReport, PriorityBucket, ProjectSummary, TaskSnapshot};
use crate::engine::workflow::Transition;
use crate::models::money::format_amount;
use crate::models::{Attachment, Availability, Daily, PlanLimits, Project, StatusLog, SubTask, SubTaskComment, User};

fn short(id: &str) -> &str {
    &id[..std::cmp::min(8, id.len())]
}

pub fn print_user(u: &User) {
    let owner = if u.superuser { " (owner)" } else { "" };
    match u.display_name {
        Some(ref name) => println!("  {} [{}]{owner} - {name}", u.username, u.role.as_str()),
        None => println!("  {} [{}]{owner}", u.username, u.role.as_str()),
    }
}

pub fn print_user_list(users: &[User]) {
    if users.is_empty() {
        println!("No users found.");
        return;
    }
    for u in users {
        print_user(u);
    }
}

pub fn print_limits(l: &PlanLimits) {
    println!("Plan limits:");
    println!("  max_admins:   {}", l.max_admins);
    println!("  max_users:    {}", l.max_users);
    println!("  max_projects: {}", l.max_projects);
    println!("  max_tasks:    {}", l.max_tasks);
    println!("  max_files:    {}", l.max_files);
}

pub fn print_project_list(projects: &[Project]) {
    if projects.is_empty() {
        println!("No projects found.");
        return;
    }
    for p in projects {
        println!("  {} ({}) budget={}", p.name, short(&p.id), format_amount(p.budget));
    }
}

fn print_counts(c: &StatusCounts) {
    println!(
        "  Tasks: {} (new={} in_progress={} completed={})",
        c.total, c.new, c.in_progress, c.completed
    );
}

pub fn print_project_summary(s: &ProjectSummary) {
    println!("Project: {} ({})", s.project.name, s.project.id);
    if let Some(ref desc) = s.project.description {
        println!("  Description: {desc}");
    }
    if let (Some(start), Some(end)) = (&s.project.start_date, &s.project.end_date) {
        println!("  Dates: {start} .. {end}");
    }
    if !s.members.is_empty() {
        println!("  Members: {}", s.members.join(", "));
    }
    print_counts(&s.tasks);
    println!("  Progress: {}%", s.progress_pct);
    println!(
        "  Budget: {} (spent {}, remaining {})",
        format_amount(s.budget),
        format_amount(s.spent_budget),
        format_amount(s.remaining_budget)
    );
}

pub fn print_task(t: &TaskSnapshot) {
    let task = &t.task;
    println!("Task: {} ({})", task.title, task.id);
    if let Some(ref desc) = task.description {
        println!("  Description: {desc}");
    }
    if let Some(ref kpis) = task.kpis {
        println!("  KPIs: {kpis}");
    }
    println!("  Status: {}", task.status.as_str());
    println!("  Priority: {}", task.priority.as_str());
    println!("  Story points: {}", task.story_points);
    println!("  Progress: {}%", t.progress_pct);
    println!(
        "  Budget: {} (remaining {}, spent {})",
        format_amount(task.budget),
        format_amount(t.remaining_budget),
        format_amount(t.spent_budget)
    );
    if !task.responsibles.is_empty() {
        println!("  Responsible: {}", task.responsibles.join(", "));
    }
}

pub fn print_task_list(tasks: &[TaskSnapshot]) {
    if tasks.is_empty() {
        println!("No tasks found.");
        return;
    }
    for t in tasks {
        let task = &t.task;
        println!(
            "  [{}] {} ({}) {} {}% remaining={}",
            task.status.as_str(),
            task.title,
            short(&task.id),
            task.priority.as_str(),
            t.progress_pct,
            format_amount(t.remaining_budget)
        );
    }
}

pub fn print_subtask(s: &SubTask) {
    println!(
        "  [{}] {} ({}) sp={} budget={}",
        s.status.as_str(),
        s.title,
        short(&s.id),
        s.story_points,
        format_amount(s.budget)
    );
}

pub fn print_comments(comments: &[SubTaskComment]) {
    for c in comments {
        println!("  {} {}: {}", c.created_at, c.author.as_deref().unwrap_or("-"), c.text);
    }
}

pub fn print_attachments(files: &[Attachment]) {
    for a in files {
        match a.label {
            Some(ref label) => println!("  {} ({}) - {label}", a.file_name, short(&a.id)),
            None => println!("  {} ({})", a.file_name, short(&a.id)),
        }
    }
}

pub fn print_history(logs: &[StatusLog]) {
    if logs.is_empty() {
        println!("No status changes.");
        return;
    }
    for l in logs {
        let comment = if l.comment.is_empty() {
            String::new()
        } else {
            format!(" \"{}\"", l.comment)
        };
        println!(
            "  {} {} -> {} by {}{comment}",
            l.created_at,
            l.from_status.as_str(),
            l.to_status.as_str(),
            l.actor.as_deref().unwrap_or("-")
        );
    }
}

pub fn print_transition(t: &Transition) {
    println!(
        "Task {}: {} -> {} ({}%)",
        short(&t.task_id),
        t.from.as_str(),
        t.to.as_str(),
        t.progress_pct
    );
}

pub fn print_export(buckets: &[PriorityBucket]) {
    for b in buckets {
        println!("{} ({})", b.priority.as_str(), b.tasks.len());
        for t in &b.tasks {
            println!(
                "  [{}] {} ({}) {}% remaining={}",
                t.task.status.as_str(),
                t.task.title,
                short(&t.task.id),
                t.progress_pct,
                format_amount(t.remaining_budget)
            );
        }
    }
}

pub fn print_daily(d: &Daily) {
    println!("{} {} ({})", d.date, d.username, d.submitted_at);
    println!("  Yesterday: {}", d.yesterday);
    println!("  Today: {}", d.today);
    if !d.impediment.is_empty() {
        println!("  Impediment: {}", d.impediment);
    }
}

pub fn print_daily_report(r: &DailyReport) {
    if r.entries.is_empty() {
        println!("No dailies found.");
        return;
    }
    for e in &r.entries {
        let mark = if e.on_time { "on time" } else { "late" };
        println!(
            "  {} {} ({}) {} [{mark}]",
            e.daily.date,
            e.daily.username,
            short(&e.daily.id),
            e.daily.submitted_at
        );
    }
    println!(
        "Total: {} on time: {} late: {}",
        r.stats.total, r.stats.on_time, r.stats.late
    );
}

pub fn print_availability_list(entries: &[Availability]) {
    if entries.is_empty() {
        println!("No availability entries.");
        return;
    }
    for a in entries {
        println!(
            "  {} {} .. {} {} ({})",
            a.username,
            a.start_at,
            a.end_at,
            a.title,
            short(&a.id)
        );
    }
}
