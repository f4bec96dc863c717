use std::fmt::Write as _;

use chrono::NaiveDate;

use crate::model::{Task, TaskId, TaskStats};

const SHORT_ID_LEN: usize = 8;

pub fn short_id(id: &TaskId) -> &str {
    let raw = id.as_str();
    match raw.char_indices().nth(SHORT_ID_LEN) {
        Some((idx, _)) => &raw[..idx],
        None => raw,
    }
}

pub fn stats_line(stats: &TaskStats) -> String {
    format!(
        "{} task{}: {} completed, {} pending",
        stats.total,
        if stats.total == 1 { "" } else { "s" },
        stats.completed,
        stats.pending
    )
}

/// Human-friendly date, e.g. `Mar 5, 2024`.
pub fn short_date(date: NaiveDate) -> String {
    date.format("%b %-d, %Y").to_string()
}

fn due_label(task: &Task, today: NaiveDate) -> String {
    match task.due_date {
        Some(due) if task.is_overdue(today) => format!("{} OVERDUE", due.format("%Y-%m-%d")),
        Some(due) => due.format("%Y-%m-%d").to_string(),
        None => "-".to_string(),
    }
}

pub fn task_line(task: &Task, today: NaiveDate) -> String {
    format!(
        "[{}] {:<8}  {:<7}  {:<6}  {:<18}  {}",
        if task.completed { "x" } else { " " },
        short_id(&task.id),
        task.priority.label(),
        task.color.label(),
        due_label(task, today),
        task.title
    )
}

pub fn task_detail(task: &Task, today: NaiveDate) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{}", task.title);
    let _ = writeln!(out, "  id:        {}", task.id);
    let _ = writeln!(
        out,
        "  status:    {}",
        if task.completed { "completed" } else { "pending" }
    );
    let _ = writeln!(
        out,
        "  priority:  {} ({}, {} tier)",
        task.priority.label(),
        task.priority,
        task.priority.tier().as_str()
    );
    let _ = writeln!(out, "  color:     {} ({})", task.color, task.color.hex());
    match task.due_date {
        Some(due) if task.is_overdue(today) => {
            let _ = writeln!(out, "  due:       {} (overdue)", short_date(due));
        }
        Some(due) => {
            let _ = writeln!(out, "  due:       {}", short_date(due));
        }
        None => {
            let _ = writeln!(out, "  due:       -");
        }
    }
    let _ = writeln!(
        out,
        "  created:   {}",
        task.created_at.format("%Y-%m-%d %H:%M UTC")
    );
    if let Some(description) = task.description.as_deref().filter(|d| !d.trim().is_empty()) {
        let _ = writeln!(out);
        for line in description.lines() {
            let _ = writeln!(out, "  {}", line);
        }
    }
    out
}
