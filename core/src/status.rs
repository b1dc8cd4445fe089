//! Display status derivation.
//!
//! Overdue state is never stored: callers pass the current instant on every
//! render so an open dashboard picks up newly overdue tasks without a fetch.

use chrono::{DateTime, Utc};

use crate::model::task::{Task, TaskStatus};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BadgeKind {
    Overdue,
    Completed,
    InProgress,
    Pending,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DisplayBadge {
    pub kind: BadgeKind,
    pub label: &'static str,
}

pub fn is_overdue(deadline: DateTime<Utc>, status: TaskStatus, now: DateTime<Utc>) -> bool {
    deadline < now && status != TaskStatus::Completed
}

/// Overdue wins over the underlying status, except for completed tasks.
pub fn display_badge(status: TaskStatus, overdue: bool) -> DisplayBadge {
    if overdue && status != TaskStatus::Completed {
        return DisplayBadge {
            kind: BadgeKind::Overdue,
            label: "OVERDUE",
        };
    }
    match status {
        TaskStatus::Completed => DisplayBadge {
            kind: BadgeKind::Completed,
            label: "Completed",
        },
        TaskStatus::InProgress => DisplayBadge {
            kind: BadgeKind::InProgress,
            label: "In Progress",
        },
        TaskStatus::Pending => DisplayBadge {
            kind: BadgeKind::Pending,
            label: "Pending",
        },
    }
}

pub fn task_is_overdue(task: &Task, now: DateTime<Utc>) -> bool {
    is_overdue(task.deadline, task.status, now)
}

pub fn task_badge(task: &Task, now: DateTime<Utc>) -> DisplayBadge {
    display_badge(task.status, task_is_overdue(task, now))
}
