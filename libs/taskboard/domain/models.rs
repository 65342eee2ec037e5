//! Board entities as the REST API and the realtime channel exchange them

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A user who can be a board member, a task assignee or a mention target
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    #[serde(alias = "_id")]
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,
}

impl User {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            email: None,
            avatar: None,
        }
    }
}

/// Board members are plain users
pub type Member = User;

/// Top-level container of columns and members
///
/// `columns` holds column ids in display order. `members` holds user ids and
/// is kept free of duplicates by [`Board::add_member`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Board {
    #[serde(alias = "_id")]
    pub id: String,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub background: Option<String>,
    #[serde(default)]
    pub columns: Vec<String>,
    #[serde(default)]
    pub members: Vec<String>,
}

impl Board {
    pub fn new(id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            background: None,
            columns: Vec::new(),
            members: Vec::new(),
        }
    }

    /// Returns false when the user was already a member
    pub fn add_member(&mut self, user_id: &str) -> bool {
        if self.has_member(user_id) {
            return false;
        }
        self.members.push(user_id.to_string());
        true
    }

    pub fn remove_member(&mut self, user_id: &str) -> bool {
        let before = self.members.len();
        self.members.retain(|id| id != user_id);
        self.members.len() != before
    }

    pub fn has_member(&self, user_id: &str) -> bool {
        self.members.iter().any(|id| id == user_id)
    }

    /// Drop repeated member ids, keeping first occurrences in order
    pub fn dedup_members(&mut self) {
        let mut seen = std::collections::HashSet::new();
        self.members.retain(|id| seen.insert(id.clone()));
    }
}

/// An ordered lane of tasks on one board
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Column {
    #[serde(alias = "_id")]
    pub id: String,
    #[serde(alias = "board")]
    pub board_id: String,
    pub title: String,
    #[serde(default)]
    pub tasks: Vec<String>,
}

impl Column {
    pub fn new(id: impl Into<String>, board_id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            board_id: board_id.into(),
            title: title.into(),
            tasks: Vec::new(),
        }
    }

    pub fn contains_task(&self, task_id: &str) -> bool {
        self.tasks.iter().any(|id| id == task_id)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum TaskStatus {
    #[default]
    Todo,
    InProgress,
    Review,
    Done,
}

impl TaskStatus {
    /// Display order used by board views and analytics series
    pub const ALL: [TaskStatus; 4] = [
        TaskStatus::Todo,
        TaskStatus::InProgress,
        TaskStatus::Review,
        TaskStatus::Done,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            TaskStatus::Todo => "todo",
            TaskStatus::InProgress => "in-progress",
            TaskStatus::Review => "review",
            TaskStatus::Done => "done",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            TaskStatus::Todo => "To Do",
            TaskStatus::InProgress => "In Progress",
            TaskStatus::Review => "Review",
            TaskStatus::Done => "Done",
        }
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Low,
    #[default]
    Medium,
    High,
    Urgent,
}

impl Priority {
    pub const ALL: [Priority; 4] = [Priority::Low, Priority::Medium, Priority::High, Priority::Urgent];

    pub fn as_str(&self) -> &'static str {
        match self {
            Priority::Low => "low",
            Priority::Medium => "medium",
            Priority::High => "high",
            Priority::Urgent => "urgent",
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A unit of work; lives in exactly one column
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    #[serde(alias = "_id")]
    pub id: String,
    #[serde(alias = "column")]
    pub column_id: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub status: TaskStatus,
    #[serde(default)]
    pub priority: Priority,
    /// Assigned user ids
    #[serde(default)]
    pub assignees: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub due_date: Option<DateTime<Utc>>,
}

impl Task {
    pub fn new(id: impl Into<String>, column_id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            column_id: column_id.into(),
            title: title.into(),
            description: String::new(),
            status: TaskStatus::default(),
            priority: Priority::default(),
            assignees: Vec::new(),
            due_date: None,
        }
    }

    pub fn is_done(&self) -> bool {
        self.status == TaskStatus::Done
    }

    /// Past its due date and not done
    pub fn is_overdue(&self, now: DateTime<Utc>) -> bool {
        !self.is_done() && self.due_date.map(|due| due < now).unwrap_or(false)
    }
}

/// A message for one recipient; only the read flag changes client-side
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    #[serde(alias = "_id")]
    pub id: String,
    #[serde(alias = "user")]
    pub recipient: String,
    pub message: String,
    #[serde(default)]
    pub read: bool,
    pub created_at: DateTime<Utc>,
}
