//! Request bodies for the board API

use crate::domain::{Priority, TaskStatus};
use chrono::{DateTime, Utc};
use serde::Serialize;

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewBoard {
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub background: Option<String>,
}

impl NewBoard {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            background: None,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BoardUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub background: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewColumn {
    pub title: String,
}

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ColumnUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// Full task order for the column
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tasks: Option<Vec<String>>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewTask {
    pub column_id: String,
    pub title: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub description: String,
    pub status: TaskStatus,
    pub priority: Priority,
    pub assignees: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub due_date: Option<DateTime<Utc>>,
}

impl NewTask {
    pub fn new(column_id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            column_id: column_id.into(),
            title: title.into(),
            description: String::new(),
            status: TaskStatus::default(),
            priority: Priority::default(),
            assignees: Vec::new(),
            due_date: None,
        }
    }
}

/// Partial task update; `column_id` plus `position` moves the task
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<TaskStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub priority: Option<Priority>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub assignees: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub due_date: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub column_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub position: Option<usize>,
}

impl TaskUpdate {
    pub fn move_to(column_id: impl Into<String>, position: usize) -> Self {
        Self {
            column_id: Some(column_id.into()),
            position: Some(position),
            ..Default::default()
        }
    }

    pub fn is_move(&self) -> bool {
        self.column_id.is_some()
    }
}

/// Body of `POST /boards/:id/members`; identify the user by id or email
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AddMember {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

impl AddMember {
    pub fn by_id(user_id: impl Into<String>) -> Self {
        Self {
            user_id: Some(user_id.into()),
            email: None,
        }
    }

    pub fn by_email(email: impl Into<String>) -> Self {
        Self {
            user_id: None,
            email: Some(email.into()),
        }
    }
}
