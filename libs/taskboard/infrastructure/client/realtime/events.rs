//! Envelopes broadcast on the board channel
//!
//! Every frame is `{"type": "<event>", "data": {...}}`. Types the client
//! understands become [`BoardEvent`]s; everything else is kept as raw JSON.

use crate::domain::{Board, Column, Notification, Task, User};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::warn;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EntityRef {
    #[serde(alias = "_id")]
    pub id: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ColumnRef {
    #[serde(alias = "_id")]
    pub id: String,
    #[serde(alias = "board")]
    pub board_id: String,
}

/// Payload of `task:moved`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskMove {
    #[serde(alias = "id")]
    pub task_id: String,
    pub column_id: String,
    /// Index in the target column; appended when absent
    #[serde(default)]
    pub position: Option<usize>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MemberAdded {
    pub board_id: String,
    pub user: User,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MemberRemoved {
    pub board_id: String,
    pub user_id: String,
}

/// A change another client made to shared board state
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum BoardEvent {
    #[serde(rename = "board:updated")]
    BoardUpdated(Board),
    #[serde(rename = "board:deleted")]
    BoardDeleted(EntityRef),
    #[serde(rename = "column:created")]
    ColumnCreated(Column),
    #[serde(rename = "column:updated")]
    ColumnUpdated(Column),
    #[serde(rename = "column:deleted")]
    ColumnDeleted(ColumnRef),
    #[serde(rename = "task:created")]
    TaskCreated(Task),
    #[serde(rename = "task:updated")]
    TaskUpdated(Task),
    #[serde(rename = "task:moved")]
    TaskMoved(TaskMove),
    #[serde(rename = "task:deleted")]
    TaskDeleted(EntityRef),
    #[serde(rename = "member:added")]
    MemberAdded(MemberAdded),
    #[serde(rename = "member:removed")]
    MemberRemoved(MemberRemoved),
    #[serde(rename = "notification:new")]
    NotificationNew(Notification),
}

impl BoardEvent {
    pub const KNOWN_TYPES: [&'static str; 12] = [
        "board:updated",
        "board:deleted",
        "column:created",
        "column:updated",
        "column:deleted",
        "task:created",
        "task:updated",
        "task:moved",
        "task:deleted",
        "member:added",
        "member:removed",
        "notification:new",
    ];

    pub fn event_type(&self) -> &'static str {
        match self {
            BoardEvent::BoardUpdated(_) => "board:updated",
            BoardEvent::BoardDeleted(_) => "board:deleted",
            BoardEvent::ColumnCreated(_) => "column:created",
            BoardEvent::ColumnUpdated(_) => "column:updated",
            BoardEvent::ColumnDeleted(_) => "column:deleted",
            BoardEvent::TaskCreated(_) => "task:created",
            BoardEvent::TaskUpdated(_) => "task:updated",
            BoardEvent::TaskMoved(_) => "task:moved",
            BoardEvent::TaskDeleted(_) => "task:deleted",
            BoardEvent::MemberAdded(_) => "member:added",
            BoardEvent::MemberRemoved(_) => "member:removed",
            BoardEvent::NotificationNew(_) => "notification:new",
        }
    }

    pub fn is_notification(&self) -> bool {
        matches!(self, BoardEvent::NotificationNew(_))
    }
}

/// Any envelope received on the channel
#[derive(Debug, Clone, PartialEq)]
pub enum RealtimeEvent {
    Board(BoardEvent),
    /// Unrecognised type, or a recognised type whose payload did not fit
    Other(Value),
}

impl RealtimeEvent {
    pub fn from_value(value: Value) -> Self {
        let kind = value.get("type").and_then(Value::as_str).map(str::to_owned);
        match kind {
            Some(kind) if BoardEvent::KNOWN_TYPES.contains(&kind.as_str()) => {
                match serde_json::from_value::<BoardEvent>(value.clone()) {
                    Ok(event) => RealtimeEvent::Board(event),
                    Err(e) => {
                        warn!("Malformed '{}' payload: {}", kind, e);
                        RealtimeEvent::Other(value)
                    }
                }
            }
            _ => RealtimeEvent::Other(value),
        }
    }

    pub fn event_type(&self) -> Option<&str> {
        match self {
            RealtimeEvent::Board(event) => Some(event.event_type()),
            RealtimeEvent::Other(value) => value.get("type").and_then(Value::as_str),
        }
    }
}
