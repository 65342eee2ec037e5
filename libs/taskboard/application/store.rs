//! Client-side board state
//!
//! Holds boards, columns, tasks, member users and notifications keyed by id.
//! REST responses and (when enabled) realtime events are written here, and
//! registered [`StoreListener`]s hear about each change.
//!
//! The store keeps these relations consistent no matter what order updates
//! arrive in:
//! - a task id is listed by exactly one column, the one its `column_id` names
//! - a column id is listed by exactly one board, the one its `board_id` names
//! - board membership has no duplicates

use crate::domain::{
    Board, BoardAnalytics, Column, Notification, NotificationCenter, Task, User,
};
use crate::infrastructure::client::realtime::BoardEvent;
use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use thiserror::Error;
use tracing::debug;

pub type SharedStore = Arc<RwLock<BoardStore>>;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("Unknown board: {0}")]
    UnknownBoard(String),

    #[error("Unknown column: {0}")]
    UnknownColumn(String),

    #[error("Unknown task: {0}")]
    UnknownTask(String),
}

/// What changed, for views deciding whether to re-render
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreEvent {
    BoardChanged { board_id: String },
    BoardRemoved { board_id: String },
    ColumnChanged { board_id: String, column_id: String },
    ColumnRemoved { board_id: String, column_id: String },
    TaskChanged { task_id: String, column_id: String },
    TaskRemoved { task_id: String },
    MembersChanged { board_id: String },
    NotificationsChanged,
}

/// Observer of store changes
///
/// Called with the store's write lock held; implementations must not touch
/// the store.
pub trait StoreListener: Send + Sync {
    fn on_change(&self, event: &StoreEvent);
}

/// No-op implementation for when no listener is needed
pub struct NoOpListener;

impl StoreListener for NoOpListener {
    fn on_change(&self, _event: &StoreEvent) {}
}

#[derive(Default)]
pub struct BoardStore {
    boards: HashMap<String, Board>,
    board_order: Vec<String>,
    columns: HashMap<String, Column>,
    tasks: HashMap<String, Task>,
    users: HashMap<String, User>,
    notifications: NotificationCenter,
    listeners: Vec<Arc<dyn StoreListener>>,
}

impl BoardStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn shared() -> SharedStore {
        Arc::new(RwLock::new(Self::new()))
    }

    pub fn add_listener(&mut self, listener: Arc<dyn StoreListener>) {
        self.listeners.push(listener);
    }

    fn emit(&self, event: StoreEvent) {
        debug!("Store change: {:?}", event);
        for listener in &self.listeners {
            listener.on_change(&event);
        }
    }

    // ------------------------------------------------------------------
    // Queries
    // ------------------------------------------------------------------

    /// Boards in the order they were first seen
    pub fn boards(&self) -> impl Iterator<Item = &Board> {
        self.board_order.iter().filter_map(|id| self.boards.get(id))
    }

    pub fn board(&self, board_id: &str) -> Option<&Board> {
        self.boards.get(board_id)
    }

    pub fn board_count(&self) -> usize {
        self.boards.len()
    }

    pub fn column(&self, column_id: &str) -> Option<&Column> {
        self.columns.get(column_id)
    }

    pub fn task(&self, task_id: &str) -> Option<&Task> {
        self.tasks.get(task_id)
    }

    pub fn user(&self, user_id: &str) -> Option<&User> {
        self.users.get(user_id)
    }

    /// Loaded columns of a board, in board order
    pub fn columns_of(&self, board_id: &str) -> Vec<&Column> {
        self.boards
            .get(board_id)
            .map(|board| board.columns.iter().filter_map(|id| self.columns.get(id)).collect())
            .unwrap_or_default()
    }

    /// Loaded tasks of a column, in column order
    pub fn tasks_of(&self, column_id: &str) -> Vec<&Task> {
        self.columns
            .get(column_id)
            .map(|column| column.tasks.iter().filter_map(|id| self.tasks.get(id)).collect())
            .unwrap_or_default()
    }

    /// Every loaded task on a board, column by column
    pub fn board_tasks(&self, board_id: &str) -> Vec<&Task> {
        self.columns_of(board_id)
            .into_iter()
            .flat_map(|column| self.tasks_of(&column.id))
            .collect()
    }

    /// Member users of a board whose profiles are loaded
    pub fn members_of(&self, board_id: &str) -> Vec<&User> {
        self.boards
            .get(board_id)
            .map(|board| board.members.iter().filter_map(|id| self.users.get(id)).collect())
            .unwrap_or_default()
    }

    pub fn notifications(&self) -> &NotificationCenter {
        &self.notifications
    }

    /// Analytics computed from loaded tasks, for when the server's are unavailable
    pub fn local_analytics(&self, board_id: &str, now: DateTime<Utc>) -> BoardAnalytics {
        BoardAnalytics::from_tasks(self.board_tasks(board_id), now)
    }

    // ------------------------------------------------------------------
    // Boards
    // ------------------------------------------------------------------

    /// Insert or replace a board
    ///
    /// Columns the board lists are claimed from any other board.
    pub fn upsert_board(&mut self, mut board: Board) {
        board.dedup_members();
        dedup_ids(&mut board.columns);

        for column_id in &board.columns {
            if let Some(column) = self.columns.get_mut(column_id) {
                column.board_id = board.id.clone();
            }
        }
        // listed columns leave every other board, loaded or not
        for other in self.boards.values_mut().filter(|b| b.id != board.id) {
            other.columns.retain(|id| !board.columns.contains(id));
        }

        // loaded columns that still claim this board stay on it
        let mut unlisted: Vec<String> = self
            .columns
            .values()
            .filter(|c| c.board_id == board.id && !board.columns.contains(&c.id))
            .map(|c| c.id.clone())
            .collect();
        unlisted.sort();
        if let Some(existing) = self.boards.get(&board.id) {
            unlisted.sort_by_key(|id| {
                existing
                    .columns
                    .iter()
                    .position(|known| known == id)
                    .unwrap_or(usize::MAX)
            });
        }
        board.columns.extend(unlisted);

        let board_id = board.id.clone();
        if self.boards.insert(board_id.clone(), board).is_none() {
            self.board_order.push(board_id.clone());
        }
        self.emit(StoreEvent::BoardChanged { board_id });
    }

    /// Remove a board with its columns and their tasks
    pub fn remove_board(&mut self, board_id: &str) -> bool {
        let Some(board) = self.boards.remove(board_id) else {
            return false;
        };
        self.board_order.retain(|id| id != board_id);

        let mut column_ids: Vec<String> = board.columns;
        column_ids.extend(
            self.columns
                .values()
                .filter(|c| c.board_id == board_id)
                .map(|c| c.id.clone()),
        );
        dedup_ids(&mut column_ids);
        for column_id in column_ids {
            self.drop_column(&column_id);
        }

        self.emit(StoreEvent::BoardRemoved {
            board_id: board_id.to_string(),
        });
        true
    }

    // ------------------------------------------------------------------
    // Columns
    // ------------------------------------------------------------------

    /// Insert or replace a column
    ///
    /// The column's task order is taken as given; tasks it lists are claimed
    /// from other columns, and loaded tasks that still belong here but are
    /// missing from the list are kept at the end.
    pub fn upsert_column(&mut self, mut column: Column) {
        dedup_ids(&mut column.tasks);

        for board in self.boards.values_mut().filter(|b| b.id != column.board_id) {
            board.columns.retain(|id| id != &column.id);
        }

        if let Some(board) = self.boards.get_mut(&column.board_id) {
            if !board.columns.contains(&column.id) {
                board.columns.push(column.id.clone());
            }
        }

        for task_id in &column.tasks {
            for other in self.columns.values_mut().filter(|c| c.id != column.id) {
                other.tasks.retain(|id| id != task_id);
            }
            if let Some(task) = self.tasks.get_mut(task_id) {
                task.column_id = column.id.clone();
            }
        }

        let mut orphans: Vec<&Task> = self
            .tasks
            .values()
            .filter(|t| t.column_id == column.id && !column.tasks.contains(&t.id))
            .collect();
        orphans.sort_by(|a, b| a.id.cmp(&b.id));
        let orphan_ids: Vec<String> = orphans.into_iter().map(|t| t.id.clone()).collect();
        if let Some(previous) = self.columns.get(&column.id) {
            // previous order first for tasks the new list left out
            for task_id in &previous.tasks {
                if orphan_ids.contains(task_id) && !column.tasks.contains(task_id) {
                    column.tasks.push(task_id.clone());
                }
            }
        }
        for task_id in orphan_ids {
            if !column.tasks.contains(&task_id) {
                column.tasks.push(task_id);
            }
        }

        let event = StoreEvent::ColumnChanged {
            board_id: column.board_id.clone(),
            column_id: column.id.clone(),
        };
        self.columns.insert(column.id.clone(), column);
        self.emit(event);
    }

    /// Remove a column with its tasks
    pub fn remove_column(&mut self, column_id: &str) -> bool {
        let Some(board_id) = self.drop_column(column_id) else {
            return false;
        };
        self.emit(StoreEvent::ColumnRemoved {
            board_id,
            column_id: column_id.to_string(),
        });
        true
    }

    fn drop_column(&mut self, column_id: &str) -> Option<String> {
        let column = self.columns.remove(column_id)?;
        if let Some(board) = self.boards.get_mut(&column.board_id) {
            board.columns.retain(|id| id != column_id);
        }
        self.tasks
            .retain(|id, task| task.column_id != column_id && !column.tasks.contains(id));
        Some(column.board_id)
    }

    // ------------------------------------------------------------------
    // Tasks
    // ------------------------------------------------------------------

    /// Insert or replace a task
    ///
    /// A task arriving with a different `column_id` leaves its old column
    /// and is appended to the new one; otherwise its position is kept.
    pub fn upsert_task(&mut self, task: Task) {
        self.detach_task(&task.id, Some(&task.column_id));
        if let Some(column) = self.columns.get_mut(&task.column_id) {
            if !column.contains_task(&task.id) {
                column.tasks.push(task.id.clone());
            }
        }

        let event = StoreEvent::TaskChanged {
            task_id: task.id.clone(),
            column_id: task.column_id.clone(),
        };
        self.tasks.insert(task.id.clone(), task);
        self.emit(event);
    }

    /// Move a task to `position` in `column_id`; positions past the end append
    pub fn move_task(&mut self, task_id: &str, column_id: &str, position: usize) -> Result<(), StoreError> {
        if !self.tasks.contains_key(task_id) {
            return Err(StoreError::UnknownTask(task_id.to_string()));
        }
        if !self.columns.contains_key(column_id) {
            return Err(StoreError::UnknownColumn(column_id.to_string()));
        }

        self.detach_task(task_id, None);
        if let Some(column) = self.columns.get_mut(column_id) {
            let at = position.min(column.tasks.len());
            column.tasks.insert(at, task_id.to_string());
        }
        if let Some(task) = self.tasks.get_mut(task_id) {
            task.column_id = column_id.to_string();
        }

        self.emit(StoreEvent::TaskChanged {
            task_id: task_id.to_string(),
            column_id: column_id.to_string(),
        });
        Ok(())
    }

    pub fn remove_task(&mut self, task_id: &str) -> bool {
        self.detach_task(task_id, None);
        if self.tasks.remove(task_id).is_none() {
            return false;
        }
        self.emit(StoreEvent::TaskRemoved {
            task_id: task_id.to_string(),
        });
        true
    }

    /// Remove a task id from every column list except `keep`
    fn detach_task(&mut self, task_id: &str, keep: Option<&str>) {
        for column in self.columns.values_mut() {
            if Some(column.id.as_str()) != keep {
                column.tasks.retain(|id| id != task_id);
            }
        }
    }

    // ------------------------------------------------------------------
    // Members
    // ------------------------------------------------------------------

    /// Add a member; `Ok(false)` when already a member
    pub fn add_member(&mut self, board_id: &str, user: User) -> Result<bool, StoreError> {
        let board = self
            .boards
            .get_mut(board_id)
            .ok_or_else(|| StoreError::UnknownBoard(board_id.to_string()))?;
        let added = board.add_member(&user.id);
        self.users.insert(user.id.clone(), user);
        if added {
            self.emit(StoreEvent::MembersChanged {
                board_id: board_id.to_string(),
            });
        }
        Ok(added)
    }

    pub fn remove_member(&mut self, board_id: &str, user_id: &str) -> Result<bool, StoreError> {
        let board = self
            .boards
            .get_mut(board_id)
            .ok_or_else(|| StoreError::UnknownBoard(board_id.to_string()))?;
        let removed = board.remove_member(user_id);
        if removed {
            self.emit(StoreEvent::MembersChanged {
                board_id: board_id.to_string(),
            });
        }
        Ok(removed)
    }

    /// Replace a board's member list with `users`
    pub fn set_members(&mut self, board_id: &str, users: Vec<User>) -> Result<(), StoreError> {
        let board = self
            .boards
            .get_mut(board_id)
            .ok_or_else(|| StoreError::UnknownBoard(board_id.to_string()))?;
        board.members = users.iter().map(|u| u.id.clone()).collect();
        board.dedup_members();
        for user in users {
            self.users.insert(user.id.clone(), user);
        }
        self.emit(StoreEvent::MembersChanged {
            board_id: board_id.to_string(),
        });
        Ok(())
    }

    // ------------------------------------------------------------------
    // Notifications
    // ------------------------------------------------------------------

    pub fn set_notifications(&mut self, notifications: Vec<Notification>) {
        self.notifications.replace_all(notifications);
        self.emit(StoreEvent::NotificationsChanged);
    }

    pub fn push_notification(&mut self, notification: Notification) {
        self.notifications.push(notification);
        self.emit(StoreEvent::NotificationsChanged);
    }

    pub fn mark_notification_read(&mut self, notification_id: &str) -> bool {
        let changed = self.notifications.mark_read(notification_id);
        if changed {
            self.emit(StoreEvent::NotificationsChanged);
        }
        changed
    }

    pub fn mark_all_notifications_read(&mut self) -> usize {
        let changed = self.notifications.mark_all_read();
        if changed > 0 {
            self.emit(StoreEvent::NotificationsChanged);
        }
        changed
    }

    pub fn dismiss_notification(&mut self, notification_id: &str) -> Option<Notification> {
        let removed = self.notifications.dismiss(notification_id);
        if removed.is_some() {
            self.emit(StoreEvent::NotificationsChanged);
        }
        removed
    }

    // ------------------------------------------------------------------
    // Realtime
    // ------------------------------------------------------------------

    /// Apply a realtime event; false when it referenced unknown state
    pub fn apply_event(&mut self, event: &BoardEvent) -> bool {
        match event {
            BoardEvent::BoardUpdated(board) => {
                self.upsert_board(board.clone());
                true
            }
            BoardEvent::BoardDeleted(board) => self.remove_board(&board.id),
            BoardEvent::ColumnCreated(column) | BoardEvent::ColumnUpdated(column) => {
                self.upsert_column(column.clone());
                true
            }
            BoardEvent::ColumnDeleted(column) => self.remove_column(&column.id),
            BoardEvent::TaskCreated(task) | BoardEvent::TaskUpdated(task) => {
                self.upsert_task(task.clone());
                true
            }
            BoardEvent::TaskMoved(moved) => self
                .move_task(
                    &moved.task_id,
                    &moved.column_id,
                    moved.position.unwrap_or(usize::MAX),
                )
                .is_ok(),
            BoardEvent::TaskDeleted(task) => self.remove_task(&task.id),
            BoardEvent::MemberAdded(added) => self
                .add_member(&added.board_id, added.user.clone())
                .unwrap_or(false),
            BoardEvent::MemberRemoved(removed) => self
                .remove_member(&removed.board_id, &removed.user_id)
                .unwrap_or(false),
            BoardEvent::NotificationNew(notification) => {
                self.push_notification(notification.clone());
                true
            }
        }
    }

    /// Descriptions of every broken relation; empty when consistent
    pub fn consistency_errors(&self) -> Vec<String> {
        let mut errors = Vec::new();

        for task in self.tasks.values() {
            let listed_by: Vec<&str> = self
                .columns
                .values()
                .filter(|c| c.contains_task(&task.id))
                .map(|c| c.id.as_str())
                .collect();
            let expected_listing = self.columns.contains_key(&task.column_id);
            match listed_by.as_slice() {
                [] if !expected_listing => {}
                [only] if *only == task.column_id => {}
                other => errors.push(format!(
                    "task {} (column {}) listed by {:?}",
                    task.id, task.column_id, other
                )),
            }
        }

        for column in self.columns.values() {
            let listed_by: Vec<&str> = self
                .boards
                .values()
                .filter(|b| b.columns.contains(&column.id))
                .map(|b| b.id.as_str())
                .collect();
            let expected_listing = self.boards.contains_key(&column.board_id);
            match listed_by.as_slice() {
                [] if !expected_listing => {}
                [only] if *only == column.board_id => {}
                other => errors.push(format!(
                    "column {} (board {}) listed by {:?}",
                    column.id, column.board_id, other
                )),
            }
            let unique: HashSet<&String> = column.tasks.iter().collect();
            if unique.len() != column.tasks.len() {
                errors.push(format!("column {} lists a task twice", column.id));
            }
        }

        for board in self.boards.values() {
            let unique: HashSet<&String> = board.members.iter().collect();
            if unique.len() != board.members.len() {
                errors.push(format!("board {} has duplicate members", board.id));
            }
        }

        errors
    }
}

fn dedup_ids(ids: &mut Vec<String>) {
    let mut seen = HashSet::new();
    ids.retain(|id| seen.insert(id.clone()));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::client::realtime::{ColumnRef, EntityRef, MemberAdded, TaskMove};
    use chrono::TimeZone;
    use parking_lot::Mutex;

    #[derive(Default)]
    struct RecordingListener {
        events: Mutex<Vec<StoreEvent>>,
    }

    impl StoreListener for RecordingListener {
        fn on_change(&self, event: &StoreEvent) {
            self.events.lock().push(event.clone());
        }
    }

    /// b1: c1 [t1, t2], c2 [t3]
    fn seeded() -> BoardStore {
        let mut store = BoardStore::new();
        store.upsert_board(Board::new("b1", "Launch"));
        store.upsert_column(Column::new("c1", "b1", "Todo"));
        store.upsert_column(Column::new("c2", "b1", "Done"));
        store.upsert_task(Task::new("t1", "c1", "one"));
        store.upsert_task(Task::new("t2", "c1", "two"));
        store.upsert_task(Task::new("t3", "c2", "three"));
        store
    }

    fn ids(tasks: Vec<&Task>) -> Vec<&str> {
        tasks.into_iter().map(|t| t.id.as_str()).collect()
    }

    #[test]
    fn test_seeded_store_is_consistent() {
        let store = seeded();
        assert_eq!(store.board("b1").unwrap().columns, vec!["c1", "c2"]);
        assert_eq!(ids(store.tasks_of("c1")), vec!["t1", "t2"]);
        assert_eq!(ids(store.board_tasks("b1")), vec!["t1", "t2", "t3"]);
        assert!(store.consistency_errors().is_empty());
    }

    #[test]
    fn test_upsert_task_into_other_column_leaves_old_one() {
        let mut store = seeded();
        let mut moved = store.task("t1").unwrap().clone();
        moved.column_id = "c2".into();
        store.upsert_task(moved);

        assert_eq!(ids(store.tasks_of("c1")), vec!["t2"]);
        assert_eq!(ids(store.tasks_of("c2")), vec!["t3", "t1"]);
        assert!(store.consistency_errors().is_empty());
    }

    #[test]
    fn test_upsert_task_same_column_keeps_position() {
        let mut store = seeded();
        let mut renamed = store.task("t1").unwrap().clone();
        renamed.title = "first".into();
        store.upsert_task(renamed);
        assert_eq!(ids(store.tasks_of("c1")), vec!["t1", "t2"]);
        assert_eq!(store.task("t1").unwrap().title, "first");
    }

    #[test]
    fn test_move_task_to_position() {
        let mut store = seeded();
        store.move_task("t3", "c1", 1).unwrap();
        assert_eq!(ids(store.tasks_of("c1")), vec!["t1", "t3", "t2"]);
        assert!(store.tasks_of("c2").is_empty());
        assert_eq!(store.task("t3").unwrap().column_id, "c1");

        // reorder within a column; past-the-end appends
        store.move_task("t1", "c1", 99).unwrap();
        assert_eq!(ids(store.tasks_of("c1")), vec!["t3", "t2", "t1"]);
        assert!(store.consistency_errors().is_empty());
    }

    #[test]
    fn test_move_task_unknown_targets() {
        let mut store = seeded();
        assert_eq!(
            store.move_task("nope", "c1", 0),
            Err(StoreError::UnknownTask("nope".into()))
        );
        assert_eq!(
            store.move_task("t1", "nope", 0),
            Err(StoreError::UnknownColumn("nope".into()))
        );
        assert_eq!(ids(store.tasks_of("c1")), vec!["t1", "t2"]);
    }

    #[test]
    fn test_upsert_column_claims_listed_tasks() {
        let mut store = seeded();
        let mut c2 = store.column("c2").unwrap().clone();
        c2.tasks = vec!["t2".into(), "t3".into()];
        store.upsert_column(c2);

        assert_eq!(ids(store.tasks_of("c1")), vec!["t1"]);
        assert_eq!(ids(store.tasks_of("c2")), vec!["t2", "t3"]);
        assert_eq!(store.task("t2").unwrap().column_id, "c2");
        assert!(store.consistency_errors().is_empty());
    }

    #[test]
    fn test_upsert_column_without_task_list_keeps_tasks() {
        let mut store = seeded();
        store.upsert_column(Column::new("c1", "b1", "Backlog"));
        assert_eq!(store.column("c1").unwrap().title, "Backlog");
        assert_eq!(ids(store.tasks_of("c1")), vec!["t1", "t2"]);
    }

    #[test]
    fn test_board_update_keeps_loaded_columns() {
        let mut store = seeded();
        let mut board = Board::new("b1", "Renamed");
        board.columns = vec!["c2".into()];
        store.upsert_board(board);
        assert_eq!(store.board("b1").unwrap().columns, vec!["c2", "c1"]);
        assert!(store.consistency_errors().is_empty());
    }

    #[test]
    fn test_column_moves_between_boards() {
        let mut store = seeded();
        store.upsert_board(Board::new("b2", "Other"));
        store.upsert_column(Column::new("c2", "b2", "Done"));

        assert_eq!(store.board("b1").unwrap().columns, vec!["c1"]);
        assert_eq!(store.board("b2").unwrap().columns, vec!["c2"]);
        assert_eq!(ids(store.tasks_of("c2")), vec!["t3"]);
        assert!(store.consistency_errors().is_empty());
    }

    #[test]
    fn test_unloaded_column_listed_elsewhere_settles_on_its_board() {
        let mut store = BoardStore::new();
        let mut stale = Board::new("b2", "Stale");
        stale.columns = vec!["c9".into()];
        store.upsert_board(stale);
        store.upsert_board(Board::new("b1", "Launch"));
        store.upsert_column(Column::new("c9", "b1", "Review"));

        assert_eq!(store.board("b1").unwrap().columns, vec!["c9"]);
        assert!(store.board("b2").unwrap().columns.is_empty());
        assert!(store.consistency_errors().is_empty());
    }

    #[test]
    fn test_board_listing_unloaded_column_takes_it_from_other_boards() {
        let mut store = BoardStore::new();
        let mut first = Board::new("b1", "First");
        first.columns = vec!["c9".into()];
        store.upsert_board(first);
        let mut second = Board::new("b2", "Second");
        second.columns = vec!["c9".into()];
        store.upsert_board(second);

        assert!(store.board("b1").unwrap().columns.is_empty());
        assert_eq!(store.board("b2").unwrap().columns, vec!["c9"]);

        store.upsert_column(Column::new("c9", "b2", "Review"));
        assert!(store.consistency_errors().is_empty());
    }

    #[test]
    fn test_remove_column_removes_its_tasks() {
        let mut store = seeded();
        assert!(store.remove_column("c1"));
        assert!(store.task("t1").is_none());
        assert!(store.task("t2").is_none());
        assert!(store.task("t3").is_some());
        assert_eq!(store.board("b1").unwrap().columns, vec!["c2"]);
        assert!(!store.remove_column("c1"));
    }

    #[test]
    fn test_remove_board_cascades() {
        let mut store = seeded();
        assert!(store.remove_board("b1"));
        assert_eq!(store.board_count(), 0);
        assert!(store.column("c1").is_none());
        assert!(store.task("t3").is_none());
        assert!(!store.remove_board("b1"));
    }

    #[test]
    fn test_remove_task() {
        let mut store = seeded();
        assert!(store.remove_task("t1"));
        assert_eq!(ids(store.tasks_of("c1")), vec!["t2"]);
        assert!(!store.remove_task("t1"));
    }

    #[test]
    fn test_membership_is_a_set() {
        let mut store = seeded();
        assert_eq!(store.add_member("b1", User::new("u1", "Alice")), Ok(true));
        assert_eq!(store.add_member("b1", User::new("u1", "Alice")), Ok(false));
        assert_eq!(store.board("b1").unwrap().members, vec!["u1"]);
        assert_eq!(store.members_of("b1")[0].name, "Alice");

        assert_eq!(store.remove_member("b1", "u1"), Ok(true));
        assert_eq!(store.remove_member("b1", "u1"), Ok(false));
        assert_eq!(
            store.add_member("missing", User::new("u2", "Bob")),
            Err(StoreError::UnknownBoard("missing".into()))
        );
    }

    #[test]
    fn test_set_members_dedups() {
        let mut store = seeded();
        store
            .set_members("b1", vec![User::new("u1", "A"), User::new("u2", "B"), User::new("u1", "A")])
            .unwrap();
        assert_eq!(store.board("b1").unwrap().members, vec!["u1", "u2"]);
    }

    #[test]
    fn test_listeners_hear_changes() {
        let mut store = BoardStore::new();
        let listener = Arc::new(RecordingListener::default());
        store.add_listener(listener.clone());
        store.add_listener(Arc::new(NoOpListener));

        store.upsert_board(Board::new("b1", "x"));
        store.remove_board("b1");
        assert!(!store.mark_notification_read("nope"));

        let events = listener.events.lock().clone();
        assert_eq!(
            events,
            vec![
                StoreEvent::BoardChanged { board_id: "b1".into() },
                StoreEvent::BoardRemoved { board_id: "b1".into() },
            ]
        );
    }

    #[test]
    fn test_apply_events_in_sequence() {
        let mut store = seeded();
        let events = vec![
            BoardEvent::TaskMoved(TaskMove {
                task_id: "t1".into(),
                column_id: "c2".into(),
                position: Some(0),
            }),
            BoardEvent::TaskCreated(Task::new("t4", "c1", "four")),
            BoardEvent::TaskDeleted(EntityRef { id: "t2".into() }),
            BoardEvent::MemberAdded(MemberAdded {
                board_id: "b1".into(),
                user: User::new("u1", "Alice"),
            }),
            BoardEvent::ColumnCreated(Column::new("c3", "b1", "Review")),
        ];
        for event in &events {
            assert!(store.apply_event(event), "{:?} not applied", event);
        }

        assert_eq!(ids(store.tasks_of("c1")), vec!["t4"]);
        assert_eq!(ids(store.tasks_of("c2")), vec!["t1", "t3"]);
        assert_eq!(store.board("b1").unwrap().columns, vec!["c1", "c2", "c3"]);
        assert!(store.consistency_errors().is_empty());

        assert!(store.apply_event(&BoardEvent::ColumnDeleted(ColumnRef {
            id: "c2".into(),
            board_id: "b1".into(),
        })));
        assert!(store.task("t1").is_none());
    }

    #[test]
    fn test_apply_event_on_unknown_state_reports_false() {
        let mut store = seeded();
        assert!(!store.apply_event(&BoardEvent::TaskMoved(TaskMove {
            task_id: "ghost".into(),
            column_id: "c1".into(),
            position: None,
        })));
        assert!(!store.apply_event(&BoardEvent::BoardDeleted(EntityRef { id: "ghost".into() })));
    }

    #[test]
    fn test_notification_ops_through_store() {
        let mut store = BoardStore::new();
        let at = Utc.with_ymd_and_hms(2026, 3, 1, 0, 0, 0).unwrap();
        let note = |id: &str| Notification {
            id: id.into(),
            recipient: "u1".into(),
            message: "assigned".into(),
            read: false,
            created_at: at,
        };
        store.set_notifications(vec![note("n1"), note("n2")]);
        store.apply_event(&BoardEvent::NotificationNew(note("n3")));
        assert_eq!(store.notifications().unread_count(), 3);

        assert!(store.mark_notification_read("n2"));
        assert_eq!(store.notifications().unread_count(), 2);
        assert!(!store.notifications().get("n1").unwrap().read);

        assert_eq!(store.mark_all_notifications_read(), 2);
        assert_eq!(store.notifications().unread_count(), 0);
        assert!(store.dismiss_notification("n1").is_some());
        assert_eq!(store.notifications().len(), 2);
    }

    #[test]
    fn test_local_analytics_uses_board_tasks() {
        let mut store = seeded();
        let mut done = store.task("t3").unwrap().clone();
        done.status = crate::domain::TaskStatus::Done;
        store.upsert_task(done);

        let analytics = store.local_analytics("b1", Utc::now());
        assert_eq!(analytics.total_tasks, 3);
        assert_eq!(analytics.completed_tasks, 1);
    }
}
