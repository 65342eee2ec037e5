//! Board session: REST calls whose responses are written to the store
//!
//! Every mutation goes to the API first; the store only changes once the
//! server has answered, so a failed call leaves local state untouched.

use super::store::SharedStore;
use crate::domain::{AnalyticsView, Board, Column, Task, User};
use crate::infrastructure::client::api::{
    AddMember, ApiClient, ApiError, BoardUpdate, ColumnUpdate, NewBoard, NewColumn, NewTask, Result,
    TaskUpdate,
};
use chrono::Utc;
use std::sync::Arc;
use tracing::{debug, info, warn};

pub struct BoardSession {
    api: Arc<ApiClient>,
    store: SharedStore,
}

impl BoardSession {
    pub fn new(api: Arc<ApiClient>, store: SharedStore) -> Self {
        Self { api, store }
    }

    pub fn api(&self) -> &Arc<ApiClient> {
        &self.api
    }

    pub fn store(&self) -> &SharedStore {
        &self.store
    }

    // ------------------------------------------------------------------
    // Loading
    // ------------------------------------------------------------------

    pub async fn load_boards(&self) -> Result<Vec<Board>> {
        let boards = self.api.list_boards().await?;
        let mut store = self.store.write();
        for board in &boards {
            store.upsert_board(board.clone());
        }
        Ok(boards)
    }

    /// Fetch a board with its columns, tasks and members into the store
    pub async fn hydrate_board(&self, board_id: &str) -> Result<()> {
        let board = self.api.get_board(board_id).await?;
        let columns = self.api.list_columns(board_id).await?;

        let mut tasks = Vec::new();
        for column in &columns {
            tasks.extend(self.api.list_tasks(&column.id).await?);
        }
        let members = self.api.list_members(board_id).await?;

        info!(
            "Hydrated board '{}': {} columns, {} tasks, {} members",
            board.title,
            columns.len(),
            tasks.len(),
            members.len()
        );

        let mut store = self.store.write();
        store.upsert_board(board);
        for column in columns {
            store.upsert_column(column);
        }
        for task in tasks {
            store.upsert_task(task);
        }
        if let Err(e) = store.set_members(board_id, members) {
            warn!("Could not store members: {}", e);
        }
        Ok(())
    }

    pub async fn load_notifications(&self) -> Result<usize> {
        let notifications = self.api.list_notifications().await?;
        let mut store = self.store.write();
        store.set_notifications(notifications);
        Ok(store.notifications().unread_count())
    }

    // ------------------------------------------------------------------
    // Boards
    // ------------------------------------------------------------------

    pub async fn create_board(&self, board: &NewBoard) -> Result<Board> {
        let created = self.api.create_board(board).await?;
        self.store.write().upsert_board(created.clone());
        Ok(created)
    }

    pub async fn update_board(&self, board_id: &str, update: &BoardUpdate) -> Result<Board> {
        let updated = self.api.update_board(board_id, update).await?;
        self.store.write().upsert_board(updated.clone());
        Ok(updated)
    }

    pub async fn delete_board(&self, board_id: &str) -> Result<()> {
        self.api.delete_board(board_id).await?;
        self.store.write().remove_board(board_id);
        Ok(())
    }

    // ------------------------------------------------------------------
    // Columns
    // ------------------------------------------------------------------

    pub async fn create_column(&self, board_id: &str, column: &NewColumn) -> Result<Column> {
        let created = self.api.create_column(board_id, column).await?;
        self.store.write().upsert_column(created.clone());
        Ok(created)
    }

    pub async fn update_column(&self, board_id: &str, column_id: &str, update: &ColumnUpdate) -> Result<Column> {
        let updated = self.api.update_column(board_id, column_id, update).await?;
        self.store.write().upsert_column(updated.clone());
        Ok(updated)
    }

    pub async fn delete_column(&self, board_id: &str, column_id: &str) -> Result<()> {
        self.api.delete_column(board_id, column_id).await?;
        self.store.write().remove_column(column_id);
        Ok(())
    }

    // ------------------------------------------------------------------
    // Tasks
    // ------------------------------------------------------------------

    pub async fn create_task(&self, task: &NewTask) -> Result<Task> {
        let created = self.api.create_task(task).await?;
        self.store.write().upsert_task(created.clone());
        Ok(created)
    }

    /// Update a task; a move lands at the requested position
    pub async fn update_task(&self, task_id: &str, update: &TaskUpdate) -> Result<Task> {
        let updated = self.api.update_task(task_id, update).await?;

        let mut store = self.store.write();
        store.upsert_task(updated.clone());
        if let Some(position) = update.position {
            if let Err(e) = store.move_task(&updated.id, &updated.column_id, position) {
                debug!("Task position not applied locally: {}", e);
            }
        }
        Ok(updated)
    }

    pub async fn move_task(&self, task_id: &str, column_id: &str, position: usize) -> Result<Task> {
        self.update_task(task_id, &TaskUpdate::move_to(column_id, position))
            .await
    }

    pub async fn delete_task(&self, task_id: &str) -> Result<()> {
        self.api.delete_task(task_id).await?;
        self.store.write().remove_task(task_id);
        Ok(())
    }

    // ------------------------------------------------------------------
    // Members
    // ------------------------------------------------------------------

    pub async fn add_member(&self, board_id: &str, member: &AddMember) -> Result<User> {
        let user = self.api.add_member(board_id, member).await?;
        if let Err(e) = self.store.write().add_member(board_id, user.clone()) {
            warn!("Member added remotely but not locally: {}", e);
        }
        Ok(user)
    }

    pub async fn remove_member(&self, board_id: &str, user_id: &str) -> Result<()> {
        self.api.remove_member(board_id, user_id).await?;
        if let Err(e) = self.store.write().remove_member(board_id, user_id) {
            warn!("Member removed remotely but not locally: {}", e);
        }
        Ok(())
    }

    // ------------------------------------------------------------------
    // Notifications
    // ------------------------------------------------------------------

    /// Returns false when the store did not hold the notification
    pub async fn mark_notification_read(&self, notification_id: &str) -> Result<bool> {
        self.api.mark_notification_read(notification_id).await?;
        Ok(self.store.write().mark_notification_read(notification_id))
    }

    pub async fn mark_all_notifications_read(&self) -> Result<usize> {
        self.api.mark_all_notifications_read().await?;
        Ok(self.store.write().mark_all_notifications_read())
    }

    // ------------------------------------------------------------------
    // Analytics
    // ------------------------------------------------------------------

    /// Dashboard data from the server, or computed from the store when the
    /// analytics endpoint fails for any reason other than an expired session
    pub async fn analytics(&self, board_id: &str) -> Result<AnalyticsView> {
        let analytics = match self.api.board_analytics(board_id).await {
            Ok(analytics) => analytics,
            Err(ApiError::Unauthorized) => return Err(ApiError::Unauthorized),
            Err(e) => {
                warn!("Analytics unavailable ({}), computing locally", e);
                self.store.read().local_analytics(board_id, Utc::now())
            }
        };

        let store = self.store.read();
        let members: Vec<User> = store.members_of(board_id).into_iter().cloned().collect();
        Ok(analytics.view(&members))
    }
}
