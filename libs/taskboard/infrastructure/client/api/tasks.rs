//! Task endpoints

use super::helpers::{endpoint, parse_json};
use super::types::{NewTask, TaskUpdate};
use super::{ApiClient, Result};
use crate::domain::Task;
use reqwest::Method;
use tracing::debug;

impl ApiClient {
    /// Tasks of one column, in column order
    pub async fn list_tasks(&self, column_id: &str) -> Result<Vec<Task>> {
        let request = self
            .client
            .get(self.url("/tasks"))
            .query(&[("columnId", column_id)]);
        let response = self.execute(request).await?;
        parse_json(response).await
    }

    pub async fn get_task(&self, task_id: &str) -> Result<Task> {
        self.get_json(&endpoint(&["tasks", task_id])).await
    }

    pub async fn create_task(&self, task: &NewTask) -> Result<Task> {
        debug!("Creating task '{}' in column {}", task.title, task.column_id);
        self.send_json(Method::POST, "/tasks", task).await
    }

    pub async fn update_task(&self, task_id: &str, update: &TaskUpdate) -> Result<Task> {
        self.send_json(Method::PATCH, &endpoint(&["tasks", task_id]), update)
            .await
    }

    /// Move a task to `position` within `column_id`
    pub async fn move_task(&self, task_id: &str, column_id: &str, position: usize) -> Result<Task> {
        debug!("Moving task {} to column {} at {}", task_id, column_id, position);
        self.update_task(task_id, &TaskUpdate::move_to(column_id, position))
            .await
    }

    pub async fn delete_task(&self, task_id: &str) -> Result<()> {
        self.send_empty(Method::DELETE, &endpoint(&["tasks", task_id]))
            .await
    }
}
