//! Notification endpoints for the current user

use super::helpers::endpoint;
use super::{ApiClient, Result};
use crate::domain::Notification;
use reqwest::Method;

impl ApiClient {
    pub async fn list_notifications(&self) -> Result<Vec<Notification>> {
        self.get_json("/notifications").await
    }

    pub async fn mark_notification_read(&self, notification_id: &str) -> Result<()> {
        self.send_empty(
            Method::PATCH,
            &endpoint(&["notifications", notification_id, "read"]),
        )
        .await
    }

    pub async fn mark_all_notifications_read(&self) -> Result<()> {
        self.send_empty(Method::PATCH, "/notifications/read-all")
            .await
    }
}
