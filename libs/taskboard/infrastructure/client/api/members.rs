//! Board membership endpoints

use super::helpers::endpoint;
use super::types::AddMember;
use super::{ApiClient, Result};
use crate::domain::User;
use reqwest::Method;

impl ApiClient {
    pub async fn list_members(&self, board_id: &str) -> Result<Vec<User>> {
        self.get_json(&endpoint(&["boards", board_id, "members"])).await
    }

    /// Returns the user that was added
    pub async fn add_member(&self, board_id: &str, member: &AddMember) -> Result<User> {
        self.send_json(Method::POST, &endpoint(&["boards", board_id, "members"]), member)
            .await
    }

    pub async fn remove_member(&self, board_id: &str, user_id: &str) -> Result<()> {
        self.send_empty(
            Method::DELETE,
            &endpoint(&["boards", board_id, "members", user_id]),
        )
        .await
    }
}
