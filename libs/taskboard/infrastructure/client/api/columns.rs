//! Column endpoints, nested under their board

use super::helpers::endpoint;
use super::types::{ColumnUpdate, NewColumn};
use super::{ApiClient, Result};
use crate::domain::Column;
use reqwest::Method;

impl ApiClient {
    pub async fn list_columns(&self, board_id: &str) -> Result<Vec<Column>> {
        self.get_json(&endpoint(&["boards", board_id, "columns"])).await
    }

    pub async fn create_column(&self, board_id: &str, column: &NewColumn) -> Result<Column> {
        self.send_json(Method::POST, &endpoint(&["boards", board_id, "columns"]), column)
            .await
    }

    pub async fn update_column(
        &self,
        board_id: &str,
        column_id: &str,
        update: &ColumnUpdate,
    ) -> Result<Column> {
        self.send_json(
            Method::PATCH,
            &endpoint(&["boards", board_id, "columns", column_id]),
            update,
        )
        .await
    }

    pub async fn delete_column(&self, board_id: &str, column_id: &str) -> Result<()> {
        self.send_empty(
            Method::DELETE,
            &endpoint(&["boards", board_id, "columns", column_id]),
        )
        .await
    }
}
