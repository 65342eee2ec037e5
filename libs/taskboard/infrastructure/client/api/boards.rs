//! Board endpoints

use super::helpers::endpoint;
use super::types::{BoardUpdate, NewBoard};
use super::{ApiClient, Result};
use crate::domain::{Board, BoardAnalytics};
use reqwest::Method;
use tracing::debug;

impl ApiClient {
    /// Boards the current user belongs to
    pub async fn list_boards(&self) -> Result<Vec<Board>> {
        let boards: Vec<Board> = self.get_json("/boards").await?;
        debug!("Fetched {} boards", boards.len());
        Ok(boards)
    }

    pub async fn get_board(&self, board_id: &str) -> Result<Board> {
        self.get_json(&endpoint(&["boards", board_id])).await
    }

    pub async fn create_board(&self, board: &NewBoard) -> Result<Board> {
        debug!("Creating board '{}'", board.title);
        self.send_json(Method::POST, "/boards", board).await
    }

    pub async fn update_board(&self, board_id: &str, update: &BoardUpdate) -> Result<Board> {
        self.send_json(Method::PATCH, &endpoint(&["boards", board_id]), update)
            .await
    }

    pub async fn delete_board(&self, board_id: &str) -> Result<()> {
        self.send_empty(Method::DELETE, &endpoint(&["boards", board_id]))
            .await
    }

    /// Server-side aggregates for the analytics dashboard
    pub async fn board_analytics(&self, board_id: &str) -> Result<BoardAnalytics> {
        self.get_json(&endpoint(&["boards", board_id, "analytics"]))
            .await
    }
}
