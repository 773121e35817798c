// Copyright (c) 2025 sbksba
//
// This software is licensed under the terms of the MIT License.
// See the LICENSE file in the project root for the full license text.
//! Typed access to the task board REST API.

use async_trait::async_trait;
use common::{Board, CreateBoardPayload, CreateTaskPayload, ErrorResponse, Task, TaskUpdate};
use reqwest::{Response, StatusCode};
use serde::de::DeserializeOwned;
use tracing::debug;
use uuid::Uuid;

use crate::error::ClientError;

pub const DEFAULT_BASE_URL: &str = "http://localhost:5000";

/// The six board/task operations offered by the service.
#[async_trait]
pub trait BoardsApi: Send + Sync {
    async fn fetch_boards(&self) -> Result<Vec<Board>, ClientError>;

    async fn create_board(&self, payload: &CreateBoardPayload) -> Result<Board, ClientError>;

    async fn fetch_tasks(&self, board_id: Uuid) -> Result<Vec<Task>, ClientError>;

    async fn create_task(
        &self,
        board_id: Uuid,
        payload: &CreateTaskPayload,
    ) -> Result<Task, ClientError>;

    async fn update_task(&self, task_id: Uuid, update: &TaskUpdate) -> Result<Task, ClientError>;

    async fn delete_task(&self, task_id: Uuid) -> Result<(), ClientError>;
}

/// `BoardsApi` over HTTP with JSON bodies.
#[derive(Debug, Clone)]
pub struct HttpApiClient {
    base_url: String,
    client: reqwest::Client,
}

impl HttpApiClient {
    /// Create a client targeting the given base URL
    pub fn new(base_url: &str) -> Self {
        Self::with_client(base_url, reqwest::Client::new())
    }

    pub fn with_client(base_url: &str, client: reqwest::Client) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Turns a non-success response into `ClientError::Api`, keeping the
    /// server's `message` when the body has one.
    async fn check(response: Response) -> Result<Response, ClientError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let text = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<ErrorResponse>(&text)
            .map(|body| body.message)
            .unwrap_or_else(|_| fallback_message(status));
        debug!("API error {}: {}", status, message);

        Err(ClientError::Api {
            status: status.as_u16(),
            message,
        })
    }

    async fn json<T: DeserializeOwned>(response: Response) -> Result<T, ClientError> {
        let response = Self::check(response).await?;
        Ok(response.json().await?)
    }
}

fn fallback_message(status: StatusCode) -> String {
    match status.canonical_reason() {
        Some(reason) => format!("Request failed: {} {}", status.as_u16(), reason),
        None => format!("Request failed with status {}", status.as_u16()),
    }
}

#[async_trait]
impl BoardsApi for HttpApiClient {
    async fn fetch_boards(&self) -> Result<Vec<Board>, ClientError> {
        let response = self.client.get(self.url("/boards")).send().await?;
        Self::json(response).await
    }

    async fn create_board(&self, payload: &CreateBoardPayload) -> Result<Board, ClientError> {
        let response = self
            .client
            .post(self.url("/boards"))
            .json(payload)
            .send()
            .await?;
        Self::json(response).await
    }

    async fn fetch_tasks(&self, board_id: Uuid) -> Result<Vec<Task>, ClientError> {
        let url = self.url(&format!("/boards/{}/tasks", board_id));
        let response = self.client.get(url).send().await?;
        Self::json(response).await
    }

    async fn create_task(
        &self,
        board_id: Uuid,
        payload: &CreateTaskPayload,
    ) -> Result<Task, ClientError> {
        let url = self.url(&format!("/boards/{}/tasks", board_id));
        let response = self.client.post(url).json(payload).send().await?;
        Self::json(response).await
    }

    async fn update_task(&self, task_id: Uuid, update: &TaskUpdate) -> Result<Task, ClientError> {
        let url = self.url(&format!("/tasks/{}", task_id));
        let response = self.client.put(url).json(update).send().await?;
        Self::json(response).await
    }

    async fn delete_task(&self, task_id: Uuid) -> Result<(), ClientError> {
        let url = self.url(&format!("/tasks/{}", task_id));
        let response = self.client.delete(url).send().await?;
        Self::check(response).await?;
        Ok(())
    }
}
