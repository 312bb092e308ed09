//! API client implementing the task-list interaction contract.
//!
//! The local task view is explicit state: every mutation takes the view,
//! calls the server, and reconciles the view from the response. The store
//! is the single source of truth; on any failure the prior view is left
//! unchanged (no optimistic updates).

use serde::de::DeserializeOwned;
use thiserror::Error;
use uuid::Uuid;

use crate::api::types::{
    ClearTasksResponse, CreateTaskRequest, ErrorResponse, GenerateTodosRequest,
    GenerateTodosResponse,
};
use crate::store::{Task, TaskPatch};

/// Errors surfaced to the user of the client.
#[derive(Debug, Error)]
pub enum ClientError {
    /// Transport-level failure (connection, timeout).
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// The server rejected the call.
    #[error("API error (HTTP {status}): {message}")]
    Api { status: u16, message: String },

    /// The caller referenced a task absent from its own view; no request
    /// was sent.
    #[error("task {0} not in local view")]
    NotInView(Uuid),

    /// The generation provider is busy; worth retrying shortly.
    #[error("provider busy: {0}")]
    ProviderBusy(String),
}

/// Outcome of one suggestion-batch insertion.
///
/// Creates are issued independently, so some can succeed while others
/// fail; the caller decides how to present partial success.
#[derive(Debug, Default)]
pub struct BatchReport {
    /// Number of suggestions successfully inserted
    pub created: usize,
    /// Suggestions that could not be inserted, with the failure message
    pub failed: Vec<(String, String)>,
}

impl BatchReport {
    pub fn is_complete(&self) -> bool {
        self.failed.is_empty()
    }
}

/// HTTP client for the Listify API.
#[derive(Clone)]
pub struct ApiClient {
    base_url: String,
    client: reqwest::Client,
}

impl ApiClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        let mut base_url = base_url.into();
        while base_url.ends_with('/') {
            base_url.pop();
        }
        Self {
            base_url,
            client: reqwest::Client::new(),
        }
    }

    /// Read the body of a failed response into an API error. The server
    /// sends `{message}` bodies; fall back to the raw text otherwise.
    async fn api_error(response: reqwest::Response) -> ClientError {
        let status = response.status().as_u16();
        let body = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<ErrorResponse>(&body)
            .map(|e| e.message)
            .unwrap_or(body);
        ClientError::Api { status, message }
    }

    async fn parse_ok<T: DeserializeOwned>(response: reqwest::Response) -> Result<T, ClientError> {
        if !response.status().is_success() {
            return Err(Self::api_error(response).await);
        }
        Ok(response.json::<T>().await?)
    }

    /// Fetch the full task list, replacing any local view wholesale.
    pub async fn load(&self) -> Result<Vec<Task>, ClientError> {
        let response = self
            .client
            .get(format!("{}/api/todos", self.base_url))
            .send()
            .await?;
        Self::parse_ok(response).await
    }

    /// Create one task and append the canonical record to the view.
    pub async fn add_task(&self, view: &mut Vec<Task>, text: &str) -> Result<(), ClientError> {
        let response = self
            .client
            .post(format!("{}/api/todos", self.base_url))
            .json(&CreateTaskRequest {
                text: text.to_string(),
            })
            .send()
            .await?;
        let task: Task = Self::parse_ok(response).await?;
        view.push(task);
        Ok(())
    }

    /// Generate suggestions for a prompt and insert each one as an
    /// independent task, sequentially and in suggestion order.
    ///
    /// An individual create failure does not roll back or stop the rest;
    /// the returned report carries what succeeded and what did not.
    pub async fn generate_with_ai(
        &self,
        view: &mut Vec<Task>,
        prompt: &str,
    ) -> Result<BatchReport, ClientError> {
        let response = self
            .client
            .post(format!("{}/api/ai/generate-todos", self.base_url))
            .json(&GenerateTodosRequest {
                prompt: prompt.to_string(),
            })
            .send()
            .await?;

        if response.status().as_u16() == 503 {
            return Err(match Self::api_error(response).await {
                ClientError::Api { message, .. } => ClientError::ProviderBusy(message),
                other => other,
            });
        }

        let suggestions: GenerateTodosResponse = Self::parse_ok(response).await?;

        let mut report = BatchReport::default();
        for text in suggestions.todos {
            match self.add_task(view, &text).await {
                Ok(()) => report.created += 1,
                Err(e) => {
                    tracing::warn!("Failed to insert suggestion {:?}: {}", text, e);
                    report.failed.push((text, e.to_string()));
                }
            }
        }
        Ok(report)
    }

    /// Replace a task's text, reconciling the view from the response.
    pub async fn save_edit(
        &self,
        view: &mut Vec<Task>,
        id: Uuid,
        text: &str,
    ) -> Result<(), ClientError> {
        self.patch(
            view,
            id,
            TaskPatch {
                text: Some(text.to_string()),
                completed: None,
            },
        )
        .await
    }

    /// Flip a task's completion state, reconciling the view from the
    /// response.
    pub async fn toggle(&self, view: &mut Vec<Task>, id: Uuid) -> Result<(), ClientError> {
        let completed = view
            .iter()
            .find(|t| t.id == id)
            .map(|t| t.completed)
            .ok_or(ClientError::NotInView(id))?;
        self.patch(
            view,
            id,
            TaskPatch {
                text: None,
                completed: Some(!completed),
            },
        )
        .await
    }

    async fn patch(
        &self,
        view: &mut Vec<Task>,
        id: Uuid,
        patch: TaskPatch,
    ) -> Result<(), ClientError> {
        let response = self
            .client
            .patch(format!("{}/api/todos/{}", self.base_url, id))
            .json(&patch)
            .send()
            .await?;
        let updated: Task = Self::parse_ok(response).await?;
        if let Some(slot) = view.iter_mut().find(|t| t.id == id) {
            *slot = updated;
        }
        Ok(())
    }

    /// Delete one task. A 404 means the record is already gone server-side,
    /// so the view is reconciled the same way as a successful delete.
    pub async fn delete_task(&self, view: &mut Vec<Task>, id: Uuid) -> Result<(), ClientError> {
        let response = self
            .client
            .delete(format!("{}/api/todos/{}", self.base_url, id))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() && status.as_u16() != 404 {
            return Err(Self::api_error(response).await);
        }

        view.retain(|t| t.id != id);
        Ok(())
    }

    /// Delete all tasks and empty the view.
    pub async fn clear_all(&self, view: &mut Vec<Task>) -> Result<usize, ClientError> {
        let response = self
            .client
            .delete(format!("{}/api/todos", self.base_url))
            .send()
            .await?;
        let cleared: ClearTasksResponse = Self::parse_ok(response).await?;
        view.clear();
        Ok(cleared.deleted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_url_normalization() {
        let client = ApiClient::new("http://localhost:5000///");
        assert_eq!(client.base_url, "http://localhost:5000");
    }

    #[tokio::test]
    async fn test_toggle_outside_view_sends_nothing() {
        // Nothing listens here; a fabricated request would fail as
        // Transport, not NotInView.
        let client = ApiClient::new("http://127.0.0.1:1");
        let mut view: Vec<Task> = Vec::new();
        let id = Uuid::new_v4();
        let err = client.toggle(&mut view, id).await.expect_err("no such task");
        match err {
            ClientError::NotInView(missing) => assert_eq!(missing, id),
            other => panic!("expected NotInView, got: {:?}", other),
        }
    }

    #[test]
    fn test_batch_report_completeness() {
        let complete = BatchReport {
            created: 3,
            failed: vec![],
        };
        assert!(complete.is_complete());

        let partial = BatchReport {
            created: 2,
            failed: vec![("Send invitations".to_string(), "boom".to_string())],
        };
        assert!(!partial.is_complete());
    }
}
