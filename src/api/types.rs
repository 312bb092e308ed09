//! API request and response types.

use serde::{Deserialize, Serialize};

use crate::store::TaskPatch;

/// Request to create a task.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateTaskRequest {
    /// The task text as typed by the user
    pub text: String,
}

/// Request to partially update a task. Reuses the store patch shape so
/// absent fields are left untouched.
pub type UpdateTaskRequest = TaskPatch;

/// Request to generate task suggestions from a prompt.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerateTodosRequest {
    pub prompt: String,
}

/// Suggestions produced by one generation call, in provider order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerateTodosResponse {
    pub todos: Vec<String>,
}

/// Result of a clear-all call.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClearTasksResponse {
    pub deleted: usize,
}

/// Error body returned to clients. The message is human-readable and never
/// carries raw provider output.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub message: String,
}

/// Health check response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    /// Service status
    pub status: String,

    /// Service version
    pub version: String,

    /// Configured provider model
    pub model: String,

    /// Active task store backend ("memory" or "sqlite")
    pub store: String,
}
