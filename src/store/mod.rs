//! Task storage with pluggable backends.
//!
//! Supports:
//! - `memory`: In-memory storage (non-persistent, for testing)
//! - `sqlite`: SQLite database (default)

mod memory;
mod sqlite;

pub use memory::InMemoryTaskStore;
pub use sqlite::SqliteTaskStore;

use async_trait::async_trait;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use uuid::Uuid;

/// A single to-do item.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Task {
    pub id: Uuid,
    pub text: String,
    #[serde(default)]
    pub completed: bool,
    pub created_at: String,
    pub updated_at: String,
}

/// Partial update for a task. Absent fields are left untouched.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TaskPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completed: Option<bool>,
}

/// Get current timestamp as RFC3339 string.
pub fn now_string() -> String {
    Utc::now().to_rfc3339()
}

/// Task store trait - implemented by all storage backends.
///
/// Listing returns tasks in insertion order. Delete and clear report
/// absence instead of erroring, so repeating them is harmless.
#[async_trait]
pub trait TaskStore: Send + Sync {
    /// Whether this store persists data across restarts.
    fn is_persistent(&self) -> bool;

    /// List all tasks in insertion order.
    async fn list_tasks(&self) -> Result<Vec<Task>, String>;

    /// Get a single task by ID.
    async fn get_task(&self, id: Uuid) -> Result<Option<Task>, String>;

    /// Create a new task with the given text, not completed.
    async fn create_task(&self, text: &str) -> Result<Task, String>;

    /// Apply a partial update. Returns the canonical updated record, or
    /// `None` when the id is unknown.
    async fn update_task(&self, id: Uuid, patch: TaskPatch) -> Result<Option<Task>, String>;

    /// Delete one task. Returns the removed record, or `None` when it was
    /// already absent.
    async fn delete_task(&self, id: Uuid) -> Result<Option<Task>, String>;

    /// Delete all tasks, returning how many were removed.
    async fn clear_tasks(&self) -> Result<usize, String>;
}

/// Task store backend selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TaskStoreKind {
    Memory,
    #[default]
    Sqlite,
}

impl TaskStoreKind {
    /// Parse from environment variable value.
    pub fn parse(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "memory" => Self::Memory,
            "sqlite" | "db" => Self::Sqlite,
            _ => Self::default(),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Memory => "memory",
            Self::Sqlite => "sqlite",
        }
    }
}

/// Create a task store based on kind and configuration.
pub async fn create_task_store(
    kind: TaskStoreKind,
    data_dir: PathBuf,
) -> Result<Box<dyn TaskStore>, String> {
    match kind {
        TaskStoreKind::Memory => Ok(Box::new(InMemoryTaskStore::new())),
        TaskStoreKind::Sqlite => {
            let store = SqliteTaskStore::new(data_dir).await?;
            Ok(Box::new(store))
        }
    }
}
