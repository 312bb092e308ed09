//! In-memory task store (non-persistent).

use super::{now_string, Task, TaskPatch, TaskStore};
use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

/// Vec keeps insertion order, which is the list order clients render.
#[derive(Clone)]
pub struct InMemoryTaskStore {
    tasks: Arc<RwLock<Vec<Task>>>,
}

impl InMemoryTaskStore {
    pub fn new() -> Self {
        Self {
            tasks: Arc::new(RwLock::new(Vec::new())),
        }
    }
}

impl Default for InMemoryTaskStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl TaskStore for InMemoryTaskStore {
    fn is_persistent(&self) -> bool {
        false
    }

    async fn list_tasks(&self) -> Result<Vec<Task>, String> {
        Ok(self.tasks.read().await.clone())
    }

    async fn get_task(&self, id: Uuid) -> Result<Option<Task>, String> {
        Ok(self
            .tasks
            .read()
            .await
            .iter()
            .find(|t| t.id == id)
            .cloned())
    }

    async fn create_task(&self, text: &str) -> Result<Task, String> {
        let now = now_string();
        let task = Task {
            id: Uuid::new_v4(),
            text: text.to_string(),
            completed: false,
            created_at: now.clone(),
            updated_at: now,
        };
        self.tasks.write().await.push(task.clone());
        Ok(task)
    }

    async fn update_task(&self, id: Uuid, patch: TaskPatch) -> Result<Option<Task>, String> {
        let mut tasks = self.tasks.write().await;
        let Some(task) = tasks.iter_mut().find(|t| t.id == id) else {
            return Ok(None);
        };
        if let Some(text) = patch.text {
            task.text = text;
        }
        if let Some(completed) = patch.completed {
            task.completed = completed;
        }
        task.updated_at = now_string();
        Ok(Some(task.clone()))
    }

    async fn delete_task(&self, id: Uuid) -> Result<Option<Task>, String> {
        let mut tasks = self.tasks.write().await;
        let Some(pos) = tasks.iter().position(|t| t.id == id) else {
            return Ok(None);
        };
        Ok(Some(tasks.remove(pos)))
    }

    async fn clear_tasks(&self) -> Result<usize, String> {
        let mut tasks = self.tasks.write().await;
        let removed = tasks.len();
        tasks.clear();
        Ok(removed)
    }
}
