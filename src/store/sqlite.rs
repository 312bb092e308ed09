//! SQLite-based task store.

use super::{now_string, Task, TaskPatch, TaskStore};
use async_trait::async_trait;
use rusqlite::{params, Connection, OptionalExtension};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::Mutex;
use uuid::Uuid;

const SCHEMA: &str = r#"
PRAGMA journal_mode = WAL;

CREATE TABLE IF NOT EXISTS tasks (
    id TEXT PRIMARY KEY NOT NULL,
    text TEXT NOT NULL,
    completed INTEGER NOT NULL DEFAULT 0,
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL
);
"#;

pub struct SqliteTaskStore {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteTaskStore {
    pub async fn new(data_dir: PathBuf) -> Result<Self, String> {
        let db_path = data_dir.join("tasks.db");

        tokio::fs::create_dir_all(&data_dir)
            .await
            .map_err(|e| format!("Failed to create data dir: {}", e))?;

        // Open database in blocking task
        let conn = tokio::task::spawn_blocking(move || {
            let conn = Connection::open(&db_path)
                .map_err(|e| format!("Failed to open SQLite database: {}", e))?;

            conn.execute_batch(SCHEMA)
                .map_err(|e| format!("Failed to run schema: {}", e))?;

            Ok::<_, String>(conn)
        })
        .await
        .map_err(|e| format!("Task join error: {}", e))??;

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }
}

fn row_to_task(row: &rusqlite::Row<'_>) -> rusqlite::Result<Task> {
    let id: String = row.get(0)?;
    let id = Uuid::parse_str(&id).map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(0, rusqlite::types::Type::Text, Box::new(e))
    })?;
    Ok(Task {
        id,
        text: row.get(1)?,
        completed: row.get::<_, i64>(2)? != 0,
        created_at: row.get(3)?,
        updated_at: row.get(4)?,
    })
}

#[async_trait]
impl TaskStore for SqliteTaskStore {
    fn is_persistent(&self) -> bool {
        true
    }

    async fn list_tasks(&self) -> Result<Vec<Task>, String> {
        let conn = self.conn.clone();
        tokio::task::spawn_blocking(move || {
            let conn = conn.blocking_lock();
            let mut stmt = conn
                .prepare(
                    "SELECT id, text, completed, created_at, updated_at
                     FROM tasks ORDER BY rowid",
                )
                .map_err(|e| format!("Failed to prepare list query: {}", e))?;
            let tasks = stmt
                .query_map([], row_to_task)
                .map_err(|e| format!("Failed to query tasks: {}", e))?
                .collect::<Result<Vec<_>, _>>()
                .map_err(|e| format!("Failed to read task row: {}", e))?;
            Ok(tasks)
        })
        .await
        .map_err(|e| format!("Task join error: {}", e))?
    }

    async fn get_task(&self, id: Uuid) -> Result<Option<Task>, String> {
        let conn = self.conn.clone();
        tokio::task::spawn_blocking(move || {
            let conn = conn.blocking_lock();
            conn.query_row(
                "SELECT id, text, completed, created_at, updated_at
                 FROM tasks WHERE id = ?1",
                params![id.to_string()],
                row_to_task,
            )
            .optional()
            .map_err(|e| format!("Failed to get task: {}", e))
        })
        .await
        .map_err(|e| format!("Task join error: {}", e))?
    }

    async fn create_task(&self, text: &str) -> Result<Task, String> {
        let conn = self.conn.clone();
        let now = now_string();
        let task = Task {
            id: Uuid::new_v4(),
            text: text.to_string(),
            completed: false,
            created_at: now.clone(),
            updated_at: now,
        };
        let stored = task.clone();
        tokio::task::spawn_blocking(move || {
            let conn = conn.blocking_lock();
            conn.execute(
                "INSERT INTO tasks (id, text, completed, created_at, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                params![
                    stored.id.to_string(),
                    stored.text,
                    stored.completed as i64,
                    stored.created_at,
                    stored.updated_at
                ],
            )
            .map_err(|e| format!("Failed to insert task: {}", e))?;
            Ok::<_, String>(())
        })
        .await
        .map_err(|e| format!("Task join error: {}", e))??;
        Ok(task)
    }

    async fn update_task(&self, id: Uuid, patch: TaskPatch) -> Result<Option<Task>, String> {
        let conn = self.conn.clone();
        tokio::task::spawn_blocking(move || {
            let conn = conn.blocking_lock();
            let existing = conn
                .query_row(
                    "SELECT id, text, completed, created_at, updated_at
                     FROM tasks WHERE id = ?1",
                    params![id.to_string()],
                    row_to_task,
                )
                .optional()
                .map_err(|e| format!("Failed to load task: {}", e))?;

            let Some(mut task) = existing else {
                return Ok(None);
            };

            if let Some(text) = patch.text {
                task.text = text;
            }
            if let Some(completed) = patch.completed {
                task.completed = completed;
            }
            task.updated_at = now_string();

            conn.execute(
                "UPDATE tasks SET text = ?2, completed = ?3, updated_at = ?4 WHERE id = ?1",
                params![
                    task.id.to_string(),
                    task.text,
                    task.completed as i64,
                    task.updated_at
                ],
            )
            .map_err(|e| format!("Failed to update task: {}", e))?;

            Ok(Some(task))
        })
        .await
        .map_err(|e| format!("Task join error: {}", e))?
    }

    async fn delete_task(&self, id: Uuid) -> Result<Option<Task>, String> {
        let conn = self.conn.clone();
        tokio::task::spawn_blocking(move || {
            let conn = conn.blocking_lock();
            let existing = conn
                .query_row(
                    "SELECT id, text, completed, created_at, updated_at
                     FROM tasks WHERE id = ?1",
                    params![id.to_string()],
                    row_to_task,
                )
                .optional()
                .map_err(|e| format!("Failed to load task: {}", e))?;

            let Some(task) = existing else {
                return Ok(None);
            };

            conn.execute("DELETE FROM tasks WHERE id = ?1", params![id.to_string()])
                .map_err(|e| format!("Failed to delete task: {}", e))?;

            Ok(Some(task))
        })
        .await
        .map_err(|e| format!("Task join error: {}", e))?
    }

    async fn clear_tasks(&self) -> Result<usize, String> {
        let conn = self.conn.clone();
        tokio::task::spawn_blocking(move || {
            let conn = conn.blocking_lock();
            conn.execute("DELETE FROM tasks", [])
                .map_err(|e| format!("Failed to clear tasks: {}", e))
        })
        .await
        .map_err(|e| format!("Task join error: {}", e))?
    }
}
