//! HTTP API for Listify.
//!
//! ## Endpoints
//!
//! - `GET /api/health` - Health check
//! - `GET /api/todos` - List all tasks
//! - `POST /api/todos` - Create a task
//! - `PATCH /api/todos/{id}` - Update a task's text and/or completed flag
//! - `DELETE /api/todos/{id}` - Delete one task
//! - `DELETE /api/todos` - Delete all tasks
//! - `POST /api/ai/generate-todos` - Generate task suggestions from a prompt

mod routes;
pub mod types;

pub use routes::{router, serve, AppState};
pub use types::*;
