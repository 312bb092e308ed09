//! HTTP route handlers.

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Json,
    routing::{get, post},
    Router,
};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use uuid::Uuid;

use crate::config::Config;
use crate::llm::GeminiClient;
use crate::store::{create_task_store, Task, TaskStore};
use crate::suggest::{SuggestError, SuggestionEngine};

use super::types::*;

/// Shared application state.
pub struct AppState {
    pub config: Config,
    /// Task store backend
    pub store: Box<dyn TaskStore>,
    /// AI suggestion generation
    pub suggestions: SuggestionEngine,
}

/// Error tuple returned by handlers: status plus a human-readable body.
type ApiError = (StatusCode, Json<ErrorResponse>);

fn error_body(status: StatusCode, message: impl Into<String>) -> ApiError {
    (
        status,
        Json(ErrorResponse {
            message: message.into(),
        }),
    )
}

/// Map a store failure to a 500. The detail goes to the log, not the client.
fn store_error(context: &str, err: String) -> ApiError {
    tracing::error!("Store operation failed ({}): {}", context, err);
    error_body(
        StatusCode::INTERNAL_SERVER_ERROR,
        format!("Failed to {}.", context),
    )
}

/// Build the application router.
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/api/health", get(health))
        .route("/api/todos", get(list_todos))
        .route("/api/todos", post(create_todo))
        .route(
            "/api/todos/:id",
            axum::routing::patch(update_todo).delete(delete_todo),
        )
        .route("/api/todos", axum::routing::delete(clear_todos))
        .route("/api/ai/generate-todos", post(generate_todos))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Start the HTTP server.
pub async fn serve(config: Config) -> anyhow::Result<()> {
    let store = create_task_store(config.store_kind, config.data_dir.clone())
        .await
        .map_err(|e| anyhow::anyhow!("Failed to initialize task store: {}", e))?;

    let generator = Arc::new(GeminiClient::new(
        config.api_key.clone(),
        config.model.clone(),
    ));
    let suggestions = SuggestionEngine::new(generator);

    let state = Arc::new(AppState {
        config: config.clone(),
        store,
        suggestions,
    });

    let app = router(state);

    let addr = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    tracing::info!("Server listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

/// Wait for Ctrl+C or SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => tracing::error!("Failed to install signal handler: {}", e),
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received");
}

/// Health check endpoint.
async fn health(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        model: state.config.model.clone(),
        store: state.config.store_kind.as_str().to_string(),
    })
}

/// List all tasks.
async fn list_todos(State(state): State<Arc<AppState>>) -> Result<Json<Vec<Task>>, ApiError> {
    let tasks = state
        .store
        .list_tasks()
        .await
        .map_err(|e| store_error("list tasks", e))?;
    Ok(Json(tasks))
}

/// Create a new task.
async fn create_todo(
    State(state): State<Arc<AppState>>,
    Json(req): Json<CreateTaskRequest>,
) -> Result<(StatusCode, Json<Task>), ApiError> {
    if req.text.trim().is_empty() {
        return Err(error_body(
            StatusCode::BAD_REQUEST,
            "Task text must not be empty.",
        ));
    }

    let task = state
        .store
        .create_task(&req.text)
        .await
        .map_err(|e| store_error("create task", e))?;

    Ok((StatusCode::CREATED, Json(task)))
}

/// Partially update a task's text and/or completed flag.
async fn update_todo(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    Json(patch): Json<UpdateTaskRequest>,
) -> Result<Json<Task>, ApiError> {
    if let Some(text) = &patch.text {
        if text.trim().is_empty() {
            return Err(error_body(
                StatusCode::BAD_REQUEST,
                "Task text must not be empty.",
            ));
        }
    }

    let updated = state
        .store
        .update_task(id, patch)
        .await
        .map_err(|e| store_error("update task", e))?;

    updated.map(Json).ok_or_else(|| {
        error_body(StatusCode::NOT_FOUND, format!("Task {} not found.", id))
    })
}

/// Delete one task. Returns the removed record.
async fn delete_todo(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<Task>, ApiError> {
    let removed = state
        .store
        .delete_task(id)
        .await
        .map_err(|e| store_error("delete task", e))?;

    removed.map(Json).ok_or_else(|| {
        error_body(StatusCode::NOT_FOUND, format!("Task {} not found.", id))
    })
}

/// Delete all tasks.
async fn clear_todos(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ClearTasksResponse>, ApiError> {
    let deleted = state
        .store
        .clear_tasks()
        .await
        .map_err(|e| store_error("clear tasks", e))?;
    Ok(Json(ClearTasksResponse { deleted }))
}

/// Generate task suggestions from a free-text prompt.
async fn generate_todos(
    State(state): State<Arc<AppState>>,
    Json(req): Json<GenerateTodosRequest>,
) -> Result<Json<GenerateTodosResponse>, ApiError> {
    if req.prompt.trim().is_empty() {
        return Err(error_body(
            StatusCode::BAD_REQUEST,
            "Prompt must not be empty.",
        ));
    }

    match state.suggestions.generate_suggestions(&req.prompt).await {
        Ok(todos) => Ok(Json(GenerateTodosResponse { todos })),
        Err(e @ SuggestError::Unavailable(_)) => {
            tracing::warn!("Generation unavailable: {}", e);
            Err(error_body(
                StatusCode::SERVICE_UNAVAILABLE,
                "The AI model is currently busy. Please try again in a moment.",
            ))
        }
        Err(e @ SuggestError::Generation(_)) => {
            tracing::error!("Error generating to-do list: {}", e);
            Err(error_body(
                StatusCode::INTERNAL_SERVER_ERROR,
                "Failed to generate to-do list.",
            ))
        }
    }
}
