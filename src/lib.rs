//! # Listify
//!
//! Personal task-list service with AI-assisted task generation.
//!
//! This library provides:
//! - An HTTP API for task CRUD plus a suggestion-generation endpoint
//! - A pluggable task store (in-memory or SQLite)
//! - A Gemini-backed suggestion engine with a tolerant JSON-array extractor
//! - An API client implementing the task-list interaction contract
//!
//! ## Request Flow
//!
//! ```text
//!   ApiClient ──► HTTP API ──► SuggestionEngine ──► Gemini
//!       │             │               │
//!       │             ▼               ▼
//!       │         TaskStore    extract_json_array
//!       └── one create per returned suggestion
//! ```
//!
//! ## Modules
//! - `api`: axum router and handlers
//! - `client`: reqwest API client with an explicit local view
//! - `llm`: provider trait and the Gemini client
//! - `store`: task records and storage backends
//! - `suggest`: instruction template and array extraction

pub mod api;
pub mod client;
pub mod config;
pub mod llm;
pub mod store;
pub mod suggest;

pub use client::{ApiClient, BatchReport, ClientError};
pub use config::Config;
pub use store::{Task, TaskPatch, TaskStore};
pub use suggest::{SuggestError, SuggestionEngine};
