//! Read-only HTTP surface for the platform advisor.
//!
//! Every request loads a fresh [`CycleSnapshot`](crate::cycle::CycleSnapshot)
//! from the JSON store; nothing here writes to it.
//!
//! # Endpoints
//!
//! - `GET /health` - Returns 200 if server is running
//! - `GET /ready` - Returns 200 once both source files are present
//! - `GET /api/v1/recommendations` - Top recommendations for the current data
//! - `GET /api/v1/queues` - Per-platform queues under the configured policy

use std::path::Path;
use std::sync::Arc;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;
use tracing::error;

use crate::queue::{AssignmentError, AssignmentPolicy};
use crate::store::{JsonDirStore, StoreError};

pub mod api;
pub mod health;

pub use api::{queues_handler, recommendations_handler};
pub use health::{health_handler, ready_handler};

/// Shared application state, handed to handlers through axum's `State`
/// extractor.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    store: JsonDirStore,
    assignment: AssignmentPolicy,
}

impl AppState {
    pub fn new(store: JsonDirStore, assignment: AssignmentPolicy) -> Self {
        AppState {
            inner: Arc::new(AppStateInner { store, assignment }),
        }
    }

    pub fn store(&self) -> &JsonDirStore {
        &self.inner.store
    }

    pub fn data_dir(&self) -> &Path {
        self.inner.store.dir()
    }

    pub fn assignment(&self) -> AssignmentPolicy {
        self.inner.assignment
    }
}

/// Errors surfaced by API handlers.
#[derive(Debug, Error)]
pub enum ServerError {
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Assignment(#[from] AssignmentError),
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let status = match &self {
            ServerError::Store(StoreError::MissingSource { .. }) => StatusCode::SERVICE_UNAVAILABLE,
            ServerError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ServerError::Assignment(_) => StatusCode::UNPROCESSABLE_ENTITY,
        };
        error!(status = status.as_u16(), error = %self, "Request failed");

        (status, self.to_string()).into_response()
    }
}

/// Builds the axum Router with all endpoints.
pub fn build_router(app_state: AppState) -> axum::Router {
    use axum::routing::get;

    axum::Router::new()
        .route("/api/v1/recommendations", get(recommendations_handler))
        .route("/api/v1/queues", get(queues_handler))
        .route("/health", get(health_handler))
        .route("/ready", get(ready_handler))
        .with_state(app_state)
}
