//! Liveness and readiness endpoints.
//!
//! `/health` answers as long as the process is serving. `/ready` also checks
//! that the data directory holds both source files, so an orchestrator can
//! hold traffic back until the advisor has something to rank.

use axum::extract::State;
use axum::http::StatusCode;

use super::AppState;

/// Returns 200 OK with the text "OK". Does not touch the data directory.
pub async fn health_handler() -> (StatusCode, &'static str) {
    (StatusCode::OK, "OK")
}

/// Returns 200 OK once `trains.json` and `platforms.json` both exist, and
/// 503 naming the missing files otherwise.
pub async fn ready_handler(State(app_state): State<AppState>) -> (StatusCode, String) {
    let store = app_state.store();
    let missing: Vec<String> = [store.trains_path(), store.platforms_path()]
        .into_iter()
        .filter(|path| !path.is_file())
        .map(|path| path.display().to_string())
        .collect();

    if missing.is_empty() {
        (StatusCode::OK, "READY".to_string())
    } else {
        (
            StatusCode::SERVICE_UNAVAILABLE,
            format!("missing source files: {}", missing.join(", ")),
        )
    }
}
