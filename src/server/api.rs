//! JSON endpoints over the current cycle.

use std::collections::BTreeMap;

use axum::Json;
use axum::extract::State;
use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::instrument;

use super::{AppState, ServerError};
use crate::cycle::CycleSnapshot;
use crate::queue::{AssignmentPolicy, QueueBoard};
use crate::types::{Platform, Train};

/// One recommended pairing, detached from the snapshot it came from.
#[derive(Debug, Clone, Serialize)]
pub struct RecommendationBody {
    pub rank: usize,
    pub train: Train,
    pub platform: Platform,
}

#[derive(Debug, Clone, Serialize)]
pub struct RecommendationsResponse {
    pub taken_at: DateTime<Utc>,
    pub trains: usize,
    pub available_platforms: usize,
    pub recommendations: Vec<RecommendationBody>,
}

#[derive(Debug, Clone, Serialize)]
pub struct QueuesResponse {
    pub taken_at: DateTime<Utc>,
    pub assignment: AssignmentPolicy,
    #[serde(flatten)]
    pub board: QueueBoard,
}

/// Top recommendations for the data currently on disk.
///
/// # Response
///
/// - 200 OK with a [`RecommendationsResponse`]
/// - 503 Service Unavailable if the train or platform file is missing
/// - 500 Internal Server Error for IO or parse errors
#[instrument(skip_all)]
pub async fn recommendations_handler(
    State(app_state): State<AppState>,
) -> Result<Json<RecommendationsResponse>, ServerError> {
    let snapshot = CycleSnapshot::load(app_state.store())?;

    let recommendations = snapshot
        .recommendations()
        .into_iter()
        .map(|r| RecommendationBody {
            rank: r.rank,
            train: r.train.clone(),
            platform: r.platform.clone(),
        })
        .collect();

    Ok(Json(RecommendationsResponse {
        taken_at: snapshot.taken_at,
        trains: snapshot.trains.len(),
        available_platforms: snapshot.available_platforms(),
        recommendations,
    }))
}

/// Per-platform queues under the configured assignment policy.
///
/// The server keeps no pending edits, so every queue is reported at
/// revision 0.
///
/// # Response
///
/// - 200 OK with a [`QueuesResponse`]
/// - 422 Unprocessable Entity if fixed assignment cannot place a train
/// - 503 Service Unavailable if the train or platform file is missing
#[instrument(skip_all)]
pub async fn queues_handler(
    State(app_state): State<AppState>,
) -> Result<Json<QueuesResponse>, ServerError> {
    let snapshot = CycleSnapshot::load(app_state.store())?;
    let policy = app_state.assignment();
    let board = snapshot.queues(policy.strategy(), &BTreeMap::new())?;

    Ok(Json(QueuesResponse {
        taken_at: snapshot.taken_at,
        assignment: policy,
        board,
    }))
}
