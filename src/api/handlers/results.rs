use axum::extract::{Path, State};
use axum::Json;
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::{LeaderboardEntry, ResultSummary, RoundResult};
use crate::AppState;

use super::ApiResponse;

/// GET /api/results — summaries, newest round first
pub async fn list(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<Vec<ResultSummary>>>, AppError> {
    let results = state.store.list_results().await?;
    Ok(ApiResponse::ok(results))
}

/// GET /api/results/:id — full leaderboard
pub async fn detail(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<RoundResult>>, AppError> {
    let result = state
        .store
        .get_result(id)
        .await?
        .ok_or_else(|| AppError::NotFound("result not found".into()))?;

    Ok(ApiResponse::ok(result))
}

/// GET /api/results/:id/entries/:username — one player's per-song points
pub async fn entry(
    State(state): State<AppState>,
    Path((id, username)): Path<(Uuid, String)>,
) -> Result<Json<ApiResponse<LeaderboardEntry>>, AppError> {
    let result = state
        .store
        .get_result(id)
        .await?
        .ok_or_else(|| AppError::NotFound("result not found".into()))?;

    let entry = result
        .entry_for(&username)
        .cloned()
        .ok_or_else(|| AppError::NotFound(format!("{username} has no entry in this result")))?;

    Ok(ApiResponse::ok(entry))
}
