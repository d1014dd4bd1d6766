use axum::extract::{Path, State};
use axum::Json;
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::ChartRound;
use crate::AppState;

use super::ApiResponse;

/// GET /api/charts — every chart with its open round
pub async fn list(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<Vec<ChartRound>>>, AppError> {
    let charts = state.store.list_charts().await?;
    Ok(ApiResponse::ok(charts))
}

/// GET /api/charts/:id
pub async fn detail(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<ChartRound>>, AppError> {
    let chart = state
        .store
        .find_chart(id)
        .await?
        .ok_or_else(|| AppError::NotFound("chart not found".into()))?;

    Ok(ApiResponse::ok(chart))
}
