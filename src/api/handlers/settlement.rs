use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::HeaderMap;
use axum::Json;
use chrono::NaiveDate;
use serde::Deserialize;
use uuid::Uuid;

use crate::api::auth::require_operator;
use crate::errors::AppError;
use crate::models::RoundResult;
use crate::AppState;

use super::ApiResponse;

// ---------------------------------------------------------------------------
// DTOs
// ---------------------------------------------------------------------------

#[derive(Debug, Default, Deserialize)]
pub struct SettleRequest {
    /// Defaults to the chart's open round.
    pub round_date: Option<NaiveDate>,
}

/// A request without a JSON body settles the open round. A JSON body that
/// does not parse is rejected rather than ignored.
fn settle_request(
    payload: Result<Json<SettleRequest>, JsonRejection>,
) -> Result<SettleRequest, AppError> {
    match payload {
        Ok(Json(request)) => Ok(request),
        Err(JsonRejection::MissingJsonContentType(_)) => Ok(SettleRequest::default()),
        Err(rejection) => Err(AppError::BadRequest(format!(
            "invalid body: {}",
            rejection.body_text()
        ))),
    }
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// POST /api/admin/charts/:id/settle — settle the chart's closed round
pub async fn settle(
    State(state): State<AppState>,
    Path(chart_id): Path<Uuid>,
    headers: HeaderMap,
    payload: Result<Json<SettleRequest>, JsonRejection>,
) -> Result<Json<ApiResponse<RoundResult>>, AppError> {
    let grant = require_operator(&headers, state.config.admin_token.as_deref())?;
    let request = settle_request(payload)?;

    tracing::info!(
        chart_id = %chart_id,
        round_date = ?request.round_date,
        "Settlement requested"
    );

    let result = state
        .settler
        .settle(&grant, chart_id, request.round_date)
        .await?;

    Ok(ApiResponse::ok(result))
}
