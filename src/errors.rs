use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

use crate::settlement::SettlementError;
use crate::store::StoreError;

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Unauthorized")]
    Unauthorized,

    #[error(transparent)]
    Settlement(#[from] SettlementError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

#[derive(Serialize)]
struct ErrorBody {
    success: bool,
    error: String,
}

fn settlement_status(e: &SettlementError) -> StatusCode {
    match e {
        SettlementError::ChartNotFound(_) => StatusCode::NOT_FOUND,
        SettlementError::AlreadySettled { .. }
        | SettlementError::SettlementInProgress { .. }
        | SettlementError::SlatesChanged { .. } => StatusCode::CONFLICT,
        SettlementError::RoundMismatch { .. } | SettlementError::RoundStillOpen { .. } => {
            StatusCode::BAD_REQUEST
        }
        SettlementError::ChartFetchFailed(_) => StatusCode::BAD_GATEWAY,
        SettlementError::MalformedChartData(_) | SettlementError::SlateScoringFailed { .. } => {
            StatusCode::UNPROCESSABLE_ENTITY
        }
        SettlementError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg.clone()),
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            AppError::Unauthorized => (StatusCode::UNAUTHORIZED, "Unauthorized".into()),
            AppError::Settlement(e) => {
                let status = settlement_status(e);
                if status.is_server_error() {
                    tracing::error!("Settlement error: {e:?}");
                    (status, "Internal server error".into())
                } else {
                    (status, e.to_string())
                }
            }
            AppError::Store(e) => {
                tracing::error!("Store error: {e:?}");
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error".into())
            }
            AppError::Internal(e) => {
                tracing::error!("Internal error: {e:?}");
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error".into())
            }
        };

        (
            status,
            Json(ErrorBody {
                success: false,
                error: message,
            }),
        )
            .into_response()
    }
}
