pub mod charts;
pub mod results;
pub mod settlement;
pub mod system;

use axum::Json;
use serde::Serialize;

/// Envelope every JSON endpoint answers with.
#[derive(Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub success: bool,
    pub data: Option<T>,
    pub error: Option<String>,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn ok(data: T) -> Json<Self> {
        Json(ApiResponse {
            success: true,
            data: Some(data),
            error: None,
        })
    }
}
