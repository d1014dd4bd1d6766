use axum::http::HeaderMap;

use crate::errors::AppError;
use crate::settlement::OperatorGrant;

/// Header the admin console sends the operator secret in.
pub const ADMIN_SECRET_HEADER: &str = "x-admin-secret";

/// Token presented by the caller, from `x-admin-secret` or
/// `Authorization: Bearer <token>`.
fn presented_token(headers: &HeaderMap) -> Option<&str> {
    if let Some(secret) = headers
        .get(ADMIN_SECRET_HEADER)
        .and_then(|v| v.to_str().ok())
    {
        return Some(secret);
    }

    headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
}

/// Turn request headers into an operator grant.
///
/// Unlike the read API there is no dev-mode bypass: with no `ADMIN_TOKEN`
/// configured every settlement request is refused.
pub fn require_operator(
    headers: &HeaderMap,
    admin_token: Option<&str>,
) -> Result<OperatorGrant, AppError> {
    match OperatorGrant::verify(admin_token, presented_token(headers)) {
        Some(grant) => Ok(grant),
        None => {
            tracing::warn!(
                configured = admin_token.is_some(),
                presented = presented_token(headers).is_some(),
                "Rejected operator request"
            );
            Err(AppError::Unauthorized)
        }
    }
}
