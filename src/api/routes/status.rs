//! Status log handlers.

use crate::api::AppState;
use crate::error::{Error, Result};
use crate::types::{StatusCheck, StatusCheckCreate};
use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
};

/// POST /status - Record a status check
#[utoipa::path(
    post,
    path = "/api/status",
    tag = "status",
    request_body = StatusCheckCreate,
    responses(
        (status = 200, description = "Recorded status check", body = StatusCheck),
        (status = 400, description = "Malformed body", body = crate::error::ApiError),
        (status = 503, description = "Status store not configured", body = crate::error::ApiError)
    )
)]
pub async fn create_status_check(
    State(state): State<AppState>,
    payload: std::result::Result<Json<StatusCheckCreate>, JsonRejection>,
) -> Result<Json<StatusCheck>> {
    if !state.status_log.is_configured() {
        return Err(Error::StoreUnavailable);
    }
    let Json(input) = payload.map_err(|e| Error::Validation(e.body_text()))?;

    let check = state.status_log.record(input).await?;
    tracing::debug!(id = %check.id, client = %check.client_name, "recorded status check");
    Ok(Json(check))
}

/// GET /status - List status checks
#[utoipa::path(
    get,
    path = "/api/status",
    tag = "status",
    responses(
        (status = 200, description = "Up to 1000 status checks, oldest first", body = Vec<StatusCheck>),
        (status = 503, description = "Status store not configured", body = crate::error::ApiError)
    )
)]
pub async fn list_status_checks(State(state): State<AppState>) -> Result<Json<Vec<StatusCheck>>> {
    Ok(Json(state.status_log.list().await?))
}
