use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use tracing::{info, warn};

use super::{
    error::ApiError,
    models::{CreateLedgerRequest, HealthResponse, LedgerListResponse, LedgerView},
    state::AppState,
};

/// List active ledgers (GET /ledgers)
pub async fn list_ledgers(State(state): State<AppState>) -> Result<impl IntoResponse, ApiError> {
    let ledgers = state.provider.list().inspect_err(|_| state.metrics.request_failed())?;
    Ok(Json(LedgerListResponse { ledgers }))
}

/// Create a ledger from genesis (POST /ledgers)
///
/// Returns 201 with the new ledger, 409 if the ID is taken and 400 if the
/// ID is not a valid ledger name.
pub async fn create_ledger(
    State(state): State<AppState>,
    Json(request): Json<CreateLedgerRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let metadata = state
        .provider
        .create_from_genesis(&request.ledger_id)
        .map_err(|e| {
            warn!(ledger_id = %request.ledger_id, error = %e, "Ledger creation failed");
            state.metrics.request_failed();
            ApiError::from(e)
        })?;

    state.metrics.ledger_created();
    info!(ledger_id = %request.ledger_id, "Ledger created via API");

    Ok((
        StatusCode::CREATED,
        Json(LedgerView::from_metadata(request.ledger_id, &metadata)),
    ))
}

/// Ledger metadata (GET /ledgers/{ledger_id})
pub async fn get_ledger(
    State(state): State<AppState>,
    Path(ledger_id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let metadata = state.provider.metadata(&ledger_id)?;
    Ok(Json(LedgerView::from_metadata(ledger_id, &metadata)))
}

/// Request counters (GET /operators/metrics)
pub async fn metrics(State(state): State<AppState>) -> impl IntoResponse {
    Json(state.metrics.snapshot())
}

/// Health check endpoint (GET /health)
///
/// The ledger store is reported healthy when listing succeeds.
pub async fn health(State(state): State<AppState>) -> impl IntoResponse {
    use std::collections::HashMap;

    let mut components = HashMap::new();
    components.insert("api".to_string(), "healthy".to_string());

    let ledger_status = match state.provider.list() {
        Ok(_) => "healthy",
        Err(e) => {
            warn!(error = %e, "Ledger store health check failed");
            "unhealthy"
        }
    };
    components.insert("ledger_store".to_string(), ledger_status.to_string());

    let all_healthy = components.values().all(|status| status == "healthy");
    let overall_status = if all_healthy { "healthy" } else { "unhealthy" };

    let status_code = if all_healthy {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let response = HealthResponse {
        status: overall_status.to_string(),
        components,
        version: env!("CARGO_PKG_VERSION").to_string(),
    };

    (status_code, Json(response))
}
