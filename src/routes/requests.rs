use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};

use crate::{
    error::AppError,
    message::{ApiKeyUpdate, PendingCount, StatusUpdate},
    state::SharedState,
    storage::requests::Request,
};

pub async fn list_requests_handler(State(state): State<SharedState>) -> Json<Vec<Request>> {
    Json(state.requests.all())
}

pub async fn pending_count_handler(State(state): State<SharedState>) -> Json<PendingCount> {
    Json(PendingCount { pending: state.requests.pending_count() })
}

pub async fn update_status_handler(
    State(state): State<SharedState>,
    Path(id): Path<String>,
    Json(payload): Json<StatusUpdate>,
) -> Result<StatusCode, AppError> {
    if state.requests.update_status(&id, payload.status)? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(not_found(&id))
    }
}

pub async fn delete_request_handler(
    State(state): State<SharedState>,
    Path(id): Path<String>,
) -> Result<StatusCode, AppError> {
    if state.requests.delete(&id)? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(not_found(&id))
    }
}

pub async fn set_api_key_handler(
    State(state): State<SharedState>,
    Json(payload): Json<ApiKeyUpdate>,
) -> Result<StatusCode, AppError> {
    if state.settings.set_api_key(&payload.api_key) {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::Internal("failed to store api key".to_string()))
    }
}

fn not_found(id: &str) -> AppError {
    AppError::NotFound(format!("request {id} not found"))
}
