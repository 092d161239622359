// src/routes/mod.rs
pub mod chat;
pub mod projects;
pub mod requests;

use crate::state::SharedState;
use axum::{
    Router,
    extract::{Request, State},
    http::StatusCode,
    middleware::{self, Next},
    response::Response,
    routing::{delete, get, post, put},
};
use chat::{chat_handler, clear_history_handler, confirm_options_handler, transcript_handler};
use projects::{
    active_projects_handler, create_project_handler, delete_project_handler,
    list_projects_handler, toggle_project_handler, update_project_handler,
};
use requests::{
    delete_request_handler, list_requests_handler, pending_count_handler, set_api_key_handler,
    update_status_handler,
};
use tower_http::trace::TraceLayer;

pub fn create_router(state: SharedState) -> Router {
    let admin_routes = Router::new()
        .route("/requests", get(list_requests_handler))
        .route("/requests/pending", get(pending_count_handler))
        .route("/requests/{id}/status", put(update_status_handler))
        .route("/requests/{id}", delete(delete_request_handler))
        .route("/projects", get(list_projects_handler).post(create_project_handler))
        .route(
            "/projects/{id}",
            put(update_project_handler).delete(delete_project_handler),
        )
        .route("/projects/{id}/toggle", post(toggle_project_handler))
        .route("/api-key", put(set_api_key_handler))
        .layer(middleware::from_fn_with_state(state.clone(), auth_middleware));

    Router::new()
        .route("/chat", post(chat_handler))
        .route("/chat/options", post(confirm_options_handler))
        .route("/chat/transcript", get(transcript_handler))
        .route("/chat/history", delete(clear_history_handler))
        .route("/projects", get(active_projects_handler))
        .nest("/admin", admin_routes)
        .route("/health", get(|| async { "OK" }))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn auth_middleware(
    State(state): State<SharedState>,
    req: Request,
    next: Next,
) -> Result<Response, StatusCode> {
    // API Key check. An unset key never matches.
    let expected = state.admin_key.as_bytes();
    match req.headers().get("x-admin-key") {
        Some(val) if !expected.is_empty() && val.as_bytes() == expected => Ok(next.run(req).await),
        _ => Err(StatusCode::UNAUTHORIZED),
    }
}
