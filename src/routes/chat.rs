use axum::{
    Json,
    extract::{Query, State},
    http::StatusCode,
};
use tracing::{debug, info};

use crate::{
    error::AppError,
    message::{ChatRequest, ChatResponse, OptionsSelection, SessionQuery},
    services::{
        dialogue::{DraftStep, customer_info_prompt},
        session_manager::is_valid_session_id,
    },
    state::SharedState,
    storage::transcript::{Sender, TranscriptEntry},
};

pub async fn chat_handler(
    State(state): State<SharedState>,
    Json(payload): Json<ChatRequest>,
) -> Result<Json<ChatResponse>, AppError> {
    let session_id = match payload.session_id.as_deref().map(str::trim) {
        Some(s) if !s.is_empty() => state.sessions.ensure_session(checked_session(s)?).await,
        _ => state.sessions.create_session().await,
    };

    let trimmed = payload.message.trim();

    if trimmed.is_empty() {
        return Err(AppError::BadRequest("Message cannot be empty".to_string()));
    }
    let transcript = state.transcript(&session_id);
    transcript.append(Sender::User, trimmed);

    let draft = state.sessions.get_draft(&session_id).await;
    debug!(session = %session_id, step = ?draft.as_ref().map(|d| d.step), "chat turn");

    let turn = state.assistant.respond(&session_id, draft, trimmed).await;

    state.sessions.set_draft(&session_id, turn.draft.clone()).await;
    if let Some(request) = &turn.request {
        info!(session = %session_id, request = %request.id, "request created from chat");
        state.requests.save(request.clone());
    }
    transcript.append(Sender::Ai, &turn.reply);

    Ok(Json(ChatResponse {
        session_id,
        reply: turn.reply,
        options_widget: turn.options_widget,
        request: turn.request,
    }))
}

/// Confirm button of the options widget.
pub async fn confirm_options_handler(
    State(state): State<SharedState>,
    Json(payload): Json<OptionsSelection>,
) -> Result<Json<ChatResponse>, AppError> {
    let session_id = checked_session(payload.session_id.trim())?.to_string();
    let draft = state
        .sessions
        .get_draft(&session_id)
        .await
        .filter(|d| d.step == DraftStep::Options)
        .ok_or_else(|| AppError::BadRequest("No options are awaiting selection".to_string()))?;

    let selected: Vec<&str> = payload
        .selected
        .iter()
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .collect();
    if selected.is_empty() {
        return Err(AppError::BadRequest("يرجى اختيار خيار واحد على الأقل.".to_string()));
    }
    let selected_text = selected.join("، ");

    let next = draft.select_options(&selected_text);
    state.sessions.set_draft(&session_id, Some(next)).await;

    let reply = customer_info_prompt(&selected_text);
    let transcript = state.transcript(&session_id);
    transcript.append(Sender::User, &selected_text);
    transcript.append(Sender::Ai, &reply);

    Ok(Json(ChatResponse {
        session_id,
        reply,
        options_widget: None,
        request: None,
    }))
}

/// Chat window log of the caller's own session.
pub async fn transcript_handler(
    State(state): State<SharedState>,
    Query(query): Query<SessionQuery>,
) -> Result<Json<Vec<TranscriptEntry>>, AppError> {
    let session_id = required_session(&query)?;
    Ok(Json(state.transcript(session_id).load()))
}

pub async fn clear_history_handler(
    State(state): State<SharedState>,
    Query(query): Query<SessionQuery>,
) -> Result<StatusCode, AppError> {
    let session_id = required_session(&query)?;
    state.transcript(session_id).clear();
    state.assistant.history(session_id).clear();
    state.sessions.set_draft(session_id, None).await;
    info!(session = %session_id, "chat history cleared");
    Ok(StatusCode::NO_CONTENT)
}

fn checked_session(id: &str) -> Result<&str, AppError> {
    if is_valid_session_id(id) {
        Ok(id)
    } else {
        Err(AppError::BadRequest("Invalid session id".to_string()))
    }
}

fn required_session(query: &SessionQuery) -> Result<&str, AppError> {
    match query.session_id.as_deref().map(str::trim) {
        Some(s) if !s.is_empty() => checked_session(s),
        _ => Err(AppError::BadRequest("session_id is required".to_string())),
    }
}
