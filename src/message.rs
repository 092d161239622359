// src/message.rs
use serde::{Deserialize, Serialize};

use crate::services::dialogue::OptionsWidget;
use crate::storage::requests::{Request, RequestStatus};

#[derive(Deserialize)]
pub struct ChatRequest {
    pub session_id: Option<String>,
    pub message: String,
}

#[derive(Serialize, Deserialize)]
pub struct ChatResponse {
    pub session_id: String,
    pub reply: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub options_widget: Option<OptionsWidget>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request: Option<Request>,
}

/// Ticked entries from the options widget.
#[derive(Deserialize)]
pub struct OptionsSelection {
    pub session_id: String,
    pub selected: Vec<String>,
}

#[derive(Deserialize)]
pub struct SessionQuery {
    pub session_id: Option<String>,
}

#[derive(Deserialize)]
pub struct StatusUpdate {
    pub status: RequestStatus,
}

#[derive(Deserialize)]
pub struct ApiKeyUpdate {
    pub api_key: String,
}

#[derive(Serialize, Deserialize)]
pub struct PendingCount {
    pub pending: usize,
}
