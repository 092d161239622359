// src/services/assistant.rs
use std::{sync::Arc, time::Duration};

use rand::Rng;
use tracing::{info, warn};

use super::chatbot::{Turn, generate_reply, start_guided_flow};
use super::completion::{ChatMessage, ChatRole, CompletionClient, CompletionError, SYSTEM_PROMPT};
use super::dialogue::DialogueDraft;
use super::extractor::{detect_project_type, extract_budget_and_time, extract_customer_info};
use crate::storage::KeyValueStore;
use crate::storage::history::{ConversationHistory, HistoryEntry, HistoryRole};
use crate::storage::requests::{NewRequest, Request};
use crate::storage::settings::Settings;

/// Picks between the remote completion service and the local responder for each turn.
#[derive(Clone)]
pub struct ChatAssistant {
    completion: Option<Arc<dyn CompletionClient>>,
    settings: Settings,
    store: Arc<dyn KeyValueStore>,
    simulated_delay: bool,
}

impl ChatAssistant {
    pub fn new(
        completion: Option<Arc<dyn CompletionClient>>,
        settings: Settings,
        store: Arc<dyn KeyValueStore>,
    ) -> Self {
        Self { completion, settings, store, simulated_delay: true }
    }

    pub fn with_simulated_delay(mut self, enabled: bool) -> Self {
        self.simulated_delay = enabled;
        self
    }

    pub fn history(&self, session_id: &str) -> ConversationHistory {
        ConversationHistory::new(self.store.clone(), session_id)
    }

    pub async fn respond(
        &self,
        session_id: &str,
        draft: Option<DialogueDraft>,
        user_msg: &str,
    ) -> Turn {
        let history = self.history(session_id);
        let context = history.context();

        // an open draft always stays on the local state machine
        if draft.is_none() {
            if let Some(client) = &self.completion {
                let api_key = self.settings.api_key();
                if !api_key.is_empty() {
                    let remote = self
                        .remote_reply(client.as_ref(), &api_key, &history, user_msg, &context)
                        .await;
                    match remote {
                        Ok(turn) => return turn,
                        Err(e) => warn!(error = %e, "completion failed, using local responder"),
                    }
                }
            }
        }

        self.local_reply(&history, draft, user_msg, &context).await
    }

    async fn remote_reply(
        &self,
        client: &dyn CompletionClient,
        api_key: &str,
        history: &ConversationHistory,
        user_msg: &str,
        context: &[HistoryEntry],
    ) -> Result<Turn, CompletionError> {
        let mut messages = Vec::with_capacity(context.len() + 2);
        messages.push(ChatMessage::new(ChatRole::System, SYSTEM_PROMPT));
        messages.extend(context.iter().map(|e| {
            let role = match e.role {
                HistoryRole::User => ChatRole::User,
                HistoryRole::Assistant => ChatRole::Assistant,
            };
            ChatMessage::new(role, e.content.clone())
        }));
        messages.push(ChatMessage::new(ChatRole::User, user_msg));

        let text = client.complete(api_key, &messages).await?;
        info!(chars = text.chars().count(), "completion reply received");
        history.record_turn(user_msg, Some(&text));

        if let Some(guided) = start_guided_flow(user_msg) {
            return Ok(guided);
        }
        Ok(Turn {
            reply: text,
            request: analyze_and_create_request(user_msg),
            ..Default::default()
        })
    }

    async fn local_reply(
        &self,
        history: &ConversationHistory,
        draft: Option<DialogueDraft>,
        user_msg: &str,
        context: &[HistoryEntry],
    ) -> Turn {
        if self.simulated_delay {
            let millis = rand::thread_rng().gen_range(600..1300);
            tokio::time::sleep(Duration::from_millis(millis)).await;
        }
        let turn = generate_reply(draft, user_msg, context);
        history.record_turn(user_msg, Some(&turn.reply));
        turn
    }
}

/// Heuristic request for free-form remote conversations: any message of 20+ chars.
pub fn analyze_and_create_request(user_msg: &str) -> Option<Request> {
    if user_msg.chars().count() < 20 {
        return None;
    }
    let project = detect_project_type(user_msg);
    let extra = extract_budget_and_time(user_msg);
    let undecided = || "يحدد لاحقاً".to_string();

    Some(Request::create(NewRequest {
        kind: project.map_or_else(|| "طلب عام".to_string(), |p| p.label().to_string()),
        description: user_msg.to_string(),
        service: project.map_or_else(|| "General Service".to_string(), |p| p.service().to_string()),
        estimated_price: extra
            .price
            .or_else(|| project.map(|p| p.default_price().to_string()))
            .unwrap_or_else(undecided),
        estimated_time: extra
            .time
            .or_else(|| project.map(|p| p.default_time().to_string()))
            .unwrap_or_else(undecided),
        selected_options: None,
        customer_info: extract_customer_info(user_msg),
    }))
}
