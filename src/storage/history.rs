// src/storage/history.rs
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::error;

use super::{
    CHAT_HISTORY_KEY, KeyValueStore, load_list_or_default, read_list, save_list_logged,
    session_key,
};

/// Entries kept on disk.
pub const HISTORY_LIMIT: usize = 50;
/// Entries sent as completion context.
pub const CONTEXT_LIMIT: usize = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HistoryRole {
    User,
    Assistant,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub role: HistoryRole,
    pub content: String,
    pub timestamp: DateTime<Utc>,
}

/// Conversation context of one chat session.
#[derive(Clone)]
pub struct ConversationHistory {
    store: Arc<dyn KeyValueStore>,
    key: String,
}

impl ConversationHistory {
    pub fn new(store: Arc<dyn KeyValueStore>, session_id: &str) -> Self {
        Self { store, key: session_key(CHAT_HISTORY_KEY, session_id) }
    }

    pub fn all(&self) -> Vec<HistoryEntry> {
        load_list_or_default(self.store.as_ref(), &self.key)
    }

    /// The most recent entries, oldest first.
    pub fn context(&self) -> Vec<HistoryEntry> {
        let mut history = self.all();
        let skip = history.len().saturating_sub(CONTEXT_LIMIT);
        history.drain(..skip);
        history
    }

    /// Appends a user turn and, when present, the reply; keeps the last `HISTORY_LIMIT`.
    /// An unreadable stored history is left as is and `false` is returned.
    pub fn record_turn(&self, user_message: &str, reply: Option<&str>) -> bool {
        let mut history: Vec<HistoryEntry> = match read_list(self.store.as_ref(), &self.key) {
            Ok(history) => history,
            Err(e) => {
                error!(key = %self.key, error = %e, "history unreadable, turn not recorded");
                return false;
            }
        };
        let now = Utc::now();
        history.push(HistoryEntry {
            role: HistoryRole::User,
            content: user_message.to_string(),
            timestamp: now,
        });
        if let Some(reply) = reply.filter(|r| !r.is_empty()) {
            history.push(HistoryEntry {
                role: HistoryRole::Assistant,
                content: reply.to_string(),
                timestamp: now,
            });
        }
        let skip = history.len().saturating_sub(HISTORY_LIMIT);
        save_list_logged(self.store.as_ref(), &self.key, &history[skip..])
    }

    pub fn clear(&self) -> bool {
        match self.store.remove(&self.key) {
            Ok(()) => true,
            Err(e) => {
                error!(key = %self.key, error = %e, "failed to clear conversation history");
                false
            }
        }
    }
}
