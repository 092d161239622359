// src/storage/transcript.rs
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::error;

use super::{
    CHAT_MESSAGES_KEY, KeyValueStore, load_list_or_default, read_list, save_list_logged,
    session_key,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sender {
    User,
    Ai,
}

/// A message as it was shown in the chat window.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TranscriptEntry {
    pub sender: Sender,
    pub content: String,
}

/// Chat window log of one session.
#[derive(Clone)]
pub struct Transcript {
    store: Arc<dyn KeyValueStore>,
    key: String,
}

impl Transcript {
    pub fn new(store: Arc<dyn KeyValueStore>, session_id: &str) -> Self {
        Self { store, key: session_key(CHAT_MESSAGES_KEY, session_id) }
    }

    pub fn load(&self) -> Vec<TranscriptEntry> {
        load_list_or_default(self.store.as_ref(), &self.key)
    }

    pub fn append(&self, sender: Sender, content: impl Into<String>) -> bool {
        let mut entries: Vec<TranscriptEntry> = match read_list(self.store.as_ref(), &self.key) {
            Ok(entries) => entries,
            Err(e) => {
                error!(key = %self.key, error = %e, "transcript unreadable, message not appended");
                return false;
            }
        };
        entries.push(TranscriptEntry { sender, content: content.into() });
        save_list_logged(self.store.as_ref(), &self.key, &entries)
    }

    pub fn clear(&self) -> bool {
        self.store
            .remove(&self.key)
            .map_err(|e| error!(key = %self.key, error = %e, "failed to clear transcript"))
            .is_ok()
    }
}
