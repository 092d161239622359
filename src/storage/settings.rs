use std::sync::Arc;

use tracing::{error, info};

use super::{API_KEY_KEY, KeyValueStore};

#[derive(Clone)]
pub struct Settings {
    store: Arc<dyn KeyValueStore>,
}

impl Settings {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    /// Stored completion credential; blank when unset or unreadable.
    pub fn api_key(&self) -> String {
        match self.store.get(API_KEY_KEY) {
            Ok(value) => value.unwrap_or_default().trim().to_string(),
            Err(e) => {
                error!(error = %e, "failed to read api key");
                String::new()
            }
        }
    }

    pub fn set_api_key(&self, key: &str) -> bool {
        let key = key.trim();
        let result = if key.is_empty() {
            self.store.remove(API_KEY_KEY)
        } else {
            self.store.set(API_KEY_KEY, key)
        };
        match result {
            Ok(()) => {
                info!(configured = !key.is_empty(), "api key updated");
                true
            }
            Err(e) => {
                error!(error = %e, "failed to store api key");
                false
            }
        }
    }
}
