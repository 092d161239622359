// src/state.rs
use std::sync::Arc;

use tracing::info;

use crate::config::AppConfig;
use crate::services::assistant::ChatAssistant;
use crate::services::completion::{CompletionClient, OpenAiClient};
use crate::services::session_manager::SessionManager;
use crate::storage::{
    KeyValueStore, projects::ProjectStore, requests::RequestStore, settings::Settings,
    transcript::Transcript,
};

pub type SharedState = Arc<AppState>;

pub struct AppState {
    pub sessions: SessionManager,
    pub assistant: ChatAssistant,
    pub requests: RequestStore,
    pub projects: ProjectStore,
    pub settings: Settings,
    store: Arc<dyn KeyValueStore>,
    pub admin_key: String,
}

impl AppState {
    pub fn new(
        config: &AppConfig,
        store: Arc<dyn KeyValueStore>,
        completion: Option<Arc<dyn CompletionClient>>,
    ) -> Self {
        let settings = Settings::new(store.clone());
        if let Some(key) = &config.api_key {
            if settings.api_key().is_empty() {
                info!("seeding stored api key from environment");
                settings.set_api_key(key);
            }
        }

        let assistant = ChatAssistant::new(completion, settings.clone(), store.clone())
            .with_simulated_delay(config.simulated_delay);

        Self {
            sessions: SessionManager::new(config.session_ttl),
            assistant,
            requests: RequestStore::new(store.clone()),
            projects: ProjectStore::new(store.clone()),
            settings,
            store,
            admin_key: config.admin_key.clone(),
        }
    }

    pub fn transcript(&self, session_id: &str) -> Transcript {
        Transcript::new(self.store.clone(), session_id)
    }

    /// Production wiring: the OpenAI-compatible client from config.
    pub fn with_openai(config: &AppConfig, store: Arc<dyn KeyValueStore>) -> Self {
        let client = OpenAiClient::new(&config.completion_endpoint, &config.completion_model);
        Self::new(config, store, Some(Arc::new(client)))
    }
}
