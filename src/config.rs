// src/config.rs
use std::{env, net::SocketAddr, path::PathBuf, time::Duration};

use thiserror::Error;

use crate::services::completion::{DEFAULT_ENDPOINT, DEFAULT_MODEL};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value for {name}: {value}")]
    Invalid { name: &'static str, value: String },

    #[error("{name} must be set")]
    Missing { name: &'static str },
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub bind_addr: SocketAddr,
    pub data_dir: PathBuf,
    /// Required from the environment; an empty key locks the admin routes.
    pub admin_key: String,
    pub session_ttl: Duration,
    pub simulated_delay: bool,
    pub completion_endpoint: String,
    pub completion_model: String,
    /// Seeds the stored key on first start.
    pub api_key: Option<String>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([0, 0, 0, 0], 3000)),
            data_dir: PathBuf::from("data"),
            admin_key: String::new(),
            session_ttl: Duration::from_secs(3600),
            simulated_delay: true,
            completion_endpoint: DEFAULT_ENDPOINT.to_string(),
            completion_model: DEFAULT_MODEL.to_string(),
            api_key: None,
        }
    }
}

impl AppConfig {
    /// Reads `CHAT_*`, `COMPLETION_*` and `OPENAI_API_KEY`. Unset variables keep defaults,
    /// except `CHAT_ADMIN_KEY` which has none.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mut config = Self::default();
        let get = |name: &str| lookup(name).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        if let Some(v) = get("CHAT_BIND_ADDR") {
            config.bind_addr = v
                .parse()
                .map_err(|_| ConfigError::Invalid { name: "CHAT_BIND_ADDR", value: v })?;
        }
        if let Some(v) = get("CHAT_DATA_DIR") {
            config.data_dir = PathBuf::from(v);
        }
        config.admin_key =
            get("CHAT_ADMIN_KEY").ok_or(ConfigError::Missing { name: "CHAT_ADMIN_KEY" })?;
        if let Some(v) = get("CHAT_SESSION_TTL_SECS") {
            let secs: u64 = v
                .parse()
                .map_err(|_| ConfigError::Invalid { name: "CHAT_SESSION_TTL_SECS", value: v })?;
            config.session_ttl = Duration::from_secs(secs);
        }
        if let Some(v) = get("CHAT_SIMULATED_DELAY") {
            config.simulated_delay = match v.to_ascii_lowercase().as_str() {
                "1" | "true" | "yes" | "on" => true,
                "0" | "false" | "no" | "off" => false,
                _ => return Err(ConfigError::Invalid { name: "CHAT_SIMULATED_DELAY", value: v }),
            };
        }
        if let Some(v) = get("COMPLETION_ENDPOINT") {
            config.completion_endpoint = v;
        }
        if let Some(v) = get("COMPLETION_MODEL") {
            config.completion_model = v;
        }
        config.api_key = get("OPENAI_API_KEY");

        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn unset_variables_keep_defaults() {
        let config =
            AppConfig::from_lookup(|k| (k == "CHAT_ADMIN_KEY").then(|| "s3cret".into())).unwrap();
        assert_eq!(config.admin_key, "s3cret");
        assert_eq!(config.bind_addr.port(), 3000);
        assert_eq!(config.completion_model, "gpt-3.5-turbo");
        assert!(config.api_key.is_none());
    }

    #[test]
    fn admin_key_is_required() {
        let err = AppConfig::from_lookup(|_| None).unwrap_err();
        assert!(matches!(err, ConfigError::Missing { name: "CHAT_ADMIN_KEY" }));

        let err = AppConfig::from_lookup(|k| (k == "CHAT_ADMIN_KEY").then(|| "   ".into()));
        assert!(err.is_err());
    }

    #[test]
    fn overrides_and_rejects_bad_values() {
        let vars: HashMap<&str, &str> = [
            ("CHAT_ADMIN_KEY", "s3cret"),
            ("CHAT_BIND_ADDR", "127.0.0.1:8080"),
            ("CHAT_SIMULATED_DELAY", "off"),
            ("OPENAI_API_KEY", " sk-test "),
        ]
        .into_iter()
        .collect();
        let config = AppConfig::from_lookup(|k| vars.get(k).map(|v| v.to_string())).unwrap();
        assert_eq!(config.bind_addr.port(), 8080);
        assert!(!config.simulated_delay);
        assert_eq!(config.api_key.as_deref(), Some("sk-test"));

        let err = AppConfig::from_lookup(|k| match k {
            "CHAT_ADMIN_KEY" => Some("s3cret".into()),
            "CHAT_SESSION_TTL_SECS" => Some("soon".into()),
            _ => None,
        });
        assert!(matches!(err, Err(ConfigError::Invalid { name: "CHAT_SESSION_TTL_SECS", .. })));
    }
}
