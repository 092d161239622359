// src/storage/requests.rs
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info};

use super::{
    KeyValueStore, REQUESTS_KEY, StorageError, generate_id, load_list_or_default, read_list,
    write_list,
};
use crate::services::extractor::CustomerInfo;

/// Workflow state of a request. Values written by other tools are kept verbatim in `Other`.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum RequestStatus {
    #[default]
    Pending,
    InProgress,
    Completed,
    Cancelled,
    Other(String),
}

impl RequestStatus {
    pub fn as_str(&self) -> &str {
        match self {
            RequestStatus::Pending => "pending",
            RequestStatus::InProgress => "in_progress",
            RequestStatus::Completed => "completed",
            RequestStatus::Cancelled => "cancelled",
            RequestStatus::Other(s) => s,
        }
    }
}

impl From<String> for RequestStatus {
    fn from(value: String) -> Self {
        match value.as_str() {
            "pending" => RequestStatus::Pending,
            "in_progress" => RequestStatus::InProgress,
            "completed" => RequestStatus::Completed,
            "cancelled" => RequestStatus::Cancelled,
            _ => RequestStatus::Other(value),
        }
    }
}

impl From<RequestStatus> for String {
    fn from(status: RequestStatus) -> Self {
        match status {
            RequestStatus::Other(s) => s,
            known => known.as_str().to_string(),
        }
    }
}

/// A service inquiry produced by the chat flow.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Request {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub description: String,
    pub service: String,
    pub estimated_price: String,
    pub estimated_time: String,
    #[serde(default)]
    pub status: RequestStatus,
    pub created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub selected_options: Option<String>,
    #[serde(default)]
    pub customer_info: CustomerInfo,
}

#[derive(Debug, Clone, Default)]
pub struct NewRequest {
    pub kind: String,
    pub description: String,
    pub service: String,
    pub estimated_price: String,
    pub estimated_time: String,
    pub selected_options: Option<String>,
    pub customer_info: CustomerInfo,
}

impl Request {
    pub fn create(details: NewRequest) -> Self {
        Self {
            id: generate_id(),
            kind: details.kind,
            description: details.description,
            service: details.service,
            estimated_price: details.estimated_price,
            estimated_time: details.estimated_time,
            status: RequestStatus::Pending,
            created_at: Utc::now(),
            updated_at: None,
            selected_options: details.selected_options.filter(|s| !s.is_empty()),
            customer_info: details.customer_info,
        }
    }
}

#[derive(Clone)]
pub struct RequestStore {
    store: Arc<dyn KeyValueStore>,
}

impl RequestStore {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    pub fn all(&self) -> Vec<Request> {
        load_list_or_default(self.store.as_ref(), REQUESTS_KEY)
    }

    fn read(&self) -> Result<Vec<Request>, StorageError> {
        read_list(self.store.as_ref(), REQUESTS_KEY)
    }

    fn write(&self, requests: &[Request]) -> Result<(), StorageError> {
        write_list(self.store.as_ref(), REQUESTS_KEY, requests)
    }

    /// Appends a request. An unreadable stored list is left untouched and `false` is returned.
    pub fn save(&self, request: Request) -> bool {
        info!(id = %request.id, kind = %request.kind, "saving request");
        let result = self.read().and_then(|mut requests| {
            requests.push(request);
            self.write(&requests)
        });
        match result {
            Ok(()) => true,
            Err(e) => {
                error!(error = %e, "failed to save request");
                false
            }
        }
    }

    /// Returns `Ok(false)` when no request has this id.
    pub fn update_status(&self, id: &str, status: RequestStatus) -> Result<bool, StorageError> {
        let mut requests = self.read()?;
        let Some(request) = requests.iter_mut().find(|r| r.id == id) else {
            debug!(id, "status update for unknown request");
            return Ok(false);
        };
        request.status = status;
        request.updated_at = Some(Utc::now());
        self.write(&requests)?;
        Ok(true)
    }

    /// Returns whether anything was removed.
    pub fn delete(&self, id: &str) -> Result<bool, StorageError> {
        let requests = self.read()?;
        let before = requests.len();
        let remaining: Vec<Request> = requests.into_iter().filter(|r| r.id != id).collect();
        if remaining.len() == before {
            return Ok(false);
        }
        self.write(&remaining)?;
        Ok(true)
    }

    /// Badge counter.
    pub fn pending_count(&self) -> usize {
        self.all()
            .iter()
            .filter(|r| r.status == RequestStatus::Pending)
            .count()
    }
}
