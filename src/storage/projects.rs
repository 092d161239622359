// src/storage/projects.rs
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;

use super::{
    KeyValueStore, PROJECTS_KEY, StorageError, generate_id, load_list_or_default, read_list,
    save_list_logged, write_list,
};

/// A portfolio entry showcased on the site.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub url: String,
    pub display_type: String,
    pub is_active: bool,
    pub project_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_name: Option<String>,
    /// Base64 file body, kept for older single-file entries.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_content: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub files: Option<serde_json::Value>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewProject {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub url: String,
    pub display_type: Option<String>,
    pub is_active: Option<bool>,
    pub project_type: Option<String>,
    pub file_name: Option<String>,
    pub file_content: Option<String>,
    pub files: Option<serde_json::Value>,
}

/// Partial update; absent fields keep their stored value.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectPatch {
    pub name: Option<String>,
    pub description: Option<String>,
    pub url: Option<String>,
    pub display_type: Option<String>,
    pub is_active: Option<bool>,
    pub project_type: Option<String>,
    pub file_name: Option<String>,
    pub file_content: Option<String>,
    pub files: Option<serde_json::Value>,
}

impl ProjectPatch {
    fn apply(self, project: &mut Project) {
        if let Some(v) = self.name {
            project.name = v;
        }
        if let Some(v) = self.description {
            project.description = v;
        }
        if let Some(v) = self.url {
            project.url = v;
        }
        if let Some(v) = self.display_type {
            project.display_type = v;
        }
        if let Some(v) = self.is_active {
            project.is_active = v;
        }
        if let Some(v) = self.project_type {
            project.project_type = v;
        }
        if self.file_name.is_some() {
            project.file_name = self.file_name;
        }
        if self.file_content.is_some() {
            project.file_content = self.file_content;
        }
        if self.files.is_some() {
            project.files = self.files;
        }
    }
}

#[derive(Clone)]
pub struct ProjectStore {
    store: Arc<dyn KeyValueStore>,
}

impl ProjectStore {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    pub fn all(&self) -> Vec<Project> {
        load_list_or_default(self.store.as_ref(), PROJECTS_KEY)
    }

    pub fn save_all(&self, projects: &[Project]) -> bool {
        save_list_logged(self.store.as_ref(), PROJECTS_KEY, projects)
    }

    pub fn active(&self) -> Vec<Project> {
        self.all().into_iter().filter(|p| p.is_active).collect()
    }

    pub fn get(&self, id: &str) -> Option<Project> {
        self.all().into_iter().find(|p| p.id == id)
    }

    fn read(&self) -> Result<Vec<Project>, StorageError> {
        read_list(self.store.as_ref(), PROJECTS_KEY)
    }

    fn write(&self, projects: &[Project]) -> Result<(), StorageError> {
        write_list(self.store.as_ref(), PROJECTS_KEY, projects)
    }

    pub fn add(&self, input: NewProject) -> Result<Project, StorageError> {
        let mut projects = self.read()?;
        let now = Utc::now();
        let project_type = input.project_type.unwrap_or_else(|| "url".to_string());
        let is_file = project_type == "file";
        let project = Project {
            id: generate_id(),
            name: input.name,
            description: input.description,
            url: input.url,
            display_type: input.display_type.unwrap_or_else(|| "preview".to_string()),
            is_active: input.is_active.unwrap_or(true),
            project_type,
            file_name: input.file_name.filter(|_| is_file),
            file_content: input.file_content.filter(|_| is_file),
            files: input.files.filter(|_| is_file),
            created_at: now,
            updated_at: now,
        };

        projects.push(project.clone());
        self.write(&projects)?;
        info!(id = %project.id, name = %project.name, "project added");
        Ok(project)
    }

    /// Returns `Ok(false)` when no project has this id.
    pub fn update(&self, id: &str, patch: ProjectPatch) -> Result<bool, StorageError> {
        let mut projects = self.read()?;
        let Some(project) = projects.iter_mut().find(|p| p.id == id) else {
            return Ok(false);
        };
        patch.apply(project);
        project.updated_at = Utc::now();
        self.write(&projects)?;
        Ok(true)
    }

    /// Returns whether anything was removed.
    pub fn delete(&self, id: &str) -> Result<bool, StorageError> {
        let projects = self.read()?;
        let before = projects.len();
        let remaining: Vec<Project> = projects.into_iter().filter(|p| p.id != id).collect();
        if remaining.len() == before {
            return Ok(false);
        }
        self.write(&remaining)?;
        Ok(true)
    }

    pub fn toggle_status(&self, id: &str) -> Result<bool, StorageError> {
        let Some(project) = self.read()?.into_iter().find(|p| p.id == id) else {
            return Ok(false);
        };
        self.update(
            id,
            ProjectPatch {
                is_active: Some(!project.is_active),
                ..Default::default()
            },
        )
    }
}
