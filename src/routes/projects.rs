use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};

use crate::{
    error::AppError,
    state::SharedState,
    storage::projects::{NewProject, Project, ProjectPatch},
};

/// Public listing: active projects only.
pub async fn active_projects_handler(State(state): State<SharedState>) -> Json<Vec<Project>> {
    Json(state.projects.active())
}

pub async fn list_projects_handler(State(state): State<SharedState>) -> Json<Vec<Project>> {
    Json(state.projects.all())
}

pub async fn create_project_handler(
    State(state): State<SharedState>,
    Json(payload): Json<NewProject>,
) -> Result<(StatusCode, Json<Project>), AppError> {
    if payload.name.trim().is_empty() {
        return Err(AppError::BadRequest("Project name cannot be empty".to_string()));
    }
    Ok((StatusCode::CREATED, Json(state.projects.add(payload)?)))
}

pub async fn update_project_handler(
    State(state): State<SharedState>,
    Path(id): Path<String>,
    Json(patch): Json<ProjectPatch>,
) -> Result<Json<Project>, AppError> {
    if !state.projects.update(&id, patch)? {
        return Err(not_found(&id));
    }
    state.projects.get(&id).map(Json).ok_or_else(|| not_found(&id))
}

pub async fn delete_project_handler(
    State(state): State<SharedState>,
    Path(id): Path<String>,
) -> Result<StatusCode, AppError> {
    if state.projects.delete(&id)? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(not_found(&id))
    }
}

pub async fn toggle_project_handler(
    State(state): State<SharedState>,
    Path(id): Path<String>,
) -> Result<Json<Project>, AppError> {
    if !state.projects.toggle_status(&id)? {
        return Err(not_found(&id));
    }
    state.projects.get(&id).map(Json).ok_or_else(|| not_found(&id))
}

fn not_found(id: &str) -> AppError {
    AppError::NotFound(format!("project {id} not found"))
}
