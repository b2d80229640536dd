//! Workspace API endpoints.

use api_types::{
    Created,
    workspace::{WorkspaceNew, WorkspaceView},
};
use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
};

use crate::{ServerError, server::ServerState, user};

fn view(workspace: engine::Workspace) -> WorkspaceView {
    WorkspaceView {
        id: workspace.id,
        name: workspace.name,
        owner_id: workspace.owner_id,
        created_at: workspace.created_at,
    }
}

/// Handle requests for creating a new workspace.
pub async fn create(
    Extension(user): Extension<user::Model>,
    State(state): State<ServerState>,
    Json(payload): Json<WorkspaceNew>,
) -> Result<(StatusCode, Json<Created>), ServerError> {
    let id = state
        .engine
        .new_workspace(&payload.name, &user.username)
        .await?;
    Ok((StatusCode::CREATED, Json(Created { id })))
}

/// Handle requests for listing the caller's workspaces.
pub async fn list(
    Extension(user): Extension<user::Model>,
    State(state): State<ServerState>,
) -> Result<Json<Vec<WorkspaceView>>, ServerError> {
    let workspaces = state.engine.list_workspaces(&user.username).await?;
    Ok(Json(workspaces.into_iter().map(view).collect()))
}

pub async fn get(
    Extension(user): Extension<user::Model>,
    State(state): State<ServerState>,
    Path(workspace_id): Path<String>,
) -> Result<Json<WorkspaceView>, ServerError> {
    let workspace = state.engine.workspace(&workspace_id, &user.username).await?;
    Ok(Json(view(workspace)))
}

/// Delete a workspace and everything in it. Owner only.
pub async fn remove(
    Extension(user): Extension<user::Model>,
    State(state): State<ServerState>,
    Path(workspace_id): Path<String>,
) -> Result<StatusCode, ServerError> {
    state
        .engine
        .delete_workspace(&workspace_id, &user.username)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}
