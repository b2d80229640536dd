//! Membership management endpoints (owner-only writes).

use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
};

use api_types::membership::{MemberUpsert, MemberView, MembersResponse, MembershipRole};

use crate::{ServerError, server::ServerState, user};

pub async fn list(
    Extension(user): Extension<user::Model>,
    State(state): State<ServerState>,
    Path(workspace_id): Path<String>,
) -> Result<Json<MembersResponse>, ServerError> {
    let members = state
        .engine
        .list_members(&workspace_id, &user.username)
        .await?
        .into_iter()
        .map(|member| MemberView {
            username: member.username,
            role: match member.role.as_str() {
                "owner" => MembershipRole::Owner,
                "editor" => MembershipRole::Editor,
                _ => MembershipRole::Viewer,
            },
        })
        .collect();

    Ok(Json(MembersResponse { members }))
}

pub async fn upsert(
    Extension(user): Extension<user::Model>,
    State(state): State<ServerState>,
    Path(workspace_id): Path<String>,
    Json(payload): Json<MemberUpsert>,
) -> Result<StatusCode, ServerError> {
    state
        .engine
        .upsert_member(
            &workspace_id,
            &payload.username,
            payload.role.as_str(),
            &user.username,
        )
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn remove(
    Extension(user): Extension<user::Model>,
    State(state): State<ServerState>,
    Path((workspace_id, username)): Path<(String, String)>,
) -> Result<StatusCode, ServerError> {
    state
        .engine
        .remove_member(&workspace_id, &username, &user.username)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}
