//! Board and card endpoints.
//!
//! Positions in responses are always dense and zero-based; move endpoints
//! take list indices, not raw positions.

use api_types::{
    Created,
    board::{BoardNew, BoardRename, BoardReorder, BoardView, CardMove, CardNew, CardUpdate, CardView},
};
use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
};
use engine::CardMoveCmd;

use crate::{ServerError, server::ServerState, user};

fn card_view(card: engine::cards::Model) -> CardView {
    CardView {
        id: card.id,
        board_id: card.board_id,
        title: card.title,
        description: card.description,
        position: card.position,
    }
}

fn board_view(board: engine::BoardWithCards) -> BoardView {
    BoardView {
        id: board.board.id,
        name: board.board.name,
        position: board.board.position,
        cards: board.cards.into_iter().map(card_view).collect(),
    }
}

pub async fn create(
    Extension(user): Extension<user::Model>,
    State(state): State<ServerState>,
    Path(workspace_id): Path<String>,
    Json(payload): Json<BoardNew>,
) -> Result<(StatusCode, Json<Created>), ServerError> {
    let id = state
        .engine
        .new_board(&workspace_id, &payload.name, &user.username)
        .await?;
    Ok((StatusCode::CREATED, Json(Created { id })))
}

pub async fn list(
    Extension(user): Extension<user::Model>,
    State(state): State<ServerState>,
    Path(workspace_id): Path<String>,
) -> Result<Json<Vec<BoardView>>, ServerError> {
    let boards = state.engine.boards(&workspace_id, &user.username).await?;
    Ok(Json(boards.into_iter().map(board_view).collect()))
}

pub async fn rename(
    Extension(user): Extension<user::Model>,
    State(state): State<ServerState>,
    Path(board_id): Path<String>,
    Json(payload): Json<BoardRename>,
) -> Result<StatusCode, ServerError> {
    state
        .engine
        .rename_board(&board_id, &payload.name, &user.username)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn remove(
    Extension(user): Extension<user::Model>,
    State(state): State<ServerState>,
    Path(board_id): Path<String>,
) -> Result<StatusCode, ServerError> {
    state.engine.delete_board(&board_id, &user.username).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn reorder(
    Extension(user): Extension<user::Model>,
    State(state): State<ServerState>,
    Path(workspace_id): Path<String>,
    Json(payload): Json<BoardReorder>,
) -> Result<StatusCode, ServerError> {
    state
        .engine
        .reorder_boards(
            &workspace_id,
            payload.source_index,
            payload.dest_index,
            &user.username,
        )
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn card_create(
    Extension(user): Extension<user::Model>,
    State(state): State<ServerState>,
    Path(board_id): Path<String>,
    Json(payload): Json<CardNew>,
) -> Result<(StatusCode, Json<Created>), ServerError> {
    let id = state
        .engine
        .new_card(
            &board_id,
            &payload.title,
            payload.description.as_deref(),
            &user.username,
        )
        .await?;
    Ok((StatusCode::CREATED, Json(Created { id })))
}

pub async fn card_update(
    Extension(user): Extension<user::Model>,
    State(state): State<ServerState>,
    Path(card_id): Path<String>,
    Json(payload): Json<CardUpdate>,
) -> Result<StatusCode, ServerError> {
    state
        .engine
        .update_card(
            &card_id,
            payload.title.as_deref(),
            payload.description.as_deref(),
            &user.username,
        )
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn card_remove(
    Extension(user): Extension<user::Model>,
    State(state): State<ServerState>,
    Path(card_id): Path<String>,
) -> Result<StatusCode, ServerError> {
    state.engine.delete_card(&card_id, &user.username).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Move a card within a board or across boards.
///
/// Takes list indices rather than card ids; with equal source and dest
/// boards this is a plain reorder.
pub async fn card_move(
    Extension(user): Extension<user::Model>,
    State(state): State<ServerState>,
    Path(workspace_id): Path<String>,
    Json(payload): Json<CardMove>,
) -> Result<StatusCode, ServerError> {
    state
        .engine
        .move_card(CardMoveCmd {
            workspace_id,
            source_board_id: payload.source_board_id,
            dest_board_id: payload.dest_board_id,
            source_index: payload.source_index,
            dest_index: payload.dest_index,
            user_id: user.username,
        })
        .await?;
    Ok(StatusCode::NO_CONTENT)
}
