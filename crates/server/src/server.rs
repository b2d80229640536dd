use axum::{
    Router,
    extract::{Request, State},
    http::StatusCode,
    middleware::{self, Next},
    response::Response,
    routing::{delete, get, patch, post},
};
use axum_extra::{
    TypedHeader,
    headers::{Authorization, authorization::Basic},
};
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter};

use std::sync::Arc;

use crate::{alerts, boards, budgets, expenses, forecasts, invoices, memberships, user, workspaces};
use engine::Engine;

#[derive(Clone)]
pub struct ServerState {
    pub engine: Arc<Engine>,
    pub db: DatabaseConnection,
}

async fn auth(
    auth_header: TypedHeader<Authorization<Basic>>,
    State(state): State<ServerState>,
    mut request: Request,
    next: Next,
) -> Result<Response, StatusCode> {
    if auth_header.username().is_empty() || auth_header.password().is_empty() {
        return Err(StatusCode::UNAUTHORIZED);
    }

    let user: Option<user::Model> = user::Entity::find()
        .filter(user::Column::Username.eq(auth_header.username()))
        .filter(user::Column::Password.eq(auth_header.password()))
        .one(&state.db)
        .await
        .map_err(|_| StatusCode::UNAUTHORIZED)?;

    let Some(user) = user else {
        return Err(StatusCode::UNAUTHORIZED);
    };

    request.extensions_mut().insert(user);
    Ok(next.run(request).await)
}

fn router(state: ServerState) -> Router {
    Router::new()
        .route(
            "/workspaces",
            post(workspaces::create).get(workspaces::list),
        )
        .route(
            "/workspaces/{workspace_id}",
            get(workspaces::get).delete(workspaces::remove),
        )
        .route(
            "/workspaces/{workspace_id}/members",
            get(memberships::list).post(memberships::upsert),
        )
        .route(
            "/workspaces/{workspace_id}/members/{username}",
            delete(memberships::remove),
        )
        .route(
            "/workspaces/{workspace_id}/boards",
            get(boards::list).post(boards::create),
        )
        .route(
            "/workspaces/{workspace_id}/boards/reorder",
            post(boards::reorder),
        )
        .route(
            "/boards/{board_id}",
            patch(boards::rename).delete(boards::remove),
        )
        .route("/boards/{board_id}/cards", post(boards::card_create))
        .route(
            "/cards/{card_id}",
            patch(boards::card_update).delete(boards::card_remove),
        )
        .route(
            "/workspaces/{workspace_id}/cards/move",
            post(boards::card_move),
        )
        .route(
            "/workspaces/{workspace_id}/budgets",
            get(budgets::list).post(budgets::create),
        )
        .route(
            "/budgets/{budget_id}",
            get(budgets::get)
                .patch(budgets::update)
                .delete(budgets::remove),
        )
        .route(
            "/workspaces/{workspace_id}/expenses",
            get(expenses::list).post(expenses::create),
        )
        .route(
            "/expenses/{expense_id}",
            patch(expenses::update).delete(expenses::remove),
        )
        .route("/expenses/{expense_id}/decide", post(expenses::decide))
        .route(
            "/workspaces/{workspace_id}/invoices",
            get(invoices::list).post(invoices::create),
        )
        .route(
            "/invoices/{invoice_id}",
            get(invoices::get).patch(invoices::update),
        )
        .route(
            "/workspaces/{workspace_id}/forecasts",
            get(forecasts::list).post(forecasts::create),
        )
        .route("/forecasts/{forecast_id}", get(forecasts::get))
        .route(
            "/workspaces/{workspace_id}/alerts",
            get(alerts::list),
        )
        .route(
            "/workspaces/{workspace_id}/alerts/evaluate",
            post(alerts::evaluate),
        )
        .route("/alerts/{alert_id}/read", post(alerts::mark_read))
        .route("/alerts/{alert_id}/resolve", post(alerts::resolve))
        .route_layer(middleware::from_fn_with_state(state.clone(), auth))
        .with_state(state)
}

pub async fn run_with_listener(
    engine: Engine,
    db: DatabaseConnection,
    listener: tokio::net::TcpListener,
) -> Result<(), std::io::Error> {
    let addr = listener.local_addr()?;
    tracing::info!("Server listening on {}", addr);

    let state = ServerState {
        engine: Arc::new(engine),
        db,
    };

    axum::serve(listener, router(state)).await
}
