//! Budget endpoints.
//!
//! Every response carries the derived aggregation fields (spent, remaining,
//! percentage, flags) computed from approved expenses; the stored cache is
//! never trusted on the read path.

use api_types::{
    Created,
    budget::{BudgetDelete, BudgetNew, BudgetUpdate, BudgetView},
};
use axum::{
    Extension, Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use engine::{BudgetNewCmd, BudgetUpdateCmd};

use crate::{ServerError, server::ServerState, user};

fn view(budget: engine::BudgetView) -> BudgetView {
    BudgetView {
        id: budget.budget.id,
        name: budget.budget.name,
        description: budget.budget.description,
        total_minor: budget.budget.total_minor,
        category: budget.budget.category,
        start_date: budget.budget.start_date,
        end_date: budget.budget.end_date,
        alert_threshold: budget.budget.alert_threshold,
        spent_minor: budget.spent_minor,
        remaining_minor: budget.remaining_minor,
        spent_pct: budget.spent_pct,
        is_over_budget: budget.is_over_budget,
        is_near_limit: budget.is_near_limit,
    }
}

pub async fn create(
    Extension(user): Extension<user::Model>,
    State(state): State<ServerState>,
    Path(workspace_id): Path<String>,
    Json(payload): Json<BudgetNew>,
) -> Result<(StatusCode, Json<Created>), ServerError> {
    let id = state
        .engine
        .new_budget(BudgetNewCmd {
            workspace_id,
            name: payload.name,
            description: payload.description,
            total_minor: payload.total_minor,
            category: payload.category,
            start_date: payload.start_date,
            end_date: payload.end_date,
            alert_threshold: payload.alert_threshold,
            user_id: user.username,
        })
        .await?;
    Ok((StatusCode::CREATED, Json(Created { id })))
}

pub async fn list(
    Extension(user): Extension<user::Model>,
    State(state): State<ServerState>,
    Path(workspace_id): Path<String>,
) -> Result<Json<Vec<BudgetView>>, ServerError> {
    let budgets = state
        .engine
        .list_budgets(&workspace_id, &user.username)
        .await?;
    Ok(Json(budgets.into_iter().map(view).collect()))
}

pub async fn get(
    Extension(user): Extension<user::Model>,
    State(state): State<ServerState>,
    Path(budget_id): Path<String>,
) -> Result<Json<BudgetView>, ServerError> {
    let budget = state.engine.budget_view(&budget_id, &user.username).await?;
    Ok(Json(view(budget)))
}

pub async fn update(
    Extension(user): Extension<user::Model>,
    State(state): State<ServerState>,
    Path(budget_id): Path<String>,
    Json(payload): Json<BudgetUpdate>,
) -> Result<StatusCode, ServerError> {
    state
        .engine
        .update_budget(
            &budget_id,
            BudgetUpdateCmd {
                name: payload.name,
                description: payload.description,
                total_minor: payload.total_minor,
                category: payload.category,
                start_date: payload.start_date,
                end_date: payload.end_date,
                alert_threshold: payload.alert_threshold,
            },
            &user.username,
        )
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Delete a budget. Refuses while expenses are linked unless `?force=true`,
/// which detaches them first.
pub async fn remove(
    Extension(user): Extension<user::Model>,
    State(state): State<ServerState>,
    Path(budget_id): Path<String>,
    Query(query): Query<BudgetDelete>,
) -> Result<StatusCode, ServerError> {
    state
        .engine
        .delete_budget(&budget_id, query.force, &user.username)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}
