//! Expense endpoints, including the owner-only approval decision.

use api_types::{
    Created,
    expense::{ExpenseDecision, ExpenseNew, ExpenseStatus, ExpenseUpdate, ExpenseView},
};
use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
};
use engine::{ExpenseAction, ExpenseNewCmd, ExpenseUpdateCmd};

use crate::{ServerError, server::ServerState, user};

fn status_view(status: &str) -> ExpenseStatus {
    match status {
        "approved" => ExpenseStatus::Approved,
        "rejected" => ExpenseStatus::Rejected,
        _ => ExpenseStatus::Pending,
    }
}

fn view(expense: engine::expenses::Model) -> ExpenseView {
    ExpenseView {
        id: expense.id,
        budget_id: expense.budget_id,
        title: expense.title,
        description: expense.description,
        amount_minor: expense.amount_minor,
        category: expense.category,
        date: expense.date,
        status: status_view(&expense.status),
        is_reimbursable: expense.is_reimbursable,
        receipt_url: expense.receipt_url,
        created_by: expense.created_by,
    }
}

pub async fn create(
    Extension(user): Extension<user::Model>,
    State(state): State<ServerState>,
    Path(workspace_id): Path<String>,
    Json(payload): Json<ExpenseNew>,
) -> Result<(StatusCode, Json<Created>), ServerError> {
    let id = state
        .engine
        .new_expense(ExpenseNewCmd {
            workspace_id,
            budget_id: payload.budget_id,
            title: payload.title,
            description: payload.description,
            amount_minor: payload.amount_minor,
            category: payload.category,
            date: payload.date,
            is_reimbursable: payload.is_reimbursable.unwrap_or(false),
            receipt_url: payload.receipt_url,
            user_id: user.username,
        })
        .await?;
    Ok((StatusCode::CREATED, Json(Created { id })))
}

pub async fn list(
    Extension(user): Extension<user::Model>,
    State(state): State<ServerState>,
    Path(workspace_id): Path<String>,
) -> Result<Json<Vec<ExpenseView>>, ServerError> {
    let expenses = state
        .engine
        .list_expenses(&workspace_id, &user.username)
        .await?;
    Ok(Json(expenses.into_iter().map(view).collect()))
}

/// Approve or reject a pending expense. Workspace owner only; the decision
/// is terminal.
pub async fn decide(
    Extension(user): Extension<user::Model>,
    State(state): State<ServerState>,
    Path(expense_id): Path<String>,
    Json(payload): Json<ExpenseDecision>,
) -> Result<Json<ExpenseView>, ServerError> {
    let action = ExpenseAction::try_from(payload.action.as_str())?;
    state
        .engine
        .decide_expense(&expense_id, action, &user.username)
        .await?;
    let expense = state.engine.expense(&expense_id, &user.username).await?;
    Ok(Json(view(expense)))
}

pub async fn update(
    Extension(user): Extension<user::Model>,
    State(state): State<ServerState>,
    Path(expense_id): Path<String>,
    Json(payload): Json<ExpenseUpdate>,
) -> Result<StatusCode, ServerError> {
    state
        .engine
        .update_expense(
            &expense_id,
            ExpenseUpdateCmd {
                title: payload.title,
                description: payload.description,
                amount_minor: payload.amount_minor,
                category: payload.category,
                date: payload.date,
                budget_id: payload.budget_id,
                is_reimbursable: payload.is_reimbursable,
                receipt_url: payload.receipt_url,
            },
            &user.username,
        )
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn remove(
    Extension(user): Extension<user::Model>,
    State(state): State<ServerState>,
    Path(expense_id): Path<String>,
) -> Result<StatusCode, ServerError> {
    state
        .engine
        .delete_expense(&expense_id, &user.username)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}
