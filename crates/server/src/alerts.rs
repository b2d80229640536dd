//! Financial alert endpoints: the on-demand rule pass plus read/resolve.

use api_types::alert::{AlertList, AlertSeverity, AlertType, AlertView, AlertsEvaluated};
use axum::{
    Extension, Json,
    extract::{Path, Query, State},
    http::StatusCode,
};

use crate::{ServerError, server::ServerState, user};

fn view(alert: engine::alerts::Model) -> AlertView {
    AlertView {
        id: alert.id,
        budget_id: alert.budget_id,
        invoice_id: alert.invoice_id,
        alert_type: match alert.alert_type.as_str() {
            "budget_exceeded" => AlertType::BudgetExceeded,
            "invoice_overdue" => AlertType::InvoiceOverdue,
            _ => AlertType::BudgetAlert,
        },
        title: alert.title,
        message: alert.message,
        severity: match alert.severity.as_str() {
            "critical" => AlertSeverity::Critical,
            "high" => AlertSeverity::High,
            "low" => AlertSeverity::Low,
            _ => AlertSeverity::Medium,
        },
        is_read: alert.is_read,
        is_resolved: alert.is_resolved,
        created_at: alert.created_at,
    }
}

/// Run every alert rule for the workspace and report how many alerts were
/// created. Re-running is safe; unresolved duplicates are never inserted.
pub async fn evaluate(
    Extension(user): Extension<user::Model>,
    State(state): State<ServerState>,
    Path(workspace_id): Path<String>,
) -> Result<Json<AlertsEvaluated>, ServerError> {
    let created = state
        .engine
        .evaluate_alerts(&workspace_id, &user.username)
        .await?;
    Ok(Json(AlertsEvaluated { created }))
}

pub async fn list(
    Extension(user): Extension<user::Model>,
    State(state): State<ServerState>,
    Path(workspace_id): Path<String>,
    Query(query): Query<AlertList>,
) -> Result<Json<Vec<AlertView>>, ServerError> {
    let alerts = state
        .engine
        .list_alerts(&workspace_id, &user.username, query.unresolved_only)
        .await?;
    Ok(Json(alerts.into_iter().map(view).collect()))
}

pub async fn mark_read(
    Extension(user): Extension<user::Model>,
    State(state): State<ServerState>,
    Path(alert_id): Path<String>,
) -> Result<StatusCode, ServerError> {
    state
        .engine
        .mark_alert_read(&alert_id, &user.username)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn resolve(
    Extension(user): Extension<user::Model>,
    State(state): State<ServerState>,
    Path(alert_id): Path<String>,
) -> Result<StatusCode, ServerError> {
    state
        .engine
        .resolve_alert(&alert_id, &user.username)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}
