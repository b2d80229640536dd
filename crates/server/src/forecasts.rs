//! Cost forecast endpoints.

use api_types::{
    Created,
    forecast::{ForecastNew, ForecastView},
};
use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
};
use engine::{ForecastMetrics, ForecastNewCmd};

use crate::{ServerError, server::ServerState, user};

fn view(forecast: engine::forecasts::Model, metrics: ForecastMetrics) -> ForecastView {
    ForecastView {
        id: forecast.id,
        project_name: forecast.project_name,
        estimated_minor: forecast.estimated_minor,
        actual_minor: forecast.actual_minor,
        forecasted_minor: forecast.forecasted_minor,
        period_start: forecast.period_start,
        period_end: forecast.period_end,
        confidence: forecast.confidence,
        variance_pct: metrics.variance_pct,
        accuracy_pct: metrics.accuracy_pct,
        remaining_minor: metrics.remaining_minor,
        is_over_estimate: metrics.is_over_budget,
    }
}

pub async fn create(
    Extension(user): Extension<user::Model>,
    State(state): State<ServerState>,
    Path(workspace_id): Path<String>,
    Json(payload): Json<ForecastNew>,
) -> Result<(StatusCode, Json<Created>), ServerError> {
    let id = state
        .engine
        .new_forecast(ForecastNewCmd {
            workspace_id,
            project_name: payload.project_name,
            estimated_minor: payload.estimated_minor,
            actual_minor: payload.actual_minor.unwrap_or(0),
            forecasted_minor: payload.forecasted_minor,
            period_start: payload.period_start,
            period_end: payload.period_end,
            confidence: payload.confidence,
            user_id: user.username,
        })
        .await?;
    Ok((StatusCode::CREATED, Json(Created { id })))
}

pub async fn get(
    Extension(user): Extension<user::Model>,
    State(state): State<ServerState>,
    Path(forecast_id): Path<String>,
) -> Result<Json<ForecastView>, ServerError> {
    let (forecast, metrics) = state
        .engine
        .forecast_view(&forecast_id, &user.username)
        .await?;
    Ok(Json(view(forecast, metrics)))
}

pub async fn list(
    Extension(user): Extension<user::Model>,
    State(state): State<ServerState>,
    Path(workspace_id): Path<String>,
) -> Result<Json<Vec<ForecastView>>, ServerError> {
    let forecasts = state
        .engine
        .list_forecasts(&workspace_id, &user.username)
        .await?;
    Ok(Json(
        forecasts
            .into_iter()
            .map(|(forecast, metrics)| view(forecast, metrics))
            .collect(),
    ))
}
