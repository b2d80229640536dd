use sea_orm::{QueryFilter, QueryOrder, TransactionTrait, prelude::*};

use crate::{
    ForecastMetrics, ForecastNewCmd, ResultEngine, forecasts,
    util::{normalize_required_name, require_non_negative_amount, validate_date_range,
        validate_percent},
};

use super::{Engine, with_tx};

const DEFAULT_CONFIDENCE: i32 = 50;

impl Engine {
    /// Add a new cost forecast.
    pub async fn new_forecast(&self, cmd: ForecastNewCmd) -> ResultEngine<String> {
        let project_name = normalize_required_name(&cmd.project_name, "project name")?;
        let estimated_minor = require_non_negative_amount(cmd.estimated_minor, "estimated cost")?;
        let actual_minor = require_non_negative_amount(cmd.actual_minor, "actual cost")?;
        let forecasted_minor =
            require_non_negative_amount(cmd.forecasted_minor, "forecasted cost")?;
        validate_date_range(cmd.period_start, cmd.period_end, "forecast")?;
        let confidence =
            validate_percent(cmd.confidence.unwrap_or(DEFAULT_CONFIDENCE), "confidence")?;

        with_tx!(self, |db_tx| {
            self.require_workspace_write(&db_tx, &cmd.workspace_id, &cmd.user_id)
                .await?;

            let model: forecasts::ActiveModel = forecasts::NewForecast {
                workspace_id: cmd.workspace_id.clone(),
                project_name: project_name.clone(),
                estimated_minor,
                actual_minor,
                forecasted_minor,
                period_start: cmd.period_start,
                period_end: cmd.period_end,
                confidence,
            }
            .into();
            let inserted = model.insert(&db_tx).await?;
            Ok(inserted.id)
        })
    }

    /// Return one forecast with its derived metrics.
    pub async fn forecast_view(
        &self,
        forecast_id: &str,
        user_id: &str,
    ) -> ResultEngine<(forecasts::Model, ForecastMetrics)> {
        with_tx!(self, |db_tx| {
            let forecast = self.require_forecast(&db_tx, forecast_id).await?;
            self.require_workspace_read(&db_tx, &forecast.workspace_id, user_id)
                .await?;
            let metrics = ForecastMetrics::compute(forecast.estimated_minor, forecast.actual_minor);
            Ok((forecast, metrics))
        })
    }

    /// List the workspace's forecasts with derived metrics.
    pub async fn list_forecasts(
        &self,
        workspace_id: &str,
        user_id: &str,
    ) -> ResultEngine<Vec<(forecasts::Model, ForecastMetrics)>> {
        with_tx!(self, |db_tx| {
            self.require_workspace_read(&db_tx, workspace_id, user_id)
                .await?;
            let models = forecasts::Entity::find()
                .filter(forecasts::Column::WorkspaceId.eq(workspace_id.to_string()))
                .order_by_asc(forecasts::Column::PeriodStart)
                .all(&db_tx)
                .await?;
            Ok(models
                .into_iter()
                .map(|forecast| {
                    let metrics =
                        ForecastMetrics::compute(forecast.estimated_minor, forecast.actual_minor);
                    (forecast, metrics)
                })
                .collect())
        })
    }
}
