//! Cost forecasts and their derived accuracy metrics.

use sea_orm::{ActiveValue, entity::prelude::*};
use uuid::Uuid;

use crate::money::percentage;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "cost_forecasts")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub workspace_id: String,
    pub project_name: String,
    pub estimated_minor: i64,
    pub actual_minor: i64,
    pub forecasted_minor: i64,
    pub period_start: Date,
    pub period_end: Date,
    /// Whole percent, 0-100.
    pub confidence: i32,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::workspaces::Entity",
        from = "Column::WorkspaceId",
        to = "super::workspaces::Column::Id",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    Workspaces,
}

impl Related<super::workspaces::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Workspaces.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

/// Field bag for inserting a new forecast; validation happens in the ops layer.
pub struct NewForecast {
    pub workspace_id: String,
    pub project_name: String,
    pub estimated_minor: i64,
    pub actual_minor: i64,
    pub forecasted_minor: i64,
    pub period_start: Date,
    pub period_end: Date,
    pub confidence: i32,
}

impl From<NewForecast> for ActiveModel {
    fn from(forecast: NewForecast) -> Self {
        Self {
            id: ActiveValue::Set(Uuid::new_v4().to_string()),
            workspace_id: ActiveValue::Set(forecast.workspace_id),
            project_name: ActiveValue::Set(forecast.project_name),
            estimated_minor: ActiveValue::Set(forecast.estimated_minor),
            actual_minor: ActiveValue::Set(forecast.actual_minor),
            forecasted_minor: ActiveValue::Set(forecast.forecasted_minor),
            period_start: ActiveValue::Set(forecast.period_start),
            period_end: ActiveValue::Set(forecast.period_end),
            confidence: ActiveValue::Set(forecast.confidence),
        }
    }
}

/// Derived metrics for a forecast.
///
/// `variance_pct` and `accuracy_pct` are in hundredths of a percent.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ForecastMetrics {
    pub variance_pct: i64,
    pub accuracy_pct: i64,
    pub is_over_budget: bool,
    pub remaining_minor: i64,
}

impl ForecastMetrics {
    /// Computes the metrics from estimated and actual cost.
    ///
    /// Variance is `(actual - estimated) / estimated`, signed, and defined as
    /// `0` while nothing has been spent yet. Accuracy floors at `0` instead
    /// of going negative for wildly missed estimates.
    #[must_use]
    pub fn compute(estimated_minor: i64, actual_minor: i64) -> Self {
        let variance_pct = if actual_minor > 0 {
            percentage(actual_minor - estimated_minor, estimated_minor)
        } else {
            0
        };
        let accuracy_pct = (10_000 - variance_pct.abs()).max(0);
        Self {
            variance_pct,
            accuracy_pct,
            is_over_budget: actual_minor > estimated_minor,
            remaining_minor: estimated_minor - actual_minor,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ten_percent_over() {
        let metrics = ForecastMetrics::compute(1000_00, 1100_00);
        assert_eq!(metrics.variance_pct, 1000); // +10.00%
        assert_eq!(metrics.accuracy_pct, 9000); // 90.00%
        assert!(metrics.is_over_budget);
        assert_eq!(metrics.remaining_minor, -100_00);
    }

    #[test]
    fn under_estimate_gives_negative_variance() {
        let metrics = ForecastMetrics::compute(1000_00, 900_00);
        assert_eq!(metrics.variance_pct, -1000);
        assert_eq!(metrics.accuracy_pct, 9000);
        assert!(!metrics.is_over_budget);
        assert_eq!(metrics.remaining_minor, 100_00);
    }

    #[test]
    fn no_spend_yet_is_neutral() {
        let metrics = ForecastMetrics::compute(1000_00, 0);
        assert_eq!(metrics.variance_pct, 0);
        assert_eq!(metrics.accuracy_pct, 10_000);
        assert!(!metrics.is_over_budget);
        assert_eq!(metrics.remaining_minor, 1000_00);
    }

    #[test]
    fn accuracy_floors_at_zero() {
        // Actual is 3x the estimate: variance 200%, accuracy 0 not -100.
        let metrics = ForecastMetrics::compute(100_00, 300_00);
        assert_eq!(metrics.variance_pct, 20_000);
        assert_eq!(metrics.accuracy_pct, 0);
    }

    #[test]
    fn zero_estimate_never_divides_by_zero() {
        let metrics = ForecastMetrics::compute(0, 50_00);
        assert_eq!(metrics.variance_pct, 0);
        assert!(metrics.is_over_budget);
        assert_eq!(metrics.remaining_minor, -50_00);
    }
}
