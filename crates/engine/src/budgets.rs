//! Budgets and the derived budget view.
//!
//! A budget caps spending for a category over a date range. The persisted
//! `spent_minor` column is a cache recomputed from approved expenses inside
//! the same transaction as any mutation that can change the sum; the view
//! below is the single place the derived numbers come from.

use chrono::{DateTime, Utc};
use sea_orm::{ActiveValue, entity::prelude::*};
use uuid::Uuid;

use crate::{expenses, expenses::ExpenseStatus, money::percentage};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "budgets")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub workspace_id: String,
    pub name: String,
    pub description: Option<String>,
    pub total_minor: i64,
    pub category: String,
    pub start_date: Date,
    pub end_date: Date,
    /// Whole percent, 0-100.
    pub alert_threshold: i32,
    /// Cached sum of approved expense amounts, kept in step transactionally.
    pub spent_minor: i64,
    pub created_at: DateTimeUtc,
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
    #[sea_orm(has_many = "super::expenses::Entity")]
    Expenses,
}

impl Related<super::workspaces::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Workspaces.def()
    }
}

impl Related<super::expenses::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Expenses.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

/// Field bag for inserting a new budget; validation happens in the ops layer.
pub struct NewBudget {
    pub workspace_id: String,
    pub name: String,
    pub description: Option<String>,
    pub total_minor: i64,
    pub category: String,
    pub start_date: Date,
    pub end_date: Date,
    pub alert_threshold: i32,
    pub created_at: DateTime<Utc>,
}

impl From<NewBudget> for ActiveModel {
    fn from(budget: NewBudget) -> Self {
        Self {
            id: ActiveValue::Set(Uuid::new_v4().to_string()),
            workspace_id: ActiveValue::Set(budget.workspace_id),
            name: ActiveValue::Set(budget.name),
            description: ActiveValue::Set(budget.description),
            total_minor: ActiveValue::Set(budget.total_minor),
            category: ActiveValue::Set(budget.category),
            start_date: ActiveValue::Set(budget.start_date),
            end_date: ActiveValue::Set(budget.end_date),
            alert_threshold: ActiveValue::Set(budget.alert_threshold),
            spent_minor: ActiveValue::Set(0),
            created_at: ActiveValue::Set(budget.created_at),
        }
    }
}

/// Derived, read-only view of a budget against its expenses.
///
/// Percentages are in hundredths of a percent (`1000` = `10.00%`).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BudgetView {
    pub budget: Model,
    pub spent_minor: i64,
    pub remaining_minor: i64,
    pub spent_pct: i64,
    pub is_over_budget: bool,
    pub is_near_limit: bool,
}

impl BudgetView {
    /// Computes the view from the budget and **all** of its linked expenses.
    ///
    /// Only approved expenses count toward the spent sum; pending and
    /// rejected ones never do. `remaining_minor` goes negative once spending
    /// exceeds the total. The near-limit flag is inclusive at the threshold
    /// and stays set while over budget.
    #[must_use]
    pub fn compute(budget: Model, linked: &[expenses::Model]) -> Self {
        let spent_minor: i64 = linked
            .iter()
            .filter(|e| ExpenseStatus::try_from(e.status.as_str()) == Ok(ExpenseStatus::Approved))
            .map(|e| e.amount_minor)
            .sum();
        Self::with_spent(budget, spent_minor)
    }

    /// Computes the view from an already-aggregated spent sum.
    #[must_use]
    pub fn with_spent(budget: Model, spent_minor: i64) -> Self {
        let remaining_minor = budget.total_minor - spent_minor;
        let spent_pct = percentage(spent_minor, budget.total_minor);
        let is_over_budget = spent_minor > budget.total_minor;
        let is_near_limit = spent_pct >= i64::from(budget.alert_threshold) * 100;
        Self {
            budget,
            spent_minor,
            remaining_minor,
            spent_pct,
            is_over_budget,
            is_near_limit,
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;

    fn budget(total_minor: i64, alert_threshold: i32) -> Model {
        Model {
            id: "b1".to_string(),
            workspace_id: "w1".to_string(),
            name: "Marketing".to_string(),
            description: None,
            total_minor,
            category: "marketing".to_string(),
            start_date: NaiveDate::from_ymd_opt(2026, 1, 1).unwrap(),
            end_date: NaiveDate::from_ymd_opt(2026, 12, 31).unwrap(),
            alert_threshold,
            spent_minor: 0,
            created_at: chrono::Utc::now(),
        }
    }

    fn expense(amount_minor: i64, status: &str) -> expenses::Model {
        expenses::Model {
            id: uuid::Uuid::new_v4().to_string(),
            workspace_id: "w1".to_string(),
            budget_id: Some("b1".to_string()),
            title: "expense".to_string(),
            description: None,
            amount_minor,
            category: "misc".to_string(),
            date: NaiveDate::from_ymd_opt(2026, 2, 1).unwrap(),
            status: status.to_string(),
            is_reimbursable: false,
            receipt_url: None,
            created_by: "alice".to_string(),
        }
    }

    #[test]
    fn only_approved_expenses_count() {
        let linked = [
            expense(100_00, "approved"),
            expense(50_00, "pending"),
            expense(30_00, "rejected"),
        ];
        let view = BudgetView::compute(budget(1000_00, 80), &linked);
        assert_eq!(view.spent_minor, 100_00);
        assert_eq!(view.remaining_minor, 900_00);
        assert_eq!(view.spent_pct, 1000); // 10.00%
        assert!(!view.is_over_budget);
        assert!(!view.is_near_limit);
    }

    #[test]
    fn over_budget_goes_negative() {
        let linked = [expense(600_00, "approved")];
        let view = BudgetView::compute(budget(500_00, 80), &linked);
        assert_eq!(view.spent_minor, 600_00);
        assert_eq!(view.remaining_minor, -100_00);
        assert!(view.is_over_budget);
        assert!(view.is_near_limit);
    }

    #[test]
    fn near_limit_boundary_is_inclusive() {
        // Exactly 80.00%.
        let view = BudgetView::with_spent(budget(1000_00, 80), 800_00);
        assert_eq!(view.spent_pct, 8000);
        assert!(view.is_near_limit);

        // 79.99%.
        let view = BudgetView::with_spent(budget(1000_00, 80), 799_90);
        assert_eq!(view.spent_pct, 7999);
        assert!(!view.is_near_limit);
    }

    #[test]
    fn zero_total_budget_never_divides_by_zero() {
        let view = BudgetView::with_spent(budget(0, 80), 123_45);
        assert_eq!(view.spent_pct, 0);
        assert!(view.is_over_budget);
    }
}
