use std::collections::HashMap;

use chrono::Utc;
use sea_orm::{
    ActiveValue, DatabaseTransaction, PaginatorTrait, QueryFilter, QueryOrder, TransactionTrait,
    Value, prelude::*, sea_query::Expr,
};

use crate::{
    BudgetNewCmd, BudgetUpdateCmd, BudgetView, EngineError, ResultEngine, alerts, budgets, expenses,
    expenses::ExpenseStatus,
    util::{normalize_optional_text, normalize_required_name, validate_date_range,
        validate_percent, require_non_negative_amount},
};

use super::{Engine, with_tx};

const DEFAULT_ALERT_THRESHOLD: i32 = 80;

impl Engine {
    /// Recomputes a budget's spent cache from its approved expenses and
    /// persists it, all within the caller's transaction.
    ///
    /// This is the only way `spent_minor` ever changes: every mutation path
    /// that can affect the sum (approval, expense edit/delete/re-link,
    /// force-detach) calls this instead of incrementing, so the cache can
    /// neither drift nor lose a concurrent update.
    pub(super) async fn recompute_budget_spent(
        &self,
        db: &DatabaseTransaction,
        budget_id: &str,
    ) -> ResultEngine<i64> {
        let linked = expenses::Entity::find()
            .filter(expenses::Column::BudgetId.eq(budget_id.to_string()))
            .all(db)
            .await?;
        let spent_minor: i64 = linked
            .iter()
            .filter(|e| ExpenseStatus::try_from(e.status.as_str()) == Ok(ExpenseStatus::Approved))
            .map(|e| e.amount_minor)
            .sum();

        let model = budgets::ActiveModel {
            id: ActiveValue::Set(budget_id.to_string()),
            spent_minor: ActiveValue::Set(spent_minor),
            ..Default::default()
        };
        model.update(db).await?;
        Ok(spent_minor)
    }

    /// Add a new budget.
    pub async fn new_budget(&self, cmd: BudgetNewCmd) -> ResultEngine<String> {
        let name = normalize_required_name(&cmd.name, "budget name")?;
        let category = normalize_required_name(&cmd.category, "budget category")?;
        let description = normalize_optional_text(cmd.description.as_deref());
        let total_minor = require_non_negative_amount(cmd.total_minor, "budget total")?;
        validate_date_range(cmd.start_date, cmd.end_date, "budget")?;
        let alert_threshold = validate_percent(
            cmd.alert_threshold.unwrap_or(DEFAULT_ALERT_THRESHOLD),
            "alert threshold",
        )?;

        with_tx!(self, |db_tx| {
            self.require_workspace_write(&db_tx, &cmd.workspace_id, &cmd.user_id)
                .await?;

            let model: budgets::ActiveModel = budgets::NewBudget {
                workspace_id: cmd.workspace_id.clone(),
                name: name.clone(),
                description: description.clone(),
                total_minor,
                category: category.clone(),
                start_date: cmd.start_date,
                end_date: cmd.end_date,
                alert_threshold,
                created_at: Utc::now(),
            }
            .into();
            let inserted = model.insert(&db_tx).await?;
            Ok(inserted.id)
        })
    }

    /// Return the derived view of one budget, recomputed from its expenses.
    pub async fn budget_view(&self, budget_id: &str, user_id: &str) -> ResultEngine<BudgetView> {
        with_tx!(self, |db_tx| {
            let budget = self.require_budget(&db_tx, budget_id).await?;
            self.require_workspace_read(&db_tx, &budget.workspace_id, user_id)
                .await?;
            let linked = expenses::Entity::find()
                .filter(expenses::Column::BudgetId.eq(budget_id.to_string()))
                .all(&db_tx)
                .await?;
            Ok(BudgetView::compute(budget, &linked))
        })
    }

    /// List the workspace's budgets as derived views.
    pub async fn list_budgets(
        &self,
        workspace_id: &str,
        user_id: &str,
    ) -> ResultEngine<Vec<BudgetView>> {
        with_tx!(self, |db_tx| {
            self.require_workspace_read(&db_tx, workspace_id, user_id)
                .await?;
            let budget_models = budgets::Entity::find()
                .filter(budgets::Column::WorkspaceId.eq(workspace_id.to_string()))
                .order_by_asc(budgets::Column::CreatedAt)
                .all(&db_tx)
                .await?;
            let expense_models = expenses::Entity::find()
                .filter(expenses::Column::WorkspaceId.eq(workspace_id.to_string()))
                .filter(expenses::Column::BudgetId.is_not_null())
                .all(&db_tx)
                .await?;

            let mut by_budget: HashMap<String, Vec<expenses::Model>> = HashMap::new();
            for expense in expense_models {
                if let Some(budget_id) = expense.budget_id.clone() {
                    by_budget.entry(budget_id).or_default().push(expense);
                }
            }

            Ok(budget_models
                .into_iter()
                .map(|budget| {
                    let linked = by_budget.remove(&budget.id).unwrap_or_default();
                    BudgetView::compute(budget, &linked)
                })
                .collect())
        })
    }

    /// Update a budget's fields; `None` fields stay untouched.
    pub async fn update_budget(
        &self,
        budget_id: &str,
        cmd: BudgetUpdateCmd,
        user_id: &str,
    ) -> ResultEngine<()> {
        let name = cmd
            .name
            .as_deref()
            .map(|n| normalize_required_name(n, "budget name"))
            .transpose()?;
        let category = cmd
            .category
            .as_deref()
            .map(|c| normalize_required_name(c, "budget category"))
            .transpose()?;
        let description = normalize_optional_text(cmd.description.as_deref());
        let total_minor = cmd
            .total_minor
            .map(|t| require_non_negative_amount(t, "budget total"))
            .transpose()?;
        let alert_threshold = cmd
            .alert_threshold
            .map(|t| validate_percent(t, "alert threshold"))
            .transpose()?;

        with_tx!(self, |db_tx| {
            let budget = self.require_budget(&db_tx, budget_id).await?;
            self.require_workspace_write(&db_tx, &budget.workspace_id, user_id)
                .await?;

            let start_date = cmd.start_date.unwrap_or(budget.start_date);
            let end_date = cmd.end_date.unwrap_or(budget.end_date);
            validate_date_range(start_date, end_date, "budget")?;

            let mut active: budgets::ActiveModel = budget.into();
            if let Some(name) = name.clone() {
                active.name = ActiveValue::Set(name);
            }
            if let Some(description) = description.clone() {
                active.description = ActiveValue::Set(Some(description));
            }
            if let Some(total_minor) = total_minor {
                active.total_minor = ActiveValue::Set(total_minor);
            }
            if let Some(category) = category.clone() {
                active.category = ActiveValue::Set(category);
            }
            active.start_date = ActiveValue::Set(start_date);
            active.end_date = ActiveValue::Set(end_date);
            if let Some(alert_threshold) = alert_threshold {
                active.alert_threshold = ActiveValue::Set(alert_threshold);
            }
            active.update(&db_tx).await?;
            Ok(())
        })
    }

    /// Delete a budget.
    ///
    /// Refused with `Conflict` while expenses are linked, unless `force` is
    /// set, in which case the expenses are detached (their `budget_id`
    /// cleared) rather than deleted.
    pub async fn delete_budget(
        &self,
        budget_id: &str,
        force: bool,
        user_id: &str,
    ) -> ResultEngine<()> {
        with_tx!(self, |db_tx| {
            let budget = self.require_budget(&db_tx, budget_id).await?;
            self.require_workspace_write(&db_tx, &budget.workspace_id, user_id)
                .await?;

            let linked_count = expenses::Entity::find()
                .filter(expenses::Column::BudgetId.eq(budget_id.to_string()))
                .count(&db_tx)
                .await?;
            if linked_count > 0 {
                if !force {
                    return Err(EngineError::Conflict(format!(
                        "budget '{}' has {linked_count} linked expenses; pass force to detach them",
                        budget.name
                    )));
                }
                expenses::Entity::update_many()
                    .col_expr(expenses::Column::BudgetId, Expr::value(Value::String(None)))
                    .filter(expenses::Column::BudgetId.eq(budget_id.to_string()))
                    .exec(&db_tx)
                    .await?;
            }

            // Alerts keyed to this budget go with it.
            alerts::Entity::delete_many()
                .filter(alerts::Column::BudgetId.eq(budget_id.to_string()))
                .exec(&db_tx)
                .await?;

            let active: budgets::ActiveModel = budget.into();
            active.delete(&db_tx).await?;
            Ok(())
        })
    }
}
