use std::collections::HashMap;

use chrono::Utc;
use sea_orm::{
    ActiveValue, DatabaseTransaction, QueryFilter, QueryOrder, TransactionTrait, TryInsertResult,
    prelude::*, sea_query::OnConflict,
};

use crate::{
    AlertDraft, BudgetView, ResultEngine, alerts, budgets, expenses, invoice_overdue_alert,
    invoices,
};

use super::{Engine, with_tx};

impl Engine {
    /// Inserts a draft unless an unresolved alert with the same dedup key
    /// already exists. Returns whether a row was inserted.
    ///
    /// The existence check runs inside the caller's transaction; the partial
    /// unique index over unresolved rows plus on-conflict-do-nothing is the
    /// backstop against a concurrent evaluation racing the check.
    async fn ensure_alert(
        &self,
        db: &DatabaseTransaction,
        workspace_id: &str,
        draft: AlertDraft,
    ) -> ResultEngine<bool> {
        let mut existing = alerts::Entity::find()
            .filter(alerts::Column::WorkspaceId.eq(workspace_id.to_string()))
            .filter(alerts::Column::AlertType.eq(draft.alert_type.as_str().to_string()))
            .filter(alerts::Column::IsResolved.eq(false));
        existing = match (&draft.budget_id, &draft.invoice_id) {
            (Some(budget_id), _) => existing.filter(alerts::Column::BudgetId.eq(budget_id.clone())),
            (_, Some(invoice_id)) => {
                existing.filter(alerts::Column::InvoiceId.eq(invoice_id.clone()))
            }
            (None, None) => existing,
        };
        if existing.one(db).await?.is_some() {
            // Already alerted: no duplicate, no message update.
            return Ok(false);
        }

        let result = alerts::Entity::insert(draft.into_model(workspace_id))
            .on_conflict(OnConflict::new().do_nothing().to_owned())
            .do_nothing()
            .exec(db)
            .await?;
        Ok(matches!(result, TryInsertResult::Inserted(_)))
    }

    /// Runs the budget alert rules for one freshly computed view.
    pub(super) async fn ensure_budget_alerts(
        &self,
        db: &DatabaseTransaction,
        workspace_id: &str,
        view: &BudgetView,
    ) -> ResultEngine<u64> {
        let mut inserted = 0;
        for draft in crate::budget_alerts(view) {
            if self.ensure_alert(db, workspace_id, draft).await? {
                inserted += 1;
            }
        }
        Ok(inserted)
    }

    /// Evaluate every alert rule for a workspace on demand: budget thresholds
    /// and exceedances plus overdue invoices. Returns how many alerts were
    /// created; existing unresolved alerts are left alone.
    pub async fn evaluate_alerts(&self, workspace_id: &str, user_id: &str) -> ResultEngine<u64> {
        with_tx!(self, |db_tx| {
            self.require_workspace_write(&db_tx, workspace_id, user_id)
                .await?;

            let mut inserted = 0;

            let budget_models = budgets::Entity::find()
                .filter(budgets::Column::WorkspaceId.eq(workspace_id.to_string()))
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
            for budget in budget_models {
                let linked = by_budget.remove(&budget.id).unwrap_or_default();
                let view = BudgetView::compute(budget, &linked);
                inserted += self
                    .ensure_budget_alerts(&db_tx, workspace_id, &view)
                    .await?;
            }

            let today = Utc::now().date_naive();
            let invoice_models = invoices::Entity::find()
                .filter(invoices::Column::WorkspaceId.eq(workspace_id.to_string()))
                .all(&db_tx)
                .await?;
            for invoice in &invoice_models {
                if let Some(draft) = invoice_overdue_alert(invoice, today)
                    && self.ensure_alert(&db_tx, workspace_id, draft).await?
                {
                    inserted += 1;
                }
            }

            if inserted > 0 {
                tracing::debug!("alert pass on workspace {workspace_id}: {inserted} new");
            }
            Ok(inserted)
        })
    }

    /// List a workspace's alerts, newest first.
    pub async fn list_alerts(
        &self,
        workspace_id: &str,
        user_id: &str,
        unresolved_only: bool,
    ) -> ResultEngine<Vec<alerts::Model>> {
        with_tx!(self, |db_tx| {
            self.require_workspace_read(&db_tx, workspace_id, user_id)
                .await?;
            let mut query = alerts::Entity::find()
                .filter(alerts::Column::WorkspaceId.eq(workspace_id.to_string()));
            if unresolved_only {
                query = query.filter(alerts::Column::IsResolved.eq(false));
            }
            query
                .order_by_desc(alerts::Column::CreatedAt)
                .all(&db_tx)
                .await
                .map_err(Into::into)
        })
    }

    /// Mark an alert as read.
    pub async fn mark_alert_read(&self, alert_id: &str, user_id: &str) -> ResultEngine<()> {
        with_tx!(self, |db_tx| {
            let alert = self.require_alert(&db_tx, alert_id).await?;
            self.require_workspace_write(&db_tx, &alert.workspace_id, user_id)
                .await?;
            let mut active: alerts::ActiveModel = alert.into();
            active.is_read = ActiveValue::Set(true);
            active.update(&db_tx).await?;
            Ok(())
        })
    }

    /// Resolve an alert; the rule pass may raise a fresh one afterwards if
    /// the condition still holds.
    pub async fn resolve_alert(&self, alert_id: &str, user_id: &str) -> ResultEngine<()> {
        with_tx!(self, |db_tx| {
            let alert = self.require_alert(&db_tx, alert_id).await?;
            self.require_workspace_write(&db_tx, &alert.workspace_id, user_id)
                .await?;
            let mut active: alerts::ActiveModel = alert.into();
            active.is_resolved = ActiveValue::Set(true);
            active.update(&db_tx).await?;
            Ok(())
        })
    }
}
