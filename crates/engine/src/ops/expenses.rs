use sea_orm::{ActiveValue, QueryFilter, QueryOrder, TransactionTrait, prelude::*};

use crate::{
    BudgetView, EngineError, ExpenseAction, ExpenseNewCmd, ExpenseStatus, ExpenseUpdateCmd,
    ResultEngine, expenses,
    util::{normalize_optional_text, normalize_required_name, require_positive_amount},
};

use super::{Engine, with_tx};

impl Engine {
    /// Add a new expense; it always starts `pending` and never touches any
    /// budget sum until approved.
    pub async fn new_expense(&self, cmd: ExpenseNewCmd) -> ResultEngine<String> {
        let title = normalize_required_name(&cmd.title, "expense title")?;
        let category = normalize_required_name(&cmd.category, "expense category")?;
        let description = normalize_optional_text(cmd.description.as_deref());
        let receipt_url = normalize_optional_text(cmd.receipt_url.as_deref());
        let amount_minor = require_positive_amount(cmd.amount_minor, "expense amount")?;

        with_tx!(self, |db_tx| {
            self.require_workspace_write(&db_tx, &cmd.workspace_id, &cmd.user_id)
                .await?;
            if let Some(budget_id) = cmd.budget_id.as_deref() {
                let budget = self.require_budget(&db_tx, budget_id).await?;
                if budget.workspace_id != cmd.workspace_id {
                    return Err(EngineError::KeyNotFound("budget not exists".to_string()));
                }
            }

            let model: expenses::ActiveModel = expenses::NewExpense {
                workspace_id: cmd.workspace_id.clone(),
                budget_id: cmd.budget_id.clone(),
                title: title.clone(),
                description: description.clone(),
                amount_minor,
                category: category.clone(),
                date: cmd.date,
                is_reimbursable: cmd.is_reimbursable,
                receipt_url: receipt_url.clone(),
                created_by: cmd.user_id.clone(),
            }
            .into();
            let inserted = model.insert(&db_tx).await?;
            Ok(inserted.id)
        })
    }

    /// Return one expense.
    pub async fn expense(&self, expense_id: &str, user_id: &str) -> ResultEngine<expenses::Model> {
        with_tx!(self, |db_tx| {
            let expense = self.require_expense(&db_tx, expense_id).await?;
            self.require_workspace_read(&db_tx, &expense.workspace_id, user_id)
                .await?;
            Ok(expense)
        })
    }

    /// List the workspace's expenses, newest first.
    pub async fn list_expenses(
        &self,
        workspace_id: &str,
        user_id: &str,
    ) -> ResultEngine<Vec<expenses::Model>> {
        with_tx!(self, |db_tx| {
            self.require_workspace_read(&db_tx, workspace_id, user_id)
                .await?;
            expenses::Entity::find()
                .filter(expenses::Column::WorkspaceId.eq(workspace_id.to_string()))
                .order_by_desc(expenses::Column::Date)
                .all(&db_tx)
                .await
                .map_err(Into::into)
        })
    }

    /// Decide a pending expense. Workspace owner only.
    ///
    /// Approval recomputes the linked budget's spent cache and re-runs the
    /// budget alert rules inside the same transaction, so the threshold
    /// breach becomes visible atomically with the approval itself.
    pub async fn decide_expense(
        &self,
        expense_id: &str,
        action: ExpenseAction,
        user_id: &str,
    ) -> ResultEngine<ExpenseStatus> {
        with_tx!(self, |db_tx| {
            let expense = self.require_expense(&db_tx, expense_id).await?;
            self.require_workspace_owner(&db_tx, &expense.workspace_id, user_id)
                .await?;

            let current = ExpenseStatus::try_from(expense.status.as_str())?;
            let next = current.decide(action)?;

            let workspace_id = expense.workspace_id.clone();
            let budget_id = expense.budget_id.clone();
            let mut active: expenses::ActiveModel = expense.into();
            active.status = ActiveValue::Set(next.as_str().to_string());
            active.update(&db_tx).await?;

            if next == ExpenseStatus::Approved
                && let Some(budget_id) = budget_id
            {
                let spent_minor = self.recompute_budget_spent(&db_tx, &budget_id).await?;
                let budget = self.require_budget(&db_tx, &budget_id).await?;
                let view = BudgetView::with_spent(budget, spent_minor);
                self.ensure_budget_alerts(&db_tx, &workspace_id, &view)
                    .await?;
            }

            Ok(next)
        })
    }

    /// Update an expense; `None` fields stay untouched.
    ///
    /// Any change that can shift a budget sum (amount, link) recomputes the
    /// affected budgets in the same transaction.
    pub async fn update_expense(
        &self,
        expense_id: &str,
        cmd: ExpenseUpdateCmd,
        user_id: &str,
    ) -> ResultEngine<()> {
        let title = cmd
            .title
            .as_deref()
            .map(|t| normalize_required_name(t, "expense title"))
            .transpose()?;
        let category = cmd
            .category
            .as_deref()
            .map(|c| normalize_required_name(c, "expense category"))
            .transpose()?;
        let description = normalize_optional_text(cmd.description.as_deref());
        let amount_minor = cmd
            .amount_minor
            .map(|a| require_positive_amount(a, "expense amount"))
            .transpose()?;
        let receipt_url = normalize_optional_text(cmd.receipt_url.as_deref());

        with_tx!(self, |db_tx| {
            let expense = self.require_expense(&db_tx, expense_id).await?;
            self.require_workspace_write(&db_tx, &expense.workspace_id, user_id)
                .await?;

            let old_budget_id = expense.budget_id.clone();
            let new_budget_id = match cmd.budget_id.clone() {
                None => old_budget_id.clone(),
                Some(None) => None,
                Some(Some(budget_id)) => {
                    let budget = self.require_budget(&db_tx, &budget_id).await?;
                    if budget.workspace_id != expense.workspace_id {
                        return Err(EngineError::KeyNotFound("budget not exists".to_string()));
                    }
                    Some(budget_id)
                }
            };

            let mut active: expenses::ActiveModel = expense.into();
            if let Some(title) = title.clone() {
                active.title = ActiveValue::Set(title);
            }
            if let Some(description) = description.clone() {
                active.description = ActiveValue::Set(Some(description));
            }
            if let Some(amount_minor) = amount_minor {
                active.amount_minor = ActiveValue::Set(amount_minor);
            }
            if let Some(category) = category.clone() {
                active.category = ActiveValue::Set(category);
            }
            if let Some(date) = cmd.date {
                active.date = ActiveValue::Set(date);
            }
            if let Some(is_reimbursable) = cmd.is_reimbursable {
                active.is_reimbursable = ActiveValue::Set(is_reimbursable);
            }
            if let Some(receipt_url) = receipt_url.clone() {
                active.receipt_url = ActiveValue::Set(Some(receipt_url));
            }
            active.budget_id = ActiveValue::Set(new_budget_id.clone());
            active.update(&db_tx).await?;

            for budget_id in [old_budget_id, new_budget_id].into_iter().flatten() {
                self.recompute_budget_spent(&db_tx, &budget_id).await?;
            }

            Ok(())
        })
    }

    /// Delete an expense, keeping the linked budget's cache in step.
    pub async fn delete_expense(&self, expense_id: &str, user_id: &str) -> ResultEngine<()> {
        with_tx!(self, |db_tx| {
            let expense = self.require_expense(&db_tx, expense_id).await?;
            self.require_workspace_write(&db_tx, &expense.workspace_id, user_id)
                .await?;

            let budget_id = expense.budget_id.clone();
            let active: expenses::ActiveModel = expense.into();
            active.delete(&db_tx).await?;

            if let Some(budget_id) = budget_id {
                self.recompute_budget_spent(&db_tx, &budget_id).await?;
            }
            Ok(())
        })
    }

    /// Return the stored spent cache for a budget; test and diagnostics aid.
    pub async fn budget_spent_cache(&self, budget_id: &str, user_id: &str) -> ResultEngine<i64> {
        with_tx!(self, |db_tx| {
            let budget = self.require_budget(&db_tx, budget_id).await?;
            self.require_workspace_read(&db_tx, &budget.workspace_id, user_id)
                .await?;
            Ok(budget.spent_minor)
        })
    }
}
