use sea_orm::{
    ActiveValue, QueryFilter, QueryOrder, Statement, TransactionTrait, prelude::*, sea_query::Expr,
};

use crate::{
    EngineError, ResultEngine, Workspace, memberships, util::normalize_required_name, workspaces,
};

use super::{Engine, with_tx};

impl Engine {
    /// Add a new workspace owned by `user_id`.
    ///
    /// The owner also gets an explicit `owner` membership row so member
    /// listings are uniform.
    pub async fn new_workspace(&self, name: &str, user_id: &str) -> ResultEngine<String> {
        let name = normalize_required_name(name, "workspace name")?;

        let workspace = Workspace::new(name.clone(), user_id);
        let workspace_id = workspace.id.clone();
        let workspace_entry: workspaces::ActiveModel = (&workspace).into();
        with_tx!(self, |db_tx| {
            let exists = workspaces::Entity::find()
                .filter(workspaces::Column::OwnerId.eq(user_id.to_string()))
                .filter(Expr::cust("LOWER(name)").eq(name.to_lowercase()))
                .one(&db_tx)
                .await?
                .is_some();
            if exists {
                return Err(EngineError::Conflict(format!(
                    "workspace '{name}' already exists"
                )));
            }

            workspace_entry.insert(&db_tx).await?;

            let owner_membership = memberships::ActiveModel {
                workspace_id: ActiveValue::Set(workspace_id.clone()),
                user_id: ActiveValue::Set(user_id.to_string()),
                role: ActiveValue::Set("owner".to_string()),
            };
            owner_membership.insert(&db_tx).await?;

            Ok(workspace_id.clone())
        })
    }

    /// Return a workspace snapshot, if the user can read it.
    pub async fn workspace(&self, workspace_id: &str, user_id: &str) -> ResultEngine<Workspace> {
        with_tx!(self, |db_tx| {
            let model = self
                .require_workspace_read(&db_tx, workspace_id, user_id)
                .await?;
            Ok(Workspace::from(model))
        })
    }

    /// List every workspace the user owns or is a member of.
    pub async fn list_workspaces(&self, user_id: &str) -> ResultEngine<Vec<Workspace>> {
        with_tx!(self, |db_tx| {
            let member_ids: Vec<String> = memberships::Entity::find()
                .filter(memberships::Column::UserId.eq(user_id.to_string()))
                .all(&db_tx)
                .await?
                .into_iter()
                .map(|m| m.workspace_id)
                .collect();

            let models = workspaces::Entity::find()
                .filter(
                    workspaces::Column::OwnerId
                        .eq(user_id.to_string())
                        .or(workspaces::Column::Id.is_in(member_ids)),
                )
                .order_by_asc(workspaces::Column::CreatedAt)
                .all(&db_tx)
                .await?;

            Ok(models.into_iter().map(Workspace::from).collect())
        })
    }

    /// Delete a workspace and everything it owns. Owner only.
    pub async fn delete_workspace(&self, workspace_id: &str, user_id: &str) -> ResultEngine<()> {
        with_tx!(self, |db_tx| {
            let workspace = self
                .require_workspace_owner(&db_tx, workspace_id, user_id)
                .await?;
            let workspace_db_id = workspace.id;

            // Explicit cascade inside one DB transaction: not every child
            // relationship is FK-backed with ON DELETE CASCADE, so order
            // matters (grandchildren before children before the root).
            let backend = self.database.get_database_backend();

            db_tx
                .execute(Statement::from_sql_and_values(
                    backend,
                    "DELETE FROM invoice_items WHERE invoice_id IN (SELECT id FROM invoices WHERE workspace_id = ?);",
                    vec![workspace_db_id.clone().into()],
                ))
                .await?;

            db_tx
                .execute(Statement::from_sql_and_values(
                    backend,
                    "DELETE FROM cards WHERE board_id IN (SELECT id FROM boards WHERE workspace_id = ?);",
                    vec![workspace_db_id.clone().into()],
                ))
                .await?;

            for table in [
                "financial_alerts",
                "invoices",
                "cost_forecasts",
                "expenses",
                "budgets",
                "boards",
                "workspace_memberships",
            ] {
                db_tx
                    .execute(Statement::from_sql_and_values(
                        backend,
                        format!("DELETE FROM {table} WHERE workspace_id = ?;"),
                        vec![workspace_db_id.clone().into()],
                    ))
                    .await?;
            }

            db_tx
                .execute(Statement::from_sql_and_values(
                    backend,
                    "DELETE FROM workspaces WHERE id = ?;",
                    vec![workspace_db_id.clone().into()],
                ))
                .await?;

            tracing::info!("workspace {workspace_db_id} deleted by {user_id}");
            Ok(())
        })
    }
}
