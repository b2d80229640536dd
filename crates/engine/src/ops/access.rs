use sea_orm::{DatabaseTransaction, prelude::*};

use crate::{
    EngineError, ResultEngine, alerts, boards, budgets, cards, expenses, forecasts, invoices,
    memberships, workspaces,
};

use super::Engine;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(super) enum MembershipRole {
    Owner,
    Editor,
    Viewer,
}

impl MembershipRole {
    pub(super) fn can_write(self) -> bool {
        matches!(self, Self::Owner | Self::Editor)
    }
}

impl TryFrom<&str> for MembershipRole {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "owner" => Ok(Self::Owner),
            "editor" => Ok(Self::Editor),
            "viewer" => Ok(Self::Viewer),
            other => Err(EngineError::InvalidRole(format!(
                "invalid membership role: {other}"
            ))),
        }
    }
}

/// Generates a `require_*` lookup returning the model or `KeyNotFound`.
macro_rules! impl_require_entity {
    ($require_fn:ident, $entity:path, $model:path, $err_msg:literal) => {
        pub(super) async fn $require_fn(
            &self,
            db: &DatabaseTransaction,
            id: &str,
        ) -> ResultEngine<$model> {
            <$entity>::find_by_id(id.to_string())
                .one(db)
                .await?
                .ok_or_else(|| EngineError::KeyNotFound($err_msg.to_string()))
        }
    };
}

impl Engine {
    impl_require_entity!(
        require_board,
        boards::Entity,
        boards::Model,
        "board not exists"
    );

    impl_require_entity!(require_card, cards::Entity, cards::Model, "card not exists");

    impl_require_entity!(
        require_budget,
        budgets::Entity,
        budgets::Model,
        "budget not exists"
    );

    impl_require_entity!(
        require_expense,
        expenses::Entity,
        expenses::Model,
        "expense not exists"
    );

    impl_require_entity!(
        require_invoice,
        invoices::Entity,
        invoices::Model,
        "invoice not exists"
    );

    impl_require_entity!(
        require_forecast,
        forecasts::Entity,
        forecasts::Model,
        "forecast not exists"
    );

    impl_require_entity!(
        require_alert,
        alerts::Entity,
        alerts::Model,
        "alert not exists"
    );

    async fn find_workspace_by_id(
        &self,
        db: &DatabaseTransaction,
        workspace_id: &str,
    ) -> ResultEngine<Option<workspaces::Model>> {
        workspaces::Entity::find_by_id(workspace_id.to_string())
            .one(db)
            .await
            .map_err(Into::into)
    }

    pub(super) async fn workspace_membership_role(
        &self,
        db: &DatabaseTransaction,
        workspace_id: &str,
        user_id: &str,
    ) -> ResultEngine<Option<MembershipRole>> {
        let row = memberships::Entity::find_by_id((
            workspace_id.to_string(),
            user_id.to_string(),
        ))
        .one(db)
        .await?;
        row.as_ref()
            .map(|m| MembershipRole::try_from(m.role.as_str()))
            .transpose()
    }

    /// Loads a workspace the user may read (owner or any member).
    ///
    /// Non-members get `KeyNotFound` rather than `Forbidden` so a workspace
    /// id leaks nothing about whether it exists.
    pub(super) async fn require_workspace_read(
        &self,
        db: &DatabaseTransaction,
        workspace_id: &str,
        user_id: &str,
    ) -> ResultEngine<workspaces::Model> {
        let model = self
            .find_workspace_by_id(db, workspace_id)
            .await?
            .ok_or_else(|| EngineError::KeyNotFound("workspace not exists".to_string()))?;
        if model.owner_id == user_id {
            return Ok(model);
        }
        self.workspace_membership_role(db, workspace_id, user_id)
            .await?
            .ok_or_else(|| EngineError::KeyNotFound("workspace not exists".to_string()))?;
        Ok(model)
    }

    /// Loads a workspace the user may write (owner or editor).
    pub(super) async fn require_workspace_write(
        &self,
        db: &DatabaseTransaction,
        workspace_id: &str,
        user_id: &str,
    ) -> ResultEngine<workspaces::Model> {
        let model = self
            .find_workspace_by_id(db, workspace_id)
            .await?
            .ok_or_else(|| EngineError::KeyNotFound("workspace not exists".to_string()))?;
        if model.owner_id == user_id {
            return Ok(model);
        }
        let role = self
            .workspace_membership_role(db, workspace_id, user_id)
            .await?
            .ok_or_else(|| EngineError::KeyNotFound("workspace not exists".to_string()))?;
        if !role.can_write() {
            return Err(EngineError::Forbidden(
                "write access required".to_string(),
            ));
        }
        Ok(model)
    }

    /// Loads a workspace only its owner may act on (delete workspace,
    /// decide expenses, manage members).
    pub(super) async fn require_workspace_owner(
        &self,
        db: &DatabaseTransaction,
        workspace_id: &str,
        user_id: &str,
    ) -> ResultEngine<workspaces::Model> {
        // Members learn the workspace exists; strangers do not.
        let model = self.require_workspace_read(db, workspace_id, user_id).await?;
        if model.owner_id != user_id {
            return Err(EngineError::Forbidden(
                "only the workspace owner can do this".to_string(),
            ));
        }
        Ok(model)
    }
}
