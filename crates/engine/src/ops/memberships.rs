use sea_orm::{ActiveValue, QueryFilter, QueryOrder, TransactionTrait, prelude::*};

use crate::{EngineError, ResultEngine, memberships, users};

use super::{Engine, access::MembershipRole, with_tx};

/// A workspace member with their role.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Member {
    pub username: String,
    pub role: String,
}

impl Engine {
    /// List the members of a workspace (any member can look).
    pub async fn list_members(
        &self,
        workspace_id: &str,
        user_id: &str,
    ) -> ResultEngine<Vec<Member>> {
        with_tx!(self, |db_tx| {
            self.require_workspace_read(&db_tx, workspace_id, user_id)
                .await?;
            let rows = memberships::Entity::find()
                .filter(memberships::Column::WorkspaceId.eq(workspace_id.to_string()))
                .order_by_asc(memberships::Column::UserId)
                .all(&db_tx)
                .await?;
            Ok(rows
                .into_iter()
                .map(|m| Member {
                    username: m.user_id,
                    role: m.role,
                })
                .collect())
        })
    }

    /// Add a member or change their role. Owner only; the owner's own row
    /// cannot be demoted away.
    pub async fn upsert_member(
        &self,
        workspace_id: &str,
        username: &str,
        role: &str,
        user_id: &str,
    ) -> ResultEngine<()> {
        let role = MembershipRole::try_from(role)?;
        with_tx!(self, |db_tx| {
            let workspace = self
                .require_workspace_owner(&db_tx, workspace_id, user_id)
                .await?;
            if workspace.owner_id == username && role != MembershipRole::Owner {
                return Err(EngineError::Conflict(
                    "the workspace owner keeps the owner role".to_string(),
                ));
            }
            if role == MembershipRole::Owner && workspace.owner_id != username {
                return Err(EngineError::InvalidRole(
                    "only the workspace owner holds the owner role".to_string(),
                ));
            }

            users::Entity::find_by_id(username.to_string())
                .one(&db_tx)
                .await?
                .ok_or_else(|| EngineError::KeyNotFound("user not exists".to_string()))?;

            let role_str = match role {
                MembershipRole::Owner => "owner",
                MembershipRole::Editor => "editor",
                MembershipRole::Viewer => "viewer",
            };

            let existing = memberships::Entity::find_by_id((
                workspace_id.to_string(),
                username.to_string(),
            ))
            .one(&db_tx)
            .await?;

            match existing {
                Some(row) => {
                    let mut active: memberships::ActiveModel = row.into();
                    active.role = ActiveValue::Set(role_str.to_string());
                    active.update(&db_tx).await?;
                }
                None => {
                    let row = memberships::ActiveModel {
                        workspace_id: ActiveValue::Set(workspace_id.to_string()),
                        user_id: ActiveValue::Set(username.to_string()),
                        role: ActiveValue::Set(role_str.to_string()),
                    };
                    row.insert(&db_tx).await?;
                }
            }

            Ok(())
        })
    }

    /// Remove a member. Owner only; the owner cannot remove themselves.
    pub async fn remove_member(
        &self,
        workspace_id: &str,
        username: &str,
        user_id: &str,
    ) -> ResultEngine<()> {
        with_tx!(self, |db_tx| {
            let workspace = self
                .require_workspace_owner(&db_tx, workspace_id, user_id)
                .await?;
            if workspace.owner_id == username {
                return Err(EngineError::Conflict(
                    "the workspace owner cannot be removed".to_string(),
                ));
            }

            let existing = memberships::Entity::find_by_id((
                workspace_id.to_string(),
                username.to_string(),
            ))
            .one(&db_tx)
            .await?
            .ok_or_else(|| EngineError::KeyNotFound("member not exists".to_string()))?;

            let active: memberships::ActiveModel = existing.into();
            active.delete(&db_tx).await?;

            Ok(())
        })
    }
}
