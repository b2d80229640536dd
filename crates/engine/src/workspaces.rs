//! The `Workspace` is the tenant boundary: it owns boards, budgets,
//! expenses, invoices, forecasts and alerts. A user can own several
//! workspaces and be a member of others.

use chrono::{DateTime, Utc};
use sea_orm::{ActiveValue, entity::prelude::*};
use uuid::Uuid;

/// In-memory representation of a workspace.
#[derive(Clone, Debug)]
pub struct Workspace {
    pub id: String,
    pub name: String,
    pub owner_id: String,
    pub created_at: DateTime<Utc>,
}

impl Workspace {
    pub fn new(name: String, owner_id: &str) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            name,
            owner_id: owner_id.to_string(),
            created_at: Utc::now(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "workspaces")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub name: String,
    pub owner_id: String,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::boards::Entity")]
    Boards,
    #[sea_orm(has_many = "super::budgets::Entity")]
    Budgets,
    #[sea_orm(has_many = "super::expenses::Entity")]
    Expenses,
    #[sea_orm(has_many = "super::invoices::Entity")]
    Invoices,
    #[sea_orm(has_many = "super::alerts::Entity")]
    Alerts,
}

impl Related<super::boards::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Boards.def()
    }
}

impl Related<super::budgets::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Budgets.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<&Workspace> for ActiveModel {
    fn from(workspace: &Workspace) -> Self {
        Self {
            id: ActiveValue::Set(workspace.id.clone()),
            name: ActiveValue::Set(workspace.name.clone()),
            owner_id: ActiveValue::Set(workspace.owner_id.clone()),
            created_at: ActiveValue::Set(workspace.created_at),
        }
    }
}

impl From<Model> for Workspace {
    fn from(model: Model) -> Self {
        Self {
            id: model.id,
            name: model.name,
            owner_id: model.owner_id,
            created_at: model.created_at,
        }
    }
}
