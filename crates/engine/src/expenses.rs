//! Expenses and the approval state machine.
//!
//! An expense is created `pending` and moves exactly once, to `approved` or
//! `rejected`. Both end states are terminal; any other transition request is
//! an [`EngineError::InvalidTransition`]. Only approved expenses contribute
//! to a budget's spent sum.

use sea_orm::{ActiveValue, entity::prelude::*};
use uuid::Uuid;

use crate::{EngineError, ResultEngine};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ExpenseStatus {
    Pending,
    Approved,
    Rejected,
}

impl ExpenseStatus {
    /// Returns the canonical status string stored in the database.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Approved => "approved",
            Self::Rejected => "rejected",
        }
    }

    /// Applies an approval decision.
    ///
    /// Only a pending expense can be decided; deciding an already-decided
    /// expense fails, which makes a duplicate approve observable instead of
    /// silently double-counting.
    pub fn decide(self, action: ExpenseAction) -> ResultEngine<ExpenseStatus> {
        match self {
            Self::Pending => Ok(match action {
                ExpenseAction::Approve => Self::Approved,
                ExpenseAction::Reject => Self::Rejected,
            }),
            other => Err(EngineError::InvalidTransition(format!(
                "expense is {}, only pending expenses can be decided",
                other.as_str()
            ))),
        }
    }
}

impl TryFrom<&str> for ExpenseStatus {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "pending" => Ok(Self::Pending),
            "approved" => Ok(Self::Approved),
            "rejected" => Ok(Self::Rejected),
            other => Err(EngineError::InvalidTransition(format!(
                "invalid expense status: {other}"
            ))),
        }
    }
}

/// The two decisions the approval state machine accepts.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ExpenseAction {
    Approve,
    Reject,
}

impl TryFrom<&str> for ExpenseAction {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "approve" => Ok(Self::Approve),
            "reject" => Ok(Self::Reject),
            other => Err(EngineError::InvalidTransition(format!(
                "invalid expense action: {other}"
            ))),
        }
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "expenses")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub workspace_id: String,
    /// Unbudgeted expenses keep this at `None`.
    pub budget_id: Option<String>,
    pub title: String,
    pub description: Option<String>,
    pub amount_minor: i64,
    pub category: String,
    pub date: Date,
    pub status: String,
    pub is_reimbursable: bool,
    pub receipt_url: Option<String>,
    pub created_by: String,
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
    #[sea_orm(
        belongs_to = "super::budgets::Entity",
        from = "Column::BudgetId",
        to = "super::budgets::Column::Id",
        on_update = "NoAction",
        on_delete = "SetNull"
    )]
    Budgets,
}

impl Related<super::workspaces::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Workspaces.def()
    }
}

impl Related<super::budgets::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Budgets.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

/// Field bag for inserting a new expense; validation happens in the ops layer.
pub struct NewExpense {
    pub workspace_id: String,
    pub budget_id: Option<String>,
    pub title: String,
    pub description: Option<String>,
    pub amount_minor: i64,
    pub category: String,
    pub date: Date,
    pub is_reimbursable: bool,
    pub receipt_url: Option<String>,
    pub created_by: String,
}

impl From<NewExpense> for ActiveModel {
    fn from(expense: NewExpense) -> Self {
        Self {
            id: ActiveValue::Set(Uuid::new_v4().to_string()),
            workspace_id: ActiveValue::Set(expense.workspace_id),
            budget_id: ActiveValue::Set(expense.budget_id),
            title: ActiveValue::Set(expense.title),
            description: ActiveValue::Set(expense.description),
            amount_minor: ActiveValue::Set(expense.amount_minor),
            category: ActiveValue::Set(expense.category),
            date: ActiveValue::Set(expense.date),
            status: ActiveValue::Set(ExpenseStatus::Pending.as_str().to_string()),
            is_reimbursable: ActiveValue::Set(expense.is_reimbursable),
            receipt_url: ActiveValue::Set(expense.receipt_url),
            created_by: ActiveValue::Set(expense.created_by),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pending_can_be_approved_or_rejected() {
        assert_eq!(
            ExpenseStatus::Pending.decide(ExpenseAction::Approve).unwrap(),
            ExpenseStatus::Approved
        );
        assert_eq!(
            ExpenseStatus::Pending.decide(ExpenseAction::Reject).unwrap(),
            ExpenseStatus::Rejected
        );
    }

    #[test]
    fn decided_states_are_terminal() {
        for status in [ExpenseStatus::Approved, ExpenseStatus::Rejected] {
            for action in [ExpenseAction::Approve, ExpenseAction::Reject] {
                assert!(matches!(
                    status.decide(action),
                    Err(EngineError::InvalidTransition(_))
                ));
            }
        }
    }

    #[test]
    fn status_round_trips_through_storage_string() {
        for status in [
            ExpenseStatus::Pending,
            ExpenseStatus::Approved,
            ExpenseStatus::Rejected,
        ] {
            assert_eq!(ExpenseStatus::try_from(status.as_str()).unwrap(), status);
        }
        assert!(ExpenseStatus::try_from("draft").is_err());
    }
}
