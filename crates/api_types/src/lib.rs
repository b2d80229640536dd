//! Request and response bodies shared by the HTTP server and its clients.
//!
//! All money fields are integer minor units (cents). Percentage fields are
//! integer hundredths of a percent, so `1250` means `12.50%`.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Response body for endpoints that create a resource.
#[derive(Debug, Serialize, Deserialize)]
pub struct Created {
    pub id: String,
}

pub mod workspace {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    pub struct WorkspaceNew {
        pub name: String,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct WorkspaceView {
        pub id: String,
        pub name: String,
        pub owner_id: String,
        pub created_at: DateTime<Utc>,
    }
}

pub mod membership {
    use super::*;

    /// Role of a user in a workspace.
    ///
    /// The server treats roles as:
    /// - `owner`: full access and can manage members.
    /// - `editor`: can write but cannot manage members.
    /// - `viewer`: read-only.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(rename_all = "snake_case")]
    pub enum MembershipRole {
        Owner,
        Editor,
        Viewer,
    }

    impl MembershipRole {
        /// Returns the canonical role string used by the engine/database.
        pub fn as_str(self) -> &'static str {
            match self {
                Self::Owner => "owner",
                Self::Editor => "editor",
                Self::Viewer => "viewer",
            }
        }
    }

    /// Request body for adding/updating a member.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct MemberUpsert {
        pub username: String,
        pub role: MembershipRole,
    }

    /// Response body for listing members.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct MembersResponse {
        pub members: Vec<MemberView>,
    }

    /// A member with their role.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct MemberView {
        pub username: String,
        pub role: MembershipRole,
    }
}

pub mod board {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    pub struct BoardNew {
        pub name: String,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct BoardRename {
        pub name: String,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct BoardView {
        pub id: String,
        pub name: String,
        /// Dense zero-based position within the workspace.
        pub position: i32,
        pub cards: Vec<CardView>,
    }

    /// Request body for moving a board to a new position.
    ///
    /// `dest_index` past the end of the list means "move to the end".
    #[derive(Debug, Serialize, Deserialize)]
    pub struct BoardReorder {
        pub source_index: usize,
        pub dest_index: usize,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct CardNew {
        pub title: String,
        pub description: Option<String>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct CardUpdate {
        pub title: Option<String>,
        pub description: Option<String>,
    }

    /// Request body for moving a card, within a board or across boards.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct CardMove {
        pub source_board_id: String,
        pub dest_board_id: String,
        pub source_index: usize,
        pub dest_index: usize,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct CardView {
        pub id: String,
        pub board_id: String,
        pub title: String,
        pub description: Option<String>,
        /// Dense zero-based position within the board.
        pub position: i32,
    }
}

pub mod budget {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    pub struct BudgetNew {
        pub name: String,
        pub description: Option<String>,
        pub total_minor: i64,
        pub category: String,
        pub start_date: NaiveDate,
        pub end_date: NaiveDate,
        /// Percent of the total (whole percents, 0..=100). Defaults to 80.
        pub alert_threshold: Option<i32>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct BudgetUpdate {
        pub name: Option<String>,
        pub description: Option<String>,
        pub total_minor: Option<i64>,
        pub category: Option<String>,
        pub start_date: Option<NaiveDate>,
        pub end_date: Option<NaiveDate>,
        pub alert_threshold: Option<i32>,
    }

    /// Query parameters for deleting a budget.
    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct BudgetDelete {
        /// Detach linked expenses instead of refusing.
        #[serde(default)]
        pub force: bool,
    }

    /// A budget with its derived aggregation fields.
    ///
    /// `spent_minor` covers approved expenses only; pending and rejected
    /// ones never count.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct BudgetView {
        pub id: String,
        pub name: String,
        pub description: Option<String>,
        pub total_minor: i64,
        pub category: String,
        pub start_date: NaiveDate,
        pub end_date: NaiveDate,
        pub alert_threshold: i32,
        pub spent_minor: i64,
        pub remaining_minor: i64,
        /// Hundredths of a percent.
        pub spent_pct: i64,
        pub is_over_budget: bool,
        pub is_near_limit: bool,
    }
}

pub mod expense {
    use super::*;

    #[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(rename_all = "snake_case")]
    pub enum ExpenseStatus {
        Pending,
        Approved,
        Rejected,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct ExpenseNew {
        pub title: String,
        pub description: Option<String>,
        pub amount_minor: i64,
        pub category: String,
        pub date: NaiveDate,
        pub budget_id: Option<String>,
        pub is_reimbursable: Option<bool>,
        pub receipt_url: Option<String>,
    }

    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct ExpenseUpdate {
        pub title: Option<String>,
        pub description: Option<String>,
        pub amount_minor: Option<i64>,
        pub category: Option<String>,
        pub date: Option<NaiveDate>,
        /// Absent: keep the link. `null`: detach. A string: relink.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        pub budget_id: Option<Option<String>>,
        pub is_reimbursable: Option<bool>,
        pub receipt_url: Option<String>,
    }

    /// Request body for deciding a pending expense.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct ExpenseDecision {
        /// `approve` or `reject`.
        pub action: String,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct ExpenseView {
        pub id: String,
        pub budget_id: Option<String>,
        pub title: String,
        pub description: Option<String>,
        pub amount_minor: i64,
        pub category: String,
        pub date: NaiveDate,
        pub status: ExpenseStatus,
        pub is_reimbursable: bool,
        pub receipt_url: Option<String>,
        pub created_by: String,
    }
}

pub mod invoice {
    use super::*;

    #[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(rename_all = "snake_case")]
    pub enum InvoiceStatus {
        Draft,
        Sent,
        Paid,
        Overdue,
        Cancelled,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct ItemNew {
        pub description: String,
        pub quantity: i32,
        pub unit_price_minor: i64,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct InvoiceNew {
        pub invoice_number: String,
        pub client_name: String,
        pub client_email: Option<String>,
        pub items: Vec<ItemNew>,
        /// Optional cross-check; rejected if it disagrees with the item sum.
        pub amount_minor: Option<i64>,
        pub tax_minor: Option<i64>,
        pub currency: Option<String>,
        pub issue_date: NaiveDate,
        pub due_date: NaiveDate,
    }

    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct InvoiceUpdate {
        pub client_name: Option<String>,
        pub client_email: Option<String>,
        /// Replaces the line items wholesale; draft invoices only.
        pub items: Option<Vec<ItemNew>>,
        pub amount_minor: Option<i64>,
        pub tax_minor: Option<i64>,
        pub due_date: Option<NaiveDate>,
        pub status: Option<InvoiceStatus>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct ItemView {
        pub id: String,
        pub description: String,
        pub quantity: i32,
        pub unit_price_minor: i64,
        pub total_minor: i64,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct InvoiceView {
        pub id: String,
        pub invoice_number: String,
        pub client_name: String,
        pub client_email: Option<String>,
        /// Sum of item totals, before tax.
        pub amount_minor: i64,
        pub tax_minor: i64,
        pub total_minor: i64,
        pub currency: String,
        pub status: InvoiceStatus,
        pub issue_date: NaiveDate,
        pub due_date: NaiveDate,
        pub paid_date: Option<NaiveDate>,
        pub items: Vec<ItemView>,
    }
}

pub mod forecast {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    pub struct ForecastNew {
        pub project_name: String,
        pub estimated_minor: i64,
        pub actual_minor: Option<i64>,
        pub forecasted_minor: i64,
        pub period_start: NaiveDate,
        pub period_end: NaiveDate,
        /// Whole percents, 0..=100. Defaults to 50.
        pub confidence: Option<i32>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct ForecastView {
        pub id: String,
        pub project_name: String,
        pub estimated_minor: i64,
        pub actual_minor: i64,
        pub forecasted_minor: i64,
        pub period_start: NaiveDate,
        pub period_end: NaiveDate,
        pub confidence: i32,
        /// Signed hundredths of a percent; positive means over the estimate.
        pub variance_pct: i64,
        /// Hundredths of a percent, floored at zero.
        pub accuracy_pct: i64,
        /// `estimated - actual`; negative once the estimate is blown.
        pub remaining_minor: i64,
        pub is_over_estimate: bool,
    }
}

pub mod alert {
    use super::*;

    #[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(rename_all = "snake_case")]
    pub enum AlertType {
        BudgetAlert,
        BudgetExceeded,
        InvoiceOverdue,
    }

    #[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(rename_all = "snake_case")]
    pub enum AlertSeverity {
        Low,
        Medium,
        High,
        Critical,
    }

    /// Query parameters for listing alerts.
    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct AlertList {
        #[serde(default)]
        pub unresolved_only: bool,
    }

    /// Response body for the on-demand rule pass.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct AlertsEvaluated {
        pub created: u64,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct AlertView {
        pub id: String,
        pub budget_id: Option<String>,
        pub invoice_id: Option<String>,
        pub alert_type: AlertType,
        pub title: String,
        pub message: String,
        pub severity: AlertSeverity,
        pub is_read: bool,
        pub is_resolved: bool,
        pub created_at: DateTime<Utc>,
    }
}
