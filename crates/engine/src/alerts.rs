//! Financial alerts and the pure alert rules.
//!
//! At most one **unresolved** alert may exist per dedup key:
//! `(workspace, budget, type)` for budget alerts and
//! `(workspace, invoice, type)` for overdue invoices. The schema enforces
//! this with partial unique indexes over unresolved rows; the ops layer
//! inserts with on-conflict-do-nothing so concurrent evaluations cannot
//! produce duplicates.

use chrono::{NaiveDate, Utc};
use sea_orm::{ActiveValue, entity::prelude::*};
use uuid::Uuid;

use crate::{
    EngineError, MoneyMinor,
    budgets::BudgetView,
    invoices::{self, InvoiceStatus},
};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AlertType {
    BudgetAlert,
    BudgetExceeded,
    InvoiceOverdue,
}

impl AlertType {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::BudgetAlert => "budget_alert",
            Self::BudgetExceeded => "budget_exceeded",
            Self::InvoiceOverdue => "invoice_overdue",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AlertSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl AlertSeverity {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
            Self::Critical => "critical",
        }
    }
}

impl TryFrom<&str> for AlertSeverity {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "low" => Ok(Self::Low),
            "medium" => Ok(Self::Medium),
            "high" => Ok(Self::High),
            "critical" => Ok(Self::Critical),
            other => Err(EngineError::InvalidRole(format!(
                "invalid alert severity: {other}"
            ))),
        }
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "financial_alerts")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub workspace_id: String,
    pub budget_id: Option<String>,
    pub invoice_id: Option<String>,
    pub alert_type: String,
    pub title: String,
    pub message: String,
    pub severity: String,
    pub is_read: bool,
    pub is_resolved: bool,
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
    #[sea_orm(
        belongs_to = "super::budgets::Entity",
        from = "Column::BudgetId",
        to = "super::budgets::Column::Id",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    Budgets,
}

impl Related<super::workspaces::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Workspaces.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

/// An alert the rule pass wants to exist, before deduplication.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AlertDraft {
    pub budget_id: Option<String>,
    pub invoice_id: Option<String>,
    pub alert_type: AlertType,
    pub severity: AlertSeverity,
    pub title: String,
    pub message: String,
}

impl AlertDraft {
    /// Materializes the draft into an insertable row.
    #[must_use]
    pub fn into_model(self, workspace_id: &str) -> ActiveModel {
        ActiveModel {
            id: ActiveValue::Set(Uuid::new_v4().to_string()),
            workspace_id: ActiveValue::Set(workspace_id.to_string()),
            budget_id: ActiveValue::Set(self.budget_id),
            invoice_id: ActiveValue::Set(self.invoice_id),
            alert_type: ActiveValue::Set(self.alert_type.as_str().to_string()),
            title: ActiveValue::Set(self.title),
            message: ActiveValue::Set(self.message),
            severity: ActiveValue::Set(self.severity.as_str().to_string()),
            is_read: ActiveValue::Set(false),
            is_resolved: ActiveValue::Set(false),
            created_at: ActiveValue::Set(Utc::now()),
        }
    }
}

/// Alert rules for one budget view.
///
/// - In the band `[threshold, 100%)`: one `budget_alert`, severity high from
///   90% up, medium below.
/// - Spent above total: one `budget_exceeded`, always critical.
///
/// Both can apply at once only at the 100% boundary edge cases; the exceeded
/// rule needs `spent > total`, the threshold rule needs `pct < 100`.
#[must_use]
pub fn budget_alerts(view: &BudgetView) -> Vec<AlertDraft> {
    let mut drafts = Vec::new();
    let threshold_pct = i64::from(view.budget.alert_threshold) * 100;

    if view.spent_pct >= threshold_pct && view.spent_pct < 10_000 {
        let severity = if view.spent_pct >= 9_000 {
            AlertSeverity::High
        } else {
            AlertSeverity::Medium
        };
        drafts.push(AlertDraft {
            budget_id: Some(view.budget.id.clone()),
            invoice_id: None,
            alert_type: AlertType::BudgetAlert,
            severity,
            title: format!("Budget '{}' nearing its limit", view.budget.name),
            message: format!(
                "Budget '{}' has used {}.{:02}% of its {} total",
                view.budget.name,
                view.spent_pct / 100,
                view.spent_pct % 100,
                MoneyMinor::new(view.budget.total_minor),
            ),
        });
    }

    if view.spent_minor > view.budget.total_minor {
        drafts.push(AlertDraft {
            budget_id: Some(view.budget.id.clone()),
            invoice_id: None,
            alert_type: AlertType::BudgetExceeded,
            severity: AlertSeverity::Critical,
            title: format!("Budget '{}' exceeded", view.budget.name),
            message: format!(
                "Budget '{}' is over by {}",
                view.budget.name,
                MoneyMinor::new(view.spent_minor - view.budget.total_minor),
            ),
        });
    }

    drafts
}

/// Overdue rule for one invoice: `sent` and past due as of `today`.
///
/// The dedup key is per invoice, so every overdue invoice gets its own
/// alert rather than only the first one found in the workspace.
#[must_use]
pub fn invoice_overdue_alert(invoice: &invoices::Model, today: NaiveDate) -> Option<AlertDraft> {
    let status = InvoiceStatus::try_from(invoice.status.as_str()).ok()?;
    if status != InvoiceStatus::Sent || invoice.due_date >= today {
        return None;
    }
    Some(AlertDraft {
        budget_id: None,
        invoice_id: Some(invoice.id.clone()),
        alert_type: AlertType::InvoiceOverdue,
        severity: AlertSeverity::High,
        title: format!("Invoice {} is overdue", invoice.invoice_number),
        message: format!(
            "Invoice {} for {} ({} {}) was due on {}",
            invoice.invoice_number,
            invoice.client_name,
            MoneyMinor::new(invoice.total_minor),
            invoice.currency,
            invoice.due_date,
        ),
    })
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;
    use crate::budgets;

    fn view(total_minor: i64, spent_minor: i64, alert_threshold: i32) -> BudgetView {
        let budget = budgets::Model {
            id: "b1".to_string(),
            workspace_id: "w1".to_string(),
            name: "Ops".to_string(),
            description: None,
            total_minor,
            category: "ops".to_string(),
            start_date: NaiveDate::from_ymd_opt(2026, 1, 1).unwrap(),
            end_date: NaiveDate::from_ymd_opt(2026, 12, 31).unwrap(),
            alert_threshold,
            spent_minor: 0,
            created_at: Utc::now(),
        };
        BudgetView::with_spent(budget, spent_minor)
    }

    #[test]
    fn below_threshold_raises_nothing() {
        assert!(budget_alerts(&view(1000_00, 500_00, 80)).is_empty());
    }

    #[test]
    fn threshold_band_raises_budget_alert() {
        let drafts = budget_alerts(&view(1000_00, 800_00, 80));
        assert_eq!(drafts.len(), 1);
        assert_eq!(drafts[0].alert_type, AlertType::BudgetAlert);
        assert_eq!(drafts[0].severity, AlertSeverity::Medium);

        let drafts = budget_alerts(&view(1000_00, 950_00, 80));
        assert_eq!(drafts[0].severity, AlertSeverity::High);
    }

    #[test]
    fn over_budget_raises_only_exceeded() {
        let drafts = budget_alerts(&view(500_00, 600_00, 80));
        assert_eq!(drafts.len(), 1);
        assert_eq!(drafts[0].alert_type, AlertType::BudgetExceeded);
        assert_eq!(drafts[0].severity, AlertSeverity::Critical);
    }

    #[test]
    fn exactly_spent_is_neither_band_nor_exceeded() {
        // 100.00% is outside the threshold band and not over the total.
        assert!(budget_alerts(&view(1000_00, 1000_00, 80)).is_empty());
    }

    fn invoice(status: &str, due: NaiveDate) -> invoices::Model {
        invoices::Model {
            id: "i1".to_string(),
            workspace_id: "w1".to_string(),
            invoice_number: "INV-1".to_string(),
            client_name: "Acme".to_string(),
            client_email: None,
            amount_minor: 100_00,
            tax_minor: 0,
            total_minor: 100_00,
            currency: "EUR".to_string(),
            status: status.to_string(),
            issue_date: NaiveDate::from_ymd_opt(2026, 1, 1).unwrap(),
            due_date: due,
            paid_date: None,
        }
    }

    #[test]
    fn overdue_needs_sent_and_past_due() {
        let today = NaiveDate::from_ymd_opt(2026, 3, 1).unwrap();
        let past = NaiveDate::from_ymd_opt(2026, 2, 1).unwrap();

        let draft = invoice_overdue_alert(&invoice("sent", past), today).unwrap();
        assert_eq!(draft.alert_type, AlertType::InvoiceOverdue);
        assert_eq!(draft.invoice_id.as_deref(), Some("i1"));

        assert!(invoice_overdue_alert(&invoice("draft", past), today).is_none());
        assert!(invoice_overdue_alert(&invoice("paid", past), today).is_none());
        // Due today is not overdue yet.
        assert!(invoice_overdue_alert(&invoice("sent", today), today).is_none());
    }
}
