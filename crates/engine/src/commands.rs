//! Command structs for engine operations.
//!
//! These types group parameters for write operations (budgets, expenses,
//! invoices, forecasts, card moves), keeping call sites readable and
//! avoiding long argument lists.

use chrono::NaiveDate;

use crate::invoices::{InvoiceStatus, ItemInput};

/// Create a budget.
#[derive(Clone, Debug)]
pub struct BudgetNewCmd {
    pub workspace_id: String,
    pub name: String,
    pub description: Option<String>,
    pub total_minor: i64,
    pub category: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    /// Whole percent; defaults to 80 when unset.
    pub alert_threshold: Option<i32>,
    pub user_id: String,
}

impl BudgetNewCmd {
    #[must_use]
    pub fn new(
        workspace_id: impl Into<String>,
        user_id: impl Into<String>,
        name: impl Into<String>,
        total_minor: i64,
        category: impl Into<String>,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Self {
        Self {
            workspace_id: workspace_id.into(),
            name: name.into(),
            description: None,
            total_minor,
            category: category.into(),
            start_date,
            end_date,
            alert_threshold: None,
            user_id: user_id.into(),
        }
    }

    #[must_use]
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    #[must_use]
    pub fn alert_threshold(mut self, threshold: i32) -> Self {
        self.alert_threshold = Some(threshold);
        self
    }
}

/// Update a budget; `None` fields are left unchanged.
#[derive(Clone, Debug, Default)]
pub struct BudgetUpdateCmd {
    pub name: Option<String>,
    pub description: Option<String>,
    pub total_minor: Option<i64>,
    pub category: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub alert_threshold: Option<i32>,
}

/// Create an expense (always starts `pending`).
#[derive(Clone, Debug)]
pub struct ExpenseNewCmd {
    pub workspace_id: String,
    pub budget_id: Option<String>,
    pub title: String,
    pub description: Option<String>,
    pub amount_minor: i64,
    pub category: String,
    pub date: NaiveDate,
    pub is_reimbursable: bool,
    pub receipt_url: Option<String>,
    pub user_id: String,
}

impl ExpenseNewCmd {
    #[must_use]
    pub fn new(
        workspace_id: impl Into<String>,
        user_id: impl Into<String>,
        title: impl Into<String>,
        amount_minor: i64,
        category: impl Into<String>,
        date: NaiveDate,
    ) -> Self {
        Self {
            workspace_id: workspace_id.into(),
            budget_id: None,
            title: title.into(),
            description: None,
            amount_minor,
            category: category.into(),
            date,
            is_reimbursable: false,
            receipt_url: None,
            user_id: user_id.into(),
        }
    }

    #[must_use]
    pub fn budget_id(mut self, budget_id: impl Into<String>) -> Self {
        self.budget_id = Some(budget_id.into());
        self
    }

    #[must_use]
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    #[must_use]
    pub fn reimbursable(mut self) -> Self {
        self.is_reimbursable = true;
        self
    }

    #[must_use]
    pub fn receipt_url(mut self, url: impl Into<String>) -> Self {
        self.receipt_url = Some(url.into());
        self
    }
}

/// Update an expense; `None` fields are left unchanged.
///
/// `budget_id` distinguishes "leave alone" (`None`) from "re-link"
/// (`Some(Some(id))`) and "detach" (`Some(None)`).
#[derive(Clone, Debug, Default)]
pub struct ExpenseUpdateCmd {
    pub title: Option<String>,
    pub description: Option<String>,
    pub amount_minor: Option<i64>,
    pub category: Option<String>,
    pub date: Option<NaiveDate>,
    pub budget_id: Option<Option<String>>,
    pub is_reimbursable: Option<bool>,
    pub receipt_url: Option<String>,
}

/// Create an invoice with its items (always starts `draft`).
#[derive(Clone, Debug)]
pub struct InvoiceNewCmd {
    pub workspace_id: String,
    pub invoice_number: String,
    pub client_name: String,
    pub client_email: Option<String>,
    pub items: Vec<ItemInput>,
    /// Client-stated subtotal, checked against the item sum when present.
    pub stated_amount_minor: Option<i64>,
    pub tax_minor: i64,
    pub currency: String,
    pub issue_date: NaiveDate,
    pub due_date: NaiveDate,
    pub user_id: String,
}

impl InvoiceNewCmd {
    #[must_use]
    pub fn new(
        workspace_id: impl Into<String>,
        user_id: impl Into<String>,
        invoice_number: impl Into<String>,
        client_name: impl Into<String>,
        items: Vec<ItemInput>,
        issue_date: NaiveDate,
        due_date: NaiveDate,
    ) -> Self {
        Self {
            workspace_id: workspace_id.into(),
            invoice_number: invoice_number.into(),
            client_name: client_name.into(),
            client_email: None,
            items,
            stated_amount_minor: None,
            tax_minor: 0,
            currency: "EUR".to_string(),
            issue_date,
            due_date,
            user_id: user_id.into(),
        }
    }

    #[must_use]
    pub fn client_email(mut self, email: impl Into<String>) -> Self {
        self.client_email = Some(email.into());
        self
    }

    #[must_use]
    pub fn stated_amount_minor(mut self, amount_minor: i64) -> Self {
        self.stated_amount_minor = Some(amount_minor);
        self
    }

    #[must_use]
    pub fn tax_minor(mut self, tax_minor: i64) -> Self {
        self.tax_minor = tax_minor;
        self
    }

    #[must_use]
    pub fn currency(mut self, currency: impl Into<String>) -> Self {
        self.currency = currency.into();
        self
    }
}

/// Update an invoice; `None` fields are left unchanged.
///
/// Replacing `items` (or changing `tax_minor`) recomputes the header totals
/// in the same write. A status move to `paid` stamps `paid_date`.
#[derive(Clone, Debug, Default)]
pub struct InvoiceUpdateCmd {
    pub client_name: Option<String>,
    pub client_email: Option<String>,
    pub items: Option<Vec<ItemInput>>,
    pub stated_amount_minor: Option<i64>,
    pub tax_minor: Option<i64>,
    pub status: Option<InvoiceStatus>,
    pub due_date: Option<NaiveDate>,
}

/// Create a cost forecast.
#[derive(Clone, Debug)]
pub struct ForecastNewCmd {
    pub workspace_id: String,
    pub project_name: String,
    pub estimated_minor: i64,
    pub actual_minor: i64,
    pub forecasted_minor: i64,
    pub period_start: NaiveDate,
    pub period_end: NaiveDate,
    /// Whole percent; defaults to 50 when unset.
    pub confidence: Option<i32>,
    pub user_id: String,
}

impl ForecastNewCmd {
    #[must_use]
    pub fn new(
        workspace_id: impl Into<String>,
        user_id: impl Into<String>,
        project_name: impl Into<String>,
        estimated_minor: i64,
        period_start: NaiveDate,
        period_end: NaiveDate,
    ) -> Self {
        Self {
            workspace_id: workspace_id.into(),
            project_name: project_name.into(),
            estimated_minor,
            actual_minor: 0,
            forecasted_minor: estimated_minor,
            period_start,
            period_end,
            confidence: None,
            user_id: user_id.into(),
        }
    }

    #[must_use]
    pub fn actual_minor(mut self, actual_minor: i64) -> Self {
        self.actual_minor = actual_minor;
        self
    }

    #[must_use]
    pub fn forecasted_minor(mut self, forecasted_minor: i64) -> Self {
        self.forecasted_minor = forecasted_minor;
        self
    }

    #[must_use]
    pub fn confidence(mut self, confidence: i32) -> Self {
        self.confidence = Some(confidence);
        self
    }
}

/// Move a card within one board or across boards.
///
/// With `source_board_id == dest_board_id` this is a plain reorder.
#[derive(Clone, Debug)]
pub struct CardMoveCmd {
    pub workspace_id: String,
    pub source_board_id: String,
    pub dest_board_id: String,
    pub source_index: usize,
    pub dest_index: usize,
    pub user_id: String,
}
