//! Invoices: header, status lifecycle and total reconciliation.
//!
//! The invoice `amount_minor` is always the sum of its item totals and
//! `total_minor` is always `amount_minor + tax_minor`; neither is an
//! independently edited figure. Totals are recomputed on every item change.

use chrono::NaiveDate;
use sea_orm::{ActiveValue, entity::prelude::*};
use uuid::Uuid;

use crate::{EngineError, MoneyMinor, ResultEngine, invoice_items};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum InvoiceStatus {
    Draft,
    Sent,
    Paid,
    Overdue,
    Cancelled,
}

impl InvoiceStatus {
    /// Returns the canonical status string stored in the database.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Draft => "draft",
            Self::Sent => "sent",
            Self::Paid => "paid",
            Self::Overdue => "overdue",
            Self::Cancelled => "cancelled",
        }
    }

    /// Validates a status move.
    ///
    /// draft -> sent -> paid, with cancel allowed from draft and sent.
    /// `overdue` is derived by the alert pass from `sent` + a past due date,
    /// never set by hand, and an overdue invoice can still be paid.
    pub fn transition(self, to: InvoiceStatus) -> ResultEngine<InvoiceStatus> {
        let allowed = matches!(
            (self, to),
            (Self::Draft, Self::Sent)
                | (Self::Sent, Self::Paid)
                | (Self::Overdue, Self::Paid)
                | (Self::Draft, Self::Cancelled)
                | (Self::Sent, Self::Cancelled)
        );
        if !allowed {
            return Err(EngineError::InvalidTransition(format!(
                "invoice cannot move from {} to {}",
                self.as_str(),
                to.as_str()
            )));
        }
        Ok(to)
    }
}

impl TryFrom<&str> for InvoiceStatus {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "draft" => Ok(Self::Draft),
            "sent" => Ok(Self::Sent),
            "paid" => Ok(Self::Paid),
            "overdue" => Ok(Self::Overdue),
            "cancelled" => Ok(Self::Cancelled),
            other => Err(EngineError::InvalidTransition(format!(
                "invalid invoice status: {other}"
            ))),
        }
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "invoices")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub workspace_id: String,
    /// Unique per workspace.
    pub invoice_number: String,
    pub client_name: String,
    pub client_email: Option<String>,
    /// Sum of item totals.
    pub amount_minor: i64,
    pub tax_minor: i64,
    /// Always `amount_minor + tax_minor`.
    pub total_minor: i64,
    pub currency: String,
    pub status: String,
    pub issue_date: Date,
    pub due_date: Date,
    pub paid_date: Option<Date>,
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
    #[sea_orm(has_many = "super::invoice_items::Entity")]
    Items,
}

impl Related<super::workspaces::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Workspaces.def()
    }
}

impl Related<super::invoice_items::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Items.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

/// One line of a new or replaced invoice, before ids are assigned.
#[derive(Clone, Debug)]
pub struct ItemInput {
    pub description: String,
    pub quantity: i32,
    pub unit_price_minor: i64,
}

impl ItemInput {
    fn validate(&self) -> ResultEngine<()> {
        if self.description.trim().is_empty() {
            return Err(EngineError::InvalidAmount(
                "item description must not be empty".to_string(),
            ));
        }
        if self.quantity < 1 {
            return Err(EngineError::InvalidAmount(
                "item quantity must be >= 1".to_string(),
            ));
        }
        if self.unit_price_minor < 0 {
            return Err(EngineError::InvalidAmount(
                "item unit price must not be negative".to_string(),
            ));
        }
        Ok(())
    }

    /// The line total, `quantity * unit_price`, guarded against overflow.
    pub fn line_total(&self) -> ResultEngine<MoneyMinor> {
        MoneyMinor::new(self.unit_price_minor)
            .checked_mul(i64::from(self.quantity))
            .ok_or_else(|| EngineError::InvalidAmount("item total too large".to_string()))
    }
}

/// Computed header totals for a set of items.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct InvoiceTotals {
    pub amount_minor: i64,
    pub total_minor: i64,
}

/// Computes and validates invoice totals from its items.
///
/// Fails when the item list is empty, any item is malformed, or the tax is
/// negative.
pub fn invoice_totals(items: &[ItemInput], tax_minor: i64) -> ResultEngine<InvoiceTotals> {
    if items.is_empty() {
        return Err(EngineError::InvalidAmount(
            "invoice needs at least one item".to_string(),
        ));
    }
    if tax_minor < 0 {
        return Err(EngineError::InvalidAmount(
            "tax must not be negative".to_string(),
        ));
    }
    let mut amount = MoneyMinor::ZERO;
    for item in items {
        item.validate()?;
        amount = amount
            .checked_add(item.line_total()?)
            .ok_or_else(|| EngineError::InvalidAmount("invoice amount too large".to_string()))?;
    }
    let total = amount
        .checked_add(MoneyMinor::new(tax_minor))
        .ok_or_else(|| EngineError::InvalidAmount("invoice total too large".to_string()))?;
    Ok(InvoiceTotals {
        amount_minor: amount.minor(),
        total_minor: total.minor(),
    })
}

/// Checks a client-supplied amount against the item-derived one.
///
/// The item sum is authoritative; a stated amount that disagrees is a
/// conflict the caller has to correct, not a value to overwrite.
pub fn reconcile_amount(stated_minor: Option<i64>, totals: InvoiceTotals) -> ResultEngine<()> {
    if let Some(stated) = stated_minor
        && stated != totals.amount_minor
    {
        return Err(EngineError::Conflict(format!(
            "stated amount {} does not match item total {}",
            stated, totals.amount_minor
        )));
    }
    Ok(())
}

/// Field bag for inserting a new invoice header; totals come from
/// [`invoice_totals`] and items are inserted separately.
pub struct NewInvoice {
    pub workspace_id: String,
    pub invoice_number: String,
    pub client_name: String,
    pub client_email: Option<String>,
    pub totals: InvoiceTotals,
    pub tax_minor: i64,
    pub currency: String,
    pub issue_date: NaiveDate,
    pub due_date: NaiveDate,
}

impl From<NewInvoice> for ActiveModel {
    fn from(invoice: NewInvoice) -> Self {
        Self {
            id: ActiveValue::Set(Uuid::new_v4().to_string()),
            workspace_id: ActiveValue::Set(invoice.workspace_id),
            invoice_number: ActiveValue::Set(invoice.invoice_number),
            client_name: ActiveValue::Set(invoice.client_name),
            client_email: ActiveValue::Set(invoice.client_email),
            amount_minor: ActiveValue::Set(invoice.totals.amount_minor),
            tax_minor: ActiveValue::Set(invoice.tax_minor),
            total_minor: ActiveValue::Set(invoice.totals.total_minor),
            currency: ActiveValue::Set(invoice.currency),
            status: ActiveValue::Set(InvoiceStatus::Draft.as_str().to_string()),
            issue_date: ActiveValue::Set(invoice.issue_date),
            due_date: ActiveValue::Set(invoice.due_date),
            paid_date: ActiveValue::Set(None),
        }
    }
}

/// Builds item rows for an invoice from validated inputs.
pub fn item_models(
    invoice_id: &str,
    items: &[ItemInput],
) -> ResultEngine<Vec<invoice_items::ActiveModel>> {
    items
        .iter()
        .map(|item| {
            Ok(invoice_items::ActiveModel {
                id: ActiveValue::Set(Uuid::new_v4().to_string()),
                invoice_id: ActiveValue::Set(invoice_id.to_string()),
                description: ActiveValue::Set(item.description.clone()),
                quantity: ActiveValue::Set(item.quantity),
                unit_price_minor: ActiveValue::Set(item.unit_price_minor),
                total_minor: ActiveValue::Set(item.line_total()?.minor()),
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(quantity: i32, unit_price_minor: i64) -> ItemInput {
        ItemInput {
            description: "work".to_string(),
            quantity,
            unit_price_minor,
        }
    }

    #[test]
    fn totals_sum_items_and_tax() {
        // 2 x 10.00 + 1 x 5.00, tax 2.50
        let totals = invoice_totals(&[item(2, 10_00), item(1, 5_00)], 2_50).unwrap();
        assert_eq!(totals.amount_minor, 25_00);
        assert_eq!(totals.total_minor, 27_50);
    }

    #[test]
    fn totals_reject_bad_input() {
        assert!(invoice_totals(&[], 0).is_err());
        assert!(invoice_totals(&[item(0, 10_00)], 0).is_err());
        assert!(invoice_totals(&[item(1, -1)], 0).is_err());
        assert!(invoice_totals(&[item(1, 10_00)], -1).is_err());
    }

    #[test]
    fn totals_reject_overflow() {
        // A single line overflowing quantity * unit price.
        assert!(matches!(
            invoice_totals(&[item(2, i64::MAX)], 0),
            Err(EngineError::InvalidAmount(_))
        ));
        // Lines that each fit but whose sum does not.
        assert!(matches!(
            invoice_totals(&[item(1, i64::MAX), item(1, 1)], 0),
            Err(EngineError::InvalidAmount(_))
        ));
        // A tax pushing the grand total over.
        assert!(matches!(
            invoice_totals(&[item(1, i64::MAX)], 1),
            Err(EngineError::InvalidAmount(_))
        ));
    }

    #[test]
    fn reconcile_flags_mismatch_as_conflict() {
        let totals = invoice_totals(&[item(2, 10_00)], 0).unwrap();
        assert!(reconcile_amount(None, totals).is_ok());
        assert!(reconcile_amount(Some(20_00), totals).is_ok());
        assert!(matches!(
            reconcile_amount(Some(19_99), totals),
            Err(EngineError::Conflict(_))
        ));
    }

    #[test]
    fn status_lifecycle() {
        use InvoiceStatus::*;
        assert_eq!(Draft.transition(Sent).unwrap(), Sent);
        assert_eq!(Sent.transition(Paid).unwrap(), Paid);
        assert_eq!(Overdue.transition(Paid).unwrap(), Paid);
        assert_eq!(Draft.transition(Cancelled).unwrap(), Cancelled);
        assert_eq!(Sent.transition(Cancelled).unwrap(), Cancelled);

        assert!(Draft.transition(Paid).is_err());
        assert!(Paid.transition(Sent).is_err());
        assert!(Cancelled.transition(Sent).is_err());
        assert!(Paid.transition(Cancelled).is_err());
    }
}
