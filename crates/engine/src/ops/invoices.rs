use chrono::Utc;
use sea_orm::{
    ActiveValue, DatabaseTransaction, QueryFilter, QueryOrder, TransactionTrait, prelude::*,
    sea_query::Expr,
};

use crate::{
    EngineError, InvoiceNewCmd, InvoiceUpdateCmd, ResultEngine, invoice_items, invoices,
    invoices::{InvoiceStatus, ItemInput},
    util::{normalize_optional_text, normalize_required_name, validate_date_range},
};

use super::{Engine, with_tx};

/// An invoice header with its line items.
#[derive(Clone, Debug, PartialEq)]
pub struct InvoiceWithItems {
    pub invoice: invoices::Model,
    pub items: Vec<invoice_items::Model>,
}

impl Engine {
    async fn items_for(
        &self,
        db: &DatabaseTransaction,
        invoice_id: &str,
    ) -> ResultEngine<Vec<invoice_items::Model>> {
        invoice_items::Entity::find()
            .filter(invoice_items::Column::InvoiceId.eq(invoice_id.to_string()))
            .all(db)
            .await
            .map_err(Into::into)
    }

    /// Add a new invoice with its items. Always starts `draft`.
    ///
    /// The header amount is derived from the items; a stated amount that
    /// disagrees with the item sum is rejected as a conflict.
    pub async fn new_invoice(&self, cmd: InvoiceNewCmd) -> ResultEngine<String> {
        let invoice_number = normalize_required_name(&cmd.invoice_number, "invoice number")?;
        let client_name = normalize_required_name(&cmd.client_name, "client name")?;
        let client_email = normalize_optional_text(cmd.client_email.as_deref());
        let currency = normalize_required_name(&cmd.currency, "currency")?;
        validate_date_range(cmd.issue_date, cmd.due_date, "invoice")?;

        let totals = crate::invoice_totals(&cmd.items, cmd.tax_minor)?;
        crate::reconcile_amount(cmd.stated_amount_minor, totals)?;

        with_tx!(self, |db_tx| {
            self.require_workspace_write(&db_tx, &cmd.workspace_id, &cmd.user_id)
                .await?;

            let exists = invoices::Entity::find()
                .filter(invoices::Column::WorkspaceId.eq(cmd.workspace_id.clone()))
                .filter(Expr::cust("LOWER(invoice_number)").eq(invoice_number.to_lowercase()))
                .one(&db_tx)
                .await?
                .is_some();
            if exists {
                return Err(EngineError::Conflict(format!(
                    "invoice number '{invoice_number}' already used in this workspace"
                )));
            }

            let model: invoices::ActiveModel = invoices::NewInvoice {
                workspace_id: cmd.workspace_id.clone(),
                invoice_number: invoice_number.clone(),
                client_name: client_name.clone(),
                client_email: client_email.clone(),
                totals,
                tax_minor: cmd.tax_minor,
                currency: currency.clone(),
                issue_date: cmd.issue_date,
                due_date: cmd.due_date,
            }
            .into();
            let inserted = model.insert(&db_tx).await?;

            for item in invoices::item_models(&inserted.id, &cmd.items)? {
                item.insert(&db_tx).await?;
            }

            Ok(inserted.id)
        })
    }

    /// Return one invoice with its items.
    pub async fn invoice(&self, invoice_id: &str, user_id: &str) -> ResultEngine<InvoiceWithItems> {
        with_tx!(self, |db_tx| {
            let invoice = self.require_invoice(&db_tx, invoice_id).await?;
            self.require_workspace_read(&db_tx, &invoice.workspace_id, user_id)
                .await?;
            let items = self.items_for(&db_tx, invoice_id).await?;
            Ok(InvoiceWithItems { invoice, items })
        })
    }

    /// List the workspace's invoices with items, newest issue date first.
    pub async fn list_invoices(
        &self,
        workspace_id: &str,
        user_id: &str,
    ) -> ResultEngine<Vec<InvoiceWithItems>> {
        with_tx!(self, |db_tx| {
            self.require_workspace_read(&db_tx, workspace_id, user_id)
                .await?;
            let invoice_models = invoices::Entity::find()
                .filter(invoices::Column::WorkspaceId.eq(workspace_id.to_string()))
                .order_by_desc(invoices::Column::IssueDate)
                .all(&db_tx)
                .await?;
            let mut result = Vec::with_capacity(invoice_models.len());
            for invoice in invoice_models {
                let items = self.items_for(&db_tx, &invoice.id).await?;
                result.push(InvoiceWithItems { invoice, items });
            }
            Ok(result)
        })
    }

    /// Update an invoice.
    ///
    /// Replacing items (or the tax) rewrites the lines wholesale and
    /// recomputes the header totals in the same transaction; the header can
    /// never disagree with its lines. A status move is validated by the
    /// lifecycle state machine and `paid` stamps the paid date.
    pub async fn update_invoice(
        &self,
        invoice_id: &str,
        cmd: InvoiceUpdateCmd,
        user_id: &str,
    ) -> ResultEngine<()> {
        let client_name = cmd
            .client_name
            .as_deref()
            .map(|n| normalize_required_name(n, "client name"))
            .transpose()?;
        let client_email = normalize_optional_text(cmd.client_email.as_deref());

        with_tx!(self, |db_tx| {
            let invoice = self.require_invoice(&db_tx, invoice_id).await?;
            self.require_workspace_write(&db_tx, &invoice.workspace_id, user_id)
                .await?;

            let issue_date = invoice.issue_date;
            let due_date = cmd.due_date.unwrap_or(invoice.due_date);
            validate_date_range(issue_date, due_date, "invoice")?;

            let current_status = InvoiceStatus::try_from(invoice.status.as_str())?;
            let next_status = cmd
                .status
                .map(|to| current_status.transition(to))
                .transpose()?;

            // Items and tax drive the totals; recompute whenever either moves.
            let new_items: Option<Vec<ItemInput>> = cmd.items.clone();
            let tax_minor = cmd.tax_minor.unwrap_or(invoice.tax_minor);
            let totals = match &new_items {
                Some(items) => {
                    if current_status != InvoiceStatus::Draft {
                        return Err(EngineError::Conflict(
                            "items can only change while the invoice is a draft".to_string(),
                        ));
                    }
                    let totals = crate::invoice_totals(items, tax_minor)?;
                    crate::reconcile_amount(cmd.stated_amount_minor, totals)?;
                    Some(totals)
                }
                None if cmd.tax_minor.is_some() => {
                    let existing = self.items_for(&db_tx, invoice_id).await?;
                    let inputs: Vec<ItemInput> = existing
                        .iter()
                        .map(|item| ItemInput {
                            description: item.description.clone(),
                            quantity: item.quantity,
                            unit_price_minor: item.unit_price_minor,
                        })
                        .collect();
                    Some(crate::invoice_totals(&inputs, tax_minor)?)
                }
                None => None,
            };

            let mut active: invoices::ActiveModel = invoice.into();
            if let Some(client_name) = client_name.clone() {
                active.client_name = ActiveValue::Set(client_name);
            }
            if let Some(client_email) = client_email.clone() {
                active.client_email = ActiveValue::Set(Some(client_email));
            }
            active.due_date = ActiveValue::Set(due_date);
            if let Some(totals) = totals {
                active.amount_minor = ActiveValue::Set(totals.amount_minor);
                active.tax_minor = ActiveValue::Set(tax_minor);
                active.total_minor = ActiveValue::Set(totals.total_minor);
            }
            if let Some(next) = next_status {
                active.status = ActiveValue::Set(next.as_str().to_string());
                if next == InvoiceStatus::Paid {
                    active.paid_date = ActiveValue::Set(Some(Utc::now().date_naive()));
                }
            }
            active.update(&db_tx).await?;

            if let Some(items) = new_items {
                invoice_items::Entity::delete_many()
                    .filter(invoice_items::Column::InvoiceId.eq(invoice_id.to_string()))
                    .exec(&db_tx)
                    .await?;
                for item in invoices::item_models(invoice_id, &items)? {
                    item.insert(&db_tx).await?;
                }
            }

            Ok(())
        })
    }
}
