//! Invoice endpoints.
//!
//! Header totals are always derived from the line items; a client-stated
//! amount is only a cross-check and a mismatch is rejected.

use api_types::{
    Created,
    invoice::{InvoiceNew, InvoiceStatus, InvoiceUpdate, InvoiceView, ItemNew, ItemView},
};
use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
};
use engine::{InvoiceNewCmd, InvoiceUpdateCmd, InvoiceWithItems, ItemInput};

use crate::{ServerError, server::ServerState, user};

fn status_view(status: &str) -> InvoiceStatus {
    match status {
        "sent" => InvoiceStatus::Sent,
        "paid" => InvoiceStatus::Paid,
        "overdue" => InvoiceStatus::Overdue,
        "cancelled" => InvoiceStatus::Cancelled,
        _ => InvoiceStatus::Draft,
    }
}

fn status_cmd(status: InvoiceStatus) -> engine::InvoiceStatus {
    match status {
        InvoiceStatus::Draft => engine::InvoiceStatus::Draft,
        InvoiceStatus::Sent => engine::InvoiceStatus::Sent,
        InvoiceStatus::Paid => engine::InvoiceStatus::Paid,
        InvoiceStatus::Overdue => engine::InvoiceStatus::Overdue,
        InvoiceStatus::Cancelled => engine::InvoiceStatus::Cancelled,
    }
}

fn items_cmd(items: Vec<ItemNew>) -> Vec<ItemInput> {
    items
        .into_iter()
        .map(|item| ItemInput {
            description: item.description,
            quantity: item.quantity,
            unit_price_minor: item.unit_price_minor,
        })
        .collect()
}

fn view(invoice: InvoiceWithItems) -> InvoiceView {
    InvoiceView {
        id: invoice.invoice.id,
        invoice_number: invoice.invoice.invoice_number,
        client_name: invoice.invoice.client_name,
        client_email: invoice.invoice.client_email,
        amount_minor: invoice.invoice.amount_minor,
        tax_minor: invoice.invoice.tax_minor,
        total_minor: invoice.invoice.total_minor,
        currency: invoice.invoice.currency,
        status: status_view(&invoice.invoice.status),
        issue_date: invoice.invoice.issue_date,
        due_date: invoice.invoice.due_date,
        paid_date: invoice.invoice.paid_date,
        items: invoice
            .items
            .into_iter()
            .map(|item| ItemView {
                id: item.id,
                description: item.description,
                quantity: item.quantity,
                unit_price_minor: item.unit_price_minor,
                total_minor: item.total_minor,
            })
            .collect(),
    }
}

pub async fn create(
    Extension(user): Extension<user::Model>,
    State(state): State<ServerState>,
    Path(workspace_id): Path<String>,
    Json(payload): Json<InvoiceNew>,
) -> Result<(StatusCode, Json<Created>), ServerError> {
    let id = state
        .engine
        .new_invoice(InvoiceNewCmd {
            workspace_id,
            invoice_number: payload.invoice_number,
            client_name: payload.client_name,
            client_email: payload.client_email,
            items: items_cmd(payload.items),
            stated_amount_minor: payload.amount_minor,
            tax_minor: payload.tax_minor.unwrap_or(0),
            currency: payload.currency.unwrap_or_else(|| "EUR".to_string()),
            issue_date: payload.issue_date,
            due_date: payload.due_date,
            user_id: user.username,
        })
        .await?;
    Ok((StatusCode::CREATED, Json(Created { id })))
}

pub async fn get(
    Extension(user): Extension<user::Model>,
    State(state): State<ServerState>,
    Path(invoice_id): Path<String>,
) -> Result<Json<InvoiceView>, ServerError> {
    let invoice = state.engine.invoice(&invoice_id, &user.username).await?;
    Ok(Json(view(invoice)))
}

pub async fn list(
    Extension(user): Extension<user::Model>,
    State(state): State<ServerState>,
    Path(workspace_id): Path<String>,
) -> Result<Json<Vec<InvoiceView>>, ServerError> {
    let invoices = state
        .engine
        .list_invoices(&workspace_id, &user.username)
        .await?;
    Ok(Json(invoices.into_iter().map(view).collect()))
}

pub async fn update(
    Extension(user): Extension<user::Model>,
    State(state): State<ServerState>,
    Path(invoice_id): Path<String>,
    Json(payload): Json<InvoiceUpdate>,
) -> Result<Json<InvoiceView>, ServerError> {
    state
        .engine
        .update_invoice(
            &invoice_id,
            InvoiceUpdateCmd {
                client_name: payload.client_name,
                client_email: payload.client_email,
                items: payload.items.map(items_cmd),
                stated_amount_minor: payload.amount_minor,
                tax_minor: payload.tax_minor,
                status: payload.status.map(status_cmd),
                due_date: payload.due_date,
            },
            &user.username,
        )
        .await?;
    let invoice = state.engine.invoice(&invoice_id, &user.username).await?;
    Ok(Json(view(invoice)))
}
