//! Tallyboard domain engine.
//!
//! The engine owns the financial aggregation and ordering logic of the
//! application: budget views computed from approved expenses, the expense
//! approval state machine, invoice total reconciliation, forecast metrics,
//! the alert rules with their dedup keys, and the dense position ordering of
//! boards and cards. Every public operation runs inside one database
//! transaction.

pub use alerts::{AlertDraft, AlertSeverity, AlertType, budget_alerts, invoice_overdue_alert};
pub use budgets::BudgetView;
pub use commands::{
    BudgetNewCmd, BudgetUpdateCmd, CardMoveCmd, ExpenseNewCmd, ExpenseUpdateCmd, ForecastNewCmd,
    InvoiceNewCmd, InvoiceUpdateCmd,
};
pub use error::EngineError;
pub use expenses::{ExpenseAction, ExpenseStatus};
pub use forecasts::ForecastMetrics;
pub use invoices::{InvoiceStatus, InvoiceTotals, ItemInput, invoice_totals, reconcile_amount};
pub use money::{MoneyMinor, percentage};
pub use ops::{BoardWithCards, Engine, EngineBuilder, InvoiceWithItems, Member};
pub use workspaces::Workspace;

pub mod alerts;
pub mod boards;
pub mod budgets;
mod commands;
pub mod cards;
mod error;
pub mod expenses;
pub mod forecasts;
pub mod invoice_items;
pub mod invoices;
pub mod memberships;
mod money;
mod ops;
pub mod ordering;
pub mod users;
mod util;
pub mod workspaces;

type ResultEngine<T> = Result<T, EngineError>;
