use axum::{Json, http::StatusCode, response::IntoResponse};
use engine::EngineError;

use serde::Serialize;
pub use server::run_with_listener;

mod alerts;
mod boards;
mod budgets;
mod expenses;
mod forecasts;
mod invoices;
mod memberships;
mod server;
mod user;
mod workspaces;

pub mod types {
    pub mod workspace {
        pub use api_types::workspace::{WorkspaceNew, WorkspaceView};
    }

    pub mod membership {
        pub use api_types::membership::{MemberUpsert, MemberView, MembersResponse, MembershipRole};
    }

    pub mod board {
        pub use api_types::board::{
            BoardNew, BoardRename, BoardReorder, BoardView, CardMove, CardNew, CardUpdate, CardView,
        };
    }

    pub mod budget {
        pub use api_types::budget::{BudgetDelete, BudgetNew, BudgetUpdate, BudgetView};
    }

    pub mod expense {
        pub use api_types::expense::{
            ExpenseDecision, ExpenseNew, ExpenseStatus, ExpenseUpdate, ExpenseView,
        };
    }

    pub mod invoice {
        pub use api_types::invoice::{
            InvoiceNew, InvoiceStatus, InvoiceUpdate, InvoiceView, ItemNew, ItemView,
        };
    }

    pub mod forecast {
        pub use api_types::forecast::{ForecastNew, ForecastView};
    }

    pub mod alert {
        pub use api_types::alert::{
            AlertList, AlertSeverity, AlertType, AlertView, AlertsEvaluated,
        };
    }
}

pub enum ServerError {
    Engine(EngineError),
    Generic(String),
}

//TODO: Find a better solution
#[derive(Serialize)]
struct Error {
    error: String,
}

fn status_for_engine_error(err: &EngineError) -> StatusCode {
    match err {
        EngineError::Forbidden(_) => StatusCode::FORBIDDEN,
        EngineError::KeyNotFound(_) => StatusCode::NOT_FOUND,
        EngineError::Conflict(_) => StatusCode::CONFLICT,
        EngineError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
        EngineError::InvalidAmount(_)
        | EngineError::InvalidDate(_)
        | EngineError::InvalidTransition(_)
        | EngineError::IndexOutOfRange(_)
        | EngineError::InvalidRole(_)
        | EngineError::InvalidId(_) => StatusCode::UNPROCESSABLE_ENTITY,
    }
}

fn message_for_engine_error(err: EngineError) -> String {
    match err {
        EngineError::Database(db_err) => {
            tracing::error!("database error: {db_err}");
            "internal server error".to_string()
        }
        other => other.to_string(),
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> axum::response::Response {
        let (status, error) = match self {
            ServerError::Engine(err) => (status_for_engine_error(&err), message_for_engine_error(err)),
            ServerError::Generic(err) => (StatusCode::BAD_REQUEST, err),
        };

        (status, Json(Error { error })).into_response()
    }
}

impl From<EngineError> for ServerError {
    fn from(value: EngineError) -> Self {
        Self::Engine(value)
    }
}
