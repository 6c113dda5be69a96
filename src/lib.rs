//! Dompet is a web service for tracking personal finances.
//!
//! Users own accounts, transactions, budgets and savings goals. This library
//! provides the JSON API consumed by the browser dashboard: recording
//! transactions keeps account balances in step with the ledger, and the
//! dashboard endpoints aggregate a user's activity.
//!
//! Sessions are issued by an external identity provider that shares the
//! cookie secret with this service, see [set_auth_cookie].

#![warn(missing_docs)]

use std::{net::SocketAddr, time::Duration};

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_server::Handle;
use time::Date;
use tokio::signal;

mod account;
mod app_state;
mod auth;
mod budget;
mod dashboard;
mod database_id;
mod db;
mod endpoints;
mod goal;
mod logging;
mod outcome;
mod routing;
mod timezone;
mod transaction;

#[cfg(test)]
mod test_utils;

pub use account::{
    Account, AccountForm, AccountType, create_account, delete_account, get_account, get_accounts,
};
pub use app_state::AppState;
pub use auth::{COOKIE_TOKEN, DEFAULT_COOKIE_DURATION, User, UserID, create_user, set_auth_cookie};
pub use budget::{Budget, BudgetPeriod, NewBudget, create_budget};
pub use dashboard::{
    BudgetProgress, GoalProgress, Granularity, PeriodBucket, Summary, get_budget_progress,
    get_goal_progress, period_series, summarize,
};
pub use database_id::{AccountId, BudgetId, DatabaseId, GoalId, TransactionId};
pub use db::initialize as initialize_db;
pub use goal::{Goal, NewGoal, create_goal};
pub use logging::{LOG_BODY_LENGTH_LIMIT, logging_middleware};
pub use outcome::Outcome;
pub use routing::build_router;
pub use transaction::{
    Transaction, TransactionBuilder, TransactionForm, TransactionType, delete_transaction,
    get_recent_transactions, record_transaction, update_transaction,
};

use crate::outcome::failure;

/// An async task that waits for either the ctrl+c or terminate signal, whichever comes first, and
/// then signals the server to shut down gracefully.
///
/// `handle` is a handle to an Axum `Server`.
pub async fn graceful_shutdown(handle: Handle<SocketAddr>) {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::debug!("Received ctrl+c signal.");
            handle.graceful_shutdown(Some(Duration::from_secs(1)));
        },
        _ = terminate => {
            tracing::debug!("Received terminate signal.");
            handle.graceful_shutdown(Some(Duration::from_secs(1)));
        },
    }
}

/// The errors that may occur in the application.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum Error {
    /// The request did not carry a valid session.
    ///
    /// Requests that fail this check are rejected before the database is
    /// touched.
    #[error("no valid session for the request")]
    Unauthenticated,

    /// The requested resource was not found.
    ///
    /// Rows owned by another user are indistinguishable from rows that do not
    /// exist, so ownership mismatches also surface as this error.
    ///
    /// Internally, this error may occur when a query returns no rows.
    #[error("the requested resource could not be found")]
    NotFound,

    /// Tried to delete an account that is still referenced by transactions.
    #[error("the account still has transactions")]
    AccountHasTransactions,

    /// An amount was negative, infinite or NaN.
    #[error("{0} is not a valid amount")]
    InvalidAmount(f64),

    /// Applying an amount would push a balance or a total past the largest
    /// representable number.
    #[error("the amount would overflow the total")]
    AmountOverflow,

    /// An empty string was used as an account name.
    #[error("account name cannot be empty")]
    EmptyAccountName,

    /// An empty string was used as a transaction category.
    #[error("category cannot be empty")]
    EmptyCategory,

    /// A date window ended before it started.
    #[error("the end date {1} is before the start date {0}")]
    InvalidDateRange(Date, Date),

    /// The email address is already registered to another user.
    #[error("the email address is already in use")]
    DuplicateEmail,

    /// The request body could not be parsed.
    #[error("invalid request body: {0}")]
    InvalidPayload(String),

    /// An unhandled/unexpected SQL error.
    #[error("an unexpected SQL error occurred: {0}")]
    SqlError(rusqlite::Error),

    /// Could not acquire the database lock
    #[error("could not acquire the database lock")]
    DatabaseLockError,

    /// An error occurred while getting the local timezone from a canonical timezone string.
    #[error("invalid timezone {0}")]
    InvalidTimezoneError(String),

    /// An error occurred while serializing a struct as JSON
    #[error("could not serialize as JSON: {0}")]
    JSONSerializationError(String),
}

impl From<rusqlite::Error> for Error {
    fn from(value: rusqlite::Error) -> Self {
        match value {
            rusqlite::Error::QueryReturnedNoRows => Error::NotFound,
            error => {
                tracing::error!("an unhandled SQL error occurred: {}", error);
                Error::SqlError(error)
            }
        }
    }
}

impl Error {
    /// Whether the error came from the store or the server rather than from
    /// the caller's input.
    pub fn is_persistence_failure(&self) -> bool {
        matches!(
            self,
            Error::SqlError(_)
                | Error::DatabaseLockError
                | Error::InvalidTimezoneError(_)
                | Error::JSONSerializationError(_)
        )
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        match self {
            Error::Unauthenticated => failure(
                StatusCode::UNAUTHORIZED,
                "Invalid session. Please log in again.",
            ),
            Error::NotFound => failure(
                StatusCode::NOT_FOUND,
                "The requested resource could not be found.",
            ),
            Error::AccountHasTransactions => failure(
                StatusCode::CONFLICT,
                "Account cannot be deleted because it still has transaction history.",
            ),
            Error::InvalidAmount(amount) => failure(
                StatusCode::BAD_REQUEST,
                &format!("{amount} is not a valid amount. Enter a finite, non-negative number."),
            ),
            Error::AmountOverflow => failure(
                StatusCode::BAD_REQUEST,
                "The amount is too large for the account or dashboard totals.",
            ),
            Error::EmptyAccountName => {
                failure(StatusCode::BAD_REQUEST, "Account name cannot be empty.")
            }
            Error::EmptyCategory => failure(StatusCode::BAD_REQUEST, "Category cannot be empty."),
            Error::InvalidDateRange(start, end) => failure(
                StatusCode::BAD_REQUEST,
                &format!("The end date {end} must not be before the start date {start}."),
            ),
            Error::DuplicateEmail => failure(StatusCode::BAD_REQUEST, "User already exists."),
            Error::InvalidPayload(reason) => failure(StatusCode::BAD_REQUEST, &reason),
            Error::InvalidTimezoneError(timezone) => failure(
                StatusCode::INTERNAL_SERVER_ERROR,
                &format!(
                    "Could not get local timezone \"{timezone}\". Check your server settings and \
                    ensure the timezone has been set to valid, canonical timezone string"
                ),
            ),
            // The details of any other error are for the server logs only.
            _ => failure(
                StatusCode::INTERNAL_SERVER_ERROR,
                "Something went wrong. Try again later or check the server logs.",
            ),
        }
    }
}
