//! Defines the endpoint for the recent transactions list.

use axum::{
    Extension,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
};

use crate::{
    Error, UserID,
    outcome::success,
    transaction::{TransactionState, get_recent_transactions},
};

/// How many transactions the recent transactions list shows.
pub const RECENT_TRANSACTIONS_LIMIT: u32 = 10;

/// A route handler that responds with the user's most recent transactions, latest date first.
pub async fn get_recent_transactions_endpoint(
    State(state): State<TransactionState>,
    Extension(user_id): Extension<UserID>,
) -> Response {
    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_response();
        }
    };

    match get_recent_transactions(user_id, RECENT_TRANSACTIONS_LIMIT, &connection) {
        Ok(transactions) => success(StatusCode::OK, transactions),
        Err(error) => {
            tracing::error!("Could not get recent transactions for user {user_id}: {error}");
            error.into_response()
        }
    }
}
