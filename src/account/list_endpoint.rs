//! Defines the endpoint for listing a user's accounts.

use axum::{
    Extension,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
};

use crate::{
    Error, UserID,
    account::{AccountState, get_accounts},
    outcome::success,
};

/// A route handler that responds with the user's accounts, newest first.
pub async fn get_accounts_endpoint(
    State(state): State<AccountState>,
    Extension(user_id): Extension<UserID>,
) -> Response {
    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_response();
        }
    };

    match get_accounts(user_id, &connection) {
        Ok(accounts) => success(StatusCode::OK, accounts),
        Err(error) => {
            tracing::error!("Could not get accounts for user {user_id}: {error}");
            error.into_response()
        }
    }
}
