//! Defines the endpoint for editing a transaction.

use axum::{
    Extension, Json,
    extract::{Path, State, rejection::JsonRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use rusqlite::Connection;

use crate::{
    Error, UserID,
    account::get_account,
    database_id::TransactionId,
    outcome::success,
    transaction::{Transaction, TransactionForm, TransactionState, core::map_transaction_row},
};

/// A route handler for editing a transaction, responds with the updated transaction.
///
/// Account balances are not adjusted.
pub async fn edit_transaction_endpoint(
    State(state): State<TransactionState>,
    Extension(user_id): Extension<UserID>,
    Path(transaction_id): Path<TransactionId>,
    form: Result<Json<TransactionForm>, JsonRejection>,
) -> Response {
    let Json(form) = match form {
        Ok(form) => form,
        Err(rejection) => return Error::InvalidPayload(rejection.body_text()).into_response(),
    };

    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_response();
        }
    };

    match update_transaction(transaction_id, user_id, &form, &connection) {
        Ok(transaction) => success(StatusCode::OK, transaction),
        Err(error) => {
            if error.is_persistence_failure() {
                tracing::error!(
                    "Could not update transaction {transaction_id} for user {user_id} with {form:?}: {error}"
                );
            }
            error.into_response()
        }
    }
}

/// Overwrite the fields of the transaction `id` owned by `user_id`.
///
/// Balances are left as they are, even when the amount, type or account
/// changes.
///
/// # Errors
/// This function will return a:
/// - [Error::InvalidAmount] or [Error::EmptyCategory] if the new values are invalid,
/// - [Error::NotFound] if the transaction or the new account is missing or
///   belongs to another user,
/// - or [Error::SqlError] if there is some other SQL error.
pub fn update_transaction(
    id: TransactionId,
    user_id: UserID,
    form: &TransactionForm,
    connection: &Connection,
) -> Result<Transaction, Error> {
    let builder = form.to_builder();
    builder.validate()?;

    if let Some(account_id) = builder.account_id {
        get_account(account_id, user_id, connection)?;
    }

    connection
        .prepare(
            "UPDATE \"transaction\"
            SET \
                account_id = ?1, \
                amount = ?2, \
                type = ?3, \
                category = ?4, \
                date = ?5, \
                description = ?6 \
            WHERE id = ?7 AND user_id = ?8
            RETURNING id, user_id, account_id, amount, type, category, date, description",
        )?
        .query_row(
            (
                builder.account_id,
                builder.amount,
                builder.transaction_type,
                builder.category.trim(),
                builder.date,
                builder.description.as_deref(),
                id,
                user_id,
            ),
            map_transaction_row,
        )
        .map_err(Error::from)
}
