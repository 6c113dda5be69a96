use axum::{
    Extension,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use rusqlite::Connection;

use crate::{
    Error, UserID, database_id::TransactionId, outcome::success, transaction::TransactionState,
};

/// A route handler for deleting a transaction, responds with the deleted transaction's ID.
///
/// The account balance is not restored.
pub async fn delete_transaction_endpoint(
    State(state): State<TransactionState>,
    Extension(user_id): Extension<UserID>,
    Path(transaction_id): Path<TransactionId>,
) -> Response {
    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_response();
        }
    };

    match delete_transaction(transaction_id, user_id, &connection) {
        Ok(()) => success(StatusCode::OK, transaction_id),
        Err(error) => {
            if error.is_persistence_failure() {
                tracing::error!(
                    "Could not delete transaction {transaction_id} for user {user_id}: {error}"
                );
            }
            error.into_response()
        }
    }
}

/// Delete the transaction `id` owned by `user_id`.
///
/// # Errors
/// Returns [Error::NotFound] if the transaction does not exist or belongs to
/// another user, or [Error::SqlError] if there is some other SQL error.
pub fn delete_transaction(
    id: TransactionId,
    user_id: UserID,
    connection: &Connection,
) -> Result<(), Error> {
    let rows_affected = connection.execute(
        "DELETE FROM \"transaction\" WHERE id = ?1 AND user_id = ?2",
        (id, user_id),
    )?;

    if rows_affected == 0 {
        return Err(Error::NotFound);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use axum::{
        Extension,
        extract::{Path, State},
        http::StatusCode,
    };
    use time::macros::date;

    use crate::{
        Error,
        account::{AccountForm, AccountType, create_account, delete_account, get_account},
        test_utils::{create_test_user, get_test_connection, parse_outcome},
        transaction::{
            Transaction, TransactionState, TransactionType,
            delete_endpoint::{delete_transaction, delete_transaction_endpoint},
            get_transaction, record_transaction,
        },
    };

    #[test]
    fn deletes_transaction_without_restoring_balance() {
        let conn = get_test_connection();
        let user_id = create_test_user("alice@example.com", &conn);
        let account = create_account(
            user_id,
            &AccountForm {
                name: "Cash".to_owned(),
                account_type: AccountType::Cash,
                balance: 100.0,
            },
            &conn,
        )
        .unwrap();
        let transaction = record_transaction(
            user_id,
            Transaction::build(30.0, TransactionType::Expense, "Food", date!(2025 - 10 - 26))
                .account_id(Some(account.id)),
            &conn,
        )
        .unwrap();

        delete_transaction(transaction.id, user_id, &conn).unwrap();

        assert_eq!(
            get_transaction(transaction.id, user_id, &conn),
            Err(Error::NotFound)
        );
        assert_eq!(get_account(account.id, user_id, &conn).unwrap().balance, 70.0);
        // With the last reference gone the account can be deleted.
        assert_eq!(delete_account(account.id, user_id, &conn), Ok(()));
    }

    #[test]
    fn foreign_transaction_is_not_found() {
        let conn = get_test_connection();
        let alice = create_test_user("alice@example.com", &conn);
        let bob = create_test_user("bob@example.com", &conn);
        let transaction = record_transaction(
            alice,
            Transaction::build(1.0, TransactionType::Income, "Gift", date!(2025 - 10 - 26)),
            &conn,
        )
        .unwrap();

        assert_eq!(
            delete_transaction(transaction.id, bob, &conn),
            Err(Error::NotFound)
        );
        assert!(get_transaction(transaction.id, alice, &conn).is_ok());
    }

    #[tokio::test]
    async fn endpoint_reports_missing_transaction() {
        let conn = get_test_connection();
        let user_id = create_test_user("alice@example.com", &conn);
        let state = TransactionState {
            db_connection: Arc::new(Mutex::new(conn)),
        };

        let response =
            delete_transaction_endpoint(State(state), Extension(user_id), Path(42)).await;

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        parse_outcome::<()>(response).await.unwrap_failure();
    }
}
