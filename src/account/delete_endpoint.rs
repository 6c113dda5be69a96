//! Defines the endpoint for deleting an account.

use axum::{
    Extension,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use rusqlite::{Connection, Transaction as SqlTransaction, TransactionBehavior};

use crate::{
    Error, UserID,
    account::{AccountState, get_account},
    database_id::AccountId,
    outcome::success,
};

/// A route handler for deleting an account, responds with the deleted account's ID.
///
/// Accounts that are still referenced by transactions are not deleted.
pub async fn delete_account_endpoint(
    State(state): State<AccountState>,
    Extension(user_id): Extension<UserID>,
    Path(account_id): Path<AccountId>,
) -> Response {
    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_response();
        }
    };

    match delete_account(account_id, user_id, &connection) {
        Ok(()) => success(StatusCode::OK, account_id),
        Err(error) => {
            if error.is_persistence_failure() {
                tracing::error!(
                    "Could not delete account {account_id} for user {user_id}: {error}"
                );
            }
            error.into_response()
        }
    }
}

/// Delete the account `id` owned by `user_id`.
///
/// The existence check, the reference check and the delete run in one
/// immediate transaction so a transaction cannot be recorded against the
/// account in between.
///
/// # Errors
/// Returns [Error::NotFound] if the account does not exist or belongs to
/// another user, [Error::AccountHasTransactions] if any transaction still
/// references the account, or [Error::SqlError] if there is some other SQL error.
pub fn delete_account(
    id: AccountId,
    user_id: UserID,
    connection: &Connection,
) -> Result<(), Error> {
    let sql_transaction =
        SqlTransaction::new_unchecked(connection, TransactionBehavior::Immediate)?;

    get_account(id, user_id, &sql_transaction)?;

    let reference_count: i64 = sql_transaction.query_row(
        "SELECT COUNT(id) FROM \"transaction\" WHERE account_id = ?1",
        (id,),
        |row| row.get(0),
    )?;

    if reference_count > 0 {
        return Err(Error::AccountHasTransactions);
    }

    sql_transaction.execute(
        "DELETE FROM account WHERE id = ?1 AND user_id = ?2",
        (id, user_id),
    )?;
    sql_transaction.commit()?;

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
        account::{
            AccountForm, AccountState, AccountType, create_account,
            delete_endpoint::{delete_account, delete_account_endpoint},
            get_account,
        },
        test_utils::{create_test_user, get_test_connection, parse_outcome},
        transaction::{Transaction, TransactionType, count_transactions, record_transaction},
    };

    fn cash(balance: f64) -> AccountForm {
        AccountForm {
            name: "Cash".to_owned(),
            account_type: AccountType::Cash,
            balance,
        }
    }

    #[test]
    fn deletes_unreferenced_account() {
        let conn = get_test_connection();
        let user_id = create_test_user("alice@example.com", &conn);
        let account = create_account(user_id, &cash(420.69), &conn).unwrap();

        delete_account(account.id, user_id, &conn).unwrap();

        assert_eq!(get_account(account.id, user_id, &conn), Err(Error::NotFound));
    }

    #[test]
    fn refuses_account_with_transactions() {
        let conn = get_test_connection();
        let user_id = create_test_user("alice@example.com", &conn);
        let account = create_account(user_id, &cash(100.0), &conn).unwrap();
        record_transaction(
            user_id,
            Transaction::build(30.0, TransactionType::Expense, "Food", date!(2025 - 03 - 10))
                .account_id(Some(account.id)),
            &conn,
        )
        .unwrap();

        let result = delete_account(account.id, user_id, &conn);

        assert_eq!(result, Err(Error::AccountHasTransactions));
        assert_eq!(get_account(account.id, user_id, &conn).unwrap().balance, 70.0);
        assert_eq!(count_transactions(&conn), Ok(1));
    }

    #[test]
    fn missing_account_is_not_found() {
        let conn = get_test_connection();
        let user_id = create_test_user("alice@example.com", &conn);

        assert_eq!(delete_account(42, user_id, &conn), Err(Error::NotFound));
    }

    #[test]
    fn foreign_account_is_not_found() {
        let conn = get_test_connection();
        let alice = create_test_user("alice@example.com", &conn);
        let bob = create_test_user("bob@example.com", &conn);
        let account = create_account(alice, &cash(1.0), &conn).unwrap();

        assert_eq!(delete_account(account.id, bob, &conn), Err(Error::NotFound));
        assert!(get_account(account.id, alice, &conn).is_ok());
    }

    #[tokio::test]
    async fn endpoint_reports_conflict() {
        let conn = get_test_connection();
        let user_id = create_test_user("alice@example.com", &conn);
        let account = create_account(user_id, &cash(100.0), &conn).unwrap();
        record_transaction(
            user_id,
            Transaction::build(30.0, TransactionType::Expense, "Food", date!(2025 - 03 - 10))
                .account_id(Some(account.id)),
            &conn,
        )
        .unwrap();
        let state = AccountState {
            db_connection: Arc::new(Mutex::new(conn)),
        };

        let response =
            delete_account_endpoint(State(state), Extension(user_id), Path(account.id)).await;

        assert_eq!(response.status(), StatusCode::CONFLICT);
        let message = parse_outcome::<()>(response).await.unwrap_failure();
        assert_eq!(
            message,
            "Account cannot be deleted because it still has transaction history."
        );
    }

    #[tokio::test]
    async fn endpoint_returns_deleted_id() {
        let conn = get_test_connection();
        let user_id = create_test_user("alice@example.com", &conn);
        let account = create_account(user_id, &cash(100.0), &conn).unwrap();
        let state = AccountState {
            db_connection: Arc::new(Mutex::new(conn)),
        };

        let response =
            delete_account_endpoint(State(state), Extension(user_id), Path(account.id)).await;

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(parse_outcome::<i64>(response).await.unwrap_success(), account.id);
    }
}
