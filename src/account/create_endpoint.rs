//! Defines the endpoint for creating a new account.
use std::sync::{Arc, Mutex};

use axum::{
    Extension, Json,
    extract::{FromRef, State, rejection::JsonRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use rusqlite::Connection;
use serde::{Deserialize, Serialize};

use crate::{
    AppState, Error, UserID,
    account::{Account, AccountType, map_row_to_account},
    outcome::success,
};

/// The state needed to get or create an account.
#[derive(Debug, Clone)]
pub struct AccountState {
    /// The database connection for managing accounts.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for AccountState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// The request body for creating an account.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccountForm {
    /// The display name of the account.
    pub name: String,
    /// What kind of account this is.
    #[serde(rename = "type")]
    pub account_type: AccountType,
    /// The opening balance.
    pub balance: f64,
}

/// A route handler for creating a new account, responds with the account.
pub async fn create_account_endpoint(
    State(state): State<AccountState>,
    Extension(user_id): Extension<UserID>,
    form: Result<Json<AccountForm>, JsonRejection>,
) -> Response {
    let Json(form) = match form {
        Ok(form) => form,
        Err(rejection) => return Error::InvalidPayload(rejection.body_text()).into_response(),
    };

    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("Could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_response();
        }
    };

    match create_account(user_id, &form, &connection) {
        Ok(account) => success(StatusCode::CREATED, account),
        Err(error) => {
            if error.is_persistence_failure() {
                tracing::error!("Could not create account {form:?} for user {user_id}: {error}");
            }
            error.into_response()
        }
    }
}

/// Create an account for `user_id` with the opening balance in `form`.
///
/// # Errors
/// Returns [Error::EmptyAccountName] if the name is blank,
/// [Error::InvalidAmount] if the balance is not finite,
/// or [Error::SqlError] if there is some SQL error.
pub fn create_account(
    user_id: UserID,
    form: &AccountForm,
    connection: &Connection,
) -> Result<Account, Error> {
    let name = form.name.trim();
    if name.is_empty() {
        return Err(Error::EmptyAccountName);
    }

    if !form.balance.is_finite() {
        return Err(Error::InvalidAmount(form.balance));
    }

    connection
        .prepare(
            "INSERT INTO account (user_id, name, type, balance) VALUES (?1, ?2, ?3, ?4)
             RETURNING id, user_id, name, type, balance",
        )?
        .query_row(
            (user_id, name, form.account_type, form.balance),
            map_row_to_account,
        )
        .map_err(Error::from)
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use axum::{Extension, Json, extract::State, http::StatusCode};

    use crate::{
        Error,
        account::{
            Account, AccountType, create_account,
            create_endpoint::{AccountForm, AccountState, create_account_endpoint},
            get_account,
        },
        test_utils::{create_test_user, get_test_connection, parse_outcome},
    };

    #[tokio::test]
    async fn can_create_account() {
        let conn = get_test_connection();
        let user_id = create_test_user("alice@example.com", &conn);
        let state = AccountState {
            db_connection: Arc::new(Mutex::new(conn)),
        };
        let form = AccountForm {
            name: "Maybank".to_owned(),
            account_type: AccountType::Bank,
            balance: 123.45,
        };

        let response =
            create_account_endpoint(State(state.clone()), Extension(user_id), Ok(Json(form)))
                .await;

        assert_eq!(response.status(), StatusCode::CREATED);
        let account: Account = parse_outcome(response).await.unwrap_success();
        assert_eq!(account.name, "Maybank");
        assert_eq!(account.account_type, AccountType::Bank);
        assert_eq!(account.balance, 123.45);
        assert_eq!(account.user_id, user_id);
        let connection = state.db_connection.lock().unwrap();
        assert_eq!(get_account(account.id, user_id, &connection), Ok(account));
    }

    #[tokio::test]
    async fn blank_name_is_rejected() {
        let conn = get_test_connection();
        let user_id = create_test_user("alice@example.com", &conn);
        let state = AccountState {
            db_connection: Arc::new(Mutex::new(conn)),
        };
        let form = AccountForm {
            name: "   ".to_owned(),
            account_type: AccountType::Cash,
            balance: 0.0,
        };

        let response =
            create_account_endpoint(State(state), Extension(user_id), Ok(Json(form))).await;

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let message = parse_outcome::<()>(response).await.unwrap_failure();
        assert_eq!(message, "Account name cannot be empty.");
    }

    #[test]
    fn name_is_trimmed() {
        let conn = get_test_connection();
        let user_id = create_test_user("alice@example.com", &conn);
        let form = AccountForm {
            name: "  Wallet ".to_owned(),
            account_type: AccountType::Cash,
            balance: 5.0,
        };

        let account = create_account(user_id, &form, &conn).unwrap();

        assert_eq!(account.name, "Wallet");
    }

    #[test]
    fn non_finite_balance_is_rejected() {
        let conn = get_test_connection();
        let user_id = create_test_user("alice@example.com", &conn);
        let form = AccountForm {
            name: "Wallet".to_owned(),
            account_type: AccountType::Cash,
            balance: f64::INFINITY,
        };

        let result = create_account(user_id, &form, &conn);

        assert_eq!(result, Err(Error::InvalidAmount(f64::INFINITY)));
    }

    #[test]
    fn negative_opening_balance_is_allowed() {
        let conn = get_test_connection();
        let user_id = create_test_user("alice@example.com", &conn);
        let form = AccountForm {
            name: "Overdraft".to_owned(),
            account_type: AccountType::Bank,
            balance: -50.0,
        };

        let account = create_account(user_id, &form, &conn).unwrap();

        assert_eq!(account.balance, -50.0);
    }
}
