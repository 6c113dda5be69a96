//! Defines the endpoint for recording a new transaction.
use std::sync::{Arc, Mutex};

use axum::{
    Extension, Json,
    extract::{FromRef, State, rejection::JsonRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use rusqlite::{Connection, Transaction as SqlTransaction, TransactionBehavior};
use serde::{Deserialize, Deserializer, Serialize};
use time::Date;

use crate::{
    AppState, Error, UserID,
    account::adjust_account_balance,
    database_id::AccountId,
    outcome::success,
    transaction::{Transaction, TransactionBuilder, TransactionType, core::insert_transaction},
};

/// The state needed to record, edit, delete or list transactions.
#[derive(Debug, Clone)]
pub struct TransactionState {
    /// The database connection for managing transactions.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for TransactionState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// The request body for recording or editing a transaction.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransactionForm {
    /// The amount of money moved.
    pub amount: f64,
    /// Which way the money moved.
    #[serde(rename = "type")]
    pub transaction_type: TransactionType,
    /// A free text category.
    pub category: String,
    /// When the transaction happened.
    pub date: Date,
    /// Text detailing the transaction.
    #[serde(default)]
    pub description: Option<String>,
    /// The account the money moved in or out of.
    ///
    /// Browser forms send an empty string for "no account", which is read as `None`.
    #[serde(default, deserialize_with = "deserialize_account_id")]
    pub account_id: Option<AccountId>,
}

impl TransactionForm {
    pub(crate) fn to_builder(&self) -> TransactionBuilder {
        Transaction::build(self.amount, self.transaction_type, &self.category, self.date)
            .description(self.description.clone())
            .account_id(self.account_id)
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawAccountId {
    Id(AccountId),
    Text(String),
}

fn deserialize_account_id<'de, D>(deserializer: D) -> Result<Option<AccountId>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<RawAccountId>::deserialize(deserializer)? {
        None => Ok(None),
        Some(RawAccountId::Id(id)) => Ok(Some(id)),
        Some(RawAccountId::Text(text)) if text.trim().is_empty() => Ok(None),
        Some(RawAccountId::Text(text)) => text
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| serde::de::Error::custom(format!("invalid account ID {text:?}"))),
    }
}

/// A route handler for recording a new transaction, responds with the transaction.
pub async fn create_transaction_endpoint(
    State(state): State<TransactionState>,
    Extension(user_id): Extension<UserID>,
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

    match record_transaction(user_id, form.to_builder(), &connection) {
        Ok(transaction) => success(StatusCode::CREATED, transaction),
        Err(error) => {
            if error.is_persistence_failure() {
                tracing::error!(
                    "could not record transaction {form:?} for user {user_id}: {error}"
                );
            }
            error.into_response()
        }
    }
}

/// Record a transaction for `user_id` and apply it to the account balance.
///
/// When the builder names an account, the balance moves by `+amount` for
/// income and `-amount` otherwise. The insert and the balance increment run
/// in one immediate transaction: either both are stored or neither is.
///
/// # Errors
/// This function will return a:
/// - [Error::InvalidAmount] if the amount is negative, infinite or NaN,
/// - [Error::EmptyCategory] if the category is blank,
/// - [Error::NotFound] if the account does not exist or belongs to another user,
/// - or [Error::SqlError] if there is some other SQL error.
pub fn record_transaction(
    user_id: UserID,
    builder: TransactionBuilder,
    connection: &Connection,
) -> Result<Transaction, Error> {
    builder.validate()?;

    let sql_transaction =
        SqlTransaction::new_unchecked(connection, TransactionBehavior::Immediate)?;

    let transaction = insert_transaction(user_id, &builder, &sql_transaction)?;

    if let Some(account_id) = transaction.account_id {
        adjust_account_balance(
            account_id,
            user_id,
            transaction.transaction_type.balance_delta(transaction.amount),
            &sql_transaction,
        )?;
    }

    sql_transaction.commit()?;

    Ok(transaction)
}
