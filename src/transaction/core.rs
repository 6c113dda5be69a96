//! Defines the core data models and database queries for transactions.

use rusqlite::{
    Connection, Row, ToSql,
    types::{FromSql, FromSqlError, FromSqlResult, ToSqlOutput, ValueRef},
};
use serde::{Deserialize, Serialize};
use time::Date;

use crate::{
    Error, UserID,
    database_id::{AccountId, TransactionId},
};

// ============================================================================
// MODELS
// ============================================================================

/// Which way money moved in a transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TransactionType {
    /// Money earned, added to the account balance.
    Income,
    /// Money spent, subtracted from the account balance.
    Expense,
    /// Money moved out of the account, subtracted from the account balance.
    ///
    /// Transfers are left out of the dashboard income and expense totals.
    Transfer,
}

impl TransactionType {
    /// The name of the transaction type as stored in the database.
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionType::Income => "INCOME",
            TransactionType::Expense => "EXPENSE",
            TransactionType::Transfer => "TRANSFER",
        }
    }

    /// The signed change to an account balance for a transaction of this type
    /// with a non-negative `amount`.
    pub fn balance_delta(&self, amount: f64) -> f64 {
        match self {
            TransactionType::Income => amount,
            TransactionType::Expense | TransactionType::Transfer => -amount,
        }
    }
}

impl ToSql for TransactionType {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.as_str()))
    }
}

impl FromSql for TransactionType {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        match value.as_str()? {
            "INCOME" => Ok(TransactionType::Income),
            "EXPENSE" => Ok(TransactionType::Expense),
            "TRANSFER" => Ok(TransactionType::Transfer),
            other => Err(FromSqlError::Other(
                format!("unknown transaction type {other:?}").into(),
            )),
        }
    }
}

/// An income, expense or transfer recorded by a user.
///
/// To create a new `Transaction`, use [Transaction::build].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    /// The ID of the transaction.
    pub id: TransactionId,
    /// The user that recorded the transaction.
    pub user_id: UserID,
    /// The account the money moved in or out of, if any.
    pub account_id: Option<AccountId>,
    /// The amount of money moved, never negative.
    pub amount: f64,
    /// Which way the money moved.
    #[serde(rename = "type")]
    pub transaction_type: TransactionType,
    /// A free text category, e.g. "Food".
    pub category: String,
    /// When the transaction happened.
    pub date: Date,
    /// A text description of what the transaction was for.
    pub description: Option<String>,
}

impl Transaction {
    /// Create a new transaction.
    ///
    /// Shortcut for [TransactionBuilder] for discoverability.
    pub fn build(
        amount: f64,
        transaction_type: TransactionType,
        category: &str,
        date: Date,
    ) -> TransactionBuilder {
        TransactionBuilder {
            amount,
            transaction_type,
            category: category.to_owned(),
            date,
            description: None,
            account_id: None,
        }
    }
}

/// A builder for creating [Transaction] instances.
///
/// The optional fields default to `None`, i.e. an unassigned transaction
/// without a description. Pass the builder to
/// [record_transaction](crate::record_transaction) to store it.
///
/// # Examples
///
/// ```ignore
/// use time::macros::date;
///
/// use crate::transaction::{Transaction, TransactionType};
///
/// let transaction = Transaction::build(
///         12.5,
///         TransactionType::Expense,
///         "Food",
///         date!(2025-01-15),
///     )
///     .account_id(Some(1))
///     .description(Some("Nasi lemak".to_owned()));
/// ```
#[derive(Debug, PartialEq, Clone)]
pub struct TransactionBuilder {
    /// The amount of money moved, must be finite and non-negative.
    pub amount: f64,
    /// Which way the money moved.
    pub transaction_type: TransactionType,
    /// A free text category, e.g. "Food".
    pub category: String,
    /// When the transaction happened.
    pub date: Date,
    /// A text description of what the transaction was for.
    pub description: Option<String>,
    /// The account the money moved in or out of.
    ///
    /// - `Some(id)` - the account balance is adjusted when the transaction is recorded
    /// - `None` - no balance is touched
    pub account_id: Option<AccountId>,
}

impl TransactionBuilder {
    /// Set the description for the transaction. Blank descriptions are stored as `None`.
    pub fn description(mut self, description: Option<String>) -> Self {
        self.description = description.filter(|text| !text.trim().is_empty());
        self
    }

    /// Set the account the transaction is recorded against.
    pub fn account_id(mut self, account_id: Option<AccountId>) -> Self {
        self.account_id = account_id;
        self
    }

    /// Check the amount and category of the transaction.
    ///
    /// # Errors
    /// Returns [Error::InvalidAmount] if the amount is negative, infinite or
    /// NaN, or [Error::EmptyCategory] if the category is blank.
    pub(crate) fn validate(&self) -> Result<(), Error> {
        if !self.amount.is_finite() || self.amount < 0.0 {
            return Err(Error::InvalidAmount(self.amount));
        }

        if self.category.trim().is_empty() {
            return Err(Error::EmptyCategory);
        }

        Ok(())
    }
}

// ============================================================================
// DATABASE FUNCTIONS
// ============================================================================

/// Insert a transaction row for `user_id` without touching any balance.
///
/// # Errors
/// This function will return a:
/// - [Error::NotFound] if the account ID does not refer to an existing account,
/// - or [Error::SqlError] if there is some other SQL error.
pub(crate) fn insert_transaction(
    user_id: UserID,
    builder: &TransactionBuilder,
    connection: &Connection,
) -> Result<Transaction, Error> {
    connection
        .prepare(
            "INSERT INTO \"transaction\" (user_id, account_id, amount, type, category, date, description)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
             RETURNING id, user_id, account_id, amount, type, category, date, description",
        )?
        .query_row(
            (
                user_id,
                builder.account_id,
                builder.amount,
                builder.transaction_type,
                builder.category.trim(),
                builder.date,
                builder.description.as_deref(),
            ),
            map_transaction_row,
        )
        .map_err(|error| match error {
            rusqlite::Error::SqliteFailure(
                rusqlite::ffi::Error {
                    code: _,
                    extended_code: rusqlite::ffi::SQLITE_CONSTRAINT_FOREIGNKEY,
                },
                _,
            ) => Error::NotFound,
            error => error.into(),
        })
}

/// Retrieve the transaction `id` owned by `user_id`.
///
/// # Errors
/// This function will return a:
/// - [Error::NotFound] if `id` does not refer to a transaction owned by `user_id`,
/// - or [Error::SqlError] there is some other SQL error.
#[cfg(test)]
pub fn get_transaction(
    id: TransactionId,
    user_id: UserID,
    connection: &Connection,
) -> Result<Transaction, Error> {
    let transaction = connection
        .prepare(
            "SELECT id, user_id, account_id, amount, type, category, date, description
             FROM \"transaction\" WHERE id = :id AND user_id = :user_id",
        )?
        .query_one(
            &[(":id", &id as &dyn ToSql), (":user_id", &user_id)],
            map_transaction_row,
        )?;

    Ok(transaction)
}

/// Get the `limit` most recent transactions owned by `user_id`, latest date first.
///
/// # Errors
/// This function will return a [Error::SqlError] there is some SQL error.
pub fn get_recent_transactions(
    user_id: UserID,
    limit: u32,
    connection: &Connection,
) -> Result<Vec<Transaction>, Error> {
    connection
        .prepare(
            "SELECT id, user_id, account_id, amount, type, category, date, description
             FROM \"transaction\" WHERE user_id = :user_id
             ORDER BY date DESC, id DESC LIMIT :limit",
        )?
        .query_map(
            &[(":user_id", &user_id as &dyn ToSql), (":limit", &limit)],
            map_transaction_row,
        )?
        .map(|maybe_transaction| maybe_transaction.map_err(Error::from))
        .collect()
}

/// Get the total number of transactions in the database.
///
/// # Errors
/// This function will return a [Error::SqlError] there is some SQL error.
#[cfg(test)]
pub fn count_transactions(connection: &Connection) -> Result<u32, Error> {
    connection
        .query_row("SELECT COUNT(id) FROM \"transaction\";", [], |row| {
            row.get(0)
        })
        .map_err(|error| error.into())
}

/// Create the transaction table in the database.
///
/// # Errors
/// Returns an error if the table cannot be created or if there is an SQL error.
pub fn create_transaction_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS \"transaction\" (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                user_id INTEGER NOT NULL,
                account_id INTEGER,
                amount REAL NOT NULL CHECK (amount >= 0),
                type TEXT NOT NULL CHECK (type IN ('INCOME', 'EXPENSE', 'TRANSFER')),
                category TEXT NOT NULL,
                date TEXT NOT NULL,
                description TEXT,
                FOREIGN KEY(user_id) REFERENCES user(id) ON UPDATE CASCADE ON DELETE CASCADE,
                FOREIGN KEY(account_id) REFERENCES account(id) ON UPDATE CASCADE ON DELETE RESTRICT
                )",
        (),
    )?;

    // Ensure the sequence starts at 1
    connection.execute(
        "INSERT OR IGNORE INTO sqlite_sequence (name, seq) VALUES ('transaction', 0)",
        (),
    )?;

    // Used by the dashboard and the recent transactions list.
    connection.execute(
        "CREATE INDEX IF NOT EXISTS idx_transaction_user_date ON \"transaction\"(user_id, date);",
        (),
    )?;

    // Used by the account deletion guard.
    connection.execute(
        "CREATE INDEX IF NOT EXISTS idx_transaction_account ON \"transaction\"(account_id);",
        (),
    )?;

    Ok(())
}

/// Map a database row to a Transaction.
pub fn map_transaction_row(row: &Row) -> Result<Transaction, rusqlite::Error> {
    let id = row.get(0)?;
    let user_id = row.get(1)?;
    let account_id = row.get(2)?;
    let amount = row.get(3)?;
    let transaction_type = row.get(4)?;
    let category = row.get(5)?;
    let date = row.get(6)?;
    let description = row.get(7)?;

    Ok(Transaction {
        id,
        user_id,
        account_id,
        amount,
        transaction_type,
        category,
        date,
        description,
    })
}

// ============================================================================
// TESTS
// ============================================================================
