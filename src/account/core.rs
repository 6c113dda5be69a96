//! Defines the account model and the queries shared by the account endpoints.

use rusqlite::{
    Connection, Row, ToSql,
    types::{FromSql, FromSqlError, FromSqlResult, ToSqlOutput, ValueRef},
};
use serde::{Deserialize, Serialize};

use crate::{Error, UserID, database_id::AccountId};

/// The kind of store of money an account represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AccountType {
    /// A bank account.
    #[serde(rename = "BANK")]
    Bank,
    /// A digital wallet such as a prepaid card or payment app.
    #[serde(rename = "E-WALLET")]
    EWallet,
    /// Physical cash.
    #[serde(rename = "CASH")]
    Cash,
}

impl AccountType {
    /// The name of the account type as stored in the database.
    pub fn as_str(&self) -> &'static str {
        match self {
            AccountType::Bank => "BANK",
            AccountType::EWallet => "E-WALLET",
            AccountType::Cash => "CASH",
        }
    }
}

impl ToSql for AccountType {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.as_str()))
    }
}

impl FromSql for AccountType {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        match value.as_str()? {
            "BANK" => Ok(AccountType::Bank),
            "E-WALLET" => Ok(AccountType::EWallet),
            "CASH" => Ok(AccountType::Cash),
            other => Err(FromSqlError::Other(
                format!("unknown account type {other:?}").into(),
            )),
        }
    }
}

/// A store of money owned by a user whose balance moves with the transactions
/// recorded against it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Account {
    /// The id for the account.
    pub id: AccountId,
    /// The user that owns the account.
    pub user_id: UserID,
    /// The display name of the account, e.g. "Maybank".
    pub name: String,
    /// What kind of account this is.
    #[serde(rename = "type")]
    pub account_type: AccountType,
    /// The current balance.
    pub balance: f64,
}

pub fn create_account_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS account (
            id INTEGER PRIMARY KEY,
            user_id INTEGER NOT NULL,
            name TEXT NOT NULL,
            type TEXT NOT NULL CHECK (type IN ('BANK', 'E-WALLET', 'CASH')),
            balance REAL NOT NULL DEFAULT 0,
            FOREIGN KEY(user_id) REFERENCES user(id) ON UPDATE CASCADE ON DELETE CASCADE
        )",
        (),
    )?;

    connection.execute(
        "CREATE INDEX IF NOT EXISTS idx_account_user ON account(user_id);",
        (),
    )?;

    Ok(())
}

pub fn map_row_to_account(row: &Row) -> Result<Account, rusqlite::Error> {
    let id = row.get(0)?;
    let user_id = row.get(1)?;
    let name = row.get(2)?;
    let account_type = row.get(3)?;
    let balance = row.get(4)?;

    Ok(Account {
        id,
        user_id,
        name,
        account_type,
        balance,
    })
}

/// Get the account `id` owned by `user_id`.
///
/// # Errors
/// Returns [Error::NotFound] if the account does not exist or belongs to
/// another user, or [Error::SqlError] if there is some other SQL error.
pub fn get_account(
    id: AccountId,
    user_id: UserID,
    connection: &Connection,
) -> Result<Account, Error> {
    let account = connection
        .prepare(
            "SELECT id, user_id, name, type, balance FROM account
             WHERE id = :id AND user_id = :user_id",
        )?
        .query_one(
            &[(":id", &id as &dyn ToSql), (":user_id", &user_id)],
            map_row_to_account,
        )?;

    Ok(account)
}

/// Get all of the accounts owned by `user_id`, most recently created first.
///
/// # Errors
/// Returns [Error::SqlError] if there is some SQL error.
pub fn get_accounts(user_id: UserID, connection: &Connection) -> Result<Vec<Account>, Error> {
    connection
        .prepare(
            "SELECT id, user_id, name, type, balance FROM account
             WHERE user_id = :user_id ORDER BY id DESC",
        )?
        .query_map(&[(":user_id", &user_id)], map_row_to_account)?
        .map(|maybe_account| maybe_account.map_err(Error::from))
        .collect()
}

/// Add `delta` to the balance of the account `id` owned by `user_id`.
///
/// The increment is done by the database so concurrent writers cannot lose
/// an update. The new balance is returned.
///
/// The caller must run this inside a transaction: the update is applied
/// before the new balance is checked, and only rolling back undoes it.
///
/// # Errors
/// Returns [Error::NotFound] if no account with `id` is owned by `user_id`,
/// [Error::AmountOverflow] if the new balance is not a finite number,
/// or [Error::SqlError] if there is some other SQL error.
pub fn adjust_account_balance(
    id: AccountId,
    user_id: UserID,
    delta: f64,
    connection: &Connection,
) -> Result<f64, Error> {
    let balance: f64 = connection.query_row(
        "UPDATE account SET balance = balance + ?1 WHERE id = ?2 AND user_id = ?3
         RETURNING balance",
        (delta, id, user_id),
        |row| row.get(0),
    )?;

    if !balance.is_finite() {
        return Err(Error::AmountOverflow);
    }

    Ok(balance)
}
