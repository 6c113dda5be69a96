//! Code for creating the user table and fetching users from the database.

use std::fmt::Display;

use rusqlite::{Connection, Row};
use serde::{Deserialize, Serialize};

use crate::Error;

/// A newtype wrapper for integer user IDs.
///
/// This helps disambiguate user IDs from other types of IDs, leading to better compile time
/// errors, and more flexible generics that can have distinct implementations for multiple ID types.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, Hash)]
pub struct UserID(i64);

impl UserID {
    /// Create a new user ID.
    pub fn new(id: i64) -> Self {
        Self(id)
    }

    /// Cast the user ID to a 64 bit integer.
    pub fn as_i64(&self) -> i64 {
        self.0
    }
}

impl Display for UserID {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

impl rusqlite::ToSql for UserID {
    fn to_sql(&self) -> rusqlite::Result<rusqlite::types::ToSqlOutput<'_>> {
        self.0.to_sql()
    }
}

impl rusqlite::types::FromSql for UserID {
    fn column_result(value: rusqlite::types::ValueRef<'_>) -> rusqlite::types::FromSqlResult<Self> {
        i64::column_result(value).map(UserID)
    }
}

/// A user of the application.
///
/// Users are registered by the identity provider. The credential columns are
/// stored for it but never read by the ledger.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    /// The user's ID in the application database.
    pub id: UserID,
    /// The user's email address, stored in lower case.
    pub email: String,
    /// The user's display name.
    pub name: Option<String>,
    /// The user's password hash, if they registered with a password.
    #[serde(skip_serializing)]
    pub password_hash: Option<String>,
    /// A URL to the user's avatar.
    pub image: Option<String>,
    /// Whether the user has confirmed their email address.
    pub email_verified: bool,
    /// The outstanding email verification token.
    #[serde(skip_serializing)]
    pub verification_token: Option<String>,
}

/// Create the user table.
///
/// # Errors
///
/// This function will return an error if the SQL query failed.
pub fn create_user_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS user (
                id INTEGER PRIMARY KEY,
                email TEXT NOT NULL UNIQUE COLLATE NOCASE,
                name TEXT,
                password_hash TEXT,
                image TEXT,
                email_verified INTEGER NOT NULL DEFAULT 0,
                verification_token TEXT UNIQUE
                )",
        (),
    )?;

    Ok(())
}

fn map_user_row(row: &Row) -> Result<User, rusqlite::Error> {
    Ok(User {
        id: row.get(0)?,
        email: row.get(1)?,
        name: row.get(2)?,
        password_hash: row.get(3)?,
        image: row.get(4)?,
        email_verified: row.get(5)?,
        verification_token: row.get(6)?,
    })
}

/// Create and insert a new user into the database.
///
/// The email address is trimmed and lower-cased before it is stored.
///
/// # Errors
///
/// Returns a [Error::DuplicateEmail] if the email address is already
/// registered, or [Error::SqlError] if some other SQL error occurred.
pub fn create_user(
    email: &str,
    name: Option<&str>,
    connection: &Connection,
) -> Result<User, Error> {
    let email = email.trim().to_lowercase();

    connection
        .prepare(
            "INSERT INTO user (email, name) VALUES (?1, ?2)
             RETURNING id, email, name, password_hash, image, email_verified, verification_token",
        )?
        .query_row((&email, name), map_user_row)
        .map_err(|error| match error {
            rusqlite::Error::SqliteFailure(
                rusqlite::ffi::Error {
                    code: _,
                    extended_code: rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE,
                },
                _,
            ) => Error::DuplicateEmail,
            error => error.into(),
        })
}

/// Get the user from the database with an ID equal to `user_id`.
///
/// # Errors
///
/// This function will return an error if:
/// - `user_id` does not belong to a registered user.
/// - there was an error trying to access the store.
#[cfg(test)]
pub fn get_user_by_id(user_id: UserID, connection: &Connection) -> Result<User, Error> {
    connection
        .prepare(
            "SELECT id, email, name, password_hash, image, email_verified, verification_token
             FROM user WHERE id = :id",
        )?
        .query_row(&[(":id", &user_id.as_i64())], map_user_row)
        .map_err(|error| error.into())
}

#[cfg(test)]
mod user_tests {
    use rusqlite::Connection;

    use crate::{
        Error,
        auth::user::{UserID, create_user, create_user_table, get_user_by_id},
    };

    fn get_db_connection() -> Connection {
        let conn =
            Connection::open_in_memory().expect("Could not create in-memory SQLite database");
        create_user_table(&conn).expect("Could not create user table");

        conn
    }

    #[test]
    fn insert_user_succeeds() {
        let db_connection = get_db_connection();

        let inserted_user =
            create_user("alice@example.com", Some("Alice"), &db_connection).unwrap();

        assert!(inserted_user.id.as_i64() > 0);
        assert_eq!(inserted_user.email, "alice@example.com");
        assert_eq!(inserted_user.name.as_deref(), Some("Alice"));
        assert!(!inserted_user.email_verified);
    }

    #[test]
    fn email_is_normalised() {
        let db_connection = get_db_connection();

        let user = create_user("  Bob@Example.COM ", None, &db_connection).unwrap();

        assert_eq!(user.email, "bob@example.com");
    }

    #[test]
    fn duplicate_email_is_rejected() {
        let db_connection = get_db_connection();
        create_user("alice@example.com", None, &db_connection).unwrap();

        let result = create_user("ALICE@example.com", None, &db_connection);

        assert_eq!(result, Err(Error::DuplicateEmail));
    }

    #[test]
    fn get_user_fails_with_non_existent_id() {
        let db_connection = get_db_connection();

        let id = UserID::new(42);

        assert_eq!(get_user_by_id(id, &db_connection), Err(Error::NotFound));
    }

    #[test]
    fn get_user_succeeds_with_existing_id() {
        let db_connection = get_db_connection();
        let test_user = create_user("carol@example.com", None, &db_connection).unwrap();

        let retrieved_user = get_user_by_id(test_user.id, &db_connection).unwrap();

        assert_eq!(retrieved_user, test_user);
    }

    #[test]
    fn password_hash_column_is_read_into_user() {
        let db_connection = get_db_connection();
        let user = create_user("dave@example.com", None, &db_connection).unwrap();
        db_connection
            .execute(
                "UPDATE user SET password_hash = ?1 WHERE id = ?2",
                ("$2b$12$hash", user.id),
            )
            .unwrap();

        let retrieved_user = get_user_by_id(user.id, &db_connection).unwrap();

        assert_eq!(retrieved_user.password_hash.as_deref(), Some("$2b$12$hash"));
    }
}
