//! Implements a struct that holds the state of the REST server.

use std::sync::{Arc, Mutex};

use axum_extra::extract::cookie::Key;
use rusqlite::Connection;
use sha2::{Digest, Sha512};
use time::Duration;

use crate::{Error, auth::DEFAULT_COOKIE_DURATION, db::initialize, timezone::get_local_offset};

/// The state of the REST server.
#[derive(Debug, Clone)]
pub struct AppState {
    /// The key to be used for signing and encrypting private cookies.
    pub cookie_key: Key,

    /// The duration for which cookies used for authentication are valid.
    pub cookie_duration: Duration,

    /// The local timezone as a canonical timezone name, e.g. "Asia/Kuala_Lumpur".
    pub local_timezone: String,

    /// The database connection
    pub db_connection: Arc<Mutex<Connection>>,
}

impl AppState {
    /// Create a new [AppState] with a SQLite database connection.
    ///
    /// This function will initialize the database by adding the tables for the domain models.
    /// `local_timezone` should be a valid, canonical timezone name, e.g. "Asia/Kuala_Lumpur".
    /// `cookie_secret` must be the secret shared with the identity provider.
    ///
    /// # Errors
    /// Returns an error if the database cannot be initialized or the timezone is not known.
    pub fn new(
        db_connection: Connection,
        cookie_secret: &str,
        local_timezone: &str,
    ) -> Result<Self, Error> {
        if get_local_offset(local_timezone).is_none() {
            return Err(Error::InvalidTimezoneError(local_timezone.to_owned()));
        }

        initialize(&db_connection)?;

        let connection = Arc::new(Mutex::new(db_connection));

        Ok(Self {
            cookie_key: create_cookie_key(cookie_secret),
            cookie_duration: DEFAULT_COOKIE_DURATION,
            local_timezone: local_timezone.to_owned(),
            db_connection: connection,
        })
    }
}

/// Create a signing key for cookies from a `secret`s string.
pub fn create_cookie_key(secret: &str) -> Key {
    let hash = Sha512::digest(secret);

    Key::from(&hash)
}

#[cfg(test)]
mod tests {
    use rusqlite::Connection;

    use crate::{AppState, Error, app_state::create_cookie_key};

    #[test]
    fn same_secret_gives_same_key() {
        assert_eq!(
            create_cookie_key("foobar").master(),
            create_cookie_key("foobar").master()
        );
        assert_ne!(
            create_cookie_key("foobar").master(),
            create_cookie_key("barfoo").master()
        );
    }

    #[test]
    fn unknown_timezone_is_rejected() {
        let result = AppState::new(
            Connection::open_in_memory().unwrap(),
            "foobar",
            "Nowhere/Special",
        );

        assert!(matches!(result, Err(Error::InvalidTimezoneError(_))));
    }
}
