use rusqlite::Connection;

use crate::{UserID, auth::create_user, db::initialize};

/// An in-memory database with every table created.
pub(crate) fn get_test_connection() -> Connection {
    let connection =
        Connection::open_in_memory().expect("Could not initialise in-memory SQLite database");
    initialize(&connection).expect("Could not create tables");
    connection
}

#[track_caller]
pub(crate) fn create_test_user(email: &str, connection: &Connection) -> UserID {
    create_user(email, None, connection)
        .expect("Could not create test user")
        .id
}
