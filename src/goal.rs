//! Savings goals and the queries that store and read them.

use rusqlite::{Connection, Row};
use serde::{Deserialize, Serialize};
use time::Date;

use crate::{Error, UserID, database_id::GoalId};

/// An amount a user is saving towards.
///
/// Progress is entered by hand, it does not follow any account balance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Goal {
    /// The ID of the goal.
    pub id: GoalId,
    /// The user that owns the goal.
    pub user_id: UserID,
    /// What the user is saving for.
    pub name: String,
    /// The amount the user wants to save.
    pub target_amount: f64,
    /// The amount saved so far.
    pub current_amount: f64,
    /// When the user wants to reach the target.
    pub deadline: Option<Date>,
}

/// The fields needed to create a [Goal].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewGoal {
    /// What the user is saving for.
    pub name: String,
    /// The amount the user wants to save.
    pub target_amount: f64,
    /// The amount saved so far.
    #[serde(default)]
    pub current_amount: f64,
    /// When the user wants to reach the target.
    #[serde(default)]
    pub deadline: Option<Date>,
}

/// Create the goal table in the database.
///
/// # Errors
/// Returns an error if the table cannot be created or if there is an SQL error.
pub fn create_goal_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS goal (
                id INTEGER PRIMARY KEY,
                user_id INTEGER NOT NULL,
                name TEXT NOT NULL,
                target_amount REAL NOT NULL,
                current_amount REAL NOT NULL DEFAULT 0,
                deadline TEXT,
                FOREIGN KEY(user_id) REFERENCES user(id) ON UPDATE CASCADE ON DELETE CASCADE
                )",
        (),
    )?;

    connection.execute(
        "CREATE INDEX IF NOT EXISTS idx_goal_user ON goal(user_id);",
        (),
    )?;

    Ok(())
}

/// Map a database row to a [Goal].
pub fn map_goal_row(row: &Row) -> Result<Goal, rusqlite::Error> {
    Ok(Goal {
        id: row.get(0)?,
        user_id: row.get(1)?,
        name: row.get(2)?,
        target_amount: row.get(3)?,
        current_amount: row.get(4)?,
        deadline: row.get(5)?,
    })
}

/// Create a savings goal for `user_id`.
///
/// # Errors
/// Returns [Error::InvalidAmount] if either amount is infinite or NaN, or
/// [Error::SqlError] if there is some SQL error.
pub fn create_goal(
    user_id: UserID,
    goal: &NewGoal,
    connection: &Connection,
) -> Result<Goal, Error> {
    for amount in [goal.target_amount, goal.current_amount] {
        if !amount.is_finite() {
            return Err(Error::InvalidAmount(amount));
        }
    }

    connection
        .prepare(
            "INSERT INTO goal (user_id, name, target_amount, current_amount, deadline)
             VALUES (?1, ?2, ?3, ?4, ?5)
             RETURNING id, user_id, name, target_amount, current_amount, deadline",
        )?
        .query_row(
            (
                user_id,
                goal.name.trim(),
                goal.target_amount,
                goal.current_amount,
                goal.deadline,
            ),
            map_goal_row,
        )
        .map_err(Error::from)
}

#[cfg(test)]
mod tests {
    use time::macros::date;

    use crate::{
        Error,
        goal::{NewGoal, create_goal},
        test_utils::{create_test_user, get_test_connection},
    };

    #[test]
    fn create_succeeds() {
        let conn = get_test_connection();
        let user_id = create_test_user("alice@example.com", &conn);

        let goal = create_goal(
            user_id,
            &NewGoal {
                name: "Holiday".to_owned(),
                target_amount: 3000.0,
                current_amount: 750.0,
                deadline: Some(date!(2025 - 12 - 01)),
            },
            &conn,
        )
        .unwrap();

        assert!(goal.id > 0);
        assert_eq!(goal.user_id, user_id);
        assert_eq!(goal.current_amount, 750.0);
        assert_eq!(goal.deadline, Some(date!(2025 - 12 - 01)));
    }

    #[test]
    fn infinite_target_is_rejected() {
        let conn = get_test_connection();
        let user_id = create_test_user("alice@example.com", &conn);

        let result = create_goal(
            user_id,
            &NewGoal {
                name: "Moon".to_owned(),
                target_amount: f64::INFINITY,
                current_amount: 0.0,
                deadline: None,
            },
            &conn,
        );

        assert_eq!(result, Err(Error::InvalidAmount(f64::INFINITY)));
    }
}
