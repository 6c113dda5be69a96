//! Spending limits per category and the queries that store and read them.

use rusqlite::{
    Connection, Row, ToSql,
    types::{FromSql, FromSqlError, FromSqlResult, ToSqlOutput, ValueRef},
};
use serde::{Deserialize, Serialize};
use time::Date;

use crate::{Error, UserID, database_id::BudgetId};

/// How often a budget is meant to repeat.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum BudgetPeriod {
    /// The budget covers a month.
    Monthly,
    /// The budget covers a week.
    Weekly,
}

impl BudgetPeriod {
    /// The name of the period as stored in the database.
    pub fn as_str(&self) -> &'static str {
        match self {
            BudgetPeriod::Monthly => "MONTHLY",
            BudgetPeriod::Weekly => "WEEKLY",
        }
    }
}

impl ToSql for BudgetPeriod {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.as_str()))
    }
}

impl FromSql for BudgetPeriod {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        match value.as_str()? {
            "MONTHLY" => Ok(BudgetPeriod::Monthly),
            "WEEKLY" => Ok(BudgetPeriod::Weekly),
            other => Err(FromSqlError::Other(
                format!("unknown budget period {other:?}").into(),
            )),
        }
    }
}

/// A limit on how much a user means to spend in a category between two dates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Budget {
    /// The ID of the budget.
    pub id: BudgetId,
    /// The user that owns the budget.
    pub user_id: UserID,
    /// The transaction category the budget applies to.
    pub category: String,
    /// The spending limit.
    pub amount: f64,
    /// How often the budget repeats.
    pub period: BudgetPeriod,
    /// The first day covered by the budget.
    pub start_date: Date,
    /// The last day covered by the budget.
    pub end_date: Date,
}

/// The fields needed to create a [Budget].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewBudget {
    /// The transaction category the budget applies to.
    pub category: String,
    /// The spending limit.
    pub amount: f64,
    /// How often the budget repeats.
    pub period: BudgetPeriod,
    /// The first day covered by the budget.
    pub start_date: Date,
    /// The last day covered by the budget.
    pub end_date: Date,
}

/// Create the budget table in the database.
///
/// # Errors
/// Returns an error if the table cannot be created or if there is an SQL error.
pub fn create_budget_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS budget (
                id INTEGER PRIMARY KEY,
                user_id INTEGER NOT NULL,
                category TEXT NOT NULL,
                amount REAL NOT NULL CHECK (amount >= 0),
                period TEXT NOT NULL CHECK (period IN ('MONTHLY', 'WEEKLY')),
                start_date TEXT NOT NULL,
                end_date TEXT NOT NULL,
                FOREIGN KEY(user_id) REFERENCES user(id) ON UPDATE CASCADE ON DELETE CASCADE
                )",
        (),
    )?;

    connection.execute(
        "CREATE INDEX IF NOT EXISTS idx_budget_user ON budget(user_id);",
        (),
    )?;

    Ok(())
}

/// Map a database row to a [Budget].
pub fn map_budget_row(row: &Row) -> Result<Budget, rusqlite::Error> {
    Ok(Budget {
        id: row.get(0)?,
        user_id: row.get(1)?,
        category: row.get(2)?,
        amount: row.get(3)?,
        period: row.get(4)?,
        start_date: row.get(5)?,
        end_date: row.get(6)?,
    })
}

/// Create a budget for `user_id`.
///
/// # Errors
/// This function will return a:
/// - [Error::EmptyCategory] if the category is blank,
/// - [Error::InvalidAmount] if the limit is negative, infinite or NaN,
/// - [Error::InvalidDateRange] if the end date is before the start date,
/// - or [Error::SqlError] if there is some other SQL error.
pub fn create_budget(
    user_id: UserID,
    budget: &NewBudget,
    connection: &Connection,
) -> Result<Budget, Error> {
    let category = budget.category.trim();
    if category.is_empty() {
        return Err(Error::EmptyCategory);
    }

    if !budget.amount.is_finite() || budget.amount < 0.0 {
        return Err(Error::InvalidAmount(budget.amount));
    }

    if budget.end_date < budget.start_date {
        return Err(Error::InvalidDateRange(budget.start_date, budget.end_date));
    }

    connection
        .prepare(
            "INSERT INTO budget (user_id, category, amount, period, start_date, end_date)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)
             RETURNING id, user_id, category, amount, period, start_date, end_date",
        )?
        .query_row(
            (
                user_id,
                category,
                budget.amount,
                budget.period,
                budget.start_date,
                budget.end_date,
            ),
            map_budget_row,
        )
        .map_err(Error::from)
}

#[cfg(test)]
mod tests {
    use time::macros::date;

    use crate::{
        Error,
        budget::{BudgetPeriod, NewBudget, create_budget},
        test_utils::{create_test_user, get_test_connection},
    };

    fn food_budget() -> NewBudget {
        NewBudget {
            category: "Food".to_owned(),
            amount: 500.0,
            period: BudgetPeriod::Monthly,
            start_date: date!(2025 - 03 - 01),
            end_date: date!(2025 - 03 - 31),
        }
    }

    #[test]
    fn create_succeeds() {
        let conn = get_test_connection();
        let user_id = create_test_user("alice@example.com", &conn);

        let budget = create_budget(user_id, &food_budget(), &conn).unwrap();

        assert!(budget.id > 0);
        assert_eq!(budget.user_id, user_id);
        assert_eq!(budget.category, "Food");
        assert_eq!(budget.period, BudgetPeriod::Monthly);
    }

    #[test]
    fn end_before_start_is_rejected() {
        let conn = get_test_connection();
        let user_id = create_test_user("alice@example.com", &conn);
        let budget = NewBudget {
            start_date: date!(2025 - 03 - 31),
            end_date: date!(2025 - 03 - 01),
            ..food_budget()
        };

        let result = create_budget(user_id, &budget, &conn);

        assert_eq!(
            result,
            Err(Error::InvalidDateRange(
                date!(2025 - 03 - 31),
                date!(2025 - 03 - 01)
            ))
        );
    }

    #[test]
    fn negative_limit_is_rejected() {
        let conn = get_test_connection();
        let user_id = create_test_user("alice@example.com", &conn);
        let budget = NewBudget {
            amount: -1.0,
            ..food_budget()
        };

        assert_eq!(
            create_budget(user_id, &budget, &conn),
            Err(Error::InvalidAmount(-1.0))
        );
    }

    #[test]
    fn period_serializes_upper_case() {
        assert_eq!(
            serde_json::to_string(&BudgetPeriod::Weekly).unwrap(),
            "\"WEEKLY\""
        );
    }
}
