//! All-time income and expense totals for a user.

use rusqlite::Connection;
use serde::{Deserialize, Serialize};

use crate::{Error, UserID};

/// A user's all-time income and expense totals.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Summary {
    /// The sum of all income.
    pub income: f64,
    /// The sum of all expenses.
    pub expense: f64,
    /// `income - expense`.
    pub balance: f64,
}

/// Check that a sum of amounts is still a finite number.
///
/// JSON has no representation for infinity or NaN, so an overflowing total
/// is an error rather than a `null` in the response.
pub(super) fn finite_total(total: f64) -> Result<f64, Error> {
    if total.is_finite() {
        Ok(total)
    } else {
        Err(Error::AmountOverflow)
    }
}

/// Total up the income and expenses of `user_id` over all time.
///
/// Transfers count towards neither total.
///
/// # Errors
/// Returns [Error::AmountOverflow] if a total is too large to represent,
/// or [Error::SqlError] if there is some SQL error.
pub fn summarize(user_id: UserID, connection: &Connection) -> Result<Summary, Error> {
    let (income, expense): (f64, f64) = connection.query_row(
        "SELECT
            COALESCE(SUM(CASE WHEN type = 'INCOME' THEN amount ELSE 0 END), 0.0),
            COALESCE(SUM(CASE WHEN type = 'EXPENSE' THEN amount ELSE 0 END), 0.0)
        FROM \"transaction\"
        WHERE user_id = ?1",
        (user_id,),
        |row| Ok((row.get(0)?, row.get(1)?)),
    )?;

    Ok(Summary {
        income: finite_total(income)?,
        expense: finite_total(expense)?,
        balance: finite_total(income - expense)?,
    })
}

#[cfg(test)]
mod tests {
    use time::macros::date;

    use crate::{
        Error,
        dashboard::summary::{Summary, summarize},
        test_utils::{create_test_user, get_test_connection},
        transaction::{Transaction, TransactionType, record_transaction},
    };

    #[test]
    fn no_transactions_is_all_zero() {
        let conn = get_test_connection();
        let user_id = create_test_user("alice@example.com", &conn);

        assert_eq!(
            summarize(user_id, &conn),
            Ok(Summary {
                income: 0.0,
                expense: 0.0,
                balance: 0.0
            })
        );
    }

    #[test]
    fn totals_are_isolated_per_user_and_skip_transfers() {
        let conn = get_test_connection();
        let user_a = create_test_user("a@example.com", &conn);
        let user_b = create_test_user("b@example.com", &conn);
        for (user_id, amount, transaction_type) in [
            (user_a, 500.0, TransactionType::Income),
            (user_a, 200.0, TransactionType::Expense),
            (user_a, 50.0, TransactionType::Transfer),
            (user_b, 1000.0, TransactionType::Income),
        ] {
            record_transaction(
                user_id,
                Transaction::build(amount, transaction_type, "Misc", date!(2025 - 03 - 10)),
                &conn,
            )
            .unwrap();
        }

        assert_eq!(
            summarize(user_a, &conn),
            Ok(Summary {
                income: 500.0,
                expense: 200.0,
                balance: 300.0
            })
        );
        assert_eq!(
            summarize(user_b, &conn),
            Ok(Summary {
                income: 1000.0,
                expense: 0.0,
                balance: 1000.0
            })
        );
    }

    #[test]
    fn overflowing_totals_are_an_error() {
        let conn = get_test_connection();
        let user_id = create_test_user("alice@example.com", &conn);
        for _ in 0..2 {
            let builder =
                Transaction::build(f64::MAX, TransactionType::Income, "Pay", date!(2025 - 03 - 10));
            record_transaction(user_id, builder, &conn).unwrap();
        }

        assert_eq!(summarize(user_id, &conn), Err(Error::AmountOverflow));
    }
}
