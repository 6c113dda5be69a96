//! How far along a user's budgets and savings goals are.

use rusqlite::Connection;
use serde::{Deserialize, Serialize};

use crate::{
    Error, UserID,
    budget::{Budget, map_budget_row},
    dashboard::summary::finite_total,
    goal::{Goal, map_goal_row},
};

/// Budgets above this percentage of their limit are flagged.
const NEAR_LIMIT_PERCENTAGE: f64 = 80.0;

/// A budget with the amount spent against it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BudgetProgress {
    /// The budget being tracked.
    #[serde(flatten)]
    pub budget: Budget,
    /// The sum of matching expenses inside the budget's dates.
    pub used: f64,
    /// `used` as a percentage of the limit, capped at 100.
    pub percentage: f64,
    /// Whether more than 80% of the limit has been spent.
    pub near_limit: bool,
}

/// A savings goal with how much of the target has been saved.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GoalProgress {
    /// The goal being tracked.
    #[serde(flatten)]
    pub goal: Goal,
    /// The current amount as a percentage of the target, capped at 100.
    pub percentage: f64,
}

/// `part` as a percentage of `whole`, capped at 100 and zero when `whole` is not positive.
fn capped_percentage(part: f64, whole: f64) -> f64 {
    if whole <= 0.0 {
        return 0.0;
    }

    (part / whole * 100.0).min(100.0)
}

/// Get each budget of `user_id` with the amount spent against it.
///
/// An expense counts towards a budget when its category matches, ignoring
/// case, and its date is within the budget's start and end dates.
///
/// # Errors
/// Returns [Error::AmountOverflow] if the spending against a budget is too
/// large to represent, or [Error::SqlError] if there is some SQL error.
pub fn get_budget_progress(
    user_id: UserID,
    connection: &Connection,
) -> Result<Vec<BudgetProgress>, Error> {
    connection
        .prepare(
            "SELECT b.id, b.user_id, b.category, b.amount, b.period, b.start_date, b.end_date,
                (SELECT COALESCE(SUM(t.amount), 0.0) FROM \"transaction\" t
                 WHERE t.user_id = b.user_id
                   AND t.type = 'EXPENSE'
                   AND t.category = b.category COLLATE NOCASE
                   AND t.date BETWEEN b.start_date AND b.end_date)
            FROM budget b
            WHERE b.user_id = ?1
            ORDER BY b.id",
        )?
        .query_map((user_id,), |row| {
            let budget = map_budget_row(row)?;
            let used: f64 = row.get(7)?;
            let percentage = capped_percentage(used, budget.amount);

            Ok(BudgetProgress {
                budget,
                used,
                percentage,
                near_limit: percentage > NEAR_LIMIT_PERCENTAGE,
            })
        })?
        .map(|maybe_progress| -> Result<BudgetProgress, Error> {
            let progress = maybe_progress?;
            finite_total(progress.used)?;
            Ok(progress)
        })
        .collect()
}

/// Get each savings goal of `user_id` with its progress.
///
/// # Errors
/// Returns [Error::SqlError] if there is some SQL error.
pub fn get_goal_progress(
    user_id: UserID,
    connection: &Connection,
) -> Result<Vec<GoalProgress>, Error> {
    connection
        .prepare(
            "SELECT id, user_id, name, target_amount, current_amount, deadline
            FROM goal WHERE user_id = ?1 ORDER BY id",
        )?
        .query_map((user_id,), |row| {
            let goal = map_goal_row(row)?;
            let percentage = capped_percentage(goal.current_amount, goal.target_amount);

            Ok(GoalProgress { goal, percentage })
        })?
        .map(|maybe_progress| maybe_progress.map_err(Error::from))
        .collect()
}
