//! Dashboard module
//!
//! Aggregates a user's transactions into the totals, series and progress
//! figures shown on the dashboard.

mod handlers;
mod progress;
mod range;
mod series;
mod summary;

pub use handlers::{
    get_budget_progress_endpoint, get_goal_progress_endpoint, get_series_endpoint,
    get_summary_endpoint,
};
pub use progress::{BudgetProgress, GoalProgress, get_budget_progress, get_goal_progress};
pub use series::{Granularity, PeriodBucket, period_series};
pub use summary::{Summary, summarize};
