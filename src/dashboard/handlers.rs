//! Dashboard HTTP handlers.

use std::sync::{Arc, Mutex};

use axum::{
    Extension,
    extract::{FromRef, Query, State, rejection::QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use rusqlite::Connection;

use crate::{
    AppState, Error, UserID,
    dashboard::{
        progress::{get_budget_progress, get_goal_progress},
        series::{SeriesQuery, period_series},
        summary::summarize,
    },
    outcome::success,
    timezone::get_local_today,
};

/// The state needed for the dashboard endpoints.
///
/// Contains the database connection and the timezone that decides what
/// "today" is for the series.
#[derive(Debug, Clone)]
pub struct DashboardState {
    /// The database connection for reading transactions.
    pub db_connection: Arc<Mutex<Connection>>,
    /// The local timezone as a canonical timezone name, e.g. "Asia/Kuala_Lumpur".
    pub local_timezone: String,
}

impl FromRef<AppState> for DashboardState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
            local_timezone: state.local_timezone.clone(),
        }
    }
}

/// Lock the connection and run `query` with it, turning the result into an outcome response.
fn respond_with<T, F>(
    state: &DashboardState,
    operation: &str,
    user_id: UserID,
    query: F,
) -> Response
where
    T: serde::Serialize,
    F: FnOnce(&Connection) -> Result<T, Error>,
{
    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_response();
        }
    };

    match query(&connection) {
        Ok(data) => success(StatusCode::OK, data),
        Err(error) => {
            tracing::error!("Could not get {operation} for user {user_id}: {error}");
            error.into_response()
        }
    }
}

/// Responds with the user's all-time income, expense and balance.
pub async fn get_summary_endpoint(
    State(state): State<DashboardState>,
    Extension(user_id): Extension<UserID>,
) -> Response {
    respond_with(&state, "summary", user_id, |connection| {
        summarize(user_id, connection)
    })
}

/// Responds with the income and expense series for the requested period.
pub async fn get_series_endpoint(
    State(state): State<DashboardState>,
    Extension(user_id): Extension<UserID>,
    query: Result<Query<SeriesQuery>, QueryRejection>,
) -> Response {
    let Query(query) = match query {
        Ok(query) => query,
        Err(rejection) => return Error::InvalidPayload(rejection.body_text()).into_response(),
    };

    let today = match get_local_today(&state.local_timezone) {
        Ok(today) => today,
        Err(error) => {
            tracing::error!("Could not get today's date: {error}");
            return error.into_response();
        }
    };

    respond_with(&state, "period series", user_id, |connection| {
        period_series(user_id, query.period, today, connection)
    })
}

/// Responds with the user's budgets and how much has been spent against each.
pub async fn get_budget_progress_endpoint(
    State(state): State<DashboardState>,
    Extension(user_id): Extension<UserID>,
) -> Response {
    respond_with(&state, "budget progress", user_id, |connection| {
        get_budget_progress(user_id, connection)
    })
}

/// Responds with the user's savings goals and their progress.
pub async fn get_goal_progress_endpoint(
    State(state): State<DashboardState>,
    Extension(user_id): Extension<UserID>,
) -> Response {
    respond_with(&state, "goal progress", user_id, |connection| {
        get_goal_progress(user_id, connection)
    })
}
