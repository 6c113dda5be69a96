//! Application router configuration with protected and unprotected route definitions.

use axum::{
    Router,
    http::StatusCode,
    middleware,
    response::{IntoResponse, Response},
    routing::{delete, get, put},
};

use crate::{
    AppState, Error,
    account::{create_account_endpoint, delete_account_endpoint, get_accounts_endpoint},
    auth::auth_guard,
    dashboard::{
        get_budget_progress_endpoint, get_goal_progress_endpoint, get_series_endpoint,
        get_summary_endpoint,
    },
    endpoints,
    outcome::success,
    transaction::{
        create_transaction_endpoint, delete_transaction_endpoint, edit_transaction_endpoint,
        get_recent_transactions_endpoint,
    },
};

/// Return a router with all the app's routes.
///
/// Every route except the health check requires a valid session, requests
/// without one are rejected before a handler runs.
pub fn build_router(state: AppState) -> Router {
    let unprotected_routes = Router::new().route(endpoints::HEALTH, get(get_health));

    let protected_routes = Router::new()
        .route(
            endpoints::ACCOUNTS,
            get(get_accounts_endpoint).post(create_account_endpoint),
        )
        .route(endpoints::ACCOUNT, delete(delete_account_endpoint))
        .route(
            endpoints::TRANSACTIONS,
            get(get_recent_transactions_endpoint).post(create_transaction_endpoint),
        )
        .route(
            endpoints::TRANSACTION,
            put(edit_transaction_endpoint).delete(delete_transaction_endpoint),
        )
        .route(endpoints::DASHBOARD_SUMMARY, get(get_summary_endpoint))
        .route(endpoints::DASHBOARD_SERIES, get(get_series_endpoint))
        .route(endpoints::DASHBOARD_BUDGETS, get(get_budget_progress_endpoint))
        .route(endpoints::DASHBOARD_GOALS, get(get_goal_progress_endpoint))
        .route_layer(middleware::from_fn_with_state(state.clone(), auth_guard));

    protected_routes
        .merge(unprotected_routes)
        .fallback(get_404_not_found)
        .with_state(state)
}

async fn get_health() -> Response {
    success(StatusCode::OK, "ok")
}

async fn get_404_not_found() -> Response {
    Error::NotFound.into_response()
}
