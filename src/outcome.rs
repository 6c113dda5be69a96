//! The discriminated result returned by every API endpoint.
//!
//! The presentation layer renders inline messages from a failure instead of
//! treating non-2xx responses as crashes, so both arms share one JSON shape:
//! `{"status": "success", "data": ...}` or
//! `{"status": "failure", "message": "..."}`.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};

/// The outcome of an operation, either the data it produced or a message
/// explaining why it failed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Outcome<T> {
    /// The operation succeeded.
    Success {
        /// The data produced by the operation.
        data: T,
    },
    /// The operation failed.
    Failure {
        /// A message suitable for showing to the user.
        message: String,
    },
}

/// Respond with a success outcome carrying `data`.
pub(crate) fn success<T: Serialize>(status: StatusCode, data: T) -> Response {
    (status, Json(Outcome::Success { data })).into_response()
}

/// Respond with a failure outcome carrying `message`.
pub(crate) fn failure(status: StatusCode, message: &str) -> Response {
    (
        status,
        Json(Outcome::<()>::Failure {
            message: message.to_owned(),
        }),
    )
        .into_response()
}

#[cfg(test)]
impl<T: std::fmt::Debug> Outcome<T> {
    #[track_caller]
    pub(crate) fn unwrap_success(self) -> T {
        match self {
            Outcome::Success { data } => data,
            Outcome::Failure { message } => panic!("expected success, got failure: {message}"),
        }
    }

    #[track_caller]
    pub(crate) fn unwrap_failure(self) -> String {
        match self {
            Outcome::Failure { message } => message,
            Outcome::Success { data } => panic!("expected failure, got success: {data:?}"),
        }
    }
}
