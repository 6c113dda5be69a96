use axum::{body::to_bytes, response::Response};
use serde::de::DeserializeOwned;

use crate::Outcome;

pub(crate) async fn parse_json(response: Response) -> serde_json::Value {
    let body = to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("Could not read response body");

    serde_json::from_slice(&body).expect("Response body is not JSON")
}

pub(crate) async fn parse_outcome<T: DeserializeOwned>(response: Response) -> Outcome<T> {
    serde_json::from_value(parse_json(response).await).expect("Response body is not an outcome")
}
