use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, PartialEq, Eq, Deserialize, Serialize)]
pub enum TrackResponseCode {
    Ok = 1,
}

#[derive(Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct TrackResponse {
    pub status: TrackResponseCode,
}

#[derive(Error, Debug)]
pub enum TrackError {
    #[error("failed to decode request: {0}")]
    RequestDecodingError(String),
    #[error("failed to parse request: {0}")]
    RequestParsingError(#[from] serde_json::Error),
    #[error("request has an empty body")]
    EmptyBody,
}

impl IntoResponse for TrackError {
    fn into_response(self) -> Response {
        match self {
            TrackError::RequestDecodingError(_)
            | TrackError::RequestParsingError(_)
            | TrackError::EmptyBody => (StatusCode::BAD_REQUEST, self.to_string()),
        }
        .into_response()
    }
}

/// Enumeration of errors returned when forwarding a payload to the collector.
#[derive(Error, Debug)]
pub enum CollectorError {
    #[error("failed to encode payload: {0}")]
    EncodingError(#[from] serde_json::Error),
    #[error("payload could not be delivered to the collector: {0}")]
    RequestError(#[from] reqwest::Error),
    #[error("collector rejected payload with status {0}")]
    Rejected(http::StatusCode),
}

impl CollectorError {
    /// Short label for metrics.
    pub fn cause(&self) -> &'static str {
        match self {
            CollectorError::EncodingError(_) => "encoding",
            CollectorError::RequestError(_) => "transport",
            CollectorError::Rejected(_) => "rejected",
        }
    }
}
