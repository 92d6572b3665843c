use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Error body returned by the admin API. Decoded best-effort: a response
/// that is not this shape keeps its raw text as `msg`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ErrorPayload {
  #[serde(default)]
  pub code: i64,
  #[serde(default)]
  pub msg: String,
  #[serde(default)]
  pub error_id: Option<String>,
}

/// A response with an unexpected status. Carries the operation that was
/// attempted so callers can report it without re-deriving context.
#[derive(Debug, Error)]
#[error(
  "gotrue admin: expected HTTP {} when {op}, got HTTP {}: {}",
  .expected.as_u16(),
  .actual.as_u16(),
  .payload.msg
)]
pub struct ApiError {
  pub op: String,
  pub expected: StatusCode,
  pub actual: StatusCode,
  pub payload: ErrorPayload,
}

impl ApiError {
  pub fn is_not_found(&self) -> bool {
    self.actual == StatusCode::NOT_FOUND
  }
}

#[derive(Debug, Error)]
pub enum AdminError {
  #[error(transparent)]
  Request(#[from] reqwest::Error),

  #[error(transparent)]
  Api(#[from] ApiError),

  #[error(transparent)]
  Unhandled(#[from] anyhow::Error),
}

impl AdminError {
  pub fn api_error(&self) -> Option<&ApiError> {
    match self {
      AdminError::Api(err) => Some(err),
      _ => None,
    }
  }

  pub fn is_network_error(&self) -> bool {
    matches!(self, AdminError::Request(_))
  }
}
