//! API error type and [`axum::response::IntoResponse`] implementation.

use axum::{
  Json,
  http::{HeaderValue, StatusCode, header},
  response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

use crate::tokens::TokenError;

pub(crate) const USER_NOT_FOUND: &str = "User not found. Please login first.";
pub(crate) const MISSING_REFRESH_TOKEN: &str =
  "User has no refresh token. Please re-authenticate with prompt=consent.";

/// An error returned by an API handler.
#[derive(Debug, Error)]
pub enum ApiError {
  #[error("not found: {0}")]
  NotFound(String),

  /// The principal exists but lacks what the operation needs. Reported as
  /// 400, not 412.
  #[error("precondition failed: {0}")]
  PreconditionFailed(String),

  /// The identity provider refused the stored refresh token.
  #[error("reauthentication required: {0}")]
  Reauthenticate(String),

  #[error("upstream error: {0}")]
  Upstream(String),

  /// A Calendar API rejection, passed through unchanged.
  #[error("calendar api returned {status}")]
  Remote {
    status:       u16,
    body:         String,
    content_type: Option<String>,
  },

  #[error("store error: {0}")]
  Store(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl From<meetbot_google::Error> for ApiError {
  fn from(e: meetbot_google::Error) -> Self {
    match e {
      meetbot_google::Error::Remote { status, body, content_type } => {
        ApiError::Remote { status, body, content_type }
      }
      other => ApiError::Upstream(other.to_string()),
    }
  }
}

impl From<TokenError> for ApiError {
  fn from(e: TokenError) -> Self {
    match e {
      TokenError::Core(meetbot_core::Error::MissingRefreshToken(_)) => {
        ApiError::PreconditionFailed(MISSING_REFRESH_TOKEN.to_owned())
      }
      TokenError::Refresh(meetbot_google::Error::Provider { .. }) => ApiError::Reauthenticate(
        "Stored credentials were rejected by the identity provider. Please login again."
          .to_owned(),
      ),
      TokenError::Refresh(other) => ApiError::Upstream(other.to_string()),
      TokenError::PrincipalGone(_) => ApiError::NotFound(USER_NOT_FOUND.to_owned()),
      TokenError::Store(e) => ApiError::Store(e),
    }
  }
}

impl IntoResponse for ApiError {
  fn into_response(self) -> Response {
    let (status, message) = match self {
      ApiError::Remote { status, body, content_type } => {
        let status = StatusCode::from_u16(status).unwrap_or(StatusCode::BAD_GATEWAY);
        let mut res = (status, body).into_response();
        if let Some(ct) = content_type.and_then(|ct| HeaderValue::from_str(&ct).ok()) {
          res.headers_mut().insert(header::CONTENT_TYPE, ct);
        }
        return res;
      }
      ApiError::NotFound(m) => (StatusCode::NOT_FOUND, m),
      ApiError::PreconditionFailed(m) => (StatusCode::BAD_REQUEST, m),
      ApiError::Reauthenticate(m) => (StatusCode::UNAUTHORIZED, m),
      ApiError::Upstream(m) => (StatusCode::BAD_GATEWAY, m),
      ApiError::Store(e) => (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()),
    };
    (status, Json(json!({ "error": message }))).into_response()
  }
}
