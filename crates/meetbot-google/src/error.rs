//! Error type for `meetbot-google`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("http request failed: {0}")]
  Http(#[from] reqwest::Error),

  #[error("invalid endpoint url: {0}")]
  Url(#[from] url::ParseError),

  /// The identity provider answered a token or userinfo request with a
  /// non-success status.
  #[error("{endpoint} endpoint returned {status}: {body}")]
  Provider {
    endpoint: &'static str,
    status:   u16,
    body:     String,
  },

  /// The Calendar API rejected a request. Status, body and content type are
  /// kept verbatim so they can be handed back to the caller unchanged.
  #[error("calendar api returned {status}")]
  Remote {
    status:       u16,
    body:         String,
    content_type: Option<String>,
  },

  #[error("invalid response: {0}")]
  InvalidResponse(String),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
