//! Error types for `meetbot-core`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("principal {0} has no refresh token on file")]
  MissingRefreshToken(String),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
