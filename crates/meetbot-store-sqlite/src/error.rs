//! Error type for `meetbot-store-sqlite`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("database error: {0}")]
  Database(#[from] tokio_rusqlite::Error),

  /// The unique email index rejected a write.
  #[error("email {0} already belongs to another principal")]
  EmailConflict(String),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
