//! Pending `state` values for in-flight logins.
//!
//! `/login` issues a state and `/auth` must present it back exactly once
//! before it expires.

use std::{
  collections::HashMap,
  time::{Duration, Instant},
};

use tokio::sync::Mutex;
use uuid::Uuid;

/// How long a user has to finish the consent screen.
pub const STATE_TTL: Duration = Duration::from_secs(10 * 60);

pub struct LoginStates {
  pending: Mutex<HashMap<String, Instant>>,
  ttl:     Duration,
}

impl LoginStates {
  pub fn new(ttl: Duration) -> Self {
    Self { pending: Mutex::new(HashMap::new()), ttl }
  }

  /// Issue a fresh state and drop any that have expired.
  pub async fn issue(&self) -> String {
    let state = Uuid::new_v4().simple().to_string();
    let now = Instant::now();

    let mut pending = self.pending.lock().await;
    pending.retain(|_, issued| now.duration_since(*issued) < self.ttl);
    pending.insert(state.clone(), now);
    state
  }

  /// Returns `true` if `state` was issued, unused, and unexpired. A state is
  /// removed on first presentation either way.
  pub async fn consume(&self, state: &str) -> bool {
    let mut pending = self.pending.lock().await;
    match pending.remove(state) {
      Some(issued) => issued.elapsed() < self.ttl,
      None => false,
    }
  }
}

impl Default for LoginStates {
  fn default() -> Self { Self::new(STATE_TTL) }
}
