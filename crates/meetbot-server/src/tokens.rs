//! Token lifecycle: hand out a usable access token for a principal,
//! refreshing it through the identity provider when the stored one expired.
//!
//! Refreshes are single-flight per subject. Concurrent requests for the same
//! principal queue on a per-subject lock. Each one re-reads the principal
//! once it holds the lock, so only the first performs the exchange.

use std::{collections::HashMap, sync::Arc};

use chrono::Utc;
use meetbot_core::{principal::Principal, store::PrincipalStore, token::TokenGrant};
use meetbot_google::OAuthClient;
use thiserror::Error;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

#[derive(Debug, Error)]
pub enum TokenError {
  #[error(transparent)]
  Core(#[from] meetbot_core::Error),

  #[error("refresh exchange failed: {0}")]
  Refresh(#[source] meetbot_google::Error),

  #[error("principal {0} disappeared during refresh")]
  PrincipalGone(String),

  #[error("store error: {0}")]
  Store(#[source] Box<dyn std::error::Error + Send + Sync>),
}

fn store_error<E>(e: E) -> TokenError
where
  E: std::error::Error + Send + Sync + 'static,
{
  TokenError::Store(Box::new(e))
}

pub struct TokenLifecycle<S> {
  store:    Arc<S>,
  oauth:    Arc<OAuthClient>,
  inflight: Mutex<HashMap<String, Arc<Mutex<()>>>>,
}

impl<S: PrincipalStore> TokenLifecycle<S> {
  pub fn new(store: Arc<S>, oauth: Arc<OAuthClient>) -> Self {
    Self { store, oauth, inflight: Mutex::new(HashMap::new()) }
  }

  /// Return a currently-valid access token for `principal`.
  ///
  /// A stored token that has not expired is returned without contacting the
  /// identity provider. Otherwise the refresh token is exchanged and the new
  /// access token persisted before it is returned.
  pub async fn valid_token(&self, principal: &Principal) -> Result<TokenGrant, TokenError> {
    if let Some(grant) = principal.current_grant(Utc::now().timestamp()) {
      debug!(subject = %principal.subject, "reusing stored access token");
      return Ok(grant);
    }

    let lock = self.subject_lock(&principal.subject).await;
    let result = {
      let _guard = lock.lock().await;
      self.refresh_locked(&principal.subject).await
    };
    self.release(&principal.subject, &lock).await;
    result
  }

  async fn refresh_locked(&self, subject: &str) -> Result<TokenGrant, TokenError> {
    // Another request may have refreshed while this one waited for the lock.
    let latest = self
      .store
      .find_by_subject(subject)
      .await
      .map_err(store_error)?
      .ok_or_else(|| TokenError::PrincipalGone(subject.to_owned()))?;

    if let Some(grant) = latest.current_grant(Utc::now().timestamp()) {
      debug!(subject, "access token refreshed by a concurrent request");
      return Ok(grant);
    }

    let refresh_token = latest.require_refresh_token()?;
    info!(subject, "access token expired, refreshing");

    let grant = self.oauth.refresh(refresh_token).await.map_err(|e| {
      warn!(subject, error = %e, "refresh exchange failed");
      TokenError::Refresh(e)
    })?;

    self
      .store
      .update_token(subject, grant.clone())
      .await
      .map_err(store_error)?
      .ok_or_else(|| TokenError::PrincipalGone(subject.to_owned()))?;

    Ok(grant)
  }

  async fn subject_lock(&self, subject: &str) -> Arc<Mutex<()>> {
    let mut inflight = self.inflight.lock().await;
    inflight.entry(subject.to_owned()).or_default().clone()
  }

  /// Drop the per-subject lock once nobody else is queued on it.
  async fn release(&self, subject: &str, lock: &Arc<Mutex<()>>) {
    let mut inflight = self.inflight.lock().await;
    // One reference lives in the map, one is ours.
    if Arc::strong_count(lock) <= 2 {
      inflight.remove(subject);
    }
  }
}
