//! Principal — the stored record of an authenticated user and their
//! credentials.
//!
//! The merge rules here are the only place that decides which fields a login
//! or a refresh may overwrite. Storage backends load a [`Principal`], apply
//! one of these methods, and write every field back.

use serde::Deserialize;

use crate::{
  Error, Result,
  token::{TokenGrant, is_expired},
};

// ─── Profile ─────────────────────────────────────────────────────────────────

/// Profile data returned by the identity provider's userinfo endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Profile {
  /// OIDC userinfo calls this `sub`; the legacy v1 endpoint calls it `id`.
  #[serde(rename = "sub", alias = "id")]
  pub subject: String,
  pub email:   String,
}

// ─── Principal ───────────────────────────────────────────────────────────────

/// One persisted end user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Principal {
  /// Surrogate key assigned by the store.
  pub id:            i64,
  pub subject:       String,
  pub email:         String,
  pub access_token:  Option<String>,
  pub refresh_token: Option<String>,
  /// Absolute expiry of `access_token`, in epoch seconds.
  pub expires_at:    Option<i64>,
}

/// Whether the stored access token can be used without a refresh.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenState {
  Expired,
  Valid { expires_in: i64 },
}

impl Principal {
  /// Merge a successful login into this record.
  ///
  /// Overwrites `email`, `access_token` and `expires_at`. The refresh token
  /// is replaced only when the grant carries a new one; providers omit it on
  /// repeat logins.
  pub fn apply_login(&mut self, profile: &Profile, grant: &TokenGrant) {
    self.email = profile.email.clone();
    self.access_token = Some(grant.access_token.clone());
    self.expires_at = grant.expires_at;
    if let Some(refresh_token) = &grant.refresh_token {
      self.refresh_token = Some(refresh_token.clone());
    }
  }

  /// Merge a refreshed access token into this record. The refresh token is
  /// never touched.
  pub fn apply_refresh(&mut self, grant: &TokenGrant) {
    self.access_token = Some(grant.access_token.clone());
    self.expires_at = grant.expires_at;
  }

  pub fn token_state(&self, now: i64) -> TokenState {
    match (&self.access_token, self.expires_at) {
      (Some(_), Some(at)) if !is_expired(Some(at), now) => {
        TokenState::Valid { expires_in: at - now }
      }
      _ => TokenState::Expired,
    }
  }

  /// The stored access token as a grant, or `None` if it must be refreshed.
  pub fn current_grant(&self, now: i64) -> Option<TokenGrant> {
    match self.token_state(now) {
      TokenState::Valid { .. } => self
        .access_token
        .as_ref()
        .map(|token| TokenGrant::bearer(token.clone(), self.expires_at)),
      TokenState::Expired => None,
    }
  }

  pub fn require_refresh_token(&self) -> Result<&str> {
    self
      .refresh_token
      .as_deref()
      .ok_or_else(|| Error::MissingRefreshToken(self.subject.clone()))
  }
}

// ─── NewPrincipal ────────────────────────────────────────────────────────────

/// A principal built from a first login, before the store assigns an id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewPrincipal {
  pub subject:       String,
  pub email:         String,
  pub access_token:  Option<String>,
  pub refresh_token: Option<String>,
  pub expires_at:    Option<i64>,
}

impl NewPrincipal {
  pub fn from_login(profile: Profile, grant: TokenGrant) -> Self {
    Self {
      subject:       profile.subject,
      email:         profile.email,
      access_token:  Some(grant.access_token),
      refresh_token: grant.refresh_token,
      expires_at:    grant.expires_at,
    }
  }

  pub fn with_id(self, id: i64) -> Principal {
    Principal {
      id,
      subject:       self.subject,
      email:         self.email,
      access_token:  self.access_token,
      refresh_token: self.refresh_token,
      expires_at:    self.expires_at,
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn profile(email: &str) -> Profile {
    Profile { subject: "sub-1".into(), email: email.into() }
  }

  fn stored() -> Principal {
    Principal {
      id:            1,
      subject:       "sub-1".into(),
      email:         "old@example.com".into(),
      access_token:  Some("old-access".into()),
      refresh_token: Some("old-refresh".into()),
      expires_at:    Some(1_000),
    }
  }

  #[test]
  fn login_without_refresh_token_keeps_stored_one() {
    let mut p = stored();
    p.apply_login(&profile("new@example.com"), &TokenGrant::bearer("new-access", Some(2_000)));
    assert_eq!(p.email, "new@example.com");
    assert_eq!(p.access_token.as_deref(), Some("new-access"));
    assert_eq!(p.expires_at, Some(2_000));
    assert_eq!(p.refresh_token.as_deref(), Some("old-refresh"));
  }

  #[test]
  fn login_with_refresh_token_replaces_it() {
    let mut p = stored();
    let grant = TokenGrant::bearer("new-access", Some(2_000)).with_refresh_token("new-refresh");
    p.apply_login(&profile("old@example.com"), &grant);
    assert_eq!(p.refresh_token.as_deref(), Some("new-refresh"));
  }

  #[test]
  fn refresh_never_touches_refresh_token_or_email() {
    let mut p = stored();
    let grant = TokenGrant::bearer("fresh", Some(5_000)).with_refresh_token("ignored");
    p.apply_refresh(&grant);
    assert_eq!(p.access_token.as_deref(), Some("fresh"));
    assert_eq!(p.expires_at, Some(5_000));
    assert_eq!(p.refresh_token.as_deref(), Some("old-refresh"));
    assert_eq!(p.email, "old@example.com");
  }

  #[test]
  fn token_state_reports_remaining_lifetime() {
    let p = stored();
    assert_eq!(p.token_state(400), TokenState::Valid { expires_in: 600 });
    assert_eq!(p.token_state(1_001), TokenState::Expired);
  }

  #[test]
  fn missing_expiry_or_token_is_expired() {
    let mut p = stored();
    p.expires_at = None;
    assert_eq!(p.token_state(0), TokenState::Expired);
    let mut p = stored();
    p.access_token = None;
    assert!(p.current_grant(0).is_none());
  }

  #[test]
  fn current_grant_uses_stored_values() {
    let grant = stored().current_grant(900).unwrap();
    assert_eq!(grant.access_token, "old-access");
    assert_eq!(grant.expires_in(900), Some(100));
    assert!(grant.refresh_token.is_none());
  }

  #[test]
  fn new_principal_takes_every_field_from_the_login() {
    let grant = TokenGrant::bearer("a", Some(10)).with_refresh_token("r");
    let p = NewPrincipal::from_login(profile("x@example.com"), grant).with_id(7);
    assert_eq!(p.id, 7);
    assert_eq!(p.subject, "sub-1");
    assert_eq!(p.email, "x@example.com");
    assert_eq!(p.access_token.as_deref(), Some("a"));
    assert_eq!(p.refresh_token.as_deref(), Some("r"));
    assert_eq!(p.expires_at, Some(10));
  }

  #[test]
  fn require_refresh_token_errors_when_absent() {
    let mut p = stored();
    p.refresh_token = None;
    assert!(matches!(p.require_refresh_token(), Err(Error::MissingRefreshToken(s)) if s == "sub-1"));
  }

  #[test]
  fn profile_accepts_sub_or_legacy_id() {
    let oidc: Profile =
      serde_json::from_str(r#"{"sub":"123","email":"a@b.com","name":"A"}"#).unwrap();
    let legacy: Profile =
      serde_json::from_str(r#"{"id":"123","email":"a@b.com","verified_email":true}"#).unwrap();
    assert_eq!(oidc, legacy);
  }
}
