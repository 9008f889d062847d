//! Token payloads exchanged with the identity provider.

/// The only token type the identity provider issues.
pub const BEARER: &str = "Bearer";

/// An OAuth token payload.
///
/// Produced either by the identity provider (code exchange, refresh) or
/// synthesised from the values already stored on a
/// [`Principal`](crate::principal::Principal).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenGrant {
  pub access_token:  String,
  pub token_type:    String,
  /// Only present when the provider issued a new one.
  pub refresh_token: Option<String>,
  /// Absolute expiry of `access_token`, in epoch seconds.
  pub expires_at:    Option<i64>,
}

impl TokenGrant {
  /// A bearer grant with no refresh token.
  pub fn bearer(access_token: impl Into<String>, expires_at: Option<i64>) -> Self {
    Self {
      access_token: access_token.into(),
      token_type: BEARER.to_owned(),
      refresh_token: None,
      expires_at,
    }
  }

  pub fn with_refresh_token(mut self, refresh_token: impl Into<String>) -> Self {
    self.refresh_token = Some(refresh_token.into());
    self
  }

  /// Build a grant from a token-endpoint response, converting the relative
  /// `expires_in` into an absolute expiry anchored at `now`.
  pub fn from_expires_in(
    access_token:  String,
    token_type:    Option<String>,
    refresh_token: Option<String>,
    expires_in:    Option<i64>,
    now:           i64,
  ) -> Self {
    Self {
      access_token,
      token_type: token_type.unwrap_or_else(|| BEARER.to_owned()),
      refresh_token,
      expires_at: expires_in.map(|secs| now + secs),
    }
  }

  /// Seconds until the access token expires, clamped at zero.
  pub fn expires_in(&self, now: i64) -> Option<i64> {
    self.expires_at.map(|at| (at - now).max(0))
  }
}

/// An access token with unknown expiry counts as expired.
pub fn is_expired(expires_at: Option<i64>, now: i64) -> bool {
  match expires_at {
    Some(at) => at < now,
    None => true,
  }
}
