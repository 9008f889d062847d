//! The `PrincipalStore` trait.
//!
//! The trait is implemented by storage backends (e.g. `meetbot-store-sqlite`).
//! The server depends on this abstraction, not on any concrete backend.

use std::future::Future;

use crate::{
  principal::{Principal, Profile},
  token::TokenGrant,
};

/// Credential repository over a backend holding one record per principal.
///
/// Every write is a single transaction; the returned [`Principal`] reflects
/// the committed row.
///
/// All methods return `Send` futures so the trait can be used in multi-threaded
/// async runtimes (e.g. tokio with `axum`).
pub trait PrincipalStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  /// Exact-match lookup by identity-provider subject. A miss is `Ok(None)`.
  fn find_by_subject<'a>(
    &'a self,
    subject: &'a str,
  ) -> impl Future<Output = Result<Option<Principal>, Self::Error>> + Send + 'a;

  /// Exact-match lookup by email. A miss is `Ok(None)`.
  fn find_by_email<'a>(
    &'a self,
    email: &'a str,
  ) -> impl Future<Output = Result<Option<Principal>, Self::Error>> + Send + 'a;

  /// Create the principal for `profile.subject`, or merge the login into the
  /// existing one with [`Principal::apply_login`].
  fn upsert(
    &self,
    profile: Profile,
    grant: TokenGrant,
  ) -> impl Future<Output = Result<Principal, Self::Error>> + Send + '_;

  /// Merge a refreshed access token with [`Principal::apply_refresh`].
  ///
  /// Returns `None` when no principal has this subject; nothing is created.
  fn update_token<'a>(
    &'a self,
    subject: &'a str,
    grant: TokenGrant,
  ) -> impl Future<Output = Result<Option<Principal>, Self::Error>> + Send + 'a;
}
