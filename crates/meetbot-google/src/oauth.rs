//! OAuth 2.0 authorization-code flow against Google's identity provider.
//!
//! # Flow Overview
//!
//! 1. [`OAuthClient::authorization_url`] builds the consent-screen URL. It
//!    carries `access_type=offline` and `prompt=consent`, so a refresh token
//!    is issued on every login, not just the first.
//! 2. The provider redirects back with `?code=...&state=...`.
//! 3. [`OAuthClient::exchange_code`] trades the code for tokens.
//! 4. [`OAuthClient::fetch_profile`] reads the subject and email.
//! 5. Later, [`OAuthClient::refresh`] mints new access tokens from the stored
//!    refresh token.

use chrono::Utc;
use meetbot_core::{principal::Profile, token::TokenGrant};
use serde::Deserialize;
use tracing::{debug, info, warn};
use url::Url;

use crate::{
  endpoints::{ClientCredentials, Endpoints, SCOPES},
  error::{Error, Result},
};

/// Response from the token endpoint.
#[derive(Debug, Deserialize)]
struct TokenResponse {
  access_token:  String,
  #[serde(default)]
  refresh_token: Option<String>,
  #[serde(default)]
  expires_in:    Option<i64>,
  #[serde(default)]
  token_type:    Option<String>,
}

impl TokenResponse {
  fn into_grant(self, now: i64) -> TokenGrant {
    TokenGrant::from_expires_in(
      self.access_token,
      self.token_type,
      self.refresh_token,
      self.expires_in,
      now,
    )
  }
}

/// OAuth client for one registered application.
///
/// Built once at startup and shared through the server state.
#[derive(Debug, Clone)]
pub struct OAuthClient {
  http:         reqwest::Client,
  credentials:  ClientCredentials,
  auth_url:     Url,
  token_url:    String,
  userinfo_url: String,
  redirect_uri: String,
}

impl OAuthClient {
  /// Creates a client. `redirect_uri` is the callback registered with the
  /// provider.
  pub fn new(
    http: reqwest::Client,
    credentials: ClientCredentials,
    endpoints: &Endpoints,
    redirect_uri: impl Into<String>,
  ) -> Result<Self> {
    Ok(Self {
      http,
      credentials,
      auth_url: Url::parse(&endpoints.auth_url)?,
      token_url: endpoints.token_url.clone(),
      userinfo_url: endpoints.userinfo_url.clone(),
      redirect_uri: redirect_uri.into(),
    })
  }

  pub fn redirect_uri(&self) -> &str { &self.redirect_uri }

  /// Builds the authorization-request URL for the consent screen.
  pub fn authorization_url(&self, state: &str) -> Url {
    let mut url = self.auth_url.clone();
    url
      .query_pairs_mut()
      .append_pair("client_id", &self.credentials.client_id)
      .append_pair("redirect_uri", &self.redirect_uri)
      .append_pair("response_type", "code")
      .append_pair("scope", &SCOPES.join(" "))
      .append_pair("access_type", "offline")
      .append_pair("prompt", "consent")
      .append_pair("state", state);
    url
  }

  /// Exchanges an authorization code for tokens.
  pub async fn exchange_code(&self, code: &str) -> Result<TokenGrant> {
    let params = [
      ("client_id", self.credentials.client_id.as_str()),
      ("client_secret", self.credentials.client_secret.as_str()),
      ("code", code),
      ("grant_type", "authorization_code"),
      ("redirect_uri", self.redirect_uri.as_str()),
    ];

    let grant = self.token_request(&params).await?;
    info!(has_refresh_token = grant.refresh_token.is_some(), "authorization code exchanged");
    Ok(grant)
  }

  /// Exchanges a refresh token for a new access token.
  ///
  /// The returned grant usually has no refresh token; the provider keeps the
  /// old one valid.
  pub async fn refresh(&self, refresh_token: &str) -> Result<TokenGrant> {
    let params = [
      ("client_id", self.credentials.client_id.as_str()),
      ("client_secret", self.credentials.client_secret.as_str()),
      ("refresh_token", refresh_token),
      ("grant_type", "refresh_token"),
    ];

    let grant = self.token_request(&params).await?;
    info!("access token refreshed");
    Ok(grant)
  }

  /// Reads the authenticated user's subject and email.
  pub async fn fetch_profile(&self, access_token: &str) -> Result<Profile> {
    let response = self
      .http
      .get(&self.userinfo_url)
      .bearer_auth(access_token)
      .send()
      .await?;

    let status = response.status();
    let body = response.text().await?;

    if !status.is_success() {
      warn!(%status, "userinfo request rejected");
      return Err(Error::Provider { endpoint: "userinfo", status: status.as_u16(), body });
    }

    let profile: Profile = serde_json::from_str(&body)
      .map_err(|e| Error::InvalidResponse(format!("invalid userinfo response: {e}")))?;
    debug!(subject = %profile.subject, "fetched profile");
    Ok(profile)
  }

  async fn token_request(&self, params: &[(&str, &str)]) -> Result<TokenGrant> {
    let response = self
      .http
      .post(&self.token_url)
      .form(params)
      .send()
      .await?;

    let status = response.status();
    let body = response.text().await?;

    if !status.is_success() {
      warn!(%status, "token request rejected");
      return Err(Error::Provider { endpoint: "token", status: status.as_u16(), body });
    }

    let token_response: TokenResponse = serde_json::from_str(&body)
      .map_err(|e| Error::InvalidResponse(format!("invalid token response: {e}")))?;
    Ok(token_response.into_grant(Utc::now().timestamp()))
  }
}
