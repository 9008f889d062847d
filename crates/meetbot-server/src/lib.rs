//! HTTP layer for meetbot.
//!
//! Exposes an axum [`Router`] that logs users in through Google's OAuth
//! consent screen, remembers their tokens in any [`PrincipalStore`], and
//! creates calendar events for them later.

pub mod error;
pub mod handlers;
pub mod logins;
pub mod tokens;

pub use error::ApiError;

use std::{path::PathBuf, sync::Arc, time::Duration};

use axum::{
  Router,
  routing::{get, post},
};
use meetbot_core::store::PrincipalStore;
use meetbot_google::{
  CalendarClient, ClientCredentials, Endpoints, OAuthClient,
  endpoints::{CALENDAR_API_BASE, GOOGLE_AUTH_URL, GOOGLE_TOKEN_URL, GOOGLE_USERINFO_URL},
};
use serde::Deserialize;
use tower_http::trace::TraceLayer;

use logins::LoginStates;
use tokens::TokenLifecycle;

// ─── Configuration ────────────────────────────────────────────────────────────

/// Runtime server configuration, deserialised from `config.toml` and the
/// environment. Only the client credentials are required.
#[derive(Deserialize, Clone)]
pub struct ServerConfig {
  #[serde(default = "default_host")]
  pub host:              String,
  #[serde(default = "default_port")]
  pub port:              u16,
  /// Externally visible base URL; the OAuth callback is `{public_url}/auth`.
  #[serde(default = "default_public_url")]
  pub public_url:        String,
  #[serde(default = "default_store_path")]
  pub store_path:        PathBuf,
  pub client_id:         String,
  pub client_secret:     String,
  #[serde(default = "default_http_timeout_secs")]
  pub http_timeout_secs: u64,
  #[serde(default = "default_auth_url")]
  pub auth_url:          String,
  #[serde(default = "default_token_url")]
  pub token_url:         String,
  #[serde(default = "default_userinfo_url")]
  pub userinfo_url:      String,
  #[serde(default = "default_calendar_api_base")]
  pub calendar_api_base: String,
}

fn default_host() -> String { "127.0.0.1".to_owned() }
fn default_port() -> u16 { 8000 }
fn default_public_url() -> String { "http://localhost:8000".to_owned() }
fn default_store_path() -> PathBuf { PathBuf::from("meetbot.db") }
fn default_http_timeout_secs() -> u64 { 30 }
fn default_auth_url() -> String { GOOGLE_AUTH_URL.to_owned() }
fn default_token_url() -> String { GOOGLE_TOKEN_URL.to_owned() }
fn default_userinfo_url() -> String { GOOGLE_USERINFO_URL.to_owned() }
fn default_calendar_api_base() -> String { CALENDAR_API_BASE.to_owned() }

impl ServerConfig {
  pub fn credentials(&self) -> ClientCredentials {
    ClientCredentials {
      client_id:     self.client_id.clone(),
      client_secret: self.client_secret.clone(),
    }
  }

  pub fn endpoints(&self) -> Endpoints {
    Endpoints {
      auth_url:          self.auth_url.clone(),
      token_url:         self.token_url.clone(),
      userinfo_url:      self.userinfo_url.clone(),
      calendar_api_base: self.calendar_api_base.clone(),
    }
  }

  pub fn redirect_uri(&self) -> String {
    format!("{}/auth", self.public_url.trim_end_matches('/'))
  }
}

// ─── Application state ────────────────────────────────────────────────────────

/// Shared state threaded through all axum handlers.
#[derive(Clone)]
pub struct AppState<S: PrincipalStore> {
  pub store:    Arc<S>,
  pub config:   Arc<ServerConfig>,
  pub oauth:    Arc<OAuthClient>,
  pub calendar: Arc<CalendarClient>,
  pub tokens:   Arc<TokenLifecycle<S>>,
  pub logins:   Arc<LoginStates>,
}

impl<S: PrincipalStore> AppState<S> {
  /// Build the remote clients from `config`. They share one HTTP client
  /// carrying the configured timeout.
  pub fn new(store: Arc<S>, config: ServerConfig) -> Result<Self, meetbot_google::Error> {
    let http = reqwest::Client::builder()
      .timeout(Duration::from_secs(config.http_timeout_secs))
      .build()?;

    let endpoints = config.endpoints();
    let oauth = Arc::new(OAuthClient::new(
      http.clone(),
      config.credentials(),
      &endpoints,
      config.redirect_uri(),
    )?);
    let calendar = Arc::new(CalendarClient::new(http, &endpoints));
    let tokens = Arc::new(TokenLifecycle::new(store.clone(), oauth.clone()));

    Ok(Self {
      store,
      config: Arc::new(config),
      oauth,
      calendar,
      tokens,
      logins: Arc::new(LoginStates::default()),
    })
  }
}

// ─── Router ───────────────────────────────────────────────────────────────────

/// Build an axum [`Router`] for the server.
pub fn router<S>(state: AppState<S>) -> Router
where
  S: PrincipalStore + Clone + 'static,
{
  Router::new()
    .route("/",             get(handlers::root))
    .route("/login",        get(handlers::auth::login::<S>))
    .route("/auth",         get(handlers::auth::callback::<S>))
    .route("/create-event", post(handlers::events::create::<S>))
    .layer(TraceLayer::new_for_http())
    .with_state(state)
}

// ─── Integration tests ────────────────────────────────────────────────────────
