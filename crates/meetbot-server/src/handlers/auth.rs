//! Login redirect and OAuth callback.

use axum::{
  Json,
  extract::{Query, State},
  http::{StatusCode, header},
  response::{IntoResponse, Response},
};
use meetbot_core::{store::PrincipalStore, token::TokenGrant};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::{AppState, error::ApiError};

// ─── Login ────────────────────────────────────────────────────────────────────

/// `GET /login`
pub async fn login<S>(State(state): State<AppState<S>>) -> Response
where
  S: PrincipalStore + Clone + 'static,
{
  let csrf = state.logins.issue().await;
  let url = state.oauth.authorization_url(&csrf);
  info!(redirect_uri = state.oauth.redirect_uri(), "redirecting to identity provider");
  (StatusCode::FOUND, [(header::LOCATION, url.to_string())]).into_response()
}

// ─── Callback ─────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct CallbackParams {
  pub code:              Option<String>,
  pub state:             Option<String>,
  pub error:             Option<String>,
  pub error_description: Option<String>,
}

#[derive(Debug, Serialize)]
struct AuthSuccess {
  message:    &'static str,
  user_email: String,
}

/// Provider-side failures are reported with status 200 and this body.
#[derive(Debug, Serialize)]
struct AuthFailure {
  message: &'static str,
  error:   String,
}

/// `GET /auth?code=...&state=...`
pub async fn callback<S>(
  State(state): State<AppState<S>>,
  Query(params): Query<CallbackParams>,
) -> Result<Response, ApiError>
where
  S: PrincipalStore + Clone + 'static,
{
  let grant = match exchange(&state, params).await {
    Ok(grant) => grant,
    Err(reason) => {
      warn!(%reason, "authorization failed");
      return Ok(Json(AuthFailure { message: "Error", error: reason }).into_response());
    }
  };

  let profile = state.oauth.fetch_profile(&grant.access_token).await?;

  let principal = state
    .store
    .upsert(profile, grant)
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?;

  info!(subject = %principal.subject, "principal authenticated");
  Ok(
    Json(AuthSuccess { message: "Authentication successful", user_email: principal.email })
      .into_response(),
  )
}

/// Validate the callback and trade the code for tokens. The error is the
/// text shown to the user.
async fn exchange<S>(state: &AppState<S>, params: CallbackParams) -> Result<TokenGrant, String>
where
  S: PrincipalStore + Clone + 'static,
{
  if let Some(error) = params.error {
    return Err(match params.error_description {
      Some(description) => format!("{error}: {description}"),
      None => error,
    });
  }

  let csrf = params.state.ok_or("missing state parameter")?;
  if !state.logins.consume(&csrf).await {
    return Err("invalid or expired state parameter".to_owned());
  }

  let code = params.code.ok_or("missing authorization code")?;
  state.oauth.exchange_code(&code).await.map_err(|e| e.to_string())
}
