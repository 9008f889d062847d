//! Calendar event creation on behalf of a stored principal.

use axum::{Json, extract::State};
use chrono::Utc;
use meetbot_core::store::PrincipalStore;
use meetbot_google::event::{EventDetails, EventResource};
use serde::Deserialize;
use serde_json::Value;
use tracing::info;

use crate::{
  AppState,
  error::{ApiError, MISSING_REFRESH_TOKEN, USER_NOT_FOUND},
};

#[derive(Debug, Deserialize)]
pub struct CreateEventRequest {
  pub user_email: String,
  pub event:      EventDetails,
}

/// `POST /create-event`
///
/// Returns the Calendar API's event resource. A rejection from the Calendar
/// API is returned with its own status and body.
pub async fn create<S>(
  State(state): State<AppState<S>>,
  Json(req): Json<CreateEventRequest>,
) -> Result<Json<Value>, ApiError>
where
  S: PrincipalStore + Clone + 'static,
{
  let principal = state
    .store
    .find_by_email(&req.user_email)
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?
    .ok_or_else(|| ApiError::NotFound(USER_NOT_FOUND.to_owned()))?;

  if principal.refresh_token.is_none() {
    return Err(ApiError::PreconditionFailed(MISSING_REFRESH_TOKEN.to_owned()));
  }

  let grant = state.tokens.valid_token(&principal).await?;

  let event = EventResource::from_details(req.event, Utc::now());
  let created = state.calendar.create_event(&grant.access_token, &event).await?;

  info!(subject = %principal.subject, "calendar event created");
  Ok(Json(created))
}
