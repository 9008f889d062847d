//! Google Calendar API client.

use reqwest::header::CONTENT_TYPE;
use tracing::{debug, warn};

use crate::{
  endpoints::Endpoints,
  error::{Error, Result},
  event::EventResource,
};

/// Calendar API client. Access tokens are passed per call, so one client
/// serves every principal.
#[derive(Debug, Clone)]
pub struct CalendarClient {
  http:       reqwest::Client,
  events_url: String,
}

impl CalendarClient {
  pub fn new(http: reqwest::Client, endpoints: &Endpoints) -> Self {
    let events_url = format!(
      "{}/calendars/primary/events",
      endpoints.calendar_api_base.trim_end_matches('/'),
    );
    Self { http, events_url }
  }

  /// Creates `event` on the user's primary calendar and returns the event
  /// resource the API sends back.
  ///
  /// A non-success status becomes [`Error::Remote`] with the body untouched.
  pub async fn create_event(
    &self,
    access_token: &str,
    event: &EventResource,
  ) -> Result<serde_json::Value> {
    let response = self
      .http
      .post(&self.events_url)
      .query(&[("conferenceDataVersion", "1")])
      .bearer_auth(access_token)
      .json(event)
      .send()
      .await?;

    let status = response.status();
    let content_type = response
      .headers()
      .get(CONTENT_TYPE)
      .and_then(|v| v.to_str().ok())
      .map(String::from);
    let body = response.text().await?;

    if !status.is_success() {
      warn!(%status, "calendar api rejected event");
      return Err(Error::Remote { status: status.as_u16(), body, content_type });
    }

    let created: serde_json::Value = serde_json::from_str(&body)
      .map_err(|e| Error::InvalidResponse(format!("invalid event resource: {e}")))?;
    debug!(id = ?created.get("id"), "calendar event created");
    Ok(created)
  }
}

#[cfg(test)]
mod tests {
  use serde_json::json;
  use wiremock::{
    Mock, MockServer, ResponseTemplate,
    matchers::{header, method, path, query_param},
  };

  use super::*;
  use crate::event::{EventDetails, EventResource};

  fn client(server: &MockServer) -> CalendarClient {
    let endpoints = Endpoints {
      calendar_api_base: format!("{}/calendar/v3/", server.uri()),
      ..Endpoints::default()
    };
    CalendarClient::new(reqwest::Client::new(), &endpoints)
  }

  fn sync_event() -> EventResource {
    let details: EventDetails = serde_json::from_value(json!({"summary": "Sync"})).unwrap();
    EventResource::from_details(details, chrono::Utc::now())
  }

  #[tokio::test]
  async fn create_event_posts_to_primary_calendar() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
      .and(path("/calendar/v3/calendars/primary/events"))
      .and(query_param("conferenceDataVersion", "1"))
      .and(header("authorization", "Bearer ya29.access"))
      .respond_with(ResponseTemplate::new(200).set_body_json(json!({
        "id": "evt-1",
        "hangoutLink": "https://meet.google.com/abc-defg-hij",
      })))
      .expect(1)
      .mount(&server)
      .await;

    let created = client(&server).create_event("ya29.access", &sync_event()).await.unwrap();
    assert_eq!(created["id"], "evt-1");

    let requests = server.received_requests().await.unwrap();
    let sent: serde_json::Value = requests[0].body_json().unwrap();
    assert_eq!(sent["summary"], "Sync");
    assert!(sent["conferenceData"]["createRequest"]["requestId"].is_string());
  }

  #[tokio::test]
  async fn rejection_keeps_status_and_body_verbatim() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
      .respond_with(
        ResponseTemplate::new(403)
          .set_body_raw(r#"{"error":"forbidden"}"#, "application/json"),
      )
      .mount(&server)
      .await;

    let err = client(&server).create_event("ya29.access", &sync_event()).await.unwrap_err();
    match err {
      Error::Remote { status, body, content_type } => {
        assert_eq!(status, 403);
        assert_eq!(body, r#"{"error":"forbidden"}"#);
        assert_eq!(content_type.as_deref(), Some("application/json"));
      }
      other => panic!("unexpected error: {other}"),
    }
  }
}
