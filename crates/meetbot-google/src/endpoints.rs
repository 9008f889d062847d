//! Client credentials and endpoint locations.

use std::fmt;

pub const GOOGLE_AUTH_URL: &str = "https://accounts.google.com/o/oauth2/v2/auth";
pub const GOOGLE_TOKEN_URL: &str = "https://oauth2.googleapis.com/token";
pub const GOOGLE_USERINFO_URL: &str = "https://openidconnect.googleapis.com/v1/userinfo";
pub const CALENDAR_API_BASE: &str = "https://www.googleapis.com/calendar/v3";

/// Identity plus permission to create events on the user's calendars.
pub const SCOPES: &[&str] = &[
  "openid",
  "email",
  "profile",
  "https://www.googleapis.com/auth/calendar.events",
];

/// The OAuth client registration.
#[derive(Clone)]
pub struct ClientCredentials {
  pub client_id:     String,
  pub client_secret: String,
}

impl fmt::Debug for ClientCredentials {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("ClientCredentials")
      .field("client_id", &self.client_id)
      .field("client_secret", &"<redacted>")
      .finish()
  }
}

/// Where each remote endpoint lives. Defaults to Google's production URLs;
/// tests point these at a mock server.
#[derive(Debug, Clone)]
pub struct Endpoints {
  pub auth_url:          String,
  pub token_url:         String,
  pub userinfo_url:      String,
  pub calendar_api_base: String,
}

impl Default for Endpoints {
  fn default() -> Self {
    Self {
      auth_url:          GOOGLE_AUTH_URL.to_owned(),
      token_url:         GOOGLE_TOKEN_URL.to_owned(),
      userinfo_url:      GOOGLE_USERINFO_URL.to_owned(),
      calendar_api_base: CALENDAR_API_BASE.to_owned(),
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn debug_hides_client_secret() {
    let creds = ClientCredentials {
      client_id:     "id.apps.googleusercontent.com".into(),
      client_secret: "hunter2".into(),
    };
    let shown = format!("{creds:?}");
    assert!(shown.contains("id.apps.googleusercontent.com"));
    assert!(!shown.contains("hunter2"));
  }
}
