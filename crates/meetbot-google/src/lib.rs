//! HTTP clients for Google's OAuth 2.0 / OIDC endpoints and the Calendar API.
//!
//! Both clients share one [`reqwest::Client`], so a single timeout policy
//! applies to every outbound call.

pub mod calendar;
pub mod endpoints;
pub mod error;
pub mod event;
pub mod oauth;

pub use calendar::CalendarClient;
pub use endpoints::{ClientCredentials, Endpoints};
pub use error::{Error, Result};
pub use oauth::OAuthClient;
