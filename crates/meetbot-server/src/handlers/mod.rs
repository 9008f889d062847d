//! Route handlers.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/` | Liveness greeting |
//! | `GET`  | `/login` | 302 to the consent screen |
//! | `GET`  | `/auth` | OAuth callback; `?code=...&state=...` |
//! | `POST` | `/create-event` | Body: [`events::CreateEventRequest`] |

pub mod auth;
pub mod events;

use axum::Json;
use serde_json::{Value, json};

/// `GET /`
pub async fn root() -> Json<Value> { Json(json!({ "message": "Hello Bot" })) }
