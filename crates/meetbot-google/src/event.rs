//! Calendar event input and the Calendar API request payload built from it.

use chrono::{DateTime, Duration, NaiveDateTime, SecondsFormat, Utc};
use serde::{Deserialize, Deserializer, Serialize};

/// Length of an event whose end time was not given.
pub const DEFAULT_DURATION_SECS: i64 = 60 * 60;

/// Prefix for conference request ids.
const REQUEST_ID_PREFIX: &str = "meet-the-bot";

// ─── Input ───────────────────────────────────────────────────────────────────

/// The event a caller asks for.
#[derive(Debug, Clone, Deserialize)]
pub struct EventDetails {
  pub summary:     String,
  #[serde(default)]
  pub description: Option<String>,
  #[serde(default, deserialize_with = "deserialize_instant")]
  pub start_time:  Option<DateTime<Utc>>,
  #[serde(default, deserialize_with = "deserialize_instant")]
  pub end_time:    Option<DateTime<Utc>>,
}

/// Parse an ISO-8601 instant. Values without an offset are taken as UTC.
pub fn parse_instant(s: &str) -> Result<DateTime<Utc>, chrono::ParseError> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .or_else(|_| NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f").map(|n| n.and_utc()))
}

fn deserialize_instant<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
  D: Deserializer<'de>,
{
  Option::<String>::deserialize(deserializer)?
    .map(|s| parse_instant(&s).map_err(serde::de::Error::custom))
    .transpose()
}

// ─── Payload ─────────────────────────────────────────────────────────────────

/// Body of `POST /calendars/{id}/events`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EventResource {
  pub summary:         String,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub description:     Option<String>,
  pub start:           EventTime,
  pub end:             EventTime,
  pub conference_data: ConferenceData,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EventTime {
  pub date_time: String,
  pub time_zone: String,
}

impl EventTime {
  fn utc(at: DateTime<Utc>) -> Self {
    Self {
      date_time: at.to_rfc3339_opts(SecondsFormat::Secs, true),
      time_zone: "UTC".to_owned(),
    }
  }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConferenceData {
  pub create_request: CreateConferenceRequest,
}

/// Asks the provider to attach a generated video-conference link.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateConferenceRequest {
  pub request_id:              String,
  pub conference_solution_key: ConferenceSolutionKey,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConferenceSolutionKey {
  #[serde(rename = "type")]
  pub kind: String,
}

impl EventResource {
  /// Build the payload, defaulting the start to `now` and the end to one
  /// hour after the start.
  pub fn from_details(details: EventDetails, now: DateTime<Utc>) -> Self {
    let start = details.start_time.unwrap_or(now);
    let end = details
      .end_time
      .unwrap_or_else(|| start + Duration::seconds(DEFAULT_DURATION_SECS));

    Self {
      summary:         details.summary,
      description:     details.description,
      start:           EventTime::utc(start),
      end:             EventTime::utc(end),
      conference_data: ConferenceData {
        create_request: CreateConferenceRequest {
          request_id:              format!("{REQUEST_ID_PREFIX}-{}", start.timestamp_millis()),
          conference_solution_key: ConferenceSolutionKey { kind: "hangoutsMeet".to_owned() },
        },
      },
    }
  }
}

#[cfg(test)]
mod tests {
  use chrono::TimeZone as _;
  use serde_json::json;

  use super::*;

  fn details(json: serde_json::Value) -> EventDetails {
    serde_json::from_value(json).unwrap()
  }

  fn at(h: u32, m: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 3, 14, h, m, 0).unwrap()
  }

  #[test]
  fn omitted_times_default_to_now_plus_one_hour() {
    let event = EventResource::from_details(details(json!({"summary": "Sync"})), at(9, 30));
    assert_eq!(event.start.date_time, "2025-03-14T09:30:00Z");
    assert_eq!(event.end.date_time, "2025-03-14T10:30:00Z");
    assert_eq!(event.start.time_zone, "UTC");
  }

  #[test]
  fn omitted_end_follows_explicit_start() {
    let event = EventResource::from_details(
      details(json!({"summary": "Sync", "start_time": "2025-06-01T15:00:00Z"})),
      at(9, 30),
    );
    assert_eq!(event.start.date_time, "2025-06-01T15:00:00Z");
    assert_eq!(event.end.date_time, "2025-06-01T16:00:00Z");
  }

  #[test]
  fn explicit_times_are_normalised_to_utc() {
    let event = EventResource::from_details(
      details(json!({
        "summary": "Sync",
        "start_time": "2025-06-01T15:00:00+02:00",
        "end_time": "2025-06-01T15:45:00+02:00",
      })),
      at(9, 30),
    );
    assert_eq!(event.start.date_time, "2025-06-01T13:00:00Z");
    assert_eq!(event.end.date_time, "2025-06-01T13:45:00Z");
  }

  #[test]
  fn naive_times_are_read_as_utc() {
    assert_eq!(parse_instant("2025-03-14T09:30:00").unwrap(), at(9, 30));
    assert_eq!(
      parse_instant("2025-03-14T09:30:00.250").unwrap(),
      at(9, 30) + Duration::milliseconds(250),
    );
    assert!(parse_instant("next tuesday").is_err());
  }

  #[test]
  fn request_id_is_derived_from_start() {
    let a = EventResource::from_details(details(json!({"summary": "A"})), at(9, 30));
    let b = EventResource::from_details(details(json!({"summary": "B"})), at(9, 30));
    let c = EventResource::from_details(details(json!({"summary": "C"})), at(9, 31));
    let id = |e: &EventResource| e.conference_data.create_request.request_id.clone();
    assert_eq!(id(&a), format!("meet-the-bot-{}", at(9, 30).timestamp_millis()));
    assert_eq!(id(&a), id(&b));
    assert_ne!(id(&a), id(&c));
  }

  #[test]
  fn payload_matches_calendar_api_shape() {
    let event = EventResource::from_details(
      details(json!({"summary": "Sync", "description": "weekly"})),
      at(9, 30),
    );
    let value = serde_json::to_value(&event).unwrap();
    assert_eq!(value["summary"], "Sync");
    assert_eq!(value["description"], "weekly");
    assert_eq!(value["start"]["dateTime"], "2025-03-14T09:30:00Z");
    assert_eq!(value["end"]["timeZone"], "UTC");
    assert_eq!(
      value["conferenceData"]["createRequest"]["conferenceSolutionKey"]["type"],
      "hangoutsMeet",
    );
  }

  #[test]
  fn missing_description_is_omitted() {
    let event = EventResource::from_details(details(json!({"summary": "Sync"})), at(9, 30));
    let value = serde_json::to_value(&event).unwrap();
    assert!(value.get("description").is_none());
  }

  #[test]
  fn malformed_start_time_is_rejected() {
    let result: Result<EventDetails, _> =
      serde_json::from_value(json!({"summary": "Sync", "start_time": "soon"}));
    assert!(result.is_err());
  }
}
