use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// The body POSTed to every subscriber.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Envelope {
  /// Configured wire name of the event.
  pub event:     String,
  /// ISO-8601 UTC with millisecond precision, e.g. `2026-03-01T09:00:00.000Z`.
  pub timestamp: String,
  pub data:      Value,
}

impl Envelope {
  pub fn new(event: impl Into<String>, data: Value) -> Self { Self::at(event, data, Utc::now()) }

  pub fn at(event: impl Into<String>, data: Value, at: DateTime<Utc>) -> Self {
    Self {
      event: event.into(),
      timestamp: at.to_rfc3339_opts(SecondsFormat::Millis, true),
      data,
    }
  }
}
