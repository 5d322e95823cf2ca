//! Webhook subscriber configuration and the event vocabulary.
//!
//! The strings identifying each event on the wire (and in the
//! `webhook_configs.event_type` column) are deployment configuration, held in
//! [`EventNames`]. Code refers to events only through [`WebhookEvent`].

use std::future::Future;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{Classify, Error, Result, validate::is_valid_url};

/// Business events that subscribers can be notified about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WebhookEvent {
  /// New stock was registered.
  DonationReceived,
  /// Stock was handed over to a beneficiary.
  DonationDelivered,
}

/// Wire names of each [`WebhookEvent`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventNames {
  pub received:  String,
  pub delivered: String,
}

impl Default for EventNames {
  fn default() -> Self {
    Self {
      received:  "donation_received".to_owned(),
      delivered: "donation_delivered".to_owned(),
    }
  }
}

impl EventNames {
  pub fn name(&self, event: WebhookEvent) -> &str {
    match event {
      WebhookEvent::DonationReceived => &self.received,
      WebhookEvent::DonationDelivered => &self.delivered,
    }
  }

  /// Reverse lookup of a wire name; `None` if it is not configured.
  pub fn parse(&self, name: &str) -> Option<WebhookEvent> {
    if name == self.received {
      Some(WebhookEvent::DonationReceived)
    } else if name == self.delivered {
      Some(WebhookEvent::DonationDelivered)
    } else {
      None
    }
  }
}

/// A subscriber registration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WebhookConfig {
  pub id:         Uuid,
  /// Wire name of the event, see [`EventNames`].
  pub event_type: String,
  pub url:        String,
  pub active:     bool,
  pub created_at: DateTime<Utc>,
  pub created_by: Uuid,
}

/// Input to [`crate::store::PantryStore::create_webhook`].
#[derive(Debug, Clone)]
pub struct NewWebhookConfig {
  pub event_type: String,
  pub url:        String,
  pub active:     bool,
  pub created_by: Uuid,
}

impl NewWebhookConfig {
  pub fn validate(&self) -> Result<()> {
    if !is_valid_url(&self.url) {
      return Err(Error::InvalidUrl(self.url.clone()));
    }
    Ok(())
  }
}

/// Read side consumed by the dispatcher: the active subscribers of one event.
pub trait WebhookSource: Send + Sync {
  type Error: std::error::Error + Classify + Send + Sync + 'static;

  fn active_webhooks<'a>(
    &'a self,
    event_type: &'a str,
  ) -> impl Future<Output = Result<Vec<WebhookConfig>, Self::Error>> + Send + 'a;
}
