use std::{sync::Arc, time::Duration};

use bytes::Bytes;
use pantry_core::webhook::{EventNames, WebhookEvent, WebhookSource};
use reqwest::{Client, RequestBuilder, header::CONTENT_TYPE};
use serde::Serialize;
use tokio::task::{JoinHandle, JoinSet};

use crate::Envelope;

/// Deadline of a single delivery attempt.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

/// Outcome of one dispatch cycle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CycleReport {
  pub attempted: usize,
  pub delivered: usize,
  pub failed:    usize,
}

/// Fans events out to their webhook subscribers.
///
/// Cheap to clone: the source is shared and the inner [`reqwest::Client`]
/// is `Arc`-based.
pub struct Dispatcher<S> {
  source:  Arc<S>,
  client:  Client,
  timeout: Duration,
  names:   EventNames,
}

impl<S> Clone for Dispatcher<S> {
  fn clone(&self) -> Self {
    Self {
      source:  Arc::clone(&self.source),
      client:  self.client.clone(),
      timeout: self.timeout,
      names:   self.names.clone(),
    }
  }
}

impl<S> Dispatcher<S>
where
  S: WebhookSource + 'static,
{
  pub fn new(source: Arc<S>) -> Self {
    Self {
      source,
      client: Client::new(),
      timeout: DEFAULT_TIMEOUT,
      names: EventNames::default(),
    }
  }

  pub fn with_client(mut self, client: Client) -> Self {
    self.client = client;
    self
  }

  pub fn with_timeout(mut self, timeout: Duration) -> Self {
    self.timeout = timeout;
    self
  }

  pub fn with_event_names(mut self, names: EventNames) -> Self {
    self.names = names;
    self
  }

  pub fn event_names(&self) -> &EventNames { &self.names }

  /// Start a cycle in the background and return at once.
  ///
  /// The handle may be dropped; the cycle keeps running. `None` means `data`
  /// could not be serialized and nothing was sent.
  pub fn dispatch<T: Serialize>(
    &self,
    event: WebhookEvent,
    data: &T,
  ) -> Option<JoinHandle<CycleReport>> {
    let data = match serde_json::to_value(data) {
      Ok(data) => data,
      Err(e) => {
        tracing::warn!(event = self.names.name(event), error = %e, "webhook payload not serializable");
        return None;
      }
    };

    let this = self.clone();
    Some(tokio::spawn(async move { this.run_cycle(event, data).await }))
  }

  /// Run one cycle inline: look up subscribers, POST to each of them
  /// concurrently and wait for every attempt to settle.
  pub async fn run_cycle(&self, event: WebhookEvent, data: serde_json::Value) -> CycleReport {
    let name = self.names.name(event);

    let subscribers = match self.source.active_webhooks(name).await {
      Ok(subscribers) => subscribers,
      Err(e) => {
        tracing::warn!(event = name, error = %e, "could not load webhook subscribers");
        return CycleReport::default();
      }
    };
    if subscribers.is_empty() {
      tracing::debug!(event = name, "no webhook subscribers");
      return CycleReport::default();
    }

    let envelope = Envelope::new(name, data);
    let body = match serde_json::to_vec(&envelope) {
      Ok(body) => Bytes::from(body),
      Err(e) => {
        tracing::warn!(event = name, error = %e, "could not encode webhook envelope");
        return CycleReport::default();
      }
    };

    let mut attempts = JoinSet::new();
    for subscriber in subscribers {
      let request = self
        .client
        .post(&subscriber.url)
        .header(CONTENT_TYPE, "application/json")
        .timeout(self.timeout)
        .body(body.clone());
      attempts.spawn(deliver(request, subscriber.url));
    }

    let mut report = CycleReport { attempted: attempts.len(), ..Default::default() };
    while let Some(joined) = attempts.join_next().await {
      match joined {
        Ok(true) => report.delivered += 1,
        Ok(false) => report.failed += 1,
        Err(e) => {
          tracing::warn!(event = name, error = %e, "webhook delivery task aborted");
          report.failed += 1;
        }
      }
    }

    tracing::info!(
      event = name,
      attempted = report.attempted,
      delivered = report.delivered,
      failed = report.failed,
      "webhook cycle finished"
    );
    report
  }
}

async fn deliver(request: RequestBuilder, url: String) -> bool {
  match request.send().await.and_then(|resp| resp.error_for_status()) {
    Ok(resp) => {
      tracing::debug!(%url, status = %resp.status(), "webhook delivered");
      true
    }
    Err(e) => {
      tracing::warn!(%url, timed_out = e.is_timeout(), error = %e, "webhook delivery failed");
      false
    }
  }
}
