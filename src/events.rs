//! Best-effort NATS event publishing
//!
//! The client is optional (no NATS_URL means no-op) and a broker outage
//! never fails the request that produced the event.

use serde::Serialize;

#[derive(Clone)]
pub struct EventPublisher {
    client: Option<async_nats::Client>,
}

impl EventPublisher {
    pub fn new(client: Option<async_nats::Client>) -> Self {
        Self { client }
    }

    pub fn disabled() -> Self {
        Self { client: None }
    }

    pub async fn publish<T: Serialize>(&self, subject: &str, payload: &T) {
        let Some(client) = &self.client else { return };
        let bytes = match serde_json::to_vec(payload) {
            Ok(b) => b,
            Err(e) => {
                tracing::warn!(subject, error = %e, "could not serialize event payload");
                return;
            }
        };
        if let Err(e) = client.publish(subject.to_string(), bytes.into()).await {
            tracing::warn!(subject, error = %e, "event publish failed");
        }
    }
}
