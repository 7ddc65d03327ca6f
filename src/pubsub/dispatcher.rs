//! Notification fan-out
//!
//! Best effort only: every callback gets one independent attempt, outcomes
//! are logged and counted but never reported back to the publisher.

use futures::future::join_all;
use serde::Serialize;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use super::{spawn_supervised, HubClient, SubscriptionRegistry};
use crate::metrics;
use crate::models::Notification;

/// Outcome counts of one fan-out
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct DispatchSummary {
    pub attempted: usize,
    pub delivered: usize,
    pub failed: usize,
}

/// Pushes notifications to every callback registered for a topic
#[derive(Debug, Clone)]
pub struct NotificationDispatcher {
    registry: SubscriptionRegistry,
    client: HubClient,
}

impl NotificationDispatcher {
    pub fn new(registry: SubscriptionRegistry, client: HubClient) -> Self {
        Self { registry, client }
    }

    /// Fan out on a background task and return immediately
    pub fn dispatch(
        &self,
        topic: impl Into<String>,
        notification: Notification,
    ) -> JoinHandle<Option<DispatchSummary>> {
        let dispatcher = self.clone();
        let topic = topic.into();
        spawn_supervised("dispatch", async move {
            dispatcher.deliver_all(&topic, &notification).await
        })
    }

    /// Deliver to a snapshot of the current callbacks, concurrently
    pub async fn deliver_all(&self, topic: &str, notification: &Notification) -> DispatchSummary {
        let callbacks = self.registry.list_callbacks(topic);
        if callbacks.is_empty() {
            debug!(topic = %topic, "No subscribers, nothing to deliver");
            return DispatchSummary::default();
        }

        let deliveries = callbacks.iter().map(|callback| async move {
            (callback, self.client.deliver(callback, notification).await)
        });
        let results = join_all(deliveries).await;

        let mut summary = DispatchSummary {
            attempted: results.len(),
            ..Default::default()
        };

        for (callback, result) in results {
            match result {
                Ok(()) => {
                    summary.delivered += 1;
                    metrics::record_delivery(true);
                    debug!(topic = %topic, callback = %callback, "Notification delivered");
                }
                Err(e) => {
                    summary.failed += 1;
                    metrics::record_delivery(false);
                    warn!(topic = %topic, callback = %callback, error = %e, "Notification delivery failed");
                }
            }
        }

        info!(
            topic = %topic,
            attempted = summary.attempted,
            delivered = summary.delivered,
            failed = summary.failed,
            "Dispatch finished"
        );
        summary
    }
}
