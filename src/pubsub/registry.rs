//! In-process subscription registry
//!
//! Shared by the WebSub and inbox flows: keys are topic or target URLs.

use parking_lot::RwLock;
use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;

use crate::models::Subscription;

type TopicMap = HashMap<String, HashMap<String, Subscription>>;

/// Topic → callback → subscription
#[derive(Debug, Default)]
pub struct SubscriptionRegistry {
    topics: Arc<RwLock<TopicMap>>,
}

impl SubscriptionRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a subscription, overwriting the lease of an existing pair
    pub fn put(&self, topic: &str, callback: &str, lease_seconds: u64) {
        let mut topics = self.topics.write();
        topics
            .entry(topic.to_string())
            .or_default()
            .insert(callback.to_string(), Subscription::new(topic, callback, lease_seconds));
    }

    /// Remove a subscription. Unknown topics and callbacks are a no-op.
    ///
    /// Returns whether a subscription was actually removed.
    pub fn remove(&self, topic: &str, callback: &str) -> bool {
        let mut topics = self.topics.write();
        let Some(callbacks) = topics.get_mut(topic) else {
            return false;
        };

        let removed = callbacks.remove(callback).is_some();
        if callbacks.is_empty() {
            topics.remove(topic);
        }
        removed
    }

    /// Snapshot of the callbacks subscribed to `topic`
    pub fn list_callbacks(&self, topic: &str) -> BTreeSet<String> {
        let topics = self.topics.read();
        topics
            .get(topic)
            .map(|callbacks| callbacks.keys().cloned().collect())
            .unwrap_or_default()
    }

    /// Get a single subscription
    pub fn get(&self, topic: &str, callback: &str) -> Option<Subscription> {
        let topics = self.topics.read();
        topics.get(topic).and_then(|callbacks| callbacks.get(callback)).cloned()
    }

    pub fn contains(&self, topic: &str, callback: &str) -> bool {
        let topics = self.topics.read();
        topics
            .get(topic)
            .is_some_and(|callbacks| callbacks.contains_key(callback))
    }

    /// Total number of subscriptions across all topics
    pub fn len(&self) -> usize {
        let topics = self.topics.read();
        topics.values().map(HashMap::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.topics.read().is_empty()
    }

    /// Number of topics with at least one subscriber
    pub fn topic_count(&self) -> usize {
        self.topics.read().len()
    }
}

impl Clone for SubscriptionRegistry {
    fn clone(&self) -> Self {
        Self {
            topics: Arc::clone(&self.topics),
        }
    }
}
