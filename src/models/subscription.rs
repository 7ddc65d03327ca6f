//! Subscription model and the parsed `/hub` request

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use url::Url;

use super::{HubError, HubResult};

/// A verified subscriber's interest in one topic
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subscription {
    pub topic: String,
    pub callback: String,
    /// Requested validity; stored but never enforced
    pub lease_seconds: u64,
    pub verified_at: DateTime<Utc>,
}

impl Subscription {
    pub fn new(topic: impl Into<String>, callback: impl Into<String>, lease_seconds: u64) -> Self {
        Self {
            topic: topic.into(),
            callback: callback.into(),
            lease_seconds,
            verified_at: Utc::now(),
        }
    }
}

/// `hub.mode` values
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SubscriptionMode {
    Subscribe,
    Unsubscribe,
}

impl SubscriptionMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            SubscriptionMode::Subscribe => "subscribe",
            SubscriptionMode::Unsubscribe => "unsubscribe",
        }
    }
}

impl std::str::FromStr for SubscriptionMode {
    type Err = HubError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "subscribe" => Ok(SubscriptionMode::Subscribe),
            "unsubscribe" => Ok(SubscriptionMode::Unsubscribe),
            other => Err(HubError::malformed(format!("unsupported hub.mode: {}", other))),
        }
    }
}

impl std::fmt::Display for SubscriptionMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A well-formed subscribe/unsubscribe request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubscriptionRequest {
    pub callback: String,
    pub mode: SubscriptionMode,
    pub topic: String,
    pub lease_seconds: u64,
}

impl SubscriptionRequest {
    /// Parse the `hub.*` fields of an urlencoded body.
    ///
    /// Nothing here touches the network; any error is a client error.
    pub fn from_form<'a, I>(fields: I, default_lease_seconds: u64) -> HubResult<Self>
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        let mut callback = None;
        let mut mode = None;
        let mut topic = None;
        let mut lease = None;

        for (key, value) in fields {
            match key {
                "hub.callback" => callback = Some(value),
                "hub.mode" => mode = Some(value),
                "hub.topic" => topic = Some(value),
                "hub.lease_seconds" => lease = Some(value),
                _ => {}
            }
        }

        let callback = required("hub.callback", callback)?;
        let mode: SubscriptionMode = required("hub.mode", mode)?.parse()?;
        let topic = required("hub.topic", topic)?;

        require_http_url("hub.callback", callback)?;
        require_http_url("hub.topic", topic)?;

        let lease_seconds = match lease.map(str::trim).filter(|l| !l.is_empty()) {
            Some(raw) => raw.parse::<u64>().map_err(|_| {
                HubError::malformed(format!("hub.lease_seconds is not a non-negative integer: {}", raw))
            })?,
            None => default_lease_seconds,
        };

        Ok(Self {
            callback: callback.to_string(),
            mode,
            topic: topic.to_string(),
            lease_seconds,
        })
    }
}

fn required<'a>(name: &str, value: Option<&'a str>) -> HubResult<&'a str> {
    match value {
        Some(v) if !v.trim().is_empty() => Ok(v),
        _ => Err(HubError::malformed(format!("missing {}", name))),
    }
}

/// Reject anything that is not an absolute http(s) URL
pub fn require_http_url(name: &str, value: &str) -> HubResult<()> {
    let url = Url::parse(value)
        .map_err(|e| HubError::malformed(format!("{} is not an absolute URL: {}", name, e)))?;
    match url.scheme() {
        "http" | "https" => Ok(()),
        scheme => Err(HubError::malformed(format!(
            "{} must use http or https, got {}",
            name, scheme
        ))),
    }
}
