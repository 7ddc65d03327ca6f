//! LDP inbox relay
//!
//! A publisher posts a notification for `target`; it is only relayed when
//! `target` itself names this hub's inbox for `target`, so the hub cannot be
//! used as an open relay.

use actix_web::web::Bytes;
use serde::Serialize;
use tokio::task::JoinHandle;
use tracing::info;

use super::link_validator::{inbox_requirements, LinkValidator};
use crate::config::Settings;
use crate::metrics;
use crate::models::{media_type, HubError, HubResult, Notification, LD_JSON};
use crate::pubsub::{DispatchSummary, NotificationDispatcher};

/// JSON-LD context of the container description
pub const LDP_CONTEXT: &str = "http://www.w3.org/ns/ldp";

/// Body of `GET /inbox`: an always-empty LDP container
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InboxContainer {
    #[serde(rename = "@context")]
    pub context: String,
    #[serde(rename = "@id")]
    pub id: String,
    pub contains: Vec<String>,
}

impl InboxContainer {
    pub fn empty(id: impl Into<String>) -> Self {
        Self {
            context: LDP_CONTEXT.to_string(),
            id: id.into(),
            contains: Vec::new(),
        }
    }
}

/// Validates relay requests and hands them to the dispatcher
#[derive(Debug, Clone)]
pub struct InboxService {
    inbox_endpoint: String,
    validator: LinkValidator,
    dispatcher: NotificationDispatcher,
}

impl InboxService {
    pub fn new(
        inbox_endpoint: impl Into<String>,
        validator: LinkValidator,
        dispatcher: NotificationDispatcher,
    ) -> Self {
        Self {
            inbox_endpoint: inbox_endpoint.into(),
            validator,
            dispatcher,
        }
    }

    pub fn from_settings(
        settings: &Settings,
        validator: LinkValidator,
        dispatcher: NotificationDispatcher,
    ) -> Self {
        Self::new(settings.hub.inbox_endpoint(), validator, dispatcher)
    }

    /// The inbox URL `target` must advertise. `target` is inserted verbatim.
    pub fn inbox_url(&self, target: &str) -> String {
        format!("{}?target={}", self.inbox_endpoint, target)
    }

    /// Check `target`'s inbox relation points back at this hub
    pub async fn validate_target(&self, target: &str) -> HubResult<()> {
        let inbox_url = self.inbox_url(target);
        self.validator
            .validate(target, &inbox_requirements(&inbox_url))
            .await?;
        Ok(())
    }

    /// Validate a relay request and start fan-out to `target`'s subscribers.
    ///
    /// Any `Err` is a client error and nothing is dispatched.
    pub async fn relay(
        &self,
        target: Option<&str>,
        content_type: Option<&str>,
        body: Bytes,
    ) -> HubResult<JoinHandle<Option<DispatchSummary>>> {
        match self.check_relay(target, content_type, &body).await {
            Ok(target) => {
                info!(relay_target = %target, bytes = body.len(), "Relaying inbox notification");
                Ok(self.dispatcher.dispatch(target, Notification::ld_json(body)))
            }
            Err(e) => {
                metrics::record_relay_rejected();
                info!(relay_target = ?target, error = %e, "Inbox relay rejected");
                Err(e)
            }
        }
    }

    async fn check_relay<'a>(
        &self,
        target: Option<&'a str>,
        content_type: Option<&str>,
        body: &[u8],
    ) -> HubResult<&'a str> {
        let target = require_target(target)?;
        require_ld_json(content_type)?;
        serde_json::from_slice::<serde_json::Value>(body)?;
        self.validate_target(target).await?;
        Ok(target)
    }
}

/// `target` must be present and non-empty
pub fn require_target(target: Option<&str>) -> HubResult<&str> {
    match target {
        Some(t) if !t.trim().is_empty() => Ok(t),
        _ => Err(HubError::malformed("missing target")),
    }
}

/// The request media type must be `application/ld+json`
pub fn require_ld_json(content_type: Option<&str>) -> HubResult<()> {
    let actual = content_type.map(media_type);
    match actual.as_deref() {
        Some(LD_JSON) => Ok(()),
        _ => Err(HubError::InvalidContentType {
            expected: LD_JSON.to_string(),
            actual,
        }),
    }
}
