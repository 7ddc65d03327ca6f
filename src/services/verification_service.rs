//! Subscription verification handshake
//!
//! `RECEIVED → TOPIC_VALIDATING → CHALLENGE_SENT → {CONFIRMED | REJECTED}`
//!
//! Topic validation runs while the subscriber is still waiting for its HTTP
//! response, so a bad topic is answered with 400. Everything after that runs on
//! a background task: the subscriber only ever sees the 202, and a failed
//! callback verification is logged and dropped.

use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use super::link_validator::{topic_requirements, LinkValidator};
use crate::config::Settings;
use crate::metrics;
use crate::models::{Challenge, HubError, HubResult, SubscriptionMode, SubscriptionRequest};
use crate::pubsub::{spawn_supervised, HubClient, SubscriptionRegistry};

/// Handshake states, logged as the attempt progresses
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HandshakeState {
    Received,
    TopicValidating,
    ChallengeSent,
    Confirmed,
    Rejected,
}

impl std::fmt::Display for HandshakeState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            HandshakeState::Received => write!(f, "received"),
            HandshakeState::TopicValidating => write!(f, "topic_validating"),
            HandshakeState::ChallengeSent => write!(f, "challenge_sent"),
            HandshakeState::Confirmed => write!(f, "confirmed"),
            HandshakeState::Rejected => write!(f, "rejected"),
        }
    }
}

/// Verification service configuration
#[derive(Debug, Clone)]
pub struct VerificationConfig {
    /// URL topics must advertise with `rel="hub"`
    pub hub_endpoint: String,
    /// Lease used when `hub.lease_seconds` is omitted
    pub default_lease_seconds: u64,
    /// Upper bound for the background callback verification
    pub verification_timeout: Duration,
}

impl VerificationConfig {
    pub fn from_settings(settings: &Settings) -> Self {
        Self {
            hub_endpoint: settings.hub.hub_endpoint(),
            default_lease_seconds: settings.subscriptions.default_lease_seconds,
            verification_timeout: settings.client.verification_timeout(),
        }
    }
}

/// Runs subscribe/unsubscribe handshakes; the only writer of the registry
#[derive(Debug, Clone)]
pub struct VerificationService {
    config: VerificationConfig,
    registry: SubscriptionRegistry,
    validator: LinkValidator,
    client: HubClient,
}

impl VerificationService {
    pub fn new(config: VerificationConfig, registry: SubscriptionRegistry, client: HubClient) -> Self {
        Self {
            config,
            registry,
            validator: LinkValidator::new(client.clone()),
            client,
        }
    }

    /// Parse `hub.*` form fields (RECEIVED)
    pub fn parse_request<'a, I>(&self, fields: I) -> HubResult<SubscriptionRequest>
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        let request = SubscriptionRequest::from_form(fields, self.config.default_lease_seconds)?;
        debug!(
            state = %HandshakeState::Received,
            mode = %request.mode,
            topic = %request.topic,
            callback = %request.callback,
            "Hub request parsed"
        );
        Ok(request)
    }

    /// Check the topic advertises this hub and itself (TOPIC_VALIDATING)
    pub async fn validate_topic(&self, request: &SubscriptionRequest) -> HubResult<()> {
        let required = topic_requirements(&self.config.hub_endpoint, &request.topic);
        self.validator.validate(&request.topic, &required).await?;
        Ok(())
    }

    /// Validate the topic, then hand callback verification to a background task.
    ///
    /// An `Err` means the request must be answered with a client error. `Ok`
    /// means accepted-for-processing; the handle resolves to the final state
    /// and may be dropped.
    pub async fn accept(
        &self,
        request: SubscriptionRequest,
    ) -> HubResult<JoinHandle<Option<HandshakeState>>> {
        metrics::record_hub_request(request.mode.as_str());
        debug!(
            state = %HandshakeState::TopicValidating,
            mode = %request.mode,
            topic = %request.topic,
            callback = %request.callback,
            "Handshake started"
        );

        if let Err(e) = self.validate_topic(&request).await {
            metrics::record_subscription_rejected("topic");
            info!(
                state = %HandshakeState::Rejected,
                topic = %request.topic,
                error = %e,
                "Topic validation failed"
            );
            return Err(e);
        }

        let service = self.clone();
        Ok(spawn_supervised("verification", async move {
            service.complete(request).await
        }))
    }

    /// Verify intent with the callback and commit on success (CHALLENGE_SENT onwards)
    pub async fn complete(&self, request: SubscriptionRequest) -> HandshakeState {
        let outcome =
            tokio::time::timeout(self.config.verification_timeout, self.verify_and_commit(&request))
                .await
                .unwrap_or_else(|_| {
                    Err(HubError::VerificationTimeout {
                        callback: request.callback.clone(),
                    })
                });

        match outcome {
            Ok(()) => {
                metrics::record_subscription_confirmed();
                info!(
                    state = %HandshakeState::Confirmed,
                    mode = %request.mode,
                    topic = %request.topic,
                    callback = %request.callback,
                    "Handshake confirmed"
                );
                HandshakeState::Confirmed
            }
            Err(e) => {
                metrics::record_subscription_rejected("callback");
                warn!(
                    state = %HandshakeState::Rejected,
                    mode = %request.mode,
                    topic = %request.topic,
                    callback = %request.callback,
                    error = %e,
                    "Handshake discarded"
                );
                HandshakeState::Rejected
            }
        }
    }

    async fn verify_and_commit(&self, request: &SubscriptionRequest) -> HubResult<()> {
        let challenge = Challenge::generate();
        debug!(state = %HandshakeState::ChallengeSent, callback = %request.callback, "Verifying intent");

        self.client.verify_intent(request, &challenge).await?;
        self.commit(request);
        Ok(())
    }

    fn commit(&self, request: &SubscriptionRequest) {
        match request.mode {
            SubscriptionMode::Subscribe => {
                self.registry
                    .put(&request.topic, &request.callback, request.lease_seconds);
            }
            SubscriptionMode::Unsubscribe => {
                if !self.registry.remove(&request.topic, &request.callback) {
                    debug!(topic = %request.topic, callback = %request.callback, "Unsubscribe of unknown subscription");
                }
            }
        }
        metrics::set_active_subscriptions(self.registry.len());
    }
}
