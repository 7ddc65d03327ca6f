//! End-to-end flows: subscribe, relay, unsubscribe, against mock publishers
//! and subscribers

use std::time::Duration;

use actix_web::web::Bytes;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, Request, Respond, ResponseTemplate};

use notification_hub::config::Settings;
use notification_hub::models::{Notification, SubscriptionMode, SubscriptionRequest, LD_JSON};
use notification_hub::pubsub::{HubClient, NotificationDispatcher, SubscriptionRegistry};
use notification_hub::services::{
    HandshakeState, InboxService, LinkValidator, VerificationConfig, VerificationService,
};

const HUB_URL: &str = "https://hub.example";

struct EchoChallenge;

impl Respond for EchoChallenge {
    fn respond(&self, request: &Request) -> ResponseTemplate {
        let challenge = request
            .url
            .query_pairs()
            .find(|(key, _)| key == "hub.challenge")
            .map(|(_, value)| value.into_owned())
            .unwrap_or_default();
        ResponseTemplate::new(200).set_body_string(challenge)
    }
}

struct Hub {
    registry: SubscriptionRegistry,
    verification: VerificationService,
    inbox: InboxService,
    dispatcher: NotificationDispatcher,
}

fn hub() -> Hub {
    let settings = Settings::for_public_url(HUB_URL);
    let registry = SubscriptionRegistry::new();
    let client = HubClient::new(&settings.client).unwrap();
    let dispatcher = NotificationDispatcher::new(registry.clone(), client.clone());

    Hub {
        verification: VerificationService::new(
            VerificationConfig::from_settings(&settings),
            registry.clone(),
            client.clone(),
        ),
        inbox: InboxService::from_settings(&settings, LinkValidator::new(client), dispatcher.clone()),
        dispatcher,
        registry,
    }
}

/// A resource that is both a WebSub topic and an LDP inbox target on this hub
async fn mount_resource(server: &MockServer) -> String {
    let resource = format!("{}/res", server.uri());
    Mock::given(method("GET"))
        .and(path("/res"))
        .respond_with(ResponseTemplate::new(200).insert_header(
            "Link",
            format!(
                "<{hub}/hub>; rel=\"hub\", <{res}>; rel=\"self\", <{hub}/inbox?target={res}>; rel=\"inbox\"",
                hub = HUB_URL,
                res = resource
            ),
        ))
        .mount(server)
        .await;
    resource
}

fn subscribe(topic: &str, callback: &str) -> SubscriptionRequest {
    SubscriptionRequest {
        callback: callback.to_string(),
        mode: SubscriptionMode::Subscribe,
        topic: topic.to_string(),
        lease_seconds: 7,
    }
}

#[tokio::test]
async fn test_subscribe_then_relay_then_unsubscribe() {
    let server = MockServer::start().await;
    let resource = mount_resource(&server).await;
    Mock::given(method("GET"))
        .and(path("/cb"))
        .respond_with(EchoChallenge)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/cb"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let hub = hub();
    let callback = format!("{}/cb", server.uri());

    let state = hub
        .verification
        .accept(subscribe(&resource, &callback))
        .await
        .unwrap()
        .await
        .unwrap();
    assert_eq!(state, Some(HandshakeState::Confirmed));
    assert!(hub.registry.contains(&resource, &callback));

    let summary = hub
        .inbox
        .relay(Some(&resource), Some(LD_JSON), Bytes::from_static(b"{\"type\":\"Update\"}"))
        .await
        .unwrap()
        .await
        .unwrap()
        .unwrap();
    assert_eq!(summary.delivered, 1);

    let mut unsubscribe = subscribe(&resource, &callback);
    unsubscribe.mode = SubscriptionMode::Unsubscribe;
    let state = hub.verification.accept(unsubscribe).await.unwrap().await.unwrap();
    assert_eq!(state, Some(HandshakeState::Confirmed));
    assert!(hub.registry.is_empty());

    // Nobody left to deliver to; the POST mock still expects exactly one call
    let summary = hub
        .inbox
        .relay(Some(&resource), Some(LD_JSON), Bytes::from_static(b"{}"))
        .await
        .unwrap()
        .await
        .unwrap()
        .unwrap();
    assert_eq!(summary.attempted, 0);
}

#[tokio::test]
async fn test_empty_echo_never_registers() {
    let server = MockServer::start().await;
    let resource = mount_resource(&server).await;
    Mock::given(method("GET"))
        .and(path("/cb"))
        .respond_with(ResponseTemplate::new(200).set_body_string(""))
        .mount(&server)
        .await;

    let hub = hub();
    let callback = format!("{}/cb", server.uri());

    let state = hub
        .verification
        .accept(subscribe(&resource, &callback))
        .await
        .unwrap()
        .await
        .unwrap();

    assert_eq!(state, Some(HandshakeState::Rejected));
    assert!(!hub.registry.contains(&resource, &callback));
}

#[tokio::test]
async fn test_unsubscribe_unknown_pair_leaves_registry_unchanged() {
    let server = MockServer::start().await;
    let resource = mount_resource(&server).await;
    Mock::given(method("GET"))
        .and(path("/cb"))
        .respond_with(EchoChallenge)
        .mount(&server)
        .await;

    let hub = hub();
    hub.registry.put("https://pub.example/feed", "https://sub.example/cb", 7);

    let mut request = subscribe(&resource, &format!("{}/cb", server.uri()));
    request.mode = SubscriptionMode::Unsubscribe;
    let state = hub.verification.complete(request).await;

    assert_eq!(state, HandshakeState::Confirmed);
    assert_eq!(hub.registry.len(), 1);
    assert!(hub.registry.contains("https://pub.example/feed", "https://sub.example/cb"));
}

#[tokio::test]
async fn test_dispatch_makes_one_attempt_per_subscriber() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/down"))
        .respond_with(ResponseTemplate::new(503))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/slow"))
        .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_millis(200)))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/up"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let hub = hub();
    let topic = "https://pub.example/feed";
    for route in ["/down", "/slow", "/up"] {
        hub.registry.put(topic, &format!("{}{}", server.uri(), route), 7);
    }

    let summary = hub
        .dispatcher
        .dispatch(topic, Notification::ld_json("{}"))
        .await
        .unwrap()
        .unwrap();

    assert_eq!(summary.attempted, 3);
    assert_eq!(summary.delivered, 2);
    assert_eq!(summary.failed, 1);
}
