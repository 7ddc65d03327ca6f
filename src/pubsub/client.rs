//! Outbound HTTP client
//!
//! Every request the hub makes goes through here: link discovery on topics and
//! targets, intent verification against callbacks, and notification delivery.

use reqwest::header::{CONTENT_TYPE, LINK};
use tracing::debug;

use crate::config::ClientSettings;
use crate::models::{
    Challenge, HubError, HubResult, LinkMetadata, LinkValidationError, Notification,
    SubscriptionRequest,
};

/// Thin wrapper over a shared `reqwest::Client` with the hub's timeouts
#[derive(Debug, Clone)]
pub struct HubClient {
    http_client: reqwest::Client,
}

impl HubClient {
    /// Create a client honoring the configured request timeout and user agent
    pub fn new(settings: &ClientSettings) -> HubResult<Self> {
        let http_client = reqwest::Client::builder()
            .timeout(settings.request_timeout())
            .user_agent(settings.user_agent.clone())
            .build()
            .map_err(|e| HubError::ConfigError(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self { http_client })
    }

    /// Fetch `url` and parse its `Link` headers. The body is ignored.
    pub async fn fetch_links(&self, url: &str) -> Result<LinkMetadata, LinkValidationError> {
        let response = self
            .http_client
            .get(url)
            .send()
            .await
            .map_err(|e| LinkValidationError::fetch(url, e))?;

        if !response.status().is_success() {
            return Err(LinkValidationError::fetch(
                url,
                format!("unexpected status {}", response.status()),
            ));
        }

        let values: Vec<&str> = response
            .headers()
            .get_all(LINK)
            .iter()
            .filter_map(|value| value.to_str().ok())
            .collect();

        if values.is_empty() {
            return Err(LinkValidationError::fetch(url, "no Link header"));
        }

        let links = LinkMetadata::parse(values);
        debug!(url = %url, relations = links.len(), "Fetched link metadata");
        Ok(links)
    }

    /// Ask the subscriber to confirm intent by echoing `challenge`
    pub async fn verify_intent(
        &self,
        request: &SubscriptionRequest,
        challenge: &Challenge,
    ) -> HubResult<()> {
        let lease = request.lease_seconds.to_string();

        let response = self
            .http_client
            .get(&request.callback)
            .query(&[
                ("hub.mode", request.mode.as_str()),
                ("hub.topic", request.topic.as_str()),
                ("hub.challenge", challenge.as_str()),
                ("hub.lease_seconds", lease.as_str()),
            ])
            .send()
            .await?;

        if !response.status().is_success() {
            debug!(callback = %request.callback, status = %response.status(), "Callback refused verification");
            return Err(HubError::challenge_mismatch(&request.callback));
        }

        let echoed = response.text().await?;
        if !challenge.matches(&echoed) {
            return Err(HubError::challenge_mismatch(&request.callback));
        }

        Ok(())
    }

    /// POST a notification to one callback
    pub async fn deliver(&self, callback: &str, notification: &Notification) -> HubResult<()> {
        let response = self
            .http_client
            .post(callback)
            .header(CONTENT_TYPE, notification.content_type.as_str())
            .body(notification.body.clone())
            .send()
            .await
            .map_err(|e| HubError::delivery_failed(callback, e))?;

        if !response.status().is_success() {
            return Err(HubError::delivery_failed(
                callback,
                format!("unexpected status {}", response.status()),
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::SubscriptionMode;
    use wiremock::matchers::{header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client() -> HubClient {
        HubClient::new(&ClientSettings::default()).unwrap()
    }

    #[tokio::test]
    async fn test_fetch_links_merges_headers() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/feed"))
            .respond_with(
                ResponseTemplate::new(200)
                    .append_header("Link", "<https://hub.example/hub>; rel=\"hub\"")
                    .append_header("Link", "<https://pub.example/feed>; rel=\"self\""),
            )
            .mount(&server)
            .await;

        let links = client()
            .fetch_links(&format!("{}/feed", server.uri()))
            .await
            .unwrap();

        assert_eq!(links.get("hub"), Some("https://hub.example/hub"));
        assert_eq!(links.get("self"), Some("https://pub.example/feed"));
    }

    #[tokio::test]
    async fn test_fetch_links_without_header_fails() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html></html>"))
            .mount(&server)
            .await;

        let result = client().fetch_links(&server.uri()).await;
        assert!(matches!(result, Err(LinkValidationError::FetchError { .. })));
    }

    #[tokio::test]
    async fn test_fetch_links_error_status_fails() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(
                ResponseTemplate::new(404).insert_header("Link", "<https://hub.example/hub>; rel=\"hub\""),
            )
            .mount(&server)
            .await;

        let result = client().fetch_links(&server.uri()).await;
        assert!(matches!(result, Err(LinkValidationError::FetchError { .. })));
    }

    #[tokio::test]
    async fn test_verify_intent_sends_hub_parameters() {
        let server = MockServer::start().await;
        let challenge = Challenge::generate();
        Mock::given(method("GET"))
            .and(path("/cb"))
            .and(query_param("hub.mode", "subscribe"))
            .and(query_param("hub.topic", "https://pub.example/feed"))
            .and(query_param("hub.challenge", challenge.as_str()))
            .and(query_param("hub.lease_seconds", "7"))
            .respond_with(ResponseTemplate::new(200).set_body_string(challenge.as_str()))
            .expect(1)
            .mount(&server)
            .await;

        let request = SubscriptionRequest {
            callback: format!("{}/cb", server.uri()),
            mode: SubscriptionMode::Subscribe,
            topic: "https://pub.example/feed".to_string(),
            lease_seconds: 7,
        };

        client().verify_intent(&request, &challenge).await.unwrap();
    }

    #[tokio::test]
    async fn test_verify_intent_rejects_wrong_echo() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string("nope"))
            .mount(&server)
            .await;

        let request = SubscriptionRequest {
            callback: format!("{}/cb", server.uri()),
            mode: SubscriptionMode::Unsubscribe,
            topic: "https://pub.example/feed".to_string(),
            lease_seconds: 7,
        };

        let result = client().verify_intent(&request, &Challenge::generate()).await;
        assert!(matches!(result, Err(HubError::ChallengeMismatch { .. })));
    }

    #[tokio::test]
    async fn test_deliver_posts_payload() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/cb"))
            .and(header("content-type", "application/ld+json"))
            .respond_with(ResponseTemplate::new(202))
            .expect(1)
            .mount(&server)
            .await;

        let notification = Notification::ld_json(r#"{"@type":"Announce"}"#);
        client()
            .deliver(&format!("{}/cb", server.uri()), &notification)
            .await
            .unwrap();

        let received = server.received_requests().await.unwrap();
        assert_eq!(received[0].body, br#"{"@type":"Announce"}"#.to_vec());
    }

    #[tokio::test]
    async fn test_deliver_error_status_fails() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let result = client()
            .deliver(&server.uri(), &Notification::ld_json("{}"))
            .await;
        assert!(matches!(result, Err(HubError::DeliveryFailed { .. })));
    }
}
