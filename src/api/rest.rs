//! REST API endpoints using Actix-Web
//!
//! `POST /hub` for WebSub subscriptions, `GET|POST /inbox` for the LDP relay.

use actix_web::http::header;
use actix_web::{web, HttpRequest, HttpResponse};
use serde::Deserialize;
use std::sync::Arc;
use url::form_urlencoded;

use crate::config::Settings;
use crate::models::{media_type, HubError, HubResult};
use crate::pubsub::{HubClient, NotificationDispatcher, SubscriptionRegistry};
use crate::services::{
    require_target, InboxContainer, InboxService, LinkValidator, VerificationConfig,
    VerificationService,
};

use super::health::configure_health_routes;
use super::socket::socket;

const FORM_URLENCODED: &str = "application/x-www-form-urlencoded";

/// Shared application state
#[derive(Clone)]
pub struct ApiState {
    pub verification_service: Arc<VerificationService>,
    pub inbox_service: Arc<InboxService>,
}

impl ApiState {
    /// Wire the services around one registry and one outbound client
    pub fn new(settings: &Settings, registry: SubscriptionRegistry) -> HubResult<Self> {
        let client = HubClient::new(&settings.client)?;

        let verification_service = Arc::new(VerificationService::new(
            VerificationConfig::from_settings(settings),
            registry.clone(),
            client.clone(),
        ));

        let dispatcher = NotificationDispatcher::new(registry, client.clone());
        let inbox_service = Arc::new(InboxService::from_settings(
            settings,
            LinkValidator::new(client),
            dispatcher,
        ));

        Ok(Self {
            verification_service,
            inbox_service,
        })
    }
}

/// Configure all routes
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    configure_health_routes(cfg);

    cfg.route("/hub", web::post().to(hub))
        .service(
            web::resource("/inbox")
                .route(web::get().to(get_inbox))
                .route(web::post().to(post_inbox)),
        )
        .route("/ws", web::get().to(socket));
}

fn content_type(req: &HttpRequest) -> Option<&str> {
    req.headers()
        .get(header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
}

fn to_actix_error(error: HubError) -> actix_web::Error {
    actix_web::error::InternalError::from_response(error.to_string(), HttpResponse::from(error))
        .into()
}

// ============================================================================
// WebSub Hub
// ============================================================================

async fn hub(
    state: web::Data<ApiState>,
    req: HttpRequest,
    body: web::Bytes,
) -> Result<HttpResponse, actix_web::Error> {
    let actual = content_type(&req).map(media_type);
    if actual.as_deref() != Some(FORM_URLENCODED) {
        return Err(to_actix_error(HubError::InvalidContentType {
            expected: FORM_URLENCODED.to_string(),
            actual,
        }));
    }

    let fields: Vec<(String, String)> = form_urlencoded::parse(&body).into_owned().collect();
    let request = state
        .verification_service
        .parse_request(fields.iter().map(|(key, value)| (key.as_str(), value.as_str())))
        .map_err(to_actix_error)?;

    state
        .verification_service
        .accept(request)
        .await
        .map_err(to_actix_error)?;

    Ok(HttpResponse::Accepted().finish())
}

// ============================================================================
// LDP Inbox
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct InboxQuery {
    pub target: Option<String>,
}

async fn get_inbox(
    req: HttpRequest,
    query: web::Query<InboxQuery>,
) -> Result<HttpResponse, actix_web::Error> {
    require_target(query.target.as_deref()).map_err(to_actix_error)?;

    let id = {
        let info = req.connection_info();
        format!("{}://{}{}", info.scheme(), info.host(), req.uri())
    };

    Ok(HttpResponse::Ok().json(InboxContainer::empty(id)))
}

async fn post_inbox(
    state: web::Data<ApiState>,
    req: HttpRequest,
    query: web::Query<InboxQuery>,
    body: web::Bytes,
) -> Result<HttpResponse, actix_web::Error> {
    state
        .inbox_service
        .relay(query.target.as_deref(), content_type(&req), body)
        .await
        .map_err(to_actix_error)?;

    Ok(HttpResponse::Accepted().finish())
}
