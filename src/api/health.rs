//! Health check endpoints

use actix_web::{get, web, HttpResponse};
use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::pubsub::SubscriptionRegistry;

/// Health check response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub hub_id: String,
    pub timestamp: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub uptime_seconds: Option<f64>,
    pub subscriptions: usize,
    pub topics: usize,
}

impl HealthResponse {
    pub fn healthy(hub_id: &str, version: &str, registry: &SubscriptionRegistry) -> Self {
        Self {
            status: "healthy".to_string(),
            version: version.to_string(),
            hub_id: hub_id.to_string(),
            timestamp: Utc::now(),
            uptime_seconds: None,
            subscriptions: registry.len(),
            topics: registry.topic_count(),
        }
    }

    pub fn with_uptime(mut self, uptime: f64) -> Self {
        self.uptime_seconds = Some(uptime);
        self
    }
}

/// Process-level state for the health endpoints
#[derive(Clone)]
pub struct AppState {
    pub hub_id: String,
    pub version: String,
    pub start_time: DateTime<Utc>,
    pub registry: SubscriptionRegistry,
}

impl AppState {
    pub fn new(hub_id: impl Into<String>, registry: SubscriptionRegistry) -> Self {
        Self {
            hub_id: hub_id.into(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            start_time: Utc::now(),
            registry,
        }
    }

    pub fn uptime_seconds(&self) -> f64 {
        let duration = Utc::now().signed_duration_since(self.start_time);
        duration.num_milliseconds() as f64 / 1000.0
    }
}

/// Health check endpoint
#[get("/health")]
pub async fn health_check(state: web::Data<AppState>) -> HttpResponse {
    let response = HealthResponse::healthy(&state.hub_id, &state.version, &state.registry)
        .with_uptime(state.uptime_seconds());

    HttpResponse::Ok().json(response)
}

/// Readiness check endpoint. The registry is in memory, so ready once serving.
#[get("/ready")]
pub async fn readiness_check(state: web::Data<AppState>) -> HttpResponse {
    let response = HealthResponse::healthy(&state.hub_id, &state.version, &state.registry);
    HttpResponse::Ok().json(response)
}

/// Liveness check endpoint
#[get("/live")]
pub async fn liveness_check() -> HttpResponse {
    HttpResponse::Ok().json(serde_json::json!({
        "status": "alive"
    }))
}

/// Configure health routes
pub fn configure_health_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(health_check)
        .service(readiness_check)
        .service(liveness_check);
}
