//! Prometheus metrics integration

use actix_web::HttpResponse;
use once_cell::sync::Lazy;
use prometheus::{
    opts, register_int_counter, register_int_counter_vec, register_int_gauge, Encoder, IntCounter,
    IntCounterVec, IntGauge, TextEncoder,
};

static HUB_REQUESTS_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    register_int_counter_vec!(
        opts!("hub_requests_total", "Well-formed subscribe/unsubscribe requests, by mode"),
        &["mode"]
    )
    .expect("Failed to create hub requests counter")
});

static SUBSCRIPTIONS_CONFIRMED_TOTAL: Lazy<IntCounter> = Lazy::new(|| {
    register_int_counter!(opts!(
        "subscriptions_confirmed_total",
        "Handshakes confirmed by the callback"
    ))
    .expect("Failed to create confirmed subscriptions counter")
});

static SUBSCRIPTIONS_REJECTED_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    register_int_counter_vec!(
        opts!("subscriptions_rejected_total", "Handshakes rejected, by stage"),
        &["stage"]
    )
    .expect("Failed to create rejected subscriptions counter")
});

static ACTIVE_SUBSCRIPTIONS: Lazy<IntGauge> = Lazy::new(|| {
    register_int_gauge!(opts!(
        "active_subscriptions",
        "Subscriptions currently held in the registry"
    ))
    .expect("Failed to create active subscriptions gauge")
});

static NOTIFICATIONS_DELIVERED_TOTAL: Lazy<IntCounter> = Lazy::new(|| {
    register_int_counter!(opts!(
        "notifications_delivered_total",
        "Notifications accepted by a subscriber callback"
    ))
    .expect("Failed to create delivered notifications counter")
});

static NOTIFICATIONS_FAILED_TOTAL: Lazy<IntCounter> = Lazy::new(|| {
    register_int_counter!(opts!(
        "notifications_failed_total",
        "Notification deliveries that errored or got a non-2xx answer"
    ))
    .expect("Failed to create failed notifications counter")
});

static RELAY_REJECTED_TOTAL: Lazy<IntCounter> = Lazy::new(|| {
    register_int_counter!(opts!(
        "relay_rejected_total",
        "Inbox relay requests rejected before dispatch"
    ))
    .expect("Failed to create relay rejected counter")
});

/// Initialize all metrics
pub fn init_metrics() {
    Lazy::force(&HUB_REQUESTS_TOTAL);
    Lazy::force(&SUBSCRIPTIONS_CONFIRMED_TOTAL);
    Lazy::force(&SUBSCRIPTIONS_REJECTED_TOTAL);
    Lazy::force(&ACTIVE_SUBSCRIPTIONS);
    Lazy::force(&NOTIFICATIONS_DELIVERED_TOTAL);
    Lazy::force(&NOTIFICATIONS_FAILED_TOTAL);
    Lazy::force(&RELAY_REJECTED_TOTAL);
}

/// Record a parsed `/hub` request, before its topic is validated
pub fn record_hub_request(mode: &str) {
    HUB_REQUESTS_TOTAL.with_label_values(&[mode]).inc();
}

/// Record a confirmed handshake
pub fn record_subscription_confirmed() {
    SUBSCRIPTIONS_CONFIRMED_TOTAL.inc();
}

/// Record a rejected handshake; `stage` is `topic` or `callback`
pub fn record_subscription_rejected(stage: &str) {
    SUBSCRIPTIONS_REJECTED_TOTAL.with_label_values(&[stage]).inc();
}

/// Set the registry size
pub fn set_active_subscriptions(count: usize) {
    ACTIVE_SUBSCRIPTIONS.set(count as i64);
}

/// Record one delivery attempt
pub fn record_delivery(delivered: bool) {
    if delivered {
        NOTIFICATIONS_DELIVERED_TOTAL.inc();
    } else {
        NOTIFICATIONS_FAILED_TOTAL.inc();
    }
}

/// Record a refused inbox relay
pub fn record_relay_rejected() {
    RELAY_REJECTED_TOTAL.inc();
}

/// Prometheus metrics endpoint
pub async fn metrics_endpoint() -> HttpResponse {
    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();

    let mut buffer = Vec::new();
    if let Err(e) = encoder.encode(&metric_families, &mut buffer) {
        return HttpResponse::InternalServerError().body(format!("Failed to encode metrics: {}", e));
    }

    HttpResponse::Ok()
        .content_type("text/plain; version=0.0.4; charset=utf-8")
        .body(buffer)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metrics_initialization() {
        init_metrics();

        record_hub_request("subscribe");
        record_subscription_confirmed();
        record_subscription_rejected("callback");
        set_active_subscriptions(3);
        record_relay_rejected();

        let delivered = NOTIFICATIONS_DELIVERED_TOTAL.get();
        let failed = NOTIFICATIONS_FAILED_TOTAL.get();
        record_delivery(true);
        record_delivery(false);
        assert!(NOTIFICATIONS_DELIVERED_TOTAL.get() > delivered);
        assert!(NOTIFICATIONS_FAILED_TOTAL.get() > failed);

        let names: Vec<String> = prometheus::gather()
            .iter()
            .map(|family| family.get_name().to_string())
            .collect();
        assert!(names.iter().any(|n| n == "notifications_delivered_total"));
        assert!(names.iter().any(|n| n == "notifications_failed_total"));
    }

    #[actix_rt::test]
    async fn test_metrics_endpoint_renders_text() {
        init_metrics();
        record_subscription_confirmed();

        let response = metrics_endpoint().await;
        assert!(response.status().is_success());
    }
}
