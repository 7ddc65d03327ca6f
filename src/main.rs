//! Notification Hub - Main Entry Point
//!
//! Starts the HTTP server for the WebSub hub and LDP inbox relay.

use actix_web::{middleware, web, App, HttpServer};
use anyhow::Context;
use tracing::info;
use tracing_actix_web::TracingLogger;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use notification_hub::api::{configure_routes, ApiState, AppState};
use notification_hub::config::Settings;
use notification_hub::metrics::{init_metrics, metrics_endpoint};
use notification_hub::pubsub::SubscriptionRegistry;

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    // RUST_LOG overrides; default is info for the hub, warn for everything else
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("warn,notification_hub=info"));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer()
            .with_target(true)
            .with_thread_ids(true)
            .with_file(true)
            .with_line_number(true))
        .init();

    let settings = Settings::load().unwrap_or_else(|e| {
        tracing::warn!("Failed to load config: {}, using defaults", e);
        Settings::for_public_url("http://localhost:3000")
    });

    info!(
        "Starting Notification Hub v{} ({})",
        env!("CARGO_PKG_VERSION"),
        settings.hub.hub_id
    );
    info!("Hub endpoint: {}", settings.hub.hub_endpoint());
    info!("Inbox endpoint: {}", settings.hub.inbox_endpoint());

    if settings.metrics.enabled {
        init_metrics();
    }

    // One registry for the whole process, shared by handshake, dispatcher and health
    let registry = SubscriptionRegistry::new();

    let app_state = AppState::new(&settings.hub.hub_id, registry.clone());
    let api_state = ApiState::new(&settings, registry)
        .context("Failed to initialize hub services")?;

    let metrics = settings.metrics.clone();
    let http_addr = format!("{}:{}", settings.server.host, settings.server.http_port);
    info!("Starting HTTP server on {}", http_addr);

    HttpServer::new(move || {
        let metrics = metrics.clone();
        App::new()
            .app_data(web::Data::new(app_state.clone()))
            .app_data(web::Data::new(api_state.clone()))
            .wrap(TracingLogger::default())
            .wrap(middleware::Compress::default())
            .configure(configure_routes)
            .configure(move |cfg| {
                if metrics.enabled {
                    cfg.route(&metrics.path, web::get().to(metrics_endpoint));
                }
            })
    })
    .workers(settings.server.workers)
    .bind(&http_addr)
    .with_context(|| format!("Failed to bind {}", http_addr))?
    .run()
    .await
    .context("HTTP server error")?;

    Ok(())
}
