//! Passive WebSocket logger
//!
//! Accepts connections and logs what clients send. Nothing is relayed.

use actix_web::{web, HttpRequest, HttpResponse};
use actix_ws::Message;
use futures::StreamExt;
use tracing::{debug, info, warn};

/// Upgrade to a WebSocket and log inbound messages until the peer goes away
pub async fn socket(req: HttpRequest, body: web::Payload) -> Result<HttpResponse, actix_web::Error> {
    let (response, mut session, mut stream) = actix_ws::handle(&req, body)?;
    let peer = req
        .connection_info()
        .realip_remote_addr()
        .unwrap_or("unknown")
        .to_string();

    info!(peer = %peer, "Socket connected");

    actix_web::rt::spawn(async move {
        while let Some(message) = stream.next().await {
            match message {
                Ok(Message::Text(text)) => log_message(&peer, &text),
                Ok(Message::Binary(bytes)) => {
                    debug!(peer = %peer, bytes = bytes.len(), "Socket binary message received");
                }
                Ok(Message::Ping(bytes)) => {
                    if session.pong(&bytes).await.is_err() {
                        break;
                    }
                }
                Ok(Message::Close(reason)) => {
                    info!(peer = %peer, reason = ?reason, "Socket closed by peer");
                    let _ = session.close(reason).await;
                    return;
                }
                Ok(_) => {}
                Err(e) => {
                    warn!(peer = %peer, error = %e, "Socket protocol error");
                    break;
                }
            }
        }

        info!(peer = %peer, "Socket disconnected");
        let _ = session.close(None).await;
    });

    Ok(response)
}

fn log_message(peer: &str, text: &str) {
    match serde_json::from_str::<serde_json::Value>(text) {
        Ok(json) => info!(peer = %peer, message = %json, "Socket message received"),
        Err(_) => info!(peer = %peer, message = %text, "Socket message received (not JSON)"),
    }
}
