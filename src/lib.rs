//! Notification Hub - WebSub hub and LDP inbox relay
//!
//! - Subscription verification handshake (`POST /hub`)
//! - In-process subscription registry
//! - Inbox relay with link-header ownership checks (`/inbox`)
//! - Best-effort notification fan-out to verified subscribers

pub mod api;
pub mod config;
pub mod metrics;
pub mod models;
pub mod pubsub;
pub mod services;

// Re-export commonly used types
pub use config::Settings;
pub use models::{HubError, HubResult, LinkMetadata, Subscription, SubscriptionRequest};
pub use pubsub::{HubClient, NotificationDispatcher, SubscriptionRegistry};
pub use services::{InboxService, LinkValidator, VerificationService};

/// Version of the notification-hub
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
