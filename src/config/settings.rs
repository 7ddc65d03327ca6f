//! Hub configuration settings

use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

/// Environment variable naming an alternative config file (without extension)
pub const CONFIG_PATH_ENV: &str = "NOTIFICATION_HUB_CONFIG";

/// Main hub configuration
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub hub: HubSettings,
    pub server: ServerSettings,
    pub client: ClientSettings,
    pub subscriptions: SubscriptionSettings,
    pub metrics: MetricsSettings,
}

/// Hub identity settings
#[derive(Debug, Clone, Deserialize)]
pub struct HubSettings {
    /// Unique hub identifier (UUID)
    pub hub_id: String,
    /// Public base URL; topics and targets must link back to endpoints under it
    pub public_url: String,
}

impl HubSettings {
    /// The WebSub endpoint topics must advertise with `rel="hub"`
    pub fn hub_endpoint(&self) -> String {
        format!("{}/hub", self.public_url.trim_end_matches('/'))
    }

    /// The inbox endpoint, without the `target` query
    pub fn inbox_endpoint(&self) -> String {
        format!("{}/inbox", self.public_url.trim_end_matches('/'))
    }
}

/// Server settings
#[derive(Debug, Clone, Deserialize)]
pub struct ServerSettings {
    /// HTTP server host
    #[serde(default = "default_host")]
    pub host: String,
    /// HTTP server port
    #[serde(default = "default_http_port")]
    pub http_port: u16,
    /// Number of worker threads
    #[serde(default = "default_workers")]
    pub workers: usize,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_http_port() -> u16 {
    3000
}

fn default_workers() -> usize {
    num_cpus::get()
}

/// Outbound HTTP client settings
#[derive(Debug, Clone, Deserialize)]
pub struct ClientSettings {
    /// Timeout for a single outbound request (link fetch, verification, delivery)
    #[serde(default = "default_request_timeout")]
    pub request_timeout_sec: u64,
    /// Upper bound for a whole background verification
    #[serde(default = "default_verification_timeout")]
    pub verification_timeout_sec: u64,
    /// User-Agent sent on outbound requests
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

impl ClientSettings {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_sec)
    }

    pub fn verification_timeout(&self) -> Duration {
        Duration::from_secs(self.verification_timeout_sec)
    }
}

fn default_request_timeout() -> u64 {
    10
}

fn default_verification_timeout() -> u64 {
    30
}

fn default_user_agent() -> String {
    format!("notification-hub/{}", env!("CARGO_PKG_VERSION"))
}

impl Default for ClientSettings {
    fn default() -> Self {
        ClientSettings {
            request_timeout_sec: default_request_timeout(),
            verification_timeout_sec: default_verification_timeout(),
            user_agent: default_user_agent(),
        }
    }
}

/// Subscription settings
#[derive(Debug, Clone, Deserialize)]
pub struct SubscriptionSettings {
    /// Lease recorded when a subscriber omits `hub.lease_seconds`
    #[serde(default = "default_lease_seconds")]
    pub default_lease_seconds: u64,
}

fn default_lease_seconds() -> u64 {
    7
}

/// Metrics settings
#[derive(Debug, Clone, Deserialize)]
pub struct MetricsSettings {
    /// Enable Prometheus metrics
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Metrics endpoint path
    #[serde(default = "default_metrics_path")]
    pub path: String,
}

fn default_true() -> bool {
    true
}

fn default_metrics_path() -> String {
    "/metrics".to_string()
}

impl Settings {
    /// Load settings from file and environment
    pub fn load() -> Result<Self, ConfigError> {
        let path = std::env::var(CONFIG_PATH_ENV).unwrap_or_else(|_| "config".to_string());
        Self::load_from(path)
    }

    /// Load settings from a specific config file path (without extension)
    pub fn load_from<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let config_path = path.as_ref();

        let builder = Config::builder()
            .set_default("hub.hub_id", uuid::Uuid::new_v4().to_string())?
            .set_default("hub.public_url", "http://localhost:3000")?
            .set_default("server.host", default_host())?
            .set_default("server.http_port", default_http_port() as i64)?
            .set_default("server.workers", default_workers() as i64)?
            .set_default("client.request_timeout_sec", default_request_timeout() as i64)?
            .set_default("client.verification_timeout_sec", default_verification_timeout() as i64)?
            .set_default("client.user_agent", default_user_agent())?
            .set_default("subscriptions.default_lease_seconds", default_lease_seconds() as i64)?
            .set_default("metrics.enabled", true)?
            .set_default("metrics.path", default_metrics_path())?
            .add_source(File::with_name(config_path.to_str().unwrap_or("config")).required(false))
            // NOTIFICATION_HUB__HUB__PUBLIC_URL and friends
            .add_source(Environment::with_prefix("NOTIFICATION_HUB").separator("__"));

        builder.build()?.try_deserialize()
    }

    /// Settings for a hub reachable at `public_url`, everything else defaulted
    pub fn for_public_url(public_url: impl Into<String>) -> Self {
        Settings {
            hub: HubSettings {
                hub_id: uuid::Uuid::new_v4().to_string(),
                public_url: public_url.into(),
            },
            server: ServerSettings {
                host: default_host(),
                http_port: default_http_port(),
                workers: default_workers(),
            },
            client: ClientSettings::default(),
            subscriptions: SubscriptionSettings {
                default_lease_seconds: default_lease_seconds(),
            },
            metrics: MetricsSettings {
                enabled: true,
                path: default_metrics_path(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_settings() {
        let settings = Settings::for_public_url("http://localhost:3000");
        assert_eq!(settings.server.http_port, 3000);
        assert_eq!(settings.subscriptions.default_lease_seconds, 7);
        assert_eq!(settings.client.request_timeout_sec, 10);
        assert!(settings.metrics.enabled);
    }

    #[test]
    fn test_endpoints_ignore_trailing_slash() {
        let settings = Settings::for_public_url("https://hub.example/");
        assert_eq!(settings.hub.hub_endpoint(), "https://hub.example/hub");
        assert_eq!(settings.hub.inbox_endpoint(), "https://hub.example/inbox");
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("hub.toml");
        let mut file = std::fs::File::create(&path).unwrap();
        writeln!(
            file,
            "[hub]\npublic_url = \"https://hub.example\"\n\n[subscriptions]\ndefault_lease_seconds = 3600"
        )
        .unwrap();

        let settings = Settings::load_from(dir.path().join("hub")).unwrap();
        assert_eq!(settings.hub.public_url, "https://hub.example");
        assert_eq!(settings.subscriptions.default_lease_seconds, 3600);
        assert_eq!(settings.server.http_port, 3000);
    }
}
