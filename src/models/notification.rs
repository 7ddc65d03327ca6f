//! Notification payloads relayed to subscribers

use actix_web::web::Bytes;

/// Media type of LDP notifications
pub const LD_JSON: &str = "application/ld+json";

/// A payload to fan out, shared cheaply across deliveries
#[derive(Debug, Clone)]
pub struct Notification {
    pub body: Bytes,
    pub content_type: String,
}

impl Notification {
    pub fn new(body: impl Into<Bytes>, content_type: impl Into<String>) -> Self {
        Self {
            body: body.into(),
            content_type: content_type.into(),
        }
    }

    /// A JSON-LD notification
    pub fn ld_json(body: impl Into<Bytes>) -> Self {
        Self::new(body, LD_JSON)
    }
}

/// Strip parameters (`; charset=...`) and lowercase a Content-Type value
pub fn media_type(content_type: &str) -> String {
    content_type
        .split(';')
        .next()
        .unwrap_or(content_type)
        .trim()
        .to_ascii_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_media_type_strips_parameters() {
        assert_eq!(media_type("application/ld+json"), LD_JSON);
        assert_eq!(media_type("Application/LD+JSON; charset=utf-8"), LD_JSON);
        assert_eq!(media_type(" application/json "), "application/json");
    }
}
