//! Common API response types

use actix_web::{http::StatusCode, HttpResponse};
use serde::Serialize;

use crate::models::HubError;

/// Standard API response wrapper
#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<T: Serialize> ApiResponse<T> {
    /// Create a success response
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    /// Create an error response
    pub fn error(message: impl Into<String>) -> ApiResponse<()> {
        ApiResponse {
            success: false,
            data: None,
            error: Some(message.into()),
        }
    }
}

/// Status code a `HubError` is answered with
pub fn status_for(error: &HubError) -> StatusCode {
    match error {
        HubError::MalformedRequest(_)
        | HubError::InvalidContentType { .. }
        | HubError::LinkValidation(_)
        | HubError::SerializationError(_)
        | HubError::ChallengeMismatch { .. } => StatusCode::BAD_REQUEST,
        HubError::VerificationTimeout { .. } => StatusCode::GATEWAY_TIMEOUT,
        HubError::DeliveryFailed { .. } | HubError::NetworkError(_) => StatusCode::BAD_GATEWAY,
        HubError::ConfigError(_) | HubError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

/// Convert HubError to HTTP response
impl From<HubError> for HttpResponse {
    fn from(error: HubError) -> Self {
        HttpResponse::build(status_for(&error)).json(ApiResponse::<()>::error(error.to_string()))
    }
}
