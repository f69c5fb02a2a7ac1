//! Error kinds surfaced by the dispatcher.
//!
//! Only kinds implementing [`ErrorResponse`] are turned into HTTP responses.
//! Everything else is an unhandled fault and is handed back to the hosting
//! layer untouched.

use axum::{
    http::{Method, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde_json::{Map, Value};
use thiserror::Error;

use crate::portainer::FetchError;

/// Status returned when a request carries no API key.
pub const MISSING_API_KEY_STATUS: StatusCode = StatusCode::UNAUTHORIZED;

/// Status returned when no route matches.
pub const NO_ROUTE_STATUS: StatusCode = StatusCode::NOT_FOUND;

/// Boxed error for faults that have no designed response.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Capability shared by error kinds that know their own HTTP response.
pub trait ErrorResponse {
    fn to_response(&self) -> Response;
}

/// A client-facing error with a stable status and message.
#[derive(Debug, Clone, Error)]
#[error("{status}: {message}")]
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
    /// Extra fields merged into the JSON body next to `message`.
    pub details: Option<Map<String, Value>>,
}

impl ApiError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
            details: None,
        }
    }

    pub fn with_details(mut self, details: Map<String, Value>) -> Self {
        self.details = Some(details);
        self
    }

    pub fn required_api_key() -> Self {
        Self::new(MISSING_API_KEY_STATUS, "API key is required")
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    /// Routing failure listing every registered route.
    pub fn no_route(method: &Method, path: &str, routes: Vec<String>) -> Self {
        let mut details = Map::new();
        details.insert(
            "routes".to_string(),
            Value::Array(routes.into_iter().map(Value::String).collect()),
        );
        Self::new(
            NO_ROUTE_STATUS,
            format!("\"{method} {path}\" did not match any endpoints"),
        )
        .with_details(details)
    }
}

impl ErrorResponse for ApiError {
    fn to_response(&self) -> Response {
        let mut body = self.details.clone().unwrap_or_default();
        body.insert("message".to_string(), Value::String(self.message.clone()));
        (self.status, Json(Value::Object(body))).into_response()
    }
}

impl ErrorResponse for FetchError {
    fn to_response(&self) -> Response {
        // Upstream bodies are usually JSON; fall back to the raw text.
        let upstream = serde_json::from_str::<Value>(&self.body)
            .unwrap_or_else(|_| Value::String(self.body.clone()));

        let body = serde_json::json!({
            "message": format!("Portainer request failed: {self}"),
            "status": self.status.as_u16(),
            "path": self.url.path(),
            "response": upstream,
        });
        (self.status, Json(body)).into_response()
    }
}

/// Every error a handler, the client factory or the client can raise.
#[derive(Debug, Error)]
pub enum GatewayError {
    #[error(transparent)]
    Api(#[from] ApiError),

    #[error(transparent)]
    Fetch(#[from] FetchError),

    /// Connection or decode failure talking to the remote service.
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("{0}")]
    Internal(BoxError),
}

/// Result type for request handling.
pub type GatewayResult<T> = Result<T, GatewayError>;

impl GatewayError {
    pub fn internal(err: impl Into<BoxError>) -> Self {
        Self::Internal(err.into())
    }

    /// True for the kinds that carry their own response.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Self::Api(_) | Self::Fetch(_))
    }

    /// Convert a recognized kind into its response; return any other kind as-is.
    pub fn recover(self) -> Result<Response, Self> {
        match self {
            Self::Api(err) => Ok(err.to_response()),
            Self::Fetch(err) => Ok(err.to_response()),
            other => Err(other),
        }
    }
}
