//! Inbound request helpers.
//!
//! # Responsibilities
//! - Extract the caller's API key before any routing happens
//!
//! # Design Decisions
//! - Presence is the only local check; the remote service judges validity
//! - A header that is not visible ASCII counts as missing

use axum::http::HeaderMap;

use crate::http::error::ApiError;

/// Header carrying the caller's Portainer API key, inbound and outbound.
pub const X_API_KEY: &str = "x-api-key";

/// Return the non-empty API key, or the "API key is required" error.
pub fn extract_api_key(headers: &HeaderMap) -> Result<&str, ApiError> {
    headers
        .get(X_API_KEY)
        .and_then(|v| v.to_str().ok())
        .filter(|v| !v.is_empty())
        .ok_or_else(ApiError::required_api_key)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::{HeaderName, HeaderValue};

    #[test]
    fn test_extracts_key_case_insensitively() {
        let mut headers = HeaderMap::new();
        let name = HeaderName::from_bytes(b"X-API-Key").unwrap();
        headers.insert(name, HeaderValue::from_static("abc"));
        assert_eq!(extract_api_key(&headers).unwrap(), "abc");
    }

    #[test]
    fn test_missing_or_empty_key_rejected() {
        let headers = HeaderMap::new();
        let err = extract_api_key(&headers).unwrap_err();
        assert_eq!(err.message, "API key is required");

        let mut headers = HeaderMap::new();
        headers.insert(X_API_KEY, HeaderValue::from_static(""));
        assert!(extract_api_key(&headers).is_err());
    }
}
