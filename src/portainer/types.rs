//! Remote entity types and the fetch error.

use axum::http::{Method, StatusCode};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;
use url::Url;

/// A stack as the remote service reports it.
///
/// Only the redeploy flow decodes stacks; read endpoints forward the raw body.
/// Fields the gateway does not interpret are kept in `extra`.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct Stack {
    pub id: u64,
    #[serde(default)]
    pub name: String,
    pub endpoint_id: u64,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// The compose file behind a stack.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct StackFile {
    pub stack_file_content: String,
}

/// Options for redeploying a stack.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdateStackOptions {
    /// Environment the stack is deployed to; sent as `endpointId`.
    pub endpoint_id: u64,
    pub prune: bool,
    pub pull_image: bool,
    pub stack_file_content: String,
}

/// JSON body of the update call. Exactly these three fields.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct UpdateStackBody<'a> {
    pub prune: bool,
    pub pull_image: bool,
    pub stack_file_content: &'a str,
}

impl<'a> From<&'a UpdateStackOptions> for UpdateStackBody<'a> {
    fn from(options: &'a UpdateStackOptions) -> Self {
        Self {
            prune: options.prune,
            pull_image: options.pull_image,
            stack_file_content: &options.stack_file_content,
        }
    }
}

/// The remote answered with a status other than the expected one.
#[derive(Debug, Clone, Error)]
#[error("{method} {} returned {status}", .url.path())]
pub struct FetchError {
    pub method: Method,
    pub url: Url,
    pub status: StatusCode,
    /// Raw upstream body, empty if it could not be read.
    pub body: String,
}

impl FetchError {
    /// Capture an unexpected upstream response, draining its body.
    pub async fn from_response(method: Method, response: reqwest::Response) -> Self {
        let url = response.url().clone();
        let status = response.status();
        let body = match response.text().await {
            Ok(body) => body,
            Err(e) => {
                tracing::warn!(url = %url, error = %e, "Failed to read upstream error body");
                String::new()
            }
        };
        Self {
            method,
            url,
            status,
            body,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stack_passes_unknown_fields_through() {
        let raw = r#"{"Id":1,"Name":"web","EndpointId":2,"Status":1}"#;
        let stack: Stack = serde_json::from_str(raw).unwrap();
        assert_eq!(stack.id, 1);
        assert_eq!(stack.endpoint_id, 2);
        assert_eq!(serde_json::to_string(&stack).unwrap(), raw);
    }

    #[test]
    fn test_stack_without_name_decodes() {
        let stack: Stack = serde_json::from_str(r#"{"Id":4,"EndpointId":2}"#).unwrap();
        assert_eq!(stack.name, "");
        assert_eq!(stack.endpoint_id, 2);
    }

    #[test]
    fn test_update_body_shape() {
        let options = UpdateStackOptions {
            endpoint_id: 3,
            prune: true,
            pull_image: false,
            stack_file_content: "services: {}".into(),
        };
        let body = serde_json::to_value(UpdateStackBody::from(&options)).unwrap();
        assert_eq!(
            body,
            serde_json::json!({
                "prune": true,
                "pullImage": false,
                "stackFileContent": "services: {}"
            })
        );
    }

    #[test]
    fn test_fetch_error_display() {
        let err = FetchError {
            method: Method::PUT,
            url: "http://portainer/api/stacks/5?endpointId=2".parse().unwrap(),
            status: StatusCode::UNAUTHORIZED,
            body: String::new(),
        };
        assert_eq!(err.to_string(), "PUT /api/stacks/5 returned 401 Unauthorized");
    }
}
