//! Portainer API client.
//!
//! # Responsibilities
//! - Issue the stack calls against the configured base URL
//! - Attach the caller's API key to every request
//! - Turn any status other than 200 into a [`FetchError`]
//!
//! # Design Decisions
//! - One client per caller key; only the connection pool is shared
//! - No retries, no backoff, no timeout beyond the reqwest defaults

use axum::http::{Method, StatusCode};
use futures_util::future::BoxFuture;
use axum::body::Bytes;
use serde::{de::DeserializeOwned, Serialize};
use url::Url;

use crate::config::{loader::base_url_from_env, ConfigError};
use crate::http::context::ClientFactory;
use crate::http::error::{GatewayError, GatewayResult};
use crate::http::request::X_API_KEY;
use crate::portainer::types::{FetchError, Stack, StackFile, UpdateStackBody, UpdateStackOptions};

/// Client for the stack endpoints, bound to one API key.
#[derive(Clone)]
pub struct PortainerClient {
    http: reqwest::Client,
    base_url: Url,
    api_key: String,
}

impl PortainerClient {
    pub fn new(http: reqwest::Client, base_url: Url, api_key: impl Into<String>) -> Self {
        Self {
            http,
            base_url,
            api_key: api_key.into(),
        }
    }

    /// Build a client from `BASE_URL`, failing immediately when it is unset.
    pub fn from_env(api_key: impl Into<String>) -> Result<Self, ConfigError> {
        let base_url = base_url_from_env()?;
        Ok(Self::new(reqwest::Client::new(), base_url, api_key))
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// `GET /stacks`
    pub async fn list_stacks(&self) -> GatewayResult<Vec<Stack>> {
        decode(&self.list_stacks_raw().await?)
    }

    /// `GET /stacks/{id}`
    pub async fn get_stack(&self, id: u64) -> GatewayResult<Stack> {
        decode(&self.get_stack_raw(id).await?)
    }

    /// `GET /stacks/{id}/file`
    pub async fn get_stack_file(&self, id: u64) -> GatewayResult<StackFile> {
        decode(&self.get_stack_file_raw(id).await?)
    }

    /// Upstream body of `GET /stacks`, untouched.
    pub async fn list_stacks_raw(&self) -> GatewayResult<Bytes> {
        self.get_bytes(&["stacks"]).await
    }

    /// Upstream body of `GET /stacks/{id}`, untouched.
    pub async fn get_stack_raw(&self, id: u64) -> GatewayResult<Bytes> {
        self.get_bytes(&["stacks", &id.to_string()]).await
    }

    /// Upstream body of `GET /stacks/{id}/file`, untouched.
    pub async fn get_stack_file_raw(&self, id: u64) -> GatewayResult<Bytes> {
        self.get_bytes(&["stacks", &id.to_string(), "file"]).await
    }

    /// `PUT /stacks/{id}?endpointId={n}` with `{prune, pullImage, stackFileContent}`.
    pub async fn update_stack(&self, id: u64, options: &UpdateStackOptions) -> GatewayResult<()> {
        let mut url = self.endpoint(&["stacks", &id.to_string()])?;
        url.query_pairs_mut()
            .append_pair("endpointId", &options.endpoint_id.to_string());

        let body = UpdateStackBody::from(options);
        self.send(Method::PUT, url, Some(&body)).await?;
        Ok(())
    }

    async fn get_bytes(&self, segments: &[&str]) -> GatewayResult<Bytes> {
        let url = self.endpoint(segments)?;
        let response = self.send::<()>(Method::GET, url, None).await?;
        Ok(response.bytes().await?)
    }

    fn endpoint(&self, segments: &[&str]) -> GatewayResult<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| {
                GatewayError::internal(format!("base URL '{}' cannot carry a path", self.base_url))
            })?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    async fn send<B: Serialize>(
        &self,
        method: Method,
        url: Url,
        body: Option<&B>,
    ) -> GatewayResult<reqwest::Response> {
        tracing::debug!(method = %method, url = %url, "Calling Portainer");

        let mut request = self
            .http
            .request(method.clone(), url)
            .header(X_API_KEY, &self.api_key);
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request.send().await?;
        if response.status() != StatusCode::OK {
            let err = FetchError::from_response(method, response).await;
            tracing::warn!(error = %err, "Unexpected Portainer response");
            return Err(err.into());
        }
        Ok(response)
    }
}

/// Upstream JSON that does not fit the expected shape is an unhandled fault.
fn decode<T: DeserializeOwned>(body: &[u8]) -> GatewayResult<T> {
    serde_json::from_slice(body).map_err(GatewayError::internal)
}

impl std::fmt::Debug for PortainerClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PortainerClient")
            .field("base_url", &self.base_url.as_str())
            .field("api_key", &"<redacted>")
            .finish()
    }
}

/// Factory handing each caller a client bound to their own key.
#[derive(Clone, Debug)]
pub struct PortainerFactory {
    http: reqwest::Client,
    base_url: Url,
}

impl PortainerFactory {
    pub fn new(http: reqwest::Client, base_url: Url) -> Self {
        Self { http, base_url }
    }
}

impl ClientFactory for PortainerFactory {
    fn create(&self, api_key: &str) -> BoxFuture<'static, GatewayResult<PortainerClient>> {
        let client = PortainerClient::new(self.http.clone(), self.base_url.clone(), api_key);
        Box::pin(async move { Ok(client) })
    }
}
