//! Per-request context and the client factory seam.

use axum::{body::Body, http::Request};
use futures_util::future::BoxFuture;

use crate::http::error::GatewayResult;
use crate::portainer::PortainerClient;

/// Produces a remote client bound to a caller's API key.
///
/// Asynchronous so implementations can validate the key before handing out
/// a client.
pub trait ClientFactory: Send + Sync + 'static {
    fn create(&self, api_key: &str) -> BoxFuture<'static, GatewayResult<PortainerClient>>;
}

/// Everything a handler gets for one request. Dropped when the handler returns.
#[derive(Debug)]
pub struct Context {
    pub request: Request<Body>,
    pub portainer: PortainerClient,
}
