//! Request dispatch.
//!
//! # Responsibilities
//! - Require an API key before looking at routes
//! - Pick the first matching route and build its [`Context`]
//! - Turn recognized errors into responses
//!
//! # Design Decisions
//! - AUTHENTICATING → ROUTING → EXECUTING, no backtracking once a route matched
//! - The client is created only after a route matched
//! - Unrecognized errors are returned to the caller, never converted here

use std::sync::Arc;

use axum::{
    body::Body,
    http::{Request, StatusCode},
    response::{IntoResponse, Response},
};

use crate::http::context::{ClientFactory, Context};
use crate::http::error::{ApiError, GatewayError, GatewayResult};
use crate::http::request::extract_api_key;
use crate::routing::RouteTable;

/// Routes requests to handlers. Shared by all in-flight requests.
#[derive(Clone)]
pub struct Dispatcher {
    routes: Arc<RouteTable>,
    factory: Arc<dyn ClientFactory>,
}

impl Dispatcher {
    pub fn new(routes: RouteTable, factory: impl ClientFactory) -> Self {
        Self {
            routes: Arc::new(routes),
            factory: Arc::new(factory),
        }
    }

    /// Handle one request.
    ///
    /// `Err` means an unhandled fault: something other than an [`ApiError`]
    /// or a fetch failure went wrong.
    pub async fn dispatch(&self, request: Request<Body>) -> Result<Response, GatewayError> {
        match self.execute(request).await {
            Ok(response) => Ok(response),
            Err(err) => {
                if err.is_recoverable() {
                    tracing::warn!(error = %err, "Request failed");
                }
                err.recover()
            }
        }
    }

    async fn execute(&self, request: Request<Body>) -> GatewayResult<Response> {
        let api_key = extract_api_key(request.headers())?.to_string();

        let method = request.method().clone();
        let path = request.uri().path().to_string();

        let Some((route, args)) = self.routes.match_route(&method, &path) else {
            return Err(ApiError::no_route(&method, &path, self.routes.describe()).into());
        };

        tracing::debug!(method = %method, path = %path, route = %route.describe(), "Route matched");

        let portainer = self.factory.create(&api_key).await?;
        let ctx = Context { request, portainer };

        let response = route.call(ctx, args).await?;
        Ok(response.unwrap_or_else(|| StatusCode::OK.into_response()))
    }
}

impl std::fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dispatcher")
            .field("routes", &self.routes.describe())
            .finish()
    }
}
