//! HTTP server setup.
//!
//! # Responsibilities
//! - Create the Axum router with every request going to the dispatcher
//! - Wire up middleware (request ID, tracing)
//! - Answer unhandled faults the way an unguarded host would
//! - Serve until the shutdown signal fires

use std::time::Instant;

use axum::{
    body::Body,
    extract::State,
    http::{Request, StatusCode},
    response::{IntoResponse, Response},
    Router,
};
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::{
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};

use crate::http::dispatcher::Dispatcher;
use crate::lifecycle::ShutdownSignal;
use crate::observability::metrics;

/// HTTP server for the gateway.
pub struct HttpServer {
    router: Router,
}

impl HttpServer {
    pub fn new(dispatcher: Dispatcher) -> Self {
        Self {
            router: Self::build_router(dispatcher),
        }
    }

    /// Build the Axum router with all middleware layers.
    fn build_router(dispatcher: Dispatcher) -> Router {
        Router::new()
            .fallback(dispatch_handler)
            .with_state(dispatcher)
            .layer(
                ServiceBuilder::new()
                    .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
                    .layer(TraceLayer::new_for_http())
                    .layer(PropagateRequestIdLayer::x_request_id()),
            )
    }

    /// The router, for driving the server without a socket.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Run the server, accepting connections on the given listener.
    pub async fn run(
        self,
        listener: TcpListener,
        shutdown: ShutdownSignal,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "HTTP server starting");

        axum::serve(listener, self.router)
            .with_graceful_shutdown(shutdown.wait())
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}

async fn dispatch_handler(
    State(dispatcher): State<Dispatcher>,
    request: Request<Body>,
) -> Response {
    let start = Instant::now();
    let method = request.method().to_string();

    let response = match dispatcher.dispatch(request).await {
        Ok(response) => response,
        Err(fault) => {
            tracing::error!(error = %fault, "Unhandled fault");
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    };

    metrics::record_request(&method, response.status().as_u16(), start);
    response
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::Method;
    use tower::ServiceExt;

    use crate::http::error::GatewayError;
    use crate::http::Context;
    use crate::portainer::PortainerFactory;
    use crate::routing::{HandlerResult, Route, RouteTable};

    async fn broken(_ctx: Context, _args: Vec<String>) -> HandlerResult {
        Err(GatewayError::internal("handler bug"))
    }

    fn server() -> HttpServer {
        let routes = RouteTable::new(vec![Route::new(Method::GET, "/broken", broken).unwrap()]);
        let factory = PortainerFactory::new(
            reqwest::Client::new(),
            "http://127.0.0.1:9/api".parse().unwrap(),
        );
        HttpServer::new(Dispatcher::new(routes, factory))
    }

    #[tokio::test]
    async fn test_unhandled_fault_is_bare_500() {
        let response = server()
            .router()
            .oneshot(
                Request::builder()
                    .uri("/broken")
                    .header("x-api-key", "abc")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        assert!(bytes.is_empty());
    }

    #[tokio::test]
    async fn test_request_id_is_propagated() {
        let response = server()
            .router()
            .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert!(response.headers().contains_key("x-request-id"));
    }
}
