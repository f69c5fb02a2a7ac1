//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, request ID, tracing)
//!     → dispatcher.rs
//!         → request.rs (X-API-Key presence)
//!         → [routing layer picks handler]
//!         → context.rs (request + client for the caller's key)
//!         → handler
//!     → error.rs (recognized errors become responses)
//!     → Send to client
//! ```

pub mod context;
pub mod dispatcher;
pub mod error;
pub mod request;
pub mod server;

pub use context::{ClientFactory, Context};
pub use dispatcher::Dispatcher;
pub use error::{ApiError, ErrorResponse, GatewayError, GatewayResult};
pub use request::X_API_KEY;
pub use server::HttpServer;
