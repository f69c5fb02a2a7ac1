//! Authenticating HTTP gateway in front of the Portainer stack API.

pub mod config;
pub mod handlers;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod portainer;
pub mod routing;

pub use config::GatewayConfig;
pub use http::{Dispatcher, HttpServer};
pub use lifecycle::Shutdown;
