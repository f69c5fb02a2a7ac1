//! Remote stack-management service (Portainer).
//!
//! # Data Flow
//! ```text
//! handler
//!     → client.rs (build URL, attach X-API-Key, send)
//!     → status 200  → deserialize types.rs entities
//!     → other status → FetchError carrying the upstream response
//! ```

pub mod client;
pub mod types;

pub use client::{PortainerClient, PortainerFactory};
pub use types::{FetchError, Stack, StackFile, UpdateStackOptions};
