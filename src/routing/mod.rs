//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming Request (method, path)
//!     → router.rs (ordered scan)
//!     → matcher.rs (anchored pattern, captures)
//!     → Return: matched Route + positional captures, or no match
//!
//! Route Compilation (at startup):
//!     (method, pattern, handler)[]
//!     → Compile patterns
//!     → Freeze as immutable RouteTable
//! ```
//!
//! # Design Decisions
//! - Routes compiled at startup, immutable at runtime
//! - Deterministic: same input always matches same route
//! - First match wins (registration order)

pub mod matcher;
pub mod router;

pub use matcher::{PathMatcher, RegexMatcher};
pub use router::{HandlerResult, Route, RouteTable};
