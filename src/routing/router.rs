//! Route table and lookup.
//!
//! # Responsibilities
//! - Store compiled routes in registration order
//! - Find the first route whose method and path both match
//! - List every route for diagnostics
//!
//! # Design Decisions
//! - Immutable after construction (shared across requests without locks)
//! - O(n) scan; first match wins and is final
//! - Explicit no-match rather than a silent default

use std::future::Future;
use std::sync::Arc;

use axum::{http::Method, response::Response};
use futures_util::future::BoxFuture;

use crate::http::context::Context;
use crate::http::error::GatewayResult;
use crate::routing::matcher::{PathMatcher, RegexMatcher};

/// What a handler produces. `None` becomes an empty 200.
pub type HandlerResult = GatewayResult<Option<Response>>;

type BoxHandler =
    Arc<dyn Fn(Context, Vec<String>) -> BoxFuture<'static, HandlerResult> + Send + Sync>;

/// A (method, path matcher, handler) registration.
pub struct Route {
    method: Method,
    matcher: Box<dyn PathMatcher>,
    handler: BoxHandler,
}

impl Route {
    /// Register `handler` for `method` requests whose path matches the regex `pattern`.
    pub fn new<H, Fut>(method: Method, pattern: &str, handler: H) -> Result<Self, regex::Error>
    where
        H: Fn(Context, Vec<String>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = HandlerResult> + Send + 'static,
    {
        Ok(Self::with_matcher(method, RegexMatcher::new(pattern)?, handler))
    }

    pub fn with_matcher<M, H, Fut>(method: Method, matcher: M, handler: H) -> Self
    where
        M: PathMatcher + 'static,
        H: Fn(Context, Vec<String>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = HandlerResult> + Send + 'static,
    {
        Self {
            method,
            matcher: Box::new(matcher),
            handler: Arc::new(
                move |ctx: Context, args: Vec<String>| -> BoxFuture<'static, HandlerResult> {
                    Box::pin(handler(ctx, args))
                },
            ),
        }
    }

    pub fn method(&self) -> &Method {
        &self.method
    }

    /// `"METHOD /pattern"` as shown in route listings.
    pub fn describe(&self) -> String {
        format!("{} {}", self.method, self.matcher.describe())
    }

    /// Run the handler.
    pub fn call(&self, ctx: Context, args: Vec<String>) -> BoxFuture<'static, HandlerResult> {
        (self.handler)(ctx, args)
    }
}

impl std::fmt::Debug for Route {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Route")
            .field("method", &self.method)
            .field("matcher", &self.matcher)
            .finish()
    }
}

/// Ordered, immutable set of routes.
#[derive(Debug, Default)]
pub struct RouteTable {
    routes: Vec<Route>,
}

impl RouteTable {
    pub fn new(routes: Vec<Route>) -> Self {
        Self { routes }
    }

    /// First route matching both method and path, with its captures.
    pub fn match_route(&self, method: &Method, path: &str) -> Option<(&Route, Vec<String>)> {
        self.routes.iter().find_map(|route| {
            if route.method != *method {
                return None;
            }
            route.matcher.captures(path).map(|args| (route, args))
        })
    }

    /// Every route rendered as `"METHOD /pattern"`, in registration order.
    pub fn describe(&self) -> Vec<String> {
        self.routes.iter().map(Route::describe).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn noop(_ctx: Context, _args: Vec<String>) -> HandlerResult {
        Ok(None)
    }

    #[derive(Debug)]
    struct Everything;

    impl PathMatcher for Everything {
        fn captures(&self, path: &str) -> Option<Vec<String>> {
            Some(vec![path.to_string()])
        }

        fn describe(&self) -> String {
            "/*".to_string()
        }
    }

    fn table() -> RouteTable {
        RouteTable::new(vec![
            Route::new(Method::GET, r"/stacks", noop).unwrap(),
            Route::new(Method::GET, r"/stacks/(\d+)", noop).unwrap(),
            Route::new(Method::GET, r"/stacks/(\w+)", noop).unwrap(),
            Route::new(Method::PUT, r"/stacks/(\d+)", noop).unwrap(),
        ])
    }

    #[test]
    fn test_first_match_wins() {
        let table = table();
        let (route, args) = table.match_route(&Method::GET, "/stacks/7").unwrap();
        assert_eq!(route.describe(), "GET /stacks/(d+)");
        assert_eq!(args, vec!["7"]);

        let (route, args) = table.match_route(&Method::GET, "/stacks/web").unwrap();
        assert_eq!(route.describe(), "GET /stacks/(w+)");
        assert_eq!(args, vec!["web"]);
    }

    #[test]
    fn test_method_must_match() {
        let table = table();
        let (route, _) = table.match_route(&Method::PUT, "/stacks/7").unwrap();
        assert_eq!(route.method(), &Method::PUT);
        assert!(table.match_route(&Method::DELETE, "/stacks/7").is_none());
        assert!(table.match_route(&Method::PUT, "/stacks").is_none());
    }

    #[test]
    fn test_describe_in_registration_order() {
        assert_eq!(
            table().describe(),
            vec![
                "GET /stacks",
                "GET /stacks/(d+)",
                "GET /stacks/(w+)",
                "PUT /stacks/(d+)",
            ]
        );
    }

    #[test]
    fn test_custom_matcher() {
        let table = RouteTable::new(vec![Route::with_matcher(Method::POST, Everything, noop)]);
        let (route, args) = table.match_route(&Method::POST, "/a/b").unwrap();
        assert_eq!(route.describe(), "POST /*");
        assert_eq!(args, vec!["/a/b"]);
    }
}
