//! Request handlers and the route table served by the binary.

pub mod stacks;

use axum::http::Method;

use crate::routing::{Route, RouteTable};

/// The gateway's routes, in matching order.
pub fn default_routes() -> Result<RouteTable, regex::Error> {
    Ok(RouteTable::new(vec![
        Route::new(Method::GET, r"/stacks", stacks::list_stacks)?,
        Route::new(Method::GET, r"/stacks/(\d+)", stacks::get_stack)?,
        Route::new(Method::GET, r"/stacks/(\d+)/file", stacks::get_stack_file)?,
        Route::new(Method::PUT, r"/stacks/(\d+)", stacks::redeploy_stack)?,
    ]))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_routes_listing() {
        assert_eq!(
            default_routes().unwrap().describe(),
            vec![
                "GET /stacks",
                "GET /stacks/(d+)",
                "GET /stacks/(d+)/file",
                "PUT /stacks/(d+)",
            ]
        );
    }
}
