//! Stack endpoints.
//!
//! Thin wrappers over [`PortainerClient`](crate::portainer::PortainerClient):
//! parse the path argument, call the remote, hand the JSON back.

use axum::{
    body::{to_bytes, Bytes},
    http::header,
    response::{IntoResponse, Response},
};
use serde::Deserialize;

use crate::http::{ApiError, Context, GatewayResult};
use crate::portainer::UpdateStackOptions;
use crate::routing::HandlerResult;

/// Largest redeploy body accepted (compose files are small).
const MAX_BODY_BYTES: usize = 1024 * 1024;

/// Optional body of `PUT /stacks/{id}`.
#[derive(Debug, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct RedeployRequest {
    #[serde(default)]
    pub prune: bool,
    #[serde(default = "default_pull_image")]
    pub pull_image: bool,
    /// Replacement compose file; the current one is reused when absent.
    #[serde(default)]
    pub stack_file_content: Option<String>,
}

fn default_pull_image() -> bool {
    true
}

impl Default for RedeployRequest {
    fn default() -> Self {
        Self {
            prune: false,
            pull_image: default_pull_image(),
            stack_file_content: None,
        }
    }
}

impl RedeployRequest {
    /// Parse a request body; an empty body means all defaults.
    pub fn from_body(body: &[u8]) -> Result<Self, ApiError> {
        if body.iter().all(u8::is_ascii_whitespace) {
            return Ok(Self::default());
        }
        serde_json::from_slice(body)
            .map_err(|e| ApiError::bad_request(format!("Invalid request body: {e}")))
    }
}

fn stack_id(args: &[String]) -> GatewayResult<u64> {
    let raw = args.first().map(String::as_str).unwrap_or_default();
    raw.parse()
        .map_err(|_| ApiError::bad_request(format!("Invalid stack id '{raw}'")).into())
}

/// `GET /stacks`
pub async fn list_stacks(ctx: Context, _args: Vec<String>) -> HandlerResult {
    let body = ctx.portainer.list_stacks_raw().await?;
    Ok(Some(json_passthrough(body)))
}

/// `GET /stacks/{id}`
pub async fn get_stack(ctx: Context, args: Vec<String>) -> HandlerResult {
    let id = stack_id(&args)?;
    let body = ctx.portainer.get_stack_raw(id).await?;
    Ok(Some(json_passthrough(body)))
}

/// `GET /stacks/{id}/file`
pub async fn get_stack_file(ctx: Context, args: Vec<String>) -> HandlerResult {
    let id = stack_id(&args)?;
    let body = ctx.portainer.get_stack_file_raw(id).await?;
    Ok(Some(json_passthrough(body)))
}

/// Hand the upstream JSON back byte for byte.
fn json_passthrough(body: Bytes) -> Response {
    ([(header::CONTENT_TYPE, "application/json")], body).into_response()
}

/// `PUT /stacks/{id}`: redeploy a stack on its own environment.
pub async fn redeploy_stack(ctx: Context, args: Vec<String>) -> HandlerResult {
    let id = stack_id(&args)?;
    let Context { request, portainer } = ctx;

    let body = to_bytes(request.into_body(), MAX_BODY_BYTES)
        .await
        .map_err(|e| ApiError::bad_request(format!("Invalid request body: {e}")))?;
    let redeploy = RedeployRequest::from_body(&body)?;

    let stack = portainer.get_stack(id).await?;
    let stack_file_content = match redeploy.stack_file_content {
        Some(content) => content,
        None => portainer.get_stack_file(id).await?.stack_file_content,
    };

    let options = UpdateStackOptions {
        endpoint_id: stack.endpoint_id,
        prune: redeploy.prune,
        pull_image: redeploy.pull_image,
        stack_file_content,
    };
    portainer.update_stack(id, &options).await?;

    tracing::info!(
        stack_id = id,
        stack = %stack.name,
        endpoint_id = stack.endpoint_id,
        pull_image = options.pull_image,
        "Stack redeployed"
    );
    Ok(None)
}
