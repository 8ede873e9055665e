//! HTTP Front End (feature `http-server`)
//!
//! A thin axum adapter that serves one [`ToolAgent`] over HTTP. Every GET is
//! dispatched through [`ToolAgent::resolve`] with the raw query string parsed
//! into [`QueryParams`], and the agent's `{status_code, body}` becomes the
//! HTTP response. Validation and error mapping live entirely in the agent
//! layer; this module only moves bytes.
//!
//! `GET /__routes` returns the agent's route metadata for discovery.
//!
//! # Example
//!
//! ```rust,no_run
//! use agent_tools::agents::datetime_agent;
//! use agent_tools::http_server::serve;
//!
//! #[tokio::main]
//! async fn main() {
//!     agent_tools::init_logger();
//!     serve(datetime_agent(), "127.0.0.1:3000").await.unwrap();
//! }
//! ```

use std::sync::Arc;

use axum::extract::{RawQuery, State};
use axum::http::{StatusCode, Uri};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use serde_json::json;
use tokio::net::TcpListener;

use crate::agent_tools::agent::ToolAgent;
use crate::agent_tools::endpoint::QueryParams;

/// Build the router serving one agent.
pub fn router(agent: ToolAgent) -> Router {
    let agent = Arc::new(agent);
    Router::new()
        .route("/__routes", get(list_routes))
        .fallback(get(dispatch))
        .with_state(agent)
}

/// Bind `addr` and serve the agent until the task is cancelled.
pub async fn serve(agent: ToolAgent, addr: &str) -> Result<(), std::io::Error> {
    let name = agent.name().to_string();
    let app = router(agent);

    let listener = TcpListener::bind(addr).await?;
    let local_addr = listener.local_addr()?;
    log::info!("serving agent '{}' on {}", name, local_addr);

    axum::serve(listener, app).await
}

async fn list_routes(State(agent): State<Arc<ToolAgent>>) -> Response {
    let routes: Vec<_> = agent
        .routes()
        .iter()
        .map(|route| {
            json!({
                "path": route.path,
                "description": route.description,
            })
        })
        .collect();
    (
        StatusCode::OK,
        Json(json!({ "agent": agent.name(), "routes": routes })),
    )
        .into_response()
}

async fn dispatch(
    State(agent): State<Arc<ToolAgent>>,
    uri: Uri,
    RawQuery(query): RawQuery,
) -> Response {
    let params = QueryParams::from_query_string(query.as_deref().unwrap_or(""));
    let response = agent.resolve(uri.path(), params).await;

    let status =
        StatusCode::from_u16(response.status_code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    (status, Json(response.body)).into_response()
}
