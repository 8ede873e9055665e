//! Tool Agent Dispatch
//!
//! A [`ToolAgent`] is a named table of GET routes. Each route pairs a path and
//! description with an async handler; [`ToolAgent::resolve`] looks up the path,
//! runs the handler, and maps the outcome onto a `{status_code, body}`
//! response. Unknown routes become 404s and handler errors take the status
//! code of their [`EndpointError`] variant, so dispatch itself never fails.
//!
//! # Example
//!
//! ```rust
//! use agent_tools::agent::{handler, ToolAgent};
//! use agent_tools::endpoint::{EndpointResponse, QueryParams};
//! use serde_json::json;
//!
//! # #[tokio::main]
//! # async fn main() {
//! let agent = ToolAgent::new("echo").route(
//!     "/echo",
//!     "Echoes the 'text' query parameter",
//!     handler(|params: QueryParams| async move {
//!         let text = params.require("text")?;
//!         Ok(EndpointResponse::ok(json!({ "text": text })))
//!     }),
//! );
//!
//! let response = agent
//!     .resolve("/echo", QueryParams::from_pairs(vec![("text", "hi")]))
//!     .await;
//! assert_eq!(response.status_code, 200);
//! # }
//! ```

use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use crate::agent_tools::endpoint::{EndpointError, EndpointResponse, QueryParams};

/// Boxed future returned by route handlers.
pub type HandlerFuture =
    Pin<Box<dyn Future<Output = Result<EndpointResponse, EndpointError>> + Send>>;

/// Async function handling one route.
pub type RouteHandler = Arc<dyn Fn(QueryParams) -> HandlerFuture + Send + Sync>;

/// Static description of a registered route, surfaced in discovery listings.
#[derive(Debug, Clone, PartialEq)]
pub struct RouteMetadata {
    pub path: String,
    pub description: String,
}

struct RouteEntry {
    metadata: RouteMetadata,
    handler: RouteHandler,
}

/// Wrap an async closure into a [`RouteHandler`].
pub fn handler<F, Fut>(f: F) -> RouteHandler
where
    F: Fn(QueryParams) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<EndpointResponse, EndpointError>> + Send + 'static,
{
    Arc::new(move |params| Box::pin(f(params)))
}

/// A named collection of query endpoints behind a single dispatcher.
pub struct ToolAgent {
    name: String,
    routes: HashMap<String, RouteEntry>,
}

impl ToolAgent {
    /// Create an agent with no routes.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            routes: HashMap::new(),
        }
    }

    /// The agent's name, used in logs.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Register a route, replacing any previous handler for the same path.
    pub fn route(
        mut self,
        path: impl Into<String>,
        description: impl Into<String>,
        handler: RouteHandler,
    ) -> Self {
        let path = path.into();
        self.routes.insert(
            path.clone(),
            RouteEntry {
                metadata: RouteMetadata {
                    path,
                    description: description.into(),
                },
                handler,
            },
        );
        self
    }

    /// Metadata for every registered route, sorted by path.
    pub fn routes(&self) -> Vec<&RouteMetadata> {
        let mut routes: Vec<&RouteMetadata> =
            self.routes.values().map(|entry| &entry.metadata).collect();
        routes.sort_by(|a, b| a.path.cmp(&b.path));
        routes
    }

    /// Resolve a request against the route table.
    ///
    /// Unknown paths yield 404. Handler errors are logged and mapped onto the
    /// status code of the error variant. The response always carries a JSON
    /// body.
    pub async fn resolve(&self, path: &str, params: QueryParams) -> EndpointResponse {
        let entry = match self.routes.get(path) {
            Some(entry) => entry,
            None => {
                log::warn!("[{}] no route registered for '{}'", self.name, path);
                return EndpointResponse::from_error(&EndpointError::NotFound(format!(
                    "no route registered for '{}'",
                    path
                )));
            }
        };

        log::debug!("[{}] GET {} ({} params)", self.name, path, params.len());

        match (entry.handler)(params).await {
            Ok(response) => response,
            Err(error) => {
                log::warn!("[{}] {} failed: {}", self.name, path, error);
                EndpointResponse::from_error(&error)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn echo_agent() -> ToolAgent {
        ToolAgent::new("echo").route(
            "/echo",
            "Echoes the 'text' query parameter",
            handler(|params: QueryParams| async move {
                let text = params.require("text")?;
                Ok(EndpointResponse::ok(json!({ "text": text })))
            }),
        )
    }

    #[tokio::test]
    async fn test_resolve_success() {
        let agent = echo_agent();
        let response = agent
            .resolve("/echo", QueryParams::from_pairs(vec![("text", "hello")]))
            .await;
        assert_eq!(response.status_code, 200);
        assert_eq!(response.body["text"], "hello");
    }

    #[tokio::test]
    async fn test_resolve_unknown_route_is_404() {
        let agent = echo_agent();
        let response = agent.resolve("/nope", QueryParams::new()).await;
        assert_eq!(response.status_code, 404);
        assert!(response.body["error"].is_string());
    }

    #[tokio::test]
    async fn test_resolve_maps_handler_errors() {
        let agent = echo_agent();
        let response = agent.resolve("/echo", QueryParams::new()).await;
        assert_eq!(response.status_code, 400);
    }

    #[tokio::test]
    async fn test_routes_are_sorted() {
        let agent = ToolAgent::new("multi")
            .route("/b", "second", handler(|_| async { Ok(EndpointResponse::ok(json!({}))) }))
            .route("/a", "first", handler(|_| async { Ok(EndpointResponse::ok(json!({}))) }));
        let paths: Vec<&str> = agent.routes().iter().map(|r| r.path.as_str()).collect();
        assert_eq!(paths, vec!["/a", "/b"]);
    }
}
