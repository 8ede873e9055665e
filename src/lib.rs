//! # Agent Tools
//!
//! Agent Tools is a Rust toolkit of small, HTTP-style query backends built for
//! consumption by an LLM agent orchestration layer. Each backend is a *tool
//! agent*: a table of GET routes whose handlers validate a couple of query
//! parameters, call an external capability, reshape the result into JSON, and
//! return a status code plus body.
//!
//! The crate provides:
//!
//! * **Request plumbing**: [`endpoint::QueryParams`] with percent-escaped
//!   storage and typed accessors, plus [`endpoint::EndpointResponse`] and
//!   [`endpoint::EndpointError`] for uniform status-code mapping
//! * **Dispatch**: [`agent::ToolAgent`], a route registry that resolves a GET
//!   path and query parameters into a response without ever panicking
//! * **Backends**: report catalog pagination and keyword search
//!   ([`backends::reports`]), date/time and business-calendar arithmetic
//!   ([`backends::datetime`]), geocoding and route summaries
//!   ([`backends::geolocation`]), and weather forecasts from the National
//!   Weather Service API ([`backends::weather`])
//! * **Capability seams**: external services are injected behind async traits
//!   ([`backends::reports::ReportCatalog`],
//!   [`backends::geolocation::PlaceIndex`],
//!   [`backends::geolocation::RouteCalculator`],
//!   [`backends::weather::ForecastProvider`]) so backends are testable without
//!   a network
//! * **Serving**: an optional axum front end (feature `http-server`) that
//!   exposes any agent over HTTP
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use agent_tools::agents::datetime_agent;
//! use agent_tools::endpoint::QueryParams;
//!
//! #[tokio::main]
//! async fn main() {
//!     agent_tools::init_logger();
//!
//!     let agent = datetime_agent();
//!     let params = QueryParams::from_pairs(vec![("birth_date", "1990-06-15")]);
//!     let response = agent.resolve("/age", params).await;
//!
//!     println!("{} {}", response.status_code, response.body);
//! }
//! ```
//!
//! Backends that talk to external services take their capability as an
//! `Arc<dyn Trait>`:
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use agent_tools::agents::report_agent;
//! use agent_tools::backends::reports::HttpReportCatalog;
//!
//! let catalog = Arc::new(HttpReportCatalog::new("https://reports.internal.example"));
//! let agent = report_agent(catalog);
//! ```

use std::sync::Once;

static INIT_LOGGER: Once = Once::new();

/// Initialise the global [`env_logger`] subscriber exactly once.
///
/// Embedding applications opt in to `RUST_LOG` driven diagnostics without the
/// crate forcing a logging backend on them.
///
/// ```rust
/// agent_tools::init_logger();
/// log::info!("Logger is ready");
/// ```
pub fn init_logger() {
    INIT_LOGGER.call_once(|| {
        env_logger::init();
    });
}

pub mod agent_tools;

// Re-export the commonly used items at the crate root.
pub use crate::agent_tools::agent;
pub use crate::agent_tools::agent::{handler, RouteMetadata, ToolAgent};
pub use crate::agent_tools::agents;
pub use crate::agent_tools::backends;
pub use crate::agent_tools::endpoint;
pub use crate::agent_tools::endpoint::{EndpointError, EndpointResponse, QueryParams};

#[cfg(feature = "http-server")]
pub use crate::agent_tools::http_server;
