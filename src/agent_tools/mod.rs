//! Top-level module for the agent tool backends.

pub mod agent;
pub mod agents;
pub mod backends;
pub mod endpoint;

#[cfg(feature = "http-server")]
pub mod http_server;
