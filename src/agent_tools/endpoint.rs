//! Request/Response Plumbing
//!
//! This module holds the pieces every tool agent shares: query parameters as
//! delivered by the host runtime, the uniform `{status_code, body}` response
//! shape, and the error type whose variants map onto HTTP status codes.
//!
//! Query parameter names and values are percent-escaped on construction and
//! decoded on access, so handlers always see plain text regardless of how the
//! host runtime delivered the request.
//!
//! # Example
//!
//! ```rust
//! use agent_tools::endpoint::QueryParams;
//!
//! let params = QueryParams::from_pairs(vec![("search_keywords", "fedramp cjis")]);
//! assert_eq!(params.get("search_keywords").as_deref(), Some("fedramp cjis"));
//! ```

use std::error::Error;
use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::json;
use serde_json::Value as JsonValue;

/// Error raised while handling an endpoint request.
///
/// Each variant carries a human readable message and maps onto a single HTTP
/// status code via [`EndpointError::status_code`].
#[derive(Debug, Clone)]
pub enum EndpointError {
    /// A query parameter is missing, unparsable, or out of range (400).
    InvalidParameter(String),
    /// The requested route or entity does not exist (404).
    NotFound(String),
    /// An outbound call to an external service failed (502).
    Upstream(String),
    /// Anything that should never happen during normal operation (500).
    Internal(String),
}

impl EndpointError {
    /// The HTTP status code this error maps to.
    pub fn status_code(&self) -> u16 {
        match self {
            EndpointError::InvalidParameter(_) => 400,
            EndpointError::NotFound(_) => 404,
            EndpointError::Upstream(_) => 502,
            EndpointError::Internal(_) => 500,
        }
    }
}

impl fmt::Display for EndpointError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EndpointError::InvalidParameter(msg) => write!(f, "Invalid parameter: {}", msg),
            EndpointError::NotFound(msg) => write!(f, "Not found: {}", msg),
            EndpointError::Upstream(msg) => write!(f, "Upstream service error: {}", msg),
            EndpointError::Internal(msg) => write!(f, "Internal error: {}", msg),
        }
    }
}

impl Error for EndpointError {}

/// The response a tool agent returns for a resolved request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EndpointResponse {
    /// HTTP status code (e.g., 200, 404, 502).
    pub status_code: u16,
    /// JSON body. Error responses use `{"error": "..."}`.
    pub body: JsonValue,
}

impl EndpointResponse {
    /// A 200 response with the given body.
    pub fn ok(body: JsonValue) -> Self {
        Self {
            status_code: 200,
            body,
        }
    }

    /// Build an error response with the status code the error maps to.
    pub fn from_error(error: &EndpointError) -> Self {
        Self {
            status_code: error.status_code(),
            body: json!({ "error": error.to_string() }),
        }
    }
}

/// Query string parameters for a single request.
///
/// Values are stored percent-escaped and decoded on access. Duplicate names
/// keep the first occurrence, matching common query string semantics.
#[derive(Debug, Clone, Default)]
pub struct QueryParams {
    pairs: Vec<(String, String)>,
}

impl QueryParams {
    /// An empty parameter set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build parameters from decoded name/value pairs, escaping each one.
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let pairs = pairs
            .into_iter()
            .map(|(k, v)| {
                (
                    urlencoding::encode(k.as_ref()).into_owned(),
                    urlencoding::encode(v.as_ref()).into_owned(),
                )
            })
            .collect();
        Self { pairs }
    }

    /// Parse a raw query string (already percent-encoded) such as
    /// `"a=1&b=two%20words"`. Pairs without `=` become empty values.
    pub fn from_query_string(query: &str) -> Self {
        let pairs = query
            .split('&')
            .filter(|segment| !segment.is_empty())
            .map(|segment| match segment.split_once('=') {
                Some((name, value)) => (name.to_string(), value.to_string()),
                None => (segment.to_string(), String::new()),
            })
            .collect();
        Self { pairs }
    }

    /// Add a decoded name/value pair, escaping both sides.
    pub fn insert(&mut self, name: &str, value: &str) -> &mut Self {
        self.pairs.push((
            urlencoding::encode(name).into_owned(),
            urlencoding::encode(value).into_owned(),
        ));
        self
    }

    /// Number of stored parameters.
    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    /// Whether no parameters are stored.
    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    /// Get the decoded value for `name`, if present.
    pub fn get(&self, name: &str) -> Option<String> {
        self.pairs
            .iter()
            .find(|(stored, _)| decode(stored) == name)
            .map(|(_, value)| decode(value))
    }

    /// Get the decoded value for `name`, or `default` when absent.
    pub fn get_or(&self, name: &str, default: &str) -> String {
        self.get(name).unwrap_or_else(|| default.to_string())
    }

    /// Get a required parameter, failing with 400 when absent.
    pub fn require(&self, name: &str) -> Result<String, EndpointError> {
        self.get(name).ok_or_else(|| {
            EndpointError::InvalidParameter(format!("missing required parameter '{}'", name))
        })
    }

    /// Get a required integer parameter.
    pub fn require_i64(&self, name: &str) -> Result<i64, EndpointError> {
        parse_i64(name, &self.require(name)?)
    }

    /// Get an optional integer parameter with a default.
    pub fn get_i64_or(&self, name: &str, default: i64) -> Result<i64, EndpointError> {
        match self.get(name) {
            Some(raw) => parse_i64(name, &raw),
            None => Ok(default),
        }
    }

    /// Get a required floating point parameter. NaN and infinities are
    /// rejected, never passed through to a backend.
    pub fn require_f64(&self, name: &str) -> Result<f64, EndpointError> {
        let raw = self.require(name)?;
        let value: f64 = raw.trim().parse().map_err(|_| {
            EndpointError::InvalidParameter(format!("parameter '{}' is not a number: '{}'", name, raw))
        })?;
        if !value.is_finite() {
            return Err(EndpointError::InvalidParameter(format!(
                "parameter '{}' must be a finite number",
                name
            )));
        }
        Ok(value)
    }
}

fn parse_i64(name: &str, raw: &str) -> Result<i64, EndpointError> {
    raw.trim().parse().map_err(|_| {
        EndpointError::InvalidParameter(format!("parameter '{}' is not an integer: '{}'", name, raw))
    })
}

/// Decode a percent-escaped component, falling back to the raw text when the
/// escape sequence is malformed.
fn decode(raw: &str) -> String {
    match urlencoding::decode(raw) {
        Ok(decoded) => decoded.into_owned(),
        Err(_) => raw.to_string(),
    }
}
