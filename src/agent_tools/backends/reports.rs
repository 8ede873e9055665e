//! Report Catalog Backend
//!
//! Pagination, search, and download-URL resolution over a catalog of
//! compliance reports. The catalog itself sits behind the [`ReportCatalog`]
//! trait: [`StaticReportCatalog`] serves an in-memory list (tests, local
//! wiring) and [`HttpReportCatalog`] fetches the catalog as JSON from a remote
//! endpoint.
//!
//! [`ReportService`] owns the behavior that is independent of where the
//! catalog lives:
//!
//! - page slicing with a hard page-size cap, truncating long descriptions to a
//!   100-character preview
//! - total page counts (`ceil(total / page_size)`)
//! - keyword search ranking reports by how many of the query words appear in
//!   their name and description (whole-word matches only)
//!
//! # Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use agent_tools::backends::reports::{Report, ReportService, StaticReportCatalog};
//!
//! # #[tokio::main]
//! # async fn main() {
//! let catalog = Arc::new(StaticReportCatalog::new(vec![Report {
//!     id: "rpt-1".into(),
//!     name: "FedRAMP Customer Package".into(),
//!     version: 2,
//!     description: "Security package for FedRAMP moderate workloads".into(),
//! }]));
//! let service = ReportService::new(catalog);
//!
//! let hits = service.search("fedramp", 5).await.unwrap();
//! assert_eq!(hits[0].id, "rpt-1");
//! # }
//! ```

use std::collections::BTreeSet;
use std::error::Error;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::agent_tools::endpoint::EndpointError;

/// Largest page size `list_page` accepts.
pub const MAX_LIST_PAGE_SIZE: usize = 10;
/// Largest page size `total_pages` accepts.
pub const MAX_COUNT_PAGE_SIZE: usize = 15;
/// Largest result count `search` accepts.
pub const MAX_SEARCH_RESULTS: usize = 10;
/// Description length kept in paginated listings.
pub const DESCRIPTION_PREVIEW_CHARS: usize = 100;

/// One catalog entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Report {
    pub id: String,
    pub name: String,
    pub version: i64,
    pub description: String,
}

/// A search hit: the full report plus how many query words matched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportMatch {
    pub id: String,
    pub name: String,
    pub description: String,
    pub version: i64,
    pub match_count: usize,
}

/// Error type for catalog providers.
#[derive(Debug, Clone)]
pub struct CatalogError {
    message: String,
}

impl CatalogError {
    pub fn new(message: impl Into<String>) -> Self {
        CatalogError {
            message: message.into(),
        }
    }
}

impl fmt::Display for CatalogError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Report catalog error: {}", self.message)
    }
}

impl Error for CatalogError {}

impl From<CatalogError> for EndpointError {
    fn from(error: CatalogError) -> Self {
        EndpointError::Upstream(error.to_string())
    }
}

/// Access to a report catalog, wherever it lives.
#[async_trait]
pub trait ReportCatalog: Send + Sync {
    /// The full catalog in stable order.
    async fn fetch_all(&self) -> Result<Vec<Report>, CatalogError>;

    /// An authenticated URL for downloading one report document.
    async fn download_url(&self, report_id: &str, version: i64) -> Result<String, CatalogError>;
}

/// In-memory catalog used by tests and local wiring.
pub struct StaticReportCatalog {
    reports: Vec<Report>,
    url_base: String,
}

impl StaticReportCatalog {
    pub fn new(reports: Vec<Report>) -> Self {
        Self {
            reports,
            url_base: "https://reports.invalid/documents".to_string(),
        }
    }

    /// Override the base used when formatting download URLs.
    pub fn with_url_base(mut self, url_base: impl Into<String>) -> Self {
        self.url_base = url_base.into();
        self
    }
}

#[async_trait]
impl ReportCatalog for StaticReportCatalog {
    async fn fetch_all(&self) -> Result<Vec<Report>, CatalogError> {
        Ok(self.reports.clone())
    }

    async fn download_url(&self, report_id: &str, version: i64) -> Result<String, CatalogError> {
        if !self.reports.iter().any(|r| r.id == report_id) {
            return Err(CatalogError::new(format!(
                "no report with id '{}'",
                report_id
            )));
        }
        Ok(format!(
            "{}/{}?version={}",
            self.url_base,
            urlencoding::encode(report_id),
            version
        ))
    }
}

/// Catalog served by a remote HTTP endpoint.
///
/// Expects `GET {base}/reports` to return a JSON array of [`Report`] and
/// `GET {base}/reports/{id}/url?version=N` to return `{"url": "..."}`.
pub struct HttpReportCatalog {
    client: reqwest::Client,
    base_url: String,
}

impl HttpReportCatalog {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::builder()
                .timeout(Duration::from_secs(30))
                .build()
                .expect("Failed to build HTTP client"),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }
}

#[async_trait]
impl ReportCatalog for HttpReportCatalog {
    async fn fetch_all(&self) -> Result<Vec<Report>, CatalogError> {
        let url = format!("{}/reports", self.base_url);
        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| CatalogError::new(format!("catalog request failed: {}", e)))?;

        if !response.status().is_success() {
            return Err(CatalogError::new(format!(
                "catalog endpoint returned status {}",
                response.status()
            )));
        }

        response
            .json::<Vec<Report>>()
            .await
            .map_err(|e| CatalogError::new(format!("invalid catalog payload: {}", e)))
    }

    async fn download_url(&self, report_id: &str, version: i64) -> Result<String, CatalogError> {
        let url = format!(
            "{}/reports/{}/url?version={}",
            self.base_url,
            urlencoding::encode(report_id),
            version
        );
        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| CatalogError::new(format!("download-url request failed: {}", e)))?;

        if !response.status().is_success() {
            return Err(CatalogError::new(format!(
                "download-url endpoint returned status {}",
                response.status()
            )));
        }

        let payload: serde_json::Value = response
            .json()
            .await
            .map_err(|e| CatalogError::new(format!("invalid download-url payload: {}", e)))?;

        payload["url"]
            .as_str()
            .map(|s| s.to_string())
            .ok_or_else(|| CatalogError::new("download-url payload is missing 'url'"))
    }
}

/// Pagination and search over any [`ReportCatalog`].
pub struct ReportService {
    catalog: Arc<dyn ReportCatalog>,
}

impl ReportService {
    pub fn new(catalog: Arc<dyn ReportCatalog>) -> Self {
        Self { catalog }
    }

    /// One page of the catalog with truncated description previews.
    ///
    /// `page_size` must be 1..=[`MAX_LIST_PAGE_SIZE`] and `page_number` starts
    /// at 1. Requesting a page past the end of the catalog is a 404; page 1 of
    /// an empty catalog is an empty list.
    pub async fn list_page(
        &self,
        page_size: usize,
        page_number: usize,
    ) -> Result<Vec<Report>, EndpointError> {
        check_page_size(page_size, MAX_LIST_PAGE_SIZE)?;
        if page_number < 1 {
            return Err(EndpointError::InvalidParameter(
                "page_number must be at least 1".to_string(),
            ));
        }

        let reports = self.catalog.fetch_all().await?;
        let start = (page_number - 1) * page_size;
        if page_number > 1 && start >= reports.len() {
            return Err(EndpointError::NotFound(format!(
                "page {} not found",
                page_number
            )));
        }

        Ok(reports
            .into_iter()
            .skip(start)
            .take(page_size)
            .map(|mut report| {
                report.description = truncate_description(&report.description);
                report
            })
            .collect())
    }

    /// How many pages the catalog spans at the given page size.
    pub async fn total_pages(&self, page_size: usize) -> Result<usize, EndpointError> {
        check_page_size(page_size, MAX_COUNT_PAGE_SIZE)?;
        let total = self.catalog.fetch_all().await?.len();
        Ok((total + page_size - 1) / page_size)
    }

    /// Reports whose name or description contains any of the query words,
    /// ranked by descending whole-word match count.
    pub async fn search(
        &self,
        keywords: &str,
        max_results: usize,
    ) -> Result<Vec<ReportMatch>, EndpointError> {
        if max_results < 1 || max_results > MAX_SEARCH_RESULTS {
            return Err(EndpointError::InvalidParameter(format!(
                "max_results must be between 1 and {}",
                MAX_SEARCH_RESULTS
            )));
        }

        // Deduplicated lowercase words, joined into one alternation so each
        // report is scanned once.
        let words: BTreeSet<String> = keywords
            .to_lowercase()
            .split_whitespace()
            .map(|w| regex::escape(w))
            .collect();
        if words.is_empty() {
            return Err(EndpointError::InvalidParameter(
                "search_keywords must contain at least one word".to_string(),
            ));
        }

        let pattern = format!(
            r"\b(?:{})\b",
            words.iter().cloned().collect::<Vec<_>>().join("|")
        );
        let matcher = Regex::new(&pattern)
            .map_err(|e| EndpointError::Internal(format!("bad search pattern: {}", e)))?;

        let mut matches: Vec<ReportMatch> = self
            .catalog
            .fetch_all()
            .await?
            .into_iter()
            .filter_map(|report| {
                let name_matches = matcher.find_iter(&report.name.to_lowercase()).count();
                let description_matches =
                    matcher.find_iter(&report.description.to_lowercase()).count();
                let match_count = name_matches + description_matches;
                if match_count == 0 {
                    return None;
                }
                Some(ReportMatch {
                    id: report.id,
                    name: report.name,
                    description: report.description,
                    version: report.version,
                    match_count,
                })
            })
            .collect();

        // Stable sort keeps catalog order among equal scores.
        matches.sort_by(|a, b| b.match_count.cmp(&a.match_count));
        matches.truncate(max_results);
        Ok(matches)
    }

    /// The download URL for one report document.
    pub async fn report_url(
        &self,
        report_id: &str,
        version: i64,
    ) -> Result<String, EndpointError> {
        if report_id.trim().is_empty() {
            return Err(EndpointError::InvalidParameter(
                "report_id must not be empty".to_string(),
            ));
        }
        if version < 1 {
            return Err(EndpointError::InvalidParameter(
                "report_version must be at least 1".to_string(),
            ));
        }
        Ok(self.catalog.download_url(report_id.trim(), version).await?)
    }
}

fn check_page_size(page_size: usize, max: usize) -> Result<(), EndpointError> {
    if page_size < 1 || page_size > max {
        return Err(EndpointError::InvalidParameter(format!(
            "page_size must be between 1 and {}",
            max
        )));
    }
    Ok(())
}

/// First 100 characters of a description, with a "..." marker when truncated.
fn truncate_description(description: &str) -> String {
    let mut preview: String = description.chars().take(DESCRIPTION_PREVIEW_CHARS).collect();
    if description.chars().count() > DESCRIPTION_PREVIEW_CHARS {
        preview.push_str("...");
    }
    preview
}
