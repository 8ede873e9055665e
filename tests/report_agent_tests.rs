//! Integration tests for the report catalog agent, exercised end to end
//! through `ToolAgent::resolve` against an in-memory catalog.

use std::sync::Arc;

use agent_tools::agents::report_agent;
use agent_tools::backends::reports::{Report, StaticReportCatalog};
use agent_tools::QueryParams;

fn compliance_catalog() -> Arc<StaticReportCatalog> {
    Arc::new(
        StaticReportCatalog::new(vec![
            Report {
                id: "fedramp-pkg".into(),
                name: "FedRAMP Customer Package".into(),
                version: 3,
                description:
                    "FedRAMP moderate baseline security package covering all in-scope services. \
                     Includes the system security plan, control matrices, continuous monitoring \
                     summaries, and the annual assessment letter."
                        .into(),
            },
            Report {
                id: "soc2-type2".into(),
                name: "SOC 2 Type II".into(),
                version: 1,
                description: "Service organization controls report for the trailing twelve months."
                    .into(),
            },
            Report {
                id: "iso27001".into(),
                name: "ISO 27001 Certificate".into(),
                version: 2,
                description: "Certificate of ISO 27001 conformance with statement of applicability."
                    .into(),
            },
        ])
        .with_url_base("https://compliance.example.com/documents"),
    )
}

#[tokio::test]
async fn listing_truncates_long_descriptions() {
    let agent = report_agent(compliance_catalog());
    let response = agent
        .resolve("/rp", QueryParams::from_pairs(vec![("page_size", "10")]))
        .await;

    assert_eq!(response.status_code, 200);
    let reports = response.body["reports"].as_array().unwrap();
    assert_eq!(reports.len(), 3);

    // The FedRAMP description is over 100 characters, so the listing carries
    // a preview ending in "...".
    let fedramp = &reports[0];
    let preview = fedramp["description"].as_str().unwrap();
    assert!(preview.ends_with("..."));
    assert_eq!(preview.chars().count(), 103);
}

#[tokio::test]
async fn page_past_end_is_not_found() {
    let agent = report_agent(compliance_catalog());
    let response = agent
        .resolve(
            "/rp",
            QueryParams::from_pairs(vec![("page_size", "2"), ("page_number", "5")]),
        )
        .await;
    assert_eq!(response.status_code, 404);
}

#[tokio::test]
async fn page_size_over_cap_is_rejected() {
    let agent = report_agent(compliance_catalog());
    let response = agent
        .resolve("/rp", QueryParams::from_pairs(vec![("page_size", "11")]))
        .await;
    assert_eq!(response.status_code, 400);
}

#[tokio::test]
async fn total_pages_round_up() {
    let agent = report_agent(compliance_catalog());
    let response = agent
        .resolve("/rp/pg", QueryParams::from_pairs(vec![("page_size", "2")]))
        .await;
    assert_eq!(response.status_code, 200);
    assert_eq!(response.body["total_pages"], 2);
}

#[tokio::test]
async fn download_url_resolves_through_catalog() {
    let agent = report_agent(compliance_catalog());
    let response = agent
        .resolve(
            "/rp/url",
            QueryParams::from_pairs(vec![("report_id", "soc2-type2"), ("report_version", "1")]),
        )
        .await;
    assert_eq!(response.status_code, 200);
    let url = response.body["url"].as_str().unwrap();
    assert!(url.starts_with("https://compliance.example.com/documents/"));
    assert!(url.contains("soc2-type2"));
}

#[tokio::test]
async fn unknown_report_surfaces_as_upstream_failure() {
    let agent = report_agent(compliance_catalog());
    let response = agent
        .resolve(
            "/rp/url",
            QueryParams::from_pairs(vec![("report_id", "nope"), ("report_version", "1")]),
        )
        .await;
    assert_eq!(response.status_code, 502);
}

#[tokio::test]
async fn search_ranks_and_carries_full_descriptions() {
    let agent = report_agent(compliance_catalog());
    let response = agent
        .resolve(
            "/rp/srch",
            QueryParams::from_pairs(vec![("search_keywords", "fedramp security baseline")]),
        )
        .await;

    assert_eq!(response.status_code, 200);
    let hits = response.body["reports"].as_array().unwrap();
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0]["id"], "fedramp-pkg");
    assert!(hits[0]["match_count"].as_u64().unwrap() >= 3);
    // Search results keep the untruncated description.
    assert!(!hits[0]["description"].as_str().unwrap().ends_with("..."));
}

#[tokio::test]
async fn search_keywords_arrive_decoded() {
    let agent = report_agent(compliance_catalog());
    // As delivered over the wire: a percent-encoded query string.
    let response = agent
        .resolve(
            "/rp/srch",
            QueryParams::from_query_string("search_keywords=iso%2027001"),
        )
        .await;
    assert_eq!(response.status_code, 200);
    let hits = response.body["reports"].as_array().unwrap();
    assert_eq!(hits[0]["id"], "iso27001");
}

#[tokio::test]
async fn current_date_helper_route() {
    let agent = report_agent(compliance_catalog());
    let response = agent.resolve("/cd", QueryParams::new()).await;
    assert_eq!(response.status_code, 200);
    assert_eq!(response.body["timezone"], "UTC");
    assert_eq!(response.body["date"].as_str().unwrap().len(), 10);
}
