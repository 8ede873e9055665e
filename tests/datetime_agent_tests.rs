//! Integration tests for the date/time agent routes.

use agent_tools::agents::datetime_agent;
use agent_tools::QueryParams;

#[tokio::test]
async fn snapshot_route_shape() {
    let agent = datetime_agent();
    let response = agent.resolve("/dt", QueryParams::new()).await;

    assert_eq!(response.status_code, 200);
    assert_eq!(response.body["timezone"], "UTC");
    // mm/dd/YYYY and HH:MM:SS.
    assert_eq!(response.body["date"].as_str().unwrap().len(), 10);
    assert_eq!(response.body["time"].as_str().unwrap().len(), 8);
    assert!(!response.body["day"].as_str().unwrap().is_empty());
}

#[tokio::test]
async fn age_route() {
    let agent = datetime_agent();
    let response = agent
        .resolve(
            "/age",
            QueryParams::from_pairs(vec![("birth_date", "1990-06-15")]),
        )
        .await;
    assert_eq!(response.status_code, 200);
    assert!(response.body["age"].as_i64().unwrap() >= 35);
}

#[tokio::test]
async fn future_birth_date_is_rejected() {
    let agent = datetime_agent();
    let response = agent
        .resolve(
            "/age",
            QueryParams::from_pairs(vec![("birth_date", "2999-01-01")]),
        )
        .await;
    assert_eq!(response.status_code, 400);
}

#[tokio::test]
async fn date_diff_is_signed() {
    let agent = datetime_agent();

    let forward = agent
        .resolve(
            "/ddiff",
            QueryParams::from_pairs(vec![
                ("start_date", "2026-05-01"),
                ("end_date", "2026-05-15"),
            ]),
        )
        .await;
    assert_eq!(forward.body["days"], 14);

    let backward = agent
        .resolve(
            "/ddiff",
            QueryParams::from_pairs(vec![
                ("start_date", "2026-05-15"),
                ("end_date", "2026-05-01"),
            ]),
        )
        .await;
    assert_eq!(backward.body["days"], -14);
}

#[tokio::test]
async fn business_days_route() {
    let agent = datetime_agent();
    let response = agent
        .resolve(
            "/bdays",
            QueryParams::from_pairs(vec![
                ("start_date", "2026-05-01"),
                ("end_date", "2026-05-15"),
            ]),
        )
        .await;
    assert_eq!(response.status_code, 200);
    assert_eq!(response.body["business_days"], 10);
}

#[tokio::test]
async fn inverted_business_day_range_is_zero() {
    let agent = datetime_agent();
    let response = agent
        .resolve(
            "/bdays",
            QueryParams::from_pairs(vec![
                ("start_date", "2026-05-15"),
                ("end_date", "2026-05-01"),
            ]),
        )
        .await;
    assert_eq!(response.body["business_days"], 0);
}

#[tokio::test]
async fn fiscal_year_route_with_custom_start_month() {
    let agent = datetime_agent();

    let default_start = agent
        .resolve(
            "/fy",
            QueryParams::from_pairs(vec![("date_str", "2024-09-30")]),
        )
        .await;
    assert_eq!(default_start.body["fiscal_year"], 2023);

    let january_start = agent
        .resolve(
            "/fy",
            QueryParams::from_pairs(vec![
                ("date_str", "2024-09-30"),
                ("fiscal_year_start_month", "1"),
            ]),
        )
        .await;
    assert_eq!(january_start.body["fiscal_year"], 2024);
}

#[tokio::test]
async fn fiscal_year_range_route() {
    let agent = datetime_agent();
    let response = agent
        .resolve(
            "/fyr",
            QueryParams::from_pairs(vec![("date_str", "2024-11-15")]),
        )
        .await;
    assert_eq!(response.status_code, 200);
    assert_eq!(
        response.body["fiscal_year_range"],
        "2024-10-01 to 2025-09-30"
    );
}

#[tokio::test]
async fn bad_start_month_is_rejected() {
    let agent = datetime_agent();
    let response = agent
        .resolve(
            "/fy",
            QueryParams::from_pairs(vec![
                ("date_str", "2024-11-15"),
                ("fiscal_year_start_month", "13"),
            ]),
        )
        .await;
    assert_eq!(response.status_code, 400);
}

#[tokio::test]
async fn next_business_day_skips_holiday_weekend() {
    let agent = datetime_agent();
    // Thursday before Independence Day: Friday is a holiday, then the
    // weekend.
    let response = agent
        .resolve(
            "/nbday",
            QueryParams::from_pairs(vec![("date_str", "2025-07-03")]),
        )
        .await;
    assert_eq!(response.status_code, 200);
    assert_eq!(response.body["next_business_day"], "2025-07-07");
}

#[tokio::test]
async fn expired_policy_status() {
    let agent = datetime_agent();
    let response = agent
        .resolve(
            "/pdl",
            QueryParams::from_pairs(vec![
                ("policy_name", "Investment"),
                ("expiry_date", "2022-01-01 00:00:00"),
            ]),
        )
        .await;
    assert_eq!(response.status_code, 200);
    let message = response.body["policy_status"].as_str().unwrap();
    assert!(message.contains("Investment"));
    assert!(message.contains("has expired on 2022-01-01 00:00:00"));
}

#[tokio::test]
async fn valid_policy_status() {
    let agent = datetime_agent();
    let response = agent
        .resolve(
            "/pdl",
            QueryParams::from_pairs(vec![
                ("policy_name", "Retention"),
                ("expiry_date", "2999-01-01 00:00:00"),
            ]),
        )
        .await;
    assert!(response.body["policy_status"]
        .as_str()
        .unwrap()
        .contains("still valid"));
}

#[tokio::test]
async fn malformed_expiry_date_is_rejected() {
    let agent = datetime_agent();
    let response = agent
        .resolve(
            "/pdl",
            QueryParams::from_pairs(vec![
                ("policy_name", "Retention"),
                ("expiry_date", "2022-01-01"),
            ]),
        )
        .await;
    assert_eq!(response.status_code, 400);
}
