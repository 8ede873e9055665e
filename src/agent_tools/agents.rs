//! Agent Constructors
//!
//! Each function here builds one [`ToolAgent`]: it wires the backend logic to
//! its routes, with all parameter parsing and default handling done at the
//! route boundary. Backends that depend on an external service take their
//! capability implementation as an `Arc` so callers decide what sits behind
//! each agent.
//!
//! # Example
//!
//! ```rust
//! use agent_tools::agents::datetime_agent;
//! use agent_tools::endpoint::QueryParams;
//!
//! # #[tokio::main]
//! # async fn main() {
//! let agent = datetime_agent();
//! let response = agent
//!     .resolve(
//!         "/age",
//!         QueryParams::from_pairs(vec![("birth_date", "1990-06-15")]),
//!     )
//!     .await;
//! assert_eq!(response.status_code, 200);
//! # }
//! ```

use std::convert::TryFrom;
use std::sync::Arc;

use chrono::Utc;
use serde_json::json;

use crate::agent_tools::agent::{handler, ToolAgent};
use crate::agent_tools::backends::datetime;
use crate::agent_tools::backends::geolocation::{
    format_postal_address, Coordinates, DistanceUnit, PlaceIndex, RouteCalculator, TravelMode,
};
use crate::agent_tools::backends::reports::{ReportCatalog, ReportService};
use crate::agent_tools::backends::weather::{take_periods, ForecastProvider};
use crate::agent_tools::endpoint::{EndpointError, EndpointResponse, QueryParams};

/// Default page size for report listings.
const DEFAULT_REPORT_PAGE_SIZE: i64 = 5;
/// Default result count for report searches.
const DEFAULT_SEARCH_RESULTS: i64 = 5;
/// Most forecast periods a single request may ask for (two per day).
const MAX_FORECAST_PERIODS: usize = 5;

fn snapshot_response() -> EndpointResponse {
    let snapshot = datetime::current_date_time();
    EndpointResponse::ok(json!({
        "date": snapshot.date,
        "time": snapshot.time,
        "day": snapshot.day,
        "timezone": snapshot.timezone,
    }))
}

fn usize_param(name: &str, value: i64) -> Result<usize, EndpointError> {
    usize::try_from(value).map_err(|_| {
        EndpointError::InvalidParameter(format!("parameter '{}' must not be negative", name))
    })
}

fn coordinates_from(
    params: &QueryParams,
    latitude_name: &str,
    longitude_name: &str,
) -> Result<Coordinates, EndpointError> {
    let latitude = params.require_f64(latitude_name)?;
    let longitude = params.require_f64(longitude_name)?;
    Coordinates::new(latitude, longitude)
        .map_err(|e| EndpointError::InvalidParameter(e.to_string()))
}

/// Agent serving the report catalog routes.
pub fn report_agent(catalog: Arc<dyn ReportCatalog>) -> ToolAgent {
    let service = Arc::new(ReportService::new(catalog));

    let list_service = Arc::clone(&service);
    let pages_service = Arc::clone(&service);
    let url_service = Arc::clone(&service);
    let search_service = Arc::clone(&service);

    ToolAgent::new("reports")
        .route(
            "/rp",
            "Lists one page of the report catalog with description previews",
            handler(move |params: QueryParams| {
                let service = Arc::clone(&list_service);
                async move {
                    let page_size = usize_param(
                        "page_size",
                        params.get_i64_or("page_size", DEFAULT_REPORT_PAGE_SIZE)?,
                    )?;
                    let page_number =
                        usize_param("page_number", params.get_i64_or("page_number", 1)?)?;
                    let reports = service.list_page(page_size, page_number).await?;
                    Ok(EndpointResponse::ok(json!({ "reports": reports })))
                }
            }),
        )
        .route(
            "/rp/pg",
            "Returns how many pages the report catalog spans",
            handler(move |params: QueryParams| {
                let service = Arc::clone(&pages_service);
                async move {
                    let page_size = usize_param(
                        "page_size",
                        params.get_i64_or("page_size", DEFAULT_REPORT_PAGE_SIZE)?,
                    )?;
                    let total_pages = service.total_pages(page_size).await?;
                    Ok(EndpointResponse::ok(json!({ "total_pages": total_pages })))
                }
            }),
        )
        .route(
            "/rp/url",
            "Returns the download URL for one report document",
            handler(move |params: QueryParams| {
                let service = Arc::clone(&url_service);
                async move {
                    let report_id = params.require("report_id")?;
                    let version = params.require_i64("report_version")?;
                    let url = service.report_url(&report_id, version).await?;
                    Ok(EndpointResponse::ok(json!({ "url": url })))
                }
            }),
        )
        .route(
            "/rp/srch",
            "Searches the report catalog by keywords, ranked by match count",
            handler(move |params: QueryParams| {
                let service = Arc::clone(&search_service);
                async move {
                    let keywords = params.require("search_keywords")?;
                    let max_results = usize_param(
                        "max_results",
                        params.get_i64_or("max_results", DEFAULT_SEARCH_RESULTS)?,
                    )?;
                    let matches = service.search(&keywords, max_results).await?;
                    Ok(EndpointResponse::ok(json!({ "reports": matches })))
                }
            }),
        )
        .route(
            "/cd",
            "Returns the current UTC date, time, and weekday",
            handler(|_params: QueryParams| async move { Ok(snapshot_response()) }),
        )
}

/// Agent serving the date/time arithmetic routes. Pure chrono logic, no
/// injected services.
pub fn datetime_agent() -> ToolAgent {
    ToolAgent::new("datetime")
        .route(
            "/dt",
            "Returns the current UTC date, time, and weekday",
            handler(|_params: QueryParams| async move { Ok(snapshot_response()) }),
        )
        .route(
            "/age",
            "Calculates age in whole years from a birth date",
            handler(|params: QueryParams| async move {
                let birth_date = datetime::parse_date(&params.require("birth_date")?)?;
                let age = datetime::calculate_age(birth_date, Utc::now().date_naive())?;
                Ok(EndpointResponse::ok(json!({ "age": age })))
            }),
        )
        .route(
            "/ddiff",
            "Signed number of days between two dates",
            handler(|params: QueryParams| async move {
                let start_date = datetime::parse_date(&params.require("start_date")?)?;
                let end_date = datetime::parse_date(&params.require("end_date")?)?;
                let days = datetime::date_diff(start_date, end_date);
                Ok(EndpointResponse::ok(json!({ "days": days })))
            }),
        )
        .route(
            "/bdays",
            "Business days between two dates (start inclusive, end exclusive)",
            handler(|params: QueryParams| async move {
                let start_date = datetime::parse_date(&params.require("start_date")?)?;
                let end_date = datetime::parse_date(&params.require("end_date")?)?;
                let business_days = datetime::business_days_between(start_date, end_date);
                Ok(EndpointResponse::ok(
                    json!({ "business_days": business_days }),
                ))
            }),
        )
        .route(
            "/fy",
            "Fiscal year containing a date",
            handler(|params: QueryParams| async move {
                let date = datetime::parse_date(&params.require("date_str")?)?;
                let start_month = fiscal_start_month(&params)?;
                let fiscal_year = datetime::fiscal_year(date, start_month)?;
                Ok(EndpointResponse::ok(json!({ "fiscal_year": fiscal_year })))
            }),
        )
        .route(
            "/fyr",
            "First and last day of the fiscal year containing a date",
            handler(|params: QueryParams| async move {
                let date = datetime::parse_date(&params.require("date_str")?)?;
                let start_month = fiscal_start_month(&params)?;
                let (start, end) = datetime::fiscal_year_range(date, start_month)?;
                Ok(EndpointResponse::ok(json!({
                    "fiscal_year_range": format!("{} to {}", start, end),
                })))
            }),
        )
        .route(
            "/nbday",
            "Next business day after a date, skipping weekends and holidays",
            handler(|params: QueryParams| async move {
                let date = datetime::parse_date(&params.require("date_str")?)?;
                let next = datetime::next_business_day(date);
                Ok(EndpointResponse::ok(
                    json!({ "next_business_day": next.to_string() }),
                ))
            }),
        )
        .route(
            "/pdl",
            "Whether a named policy has expired",
            handler(|params: QueryParams| async move {
                let policy_name = params.require("policy_name")?;
                let expiry = datetime::parse_date_time(&params.require("expiry_date")?)?;
                let message =
                    datetime::policy_status(&policy_name, expiry, Utc::now().naive_utc());
                Ok(EndpointResponse::ok(json!({ "policy_status": message })))
            }),
        )
}

fn fiscal_start_month(params: &QueryParams) -> Result<u32, EndpointError> {
    let raw = params.get_i64_or(
        "fiscal_year_start_month",
        datetime::DEFAULT_FISCAL_YEAR_START_MONTH as i64,
    )?;
    u32::try_from(raw).map_err(|_| {
        EndpointError::InvalidParameter(
            "fiscal_year_start_month must be between 1 and 12".to_string(),
        )
    })
}

/// Agent serving the geocoding, reverse geocoding, and routing routes.
pub fn geolocation_agent(
    place_index: Arc<dyn PlaceIndex>,
    route_calculator: Arc<dyn RouteCalculator>,
) -> ToolAgent {
    let geocode_index = Arc::clone(&place_index);
    let search_index = Arc::clone(&place_index);
    let reverse_index = place_index;

    ToolAgent::new("geolocation")
        .route(
            "/geocode",
            "Geocodes a US postal address into coordinates",
            handler(move |params: QueryParams| {
                let index = Arc::clone(&geocode_index);
                async move {
                    let address = format_postal_address(
                        &params.require("street_number")?,
                        &params.require("street_name")?,
                        &params.require("city")?,
                        &params.require("state")?,
                        &params.require("zip_code")?,
                    );
                    let place = index
                        .geocode(&address)
                        .await?
                        .ok_or_else(|| EndpointError::NotFound("Coordinates not found".into()))?;
                    Ok(EndpointResponse::ok(json!({
                        "Latitude": place.coordinates.latitude,
                        "Longitude": place.coordinates.longitude,
                    })))
                }
            }),
        )
        .route(
            "/search",
            "Finds a place from a free-text location description",
            handler(move |params: QueryParams| {
                let index = Arc::clone(&search_index);
                async move {
                    let description = params.require("location_description")?;
                    let place = index
                        .geocode(&description)
                        .await?
                        .ok_or_else(|| EndpointError::NotFound("Search result not found".into()))?;
                    Ok(EndpointResponse::ok(json!({
                        "label": place.label,
                        "Latitude": place.coordinates.latitude,
                        "Longitude": place.coordinates.longitude,
                    })))
                }
            }),
        )
        .route(
            "/rev-geocode",
            "Finds the address nearest to a coordinate pair",
            handler(move |params: QueryParams| {
                let index = Arc::clone(&reverse_index);
                async move {
                    let coordinates = coordinates_from(&params, "latitude", "longitude")?;
                    let address = index
                        .reverse_geocode(coordinates)
                        .await?
                        .ok_or_else(|| EndpointError::NotFound("Address not found".into()))?;
                    Ok(EndpointResponse::ok(json!({ "address": address })))
                }
            }),
        )
        .route(
            "/route",
            "Summarizes a route between two coordinate pairs",
            handler(move |params: QueryParams| {
                let calculator = Arc::clone(&route_calculator);
                async move {
                    let departure =
                        coordinates_from(&params, "departure_latitude", "departure_longitude")?;
                    let destination =
                        coordinates_from(&params, "destination_latitude", "destination_longitude")?;
                    let mode = TravelMode::parse(&params.get_or("travel_mode", "Car"))
                        .map_err(|e| EndpointError::InvalidParameter(e.to_string()))?;
                    let unit = DistanceUnit::parse(&params.get_or("distance_unit", "Miles"))
                        .map_err(|e| EndpointError::InvalidParameter(e.to_string()))?;
                    let summary = calculator
                        .route(departure, destination, mode, unit)
                        .await?
                        .ok_or_else(|| EndpointError::NotFound("Route not found".into()))?;
                    Ok(EndpointResponse::ok(summary.summarize()))
                }
            }),
        )
}

/// Agent serving the weather forecast and observation routes. Takes a
/// [`PlaceIndex`] as well so location descriptions can be resolved to
/// coordinates without leaving the agent.
pub fn weather_agent(
    provider: Arc<dyn ForecastProvider>,
    place_index: Arc<dyn PlaceIndex>,
) -> ToolAgent {
    let forecast_provider = Arc::clone(&provider);
    let observation_provider = provider;

    ToolAgent::new("weather")
        .route(
            "/forecast",
            "Weather forecast periods for a coordinate pair",
            handler(move |params: QueryParams| {
                let provider = Arc::clone(&forecast_provider);
                async move {
                    let coordinates = coordinates_from(&params, "latitude", "longitude")?;
                    let periods = provider.forecast(coordinates).await?;
                    let periods = match params.get("num_forecast_periods") {
                        Some(_) => {
                            let count = usize_param(
                                "num_forecast_periods",
                                params.require_i64("num_forecast_periods")?,
                            )?;
                            take_periods(periods, count, MAX_FORECAST_PERIODS)?
                        }
                        // Omitted means every available period, up to the
                        // documented maximum.
                        None => periods
                            .into_iter()
                            .take(MAX_FORECAST_PERIODS)
                            .collect(),
                    };
                    Ok(EndpointResponse::ok(json!({ "periods": periods })))
                }
            }),
        )
        .route(
            "/coords",
            "Coordinates for a free-text location description",
            handler(move |params: QueryParams| {
                let index = Arc::clone(&place_index);
                async move {
                    let description = params.require("location_description")?;
                    let place = index
                        .geocode(&description)
                        .await?
                        .ok_or_else(|| EndpointError::NotFound("Coordinates not found".into()))?;
                    Ok(EndpointResponse::ok(json!({
                        "Latitude": place.coordinates.latitude,
                        "Longitude": place.coordinates.longitude,
                    })))
                }
            }),
        )
        .route(
            "/station",
            "Latest observation from a weather station",
            handler(move |params: QueryParams| {
                let provider = Arc::clone(&observation_provider);
                async move {
                    let station_id = params.require("station_id")?;
                    let observation = provider.latest_observation(&station_id).await?;
                    Ok(EndpointResponse::ok(json!({
                        "temperature_c": observation.temperature_c,
                        "description": observation.description,
                    })))
                }
            }),
        )
        .route(
            "/get-datetime",
            "Returns the current UTC date, time, and weekday",
            handler(|_params: QueryParams| async move { Ok(snapshot_response()) }),
        )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agent_tools::backends::geolocation::{HaversineRouteCalculator, StaticPlaceIndex};
    use crate::agent_tools::backends::reports::{Report, StaticReportCatalog};

    fn sample_report_agent() -> ToolAgent {
        let reports = (1..=7)
            .map(|i| Report {
                id: format!("rpt-{}", i),
                name: format!("Report {}", i),
                version: 1,
                description: format!("Description for report {}", i),
            })
            .collect();
        report_agent(Arc::new(StaticReportCatalog::new(reports)))
    }

    fn sample_geolocation_agent() -> ToolAgent {
        let index = StaticPlaceIndex::new()
            .with_place("950 NW Carkeek Park Rd., Seattle, WA 98177", 47.7114, -122.3668)
            .unwrap();
        geolocation_agent(Arc::new(index), Arc::new(HaversineRouteCalculator::new()))
    }

    #[tokio::test]
    async fn test_report_listing_defaults() {
        let agent = sample_report_agent();
        let response = agent.resolve("/rp", QueryParams::new()).await;
        assert_eq!(response.status_code, 200);
        assert_eq!(response.body["reports"].as_array().unwrap().len(), 5);
    }

    #[tokio::test]
    async fn test_report_page_count() {
        let agent = sample_report_agent();
        let response = agent
            .resolve("/rp/pg", QueryParams::from_pairs(vec![("page_size", "3")]))
            .await;
        assert_eq!(response.status_code, 200);
        assert_eq!(response.body["total_pages"], 3);
    }

    #[tokio::test]
    async fn test_report_url_requires_both_parameters() {
        let agent = sample_report_agent();
        let response = agent
            .resolve("/rp/url", QueryParams::from_pairs(vec![("report_id", "rpt-1")]))
            .await;
        assert_eq!(response.status_code, 400);
    }

    #[tokio::test]
    async fn test_report_search() {
        let agent = sample_report_agent();
        let response = agent
            .resolve(
                "/rp/srch",
                QueryParams::from_pairs(vec![("search_keywords", "report")]),
            )
            .await;
        assert_eq!(response.status_code, 200);
        assert_eq!(response.body["reports"].as_array().unwrap().len(), 5);
    }

    #[tokio::test]
    async fn test_datetime_snapshot_route() {
        let agent = datetime_agent();
        let response = agent.resolve("/dt", QueryParams::new()).await;
        assert_eq!(response.status_code, 200);
        assert_eq!(response.body["timezone"], "UTC");
    }

    #[tokio::test]
    async fn test_datetime_diff_route() {
        let agent = datetime_agent();
        let response = agent
            .resolve(
                "/ddiff",
                QueryParams::from_pairs(vec![
                    ("start_date", "2026-05-01"),
                    ("end_date", "2026-05-15"),
                ]),
            )
            .await;
        assert_eq!(response.status_code, 200);
        assert_eq!(response.body["days"], 14);
    }

    #[tokio::test]
    async fn test_datetime_bad_date_is_400() {
        let agent = datetime_agent();
        let response = agent
            .resolve(
                "/age",
                QueryParams::from_pairs(vec![("birth_date", "06/15/1990")]),
            )
            .await;
        assert_eq!(response.status_code, 400);
    }

    #[tokio::test]
    async fn test_fiscal_year_route_default_october() {
        let agent = datetime_agent();
        let response = agent
            .resolve("/fy", QueryParams::from_pairs(vec![("date_str", "2024-11-15")]))
            .await;
        assert_eq!(response.status_code, 200);
        assert_eq!(response.body["fiscal_year"], 2024);
    }

    #[tokio::test]
    async fn test_geocode_route() {
        let agent = sample_geolocation_agent();
        let response = agent
            .resolve(
                "/geocode",
                QueryParams::from_pairs(vec![
                    ("street_number", "950"),
                    ("street_name", "NW Carkeek Park Rd."),
                    ("city", "Seattle"),
                    ("state", "WA"),
                    ("zip_code", "98177"),
                ]),
            )
            .await;
        assert_eq!(response.status_code, 200);
        assert!(response.body["Latitude"].as_f64().unwrap() > 47.0);
    }

    #[tokio::test]
    async fn test_geocode_miss_is_404() {
        let agent = sample_geolocation_agent();
        let response = agent
            .resolve(
                "/geocode",
                QueryParams::from_pairs(vec![
                    ("street_number", "1"),
                    ("street_name", "Nowhere Ln"),
                    ("city", "Atlantis"),
                    ("state", "XX"),
                    ("zip_code", "00000"),
                ]),
            )
            .await;
        assert_eq!(response.status_code, 404);
        assert!(response.body["error"]
            .as_str()
            .unwrap()
            .contains("Coordinates not found"));
    }

    #[tokio::test]
    async fn test_route_rejects_bad_travel_mode() {
        let agent = sample_geolocation_agent();
        let response = agent
            .resolve(
                "/route",
                QueryParams::from_pairs(vec![
                    ("departure_latitude", "47.6"),
                    ("departure_longitude", "-122.3"),
                    ("destination_latitude", "45.5"),
                    ("destination_longitude", "-122.7"),
                    ("travel_mode", "boat"),
                ]),
            )
            .await;
        assert_eq!(response.status_code, 400);
    }

    #[tokio::test]
    async fn test_route_summary_shape() {
        let agent = sample_geolocation_agent();
        let response = agent
            .resolve(
                "/route",
                QueryParams::from_pairs(vec![
                    ("departure_latitude", "47.6"),
                    ("departure_longitude", "-122.3"),
                    ("destination_latitude", "45.5"),
                    ("destination_longitude", "-122.7"),
                ]),
            )
            .await;
        assert_eq!(response.status_code, 200);
        assert_eq!(response.body["TotalDistance"]["Unit"], "Miles");
        assert!(response.body["TotalDuration"].as_str().unwrap().contains("hours"));
    }

    #[tokio::test]
    async fn test_rev_geocode_rejects_out_of_range_latitude() {
        let agent = sample_geolocation_agent();
        let response = agent
            .resolve(
                "/rev-geocode",
                QueryParams::from_pairs(vec![("latitude", "91.0"), ("longitude", "0.0")]),
            )
            .await;
        assert_eq!(response.status_code, 400);
    }
}
