//! Backend Implementations
//!
//! Each submodule hosts the domain logic for one tool agent, together with the
//! capability trait that hides the external service it depends on:
//!
//! - **reports**: report catalog pagination, description truncation, download
//!   URLs, and keyword-overlap search behind [`reports::ReportCatalog`]
//! - **datetime**: current date/time snapshots, age and day arithmetic,
//!   business-day counting, and fiscal-year boundaries (no external service)
//! - **geolocation**: coordinate validation, geocoding and reverse geocoding
//!   behind [`geolocation::PlaceIndex`], and route summaries behind
//!   [`geolocation::RouteCalculator`]
//! - **weather**: forecast periods and station observations behind
//!   [`weather::ForecastProvider`], with an implementation backed by the
//!   National Weather Service API
//!
//! The wiring that turns these into dispatchable agents lives in
//! [`crate::agents`].

pub mod datetime;
pub mod geolocation;
pub mod reports;
pub mod weather;

pub use geolocation::{Coordinates, GeocodedPlace, PlaceIndex, RouteCalculator, RouteSummary};
pub use reports::{Report, ReportCatalog, ReportService};
pub use weather::{ForecastPeriod, ForecastProvider, Observation};
