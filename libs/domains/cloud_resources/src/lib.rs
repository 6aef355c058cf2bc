//! Cloud Resources Domain
//!
//! Stores the inventory produced by collection runs and builds the reports
//! served on top of it: dashboard totals, grouped breakdowns and the region map.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────┐
//! │  Handlers   │  ← HTTP endpoints
//! └──────┬──────┘
//!        │
//! ┌──────▼──────┐
//! │   Service   │  ← Report shaping: breakdown, locations
//! └──────┬──────┘
//!        │
//! ┌──────▼──────┐
//! │ Repository  │  ← Storage (trait + in-memory / PostgreSQL)
//! └──────┬──────┘
//!        │
//! ┌──────▼──────┐
//! │   Models    │  ← Scopes, grouped counts, report rows
//! └─────────────┘
//! ```
//!
//! # Usage
//!
//! ```rust,no_run
//! use core_config::{database::DatabaseConfig, FromEnv};
//! use domain_cloud_resources::{handlers, PgResourceRepository, ReportService};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let repository = PgResourceRepository::connect(&DatabaseConfig::from_env()?).await?;
//! repository.ensure_schema().await?;
//!
//! let router = handlers::router(ReportService::new(repository));
//! # Ok(())
//! # }
//! ```

pub mod breakdown;
pub mod error;
pub mod handlers;
pub mod locations;
pub mod models;
pub mod postgres;
pub mod repository;
pub mod service;

// Re-export commonly used types
pub use breakdown::summarize_breakdown;
pub use error::{ReportError, ReportResult};
pub use locations::{location_breakdown, location_for_region};
pub use models::{
    BreakdownRequest, DashboardStats, GroupedCount, GroupingField, Location, LocationBreakdown,
    ResourceScope,
};
pub use postgres::PgResourceRepository;
pub use repository::{InMemoryResourceRepository, ResourceRepository};
pub use service::ReportService;
