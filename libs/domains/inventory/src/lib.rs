//! Inventory Domain
//!
//! Discovers managed database instances for one account/region, prices each
//! one against the provider's pricing catalog and produces normalized
//! [`Resource`] records with an estimated cost for the current billing period.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────┐
//! │   Pipeline   │  ← page walk, per-page concurrent pricing, cancellation
//! └──────┬───────┘
//!        │
//! ┌──────▼───────┐
//! │ Attributes / │  ← pure derivation: engine split, usage hours,
//! │ Filters/Cost │    catalog filters, cost estimate
//! └──────┬───────┘
//!        │
//! ┌──────▼───────┐
//! │ Collaborators│  ← ListingClient + PricingClient traits
//! └──────────────┘
//! ```
//!
//! # Usage
//!
//! ```rust,ignore
//! use domain_inventory::{AccountContext, InventoryPipeline};
//! use tokio::sync::watch;
//!
//! let (_shutdown_tx, shutdown_rx) = watch::channel(false);
//! let pipeline = InventoryPipeline::new(
//!     AccountContext::new("production", "eu-west-1"),
//!     listing_client,
//!     pricing_client,
//! )
//! .with_pricing_concurrency(8);
//!
//! let resources = pipeline.run(shutdown_rx).await?;
//! ```

pub mod attributes;
pub mod cost;
pub mod error;
pub mod filters;
pub mod listing;
pub mod lookup;
pub mod models;
pub mod pipeline;
pub mod pricing;

// Re-export commonly used types
pub use attributes::{derive_attributes, split_engine, usage_hours};
pub use cost::estimate_cost;
pub use error::{InventoryError, InventoryResult, PartialInventory};
pub use filters::{PriceFilter, PriceFilterBuilder, PriceFilterSet};
pub use listing::ListingClient;
pub use models::{
    AccountContext, DbInstanceRecord, DeploymentMode, DerivedAttributes, ListingPage, Resource,
    Tag,
};
pub use pipeline::{InventoryPipeline, PROVIDER_AWS, SERVICE_RDS_INSTANCE};
pub use pricing::{PricingCatalogResponse, PricingClient, PricingResolver, parse_unit_price};
