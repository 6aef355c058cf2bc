//! Observability utilities for the inventory collector.
//!
//! This crate provides:
//! - Prometheus metrics recording and export
//! - Inventory run, pricing and storage metrics
//! - Axum middleware for report API request metrics
//!
//! # Example
//!
//! ```rust,ignore
//! use observability::{init_metrics, metrics_handler, InventoryMetrics};
//!
//! init_metrics()?;
//!
//! InventoryMetrics::record_walk_started("production", "eu-west-1");
//! InventoryMetrics::record_walk_completed("production", "eu-west-1", 12, 431.5, 2.4);
//!
//! let app = Router::new().route("/metrics", get(metrics_handler));
//! ```

pub mod http;
pub mod inventory;

pub use http::track_requests;
pub use inventory::InventoryMetrics;

// Re-export metrics macros for convenience
pub use metrics::{counter, gauge, histogram};

use metrics_exporter_prometheus::{BuildError, PrometheusBuilder, PrometheusHandle};
use once_cell::sync::OnceCell;
use tracing::info;

static METRICS_HANDLE: OnceCell<PrometheusHandle> = OnceCell::new();

/// Initialize the Prometheus metrics recorder.
///
/// Installs the global recorder on the first call and returns the same handle
/// afterwards.
pub fn init_metrics() -> Result<&'static PrometheusHandle, BuildError> {
    METRICS_HANDLE.get_or_try_init(|| {
        let handle = PrometheusBuilder::new().install_recorder()?;

        info!("Prometheus metrics recorder initialized");
        register_metric_descriptions();

        Ok(handle)
    })
}

/// Get the metrics handle (must call init_metrics first)
pub fn get_metrics_handle() -> Option<&'static PrometheusHandle> {
    METRICS_HANDLE.get()
}

/// Axum handler for /metrics endpoint
pub async fn metrics_handler() -> String {
    match get_metrics_handle() {
        Some(handle) => handle.render(),
        None => "# Metrics not initialized\n".to_string(),
    }
}

fn register_metric_descriptions() {
    use metrics::describe_counter;
    use metrics::describe_gauge;
    use metrics::describe_histogram;

    // HTTP metrics
    describe_counter!("http_requests_total", "Total number of HTTP requests");
    describe_histogram!(
        "http_request_duration_seconds",
        "HTTP request duration in seconds"
    );

    // Inventory walk metrics
    describe_counter!(
        "inventory_walks_total",
        "Inventory walks by account, region and status"
    );
    describe_histogram!(
        "inventory_walk_duration_seconds",
        "Inventory walk duration in seconds"
    );
    describe_gauge!(
        "inventory_resources",
        "Resources discovered in the last walk by account and region"
    );
    describe_gauge!(
        "inventory_estimated_cost_usd",
        "Estimated cost for the current billing period in USD"
    );

    // Storage metrics
    describe_counter!(
        "inventory_store_failures_total",
        "Failed attempts to replace stored resources"
    );

    // Collection run metrics
    describe_counter!(
        "inventory_collection_runs_total",
        "Collection runs by status"
    );
    describe_gauge!(
        "inventory_resources_collected_last_run",
        "Resources collected across all scopes in the last run"
    );
}
