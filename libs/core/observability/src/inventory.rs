//! Metrics for inventory walks and collection runs.

use metrics::{counter, gauge, histogram};

/// Inventory metrics recorder
pub struct InventoryMetrics;

impl InventoryMetrics {
    // =========================================================================
    // Walk Metrics
    // =========================================================================

    pub fn record_walk_started(account: &str, region: &str) {
        counter!(
            "inventory_walks_total",
            "account" => account.to_string(),
            "region" => region.to_string(),
            "status" => "started"
        )
        .increment(1);

        tracing::debug!(account = account, region = region, "Inventory walk started");
    }

    /// Record a finished walk and publish its resource count and cost
    pub fn record_walk_completed(
        account: &str,
        region: &str,
        resources: usize,
        estimated_cost: f64,
        duration_secs: f64,
    ) {
        counter!(
            "inventory_walks_total",
            "account" => account.to_string(),
            "region" => region.to_string(),
            "status" => "completed"
        )
        .increment(1);

        histogram!(
            "inventory_walk_duration_seconds",
            "account" => account.to_string(),
            "region" => region.to_string()
        )
        .record(duration_secs);

        Self::set_scope_totals(account, region, resources, estimated_cost);
    }

    /// Record a walk that stopped early. `reason` is `failed` or `cancelled`.
    pub fn record_walk_stopped(account: &str, region: &str, reason: &'static str) {
        counter!(
            "inventory_walks_total",
            "account" => account.to_string(),
            "region" => region.to_string(),
            "status" => reason
        )
        .increment(1);
    }

    pub fn set_scope_totals(account: &str, region: &str, resources: usize, estimated_cost: f64) {
        gauge!(
            "inventory_resources",
            "account" => account.to_string(),
            "region" => region.to_string()
        )
        .set(resources as f64);

        gauge!(
            "inventory_estimated_cost_usd",
            "account" => account.to_string(),
            "region" => region.to_string()
        )
        .set(estimated_cost);
    }

    // =========================================================================
    // Storage Metrics
    // =========================================================================

    pub fn record_store_failed(account: &str, region: &str) {
        counter!(
            "inventory_store_failures_total",
            "account" => account.to_string(),
            "region" => region.to_string()
        )
        .increment(1);
    }

    // =========================================================================
    // Collection Run Metrics
    // =========================================================================

    pub fn record_collection_run(succeeded: bool, resources_collected: usize) {
        let status = if succeeded { "success" } else { "partial" };
        counter!("inventory_collection_runs_total", "status" => status).increment(1);
        gauge!("inventory_resources_collected_last_run").set(resources_collected as f64);
    }
}
