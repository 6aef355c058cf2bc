//! Inventory Collector Service
//!
//! Runs the inventory pipeline for every configured account and region and
//! stores what it finds.

use chrono::{DateTime, Utc};
use domain_cloud_resources::{ReportService, ResourceRepository, ResourceScope};
use domain_inventory::filters::PriceFilterBuilder;
use domain_inventory::{
    AccountContext, InventoryPipeline, ListingClient, PROVIDER_AWS, PricingClient,
    SERVICE_RDS_INSTANCE,
};
use eyre::Result;
use observability::InventoryMetrics;
use serde::Serialize;
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::watch;
use tokio::task::JoinSet;
use tokio_cron_scheduler::{Job, JobScheduler};
use tracing::{error, info, warn};

use crate::config::{AccountConfig, AwsConfig, Config};
use crate::providers::{AwsPricingClient, RdsListingClient, load_sdk_config};

/// How a single account/region walk ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ScopeStatus {
    Completed,
    /// Listing failed part way; nothing stored
    Partial,
    /// Shutdown observed; nothing stored
    Cancelled,
    StoreFailed,
}

#[derive(Debug, Clone, Serialize)]
pub struct ScopeOutcome {
    pub account: String,
    pub region: String,
    pub status: ScopeStatus,
    pub resources: usize,
    pub estimated_cost: f64,
}

/// Result of a collection run
#[derive(Debug, Clone, Serialize)]
pub struct CollectionResult {
    pub resources_collected: usize,
    pub estimated_cost: f64,
    pub errors: usize,
    pub scopes: Vec<ScopeOutcome>,
    pub duration_ms: u64,
    pub timestamp: DateTime<Utc>,
}

impl CollectionResult {
    fn from_outcomes(scopes: Vec<ScopeOutcome>, errors: usize, started: Instant) -> Self {
        let counted = scopes
            .iter()
            .filter(|s| s.status == ScopeStatus::Completed);

        let (resources_collected, estimated_cost) = counted
            .fold((0, 0.0), |(count, cost), s| (count + s.resources, cost + s.estimated_cost));

        let errors = errors
            + scopes
                .iter()
                .filter(|s| s.status != ScopeStatus::Completed)
                .count();

        Self {
            resources_collected,
            estimated_cost,
            errors,
            scopes,
            duration_ms: started.elapsed().as_millis() as u64,
            timestamp: Utc::now(),
        }
    }

    pub fn succeeded(&self) -> bool {
        self.errors == 0
    }
}

/// Account/region pairs to walk.
///
/// `accounts` narrows the configured accounts by name; `regions` replaces the
/// configured regions. Unknown account names are skipped with a warning.
pub fn plan_scopes(
    aws: &AwsConfig,
    accounts: Option<&[String]>,
    regions: Option<&[String]>,
) -> Vec<(AccountConfig, String)> {
    let selected: Vec<&AccountConfig> = match accounts {
        Some(names) => {
            for name in names {
                if !aws.accounts.iter().any(|a| &a.name == name) {
                    warn!(account = %name, "Account is not configured, skipping");
                }
            }
            aws.accounts
                .iter()
                .filter(|a| names.contains(&a.name))
                .collect()
        }
        None => aws.accounts.iter().collect(),
    };

    let regions = regions.unwrap_or(&aws.regions);

    selected
        .into_iter()
        .flat_map(|account| {
            regions
                .iter()
                .map(move |region| (account.clone(), region.clone()))
        })
        .collect()
}

/// Walk one account/region, record metrics and store the result.
///
/// Only a completed walk replaces the stored inventory of the scope; a
/// cancelled or failed walk leaves the previous inventory intact.
pub async fn collect_scope<L, P, R>(
    reports: &ReportService<R>,
    pipeline: InventoryPipeline<L, P>,
    shutdown: watch::Receiver<bool>,
) -> ScopeOutcome
where
    L: ListingClient,
    P: PricingClient,
    R: ResourceRepository,
{
    let context = pipeline.account().clone();
    let started = Instant::now();
    InventoryMetrics::record_walk_started(&context.account, &context.region);

    let resources = match pipeline.run(shutdown).await {
        Ok(resources) => resources,
        Err(partial) => {
            let (status, reason) = if partial.is_cancelled() {
                (ScopeStatus::Cancelled, "cancelled")
            } else {
                (ScopeStatus::Partial, "failed")
            };
            InventoryMetrics::record_walk_stopped(&context.account, &context.region, reason);

            let (resources, error) = partial.into_parts();
            warn!(
                account = %context.account,
                region = %context.region,
                error = %error,
                discarded = resources.len(),
                "Walk stopped early, keeping stored inventory"
            );

            return ScopeOutcome {
                account: context.account,
                region: context.region,
                status,
                resources: resources.len(),
                estimated_cost: resources.iter().map(|r| r.cost).sum(),
            };
        }
    };

    let count = resources.len();
    let estimated_cost: f64 = resources.iter().map(|r| r.cost).sum();
    let mut status = ScopeStatus::Completed;

    InventoryMetrics::record_walk_completed(
        &context.account,
        &context.region,
        count,
        estimated_cost,
        started.elapsed().as_secs_f64(),
    );

    let scope = ResourceScope::new(
        PROVIDER_AWS,
        &context.account,
        SERVICE_RDS_INSTANCE,
        &context.region,
    );

    if let Err(e) = reports.store(&scope, resources).await {
        error!(
            account = %context.account,
            region = %context.region,
            error = %e,
            "Failed to store resources"
        );
        InventoryMetrics::record_store_failed(&context.account, &context.region);
        status = ScopeStatus::StoreFailed;
    }

    ScopeOutcome {
        account: context.account,
        region: context.region,
        status,
        resources: count,
        estimated_cost,
    }
}

/// Collects RDS inventory for the configured AWS accounts
pub struct InventoryCollector<R: ResourceRepository> {
    config: Arc<Config>,
    reports: Arc<ReportService<R>>,
}

impl<R: ResourceRepository> Clone for InventoryCollector<R> {
    fn clone(&self) -> Self {
        Self {
            config: Arc::clone(&self.config),
            reports: Arc::clone(&self.reports),
        }
    }
}

impl<R: ResourceRepository + 'static> InventoryCollector<R> {
    pub fn new(config: Config, reports: ReportService<R>) -> Self {
        Self {
            config: Arc::new(config),
            reports: Arc::new(reports),
        }
    }

    pub fn reports(&self) -> &ReportService<R> {
        &self.reports
    }

    fn filter_builder(&self) -> PriceFilterBuilder {
        PriceFilterBuilder::new(self.config.license_sensitive_engines.iter())
    }

    /// Run a one-time collection; every account/region is walked concurrently
    pub async fn collect(
        &self,
        accounts: Option<&[String]>,
        regions: Option<&[String]>,
        shutdown: watch::Receiver<bool>,
    ) -> Result<CollectionResult> {
        let started = Instant::now();
        let scopes = plan_scopes(&self.config.aws, accounts, regions);

        if scopes.is_empty() {
            warn!("No account/region pairs to collect");
        }

        let mut tasks = JoinSet::new();
        let mut pricing_clients: Vec<(String, Arc<AwsPricingClient>)> = Vec::new();

        for (account, region) in scopes {
            let pricing = match pricing_clients.iter().find(|(name, _)| name == &account.name) {
                Some((_, client)) => Arc::clone(client),
                None => {
                    let sdk = load_sdk_config(
                        account.profile.as_deref(),
                        &self.config.aws.pricing_region,
                    )
                    .await;
                    let client = Arc::new(AwsPricingClient::from_config(&sdk));
                    pricing_clients.push((account.name.clone(), Arc::clone(&client)));
                    client
                }
            };

            let reports = Arc::clone(&self.reports);
            let filter_builder = self.filter_builder();
            let concurrency = self.config.pricing_concurrency;
            let shutdown = shutdown.clone();

            tasks.spawn(async move {
                let sdk = load_sdk_config(account.profile.as_deref(), &region).await;
                let pipeline = InventoryPipeline::new(
                    AccountContext::new(&account.name, &region),
                    RdsListingClient::from_config(&sdk),
                    pricing,
                )
                .with_pricing_concurrency(concurrency)
                .with_filter_builder(filter_builder);

                collect_scope(&reports, pipeline, shutdown).await
            });
        }

        let mut outcomes = Vec::new();
        let mut panicked = 0;
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok(outcome) => outcomes.push(outcome),
                Err(e) => {
                    error!(error = %e, "Collection task failed");
                    panicked += 1;
                }
            }
        }
        outcomes.sort_by(|a, b| (&a.account, &a.region).cmp(&(&b.account, &b.region)));

        let result = CollectionResult::from_outcomes(outcomes, panicked, started);
        InventoryMetrics::record_collection_run(result.succeeded(), result.resources_collected);

        info!(
            resources = result.resources_collected,
            estimated_cost = result.estimated_cost,
            errors = result.errors,
            duration_ms = result.duration_ms,
            "Collection complete"
        );

        Ok(result)
    }

    /// Collect on `cron_expr` until shutdown is signalled
    pub async fn run_scheduled(
        &self,
        cron_expr: &str,
        mut shutdown: watch::Receiver<bool>,
    ) -> Result<()> {
        info!(cron = cron_expr, "Starting scheduled inventory collection");

        let mut sched = JobScheduler::new().await?;

        let collector = self.clone();
        let job_shutdown = shutdown.clone();
        let job = Job::new_async(cron_expr, move |_uuid, _l| {
            let collector = collector.clone();
            let shutdown = job_shutdown.clone();

            Box::pin(async move {
                info!("Running scheduled inventory collection");

                match collector.collect(None, None, shutdown).await {
                    Ok(result) => {
                        info!(
                            collected = result.resources_collected,
                            errors = result.errors,
                            "Scheduled collection complete"
                        );
                    }
                    Err(e) => {
                        error!(error = %e, "Scheduled collection failed");
                    }
                }
            })
        })?;

        sched.add(job).await?;
        sched.start().await?;

        info!("Scheduler started, waiting for jobs...");
        if shutdown.wait_for(|stop| *stop).await.is_err() {
            // Sender gone without a stop request: keep serving the schedule
            std::future::pending::<()>().await;
        }

        info!("Stopping scheduler");
        sched.shutdown().await?;
        Ok(())
    }
}
