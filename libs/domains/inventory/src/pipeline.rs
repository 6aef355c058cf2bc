//! End-to-end discovery and pricing of database instances for one account/region.

use chrono::{DateTime, Utc};
use futures::{StreamExt, stream};
use std::time::Instant;
use tokio::sync::watch;
use tracing::{debug, info, warn};

use crate::attributes::derive_attributes;
use crate::cost::estimate_cost;
use crate::error::{InventoryError, PartialInventory};
use crate::filters::PriceFilterBuilder;
use crate::listing::{self, ListingClient};
use crate::models::{AccountContext, DbInstanceRecord, Resource};
use crate::pricing::{PricingClient, PricingResolver};

pub const PROVIDER_AWS: &str = "AWS";
pub const SERVICE_RDS_INSTANCE: &str = "RDS Instance";

/// Default number of pricing requests in flight per page
pub const DEFAULT_PRICING_CONCURRENCY: usize = 4;

/// Walks a listing collaborator and prices every database instance it returns.
///
/// Pages are fetched strictly in sequence. Items within a page are priced
/// concurrently, at most `pricing_concurrency` at a time; with a concurrency of
/// one the output preserves listing order.
pub struct InventoryPipeline<L, P> {
    account: AccountContext,
    listing: L,
    resolver: PricingResolver<P>,
    filter_builder: PriceFilterBuilder,
    pricing_concurrency: usize,
}

impl<L, P> InventoryPipeline<L, P>
where
    L: ListingClient,
    P: PricingClient,
{
    pub fn new(account: AccountContext, listing: L, pricing: P) -> Self {
        Self {
            account,
            listing,
            resolver: PricingResolver::new(pricing),
            filter_builder: PriceFilterBuilder::default(),
            pricing_concurrency: DEFAULT_PRICING_CONCURRENCY,
        }
    }

    pub fn with_pricing_concurrency(mut self, concurrency: usize) -> Self {
        self.pricing_concurrency = concurrency.max(1);
        self
    }

    pub fn with_filter_builder(mut self, filter_builder: PriceFilterBuilder) -> Self {
        self.filter_builder = filter_builder;
        self
    }

    pub fn account(&self) -> &AccountContext {
        &self.account
    }

    /// Discover and price every instance, as of now.
    pub async fn run(
        &self,
        shutdown: watch::Receiver<bool>,
    ) -> Result<Vec<Resource>, PartialInventory> {
        self.run_at(Utc::now(), shutdown).await
    }

    /// Discover and price every instance, billing usage up to `now`.
    ///
    /// A listing failure or the shutdown signal stops the walk; everything
    /// priced so far is returned inside the [`PartialInventory`].
    pub async fn run_at(
        &self,
        now: DateTime<Utc>,
        mut shutdown: watch::Receiver<bool>,
    ) -> Result<Vec<Resource>, PartialInventory> {
        let started = Instant::now();
        let mut resources = Vec::new();
        let mut page_number = 0usize;

        let pages = listing::pages(&self.listing);
        tokio::pin!(pages);

        loop {
            let next = tokio::select! {
                biased;
                _ = cancelled(&mut shutdown) => {
                    return Err(self.stopped(resources, InventoryError::Cancelled));
                }
                next = pages.next() => next,
            };

            let page = match next {
                None => break,
                Some(Ok(page)) => page,
                Some(Err(e)) => return Err(self.stopped(resources, e)),
            };
            page_number += 1;

            let mut priced = stream::iter(page.items)
                .map(|record| self.price_record(record, now))
                .buffer_unordered(self.pricing_concurrency);

            loop {
                tokio::select! {
                    biased;
                    _ = cancelled(&mut shutdown) => {
                        return Err(self.stopped(resources, InventoryError::Cancelled));
                    }
                    next = priced.next() => match next {
                        Some(resource) => resources.push(resource),
                        None => break,
                    },
                }
            }
        }

        info!(
            provider = PROVIDER_AWS,
            account = %self.account.account,
            region = %self.account.region,
            service = SERVICE_RDS_INSTANCE,
            pages = page_number,
            resources = resources.len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Fetched resources"
        );

        Ok(resources)
    }

    async fn price_record(&self, record: DbInstanceRecord, now: DateTime<Utc>) -> Resource {
        let attributes = derive_attributes(&record, now);
        let filters = self
            .filter_builder
            .build(&record, &attributes, &self.account.region);

        let unit_price = self
            .resolver
            .unit_price(&filters, &attributes.display_name)
            .await;
        let cost = estimate_cost(attributes.usage_hours, unit_price);

        debug!(
            resource = %attributes.display_name,
            usage_hours = attributes.usage_hours,
            unit_price,
            cost,
            "Priced instance"
        );

        Resource {
            provider: PROVIDER_AWS.to_string(),
            account: self.account.account.clone(),
            service: SERVICE_RDS_INSTANCE.to_string(),
            region: self.account.region.clone(),
            link: console_link(&self.account.region, &record.identifier),
            resource_id: record.resource_id,
            cost,
            name: attributes.display_name,
            fetched_at: now,
            tags: record.tags,
        }
    }

    fn stopped(&self, resources: Vec<Resource>, error: InventoryError) -> PartialInventory {
        warn!(
            account = %self.account.account,
            region = %self.account.region,
            collected = resources.len(),
            error = %error,
            "Inventory walk stopped early"
        );
        PartialInventory::new(resources, error)
    }
}

/// RDS console deep link for an instance
pub fn console_link(region: &str, identifier: &str) -> String {
    format!(
        "https://{region}.console.aws.amazon.com/rds/home?region={region}#database:id={identifier}"
    )
}

/// Resolves once the shutdown flag is set. A dropped sender never cancels.
async fn cancelled(shutdown: &mut watch::Receiver<bool>) {
    loop {
        if *shutdown.borrow_and_update() {
            return;
        }
        if shutdown.changed().await.is_err() {
            std::future::pending::<()>().await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::InventoryResult;
    use crate::filters::FIELD_DATABASE_ENGINE;
    use crate::models::{ListingPage, Tag};
    use crate::pricing::{MockPricingClient, PricingCatalogResponse};
    use async_trait::async_trait;
    use chrono::TimeZone;

    struct SinglePage(Vec<DbInstanceRecord>);

    #[async_trait]
    impl ListingClient for SinglePage {
        async fn list(&self, _cursor: Option<String>) -> InventoryResult<ListingPage> {
            Ok(ListingPage::last(self.0.clone()))
        }
    }

    fn price_document(price: &str) -> String {
        format!(
            r#"{{"terms":{{"OnDemand":{{"T":{{"priceDimensions":{{"R":{{"pricePerUnit":{{"USD":"{price}"}}}}}}}}}}}}}}"#
        )
    }

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 11, 0, 0, 0).unwrap()
    }

    fn instance() -> DbInstanceRecord {
        DbInstanceRecord {
            identifier: "billing-db".into(),
            resource_id: "arn:aws:rds:eu-west-1:123456789012:db:billing-db".into(),
            db_name: None,
            instance_class: "db.t3.medium".into(),
            engine: "postgres".into(),
            license_model: Some("postgresql-license".into()),
            multi_az: false,
            created_at: Utc.with_ymd_and_hms(2023, 1, 1, 0, 0, 0).unwrap(),
            tags: vec![Tag::new("team", "payments")],
        }
    }

    #[tokio::test]
    async fn test_builds_resource_with_cost() {
        let mut pricing = MockPricingClient::new();
        pricing
            .expect_quote()
            .withf(|filters, _| filters.value_of(FIELD_DATABASE_ENGINE) == Some("PostgreSQL"))
            .returning(|_, _| Ok(PricingCatalogResponse::new(vec![price_document("0.5")])));

        let pipeline = InventoryPipeline::new(
            AccountContext::new("production", "eu-west-1"),
            SinglePage(vec![instance()]),
            pricing,
        );

        let (_tx, rx) = watch::channel(false);
        let resources = pipeline.run_at(now(), rx).await.unwrap();

        assert_eq!(resources.len(), 1);
        let resource = &resources[0];
        assert_eq!(resource.provider, "AWS");
        assert_eq!(resource.account, "production");
        assert_eq!(resource.service, "RDS Instance");
        assert_eq!(resource.region, "eu-west-1");
        assert_eq!(resource.name, "billing-db");
        assert_eq!(resource.resource_id, "arn:aws:rds:eu-west-1:123456789012:db:billing-db");
        // 10 days into May
        assert_eq!(resource.cost, 240.0 * 0.5);
        assert_eq!(resource.fetched_at, now());
        assert_eq!(resource.tags, vec![Tag::new("team", "payments")]);
        assert_eq!(
            resource.link,
            "https://eu-west-1.console.aws.amazon.com/rds/home?region=eu-west-1#database:id=billing-db"
        );
    }

    #[tokio::test]
    async fn test_no_pricing_match_costs_zero() {
        let mut pricing = MockPricingClient::new();
        pricing
            .expect_quote()
            .returning(|_, _| Ok(PricingCatalogResponse::default()));

        let pipeline = InventoryPipeline::new(
            AccountContext::new("production", "eu-west-1"),
            SinglePage(vec![instance()]),
            pricing,
        );

        let (_tx, rx) = watch::channel(false);
        let resources = pipeline.run_at(now(), rx).await.unwrap();
        assert_eq!(resources[0].cost, 0.0);
    }

    #[tokio::test]
    async fn test_already_cancelled_returns_immediately() {
        let pricing = MockPricingClient::new();
        let pipeline = InventoryPipeline::new(
            AccountContext::new("production", "eu-west-1"),
            SinglePage(vec![instance()]),
            pricing,
        );

        let (_tx, rx) = watch::channel(true);
        let partial = pipeline.run_at(now(), rx).await.unwrap_err();

        assert!(partial.is_cancelled());
        assert!(partial.resources.is_empty());
    }

    #[test]
    fn test_zero_concurrency_is_clamped() {
        let pipeline = InventoryPipeline::new(
            AccountContext::new("a", "r"),
            SinglePage(vec![]),
            MockPricingClient::new(),
        )
        .with_pricing_concurrency(0);
        assert_eq!(pipeline.pricing_concurrency, 1);
    }
}
