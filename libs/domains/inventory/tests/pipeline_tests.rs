//! Pipeline tests against scripted listing and pricing collaborators

use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use domain_inventory::filters::{FIELD_DATABASE_EDITION, FIELD_INSTANCE_TYPE, FIELD_LICENSE_MODEL};
use domain_inventory::*;
use std::collections::HashMap;
use std::sync::Mutex;
use tokio::sync::watch;

// ============================================================================
// Fakes
// ============================================================================

/// Serves pages keyed by cursor; `None` is the first page
struct PagedListing {
    pages: HashMap<Option<String>, InventoryResult<ListingPage>>,
    requested: Mutex<Vec<Option<String>>>,
    /// Flip the shutdown flag when this cursor is requested
    cancel_on: Option<(String, watch::Sender<bool>)>,
}

impl PagedListing {
    fn new(pages: Vec<(Option<&str>, InventoryResult<ListingPage>)>) -> Self {
        Self {
            pages: pages
                .into_iter()
                .map(|(cursor, page)| (cursor.map(String::from), page))
                .collect(),
            requested: Mutex::new(Vec::new()),
            cancel_on: None,
        }
    }

    fn cancel_on(mut self, cursor: &str, shutdown: watch::Sender<bool>) -> Self {
        self.cancel_on = Some((cursor.to_string(), shutdown));
        self
    }

    fn requested(&self) -> Vec<Option<String>> {
        self.requested.lock().unwrap().clone()
    }
}

#[async_trait]
impl ListingClient for PagedListing {
    async fn list(&self, cursor: Option<String>) -> InventoryResult<ListingPage> {
        self.requested.lock().unwrap().push(cursor.clone());

        if let (Some((trigger, shutdown)), Some(requested)) = (&self.cancel_on, &cursor) {
            if trigger == requested {
                shutdown.send_replace(true);
            }
        }

        self.pages
            .get(&cursor)
            .cloned()
            .unwrap_or_else(|| Err(InventoryError::Listing(format!("unknown cursor {:?}", cursor))))
    }
}

/// Quotes a fixed price per instance type and records every filter set it saw
struct PriceBook {
    prices: HashMap<String, String>,
    seen: Mutex<Vec<PriceFilterSet>>,
}

impl PriceBook {
    fn new(prices: &[(&str, &str)]) -> Self {
        Self {
            prices: prices
                .iter()
                .map(|(class, price)| (class.to_string(), price.to_string()))
                .collect(),
            seen: Mutex::new(Vec::new()),
        }
    }
}

#[async_trait]
impl PricingClient for PriceBook {
    async fn quote(
        &self,
        filters: &PriceFilterSet,
        _max_results: i32,
    ) -> InventoryResult<PricingCatalogResponse> {
        self.seen.lock().unwrap().push(filters.clone());

        let price_list = filters
            .value_of(FIELD_INSTANCE_TYPE)
            .and_then(|class| self.prices.get(class))
            .map(|doc| vec![doc.clone()])
            .unwrap_or_default();
        Ok(PricingCatalogResponse::new(price_list))
    }
}

// ============================================================================
// Helpers
// ============================================================================

fn now() -> DateTime<Utc> {
    // 100 hours into June
    Utc.with_ymd_and_hms(2024, 6, 5, 4, 0, 0).unwrap()
}

fn price_document(usd: &str) -> String {
    serde_json::json!({
        "terms": {
            "OnDemand": {
                "SKU.TERM": {
                    "priceDimensions": {
                        "SKU.TERM.RATE": { "unit": "Hrs", "pricePerUnit": { "USD": usd } }
                    }
                }
            }
        }
    })
    .to_string()
}

fn instance(identifier: &str, class: &str, engine: &str) -> DbInstanceRecord {
    DbInstanceRecord {
        identifier: identifier.to_string(),
        resource_id: format!("arn:aws:rds:eu-west-1:123456789012:db:{identifier}"),
        instance_class: class.to_string(),
        engine: engine.to_string(),
        created_at: Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
        ..Default::default()
    }
}

fn names(resources: &[Resource]) -> Vec<&str> {
    resources.iter().map(|r| r.name.as_str()).collect()
}

fn context() -> AccountContext {
    AccountContext::new("production", "eu-west-1")
}

// ============================================================================
// Tests
// ============================================================================

#[tokio::test]
async fn test_walks_every_page_in_order() {
    let listing = PagedListing::new(vec![
        (
            None,
            Ok(ListingPage::new(
                vec![
                    instance("a", "db.t3.micro", "postgres"),
                    instance("b", "db.t3.micro", "mysql"),
                ],
                Some("p2".into()),
            )),
        ),
        (
            Some("p2"),
            Ok(ListingPage::new(
                vec![instance("c", "db.m5.large", "postgres")],
                Some("p3".into()),
            )),
        ),
        (Some("p3"), Ok(ListingPage::last(vec![]))),
    ]);
    let pricing = PriceBook::new(&[("db.t3.micro", &price_document("0.02"))]);

    let pipeline = InventoryPipeline::new(context(), &listing, &pricing).with_pricing_concurrency(1);
    let (_tx, rx) = watch::channel(false);
    let resources = pipeline.run_at(now(), rx).await.unwrap();

    assert_eq!(names(&resources), vec!["a", "b", "c"]);
    assert_eq!(
        listing.requested(),
        vec![None, Some("p2".to_string()), Some("p3".to_string())]
    );
    assert!((resources[0].cost - 100.0 * 0.02).abs() < 1e-9);
    // No catalog match for db.m5.large
    assert_eq!(resources[2].cost, 0.0);
}

#[tokio::test]
async fn test_concurrent_pricing_keeps_every_item() {
    let items: Vec<_> = (0..10)
        .map(|i| instance(&format!("db-{i}"), "db.t3.micro", "postgres"))
        .collect();
    let listing = PagedListing::new(vec![(None, Ok(ListingPage::last(items)))]);
    let pricing = PriceBook::new(&[("db.t3.micro", &price_document("0.02"))]);

    let pipeline = InventoryPipeline::new(context(), &listing, &pricing).with_pricing_concurrency(4);
    let (_tx, rx) = watch::channel(false);
    let resources = pipeline.run_at(now(), rx).await.unwrap();

    let mut seen = names(&resources);
    seen.sort();
    let mut expected: Vec<String> = (0..10).map(|i| format!("db-{i}")).collect();
    expected.sort();
    assert_eq!(seen, expected.iter().map(String::as_str).collect::<Vec<_>>());
    assert_eq!(pricing.seen.lock().unwrap().len(), 10);
}

#[tokio::test]
async fn test_listing_failure_returns_resources_so_far() {
    let listing = PagedListing::new(vec![
        (
            None,
            Ok(ListingPage::new(
                vec![instance("a", "db.t3.micro", "postgres")],
                Some("p2".into()),
            )),
        ),
        (
            Some("p2"),
            Err(InventoryError::Listing("AccessDenied".into())),
        ),
        (
            Some("p3"),
            Ok(ListingPage::last(vec![instance("c", "db.t3.micro", "postgres")])),
        ),
    ]);
    let pricing = PriceBook::new(&[]);

    let pipeline = InventoryPipeline::new(context(), &listing, &pricing);
    let (_tx, rx) = watch::channel(false);
    let partial = pipeline.run_at(now(), rx).await.unwrap_err();

    assert!(!partial.is_cancelled());
    assert_eq!(names(&partial.resources), vec!["a"]);
    assert_eq!(partial.error, InventoryError::Listing("AccessDenied".into()));
    assert_eq!(listing.requested().len(), 2);
}

#[tokio::test]
async fn test_shutdown_stops_walk_with_partial_results() {
    let (tx, rx) = watch::channel(false);
    let listing = PagedListing::new(vec![
        (
            None,
            Ok(ListingPage::new(
                vec![instance("a", "db.t3.micro", "postgres")],
                Some("p2".into()),
            )),
        ),
        (
            Some("p2"),
            Ok(ListingPage::new(
                vec![instance("b", "db.t3.micro", "postgres")],
                Some("p3".into()),
            )),
        ),
        (Some("p3"), Ok(ListingPage::last(vec![]))),
    ])
    .cancel_on("p2", tx);
    let pricing = PriceBook::new(&[]);

    let pipeline = InventoryPipeline::new(context(), &listing, &pricing).with_pricing_concurrency(1);
    let partial = pipeline.run_at(now(), rx).await.unwrap_err();

    assert!(partial.is_cancelled());
    assert_eq!(names(&partial.resources), vec!["a"]);
    assert_eq!(listing.requested().len(), 2);
}

#[tokio::test]
async fn test_dropped_shutdown_sender_is_not_cancellation() {
    let listing = PagedListing::new(vec![(
        None,
        Ok(ListingPage::last(vec![instance("a", "db.t3.micro", "postgres")])),
    )]);
    let pricing = PriceBook::new(&[]);

    let pipeline = InventoryPipeline::new(context(), &listing, &pricing);
    let (tx, rx) = watch::channel(false);
    drop(tx);

    let resources = pipeline.run_at(now(), rx).await.unwrap();
    assert_eq!(names(&resources), vec!["a"]);
}

#[tokio::test]
async fn test_unparseable_price_costs_zero_without_failing_walk() {
    let listing = PagedListing::new(vec![(
        None,
        Ok(ListingPage::last(vec![
            instance("broken", "db.r5.large", "postgres"),
            instance("fine", "db.t3.micro", "postgres"),
        ])),
    )]);
    let pricing = PriceBook::new(&[
        ("db.r5.large", r#"{"terms":"unexpected"}"#),
        ("db.t3.micro", &price_document("0.5")),
    ]);

    let pipeline = InventoryPipeline::new(context(), &listing, &pricing).with_pricing_concurrency(1);
    let (_tx, rx) = watch::channel(false);
    let resources = pipeline.run_at(now(), rx).await.unwrap();

    assert_eq!(resources[0].cost, 0.0);
    assert_eq!(resources[1].cost, 50.0);
}

#[tokio::test]
async fn test_license_sensitive_engines_are_priced_with_six_filters() {
    let mut oracle = instance("ledger", "db.m5.xlarge", "oracle-ee");
    oracle.license_model = Some("bring-your-own-license".into());
    let listing = PagedListing::new(vec![(
        None,
        Ok(ListingPage::last(vec![
            oracle,
            instance("app", "db.t3.micro", "postgres"),
        ])),
    )]);
    let pricing = PriceBook::new(&[]);

    let pipeline = InventoryPipeline::new(context(), &listing, &pricing).with_pricing_concurrency(1);
    let (_tx, rx) = watch::channel(false);
    pipeline.run_at(now(), rx).await.unwrap();

    let seen = pricing.seen.lock().unwrap();
    assert_eq!(seen[0].len(), 6);
    assert_eq!(seen[0].value_of(FIELD_LICENSE_MODEL), Some("Bring your own license"));
    assert_eq!(seen[0].value_of(FIELD_DATABASE_EDITION), Some("Enterprise"));
    assert_eq!(seen[1].len(), 4);
}

#[tokio::test]
async fn test_instance_created_this_month_bills_from_creation() {
    let mut fresh = instance("fresh", "db.t3.micro", "postgres");
    fresh.created_at = Utc.with_ymd_and_hms(2024, 6, 5, 0, 0, 0).unwrap();
    fresh.db_name = Some("orders".into());
    let listing = PagedListing::new(vec![(None, Ok(ListingPage::last(vec![fresh])))]);
    let pricing = PriceBook::new(&[("db.t3.micro", &price_document("1.25"))]);

    let pipeline = InventoryPipeline::new(context(), &listing, &pricing);
    let (_tx, rx) = watch::channel(false);
    let resources = pipeline.run_at(now(), rx).await.unwrap();

    assert_eq!(resources[0].name, "orders");
    assert_eq!(resources[0].cost, 4.0 * 1.25);
    assert_eq!(
        resources[0].link,
        "https://eu-west-1.console.aws.amazon.com/rds/home?region=eu-west-1#database:id=fresh"
    );
}
