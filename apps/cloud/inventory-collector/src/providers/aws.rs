//! AWS collaborators: RDS instance listing and the Price List API.
//!
//! Credentials follow the AWS SDK default chain (environment, web identity,
//! instance profile, shared config). A named profile selects an account.

use async_trait::async_trait;
use aws_config::{BehaviorVersion, Region, SdkConfig};
use aws_sdk_pricing::types::{Filter, FilterType};
use aws_sdk_rds::types::DbInstance;
use chrono::{DateTime, Utc};
use domain_inventory::filters::FilterMatch;
use domain_inventory::{
    DbInstanceRecord, InventoryError, InventoryResult, ListingClient, ListingPage,
    PriceFilterSet, PricingCatalogResponse, PricingClient, Tag,
};
use tracing::debug;

/// Price List service code for relational database instances
pub const RDS_SERVICE_CODE: &str = "AmazonRDS";

const PRICE_LIST_FORMAT: &str = "aws_v1";

/// Load SDK configuration for `region`, optionally from a named profile
pub async fn load_sdk_config(profile: Option<&str>, region: &str) -> SdkConfig {
    let mut loader = aws_config::defaults(BehaviorVersion::latest())
        .region(Region::new(region.to_string()));

    if let Some(profile) = profile {
        loader = loader.profile_name(profile);
    }

    loader.load().await
}

/// Lists RDS instances page by page with `DescribeDBInstances`
pub struct RdsListingClient {
    client: aws_sdk_rds::Client,
}

impl RdsListingClient {
    pub fn new(client: aws_sdk_rds::Client) -> Self {
        Self { client }
    }

    pub fn from_config(config: &SdkConfig) -> Self {
        Self::new(aws_sdk_rds::Client::new(config))
    }
}

#[async_trait]
impl ListingClient for RdsListingClient {
    async fn list(&self, cursor: Option<String>) -> InventoryResult<ListingPage> {
        let output = self
            .client
            .describe_db_instances()
            .set_marker(cursor)
            .send()
            .await
            .map_err(|e| {
                InventoryError::Listing(aws_sdk_rds::error::DisplayErrorContext(&e).to_string())
            })?;

        let items = output
            .db_instances()
            .iter()
            .map(db_instance_record)
            .collect();

        Ok(ListingPage::new(items, output.marker().map(String::from)))
    }
}

/// Map an SDK instance description onto the pipeline's record.
///
/// Instances still being created have no creation time yet; they are treated
/// as created now and bill zero hours.
pub fn db_instance_record(instance: &DbInstance) -> DbInstanceRecord {
    let created_at = instance
        .instance_create_time()
        .and_then(|created| DateTime::<Utc>::from_timestamp(created.secs(), created.subsec_nanos()))
        .unwrap_or_else(Utc::now);

    let tags = instance
        .tag_list()
        .iter()
        .map(|tag| {
            Tag::new(
                tag.key().unwrap_or_default(),
                tag.value().unwrap_or_default(),
            )
        })
        .collect();

    DbInstanceRecord {
        identifier: instance
            .db_instance_identifier()
            .unwrap_or_default()
            .to_string(),
        resource_id: instance.db_instance_arn().unwrap_or_default().to_string(),
        db_name: instance.db_name().map(String::from),
        instance_class: instance.db_instance_class().unwrap_or_default().to_string(),
        engine: instance.engine().unwrap_or_default().to_string(),
        license_model: instance.license_model().map(String::from),
        multi_az: instance.multi_az().unwrap_or(false),
        created_at,
        tags,
    }
}

/// Queries the AWS Price List `GetProducts` API for RDS products
pub struct AwsPricingClient {
    client: aws_sdk_pricing::Client,
}

impl AwsPricingClient {
    pub fn new(client: aws_sdk_pricing::Client) -> Self {
        Self { client }
    }

    /// `config` must point at a Price List endpoint region
    pub fn from_config(config: &SdkConfig) -> Self {
        Self::new(aws_sdk_pricing::Client::new(config))
    }
}

fn filter_type(match_type: FilterMatch) -> FilterType {
    match match_type {
        FilterMatch::TermMatch => FilterType::TermMatch,
    }
}

/// Translate the pipeline's filter set into Price List API filters
pub fn price_list_filters(filters: &PriceFilterSet) -> InventoryResult<Vec<Filter>> {
    filters
        .iter()
        .map(|filter| {
            Filter::builder()
                .r#type(filter_type(filter.match_type))
                .field(&filter.field)
                .value(&filter.value)
                .build()
                .map_err(|e| InventoryError::Pricing(format!("invalid filter {}: {}", filter.field, e)))
        })
        .collect()
}

#[async_trait]
impl PricingClient for AwsPricingClient {
    async fn quote(
        &self,
        filters: &PriceFilterSet,
        max_results: i32,
    ) -> InventoryResult<PricingCatalogResponse> {
        let output = self
            .client
            .get_products()
            .service_code(RDS_SERVICE_CODE)
            .format_version(PRICE_LIST_FORMAT)
            .set_filters(Some(price_list_filters(filters)?))
            .max_results(max_results)
            .send()
            .await
            .map_err(|e| {
                InventoryError::Pricing(aws_sdk_pricing::error::DisplayErrorContext(&e).to_string())
            })?;

        let price_list = output.price_list().to_vec();
        debug!(matches = price_list.len(), "Price list query returned");

        Ok(PricingCatalogResponse::new(price_list))
    }
}
