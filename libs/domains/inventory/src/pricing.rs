//! Pricing catalog collaborator and unit price extraction.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::sync::Arc;
use tracing::{debug, warn};

use crate::error::{InventoryError, InventoryResult};
use crate::filters::PriceFilterSet;

/// The catalog is asked for a single best match per resource
pub const MAX_PRICE_RESULTS: i32 = 1;

/// Raw catalog response: one JSON document per matching product
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PricingCatalogResponse {
    pub price_list: Vec<String>,
}

impl PricingCatalogResponse {
    pub fn new(price_list: Vec<String>) -> Self {
        Self { price_list }
    }
}

/// Pricing catalog collaborator
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PricingClient: Send + Sync {
    /// Query the catalog for products matching every filter
    async fn quote(
        &self,
        filters: &PriceFilterSet,
        max_results: i32,
    ) -> InventoryResult<PricingCatalogResponse>;
}

#[async_trait]
impl<T: PricingClient + ?Sized> PricingClient for Arc<T> {
    async fn quote(
        &self,
        filters: &PriceFilterSet,
        max_results: i32,
    ) -> InventoryResult<PricingCatalogResponse> {
        (**self).quote(filters, max_results).await
    }
}

#[async_trait]
impl<T: PricingClient + ?Sized> PricingClient for &T {
    async fn quote(
        &self,
        filters: &PriceFilterSet,
        max_results: i32,
    ) -> InventoryResult<PricingCatalogResponse> {
        (**self).quote(filters, max_results).await
    }
}

#[derive(Debug, Deserialize)]
struct PriceListEntry {
    terms: PriceTerms,
}

#[derive(Debug, Deserialize)]
struct PriceTerms {
    #[serde(rename = "OnDemand", default)]
    on_demand: Map<String, Value>,
}

#[derive(Debug, Deserialize)]
struct OnDemandTerm {
    #[serde(rename = "priceDimensions", default)]
    price_dimensions: Map<String, Value>,
}

#[derive(Debug, Deserialize)]
struct PriceDimension {
    #[serde(rename = "pricePerUnit")]
    price_per_unit: PricePerUnit,
}

#[derive(Debug, Deserialize)]
struct PricePerUnit {
    #[serde(rename = "USD")]
    usd: String,
}

/// Extract the hourly unit price (USD) from a catalog response.
///
/// Only the first on-demand term of the first price-list entry is consulted,
/// and within it only the first price dimension, in document order. A missing
/// response, an empty price list, or a term without dimensions all mean "no
/// pricing data" and yield `0.0`.
pub fn parse_unit_price(response: Option<&PricingCatalogResponse>) -> InventoryResult<f64> {
    let Some(document) = response.and_then(|r| r.price_list.first()) else {
        return Ok(0.0);
    };

    let entry: PriceListEntry = serde_json::from_str(document)
        .map_err(|e| InventoryError::PricingParse(format!("price list entry: {}", e)))?;

    let Some((term_code, term)) = entry.terms.on_demand.iter().next() else {
        return Ok(0.0);
    };

    let term = OnDemandTerm::deserialize(term)
        .map_err(|e| InventoryError::PricingParse(format!("on-demand term {}: {}", term_code, e)))?;

    if term.price_dimensions.len() > 1 {
        debug!(
            term = %term_code,
            dimensions = term.price_dimensions.len(),
            "On-demand term has several price dimensions, using the first"
        );
    }

    let Some((rate_code, dimension)) = term.price_dimensions.iter().next() else {
        return Ok(0.0);
    };

    let dimension = PriceDimension::deserialize(dimension).map_err(|e| {
        InventoryError::PricingParse(format!("price dimension {}: {}", rate_code, e))
    })?;

    dimension
        .price_per_unit
        .usd
        .trim()
        .parse::<f64>()
        .map_err(|e| {
            InventoryError::PricingParse(format!(
                "price per unit '{}': {}",
                dimension.price_per_unit.usd, e
            ))
        })
}

/// Resolves unit prices, degrading every failure to a zero price.
pub struct PricingResolver<P> {
    client: P,
}

impl<P: PricingClient> PricingResolver<P> {
    pub fn new(client: P) -> Self {
        Self { client }
    }

    /// Unit price for the product matching `filters`.
    ///
    /// Transport and parse failures are logged and priced at `0.0` so that a
    /// single resource never fails the walk.
    pub async fn unit_price(&self, filters: &PriceFilterSet, resource: &str) -> f64 {
        let response = match self.client.quote(filters, MAX_PRICE_RESULTS).await {
            Ok(response) => response,
            Err(e) => {
                warn!(resource = %resource, error = %e, "Couldn't fetch pricing, using zero cost");
                return 0.0;
            }
        };

        match parse_unit_price(Some(&response)) {
            Ok(price) => {
                if response.price_list.is_empty() {
                    debug!(resource = %resource, "No pricing match");
                }
                price
            }
            Err(e) => {
                warn!(resource = %resource, error = %e, "Skipping pricing for resource");
                0.0
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockall::predicate;

    fn document(price: &str) -> String {
        serde_json::json!({
            "product": { "sku": "ABC123", "productFamily": "Database Instance" },
            "terms": {
                "OnDemand": {
                    "ABC123.JRTCKXETXF": {
                        "priceDimensions": {
                            "ABC123.JRTCKXETXF.6YS6EN2CT7": {
                                "unit": "Hrs",
                                "pricePerUnit": { "USD": price }
                            }
                        },
                        "sku": "ABC123"
                    }
                }
            }
        })
        .to_string()
    }

    #[test]
    fn test_missing_response_is_zero() {
        assert_eq!(parse_unit_price(None).unwrap(), 0.0);
    }

    #[test]
    fn test_empty_price_list_is_zero() {
        let response = PricingCatalogResponse::default();
        assert_eq!(parse_unit_price(Some(&response)).unwrap(), 0.0);
    }

    #[test]
    fn test_extracts_first_dimension_price() {
        let response = PricingCatalogResponse::new(vec![document("0.1710000000")]);
        assert_eq!(parse_unit_price(Some(&response)).unwrap(), 0.171);
    }

    #[test]
    fn test_only_first_entry_is_consulted() {
        let response = PricingCatalogResponse::new(vec![document("0.5"), "not json".into()]);
        assert_eq!(parse_unit_price(Some(&response)).unwrap(), 0.5);
    }

    #[test]
    fn test_first_dimension_in_document_order() {
        let doc = r#"{"terms":{"OnDemand":{"T1":{"priceDimensions":{
            "R2":{"pricePerUnit":{"USD":"2.0"}},
            "R1":{"pricePerUnit":{"USD":"1.0"}}}}}}}"#;
        let response = PricingCatalogResponse::new(vec![doc.to_string()]);
        assert_eq!(parse_unit_price(Some(&response)).unwrap(), 2.0);
    }

    #[test]
    fn test_no_on_demand_terms_is_zero() {
        let doc = r#"{"terms":{"Reserved":{}}}"#;
        let response = PricingCatalogResponse::new(vec![doc.to_string()]);
        assert_eq!(parse_unit_price(Some(&response)).unwrap(), 0.0);
    }

    #[test]
    fn test_malformed_entry_is_parse_error() {
        let response = PricingCatalogResponse::new(vec!["{\"product\":{}}".into()]);
        let err = parse_unit_price(Some(&response)).unwrap_err();
        assert!(matches!(err, InventoryError::PricingParse(_)));
    }

    #[test]
    fn test_unparseable_price_is_parse_error() {
        let response = PricingCatalogResponse::new(vec![document("n/a")]);
        let err = parse_unit_price(Some(&response)).unwrap_err();
        assert!(err.to_string().contains("n/a"));
    }

    #[tokio::test]
    async fn test_resolver_requests_single_result() {
        let mut client = MockPricingClient::new();
        client
            .expect_quote()
            .with(predicate::always(), predicate::eq(MAX_PRICE_RESULTS))
            .times(1)
            .returning(|_, _| Ok(PricingCatalogResponse::new(vec![document("0.25")])));

        let resolver = PricingResolver::new(client);
        let price = resolver.unit_price(&PriceFilterSet::default(), "db-1").await;
        assert_eq!(price, 0.25);
    }

    #[tokio::test]
    async fn test_resolver_degrades_transport_error_to_zero() {
        let mut client = MockPricingClient::new();
        client
            .expect_quote()
            .returning(|_, _| Err(InventoryError::Pricing("throttled".into())));

        let resolver = PricingResolver::new(client);
        assert_eq!(resolver.unit_price(&PriceFilterSet::default(), "db-1").await, 0.0);
    }

    #[tokio::test]
    async fn test_resolver_degrades_parse_error_to_zero() {
        let mut client = MockPricingClient::new();
        client
            .expect_quote()
            .returning(|_, _| Ok(PricingCatalogResponse::new(vec!["[]".into()])));

        let resolver = PricingResolver::new(client);
        assert_eq!(resolver.unit_price(&PriceFilterSet::default(), "db-1").await, 0.0);
    }
}
