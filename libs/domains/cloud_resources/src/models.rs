use domain_inventory::Resource;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString, IntoEnumIterator};
use utoipa::ToSchema;

/// Label of the bucket that absorbs the tail of a breakdown
pub const OTHER_LABEL: &str = "Other";

/// The unit a collection run replaces: one service in one account/region
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ResourceScope {
    pub provider: String,
    pub account: String,
    pub service: String,
    pub region: String,
}

impl ResourceScope {
    pub fn new(
        provider: impl Into<String>,
        account: impl Into<String>,
        service: impl Into<String>,
        region: impl Into<String>,
    ) -> Self {
        Self {
            provider: provider.into(),
            account: account.into(),
            service: service.into(),
            region: region.into(),
        }
    }

    pub fn contains(&self, resource: &Resource) -> bool {
        resource.provider == self.provider
            && resource.account == self.account
            && resource.service == self.service
            && resource.region == self.region
    }
}

/// Resource column a breakdown report can be grouped by
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString, EnumIter,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum GroupingField {
    Provider,
    Account,
    Service,
    Region,
}

impl GroupingField {
    /// Storage column backing this field
    pub fn column(&self) -> &'static str {
        match self {
            Self::Provider => "provider",
            Self::Account => "account",
            Self::Service => "service",
            Self::Region => "region",
        }
    }

    pub fn value_of<'a>(&self, resource: &'a Resource) -> &'a str {
        match self {
            Self::Provider => &resource.provider,
            Self::Account => &resource.account,
            Self::Service => &resource.service,
            Self::Region => &resource.region,
        }
    }

    /// Accepted field names, for error messages
    pub fn accepted() -> Vec<String> {
        Self::iter().map(|field| field.to_string()).collect()
    }
}

/// One row of a grouped count report
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct GroupedCount {
    pub label: String,
    pub total: i64,
}

impl GroupedCount {
    pub fn new(label: impl Into<String>, total: i64) -> Self {
        Self {
            label: label.into(),
            total,
        }
    }
}

/// Body of a breakdown request, e.g. `{"filter": "region"}`
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct BreakdownRequest {
    pub filter: String,
}

/// Headline totals over the stored resource set
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct DashboardStats {
    pub resources: i64,
    pub regions: i64,
    pub costs: f64,
    pub accounts: i64,
}

/// Geographic placement of a provider region
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Location {
    /// Human-readable place name
    pub name: &'static str,
    /// Region code the location was looked up by
    pub label: &'static str,
    pub latitude: f64,
    pub longitude: f64,
}

/// One row of the map report
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct LocationBreakdown {
    pub name: String,
    pub label: String,
    pub latitude: f64,
    pub longitude: f64,
    pub resources: i64,
}

impl LocationBreakdown {
    pub fn new(location: &Location, resources: i64) -> Self {
        Self {
            name: location.name.to_string(),
            label: location.label.to_string(),
            latitude: location.latitude,
            longitude: location.longitude,
            resources,
        }
    }
}
