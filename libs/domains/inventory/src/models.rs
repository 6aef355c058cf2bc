use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString, IntoStaticStr};

/// Key-value tag attached to a cloud resource
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Tag {
    pub key: String,
    pub value: String,
}

impl Tag {
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }
}

/// Provider-supplied description of one database instance.
///
/// Fields the provider may omit are optional; nothing here is derived.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DbInstanceRecord {
    /// Unique instance identifier within the account/region
    pub identifier: String,
    /// Globally unique resource id (ARN for AWS)
    pub resource_id: String,
    /// Explicit database name, when the instance has one
    pub db_name: Option<String>,
    /// Instance class code, e.g. `db.m5.large`
    pub instance_class: String,
    /// Compound engine code, e.g. `oracle-ee` or `postgres`
    pub engine: String,
    /// License model code, e.g. `license-included`
    pub license_model: Option<String>,
    pub multi_az: bool,
    pub created_at: DateTime<Utc>,
    pub tags: Vec<Tag>,
}

/// Deployment topology of a database instance
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString, IntoStaticStr,
)]
pub enum DeploymentMode {
    #[strum(serialize = "Single-AZ")]
    #[serde(rename = "Single-AZ")]
    Single,
    #[strum(serialize = "Multi-AZ")]
    #[serde(rename = "Multi-AZ")]
    Multi,
}

impl DeploymentMode {
    pub fn from_multi_az(multi_az: bool) -> Self {
        if multi_az { Self::Multi } else { Self::Single }
    }

    /// Label used by the pricing catalog's `deploymentOption` attribute
    pub fn label(&self) -> &'static str {
        (*self).into()
    }
}

/// Billing-relevant facts derived from a [`DbInstanceRecord`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DerivedAttributes {
    pub engine_family: String,
    pub engine_edition: String,
    pub deployment_mode: DeploymentMode,
    pub display_name: String,
    /// Whole hours the instance has existed in the current billing period
    pub usage_hours: u32,
}

/// One page returned by a listing collaborator
#[derive(Debug, Clone, Default)]
pub struct ListingPage {
    pub items: Vec<DbInstanceRecord>,
    /// Opaque cursor for the next page. `None` or empty means this was the last page.
    pub next_cursor: Option<String>,
}

impl ListingPage {
    pub fn new(items: Vec<DbInstanceRecord>, next_cursor: Option<String>) -> Self {
        Self { items, next_cursor }
    }

    pub fn last(items: Vec<DbInstanceRecord>) -> Self {
        Self::new(items, None)
    }

    /// The cursor to request next, if any
    pub fn continuation(&self) -> Option<&str> {
        self.next_cursor.as_deref().filter(|cursor| !cursor.is_empty())
    }
}

/// Account and region a pipeline run is scoped to
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AccountContext {
    /// Configured account name
    pub account: String,
    pub region: String,
}

impl AccountContext {
    pub fn new(account: impl Into<String>, region: impl Into<String>) -> Self {
        Self {
            account: account.into(),
            region: region.into(),
        }
    }
}

/// An inventoried cloud resource with its estimated cost for the current period
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Resource {
    pub provider: String,
    pub account: String,
    pub service: String,
    pub region: String,
    pub resource_id: String,
    pub cost: f64,
    pub name: String,
    pub fetched_at: DateTime<Utc>,
    pub tags: Vec<Tag>,
    pub link: String,
}
