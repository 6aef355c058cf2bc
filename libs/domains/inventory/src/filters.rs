//! Pricing catalog filter construction.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use strum::{Display, EnumString};
use tracing::debug;

use crate::lookup::{self, DB_LICENSES, DEFAULT_LICENSE_SENSITIVE_ENGINES};
use crate::models::{DbInstanceRecord, DerivedAttributes};

pub const FIELD_INSTANCE_TYPE: &str = "instanceType";
pub const FIELD_REGION_CODE: &str = "regionCode";
pub const FIELD_DATABASE_ENGINE: &str = "databaseEngine";
pub const FIELD_DEPLOYMENT_OPTION: &str = "deploymentOption";
pub const FIELD_LICENSE_MODEL: &str = "licenseModel";
pub const FIELD_DATABASE_EDITION: &str = "databaseEdition";

/// How a filter value is matched against catalog attributes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, Display, EnumString)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum FilterMatch {
    #[default]
    TermMatch,
}

/// Exact-match constraint on one catalog attribute
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceFilter {
    pub field: String,
    pub value: String,
    pub match_type: FilterMatch,
}

impl PriceFilter {
    pub fn term(field: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            value: value.into(),
            match_type: FilterMatch::TermMatch,
        }
    }
}

/// Ordered, conjunctive set of price filters for a single resource
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceFilterSet {
    filters: Vec<PriceFilter>,
}

impl PriceFilterSet {
    pub fn iter(&self) -> std::slice::Iter<'_, PriceFilter> {
        self.filters.iter()
    }

    pub fn len(&self) -> usize {
        self.filters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.filters.is_empty()
    }

    /// Value of the filter on `field`, if present
    pub fn value_of(&self, field: &str) -> Option<&str> {
        self.filters
            .iter()
            .find(|f| f.field == field)
            .map(|f| f.value.as_str())
    }

    fn push(&mut self, field: &str, value: impl Into<String>) {
        self.filters.push(PriceFilter::term(field, value));
    }
}

impl<'a> IntoIterator for &'a PriceFilterSet {
    type Item = &'a PriceFilter;
    type IntoIter = std::slice::Iter<'a, PriceFilter>;

    fn into_iter(self) -> Self::IntoIter {
        self.filters.iter()
    }
}

/// Builds the catalog filters for database instances.
///
/// Holds only immutable data, so one builder is shared by every concurrent
/// pricing task.
#[derive(Debug, Clone)]
pub struct PriceFilterBuilder {
    license_sensitive: HashSet<String>,
}

impl PriceFilterBuilder {
    pub fn new<I, S>(license_sensitive: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            license_sensitive: license_sensitive
                .into_iter()
                .map(|engine| engine.into().to_lowercase())
                .collect(),
        }
    }

    /// Whether catalog prices for `engine_family` vary by license model and edition
    pub fn requires_license_filters(&self, engine_family: &str) -> bool {
        self.license_sensitive
            .contains(&engine_family.to_lowercase())
    }

    pub fn build(
        &self,
        record: &DbInstanceRecord,
        attributes: &DerivedAttributes,
        region: &str,
    ) -> PriceFilterSet {
        let mut filters = PriceFilterSet::default();

        filters.push(FIELD_INSTANCE_TYPE, record.instance_class.as_str());
        filters.push(FIELD_REGION_CODE, region);
        filters.push(
            FIELD_DATABASE_ENGINE,
            lookup::engine_label(&record.engine, &attributes.engine_family),
        );
        filters.push(FIELD_DEPLOYMENT_OPTION, attributes.deployment_mode.label());

        if self.requires_license_filters(&attributes.engine_family) {
            let license = record
                .license_model
                .as_deref()
                .map(|code| DB_LICENSES.label(code))
                .unwrap_or_default();
            let edition = lookup::edition_label(&attributes.engine_edition);

            if license.is_empty() || edition.is_empty() {
                debug!(
                    resource = %attributes.display_name,
                    license_model = ?record.license_model,
                    edition = %attributes.engine_edition,
                    "No catalog label for license model or edition"
                );
            }

            filters.push(FIELD_LICENSE_MODEL, license);
            filters.push(FIELD_DATABASE_EDITION, edition);
        }

        filters
    }
}

impl Default for PriceFilterBuilder {
    fn default() -> Self {
        Self::new(DEFAULT_LICENSE_SENSITIVE_ENGINES.iter().copied())
    }
}
