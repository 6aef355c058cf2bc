//! Pure derivation of billing-relevant attributes from a raw instance record.

use chrono::{DateTime, Datelike, NaiveDate, Utc};

use crate::models::{DbInstanceRecord, DeploymentMode, DerivedAttributes};

/// Delimiter between engine family and edition in compound engine codes
pub const ENGINE_DELIMITER: &str = "-";

/// Engine family and edition split from a compound engine code
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineParts {
    pub family: String,
    pub edition: String,
}

/// Split `engine` on the first `delimiter`.
///
/// `"oracle-ee"` gives family `oracle` and edition `ee`; a code without the
/// delimiter has an empty edition.
pub fn split_engine(engine: &str, delimiter: &str) -> EngineParts {
    match engine.split_once(delimiter) {
        Some((family, edition)) => EngineParts {
            family: family.to_string(),
            edition: edition.to_string(),
        },
        None => EngineParts {
            family: engine.to_string(),
            edition: String::new(),
        },
    }
}

/// Explicit database name if present, otherwise the instance identifier
pub fn display_name(record: &DbInstanceRecord) -> String {
    record
        .db_name
        .as_deref()
        .filter(|name| !name.is_empty())
        .unwrap_or(&record.identifier)
        .to_string()
}

/// Start of the billing period (UTC calendar month) containing `now`
pub fn beginning_of_month(now: DateTime<Utc>) -> DateTime<Utc> {
    NaiveDate::from_ymd_opt(now.year(), now.month(), 1)
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|start| start.and_utc())
        .unwrap_or(now)
}

/// Whole hours `created_at` has existed within the billing period containing `now`.
///
/// Instances created at or before the period start bill from the period start;
/// instances created later bill from creation. Never negative.
pub fn usage_hours(created_at: DateTime<Utc>, now: DateTime<Utc>) -> u32 {
    let period_start = beginning_of_month(now);
    let since = if created_at <= period_start {
        period_start
    } else {
        created_at
    };

    let hours = (now - since).num_hours();
    u32::try_from(hours.max(0)).unwrap_or(u32::MAX)
}

/// Derive every billing attribute for `record` as of `now`
pub fn derive_attributes(record: &DbInstanceRecord, now: DateTime<Utc>) -> DerivedAttributes {
    let engine = split_engine(&record.engine, ENGINE_DELIMITER);

    DerivedAttributes {
        engine_family: engine.family,
        engine_edition: engine.edition,
        deployment_mode: DeploymentMode::from_multi_az(record.multi_az),
        display_name: display_name(record),
        usage_hours: usage_hours(record.created_at, now),
    }
}
