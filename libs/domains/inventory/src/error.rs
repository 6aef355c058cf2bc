use thiserror::Error;

use crate::models::Resource;

/// Result type for inventory operations
pub type InventoryResult<T> = Result<T, InventoryError>;

/// Errors that can occur while discovering and pricing resources
#[derive(Debug, Clone, Error, PartialEq)]
pub enum InventoryError {
    /// The listing API could not be reached or rejected the request
    #[error("Listing request failed: {0}")]
    Listing(String),

    /// The pricing catalog could not be reached or rejected the request
    #[error("Pricing request failed: {0}")]
    Pricing(String),

    /// A price-list entry did not have the expected shape
    #[error("Failed to parse pricing response: {0}")]
    PricingParse(String),

    /// The walk observed the shutdown signal
    #[error("Inventory walk cancelled")]
    Cancelled,
}

/// A walk that stopped early, together with everything collected before it stopped.
///
/// Callers decide whether a partial inventory is acceptable.
#[derive(Debug, Error)]
#[error("Inventory walk stopped after {} resources: {error}", .resources.len())]
pub struct PartialInventory {
    pub resources: Vec<Resource>,
    #[source]
    pub error: InventoryError,
}

impl PartialInventory {
    pub fn new(resources: Vec<Resource>, error: InventoryError) -> Self {
        Self { resources, error }
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self.error, InventoryError::Cancelled)
    }

    /// Split into the partial resources and the error that stopped the walk
    pub fn into_parts(self) -> (Vec<Resource>, InventoryError) {
        (self.resources, self.error)
    }
}
