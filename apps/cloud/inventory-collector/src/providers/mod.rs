//! Cloud provider collaborators for the inventory pipeline

pub mod aws;

pub use aws::{AwsPricingClient, RdsListingClient, load_sdk_config};
