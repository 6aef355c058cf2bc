//! Region code to map coordinates.

use crate::models::{GroupedCount, Location, LocationBreakdown};

const fn at(name: &'static str, label: &'static str, latitude: f64, longitude: f64) -> Location {
    Location {
        name,
        label,
        latitude,
        longitude,
    }
}

static LOCATIONS: &[Location] = &[
    // AWS
    at("US East (N. Virginia)", "us-east-1", 38.13, -78.45),
    at("US East (Ohio)", "us-east-2", 39.96, -83.0),
    at("US West (N. California)", "us-west-1", 37.35, -121.96),
    at("US West (Oregon)", "us-west-2", 46.15, -123.88),
    at("Africa (Cape Town)", "af-south-1", -33.93, 18.42),
    at("Asia Pacific (Hong Kong)", "ap-east-1", 22.27, 114.16),
    at("Asia Pacific (Mumbai)", "ap-south-1", 19.08, 72.88),
    at("Asia Pacific (Hyderabad)", "ap-south-2", 17.38, 78.49),
    at("Asia Pacific (Tokyo)", "ap-northeast-1", 35.41, 139.42),
    at("Asia Pacific (Seoul)", "ap-northeast-2", 37.56, 126.98),
    at("Asia Pacific (Osaka)", "ap-northeast-3", 34.69, 135.50),
    at("Asia Pacific (Singapore)", "ap-southeast-1", 1.37, 103.80),
    at("Asia Pacific (Sydney)", "ap-southeast-2", -33.86, 151.20),
    at("Asia Pacific (Jakarta)", "ap-southeast-3", -6.21, 106.85),
    at("Asia Pacific (Melbourne)", "ap-southeast-4", -37.81, 144.96),
    at("Canada (Central)", "ca-central-1", 45.50, -73.57),
    at("Canada West (Calgary)", "ca-west-1", 51.05, -114.07),
    at("Europe (Frankfurt)", "eu-central-1", 50.11, 8.68),
    at("Europe (Zurich)", "eu-central-2", 47.37, 8.54),
    at("Europe (Ireland)", "eu-west-1", 53.35, -6.26),
    at("Europe (London)", "eu-west-2", 51.51, -0.13),
    at("Europe (Paris)", "eu-west-3", 48.86, 2.35),
    at("Europe (Stockholm)", "eu-north-1", 59.33, 18.07),
    at("Europe (Milan)", "eu-south-1", 45.46, 9.19),
    at("Europe (Spain)", "eu-south-2", 41.65, -0.88),
    at("Israel (Tel Aviv)", "il-central-1", 32.09, 34.78),
    at("Middle East (UAE)", "me-central-1", 25.20, 55.27),
    at("Middle East (Bahrain)", "me-south-1", 26.07, 50.56),
    at("South America (Sao Paulo)", "sa-east-1", -23.55, -46.63),
    // GCP
    at("Iowa", "us-central1", 41.26, -95.86),
    at("South Carolina", "us-east1", 33.84, -81.16),
    at("Oregon", "us-west1", 45.59, -121.18),
    at("Belgium", "europe-west1", 50.45, 3.82),
    at("Netherlands", "europe-west4", 53.44, 6.84),
    at("Taiwan", "asia-east1", 24.05, 120.52),
    // Azure
    at("Virginia", "eastus", 37.37, -79.82),
    at("Washington", "westus2", 47.23, -119.85),
    at("Netherlands", "westeurope", 52.37, 4.89),
    at("Ireland", "northeurope", 53.35, -6.26),
];

/// Map location for a region code, if it is known
pub fn location_for_region(region: &str) -> Option<&'static Location> {
    LOCATIONS.iter().find(|location| location.label == region)
}

/// Turn a per-region grouped count into map rows.
///
/// Regions without a known location are left out; they still appear in the
/// plain region breakdown.
pub fn location_breakdown(groups: &[GroupedCount]) -> Vec<LocationBreakdown> {
    groups
        .iter()
        .filter_map(|group| {
            location_for_region(&group.label)
                .map(|location| LocationBreakdown::new(location, group.total))
        })
        .collect()
}
