/// Estimated cost for the current billing period: hours used times the hourly unit price.
///
/// No proration below one hour and no currency conversion.
pub fn estimate_cost(usage_hours: u32, unit_price: f64) -> f64 {
    f64::from(usage_hours) * unit_price
}
