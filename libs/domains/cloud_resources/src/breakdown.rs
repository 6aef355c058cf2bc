use crate::models::{GroupedCount, OTHER_LABEL};

/// Rows kept ahead of the "Other" bucket
pub const TOP_GROUPS: usize = 4;

/// Collapse a grouped count report into at most [`TOP_GROUPS`] rows plus "Other".
///
/// `groups` must already be sorted by total, descending. Reports with four or
/// fewer rows are returned unchanged; otherwise the first four rows are kept in
/// their given order and every remaining row is summed into a trailing
/// `"Other"` row, even when the tail is a single row.
pub fn summarize_breakdown(mut groups: Vec<GroupedCount>) -> Vec<GroupedCount> {
    if groups.len() <= TOP_GROUPS {
        return groups;
    }

    let other: i64 = groups.drain(TOP_GROUPS..).map(|group| group.total).sum();
    groups.push(GroupedCount::new(OTHER_LABEL, other));
    groups
}
