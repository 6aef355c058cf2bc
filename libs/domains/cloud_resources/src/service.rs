use domain_inventory::Resource;
use std::str::FromStr;

use crate::{
    breakdown::summarize_breakdown,
    error::{ReportError, ReportResult},
    locations::location_breakdown,
    models::{DashboardStats, GroupedCount, GroupingField, LocationBreakdown, ResourceScope},
    repository::ResourceRepository,
};

/// Report Service - storage of collected inventory and the reports built on it
pub struct ReportService<R: ResourceRepository> {
    repository: R,
}

impl<R: ResourceRepository> ReportService<R> {
    pub fn new(repository: R) -> Self {
        Self { repository }
    }

    /// Replace the stored resources of one scope with a fresh collection
    pub async fn store(
        &self,
        scope: &ResourceScope,
        resources: Vec<Resource>,
    ) -> ReportResult<usize> {
        let stored = self.repository.replace_resources(scope, resources).await?;
        tracing::info!(
            account = %scope.account,
            region = %scope.region,
            service = %scope.service,
            stored,
            "Stored resources"
        );
        Ok(stored)
    }

    pub async fn resources(&self) -> ReportResult<Vec<Resource>> {
        self.repository.list_resources().await
    }

    pub async fn stats(&self) -> ReportResult<DashboardStats> {
        self.repository.dashboard_stats().await
    }

    /// Top groups plus "Other" for the named grouping field
    pub async fn breakdown(&self, filter: &str) -> ReportResult<Vec<GroupedCount>> {
        let field = GroupingField::from_str(filter.trim())
            .map_err(|_| ReportError::InvalidGroupingField(filter.to_string()))?;

        let groups = self.repository.count_by(field).await?;
        Ok(summarize_breakdown(groups))
    }

    /// Resource counts per known region location
    pub async fn locations(&self) -> ReportResult<Vec<LocationBreakdown>> {
        let groups = self.repository.count_by(GroupingField::Region).await?;
        Ok(location_breakdown(&groups))
    }
}
