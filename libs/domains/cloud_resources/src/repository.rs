use async_trait::async_trait;
use domain_inventory::Resource;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::error::ReportResult;
use crate::models::{DashboardStats, GroupedCount, GroupingField, ResourceScope};

/// Repository trait for stored inventory
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ResourceRepository: Send + Sync {
    /// Replace every stored resource in `scope` with `resources`; returns the number stored
    async fn replace_resources(
        &self,
        scope: &ResourceScope,
        resources: Vec<Resource>,
    ) -> ReportResult<usize>;

    /// All stored resources
    async fn list_resources(&self) -> ReportResult<Vec<Resource>>;

    /// Resource count per distinct value of `field`, largest first.
    /// Equal totals keep the order in which their labels were first stored.
    async fn count_by(&self, field: GroupingField) -> ReportResult<Vec<GroupedCount>>;

    async fn dashboard_stats(&self) -> ReportResult<DashboardStats>;
}

#[async_trait]
impl<T: ResourceRepository + ?Sized> ResourceRepository for Arc<T> {
    async fn replace_resources(
        &self,
        scope: &ResourceScope,
        resources: Vec<Resource>,
    ) -> ReportResult<usize> {
        (**self).replace_resources(scope, resources).await
    }

    async fn list_resources(&self) -> ReportResult<Vec<Resource>> {
        (**self).list_resources().await
    }

    async fn count_by(&self, field: GroupingField) -> ReportResult<Vec<GroupedCount>> {
        (**self).count_by(field).await
    }

    async fn dashboard_stats(&self) -> ReportResult<DashboardStats> {
        (**self).dashboard_stats().await
    }
}

/// In-memory implementation of ResourceRepository (for development/testing)
#[derive(Debug, Default, Clone)]
pub struct InMemoryResourceRepository {
    resources: Arc<RwLock<Vec<Resource>>>,
}

impl InMemoryResourceRepository {
    pub fn new() -> Self {
        Self {
            resources: Arc::new(RwLock::new(Vec::new())),
        }
    }
}

#[async_trait]
impl ResourceRepository for InMemoryResourceRepository {
    async fn replace_resources(
        &self,
        scope: &ResourceScope,
        resources: Vec<Resource>,
    ) -> ReportResult<usize> {
        let mut stored = self.resources.write().await;

        stored.retain(|resource| !scope.contains(resource));
        let count = resources.len();
        stored.extend(resources);

        tracing::debug!(
            account = %scope.account,
            region = %scope.region,
            service = %scope.service,
            count,
            "Replaced resources in memory"
        );
        Ok(count)
    }

    async fn list_resources(&self) -> ReportResult<Vec<Resource>> {
        Ok(self.resources.read().await.clone())
    }

    async fn count_by(&self, field: GroupingField) -> ReportResult<Vec<GroupedCount>> {
        let stored = self.resources.read().await;

        let mut groups: Vec<GroupedCount> = Vec::new();
        let mut index: HashMap<&str, usize> = HashMap::new();
        for resource in stored.iter() {
            let label = field.value_of(resource);
            match index.get(label) {
                Some(&i) => groups[i].total += 1,
                None => {
                    index.insert(label, groups.len());
                    groups.push(GroupedCount::new(label, 1));
                }
            }
        }

        // stable: ties stay in first-seen order
        groups.sort_by(|a, b| b.total.cmp(&a.total));
        Ok(groups)
    }

    async fn dashboard_stats(&self) -> ReportResult<DashboardStats> {
        let stored = self.resources.read().await;

        let regions: HashSet<&str> = stored.iter().map(|r| r.region.as_str()).collect();
        let accounts: HashSet<&str> = stored.iter().map(|r| r.account.as_str()).collect();

        Ok(DashboardStats {
            resources: stored.len() as i64,
            regions: regions.len() as i64,
            costs: stored.iter().map(|r| r.cost).sum(),
            accounts: accounts.len() as i64,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn resource(account: &str, region: &str, name: &str, cost: f64) -> Resource {
        Resource {
            provider: "AWS".into(),
            account: account.into(),
            service: "RDS Instance".into(),
            region: region.into(),
            resource_id: format!("arn:aws:rds:{region}:1:db:{name}"),
            cost,
            name: name.into(),
            fetched_at: Utc::now(),
            tags: vec![],
            link: String::new(),
        }
    }

    fn scope(account: &str, region: &str) -> ResourceScope {
        ResourceScope::new("AWS", account, "RDS Instance", region)
    }

    #[tokio::test]
    async fn test_replace_only_touches_scope() {
        let repo = InMemoryResourceRepository::new();
        repo.replace_resources(
            &scope("prod", "eu-west-1"),
            vec![resource("prod", "eu-west-1", "a", 1.0)],
        )
        .await
        .unwrap();
        repo.replace_resources(
            &scope("prod", "us-east-1"),
            vec![resource("prod", "us-east-1", "b", 2.0)],
        )
        .await
        .unwrap();

        let stored = repo
            .replace_resources(
                &scope("prod", "eu-west-1"),
                vec![
                    resource("prod", "eu-west-1", "c", 3.0),
                    resource("prod", "eu-west-1", "d", 4.0),
                ],
            )
            .await
            .unwrap();
        assert_eq!(stored, 2);

        let mut names: Vec<_> = repo
            .list_resources()
            .await
            .unwrap()
            .into_iter()
            .map(|r| r.name)
            .collect();
        names.sort();
        assert_eq!(names, vec!["b", "c", "d"]);
    }

    #[tokio::test]
    async fn test_replace_with_empty_clears_scope() {
        let repo = InMemoryResourceRepository::new();
        repo.replace_resources(
            &scope("prod", "eu-west-1"),
            vec![resource("prod", "eu-west-1", "a", 1.0)],
        )
        .await
        .unwrap();

        repo.replace_resources(&scope("prod", "eu-west-1"), Vec::new())
            .await
            .unwrap();

        assert!(repo.list_resources().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_count_by_sorts_desc_with_stable_ties() {
        let repo = InMemoryResourceRepository::new();
        repo.replace_resources(
            &scope("prod", "mixed"),
            vec![
                resource("prod", "eu-west-1", "a", 0.0),
                resource("prod", "us-east-1", "b", 0.0),
                resource("prod", "us-east-1", "c", 0.0),
                resource("prod", "ap-south-1", "d", 0.0),
            ],
        )
        .await
        .unwrap();

        let groups = repo.count_by(GroupingField::Region).await.unwrap();
        assert_eq!(
            groups,
            vec![
                GroupedCount::new("us-east-1", 2),
                GroupedCount::new("eu-west-1", 1),
                GroupedCount::new("ap-south-1", 1),
            ]
        );
    }

    #[tokio::test]
    async fn test_dashboard_stats() {
        let repo = InMemoryResourceRepository::new();
        repo.replace_resources(
            &scope("prod", "eu-west-1"),
            vec![
                resource("prod", "eu-west-1", "a", 10.5),
                resource("prod", "eu-west-1", "b", 4.5),
            ],
        )
        .await
        .unwrap();
        repo.replace_resources(
            &scope("staging", "us-east-1"),
            vec![resource("staging", "us-east-1", "c", 5.0)],
        )
        .await
        .unwrap();

        let stats = repo.dashboard_stats().await.unwrap();
        assert_eq!(stats.resources, 3);
        assert_eq!(stats.regions, 2);
        assert_eq!(stats.accounts, 2);
        assert_eq!(stats.costs, 20.0);
    }

    #[tokio::test]
    async fn test_empty_store_stats() {
        let repo = InMemoryResourceRepository::new();
        assert_eq!(repo.dashboard_stats().await.unwrap(), DashboardStats::default());
        assert!(repo.count_by(GroupingField::Account).await.unwrap().is_empty());
    }
}
