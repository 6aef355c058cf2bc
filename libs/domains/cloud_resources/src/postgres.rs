use async_trait::async_trait;
use chrono::{DateTime, Utc};
use core_config::database::DatabaseConfig;
use domain_inventory::{Resource, Tag};
use sea_orm::{
    ConnectOptions, ConnectionTrait, Database, DatabaseBackend, DatabaseConnection, QueryResult,
    Statement, TransactionTrait, Value,
};
use std::time::Duration;
use tracing::{debug, info};

use crate::{
    error::{ReportError, ReportResult},
    models::{DashboardStats, GroupedCount, GroupingField, ResourceScope},
    repository::ResourceRepository,
};

const CREATE_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS resources (
    id          BIGSERIAL PRIMARY KEY,
    provider    TEXT NOT NULL,
    account     TEXT NOT NULL,
    service     TEXT NOT NULL,
    region      TEXT NOT NULL,
    resource_id TEXT NOT NULL,
    name        TEXT NOT NULL,
    cost        DOUBLE PRECISION NOT NULL DEFAULT 0,
    fetched_at  TIMESTAMPTZ NOT NULL,
    tags        JSONB NOT NULL DEFAULT '[]'::jsonb,
    link        TEXT NOT NULL DEFAULT ''
)"#;

const CREATE_SCOPE_INDEX: &str = "CREATE INDEX IF NOT EXISTS resources_scope_idx \
     ON resources (provider, account, service, region)";

const DELETE_SCOPE: &str =
    "DELETE FROM resources WHERE provider = $1 AND account = $2 AND service = $3 AND region = $4";

const INSERT_RESOURCE: &str = "INSERT INTO resources \
     (provider, account, service, region, resource_id, name, cost, fetched_at, tags, link) \
     VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)";

const SELECT_RESOURCES: &str = "SELECT provider, account, service, region, resource_id, name, \
     cost, fetched_at, tags, link FROM resources ORDER BY id";

const SELECT_STATS: &str = "SELECT COUNT(*) AS resources, \
     COUNT(DISTINCT region) AS regions, \
     COALESCE(SUM(cost), 0)::float8 AS costs, \
     COUNT(DISTINCT account) AS accounts \
     FROM resources";

/// PostgreSQL-backed resource store using raw statements with bound values
#[derive(Clone)]
pub struct PgResourceRepository {
    db: DatabaseConnection,
}

impl PgResourceRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Open a pooled connection from configuration
    pub async fn connect(config: &DatabaseConfig) -> ReportResult<Self> {
        let mut options = ConnectOptions::new(config.url.clone());
        options
            .max_connections(config.max_connections)
            .min_connections(config.min_connections)
            .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
            .sqlx_logging(false);

        let db = Database::connect(options).await?;
        info!("Connected to resource database");
        Ok(Self::new(db))
    }

    /// Create the resources table and its scope index if they are missing
    pub async fn ensure_schema(&self) -> ReportResult<()> {
        for sql in [CREATE_TABLE, CREATE_SCOPE_INDEX] {
            self.db
                .execute_raw(Statement::from_string(DatabaseBackend::Postgres, sql))
                .await?;
        }
        debug!("Resource schema ready");
        Ok(())
    }
}

fn statement(sql: &str, values: Vec<Value>) -> Statement {
    Statement::from_sql_and_values(DatabaseBackend::Postgres, sql, values)
}

/// `GROUP BY` query for a closed grouping field. Ties keep first-stored order.
fn count_by_sql(field: GroupingField) -> String {
    let column = field.column();
    format!(
        "SELECT {column} AS label, COUNT(*) AS total FROM resources \
         GROUP BY {column} ORDER BY total DESC, MIN(id) ASC"
    )
}

fn insert_values(resource: &Resource) -> ReportResult<Vec<Value>> {
    let tags = serde_json::to_value(&resource.tags)
        .map_err(|e| ReportError::Internal(format!("Failed to encode tags: {}", e)))?;

    Ok(vec![
        resource.provider.clone().into(),
        resource.account.clone().into(),
        resource.service.clone().into(),
        resource.region.clone().into(),
        resource.resource_id.clone().into(),
        resource.name.clone().into(),
        resource.cost.into(),
        resource.fetched_at.into(),
        tags.into(),
        resource.link.clone().into(),
    ])
}

fn resource_from_row(row: &QueryResult) -> ReportResult<Resource> {
    let tags: serde_json::Value = row.try_get("", "tags")?;
    let tags: Vec<Tag> = serde_json::from_value(tags)
        .map_err(|e| ReportError::Internal(format!("Failed to decode tags: {}", e)))?;
    let fetched_at: DateTime<Utc> = row.try_get("", "fetched_at")?;

    Ok(Resource {
        provider: row.try_get("", "provider")?,
        account: row.try_get("", "account")?,
        service: row.try_get("", "service")?,
        region: row.try_get("", "region")?,
        resource_id: row.try_get("", "resource_id")?,
        name: row.try_get("", "name")?,
        cost: row.try_get("", "cost")?,
        fetched_at,
        tags,
        link: row.try_get("", "link")?,
    })
}

#[async_trait]
impl ResourceRepository for PgResourceRepository {
    async fn replace_resources(
        &self,
        scope: &ResourceScope,
        resources: Vec<Resource>,
    ) -> ReportResult<usize> {
        let txn = self.db.begin().await?;

        let deleted = txn
            .execute_raw(statement(
                DELETE_SCOPE,
                vec![
                    scope.provider.clone().into(),
                    scope.account.clone().into(),
                    scope.service.clone().into(),
                    scope.region.clone().into(),
                ],
            ))
            .await?
            .rows_affected();

        for resource in &resources {
            txn.execute_raw(statement(INSERT_RESOURCE, insert_values(resource)?))
                .await?;
        }

        txn.commit().await?;

        debug!(
            account = %scope.account,
            region = %scope.region,
            service = %scope.service,
            deleted,
            inserted = resources.len(),
            "Replaced stored resources"
        );
        Ok(resources.len())
    }

    async fn list_resources(&self) -> ReportResult<Vec<Resource>> {
        let rows = self
            .db
            .query_all_raw(Statement::from_string(
                DatabaseBackend::Postgres,
                SELECT_RESOURCES,
            ))
            .await?;

        rows.iter().map(resource_from_row).collect()
    }

    async fn count_by(&self, field: GroupingField) -> ReportResult<Vec<GroupedCount>> {
        let rows = self
            .db
            .query_all_raw(Statement::from_string(
                DatabaseBackend::Postgres,
                count_by_sql(field),
            ))
            .await?;

        rows.iter()
            .map(|row| {
                Ok(GroupedCount {
                    label: row.try_get("", "label")?,
                    total: row.try_get("", "total")?,
                })
            })
            .collect()
    }

    async fn dashboard_stats(&self) -> ReportResult<DashboardStats> {
        let row = self
            .db
            .query_one_raw(Statement::from_string(DatabaseBackend::Postgres, SELECT_STATS))
            .await?;

        let Some(row) = row else {
            return Ok(DashboardStats::default());
        };

        Ok(DashboardStats {
            resources: row.try_get("", "resources")?,
            regions: row.try_get("", "regions")?,
            costs: row.try_get("", "costs")?,
            accounts: row.try_get("", "accounts")?,
        })
    }
}
