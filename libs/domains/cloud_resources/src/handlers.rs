use axum::{
    Json, Router,
    extract::State,
    response::IntoResponse,
    routing::{get, post},
};
use std::sync::Arc;
use utoipa::OpenApi;

use crate::{
    error::ReportResult,
    models::{BreakdownRequest, DashboardStats, GroupedCount, LocationBreakdown},
    repository::ResourceRepository,
    service::ReportService,
};

/// OpenAPI documentation for the report API
#[derive(OpenApi)]
#[openapi(
    paths(dashboard_stats, resources_breakdown, location_breakdown, list_resources),
    components(schemas(DashboardStats, BreakdownRequest, GroupedCount, LocationBreakdown)),
    tags(
        (name = "reports", description = "Inventory and cost reports")
    )
)]
pub struct ApiDoc;

/// Create Axum router for report endpoints
pub fn router<R>(service: ReportService<R>) -> Router
where
    R: ResourceRepository + 'static,
{
    let service = Arc::new(service);

    Router::new()
        .route("/stats", get(dashboard_stats))
        .route("/stats/breakdown", post(resources_breakdown))
        .route("/stats/locations", get(location_breakdown))
        .route("/resources", get(list_resources))
        .route("/openapi.json", get(openapi_json))
        .with_state(service)
}

/// Resource, region, account and cost totals
#[utoipa::path(
    get,
    path = "/stats",
    tag = "reports",
    responses(
        (status = 200, description = "Dashboard totals", body = DashboardStats),
        (status = 500, description = "Storage failure")
    )
)]
async fn dashboard_stats<R>(
    State(service): State<Arc<ReportService<R>>>,
) -> ReportResult<impl IntoResponse>
where
    R: ResourceRepository,
{
    let stats = service.stats().await?;
    Ok(Json(stats))
}

/// Resource counts by a grouping field, top four plus "Other"
#[utoipa::path(
    post,
    path = "/stats/breakdown",
    tag = "reports",
    request_body = BreakdownRequest,
    responses(
        (status = 200, description = "Grouped counts", body = Vec<GroupedCount>),
        (status = 400, description = "Unknown grouping field"),
        (status = 500, description = "Storage failure")
    )
)]
async fn resources_breakdown<R>(
    State(service): State<Arc<ReportService<R>>>,
    Json(input): Json<BreakdownRequest>,
) -> ReportResult<impl IntoResponse>
where
    R: ResourceRepository,
{
    let report = service.breakdown(&input.filter).await?;
    Ok(Json(report))
}

/// Resource counts per region with map coordinates
#[utoipa::path(
    get,
    path = "/stats/locations",
    tag = "reports",
    responses(
        (status = 200, description = "Per-location counts", body = Vec<LocationBreakdown>),
        (status = 500, description = "Storage failure")
    )
)]
async fn location_breakdown<R>(
    State(service): State<Arc<ReportService<R>>>,
) -> ReportResult<impl IntoResponse>
where
    R: ResourceRepository,
{
    let rows = service.locations().await?;
    Ok(Json(rows))
}

/// Every stored resource
#[utoipa::path(
    get,
    path = "/resources",
    tag = "reports",
    responses(
        (status = 200, description = "Stored resources"),
        (status = 500, description = "Storage failure")
    )
)]
async fn list_resources<R>(
    State(service): State<Arc<ReportService<R>>>,
) -> ReportResult<impl IntoResponse>
where
    R: ResourceRepository,
{
    let resources = service.resources().await?;
    Ok(Json(resources))
}

async fn openapi_json() -> impl IntoResponse {
    Json(ApiDoc::openapi())
}
