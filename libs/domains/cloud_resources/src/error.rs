use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;

use crate::models::GroupingField;

pub type ReportResult<T> = Result<T, ReportError>;

#[derive(Debug, thiserror::Error)]
pub enum ReportError {
    #[error("Invalid grouping field '{0}'")]
    InvalidGroupingField(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<sea_orm::DbErr> for ReportError {
    fn from(err: sea_orm::DbErr) -> Self {
        Self::Database(err.to_string())
    }
}

impl IntoResponse for ReportError {
    fn into_response(self) -> Response {
        let (status, error_message) = match &self {
            Self::InvalidGroupingField(field) => (
                StatusCode::BAD_REQUEST,
                format!(
                    "Invalid grouping field '{}', expected one of: {}",
                    field,
                    GroupingField::accepted().join(", ")
                ),
            ),
            Self::Database(msg) | Self::Internal(msg) => {
                tracing::error!(error = %msg, "Report request failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
        };

        let body = Json(json!({
            "error": error_message,
            "code": status.as_u16(),
        }));

        (status, body).into_response()
    }
}
