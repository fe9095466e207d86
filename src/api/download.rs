//! Artifact download endpoint.

use crate::api::AppState;
use crate::error::AppError;
use crate::jobs::JobStatus;
use axum::extract::{Path, State};
use axum::http::header;
use axum::response::{IntoResponse, Response};
use uuid::Uuid;

/// Stream a completed job's JSON or CSV artifact as an attachment.
pub async fn download_artifact(
    State(state): State<AppState>,
    Path((id, file_type)): Path<(Uuid, String)>,
) -> Result<Response, AppError> {
    let job = state
        .registry
        .get(id)
        .await
        .ok_or_else(|| AppError::NotFound("report not found".to_string()))?;

    if job.status != JobStatus::Completed {
        return Err(AppError::BadRequest("report not ready".to_string()));
    }
    let files = job
        .files
        .ok_or_else(|| AppError::Internal("completed job has no artifacts".to_string()))?;

    let (path, content_type) = match file_type.as_str() {
        "json" => (files.json, "application/json"),
        "csv" => (files.csv, "text/csv"),
        other => {
            return Err(AppError::BadRequest(format!(
                "invalid file type: {other}"
            )))
        }
    };

    let bytes = tokio::fs::read(&path)
        .await
        .map_err(|e| AppError::Internal(format!("failed to read artifact: {e}")))?;

    let year = job.summary.map(|s| s.year).unwrap_or_default();
    let filename = format!("lighter_fiscal_{year}.{file_type}");

    Ok((
        [
            (header::CONTENT_TYPE, content_type.to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{filename}\""),
            ),
        ],
        bytes,
    )
        .into_response())
}
