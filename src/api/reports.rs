//! Report submission and status polling.

use crate::api::AppState;
use crate::domain::AccountId;
use crate::error::AppError;
use crate::jobs::JobStatus;
use crate::pipeline::{self, ReportSummary};
use axum::extract::{Path, State};
use axum::Json;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Deserialize)]
pub struct GenerateReportRequest {
    /// Read-only API token, format "ro:{account_index}:...". Used to infer
    /// the account when `account_index` is not given explicitly.
    pub token: Option<String>,
    pub account_index: Option<i64>,
    /// Overrides the configured target year.
    pub year: Option<u16>,
}

#[derive(Debug, Serialize)]
pub struct GenerateReportResponse {
    pub report_id: Uuid,
    pub status: JobStatus,
    pub message: String,
}

/// Create a job, spawn its pipeline worker, and return immediately.
pub async fn generate_report(
    State(state): State<AppState>,
    Json(request): Json<GenerateReportRequest>,
) -> Result<Json<GenerateReportResponse>, AppError> {
    let account = resolve_account(&request)?;
    let year = request.year.unwrap_or(state.config.target_year);

    let id = state.registry.create().await;
    let handle = state.registry.handle(id);
    let source = state.source.clone();
    let config = state.config.clone();

    // The pipeline runs on an inner task so a panic anywhere in the run is
    // caught here and lands on the job record instead of stranding it in
    // `running` forever.
    tokio::spawn(async move {
        let worker = tokio::spawn({
            let handle = handle.clone();
            async move {
                pipeline::run_report(source.as_ref(), &config, account, year, handle).await;
            }
        });
        if let Err(e) = worker.await {
            if e.is_panic() {
                tracing::error!(job_id = %handle.id(), error = %e, "report worker panicked");
                handle.fail(format!("report worker panicked: {e}")).await;
            }
        }
    });

    Ok(Json(GenerateReportResponse {
        report_id: id,
        status: JobStatus::Pending,
        message: "report generation started".to_string(),
    }))
}

fn resolve_account(request: &GenerateReportRequest) -> Result<AccountId, AppError> {
    if let Some(index) = request.account_index {
        return Ok(AccountId::new(index));
    }

    let token = request
        .token
        .as_deref()
        .ok_or_else(|| AppError::BadRequest("missing token or account_index".to_string()))?;

    token
        .split(':')
        .nth(1)
        .and_then(|part| part.parse::<i64>().ok())
        .map(AccountId::new)
        .ok_or_else(|| AppError::BadRequest("invalid account index in token".to_string()))
}

#[derive(Debug, Serialize)]
pub struct ReportStatusResponse {
    pub status: JobStatus,
    pub progress: u8,
    pub current_page: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<ReportSummary>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

pub async fn report_status(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ReportStatusResponse>, AppError> {
    let job = state
        .registry
        .get(id)
        .await
        .ok_or_else(|| AppError::NotFound("report not found".to_string()))?;

    let summary = match job.status {
        JobStatus::Completed => job.summary,
        _ => None,
    };
    let error = match job.status {
        JobStatus::Error => job.error,
        _ => None,
    };

    Ok(Json(ReportStatusResponse {
        status: job.status,
        progress: job.progress,
        current_page: job.current_page,
        summary,
        error,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn explicit_account_index_wins() {
        let request = GenerateReportRequest {
            token: Some("ro:111:single:abc".to_string()),
            account_index: Some(222),
            year: None,
        };
        assert_eq!(resolve_account(&request).unwrap(), AccountId::new(222));
    }

    #[test]
    fn account_index_parsed_from_token() {
        let request = GenerateReportRequest {
            token: Some("ro:524876:single:abc".to_string()),
            account_index: None,
            year: None,
        };
        assert_eq!(resolve_account(&request).unwrap(), AccountId::new(524876));
    }

    #[test]
    fn missing_both_is_bad_request() {
        let request = GenerateReportRequest {
            token: None,
            account_index: None,
            year: None,
        };
        assert!(matches!(
            resolve_account(&request),
            Err(AppError::BadRequest(_))
        ));
    }

    #[test]
    fn malformed_token_is_bad_request() {
        let request = GenerateReportRequest {
            token: Some("not-a-token".to_string()),
            account_index: None,
            year: None,
        };
        assert!(matches!(
            resolve_account(&request),
            Err(AppError::BadRequest(_))
        ));
    }
}
