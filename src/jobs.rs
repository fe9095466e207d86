//! Job records and the process-wide job registry.
//!
//! One job per report request. The registry is the only state shared
//! between the HTTP layer and the background workers; each worker writes
//! exclusively through the handle bound to its own job id, and pollers get
//! cloned snapshots. Terminal states (`completed`, `error`) are never left,
//! enforced here rather than by caller convention.

use crate::pipeline::report::{ArtifactPaths, ReportSummary};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::warn;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    Pending,
    Running,
    Completed,
    Error,
}

impl JobStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, JobStatus::Completed | JobStatus::Error)
    }
}

/// State of one report request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Job {
    pub id: Uuid,
    pub status: JobStatus,
    pub progress: u8,
    pub current_page: u64,
    /// Populated on pipeline failure, or on a transport fault during the
    /// scan (in which case the job can still complete with partial data).
    pub error: Option<String>,
    pub summary: Option<ReportSummary>,
    pub files: Option<ArtifactPaths>,
    pub created_at: DateTime<Utc>,
}

impl Job {
    fn new(id: Uuid) -> Self {
        Job {
            id,
            status: JobStatus::Pending,
            progress: 0,
            current_page: 0,
            error: None,
            summary: None,
            files: None,
            created_at: Utc::now(),
        }
    }
}

/// Concurrent map of job id to job record.
#[derive(Debug, Clone, Default)]
pub struct JobRegistry {
    jobs: Arc<RwLock<HashMap<Uuid, Job>>>,
}

impl JobRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a fresh job in `pending` state and return its id.
    pub async fn create(&self) -> Uuid {
        let id = Uuid::new_v4();
        self.jobs.write().await.insert(id, Job::new(id));
        id
    }

    /// Snapshot of a job, if it exists.
    pub async fn get(&self, id: Uuid) -> Option<Job> {
        self.jobs.read().await.get(&id).cloned()
    }

    /// Writer handle for the worker that owns `id`.
    pub fn handle(&self, id: Uuid) -> JobHandle {
        JobHandle {
            registry: self.clone(),
            id,
        }
    }

    /// Apply `mutate` unless the job is already terminal.
    async fn update(&self, id: Uuid, mutate: impl FnOnce(&mut Job)) {
        let mut jobs = self.jobs.write().await;
        match jobs.get_mut(&id) {
            Some(job) if job.status.is_terminal() => {
                warn!(%id, status = ?job.status, "ignoring update to terminal job");
            }
            Some(job) => mutate(job),
            None => warn!(%id, "update for unknown job id"),
        }
    }
}

/// Write access to a single job, held by the worker running its pipeline.
#[derive(Debug, Clone)]
pub struct JobHandle {
    registry: JobRegistry,
    id: Uuid,
}

impl JobHandle {
    pub fn id(&self) -> Uuid {
        self.id
    }

    pub async fn mark_running(&self) {
        self.registry
            .update(self.id, |job| {
                job.status = JobStatus::Running;
                job.progress = 0;
            })
            .await;
    }

    pub async fn set_progress(&self, progress: u8, current_page: u64) {
        self.registry
            .update(self.id, |job| {
                job.progress = progress;
                job.current_page = current_page;
            })
            .await;
    }

    /// Record a transport fault without ending the run.
    pub async fn record_fetch_fault(&self, message: String) {
        self.registry
            .update(self.id, |job| job.error = Some(message))
            .await;
    }

    pub async fn complete(&self, summary: ReportSummary, files: ArtifactPaths) {
        self.registry
            .update(self.id, |job| {
                job.status = JobStatus::Completed;
                job.progress = 100;
                job.summary = Some(summary);
                job.files = Some(files);
            })
            .await;
    }

    pub async fn fail(&self, message: String) {
        self.registry
            .update(self.id, |job| {
                job.status = JobStatus::Error;
                job.error = Some(message);
            })
            .await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Decimal;
    use std::path::PathBuf;

    fn summary() -> ReportSummary {
        ReportSummary {
            account_index: 7,
            year: 2025,
            total_trades: 0,
            total_deposits: 0,
            total_withdrawals: 0,
            total_transfers: 0,
            total_volume: Decimal::zero(),
            total_fees: Decimal::zero(),
            gross_pnl: Decimal::zero(),
            net_pnl: Decimal::zero(),
            period_start: None,
            period_end: None,
        }
    }

    fn files() -> ArtifactPaths {
        ArtifactPaths {
            json: PathBuf::from("/tmp/x/fiscal_report.json"),
            csv: PathBuf::from("/tmp/x/trades.csv"),
        }
    }

    #[tokio::test]
    async fn create_starts_pending() {
        let registry = JobRegistry::new();
        let id = registry.create().await;
        let job = registry.get(id).await.unwrap();
        assert_eq!(job.status, JobStatus::Pending);
        assert_eq!(job.progress, 0);
    }

    #[tokio::test]
    async fn lifecycle_reaches_completed() {
        let registry = JobRegistry::new();
        let id = registry.create().await;
        let handle = registry.handle(id);

        handle.mark_running().await;
        assert_eq!(registry.get(id).await.unwrap().status, JobStatus::Running);

        handle.set_progress(42, 21).await;
        let job = registry.get(id).await.unwrap();
        assert_eq!(job.progress, 42);
        assert_eq!(job.current_page, 21);

        handle.complete(summary(), files()).await;
        let job = registry.get(id).await.unwrap();
        assert_eq!(job.status, JobStatus::Completed);
        assert_eq!(job.progress, 100);
        assert!(job.summary.is_some());
    }

    #[tokio::test]
    async fn terminal_states_are_never_left() {
        let registry = JobRegistry::new();
        let id = registry.create().await;
        let handle = registry.handle(id);

        handle.fail("boom".to_string()).await;
        handle.mark_running().await;
        handle.complete(summary(), files()).await;
        handle.set_progress(50, 5).await;

        let job = registry.get(id).await.unwrap();
        assert_eq!(job.status, JobStatus::Error);
        assert_eq!(job.error.as_deref(), Some("boom"));
        assert!(job.summary.is_none());
    }

    #[tokio::test]
    async fn completed_job_ignores_fail() {
        let registry = JobRegistry::new();
        let id = registry.create().await;
        let handle = registry.handle(id);

        handle.complete(summary(), files()).await;
        handle.fail("late fault".to_string()).await;

        let job = registry.get(id).await.unwrap();
        assert_eq!(job.status, JobStatus::Completed);
        assert!(job.error.is_none());
    }

    #[tokio::test]
    async fn fetch_fault_does_not_end_the_run() {
        let registry = JobRegistry::new();
        let id = registry.create().await;
        let handle = registry.handle(id);

        handle.mark_running().await;
        handle.record_fetch_fault("connection reset".to_string()).await;

        let job = registry.get(id).await.unwrap();
        assert_eq!(job.status, JobStatus::Running);
        assert_eq!(job.error.as_deref(), Some("connection reset"));

        handle.complete(summary(), files()).await;
        let job = registry.get(id).await.unwrap();
        assert_eq!(job.status, JobStatus::Completed);
        // The transport fault stays visible alongside the completed result.
        assert_eq!(job.error.as_deref(), Some("connection reset"));
    }

    #[tokio::test]
    async fn unknown_job_lookup_is_none() {
        let registry = JobRegistry::new();
        assert!(registry.get(Uuid::new_v4()).await.is_none());
    }

    #[tokio::test]
    async fn jobs_are_independent() {
        let registry = JobRegistry::new();
        let a = registry.create().await;
        let b = registry.create().await;

        registry.handle(a).fail("a failed".to_string()).await;

        assert_eq!(registry.get(a).await.unwrap().status, JobStatus::Error);
        assert_eq!(registry.get(b).await.unwrap().status, JobStatus::Pending);
    }
}
