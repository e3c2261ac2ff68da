//! Shared application state.

use std::collections::HashMap;

use parking_lot::RwLock;
use pattern_core::FormatterConfig;
use pattern_engine::{DocumentProcessor, DocumentStats};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// Finished jobs kept before the oldest are evicted with their output.
pub const MAX_FINISHED_JOBS: usize = 100;

/// A formatting job and where its output lives.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FormatJob {
    pub id: String,
    pub filename: String,
    pub status: JobStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output_path: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stats: Option<DocumentStats>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub created_at: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<i64>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    Processing,
    Completed,
    Failed,
}

/// Shared application state accessible from all route handlers.
pub struct AppState {
    pub config: FormatterConfig,
    pub jobs: RwLock<HashMap<String, FormatJob>>,
    job_retention: usize,
}

impl AppState {
    pub fn new(config: FormatterConfig) -> Self {
        Self {
            config,
            jobs: RwLock::new(HashMap::new()),
            job_retention: MAX_FINISHED_JOBS,
        }
    }

    /// A processor for one request; the pattern table itself is shared.
    pub fn processor(&self) -> DocumentProcessor {
        DocumentProcessor::new(self.config.policy.clone())
    }

    pub fn insert_job(&self, job: FormatJob) {
        self.jobs.write().insert(job.id.clone(), job);
    }

    pub fn get_job(&self, job_id: &str) -> Option<FormatJob> {
        self.jobs.read().get(job_id).cloned()
    }

    /// Apply `update` to a job if it exists, then prune finished jobs.
    pub fn update_job(&self, job_id: &str, update: impl FnOnce(&mut FormatJob)) {
        if let Some(job) = self.jobs.write().get_mut(job_id) {
            update(job);
        }
        self.prune_jobs();
    }

    /// Drop the oldest finished jobs beyond the retention limit and delete
    /// their generated documents.
    pub fn prune_jobs(&self) {
        let evicted: Vec<String> = {
            let mut jobs = self.jobs.write();
            let mut finished: Vec<(String, i64)> = jobs
                .values()
                .filter(|j| j.status != JobStatus::Processing)
                .map(|j| (j.id.clone(), j.completed_at.unwrap_or(j.created_at)))
                .collect();
            if finished.len() <= self.job_retention {
                return;
            }
            finished.sort_by_key(|(_, t)| *t);
            let remove_count = finished.len() - self.job_retention;
            finished
                .into_iter()
                .take(remove_count)
                .map(|(id, _)| {
                    jobs.remove(&id);
                    id
                })
                .collect()
        };

        for id in &evicted {
            let path = self.config.data_paths.output_for(id);
            match std::fs::remove_file(&path) {
                Ok(()) => {}
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
                Err(e) => warn!("Failed to remove {}: {}", path.display(), e),
            }
        }
        debug!("Evicted {} finished jobs", evicted.len());
    }
}

pub fn now_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}
