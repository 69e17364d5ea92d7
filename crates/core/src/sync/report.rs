use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::errors::SyncError;
use crate::sync::plan::{BatchPlan, BatchWindow};

#[derive(Clone, Debug, PartialEq)]
pub struct SyncFailure {
    pub batch: BatchWindow,
    pub error: SyncError,
}

/// Outcome of one sync run. Records counted as created or updated stay written even when the run
/// later fails.
#[derive(Clone, Debug, PartialEq)]
pub struct SyncReport {
    pub run_id: Uuid,
    pub started_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,
    pub batches_planned: usize,
    pub batches_completed: usize,
    pub records_fetched: usize,
    pub records_created: usize,
    pub records_updated: usize,
    pub failure: Option<SyncFailure>,
}

impl SyncReport {
    pub(crate) fn begin(plan: &BatchPlan) -> Self {
        Self {
            run_id: Uuid::new_v4(),
            started_at: Utc::now(),
            finished_at: None,
            batches_planned: plan.batch_count(),
            batches_completed: 0,
            records_fetched: 0,
            records_created: 0,
            records_updated: 0,
            failure: None,
        }
    }

    pub(crate) fn finish(&mut self, failure: Option<SyncFailure>) {
        self.failure = failure;
        self.finished_at = Some(Utc::now());
    }

    pub fn is_success(&self) -> bool {
        self.failure.is_none()
    }

    pub fn records_written(&self) -> usize {
        self.records_created + self.records_updated
    }

    pub fn summary(&self) -> String {
        let counts = format!(
            "{} of {} batches, {} fetched, {} created, {} updated",
            self.batches_completed,
            self.batches_planned,
            self.records_fetched,
            self.records_created,
            self.records_updated
        );
        match &self.failure {
            None => format!("sync completed: {counts}"),
            Some(failure) => format!(
                "sync failed in batch {} (limit {}, offset {}): {}; completed {counts}",
                failure.batch.number, failure.batch.limit, failure.batch.offset, failure.error
            ),
        }
    }
}
