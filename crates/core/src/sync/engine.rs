use tracing::{debug, error, info};

use crate::directory::{DestinationDirectory, SourceDirectory};
use crate::errors::SyncError;
use crate::sync::plan::{BatchPlan, BatchWindow};
use crate::sync::report::{SyncFailure, SyncReport};
use crate::sync::upsert::{upsert, UpsertOutcome};

/// Drives a run: one source read per batch window, then lookup and write per record, strictly in
/// order. The first error ends the run; nothing already written is undone.
pub struct SyncEngine<S, D> {
    source: S,
    destination: D,
}

impl<S, D> SyncEngine<S, D>
where
    S: SourceDirectory,
    D: DestinationDirectory,
{
    pub fn new(source: S, destination: D) -> Self {
        Self { source, destination }
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub fn destination(&self) -> &D {
        &self.destination
    }

    pub async fn run(&self, plan: &BatchPlan) -> SyncReport {
        let mut report = SyncReport::begin(plan);
        let correlation_id = report.run_id.to_string();

        info!(
            event_name = "sync.run.started",
            correlation_id = %correlation_id,
            first = plan.start_offset().saturating_add(1),
            last = plan.start_offset() + plan.total(),
            batch_size = plan.batch_size(),
            "synchronizing customers {} through {} in batches of {}",
            plan.start_offset().saturating_add(1),
            plan.start_offset() + plan.total(),
            plan.batch_size()
        );

        for window in plan.windows() {
            info!(
                event_name = "sync.batch.started",
                correlation_id = %correlation_id,
                batch = window.number,
                limit = window.limit,
                offset = window.offset,
                "synchronizing batch {}",
                window.number
            );

            if let Err(error) = self.sync_batch(window, &mut report, &correlation_id).await {
                error!(
                    event_name = "sync.run.failed",
                    correlation_id = %correlation_id,
                    batch = window.number,
                    call = error.call().as_str(),
                    error = %error,
                    "sync failed"
                );
                report.finish(Some(SyncFailure { batch: window, error }));
                return report;
            }
            report.batches_completed += 1;
        }

        report.finish(None);
        info!(
            event_name = "sync.run.completed",
            correlation_id = %correlation_id,
            batches = report.batches_completed,
            created = report.records_created,
            updated = report.records_updated,
            "sync completed"
        );
        report
    }

    async fn sync_batch(
        &self,
        window: BatchWindow,
        report: &mut SyncReport,
        correlation_id: &str,
    ) -> Result<(), SyncError> {
        let customers = self.source.fetch_page(window.limit, window.offset).await?;
        report.records_fetched += customers.len();

        for customer in &customers {
            match upsert(&self.destination, customer).await? {
                UpsertOutcome::Created => {
                    report.records_created += 1;
                    debug!(
                        event_name = "sync.record.created",
                        correlation_id = %correlation_id,
                        batch = window.number,
                        customer = %customer.name,
                        "created destination client"
                    );
                }
                UpsertOutcome::Updated { id } => {
                    report.records_updated += 1;
                    debug!(
                        event_name = "sync.record.updated",
                        correlation_id = %correlation_id,
                        batch = window.number,
                        customer = %customer.name,
                        id = %id,
                        "updated destination client"
                    );
                }
            }
        }

        Ok(())
    }
}
