use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info, warn};

use crate::api::middleware::error::ApiResult;
use crate::database::Database;
use crate::models::JobStatus;
use crate::services::converter::DocumentConverter;
use crate::services::printer::{PrintError, PrintSubmitter};

/// The scheduling loop that drives paid jobs through conversion and
/// printing. The kiosk has a single printer; at most one job is claimed
/// and fully processed per wake cycle.
pub struct JobWorker {
    db: Arc<Database>,
    converter: DocumentConverter,
    submitter: PrintSubmitter,
    poll_interval: Duration,
}

impl JobWorker {
    pub fn new(
        db: Arc<Database>,
        converter: DocumentConverter,
        submitter: PrintSubmitter,
        poll_interval: Duration,
    ) -> Self {
        Self {
            db,
            converter,
            submitter,
            poll_interval,
        }
    }

    /// Startup sweep: jobs stranded in `processing`/`printing` by a crash
    /// cannot be verified safe to resume (the document may be half
    /// printed), so they are failed and must be retried explicitly.
    pub async fn recover_interrupted(db: &Database) -> ApiResult<u64> {
        let demoted = db.recover_stale_jobs().await?;
        if demoted > 0 {
            warn!(
                "Demoted {} job(s) interrupted by a previous shutdown to failed",
                demoted
            );
        }
        Ok(demoted)
    }

    pub async fn run(self) {
        info!(
            "Starting job worker (poll interval {}s)",
            self.poll_interval.as_secs()
        );

        loop {
            // One cycle's error must never take the loop down.
            match self.process_next().await {
                Ok(Some(job_id)) => {
                    info!("Job {} cycle finished", job_id);
                }
                Ok(None) => {}
                Err(e) => {
                    error!("Job worker cycle error: {}", e);
                }
            }

            tokio::time::sleep(self.poll_interval).await;
        }
    }

    /// Claim at most one `paid` job and drive it to a terminal or
    /// `completed` state. Returns the processed job's id, or `None` when
    /// nothing was waiting.
    pub async fn process_next(&self) -> ApiResult<Option<String>> {
        let Some(job) = self.db.claim_next_paid_job().await? else {
            return Ok(None);
        };

        info!("Processing job {} ({})", job.id, job.filename);

        // Conversion phase
        let converted = match self.converter.convert(Path::new(&job.file_path)).await {
            Ok(path) => path,
            Err(e) => {
                error!("Job {} conversion failed: {}", job.id, e);
                self.db
                    .mark_failed(&job.id, JobStatus::FailedConversion, &e.to_string())
                    .await?;
                return Ok(Some(job.id));
            }
        };

        if !self
            .db
            .mark_printing(&job.id, &converted.to_string_lossy())
            .await?
        {
            // Lost the compare-and-swap: another writer moved the job.
            warn!("Job {} changed state mid-processing, leaving it alone", job.id);
            return Ok(Some(job.id));
        }

        // Printing phase
        match self
            .submitter
            .submit(&converted, &job.id, job.copies, job.duplex, &job.page_range)
            .await
        {
            Ok(print_job_id) => {
                self.db.mark_completed(&job.id, print_job_id).await?;
                info!(
                    "Job {} completed (print subsystem job id {})",
                    job.id, print_job_id
                );
            }
            Err(e) => {
                let status = match e {
                    PrintError::NoPrinterAvailable => JobStatus::FailedPrinter,
                    _ => JobStatus::Failed,
                };
                error!("Job {} print submission failed: {}", job.id, e);
                self.db.mark_failed(&job.id, status, &e.to_string()).await?;
            }
        }

        Ok(Some(job.id))
    }
}
