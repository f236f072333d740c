use std::sync::Arc;

use crate::api::middleware::error::{ApiError, ApiResult};
use crate::database::Database;
use crate::models::JobStatus;
use crate::services::payment_gateway::PaymentGateway;
use crate::services::state_machine::validate_transition;

/// Determines whether a job's payment has cleared. Two independent
/// channels feed it: the gateway's webhook and an on-demand status poll.
/// Both converge on the same `payment_pending -> paid` transition and are
/// safe to invoke concurrently and repeatedly.
#[derive(Clone)]
pub struct PaymentReconciler {
    db: Arc<Database>,
    gateway: Arc<dyn PaymentGateway>,
}

impl PaymentReconciler {
    pub fn new(db: Arc<Database>, gateway: Arc<dyn PaymentGateway>) -> Self {
        Self { db, gateway }
    }

    /// Apply a payment confirmation idempotently. Returns `true` when the
    /// job advanced to `paid`, `false` when this was a duplicate delivery
    /// for a job the pipeline already took past `payment_pending`.
    pub async fn confirm_paid(&self, gateway_link_id: &str) -> ApiResult<bool> {
        let job = self
            .db
            .get_job_by_gateway_reference(gateway_link_id)
            .await?
            .ok_or_else(|| {
                ApiError::NotFound(format!("no job for payment reference {}", gateway_link_id))
            })?;

        if job.status != JobStatus::PaymentPending {
            tracing::debug!(
                "Ignoring duplicate payment confirmation for job {} (status {})",
                job.id,
                job.status
            );
            return Ok(false);
        }

        validate_transition(job.status, JobStatus::Paid)
            .map_err(|e| ApiError::Conflict(e.to_string()))?;

        // Compare-and-swap: a concurrent confirmation affects zero rows.
        let advanced = self.db.mark_paid_by_reference(gateway_link_id).await?;

        if advanced {
            tracing::info!(
                "Job {} marked paid via payment reference {}",
                job.id,
                gateway_link_id
            );
        }

        Ok(advanced)
    }

    /// Pull path: query the gateway for the payment's current status and
    /// apply the paid transition if it cleared. Covers webhooks that are
    /// delayed, dropped, or blocked on the kiosk's network.
    pub async fn check_payment(&self, gateway_link_id: &str) -> ApiResult<JobStatus> {
        let job = self
            .db
            .get_job_by_gateway_reference(gateway_link_id)
            .await?
            .ok_or_else(|| {
                ApiError::NotFound(format!("no job for payment reference {}", gateway_link_id))
            })?;

        if job.status == JobStatus::PaymentPending {
            match self.gateway.fetch_link_status(gateway_link_id).await {
                Ok(status) if status.is_paid() => {
                    self.confirm_paid(gateway_link_id).await?;
                }
                Ok(_) => {}
                Err(e) => {
                    // A flaky gateway must not fail the user-facing poll;
                    // the job simply stays payment_pending.
                    tracing::warn!("Payment status poll failed for {}: {}", gateway_link_id, e);
                }
            }
        }

        let job = self
            .db
            .get_job_by_gateway_reference(gateway_link_id)
            .await?
            .ok_or_else(|| {
                ApiError::NotFound(format!("no job for payment reference {}", gateway_link_id))
            })?;

        Ok(job.status)
    }
}
