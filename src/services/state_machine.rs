use crate::models::JobStatus;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum TransitionError {
    #[error("Invalid transition from {from:?} to {to:?}")]
    InvalidTransition { from: JobStatus, to: JobStatus },
}

/// Validates if a job status transition is allowed.
///
/// Statuses only move forward: a terminal job never leaves its state, and
/// nothing regresses. Same-state transitions are valid no-ops so that
/// duplicate confirmations (e.g. a webhook retry) stay idempotent.
pub fn validate_transition(from: JobStatus, to: JobStatus) -> Result<(), TransitionError> {
    use JobStatus::*;

    match (from, to) {
        // Same state is always valid (no-op)
        (a, b) if a == b => Ok(()),

        (Uploaded, PaymentPending) => Ok(()),
        (PaymentPending, Paid) => Ok(()),
        (Paid, Processing) => Ok(()),
        (Processing, Printing) => Ok(()),
        (Processing, FailedConversion) => Ok(()),
        (Processing, Failed) => Ok(()),
        (Printing, Completed) => Ok(()),
        (Printing, FailedPrinter) => Ok(()),
        (Printing, Failed) => Ok(()),

        _ => Err(TransitionError::InvalidTransition { from, to }),
    }
}
