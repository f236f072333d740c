use axum::{extract::State, response::IntoResponse, Json};

use crate::{
    api::middleware::{ApiError, ApiResult},
    api::AppState,
    models::{JobStatus, PaymentSessionResponse, PrintSettingsRequest},
    services::{page_range, state_machine::validate_transition},
};

/// Confirm copies/duplex/page-range for an uploaded job: compute the cost
/// from the pricing store, create the payment link, and move the job to
/// `payment_pending`. Re-confirmation before payment replaces the old
/// payment link; a paid job can no longer be reconfigured.
pub async fn confirm_print_settings(
    State(state): State<AppState>,
    Json(request): Json<PrintSettingsRequest>,
) -> ApiResult<impl IntoResponse> {
    if request.copies < 1 {
        return Err(ApiError::BadRequest(
            "copies must be at least 1".to_string(),
        ));
    }

    let job = state
        .db
        .get_job_by_id(&request.job_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Job not found".to_string()))?;

    validate_transition(job.status, JobStatus::PaymentPending)
        .map_err(|e| ApiError::Conflict(e.to_string()))?;

    let resolved = page_range::resolve(&request.page_range, job.page_count as u32);
    if resolved.is_empty() {
        return Err(ApiError::BadRequest(format!(
            "page range '{}' selects no pages of a {}-page document",
            request.page_range, job.page_count
        )));
    }

    let amount = state
        .pricing
        .quote(resolved.len(), request.copies, request.duplex)
        .await?;

    let link = state
        .gateway
        .create_payment_link(amount, &format!("Print job {}", job.id), &job.id)
        .await?;

    let applied = state
        .db
        .apply_print_settings(
            &job.id,
            request.copies,
            &request.page_range,
            request.duplex,
            amount,
            &link.link_id,
        )
        .await?;

    if !applied {
        // The job advanced (e.g. the payment cleared) between our read and
        // the write; the settings no longer apply.
        return Err(ApiError::Conflict(
            "job is no longer configurable".to_string(),
        ));
    }

    tracing::info!(
        "Job {} configured: copies={}, duplex={}, range='{}', cost={:.2}",
        job.id,
        request.copies,
        request.duplex,
        request.page_range,
        amount
    );

    Ok(Json(PaymentSessionResponse {
        job_id: job.id,
        amount,
        currency: state.currency.clone(),
        payment_url: link.url,
        gateway_link_id: link.link_id,
        qr_png_base64: link.qr_png_base64,
    }))
}
