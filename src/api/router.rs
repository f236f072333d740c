use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use tower_http::{limit::RequestBodyLimitLayer, trace::TraceLayer};

use crate::api::{payments, settings, status, upload, AppState};

const MAX_UPLOAD_BYTES: usize = 90 * 1024 * 1024;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/upload", post(upload::upload_document))
        .route("/jobs/:id", get(upload::get_job))
        .route("/print-settings", post(settings::confirm_print_settings))
        .route("/webhooks/payment", post(payments::payment_webhook))
        .route("/payments/:link_id/status", get(payments::payment_status))
        .route("/status", get(status::machine_status))
        .route("/health", get(status::health))
        .layer(DefaultBodyLimit::disable())
        .layer(RequestBodyLimitLayer::new(MAX_UPLOAD_BYTES))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
